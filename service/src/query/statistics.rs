//! [`Query`] collection of [`Application`] statistics.

use common::{
    operations::{By, Select},
    Percent,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Applicant, Application};
use crate::{
    domain::{applicant, application::Outcome},
    infra::{database, Database},
    read::application::{MonthlyCounts, StatusCounts, Year},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries [`StatusCounts`] of all the [`Application`]s, or of the ones of
/// the provided [`Applicant`].
pub type Counts = DatabaseQuery<By<StatusCounts, Option<applicant::Id>>>;

/// Queries [`MonthlyCounts`] of [`Application`]s submitted in a [`Year`].
pub type Monthly = DatabaseQuery<By<MonthlyCounts, Year>>;

/// [`Query`] of [`Percentages`] of all the [`Application`]s per [`Outcome`].
#[derive(Clone, Copy, Debug)]
pub struct Shares;

/// Shares of [`Application`]s per [`Outcome`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Percentages {
    /// [`Outcome::Approved`] share.
    pub approved: Percent,

    /// [`Outcome::Rejected`] share.
    pub rejected: Percent,

    /// [`Outcome::Pending`] share.
    pub pending: Percent,
}

impl From<&StatusCounts> for Percentages {
    fn from(counts: &StatusCounts) -> Self {
        let total = counts.total();
        let share = |o| Percent::of(counts.outcome(o), total);
        Self {
            approved: share(Outcome::Approved),
            rejected: share(Outcome::Rejected),
            pending: share(Outcome::Pending),
        }
    }
}

impl<Db, El, Ml> Query<Shares> for Service<Db, El, Ml>
where
    Db: Database<
        Select<By<StatusCounts, Option<applicant::Id>>>,
        Ok = StatusCounts,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Percentages;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Shares) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::new(None)))
            .await
            .map(|counts| Percentages::from(&counts))
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Percent};

    use crate::{
        domain::application::Status,
        read::application::Year,
        testing::{self, Verdict},
        Query as _,
    };

    use super::{Counts, Monthly, Percentages, Shares};

    fn percent(s: &str) -> Percent {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn zero_without_applications() {
        let (service, _) = testing::service(Verdict::Eligible);

        let shares = service.execute(Shares).await.unwrap();

        assert_eq!(
            shares,
            Percentages {
                approved: percent("0"),
                rejected: percent("0"),
                pending: percent("0"),
            },
        );
    }

    #[tokio::test]
    async fn splits_by_outcome() {
        let (service, _) = testing::service(Verdict::Eligible);
        for status in [Status::Accepted2, Status::Rejected1, Status::Rejected2]
        {
            drop(testing::with_status(&service, status).await);
        }

        let shares = service.execute(Shares).await.unwrap();

        assert_eq!(shares.approved, percent("33.33"));
        assert_eq!(shares.rejected, percent("66.67"));
        assert_eq!(shares.pending, percent("0"));
    }

    #[tokio::test]
    async fn counts_per_applicant() {
        let (service, _) = testing::service(Verdict::Eligible);
        let mine = testing::with_status(&service, Status::Pending).await;
        drop(testing::with_status(&service, Status::Accepted2).await);

        let all = service.execute(Counts::by(None)).await.unwrap();
        let own = service
            .execute(Counts::by(Some(mine.applicant_id)))
            .await
            .unwrap();

        assert_eq!(all.total(), 2);
        assert_eq!(own.total(), 1);
        assert_eq!(own.of(Status::Pending), 1);
    }

    #[tokio::test]
    async fn counts_months_of_year() {
        let (service, _) = testing::service(Verdict::Eligible);
        for at in [
            "2023-01-15T10:00:00Z",
            "2023-01-31T23:59:59Z",
            "2023-12-01T00:00:00Z",
            "2024-01-01T00:00:00Z",
        ] {
            let mut app = testing::draft(Status::Pending);
            app.submitted_at = DateTime::from_rfc3339(at).unwrap().coerce();
            drop(testing::store(&service, app).await);
        }

        let counts = service.execute(Monthly::by(Year::from(2023))).await;

        assert_eq!(
            counts.unwrap().months(),
            &[2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        );
    }
}
