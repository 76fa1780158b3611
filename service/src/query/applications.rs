//! [`Query`] collection related to multiple [`Application`]s.

use common::{
    operations::{By, Select},
    Page, Range,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Applicant, Application};
use crate::{
    domain::{applicant, application::Status},
    infra::{database, Database},
    read::application::{StatusCounts, Summary},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries [`Summary`]s of an [`Applicant`]'s [`Application`]s, latest
/// first.
pub type ByApplicant = DatabaseQuery<By<Vec<Summary>, applicant::Id>>;

/// Queries [`Summary`]s of [`Application`]s having the provided [`Status`],
/// latest first.
pub type ByStatus = DatabaseQuery<By<Vec<Summary>, Status>>;

/// [`Query`] of [`Application`]s positioned `from..=to` in the order of
/// their submission.
///
/// Positions are 1-based and the tail is cut at the total number.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rows {
    /// Position of the first row.
    pub from: i64,

    /// Position of the last row.
    pub to: i64,
}

impl<Db, El, Ml> Query<Rows> for Service<Db, El, Ml>
where
    Db: Database<
            Select<By<StatusCounts, Option<applicant::Id>>>,
            Ok = StatusCounts,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Summary>, Range>>,
            Ok = Vec<Summary>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Page<Summary>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Rows { from, to }: Rows,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let range = Range::new(from, to)
            .ok_or(E::InvalidRange { from, to })
            .map_err(tracerr::wrap!())?;

        let total = self
            .database()
            .execute(Select(By::<StatusCounts, _>::new(None)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .total();
        let total = u32::try_from(total).unwrap_or(u32::MAX);

        let range = range
            .clamp(total)
            .ok_or(E::OutOfRange { total })
            .map_err(tracerr::wrap!())?;
        let rows = self
            .database()
            .execute(Select(By::<Vec<Summary>, _>::new(range)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Page { rows, range, total })
    }
}

/// Error of [`Rows`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requested positions don't form a range.
    #[display("Invalid range `{from}..={to}`")]
    #[from(ignore)]
    InvalidRange {
        /// Requested first position.
        from: i64,

        /// Requested last position.
        to: i64,
    },

    /// Requested range starts past the last [`Application`].
    #[display("Range starts past the total of {total} applications")]
    #[from(ignore)]
    OutOfRange {
        /// Total number of [`Application`]s.
        total: u32,
    },
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        domain::application::Status,
        testing::{self, Verdict},
        Query as _,
    };

    use super::{ByStatus, ExecutionError, Rows};

    #[tokio::test]
    async fn pages_in_submission_order() {
        let (service, _) = testing::service(Verdict::Eligible);
        let mut ids = vec![];
        for i in 0..4 {
            let mut app = testing::draft(Status::Pending);
            app.submitted_at = app.submitted_at + Duration::from_secs(i * 60);
            ids.push(testing::store(&service, app).await.id);
        }

        let page = service.execute(Rows { from: 2, to: 10 }).await.unwrap();

        assert_eq!(page.total, 4);
        assert_eq!((page.range.first(), page.range.last()), (2, 4));
        assert_eq!(
            page.rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            ids[1..],
        );
    }

    #[tokio::test]
    async fn refuses_bad_ranges() {
        let (service, _) = testing::service(Verdict::Eligible);
        drop(testing::with_status(&service, Status::Accepted1).await);

        let invalid = service.execute(Rows { from: 3, to: 2 }).await;
        assert!(matches!(
            invalid.unwrap_err().as_ref(),
            ExecutionError::InvalidRange { from: 3, to: 2 },
        ));

        let past = service.execute(Rows { from: 2, to: 5 }).await;
        assert!(matches!(
            past.unwrap_err().as_ref(),
            ExecutionError::OutOfRange { total: 1 },
        ));
    }

    #[tokio::test]
    async fn lists_by_status() {
        let (service, _) = testing::service(Verdict::Eligible);
        let pending = testing::with_status(&service, Status::Pending).await;
        drop(testing::with_status(&service, Status::Accepted2).await);

        let found = service
            .execute(ByStatus::by(Status::Pending))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pending.id);
        assert_eq!(found[0].applicant_name, "Amaka Obi Chioma");
    }
}
