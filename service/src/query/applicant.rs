//! [`Query`] collection related to an [`Applicant`].

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Applicant;
use crate::{
    domain::{applicant, Profile},
    infra::{database, Database},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`Profile`] of an [`Applicant`].
pub type ProfileById = DatabaseQuery<By<Option<Profile>, applicant::Id>>;

/// [`Query`] checking whether the [`Profile`] of an [`Applicant`] allows to
/// submit applications.
#[derive(Clone, Copy, Debug)]
pub struct Completeness {
    /// ID of the [`Applicant`] to check.
    pub applicant_id: applicant::Id,
}

impl<Db, El, Ml> Query<Completeness> for Service<Db, El, Ml>
where
    Db: Database<
        Select<By<Option<Profile>, applicant::Id>>,
        Ok = Option<Profile>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = applicant::Completeness;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Completeness { applicant_id }: Completeness,
    ) -> Result<Self::Ok, Self::Err> {
        let profile = self
            .database()
            .execute(Select(By::new(applicant_id)))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(applicant::Completeness::of(profile.as_ref()))
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::applicant::{self, Field},
        testing::{self, Verdict},
        Query as _,
    };

    use super::Completeness;

    #[tokio::test]
    async fn reports_missing_fields() {
        let (service, _) = testing::service(Verdict::Eligible);
        let id = testing::applicant(&service).await;
        let mut profile = testing::profile(id);
        profile.lga = String::new();
        testing::store_profile(&service, profile).await;

        let unknown = service
            .execute(Completeness {
                applicant_id: applicant::Id::new(),
            })
            .await
            .unwrap();
        let known = service
            .execute(Completeness { applicant_id: id })
            .await
            .unwrap();

        assert_eq!(
            unknown,
            applicant::Completeness::Incomplete(Field::REQUIRED.to_vec()),
        );
        assert_eq!(
            known,
            applicant::Completeness::Incomplete(vec![Field::Lga]),
        );
    }
}
