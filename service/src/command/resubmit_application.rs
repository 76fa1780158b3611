//! [`Command`] for resubmitting a corrected [`Application`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        applicant,
        application::{self, Event, Payload},
        Application,
    },
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Applicant;

use super::{
    transit_application::{self, TransitApplication},
    Command,
};

/// [`Command`] for resubmitting an [`Application`] sent back for correction.
///
/// Questionnaire records are rewritten from the new [`Payload`], and personal
/// details are captured again from the current profile.
#[derive(Clone, Debug)]
pub struct ResubmitApplication {
    /// ID of the [`Applicant`] resubmitting the [`Application`].
    pub applicant_id: applicant::Id,

    /// ID of the [`Application`] to resubmit.
    pub application_id: application::Id,

    /// Corrected [`Payload`].
    pub payload: Payload,
}

impl<Db, El, Ml> Command<ResubmitApplication> for Service<Db, El, Ml>
where
    Db: Database<
        Select<By<Option<Application>, application::Id>>,
        Ok = Option<Application>,
        Err = Traced<database::Error>,
    >,
    Self: Command<
        TransitApplication,
        Ok = Application,
        Err = Traced<transit_application::ExecutionError>,
    >,
{
    type Ok = Application;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResubmitApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResubmitApplication {
            applicant_id,
            application_id,
            payload,
        } = cmd;

        // Foreign applications are indistinguishable from missing ones.
        self.database()
            .execute(Select(By::<Option<Application>, _>::new(
                application_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|app| app.applicant_id == applicant_id)
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        self.execute(TransitApplication {
            application_id,
            event: Event::Resubmit(Box::new(payload)),
            email_body: None,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ResubmitApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Application`] of the [`Applicant`] does not exist.
    #[display("`Application(id: {_0})` does not exist")]
    #[from(ignore)]
    ApplicationNotExists(#[error(not(source))] application::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`TransitApplication`] error.
    #[display("{_0}")]
    Transit(transit_application::ExecutionError),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::transit_application,
        domain::{
            applicant::{self, Field},
            application::{EventKind, PayloadField, Status},
        },
        testing::{self, Verdict},
        Command as _,
    };

    use super::{ExecutionError, ResubmitApplication};

    #[tokio::test]
    async fn rewrites_questionnaire_from_live_profile() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Resubmit).await;
        let mut profile = testing::profile(app.applicant_id);
        profile.last_name = "Okafor".into();
        testing::store_profile(&service, profile).await;

        let resubmitted = service
            .execute(ResubmitApplication {
                applicant_id: app.applicant_id,
                application_id: app.id,
                payload: testing::payload("Mama Put Kitchen", "Catering"),
            })
            .await
            .unwrap();

        assert_eq!(resubmitted.status, Status::Accepted1);
        let stored = testing::reload(&service, app.id).await;
        assert_eq!(stored, resubmitted);
        assert_eq!(stored.business.name, "Mama Put Kitchen");
        assert_eq!(stored.business.industry, "Catering");
        assert_eq!(stored.personal.last_name, "Okafor");
        assert_eq!(stored.submitted_at, app.submitted_at);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn requires_complete_profile() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Resubmit).await;
        let mut profile = testing::profile(app.applicant_id);
        profile.gender = " ".into();
        testing::store_profile(&service, profile).await;

        let err = service
            .execute(ResubmitApplication {
                applicant_id: app.applicant_id,
                application_id: app.id,
                payload: testing::payload("Mama Put Kitchen", "Catering"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transit(
                transit_application::ExecutionError::ProfileIncomplete(f),
            ) if f == &[Field::Gender],
        ));
        assert_eq!(testing::reload(&service, app.id).await, app);
    }

    #[tokio::test]
    async fn blank_payload_is_refused_on_resubmission() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Resubmit).await;

        let err = service
            .execute(ResubmitApplication {
                applicant_id: app.applicant_id,
                application_id: app.id,
                payload: testing::payload("", "Catering"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transit(
                transit_application::ExecutionError::InvalidPayload(f),
            ) if f == &[PayloadField::BusinessName],
        ));
        assert_eq!(testing::reload(&service, app.id).await, app);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn only_resubmit_status_is_accepted() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Pending).await;

        let err = service
            .execute(ResubmitApplication {
                applicant_id: app.applicant_id,
                application_id: app.id,
                payload: testing::payload("Mama Put Kitchen", "Catering"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Transit(
                transit_application::ExecutionError::GuardViolation {
                    status: Status::Pending,
                    event: EventKind::Resubmission,
                    ..
                },
            ),
        ));
    }

    #[tokio::test]
    async fn hides_foreign_applications() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Resubmit).await;

        let err = service
            .execute(ResubmitApplication {
                applicant_id: applicant::Id::new(),
                application_id: app.id,
                payload: testing::payload("Mama Put Kitchen", "Catering"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ApplicationNotExists(id) if *id == app.id,
        ));
    }
}
