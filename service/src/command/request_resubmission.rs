//! [`Command`] for sending an [`Application`] back for correction.

use tracerr::Traced;

use crate::{
    domain::{
        application::{self, Event},
        Application,
    },
    Service,
};

use super::{
    transit_application::{self, TransitApplication},
    Command,
};

/// [`Command`] for sending an [`Application`] back for correction.
///
/// Reopens [`Application`]s in any [`Status`] except [`Status::Resubmit`],
/// the terminal ones included.
///
/// [`Status`]: application::Status
/// [`Status::Resubmit`]: application::Status::Resubmit
#[derive(Clone, Debug)]
pub struct RequestResubmission {
    /// ID of the [`Application`] to reopen.
    pub application_id: application::Id,

    /// Clarification to email to the applicant.
    pub email_body: Option<String>,
}

impl<Db, El, Ml> Command<RequestResubmission> for Service<Db, El, Ml>
where
    Self: Command<
        TransitApplication,
        Ok = Application,
        Err = Traced<transit_application::ExecutionError>,
    >,
{
    type Ok = Application;
    type Err = Traced<transit_application::ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestResubmission,
    ) -> Result<Self::Ok, Self::Err> {
        let RequestResubmission {
            application_id,
            email_body,
        } = cmd;

        self.execute(TransitApplication {
            application_id,
            event: Event::RequestResubmission,
            email_body,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::transit_application::ExecutionError,
        domain::application::{EventKind, Status},
        testing::{self, Verdict},
        Command as _,
    };

    use super::RequestResubmission;

    #[tokio::test]
    async fn reopens_every_status_but_resubmit() {
        let (service, _) = testing::service(Verdict::Eligible);

        for &status in Status::ALL {
            let app = testing::with_status(&service, status).await;
            let res = service
                .execute(RequestResubmission {
                    application_id: app.id,
                    email_body: None,
                })
                .await;

            if status == Status::Resubmit {
                assert!(matches!(
                    res.unwrap_err().as_ref(),
                    ExecutionError::GuardViolation {
                        event: EventKind::ResubmissionRequest,
                        ..
                    },
                ));
            } else {
                assert_eq!(res.unwrap().status, Status::Resubmit, "{status}");
            }
        }
    }
}
