//! [`Command`] for notifying an [`Applicant`] about a transition.

use std::convert::Infallible;

use common::{
    operations::{Deliver, Insert},
    DateTime,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        applicant, application,
        notification::{self, Notice},
        Application, Notification,
    },
    infra::{
        database,
        mailer::{self, Email},
        Database, Mailer,
    },
    Service,
};
#[cfg(doc)]
use crate::domain::Applicant;

use super::Command;

/// [`Command`] for storing a [`Notification`] and emailing an [`Applicant`]
/// after a committed transition of their [`Application`].
///
/// Delivery is best-effort: failures are logged and never returned.
#[derive(Clone, Debug)]
pub struct Dispatch {
    /// ID of the [`Applicant`] to notify.
    pub applicant_id: applicant::Id,

    /// ID of the [`Application`] the [`Notice`] is about.
    pub application_id: application::Id,

    /// Email address of the [`Applicant`].
    pub recipient: String,

    /// First name the [`Applicant`] is addressed by.
    pub first_name: String,

    /// [`Notice`] to deliver.
    pub notice: Notice,
}

impl Dispatch {
    /// Creates a new [`Dispatch`] of the provided [`Notice`] about the
    /// provided [`Application`].
    #[must_use]
    pub fn new(app: &Application, notice: Notice) -> Self {
        Self {
            applicant_id: app.applicant_id,
            application_id: app.id,
            recipient: app.personal.email.clone(),
            first_name: app.personal.first_name.clone(),
            notice,
        }
    }
}

impl<Db, El, Ml> Command<Dispatch> for Service<Db, El, Ml>
where
    Db: Database<Insert<Notification>, Err = Traced<database::Error>>,
    Ml: Mailer<Deliver<Email>, Err = Traced<mailer::Error>>,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, cmd: Dispatch) -> Result<Self::Ok, Self::Err> {
        let Dispatch {
            applicant_id,
            application_id,
            recipient,
            first_name,
            notice,
        } = cmd;

        let stored = self
            .database()
            .execute(Insert(Notification {
                id: notification::Id::new(),
                applicant_id,
                application_id,
                title: notice.title().to_owned(),
                body: notice.body(&first_name),
                created_at: DateTime::now().coerce(),
            }))
            .await;
        if let Err(e) = stored {
            log::error!(
                %application_id,
                "failed to store `{}` notification: {e}",
                notice.title(),
            );
        }

        let sent = self
            .mailer()
            .execute(Deliver(Email {
                to: recipient,
                subject: notice.email_subject().to_owned(),
                text: notice.email_text(&first_name),
            }))
            .await;
        if let Err(e) = sent {
            log::error!(
                %application_id,
                "failed to email `{}`: {e}",
                notice.email_subject(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{notification::Notice, Application, Notification},
        infra::Database as _,
        testing::{self, Verdict},
        Command as _,
    };

    use super::Dispatch;

    #[tokio::test]
    async fn stores_and_emails() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;

        service
            .execute(Dispatch::new(&app, Notice::DocumentsReceived))
            .await
            .unwrap();

        let stored = notifications(&service, &app).await;
        assert_eq!(stored[0].title, "Loan Documents Received");
        let sent = outbox.sent().await;
        assert_eq!(sent.last().unwrap().to, app.personal.email);
    }

    #[tokio::test]
    async fn survives_mailer_failure() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        outbox.fail(true);

        service
            .execute(Dispatch::new(&app, Notice::Submitted))
            .await
            .unwrap();

        assert!(notifications(&service, &app)
            .await
            .iter()
            .any(|n| n.title == "Loan Application Submitted"));
    }

    #[tokio::test]
    async fn emails_despite_notification_failure() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        service.database().reject_notifications(true);

        service
            .execute(Dispatch::new(&app, Notice::DocumentsReceived))
            .await
            .unwrap();

        assert!(notifications(&service, &app).await.is_empty());
        assert_eq!(outbox.sent().await.len(), 1);
    }

    async fn notifications(
        service: &testing::Service,
        app: &Application,
    ) -> Vec<Notification> {
        service
            .database()
            .execute(Select(By::<Vec<Notification>, _>::new(app.applicant_id)))
            .await
            .unwrap()
    }
}
