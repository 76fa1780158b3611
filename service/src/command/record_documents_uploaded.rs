//! [`Command`] for recording [`Documents`] uploaded for an [`Application`].

use tracerr::Traced;

use crate::{
    domain::{
        application::{self, Documents, Event},
        Application,
    },
    Service,
};

use super::{
    transit_application::{self, TransitApplication},
    Command,
};

/// [`Command`] for recording [`Documents`] uploaded to the object storage for
/// an [`Application`] awaiting them.
#[derive(Clone, Debug)]
pub struct RecordDocumentsUploaded {
    /// ID of the [`Application`] the [`Documents`] are uploaded for.
    pub application_id: application::Id,

    /// Uploaded [`Documents`].
    pub documents: Documents,
}

impl<Db, El, Ml> Command<RecordDocumentsUploaded> for Service<Db, El, Ml>
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
        cmd: RecordDocumentsUploaded,
    ) -> Result<Self::Ok, Self::Err> {
        let RecordDocumentsUploaded {
            application_id,
            documents,
        } = cmd;

        self.execute(TransitApplication {
            application_id,
            event: Event::UploadDocuments(documents),
            email_body: None,
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

    use super::RecordDocumentsUploaded;

    #[tokio::test]
    async fn moves_to_pending_with_documents() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        let documents = testing::documents();

        let pending = service
            .execute(RecordDocumentsUploaded {
                application_id: app.id,
                documents: documents.clone(),
            })
            .await
            .unwrap();

        assert_eq!(pending.status, Status::Pending);
        let stored = testing::reload(&service, app.id).await;
        assert_eq!(stored.status, Status::Pending);
        assert_eq!(stored.documents, Some(documents));
        assert_eq!(
            outbox.sent().await[0].subject,
            "Loan Documents Received",
        );
    }

    #[tokio::test]
    async fn requires_registration_number() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        let mut documents = testing::documents();
        documents.registration_number = "   ".into();

        let err = service
            .execute(RecordDocumentsUploaded {
                application_id: app.id,
                documents,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DocumentsIncomplete(id) if *id == app.id,
        ));
        let stored = testing::reload(&service, app.id).await;
        assert_eq!(stored.status, Status::Accepted1);
        assert_eq!(stored.documents, None);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn refuses_outside_of_upload_gate() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Rejected1).await;

        let err = service
            .execute(RecordDocumentsUploaded {
                application_id: app.id,
                documents: testing::documents(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::GuardViolation {
                status: Status::Rejected1,
                event: EventKind::DocumentsUpload,
                ..
            },
        ));
        assert_eq!(testing::reload(&service, app.id).await.documents, None);
    }
}
