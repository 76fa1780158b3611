//! [`Command`] definition.

pub mod accept_application;
pub mod authorize_session;
pub mod dispatch;
pub mod record_documents_uploaded;
pub mod reject_application;
pub mod request_resubmission;
pub mod resubmit_application;
pub mod submit_application;
pub mod transit_application;
pub mod update_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_application::AcceptApplication,
    authorize_session::AuthorizeSession, dispatch::Dispatch,
    record_documents_uploaded::RecordDocumentsUploaded,
    reject_application::RejectApplication,
    request_resubmission::RequestResubmission,
    resubmit_application::ResubmitApplication,
    submit_application::SubmitApplication,
    transit_application::TransitApplication, update_profile::UpdateProfile,
};

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::{
            application::{ObjectRef, Status},
            notification::Notice,
        },
        query::{self, notifications},
        testing::{self, Verdict},
        Query as _,
    };

    use super::{
        AcceptApplication, Command as _, RecordDocumentsUploaded,
        RejectApplication, RequestResubmission, ResubmitApplication,
        SubmitApplication,
    };

    #[tokio::test]
    async fn walks_through_whole_lifecycle() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;

        let app = service
            .execute(SubmitApplication {
                applicant_id,
                payload: testing::payload("Mama Put Foods", "Food"),
                submitted_at: DateTime::now().coerce(),
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Accepted1);
        assert_eq!(app.documents, None);

        let app = service
            .execute(RecordDocumentsUploaded {
                application_id: app.id,
                documents: testing::documents(),
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Pending);
        let docs = app.documents.as_ref().unwrap();
        assert_eq!(docs.id_card, ObjectRef::new("documents/id-card.png"));
        assert_eq!(
            docs.business_certificate,
            ObjectRef::new("documents/cac.pdf"),
        );

        let app = service
            .execute(RejectApplication {
                application_id: app.id,
                email_body: None,
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Rejected2);

        let app = service
            .execute(RequestResubmission {
                application_id: app.id,
                email_body: Some("Please fix the business address.".into()),
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Resubmit);

        let mut corrected = testing::payload("Mama Put Foods", "Food");
        corrected.business.address = "9 Broad Street".into();
        let app = service
            .execute(ResubmitApplication {
                applicant_id,
                application_id: app.id,
                payload: corrected,
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Accepted1);
        assert!(app.documents.is_some(), "documents are never deleted");

        let app = service
            .execute(RecordDocumentsUploaded {
                application_id: app.id,
                documents: testing::documents(),
            })
            .await
            .unwrap();
        let app = service
            .execute(AcceptApplication {
                application_id: app.id,
                email_body: None,
            })
            .await
            .unwrap();
        assert_eq!(app.status, Status::Accepted2);

        let stored = service
            .execute(query::application::ById::by(app.id))
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), Some(&app));
        assert_eq!(stored.unwrap().business.address, "9 Broad Street");

        let titles = service
            .execute(notifications::ByApplicant::by(applicant_id))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect::<Vec<_>>();
        assert_eq!(titles.len(), 6);
        assert_eq!(titles[0], Notice::Accepted { email_body: None }.title());
        let subjects = outbox
            .sent()
            .await
            .into_iter()
            .map(|e| e.subject)
            .collect::<Vec<_>>();
        assert_eq!(
            subjects,
            [
                "Loan Application Submitted",
                "Loan Documents Received",
                "Application Rejected",
                "Resubmission Requested",
                "Loan Documents Received",
                "Application Accepted",
            ],
        );
    }
}
