//! [`Command`] for moving an [`Application`] through its lifecycle.

use std::convert::Infallible;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        applicant::{self, Completeness, Field},
        application::{
            self, Attachment, Event, EventKind, PayloadField, Rewrite,
            Status, Transition,
        },
        notification::Notice,
        Application, Profile,
    },
    infra::{database, Database},
    Service,
};

use super::{Command, Dispatch};

/// [`Command`] applying an [`Event`] to an existing [`Application`].
///
/// This is the only way the [`Status`] of a stored [`Application`] changes.
#[derive(Clone, Debug)]
pub struct TransitApplication {
    /// ID of the [`Application`] to transit.
    pub application_id: application::Id,

    /// [`Event`] to apply.
    pub event: Event,

    /// Email body written by a reviewer, if any.
    pub email_body: Option<String>,
}

impl<Db, El, Ml> Command<TransitApplication> for Service<Db, El, Ml>
where
    Db: Database<
            Select<By<Option<Application>, application::Id>>,
            Ok = Option<Application>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Profile>, applicant::Id>>,
            Ok = Option<Profile>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Update<Transition>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Attachment>, Err = Traced<database::Error>>
        + Database<Update<Rewrite>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Self: Command<Dispatch, Ok = (), Err = Infallible>,
{
    type Ok = Application;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TransitApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TransitApplication {
            application_id,
            event,
            email_body,
        } = cmd;
        let kind = event.kind();

        let mut app = self
            .database()
            .execute(Select(By::<Option<Application>, _>::new(
                application_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())?;

        if let Event::UploadDocuments(docs) = &event {
            if !docs.is_complete() {
                return Err(tracerr::new!(E::DocumentsIncomplete(
                    application_id
                )));
            }
        }
        if let Event::Resubmit(payload) = &event {
            let blank = payload.blank_fields();
            if !blank.is_empty() {
                return Err(tracerr::new!(E::InvalidPayload(blank)));
            }
        }
        let to = event
            .next(app.status)
            .ok_or(E::GuardViolation {
                application_id,
                status: app.status,
                event: kind,
            })
            .map_err(tracerr::wrap!())?;

        let mut attachment = None;
        let mut rewrite = None;
        match event {
            Event::UploadDocuments(documents) => {
                attachment = Some(Attachment {
                    application_id,
                    documents,
                });
            }
            Event::Resubmit(payload) => {
                // Live profile, not the snapshot taken on submission.
                let profile = self
                    .database()
                    .execute(Select(By::<Option<Profile>, _>::new(
                        app.applicant_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let profile = Completeness::require(profile)
                    .map_err(E::ProfileIncomplete)
                    .map_err(tracerr::wrap!())?;
                rewrite = Some(app.rewrite(&profile, *payload));
            }
            Event::Accept | Event::Reject | Event::RequestResubmission => {}
        }

        let now = DateTime::now();
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Status is compared again at write time, so a concurrent transition
        // makes this one lose instead of overwriting it.
        let applied = tx
            .execute(Update(Transition {
                application_id,
                from: app.status,
                to,
                at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !applied {
            return Err(tracerr::new!(E::GuardViolation {
                application_id,
                status: app.status,
                event: kind,
            }));
        }

        if let Some(attachment) = &attachment {
            tx.execute(Insert(attachment.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }
        if let Some(rewrite) = &rewrite {
            tx.execute(Update(rewrite.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            %application_id,
            "`Application` moved from `{}` to `{to}` on {kind}",
            app.status,
        );

        app.status = to;
        app.updated_at = now.coerce();
        if let Some(Attachment { documents, .. }) = attachment {
            app.documents = Some(documents);
        }
        if let Some(rewrite) = rewrite {
            app.personal = rewrite.personal;
            app.business = rewrite.business;
            app.finance = rewrite.finance;
            app.challenge = rewrite.challenge;
            app.loan = rewrite.loan;
            app.regulatory = rewrite.regulatory;
        }

        let notice = match kind {
            EventKind::DocumentsUpload => Some(Notice::DocumentsReceived),
            EventKind::Acceptance => Some(Notice::Accepted { email_body }),
            EventKind::Rejection => Some(Notice::Rejected { email_body }),
            EventKind::ResubmissionRequest => {
                Some(Notice::ResubmissionRequested { email_body })
            }
            EventKind::Resubmission => None,
        };
        if let Some(notice) = notice {
            self.execute(Dispatch::new(&app, notice))
                .await
                .unwrap_or_else(|e| match e {});
        }

        Ok(app)
    }
}

/// Error of [`TransitApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Application`] with the provided ID does not exist.
    #[display("`Application(id: {_0})` does not exist")]
    #[from(ignore)]
    ApplicationNotExists(#[error(not(source))] application::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Uploaded documents miss a required object.
    #[display("Documents of `Application(id: {_0})` are incomplete")]
    #[from(ignore)]
    DocumentsIncomplete(#[error(not(source))] application::Id),

    /// Current [`Status`] doesn't allow the [`Event`].
    #[display(
        "`Application(id: {application_id})` in `{status}` status doesn't \
         allow {event}"
    )]
    #[from(ignore)]
    GuardViolation {
        /// ID of the [`Application`].
        application_id: application::Id,

        /// [`Status`] the [`Application`] was seen in.
        status: Status,

        /// Kind of the rejected [`Event`].
        event: EventKind,
    },

    /// Resubmitted [`Payload`] has blank [`PayloadField`]s.
    ///
    /// [`Payload`]: application::Payload
    #[display("Payload misses required fields: {_0:?}")]
    #[from(ignore)]
    InvalidPayload(#[error(not(source))] Vec<PayloadField>),

    /// [`Profile`] misses required [`Field`]s.
    #[display("`Profile` misses required fields: {_0:?}")]
    #[from(ignore)]
    ProfileIncomplete(#[error(not(source))] Vec<Field>),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::TransitApplication,
        domain::application::{Event, EventKind, Status},
        testing::{self, Verdict},
        Command as _,
    };

    use super::ExecutionError;

    #[tokio::test]
    async fn rejects_unknown_transition_without_writes() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;

        let err = service
            .execute(TransitApplication {
                application_id: app.id,
                event: Event::Accept,
                email_body: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::GuardViolation {
                status: Status::Accepted1,
                event: EventKind::Acceptance,
                ..
            },
        ));
        assert_eq!(testing::reload(&service, app.id).await, app);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn upload_needs_both_documents() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        let mut docs = testing::documents();
        docs.business_certificate = None;

        let err = service
            .execute(TransitApplication {
                application_id: app.id,
                event: Event::UploadDocuments(docs),
                email_body: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DocumentsIncomplete(id) if *id == app.id,
        ));
        assert_eq!(testing::reload(&service, app.id).await.documents, None);
    }

    #[tokio::test]
    async fn commit_failure_leaves_status_untouched() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let app = testing::application(&service).await;
        service.database().reject_commits(true);

        let err = service
            .execute(TransitApplication {
                application_id: app.id,
                event: Event::UploadDocuments(testing::documents()),
                email_body: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        let stored = testing::reload(&service, app.id).await;
        assert_eq!(stored.status, Status::Accepted1);
        assert_eq!(stored.documents, None);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn one_of_racing_reviews_wins() {
        let (service, _) = testing::service(Verdict::Eligible);
        let app = testing::with_status(&service, Status::Pending).await;
        let review = |event| {
            service.execute(TransitApplication {
                application_id: app.id,
                event,
                email_body: None,
            })
        };

        let (accepted, rejected) =
            tokio::join!(review(Event::Accept), review(Event::Reject));

        let (winner, loser) = match (accepted, rejected) {
            (Ok(app), Err(e)) | (Err(e), Ok(app)) => (app, e),
            (Ok(_), Ok(_)) => panic!("both reviews applied"),
            (Err(a), Err(r)) => panic!("both reviews failed: {a}, {r}"),
        };
        assert!(matches!(
            loser.as_ref(),
            ExecutionError::GuardViolation {
                event: EventKind::Acceptance | EventKind::Rejection,
                ..
            },
        ));
        let stored = testing::reload(&service, app.id).await;
        assert_eq!(stored.status, winner.status);
    }
}
