//! [`Command`] for submitting a new [`Application`].

use std::convert::Infallible;

use common::operations::{
    By, Commit, Evaluate, Insert, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        applicant::{self, Completeness, Field},
        application::{
            Cooldown, Decision, Payload, PayloadField, Status,
            SubmissionDateTime,
        },
        notification::Notice,
        Application, Profile,
    },
    infra::{
        database,
        eligibility::{self, Questionnaire},
        Database, Eligibility,
    },
    read::application::SameBusiness,
    Service,
};
#[cfg(doc)]
use crate::domain::Applicant;

use super::{Command, Dispatch};

/// [`Command`] for submitting a new [`Application`].
///
/// The [`Payload`] and the [`Applicant`]'s profile are checked first, then
/// recent submissions for the same business, and only then the
/// [`Eligibility`] scorer is asked.
#[derive(Clone, Debug)]
pub struct SubmitApplication {
    /// ID of the [`Applicant`] submitting the [`Application`].
    pub applicant_id: applicant::Id,

    /// Submitted [`Payload`].
    pub payload: Payload,

    /// [`SubmissionDateTime`] of the [`Application`].
    pub submitted_at: SubmissionDateTime,
}

impl<Db, El, Ml> Command<SubmitApplication> for Service<Db, El, Ml>
where
    Db: Database<
            Select<By<Option<Profile>, applicant::Id>>,
            Ok = Option<Profile>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<SubmissionDateTime>, SameBusiness>>,
            Ok = Option<SubmissionDateTime>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Application>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    El: Eligibility<
        Evaluate<Questionnaire>,
        Ok = Decision,
        Err = Traced<eligibility::Error>,
    >,
    Self: Command<Dispatch, Ok = (), Err = Infallible>,
{
    type Ok = Application;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitApplication {
            applicant_id,
            payload,
            submitted_at,
        } = cmd;

        let blank = payload.blank_fields();
        if !blank.is_empty() {
            return Err(tracerr::new!(E::InvalidPayload(blank)));
        }

        let profile = self
            .database()
            .execute(Select(By::<Option<Profile>, _>::new(applicant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let profile = Completeness::require(profile)
            .map_err(E::ProfileIncomplete)
            .map_err(tracerr::wrap!())?;

        let last = self
            .database()
            .execute(Select(By::<Option<SubmissionDateTime>, _>::new(
                SameBusiness {
                    applicant_id,
                    name: payload.business.name.clone(),
                    industry: payload.business.industry.clone(),
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let months = self.config().cooldown_months;
        if let Cooldown::Blocked { until } =
            Cooldown::check(last, submitted_at, months)
        {
            return Err(tracerr::new!(E::DuplicateWithinCooldown { until }));
        }

        let decision = self
            .eligibility()
            .execute(Evaluate(Questionnaire::from(&payload)))
            .await
            .unwrap_or_else(|e| {
                log::warn!(
                    %applicant_id,
                    "eligibility scorer failed, treating as ineligible: {e}",
                );
                Decision::Ineligible
            });

        let app = Application::new(&profile, payload, decision, submitted_at);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(app.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            application_id = %app.id,
            %applicant_id,
            "`Application` submitted as `{}`",
            app.status,
        );

        let notice = match app.status {
            Status::Rejected1 => Notice::AutoRejected,
            Status::Accepted1
            | Status::Pending
            | Status::Accepted2
            | Status::Rejected2
            | Status::Resubmit => Notice::Submitted,
        };
        self.execute(Dispatch::new(&app, notice))
            .await
            .unwrap_or_else(|e| match e {});

        Ok(app)
    }
}

/// Error of [`SubmitApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Same business was submitted too recently.
    #[display(
        "Same business was submitted recently, next submission is allowed \
         since {}",
        until.to_rfc3339()
    )]
    #[from(ignore)]
    DuplicateWithinCooldown {
        /// [`SubmissionDateTime`] since which the submission is allowed.
        until: SubmissionDateTime,
    },

    /// Profile misses required [`Field`]s.
    #[display("Profile misses required fields: {_0:?}")]
    #[from(ignore)]
    ProfileIncomplete(#[error(not(source))] Vec<Field>),

    /// Required [`Payload`] fields are blank.
    #[display("Payload misses required fields: {_0:?}")]
    #[from(ignore)]
    InvalidPayload(#[error(not(source))] Vec<PayloadField>),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Select},
        DateTime,
    };

    use crate::{
        domain::{
            applicant::{self, Field},
            application::{PayloadField, Status},
            Notification,
        },
        infra::Database as _,
        read::application::Summary,
        testing::{self, Verdict},
        Command as _,
    };

    use super::{ExecutionError, SubmitApplication};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn submission(applicant_id: applicant::Id) -> SubmitApplication {
        SubmitApplication {
            applicant_id,
            payload: testing::payload("Mama Put Foods", "Food"),
            submitted_at: DateTime::from_rfc3339("2023-01-01T09:00:00Z")
                .unwrap()
                .coerce(),
        }
    }

    #[tokio::test]
    async fn eligible_submission_awaits_documents() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;

        let app = service.execute(submission(applicant_id)).await.unwrap();

        assert_eq!(app.status, Status::Accepted1);
        assert_eq!(app.documents, None);
        assert_eq!(testing::reload(&service, app.id).await, app);
        assert_eq!(app.personal.full_name(), "Amaka Obi Chioma");

        let stored = service
            .database()
            .execute(Select(By::<Vec<Notification>, _>::new(applicant_id)))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Loan Application Submitted");
        assert_eq!(stored[0].application_id, app.id);
        assert_eq!(outbox.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn ineligible_submission_is_rejected() {
        let (service, outbox) = testing::service(Verdict::Ineligible);
        let applicant_id = testing::applicant(&service).await;

        let app = service.execute(submission(applicant_id)).await.unwrap();

        assert_eq!(app.status, Status::Rejected1);
        assert_eq!(
            outbox.sent().await[0].subject,
            "Loan Application Rejected",
        );
    }

    #[tokio::test]
    async fn unreachable_scorer_fails_closed() {
        let (service, _) = testing::service(Verdict::Unreachable);
        let applicant_id = testing::applicant(&service).await;

        let app = service.execute(submission(applicant_id)).await.unwrap();

        assert_eq!(app.status, Status::Rejected1);
        assert_eq!(
            testing::reload(&service, app.id).await.status,
            Status::Rejected1,
        );
    }

    #[tokio::test]
    async fn incomplete_profile_is_refused() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;
        let mut profile = testing::profile(applicant_id);
        profile.date_of_birth = "\t".into();
        testing::store_profile(&service, profile).await;

        let err = service
            .execute(submission(applicant_id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ProfileIncomplete(f) if f == &[Field::DateOfBirth],
        ));
        assert_eq!(service.eligibility().calls(), 0);
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn blank_payload_is_refused_before_scoring() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;
        let mut cmd = submission(applicant_id);
        cmd.payload = testing::payload("", "  ");

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidPayload(f)
                if f == &[
                    PayloadField::BusinessName,
                    PayloadField::BusinessIndustry,
                ],
        ));
        assert_eq!(service.eligibility().calls(), 0);
        assert!(outbox.sent().await.is_empty());
        assert!(service
            .database()
            .execute(Select(By::<Vec<Summary>, _>::new(applicant_id)))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_profile_is_refused() {
        let (service, _) = testing::service(Verdict::Eligible);

        let err = service
            .execute(submission(applicant::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ProfileIncomplete(f) if f == Field::REQUIRED,
        ));
    }

    #[tokio::test]
    async fn same_business_waits_three_calendar_months() {
        let (service, _) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;
        let first = submission(applicant_id);
        let at = first.submitted_at;
        drop(service.execute(first).await.unwrap());

        let mut early = submission(applicant_id);
        early.submitted_at = at + DAY * 89;
        let err = service.execute(early).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateWithinCooldown { until }
                if until.to_rfc3339() == "2023-04-01T09:00:00Z",
        ));
        assert_eq!(service.eligibility().calls(), 1);

        let mut late = submission(applicant_id);
        late.submitted_at = at + DAY * 91;
        drop(service.execute(late).await.unwrap());
    }

    #[tokio::test]
    async fn other_business_is_not_a_duplicate() {
        let (service, _) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;
        drop(service.execute(submission(applicant_id)).await.unwrap());

        let mut other = submission(applicant_id);
        other.payload.business.industry = "food".into();

        drop(service.execute(other).await.unwrap());
    }

    #[tokio::test]
    async fn commit_failure_leaves_no_application() {
        let (service, outbox) = testing::service(Verdict::Eligible);
        let applicant_id = testing::applicant(&service).await;
        service.database().reject_commits(true);

        let err = service
            .execute(submission(applicant_id))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        service.database().reject_commits(false);
        assert!(testing::applications_of(&service, applicant_id)
            .await
            .is_empty());
        assert!(outbox.sent().await.is_empty());
    }
}
