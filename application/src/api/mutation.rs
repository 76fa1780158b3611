//! GraphQL [`Mutation`]s definitions.

use common::DateTime;
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Replaces the `Profile` of the authenticated `Applicant`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BLANK_FIELDS` - some of the provided fields are blank, they're
    ///                    listed in the `fields` extension.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProfile",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_profile(
        input: api::applicant::ProfileInput,
        ctx: &Context,
    ) -> Result<api::Profile, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(input.into_command(my_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Submits a new `Application` of the authenticated `Applicant`.
    ///
    /// Eligibility of the `Application` is decided right away, so it's
    /// returned either in `ACCEPTED1` or in `REJECTED1` status.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAYLOAD` - some questionnaire answers are blank, they're
    ///                       listed in the `fields` extension;
    /// - `PROFILE_INCOMPLETE` - the `Profile` misses required fields, they're
    ///                          listed in the `fields` extension;
    /// - `DUPLICATE_SUBMISSION` - the same business was submitted recently.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitApplication",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn submit_application(
        input: api::application::ApplicationInput,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(command::SubmitApplication {
                applicant_id: my_id.into(),
                payload: input.into(),
                submitted_at: DateTime::now().coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records the documents uploaded for an `Application` of the
    /// authenticated `Applicant`.
    ///
    /// Once both the identity card and the business certificate are present,
    /// the `Application` goes to review.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPLICATION_NOT_EXISTS` - the `Applicant` has no `Application` with
    ///                              the specified ID;
    /// - `DOCUMENTS_INCOMPLETE` - some of the required documents or the
    ///                            registration number are missing;
    /// - `STATUS_CONFLICT` - the `Application` doesn't await documents.
    #[tracing::instrument(
        skip_all,
        fields(
            application_id = %application_id,
            gql.name = "uploadDocuments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn upload_documents(
        application_id: api::application::Id,
        documents: api::application::DocumentsInput,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        let application =
            api::Application::visible(application_id, ctx).await?;
        if application.applicant_id() != my_id {
            return Err(api::application::ApplicationError::NotExists.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(command::RecordDocumentsUploaded {
                application_id: application_id.into(),
                documents: documents.into_documents(DateTime::now()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Resubmits an `Application` of the authenticated `Applicant` after a
    /// reviewer asked for it.
    ///
    /// Personal details are captured anew from the current `Profile`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPLICATION_NOT_EXISTS` - the `Applicant` has no `Application` with
    ///                              the specified ID;
    /// - `INVALID_PAYLOAD` - some questionnaire answers are blank;
    /// - `PROFILE_INCOMPLETE` - the `Profile` misses required fields;
    /// - `STATUS_CONFLICT` - the `Application` wasn't asked to be resubmitted.
    #[tracing::instrument(
        skip_all,
        fields(
            application_id = %application_id,
            gql.name = "resubmitApplication",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn resubmit_application(
        application_id: api::application::Id,
        input: api::application::ApplicationInput,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(command::ResubmitApplication {
                applicant_id: my_id.into(),
                application_id: application_id.into(),
                payload: input.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves an `Application` awaiting a review.
    ///
    /// The provided `emailBody` replaces the default text of the email sent
    /// to the `Applicant`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications;
    /// - `APPLICATION_NOT_EXISTS` - no `Application` with the specified ID;
    /// - `STATUS_CONFLICT` - the `Application` doesn't await a review.
    #[tracing::instrument(
        skip_all,
        fields(
            application_id = %application_id,
            gql.name = "acceptApplication",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn accept_application(
        application_id: api::application::Id,
        email_body: Option<String>,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(command::AcceptApplication {
                application_id: application_id.into(),
                email_body,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Rejects an `Application` awaiting a review.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications;
    /// - `APPLICATION_NOT_EXISTS` - no `Application` with the specified ID;
    /// - `STATUS_CONFLICT` - the `Application` doesn't await a review.
    #[tracing::instrument(
        skip_all,
        fields(
            application_id = %application_id,
            gql.name = "rejectApplication",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reject_application(
        application_id: api::application::Id,
        email_body: Option<String>,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(command::RejectApplication {
                application_id: application_id.into(),
                email_body,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Asks the `Applicant` to correct and resubmit an `Application`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications;
    /// - `APPLICATION_NOT_EXISTS` - no `Application` with the specified ID;
    /// - `STATUS_CONFLICT` - the `Application` can't be sent back in its
    ///                       current status.
    #[tracing::instrument(
        skip_all,
        fields(
            application_id = %application_id,
            gql.name = "requestResubmission",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn request_resubmission(
        application_id: api::application::Id,
        email_body: Option<String>,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(command::RequestResubmission {
                application_id: application_id.into(),
                email_body,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ProfileError {
        #[code = "PROFILE_INCOMPLETE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Profile` misses fields required to apply"]
        Incomplete,
    }
}

define_error! {
    enum PayloadError {
        #[code = "INVALID_PAYLOAD"]
        #[status = BAD_REQUEST]
        #[message = "Questionnaire fields must not be blank"]
        Blank,
    }
}

impl AsError for command::update_profile::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BLANK_FIELDS"]
                #[status = BAD_REQUEST]
                #[message = "`Profile` fields must not be blank"]
                BlankFields,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BlankFields(fields) => {
                Some(crate::Error::from(Error::BlankFields).with_fields(fields))
            }
        }
    }
}

impl AsError for command::submit_application::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DUPLICATE_SUBMISSION"]
                #[status = CONFLICT]
                #[message = "Same business was submitted recently"]
                Duplicate,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::DuplicateWithinCooldown { until } => {
                let mut err = crate::Error::from(Error::Duplicate);
                err.message = format!(
                    "{}, next submission is allowed since {}",
                    err.message,
                    until.to_rfc3339(),
                );
                Some(err)
            }
            Self::InvalidPayload(fields) => Some(
                crate::Error::from(PayloadError::Blank).with_fields(fields),
            ),
            Self::ProfileIncomplete(fields) => Some(
                crate::Error::from(ProfileError::Incomplete)
                    .with_fields(fields),
            ),
        }
    }
}

impl AsError for command::transit_application::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DOCUMENTS_INCOMPLETE"]
                #[status = BAD_REQUEST]
                #[message = "Identity card, business certificate and \
                             registration number are all required"]
                DocumentsIncomplete,

                #[code = "STATUS_CONFLICT"]
                #[status = CONFLICT]
                #[message = "`Application` status doesn't allow this"]
                StatusConflict,
            }
        }

        match self {
            Self::ApplicationNotExists(_) => Some(
                api::application::ApplicationError::NotExists.into(),
            ),
            Self::Db(e) => e.try_as_error(),
            Self::DocumentsIncomplete(_) => {
                Some(Error::DocumentsIncomplete.into())
            }
            Self::GuardViolation { status, event, .. } => {
                let mut err = crate::Error::from(Error::StatusConflict);
                err.message = format!(
                    "`Application` in `{status}` status forbids {event}",
                );
                Some(err)
            }
            Self::InvalidPayload(fields) => Some(
                crate::Error::from(PayloadError::Blank).with_fields(fields),
            ),
            Self::ProfileIncomplete(fields) => Some(
                crate::Error::from(ProfileError::Incomplete)
                    .with_fields(fields),
            ),
        }
    }
}

impl AsError for command::resubmit_application::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ApplicationNotExists(_) => Some(
                api::application::ApplicationError::NotExists.into(),
            ),
            Self::Db(e) => e.try_as_error(),
            Self::Transit(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{
            resubmit_application, submit_application, transit_application,
            update_profile,
        },
        domain::{
            applicant::Field,
            application::{self, EventKind, PayloadField, Status},
        },
    };

    use crate::AsError as _;

    #[test]
    fn maps_guard_violation_to_conflict() {
        let err = transit_application::ExecutionError::GuardViolation {
            application_id: application::Id::new(),
            status: Status::Rejected2,
            event: EventKind::Acceptance,
        }
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "STATUS_CONFLICT");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn lists_missing_profile_fields() {
        let err = submit_application::ExecutionError::ProfileIncomplete(vec![
            Field::Lga,
        ])
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "PROFILE_INCOMPLETE");
        assert_eq!(err.fields, ["lga"]);

        let err = update_profile::ExecutionError::BlankFields(vec![
            Field::Phone,
        ])
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "BLANK_FIELDS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
    #[test]
    fn lists_blank_questionnaire_fields() {
        let err = submit_application::ExecutionError::InvalidPayload(vec![
            PayloadField::BusinessName,
            PayloadField::LoanRefusalReason,
        ])
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "INVALID_PAYLOAD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.fields, ["business.name", "loan.refusalReason"]);

        let err = resubmit_application::ExecutionError::Transit(
            transit_application::ExecutionError::InvalidPayload(vec![
                PayloadField::Nin,
            ]),
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "INVALID_PAYLOAD");
        assert_eq!(err.fields, ["nin"]);
    }
}
