//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Profile` of the authenticated `Applicant`, if filled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myProfile",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_profile(
        ctx: &Context,
    ) -> Result<Option<api::Profile>, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(query::applicant::ProfileById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| p.map(Into::into))
    }

    /// Checks whether the `Profile` of the authenticated `Applicant` allows
    /// submitting an `Application`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "profileCompleteness",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn profile_completeness(
        ctx: &Context,
    ) -> Result<api::applicant::Completeness, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(query::applicant::Completeness {
                applicant_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Application` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `APPLICATION_NOT_EXISTS` - the `Application` with the specified ID
    ///                              does not exist or belongs to another
    ///                              `Applicant`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "application",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn application(
        id: api::application::Id,
        ctx: &Context,
    ) -> Result<api::Application, Error> {
        api::Application::visible(id, ctx).await
    }

    /// Lists `Application`s of the authenticated `Applicant`, latest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myApplications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_applications(
        ctx: &Context,
    ) -> Result<Vec<api::application::Summary>, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(query::applications::ByApplicant::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rows| rows.into_iter().map(Into::into).collect())
    }

    /// Lists `Application`s having the specified status, latest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "applications",
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn applications(
        status: api::application::Status,
        ctx: &Context,
    ) -> Result<Vec<api::application::Summary>, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(query::applications::ByStatus::by(status.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rows| rows.into_iter().map(Into::into).collect())
    }

    /// Returns `Application`s positioned `from..=to` in the order of their
    /// submission.
    ///
    /// Positions start from 1. The tail past the total number of
    /// `Application`s is cut.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_RANGE` - `from` is less than 1 or `to` is less than `from`;
    /// - `OUT_OF_RANGE` - `from` is past the total number of `Application`s;
    /// - `NOT_ADMIN` - the current `Session` may not review applications.
    #[tracing::instrument(
        skip_all,
        fields(
            from = from,
            gql.name = "applicationRows",
            otel.name = Self::SPAN_NAME,
            to = to,
        ),
    )]
    pub async fn application_rows(
        from: i32,
        to: i32,
        ctx: &Context,
    ) -> Result<api::application::Rows, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(query::applications::Rows {
                from: from.into(),
                to: to.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `Notification`s of the authenticated `Applicant`, newest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myNotifications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_notifications(
        ctx: &Context,
    ) -> Result<Vec<api::Notification>, Error> {
        let my_id = ctx.current_session().await?.applicant_id;
        ctx.service()
            .execute(query::notifications::ByApplicant::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ns| ns.into_iter().map(Into::into).collect())
    }

    /// Counts `Application`s by their outcome.
    ///
    /// Reviewers get the numbers of every `Application`, while `Applicant`s
    /// get the numbers of their own ones.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "statusSummary",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn status_summary(
        ctx: &Context,
    ) -> Result<api::statistics::StatusSummary, Error> {
        let session = ctx.current_session().await?;
        let whose = (!session.admin).then(|| session.applicant_id.into());
        ctx.service()
            .execute(query::statistics::Counts::by(whose))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Calculates shares of approved, rejected and pending `Application`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "statusPercentages",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn status_percentages(
        ctx: &Context,
    ) -> Result<api::statistics::Shares, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(query::statistics::Shares)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Counts `Application`s submitted in each month of the specified year.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current `Session` may not review applications.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "monthlySubmissions",
            otel.name = Self::SPAN_NAME,
            year = year,
        ),
    )]
    pub async fn monthly_submissions(
        year: i32,
        ctx: &Context,
    ) -> Result<api::statistics::MonthlySubmissions, Error> {
        _ = ctx.admin_session().await?;
        ctx.service()
            .execute(query::statistics::Monthly::by(
                read::application::Year::from(year),
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|counts| {
                api::statistics::MonthlySubmissions::new(year, &counts)
            })
    }
}

impl AsError for query::applications::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`from` must be positive and not greater than \
                             `to`"]
                InvalidRange,

                #[code = "OUT_OF_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`from` is past the total number of \
                             `Application`s"]
                OutOfRange,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidRange { .. } => Error::InvalidRange.into(),
            Self::OutOfRange { total } => {
                let mut err = crate::Error::from(Error::OutOfRange);
                err.message = format!("{} ({total} in total)", err.message);
                err
            }
        })
    }
}
