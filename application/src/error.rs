//! [`Error`]-related definitions.

use std::fmt;

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::infra::database;
#[cfg(doc)]
use service::domain::applicant::Field;
use tracerr::{Trace, Traced};

/// Defines a new error type convertible into an API [`Error`].
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self::new(
                            $code,
                            ::http::StatusCode::$status_code,
                            $message,
                        ),
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Stable [`Code`] of this [`Error`].
    pub code: Code,

    /// [`http::StatusCode`] of the response carrying this [`Error`].
    pub status_code: http::StatusCode,

    /// Trace of the place this [`Error`] originates from.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// Human-readable message.
    pub message: String,

    /// Names of the input fields this [`Error`] is about.
    pub fields: Vec<String>,
}

impl Error {
    /// Creates a new [`Error`] without a backtrace.
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            backtrace: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }

    /// Attaches the provided input fields (like profile [`Field`]s) to this
    /// [`Error`].
    #[must_use]
    pub fn with_fields<F: fmt::Display>(mut self, fields: &[F]) -> Self {
        self.fields = fields.iter().map(ToString::to_string).collect();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            fields,
        } = self;

        write!(f, "[{code}]: {message}")?;
        if !fields.is_empty() {
            write!(f, " ({})", fields.iter().join(", "))?;
        }
        write!(
            f,
            "{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(3);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        if !self.fields.is_empty() {
            drop(
                ext.add_field(
                    "fields",
                    juniper::Value::list(
                        self.fields
                            .into_iter()
                            .map(juniper::Value::scalar)
                            .collect(),
                    ),
                ),
            );
        }
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type has no client-facing meaning, so it
    /// becomes an internal server error.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(
            "BAD_REQUEST",
            http::StatusCode::BAD_REQUEST,
            self.to_string(),
        ))
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, IntoFieldError};
    use service::domain::applicant::Field;

    use super::Error;

    #[test]
    fn lists_fields_in_extensions() {
        let err = Error::new(
            "PROFILE_INCOMPLETE",
            http::StatusCode::UNPROCESSABLE_ENTITY,
            "Profile is incomplete",
        )
        .with_fields(&[Field::Lga, Field::DateOfBirth]);

        assert_eq!(
            err.to_string(),
            "[PROFILE_INCOMPLETE]: Profile is incomplete (lga, dateOfBirth)",
        );

        let field = IntoFieldError::<DefaultScalarValue>::into_field_error(err);
        let ext = field.extensions().as_object_value().unwrap();
        assert_eq!(
            ext.get_field_value("code").and_then(|v| v.as_string_value()),
            Some("PROFILE_INCOMPLETE"),
        );
        assert_eq!(
            ext.get_field_value("fields")
                .and_then(|v| v.as_list_value())
                .map(Vec::len),
            Some(2),
        );
    }
}
