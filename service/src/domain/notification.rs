//! [`Notification`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{applicant, application};
#[cfg(doc)]
use crate::domain::{Applicant, Application};

/// Message stored for an [`Applicant`]. Never modified once created.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the [`Applicant`] this [`Notification`] is addressed to.
    pub applicant_id: applicant::Id,

    /// ID of the [`Application`] this [`Notification`] is about.
    pub application_id: application::Id,

    /// Title of this [`Notification`].
    pub title: String,

    /// Body of this [`Notification`].
    pub body: String,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Notification`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Sign-off closing every outgoing email.
const SIGN_OFF: &str = "Best regards,\nLoan Application Team";

/// Notice issued to an applicant after a lifecycle transition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// Automated screening declined the application.
    AutoRejected,

    /// Application passed automated screening and awaits documents.
    Submitted,

    /// Documents were received and the application awaits review.
    DocumentsReceived,

    /// Reviewer accepted the application.
    Accepted {
        /// Email body written by the reviewer, if any.
        email_body: Option<String>,
    },

    /// Reviewer rejected the application.
    Rejected {
        /// Email body written by the reviewer, if any.
        email_body: Option<String>,
    },

    /// Reviewer asked for a resubmission.
    ResubmissionRequested {
        /// Email body written by the reviewer, if any.
        email_body: Option<String>,
    },
}

impl Notice {
    /// Returns the title of the stored [`Notification`].
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::AutoRejected | Self::Rejected { .. } => {
                "Loan Application Rejected"
            }
            Self::Submitted => "Loan Application Submitted",
            Self::DocumentsReceived => "Loan Documents Received",
            Self::Accepted { .. } => "Loan Application Accepted",
            Self::ResubmissionRequested { .. } => {
                "Loan Application Resubmission Requested"
            }
        }
    }

    /// Returns the body of the stored [`Notification`].
    #[must_use]
    pub fn body(&self, first_name: &str) -> String {
        format!("Dear {first_name}, {}", self.summary())
    }

    /// Returns the subject of the outgoing email.
    #[must_use]
    pub const fn email_subject(&self) -> &'static str {
        match self {
            Self::AutoRejected | Self::Submitted | Self::DocumentsReceived => {
                self.title()
            }
            Self::Accepted { .. } => "Application Accepted",
            Self::Rejected { .. } => "Application Rejected",
            Self::ResubmissionRequested { .. } => "Resubmission Requested",
        }
    }

    /// Returns the text of the outgoing email.
    ///
    /// A reviewer-written body is sent verbatim.
    #[must_use]
    pub fn email_text(&self, first_name: &str) -> String {
        match self {
            Self::Accepted {
                email_body: Some(text),
            }
            | Self::Rejected {
                email_body: Some(text),
            }
            | Self::ResubmissionRequested {
                email_body: Some(text),
            } if !text.trim().is_empty() => text.clone(),
            Self::AutoRejected
            | Self::Submitted
            | Self::DocumentsReceived
            | Self::Accepted { .. }
            | Self::Rejected { .. }
            | Self::ResubmissionRequested { .. } => {
                let mut summary = self.summary().to_owned();
                if let Some(first) = summary.get_mut(..1) {
                    first.make_ascii_uppercase();
                }
                format!("Dear {first_name},\n\n{summary}\n\n{SIGN_OFF}")
            }
        }
    }

    /// Returns the sentence describing what happened to the application.
    const fn summary(&self) -> &'static str {
        match self {
            Self::AutoRejected => {
                "your loan application has been rejected based on the \
                 eligibility criteria."
            }
            Self::Submitted => {
                "your loan application has been submitted successfully. \
                 Please proceed to upload your documents."
            }
            Self::DocumentsReceived => {
                "your documents have been received and your loan application \
                 is now pending review."
            }
            Self::Accepted { .. } => {
                "your loan application has been accepted. Please check your \
                 email for further steps."
            }
            Self::Rejected { .. } => {
                "your loan application has been rejected. Please check your \
                 email for further details."
            }
            Self::ResubmissionRequested { .. } => {
                "your loan application has been marked for resubmission. \
                 Please check your email for clarification and proceed to \
                 resubmit your application details."
            }
        }
    }
}

/// [`DateTime`] when a [`Notification`] was created.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Notice;

    #[test]
    fn stored_body_addresses_applicant() {
        assert_eq!(
            Notice::AutoRejected.body("Amaka"),
            "Dear Amaka, your loan application has been rejected based on \
             the eligibility criteria.",
        );
    }

    #[test]
    fn default_email_is_signed() {
        assert_eq!(
            Notice::Submitted.email_text("Amaka"),
            "Dear Amaka,\n\nYour loan application has been submitted \
             successfully. Please proceed to upload your documents.\n\n\
             Best regards,\nLoan Application Team",
        );
    }

    #[test]
    fn reviewer_body_is_sent_verbatim() {
        let notice = Notice::Accepted {
            email_body: Some("Visit the branch on Monday.".into()),
        };
        assert_eq!(notice.email_subject(), "Application Accepted");
        assert_eq!(notice.email_text("Amaka"), "Visit the branch on Monday.");

        let blank = Notice::Rejected {
            email_body: Some("  ".into()),
        };
        assert!(blank.email_text("Amaka").starts_with("Dear Amaka,\n\n"));
    }
}
