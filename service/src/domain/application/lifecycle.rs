//! Lifecycle state machine of an [`Application`].
//!
//! [`Status::after()`] is the single table of allowed transitions. Every
//! status change goes through it.
//!
//! [`Application`]: super::Application

use derive_more::Display;

use super::{Documents, Payload, Status};

/// Event moving an [`Application`] between [`Status`]es.
///
/// [`Application`]: super::Application
#[derive(Clone, Debug)]
pub enum Event {
    /// Applicant uploaded the required [`Documents`].
    UploadDocuments(Documents),

    /// Reviewer accepted the application.
    Accept,

    /// Reviewer rejected the application.
    Reject,

    /// Reviewer sent the application back for correction.
    RequestResubmission,

    /// Applicant resubmitted a corrected [`Payload`].
    Resubmit(Box<Payload>),
}

impl Event {
    /// Returns [`EventKind`] of this [`Event`].
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::UploadDocuments(_) => EventKind::DocumentsUpload,
            Self::Accept => EventKind::Acceptance,
            Self::Reject => EventKind::Rejection,
            Self::RequestResubmission => EventKind::ResubmissionRequest,
            Self::Resubmit(_) => EventKind::Resubmission,
        }
    }

    /// Returns the [`Status`] this [`Event`] leads to from the provided one.
    ///
    /// [`None`] means the guard of the transition doesn't hold.
    #[must_use]
    pub fn next(&self, status: Status) -> Option<Status> {
        if let Self::UploadDocuments(docs) = self {
            if !docs.is_complete() {
                return None;
            }
        }
        status.after(self.kind())
    }
}

/// Kind of an [`Event`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum EventKind {
    /// [`Event::UploadDocuments`].
    #[display("documents upload")]
    DocumentsUpload,

    /// [`Event::Accept`].
    #[display("acceptance")]
    Acceptance,

    /// [`Event::Reject`].
    #[display("rejection")]
    Rejection,

    /// [`Event::RequestResubmission`].
    #[display("resubmission request")]
    ResubmissionRequest,

    /// [`Event::Resubmit`].
    #[display("resubmission")]
    Resubmission,
}

impl EventKind {
    /// Every [`EventKind`].
    pub const ALL: &'static [Self] = &[
        Self::DocumentsUpload,
        Self::Acceptance,
        Self::Rejection,
        Self::ResubmissionRequest,
        Self::Resubmission,
    ];
}

impl Status {
    /// Returns the [`Status`] reached from this one by the provided
    /// [`EventKind`], if the transition exists.
    #[must_use]
    pub const fn after(self, event: EventKind) -> Option<Self> {
        use EventKind as E;

        match (self, event) {
            (Self::Accepted1, E::DocumentsUpload) => Some(Self::Pending),
            (Self::Pending, E::Acceptance) => Some(Self::Accepted2),
            (Self::Pending, E::Rejection) => Some(Self::Rejected2),
            (
                Self::Accepted1
                | Self::Rejected1
                | Self::Pending
                | Self::Accepted2
                | Self::Rejected2,
                E::ResubmissionRequest,
            ) => Some(Self::Resubmit),
            (Self::Resubmit, E::Resubmission) => Some(Self::Accepted1),

            (
                Self::Rejected1
                | Self::Pending
                | Self::Accepted2
                | Self::Rejected2
                | Self::Resubmit,
                E::DocumentsUpload,
            )
            | (
                Self::Accepted1
                | Self::Rejected1
                | Self::Accepted2
                | Self::Rejected2
                | Self::Resubmit,
                E::Acceptance | E::Rejection,
            )
            | (Self::Resubmit, E::ResubmissionRequest)
            | (
                Self::Accepted1
                | Self::Rejected1
                | Self::Pending
                | Self::Accepted2
                | Self::Rejected2,
                E::Resubmission,
            ) => None,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::application::{Documents, ObjectRef};

    use super::{Event, EventKind, Status};

    fn documents(complete: bool) -> Documents {
        Documents {
            id_card: ObjectRef::new("ids/card.png"),
            business_certificate: complete
                .then(|| ObjectRef::new("certs/cac.pdf"))
                .flatten(),
            registration_number: "RC-100200".into(),
            uploaded_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn only_listed_transitions_exist() {
        use EventKind as E;
        use Status as S;

        let allowed = [
            (S::Accepted1, E::DocumentsUpload, S::Pending),
            (S::Pending, E::Acceptance, S::Accepted2),
            (S::Pending, E::Rejection, S::Rejected2),
            (S::Accepted1, E::ResubmissionRequest, S::Resubmit),
            (S::Rejected1, E::ResubmissionRequest, S::Resubmit),
            (S::Pending, E::ResubmissionRequest, S::Resubmit),
            (S::Accepted2, E::ResubmissionRequest, S::Resubmit),
            (S::Rejected2, E::ResubmissionRequest, S::Resubmit),
            (S::Resubmit, E::Resubmission, S::Accepted1),
        ];

        for &status in Status::ALL {
            for &event in EventKind::ALL {
                let expected = allowed
                    .iter()
                    .find(|(s, e, _)| *s == status && *e == event)
                    .map(|(_, _, to)| *to);
                assert_eq!(
                    status.after(event),
                    expected,
                    "{status} on {event}",
                );
            }
        }
    }

    #[test]
    fn upload_requires_both_documents() {
        assert_eq!(
            Event::UploadDocuments(documents(true)).next(Status::Accepted1),
            Some(Status::Pending),
        );
        assert_eq!(
            Event::UploadDocuments(documents(false)).next(Status::Accepted1),
            None,
        );
    }

    #[test]
    fn terminal_states_only_reopen_by_request() {
        for status in [Status::Rejected1, Status::Accepted2, Status::Rejected2]
        {
            for &event in EventKind::ALL {
                let next = status.after(event);
                if event == EventKind::ResubmissionRequest {
                    assert_eq!(next, Some(Status::Resubmit));
                } else {
                    assert_eq!(next, None, "{status} on {event}");
                }
            }
        }
    }
}
