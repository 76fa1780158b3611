//! `Notification`-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{GraphQLObject, GraphQLScalar};
use service::domain::{self, notification};
use uuid::Uuid;

use crate::api;

/// Unique identifier of a `Notification`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(notification::Id)]
#[into(notification::Id)]
#[graphql(name = "NotificationId", transparent)]
pub struct Id(Uuid);

/// Message left to an `Applicant` after their `Application` changed.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Notification {
    /// Unique identifier of this `Notification`.
    pub id: Id,

    /// `Application` this `Notification` is about.
    pub application_id: api::application::Id,

    /// Short title.
    pub title: String,

    /// Text addressed to the `Applicant`.
    pub body: String,

    /// `DateTime` when this `Notification` was created.
    pub created_at: DateTime,
}

impl From<domain::Notification> for Notification {
    fn from(n: domain::Notification) -> Self {
        Self {
            id: n.id.into(),
            application_id: n.application_id.into(),
            title: n.title,
            body: n.body,
            created_at: n.created_at.coerce(),
        }
    }
}
