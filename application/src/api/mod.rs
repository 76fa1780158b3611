//! GraphQL API definitions.

pub mod applicant;
pub mod application;
mod mutation;
pub mod notification;
mod query;
pub mod scalar;
pub mod statistics;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    applicant::Profile, application::Application, mutation::Mutation,
    notification::Notification, query::Query,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Only reviewers may perform this operation"]
        Admin,
    }
}
