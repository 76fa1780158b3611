//! [`Query`] collection related to a single [`Application`].

use common::operations::By;

use crate::domain::{application, Application};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Application`] with all its records by its
/// [`application::Id`].
pub type ById = DatabaseQuery<By<Option<Application>, application::Id>>;
