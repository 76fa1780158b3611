//! [`Query`] collection related to [`Notification`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Applicant, Query};
use crate::domain::{applicant, Notification};

use super::DatabaseQuery;

/// Queries [`Notification`]s of an [`Applicant`], latest first.
pub type ByApplicant = DatabaseQuery<By<Vec<Notification>, applicant::Id>>;
