//! [`Application`] read models.

use std::collections::HashMap;

use derive_more::{From, Into};

use crate::domain::{
    applicant,
    application::{self, Outcome, Status},
    Application,
};
#[cfg(doc)]
use crate::domain::Applicant;

/// Short representation of an [`Application`] used in listings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// ID of the [`Application`].
    pub id: application::Id,

    /// ID of the [`Applicant`] who submitted the [`Application`].
    pub applicant_id: applicant::Id,

    /// Current [`Status`] of the [`Application`].
    pub status: Status,

    /// When the [`Application`] was submitted.
    pub submitted_at: application::SubmissionDateTime,

    /// Name of the business the loan is asked for.
    pub business_name: String,

    /// Industry of the business the loan is asked for.
    pub business_industry: String,

    /// Full name of the [`Applicant`], as captured on submission.
    pub applicant_name: String,
}

impl From<&Application> for Summary {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id,
            applicant_id: app.applicant_id,
            status: app.status,
            submitted_at: app.submitted_at,
            business_name: app.business.name.clone(),
            business_industry: app.business.industry.clone(),
            applicant_name: app.personal.full_name(),
        }
    }
}

/// Selector of the latest [`Application`] submitted by an [`Applicant`] for
/// the same business.
///
/// Business name and industry are matched exactly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SameBusiness {
    /// ID of the [`Applicant`].
    pub applicant_id: applicant::Id,

    /// Name of the business.
    pub name: String,

    /// Industry of the business.
    pub industry: String,
}

/// Number of [`Application`]s per [`Status`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusCounts(HashMap<Status, u64>);

impl StatusCounts {
    /// Returns the number of [`Application`]s having the provided [`Status`].
    #[must_use]
    pub fn of(&self, status: Status) -> u64 {
        self.0.get(&status).copied().unwrap_or_default()
    }

    /// Returns the number of [`Application`]s falling into the provided
    /// [`Outcome`].
    #[must_use]
    pub fn outcome(&self, outcome: Outcome) -> u64 {
        self.0
            .iter()
            .filter(|(s, _)| s.outcome() == outcome)
            .map(|(_, n)| n)
            .sum()
    }

    /// Returns the total number of [`Application`]s.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl FromIterator<(Status, u64)> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = (Status, u64)>>(iter: I) -> Self {
        let mut counts = HashMap::new();
        for (status, n) in iter {
            *counts.entry(status).or_default() += n;
        }
        Self(counts)
    }
}

/// Calendar year to aggregate [`Application`]s of.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct Year(i32);

/// Number of [`Application`]s submitted in each month of a [`Year`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MonthlyCounts([u64; 12]);

impl MonthlyCounts {
    /// Adds `n` [`Application`]s to the provided `month` (`1..=12`).
    ///
    /// Months out of range are ignored.
    pub fn add(&mut self, month: u8, n: u64) {
        if let Some(slot) = usize::from(month)
            .checked_sub(1)
            .and_then(|i| self.0.get_mut(i))
        {
            *slot += n;
        }
    }

    /// Returns the counts from January to December.
    #[must_use]
    pub const fn months(&self) -> &[u64; 12] {
        &self.0
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::application::{Outcome, Status};

    use super::{MonthlyCounts, StatusCounts};

    #[test]
    fn groups_counts_by_outcome() {
        let counts = [
            (Status::Accepted1, 2),
            (Status::Rejected1, 1),
            (Status::Pending, 3),
            (Status::Accepted2, 4),
            (Status::Rejected2, 1),
        ]
        .into_iter()
        .collect::<StatusCounts>();

        assert_eq!(counts.total(), 11);
        assert_eq!(counts.outcome(Outcome::Approved), 4);
        assert_eq!(counts.outcome(Outcome::Rejected), 2);
        assert_eq!(counts.outcome(Outcome::Pending), 5);
        assert_eq!(counts.of(Status::Resubmit), 0);
    }

    #[test]
    fn ignores_months_out_of_range() {
        let mut counts = MonthlyCounts::default();
        counts.add(1, 2);
        counts.add(12, 1);
        counts.add(0, 5);
        counts.add(13, 5);

        assert_eq!(counts.months(), &[2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
