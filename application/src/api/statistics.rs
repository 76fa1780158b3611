//! Statistics of `Application`s.

use common::Percent;
use juniper::GraphQLObject;
use service::{
    domain::application::{Outcome, Status},
    query::statistics::Percentages,
    read::application::{MonthlyCounts, StatusCounts},
};

/// Saturates the provided count into a GraphQL `Int`.
fn int(n: u64) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Numbers of `Application`s by their outcome.
#[derive(Clone, Copy, Debug, GraphQLObject)]
pub struct StatusSummary {
    /// All `Application`s.
    pub total: i32,

    /// `Application`s accepted by a reviewer.
    pub approved: i32,

    /// `Application`s rejected either automatically or by a reviewer.
    pub rejected: i32,

    /// `Application`s still moving through the lifecycle.
    pub pending: i32,

    /// `Application`s awaiting documents.
    pub awaiting_documents: i32,

    /// `Application`s awaiting a review.
    pub awaiting_review: i32,
}

impl From<StatusCounts> for StatusSummary {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total: int(counts.total()),
            approved: int(counts.outcome(Outcome::Approved)),
            rejected: int(counts.outcome(Outcome::Rejected)),
            pending: int(counts.outcome(Outcome::Pending)),
            awaiting_documents: int(counts.of(Status::Accepted1)),
            awaiting_review: int(counts.of(Status::Pending)),
        }
    }
}

/// Shares of `Application` outcomes, in percents.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "StatusPercentages")]
pub struct Shares {
    /// Share of approved `Application`s.
    pub approved: Percent,

    /// Share of rejected `Application`s.
    pub rejected: Percent,

    /// Share of `Application`s still in progress.
    pub pending: Percent,
}

impl From<Percentages> for Shares {
    fn from(p: Percentages) -> Self {
        Self {
            approved: p.approved,
            rejected: p.rejected,
            pending: p.pending,
        }
    }
}

/// Numbers of `Application`s submitted in each month of a year.
#[derive(Clone, Debug, GraphQLObject)]
pub struct MonthlySubmissions {
    /// Year the numbers are of.
    pub year: i32,

    /// Numbers from January to December.
    pub months: Vec<i32>,
}

impl MonthlySubmissions {
    /// Creates new [`MonthlySubmissions`] of the provided `year`.
    #[must_use]
    pub fn new(year: i32, counts: &MonthlyCounts) -> Self {
        Self {
            year,
            months: counts.months().iter().copied().map(int).collect(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        domain::application::Status,
        read::application::{MonthlyCounts, StatusCounts},
    };

    use super::{MonthlySubmissions, StatusSummary};

    #[test]
    fn summarizes_by_outcome() {
        let summary = StatusSummary::from(
            [
                (Status::Accepted1, 1),
                (Status::Pending, 2),
                (Status::Accepted2, 3),
                (Status::Rejected1, 1),
            ]
            .into_iter()
            .collect::<StatusCounts>(),
        );

        assert_eq!(summary.total, 7);
        assert_eq!(summary.approved, 3);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.pending, 3);
        assert_eq!(summary.awaiting_review, 2);
    }

    #[test]
    fn lists_twelve_months() {
        let mut counts = MonthlyCounts::default();
        counts.add(3, 4);

        let monthly = MonthlySubmissions::new(2024, &counts);

        assert_eq!(monthly.months.len(), 12);
        assert_eq!(monthly.months[2], 4);
    }
}
