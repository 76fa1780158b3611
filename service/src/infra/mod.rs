//! Infrastructure layer.

pub mod database;
pub mod eligibility;
pub mod mailer;

#[cfg(any(test, feature = "memory"))]
pub use self::database::{memory, Memory};
pub use self::{database::Database, eligibility::Eligibility, mailer::Mailer};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
