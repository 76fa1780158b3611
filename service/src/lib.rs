//! Loan application lifecycle engine.
//!
//! Business rules of submitting, screening and reviewing loan applications.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
#[cfg(test)]
mod testing;

use derive_more::Debug;

#[cfg(doc)]
use crate::infra::{Database, Eligibility, Mailer};

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Length of the duplicate submission window in calendar months.
    pub cooldown_months: u32,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, El, Ml> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Eligibility`] scorer of this [`Service`].
    eligibility: El,

    /// [`Mailer`] of this [`Service`].
    mailer: Ml,
}

impl<Db, El, Ml> Service<Db, El, Ml> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub const fn new(
        config: Config,
        database: Db,
        eligibility: El,
        mailer: Ml,
    ) -> Self {
        Self {
            config,
            database,
            eligibility,
            mailer,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub const fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Eligibility`] scorer of this [`Service`].
    #[must_use]
    pub const fn eligibility(&self) -> &El {
        &self.eligibility
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub const fn mailer(&self) -> &Ml {
        &self.mailer
    }
}
