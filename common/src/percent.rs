//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Floating-point percentage.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided value is
    /// within `0..=100` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Calculates which [`Percent`] the `part` is of the `total`, rounded to
    /// two decimal places.
    ///
    /// Zero `total` gives zero [`Percent`].
    #[must_use]
    pub fn of(part: u64, total: u64) -> Self {
        if total == 0 {
            return Self(Decimal::ZERO);
        }
        let ratio = Decimal::from(part.min(total)) * Decimal::ONE_HUNDRED
            / Decimal::from(total);
        Self(ratio.round_dp(2))
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Floating-point percentage.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Percent = super::Percent;

    impl Percent {
        fn to_output<S: ScalarValue>(m: &Percent) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Percent` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Percent` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Percent;

    #[test]
    fn from_str() {
        assert_eq!(
            Percent::from_str("12.5"),
            Ok(Percent::new(Decimal::new(125, 1)).unwrap()),
        );
        assert!(Percent::from_str("100.01").is_err());
        assert!(Percent::from_str("-1").is_err());
        assert!(Percent::from_str("abc").is_err());
    }

    #[test]
    fn of_rounds_to_two_places() {
        assert_eq!(Percent::of(1, 3).to_string(), "33.33");
        assert_eq!(Percent::of(2, 3).to_string(), "66.67");
        assert_eq!(
            Percent::of(3, 3),
            Percent::new(Decimal::ONE_HUNDRED).unwrap(),
        );
    }

    #[test]
    fn of_empty_total_is_zero() {
        assert_eq!(Percent::of(0, 0).to_string(), "0");
        assert_eq!(Percent::of(5, 0).to_string(), "0");
    }
}
