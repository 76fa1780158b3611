//! [`Eligibility`] scorer implementations.

use std::time::Duration;

use common::operations::Evaluate;
use derive_more::{Display, Error as StdError, From};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::domain::application::{Decision, Payload};

/// Screening of a submission by an external scorer.
pub use common::Handler as Eligibility;

/// [`Http`] scorer configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// URL the [`Questionnaire`] is POSTed to.
    pub endpoint: String,

    /// Timeout of a single scoring request.
    pub timeout: Duration,
}

/// [`Eligibility`] scorer reached over HTTP.
#[derive(Clone, Debug)]
pub struct Http {
    /// Client performing requests.
    client: reqwest::Client,

    /// URL the [`Questionnaire`] is POSTed to.
    endpoint: String,
}

impl Http {
    /// Verdict of the scorer granting the eligibility.
    pub const ELIGIBLE: &'static str = "Eligible for Loan";

    /// Creates a new [`Http`] scorer with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be initialized.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self {
            client,
            endpoint: conf.endpoint.clone(),
        })
    }
}

impl Eligibility<Evaluate<Questionnaire>> for Http {
    type Ok = Decision;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Evaluate(questionnaire): Evaluate<Questionnaire>,
    ) -> Result<Self::Ok, Self::Err> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&questionnaire)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        if !resp.status().is_success() {
            return Err(tracerr::new!(Error::Status(resp.status())));
        }

        let Verdict { verdict } = resp
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self::decide(&verdict))
    }
}

impl Http {
    /// Maps the scorer's `verdict` onto a [`Decision`].
    ///
    /// Only the exact [`Http::ELIGIBLE`] verdict grants the eligibility.
    fn decide(verdict: &str) -> Decision {
        if verdict == Self::ELIGIBLE {
            Decision::Eligible
        } else {
            Decision::Ineligible
        }
    }
}

/// Fixed-shape request sent to an [`Eligibility`] scorer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Questionnaire {
    how_long_has_your_business_been_active: String,
    what_type_of_business_do_you_run: String,
    in_which_industry_does_your_business_operate: String,
    lga_of_business: String,
    town_of_business: String,
    do_you_have_a_bank_account_for_your_business: String,
    do_you_use_any_digital_payment_systems: String,
    how_do_you_manage_your_business_finances: String,
    what_are_the_biggest_challenges_your_business_faces: String,
    what_kind_of_support_would_you_like_from_government: String,
    what_would_help_your_business_grow_the_most: String,
    have_you_ever_tried_to_get_a_loan_for_your_business: String,
    if_yes_how_did_you_get_the_loan: String,
    if_you_did_not_get_a_loan_what_was_the_main_reason: String,
    have_you_faced_any_issues_with_government_rules_or_taxes: String,
}

impl From<&Payload> for Questionnaire {
    fn from(p: &Payload) -> Self {
        Self {
            how_long_has_your_business_been_active: p.business.age.clone(),
            what_type_of_business_do_you_run: p.business.kind.clone(),
            in_which_industry_does_your_business_operate: p
                .business
                .industry
                .clone(),
            lga_of_business: p.business.lga.clone(),
            town_of_business: p.business.town.clone(),
            do_you_have_a_bank_account_for_your_business: p
                .finance
                .bank_account
                .clone(),
            do_you_use_any_digital_payment_systems: p
                .finance
                .digital_payments
                .clone(),
            how_do_you_manage_your_business_finances: p
                .finance
                .bookkeeping
                .clone(),
            what_are_the_biggest_challenges_your_business_faces: p
                .challenge
                .biggest_challenge
                .clone(),
            what_kind_of_support_would_you_like_from_government: p
                .challenge
                .government_support
                .clone(),
            what_would_help_your_business_grow_the_most: p
                .challenge
                .growth_driver
                .clone(),
            have_you_ever_tried_to_get_a_loan_for_your_business: p
                .loan
                .sought_before
                .clone(),
            if_yes_how_did_you_get_the_loan: p.loan.obtained_via.clone(),
            if_you_did_not_get_a_loan_what_was_the_main_reason: p
                .loan
                .refusal_reason
                .clone(),
            have_you_faced_any_issues_with_government_rules_or_taxes: p
                .regulatory
                .issues
                .clone(),
        }
    }
}

/// Response of an [`Eligibility`] scorer.
#[derive(Debug, Deserialize)]
struct Verdict {
    /// Verdict text.
    #[serde(rename = "Loan Eligibility")]
    verdict: String,
}

/// [`Eligibility`] scorer error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request failed to be performed or its response failed to be decoded.
    #[display("Scoring request failed: {_0}")]
    Request(reqwest::Error),

    /// Scorer responded with a non-success [`StatusCode`].
    #[display("Scorer responded with `{_0}`")]
    #[from(ignore)]
    Status(#[error(not(source))] StatusCode),
}

#[cfg(test)]
mod spec {
    use crate::{domain::application::Decision, testing};

    use super::{Http, Questionnaire};

    #[test]
    fn only_exact_verdict_is_eligible() {
        assert_eq!(Http::decide("Eligible for Loan"), Decision::Eligible);
        for verdict in [
            " Eligible for Loan",
            "Eligible for Loan\n",
            "eligible for loan",
            "Not Eligible for Loan",
            "",
        ] {
            assert_eq!(Http::decide(verdict), Decision::Ineligible);
        }
    }

    #[test]
    fn questionnaire_keeps_wire_field_names() {
        let json = serde_json::to_value(Questionnaire::from(
            &testing::payload("Mama Put Foods", "Food"),
        ))
        .unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 15);
        assert_eq!(
            obj["in_which_industry_does_your_business_operate"],
            "Food",
        );
        assert_eq!(obj["lga_of_business"], "Ikeja");
        assert_eq!(
            obj["have_you_faced_any_issues_with_government_rules_or_taxes"],
            "Multiple taxes",
        );
    }
}
