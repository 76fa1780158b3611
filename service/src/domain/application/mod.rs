//! [`Application`] definitions.

pub mod lifecycle;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{applicant, Profile};
#[cfg(doc)]
use crate::domain::Applicant;

pub use self::lifecycle::{Event, EventKind};

/// Loan application aggregate.
///
/// Every child record except [`Documents`] is written together with the
/// [`Application`] itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Application {
    /// ID of this [`Application`].
    pub id: Id,

    /// ID of the [`Applicant`] who submitted this [`Application`].
    pub applicant_id: applicant::Id,

    /// Current [`Status`] of this [`Application`].
    pub status: Status,

    /// [`DateTime`] when this [`Application`] was submitted.
    pub submitted_at: SubmissionDateTime,

    /// [`PersonalInfo`] captured on submission.
    pub personal: PersonalInfo,

    /// [`BusinessInfo`] of this [`Application`].
    pub business: BusinessInfo,

    /// [`FinanceInfo`] of this [`Application`].
    pub finance: FinanceInfo,

    /// [`ChallengeInfo`] of this [`Application`].
    pub challenge: ChallengeInfo,

    /// [`LoanInfo`] of this [`Application`].
    pub loan: LoanInfo,

    /// [`RegulatoryInfo`] of this [`Application`].
    pub regulatory: RegulatoryInfo,

    /// Uploaded [`Documents`], once the upload gate has been passed.
    pub documents: Option<Documents>,

    /// [`DateTime`] when this [`Application`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Application {
    /// Creates a new [`Application`] from the provided [`Payload`], capturing
    /// the current state of the [`Applicant`]'s [`Profile`].
    #[must_use]
    pub fn new(
        profile: &Profile,
        payload: Payload,
        decision: Decision,
        submitted_at: SubmissionDateTime,
    ) -> Self {
        let Payload {
            residence,
            business,
            finance,
            challenge,
            loan,
            regulatory,
        } = payload;
        Self {
            id: Id::new(),
            applicant_id: profile.applicant_id,
            status: Status::submitted(decision),
            submitted_at,
            personal: PersonalInfo::capture(profile, residence),
            business,
            finance,
            challenge,
            loan,
            regulatory,
            documents: None,
            updated_at: submitted_at.coerce(),
        }
    }

    /// Returns the [`Rewrite`] replacing the questionnaire of this
    /// [`Application`] with the provided [`Payload`].
    #[must_use]
    pub fn rewrite(&self, profile: &Profile, payload: Payload) -> Rewrite {
        let Payload {
            residence,
            business,
            finance,
            challenge,
            loan,
            regulatory,
        } = payload;
        Rewrite {
            application_id: self.id,
            personal: PersonalInfo::capture(profile, residence),
            business,
            finance,
            challenge,
            loan,
            regulatory,
        }
    }
}

/// ID of an [`Application`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of an `Application`."]
    enum Status {
        #[doc = "Passed automated screening, awaiting documents."]
        Accepted1 = 1,

        #[doc = "Declined by automated screening."]
        Rejected1 = 2,

        #[doc = "Documents submitted, awaiting human review."]
        Pending = 3,

        #[doc = "Approved by a reviewer."]
        Accepted2 = 4,

        #[doc = "Declined by a reviewer."]
        Rejected2 = 5,

        #[doc = "Sent back to the applicant for correction."]
        Resubmit = 6,
    }
}

impl Status {
    /// Returns the initial [`Status`] of a submission screened with the
    /// provided [`Decision`].
    #[must_use]
    pub const fn submitted(decision: Decision) -> Self {
        match decision {
            Decision::Eligible => Self::Accepted1,
            Decision::Ineligible => Self::Rejected1,
        }
    }

    /// Returns the reporting [`Outcome`] of this [`Status`].
    #[must_use]
    pub const fn outcome(self) -> Outcome {
        match self {
            Self::Accepted2 => Outcome::Approved,
            Self::Rejected1 | Self::Rejected2 => Outcome::Rejected,
            Self::Accepted1 | Self::Pending | Self::Resubmit => {
                Outcome::Pending
            }
        }
    }
}

/// Reporting bucket of a [`Status`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    /// Finally approved.
    Approved,

    /// Declined, either automatically or by a reviewer.
    Rejected,

    /// Still moving through the lifecycle.
    Pending,
}

/// Verdict of the eligibility screening.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Applicant may proceed to the document upload.
    Eligible,

    /// Applicant is declined.
    Ineligible,
}

/// Result of a duplicate submission check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cooldown {
    /// No conflicting submission exists.
    Allowed,

    /// A submission for the same business happened too recently.
    Blocked {
        /// [`DateTime`] since which the submission is allowed again.
        until: SubmissionDateTime,
    },
}

impl Cooldown {
    /// Default length of the cooldown window in calendar months.
    pub const MONTHS: u32 = 3;

    /// Checks whether the `proposed` submission falls into the window of
    /// `months` calendar months following the `last` one.
    #[must_use]
    pub fn check(
        last: Option<SubmissionDateTime>,
        proposed: SubmissionDateTime,
        months: u32,
    ) -> Self {
        last.and_then(|at| at.add_months(months))
            .filter(|until| proposed < *until)
            .map_or(Self::Allowed, |until| Self::Blocked { until })
    }
}

/// Data submitted by an applicant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payload {
    /// [`Residence`] details.
    pub residence: Residence,

    /// [`BusinessInfo`].
    pub business: BusinessInfo,

    /// [`FinanceInfo`].
    pub finance: FinanceInfo,

    /// [`ChallengeInfo`].
    pub challenge: ChallengeInfo,

    /// [`LoanInfo`].
    pub loan: LoanInfo,

    /// [`RegulatoryInfo`].
    pub regulatory: RegulatoryInfo,
}

impl Payload {
    /// Returns the value of the provided [`PayloadField`].
    #[must_use]
    pub fn get(&self, field: PayloadField) -> &str {
        use PayloadField as F;

        match field {
            F::ResidenceAddress => &self.residence.address,
            F::ResidenceState => &self.residence.state,
            F::Bvn => &self.residence.bvn,
            F::Nin => &self.residence.nin,
            F::BusinessName => &self.business.name,
            F::BusinessAddress => &self.business.address,
            F::BusinessAge => &self.business.age,
            F::BusinessKind => &self.business.kind,
            F::BusinessIndustry => &self.business.industry,
            F::BusinessLga => &self.business.lga,
            F::BusinessTown => &self.business.town,
            F::BankAccount => &self.finance.bank_account,
            F::DigitalPayments => &self.finance.digital_payments,
            F::Bookkeeping => &self.finance.bookkeeping,
            F::BiggestChallenge => &self.challenge.biggest_challenge,
            F::GovernmentSupport => &self.challenge.government_support,
            F::GrowthDriver => &self.challenge.growth_driver,
            F::LoanSoughtBefore => &self.loan.sought_before,
            F::LoanObtainedVia => &self.loan.obtained_via,
            F::LoanRefusalReason => &self.loan.refusal_reason,
            F::RegulatoryIssues => &self.regulatory.issues,
        }
    }

    /// Returns the [`PayloadField`]s left blank, in declaration order.
    #[must_use]
    pub fn blank_fields(&self) -> Vec<PayloadField> {
        PayloadField::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }
}

/// Field of a [`Payload`], named after its path in the API input.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
pub enum PayloadField {
    /// [`Residence::address`].
    #[strum(serialize = "residenceAddress")]
    ResidenceAddress,

    /// [`Residence::state`].
    #[strum(serialize = "residenceState")]
    ResidenceState,

    /// [`Residence::bvn`].
    #[strum(serialize = "bvn")]
    Bvn,

    /// [`Residence::nin`].
    #[strum(serialize = "nin")]
    Nin,

    /// [`BusinessInfo::name`].
    #[strum(serialize = "business.name")]
    BusinessName,

    /// [`BusinessInfo::address`].
    #[strum(serialize = "business.address")]
    BusinessAddress,

    /// [`BusinessInfo::age`].
    #[strum(serialize = "business.age")]
    BusinessAge,

    /// [`BusinessInfo::kind`].
    #[strum(serialize = "business.kind")]
    BusinessKind,

    /// [`BusinessInfo::industry`].
    #[strum(serialize = "business.industry")]
    BusinessIndustry,

    /// [`BusinessInfo::lga`].
    #[strum(serialize = "business.lga")]
    BusinessLga,

    /// [`BusinessInfo::town`].
    #[strum(serialize = "business.town")]
    BusinessTown,

    /// [`FinanceInfo::bank_account`].
    #[strum(serialize = "finance.bankAccount")]
    BankAccount,

    /// [`FinanceInfo::digital_payments`].
    #[strum(serialize = "finance.digitalPayments")]
    DigitalPayments,

    /// [`FinanceInfo::bookkeeping`].
    #[strum(serialize = "finance.bookkeeping")]
    Bookkeeping,

    /// [`ChallengeInfo::biggest_challenge`].
    #[strum(serialize = "challenge.biggestChallenge")]
    BiggestChallenge,

    /// [`ChallengeInfo::government_support`].
    #[strum(serialize = "challenge.governmentSupport")]
    GovernmentSupport,

    /// [`ChallengeInfo::growth_driver`].
    #[strum(serialize = "challenge.growthDriver")]
    GrowthDriver,

    /// [`LoanInfo::sought_before`].
    #[strum(serialize = "loan.soughtBefore")]
    LoanSoughtBefore,

    /// [`LoanInfo::obtained_via`].
    #[strum(serialize = "loan.obtainedVia")]
    LoanObtainedVia,

    /// [`LoanInfo::refusal_reason`].
    #[strum(serialize = "loan.refusalReason")]
    LoanRefusalReason,

    /// [`RegulatoryInfo::issues`].
    #[strum(serialize = "regulatoryIssues")]
    RegulatoryIssues,
}

impl PayloadField {
    /// All the [`PayloadField`]s, every one of them is required.
    pub const ALL: &'static [Self] = &[
        Self::ResidenceAddress,
        Self::ResidenceState,
        Self::Bvn,
        Self::Nin,
        Self::BusinessName,
        Self::BusinessAddress,
        Self::BusinessAge,
        Self::BusinessKind,
        Self::BusinessIndustry,
        Self::BusinessLga,
        Self::BusinessTown,
        Self::BankAccount,
        Self::DigitalPayments,
        Self::Bookkeeping,
        Self::BiggestChallenge,
        Self::GovernmentSupport,
        Self::GrowthDriver,
        Self::LoanSoughtBefore,
        Self::LoanObtainedVia,
        Self::LoanRefusalReason,
        Self::RegulatoryIssues,
    ];
}

/// Residency and identification details of an applicant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Residence {
    /// Residential address.
    pub address: String,

    /// State of residence.
    pub state: String,

    /// Bank verification number.
    pub bvn: String,

    /// National identification number.
    pub nin: String,
}

/// Personal details of an [`Application`].
///
/// Profile fields are copied, so later [`Profile`] edits don't alter them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PersonalInfo {
    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Other (middle) name.
    pub other_name: String,

    /// Date of birth.
    pub date_of_birth: String,

    /// Gender.
    pub gender: String,

    /// Contact email address.
    pub email: String,

    /// Phone number.
    pub phone: String,

    /// Local government area.
    pub lga: String,

    /// [`Residence`] details.
    pub residence: Residence,
}

impl PersonalInfo {
    /// Captures [`PersonalInfo`] from the provided [`Profile`] and
    /// [`Residence`].
    #[must_use]
    pub fn capture(profile: &Profile, residence: Residence) -> Self {
        Self {
            first_name: profile.first_name.trim().to_owned(),
            last_name: profile.last_name.trim().to_owned(),
            other_name: profile.other_name.trim().to_owned(),
            date_of_birth: profile.date_of_birth.trim().to_owned(),
            gender: profile.gender.trim().to_owned(),
            email: profile.contact_email.trim().to_owned(),
            phone: profile.phone.trim().to_owned(),
            lga: profile.lga.trim().to_owned(),
            residence,
        }
    }

    /// Returns the full name in `first last other` order.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.first_name, self.last_name, self.other_name)
    }
}

/// Business details of an [`Application`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BusinessInfo {
    /// Business name.
    pub name: String,

    /// Business address.
    pub address: String,

    /// How long the business has been active.
    pub age: String,

    /// Type of the business.
    pub kind: String,

    /// Industry the business operates in.
    pub industry: String,

    /// Local government area of the business.
    pub lga: String,

    /// Town of the business.
    pub town: String,
}

/// Finance questionnaire answers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinanceInfo {
    /// Whether the business has a bank account.
    pub bank_account: String,

    /// Whether digital payment systems are used.
    pub digital_payments: String,

    /// How business finances are managed.
    pub bookkeeping: String,
}

/// Challenge questionnaire answers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChallengeInfo {
    /// Biggest challenge the business faces.
    pub biggest_challenge: String,

    /// Kind of government support desired.
    pub government_support: String,

    /// What would help the business grow the most.
    pub growth_driver: String,
}

/// Loan history questionnaire answers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanInfo {
    /// Whether a loan was ever sought.
    pub sought_before: String,

    /// How the loan was obtained.
    pub obtained_via: String,

    /// Why no loan was obtained.
    pub refusal_reason: String,
}

/// Regulatory questionnaire answers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegulatoryInfo {
    /// Issues faced with government rules or taxes.
    pub issues: String,
}

/// Documents uploaded for an [`Application`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Documents {
    /// Identity card object.
    pub id_card: Option<ObjectRef>,

    /// Business registration certificate object.
    pub business_certificate: Option<ObjectRef>,

    /// Business registration number.
    pub registration_number: String,

    /// [`DateTime`] when these [`Documents`] were uploaded.
    pub uploaded_at: UploadDateTime,
}

impl Documents {
    /// Indicates whether both required objects and the registration number
    /// are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.id_card.is_some()
            && self.business_certificate.is_some()
            && !self.registration_number.trim().is_empty()
    }
}

/// Reference to an object in the external storage.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Creates a new [`ObjectRef`] if the given `key` is not blank.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }
}

impl FromStr for ObjectRef {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ObjectRef`")
    }
}

/// Replacement of the questionnaire records of an [`Application`].
#[derive(Clone, Debug)]
pub struct Rewrite {
    /// ID of the [`Application`] being rewritten.
    pub application_id: Id,

    /// New [`PersonalInfo`].
    pub personal: PersonalInfo,

    /// New [`BusinessInfo`].
    pub business: BusinessInfo,

    /// New [`FinanceInfo`].
    pub finance: FinanceInfo,

    /// New [`ChallengeInfo`].
    pub challenge: ChallengeInfo,

    /// New [`LoanInfo`].
    pub loan: LoanInfo,

    /// New [`RegulatoryInfo`].
    pub regulatory: RegulatoryInfo,
}

/// Attachment of [`Documents`] to an [`Application`].
#[derive(Clone, Debug)]
pub struct Attachment {
    /// ID of the [`Application`] the [`Documents`] belong to.
    pub application_id: Id,

    /// Attached [`Documents`].
    pub documents: Documents,
}

/// Compare-and-set change of an [`Application`]'s [`Status`].
///
/// Applies only while the stored [`Status`] still equals the `from` one.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    /// ID of the [`Application`].
    pub application_id: Id,

    /// Expected current [`Status`].
    pub from: Status,

    /// New [`Status`].
    pub to: Status,

    /// [`DateTime`] of the change.
    pub at: ModificationDateTime,
}

/// [`DateTime`] when an [`Application`] was submitted.
pub type SubmissionDateTime = DateTimeOf<(Application, unit::Submission)>;

/// [`DateTime`] when an [`Application`] was modified.
pub type ModificationDateTime = DateTimeOf<(Application, unit::Modification)>;

/// [`DateTime`] when [`Documents`] were uploaded.
pub type UploadDateTime = DateTimeOf<(Documents, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::testing;

    use super::{Cooldown, Outcome, PayloadField, Status, SubmissionDateTime};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn at(rfc3339: &str) -> SubmissionDateTime {
        DateTime::from_rfc3339(rfc3339).unwrap().coerce()
    }

    #[test]
    fn lists_blank_payload_fields() {
        assert!(testing::payload("Mama Put Foods", "Food")
            .blank_fields()
            .is_empty());

        let mut payload = testing::payload("", "  ");
        payload.regulatory.issues = "\t".into();
        let blank = payload.blank_fields();

        assert_eq!(
            blank,
            [
                PayloadField::BusinessName,
                PayloadField::BusinessIndustry,
                PayloadField::RegulatoryIssues,
            ],
        );
        assert_eq!(blank[0].to_string(), "business.name");
    }

    #[test]
    fn cooldown_blocks_inside_three_calendar_months() {
        let last = at("2023-01-01T09:00:00Z");

        assert_eq!(
            Cooldown::check(Some(last), last + DAY * 89, Cooldown::MONTHS),
            Cooldown::Blocked {
                until: at("2023-04-01T09:00:00Z"),
            },
        );
        assert_eq!(
            Cooldown::check(Some(last), last + DAY * 91, Cooldown::MONTHS),
            Cooldown::Allowed,
        );
    }

    #[test]
    fn cooldown_boundary_is_exclusive() {
        let last = at("2023-01-31T00:00:00Z");
        let boundary = at("2023-05-01T00:00:00Z");

        assert_eq!(
            Cooldown::check(Some(last), boundary, Cooldown::MONTHS),
            Cooldown::Allowed,
        );
        assert_eq!(
            Cooldown::check(
                Some(last),
                boundary - Duration::from_secs(1),
                Cooldown::MONTHS,
            ),
            Cooldown::Blocked { until: boundary },
        );
    }

    #[test]
    fn cooldown_allows_first_submission() {
        assert_eq!(
            Cooldown::check(
                None,
                at("2023-01-01T00:00:00Z"),
                Cooldown::MONTHS,
            ),
            Cooldown::Allowed,
        );
    }

    #[test]
    fn outcomes_cover_every_status() {
        let count = |o: Outcome| {
            Status::ALL.iter().filter(|s| s.outcome() == o).count()
        };

        assert_eq!(count(Outcome::Approved), 1);
        assert_eq!(count(Outcome::Rejected), 2);
        assert_eq!(count(Outcome::Pending), 3);
    }
}
