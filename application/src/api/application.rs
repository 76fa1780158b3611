//! `Application`-related definitions.

use common::{DateTime, Page};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::{
    domain::{self, application},
    query, read, Query as _,
};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// Unique identifier of an `Application`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(application::Id)]
#[into(application::Id)]
#[graphql(name = "ApplicationId", transparent)]
pub struct Id(Uuid);

/// Loan application of an `Applicant`.
#[derive(Clone, Debug, From)]
pub struct Application(domain::Application);

impl Application {
    /// Loads the [`Application`] with the provided ID, if the current
    /// `Session` may see it.
    ///
    /// `Applicant`s only see their own [`Application`]s, while reviewers see
    /// every one.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the [`Application`] doesn't exist or is not visible.
    pub async fn visible(id: Id, ctx: &Context) -> Result<Self, Error> {
        let session = ctx.current_session().await?;
        ctx.service()
            .execute(query::application::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .filter(|app| {
                session.admin
                    || api::applicant::Id::from(app.applicant_id)
                        == session.applicant_id
            })
            .map(Self)
            .ok_or_else(|| ApplicationError::NotExists.into())
            .map_err(ctx.error())
    }
}

/// Loan application of an `Applicant`.
#[graphql_object(context = Context)]
impl Application {
    /// Unique identifier of this `Application`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `Applicant` who submitted this `Application`.
    #[must_use]
    pub fn applicant_id(&self) -> api::applicant::Id {
        self.0.applicant_id.into()
    }

    /// Current `Profile` of the `Applicant` who submitted this
    /// `Application`.
    pub async fn profile(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Profile>, Error> {
        ctx.service()
            .execute(query::applicant::ProfileById::by(self.0.applicant_id))
            .map_ok(|p| p.map(Into::into))
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .await
    }

    /// Current status of this `Application`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Application` was submitted.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime {
        self.0.submitted_at.coerce()
    }

    /// `DateTime` when this `Application` was last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }

    /// Personal details captured from the `Profile` on submission.
    #[must_use]
    pub fn personal(&self) -> PersonalInfo {
        PersonalInfo::from(&self.0.personal)
    }

    /// Business details.
    #[must_use]
    pub fn business(&self) -> BusinessInfo {
        self.0.business.clone().into()
    }

    /// Financial habits of the business.
    #[must_use]
    pub fn finance(&self) -> FinanceInfo {
        self.0.finance.clone().into()
    }

    /// Challenges the business faces.
    #[must_use]
    pub fn challenge(&self) -> ChallengeInfo {
        self.0.challenge.clone().into()
    }

    /// Loan history of the business.
    #[must_use]
    pub fn loan(&self) -> LoanInfo {
        self.0.loan.clone().into()
    }

    /// Regulatory issues of the business.
    #[must_use]
    pub fn regulatory(&self) -> RegulatoryInfo {
        self.0.regulatory.clone().into()
    }

    /// Uploaded documents, if any.
    #[must_use]
    pub fn documents(&self) -> Option<Documents> {
        self.0.documents.clone().map(Into::into)
    }
}

/// Status of an `Application`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ApplicationStatus")]
pub enum Status {
    /// Passed automated screening, awaiting documents.
    Accepted1,

    /// Declined by automated screening.
    Rejected1,

    /// Documents submitted, awaiting human review.
    Pending,

    /// Approved by a reviewer.
    Accepted2,

    /// Declined by a reviewer.
    Rejected2,

    /// Sent back to the `Applicant` for correction.
    Resubmit,
}

impl From<application::Status> for Status {
    fn from(status: application::Status) -> Self {
        use application::Status as S;

        match status {
            S::Accepted1 => Self::Accepted1,
            S::Rejected1 => Self::Rejected1,
            S::Pending => Self::Pending,
            S::Accepted2 => Self::Accepted2,
            S::Rejected2 => Self::Rejected2,
            S::Resubmit => Self::Resubmit,
        }
    }
}

impl From<Status> for application::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Accepted1 => Self::Accepted1,
            Status::Rejected1 => Self::Rejected1,
            Status::Pending => Self::Pending,
            Status::Accepted2 => Self::Accepted2,
            Status::Rejected2 => Self::Rejected2,
            Status::Resubmit => Self::Resubmit,
        }
    }
}

/// Personal details of an `Applicant` captured on submission.
#[derive(Clone, Debug, GraphQLObject)]
pub struct PersonalInfo {
    /// Full name in `first last other` order.
    pub full_name: String,

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

    /// Email address.
    pub email: String,

    /// Phone number.
    pub phone: String,

    /// Local government area.
    pub lga: String,

    /// Residential address.
    pub residence_address: String,

    /// State of residence.
    pub residence_state: String,

    /// Bank verification number.
    pub bvn: String,

    /// National identification number.
    pub nin: String,
}

impl From<&application::PersonalInfo> for PersonalInfo {
    fn from(info: &application::PersonalInfo) -> Self {
        Self {
            full_name: info.full_name(),
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            other_name: info.other_name.clone(),
            date_of_birth: info.date_of_birth.clone(),
            gender: info.gender.clone(),
            email: info.email.clone(),
            phone: info.phone.clone(),
            lga: info.lga.clone(),
            residence_address: info.residence.address.clone(),
            residence_state: info.residence.state.clone(),
            bvn: info.residence.bvn.clone(),
            nin: info.residence.nin.clone(),
        }
    }
}

/// Business details of an `Application`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct BusinessInfo {
    /// Name of the business.
    pub name: String,

    /// Address of the business.
    pub address: String,

    /// How long the business operates.
    pub age: String,

    /// Legal kind of the business.
    pub kind: String,

    /// Industry of the business.
    pub industry: String,

    /// Local government area of the business.
    pub lga: String,

    /// Town of the business.
    pub town: String,
}

impl From<application::BusinessInfo> for BusinessInfo {
    fn from(info: application::BusinessInfo) -> Self {
        let application::BusinessInfo {
            name,
            address,
            age,
            kind,
            industry,
            lga,
            town,
        } = info;
        Self {
            name,
            address,
            age,
            kind,
            industry,
            lga,
            town,
        }
    }
}

/// Financial habits of a business.
#[derive(Clone, Debug, GraphQLObject)]
pub struct FinanceInfo {
    /// Whether the business has a bank account.
    pub bank_account: String,

    /// Whether the business accepts digital payments.
    pub digital_payments: String,

    /// How the business keeps its books.
    pub bookkeeping: String,
}

impl From<application::FinanceInfo> for FinanceInfo {
    fn from(info: application::FinanceInfo) -> Self {
        let application::FinanceInfo {
            bank_account,
            digital_payments,
            bookkeeping,
        } = info;
        Self {
            bank_account,
            digital_payments,
            bookkeeping,
        }
    }
}

/// Challenges a business faces.
#[derive(Clone, Debug, GraphQLObject)]
pub struct ChallengeInfo {
    /// Biggest challenge of the business.
    pub biggest_challenge: String,

    /// Government support the business expects.
    pub government_support: String,

    /// What would grow the business.
    pub growth_driver: String,
}

impl From<application::ChallengeInfo> for ChallengeInfo {
    fn from(info: application::ChallengeInfo) -> Self {
        let application::ChallengeInfo {
            biggest_challenge,
            government_support,
            growth_driver,
        } = info;
        Self {
            biggest_challenge,
            government_support,
            growth_driver,
        }
    }
}

/// Loan history of a business.
#[derive(Clone, Debug, GraphQLObject)]
pub struct LoanInfo {
    /// Whether a loan was sought before.
    pub sought_before: String,

    /// Where a previous loan was obtained.
    pub obtained_via: String,

    /// Why a previous loan was refused.
    pub refusal_reason: String,
}

impl From<application::LoanInfo> for LoanInfo {
    fn from(info: application::LoanInfo) -> Self {
        let application::LoanInfo {
            sought_before,
            obtained_via,
            refusal_reason,
        } = info;
        Self {
            sought_before,
            obtained_via,
            refusal_reason,
        }
    }
}

/// Regulatory issues of a business.
#[derive(Clone, Debug, GraphQLObject)]
pub struct RegulatoryInfo {
    /// Regulatory issues the business runs into.
    pub issues: String,
}

impl From<application::RegulatoryInfo> for RegulatoryInfo {
    fn from(info: application::RegulatoryInfo) -> Self {
        Self {
            issues: info.issues,
        }
    }
}

/// Reference to an uploaded object in the external storage.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "ObjectRef",
    with = scalar::Via::<application::ObjectRef>,
)]
pub struct ObjectRef(application::ObjectRef);

/// Documents uploaded for an `Application`.
#[derive(Clone, Debug, GraphQLObject)]
pub struct Documents {
    /// Identity card of the `Applicant`.
    pub id_card: Option<ObjectRef>,

    /// Registration certificate of the business.
    pub business_certificate: Option<ObjectRef>,

    /// Registration number of the business.
    pub registration_number: String,

    /// `DateTime` when these `Documents` were uploaded.
    pub uploaded_at: DateTime,
}

impl From<application::Documents> for Documents {
    fn from(docs: application::Documents) -> Self {
        let application::Documents {
            id_card,
            business_certificate,
            registration_number,
            uploaded_at,
        } = docs;
        Self {
            id_card: id_card.map(Into::into),
            business_certificate: business_certificate.map(Into::into),
            registration_number,
            uploaded_at: uploaded_at.coerce(),
        }
    }
}

/// Documents to attach to an `Application`.
///
/// Both objects are required for the upload to be accepted.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct DocumentsInput {
    /// Identity card of the `Applicant`.
    pub id_card: Option<ObjectRef>,

    /// Registration certificate of the business.
    pub business_certificate: Option<ObjectRef>,

    /// Registration number of the business.
    pub registration_number: String,
}

impl DocumentsInput {
    /// Converts this [`DocumentsInput`] into [`application::Documents`]
    /// uploaded at the provided [`DateTime`].
    #[must_use]
    pub fn into_documents(self, at: DateTime) -> application::Documents {
        let Self {
            id_card,
            business_certificate,
            registration_number,
        } = self;
        application::Documents {
            id_card: id_card.map(Into::into),
            business_certificate: business_certificate.map(Into::into),
            registration_number: registration_number.trim().to_owned(),
            uploaded_at: at.coerce(),
        }
    }
}

/// Questionnaire of a submitted `Application`.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct ApplicationInput {
    /// Residential address of the `Applicant`.
    pub residence_address: String,

    /// State of residence of the `Applicant`.
    pub residence_state: String,

    /// Bank verification number of the `Applicant`.
    pub bvn: String,

    /// National identification number of the `Applicant`.
    pub nin: String,

    /// Business details.
    pub business: BusinessInput,

    /// Financial habits of the business.
    pub finance: FinanceInput,

    /// Challenges the business faces.
    pub challenge: ChallengeInput,

    /// Loan history of the business.
    pub loan: LoanInput,

    /// Regulatory issues the business runs into.
    pub regulatory_issues: String,
}

impl From<ApplicationInput> for application::Payload {
    fn from(input: ApplicationInput) -> Self {
        let ApplicationInput {
            residence_address,
            residence_state,
            bvn,
            nin,
            business,
            finance,
            challenge,
            loan,
            regulatory_issues,
        } = input;
        Self {
            residence: application::Residence {
                address: residence_address,
                state: residence_state,
                bvn,
                nin,
            },
            business: business.into(),
            finance: finance.into(),
            challenge: challenge.into(),
            loan: loan.into(),
            regulatory: application::RegulatoryInfo {
                issues: regulatory_issues,
            },
        }
    }
}

/// Business details of a submitted `Application`.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct BusinessInput {
    /// Name of the business.
    pub name: String,

    /// Address of the business.
    pub address: String,

    /// How long the business operates.
    pub age: String,

    /// Legal kind of the business.
    pub kind: String,

    /// Industry of the business.
    pub industry: String,

    /// Local government area of the business.
    pub lga: String,

    /// Town of the business.
    pub town: String,
}

impl From<BusinessInput> for application::BusinessInfo {
    fn from(input: BusinessInput) -> Self {
        let BusinessInput {
            name,
            address,
            age,
            kind,
            industry,
            lga,
            town,
        } = input;
        Self {
            name,
            address,
            age,
            kind,
            industry,
            lga,
            town,
        }
    }
}

/// Financial habits of a business.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct FinanceInput {
    /// Whether the business has a bank account.
    pub bank_account: String,

    /// Whether the business accepts digital payments.
    pub digital_payments: String,

    /// How the business keeps its books.
    pub bookkeeping: String,
}

impl From<FinanceInput> for application::FinanceInfo {
    fn from(input: FinanceInput) -> Self {
        let FinanceInput {
            bank_account,
            digital_payments,
            bookkeeping,
        } = input;
        Self {
            bank_account,
            digital_payments,
            bookkeeping,
        }
    }
}

/// Challenges a business faces.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct ChallengeInput {
    /// Biggest challenge of the business.
    pub biggest_challenge: String,

    /// Government support the business expects.
    pub government_support: String,

    /// What would grow the business.
    pub growth_driver: String,
}

impl From<ChallengeInput> for application::ChallengeInfo {
    fn from(input: ChallengeInput) -> Self {
        let ChallengeInput {
            biggest_challenge,
            government_support,
            growth_driver,
        } = input;
        Self {
            biggest_challenge,
            government_support,
            growth_driver,
        }
    }
}

/// Loan history of a business.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct LoanInput {
    /// Whether a loan was sought before.
    pub sought_before: String,

    /// Where a previous loan was obtained.
    pub obtained_via: String,

    /// Why a previous loan was refused.
    pub refusal_reason: String,
}

impl From<LoanInput> for application::LoanInfo {
    fn from(input: LoanInput) -> Self {
        let LoanInput {
            sought_before,
            obtained_via,
            refusal_reason,
        } = input;
        Self {
            sought_before,
            obtained_via,
            refusal_reason,
        }
    }
}

/// Short row of an `Application` list.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ApplicationSummary")]
pub struct Summary {
    /// ID of the `Application`.
    pub id: Id,

    /// ID of the `Applicant` who submitted the `Application`.
    pub applicant_id: api::applicant::Id,

    /// Current status of the `Application`.
    pub status: Status,

    /// `DateTime` when the `Application` was submitted.
    pub submitted_at: DateTime,

    /// Name of the business.
    pub business_name: String,

    /// Industry of the business.
    pub business_industry: String,

    /// Full name of the `Applicant`.
    pub applicant_name: String,
}

impl From<read::application::Summary> for Summary {
    fn from(summary: read::application::Summary) -> Self {
        let read::application::Summary {
            id,
            applicant_id,
            status,
            submitted_at,
            business_name,
            business_industry,
            applicant_name,
        } = summary;
        Self {
            id: id.into(),
            applicant_id: applicant_id.into(),
            status: status.into(),
            submitted_at: submitted_at.coerce(),
            business_name,
            business_industry,
            applicant_name,
        }
    }
}

/// Rows of `Application`s selected by their positions.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ApplicationPage")]
pub struct Rows {
    /// Selected rows, in the order of submission.
    pub rows: Vec<Summary>,

    /// Position of the first selected row.
    pub from: i32,

    /// Position of the last selected row.
    pub to: i32,

    /// Total number of `Application`s.
    pub total: i32,
}

impl From<Page<read::application::Summary>> for Rows {
    fn from(page: Page<read::application::Summary>) -> Self {
        let Page { rows, range, total } = page;
        let int = |n: u32| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
            from: int(range.first()),
            to: int(range.last()),
            total: int(total),
        }
    }
}

define_error! {
    enum ApplicationError {
        #[code = "APPLICATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Application` with the specified ID does not exist"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Page, Range};
    use service::{domain::application, read};

    use super::{DocumentsInput, ObjectRef, Rows, Status};

    #[test]
    fn mirrors_every_status() {
        for &status in application::Status::ALL {
            let mirrored = Status::from(status);
            assert_eq!(application::Status::from(mirrored), status);
        }
    }

    #[test]
    fn trims_registration_number() {
        let docs = DocumentsInput {
            id_card: application::ObjectRef::new("ids/1.png")
                .map(ObjectRef::from),
            business_certificate: None,
            registration_number: "  RC-1 ".into(),
        }
        .into_documents(DateTime::UNIX_EPOCH);

        assert_eq!(docs.registration_number, "RC-1");
        assert!(!docs.is_complete());
    }

    #[test]
    fn page_reports_effective_range() {
        let rows = Rows::from(Page::<read::application::Summary> {
            rows: Vec::new(),
            range: Range::new(3, 5).unwrap(),
            total: 5,
        });

        assert_eq!((rows.from, rows.to, rows.total), (3, 5, 5));
    }
}
