//! `Applicant`-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::domain::{self, applicant};
use uuid::Uuid;

use crate::Context;

/// Unique identifier of an `Applicant`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(applicant::Id)]
#[into(applicant::Id)]
#[graphql(name = "ApplicantId", transparent)]
pub struct Id(Uuid);

/// Extended profile of an `Applicant`.
#[derive(Clone, Debug, From)]
pub struct Profile(domain::Profile);

/// Extended profile of an `Applicant`.
#[graphql_object(context = Context)]
impl Profile {
    /// ID of the `Applicant` owning this `Profile`.
    #[must_use]
    pub fn applicant_id(&self) -> Id {
        self.0.applicant_id.into()
    }

    /// First name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.0.first_name
    }

    /// Last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.0.last_name
    }

    /// Other (middle) name.
    #[must_use]
    pub fn other_name(&self) -> &str {
        &self.0.other_name
    }

    /// Date of birth, as entered.
    #[must_use]
    pub fn date_of_birth(&self) -> &str {
        &self.0.date_of_birth
    }

    /// Gender.
    #[must_use]
    pub fn gender(&self) -> &str {
        &self.0.gender
    }

    /// Local government area.
    #[must_use]
    pub fn lga(&self) -> &str {
        &self.0.lga
    }

    /// Email address notifications are sent to.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        &self.0.contact_email
    }

    /// Phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.0.phone
    }

    /// Home address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.0.address
    }

    /// State of origin.
    #[must_use]
    pub fn state_of_origin(&self) -> &str {
        &self.0.state_of_origin
    }

    /// Required fields of this `Profile` which are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        self.0.missing_fields().into_iter().map(Into::into).collect()
    }

    /// `DateTime` when this `Profile` was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Field of a `Profile`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ProfileField")]
pub enum Field {
    /// First name.
    FirstName,

    /// Last name.
    LastName,

    /// Other (middle) name.
    OtherName,

    /// Date of birth.
    DateOfBirth,

    /// Gender.
    Gender,

    /// Local government area.
    Lga,

    /// Contact email address.
    ContactEmail,

    /// Phone number.
    Phone,

    /// Home address.
    Address,

    /// State of origin.
    StateOfOrigin,
}

impl From<applicant::Field> for Field {
    fn from(field: applicant::Field) -> Self {
        use applicant::Field as F;

        match field {
            F::FirstName => Self::FirstName,
            F::LastName => Self::LastName,
            F::OtherName => Self::OtherName,
            F::DateOfBirth => Self::DateOfBirth,
            F::Gender => Self::Gender,
            F::Lga => Self::Lga,
            F::ContactEmail => Self::ContactEmail,
            F::Phone => Self::Phone,
            F::Address => Self::Address,
            F::StateOfOrigin => Self::StateOfOrigin,
        }
    }
}

/// Verdict of a `Profile` completeness check.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ProfileCompleteness")]
pub struct Completeness {
    /// Indicator whether an application may be submitted.
    pub complete: bool,

    /// Required fields which are absent or blank.
    pub missing_fields: Vec<Field>,
}

impl From<applicant::Completeness> for Completeness {
    fn from(completeness: applicant::Completeness) -> Self {
        match completeness {
            applicant::Completeness::Complete => Self {
                complete: true,
                missing_fields: Vec::new(),
            },
            applicant::Completeness::Incomplete(fields) => Self {
                complete: false,
                missing_fields: fields.into_iter().map(Into::into).collect(),
            },
        }
    }
}

/// New contents of a `Profile`.
///
/// Every field is required and must not be blank.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ProfileInput")]
pub struct ProfileInput {
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

    /// Local government area.
    pub lga: String,

    /// Contact email address.
    pub contact_email: String,

    /// Phone number.
    pub phone: String,

    /// Home address.
    pub address: String,

    /// State of origin.
    pub state_of_origin: String,
}

impl ProfileInput {
    /// Converts this [`ProfileInput`] into the [`UpdateProfile`] command of
    /// the provided `Applicant`.
    ///
    /// [`UpdateProfile`]: service::command::UpdateProfile
    #[must_use]
    pub fn into_command(
        self,
        applicant_id: Id,
    ) -> service::command::UpdateProfile {
        let Self {
            first_name,
            last_name,
            other_name,
            date_of_birth,
            gender,
            lga,
            contact_email,
            phone,
            address,
            state_of_origin,
        } = self;
        service::command::UpdateProfile {
            applicant_id: applicant_id.into(),
            first_name,
            last_name,
            other_name,
            date_of_birth,
            gender,
            lga,
            contact_email,
            phone,
            address,
            state_of_origin,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain::applicant;

    use super::{Completeness, Field};

    #[test]
    fn lists_missing_fields() {
        let complete = Completeness::from(applicant::Completeness::Complete);
        assert!(complete.complete);
        assert!(complete.missing_fields.is_empty());

        let incomplete =
            Completeness::from(applicant::Completeness::Incomplete(vec![
                applicant::Field::Lga,
                applicant::Field::Phone,
            ]));
        assert!(!incomplete.complete);
        assert_eq!(incomplete.missing_fields, [Field::Lga, Field::Phone]);
    }
}
