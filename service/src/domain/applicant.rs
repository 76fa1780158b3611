//! [`Applicant`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Person allowed to submit loan applications.
#[derive(Clone, Copy, Debug)]
pub struct Applicant {
    /// ID of this [`Applicant`].
    pub id: Id,

    /// [`DateTime`] when this [`Applicant`] was first seen.
    pub created_at: CreationDateTime,
}

/// ID of an [`Applicant`].
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

/// Extended profile of an [`Applicant`].
///
/// Fields are kept as entered, so legacy rows may still hold blank values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    /// ID of the [`Applicant`] owning this [`Profile`].
    pub applicant_id: Id,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Other (middle) name.
    pub other_name: String,

    /// Date of birth, as entered.
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

    /// [`DateTime`] when this [`Profile`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl Profile {
    /// Returns the value of the provided [`Field`].
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::OtherName => &self.other_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Gender => &self.gender,
            Field::Lga => &self.lga,
            Field::ContactEmail => &self.contact_email,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
            Field::StateOfOrigin => &self.state_of_origin,
        }
    }

    /// Returns the [`Field::REQUIRED`] ones being blank in this [`Profile`].
    #[must_use]
    pub fn missing_fields(&self) -> Vec<Field> {
        self.blank_among(Field::REQUIRED)
    }

    /// Returns all the blank [`Field`]s of this [`Profile`].
    #[must_use]
    pub fn blank_fields(&self) -> Vec<Field> {
        self.blank_among(Field::ALL)
    }

    /// Filters the provided `fields` down to the blank ones.
    fn blank_among(&self, fields: &[Field]) -> Vec<Field> {
        fields
            .iter()
            .copied()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }
}

/// Field of a [`Profile`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    /// [`Profile::first_name`].
    FirstName,

    /// [`Profile::last_name`].
    LastName,

    /// [`Profile::other_name`].
    OtherName,

    /// [`Profile::date_of_birth`].
    DateOfBirth,

    /// [`Profile::gender`].
    Gender,

    /// [`Profile::lga`].
    Lga,

    /// [`Profile::contact_email`].
    ContactEmail,

    /// [`Profile::phone`].
    Phone,

    /// [`Profile::address`].
    Address,

    /// [`Profile::state_of_origin`].
    StateOfOrigin,
}

impl Field {
    /// [`Field`]s which must be filled before an application is submitted.
    pub const REQUIRED: &'static [Self] = &[
        Self::FirstName,
        Self::LastName,
        Self::OtherName,
        Self::DateOfBirth,
        Self::Gender,
        Self::Lga,
        Self::ContactEmail,
        Self::Phone,
    ];

    /// All the [`Field`]s of a [`Profile`].
    pub const ALL: &'static [Self] = &[
        Self::FirstName,
        Self::LastName,
        Self::OtherName,
        Self::DateOfBirth,
        Self::Gender,
        Self::Lga,
        Self::ContactEmail,
        Self::Phone,
        Self::Address,
        Self::StateOfOrigin,
    ];
}

/// Verdict of a [`Profile`] completeness check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Completeness {
    /// Every required [`Field`] is filled.
    Complete,

    /// Listed [`Field`]s are absent or blank.
    Incomplete(Vec<Field>),
}

impl Completeness {
    /// Checks the provided [`Profile`], if any.
    ///
    /// A missing [`Profile`] lacks every [`Field::REQUIRED`] one.
    #[must_use]
    pub fn of(profile: Option<&Profile>) -> Self {
        let missing = profile
            .map_or_else(|| Field::REQUIRED.to_vec(), Profile::missing_fields);
        if missing.is_empty() {
            Self::Complete
        } else {
            Self::Incomplete(missing)
        }
    }

    /// Returns the provided [`Profile`] if it's complete, or the missing
    /// [`Field`]s otherwise.
    ///
    /// # Errors
    ///
    /// If the [`Profile`] is absent or lacks a required [`Field`].
    pub fn require(profile: Option<Profile>) -> Result<Profile, Vec<Field>> {
        match profile {
            Some(p) => match p.missing_fields() {
                missing if missing.is_empty() => Ok(p),
                missing => Err(missing),
            },
            None => Err(Field::REQUIRED.to_vec()),
        }
    }
}

/// [`DateTime`] when an [`Applicant`] was created.
pub type CreationDateTime = DateTimeOf<(Applicant, unit::Creation)>;

/// [`DateTime`] when a [`Profile`] was modified.
pub type ModificationDateTime = DateTimeOf<(Profile, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Completeness, Field, Id, Profile};

    fn profile() -> Profile {
        Profile {
            applicant_id: Id::new(),
            first_name: "Amaka".into(),
            last_name: "Obi".into(),
            other_name: "Chioma".into(),
            date_of_birth: "1990-04-12".into(),
            gender: "Female".into(),
            lga: "Ikeja".into(),
            contact_email: "amaka@example.com".into(),
            phone: "+2348012345678".into(),
            address: "12 Allen Avenue".into(),
            state_of_origin: "Anambra".into(),
            updated_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn complete_profile_passes() {
        assert_eq!(Completeness::of(Some(&profile())), Completeness::Complete);
    }

    #[test]
    fn absent_profile_lacks_everything_required() {
        assert_eq!(
            Completeness::of(None),
            Completeness::Incomplete(Field::REQUIRED.to_vec()),
        );
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut p = profile();
        p.other_name = "   ".into();
        p.phone = "\t\n".into();
        p.address = String::new();

        assert_eq!(
            Completeness::of(Some(&p)),
            Completeness::Incomplete(vec![Field::OtherName, Field::Phone]),
        );
        assert_eq!(
            p.blank_fields(),
            vec![Field::OtherName, Field::Phone, Field::Address],
        );
    }
}
