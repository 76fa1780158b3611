//! [`Command`] for updating a [`Profile`] of an [`Applicant`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        applicant::{self, Field},
        Applicant, Profile,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating or replacing a [`Profile`] of an [`Applicant`].
///
/// Every [`Field`] must be filled.
#[derive(Clone, Debug)]
pub struct UpdateProfile {
    /// ID of the [`Applicant`] owning the [`Profile`].
    pub applicant_id: applicant::Id,

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

impl<Db, El, Ml> Command<UpdateProfile> for Service<Db, El, Ml>
where
    Db: Database<
            Select<By<Option<Applicant>, applicant::Id>>,
            Ok = Option<Applicant>,
            Err = Traced<database::Error>,
        > + Database<Insert<Applicant>, Err = Traced<database::Error>>
        + Database<Insert<Profile>, Err = Traced<database::Error>>,
{
    type Ok = Profile;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateProfile) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let profile = Profile {
            applicant_id: cmd.applicant_id,
            first_name: cmd.first_name.trim().to_owned(),
            last_name: cmd.last_name.trim().to_owned(),
            other_name: cmd.other_name.trim().to_owned(),
            date_of_birth: cmd.date_of_birth.trim().to_owned(),
            gender: cmd.gender.trim().to_owned(),
            lga: cmd.lga.trim().to_owned(),
            contact_email: cmd.contact_email.trim().to_owned(),
            phone: cmd.phone.trim().to_owned(),
            address: cmd.address.trim().to_owned(),
            state_of_origin: cmd.state_of_origin.trim().to_owned(),
            updated_at: DateTime::now().coerce(),
        };
        let blank = profile.blank_fields();
        if !blank.is_empty() {
            return Err(tracerr::new!(E::BlankFields(blank)));
        }

        let known = self
            .database()
            .execute(Select(By::<Option<Applicant>, _>::new(
                profile.applicant_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if known.is_none() {
            self.database()
                .execute(Insert(Applicant {
                    id: profile.applicant_id,
                    created_at: profile.updated_at.coerce(),
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        self.database()
            .execute(Insert(profile.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(profile)
    }
}

/// Error of [`UpdateProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Provided [`Field`]s are blank.
    #[display("Profile fields must not be blank: {_0:?}")]
    #[from(ignore)]
    BlankFields(#[error(not(source))] Vec<Field>),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            applicant::{self, Completeness, Field},
            Profile,
        },
        testing::{self, Verdict},
        Command as _,
    };

    use super::{ExecutionError, UpdateProfile};

    fn update(p: Profile) -> UpdateProfile {
        UpdateProfile {
            applicant_id: p.applicant_id,
            first_name: p.first_name,
            last_name: p.last_name,
            other_name: p.other_name,
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            lga: p.lga,
            contact_email: p.contact_email,
            phone: p.phone,
            address: p.address,
            state_of_origin: p.state_of_origin,
        }
    }

    #[tokio::test]
    async fn registers_applicant_with_complete_profile() {
        let (service, _) = testing::service(Verdict::Eligible);
        let id = applicant::Id::new();
        let mut cmd = update(testing::profile(id));
        cmd.first_name = "  Ngozi ".into();

        let profile = service.execute(cmd).await.unwrap();

        assert_eq!(profile.first_name, "Ngozi");
        let stored = testing::stored_profile(&service, id).await;
        assert_eq!(stored.as_ref(), Some(&profile));
        assert_eq!(
            Completeness::of(stored.as_ref()),
            Completeness::Complete,
        );
        assert!(testing::applicant_exists(&service, id).await);
    }

    #[tokio::test]
    async fn refuses_blank_fields() {
        let (service, _) = testing::service(Verdict::Eligible);
        let id = testing::applicant(&service).await;
        let mut cmd = update(testing::profile(id));
        cmd.address = " ".into();
        cmd.first_name = String::new();

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BlankFields(f)
                if f == &[Field::FirstName, Field::Address],
        ));
        assert_eq!(
            testing::stored_profile(&service, id).await,
            Some(testing::profile(id)),
        );
    }
}
