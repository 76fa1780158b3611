//! [`Applicant`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{applicant, Applicant, Profile},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Applicant>, applicant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Applicant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Applicant>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, created_at \
            FROM applicants \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Applicant {
                id: row.get("id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Applicant>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(applicant): Insert<Applicant>,
    ) -> Result<Self::Ok, Self::Err> {
        let Applicant { id, created_at } = applicant;

        const SQL: &str = "\
            INSERT INTO applicants (id, created_at) \
            VALUES ($1::UUID, $2::TIMESTAMPTZ) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Profile>, applicant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT applicant_id, \
                   first_name, last_name, other_name, \
                   date_of_birth, gender, lga, \
                   contact_email, phone, \
                   address, state_of_origin, \
                   updated_at \
            FROM profiles \
            WHERE applicant_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Profile {
                applicant_id: row.get("applicant_id"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                other_name: row.get("other_name"),
                date_of_birth: row.get("date_of_birth"),
                gender: row.get("gender"),
                lga: row.get("lga"),
                contact_email: row.get("contact_email"),
                phone: row.get("phone"),
                address: row.get("address"),
                state_of_origin: row.get("state_of_origin"),
                updated_at: row.get("updated_at"),
            }))
    }
}

impl<C> Database<Insert<Profile>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(profile): Insert<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        let Profile {
            applicant_id,
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
            updated_at,
        } = profile;

        const SQL: &str = "\
            INSERT INTO profiles (\
                applicant_id, \
                first_name, last_name, other_name, \
                date_of_birth, gender, lga, \
                contact_email, phone, \
                address, state_of_origin, \
                updated_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                $8::VARCHAR, $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, \
                $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (applicant_id) DO UPDATE \
            SET first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                other_name = EXCLUDED.other_name, \
                date_of_birth = EXCLUDED.date_of_birth, \
                gender = EXCLUDED.gender, \
                lga = EXCLUDED.lga, \
                contact_email = EXCLUDED.contact_email, \
                phone = EXCLUDED.phone, \
                address = EXCLUDED.address, \
                state_of_origin = EXCLUDED.state_of_origin, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &applicant_id,
                &first_name,
                &last_name,
                &other_name,
                &date_of_birth,
                &gender,
                &lga,
                &contact_email,
                &phone,
                &address,
                &state_of_origin,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
