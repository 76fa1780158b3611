//! [`Notification`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{applicant, Notification},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Notification>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let Notification {
            id,
            applicant_id,
            application_id,
            title,
            body,
            created_at,
        } = notification;

        const SQL: &str = "\
            INSERT INTO notifications (\
                id, applicant_id, application_id, \
                title, body, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::VARCHAR, $5::VARCHAR, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &applicant_id,
                &application_id,
                &title,
                &body,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Notification>, applicant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Notification>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, applicant_id, application_id, \
                   title, body, created_at \
            FROM notifications \
            WHERE applicant_id = $1::UUID \
            ORDER BY created_at DESC";
        Ok(self
            .query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Notification {
                id: row.get("id"),
                applicant_id: row.get("applicant_id"),
                application_id: row.get("application_id"),
                title: row.get("title"),
                body: row.get("body"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
