//! [`Application`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    Range,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        applicant,
        application::{
            self, Attachment, BusinessInfo, ChallengeInfo, Documents,
            FinanceInfo, LoanInfo, PersonalInfo, RegulatoryInfo, Residence,
            Rewrite, Status, Transition,
        },
        Application,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, Tx},
            Postgres,
        },
        Database,
    },
    read::application::{
        MonthlyCounts, SameBusiness, StatusCounts, Summary, Year,
    },
};

/// Expands into a query selecting [`Summary`] rows, followed by the provided
/// SQL `$tail`.
macro_rules! select_summaries {
    ($tail:literal) => {
        concat!(
            "SELECT a.id, a.applicant_id, a.status, a.submitted_at, \
                    b.name AS business_name, \
                    b.industry AS business_industry, \
                    concat_ws(' ', p.first_name, p.last_name, p.other_name) \
                        AS applicant_name \
             FROM applications a \
             JOIN business_info b ON b.application_id = a.id \
             JOIN personal_info p ON p.application_id = a.id ",
            $tail,
        )
    };
}

/// Reads a [`Summary`] from the provided [`Row`].
fn summary(row: &Row) -> Summary {
    Summary {
        id: row.get("id"),
        applicant_id: row.get("applicant_id"),
        status: row.get("status"),
        submitted_at: row.get("submitted_at"),
        business_name: row.get("business_name"),
        business_industry: row.get("business_industry"),
        applicant_name: row.get("applicant_name"),
    }
}

/// Reads a whole [`Application`] from the provided [`Row`].
fn application(row: &Row) -> Application {
    let uploaded_at: Option<application::UploadDateTime> =
        row.get("uploaded_at");
    Application {
        id: row.get("id"),
        applicant_id: row.get("applicant_id"),
        status: row.get("status"),
        submitted_at: row.get("submitted_at"),
        personal: PersonalInfo {
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            other_name: row.get("other_name"),
            date_of_birth: row.get("date_of_birth"),
            gender: row.get("gender"),
            email: row.get("email"),
            phone: row.get("phone"),
            lga: row.get("personal_lga"),
            residence: Residence {
                address: row.get("residence_address"),
                state: row.get("residence_state"),
                bvn: row.get("bvn"),
                nin: row.get("nin"),
            },
        },
        business: BusinessInfo {
            name: row.get("business_name"),
            address: row.get("business_address"),
            age: row.get("business_age"),
            kind: row.get("business_kind"),
            industry: row.get("business_industry"),
            lga: row.get("business_lga"),
            town: row.get("business_town"),
        },
        finance: FinanceInfo {
            bank_account: row.get("bank_account"),
            digital_payments: row.get("digital_payments"),
            bookkeeping: row.get("bookkeeping"),
        },
        challenge: ChallengeInfo {
            biggest_challenge: row.get("biggest_challenge"),
            government_support: row.get("government_support"),
            growth_driver: row.get("growth_driver"),
        },
        loan: LoanInfo {
            sought_before: row.get("sought_before"),
            obtained_via: row.get("obtained_via"),
            refusal_reason: row.get("refusal_reason"),
        },
        regulatory: RegulatoryInfo {
            issues: row.get("issues"),
        },
        documents: uploaded_at.map(|uploaded_at| Documents {
            id_card: row.get("id_card"),
            business_certificate: row.get("business_certificate"),
            registration_number: row.get("registration_number"),
            uploaded_at,
        }),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Application>, application::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Application>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Application>, application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT a.id, a.applicant_id, a.status, \
                   a.submitted_at, a.updated_at, \
                   p.first_name, p.last_name, p.other_name, \
                   p.date_of_birth, p.gender, p.email, p.phone, \
                   p.lga AS personal_lga, \
                   p.address AS residence_address, \
                   p.state AS residence_state, \
                   p.bvn, p.nin, \
                   b.name AS business_name, \
                   b.address AS business_address, \
                   b.age AS business_age, \
                   b.kind AS business_kind, \
                   b.industry AS business_industry, \
                   b.lga AS business_lga, \
                   b.town AS business_town, \
                   f.bank_account, f.digital_payments, f.bookkeeping, \
                   c.biggest_challenge, c.government_support, \
                   c.growth_driver, \
                   l.sought_before, l.obtained_via, l.refusal_reason, \
                   r.issues, \
                   d.id_card, d.business_certificate, \
                   d.registration_number, d.uploaded_at \
            FROM applications a \
            JOIN personal_info p ON p.application_id = a.id \
            JOIN business_info b ON b.application_id = a.id \
            JOIN finance_info f ON f.application_id = a.id \
            JOIN challenge_info c ON c.application_id = a.id \
            JOIN loan_info l ON l.application_id = a.id \
            JOIN regulatory_info r ON r.application_id = a.id \
            LEFT JOIN upload_documents d ON d.application_id = a.id \
            WHERE a.id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(application))
    }
}

impl<C> Database<Select<By<Vec<Summary>, applicant::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, applicant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = select_summaries!(
            "WHERE a.applicant_id = $1::UUID \
             ORDER BY a.submitted_at DESC, a.id"
        );
        Ok(self
            .query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(summary)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Summary>, Status>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = by.into_inner();

        const SQL: &str = select_summaries!(
            "WHERE a.status = $1::INT2 \
             ORDER BY a.submitted_at DESC, a.id"
        );
        Ok(self
            .query(SQL, &[&status])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(summary)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Summary>, Range>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Summary>, Range>>,
    ) -> Result<Self::Ok, Self::Err> {
        let range = by.into_inner();
        let offset = i64::from(range.offset());
        let limit = i64::from(range.limit());

        const SQL: &str = select_summaries!(
            "ORDER BY a.submitted_at, a.id \
             OFFSET $1::INT8 \
             LIMIT $2::INT8"
        );
        Ok(self
            .query(SQL, &[&offset, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(summary)
            .collect())
    }
}

impl<C>
    Database<Select<By<Option<application::SubmissionDateTime>, SameBusiness>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<application::SubmissionDateTime>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<application::SubmissionDateTime>, SameBusiness>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let SameBusiness {
            applicant_id,
            name,
            industry,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT a.submitted_at \
            FROM applications a \
            JOIN business_info b ON b.application_id = a.id \
            WHERE a.applicant_id = $1::UUID \
              AND b.name = $2::VARCHAR \
              AND b.industry = $3::VARCHAR \
            ORDER BY a.submitted_at DESC \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&applicant_id, &name, &industry])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| row.get("submitted_at")))
    }
}

impl<C> Database<Select<By<StatusCounts, Option<applicant::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = StatusCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<StatusCounts, Option<applicant::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();

        const SQL: &str = "\
            SELECT status, COUNT(*) AS count \
            FROM applications \
            WHERE $1::UUID IS NULL OR applicant_id = $1::UUID \
            GROUP BY status";
        Ok(self
            .query(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let count: i64 = row.get("count");
                (row.get("status"), u64::try_from(count).unwrap_or_default())
            })
            .collect())
    }
}

impl<C> Database<Select<By<MonthlyCounts, Year>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = MonthlyCounts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<MonthlyCounts, Year>>,
    ) -> Result<Self::Ok, Self::Err> {
        let year = i32::from(by.into_inner());

        const SQL: &str = "\
            SELECT EXTRACT(MONTH FROM submitted_at AT TIME ZONE 'UTC')::INT2 \
                       AS month, \
                   COUNT(*) AS count \
            FROM applications \
            WHERE EXTRACT(YEAR FROM submitted_at AT TIME ZONE 'UTC')::INT4 \
                  = $1::INT4 \
            GROUP BY month";
        let mut counts = MonthlyCounts::default();
        for row in self
            .query(SQL, &[&year])
            .await
            .map_err(tracerr::wrap!())?
        {
            let month: i16 = row.get("month");
            let count: i64 = row.get("count");
            counts.add(
                u8::try_from(month).unwrap_or_default(),
                u64::try_from(count).unwrap_or_default(),
            );
        }
        Ok(counts)
    }
}

impl Database<Insert<Application>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(app): Insert<Application>,
    ) -> Result<Self::Ok, Self::Err> {
        let Application {
            id,
            applicant_id,
            status,
            submitted_at,
            personal,
            business,
            finance,
            challenge,
            loan,
            regulatory,
            documents,
            updated_at,
        } = app;

        const SQL: &str = "\
            INSERT INTO applications (\
                id, applicant_id, status, submitted_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::INT2, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &applicant_id, &status, &submitted_at, &updated_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        self.execute(Update(Rewrite {
            application_id: id,
            personal,
            business,
            finance,
            challenge,
            loan,
            regulatory,
        }))
        .await
        .map_err(tracerr::wrap!())?;

        if let Some(documents) = documents {
            self.execute(Insert(Attachment {
                application_id: id,
                documents,
            }))
            .await
            .map_err(tracerr::wrap!())?;
        }
        Ok(())
    }
}

impl<C> Database<Update<Transition>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(tr): Update<Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transition {
            application_id,
            from,
            to,
            at,
        } = tr;

        // Status is compared at write time, so the loser of a race affects
        // no rows.
        const SQL: &str = "\
            UPDATE applications \
            SET status = $3::INT2, \
                updated_at = $4::TIMESTAMPTZ \
            WHERE id = $1::UUID \
              AND status = $2::INT2";
        self.exec(SQL, &[&application_id, &from, &to, &at])
            .await
            .map_err(tracerr::wrap!())
            .map(|rows| rows == 1)
    }
}

impl<C> Database<Insert<Attachment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(att): Insert<Attachment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Attachment {
            application_id,
            documents:
                Documents {
                    id_card,
                    business_certificate,
                    registration_number,
                    uploaded_at,
                },
        } = att;

        const SQL: &str = "\
            INSERT INTO upload_documents (\
                application_id, \
                id_card, business_certificate, \
                registration_number, uploaded_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (application_id) DO UPDATE \
            SET id_card = EXCLUDED.id_card, \
                business_certificate = EXCLUDED.business_certificate, \
                registration_number = EXCLUDED.registration_number, \
                uploaded_at = EXCLUDED.uploaded_at";
        self.exec(
            SQL,
            &[
                &application_id,
                &id_card,
                &business_certificate,
                &registration_number,
                &uploaded_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Update<Rewrite>> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rw): Update<Rewrite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Rewrite {
            application_id: id,
            personal,
            business,
            finance,
            challenge,
            loan,
            regulatory,
        } = rw;

        const PERSONAL_SQL: &str = "\
            INSERT INTO personal_info (\
                application_id, \
                first_name, last_name, other_name, \
                date_of_birth, gender, email, phone, lga, \
                address, state, bvn, nin\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, \
                $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, $12::VARCHAR, $13::VARCHAR\
            ) \
            ON CONFLICT (application_id) DO UPDATE \
            SET first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                other_name = EXCLUDED.other_name, \
                date_of_birth = EXCLUDED.date_of_birth, \
                gender = EXCLUDED.gender, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                lga = EXCLUDED.lga, \
                address = EXCLUDED.address, \
                state = EXCLUDED.state, \
                bvn = EXCLUDED.bvn, \
                nin = EXCLUDED.nin";
        let r = &personal.residence;
        self.exec(
            PERSONAL_SQL,
            &[
                &id,
                &personal.first_name,
                &personal.last_name,
                &personal.other_name,
                &personal.date_of_birth,
                &personal.gender,
                &personal.email,
                &personal.phone,
                &personal.lga,
                &r.address,
                &r.state,
                &r.bvn,
                &r.nin,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const BUSINESS_SQL: &str = "\
            INSERT INTO business_info (\
                application_id, \
                name, address, age, kind, industry, lga, town\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR\
            ) \
            ON CONFLICT (application_id) DO UPDATE \
            SET name = EXCLUDED.name, \
                address = EXCLUDED.address, \
                age = EXCLUDED.age, \
                kind = EXCLUDED.kind, \
                industry = EXCLUDED.industry, \
                lga = EXCLUDED.lga, \
                town = EXCLUDED.town";
        self.exec(
            BUSINESS_SQL,
            &[
                &id,
                &business.name,
                &business.address,
                &business.age,
                &business.kind,
                &business.industry,
                &business.lga,
                &business.town,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const FINANCE_SQL: &str = "\
            INSERT INTO finance_info (\
                application_id, bank_account, digital_payments, bookkeeping\
            ) \
            VALUES ($1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
            ON CONFLICT (application_id) DO UPDATE \
            SET bank_account = EXCLUDED.bank_account, \
                digital_payments = EXCLUDED.digital_payments, \
                bookkeeping = EXCLUDED.bookkeeping";
        self.exec(
            FINANCE_SQL,
            &[
                &id,
                &finance.bank_account,
                &finance.digital_payments,
                &finance.bookkeeping,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const CHALLENGE_SQL: &str = "\
            INSERT INTO challenge_info (\
                application_id, \
                biggest_challenge, government_support, growth_driver\
            ) \
            VALUES ($1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
            ON CONFLICT (application_id) DO UPDATE \
            SET biggest_challenge = EXCLUDED.biggest_challenge, \
                government_support = EXCLUDED.government_support, \
                growth_driver = EXCLUDED.growth_driver";
        self.exec(
            CHALLENGE_SQL,
            &[
                &id,
                &challenge.biggest_challenge,
                &challenge.government_support,
                &challenge.growth_driver,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const LOAN_SQL: &str = "\
            INSERT INTO loan_info (\
                application_id, sought_before, obtained_via, refusal_reason\
            ) \
            VALUES ($1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR) \
            ON CONFLICT (application_id) DO UPDATE \
            SET sought_before = EXCLUDED.sought_before, \
                obtained_via = EXCLUDED.obtained_via, \
                refusal_reason = EXCLUDED.refusal_reason";
        self.exec(
            LOAN_SQL,
            &[
                &id,
                &loan.sought_before,
                &loan.obtained_via,
                &loan.refusal_reason,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

        const REGULATORY_SQL: &str = "\
            INSERT INTO regulatory_info (application_id, issues) \
            VALUES ($1::UUID, $2::VARCHAR) \
            ON CONFLICT (application_id) DO UPDATE \
            SET issues = EXCLUDED.issues";
        self.exec(REGULATORY_SQL, &[&id, &regulatory.issues])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
