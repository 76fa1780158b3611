//! [`Command`] for authorizing a [`Session`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{applicant, session, Applicant, Session},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`session::Token`].
///
/// [`Applicant`]s are registered the first time their [`Session`] is seen.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, El, Ml> Command<AuthorizeSession> for Service<Db, El, Ml>
where
    Db: Database<
            Select<By<Option<Applicant>, applicant::Id>>,
            Ok = Option<Applicant>,
            Err = Traced<database::Error>,
        > + Database<Insert<Applicant>, Err = Traced<database::Error>>,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let known = self
            .database()
            .execute(Select(By::<Option<Applicant>, _>::new(
                session.applicant_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if known.is_none() {
            self.database()
                .execute(Insert(Applicant {
                    id: session.applicant_id,
                    created_at: DateTime::now().coerce(),
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        Ok(session)
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::{applicant, session::Token, Session},
        testing::{self, Verdict},
        Command as _,
    };

    use super::{AuthorizeSession, ExecutionError};

    fn token(session: &Session, secret: &[u8]) -> Token {
        let jwt = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        jwt.parse().unwrap()
    }

    fn session(admin: bool) -> Session {
        Session {
            applicant_id: applicant::Id::new(),
            admin,
            expires_at: (DateTime::now() + Duration::from_secs(3600)).coerce(),
        }
    }

    #[tokio::test]
    async fn registers_applicant_on_first_sight() {
        let (service, _) = testing::service(Verdict::Eligible);
        let s = session(true);

        let authorized = service
            .execute(AuthorizeSession {
                token: token(&s, testing::JWT_SECRET),
            })
            .await
            .unwrap();

        assert_eq!(authorized.applicant_id, s.applicant_id);
        assert!(authorized.admin);
        assert!(testing::applicant_exists(&service, s.applicant_id).await);
    }

    #[tokio::test]
    async fn refuses_foreign_signature() {
        let (service, _) = testing::service(Verdict::Eligible);
        let s = session(false);

        let err = service
            .execute(AuthorizeSession {
                token: token(&s, b"another secret"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
        assert!(!testing::applicant_exists(&service, s.applicant_id).await);
    }
}
