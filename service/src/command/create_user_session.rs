//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tokio::task::JoinError;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, password::HashError, session, PasswordHash, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(&email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // Unknown emails pay the same verification cost.
                let hash = match &user {
                    Some(u) => u.password_hash.clone(),
                    None => self
                        .decoy_password_hash()
                        .await
                        .map_err(tracerr::wrap!())?,
                };
                let matches = tokio::task::spawn_blocking(move || {
                    hash.verify(password.expose_secret())
                })
                .await
                .map_err(tracerr::from_and_wrap!(=> E))?;

                user.filter(|_| matches)
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let session = Session::new(
            user.id,
            user.email.clone(),
            user.role,
            DateTime::now(),
        );
        let token = session
            .encode(&self.config().jwt_encoding_key)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            user,
            expires_at: session.expires_at,
        })
    }
}

impl<Db> Service<Db> {
    /// Returns the [`PasswordHash`] to verify against when no [`User`]
    /// matches the provided [`Email`].
    ///
    /// Computes it on the first call.
    async fn decoy_password_hash(
        &self,
    ) -> Result<PasswordHash, Traced<ExecutionError>> {
        use ExecutionError as E;

        let cost = self.config().password_cost;
        self.decoy_password_hash
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || PasswordHash::decoy(cost))
                    .await
                    .map_err(tracerr::from_and_wrap!(=> E))?
                    .map_err(tracerr::from_and_wrap!(=> E))
            })
            .await
            .cloned()
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Decoy [`PasswordHash`] cannot be computed.
    #[display("Failed to compute decoy `PasswordHash`: {_0}")]
    Hash(HashError),

    /// Blocking verification task failed.
    #[display("Verification task failed: {_0}")]
    Join(JoinError),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod tests {
    use secrecy::SecretBox;

    use crate::{
        command::{AuthorizeUserSession, CreateUser},
        domain::user::{self, Email, Name, Password, Role},
        infra::Memory,
        Command as _, Service,
    };

    use super::{CreateUserSession, ExecutionError};

    fn secret(password: &str) -> SecretBox<Password> {
        SecretBox::new(Box::new(Password::new(password).unwrap()))
    }

    async fn service_with_admin() -> Service<Memory> {
        let svc = Service::for_tests();
        drop(
            svc.execute(CreateUser {
                email: Email::new("admin@musicstore.com").unwrap(),
                password: secret("admin123"),
                first_name: Name::new("Store").unwrap(),
                last_name: Name::new("Admin").unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap(),
        );
        svc
    }

    #[tokio::test]
    async fn signs_in_with_valid_credentials() {
        let svc = service_with_admin().await;

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                email: Email::new("admin@musicstore.com").unwrap(),
                password: secret("admin123"),
            })
            .await
            .unwrap();

        assert_eq!(out.user.role, Role::Admin);

        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user_id, out.user.id);
        assert_eq!(session.role, Role::Admin);
        assert_eq!(
            session.expires_at.unix_timestamp(),
            out.expires_at.unix_timestamp(),
        );
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let svc = service_with_admin().await;

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: Email::new("admin@musicstore.com").unwrap(),
                password: secret("admin1234"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_email() {
        let svc = service_with_admin().await;

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: Email::new("nobody@musicstore.com").unwrap(),
                password: secret("admin123"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn verifies_decoy_for_unknown_email() {
        let svc = service_with_admin().await;

        drop(
            svc.execute(CreateUserSession::ByCredentials {
                email: Email::new("admin@musicstore.com").unwrap(),
                password: secret("wrong"),
            })
            .await
            .unwrap_err(),
        );
        assert!(!svc.decoy_password_hash.initialized());

        for password in ["decoy", "admin123"] {
            let err = svc
                .execute(CreateUserSession::ByCredentials {
                    email: Email::new("nobody@musicstore.com").unwrap(),
                    password: secret(password),
                })
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::WrongCredentials),
                "`{password}` signed in",
            );
        }
        assert!(svc.decoy_password_hash.initialized());
    }

    #[tokio::test]
    async fn signs_in_by_user_id() {
        let svc = service_with_admin().await;

        let out = svc
            .execute(CreateUserSession::ByUserId(user::Id::from(1)))
            .await
            .unwrap();
        assert_eq!(out.user.email, Email::new("admin@musicstore.com").unwrap());

        let err = svc
            .execute(CreateUserSession::ByUserId(user::Id::from(2)))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }
}
