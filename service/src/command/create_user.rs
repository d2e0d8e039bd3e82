//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tokio::task::JoinError;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// First [`Name`] of a new [`User`].
    pub first_name: user::Name,

    /// Last [`Name`] of a new [`User`].
    pub last_name: user::Name,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<user::New>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            email,
            password,
            first_name,
            last_name,
            role,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let cost = self.config().password_cost;
        let password_hash = tokio::task::spawn_blocking(move || {
            user::PasswordHash::new(password.expose_secret(), cost)
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let new = user::New {
            email: email.clone(),
            password_hash,
            first_name,
            last_name,
            role,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(new))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmailOccupied(email))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Failed to hash the [`user::Password`].
    #[display("{_0}")]
    Hash(user::password::HashError),

    /// Blocking hashing task failed.
    #[display("Hashing task failed: {_0}")]
    Join(JoinError),
}

#[cfg(test)]
mod tests {
    use secrecy::SecretBox;

    use crate::{
        domain::user::{Email, Name, Password, Role},
        Command as _, Service,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str) -> CreateUser {
        CreateUser {
            email: Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(Password::new("secret").unwrap())),
            first_name: Name::new("Test").unwrap(),
            last_name: Name::new("User").unwrap(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn creates_user_with_hashed_password() {
        let svc = Service::for_tests();

        let user = svc.execute(cmd("user@test.com")).await.unwrap();

        assert_eq!(user.email, Email::new("user@test.com").unwrap());
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.verify(&Password::new("secret").unwrap()));
        assert!(!user.password_hash.verify(&Password::new("Secret").unwrap()));
    }

    #[tokio::test]
    async fn refuses_occupied_email() {
        let svc = Service::for_tests();
        drop(svc.execute(cmd("user@test.com")).await.unwrap());

        let err = svc.execute(cmd("user@test.com")).await.unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(e) if e.to_string() == "user@test.com"),
            "unexpected error: {err}",
        );
    }
}
