//! Accounts provisioning on startup.

use service::{
    command::{self, create_user, Command as _},
    domain::user,
};

use crate::{config, AsError as _, Error, Service};

impl TryFrom<config::Admin> for command::CreateUser {
    type Error = config::Error;

    fn try_from(admin: config::Admin) -> Result<Self, Self::Error> {
        use config::Error as E;

        let config::Admin {
            email,
            password,
            first_name,
            last_name,
        } = admin;

        let email =
            user::Email::new(email).ok_or(E::InvalidBootstrapAdmin("email"))?;
        let password = user::Password::new(password)
            .ok_or(E::InvalidBootstrapAdmin("password"))?;
        let first_name = user::Name::new(first_name)
            .ok_or(E::InvalidBootstrapAdmin("first_name"))?;
        let last_name = user::Name::new(last_name)
            .ok_or(E::InvalidBootstrapAdmin("last_name"))?;

        Ok(Self {
            email,
            password: secrecy::SecretBox::init_with(move || password),
            first_name,
            last_name,
            role: user::Role::Admin,
        })
    }
}

/// Creates the configured administrator account unless an account with the
/// same email already exists.
///
/// Returns `false` if the account existed already.
///
/// # Errors
///
/// If the storage fails.
pub async fn provision_admin(
    service: &Service,
    admin: command::CreateUser,
) -> Result<bool, Error> {
    match service.execute(admin).await {
        Ok(user) => {
            tracing::info!(user.id = %user.id, "administrator created");
            Ok(true)
        }
        Err(e) => {
            if let create_user::ExecutionError::EmailOccupied(email) = e.as_ref()
            {
                tracing::info!("administrator `{email}` already exists");
                return Ok(false);
            }
            Err(e.into_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use service::{
        command::CreateUser,
        domain::user::{Email, Password, Role},
        query, Query as _,
    };

    use crate::{config, tests::service};

    use super::provision_admin;

    fn admin(password: &str) -> config::Admin {
        config::Admin {
            email: "admin@musicstore.com".to_owned(),
            password: password.to_owned(),
            ..config::Admin::default()
        }
    }

    #[tokio::test]
    async fn creates_admin_once() {
        let svc = service();

        let created = provision_admin(
            &svc,
            CreateUser::try_from(admin("admin123")).unwrap(),
        )
        .await
        .unwrap();
        assert!(created);

        let again = provision_admin(
            &svc,
            CreateUser::try_from(admin("another")).unwrap(),
        )
        .await
        .unwrap();
        assert!(!again);

        let email = Email::new("admin@musicstore.com").unwrap();
        let user = svc
            .execute(query::user::ByEmail::by(&email))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.password_hash.verify(&Password::new("admin123").unwrap()));
    }

    #[test]
    fn rejects_invalid_admin() {
        let res = CreateUser::try_from(config::Admin {
            email: "not-an-email".to_owned(),
            ..admin("admin123")
        });
        assert!(matches!(
            res,
            Err(config::Error::InvalidBootstrapAdmin("email")),
        ));

        let res = CreateUser::try_from(admin(""));
        assert!(matches!(
            res,
            Err(config::Error::InvalidBootstrapAdmin("password")),
        ));
    }
}
