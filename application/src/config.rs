//! [`Config`]-related definitions.

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Debug, Display, Error as StdError};
use serde::Deserialize;
use service::domain::user::PasswordHash;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Database configuration.
    pub database: Database,

    /// Accounts provisioned on startup.
    pub bootstrap: Bootstrap,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Error of converting a [`Config`] into the runtime settings.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [JWT] secret is not configured.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[display("`service.jwt_secret` must be set to a non-empty value")]
    MissingJwtSecret,

    /// Field of the [`Admin`] account is invalid.
    #[display("`bootstrap.admin.{_0}` is invalid")]
    InvalidBootstrapAdmin(#[error(not(source))] &'static str),

    /// [bcrypt] work factor is out of the supported range.
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    #[display(
        "`service.password_cost` must be within {}..={}, got {_0}",
        PasswordHash::MIN_COST,
        PasswordHash::MAX_COST,
    )]
    InvalidPasswordCost(#[error(not(source))] u32),
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [`Mode`] the server runs in.
    pub mode: Mode,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// Mode the server runs in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local development over plain HTTP.
    Development,

    /// Production deployment behind HTTPS.
    #[default]
    Production,
}

impl Mode {
    /// Indicates whether cookies must carry the `Secure` attribute in this
    /// [`Mode`].
    #[must_use]
    pub fn is_secure(self) -> bool {
        self != Self::Development
    }
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    ///
    /// Credentialed requests are only allowed for explicitly listed origins.
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// Required: startup fails if it's empty.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[debug(skip)]
    pub jwt_secret: String,

    /// [bcrypt] work factor of new password hashes.
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    #[default(PasswordHash::DEFAULT_COST)]
    pub password_cost: u32,
}

impl TryFrom<Service> for service::Config {
    type Error = Error;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service {
            jwt_secret,
            password_cost,
        } = value;

        if jwt_secret.trim().is_empty() {
            return Err(Error::MissingJwtSecret);
        }
        if !(PasswordHash::MIN_COST..=PasswordHash::MAX_COST)
            .contains(&password_cost)
        {
            return Err(Error::InvalidPasswordCost(password_cost));
        }

        let mut config = Self::new(jwt_secret.as_bytes());
        config.password_cost = password_cost;
        Ok(config)
    }
}

/// Database configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Database {
    /// [`DatabaseKind`] to store data in.
    pub kind: DatabaseKind,

    /// Postgres configuration.
    pub postgres: Postgres,
}

/// Kind of the database to store data in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// Process memory, lost on restart.
    Memory,

    /// Postgres server.
    #[default]
    Postgres,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    #[debug(skip)]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Accounts provisioned on startup.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Bootstrap {
    /// Administrator account to create if it doesn't exist yet.
    pub admin: Option<Admin>,
}

/// Administrator account provisioned on startup.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Admin {
    /// Email of the administrator.
    pub email: String,

    /// Password of the administrator.
    #[debug(skip)]
    pub password: String,

    /// First name of the administrator.
    #[default("Store".to_owned())]
    pub first_name: String,

    /// Last name of the administrator.
    #[default("Admin".to_owned())]
    pub last_name: String,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use config::{ConfigBuilder, File, FileFormat};

    use super::{Config, DatabaseKind, Error, Mode, Service};

    fn parse(toml: &str) -> Config {
        ConfigBuilder::<config::builder::DefaultState>::default()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn fills_defaults() {
        let conf = parse("");

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.mode, Mode::Production);
        assert_eq!(conf.database.kind, DatabaseKind::Postgres);
        assert_eq!(conf.service.password_cost, 12);
        assert!(conf.service.jwt_secret.is_empty());
        assert!(conf.bootstrap.admin.is_none());
    }

    #[test]
    fn reads_sections() {
        let conf = parse(
            r#"
            [server]
            mode = "development"

            [service]
            jwt_secret = "s3cr3t"

            [database]
            kind = "memory"

            [bootstrap.admin]
            email = "admin@musicstore.com"
            password = "admin123"
            "#,
        );

        assert_eq!(conf.server.mode, Mode::Development);
        assert!(!conf.server.mode.is_secure());
        assert_eq!(conf.service.jwt_secret, "s3cr3t");
        assert_eq!(conf.database.kind, DatabaseKind::Memory);

        let admin = conf.bootstrap.admin.unwrap();
        assert_eq!(admin.email, "admin@musicstore.com");
        assert_eq!(admin.first_name, "Store");
    }

    #[test]
    fn requires_jwt_secret() {
        for secret in ["", "   "] {
            let res = service::Config::try_from(Service {
                jwt_secret: secret.to_owned(),
                ..Service::default()
            });

            assert!(matches!(res, Err(Error::MissingJwtSecret)));
        }

        let conf = service::Config::try_from(Service {
            jwt_secret: "s3cr3t".to_owned(),
            password_cost: 10,
        })
        .unwrap();
        assert_eq!(conf.password_cost, 10);
    }

    #[test]
    fn rejects_unsupported_password_cost() {
        for cost in [0, 3, 32, 99] {
            let res = service::Config::try_from(Service {
                jwt_secret: "s3cr3t".to_owned(),
                password_cost: cost,
            });

            assert!(
                matches!(res, Err(Error::InvalidPasswordCost(c)) if c == cost),
                "cost {cost} accepted",
            );
        }

        for cost in [4, 12, 31] {
            assert!(service::Config::try_from(Service {
                jwt_secret: "s3cr3t".to_owned(),
                password_cost: cost,
            })
            .is_ok());
        }
    }

    #[test]
    fn loads_partial_config() {
        let conf = parse(
            r#"
            [service]
            jwt_secret = "s3cr3t"
            "#,
        );

        assert_eq!(conf.service.jwt_secret, "s3cr3t");
        assert_eq!(conf.service.password_cost, 12);
        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.database.kind, DatabaseKind::Postgres);
        assert!(matches!(conf.log.level, super::LogLevel::Info));
        assert!(service::Config::try_from(conf.service).is_ok());
    }

    #[test]
    fn hides_secrets_in_debug() {
        let conf = parse(
            r#"
            [service]
            jwt_secret = "s3cr3t"

            [bootstrap.admin]
            email = "admin@musicstore.com"
            password = "admin123"
            "#,
        );

        let debug = format!("{conf:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("admin123"));
    }
}
