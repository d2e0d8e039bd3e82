//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;

use std::sync::Arc;

use derive_more::Debug;
use tokio::sync::OnceCell;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [bcrypt] work factor of new [`domain::user::PasswordHash`]es.
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    pub password_cost: u32,
}

impl Config {
    /// Creates a new [`Config`] signing [`domain::user::Session`]s with the
    /// provided HMAC `secret` and hashing passwords with the
    /// [`domain::user::PasswordHash::DEFAULT_COST`].
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            password_cost: domain::user::PasswordHash::DEFAULT_COST,
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`domain::user::PasswordHash`] verified against when no
    /// [`domain::User`] matches the signing in email.
    ///
    /// Computed once with the configured cost on first use.
    decoy_password_hash: Arc<OnceCell<domain::user::PasswordHash>>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self {
            config,
            database,
            decoy_password_hash: Arc::default(),
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
impl Service<infra::Memory> {
    /// Creates a new [`Service`] over an empty [`infra::Memory`] hashing
    /// passwords with the lowest cost.
    pub(crate) fn for_tests() -> Self {
        let mut config = Config::new(b"test-secret");
        config.password_cost = 4;
        Self::new(config, infra::Memory::new())
    }
}
