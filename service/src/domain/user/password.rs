//! [`Password`] hashing and verification.

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use secrecy::{zeroize::Zeroize, CloneableSecret};

#[cfg(doc)]
use crate::domain::User;

/// Plaintext password of a [`User`].
///
/// Is expected to be kept inside a [`secrecy::SecretBox`] while travelling
/// through the [`Service`](crate::Service).
#[derive(Clone, Debug, Eq, PartialEq)]
#[debug("Password(..)")]
pub struct Password(String);

impl Password {
    /// Maximum number of bytes in a [`Password`].
    ///
    /// [bcrypt] ignores everything past this length.
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    pub const MAX_LEN: usize = 72;

    /// Creates a new [`Password`] if the given `password` is valid.
    ///
    /// Strength is not checked here.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.len() <= Self::MAX_LEN
    }
}

impl std::str::FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Salted [bcrypt] hash of a [`Password`].
///
/// Neither [`Debug`] nor anything else reveals the underlying value.
///
/// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
#[derive(Clone, Debug, Eq, PartialEq)]
#[debug("PasswordHash(..)")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Default [bcrypt] work factor.
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    pub const DEFAULT_COST: u32 = 12;

    /// Lowest [bcrypt] work factor accepted by [`PasswordHash::new()`].
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    pub const MIN_COST: u32 = 4;

    /// Highest [bcrypt] work factor accepted by [`PasswordHash::new()`].
    ///
    /// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
    pub const MAX_COST: u32 = 31;

    /// Hashes the provided [`Password`] with a fresh random salt and the
    /// given `cost`.
    ///
    /// Blocks the current thread for the whole hash computation.
    ///
    /// # Errors
    ///
    /// If the `cost` is out of the supported range, or the hashing itself
    /// fails.
    pub fn new(password: &Password, cost: u32) -> Result<Self, HashError> {
        bcrypt::hash(password.0.as_bytes(), cost)
            .map(Self)
            .map_err(HashError)
    }

    /// Hashes a fixed [`Password`] no [`User`] can sign in with, for
    /// verifying against when the signing in [`User`] is unknown.
    ///
    /// # Errors
    ///
    /// If the `cost` is out of the supported range.
    pub fn decoy(cost: u32) -> Result<Self, HashError> {
        Self::new(&Password("decoy".to_owned()), cost)
    }

    /// Checks whether the provided [`Password`] matches this [`PasswordHash`].
    ///
    /// A malformed [`PasswordHash`] never matches.
    ///
    /// Blocks the current thread for the whole hash computation.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        bcrypt::verify(password.0.as_bytes(), &self.0).unwrap_or_else(|e| {
            tracing::warn!("failed to verify against `PasswordHash`: {e}");
            false
        })
    }
}

/// Error of hashing a [`Password`].
#[derive(Debug, Display, Error)]
#[display("Failed to hash a `Password`: {_0}")]
pub struct HashError(bcrypt::BcryptError);
