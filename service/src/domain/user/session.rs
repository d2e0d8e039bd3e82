//! [`Session`] definitions.

use std::time::Duration;

use common::{unit, DateTime, DateTimeOf};
use derive_more::{AsRef, Debug, Display, Error, From, FromStr};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Claims of an authenticated [`User`], signed into a [`Token`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "userId")]
    pub user_id: user::Id,

    /// [`user::Email`] of the [`User`] this [`Session`] belongs to.
    pub email: user::Email,

    /// [`user::Role`] of the [`User`] at the moment of signing in.
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// [`Duration`] a [`Session`] stays valid for since its issuing.
    pub const LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

    /// [`Algorithm`] [`Token`]s are signed with.
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates a new [`Session`] issued at the provided [`DateTime`] and
    /// expiring after [`Session::LIFETIME`].
    #[must_use]
    pub fn new(
        user_id: user::Id,
        email: user::Email,
        role: user::Role,
        issued_at: DateTime,
    ) -> Self {
        Self {
            user_id,
            email,
            role,
            issued_at: issued_at.coerce(),
            expires_at: (issued_at + Self::LIFETIME).coerce(),
        }
    }

    /// Indicates whether this [`Session`] is expired at the provided
    /// [`DateTime`].
    #[must_use]
    pub fn is_expired_at(&self, at: DateTime) -> bool {
        self.expires_at.coerce() <= at
    }

    /// Signs this [`Session`] into a [`Token`] with the provided key.
    ///
    /// # Errors
    ///
    /// If [`jsonwebtoken`] fails to serialize or sign the claims.
    pub fn encode(
        &self,
        key: &EncodingKey,
    ) -> Result<Token, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&Header::new(Self::ALGORITHM), self, key)
            .map(Token)
    }
}

/// Opaque signed access token of a [`Session`].
#[derive(AsRef, Clone, Debug, FromStr)]
#[as_ref(str)]
#[debug("Token(..)")]
pub struct Token(String);

impl Token {
    /// Verifies this [`Token`] against the provided key and returns the
    /// [`Session`] signed into it.
    ///
    /// # Errors
    ///
    /// If this [`Token`] is malformed, signed with another key or algorithm,
    /// or its [`Session`] has expired.
    pub fn decode(&self, key: &DecodingKey) -> Result<Session, DecodeError> {
        let mut validation = Validation::new(Session::ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let session =
            jsonwebtoken::decode::<Session>(&self.0, key, &validation)?.claims;
        if session.is_expired_at(DateTime::now()) {
            return Err(DecodeError::Expired);
        }
        Ok(session)
    }
}

/// Error of [`Token::decode()`].
#[derive(Debug, Display, Error, From)]
pub enum DecodeError {
    /// [`jsonwebtoken`] rejected the [`Token`].
    #[display("Invalid JSON Web Token: {_0}")]
    Jwt(jsonwebtoken::errors::Error),

    /// [`Session`] has expired.
    #[display("`Session` has expired")]
    Expired,
}

/// [`DateTime`] when a [`Session`] was issued.
pub type IssueDateTime = DateTimeOf<(Session, unit::Creation)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
