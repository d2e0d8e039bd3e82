//! [`User`] definitions.

pub mod password;
pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use self::{
    password::{Password, PasswordHash},
    session::Session,
};

/// Storefront user, either a customer or an administrator.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Email`] this [`User`] signs in with.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// First [`Name`] of this [`User`].
    pub first_name: Name,

    /// Last [`Name`] of this [`User`].
    pub last_name: Name,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// [`User`] which is not stored yet, so has no [`Id`] assigned.
#[derive(Clone, Debug)]
pub struct New {
    /// [`Email`] of the new [`User`].
    pub email: Email,

    /// [`PasswordHash`] of the new [`User`].
    pub password_hash: PasswordHash,

    /// First [`Name`] of the new [`User`].
    pub first_name: Name,

    /// Last [`Name`] of the new [`User`].
    pub last_name: Name,

    /// [`Role`] of the new [`User`].
    pub role: Role,

    /// [`DateTime`] when the new [`User`] was created.
    pub created_at: CreationDateTime,
}

impl New {
    /// Turns this [`New`] into a [`User`] stored under the provided [`Id`].
    #[must_use]
    pub fn into_user(self, id: Id) -> User {
        let Self {
            email,
            password_hash,
            first_name,
            last_name,
            role,
            created_at,
        } = self;
        User {
            id,
            email,
            password_hash,
            first_name,
            last_name,
            role,
            created_at,
        }
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

define_kind! {
    #[doc = "Role of a `User` deciding what it is allowed to do."]
    enum Role {
        #[doc = "Storefront customer."]
        User = 1,

        #[doc = "Storefront administrator."]
        Admin = 2,
    }
}

/// Name (either first or last) of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[serde(into = "String", try_from = "String")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

impl TryFrom<String> for Email {
    type Error = &'static str;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        Self::new(address).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::{Email, Name, Role};

    #[test]
    fn accepts_valid_emails() {
        for e in ["admin@musicstore.com", "user@test.com", "a.b+c@d.co"] {
            assert!(Email::new(e).is_some(), "`{e}` rejected");
        }
    }

    #[test]
    fn rejects_invalid_emails() {
        for e in ["", "admin", "admin@", "@musicstore.com", "a b@c.d", " a@b.c"]
        {
            assert!(Email::new(e).is_none(), "`{e}` accepted");
        }
    }

    #[test]
    fn validates_email_on_deserialization() {
        let email: Email = serde_json::from_str(r#""a@b.com""#).unwrap();
        assert_eq!(email.to_string(), "a@b.com");
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""a@b.com""#);

        assert!(serde_json::from_str::<Email>(r#""not an email""#).is_err());
    }

    #[test]
    fn checks_name_format() {
        assert!(Name::new("Иван").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" Ivan").is_none());
        assert!(Name::new("Ivan ").is_none());
        assert!(Name::new("x".repeat(513)).is_none());
    }

    #[test]
    fn role_uses_lowercase_representation() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    }
}
