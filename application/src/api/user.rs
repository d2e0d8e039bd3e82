//! [`User`]-related definitions.

use serde::Serialize;
use service::domain::{self, user};

/// Public profile of a [`domain::User`].
///
/// Never exposes the [`user::PasswordHash`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ID of this [`User`].
    pub id: user::Id,

    /// Email of this [`User`].
    pub email: user::Email,

    /// First name of this [`User`].
    pub first_name: String,

    /// Last name of this [`User`].
    pub last_name: String,

    /// Role of this [`User`].
    pub role: user::Role,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        let domain::User {
            id,
            email,
            first_name,
            last_name,
            role,
            ..
        } = user;
        Self {
            id,
            email,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
        }
    }
}

/// Response carrying an optional [`User`].
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    /// [`User`] the response is about.
    pub user: Option<User>,
}
