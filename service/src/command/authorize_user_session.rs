//! [`Command`] for authorizing a [`User`].

use std::convert::Infallible;

use derive_more::From;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`session::Token`].
///
/// Never fails: any invalid, forged or expired [`session::Token`] results in
/// no [`Session`] at all.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Option<Session>;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let AuthorizeUserSession { token } = cmd;

        Ok(token
            .decode(&self.config().jwt_decoding_key)
            .inspect_err(|e| tracing::debug!("`Session` rejected: {e}"))
            .ok())
    }
}
