//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::extract::CookieJar;
use service::{
    command::{self, Command as _},
    domain::user::{session, Role, Session},
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{define_error, Error, Service, SessionCookie};

/// Request context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`SessionCookie`] settings.
    session_cookie: SessionCookie,

    /// Cookies of the HTTP request.
    cookies: CookieJar,

    /// Current [`Session`], if any.
    current_session: OnceCell<Option<Session>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the current [`Session`] of this [`Context`], if any.
    ///
    /// A missing, malformed, forged or expired [`session::Token`] means no
    /// [`Session`].
    pub async fn current_session(&self) -> Option<&Session> {
        self.current_session
            .get_or_init(|| async {
                let token = SessionCookie::token(&self.cookies)?;
                self.service
                    .execute(command::AuthorizeUserSession { token })
                    .await
                    .unwrap_or_else(|e| match e {})
            })
            .await
            .as_ref()
    }

    /// Returns the current [`Session`] of this [`Context`].
    ///
    /// # Errors
    ///
    /// If the current HTTP request is not authorized.
    pub async fn authorized_session(&self) -> Result<&Session, Error> {
        self.current_session()
            .await
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
    }

    /// Returns the current [`Session`] of this [`Context`] if it belongs to
    /// an administrator.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the authorized [`User`] is not an administrator.
    pub async fn admin_session(&self) -> Result<&Session, Error> {
        let session = self.authorized_session().await?;
        if session.role != Role::Admin {
            return Err(AuthError::NotAdmin.into());
        }
        Ok(session)
    }

    /// Returns the response [`CookieJar`] starting the [`Session`] of the
    /// provided [`session::Token`].
    #[must_use]
    pub fn start_session(&self, token: &session::Token) -> CookieJar {
        self.session_cookie.set(self.cookies.clone(), token)
    }

    /// Returns the response [`CookieJar`] ending the current [`Session`].
    #[must_use]
    pub fn end_session(&self) -> CookieJar {
        self.session_cookie.clear(self.cookies.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let session_cookie = parts
            .extensions
            .get::<SessionCookie>()
            .copied()
            .ok_or_else(|| {
                Error::internal(&"missing `SessionCookie` extension")
            })?;

        Ok(Self {
            service,
            session_cookie,
            cookies: CookieJar::from_headers(&parts.headers),
            current_session: OnceCell::new(),
        })
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Administrator privileges required"]
        NotAdmin,
    }
}
