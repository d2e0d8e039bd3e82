//! [`SessionCookie`] definitions.

use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use service::domain::user::session;

/// HTTP cookie carrying a [`session::Token`] between requests.
#[derive(Clone, Copy, Debug)]
pub struct SessionCookie {
    /// Indicator whether the cookie is restricted to HTTPS.
    secure: bool,
}

impl SessionCookie {
    /// Name of the cookie.
    pub const NAME: &'static str = "session";

    /// Lifetime of the cookie, matching the [`session::Session::LIFETIME`].
    pub const MAX_AGE: time::Duration = time::Duration::seconds(24 * 60 * 60);

    /// Creates a new [`SessionCookie`].
    ///
    /// `secure` cookies are only sent by browsers over HTTPS.
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Adds the cookie holding the provided [`session::Token`] to the
    /// [`CookieJar`].
    #[must_use]
    pub fn set(self, jar: CookieJar, token: &session::Token) -> CookieJar {
        jar.add(
            Cookie::build((Self::NAME, token.as_ref().to_owned()))
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(self.secure)
                .path("/")
                .max_age(Self::MAX_AGE),
        )
    }

    /// Removes the cookie from the [`CookieJar`].
    ///
    /// Does nothing if the request carried no such cookie.
    #[must_use]
    pub fn clear(self, jar: CookieJar) -> CookieJar {
        jar.remove(
            Cookie::build(Self::NAME)
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(self.secure)
                .path("/"),
        )
    }

    /// Returns the [`session::Token`] stored in the [`CookieJar`], if any.
    #[must_use]
    pub fn token(jar: &CookieJar) -> Option<session::Token> {
        jar.get(Self::NAME)
            .map(Cookie::value)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse as _;
    use axum_extra::extract::CookieJar;
    use http::{header, HeaderMap, HeaderValue};
    use service::domain::user::session;

    use super::SessionCookie;

    fn jar(cookie: Option<&'static str>) -> CookieJar {
        let mut headers = HeaderMap::new();
        if let Some(c) = cookie {
            drop(headers.insert(header::COOKIE, HeaderValue::from_static(c)));
        }
        CookieJar::from_headers(&headers)
    }

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        jar.into_response()
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect()
    }

    fn token(raw: &str) -> session::Token {
        raw.parse().unwrap()
    }

    #[test]
    fn sets_cookie_with_required_attributes() {
        let cookies =
            set_cookies(SessionCookie::new(true).set(jar(None), &token("t0k")));

        assert_eq!(cookies.len(), 1);
        let cookie = &cookies[0];
        assert!(cookie.starts_with("session=t0k"), "{cookie}");
        for attr in ["HttpOnly", "SameSite=Lax", "Secure", "Path=/"] {
            assert!(cookie.contains(attr), "`{attr}` missing in {cookie}");
        }
        assert!(cookie.contains("Max-Age=86400"), "{cookie}");
    }

    #[test]
    fn omits_secure_in_development() {
        let cookies = set_cookies(
            SessionCookie::new(false).set(jar(None), &token("t0k")),
        );

        assert!(!cookies[0].contains("Secure"), "{}", cookies[0]);
        assert!(cookies[0].contains("HttpOnly"), "{}", cookies[0]);
    }

    #[test]
    fn clears_present_cookie() {
        let cookies = set_cookies(
            SessionCookie::new(true).clear(jar(Some("session=t0k"))),
        );

        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("session="), "{}", cookies[0]);
        assert!(cookies[0].contains("Max-Age=0"), "{}", cookies[0]);
        assert!(cookies[0].contains("Path=/"), "{}", cookies[0]);
    }

    #[test]
    fn clearing_absent_cookie_is_noop() {
        let cookies = set_cookies(SessionCookie::new(true).clear(jar(None)));

        assert!(cookies.is_empty(), "{cookies:?}");
    }

    #[test]
    fn reads_token() {
        assert_eq!(
            SessionCookie::token(&jar(Some("other=1; session=t0k")))
                .map(|t| t.as_ref().to_owned()),
            Some("t0k".to_owned()),
        );
        assert!(SessionCookie::token(&jar(Some("session="))).is_none());
        assert!(SessionCookie::token(&jar(Some("other=1"))).is_none());
        assert!(SessionCookie::token(&jar(None)).is_none());
    }
}
