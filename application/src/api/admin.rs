//! Administrator endpoints.

use axum::Json;
use service::{query, Query as _};

use crate::{api, AsError, Context, Error};

/// Returns the profile of the signed in administrator.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session is present;
/// - `NOT_ADMIN` - the signed in user is not an administrator.
#[tracing::instrument(skip_all, fields(http.handler = "admin_session"))]
pub async fn session(ctx: Context) -> Result<Json<api::user::Response>, Error> {
    let session = ctx.admin_session().await?;

    let user = ctx
        .service()
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(api::user::Response {
        user: user.map(Into::into),
    }))
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use secrecy::SecretBox;
    use serde_json::json;
    use service::{
        command::CreateUser,
        domain::user::{Email, Name, Password, Role},
        Command as _,
    };

    use crate::tests::{router, send, service};

    async fn sign_in(app: &axum::Router, email: &str, password: &str) -> String {
        send(
            app,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await
        .cookie()
    }

    #[tokio::test]
    async fn guards_admin_routes() {
        let svc = service();
        for (email, role) in
            [("admin@musicstore.com", Role::Admin), ("user@test.com", Role::User)]
        {
            drop(
                svc.execute(CreateUser {
                    email: Email::new(email).unwrap(),
                    password: SecretBox::new(Box::new(
                        Password::new("pass123").unwrap(),
                    )),
                    first_name: Name::new("Test").unwrap(),
                    last_name: Name::new("Account").unwrap(),
                    role,
                })
                .await
                .unwrap(),
            );
        }
        let app = router(svc);

        let anonymous =
            send(&app, Method::GET, "/api/admin/session", None, None).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
        assert_eq!(anonymous.json["code"], "AUTHORIZATION_REQUIRED");

        let forged = send(
            &app,
            Method::GET,
            "/api/admin/session",
            None,
            Some("session=forged.token.value"),
        )
        .await;
        assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

        let user = sign_in(&app, "user@test.com", "pass123").await;
        let customer =
            send(&app, Method::GET, "/api/admin/session", None, Some(&user))
                .await;
        assert_eq!(customer.status, StatusCode::FORBIDDEN);
        assert_eq!(customer.json["code"], "NOT_ADMIN");

        let admin = sign_in(&app, "admin@musicstore.com", "pass123").await;
        let resp =
            send(&app, Method::GET, "/api/admin/session", None, Some(&admin))
                .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json["user"]["email"], "admin@musicstore.com");
        assert_eq!(resp.json["user"]["role"], "admin");
    }
}
