//! Authentication endpoints.

use axum::{extract::rejection::JsonRejection, Json};
use axum_extra::extract::CookieJar;
use derive_more::Debug;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user,
    query,
};

use crate::{api, define_error, AsError, Context, Error};

/// Credentials submitted to [`login()`].
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    /// Email of the signing in user.
    pub email: Option<String>,

    /// Password of the signing in user.
    #[debug(skip)]
    pub password: Option<String>,
}

/// Registration form submitted to [`register()`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Email of the new user.
    pub email: Option<String>,

    /// Password of the new user.
    #[debug(skip)]
    pub password: Option<String>,

    /// First name of the new user.
    pub first_name: Option<String>,

    /// Last name of the new user.
    pub last_name: Option<String>,
}

/// Result of [`logout()`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LogoutResult {
    /// Always `true`.
    pub success: bool,
}

/// Signs in a user with the provided [`Credentials`].
///
/// # Errors
///
/// Possible error codes:
/// - `FIELDS_REQUIRED` - email or password is missing;
/// - `INVALID_CREDENTIALS` - no user matches the provided credentials.
#[tracing::instrument(skip_all, fields(http.handler = "login"))]
pub async fn login(
    ctx: Context,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, Json<api::user::Response>), Error> {
    let Json(Credentials { email, password }) =
        payload.map_err(AsError::into_error)?;
    let (Some(email), Some(password)) = (required(email), required(password))
    else {
        return Err(AuthError::FieldsRequired.into());
    };

    // Malformed input can't match any stored account.
    let email =
        user::Email::new(email).ok_or(AuthError::InvalidCredentials)?;
    let password =
        user::Password::new(password).ok_or(AuthError::InvalidCredentials)?;

    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    tracing::info!(
        user.id = %output.user.id,
        user.role = %output.user.role,
        "signed in",
    );

    Ok((
        ctx.start_session(&output.token),
        Json(api::user::Response {
            user: Some(output.user.into()),
        }),
    ))
}

/// Registers a new user with the provided [`Registration`] and signs it in.
///
/// # Errors
///
/// Possible error codes:
/// - `FIELDS_REQUIRED` - any of the fields is missing;
/// - `INVALID_EMAIL`, `INVALID_PASSWORD`, `INVALID_NAME` - the field is
///   malformed;
/// - `USER_ALREADY_EXISTS` - the email is occupied by another user.
#[tracing::instrument(skip_all, fields(http.handler = "register"))]
pub async fn register(
    ctx: Context,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(CookieJar, Json<api::user::Response>), Error> {
    let Json(Registration {
        email,
        password,
        first_name,
        last_name,
    }) = payload.map_err(AsError::into_error)?;
    let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
        required(email),
        required(password),
        required(first_name),
        required(last_name),
    ) else {
        return Err(AuthError::FieldsRequired.into());
    };

    let email = user::Email::new(email).ok_or(AuthError::InvalidEmail)?;
    let password =
        user::Password::new(password).ok_or(AuthError::InvalidPassword)?;
    let first_name =
        user::Name::new(first_name.trim()).ok_or(AuthError::InvalidName)?;
    let last_name =
        user::Name::new(last_name.trim()).ok_or(AuthError::InvalidName)?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            email,
            password: secrecy::SecretBox::init_with(move || password),
            first_name,
            last_name,
            role: user::Role::User,
        })
        .await
        .map_err(AsError::into_error)?;
    let output = ctx
        .service()
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    tracing::info!(user.id = %output.user.id, "registered");

    Ok((
        ctx.start_session(&output.token),
        Json(api::user::Response {
            user: Some(output.user.into()),
        }),
    ))
}

/// Returns the profile of the currently signed in user, if any.
///
/// Storage failures are logged and answered as no user.
#[tracing::instrument(skip_all, fields(http.handler = "me"))]
pub async fn me(ctx: Context) -> Json<api::user::Response> {
    let Some(session) = ctx.current_session().await else {
        return Json(api::user::Response { user: None });
    };

    let user = ctx
        .service()
        .execute(query::user::ById::by(session.user_id))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("failed to load `User` of the session: {e}");
            None
        });

    Json(api::user::Response {
        user: user.map(Into::into),
    })
}

/// Signs out the current user by removing the session cookie.
#[expect(clippy::unused_async, reason = "`axum` handler")]
pub async fn logout(ctx: Context) -> (CookieJar, Json<LogoutResult>) {
    (ctx.end_session(), Json(LogoutResult { success: true }))
}

/// Returns the provided field if it's present and non-empty.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.is_empty())
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(AuthError::UserAlreadyExists.into()),
            Self::Hash(_) | Self::Join(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => {
                Some(AuthError::InvalidCredentials.into())
            }
            Self::Hash(_)
            | Self::Join(_)
            | Self::JsonWebTokenEncodeError(_)
            | Self::UserNotExists(_) => None,
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "FIELDS_REQUIRED"]
        #[status = BAD_REQUEST]
        #[message = "All fields are required"]
        FieldsRequired,

        #[code = "INVALID_EMAIL"]
        #[status = BAD_REQUEST]
        #[message = "Invalid email"]
        InvalidEmail,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Invalid password"]
        InvalidPassword,

        #[code = "INVALID_NAME"]
        #[status = BAD_REQUEST]
        #[message = "Invalid name"]
        InvalidName,

        #[code = "INVALID_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid credentials"]
        InvalidCredentials,

        #[code = "USER_ALREADY_EXISTS"]
        #[status = CONFLICT]
        #[message = "User already exists"]
        UserAlreadyExists,
    }
}
