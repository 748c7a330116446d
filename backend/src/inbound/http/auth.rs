//! Account handlers: sign in, sign up, sign out and the current identity.
//!
//! ```text
//! POST /api/v1/login  {"email":"ada@example.com","password":"analytical"}
//! POST /api/v1/signup {"email":"ada@example.com","password":"analytical"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Identity, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, IdentitySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Credentials body shared by `POST /login` and `POST /signup`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "analytical")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyEmail => ("email", "empty_email"),
        LoginValidationError::MalformedEmail => ("email", "malformed_email"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn credentials(payload: web::Json<LoginRequest>) -> ApiResult<LoginCredentials> {
    LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)
}

/// Sign in with email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = IdentitySchema,
            headers(("Set-Cookie" = String, description = "authToken session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Auth provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Identity>> {
    let credentials = credentials(payload)?;
    let issued = state.auth.sign_in(&credentials).await?;
    session.persist(&issued)?;
    Ok(web::Json(issued.identity))
}

/// Register a new account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Account created", body = IdentitySchema,
            headers(("Set-Cookie" = String, description = "authToken session cookie"))),
        (status = 400, description = "Invalid request or weak password", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Auth provider unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload)?;
    let issued = state.auth.sign_up(&credentials).await?;
    session.persist(&issued)?;
    Ok(HttpResponse::Created().json(issued.identity))
}

/// End the session. Always succeeds, signed in or not.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(token) = session.token()? {
        state.auth.sign_out(&token).await;
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// The signed-in identity.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current identity", body = IdentitySchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<web::Json<Identity>> {
    let (identity, _) = session.authenticate(&state.auth).await?;
    Ok(web::Json(identity))
}
