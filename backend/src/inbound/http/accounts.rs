//! Registration and login handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Alice","email":"alice@example.com","password":"..."}
//! POST /api/auth/login    {"email":"alice@example.com","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Credentials, Error, NewRegistration, UserProfile};

use super::ApiResult;
use super::schemas::ErrorSchema;
use super::state::HttpState;
use super::validation::missing_field_error;

/// Request payload for `POST /api/auth/register`.
///
/// All fields optional at the serde layer so missing ones produce the
/// structured validation error rather than a bare deserialisation failure.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name; required.
    pub name: Option<String>,
    /// Login email; required, unique.
    pub email: Option<String>,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Plaintext password; required, hashed before storage.
    pub password: Option<String>,
}

/// Response payload for a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Identifier of the new account.
    #[serde(rename = "userId")]
    pub user_id: i32,
}

fn parse_registration(payload: RegisterRequest) -> Result<NewRegistration, Error> {
    let required = |value: Option<String>, field: &str| {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing_field_error(field))
    };
    Ok(NewRegistration {
        name: required(payload.name, "name")?,
        email: required(payload.email, "email")?,
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
        password: required(payload.password, "password")?,
    })
}

/// Register a new user account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing fields or duplicate email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let user_id = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_owned(),
        user_id: user_id.get(),
    }))
}

/// Request payload for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Login email; required.
    pub email: Option<String>,
    /// Plaintext password; required.
    pub password: Option<String>,
}

/// Response payload for a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token, valid for 24 hours.
    pub token: String,
    /// Profile of the authenticated account.
    #[schema(value_type = Object)]
    pub user: UserProfile,
}

/// Authenticate and mint a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let email = email.filter(|v| !v.trim().is_empty()).ok_or_else(|| missing_field_error("email"))?;
    let password = password
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing_field_error("password"))?;

    let outcome = state.accounts.login(Credentials { email, password }).await?;
    Ok(web::Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn full_request() -> RegisterRequest {
        RegisterRequest {
            name: Some("Alice".to_owned()),
            email: Some("alice@example.com".to_owned()),
            phone: None,
            password: Some("s3cret".to_owned()),
        }
    }

    #[test]
    fn registration_passes_through_all_fields() {
        let parsed = parse_registration(full_request()).expect("valid");
        assert_eq!(parsed.name, "Alice");
        assert_eq!(parsed.email, "alice@example.com");
        assert_eq!(parsed.phone, None);
    }

    #[rstest]
    #[case(RegisterRequest { name: None, ..full_request() }, "name")]
    #[case(RegisterRequest { email: Some("  ".to_owned()), ..full_request() }, "email")]
    #[case(RegisterRequest { password: None, ..full_request() }, "password")]
    fn registration_requires_name_email_password(
        #[case] payload: RegisterRequest,
        #[case] field: &str,
    ) {
        let err = parse_registration(payload).expect_err("missing field");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some(field)
        );
    }

    #[test]
    fn blank_phone_is_normalised_to_none() {
        let parsed = parse_registration(RegisterRequest {
            phone: Some("   ".to_owned()),
            ..full_request()
        })
        .expect("valid");
        assert_eq!(parsed.phone, None);
    }
}
