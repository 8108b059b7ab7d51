//! Identity API handlers.
//!
//! ```text
//! POST /api/accounts/register {"username":"ada","email":"ada@example.com","password":"..."}
//! POST /api/accounts/login {"username":"ada","password":"..."}
//! POST /api/accounts/logout {"refreshToken":"..."}
//! POST /api/accounts/token/refresh {"refresh":"..."}
//! POST /api/accounts/forgot-password {"email":"ada@example.com"}
//! POST /api/accounts/reset-password {"token":"...","newPassword":"...","confirmPassword":"..."}
//! POST /api/accounts/change-password {"oldPassword":"...","newPassword":"...","confirmPassword":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::AuthSession;
use crate::domain::{
    Account, ConfirmedPassword, Error, FieldErrors, LoginCredentials, PasswordChange,
    PlainPassword, Registration, RegistrationInput, ResetToken, TokenPair,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::{Envelope, MessageEnvelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const REQUIRED: &str = "This field is required.";

/// Account representation: identity plus contact fields. Never carries
/// credential material.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    pub title: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub phone: String,
    pub date_joined: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(value: Account) -> Self {
        let Account { user, contact } = value;
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().to_string(),
            title: contact.title,
            bio: contact.bio,
            location: contact.location,
            website: contact.website,
            phone: contact.phone,
            date_joined: user.joined_at(),
        }
    }
}

/// Access and refresh token pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokensResponse {
    pub refresh: String,
    pub access: String,
}

impl From<TokenPair> for TokensResponse {
    fn from(value: TokenPair) -> Self {
        Self {
            refresh: value.refresh,
            access: value.access,
        }
    }
}

/// Payload returned by registration and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: AccountResponse,
    pub tokens: TokensResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(value: AuthSession) -> Self {
        Self {
            user: AccountResponse::from(value.account),
            tokens: TokensResponse::from(value.tokens),
        }
    }
}

/// Registration request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Str0ng!Pass")]
    pub password: String,
    #[serde(alias = "full_name")]
    #[schema(example = "Ada Lovelace")]
    pub full_name: Option<String>,
}

impl From<RegisterRequest> for RegistrationInput {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            password: value.password,
            full_name: value.full_name,
        }
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "Str0ng!Pass")]
    pub password: String,
}

/// Logout request body. The token is optional; logout succeeds regardless.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(alias = "refresh_token", alias = "refresh")]
    pub refresh_token: Option<String>,
}

/// Refresh request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken", alias = "refresh_token")]
    pub refresh: String,
}

/// Password reset request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Password reset confirmation body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "password", alias = "new_password")]
    pub new_password: String,
    #[serde(alias = "password2", alias = "confirm_password")]
    pub confirm_password: String,
}

/// Password change body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "old_password")]
    pub old_password: String,
    #[serde(alias = "new_password")]
    pub new_password: String,
    #[serde(alias = "new_password2", alias = "confirm_password")]
    pub confirm_password: String,
}

impl ResetPasswordRequest {
    /// Validate the token and both password entries, reporting every failure.
    fn into_parts(self) -> Result<(ResetToken, ConfirmedPassword), FieldErrors> {
        let mut errors = FieldErrors::default();
        let token = collect(&mut errors, ResetToken::from_client(&self.token));
        let password = collect(
            &mut errors,
            ConfirmedPassword::try_new("newPassword", &self.new_password, &self.confirm_password),
        );
        match (token, password) {
            (Some(token), Some(password)) => Ok((token, password)),
            _ => Err(errors),
        }
    }
}

fn collect<T>(errors: &mut FieldErrors, result: Result<T, FieldErrors>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.merge(err);
            None
        }
    }
}

impl TryFrom<ChangePasswordRequest> for PasswordChange {
    type Error = FieldErrors;

    fn try_from(value: ChangePasswordRequest) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::default();
        if value.old_password.is_empty() {
            errors.add("oldPassword", REQUIRED);
        }
        let replacement = collect(
            &mut errors,
            ConfirmedPassword::try_new("newPassword", &value.new_password, &value.confirm_password),
        );
        match replacement {
            Some(replacement) if errors.is_empty() => Ok(Self {
                current: PlainPassword::new(value.old_password),
                replacement,
            }),
            _ => Err(errors),
        }
    }
}

/// Create an account, provision its profiles and sign it in.
#[utoipa::path(
    post,
    path = "/api/accounts/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<AuthResponse>),
        (status = 400, description = "Invalid registration", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_new(payload.into_inner().into())?;
    let session = state.accounts.register(registration).await?;
    Ok(Envelope::created(
        AuthResponse::from(session),
        "User registered successfully",
    ))
}

/// Exchange credentials for a token pair.
///
/// An unknown username and a wrong password are reported with different
/// messages.
#[utoipa::path(
    post,
    path = "/api/accounts/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Envelope<AuthResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(|err| Error::validation(FieldErrors::from(err)))?;
    let session = state.accounts.login(credentials).await?;
    Ok(Envelope::ok(AuthResponse::from(session), "Login successful"))
}

/// Blacklist the caller's refresh token.
///
/// Always succeeds for an authenticated caller, whatever the token.
#[utoipa::path(
    post,
    path = "/api/accounts/logout",
    request_body(content = LogoutRequest, description = "Optional refresh token"),
    responses(
        (status = 200, description = "Signed out", body = MessageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Option<web::Json<LogoutRequest>>,
) -> ApiResult<HttpResponse> {
    let refresh_token = payload
        .and_then(|body| body.into_inner().refresh_token)
        .filter(|token| !token.trim().is_empty());
    state.accounts.logout(user.id(), refresh_token).await?;
    Ok(MessageEnvelope::ok("Successfully logged out"))
}

/// Rotate a refresh token into a fresh token pair.
#[utoipa::path(
    post,
    path = "/api/accounts/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = Envelope<TokensResponse>),
        (status = 400, description = "Missing token", body = ErrorSchema),
        (status = 401, description = "Token invalid, expired or blacklisted", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "refreshToken",
    security([])
)]
#[post("/token/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<HttpResponse> {
    let RefreshRequest { refresh: presented } = payload.into_inner();
    let presented = presented.trim();
    if presented.is_empty() {
        return Err(FieldErrors::single("refresh", REQUIRED).into());
    }
    let tokens = state.accounts.refresh(presented).await?;
    Ok(Envelope::ok(
        TokensResponse::from(tokens),
        "Token refreshed successfully",
    ))
}

/// Start a password reset for the account owning an email address.
///
/// Responds identically whether or not the address is known.
#[utoipa::path(
    post,
    path = "/api/accounts/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset requested", body = MessageEnvelope),
        (status = 400, description = "Invalid email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ForgotPasswordRequest { email } = payload.into_inner();
    if email.trim().is_empty() {
        return Err(FieldErrors::single("email", REQUIRED).into());
    }
    state.accounts.request_password_reset(&email).await?;
    Ok(MessageEnvelope::ok(
        "If an account exists for this email, a reset token has been sent",
    ))
}

/// Set a new password using a reset token.
#[utoipa::path(
    post,
    path = "/api/accounts/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageEnvelope),
        (status = 400, description = "Invalid token or password", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let (token, password) = payload.into_inner().into_parts()?;
    state.accounts.confirm_password_reset(token, password).await?;
    Ok(MessageEnvelope::ok("Password has been reset successfully"))
}

/// Replace the caller's password.
#[utoipa::path(
    post,
    path = "/api/accounts/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageEnvelope),
        (status = 400, description = "Invalid password", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "changePassword"
)]
#[post("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let change = PasswordChange::try_from(payload.into_inner())?;
    state.accounts.change_password(user.id(), change).await?;
    Ok(MessageEnvelope::ok("Password changed successfully"))
}

/// Register the identity endpoints under `/api/accounts`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/accounts")
            .service(register)
            .service(login)
            .service(logout)
            .service(refresh)
            .service(forgot_password)
            .service(reset_password)
            .service(change_password)
            .configure(super::account_profile::configure),
    );
}
