//! Handlers for the signed-in user's own account record.
//!
//! ```text
//! GET /api/accounts/profile
//! PATCH /api/accounts/profile {"title":"Engineer","bio":"..."}
//! DELETE /api/accounts/profile
//! ```
//!
//! `PUT` and `PATCH` both merge: fields left out of the body keep their
//! stored values.

use actix_web::{HttpResponse, delete, get, patch, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AccountPatch, AccountPatchInput};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::AccountResponse;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const RETRIEVED: &str = "Profile retrieved successfully";
const UPDATED: &str = "Profile updated successfully";

/// Partial account update. Every member is optional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountPatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "full_name")]
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

impl From<AccountPatchRequest> for AccountPatchInput {
    fn from(value: AccountPatchRequest) -> Self {
        Self {
            username: value.username,
            email: value.email,
            full_name: value.full_name,
            title: value.title,
            bio: value.bio,
            location: value.location,
            website: value.website,
            phone: value.phone,
        }
    }
}

async fn apply_patch(
    state: &HttpState,
    user: &AuthenticatedUser,
    payload: AccountPatchRequest,
) -> ApiResult<HttpResponse> {
    let patch = AccountPatch::try_new(payload.into())?;
    let account = state.account_profile.update(user.id(), patch).await?;
    Ok(Envelope::ok(AccountResponse::from(account), UPDATED))
}

/// Fetch the caller's account.
#[utoipa::path(
    get,
    path = "/api/accounts/profile",
    responses(
        (status = 200, description = "Account", body = Envelope<AccountResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "getAccountProfile"
)]
#[get("/profile")]
pub async fn get_account_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let account = state.account_profile.get(user.id()).await?;
    Ok(Envelope::ok(AccountResponse::from(account), RETRIEVED))
}

/// Merge the supplied fields into the caller's account.
#[utoipa::path(
    put,
    path = "/api/accounts/profile",
    request_body = AccountPatchRequest,
    responses(
        (status = 200, description = "Updated account", body = Envelope<AccountResponse>),
        (status = 400, description = "Invalid fields or duplicate username/email", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "replaceAccountProfile"
)]
#[put("/profile")]
pub async fn put_account_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AccountPatchRequest>,
) -> ApiResult<HttpResponse> {
    apply_patch(&state, &user, payload.into_inner()).await
}

/// Merge the supplied fields into the caller's account.
#[utoipa::path(
    patch,
    path = "/api/accounts/profile",
    request_body = AccountPatchRequest,
    responses(
        (status = 200, description = "Updated account", body = Envelope<AccountResponse>),
        (status = 400, description = "Invalid fields or duplicate username/email", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "patchAccountProfile"
)]
#[patch("/profile")]
pub async fn patch_account_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<AccountPatchRequest>,
) -> ApiResult<HttpResponse> {
    apply_patch(&state, &user, payload.into_inner()).await
}

/// Delete the caller's account and everything it owns.
#[utoipa::path(
    delete,
    path = "/api/accounts/profile",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "deleteAccount"
)]
#[delete("/profile")]
pub async fn delete_account_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    state.account_profile.delete(user.id()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_account_profile)
        .service(put_account_profile)
        .service(patch_account_profile)
        .service(delete_account_profile);
}
