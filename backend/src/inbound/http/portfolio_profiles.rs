//! Portfolio profile handlers.
//!
//! ```text
//! GET /api/portfolio/profiles
//! GET /api/portfolio/profiles/me
//! PATCH /api/portfolio/profiles/me {"title":"Engineer"}
//! GET /api/portfolio/profiles/{id}
//! ```
//!
//! Updates always merge. Another user's profile is invisible to reads (404)
//! and forbidden to writes (403).

use actix_web::{HttpResponse, get, patch, put, web};

use crate::domain::ProfilePatch;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::portfolio_dto::{ProfilePatchRequest, ProfileResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_profile_id;

const LISTED: &str = "Profiles retrieved successfully";
const RETRIEVED: &str = "Profile retrieved successfully";
const UPDATED: &str = "Profile updated successfully";

async fn update_mine(
    state: &HttpState,
    user: &AuthenticatedUser,
    payload: ProfilePatchRequest,
) -> ApiResult<HttpResponse> {
    let patch = ProfilePatch::try_new(payload.into())?;
    let overview = state.portfolio_profiles.update_mine(user.id(), patch).await?;
    Ok(Envelope::ok(ProfileResponse::from(overview), UPDATED))
}

async fn update_by_id(
    state: &HttpState,
    user: &AuthenticatedUser,
    raw_id: &str,
    payload: ProfilePatchRequest,
) -> ApiResult<HttpResponse> {
    let id = parse_profile_id(raw_id)?;
    let patch = ProfilePatch::try_new(payload.into())?;
    let overview = state
        .portfolio_profiles
        .update(user.id(), &id, patch)
        .await?;
    Ok(Envelope::ok(ProfileResponse::from(overview), UPDATED))
}

/// List the profiles visible to the caller: only their own.
#[utoipa::path(
    get,
    path = "/api/portfolio/profiles",
    responses(
        (status = 200, description = "Caller's profile", body = Envelope<Vec<ProfileResponse>>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "listProfiles"
)]
#[get("/profiles")]
pub async fn list_profiles(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let profiles = state.portfolio_profiles.list(user.id()).await?;
    let body: Vec<_> = profiles.into_iter().map(ProfileResponse::from).collect();
    Ok(Envelope::ok(body, LISTED))
}

/// Fetch the caller's profile, creating it on first access.
#[utoipa::path(
    get,
    path = "/api/portfolio/profiles/me",
    responses(
        (status = 200, description = "Caller's profile", body = Envelope<ProfileResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "getMyProfile"
)]
#[get("/profiles/me")]
pub async fn get_my_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let overview = state.portfolio_profiles.get_mine(user.id()).await?;
    Ok(Envelope::ok(ProfileResponse::from(overview), RETRIEVED))
}

/// Merge the supplied fields into the caller's profile.
#[utoipa::path(
    put,
    path = "/api/portfolio/profiles/me",
    request_body = ProfilePatchRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<ProfileResponse>),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "replaceMyProfile"
)]
#[put("/profiles/me")]
pub async fn put_my_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ProfilePatchRequest>,
) -> ApiResult<HttpResponse> {
    update_mine(&state, &user, payload.into_inner()).await
}

/// Merge the supplied fields into the caller's profile.
#[utoipa::path(
    patch,
    path = "/api/portfolio/profiles/me",
    request_body = ProfilePatchRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<ProfileResponse>),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "patchMyProfile"
)]
#[patch("/profiles/me")]
pub async fn patch_my_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ProfilePatchRequest>,
) -> ApiResult<HttpResponse> {
    update_mine(&state, &user, payload.into_inner()).await
}

/// Fetch a profile by id. Other users' profiles are not found.
#[utoipa::path(
    get,
    path = "/api/portfolio/profiles/{id}",
    params(("id" = String, Path, description = "Profile identifier")),
    responses(
        (status = 200, description = "Profile", body = Envelope<ProfileResponse>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown or foreign profile", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "getProfile"
)]
#[get("/profiles/{id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_profile_id(&path)?;
    let overview = state.portfolio_profiles.get(user.id(), &id).await?;
    Ok(Envelope::ok(ProfileResponse::from(overview), RETRIEVED))
}

/// Merge the supplied fields into a profile by id.
#[utoipa::path(
    put,
    path = "/api/portfolio/profiles/{id}",
    params(("id" = String, Path, description = "Profile identifier")),
    request_body = ProfilePatchRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<ProfileResponse>),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "Unknown profile", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "replaceProfile"
)]
#[put("/profiles/{id}")]
pub async fn put_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ProfilePatchRequest>,
) -> ApiResult<HttpResponse> {
    update_by_id(&state, &user, &path, payload.into_inner()).await
}

/// Merge the supplied fields into a profile by id.
#[utoipa::path(
    patch,
    path = "/api/portfolio/profiles/{id}",
    params(("id" = String, Path, description = "Profile identifier")),
    request_body = ProfilePatchRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<ProfileResponse>),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Profile belongs to another user", body = ErrorSchema),
        (status = 404, description = "Unknown profile", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["portfolio"],
    operation_id = "patchProfile"
)]
#[patch("/profiles/{id}")]
pub async fn patch_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ProfilePatchRequest>,
) -> ApiResult<HttpResponse> {
    update_by_id(&state, &user, &path, payload.into_inner()).await
}

/// Register the profile endpoints. `me` must precede `{id}`.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_profiles)
        .service(get_my_profile)
        .service(put_my_profile)
        .service(patch_my_profile)
        .service(get_profile)
        .service(put_profile)
        .service(patch_profile);
}
