//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the schema
//! wrappers for domain types ([`ErrorSchema`], [`ErrorCodeSchema`]) and the
//! bearer token security scheme. The document backs Swagger UI in debug
//! builds and is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the security scheme protected operations refer to.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/accounts/login or /api/accounts/register.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Portfolio backend API",
        description = "Account management and owner-scoped portfolio content behind bearer tokens."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::refresh,
        crate::inbound::http::accounts::forgot_password,
        crate::inbound::http::accounts::reset_password,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::account_profile::get_account_profile,
        crate::inbound::http::account_profile::put_account_profile,
        crate::inbound::http::account_profile::patch_account_profile,
        crate::inbound::http::account_profile::delete_account_profile,
        crate::inbound::http::portfolio_profiles::list_profiles,
        crate::inbound::http::portfolio_profiles::get_my_profile,
        crate::inbound::http::portfolio_profiles::put_my_profile,
        crate::inbound::http::portfolio_profiles::patch_my_profile,
        crate::inbound::http::portfolio_profiles::get_profile,
        crate::inbound::http::portfolio_profiles::put_profile,
        crate::inbound::http::portfolio_profiles::patch_profile,
        crate::inbound::http::collections::list_skills,
        crate::inbound::http::collections::create_skill,
        crate::inbound::http::collections::get_skill,
        crate::inbound::http::collections::replace_skill,
        crate::inbound::http::collections::patch_skill,
        crate::inbound::http::collections::delete_skill,
        crate::inbound::http::collections::list_projects,
        crate::inbound::http::collections::create_project,
        crate::inbound::http::collections::get_project,
        crate::inbound::http::collections::replace_project,
        crate::inbound::http::collections::patch_project,
        crate::inbound::http::collections::delete_project,
        crate::inbound::http::collections::list_experiences,
        crate::inbound::http::collections::create_experience,
        crate::inbound::http::collections::get_experience,
        crate::inbound::http::collections::replace_experience,
        crate::inbound::http::collections::patch_experience,
        crate::inbound::http::collections::delete_experience,
        crate::inbound::http::collections::list_education,
        crate::inbound::http::collections::create_education_entry,
        crate::inbound::http::collections::get_education_entry,
        crate::inbound::http::collections::replace_education_entry,
        crate::inbound::http::collections::patch_education_entry,
        crate::inbound::http::collections::delete_education_entry,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "accounts", description = "Registration, tokens, passwords and the caller's account"),
        (name = "portfolio", description = "The caller's portfolio profile"),
        (name = "skills", description = "Skills listed on the portfolio"),
        (name = "projects", description = "Projects and their technologies"),
        (name = "experiences", description = "Work experience, newest first"),
        (name = "education", description = "Education history, newest first"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
