//! Handlers for the owner-scoped collections: skills, projects, experiences
//! and education.
//!
//! ```text
//! GET    /api/portfolio/skills
//! POST   /api/portfolio/skills {"name":"Rust"}
//! GET    /api/portfolio/skills/{id}
//! PUT    /api/portfolio/skills/{id} {"name":"Rust"}
//! PATCH  /api/portfolio/skills/{id} {"name":"Rust"}
//! DELETE /api/portfolio/skills/{id}
//! ```
//!
//! The request handling is written once over [`CollectionResource`]; the
//! `collection_endpoints!` macro stamps out the concrete, documented
//! handlers for each collection.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::ports::PortfolioCollection;
use crate::domain::{Education, Experience, PortfolioRecord, Project, Skill};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::portfolio_dto::{
    EducationRequest, EducationResponse, ExperienceRequest, ExperienceResponse, ProjectRequest,
    ProjectResponse, SkillRequest, SkillResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_record_id;

const LISTED: &str = "Records retrieved successfully";
const RETRIEVED: &str = "Record retrieved successfully";
const CREATED: &str = "Record created successfully";
const UPDATED: &str = "Record updated successfully";

/// Binds a record type to its HTTP bodies and its port in [`HttpState`].
pub trait CollectionResource: PortfolioRecord {
    type Request: DeserializeOwned + Into<Self::Input> + 'static;
    type Response: Serialize + From<Self> + 'static;

    fn collection(state: &HttpState) -> &Arc<dyn PortfolioCollection<Self>>;
}

impl CollectionResource for Skill {
    type Request = SkillRequest;
    type Response = SkillResponse;

    fn collection(state: &HttpState) -> &Arc<dyn PortfolioCollection<Self>> {
        &state.skills
    }
}

impl CollectionResource for Project {
    type Request = ProjectRequest;
    type Response = ProjectResponse;

    fn collection(state: &HttpState) -> &Arc<dyn PortfolioCollection<Self>> {
        &state.projects
    }
}

impl CollectionResource for Experience {
    type Request = ExperienceRequest;
    type Response = ExperienceResponse;

    fn collection(state: &HttpState) -> &Arc<dyn PortfolioCollection<Self>> {
        &state.experiences
    }
}

impl CollectionResource for Education {
    type Request = EducationRequest;
    type Response = EducationResponse;

    fn collection(state: &HttpState) -> &Arc<dyn PortfolioCollection<Self>> {
        &state.education
    }
}

async fn list_records<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let records = R::collection(state).list(user.id()).await?;
    let body: Vec<R::Response> = records.into_iter().map(R::Response::from).collect();
    Ok(Envelope::ok(body, LISTED))
}

async fn create_record<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
    payload: R::Request,
) -> ApiResult<HttpResponse> {
    let record = R::collection(state)
        .create(user.id(), payload.into())
        .await?;
    Ok(Envelope::created(R::Response::from(record), CREATED))
}

async fn get_record<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(R::KIND, raw_id)?;
    let record = R::collection(state).get(user.id(), &id).await?;
    Ok(Envelope::ok(R::Response::from(record), RETRIEVED))
}

async fn replace_record<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
    raw_id: &str,
    payload: R::Request,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(R::KIND, raw_id)?;
    let record = R::collection(state)
        .replace(user.id(), &id, payload.into())
        .await?;
    Ok(Envelope::ok(R::Response::from(record), UPDATED))
}

async fn patch_record<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
    raw_id: &str,
    payload: R::Request,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(R::KIND, raw_id)?;
    let record = R::collection(state)
        .patch(user.id(), &id, payload.into())
        .await?;
    Ok(Envelope::ok(R::Response::from(record), UPDATED))
}

async fn delete_record<R: CollectionResource>(
    state: &HttpState,
    user: &AuthenticatedUser,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(R::KIND, raw_id)?;
    R::collection(state).delete(user.id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Generate the six documented handlers of one collection plus a
/// `configure_<plural>` registration function.
macro_rules! collection_endpoints {
    (
        record: $record:ident,
        request: $request:ident,
        response: $response:ident,
        plural: $plural:ident,
        singular: $singular:ident,
        tag: $tag:literal,
        collection_path: $collection_path:literal,
        item_path: $item_path:literal,
        route: $route:literal,
        item_route: $item_route:literal $(,)?
    ) => {
        paste::paste! {
            #[doc = "List the caller's " $tag "."]
            #[utoipa::path(
                get,
                path = $collection_path,
                responses(
                    (status = 200, description = "Caller's records", body = Envelope<Vec<$response>>),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::get($route)]
            pub async fn [<list_ $plural>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
            ) -> ApiResult<HttpResponse> {
                list_records::<$record>(&state, &user).await
            }

            #[doc = "Create a record in the caller's " $tag "."]
            #[utoipa::path(
                post,
                path = $collection_path,
                request_body = $request,
                responses(
                    (status = 201, description = "Created record", body = Envelope<$response>),
                    (status = 400, description = "Invalid fields", body = ErrorSchema),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::post($route)]
            pub async fn [<create_ $singular>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
                payload: web::Json<$request>,
            ) -> ApiResult<HttpResponse> {
                create_record::<$record>(&state, &user, payload.into_inner()).await
            }

            #[doc = "Fetch one of the caller's " $tag "."]
            #[utoipa::path(
                get,
                path = $item_path,
                params(("id" = String, Path, description = "Record identifier")),
                responses(
                    (status = 200, description = "Record", body = Envelope<$response>),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 404, description = "Unknown or foreign record", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::get($item_route)]
            pub async fn [<get_ $singular>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
                path: web::Path<String>,
            ) -> ApiResult<HttpResponse> {
                get_record::<$record>(&state, &user, &path).await
            }

            #[doc = "Replace one of the caller's " $tag "; the body must be complete."]
            #[utoipa::path(
                put,
                path = $item_path,
                params(("id" = String, Path, description = "Record identifier")),
                request_body = $request,
                responses(
                    (status = 200, description = "Updated record", body = Envelope<$response>),
                    (status = 400, description = "Invalid fields", body = ErrorSchema),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 404, description = "Unknown or foreign record", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::put($item_route)]
            pub async fn [<replace_ $singular>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
                path: web::Path<String>,
                payload: web::Json<$request>,
            ) -> ApiResult<HttpResponse> {
                replace_record::<$record>(&state, &user, &path, payload.into_inner()).await
            }

            #[doc = "Merge the supplied fields into one of the caller's " $tag "."]
            #[utoipa::path(
                patch,
                path = $item_path,
                params(("id" = String, Path, description = "Record identifier")),
                request_body = $request,
                responses(
                    (status = 200, description = "Updated record", body = Envelope<$response>),
                    (status = 400, description = "Invalid fields", body = ErrorSchema),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 404, description = "Unknown or foreign record", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::patch($item_route)]
            pub async fn [<patch_ $singular>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
                path: web::Path<String>,
                payload: web::Json<$request>,
            ) -> ApiResult<HttpResponse> {
                patch_record::<$record>(&state, &user, &path, payload.into_inner()).await
            }

            #[doc = "Delete one of the caller's " $tag "."]
            #[utoipa::path(
                delete,
                path = $item_path,
                params(("id" = String, Path, description = "Record identifier")),
                responses(
                    (status = 204, description = "Record deleted"),
                    (status = 401, description = "Unauthorised", body = ErrorSchema),
                    (status = 404, description = "Unknown or foreign record", body = ErrorSchema),
                    (status = 500, description = "Internal server error", body = ErrorSchema)
                ),
                tags = [$tag]
            )]
            #[actix_web::delete($item_route)]
            pub async fn [<delete_ $singular>](
                state: web::Data<HttpState>,
                user: AuthenticatedUser,
                path: web::Path<String>,
            ) -> ApiResult<HttpResponse> {
                delete_record::<$record>(&state, &user, &path).await
            }

            fn [<configure_ $plural>](cfg: &mut web::ServiceConfig) {
                cfg.service([<list_ $plural>])
                    .service([<create_ $singular>])
                    .service([<get_ $singular>])
                    .service([<replace_ $singular>])
                    .service([<patch_ $singular>])
                    .service([<delete_ $singular>]);
            }
        }
    };
}

collection_endpoints! {
    record: Skill,
    request: SkillRequest,
    response: SkillResponse,
    plural: skills,
    singular: skill,
    tag: "skills",
    collection_path: "/api/portfolio/skills",
    item_path: "/api/portfolio/skills/{id}",
    route: "/skills",
    item_route: "/skills/{id}",
}

collection_endpoints! {
    record: Project,
    request: ProjectRequest,
    response: ProjectResponse,
    plural: projects,
    singular: project,
    tag: "projects",
    collection_path: "/api/portfolio/projects",
    item_path: "/api/portfolio/projects/{id}",
    route: "/projects",
    item_route: "/projects/{id}",
}

collection_endpoints! {
    record: Experience,
    request: ExperienceRequest,
    response: ExperienceResponse,
    plural: experiences,
    singular: experience,
    tag: "experiences",
    collection_path: "/api/portfolio/experiences",
    item_path: "/api/portfolio/experiences/{id}",
    route: "/experiences",
    item_route: "/experiences/{id}",
}

collection_endpoints! {
    record: Education,
    request: EducationRequest,
    response: EducationResponse,
    plural: education,
    singular: education_entry,
    tag: "education",
    collection_path: "/api/portfolio/education",
    item_path: "/api/portfolio/education/{id}",
    route: "/education",
    item_route: "/education/{id}",
}

/// Register the four collections.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    configure_skills(cfg);
    configure_projects(cfg);
    configure_experiences(cfg);
    configure_education(cfg);
}

#[cfg(test)]
mod tests;
