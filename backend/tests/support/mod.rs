//! Shared harness for HTTP integration tests over in-memory adapters.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use portfolio_backend::Trace;
use portfolio_backend::inbound::http;
use portfolio_backend::inbound::http::state::HttpState;
use portfolio_backend::inbound::http::validation::json_config;

pub const PASSWORD: &str = "Str0ng!Pass-2024";

/// Status and decoded body of a response; empty bodies decode to `null`.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

/// Application wired exactly like the server, minus health and docs.
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(NormalizePath::trim())
        .wrap(Trace)
        .configure(http::configure)
}

pub async fn read<B: MessageBody>(res: ServiceResponse<B>) -> Reply {
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply { status, body }
}

pub fn bearer(access: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {access}"))
}

/// Registration request for `username` with a valid password.
pub fn register_request(username: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/accounts/register")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
            "fullName": format!("{username} Tester"),
        }))
}

/// Access and refresh tokens from a register or login reply.
pub fn tokens(reply: &Reply) -> (String, String) {
    let tokens = &reply.body["data"]["tokens"];
    (
        tokens["access"].as_str().expect("access token").to_owned(),
        tokens["refresh"].as_str().expect("refresh token").to_owned(),
    )
}

/// Register `username` against `app` and return its token pair.
macro_rules! signed_up {
    ($app:expr, $username:expr) => {{
        let reply = support::read(
            actix_web::test::call_service(&$app, support::register_request($username).to_request())
                .await,
        )
        .await;
        assert_eq!(
            reply.status,
            actix_web::http::StatusCode::CREATED,
            "{}",
            reply.body
        );
        support::tokens(&reply)
    }};
}
pub(crate) use signed_up;
