//! Bearer token authentication for HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! credential checks and user identity derivation here.

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

pub(crate) const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const MALFORMED_HEADER: &str = "Authorization header must use the Bearer scheme.";

/// Identity of the caller, proven by a valid access token.
///
/// Handlers that take this extractor reject anonymous requests with
/// `401 unauthorized` before any domain code runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(MISSING_CREDENTIALS))?
        .to_str()
        .map_err(|_| Error::unauthorized(MALFORMED_HEADER))?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized(MALFORMED_HEADER))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(Error::unauthorized(MALFORMED_HEADER));
    }
    Ok(token.trim())
}

fn credentials(req: &HttpRequest) -> Result<(web::Data<HttpState>, String), Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req.headers())?.to_owned();
    Ok((state, token))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = credentials(req);
        Box::pin(async move {
            let (state, token) = resolved?;
            state.verifier.verify(&token).await.map(AuthenticatedUser)
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case("Bearer abc.def", "abc.def")]
    #[case("bearer  spaced ", "spaced")]
    fn bearer_tokens_are_extracted(#[case] header: &str, #[case] expected: &str) {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, header))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()).expect("token"), expected);
    }

    #[rstest]
    #[case(None, MISSING_CREDENTIALS)]
    #[case(Some("Basic dXNlcjpwdw=="), MALFORMED_HEADER)]
    #[case(Some("Bearer"), MALFORMED_HEADER)]
    #[case(Some("Bearer   "), MALFORMED_HEADER)]
    fn unusable_headers_are_unauthorised(#[case] header: Option<&str>, #[case] message: &str) {
        let mut req = TestRequest::default();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        let err = bearer_token(req.to_http_request().headers()).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), message);
    }

    #[rstest]
    fn missing_state_is_an_internal_error() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer token"))
            .to_http_request();
        let err = credentials(&req).err().expect("no state");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
