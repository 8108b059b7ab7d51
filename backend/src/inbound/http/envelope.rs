//! Success envelope shared by every JSON endpoint.
//!
//! ```text
//! {"data": {...}, "message": "Profile retrieved successfully"}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// `{data, message}` wrapper around a successful payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[schema(example = "Profile retrieved successfully")]
    pub message: String,
}

/// Envelope carrying `data: null`, used by command endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageEnvelope {
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
    #[schema(example = "Successfully logged out")]
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
        }
    }

    /// Render the envelope with `status`.
    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }

    pub fn ok(data: T, message: impl Into<String>) -> HttpResponse {
        Self::new(data, message).respond(StatusCode::OK)
    }

    pub fn created(data: T, message: impl Into<String>) -> HttpResponse {
        Self::new(data, message).respond(StatusCode::CREATED)
    }
}

impl MessageEnvelope {
    /// `200 OK` with `data: null`.
    pub fn ok(message: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            data: None,
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    async fn body_of(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[rstest]
    #[actix_web::test]
    async fn created_wraps_data_and_message() {
        let response = Envelope::created(json!({"name": "Rust"}), "Record created successfully");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_of(response).await;
        assert_eq!(body["data"]["name"], "Rust");
        assert_eq!(body["message"], "Record created successfully");
    }

    #[rstest]
    #[actix_web::test]
    async fn message_envelope_serialises_null_data() {
        let response = MessageEnvelope::ok("Successfully logged out");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert!(body["data"].is_null());
        assert!(body.as_object().expect("object").contains_key("data"));
    }
}
