//! Shared validation helpers for inbound HTTP adapters.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde::{Deserialize, Deserializer};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Error, ProfileId, RecordId, RecordKind};

/// JSON extractor configuration mapping body failures to `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = %req.path(), error = %err, "rejected request body");
    let message = match &err {
        JsonPayloadError::ContentType => "Expected a JSON request body.".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("Malformed JSON: {inner}"),
        other => format!("Unreadable request body: {other}"),
    };
    Error::invalid_request(message).into()
}

/// Deserialise a present field, including `null`, as `Some`.
///
/// Paired with `#[serde(default)]` this separates "absent" (`None`) from
/// "explicitly null" (`Some(None)`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn parse_uuid(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Parse a collection record id. Malformed ids cannot name a record, so they
/// are reported the same way as unknown ones.
pub(crate) fn parse_record_id(kind: RecordKind, raw: &str) -> Result<RecordId, Error> {
    parse_uuid(raw)
        .map(RecordId::from)
        .ok_or_else(|| Error::not_found(format!("{kind} not found")))
}

pub(crate) fn parse_profile_id(raw: &str) -> Result<ProfileId, Error> {
    parse_uuid(raw)
        .map(ProfileId::from)
        .ok_or_else(|| Error::not_found("portfolio profile not found"))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;
    use crate::domain::ErrorCode;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "deserialize_some")]
        link: Option<Option<String>>,
    }

    #[rstest]
    #[case("{}", None)]
    #[case(r#"{"link": null}"#, Some(None))]
    #[case(r#"{"link": "https://x.dev"}"#, Some(Some("https://x.dev".to_owned())))]
    fn absent_and_null_are_distinct(#[case] body: &str, #[case] expected: Option<Option<String>>) {
        let payload: Payload = serde_json::from_str(body).expect("payload");
        assert_eq!(payload.link, expected);
    }

    #[rstest]
    fn malformed_record_ids_are_not_found() {
        let err = parse_record_id(RecordKind::Skill, "42").expect_err("malformed");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "skill not found");
    }

    #[rstest]
    fn well_formed_ids_parse() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_profile_id(&id.to_string()).expect("profile id"),
            ProfileId::from(id)
        );
    }
}
