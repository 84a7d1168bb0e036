use axum::{
    async_trait,
    body::to_bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, header::CONTENT_TYPE, request::Parts},
};
use serde_json::{Deserializer, Map, Value};

use crate::errors::AppError;

pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024; // 64 KiB upper bound for request bodies

const NUMERIC_ID_EXPECTED: &str = "Validation failed (numeric string is expected)";

/// A JSON object body, kept as raw values so that field rules can tell
/// absent, `null` and wrongly typed fields apart.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        validate_content_type(req.headers())?;

        let body_bytes = to_bytes(req.into_body(), MAX_BODY_SIZE_BYTES)
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read request body: {err}")))?;

        let mut deserializer = Deserializer::from_slice(body_bytes.as_ref());
        let value = <Value as serde::Deserialize>::deserialize(&mut deserializer)
            .map_err(|err| AppError::BadRequest(format!("failed to parse JSON payload: {err}")))?;

        deserializer.end().map_err(|err| {
            AppError::BadRequest(format!("unexpected trailing data: {err}"))
        })?;

        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(AppError::BadRequest(
                "payload must be a JSON object".to_string(),
            )),
        }
    }
}

fn validate_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let value = headers.get(CONTENT_TYPE);

    if let Some(value) = value
        && let Ok(value) = value.to_str()
        && (value.starts_with("application/json") || value.ends_with("+json"))
    {
        return Ok(());
    }

    let received = value
        .and_then(|val| val.to_str().ok())
        .unwrap_or("missing");
    Err(AppError::UnsupportedMediaType(format!(
        "expected application/json payload, received {received}"
    )))
}

/// The `:id` path segment of customer routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for CustomerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let id = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(NUMERIC_ID_EXPECTED.to_string()))?;

        // Numeric but outside the key range: no row can have it.
        i32::try_from(id)
            .map(CustomerId)
            .map_err(|_| AppError::CustomerNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{HeaderValue, Request as HttpRequest};

    use super::*;

    fn json_request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = HttpRequest::builder().method("POST").uri("/customers");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<JsonObject, AppError> {
        JsonObject::from_request(json_request(content_type, body), &()).await
    }

    #[tokio::test]
    async fn test_accepts_json_object() {
        let JsonObject(map) = extract(Some("application/json"), r#"{"name":"Ada","x":null}"#)
            .await
            .unwrap();
        assert_eq!(map.get("name"), Some(&Value::String("Ada".to_string())));
        assert_eq!(map.get("x"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_accepts_json_suffix_media_types() {
        assert!(extract(Some("application/merge-patch+json"), "{}").await.is_ok());
        assert!(
            extract(Some("application/json; charset=utf-8"), "{}")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let err = extract(None, "{}").await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(message) if message.contains("missing")));
    }

    #[tokio::test]
    async fn test_rejects_non_object_payloads() {
        for body in ["[]", "\"text\"", "3", "null"] {
            let err = extract(Some("application/json"), body).await.unwrap_err();
            assert!(
                matches!(&err, AppError::BadRequest(message) if message == "payload must be a JSON object"),
                "{body} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_rejects_malformed_and_trailing_data() {
        let err = extract(Some("application/json"), "{\"name\":").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(message) if message.starts_with("failed to parse")));

        let err = extract(Some("application/json"), "{} {}").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(message) if message.starts_with("unexpected trailing")));
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let body: &'static str = Box::leak(
            format!("{{\"name\":\"{}\"}}", "a".repeat(MAX_BODY_SIZE_BYTES)).into_boxed_str(),
        );
        let err = extract(Some("application/json"), body).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(message) if message.starts_with("failed to read")));
    }

    #[test]
    fn test_content_type_header_value() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let err = validate_content_type(&headers).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported media type: expected application/json payload, received text/plain"
        );
    }
}
