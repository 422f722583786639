//! Response decoding
//!
//! Turns a [`RawResponse`] into an [`Outcome`]: non-2xx statuses become
//! `HttpStatus` errors with the raw body kept, empty 2xx bodies succeed with
//! no value, and anything else goes through the configured [`BodyDecoder`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::types::{Outcome, RawResponse, Response};

/// Structured body format
pub trait BodyDecoder: Send + Sync + fmt::Debug {
    /// Decode a non-empty body
    fn decode(&self, body: &[u8]) -> Result<Value, String>;

    /// Media type this decoder expects, used as the default `Accept` header
    fn content_type(&self) -> &'static str;
}

/// JSON bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl BodyDecoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, String> {
        serde_json::from_slice(body).map_err(|e| e.to_string())
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// UTF-8 text bodies, decoded into a JSON string value
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDecoder;

impl BodyDecoder for PlainTextDecoder {
    fn decode(&self, body: &[u8]) -> Result<Value, String> {
        std::str::from_utf8(body)
            .map(|text| Value::String(text.to_string()))
            .map_err(|e| e.to_string())
    }

    fn content_type(&self) -> &'static str {
        "text/plain"
    }
}

/// Maps raw transport results onto outcomes
#[derive(Debug, Clone)]
pub struct ResponseDecoder {
    body_decoder: Arc<dyn BodyDecoder>,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new(Arc::new(JsonDecoder))
    }
}

impl ResponseDecoder {
    pub fn new(body_decoder: Arc<dyn BodyDecoder>) -> Self {
        Self { body_decoder }
    }

    pub fn content_type(&self) -> &'static str {
        self.body_decoder.content_type()
    }

    pub fn decode(&self, raw: RawResponse) -> Outcome {
        if !raw.is_success() {
            return Err(Error::HttpStatus {
                status: raw.status,
                body: raw.body,
            });
        }

        let value = if raw.body.is_empty() {
            None
        } else {
            Some(self.body_decoder.decode(&raw.body).map_err(Error::decode)?)
        };

        Ok(Response {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_success() {
        let response = ResponseDecoder::default()
            .decode(RawResponse::new(200, r#"{"id":1}"#))
            .unwrap();
        assert_eq!(response.value, Some(json!({"id": 1})));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_empty_success_body_has_no_value() {
        let response = ResponseDecoder::default()
            .decode(RawResponse::new(204, ""))
            .unwrap();
        assert!(response.value.is_none());
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_non_success_keeps_raw_body() {
        let err = ResponseDecoder::default()
            .decode(RawResponse::new(404, "no such item"))
            .unwrap_err();
        match err {
            Error::HttpStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body.as_ref(), b"no such item");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_redirect_status_is_not_success() {
        let err = ResponseDecoder::default()
            .decode(RawResponse::new(304, ""))
            .unwrap_err();
        assert_eq!(err.status(), Some(304));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = ResponseDecoder::default()
            .decode(RawResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_plain_text_decoder() {
        let decoder = ResponseDecoder::new(Arc::new(PlainTextDecoder));
        assert_eq!(decoder.content_type(), "text/plain");

        let response = decoder.decode(RawResponse::new(200, "hello")).unwrap();
        assert_eq!(response.value, Some(json!("hello")));

        let err = decoder
            .decode(RawResponse::new(200, vec![0xff, 0xfe]))
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
