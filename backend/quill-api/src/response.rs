/// Uniform API response envelope
///
/// Every endpoint, success or failure, answers with
/// `{success, message, data, timestamp, statusCode}`.
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
            status_code: 200,
        }
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
            status_code: 201,
        }
    }

    /// Success with no payload beyond the message itself.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
            status_code: 200,
        }
    }

    pub fn error(message: impl Into<String>, status_code: u16) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
            status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2], "ok")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert_eq!(body["statusCode"], 200);
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn error_envelope_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::error("nope", 400)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["statusCode"], 400);
    }
}
