use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = extract_detail(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::ValidationError(detail)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthError(detail),
            StatusCode::NOT_FOUND => ApiError::NotFoundError(detail),
            StatusCode::CONFLICT => ApiError::ConflictError(detail),
            _ => ApiError::RequestFailed(format!("HTTP {}: {}", status.as_u16(), detail)),
        }
    }

    /// The session is missing or expired; the front end should route to sign-in.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ApiError::AuthError(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::NetworkError(e.to_string())
        }
    }
}

/// Pull a readable message out of an error body.
///
/// Handles `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}` (request
/// validation), `{"message": "..."}` and `{"error": "..."}` /
/// `{"error": {"message": "..."}}`.
fn extract_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;

    match json.get("detail") {
        Some(serde_json::Value::String(msg)) => return Some(msg.clone()),
        Some(serde_json::Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }

    if let Some(msg) = json.get("message").and_then(|v| v.as_str()) {
        return Some(msg.to_string());
    }

    match json.get("error") {
        Some(serde_json::Value::String(msg)) => Some(msg.clone()),
        Some(obj) => obj
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::AuthError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::AuthError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFoundError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, ""),
            ApiError::ConflictError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::ValidationError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"Task not found"}"#);
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","title"],"msg":"field required"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.to_string(), "Validation failed: field required");
    }

    #[test]
    fn test_nested_error_message() {
        let body = r#"{"error":{"message":"User already exists"}}"#;
        let err = ApiError::from_status(StatusCode::CONFLICT, body);
        assert_eq!(err.to_string(), "Conflict: User already exists");
    }

    #[test]
    fn test_plain_body_falls_back_to_reason() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(
            err.to_string(),
            "Request failed: HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn test_requires_sign_in() {
        assert!(ApiError::AuthError("expired".into()).requires_sign_in());
        assert!(!ApiError::NetworkError("down".into()).requires_sign_in());
    }
}
