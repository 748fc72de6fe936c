use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the server answered with a status code, as opposed to the
    /// request failing in transport or the body failing to parse.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::BadRequest(_) | ApiError::ServerError(_)
        ) || matches!(self, ApiError::InvalidResponse(msg) if msg.starts_with("Status "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "missing"),
            ApiError::BadRequest(body) if body == "missing"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "dup"),
            ApiError::InvalidResponse(msg) if msg.starts_with("Status 409")
        ));
    }

    #[test]
    fn test_is_status() {
        assert!(ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").is_status());
        assert!(ApiError::from_status(StatusCode::CONFLICT, "").is_status());
        assert!(!ApiError::InvalidResponse("Failed to parse users".to_string()).is_status());
        assert!(!ApiError::InvalidUrl("nope".to_string()).is_status());
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("(truncated, {} total bytes)", long.len())));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = format!("{}é", "x".repeat(MAX_ERROR_BODY_LENGTH - 1));
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH - 1)));
    }
}
