use thiserror::Error;

/// Failure reaching a remote endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failure fetching the remote drink catalog.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    #[error("Invalid catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl TransportError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        TransportError::Status {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_short_body() {
        let err = TransportError::from_status(reqwest::StatusCode::NOT_FOUND, "missing");
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "Server returned 404: missing");
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "é".repeat(400);
        let err = TransportError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);
        match err {
            TransportError::Status { status, body: truncated } => {
                assert_eq!(status, 502);
                assert!(truncated.contains("truncated, 800 total bytes"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_error_converts_to_fetch_error() {
        let decode = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err: FetchError = decode.into();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
