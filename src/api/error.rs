use thiserror::Error;

/// Errors from talking to the camera service API.
///
/// Every failure is terminal for the action that triggered it; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("There was an error 400{}", detail_suffix(.body))]
    BadRequest { url: String, body: String },

    #[error("error {status} was returned by {url}")]
    Status { url: String, status: u16 },

    #[error("malformed JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

fn detail_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message for a blocking alert, prefixed with the action that failed.
    pub fn alert(&self, action: &str) -> String {
        match self {
            ApiError::BadRequest { .. } => self.to_string(),
            ApiError::Status { status, .. } => {
                format!("({}) error {} was returned", action, status)
            }
            other => format!("({}) {}", action, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_message() {
        let err = ApiError::BadRequest {
            url: "http://x/api/data".into(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "There was an error 400");
        assert_eq!(err.status(), Some(400));

        let err = ApiError::BadRequest {
            url: "http://x/api/data".into(),
            body: "bad date\n".into(),
        };
        assert_eq!(err.alert("loadPhotos"), "There was an error 400: bad date");
    }

    #[test]
    fn test_status_alert_names_code() {
        let err = ApiError::Status {
            url: "http://x/api/data".into(),
            status: 503,
        };
        assert_eq!(err.alert("loadWeather"), "(loadWeather) error 503 was returned");
        assert_eq!(err.status(), Some(503));
    }
}
