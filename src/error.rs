//! Failure taxonomy returned by every executor operation.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

use crate::http::HttpResponse;

/// Why a request did not produce a success payload.
#[derive(Debug)]
pub enum RequestError {
    /// The connectivity probe reported no network; nothing was sent.
    NoInternet,
    /// The transport did not answer within the configured duration.
    Timeout(Duration),
    /// A response arrived with a status outside 200..300.
    UnexpectedStatus(HttpResponse),
    /// Anything else: invalid URL or headers, connection failures,
    /// undecodable bodies, unreadable upload files.
    Unhandled(anyhow::Error),
}

impl RequestError {
    /// Status of the carried response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::UnexpectedStatus(response) => Some(response.status),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            RequestError::UnexpectedStatus(response) => Some(response),
            _ => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NoInternet => write!(f, "No internet connection"),
            RequestError::Timeout(duration) => {
                write!(f, "Request timed out after {}s", duration.as_secs_f64())
            }
            RequestError::UnexpectedStatus(response) => {
                write!(f, "Unexpected status {}: {}", response.status, response.body)
            }
            RequestError::Unhandled(e) => write!(f, "Unhandled error: {:#}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Unhandled(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn not_found() -> HttpResponse {
        HttpResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: r#"{"error":"not found"}"#.to_string(),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestError::NoInternet.to_string(), "No internet connection");
        assert_eq!(
            RequestError::Timeout(Duration::from_millis(2500)).to_string(),
            "Request timed out after 2.5s"
        );
        let err = RequestError::UnexpectedStatus(not_found());
        assert!(err.to_string().contains("404 Not Found"));
        let err = RequestError::Unhandled(anyhow::anyhow!("bad things"));
        assert_eq!(err.to_string(), "Unhandled error: bad things");
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(
            RequestError::UnexpectedStatus(not_found()).status(),
            Some(StatusCode::NOT_FOUND)
        );
        assert_eq!(RequestError::NoInternet.status(), None);
        assert!(RequestError::NoInternet.response().is_none());
    }

    #[test]
    fn test_source_only_for_unhandled() {
        use std::error::Error;
        let err = RequestError::Unhandled(anyhow::anyhow!("inner"));
        assert_eq!(err.source().unwrap().to_string(), "inner");
        assert!(RequestError::NoInternet.source().is_none());
    }
}
