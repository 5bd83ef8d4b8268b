use thiserror::Error;

/// The single failure kind of the backend protocol.
///
/// Covers both HTTP-level failures (non-2xx responses) and transport-level
/// failures (connection refused, reset, undecodable body). The description is
/// what ends up in front of the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct BackendError {
    description: String,
    status: Option<u16>,
}

impl BackendError {
    /// Error for a non-success HTTP status. Uses the backend's `detail` text
    /// when it sent one, otherwise `HTTP <status>`.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let description = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));
        Self {
            description,
            status: Some(status),
        }
    }

    pub fn transport(description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.trim().is_empty() {
            "request failed".to_string()
        } else {
            description
        };
        Self {
            description,
            status: None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// HTTP status code, present only for HTTP-level failures.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}
