//! Error type for the harvest pipeline.

/// Error from one fetch/parse/persist step of the harvest.
///
/// `Protocol` covers malformed or unexpected remote responses and aborts
/// the run (after a checkpoint). `Transport` covers network-level failures
/// and is subject to the harvest loop's bounded retry.
#[derive(Debug)]
pub enum HarvestError {
    /// Malformed or unexpected response from the remote endpoint
    Protocol { detail: String },
    /// Network-level failure (connect, timeout, non-success status)
    Transport {
        status: Option<u16>,
        detail: String,
    },
    Io(std::io::Error),
}

impl std::fmt::Display for HarvestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protocol { detail } => write!(f, "protocol error: {detail}"),
            Self::Transport {
                status: Some(s),
                detail,
            } => write!(f, "transport error (HTTP {s}): {detail}"),
            Self::Transport {
                status: None,
                detail,
            } => write!(f, "transport error: {detail}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for HarvestError {}

impl HarvestError {
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
        }
    }

    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Transport {
            status: e.status().map(|s| s.as_u16()),
            detail: e.to_string(),
        }
    }

    /// Whether the harvest loop may retry the same request.
    ///
    /// Protocol errors are never retried; client-side HTTP errors (4xx)
    /// will not get better on retry either.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Protocol { .. } => false,
            Self::Transport { status, .. } => !matches!(status, Some(400..=499)),
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }
}

impl From<std::io::Error> for HarvestError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
