//! Error type returned by film API operations.

/// Boxed cause of a transport failure.
type TransportSource = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for film API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a film API operation.
///
/// `Display` yields a message suitable for showing to the user.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
    },
    /// The request did not complete within the client timeout.
    Timeout,
    /// The server could not be reached.
    Network(TransportSource),
    /// Any other transport failure.
    Unknown(TransportSource),
    /// The response body was not the expected JSON.
    Decode(String),
    /// The requested resource does not exist.
    NotFound(&'static str),
    /// No user matched the given username and password.
    InvalidCredentials,
    /// An operation failed; wraps the underlying cause.
    Failed {
        /// What was being attempted, e.g. "create review".
        action: &'static str,
        /// Underlying cause.
        source: Box<Self>,
    },
    /// Input rejected before any request was sent.
    Invalid(String),
}

impl ApiError {
    /// Wraps `self` as the cause of a failed `action`.
    #[must_use]
    pub fn during(self, action: &'static str) -> Self {
        Self::Failed {
            action,
            source: Box::new(self),
        }
    }

    /// Classifies a `reqwest` transport error.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Network(Box::new(err))
        } else {
            Self::Unknown(Box::new(err))
        }
    }

    /// HTTP status of the innermost cause, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Failed { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns `true` for a missing resource, either mapped or as a raw 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(404)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status {
                status,
                status_text,
            } => write!(f, "{status}: {status_text}"),
            Self::Timeout => write!(f, "request timed out, please retry later"),
            Self::Network(_) => write!(
                f,
                "network connection failed, please check your connection"
            ),
            Self::Unknown(_) => write!(f, "unknown error, please retry later"),
            Self::Decode(detail) => write!(f, "failed to decode response: {detail}"),
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::InvalidCredentials => {
                write!(f, "login failed, please check your username and password")
            }
            Self::Failed { action, .. } => write!(f, "failed to {action}, please retry later"),
            Self::Invalid(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed { source, .. } => Some(source.as_ref()),
            Self::Network(source) | Self::Unknown(source) => Some(&**source),
            _ => None,
        }
    }
}
