use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Result type returned by every fallible client operation.
pub type ClientResult<T> = Result<T, ClientError>;

/// What went wrong below the API layer when a request could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The connection could not be established (refused, DNS, TLS handshake).
    Connect,
    /// The request exceeded the configured timeout.
    Timeout,
    /// The server answered with a non-2xx status and a body that is not XML.
    Status(StatusCode),
    /// Any other failure while sending the request or reading the reply.
    Other,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connection failed"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Status(status) => write!(f, "unexpected status {status}"),
            Self::Other => f.write_str("request failed"),
        }
    }
}

/// Error kinds surfaced by the lab ordering client.
///
/// Remote API-level errors (a 4xx reply carrying an XML error document) are
/// not errors here: they come back as a normal parsed response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required request fields were missing or malformed. Never reaches the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The HTTP round trip could not complete.
    #[error("Transport error ({failure}): {detail}")]
    Transport {
        failure: TransportFailure,
        detail: String,
    },

    /// The response body is not well-formed XML.
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    /// A report payload is not valid Base64.
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The customer XML document could not be written.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The client could not be constructed from its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    #[must_use]
    pub fn transport(failure: TransportFailure, detail: impl Into<String>) -> Self {
        Self::Transport {
            failure,
            detail: detail.into(),
        }
    }

    /// True for connection failures, timeouts and non-XML error statuses.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// True when the request was abandoned because the timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                failure: TransportFailure::Timeout,
                ..
            }
        )
    }

    /// The HTTP status attached to a transport failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport {
                failure: TransportFailure::Status(status),
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let failure = if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect
        } else {
            TransportFailure::Other
        };
        Self::transport(failure, err.to_string())
    }
}

impl From<roxmltree::Error> for ClientError {
    fn from(err: roxmltree::Error) -> Self {
        Self::ResponseParse(err.to_string())
    }
}
