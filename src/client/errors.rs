//! Error types returned by the NEWT client

use thiserror::Error;

pub type Result<T, E = NewtError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum NewtError {
    /// Login was rejected or the server echoed a different username
    #[error("could not get an authorized connection to NEWT as '{username}'")]
    Authentication { username: String },

    /// The gateway answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// The request could not be sent or the response could not be read
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{machine}' is not a supported machine (expected one of: {})", .supported.join(", "))]
    InvalidMachine {
        machine: String,
        supported: Vec<String>,
    },

    #[error("'{system}' is not a known system (expected one of: {})", .supported.join(", "))]
    InvalidSystem {
        system: String,
        supported: Vec<String>,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A job record lacks a field needed to address it on the gateway
    #[error("job record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NewtError {
    /// HTTP status code, if this error came from a gateway response
    pub fn status(&self) -> Option<u16> {
        match self {
            NewtError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the gateway refused the request for lack of a valid session.
    /// An expired session shows up this way; the client never re-authenticates.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
