use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid icon identifier: {0}")]
    InvalidIdentifier(String),

    #[error("No provider registered for prefix '{0}'")]
    UnknownPrefix(String),

    #[error("A provider is already registered for prefix '{0}'")]
    DuplicatePrefix(String),

    #[error("Upstream unavailable ({url}): {source}")]
    UpstreamUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed mapping for {provider}: {reason}")]
    MalformedMapping { provider: String, reason: String },

    #[error("Icon '{name}' not found in '{prefix}'{}", did_you_mean(.suggestion))]
    UnknownIconName {
        prefix: String,
        name: String,
        suggestion: Option<String>,
    },

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponseShape { url: String, reason: String },

    #[error("Invalid code point: {0}")]
    InvalidCodePoint(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from a load that several concurrent callers were waiting on.
    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::MalformedMapping {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected(url: &str, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponseShape {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// The underlying error, looking through [`Error::Shared`].
    pub fn root(&self) -> &Error {
        match self {
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }
}

impl From<Arc<Error>> for Error {
    fn from(err: Arc<Error>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(|shared| {
            // Other waiters still hold it; copy what can be copied
            let copied = match shared.as_ref() {
                Self::InvalidIdentifier(s) => Some(Self::InvalidIdentifier(s.clone())),
                Self::UnknownPrefix(s) => Some(Self::UnknownPrefix(s.clone())),
                Self::MalformedMapping { provider, reason } => Some(Self::malformed(provider, reason.clone())),
                Self::UnexpectedResponseShape { url, reason } => Some(Self::unexpected(url, reason.clone())),
                Self::InvalidCodePoint(s) => Some(Self::InvalidCodePoint(s.clone())),
                _ => None,
            };
            copied.unwrap_or(Self::Shared(shared))
        })
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
