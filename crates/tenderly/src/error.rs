use reqwest::StatusCode;

pub type Result<T, E = TenderlyError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum TenderlyError {
    /// A required named configuration value is unset or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller supplied parameters are malformed. No request was sent.
    #[error("invalid parameter: {0}")]
    Validation(String),

    /// The request could not be completed, or completed with a non-2xx status
    /// or a JSON-RPC error object.
    #[error("transport error{}: {message}", display_status(.status))]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },

    /// The vendor answered successfully but the body does not have the
    /// expected shape.
    #[error("failed to parse Tenderly {what} response: {body}")]
    MalformedResponse { what: &'static str, body: String },

    /// A state mutating call succeeded but the fork still reports no head.
    #[error("fork {0} has no head after state mutation")]
    HeadNotFound(String),
}

fn display_status(status: &Option<StatusCode>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl TenderlyError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<reqwest::Error> for TenderlyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status(),
            message: err.to_string(),
        }
    }
}
