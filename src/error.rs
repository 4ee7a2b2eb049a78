use thiserror::Error;

/// Failures surfaced by the data layer.
///
/// `NetworkUnavailable` and `MalformedInput` from a remote or default
/// source only make the source chain fall through to the next source;
/// the same errors from a user-picked file are reported to the user and
/// leave the active dataset untouched.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The payload decoded but is not a list of measurement records.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// The API answered with `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::MalformedInput(e.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DataError::MalformedInput(e.to_string())
        } else {
            DataError::NetworkUnavailable(e.to_string())
        }
    }
}
