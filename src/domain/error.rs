// Error taxonomy for period fetching and mapping
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashaError {
    /// Transport or connectivity failure
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with an explicit error payload
    #[error("service error: {0}")]
    Service(String),

    /// A period in the response was missing or had invalid required fields
    #[error("malformed period: {0}")]
    MalformedPeriod(String),
}

impl From<reqwest::Error> for DashaError {
    fn from(err: reqwest::Error) -> Self {
        DashaError::Network(err.to_string())
    }
}
