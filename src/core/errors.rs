use reqwest::StatusCode;
use thiserror::Error as ThisError;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

// Error type alias used throughout the crate.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Fetch Error
--------------------------------------------------------------------------------------*/

/// Errors raised while retrieving the AWS IP Ranges document. The refresh loop logs every
/// variant and waits for the next tick.
#[derive(Debug, ThisError)]
pub enum FetchError {
    /// The transport could not complete the request.
    #[error("transport error: {0}")]
    Transport(#[source] Error),

    /// The server answered with a status other than `200 OK` or `304 Not Modified`.
    #[error("unexpected HTTP status: {0}")]
    Status(StatusCode),

    /// The response body is not a valid AWS IP Ranges document.
    #[error("invalid AWS IP Ranges document: {0}")]
    Decode(#[from] serde_json::Error),
}

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error<E: std::fmt::Display>(error: &E) {
    log::error!("{}", error);
}
