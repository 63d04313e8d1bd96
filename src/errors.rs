use thiserror::Error;

use crate::store::StoreError;
use crate::summary::FormatError;

/// Everything that can make a user-triggered operation fail. The `Display`
/// text is what ends up on the status line, one message per failed operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Please enter your API Key first.")]
    MissingApiKey,

    #[error("Please enter a city name.")]
    MissingCity,

    #[error("Could not get your location: {0}")]
    Geolocation(String),

    #[error("API key rejected (unauthorized).")]
    Unauthorized,

    #[error("City not found.")]
    NotFound,

    #[error("Request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather data not available: {0}")]
    Format(#[from] FormatError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
