//! Error types shared across the crate.

use thiserror::Error;

/// Failures talking to the spreadsheet service.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The service-account key file could not be read
    #[error("Failed to read credentials file {path}: {source}")]
    CredentialsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The service-account key file is not valid key JSON
    #[error("Invalid service-account key: {0}")]
    CredentialsFormat(#[from] serde_json::Error),

    /// Signing the OAuth assertion failed
    #[error("Failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Worksheet not found: {0}")]
    TabNotFound(String),

    #[error("The header row in the worksheet contains duplicates: {0}")]
    DuplicateHeaders(String),
}

impl SheetsError {
    /// Builds an [`SheetsError::Api`] from a failed response, preferring the
    /// message Google puts in its error envelope over the raw body.
    pub async fn from_response(response: reqwest::Response) -> SheetsError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        SheetsError::Api {
            status,
            message: api_error_message(&body),
        }
    }
}

/// Extracts `error.message` (or the OAuth `error_description`) from a Google
/// error body, falling back to the body itself.
pub(crate) fn api_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error_description"))
        .and_then(|m| m.as_str());

    match message {
        Some(m) => m.to_string(),
        None => body.trim().to_string(),
    }
}

/// Problems with the shape or content of rows read back from a tab.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("could not parse '{value}' in column '{column}' as a date")]
    InvalidDate { column: String, value: String },
}

/// Everything that can stop a dashboard section from rendering.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("{0}")]
    Chart(String),

    /// The memoized client could not be initialized.
    #[error("{0}")]
    Unavailable(String),
}
