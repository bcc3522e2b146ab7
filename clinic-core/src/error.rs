/// Errors surfaced by the session layer and the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("Response is missing required data")]
    MissingData,
    #[error("Could not parse data: {0}")]
    Parse(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Session is not authorized; signed out")]
    Unauthorized,
    #[error("API returned status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::Parse(err.to_string())
    }
}
