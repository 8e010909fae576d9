use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("missing access token: environment variable {0} is not set")]
    MissingToken(String),
    #[error("invalid calendar URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("calendar API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed event {id}: {message}")]
    MalformedEvent { id: String, message: String },
}
