use axum::http::StatusCode;
use std::fmt;

/// Failures inside the ledger's persistence layer. None of these reach the
/// caller of a ledger operation; they are logged and degrade to a fresh week.
#[derive(Debug)]
pub enum LedgerError {
    PersistenceUnavailable(String),
    Io(std::io::Error),
    Deserialization(serde_json::Error),
    MalformedLedger(String),
    InvalidEntry(String),
    ReferenceNotFound { date: String, entry_id: Option<String> },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersistenceUnavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Io(err) => write!(f, "storage i/o failed: {err}"),
            Self::Deserialization(err) => write!(f, "stored ledger is malformed: {err}"),
            Self::MalformedLedger(reason) => write!(f, "stored ledger is malformed: {reason}"),
            Self::InvalidEntry(reason) => write!(f, "invalid entry: {reason}"),
            Self::ReferenceNotFound { date, entry_id: None } => {
                write!(f, "no day {date} in the current week")
            }
            Self::ReferenceNotFound { date, entry_id: Some(id) } => {
                write!(f, "no entry {id} on {date}")
            }
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Deserialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
