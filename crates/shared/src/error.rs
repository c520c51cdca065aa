use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Thank you for joining the waitlist!";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again later.";

/// Local, synchronous rejection of a draft. Never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Error body reported by the document store, or a transport failure with no status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", describe_remote(.code, .kind, .message))]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteError {
    pub fn new(code: u16, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            kind: Some(kind.into()),
            message: Some(message.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            kind: None,
            message: Some(message.into()),
        }
    }
}

fn describe_remote(code: &Option<u16>, kind: &Option<String>, message: &Option<String>) -> String {
    let message = message.as_deref().unwrap_or("no message");
    match (code, kind.as_deref()) {
        (Some(code), Some(kind)) => format!("{code} {kind}: {message}"),
        (Some(code), None) => format!("{code}: {message}"),
        (None, _) => format!("transport: {message}"),
    }
}

/// Remote failure after classification by status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Authentication error. Please contact support.")]
    Auth,
    #[error("This email is already registered.")]
    Conflict,
    #[error("Invalid data provided. Please check your inputs.")]
    BadRequest,
    #[error("{}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Unclassified { message: Option<String> },
}

pub fn classify_remote_error(err: &RemoteError) -> SubmissionError {
    match err.code {
        Some(401) => SubmissionError::Auth,
        Some(409) => SubmissionError::Conflict,
        Some(400) => SubmissionError::BadRequest,
        _ => SubmissionError::Unclassified {
            message: err
                .message
                .as_ref()
                .filter(|message| !message.is_empty())
                .cloned(),
        },
    }
}

/// Why the last attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
