use serde::{Deserialize, Serialize};
use std::fmt;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Machine-readable failure class carried next to the human-readable `error`.
///
/// Lets presentation code tell a transport problem apart from a domain-level
/// refusal (e.g. unsubscribing an address that was never subscribed) without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    HttpStatus,
    Decode,
    Invalid,
    NotFound,
    Conflict,
    #[serde(other)]
    Unknown,
}

/// The `{ success, data, error? }` wrapper every data-source operation resolves to.
///
/// Failed envelopes still carry a `data` value (the type's empty default), so a
/// caller that forgets to check `success` reads an empty value instead of garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
            code: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }

    pub fn into_result(self) -> Result<T, EnvelopeError> {
        if self.success {
            return Ok(self.data);
        }
        Err(EnvelopeError {
            code: self.code,
            message: self.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        })
    }
}

impl<T: Default> Envelope<T> {
    pub fn fail(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: T::default(),
            error: Some(message.into()),
            code: Some(code),
        }
    }
}

/// A failed envelope, detached from its placeholder data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeError {
    pub code: Option<ErrorCode>,
    pub message: String,
}

impl EnvelopeError {
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == Some(code)
    }
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EnvelopeError {}
