use crate::envelope::{Envelope, ErrorCode};
use std::fmt;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Check your connection and try again.";

/// A data-source failure before it is folded into an error envelope.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub code: ErrorCode,
    pub stage: &'static str,
    pub detail: String,
    /// Text the server supplied, shown to the user verbatim when present.
    pub server_message: Option<String>,
}

impl SourceFailure {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Transport,
            stage: "transport",
            detail: detail.into(),
            server_message: None,
        }
    }

    pub fn http_status(status: u16, server_message: Option<String>, code: Option<ErrorCode>) -> Self {
        let code = code.unwrap_or(match status {
            400 | 422 => ErrorCode::Invalid,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            _ => ErrorCode::HttpStatus,
        });
        Self {
            code,
            stage: "http",
            detail: format!("HTTP error! status: {status}"),
            server_message,
        }
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Decode,
            stage: "decode",
            detail: detail.into(),
            server_message: None,
        }
    }

    pub fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code,
            stage: "rejected",
            detail: message.clone(),
            server_message: Some(message),
        }
    }

    pub fn user_message(&self) -> String {
        if self.code == ErrorCode::Transport {
            return NETWORK_ERROR_MESSAGE.to_string();
        }
        self.server_message
            .clone()
            .unwrap_or_else(|| self.detail.clone())
    }

    pub fn into_envelope<T: Default>(self) -> Envelope<T> {
        Envelope::fail(self.code, self.user_message())
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data source error (stage={}, code={:?}): {}",
            self.stage, self.code, self.detail
        )
    }
}

impl std::error::Error for SourceFailure {}

/// Fold any error raised inside a provider into an error envelope.
pub fn envelope_from_error<T: Default>(err: &anyhow::Error) -> Envelope<T> {
    match err.downcast_ref::<SourceFailure>() {
        Some(failure) => failure.clone().into_envelope(),
        None => Envelope::fail(ErrorCode::Unknown, format!("{err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_hide_low_level_detail() {
        let env: Envelope<()> =
            SourceFailure::transport("tcp connect error: Connection refused").into_envelope();
        assert_eq!(env.error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        assert_eq!(env.code, Some(ErrorCode::Transport));
    }

    #[test]
    fn status_failures_prefer_server_text() {
        let f = SourceFailure::http_status(404, Some("Report not found".into()), None);
        assert_eq!(f.code, ErrorCode::NotFound);
        assert_eq!(f.user_message(), "Report not found");

        let f = SourceFailure::http_status(503, None, None);
        assert_eq!(f.code, ErrorCode::HttpStatus);
        assert_eq!(f.user_message(), "HTTP error! status: 503");
    }

    #[test]
    fn foreign_errors_become_unknown_envelopes() {
        let err = anyhow::anyhow!("boom").context("building request");
        let env: Envelope<u8> = envelope_from_error(&err);
        assert_eq!(env.code, Some(ErrorCode::Unknown));
        assert_eq!(env.error.as_deref(), Some("building request: boom"));
    }

    #[test]
    fn wrapped_source_failures_are_found_through_context() {
        let err = anyhow::Error::new(SourceFailure::decode("bad json")).context("GET /signals");
        let env: Envelope<u8> = envelope_from_error(&err);
        assert_eq!(env.code, Some(ErrorCode::Decode));
    }
}
