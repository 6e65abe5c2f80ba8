// ── Core error types ──
//
// The dashboard-facing error taxonomy. Consumers see "cannot reach the
// service", "the service said no" and "the body made no sense" rather than
// raw reqwest or serde failures. The `From<docbot_api::Error>` impl does
// the translation.

use std::fmt;

use thiserror::Error;

use crate::settings::FieldError;

/// Unified error type for the core crate.
///
/// `Clone` so a failed fetch can be stored in a [`ResourceState`](crate::ResourceState)
/// and fanned out to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Network ──────────────────────────────────────────────────────
    #[error("Cannot reach admin service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Service ──────────────────────────────────────────────────────
    /// Non-success status. `message` is the server's `detail` or the
    /// status text.
    #[error("Admin service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response from admin service: {message}")]
    Decode { message: String },

    // ── Local ────────────────────────────────────────────────────────
    /// Client-side validation rejected the input before any request.
    #[error("Validation failed: {}", FieldErrors(errors))]
    Validation { errors: Vec<FieldError> },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Failed before the service produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Field-level validation errors, empty for every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<docbot_api::Error> for CoreError {
    fn from(err: docbot_api::Error) -> Self {
        match err {
            docbot_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_decode() {
                    CoreError::Decode {
                        message: e.to_string(),
                    }
                } else if let Some(status) = e.status() {
                    CoreError::Http {
                        status: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .map_or_else(|| status.to_string(), String::from),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            docbot_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            docbot_api::Error::Http { status, message } => CoreError::Http { status, message },
            docbot_api::Error::Deserialization { message, .. } => CoreError::Decode { message },
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CredentialField;

    #[test]
    fn http_errors_keep_status_and_detail() {
        let err = CoreError::from(docbot_api::Error::Http {
            status: 500,
            message: "disk full".into(),
        });
        assert_eq!(
            err,
            CoreError::Http {
                status: 500,
                message: "disk full".into()
            }
        );
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_network());
    }

    #[test]
    fn deserialization_maps_to_decode() {
        let err = CoreError::from(docbot_api::Error::Deserialization {
            message: "missing field `pending`".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::Decode { ref message } if message.contains("pending")));
    }

    #[test]
    fn validation_display_lists_every_field() {
        let err = CoreError::Validation {
            errors: vec![
                FieldError::new(CredentialField::AccessToken, "is required"),
                FieldError::new(CredentialField::AdminPassword, "must be at least 6 characters"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("access_token: is required"));
        assert!(text.contains("admin_password: must be at least 6 characters"));
        assert_eq!(err.field_errors().len(), 2);
    }
}
