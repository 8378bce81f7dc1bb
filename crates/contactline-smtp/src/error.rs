//! Error types for SMTP operations.

use std::io;

use crate::session::Stage;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
///
/// Every failure of a send lands in exactly one [`FailureClass`], which is what
/// callers should branch on when deciding whether a retry makes sense.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection could not be opened, or a read/write on it failed.
    #[error("SMTP connection failed during {stage}: {source}")]
    Transport {
        /// Stage in progress when the connection failed.
        stage: Stage,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The relay did not answer within the configured timeout.
    #[error("SMTP {0} timed out")]
    Timeout(Stage),

    /// The relay answered the connection with a 4xx/5xx greeting.
    #[error("SMTP relay unavailable: {0}")]
    Unavailable(String),

    /// The relay sent something that is not an SMTP reply.
    #[error("SMTP protocol error during {stage}: {detail}")]
    Protocol {
        /// Stage in progress when the bad reply arrived.
        stage: Stage,
        /// What was wrong with it.
        detail: String,
    },

    /// The relay hostname is not usable as a TLS server name.
    #[error("Invalid relay hostname: {0}")]
    InvalidHostname(String),

    /// The relay rejected the credentials.
    #[error("SMTP AUTH failed: {0}")]
    AuthRejected(String),

    /// The relay refused the message content.
    #[error("SMTP DATA failed: {0}")]
    DataRejected(String),

    /// The relay rejected an intermediate command under strict reply checking.
    #[error("SMTP {stage} failed: {reply}")]
    Rejected {
        /// Rejected stage.
        stage: Stage,
        /// Raw reply text.
        reply: String,
    },

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Network, TLS or framing failure. May succeed if tried again.
    Transport,
    /// The relay refused credentials or content. Retrying with the same
    /// input will fail the same way.
    Rejection,
    /// The caller supplied something that cannot be sent at all.
    InvalidInput,
}

impl Error {
    /// Wraps an I/O error with the stage it happened in.
    #[must_use]
    pub const fn transport(stage: Stage, source: io::Error) -> Self {
        Self::Transport { stage, source }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> FailureClass {
        match self {
            Self::Transport { .. }
            | Self::Timeout(_)
            | Self::Unavailable(_)
            | Self::Protocol { .. } => FailureClass::Transport,
            Self::AuthRejected(_) | Self::DataRejected(_) | Self::Rejected { .. } => {
                FailureClass::Rejection
            }
            Self::InvalidHostname(_) | Self::InvalidAddress(_) => FailureClass::InvalidInput,
        }
    }

    /// Returns the protocol stage the error is attributed to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Transport { stage, .. }
            | Self::Protocol { stage, .. }
            | Self::Rejected { stage, .. } => Some(*stage),
            Self::Timeout(stage) => Some(*stage),
            Self::Unavailable(_) => Some(Stage::Connect),
            Self::AuthRejected(_) => Some(Stage::AuthPass),
            Self::DataRejected(_) => Some(Stage::Message),
            Self::InvalidHostname(_) | Self::InvalidAddress(_) => None,
        }
    }

    /// Returns the raw relay reply carried by a rejection, if any.
    #[must_use]
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::AuthRejected(reply)
            | Self::DataRejected(reply)
            | Self::Unavailable(reply)
            | Self::Rejected { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// Returns true if sending again could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), FailureClass::Transport)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn auth_rejection_names_stage_and_reply() {
        let err = Error::AuthRejected("535 5.7.8 Authentication failed".into());
        assert_eq!(
            err.to_string(),
            "SMTP AUTH failed: 535 5.7.8 Authentication failed"
        );
        assert_eq!(err.class(), FailureClass::Rejection);
        assert_eq!(err.stage(), Some(Stage::AuthPass));
        assert!(!err.is_retryable());
    }

    #[test]
    fn data_rejection_names_stage_and_reply() {
        let err = Error::DataRejected("550 Message rejected".into());
        assert_eq!(err.to_string(), "SMTP DATA failed: 550 Message rejected");
        assert_eq!(err.reply(), Some("550 Message rejected"));
        assert_eq!(err.stage(), Some(Stage::Message));
    }

    #[test]
    fn transport_errors_are_retryable() {
        let err = Error::transport(
            Stage::Connect,
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(err.class(), FailureClass::Transport);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "SMTP connection failed during connect: refused");

        let err = Error::Unavailable("421 Service unavailable".into());
        assert!(err.is_retryable());
        assert_eq!(err.stage(), Some(Stage::Connect));
    }

    #[test]
    fn dropped_auth_connection_reads_differently_from_rejection() {
        let dropped = Error::transport(
            Stage::AuthPass,
            io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by relay"),
        );
        let rejected = Error::AuthRejected("535 5.7.8 Authentication failed".into());

        assert_eq!(
            dropped.to_string(),
            "SMTP connection failed during AUTH: connection closed by relay"
        );
        assert!(!dropped.to_string().starts_with("SMTP AUTH failed"));
        assert_ne!(dropped.class(), rejected.class());
    }

    #[test]
    fn invalid_input_is_not_retryable() {
        let err = Error::InvalidAddress("Address must contain @".into());
        assert_eq!(err.class(), FailureClass::InvalidInput);
        assert!(!err.is_retryable());
        assert!(err.stage().is_none());
    }
}
