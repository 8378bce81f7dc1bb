//! Diagnostic record of one session.

use std::fmt;

use super::Stage;
use crate::types::Reply;

/// One exchange as it may be logged.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Stage the exchange belongs to.
    pub stage: Stage,
    /// Command text with credentials hidden; `None` for the greeting.
    pub command: Option<String>,
    /// Reply received.
    pub reply: Reply,
}

/// Ordered command/reply pairs of a session. Never contains credentials.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    exchanges: Vec<Exchange>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exchanges: Vec::new(),
        }
    }

    /// Appends an exchange.
    pub fn record(&mut self, stage: Stage, command: Option<String>, reply: Reply) {
        self.exchanges.push(Exchange {
            stage,
            command,
            reply,
        });
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, exchange) in self.exchanges.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            if let Some(command) = &exchange.command {
                write!(f, "> {command} ")?;
            }
            write!(f, "< {}", exchange.reply)?;
        }
        Ok(())
    }
}
