//! Service configuration.
//!
//! Relay settings are fixed at startup from flags or environment variables.
//! Mail account credentials are secrets and are looked up on every request,
//! so rotating them does not need a restart.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use clap::{Args, Parser};
use contactline_smtp::session::{DEFAULT_HOST, DEFAULT_PORT};
use contactline_smtp::{Credentials, RelayConfig, ReplyPolicy};

/// Environment variable holding the mail account username.
pub const USER_VAR: &str = "GMAIL_USER";

/// Environment variable holding the mail account app password.
pub const PASSWORD_VAR: &str = "GMAIL_APP_PASSWORD";

/// Command-line arguments / environment variables
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "contactline", version, about)]
pub struct Config {
    /// The HTTP server configuration
    #[command(flatten)]
    pub server: ServerConfig,

    /// The mail relay configuration
    #[command(flatten)]
    pub relay: RelayArgs,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
}

/// Configuration for the mail relay.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RelayArgs {
    /// Relay hostname
    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_HOST)]
    pub smtp_host: String,

    /// Relay port
    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_PORT)]
    pub smtp_port: u16,

    /// Connect without TLS (local relays only)
    #[arg(long = "smtp-plaintext", env = "SMTP_PLAINTEXT")]
    pub plaintext: bool,

    /// Check every relay reply instead of only authentication and acceptance
    #[arg(long = "smtp-strict-replies", env = "SMTP_STRICT_REPLIES")]
    pub strict_replies: bool,

    /// Seconds to wait for each relay read or write; 0 waits indefinitely
    #[arg(long = "smtp-timeout-secs", env = "SMTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Display name on the From header
    #[arg(
        long = "sender-name",
        env = "SMTP_SENDER_NAME",
        default_value = "Portfolio Contact Form"
    )]
    pub sender_name: String,
}

impl RelayArgs {
    /// Builds the relay configuration for the SMTP driver.
    #[must_use]
    pub fn relay_config(&self) -> RelayConfig {
        let policy = if self.strict_replies {
            ReplyPolicy::Strict
        } else {
            ReplyPolicy::Gated
        };
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));

        RelayConfig::new(self.smtp_host.clone(), self.smtp_port)
            .with_policy(policy)
            .with_timeout(timeout)
    }
}

/// Where mail account credentials come from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read the named environment variables at lookup time.
    Env {
        /// Variable holding the username.
        user_var: String,
        /// Variable holding the app password.
        password_var: String,
    },
    /// Fixed credentials; `None` means email notification is off.
    Static(Option<Credentials>),
}

impl CredentialSource {
    /// Reads [`USER_VAR`] and [`PASSWORD_VAR`].
    #[must_use]
    pub fn env() -> Self {
        Self::Env {
            user_var: USER_VAR.to_string(),
            password_var: PASSWORD_VAR.to_string(),
        }
    }

    /// Returns the credentials, or `None` if either part is missing or empty.
    #[must_use]
    pub fn resolve(&self) -> Option<Credentials> {
        match self {
            Self::Env {
                user_var,
                password_var,
            } => {
                let user = non_empty_var(user_var)?;
                let password = non_empty_var(password_var)?;
                Some(Credentials::new(user, password))
            }
            Self::Static(credentials) => credentials.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
