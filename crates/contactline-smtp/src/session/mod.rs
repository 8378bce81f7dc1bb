//! One-shot submission sessions.
//!
//! A [`Mailer`] opens one connection per message, walks the [`State`] machine
//! from greeting to `QUIT`, and closes the connection before returning,
//! whichever stage the session ended in.

mod state;
mod transcript;

pub use state::{ReplyPolicy, Stage, State, greet, transition};
pub use transcript::{Exchange, Transcript};

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::command::Command;
use crate::connection::{Connection, Connector, TlsConnector};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::types::Reply;

/// Gmail's submission host.
pub const DEFAULT_HOST: &str = "smtp.gmail.com";

/// Implicit-TLS submission port.
pub const DEFAULT_PORT: u16 = 465;

/// Where and how to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Relay hostname; also announced in `EHLO`.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Which replies are checked.
    pub policy: ReplyPolicy,
    /// Limit for opening the connection and for each read, write or shutdown;
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl RelayConfig {
    /// Creates a gated, untimed configuration for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            policy: ReplyPolicy::Gated,
            timeout: None,
        }
    }

    /// Sets the reply policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: ReplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the per-exchange timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Account used for AUTH LOGIN.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a username and an app password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sends messages through one relay, one connection per message.
#[derive(Debug, Clone)]
pub struct Mailer<C> {
    connector: C,
    relay: RelayConfig,
}

impl<C: Connector> Mailer<C> {
    /// Creates a mailer.
    #[must_use]
    pub const fn new(connector: C, relay: RelayConfig) -> Self {
        Self { connector, relay }
    }

    /// Relay this mailer submits to.
    #[must_use]
    pub const fn relay(&self) -> &RelayConfig {
        &self.relay
    }

    /// Delivers `message` to its single recipient.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the session; see [`crate::Error::class`]
    /// for telling transport failures from rejections.
    pub async fn send(&self, credentials: &Credentials, message: &Message) -> Result<()> {
        let connect = self.connector.connect(&self.relay.host, self.relay.port);
        let stream = match self.relay.timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| Error::Timeout(Stage::Connect))??,
            None => connect.await?,
        };
        tracing::debug!(host = %self.relay.host, port = self.relay.port, "SMTP connected");

        let connection = Connection::new(stream, self.relay.timeout);
        Session::new(&self.relay, credentials, message)
            .drive(connection)
            .await
    }
}

/// Sends one message over implicit TLS.
///
/// # Errors
///
/// Returns the first failure of the session.
pub async fn send_mail(
    relay: &RelayConfig,
    credentials: &Credentials,
    message: &Message,
) -> Result<()> {
    Mailer::new(TlsConnector::new(), relay.clone())
        .send(credentials, message)
        .await
}

struct Session<'a> {
    relay: &'a RelayConfig,
    credentials: &'a Credentials,
    message: &'a Message,
    transcript: Transcript,
}

impl<'a> Session<'a> {
    const fn new(
        relay: &'a RelayConfig,
        credentials: &'a Credentials,
        message: &'a Message,
    ) -> Self {
        Self {
            relay,
            credentials,
            message,
            transcript: Transcript::new(),
        }
    }

    /// Runs the conversation and closes `connection` whatever the outcome.
    async fn drive<S>(mut self, mut connection: Connection<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let outcome = self.converse(&mut connection).await;
        connection.close().await;

        match &outcome {
            Ok(()) => tracing::info!(
                relay = %self.relay.host,
                recipient = %self.message.recipient(),
                "message accepted by relay"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                transcript = %self.transcript,
                "SMTP session failed"
            ),
        }
        outcome
    }

    async fn converse<S>(&mut self, connection: &mut Connection<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let greeting = connection.read_reply(Stage::Connect).await?;
        self.transcript
            .record(Stage::Connect, None, greeting.clone());
        let mut state = greet(&greeting)?;

        while let Some(stage) = state.stage() {
            if stage == Stage::Quit {
                // The message is already accepted; a failed QUIT changes nothing.
                if let Err(e) = self.exchange(connection, stage).await {
                    tracing::debug!(error = %e, "QUIT failed");
                }
                return Ok(());
            }

            let reply = self.exchange(connection, stage).await?;
            state = transition(state, &reply, self.relay.policy)?;
        }

        Ok(())
    }

    async fn exchange<S>(&mut self, connection: &mut Connection<S>, stage: Stage) -> Result<Reply>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (bytes, logged) = match self.command(stage) {
            Some(command) => (command.serialize(), command.redacted()),
            None => {
                let data = self.message.to_data();
                let logged = format!("<message, {} bytes>", data.len());
                (data, logged)
            }
        };

        tracing::debug!(%stage, command = %logged, "SMTP >");
        connection.send(stage, &bytes).await?;
        let reply = connection.read_reply(stage).await?;
        self.transcript.record(stage, Some(logged), reply.clone());
        Ok(reply)
    }

    /// Command for `stage`; `None` for the message content itself.
    fn command(&self, stage: Stage) -> Option<Command> {
        let command = match stage {
            Stage::Connect | Stage::Message => return None,
            Stage::Ehlo => Command::Ehlo {
                hostname: self.relay.host.clone(),
            },
            Stage::AuthLogin => Command::AuthLogin,
            Stage::AuthUser => Command::auth_response(&self.credentials.username),
            Stage::AuthPass => Command::auth_response(&self.credentials.password),
            Stage::MailFrom => Command::MailFrom {
                from: self.message.sender().clone(),
            },
            Stage::RcptTo => Command::RcptTo {
                to: self.message.recipient().clone(),
            },
            Stage::Data => Command::Data,
            Stage::Quit => Command::Quit,
        };
        Some(command)
    }
}
