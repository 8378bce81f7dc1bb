//! Submission state machine.
//!
//! ```text
//! Connected ─EHLO→ Greeted ─AUTH LOGIN→ AuthUser ─user→ AuthPass ─pass→ Authenticated
//!     ─MAIL FROM→ EnvelopeFrom ─RCPT TO→ EnvelopeTo ─DATA→ DataOpen ─message→ DataSent
//!     ─QUIT→ Closed
//! ```
//!
//! Everything here is pure: the driver performs the I/O and feeds each reply
//! to [`transition`].

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Session state, named after what has already happened on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Greeting received.
    Connected,
    /// EHLO answered.
    Greeted,
    /// AUTH LOGIN started; relay is asking for the username.
    AuthUser,
    /// Username sent; relay is asking for the password.
    AuthPass,
    /// Credentials accepted.
    Authenticated,
    /// Sender accepted.
    EnvelopeFrom,
    /// Recipient accepted.
    EnvelopeTo,
    /// Relay is ready for message content.
    DataOpen,
    /// Message accepted for delivery.
    DataSent,
    /// QUIT sent.
    Closed,
}

/// One command/reply exchange of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Opening the connection and reading the greeting.
    Connect,
    /// `EHLO`.
    Ehlo,
    /// `AUTH LOGIN`.
    AuthLogin,
    /// Base64 username.
    AuthUser,
    /// Base64 password; the authentication gate.
    AuthPass,
    /// `MAIL FROM`.
    MailFrom,
    /// `RCPT TO`.
    RcptTo,
    /// `DATA`.
    Data,
    /// Message content and terminator; the acceptance gate.
    Message,
    /// `QUIT`.
    Quit,
}

/// How much of the conversation is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPolicy {
    /// Only the greeting, the authentication result and the message
    /// acceptance are checked. Other replies are read and logged.
    #[default]
    Gated,
    /// Every reply must carry its expected code.
    Strict,
}

impl State {
    /// The exchange that leaves this state, or `None` once closed.
    #[must_use]
    pub const fn stage(self) -> Option<Stage> {
        match self {
            Self::Connected => Some(Stage::Ehlo),
            Self::Greeted => Some(Stage::AuthLogin),
            Self::AuthUser => Some(Stage::AuthUser),
            Self::AuthPass => Some(Stage::AuthPass),
            Self::Authenticated => Some(Stage::MailFrom),
            Self::EnvelopeFrom => Some(Stage::RcptTo),
            Self::EnvelopeTo => Some(Stage::Data),
            Self::DataOpen => Some(Stage::Message),
            Self::DataSent => Some(Stage::Quit),
            Self::Closed => None,
        }
    }

    /// The state reached when this state's exchange succeeds.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Connected => Self::Greeted,
            Self::Greeted => Self::AuthUser,
            Self::AuthUser => Self::AuthPass,
            Self::AuthPass => Self::Authenticated,
            Self::Authenticated => Self::EnvelopeFrom,
            Self::EnvelopeFrom => Self::EnvelopeTo,
            Self::EnvelopeTo => Self::DataOpen,
            Self::DataOpen => Self::DataSent,
            Self::DataSent | Self::Closed => Self::Closed,
        }
    }
}

impl Stage {
    /// Returns true if `code` is the reply this stage expects.
    #[must_use]
    pub const fn expects(self, code: ReplyCode) -> bool {
        match self {
            Self::Connect => code.as_u16() == ReplyCode::SERVICE_READY.as_u16(),
            Self::Ehlo | Self::MailFrom | Self::Message => code.as_u16() == ReplyCode::OK.as_u16(),
            Self::AuthLogin | Self::AuthUser => {
                code.as_u16() == ReplyCode::AUTH_CONTINUE.as_u16()
            }
            Self::AuthPass => code.as_u16() == ReplyCode::AUTH_SUCCESS.as_u16(),
            Self::RcptTo => {
                code.as_u16() == ReplyCode::OK.as_u16()
                    || code.as_u16() == ReplyCode::FORWARD.as_u16()
            }
            Self::Data => code.as_u16() == ReplyCode::START_DATA.as_u16(),
            Self::Quit => true,
        }
    }

    /// Returns true for the stages whose reply is checked under every policy.
    #[must_use]
    pub const fn is_gate(self) -> bool {
        matches!(self, Self::Connect | Self::AuthPass | Self::Message)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Ehlo => "EHLO",
            Self::AuthLogin => "AUTH LOGIN",
            Self::AuthUser => "AUTH username",
            Self::AuthPass => "AUTH",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Data => "DATA command",
            Self::Message => "DATA",
            Self::Quit => "QUIT",
        })
    }
}

/// Checks the greeting read right after connecting.
///
/// Any greeting that is not a 4xx/5xx refusal opens the session; a refusal
/// means the relay will not talk to us and counts as a transport failure.
///
/// # Errors
///
/// Returns [`Error::Unavailable`] with the relay's text for a refusal.
pub fn greet(reply: &Reply) -> Result<State> {
    if reply.is_error() {
        return Err(Error::Unavailable(reply.to_string()));
    }
    Ok(State::Connected)
}

/// Advances the session given the reply to `state`'s exchange.
///
/// # Errors
///
/// - [`Error::AuthRejected`] if the password is not answered with 235.
/// - [`Error::DataRejected`] if the message is not answered with 250.
/// - [`Error::Rejected`] for any other unexpected reply under [`ReplyPolicy::Strict`].
pub fn transition(state: State, reply: &Reply, policy: ReplyPolicy) -> Result<State> {
    let Some(stage) = state.stage() else {
        return Ok(State::Closed);
    };

    if stage.expects(reply.code) {
        return Ok(state.next());
    }

    match (stage, policy) {
        (Stage::AuthPass, _) => Err(Error::AuthRejected(reply.to_string())),
        (Stage::Message, _) => Err(Error::DataRejected(reply.to_string())),
        (_, ReplyPolicy::Strict) => Err(Error::Rejected {
            stage,
            reply: reply.to_string(),
        }),
        (_, ReplyPolicy::Gated) => {
            tracing::debug!(%stage, %reply, "unexpected reply ignored");
            Ok(state.next())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reply(code: u16, text: &str) -> Reply {
        Reply::new(ReplyCode::new(code), vec![text.to_string()])
    }

    const HAPPY_PATH: [(State, u16); 9] = [
        (State::Connected, 250),
        (State::Greeted, 334),
        (State::AuthUser, 334),
        (State::AuthPass, 235),
        (State::Authenticated, 250),
        (State::EnvelopeFrom, 250),
        (State::EnvelopeTo, 354),
        (State::DataOpen, 250),
        (State::DataSent, 221),
    ];

    #[test]
    fn happy_path_reaches_closed() {
        for policy in [ReplyPolicy::Gated, ReplyPolicy::Strict] {
            let mut state = greet(&reply(220, "relay ESMTP ready")).unwrap();
            for (expected, code) in HAPPY_PATH {
                assert_eq!(state, expected);
                state = transition(state, &reply(code, "ok"), policy).unwrap();
            }
            assert_eq!(state, State::Closed);
            assert!(state.stage().is_none());
        }
    }

    #[test]
    fn refused_greeting_is_unavailable() {
        let err = greet(&reply(421, "Service unavailable")).unwrap_err();
        assert_eq!(err.to_string(), "SMTP relay unavailable: 421 Service unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn auth_gate_applies_under_every_policy() {
        for policy in [ReplyPolicy::Gated, ReplyPolicy::Strict] {
            let err = transition(
                State::AuthPass,
                &reply(535, "5.7.8 Authentication failed"),
                policy,
            )
            .unwrap_err();
            assert_eq!(
                err.to_string(),
                "SMTP AUTH failed: 535 5.7.8 Authentication failed"
            );
        }
    }

    #[test]
    fn data_gate_applies_under_every_policy() {
        for policy in [ReplyPolicy::Gated, ReplyPolicy::Strict] {
            let err = transition(State::DataOpen, &reply(550, "Message rejected"), policy)
                .unwrap_err();
            assert_eq!(err.to_string(), "SMTP DATA failed: 550 Message rejected");
        }
    }

    #[test]
    fn gated_policy_ignores_intermediate_replies() {
        let next = transition(
            State::EnvelopeFrom,
            &reply(550, "no such user"),
            ReplyPolicy::Gated,
        )
        .unwrap();
        assert_eq!(next, State::EnvelopeTo);
    }

    #[test]
    fn strict_policy_rejects_intermediate_replies() {
        let err = transition(
            State::EnvelopeFrom,
            &reply(550, "5.1.1 no such user"),
            ReplyPolicy::Strict,
        )
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::RcptTo));
        assert_eq!(err.to_string(), "SMTP RCPT TO failed: 550 5.1.1 no such user");
        assert!(!err.is_retryable());
    }

    #[test]
    fn quit_reply_never_fails() {
        let next = transition(State::DataSent, &reply(500, "eh"), ReplyPolicy::Strict).unwrap();
        assert_eq!(next, State::Closed);
    }

    #[test]
    fn rcpt_accepts_forward() {
        assert!(Stage::RcptTo.expects(ReplyCode::FORWARD));
        assert!(!Stage::Data.expects(ReplyCode::OK));
        assert!(Stage::AuthPass.is_gate());
        assert!(!Stage::Ehlo.is_gate());
    }
}
