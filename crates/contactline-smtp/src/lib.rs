//! # contactline-smtp
//!
//! A minimal SMTP submission client: one authenticated, encrypted session
//! delivering one plain-text message to one recipient.
//!
//! ## Features
//!
//! - **Explicit state machine**: every exchange is a [`State`] transition
//!   decided by a pure [`transition`] function
//! - **Implicit TLS** (port 465) via rustls, or plain TCP for local relays
//! - **AUTH LOGIN** authentication
//! - **Safe framing**: CRLF normalization, dot-stuffing, header sanitizing
//! - **Classified errors**: transport failures vs. relay rejections
//!
//! ## Quick Start
//!
//! ```ignore
//! use contactline_smtp::{Address, Credentials, Mailbox, Message, RelayConfig, send_mail};
//!
//! #[tokio::main]
//! async fn main() -> contactline_smtp::Result<()> {
//!     let relay = RelayConfig::default();
//!     let credentials = Credentials::new("studio@gmail.com", "app-password");
//!
//!     let message = Message::new(
//!         Mailbox::with_name("Portfolio Contact Form", "studio@gmail.com")?,
//!         Address::new("bookings@example.com")?,
//!         "New Contact Form Message from Ada",
//!         "Hello, interested in a shoot.",
//!     )
//!     .reply_to(Address::new("ada@example.com")?);
//!
//!     send_mail(&relay, &credentials, &message).await
//! }
//! ```
//!
//! ## Session
//!
//! ```text
//! greeting → EHLO → AUTH LOGIN → user → pass (235?) → MAIL FROM → RCPT TO
//!          → DATA → message (250?) → QUIT → close
//! ```
//!
//! Only the greeting and the two gates marked `?` are checked under the default
//! [`ReplyPolicy::Gated`]; [`ReplyPolicy::Strict`] checks every reply. The
//! connection is closed exactly once on every path.
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Relay connection and connectors
//! - [`message`]: Message framing and header sanitizing
//! - [`parser`]: Reply parser
//! - [`session`]: State machine and session driver
//! - [`types`]: Addresses and replies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod message;
pub mod parser;
pub mod session;
pub mod types;

pub use connection::{Connection, Connector, PlainConnector, TlsConnector};
pub use error::{Error, FailureClass, Result};
pub use message::Message;
pub use session::{
    Credentials, Mailer, RelayConfig, ReplyPolicy, Stage, State, Transcript, send_mail,
    transition,
};
pub use types::{Address, Mailbox, Reply, ReplyCode};
