//! # contactline
//!
//! HTTP entry point that turns a portfolio site's contact-form submission into
//! an email to the site owner, delivered through an authenticated SMTP relay.
//!
//! ```text
//! POST /send-contact-email  {name, email, phone?, message, recipientEmail}
//!   → validate → resolve credentials → compose → contactline_smtp::Mailer
//! ```
//!
//! Without mail credentials the submission is still acknowledged; the
//! notification is simply skipped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod http;
pub mod notification;

pub use config::{Config, CredentialSource};
pub use http::{AppState, HttpServer, router};
pub use notification::{Contact, ContactSubmission, NotificationError};
