//! Contact-form submissions and the notification email built from them.

use contactline_smtp::{Address, Mailbox, Message};
use serde::Deserialize;

/// Errors turning a submission into a deliverable message.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// `name`, `email`, `message` or `recipientEmail` is absent or empty.
    #[error("Missing required fields")]
    MissingFields,

    /// A visitor-supplied address cannot be put on the wire.
    #[error("Invalid {field} address: {reason}")]
    InvalidAddress {
        /// Request field holding the address.
        field: &'static str,
        /// Why the address was refused.
        reason: String,
    },

    /// The configured mail account is not a usable sender address.
    #[error("Invalid sender account")]
    InvalidSender(#[source] contactline_smtp::Error),

    /// The relay session failed.
    #[error(transparent)]
    Delivery(#[from] contactline_smtp::Error),
}

impl NotificationError {
    fn invalid_address(field: &'static str, err: contactline_smtp::Error) -> Self {
        let reason = match err {
            contactline_smtp::Error::InvalidAddress(reason) => reason,
            other => other.to_string(),
        };
        Self::InvalidAddress { field, reason }
    }
}

/// Request body as posted by the contact form.
///
/// Every field is optional at this layer so that a missing field is reported
/// as [`NotificationError::MissingFields`] rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    /// Visitor's name.
    #[serde(default)]
    pub name: Option<String>,
    /// Visitor's email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Visitor's phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Message text.
    #[serde(default)]
    pub message: Option<String>,
    /// Where the notification goes.
    #[serde(default)]
    pub recipient_email: Option<String>,
}

impl ContactSubmission {
    /// Checks that all required fields are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingFields`] otherwise.
    pub fn validate(self) -> Result<Contact, NotificationError> {
        let (Some(name), Some(email), Some(message), Some(recipient)) = (
            present(self.name),
            present(self.email),
            present(self.message),
            present(self.recipient_email),
        ) else {
            return Err(NotificationError::MissingFields);
        };

        Ok(Contact {
            name,
            email,
            phone: present(self.phone),
            message,
            recipient,
        })
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
    recipient: String,
}

impl Contact {
    /// Address the notification is delivered to.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Notification subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("New Contact Form Message from {}", self.name)
    }

    /// Notification body, CRLF-separated.
    #[must_use]
    pub fn body(&self) -> String {
        let phone = self
            .phone
            .as_deref()
            .map(|phone| format!("Phone: {phone}"))
            .unwrap_or_default();

        [
            "New Contact Form Submission",
            "",
            &format!("From: {}", self.name),
            &format!("Email: {}", self.email),
            &phone,
            "",
            "Message:",
            &self.message,
            "",
            "---",
            "This email was sent from your portfolio contact form.",
        ]
        .join("\r\n")
    }

    /// Builds the notification sent from `account` under `sender_name`.
    ///
    /// Replies go to the visitor.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::InvalidAddress`] for an unusable visitor or
    /// recipient address, and [`NotificationError::InvalidSender`] for an
    /// unusable account.
    pub fn compose(&self, sender_name: &str, account: &str) -> Result<Message, NotificationError> {
        let from =
            Mailbox::with_name(sender_name, account).map_err(NotificationError::InvalidSender)?;
        let to = Address::new(self.recipient.as_str())
            .map_err(|e| NotificationError::invalid_address("recipientEmail", e))?;
        let reply_to = Address::new(self.email.as_str())
            .map_err(|e| NotificationError::invalid_address("email", e))?;

        Ok(Message::new(from, to, self.subject(), self.body()).reply_to(reply_to))
    }
}
