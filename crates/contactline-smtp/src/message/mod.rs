//! Plain-text message framing for the DATA phase.

pub mod header;

use chrono::{DateTime, Utc};

use crate::types::{Address, Mailbox};

/// A plain-text email with exactly one recipient.
#[derive(Debug, Clone)]
pub struct Message {
    from: Mailbox,
    to: Address,
    reply_to: Option<Address>,
    subject: String,
    body: String,
    date: DateTime<Utc>,
}

impl Message {
    /// Creates a message dated now.
    #[must_use]
    pub fn new(
        from: Mailbox,
        to: Address,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            reply_to: None,
            subject: subject.into(),
            body: body.into(),
            date: Utc::now(),
        }
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: Address) -> Self {
        self.reply_to = Some(address);
        self
    }

    /// Overrides the Date header.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Envelope sender.
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.from.address
    }

    /// Envelope recipient.
    #[must_use]
    pub const fn recipient(&self) -> &Address {
        &self.to
    }

    /// Header fields in transmission order.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("From", self.from.to_string()),
            ("To", self.to.to_string()),
        ];
        if let Some(reply_to) = &self.reply_to {
            headers.push(("Reply-To", reply_to.to_string()));
        }
        headers.extend([
            ("Subject", header::encode(&self.subject)),
            ("Date", self.date.to_rfc2822()),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", "text/plain; charset=UTF-8".to_string()),
            ("Content-Transfer-Encoding", "8bit".to_string()),
        ]);
        headers
    }

    /// Header fields, folded, followed by the blank separator line.
    fn header_block(&self) -> String {
        let mut block = String::new();
        for (name, value) in self.headers() {
            block.push_str(&header::fold(name, &value));
            block.push_str("\r\n");
        }
        block.push_str("\r\n");
        block
    }

    /// Builds the RFC 5322 formatted message with CRLF line endings.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        let mut message = self.header_block();

        for line in body_lines(&self.body) {
            message.push_str(line);
            message.push_str("\r\n");
        }

        message
    }

    /// Builds the exact bytes sent after `DATA`: the message with body lines
    /// dot-stuffed, followed by the terminating `.` line.
    #[must_use]
    pub fn to_data(&self) -> Vec<u8> {
        let header_block = self.header_block();
        let mut data = Vec::with_capacity(header_block.len() + self.body.len() + 16);
        data.extend_from_slice(header_block.as_bytes());

        for line in body_lines(&self.body) {
            // Byte-stuff lines starting with '.'
            if line.starts_with('.') {
                data.push(b'.');
            }
            data.extend_from_slice(line.as_bytes());
            data.extend_from_slice(b"\r\n");
        }

        data.extend_from_slice(b".\r\n");
        data
    }
}

/// Longest body line in bytes: the 998-octet limit of RFC 5322 less one
/// byte of dot-stuffing.
const MAX_BODY_LINE: usize = 997;

/// Splits a body into lines, accepting CRLF, bare LF or bare CR as line ends.
///
/// A trailing line ending does not produce an extra empty line. Lines longer
/// than [`MAX_BODY_LINE`] are broken on character boundaries.
fn body_lines(body: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = body;

    while let Some(pos) = rest.find(['\r', '\n']) {
        push_wrapped(&mut lines, &rest[..pos]);
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }

    if !rest.is_empty() {
        push_wrapped(&mut lines, rest);
    }

    lines
}

fn push_wrapped<'a>(lines: &mut Vec<&'a str>, mut line: &'a str) {
    while line.len() > MAX_BODY_LINE {
        let mut end = MAX_BODY_LINE;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        lines.push(&line[..end]);
        line = &line[end..];
    }
    lines.push(line);
}
