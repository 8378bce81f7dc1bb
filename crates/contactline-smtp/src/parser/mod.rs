//! SMTP response parser.

use crate::types::{Reply, ReplyCode};

/// Reasons a reply could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No lines were read.
    #[error("Empty reply")]
    Empty,

    /// A line shorter than a reply code.
    #[error("Reply too short: {0}")]
    TooShort(String),

    /// The first three characters are not a reply code.
    #[error("Invalid reply code: {0}")]
    InvalidCode(String),

    /// Continuation lines disagree on the code, or the separator is wrong.
    #[error("Malformed reply line: {0}")]
    Malformed(String),
}

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// # Errors
///
/// Returns an error if the reply is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply, ParseError> {
    let first = lines.first().ok_or(ParseError::Empty)?;
    let code = parse_code(first)?;

    let mut text = Vec::with_capacity(lines.len());
    for line in lines {
        if parse_code(line)? != code {
            return Err(ParseError::Malformed(line.clone()));
        }

        match line.as_bytes().get(3) {
            None => text.push(String::new()),
            Some(b' ' | b'-') => text.push(line[4..].to_string()),
            Some(_) => return Err(ParseError::Malformed(line.clone())),
        }
    }

    Ok(Reply::new(ReplyCode::new(code), text))
}

fn parse_code(line: &str) -> Result<u16, ParseError> {
    let code = line
        .get(0..3)
        .ok_or_else(|| ParseError::TooShort(line.to_string()))?;

    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidCode(code.to_string()));
    }

    code.parse::<u16>()
        .map_err(|_| ParseError::InvalidCode(code.to_string()))
}

/// Checks if a line is the last line of a multi-line reply.
///
/// Multi-line replies use `-` separator for continuation and ` ` for the last line.
/// Anything that is not a continuation ends the reply, so a bare code or a
/// garbage line is handed to [`parse_reply`] instead of waiting for more input.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.as_bytes().get(3) != Some(&b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line_reply() {
        let lines = vec!["235 2.7.0 Accepted".to_string()];
        let reply = parse_reply(&lines).unwrap();
        assert_eq!(reply.code, ReplyCode::AUTH_SUCCESS);
        assert_eq!(reply.lines, vec!["2.7.0 Accepted"]);
    }

    #[test]
    fn test_parse_multi_line_ehlo() {
        let lines = vec![
            "250-smtp.gmail.com at your service".to_string(),
            "250-AUTH LOGIN PLAIN XOAUTH2".to_string(),
            "250 SMTPUTF8".to_string(),
        ];
        let reply = parse_reply(&lines).unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(reply.lines.len(), 3);
        assert_eq!(reply.lines[1], "AUTH LOGIN PLAIN XOAUTH2");
    }

    #[test]
    fn test_parse_auth_challenge() {
        let lines = vec!["334 VXNlcm5hbWU6".to_string()];
        let reply = parse_reply(&lines).unwrap();
        assert_eq!(reply.code, ReplyCode::AUTH_CONTINUE);
        assert_eq!(reply.lines, vec!["VXNlcm5hbWU6"]);
    }

    #[test]
    fn test_parse_bare_code() {
        let lines = vec!["250".to_string()];
        let reply = parse_reply(&lines).unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(reply.lines, vec![String::new()]);
    }

    #[test]
    fn test_is_last_reply_line() {
        assert!(is_last_reply_line("250 OK"));
        assert!(is_last_reply_line("250"));
        assert!(!is_last_reply_line("250-Continuing"));
        assert!(is_last_reply_line("HTTP/1.1 400 Bad Request"));
    }

    #[test]
    fn test_parse_error_empty() {
        assert_eq!(parse_reply(&[]), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_error_too_short() {
        let lines = vec!["25".to_string()];
        assert!(matches!(parse_reply(&lines), Err(ParseError::TooShort(_))));
    }

    #[test]
    fn test_parse_error_invalid_code() {
        let lines = vec!["ABC OK".to_string()];
        assert!(matches!(
            parse_reply(&lines),
            Err(ParseError::InvalidCode(_))
        ));
        let lines = vec!["+25 OK".to_string()];
        assert!(parse_reply(&lines).is_err());
    }

    #[test]
    fn test_parse_error_mixed_codes() {
        let lines = vec!["250-one".to_string(), "550 two".to_string()];
        assert!(matches!(parse_reply(&lines), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_error_bad_separator() {
        let lines = vec!["250xOK".to_string()];
        assert!(matches!(parse_reply(&lines), Err(ParseError::Malformed(_))));
    }
}
