//! Header value sanitizing and RFC 2047 encoding.
//!
//! Values that end up in a header may come straight from a web form. Line
//! breaks are folded away before anything is framed, so a value can never
//! start a new header or end the header block.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Largest chunk of UTF-8 bytes per encoded word; each word is then 60
/// characters, short enough to share a line with any header name used here.
const ENCODED_WORD_BYTES: usize = 36;

/// Preferred header line length before folding (RFC 5322 section 2.1.1).
const FOLD_AT: usize = 78;

/// Longest run without whitespace left as plain text; longer runs are
/// encoded so the value can still be folded.
const MAX_WORD_CHARS: usize = 60;

/// Characters that force a display name into a quoted string (RFC 5322 `specials`).
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Folds CR/LF runs, and any indentation after them, into a single space.
///
/// Other control characters except tab are dropped.
#[must_use]
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut after_break = false;

    for c in value.chars() {
        if c == '\r' || c == '\n' {
            after_break = true;
            continue;
        }

        if after_break {
            if c == ' ' || c == '\t' {
                continue;
            }
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            after_break = false;
        }

        if c.is_control() && c != '\t' {
            continue;
        }
        out.push(c);
    }

    out.trim().to_string()
}

/// Sanitizes a free-text header value and encodes it if it is not plain ASCII.
#[must_use]
pub fn encode(value: &str) -> String {
    let clean = sanitize(value);
    if needs_encoding(&clean) {
        encode_words(&clean)
    } else {
        clean
    }
}

/// Renders a display name for an address header.
#[must_use]
pub fn display_name(name: &str) -> String {
    let clean = sanitize(name);
    if needs_encoding(&clean) {
        encode_words(&clean)
    } else if clean.contains(SPECIALS) {
        let escaped = clean.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        clean
    }
}

fn needs_encoding(value: &str) -> bool {
    !value.is_ascii()
        || value.contains("=?")
        || value
            .split(' ')
            .any(|word| word.chars().count() > MAX_WORD_CHARS)
}

/// Renders `name: value`, breaking at spaces so lines stay near 78 characters.
///
/// `value` must already be sanitized or encoded. Each break is CRLF followed by
/// the space it replaced, so unfolding restores the original value.
#[must_use]
pub fn fold(name: &str, value: &str) -> String {
    let mut out = format!("{name}:");
    let mut line_len = out.len();
    let mut first = true;

    for word in value.split(' ') {
        if !first && !word.is_empty() && line_len + 1 + word.len() > FOLD_AT {
            out.push_str("\r\n");
            line_len = 0;
        }
        out.push(' ');
        out.push_str(word);
        line_len += 1 + word.len();
        first = false;
    }

    out
}

/// Encodes text as one or more `=?UTF-8?B?...?=` words separated by spaces.
///
/// Chunks are split on character boundaries so no word carries half a code point.
fn encode_words(text: &str) -> String {
    let mut words = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + ENCODED_WORD_BYTES).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let chunk = &text[start..end];
        words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(chunk.as_bytes())));
        start = end;
    }

    words.join(" ")
}
