//! Twilio WhatsApp glue: sender normalization and TwiML replies.
//!
//! Request signature validation is left to the deployment (e.g. a proxy); this module only
//! deals with the message payload.

/// Twilio refuses message bodies longer than this
pub const MAX_MESSAGE_CHARS: usize = 1600;

/// Turns a Twilio `From` value (`whatsapp:+972 50-123-4567`) into the canonical
/// `+<digits>` form accounts are stored with. Returns `None` for anything that is not an
/// international phone number.
#[must_use]
pub fn normalize_sender(from: &str) -> Option<String> {
    let raw = from.trim();
    let raw = raw.strip_prefix("whatsapp:").unwrap_or(raw);
    let rest = raw.strip_prefix('+')?;

    if !rest.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ' ')) {
        return None;
    }

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    // E.164 allows at most 15 digits
    if !(7..=15).contains(&digits.len()) {
        return None;
    }
    Some(format!("+{digits}"))
}

/// Splits a reply into chunks of at most `max_chars` characters, never inside a character.
#[must_use]
pub fn split_message(message: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || message.is_empty() {
        return vec![message.to_string()];
    }
    let chars: Vec<char> = message.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a TwiML document answering with `reply`, split into as many messages as needed.
#[must_use]
pub fn twiml_reply(reply: &str) -> String {
    let messages: String = split_message(reply, MAX_MESSAGE_CHARS)
        .iter()
        .map(|part| format!("<Message>{}</Message>", escape_xml(part)))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><Response>{messages}</Response>"#)
}
