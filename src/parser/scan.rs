//! Low-level tokenizer for the transcript grammar.
//!
//! The transcript mixes three textual shapes, all recognized here with
//! explicit byte-level scanning rather than one large pattern:
//!
//! - timestamps: `YYYY-MM-DD HH:MM:SS.mmm`
//! - speaker heads: `Moderator(` or `PlayerN(` followed by `<role>):`
//! - embedded turn objects: `{ "ROLE": ... "RESPONSE": "..." ... }`
//!
//! Everything operates on byte offsets into the one immutable input string;
//! matching is restricted to ASCII starters, so every reported offset is a
//! valid char boundary.

use chrono::NaiveDateTime;

/// Byte length of a transcript timestamp.
pub const TIMESTAMP_LEN: usize = "2024-01-01 10:00:00.000".len();

/// chrono format matching the transcript timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Shape template for a timestamp; `d` marks a required digit.
const TIMESTAMP_SHAPE: &[u8] = b"dddd-dd-dd dd:dd:dd.ddd";

/// Severity tags the upstream logger injects into the transcript.
const SEVERITIES: [&str; 3] = ["INFO", "ERROR", "WARNING"];

/// Returns the timestamp starting at `pos`, if one is there.
///
/// A candidate must match the digit/punctuation shape exactly and decode to
/// a real date-time (so `9999-99-99 ...` shaped noise is rejected).
pub fn timestamp_at(text: &str, pos: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let end = pos.checked_add(TIMESTAMP_LEN)?;
    if end > bytes.len() {
        return None;
    }
    for (byte, template) in bytes[pos..end].iter().zip(TIMESTAMP_SHAPE) {
        let ok = match template {
            b'd' => byte.is_ascii_digit(),
            other => byte == other,
        };
        if !ok {
            return None;
        }
    }
    let candidate = &text[pos..end];
    NaiveDateTime::parse_from_str(candidate, TIMESTAMP_FORMAT).ok()?;
    Some(candidate)
}

/// Returns true when a bare `YYYY-MM-DD` date starts at `pos`.
///
/// Message boundaries cut at the next dated line; only the date part is
/// checked, not the full timestamp.
pub fn date_at(text: &str, pos: usize) -> bool {
    const SHAPE: &[u8] = b"dddd-dd-dd";
    let bytes = text.as_bytes();
    if pos + SHAPE.len() > bytes.len() {
        return false;
    }
    bytes[pos..pos + SHAPE.len()]
        .iter()
        .zip(SHAPE)
        .all(|(byte, template)| match template {
            b'd' => byte.is_ascii_digit(),
            other => byte == other,
        })
}

/// Every timestamp occurrence in a text, in document order.
///
/// Built in one pass up front so both extraction passes can resolve the
/// nearest preceding timestamp without rescanning.
#[derive(Debug)]
pub struct TimestampIndex<'a> {
    entries: Vec<(usize, &'a str)>,
}

impl<'a> TimestampIndex<'a> {
    /// Scan `text` for all timestamps.
    pub fn build(text: &'a str) -> Self {
        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            if let Some(stamp) = timestamp_at(text, pos) {
                entries.push((pos, stamp));
                pos += TIMESTAMP_LEN;
            } else {
                pos += 1;
            }
        }
        Self { entries }
    }

    /// The latest timestamp starting strictly before `pos`, if any.
    pub fn nearest_before(&self, pos: usize) -> Option<&'a str> {
        let idx = self.entries.partition_point(|(offset, _)| *offset < pos);
        idx.checked_sub(1).map(|i| self.entries[i].1)
    }

    /// Number of indexed timestamps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the text contained no timestamps at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A recognized `Speaker(Role):` head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeakerHead<'a> {
    /// `Moderator` or `PlayerN`.
    pub speaker: &'a str,
    /// Role between the parentheses.
    pub role: &'a str,
    /// Offset of the first message byte (past `):` and any whitespace).
    pub message_start: usize,
}

/// Returns the speaker head starting exactly at `pos`, if one is there.
///
/// Only `Moderator` and `PlayerN` are speaker tokens; anything else with a
/// `name(role):` shape is agent-internal text and stays untouched.
pub fn speaker_head_at(text: &str, pos: usize) -> Option<SpeakerHead<'_>> {
    let bytes = text.as_bytes();
    let rest = &bytes[pos..];

    let name_len = if rest.starts_with(b"Moderator") {
        "Moderator".len()
    } else if rest.starts_with(b"Player") {
        let digits = rest["Player".len()..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        if digits == 0 {
            return None;
        }
        "Player".len() + digits
    } else {
        return None;
    };

    if rest.get(name_len) != Some(&b'(') {
        return None;
    }
    let role_start = name_len + 1;
    let role_len = rest[role_start..]
        .iter()
        .take_while(|byte| byte.is_ascii_alphanumeric() || **byte == b'_')
        .count();
    if role_len == 0 {
        return None;
    }
    let role_end = role_start + role_len;
    if rest.get(role_end) != Some(&b')') || rest.get(role_end + 1) != Some(&b':') {
        return None;
    }

    let mut message_start = pos + role_end + 2;
    while bytes
        .get(message_start)
        .is_some_and(|byte| byte.is_ascii_whitespace())
    {
        message_start += 1;
    }

    Some(SpeakerHead {
        speaker: &text[pos..pos + name_len],
        role: &text[pos + role_start..pos + role_end],
        message_start,
    })
}

/// Finds the exclusive end of a message starting at `from`.
///
/// A message runs to the next newline that introduces a dated line, another
/// speaker head, or an opening brace - or to the end of the text. This is the
/// explicit form of the extraction grammar's lookahead.
pub fn message_boundary(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        if bytes[pos] == b'\n' {
            let next = pos + 1;
            if next >= bytes.len() {
                return pos;
            }
            if date_at(text, next) || bytes[next] == b'{' || speaker_head_at(text, next).is_some() {
                return pos;
            }
        }
        pos += 1;
    }
    bytes.len()
}

/// Byte range of one embedded turn object in the source text.
///
/// `end` is exclusive for slicing; containment checks treat it as inclusive,
/// so a speaker head starting right at the closing brace still counts as
/// inside the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSpan {
    pub start: usize,
    pub end: usize,
}

impl JsonSpan {
    /// Whether `pos` falls inside this span.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Whether `pos` falls inside any of the given spans.
pub fn in_any_span(spans: &[JsonSpan], pos: usize) -> bool {
    spans.iter().any(|span| span.contains(pos))
}

/// Locate every embedded turn object span in `text`.
///
/// A span starts at `{` immediately followed (modulo whitespace) by
/// `"ROLE":`, must reach a `"RESPONSE"` key with a quoted value before any
/// nested `{`, and closes at the next `}`. Logger noise lines inside the
/// span are tolerated here and stripped later, before decoding.
pub fn json_spans(text: &str) -> Vec<JsonSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'{' {
            if let Some(end) = json_span_end(bytes, pos) {
                spans.push(JsonSpan { start: pos, end });
                pos = end;
                continue;
            }
        }
        pos += 1;
    }
    spans
}

/// Scan one candidate span starting at the `{` at `start`.
fn json_span_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 1;
    while bytes.get(pos).is_some_and(|byte| byte.is_ascii_whitespace()) {
        pos += 1;
    }
    if !bytes[pos..].starts_with(b"\"ROLE\":") {
        return None;
    }

    // Walk to the RESPONSE key; a nested object before it disqualifies the span.
    loop {
        match bytes.get(pos)? {
            b'{' => return None,
            _ if bytes[pos..].starts_with(b"\"RESPONSE\"") => break,
            _ => pos += 1,
        }
    }
    pos += "\"RESPONSE\"".len();
    if bytes.get(pos) != Some(&b':') {
        return None;
    }
    pos += 1;
    while bytes.get(pos).is_some_and(|byte| byte.is_ascii_whitespace()) {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'"') {
        return None;
    }
    pos += 1;
    while *bytes.get(pos)? != b'"' {
        pos += 1;
    }
    pos += 1;

    // The span closes at the first brace after the RESPONSE value.
    while *bytes.get(pos)? != b'}' {
        pos += 1;
    }
    Some(pos + 1)
}

/// Returns the exclusive end of a logger noise line starting at `pos`.
///
/// A noise line is `<timestamp> | <SEVERITY>...` terminated by a newline;
/// an unterminated final line is not treated as noise.
pub fn noise_line_at(text: &str, pos: usize) -> Option<usize> {
    timestamp_at(text, pos)?;
    let after = &text[pos + TIMESTAMP_LEN..];
    let tail = after.strip_prefix(" | ")?;
    if !SEVERITIES.iter().any(|severity| tail.starts_with(severity)) {
        return None;
    }
    let newline = text[pos..].find('\n')?;
    Some(pos + newline + 1)
}

/// Removes every timestamp-shaped substring from `message`.
///
/// Used by the validity filter: a "message" that is nothing but timestamps
/// and whitespace is an extraction artifact, not content.
pub fn strip_timestamps(message: &str) -> String {
    let mut cleaned = String::with_capacity(message.len());
    let mut pos = 0;
    while pos < message.len() {
        if timestamp_at(message, pos).is_some() {
            pos += TIMESTAMP_LEN;
        } else {
            let ch = message[pos..].chars().next().unwrap_or_default();
            cleaned.push(ch);
            pos += ch.len_utf8();
        }
    }
    cleaned
}
