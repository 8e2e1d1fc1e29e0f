//! Event extraction: the two scanning passes over the transcript.
//!
//! Pass 1 walks the text for speaker lines (`Name(Role): message`), with an
//! optional logger prefix (`<timestamp> | <SEVERITY> ... - Name(Role): ...`).
//! Pass 2 decodes embedded turn objects into `Thought`/`Response` pairs and
//! recovers speaker lines the logger injected *inside* an object's span.
//!
//! The passes are structurally disjoint: any speaker-line match whose start
//! offset falls inside a turn-object span is dropped, so no duplicate
//! suppression is needed afterwards.

use serde::Deserialize;
use tracing::{debug, warn};

use super::scan::{
    self, in_any_span, JsonSpan, SpeakerHead, TimestampIndex, TIMESTAMP_LEN,
};
use super::types::{Event, EventKind};

/// Bare role tokens that mark an extraction artifact rather than content.
const ROLE_TOKENS: [&str; 6] = [
    "Moderator",
    "Seer",
    "Witch",
    "Guard",
    "Werewolf",
    "Villager",
];

/// Case-sensitive verbs that classify a player line as an `Action`.
const ACTION_VERBS: [&str; 7] = [
    "vote to eliminate",
    "Hunt",
    "Protect",
    "Verify",
    "Poison",
    "Save",
    "Pass",
];

/// Keyword groups for Moderator-line classification, checked in order.
const QUESTION_KEYWORDS: [&str; 3] = ["choose", "who", "would you like"];
const ANNOUNCEMENT_KEYWORDS: [&str; 3] = ["killed", "eliminated", "game over"];

/// One agent turn as embedded in the transcript.
///
/// Field names follow the upstream agents' uppercase convention verbatim.
#[derive(Debug, Deserialize)]
struct TurnRecord {
    #[serde(rename = "ROLE", default)]
    role: String,
    #[serde(rename = "RESPONSE")]
    response: Option<String>,
    #[serde(rename = "THOUGHTS")]
    thoughts: Option<String>,
    #[serde(rename = "PLAYER_NAME")]
    player_name: Option<String>,
    #[serde(rename = "LIVING_PLAYERS", default)]
    living_players: Vec<String>,
}

/// Classify a line event by speaker and message content.
///
/// Moderator lines match case-insensitively; the player action verbs are
/// case-sensitive on purpose - `Hunt`/`Protect`/... are command tokens, not
/// prose.
pub fn classify(speaker: &str, message: &str) -> EventKind {
    if speaker == "Moderator" {
        let lowered = message.to_lowercase();
        if QUESTION_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return EventKind::Question;
        }
        if lowered.contains("understood") {
            return EventKind::Confirmation;
        }
        if ANNOUNCEMENT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return EventKind::Announcement;
        }
        return EventKind::Instruction;
    }

    if message.contains("ready to") {
        return EventKind::Preparation;
    }
    if ACTION_VERBS.iter().any(|verb| message.contains(verb)) {
        return EventKind::Action;
    }
    EventKind::Say
}

/// Run both extraction passes and return the flat, unordered event list.
pub fn extract(text: &str, timestamps: &TimestampIndex<'_>, spans: &[JsonSpan]) -> Vec<Event> {
    let mut events = Vec::new();
    line_pass(text, timestamps, spans, &mut events);
    let line_count = events.len();
    json_pass(text, timestamps, spans, &mut events);
    debug!(
        line_events = line_count,
        turn_events = events.len() - line_count,
        "event extraction complete"
    );
    events
}

/// Pass 1: speaker lines outside turn-object spans.
fn line_pass(
    text: &str,
    timestamps: &TimestampIndex<'_>,
    spans: &[JsonSpan],
    events: &mut Vec<Event>,
) {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let Some(head) = head_at(text, pos) else {
            pos += 1;
            continue;
        };
        let end = scan::message_boundary(text, head.message_start);

        // Matches starting inside a span belong to pass 2 (or to nothing).
        if !in_any_span(spans, pos) {
            if let Some(event) = build_line_event(text, timestamps, pos, &head, end) {
                events.push(event);
            }
        }
        pos = end.max(pos + 1);
    }
}

/// A speaker head at `pos`, either bare or behind a logger prefix.
///
/// The logger prefix form is `<timestamp> | <SEVERITY> ... - Name(Role):`,
/// all on one line; the match position stays at the timestamp so prefixed
/// and bare lines order the same way.
fn head_at(text: &str, pos: usize) -> Option<SpeakerHead<'_>> {
    if let Some(head) = scan::speaker_head_at(text, pos) {
        return Some(head);
    }
    if scan::timestamp_at(text, pos).is_none() {
        return None;
    }
    let after = pos + TIMESTAMP_LEN;
    let rest = text.get(after..)?;
    let tail = rest.strip_prefix(" | ")?;
    if !tail.starts_with("INFO") && !tail.starts_with("ERROR") && !tail.starts_with("WARNING") {
        return None;
    }
    let line_end = rest.find('\n').map_or(text.len(), |idx| after + idx);

    // Try each " - " on the line until a speaker head follows it.
    let mut search = after;
    while search < line_end {
        let Some(found) = text[search..line_end].find(" - ") else {
            return None;
        };
        let candidate = search + found + " - ".len();
        if let Some(head) = scan::speaker_head_at(text, candidate) {
            return Some(head);
        }
        search = search + found + 1;
    }
    None
}

/// Assemble and filter one line event; `None` when the match is an artifact.
fn build_line_event(
    text: &str,
    timestamps: &TimestampIndex<'_>,
    pos: usize,
    head: &SpeakerHead<'_>,
    end: usize,
) -> Option<Event> {
    let timestamp = timestamps.nearest_before(pos);
    let mut message = text[head.message_start..end].trim().to_string();
    if let Some(stamp) = timestamp {
        message = message.replace(stamp, "").trim().to_string();
    }
    if !is_valid_message(&message) {
        return None;
    }
    Some(Event {
        timestamp: timestamp.map(str::to_string),
        position: pos,
        speaker: head.speaker.to_string(),
        kind: classify(head.speaker, &message),
        content: message,
        role: head.role.to_string(),
        player_name: None,
        living_players: None,
    })
}

/// Reject messages that are empty, or a bare role token, once any embedded
/// timestamp text is removed. These are artifacts of the extraction grammar,
/// not real content.
fn is_valid_message(message: &str) -> bool {
    let cleaned = scan::strip_timestamps(message);
    let cleaned = cleaned.trim();
    !cleaned.is_empty() && !ROLE_TOKENS.contains(&cleaned)
}

/// Pass 2: embedded turn objects, plus recovery of speaker lines the logger
/// injected inside a span.
fn json_pass(
    text: &str,
    timestamps: &TimestampIndex<'_>,
    spans: &[JsonSpan],
    events: &mut Vec<Event>,
) {
    for span in spans {
        let cleaned = clean_span(text, span, events);
        let record: TurnRecord = match serde_json::from_str(&cleaned) {
            Ok(record) => record,
            Err(error) => {
                warn!(position = span.start, %error, "skipping undecodable turn object");
                continue;
            }
        };

        let timestamp = timestamps.nearest_before(span.start).map(str::to_string);
        let speaker = record
            .player_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let player_name = Some(speaker.clone());
        let living_players = Some(record.living_players.clone());

        if let Some(thoughts) = record.thoughts {
            events.push(Event {
                timestamp: timestamp.clone(),
                position: span.start,
                speaker: speaker.clone(),
                content: thoughts,
                kind: EventKind::Thought,
                role: record.role.clone(),
                player_name: player_name.clone(),
                living_players: living_players.clone(),
            });
        }
        if let Some(response) = record.response {
            // Offset by one so the Response never collides with the Thought.
            events.push(Event {
                timestamp,
                position: span.start + 1,
                speaker,
                content: response,
                kind: EventKind::Response,
                role: record.role,
                player_name,
                living_players,
            });
        }
    }
}

/// Strip logger noise lines from a span's text and recover any speaker lines
/// they carry as standalone events. Returns the cleaned span text, ready for
/// decoding.
fn clean_span(text: &str, span: &JsonSpan, events: &mut Vec<Event>) -> String {
    let span_text = &text[span.start..span.end];
    let mut cleaned = String::with_capacity(span_text.len());
    let mut pos = 0;
    while pos < span_text.len() {
        if let Some(line_end) = scan::noise_line_at(span_text, pos) {
            recover_noise_line(text, span.start + pos, span.start + line_end, events);
            pos = line_end;
            continue;
        }
        let line_end = span_text[pos..]
            .find('\n')
            .map_or(span_text.len(), |idx| pos + idx + 1);
        cleaned.push_str(&span_text[pos..line_end]);
        pos = line_end;
    }
    cleaned
}

/// Re-parse one stripped noise line: if it carries a speaker head, it was an
/// operational log line that happened to fall inside the span, and it is
/// emitted as its own classified line event.
fn recover_noise_line(text: &str, line_start: usize, line_end: usize, events: &mut Vec<Event>) {
    let line = &text[line_start..line_end];
    let Some(head) = (0..line.len()).find_map(|idx| scan::speaker_head_at(line, idx)) else {
        return;
    };
    let message = line[head.message_start..].trim().to_string();
    let timestamp = scan::timestamp_at(line, 0).map(str::to_string);
    events.push(Event {
        timestamp,
        position: line_start,
        speaker: head.speaker.to_string(),
        kind: classify(head.speaker, &message),
        content: message,
        role: head.role.to_string(),
        player_name: None,
        living_players: None,
    });
}
