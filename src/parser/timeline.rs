//! Timeline assembly: ordering, round count, display-name remapping.
//!
//! Events are ordered strictly by source position - timestamps coincide or
//! are missing too often to order on (a turn object's Thought/Response pair
//! shares one timestamp, the terminal announcement has none).

use super::types::{Event, ParseResult};

/// Derive the total round count from the transcript's file identifier.
///
/// The round count is encoded as the second underscore-delimited segment of
/// the base name, e.g. `output_10_5_Group1.txt` encodes 10 rounds. Anything
/// missing or non-numeric falls back to 0; the identifier is advisory, not
/// trusted input.
pub fn rounds_from_identifier(identifier: &str) -> u32 {
    let base = identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(identifier);
    let stem = base.split('.').next().unwrap_or(base);
    stem.split('_')
        .nth(1)
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}

/// Sort events ascending by source position.
///
/// The sort is stable, so same-position events (which only occur across
/// extraction passes in degenerate inputs) keep their discovery order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|event| event.position);
}

/// A 1-indexed mapping from `PlayerN` tokens to real display names.
///
/// Applied best effort across the whole result: participant names and avatar
/// paths, event speakers and content, agent-reported player names and living
/// player lists. Unmapped tokens stay verbatim.
#[derive(Debug, Clone)]
pub struct NameMap {
    entries: Vec<(String, String)>,
}

impl NameMap {
    /// Build a map from an ordered name list; `names[0]` maps `Player1`.
    /// Each display name is truncated to `max_len` characters.
    pub fn new(names: &[String], max_len: usize) -> Self {
        let entries = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let truncated: String = name.chars().take(max_len).collect();
                (format!("Player{}", index + 1), truncated)
            })
            .collect();
        Self { entries }
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(player, _)| player == token)
            .map(|(_, name)| name.as_str())
    }

    /// Rewrite every `PlayerN` token in the result.
    pub fn apply(&self, result: &mut ParseResult) {
        for participant in &mut result.players {
            if let Some(name) = self.lookup(&participant.name) {
                participant.name = name.to_string();
                let token = format!("Player{}", participant.id);
                if let Some(avatar) = &participant.avatar {
                    if let Some(mapped) = self.lookup(&token) {
                        participant.avatar = Some(avatar.replace(&token, mapped));
                    }
                }
            }
        }

        for event in &mut result.dialogue {
            if let Some(name) = self.lookup(&event.speaker) {
                event.speaker = name.to_string();
            }
            event.content = self.replace_tokens(&event.content);
            if let Some(player_name) = &event.player_name {
                if let Some(name) = self.lookup(player_name) {
                    event.player_name = Some(name.to_string());
                }
            }
            if let Some(living) = &mut event.living_players {
                for entry in living.iter_mut() {
                    if let Some(name) = self.lookup(entry) {
                        *entry = name.to_string();
                    }
                }
            }
        }
    }

    /// Whole-word replacement of every mapped token in free text.
    ///
    /// A token counts as a word only when its neighbors are not ASCII word
    /// characters, so `Player1` never rewrites the front of `Player11`.
    fn replace_tokens(&self, content: &str) -> String {
        let mut current = content.to_string();
        for (token, name) in &self.entries {
            current = replace_word(&current, token, name);
        }
        current
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Replace whole-word occurrences of `token` in `text`.
fn replace_word(text: &str, token: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut pos = 0;
    while let Some(found) = text[pos..].find(token) {
        let start = pos + found;
        let end = start + token.len();
        let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let right_ok = end == bytes.len() || !is_word_byte(bytes[end]);
        result.push_str(&text[pos..start]);
        if left_ok && right_ok {
            result.push_str(replacement);
        } else {
            result.push_str(token);
        }
        pos = end;
    }
    result.push_str(&text[pos..]);
    result
}
