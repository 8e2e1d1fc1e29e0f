//! Roster extraction from the `Game setup:` header block.

use tracing::debug;

use super::types::Participant;

/// Marker opening the setup block; the roster lines follow immediately.
const SETUP_MARKER: &str = "Game setup:\n";

/// Extract the roster from the transcript header.
///
/// The header is a run of `PlayerN: <role>,` lines right after the marker;
/// each becomes a numbered participant with a role-derived avatar path. The
/// synthetic Moderator row is always appended. A missing or malformed header
/// is not an error - the roster is then just the Moderator.
pub fn extract_participants(text: &str, avatar_dir: &str) -> Vec<Participant> {
    let mut participants = Vec::new();

    if let Some(marker) = text.find(SETUP_MARKER) {
        let block = &text[marker + SETUP_MARKER.len()..];
        for line in block.lines() {
            match roster_line(line) {
                Some((id, role)) => participants.push(Participant::new(id, role, avatar_dir)),
                None => break,
            }
        }
    }
    debug!(players = participants.len(), "setup header scanned");

    participants.push(Participant::moderator());
    participants
}

/// Parse one `PlayerN: <role>,` roster line.
///
/// The role is everything up to the comma, trimmed but otherwise verbatim
/// (case matters for faction classification later).
fn roster_line(line: &str) -> Option<(u32, &str)> {
    let rest = line.strip_prefix("Player")?;
    let digits = rest
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let id: u32 = rest[..digits].parse().ok()?;
    let rest = rest[digits..].strip_prefix(": ")?;
    let (role, _) = rest.split_once(',')?;
    let role = role.trim();
    if role.is_empty() {
        return None;
    }
    Some((id, role))
}
