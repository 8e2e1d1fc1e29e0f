//! Terminal `Game over!` detection and win/loss resolution.

use tracing::debug;

use super::types::{Event, EventKind, Participant};

/// The terminal announcement prefix, matched case-insensitively.
const GAME_OVER: &str = "Game over! ";

/// The one role that forms the evil faction.
const WEREWOLF_ROLE: &str = "Werewolf";

/// Resolve the game outcome, if the transcript has one.
///
/// On a match: a synthetic `Announcement` event is appended at the match
/// position (no timestamp), the winning faction is read off the result text,
/// and every non-Moderator participant's tally is updated - wins for the
/// winning faction, losses for the other. Returns the completed-round count
/// (1 on a match, 0 otherwise; a missing announcement just means the game is
/// still in progress).
pub fn resolve(text: &str, participants: &mut [Participant], events: &mut Vec<Event>) -> u32 {
    let Some((position, result)) = find_game_over(text) else {
        return 0;
    };

    events.push(Event {
        timestamp: None,
        position,
        speaker: "Moderator".to_string(),
        content: format!("{}{}", GAME_OVER, result),
        kind: EventKind::Announcement,
        role: "Moderator".to_string(),
        player_name: None,
        living_players: None,
    });

    let good_guys_won = result.to_lowercase().contains("good guys");
    debug!(good_guys_won, "game outcome resolved");
    for participant in participants.iter_mut() {
        if participant.is_moderator() {
            continue;
        }
        let is_good = participant.role != WEREWOLF_ROLE;
        if is_good == good_guys_won {
            participant.record_win();
        } else {
            participant.record_loss();
        }
    }
    1
}

/// Locate the first `Game over! ` announcement, case-insensitively.
///
/// Returns the match offset and the result text up to the end of the line
/// (or of the input, for a final unterminated line).
fn find_game_over(text: &str) -> Option<(usize, &str)> {
    let bytes = text.as_bytes();
    let needle = GAME_OVER.as_bytes();
    let limit = bytes.len().checked_sub(needle.len())?;
    for pos in 0..=limit {
        if bytes[pos..pos + needle.len()].eq_ignore_ascii_case(needle) {
            let rest = &text[pos + needle.len()..];
            let result = match rest.find('\n') {
                Some(newline) => &rest[..newline],
                None => rest,
            };
            return Some((pos, result.trim_end_matches('\r')));
        }
    }
    None
}
