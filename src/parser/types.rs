//! Data structures for parsed transcripts.
//!
//! These types mirror the wire format consumed by the game viewer:
//!
//! ```text
//! {"players":[...],"dialogue":[...],"n_rounds":10,"current_round":1}
//! ```
//!
//! Each dialogue entry carries `speaker`, `content`, `type` and `role`, plus
//! `player_name` and `living_players` for events recovered from an agent's
//! structured turn output. The `timestamp` and `position` fields are
//! parse-internal ordering metadata and never serialized.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One participant of a game run.
///
/// The roster always contains exactly one synthetic Moderator row (`id` 0),
/// which carries no avatar and no win/loss tally - its optional fields stay
/// `None` so the serialized record has no `avatar`/`win`/`loss` keys, matching
/// the viewer's expectations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Player number from the setup header (0 is reserved for the Moderator).
    pub id: u32,
    /// Display name; `PlayerN` until remapped to a real name.
    pub name: String,
    /// Role string, verbatim from the setup header (case-sensitive).
    pub role: String,
    /// Avatar image path derived from the role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Completed-round wins. `None` for the Moderator, which never plays.
    #[serde(rename = "win", default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,
    /// Completed-round losses. `None` for the Moderator.
    #[serde(rename = "loss", default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,
}

impl Participant {
    /// Create a numbered player with a role-derived avatar path.
    pub fn new(id: u32, role: &str, avatar_dir: &str) -> Self {
        Self {
            id,
            name: format!("Player{}", id),
            role: role.to_string(),
            avatar: Some(format!("{}/{}.jpg", avatar_dir, role)),
            wins: Some(0),
            losses: Some(0),
        }
    }

    /// The synthetic Moderator row appended to every roster.
    pub fn moderator() -> Self {
        Self {
            id: 0,
            name: "Moderator".to_string(),
            role: "Moderator".to_string(),
            avatar: None,
            wins: None,
            losses: None,
        }
    }

    /// Whether this is the Moderator row.
    pub fn is_moderator(&self) -> bool {
        self.role == "Moderator"
    }

    /// Book a win. No-op on the Moderator row.
    pub fn record_win(&mut self) {
        if let Some(wins) = &mut self.wins {
            *wins += 1;
        }
    }

    /// Book a loss. No-op on the Moderator row.
    pub fn record_loss(&mut self) {
        if let Some(losses) = &mut self.losses {
            *losses += 1;
        }
    }
}

/// Classification of a dialogue event.
///
/// Moderator lines become `Question`/`Confirmation`/`Announcement`/
/// `Instruction`, player lines become `Preparation`/`Action`/`Say`, and
/// events decoded from embedded turn objects are fixed as
/// `Thought`/`Response` without going through the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Question,
    Confirmation,
    Announcement,
    Instruction,
    Preparation,
    Action,
    Thought,
    Response,
    Say,
}

impl EventKind {
    /// The wire name of this kind (identical to the variant name).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Question => "Question",
            EventKind::Confirmation => "Confirmation",
            EventKind::Announcement => "Announcement",
            EventKind::Instruction => "Instruction",
            EventKind::Preparation => "Preparation",
            EventKind::Action => "Action",
            EventKind::Thought => "Thought",
            EventKind::Response => "Response",
            EventKind::Say => "Say",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timeline entry.
///
/// `position` is the byte offset of the match in the source text and the
/// definitive ordering key; timestamps are informative metadata only, since
/// events decoded from the same turn object share one timestamp (or have
/// none at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Nearest transcript timestamp preceding the match, if any.
    #[serde(skip)]
    pub timestamp: Option<String>,
    /// Byte offset of the match in the source text.
    #[serde(skip)]
    pub position: usize,
    /// Who said it: `Moderator`, `PlayerN`, or an agent's reported name.
    pub speaker: String,
    /// Message text.
    pub content: String,
    /// Event classification.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Role of the speaker at the time of the event.
    pub role: String,
    /// Agent-reported player name (turn-object events only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    /// Agent-reported list of living players (turn-object events only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_players: Option<Vec<String>>,
}

/// The complete parse output for one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Roster in setup order, Moderator last.
    pub players: Vec<Participant>,
    /// All events, sorted ascending by source position.
    pub dialogue: Vec<Event>,
    /// Total number of rounds encoded in the transcript's file identifier.
    pub n_rounds: u32,
    /// 1 once a `Game over!` announcement was found, else 0.
    pub current_round: u32,
}

impl ParseResult {
    /// The canonical empty result returned for missing or unreadable input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Event counts per kind, ordered by kind name.
    pub fn kind_distribution(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.dialogue {
            *counts.entry(event.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}
