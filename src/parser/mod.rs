//! Log-to-structured-timeline parser for multi-agent game transcripts.
//!
//! The parser makes four sequential passes over one immutable input string:
//!
//! 1. [`setup`] - roster of participants and roles from the header block
//! 2. [`events`] - speaker lines and embedded turn objects, as offset-tagged
//!    events
//! 3. [`outcome`] - terminal `Game over!` announcement and win/loss tallies
//! 4. [`timeline`] - position ordering, round count, display-name remapping
//!
//! No pass is fatal: missing or malformed input degrades to an emptier
//! result, never to an error. Parsing does no I/O and holds no shared state,
//! so independent transcripts can be parsed concurrently.

mod events;
mod outcome;
mod setup;
mod timeline;
mod types;

pub mod scan;

pub use timeline::{rounds_from_identifier, NameMap};
pub use types::{Event, EventKind, ParseResult, Participant};

use std::fs;
use std::path::Path;

use tracing::warn;

/// Default avatar directory for role-derived avatar paths.
pub const DEFAULT_AVATAR_DIR: &str = "/public/avatars";

/// Default truncation length for remapped display names.
pub const DEFAULT_NAME_MAX_LENGTH: usize = 10;

/// Request-scoped parse configuration.
///
/// One immutable options value per parse call; there is no process-global
/// parser state.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Display names for `PlayerN` remapping, 1-indexed. `None` keeps the
    /// anonymous `PlayerN` identifiers.
    pub names: Option<Vec<String>>,
    /// Directory prefix for role-derived avatar paths.
    pub avatar_dir: String,
    /// Truncation length applied to each display name.
    pub name_max_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            names: None,
            avatar_dir: DEFAULT_AVATAR_DIR.to_string(),
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
        }
    }
}

/// Parser for one transcript.
///
/// Holds the raw text plus the file-path-like identifier the round count is
/// derived from. Parsing is synchronous, single-threaded and infallible;
/// the worst case is an under-populated [`ParseResult`].
#[derive(Debug)]
pub struct LogParser {
    content: String,
    identifier: String,
}

impl LogParser {
    /// Parser over an in-memory transcript.
    pub fn new(content: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            identifier: identifier.into(),
        }
    }

    /// Parser over a transcript file.
    ///
    /// An unreadable or missing file is treated as "no data yet" - the
    /// content is empty and a later [`parse`](Self::parse) returns the
    /// canonical empty result. The simulation writes the log concurrently,
    /// so a not-yet-existing file is an ordinary state.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                warn!(path = %path.display(), %error, "transcript unreadable, treating as empty");
                String::new()
            }
        };
        Self {
            content,
            identifier: path.to_string_lossy().into_owned(),
        }
    }

    /// The raw transcript text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Run all four passes and assemble the result.
    pub fn parse(&self, options: &ParseOptions) -> ParseResult {
        if self.content.is_empty() {
            return ParseResult::empty();
        }

        let mut players = setup::extract_participants(&self.content, &options.avatar_dir);

        let timestamps = scan::TimestampIndex::build(&self.content);
        let spans = scan::json_spans(&self.content);
        let mut dialogue = events::extract(&self.content, &timestamps, &spans);

        let current_round = outcome::resolve(&self.content, &mut players, &mut dialogue);
        timeline::sort_events(&mut dialogue);

        let mut result = ParseResult {
            players,
            dialogue,
            n_rounds: timeline::rounds_from_identifier(&self.identifier),
            current_round,
        };

        if let Some(names) = &options.names {
            NameMap::new(names, options.name_max_length).apply(&mut result);
        }
        result
    }
}

/// Parse a transcript file in one call.
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> ParseResult {
    LogParser::from_file(path).parse(options)
}
