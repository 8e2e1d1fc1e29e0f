//! Wolflog library
//!
//! A Rust library for parsing multi-agent werewolf game transcripts into
//! structured timelines with per-player statistics.

pub mod config;
pub mod parser;

pub use config::Config;
pub use parser::{
    parse_file, Event, EventKind, LogParser, NameMap, ParseOptions, ParseResult, Participant,
};
