//! Tests for the parse passes through the public API.

use wolflog::parser::scan;
use wolflog::{EventKind, LogParser, ParseOptions, ParseResult};

fn parse(text: &str) -> ParseResult {
    LogParser::new(text, "transcript.txt").parse(&ParseOptions::default())
}

// ============================================================================
// Setup extraction
// ============================================================================

#[test]
fn setup_header_builds_the_roster() {
    let result = parse("Game setup:\nPlayer1: Werewolf,\nPlayer2: Villager,\n");

    assert_eq!(result.players.len(), 3);
    assert_eq!(result.players[0].id, 1);
    assert_eq!(result.players[0].name, "Player1");
    assert_eq!(result.players[0].role, "Werewolf");
    assert_eq!(
        result.players[0].avatar.as_deref(),
        Some("/public/avatars/Werewolf.jpg")
    );
    assert_eq!(result.players[1].role, "Villager");
    assert!(result.players[2].is_moderator());
    assert_eq!(result.players[2].id, 0);
    assert!(result.dialogue.is_empty());
}

#[test]
fn missing_header_leaves_moderator_only_roster() {
    let result = parse("Player1(Werewolf): Hunt Player2");
    assert_eq!(result.players.len(), 1);
    assert!(result.players[0].is_moderator());
}

#[test]
fn malformed_header_is_not_fatal() {
    let result = parse("Game setup:\nPlayerX: Nothing useful\n");
    assert_eq!(result.players.len(), 1);
    assert!(result.players[0].is_moderator());
}

#[test]
fn roster_stops_at_first_non_roster_line() {
    let result = parse("Game setup:\nPlayer1: Werewolf,\nnot a roster line\nPlayer2: Villager,\n");
    // Player2 comes after the break and is not part of the header run.
    assert_eq!(result.players.len(), 2);
    assert_eq!(result.players[0].role, "Werewolf");
}

// ============================================================================
// Event extraction
// ============================================================================

#[test]
fn speaker_line_becomes_an_action_event() {
    let result = parse("Player1(Werewolf): Hunt Player2");
    assert_eq!(result.dialogue.len(), 1);
    let event = &result.dialogue[0];
    assert_eq!(event.speaker, "Player1");
    assert_eq!(event.kind, EventKind::Action);
    assert_eq!(event.content, "Hunt Player2");
}

#[test]
fn turn_object_yields_thought_then_response() {
    let result = parse(
        r#"{"ROLE": "Seer", "PLAYER_NAME": "Player3", "THOUGHTS": "I suspect Player1", "RESPONSE": "Verify Player1"}"#,
    );
    assert_eq!(result.dialogue.len(), 2);
    assert_eq!(result.dialogue[0].kind, EventKind::Thought);
    assert_eq!(result.dialogue[0].content, "I suspect Player1");
    assert_eq!(result.dialogue[0].role, "Seer");
    assert_eq!(result.dialogue[1].kind, EventKind::Response);
    assert_eq!(result.dialogue[1].content, "Verify Player1");
    assert_eq!(result.dialogue[1].role, "Seer");
    assert_eq!(
        result.dialogue[1].position,
        result.dialogue[0].position + 1
    );
}

#[test]
fn timeline_is_sorted_by_source_position() {
    let text = concat!(
        "Moderator(Moderator): wake up\n",
        "{\"ROLE\": \"Seer\", \"PLAYER_NAME\": \"Player3\", \"THOUGHTS\": \"hm\", \"RESPONSE\": \"Verify Player1\"}\n",
        "Player1(Werewolf): I trust everyone\n",
        "Game over! the good guys won\n",
    );
    let result = parse(text);
    let positions: Vec<usize> = result.dialogue.iter().map(|event| event.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert_eq!(
        result.dialogue.last().unwrap().kind,
        EventKind::Announcement
    );
}

#[test]
fn line_matches_inside_spans_are_not_duplicated() {
    let text = concat!(
        "{\"ROLE\": \"Witch\", \"PLAYER_NAME\": \"Player4\",\n",
        "2024-03-01 10:00:00.000 | INFO     | metagpt.roles - Player4(Witch): Save Player2\n",
        "\"RESPONSE\": \"Save Player2\"}\n",
    );
    let result = parse(text);

    // Exactly one recovered line event and one Response, no duplicate of the
    // in-span speaker line from the line pass.
    assert_eq!(result.dialogue.len(), 2);
    let spans = scan::json_spans(text);
    assert_eq!(spans.len(), 1);
    let inside = result
        .dialogue
        .iter()
        .filter(|event| spans[0].contains(event.position))
        .count();
    assert_eq!(inside, 2);
}

#[test]
fn events_never_sit_in_more_than_one_span() {
    let text = concat!(
        "{\"ROLE\": \"Seer\", \"RESPONSE\": \"Verify Player1\"}\n",
        "{\"ROLE\": \"Guard\", \"RESPONSE\": \"Protect Player2\"}\n",
    );
    let spans = scan::json_spans(text);
    assert_eq!(spans.len(), 2);
    let result = parse(text);
    for event in &result.dialogue {
        let containing = spans
            .iter()
            .filter(|span| span.contains(event.position))
            .count();
        assert!(containing <= 1, "event at {} in {} spans", event.position, containing);
    }
}

#[test]
fn nearest_preceding_timestamp_is_attached() {
    let text = concat!(
        "2024-03-01 10:00:00.000 | INFO     | metagpt.team - start\n",
        "2024-03-01 10:00:05.000 | INFO     | metagpt.team - later\n",
        "Player1(Seer): Verify Player2\n",
    );
    let result = parse(text);
    assert_eq!(result.dialogue.len(), 1);
    assert_eq!(
        result.dialogue[0].timestamp.as_deref(),
        Some("2024-03-01 10:00:05.000")
    );
}

// ============================================================================
// Outcome
// ============================================================================

#[test]
fn good_guys_victory_updates_tallies() {
    let text = concat!(
        "Game setup:\n",
        "Player1: Werewolf,\n",
        "Player2: Villager,\n",
        "Player3: Seer,\n",
        "\n",
        "Game over! werewolves all dead. The winner is the good guys.\n",
    );
    let result = parse(text);
    assert_eq!(result.current_round, 1);

    let werewolf = &result.players[0];
    assert_eq!(werewolf.wins, Some(0));
    assert_eq!(werewolf.losses, Some(1));
    for villager in &result.players[1..3] {
        assert_eq!(villager.wins, Some(1));
        assert_eq!(villager.losses, Some(0));
    }
    let moderator = result.players.last().unwrap();
    assert_eq!(moderator.wins, None);
    assert_eq!(moderator.losses, None);
}

#[test]
fn unfinished_game_keeps_round_zero() {
    let result = parse("Game setup:\nPlayer1: Werewolf,\nModerator(Moderator): wake up\n");
    assert_eq!(result.current_round, 0);
    assert_eq!(result.players[0].wins, Some(0));
    assert_eq!(result.players[0].losses, Some(0));
}

// ============================================================================
// Degraded inputs
// ============================================================================

#[test]
fn empty_input_gives_the_canonical_empty_result() {
    let result = parse("");
    assert_eq!(result, ParseResult::empty());
    assert!(result.players.is_empty());
    assert!(result.dialogue.is_empty());
    assert_eq!(result.n_rounds, 0);
    assert_eq!(result.current_round, 0);
}

#[test]
fn unreadable_file_gives_the_canonical_empty_result() {
    let result = wolflog::parse_file(
        "/definitely/not/here/output_3_5.txt",
        &ParseOptions::default(),
    );
    assert_eq!(result, ParseResult::empty());
}

#[test]
fn parsing_is_idempotent() {
    let text = concat!(
        "Game setup:\n",
        "Player1: Werewolf,\n",
        "Player2: Villager,\n",
        "\n",
        "Moderator(Moderator): Who would you like to eliminate?\n",
        "{\"ROLE\": \"Werewolf\", \"PLAYER_NAME\": \"Player1\", \"THOUGHTS\": \"risky\", \"RESPONSE\": \"Hunt Player2\"}\n",
        "Game over! The winner is the werewolves.\n",
    );
    let parser = LogParser::new(text, "output_4_2.txt");
    let options = ParseOptions::default();
    let first = parser.parse(&options);
    let second = parser.parse(&options);
    assert_eq!(first, second);
    assert_eq!(first.n_rounds, 4);
}

#[test]
fn wire_format_uses_the_viewer_keys() {
    let result = parse("Game setup:\nPlayer1: Werewolf,\n");
    let json = serde_json::to_value(&result).unwrap();
    let obj = json.as_object().unwrap();
    assert!(obj.contains_key("players"));
    assert!(obj.contains_key("dialogue"));
    assert!(obj.contains_key("n_rounds"));
    assert!(obj.contains_key("current_round"));
}
