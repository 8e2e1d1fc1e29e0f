//! End-to-end parse of a realistic five-player transcript fixture.

use std::path::PathBuf;

use wolflog::{parse_file, EventKind, ParseOptions, ParseResult};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/output_2_5_Group1.txt")
}

fn parse_fixture(options: &ParseOptions) -> ParseResult {
    parse_file(fixture_path(), options)
}

#[test]
fn full_transcript_yields_the_expected_timeline() {
    let result = parse_fixture(&ParseOptions::default());

    let kinds: Vec<EventKind> = result.dialogue.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Instruction,
            EventKind::Thought,
            EventKind::Response,
            EventKind::Question,
            EventKind::Response,
            EventKind::Preparation,
            EventKind::Confirmation,
            EventKind::Announcement,
            EventKind::Action,
            EventKind::Announcement,
        ]
    );

    // Timeline order follows source position, strictly ascending here.
    let positions: Vec<usize> = result.dialogue.iter().map(|event| event.position).collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    assert_eq!(result.dialogue[1].content, "Player3 might be the Seer, eliminating them helps us");
    assert_eq!(result.dialogue[2].content, "Hunt Player3");
    assert_eq!(result.dialogue[2].speaker, "Player1");
    assert_eq!(result.dialogue[2].role, "Werewolf");
    assert_eq!(
        result.dialogue[2].living_players.as_ref().map(Vec::len),
        Some(5)
    );

    // The guard's structured Response precedes the speaker line that the
    // logger injected into the middle of its turn object.
    assert_eq!(result.dialogue[4].content, "Protect Player3");
    assert_eq!(result.dialogue[4].speaker, "Player5");
    assert_eq!(result.dialogue[5].content, "I am ready to protect");
    assert_eq!(result.dialogue[5].speaker, "Player5");
    assert_eq!(
        result.dialogue[5].timestamp.as_deref(),
        Some("2024-03-01 21:14:12.000")
    );

    assert_eq!(result.dialogue[8].content, "I vote to eliminate Player1");
    assert!(result.dialogue[9]
        .content
        .starts_with("Game over! The werewolves were all eliminated"));
}

#[test]
fn roster_outcome_and_rounds_resolve_from_the_fixture() {
    let result = parse_fixture(&ParseOptions::default());

    // Five players from the setup header plus the synthetic Moderator row.
    assert_eq!(result.players.len(), 6);
    let roles: Vec<&str> = result.players.iter().map(|p| p.role.as_str()).collect();
    assert_eq!(
        roles,
        vec!["Werewolf", "Villager", "Seer", "Witch", "Guard", "Moderator"]
    );
    assert_eq!(
        result.players[3].avatar.as_deref(),
        Some("/public/avatars/Witch.jpg")
    );

    // Good guys won, so only the werewolf books a loss.
    assert_eq!(result.players[0].losses, Some(1));
    assert_eq!(result.players[0].wins, Some(0));
    for player in &result.players[1..5] {
        assert_eq!(player.wins, Some(1));
        assert_eq!(player.losses, Some(0));
    }
    assert_eq!(result.players[5].wins, None);

    assert_eq!(result.n_rounds, 2);
    assert_eq!(result.current_round, 1);

    let distribution = result.kind_distribution();
    assert_eq!(distribution["Announcement"], 2);
    assert_eq!(distribution["Response"], 2);
    assert_eq!(distribution["Thought"], 1);
    assert_eq!(distribution.values().sum::<usize>(), 10);
}

#[test]
fn remapped_fixture_carries_real_names_everywhere() {
    let names: Vec<String> = ["Kupo", "GaryChia380460", "Sczwt", "nft2great", "nftflair"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let options = ParseOptions {
        names: Some(names),
        ..ParseOptions::default()
    };
    let result = parse_fixture(&options);

    assert_eq!(result.players[0].name, "Kupo");
    assert_eq!(result.players[1].name, "GaryChia38");

    let hunt = result
        .dialogue
        .iter()
        .find(|event| event.kind == EventKind::Response && event.content.starts_with("Hunt"))
        .unwrap();
    assert_eq!(hunt.speaker, "Kupo");
    assert_eq!(hunt.content, "Hunt Sczwt");
    assert_eq!(hunt.player_name.as_deref(), Some("Kupo"));
    assert_eq!(
        hunt.living_players.as_deref(),
        Some(
            &[
                "Kupo".to_string(),
                "GaryChia38".to_string(),
                "Sczwt".to_string(),
                "nft2great".to_string(),
                "nftflair".to_string(),
            ][..]
        )
    );

    let vote = result
        .dialogue
        .iter()
        .find(|event| event.kind == EventKind::Action)
        .unwrap();
    assert_eq!(vote.speaker, "GaryChia38");
    assert_eq!(vote.content, "I vote to eliminate Kupo");
}

#[test]
fn serialized_fixture_matches_the_viewer_wire_format() {
    let result = parse_fixture(&ParseOptions::default());
    let json = serde_json::to_value(&result).unwrap();

    let top = json.as_object().unwrap();
    assert_eq!(top.len(), 4);
    for key in ["players", "dialogue", "n_rounds", "current_round"] {
        assert!(top.contains_key(key), "missing top-level key {key}");
    }

    let first = &json["dialogue"][0];
    assert_eq!(first["type"], "Instruction");
    assert!(first.get("timestamp").is_none());
    assert!(first.get("position").is_none());
    assert!(first.get("living_players").is_none());

    let thought = &json["dialogue"][1];
    assert_eq!(thought["type"], "Thought");
    assert_eq!(thought["player_name"], "Player1");
    assert_eq!(thought["living_players"].as_array().unwrap().len(), 5);
}

#[test]
fn missing_file_degrades_to_the_empty_result() {
    let result = parse_file("does/not/exist_3_1.txt", &ParseOptions::default());
    assert_eq!(result, ParseResult::empty());
    assert_eq!(result.n_rounds, 0);
}
