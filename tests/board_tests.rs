mod common;

use boardscore::board::{Board, BoardDocument, Edit, GroupField, TotalField};
use boardscore::config::Settings;
use boardscore::scorer::{Points, ScoreSummary};
use common::{entity_encode, pts, SAFETY_CONFIG_JSON};
use rstest::rstest;

fn sample_document() -> BoardDocument {
    BoardDocument {
        groups: vec![
            GroupField {
                key: "safety".into(),
                label: "Safety".into(),
                config: entity_encode(SAFETY_CONFIG_JSON),
                value: r#"{"item_1": 1, "ghost": 4}"#.into(),
            },
            GroupField {
                key: "broken".into(),
                label: "Broken".into(),
                config: "{not json".into(),
                value: String::new(),
            },
        ],
        totals: vec![TotalField {
            key: "safety_total".into(),
            label: "Safety total".into(),
            config: r#"{"include_keys": ["safety"], "base_score": 100}"#.into(),
            value: String::new(),
        }],
    }
}

fn summary_of(doc: &BoardDocument, key: &str) -> ScoreSummary {
    let field = doc.totals.iter().find(|t| t.key == key).unwrap();
    serde_json::from_str(&field.value).unwrap()
}

#[rstest]
#[case("safety.item_1=3", "safety", "item_1", "3")]
#[case("a.b.c=", "a.b", "c", "")]
#[case(" g.i =x=y", "g", "i", "x=y")]
fn test_edit_parsing(
    #[case] raw: &str,
    #[case] group: &str,
    #[case] item: &str,
    #[case] value: &str,
) {
    let e: Edit = raw.parse().unwrap();
    assert_eq!(e.group, group);
    assert_eq!(e.item, item);
    assert_eq!(e.value, value);
}

#[rstest]
#[case("no_equals")]
#[case("nodot=1")]
#[case(".item=1")]
#[case("group.=1")]
fn test_edit_parsing_rejects(#[case] raw: &str) {
    assert!(raw.parse::<Edit>().is_err());
}

#[test]
fn test_open_normalizes_persisted_fields() {
    let board = Board::open(sample_document(), Settings::default());
    let doc = board.document();

    assert_eq!(doc.groups[0].value, r#"{"item_1":1}"#);
    let s = summary_of(doc, "safety_total");
    assert_eq!(s.total, pts(95));
    assert_eq!(s.major, 1);

    // A broken group keeps an empty state and shows a placeholder.
    assert_eq!(doc.groups[1].value, "{}");
    let placeholder = board.aggregator().placeholder("broken").unwrap();
    assert!(placeholder.starts_with("No scoring items are configured"));
    assert!(board.aggregator().placeholder("safety").is_none());
}

#[test]
fn test_set_writes_group_and_dependent_totals() {
    let mut board = Board::open(sample_document(), Settings::default());
    let r = board.set("safety", "item_4", "2").unwrap();
    assert_eq!(r.points, pts(10));

    let doc = board.document();
    assert_eq!(doc.groups[0].value, r#"{"item_1":1,"item_4":2}"#);
    assert_eq!(summary_of(doc, "safety_total").total, pts(105));
}

#[test]
fn test_apply_unknown_target_leaves_document() {
    let mut board = Board::open(sample_document(), Settings::default());
    let before = board.document().clone();
    let edit: Edit = "broken.anything=4".parse().unwrap();
    assert!(board.apply(&edit).is_none());
    assert_eq!(board.document(), &before);
}

#[test]
fn test_total_field_value_is_full_summary_json() {
    let board = Board::open(sample_document(), Settings::default());
    let raw = &board.document().totals[0].value;
    let v: serde_json::Value = serde_json::from_str(raw).unwrap();
    for field in ["total", "critical", "major", "minor", "bonus"] {
        assert!(v.get(field).is_some(), "missing {} in {}", field, raw);
    }
    assert_eq!(v["total"], 95);
}

#[test]
fn test_fractional_total_serializes_as_decimal() {
    let doc = BoardDocument {
        groups: vec![GroupField {
            key: "g".into(),
            config: r#"{"items":[{"id":"x","per_unit_delta":-0.5,"max_count":4}]}"#.into(),
            value: r#"{"x":3}"#.into(),
            ..Default::default()
        }],
        totals: vec![TotalField {
            key: "t".into(),
            config: "{}".into(),
            ..Default::default()
        }],
    };
    let board = Board::open(doc, Settings::default());
    let s = summary_of(board.document(), "t");
    assert_eq!(s.total, Points::from_f64(98.5).unwrap());
    assert!(board.document().totals[0].value.contains("98.5"));
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut board = Board::open(sample_document(), Settings::default());
    board.set("safety", "item_2", "3");
    board.document().save_to_file(&path).unwrap();

    let reloaded = Board::open(BoardDocument::load_from_file(&path).unwrap(), Settings::default());
    assert_eq!(reloaded.aggregator().state("safety").unwrap().get("item_2"), Some(3));
    assert_eq!(
        reloaded.aggregator().display_summary("safety_total"),
        board.aggregator().display_summary("safety_total")
    );
}

#[test]
fn test_missing_document_is_config_error() {
    let err = BoardDocument::load_from_file("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("Could not open board document"));
}

fn single_item_field(key: &str, value: &str) -> GroupField {
    GroupField {
        key: key.into(),
        config: r#"{"items":[{"id":"x","per_unit_delta":-5,"max_count":3}]}"#.into(),
        value: value.into(),
        ..Default::default()
    }
}

#[test]
fn test_plain_total_field_sums_every_unkeyed_group() {
    let doc = BoardDocument {
        groups: vec![single_item_field("a", ""), single_item_field("b", "")],
        totals: vec![TotalField {
            key: "grand".into(),
            config: "{}".into(),
            ..Default::default()
        }],
    };
    let mut board = Board::open(doc, Settings::default());
    assert_eq!(board.aggregator().dependents_of("a"), vec!["grand"]);

    board.set("a", "x", "2");
    board.set("b", "x", "1");

    let s = summary_of(board.document(), "grand");
    assert_eq!(s.total, pts(85));
    assert_eq!(s.critical, 2);
    assert_eq!(s.major, 1);
}

#[test]
fn test_duplicate_fields_mirror_the_first() {
    let doc = BoardDocument {
        groups: vec![single_item_field("a", r#"{"x":1}"#), single_item_field("a", r#"{"x":3}"#)],
        totals: vec![
            TotalField {
                key: "t".into(),
                config: "{}".into(),
                ..Default::default()
            },
            TotalField {
                key: "t".into(),
                config: r#"{"total_key":"elsewhere"}"#.into(),
                value: "stale".into(),
                ..Default::default()
            },
        ],
    };
    let mut board = Board::open(doc, Settings::default());
    assert_eq!(board.aggregator().state("a").unwrap().get("x"), Some(1));
    board.set("a", "x", "2");

    let doc = board.document();
    assert_eq!(doc.groups[0].value, r#"{"x":2}"#);
    assert_eq!(doc.groups[1].value, doc.groups[0].value);
    assert_eq!(doc.totals[1].value, doc.totals[0].value);
    assert_eq!(summary_of(doc, "t").total, pts(90));
}
