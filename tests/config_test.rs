use boardscore::config::{Settings, DEFAULT_PLACEHOLDER};
use boardscore::scorer::{Grade, Points};
use clap::{FromArgMatches, Parser};
use rstest::rstest;
use std::io::Write;

// Minimal parser so the flattened flags can be exercised without the binary.
#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    settings: Settings,
}

fn parse_cli(args: &[&str]) -> (Settings, clap::ArgMatches) {
    use clap::CommandFactory;
    let matches = TestCli::command()
        .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
        .unwrap();
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.settings, matches)
}

#[test]
fn test_defaults_match_clap_defaults() {
    let (from_cli, _) = parse_cli(&[]);
    let d = Settings::default();
    assert_eq!(from_cli.default_base_score, d.default_base_score);
    assert_eq!(from_cli.default_max_count, d.default_max_count);
    assert_eq!(from_cli.grade_excellent, d.grade_excellent);
    assert_eq!(from_cli.grade_good, d.grade_good);
    assert_eq!(from_cli.grade_fair, d.grade_fair);
    assert_eq!(from_cli.placeholder, DEFAULT_PLACEHOLDER);
}

#[test]
fn test_load_from_file_partial_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"default_max_count": 5, "grade_good": 75}}"#).unwrap();

    let s = Settings::load_from_file(file.path()).unwrap();
    assert_eq!(s.default_max_count, 5);
    assert_eq!(s.grade_good, 75.0);
    assert_eq!(s.grade_excellent, 90.0);
    assert_eq!(s.default_base_score, 100.0);
}

#[test]
fn test_load_from_file_rejects_inverted_bands() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"grade_excellent": 60, "grade_good": 70}}"#).unwrap();
    let err = Settings::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("descending"));
}

#[test]
fn test_load_from_missing_file() {
    let err = Settings::load_from_file("/no/such/settings.json").unwrap_err();
    assert!(err.to_string().contains("Could not read settings file"));
}

#[test]
fn test_merge_only_overrides_typed_flags() {
    let mut file_settings = Settings {
        default_max_count: 7,
        grade_fair: 40.0,
        ..Settings::default()
    };
    let (cli, matches) = parse_cli(&["--grade-fair", "55", "--placeholder", "Nothing here"]);
    file_settings.merge_from_cli(&cli, &matches);

    assert_eq!(file_settings.grade_fair, 55.0);
    assert_eq!(file_settings.placeholder, "Nothing here");
    // Not typed: the file value survives the clap default.
    assert_eq!(file_settings.default_max_count, 7);
}

#[rstest]
#[case(95, Grade::Excellent)]
#[case(90, Grade::Excellent)]
#[case(89, Grade::Good)]
#[case(70, Grade::Good)]
#[case(50, Grade::Fair)]
#[case(49, Grade::Poor)]
#[case(-20, Grade::Poor)]
fn test_grade_bands(#[case] total: i64, #[case] expected: Grade) {
    assert_eq!(Grade::for_total(Points::from_whole(total), &Settings::default()), expected);
}
