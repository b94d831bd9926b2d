//! End-to-end flow over the core: tokenize sample filenames, label unknown
//! segments, synthesize a group pattern, validate it, group a photo set and
//! summarize the preview.

use lineup_core::{
    group_and_assign_roles, validate_against_samples, validate_group_pattern, validate_patterns,
    DelimiterTokenizer, ErrorKind, PatternConfiguration, PreviewOutcome, PreviewSummary, Role,
    RoleRule, RuleType, SegmentAction, SegmentLabel, TokenType, Tokenizer, UnknownSegmentHandler,
    WarningKind,
};
use regex::Regex;

fn files(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn front_rear_rules() -> Vec<RoleRule> {
    vec![
        RoleRule::new(Role::Front, RuleType::Contains, "front"),
        RoleRule::new(Role::Rear, RuleType::Contains, "rear"),
    ]
}

#[test]
fn test_two_groups_from_three_files() {
    let filenames = files(&["car_ABC123_front.jpg", "car_ABC123_rear.jpg", "car_XYZ9_front.jpg"]);
    let result = group_and_assign_roles(&filenames, r"^car_([A-Za-z0-9]+)_\w+\.jpg$", &front_rear_rules(), None);

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups["ABC123"].len(), 2);
    assert_eq!(result.groups["XYZ9"], vec!["car_XYZ9_front.jpg".to_string()]);
    assert_eq!(result.file_to_role["car_ABC123_front.jpg"], Role::Front);
    assert_eq!(result.file_to_role["car_ABC123_rear.jpg"], Role::Rear);
    assert_eq!(result.file_to_role["car_XYZ9_front.jpg"], Role::Front);
    assert!(result.unmatched_files.is_empty());
}

#[test]
fn test_overview_beats_front() {
    let filenames = files(&["car_A1_front_overview.jpg"]);
    let mut rules = front_rear_rules();
    rules.push(RoleRule::new(Role::Overview, RuleType::Contains, "overview"));

    let result = group_and_assign_roles(&filenames, r"^car_([A-Za-z0-9]+)_.*\.jpg$", &rules, None);
    assert_eq!(result.file_to_role["car_A1_front_overview.jpg"], Role::Overview);
}

#[test]
fn test_group_pattern_validation_cases() {
    assert!(validate_group_pattern("").has_error(ErrorKind::EmptyGroupPattern));
    assert!(validate_group_pattern("abc").has_error(ErrorKind::NoCapturingGroups));
    assert!(validate_group_pattern("(a)(b)").has_error(ErrorKind::MultipleCapturingGroups));
    assert!(validate_group_pattern("(a)").is_valid());
}

#[test]
fn test_inferred_pattern_groups_the_sample_set() {
    let samples = files(&[
        "car_ABC123_tmp_front.jpg",
        "car_ABC123_tmp_rear.jpg",
        "car_XYZ9_tmp_front.jpg",
        "car_XYZ9_tmp_rear.jpg",
    ]);

    let analysis = DelimiterTokenizer::new().tokenize(&samples);
    let handler = UnknownSegmentHandler::new();
    let first = analysis.tokens_for("car_ABC123_tmp_front.jpg").unwrap();
    assert_eq!(handler.identify_unknown_segments(first), vec!["tmp".to_string()]);

    let handler = UnknownSegmentHandler::with_labels([SegmentLabel::new("tmp", SegmentAction::Ignore)]);
    let summary = handler.unknown_segment_summary(&analysis.tokens);
    assert_eq!(summary.pending(), 0);
    assert!(summary.labeled.contains("tmp"));

    // pool the labeled tokens of every sample, positions line up across files
    let mut pooled = Vec::new();
    for name in &samples {
        pooled.extend(handler.apply_segment_labels(analysis.tokens_for(name).unwrap()));
    }
    let group_token = pooled
        .iter()
        .find(|t| t.suggested_type == TokenType::GroupId)
        .cloned()
        .unwrap();
    let pattern = lineup_core::generate_group_pattern(&pooled, Some(&group_token)).unwrap();

    // the photo set itself has no tmp segment
    let set = files(&["car_ABC123_front.jpg", "car_ABC123_rear.jpg", "car_XYZ9_front.jpg", "car_XYZ9_rear.jpg"]);
    assert!(Regex::new(&pattern).is_ok());

    let config = PatternConfiguration::from_rules(Some(pattern.clone()), Some(group_token.value.clone()), front_rear_rules());
    let validation = validate_patterns(&config);
    assert!(validation.is_valid(), "{:?}", validation.errors());

    let samples_check = validate_against_samples(&config, &set);
    assert!(samples_check.is_valid(), "{:?}", samples_check.errors());
    assert!(!samples_check.has_warning(WarningKind::IncompleteGroups));

    let grouping = group_and_assign_roles(&set, &pattern, &config.role_rules, None);
    assert_eq!(grouping.groups.len(), 2);

    let summary = PreviewSummary::new(&PreviewOutcome::from_grouping(&grouping, &set));
    assert_eq!(summary.total_files(), 4);
    assert_eq!(summary.match_percentage(), 100.0);
    assert!(summary.incomplete_groups().is_empty());
    assert!(summary.is_healthy());
}

#[test]
fn test_unmatched_files_are_reported_not_errors() {
    let filenames = files(&["car_A1_front.jpg", "car_A1_rear.jpg", "notes.txt"]);
    let pattern = r"^car_([A-Za-z0-9]+)_\w+\.jpg$";
    let grouping = group_and_assign_roles(&filenames, pattern, &front_rear_rules(), None);

    assert_eq!(grouping.unmatched_files, vec!["notes.txt".to_string()]);
    assert!(grouping.unmatched_reasons.contains_key("notes.txt"));

    let outcomes = PreviewOutcome::from_grouping(&grouping, &filenames);
    assert!(outcomes.iter().all(|o| o.error.is_none()));

    let summary = PreviewSummary::new(&outcomes);
    assert_eq!(summary.unmatched_files(), 1);
    assert!(summary.has_warnings());
    assert!(!summary.has_errors());
    // 2 of 3 is below the health threshold
    assert!(!summary.is_healthy());
}
