//! Pattern and rule validation
//!
//! Every check is independent; results are concatenated. Regex compile
//! failures are reported here and nowhere else.

use super::capture::{count_capturing_groups, has_quantifier};
use super::generator::generate_role_pattern;
use crate::grouping::{group_and_assign_roles, GroupingResult};
use crate::token::{Role, RoleRule, RuleType};
use crate::validation::{ErrorKind, ValidationError, ValidationResult, ValidationWarning, WarningKind};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Match rate below which a sample run is flagged
pub const LOW_MATCH_RATE_PERCENT: f64 = 80.0;
const COMPLEX_REGEX_LENGTH: usize = 100;
const COMPLEX_REGEX_ALTERNATIONS: usize = 5;
const MAX_LISTED_IDS: usize = 5;

/// Snapshot of everything validation looks at
///
/// Built once per validation call; the core never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternConfiguration {
    #[serde(default)]
    pub group_pattern: Option<String>,
    /// Value of the token chosen as group ID, if any
    #[serde(default)]
    pub group_id_token: Option<String>,
    #[serde(default)]
    pub front_pattern: Option<String>,
    #[serde(default)]
    pub rear_pattern: Option<String>,
    #[serde(default)]
    pub overview_pattern: Option<String>,
    #[serde(default)]
    pub role_rules: Vec<RoleRule>,
}

impl PatternConfiguration {
    /// Derive the three role patterns from `rules`
    pub fn from_rules(
        group_pattern: Option<String>,
        group_id_token: Option<String>,
        rules: Vec<RoleRule>,
    ) -> Self {
        let role_pattern = |role| Some(generate_role_pattern(&rules, role)).filter(|p| !p.is_empty());
        Self {
            group_pattern,
            group_id_token,
            front_pattern: role_pattern(Role::Front),
            rear_pattern: role_pattern(Role::Rear),
            overview_pattern: role_pattern(Role::Overview),
            role_rules: rules,
        }
    }

    pub fn role_pattern(&self, role: Role) -> Option<&str> {
        match role {
            Role::Front => self.front_pattern.as_deref(),
            Role::Rear => self.rear_pattern.as_deref(),
            Role::Overview => self.overview_pattern.as_deref(),
        }
    }

    /// Group pattern, or `None` when absent or blank
    pub fn group_pattern(&self) -> Option<&str> {
        non_blank(self.group_pattern.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Configuration validation
// ============================================================================

/// Run the structural checks over a configuration
pub fn validate_patterns(config: &PatternConfiguration) -> ValidationResult {
    let result: ValidationResult = [
        check_group_pattern(config),
        check_role_patterns(config),
        check_role_rules(config),
        check_regex_syntax(config),
        check_pattern_breadth(config),
    ]
    .into_iter()
    .collect();

    debug!(
        valid = result.is_valid(),
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "validated pattern configuration"
    );
    result
}

fn check_group_pattern(config: &PatternConfiguration) -> ValidationResult {
    match config.group_pattern() {
        None if non_blank(config.group_id_token.as_deref()).is_none() => {
            ValidationResult::from_error(ValidationError::new(ErrorKind::NoGroupIdSelected))
        }
        None => ValidationResult::from_error(ValidationError::new(ErrorKind::EmptyGroupPattern)),
        Some(pattern) => capture_count_result(pattern),
    }
}

/// Exactly one capturing group is required
pub(crate) fn capture_count_result(pattern: &str) -> ValidationResult {
    match count_capturing_groups(pattern) {
        0 => ValidationResult::from_error(
            ValidationError::new(ErrorKind::NoCapturingGroups).with_context(pattern),
        ),
        1 => ValidationResult::success(),
        n => ValidationResult::from_error(
            ValidationError::with_message(
                ErrorKind::MultipleCapturingGroups,
                format!("The group pattern has {} capturing groups; exactly 1 is required", n),
            )
            .with_context(pattern),
        ),
    }
}

fn check_role_patterns(config: &PatternConfiguration) -> ValidationResult {
    let mut result = ValidationResult::success();
    let defined: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|role| non_blank(config.role_pattern(*role)).is_some())
        .collect();

    if defined.is_empty() {
        result.add_error(ValidationError::new(ErrorKind::NoRolePatterns));
    }
    if !defined.contains(&Role::Overview) {
        result.add_warning(ValidationWarning::new(WarningKind::NoOverviewImages));
    }
    result
}

fn check_role_rules(config: &PatternConfiguration) -> ValidationResult {
    let mut result = ValidationResult::success();
    let any_role_pattern = Role::ALL
        .into_iter()
        .any(|role| non_blank(config.role_pattern(role)).is_some());

    if !any_role_pattern && config.role_rules.is_empty() {
        result.add_error(ValidationError::new(ErrorKind::NoRoleRulesDefined));
        return result;
    }

    for rule in config.role_rules.iter().filter(|r| r.is_blank()) {
        result.add_error(
            ValidationError::with_message(
                ErrorKind::InvalidRuleValue,
                format!("{} rule of type {} has an empty value", rule.target_role, rule.rule_type),
            )
            .with_context(rule.target_role.as_str()),
        );
    }

    for (i, a) in config.role_rules.iter().enumerate() {
        for b in &config.role_rules[i + 1..] {
            if rules_overlap(a, b) {
                result.add_warning(
                    ValidationWarning::with_message(
                        WarningKind::OverlappingRules,
                        format!(
                            "{} rule '{}' overlaps {} rule '{}'",
                            a.target_role, a.rule_value, b.target_role, b.rule_value
                        ),
                    )
                    .with_context(format!("{} / {}", a.target_role, b.target_role)),
                );
            }
        }
    }

    result
}

/// CONTAINS rules for different roles where one raw value contains the other
fn rules_overlap(a: &RoleRule, b: &RoleRule) -> bool {
    a.target_role != b.target_role
        && a.rule_type == RuleType::Contains
        && b.rule_type == RuleType::Contains
        && !a.is_blank()
        && !b.is_blank()
        && (a.rule_value.contains(&b.rule_value) || b.rule_value.contains(&a.rule_value))
}

fn check_regex_syntax(config: &PatternConfiguration) -> ValidationResult {
    let mut result = ValidationResult::success();
    let candidates = [
        ("group pattern", config.group_pattern()),
        ("front pattern", non_blank(config.front_pattern.as_deref())),
        ("rear pattern", non_blank(config.rear_pattern.as_deref())),
        ("overview pattern", non_blank(config.overview_pattern.as_deref())),
    ];

    for (name, pattern) in candidates {
        if let Some(pattern) = pattern {
            if let Some(error) = syntax_error(name, pattern) {
                result.add_error(error);
            }
        }
    }
    result
}

pub(crate) fn syntax_error(name: &str, pattern: &str) -> Option<ValidationError> {
    RegexBuilder::new(pattern).build().err().map(|e| {
        ValidationError::with_message(
            ErrorKind::RegexSyntaxError,
            format!("Invalid regular expression in {}: {}", name, e),
        )
        .with_context(pattern)
    })
}

fn check_pattern_breadth(config: &PatternConfiguration) -> ValidationResult {
    let mut result = ValidationResult::success();
    let Some(pattern) = config.group_pattern() else {
        return result;
    };

    if pattern.contains("(.*)") || pattern.contains("(.+)") {
        result.add_warning(ValidationWarning::new(WarningKind::PermissivePattern).with_context(pattern));
    } else if !has_quantifier(pattern) {
        result.add_warning(ValidationWarning::new(WarningKind::RestrictivePattern).with_context(pattern));
    }
    result
}

// ============================================================================
// Rule lint
// ============================================================================

/// Advisory checks over a rule list, plus override compilation
pub fn lint_rules(rules: &[RoleRule]) -> ValidationResult {
    let mut result = ValidationResult::success();

    for rule in rules {
        if rule.is_blank() {
            result.add_warning(
                ValidationWarning::new(WarningKind::EmptyRuleValue).with_context(rule.target_role.as_str()),
            );
            continue;
        }

        if rule.rule_type == RuleType::RegexOverride {
            if let Err(e) = RegexBuilder::new(&rule.rule_value).build() {
                result.add_error(
                    ValidationError::with_message(
                        ErrorKind::InvalidRegexPattern,
                        format!("Override for {} does not compile: {}", rule.target_role, e),
                    )
                    .with_context(rule.rule_value.clone()),
                );
            }
            let alternations = rule.rule_value.matches('|').count();
            if rule.rule_value.len() > COMPLEX_REGEX_LENGTH || alternations > COMPLEX_REGEX_ALTERNATIONS {
                result.add_warning(
                    ValidationWarning::new(WarningKind::ComplexRegex).with_context(rule.rule_value.clone()),
                );
            }
        } else if rule.case_sensitive && rule.rule_value.to_lowercase() != rule.rule_value.to_uppercase() {
            result.add_warning(
                ValidationWarning::new(WarningKind::CaseSensitivityWarning).with_context(rule.to_string()),
            );
        }
    }

    for role in Role::ALL {
        if !rules.iter().any(|r| r.target_role == role && !r.is_blank()) {
            result.add_warning(
                ValidationWarning::with_message(
                    WarningKind::MissingRoleRules,
                    format!("No rules assign the {} role", role),
                )
                .with_context(role.as_str()),
            );
        }
    }

    let mut seen: HashSet<(RuleType, String, bool)> = HashSet::new();
    for (i, a) in rules.iter().enumerate() {
        for b in &rules[i + 1..] {
            if a.target_role != b.target_role && same_condition(a, b) {
                let key = (a.rule_type, fold(a), a.case_sensitive);
                if seen.insert(key) {
                    result.add_error(
                        ValidationError::with_message(
                            ErrorKind::InvalidRuleConfiguration,
                            format!(
                                "The same {} '{}' condition assigns both {} and {}",
                                a.rule_type, a.rule_value, a.target_role, b.target_role
                            ),
                        )
                        .with_context(a.rule_value.clone()),
                    );
                }
            }
        }
    }

    result
}

fn fold(rule: &RoleRule) -> String {
    if rule.case_sensitive {
        rule.rule_value.clone()
    } else {
        rule.rule_value.to_lowercase()
    }
}

fn same_condition(a: &RoleRule, b: &RoleRule) -> bool {
    !a.is_blank() && a.rule_type == b.rule_type && a.case_sensitive == b.case_sensitive && fold(a) == fold(b)
}

// ============================================================================
// Sample validation
// ============================================================================

/// Run the grouping engine over sample filenames and report coverage
pub fn validate_against_samples(config: &PatternConfiguration, filenames: &[String]) -> ValidationResult {
    let mut result = ValidationResult::success();

    if filenames.is_empty() {
        result.add_warning(ValidationWarning::new(WarningKind::NoSampleFiles));
        return result;
    }
    let Some(pattern) = config.group_pattern() else {
        return result;
    };
    if let Err(e) = RegexBuilder::new(pattern).case_insensitive(true).build() {
        result.add_error(
            ValidationError::with_message(ErrorKind::InvalidGroupPattern, format!("Invalid group pattern: {}", e))
                .with_context(pattern),
        );
        return result;
    }

    let grouping = group_and_assign_roles(filenames, pattern, &grouping_rules(config), None);
    let total = grouping.total_files();
    let matched = grouping.file_to_role.len();

    if matched == 0 {
        result.add_error(ValidationError::new(ErrorKind::NoFilesMatched).with_context(format!("0 of {} files", total)));
        return result;
    }

    let unmatched = grouping.unmatched_files.len();
    if unmatched > 0 {
        result.add_warning(
            ValidationWarning::new(WarningKind::UnmatchedFiles)
                .with_context(format!("{} of {} files", unmatched, total)),
        );
    }

    let rate = matched as f64 * 100.0 / total as f64;
    if rate < LOW_MATCH_RATE_PERCENT {
        result.add_warning(
            ValidationWarning::with_message(
                WarningKind::LowMatchRate,
                format!("Only {:.1}% of the sample files matched", rate),
            )
            .with_context(format!("{} of {} files", matched, total)),
        );
    }

    result.combine(coverage_warnings(&grouping))
}

/// Role rules for sample grouping
///
/// A role with a pattern but no rule of its own is matched by its pattern,
/// evaluated as a regex override ahead of every configured rule.
fn grouping_rules(config: &PatternConfiguration) -> Vec<RoleRule> {
    let mut rules: Vec<RoleRule> = Role::PRECEDENCE
        .into_iter()
        .filter(|role| !config.role_rules.iter().any(|r| r.target_role == *role))
        .filter_map(|role| {
            let pattern = non_blank(config.role_pattern(role))?;
            Some(RoleRule::new(role, RuleType::RegexOverride, pattern).with_priority(i32::MIN))
        })
        .collect();
    rules.extend(config.role_rules.iter().cloned());
    rules
}

fn coverage_warnings(grouping: &GroupingResult) -> ValidationResult {
    let mut result = ValidationResult::success();

    let incomplete: Vec<&str> = grouping
        .groups
        .keys()
        .filter(|id| {
            let roles = grouping.roles_in_group(id);
            !roles.contains(&Role::Front) || !roles.contains(&Role::Rear)
        })
        .map(String::as_str)
        .collect();
    if !incomplete.is_empty() {
        result.add_warning(
            ValidationWarning::with_message(
                WarningKind::IncompleteGroups,
                format!("{} group(s) are missing FRONT or REAR images", incomplete.len()),
            )
            .with_context(list_ids(&incomplete)),
        );
    }

    let with_overview = grouping
        .groups
        .keys()
        .filter(|id| grouping.roles_in_group(id).contains(&Role::Overview))
        .count();
    if with_overview > 0 && with_overview < grouping.groups.len() {
        result.add_warning(
            ValidationWarning::with_message(
                WarningKind::IncompleteGroupCoverage,
                format!(
                    "{} of {} groups have an OVERVIEW image",
                    with_overview,
                    grouping.groups.len()
                ),
            ),
        );
    }

    let sizes: Vec<usize> = grouping.groups.values().map(Vec::len).collect();
    if let (Some(min), Some(max)) = (sizes.iter().min(), sizes.iter().max()) {
        if sizes.len() > 1 && *max > min * 2 {
            result.add_warning(
                ValidationWarning::new(WarningKind::UnbalancedGroups)
                    .with_context(format!("smallest {} file(s), largest {} file(s)", min, max)),
            );
        }
    }

    let extensions: BTreeSet<String> = grouping
        .file_to_role
        .keys()
        .filter_map(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
        .collect();
    if extensions.len() > 1 {
        result.add_warning(
            ValidationWarning::new(WarningKind::ExtensionMismatch)
                .with_context(extensions.into_iter().collect::<Vec<_>>().join(", ")),
        );
    }

    result
}

fn list_ids(ids: &[&str]) -> String {
    let mut listed = ids.iter().take(MAX_LISTED_IDS).copied().collect::<Vec<_>>().join(", ");
    if ids.len() > MAX_LISTED_IDS {
        listed.push_str(&format!(" and {} more", ids.len() - MAX_LISTED_IDS));
    }
    listed
}
