//! Pattern Generator
//!
//! Turns an ordered token sequence into an anchored group-extraction regex,
//! and role rules into role-matching regexes.
//!
//! ## Group pattern shape
//!
//! ```text
//! car_ABC123_front.jpg
//!  │    │      │    │
//!  ▼    ▼      ▼    ▼
//! ^car[_\-.\s]+([\w-]+)[_\-.\s]+(?i:front|f|fr|forward)[_\-.\s]+(?i:jpg)$
//! ```

use crate::error::{LineupError, Result};
use crate::token::{Role, RoleRule, RuleType, Token, TokenType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Delimiter class inserted between successive positions
pub const DELIMITER_PATTERN: &str = r"[_\-.\s]+";
/// Word characters and hyphens
pub const GROUP_ID_PATTERN: &str = r"[\w-]+";
pub const INDEX_PATTERN: &str = r"\d+";
pub const UNKNOWN_PATTERN: &str = r"\w*";
pub const GENERIC_DATE_PATTERN: &str = r"\d{2,4}[-_.]?\d{2}[-_.]?\d{2,4}";

pub const FRONT_SYNONYMS: &[&str] = &["front", "f", "fr", "forward"];
pub const REAR_SYNONYMS: &[&str] = &["rear", "r", "rr", "back", "behind"];
pub const OVERVIEW_SYNONYMS: &[&str] = &["overview", "ov", "ovr", "ovw", "scene", "full"];

/// Literal date shapes, checked in order
static DATE_SHAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date regex"), r"\d{4}-\d{2}-\d{2}"),
        (Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("valid US date regex"), r"\d{2}-\d{2}-\d{4}"),
        (Regex::new(r"^\d{8}$").expect("valid compact date regex"), r"\d{8}"),
    ]
});

/// Which role a camera-side token names, if any
pub fn camera_side_role(value: &str) -> Option<Role> {
    let lower = value.to_lowercase();
    if FRONT_SYNONYMS.contains(&lower.as_str()) {
        Some(Role::Front)
    } else if REAR_SYNONYMS.contains(&lower.as_str()) {
        Some(Role::Rear)
    } else if OVERVIEW_SYNONYMS.contains(&lower.as_str()) {
        Some(Role::Overview)
    } else {
        None
    }
}

fn synonyms_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Front => FRONT_SYNONYMS,
        Role::Rear => REAR_SYNONYMS,
        Role::Overview => OVERVIEW_SYNONYMS,
    }
}

fn case_insensitive(pattern: &str) -> String {
    format!("(?i:{})", pattern)
}

/// Sub-pattern for a single token, by type
pub fn token_sub_pattern(token: &Token) -> String {
    match token.suggested_type {
        TokenType::Prefix | TokenType::Suffix => regex::escape(&token.value),
        TokenType::GroupId => GROUP_ID_PATTERN.to_string(),
        TokenType::CameraSide => match camera_side_role(&token.value) {
            Some(role) => case_insensitive(&synonyms_for(role).join("|")),
            None => case_insensitive(&regex::escape(&token.value)),
        },
        TokenType::Date => date_sub_pattern(&token.value).to_string(),
        TokenType::Index => INDEX_PATTERN.to_string(),
        TokenType::Extension => case_insensitive(&regex::escape(&token.value)),
        TokenType::Unknown => UNKNOWN_PATTERN.to_string(),
    }
}

fn date_sub_pattern(value: &str) -> &'static str {
    DATE_SHAPES
        .iter()
        .find(|(shape, _)| shape.is_match(value))
        .map(|(_, pattern)| *pattern)
        .unwrap_or(GENERIC_DATE_PATTERN)
}

/// Build the anchored group-extraction pattern
///
/// Tokens sharing a position are deduplicated by sub-pattern; more than one
/// distinct sub-pattern at a position becomes a non-capturing alternation.
/// The position holding `group_token` is wrapped in the one capturing group.
///
/// Empty `tokens` yields an empty string. A missing `group_token`, or one
/// that is not an element of `tokens`, is a caller bug.
pub fn generate_group_pattern(tokens: &[Token], group_token: Option<&Token>) -> Result<String> {
    if tokens.is_empty() {
        return Ok(String::new());
    }

    let group_token = group_token.ok_or_else(|| {
        LineupError::InvalidArgument("a group ID token must be selected".to_string())
    })?;
    if !tokens.contains(group_token) {
        return Err(LineupError::InvalidArgument(format!(
            "group ID token '{}' at position {} is not part of the token sequence",
            group_token.value, group_token.position
        )));
    }

    let mut by_position: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for token in tokens {
        by_position
            .entry(token.position)
            .or_default()
            .insert(token_sub_pattern(token));
    }

    let parts: Vec<String> = by_position
        .into_iter()
        .map(|(position, subs)| {
            let alternatives: Vec<String> = subs.into_iter().collect();
            if position == group_token.position {
                format!("({})", alternatives.join("|"))
            } else if alternatives.len() == 1 {
                alternatives.into_iter().next().unwrap_or_default()
            } else {
                format!("(?:{})", alternatives.join("|"))
            }
        })
        .collect();

    let pattern = format!("^{}$", parts.join(DELIMITER_PATTERN));
    debug!(pattern = %pattern, tokens = tokens.len(), "generated group pattern");
    Ok(pattern)
}

/// Pattern for a single rule, or `None` for a blank value
pub fn rule_pattern(rule: &RoleRule) -> Option<String> {
    if rule.is_blank() {
        return None;
    }

    let escaped = regex::escape(&rule.rule_value);
    let pattern = match rule.rule_type {
        RuleType::Equals => format!("^{}$", escaped),
        RuleType::Contains => escaped,
        RuleType::StartsWith => format!("^{}", escaped),
        RuleType::EndsWith => format!("{}$", escaped),
        RuleType::RegexOverride => rule.rule_value.clone(),
    };

    if rule.case_sensitive {
        Some(pattern)
    } else {
        Some(case_insensitive(&pattern))
    }
}

/// Sort rules for `role` ascending by priority, stable on ties
pub fn rules_for_role(rules: &[RoleRule], role: Role) -> Vec<&RoleRule> {
    let mut selected: Vec<&RoleRule> = rules.iter().filter(|r| r.target_role == role).collect();
    selected.sort_by_key(|r| r.priority);
    selected
}

/// Combine every rule targeting `role` into one pattern
///
/// Returns an empty string when no rule contributes a pattern.
pub fn generate_role_pattern(rules: &[RoleRule], role: Role) -> String {
    let patterns: Vec<String> = rules_for_role(rules, role)
        .into_iter()
        .filter_map(rule_pattern)
        .collect();

    match patterns.len() {
        0 => String::new(),
        1 => patterns.into_iter().next().unwrap_or_default(),
        _ => format!("(?:{})", patterns.join("|")),
    }
}
