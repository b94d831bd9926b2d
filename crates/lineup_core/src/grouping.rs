//! Grouping Engine
//!
//! Applies a group pattern to a filename set, then assigns roles inside each
//! group with fixed precedence: OVERVIEW, then FRONT, then REAR.
//!
//! Malformed patterns never escape as errors here. A bad group pattern
//! leaves every file unmatched with a reason; a bad override rule simply
//! never matches.

use crate::pattern::generator::rules_for_role;
use crate::pattern::validator::{capture_count_result, syntax_error};
use crate::segments::UnknownSegmentHandler;
use crate::token::{Role, RoleRule, RuleType};
use crate::validation::{ErrorKind, ValidationError, ValidationResult};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

pub const REASON_NO_ROLE: &str = "No role rules matched this file";
pub const REASON_NO_MATCH: &str = "Filename did not match the group pattern";
pub const REASON_EMPTY_GROUP_ID: &str = "Pattern matched but captured an empty group ID";

/// Files grouped by captured ID with their assigned roles
///
/// Every input filename is either in `file_to_group_id`/`file_to_role` or in
/// `unmatched_files`, never both. `groups` never holds an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingResult {
    pub groups: BTreeMap<String, Vec<String>>,
    pub file_to_group_id: BTreeMap<String, String>,
    pub file_to_role: BTreeMap<String, Role>,
    pub unmatched_files: Vec<String>,
    pub unmatched_reasons: BTreeMap<String, String>,
}

impl GroupingResult {
    pub fn total_files(&self) -> usize {
        self.file_to_group_id.len() + self.unmatched_files.len()
    }

    /// Roles present among a group's members
    pub fn roles_in_group(&self, group_id: &str) -> BTreeSet<Role> {
        self.groups
            .get(group_id)
            .into_iter()
            .flatten()
            .filter_map(|file| self.file_to_role.get(file).copied())
            .collect()
    }

    pub fn files_with_role(&self, group_id: &str, role: Role) -> Vec<&str> {
        self.groups
            .get(group_id)
            .into_iter()
            .flatten()
            .filter(|file| self.file_to_role.get(file.as_str()) == Some(&role))
            .map(String::as_str)
            .collect()
    }

    fn mark_unmatched(&mut self, filename: &str, reason: impl Into<String>) {
        self.unmatched_files.push(filename.to_string());
        self.unmatched_reasons.insert(filename.to_string(), reason.into());
    }
}

// ============================================================================
// Rule matching
// ============================================================================

/// Role rule with its override regex compiled once
struct CompiledRule<'a> {
    rule: &'a RoleRule,
    regex: Option<Regex>,
}

impl<'a> CompiledRule<'a> {
    fn new(rule: &'a RoleRule) -> Self {
        let regex = if rule.rule_type == RuleType::RegexOverride && !rule.is_blank() {
            compile_override(rule)
        } else {
            None
        };
        Self { rule, regex }
    }

    fn matches(&self, filename: &str) -> bool {
        match self.rule.rule_type {
            RuleType::RegexOverride => {
                !self.rule.is_blank() && self.regex.as_ref().is_some_and(|r| r.is_match(filename))
            }
            _ => matches_rule(filename, self.rule),
        }
    }
}

fn compile_override(rule: &RoleRule) -> Option<Regex> {
    match RegexBuilder::new(&rule.rule_value)
        .case_insensitive(!rule.case_sensitive)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!(pattern = %rule.rule_value, error = %e, "override rule does not compile; treating as no match");
            None
        }
    }
}

/// Whether `filename` satisfies `rule`
///
/// Blank values never match. Case is folded on both sides unless the rule is
/// case-sensitive. Overrides are an unanchored search; a malformed override
/// is "no match".
pub fn matches_rule(filename: &str, rule: &RoleRule) -> bool {
    if rule.is_blank() {
        return false;
    }
    if rule.rule_type == RuleType::RegexOverride {
        return compile_override(rule).is_some_and(|r| r.is_match(filename));
    }

    let (name, value) = if rule.case_sensitive {
        (filename.to_string(), rule.rule_value.clone())
    } else {
        (filename.to_lowercase(), rule.rule_value.to_lowercase())
    };

    match rule.rule_type {
        RuleType::Equals => name == value,
        RuleType::Contains => name.contains(&value),
        RuleType::StartsWith => name.starts_with(&value),
        RuleType::EndsWith => name.ends_with(&value),
        RuleType::RegexOverride => false,
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// Group filenames by the captured ID and assign roles within each group
///
/// Duplicate filenames are considered once. Segment decisions shape the
/// group pattern upstream; the handler never changes which file lands where,
/// since patterns and rules always see the raw filename.
pub fn group_and_assign_roles(
    filenames: &[String],
    group_pattern: &str,
    role_rules: &[RoleRule],
    unknown_segments: Option<&UnknownSegmentHandler>,
) -> GroupingResult {
    if let Some(handler) = unknown_segments {
        debug!(decisions = handler.labels().len(), "grouping raw filenames; segment decisions already applied");
    }

    let mut result = GroupingResult::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let filenames: Vec<&str> = filenames
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect();

    let regex = match RegexBuilder::new(group_pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(e) => {
            warn!(pattern = %group_pattern, error = %e, "group pattern does not compile");
            let reason = format!("Invalid group pattern: {}", e);
            for name in filenames {
                result.mark_unmatched(name, reason.clone());
            }
            return result;
        }
    };

    // Step 1: extract group IDs
    for name in filenames {
        match regex.captures(name) {
            Some(caps) => match caps.get(1).filter(|m| !m.as_str().trim().is_empty()) {
                Some(id) => {
                    let id = id.as_str().to_string();
                    result.groups.entry(id.clone()).or_default().push(name.to_string());
                    result.file_to_group_id.insert(name.to_string(), id);
                }
                None => result.mark_unmatched(name, REASON_EMPTY_GROUP_ID),
            },
            None => result.mark_unmatched(name, REASON_NO_MATCH),
        }
    }

    // Step 2: assign roles in precedence order
    let buckets: Vec<(Role, Vec<CompiledRule<'_>>)> = Role::PRECEDENCE
        .into_iter()
        .map(|role| {
            let compiled = rules_for_role(role_rules, role)
                .into_iter()
                .map(CompiledRule::new)
                .collect();
            (role, compiled)
        })
        .collect();

    let group_ids: Vec<String> = result.groups.keys().cloned().collect();
    for group_id in group_ids {
        let members = result.groups.remove(&group_id).unwrap_or_default();
        let mut kept = Vec::with_capacity(members.len());

        for file in members {
            let role = buckets
                .iter()
                .find(|(_, rules)| rules.iter().any(|r| r.matches(&file)))
                .map(|(role, _)| *role);

            match role {
                Some(role) => {
                    debug!(file = %file, group = %group_id, role = %role, "assigned role");
                    result.file_to_role.insert(file.clone(), role);
                    kept.push(file);
                }
                None => {
                    result.file_to_group_id.remove(&file);
                    result.mark_unmatched(&file, REASON_NO_ROLE);
                }
            }
        }

        if kept.is_empty() {
            debug!(group = %group_id, "dropping group with no role-matched files");
        } else {
            result.groups.insert(group_id, kept);
        }
    }

    info!(
        groups = result.groups.len(),
        matched = result.file_to_role.len(),
        unmatched = result.unmatched_files.len(),
        "grouping complete"
    );
    result
}

/// Structural checks for a standalone group pattern
pub fn validate_group_pattern(pattern: &str) -> ValidationResult {
    if pattern.trim().is_empty() {
        return ValidationResult::from_error(ValidationError::new(ErrorKind::EmptyGroupPattern));
    }

    let mut result = capture_count_result(pattern);
    if let Some(error) = syntax_error("group pattern", pattern) {
        result.add_error(error);
    }
    result
}
