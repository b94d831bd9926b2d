//! Preview Summary
//!
//! Aggregates per-file classification outcomes into counts, per-group role
//! coverage and a health verdict. Built once; read-only afterwards.

use crate::grouping::GroupingResult;
use crate::token::Role;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum match percentage for a healthy preview
pub const HEALTHY_MATCH_PERCENT: f64 = 80.0;
/// Incomplete-group ratio at or above which a preview is unhealthy
pub const MAX_INCOMPLETE_GROUP_RATIO: f64 = 0.20;

/// Classification outcome for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOutcome {
    pub filename: String,
    pub matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PreviewOutcome {
    pub fn matched(filename: impl Into<String>, group_id: impl Into<String>, role: Role) -> Self {
        Self {
            filename: filename.into(),
            matched: true,
            role: Some(role),
            group_id: Some(group_id.into()),
            error: None,
        }
    }

    pub fn unmatched(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            matched: false,
            role: None,
            group_id: None,
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::unmatched(filename)
        }
    }

    /// One outcome per input filename, in input order
    ///
    /// Unmatched files are not errors; their reasons stay in the grouping result.
    pub fn from_grouping(grouping: &GroupingResult, filenames: &[String]) -> Vec<PreviewOutcome> {
        let mut seen = BTreeSet::new();
        filenames
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .map(|name| {
                match (grouping.file_to_group_id.get(name), grouping.file_to_role.get(name)) {
                    (Some(group_id), Some(role)) => Self::matched(name.clone(), group_id.clone(), *role),
                    _ => Self::unmatched(name.clone()),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    total_files: usize,
    matched_files: usize,
    unmatched_files: usize,
    match_percentage: f64,
    role_counts: BTreeMap<Role, usize>,
    group_roles: BTreeMap<String, BTreeSet<Role>>,
    incomplete_groups: Vec<String>,
    errors: Vec<String>,
    has_errors: bool,
    has_warnings: bool,
}

impl PreviewSummary {
    pub fn new(outcomes: &[PreviewOutcome]) -> Self {
        let total_files = outcomes.len();
        let matched_files = outcomes.iter().filter(|o| o.matched).count();
        let unmatched_files = total_files - matched_files;
        let match_percentage = if total_files == 0 {
            0.0
        } else {
            matched_files as f64 * 100.0 / total_files as f64
        };

        let mut role_counts: BTreeMap<Role, usize> = Role::ALL.into_iter().map(|r| (r, 0)).collect();
        for role in outcomes.iter().filter_map(|o| o.role) {
            *role_counts.entry(role).or_default() += 1;
        }

        let mut group_roles: BTreeMap<String, BTreeSet<Role>> = BTreeMap::new();
        for outcome in outcomes.iter().filter(|o| o.matched) {
            let Some(group_id) = outcome.group_id.as_deref().filter(|g| !g.trim().is_empty()) else {
                continue;
            };
            let roles = group_roles.entry(group_id.to_string()).or_default();
            if let Some(role) = outcome.role {
                roles.insert(role);
            }
        }

        let incomplete_groups: Vec<String> = group_roles
            .iter()
            .filter(|(_, roles)| !roles.is_empty() && (!roles.contains(&Role::Front) || !roles.contains(&Role::Rear)))
            .map(|(id, _)| id.clone())
            .collect();

        let errors: Vec<String> = outcomes.iter().filter_map(|o| o.error.clone()).collect();
        let has_errors = !errors.is_empty();
        let has_warnings = !incomplete_groups.is_empty() || unmatched_files > 0;

        Self {
            total_files,
            matched_files,
            unmatched_files,
            match_percentage,
            role_counts,
            group_roles,
            incomplete_groups,
            errors,
            has_errors,
            has_warnings,
        }
    }

    pub fn from_grouping(grouping: &GroupingResult, filenames: &[String]) -> Self {
        Self::new(&PreviewOutcome::from_grouping(grouping, filenames))
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn matched_files(&self) -> usize {
        self.matched_files
    }

    pub fn unmatched_files(&self) -> usize {
        self.unmatched_files
    }

    pub fn match_percentage(&self) -> f64 {
        self.match_percentage
    }

    pub fn role_count(&self, role: Role) -> usize {
        self.role_counts.get(&role).copied().unwrap_or(0)
    }

    pub fn role_counts(&self) -> &BTreeMap<Role, usize> {
        &self.role_counts
    }

    pub fn group_roles(&self) -> &BTreeMap<String, BTreeSet<Role>> {
        &self.group_roles
    }

    pub fn group_count(&self) -> usize {
        self.group_roles.len()
    }

    pub fn incomplete_groups(&self) -> &[String] {
        &self.incomplete_groups
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn has_warnings(&self) -> bool {
        self.has_warnings
    }

    pub fn is_healthy(&self) -> bool {
        if self.has_errors {
            return false;
        }
        if self.total_files == 0 {
            return true;
        }
        if self.match_percentage < HEALTHY_MATCH_PERCENT {
            return false;
        }
        if self.group_roles.is_empty() {
            return true;
        }
        (self.incomplete_groups.len() as f64 / self.group_roles.len() as f64) < MAX_INCOMPLETE_GROUP_RATIO
    }
}
