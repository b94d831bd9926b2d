//! Validation taxonomy
//!
//! Errors block use of a configuration, warnings are advisory. Both are
//! closed enums so every kind has a default message checked at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Kinds
// ============================================================================

/// Blocking problem kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NoGroupIdSelected,
    InvalidGroupPattern,
    NoRoleRulesDefined,
    NoFilesMatched,
    IncompleteGroups,
    RegexSyntaxError,
    EmptyGroupPattern,
    NoRolePatterns,
    InvalidRuleValue,
    MultipleCapturingGroups,
    NoCapturingGroups,
    InvalidRuleConfiguration,
    InvalidRegexPattern,
}

impl ErrorKind {
    /// Wire name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoGroupIdSelected => "NO_GROUP_ID_SELECTED",
            Self::InvalidGroupPattern => "INVALID_GROUP_PATTERN",
            Self::NoRoleRulesDefined => "NO_ROLE_RULES_DEFINED",
            Self::NoFilesMatched => "NO_FILES_MATCHED",
            Self::IncompleteGroups => "INCOMPLETE_GROUPS",
            Self::RegexSyntaxError => "REGEX_SYNTAX_ERROR",
            Self::EmptyGroupPattern => "EMPTY_GROUP_PATTERN",
            Self::NoRolePatterns => "NO_ROLE_PATTERNS",
            Self::InvalidRuleValue => "INVALID_RULE_VALUE",
            Self::MultipleCapturingGroups => "MULTIPLE_CAPTURING_GROUPS",
            Self::NoCapturingGroups => "NO_CAPTURING_GROUPS",
            Self::InvalidRuleConfiguration => "INVALID_RULE_CONFIGURATION",
            Self::InvalidRegexPattern => "INVALID_REGEX_PATTERN",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NoGroupIdSelected => "No group ID token has been selected",
            Self::InvalidGroupPattern => "The group pattern is invalid",
            Self::NoRoleRulesDefined => "No role rules are defined",
            Self::NoFilesMatched => "No files matched the group pattern",
            Self::IncompleteGroups => "Some groups are missing required roles",
            Self::RegexSyntaxError => "A pattern has invalid regular expression syntax",
            Self::EmptyGroupPattern => "The group pattern is empty",
            Self::NoRolePatterns => "No role patterns are defined for FRONT, REAR or OVERVIEW",
            Self::InvalidRuleValue => "A role rule has an empty value",
            Self::MultipleCapturingGroups => "The group pattern has more than one capturing group",
            Self::NoCapturingGroups => "The group pattern has no capturing group for the group ID",
            Self::InvalidRuleConfiguration => "A role rule is configured incorrectly",
            Self::InvalidRegexPattern => "A regular expression could not be compiled",
        }
    }
}

/// Advisory problem kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    UnmatchedFiles,
    IncompleteGroupCoverage,
    OverlappingRules,
    RestrictivePattern,
    PermissivePattern,
    CaseSensitivityWarning,
    ComplexRegex,
    NoOverviewImages,
    UnbalancedGroups,
    ExtensionMismatch,
    EmptyRuleValue,
    MissingRoleRules,
    NoSampleFiles,
    LowMatchRate,
    IncompleteGroups,
}

impl WarningKind {
    /// Wire name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnmatchedFiles => "UNMATCHED_FILES",
            Self::IncompleteGroupCoverage => "INCOMPLETE_GROUP_COVERAGE",
            Self::OverlappingRules => "OVERLAPPING_RULES",
            Self::RestrictivePattern => "RESTRICTIVE_PATTERN",
            Self::PermissivePattern => "PERMISSIVE_PATTERN",
            Self::CaseSensitivityWarning => "CASE_SENSITIVITY_WARNING",
            Self::ComplexRegex => "COMPLEX_REGEX",
            Self::NoOverviewImages => "NO_OVERVIEW_IMAGES",
            Self::UnbalancedGroups => "UNBALANCED_GROUPS",
            Self::ExtensionMismatch => "EXTENSION_MISMATCH",
            Self::EmptyRuleValue => "EMPTY_RULE_VALUE",
            Self::MissingRoleRules => "MISSING_ROLE_RULES",
            Self::NoSampleFiles => "NO_SAMPLE_FILES",
            Self::LowMatchRate => "LOW_MATCH_RATE",
            Self::IncompleteGroups => "INCOMPLETE_GROUPS",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::UnmatchedFiles => "Some files did not match the configured patterns",
            Self::IncompleteGroupCoverage => "Not every group has every role covered",
            Self::OverlappingRules => "Rules for different roles overlap",
            Self::RestrictivePattern => "The group pattern may be too restrictive",
            Self::PermissivePattern => "The group pattern may be too permissive",
            Self::CaseSensitivityWarning => "A case-sensitive rule may miss files with different casing",
            Self::ComplexRegex => "A regular expression is complex and may be slow or hard to maintain",
            Self::NoOverviewImages => "No overview pattern is defined; overview images will not be identified",
            Self::UnbalancedGroups => "Group sizes vary widely",
            Self::ExtensionMismatch => "Matched files use more than one file extension",
            Self::EmptyRuleValue => "A rule has an empty value and will never match",
            Self::MissingRoleRules => "A role has no rules",
            Self::NoSampleFiles => "No sample files were provided for testing",
            Self::LowMatchRate => "Less than 80% of the sample files matched",
            Self::IncompleteGroups => "Some groups are missing FRONT or REAR images",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// A blocking problem with an optional context string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} ({})", self.message, context),
            None => write!(f, "{}", self.message),
        }
    }
}

/// An advisory problem with an optional context string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ValidationWarning {
    pub fn new(kind: WarningKind) -> Self {
        Self::with_message(kind, kind.default_message())
    }

    pub fn with_message(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} ({})", self.message, context),
            None => write!(f, "{}", self.message),
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of a validation pass
///
/// `valid` always equals `errors.is_empty()`; the fields are private so
/// that cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Empty successful result; the identity for [`ValidationResult::combine`]
    pub fn success() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self::from_parts(errors, Vec::new())
    }

    pub fn from_error(error: ValidationError) -> Self {
        Self::failure(vec![error])
    }

    pub fn from_warning(warning: ValidationWarning) -> Self {
        Self::from_parts(Vec::new(), vec![warning])
    }

    pub fn from_parts(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.valid = false;
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Concatenate both lists; validity is the AND of both sides
    pub fn combine(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.valid && other.valid;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_error(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn into_parts(self) -> (Vec<ValidationError>, Vec<ValidationWarning>) {
        (self.errors, self.warnings)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::success(), Self::combine)
    }
}

impl<'de> Deserialize<'de> for ValidationResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // `valid` is recomputed rather than trusted
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            errors: Vec<ValidationError>,
            #[serde(default)]
            warnings: Vec<ValidationWarning>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::from_parts(raw.errors, raw.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages_are_used() {
        let error = ValidationError::new(ErrorKind::EmptyGroupPattern);
        assert_eq!(error.message, ErrorKind::EmptyGroupPattern.default_message());
        assert!(error.context.is_none());

        let warning = ValidationWarning::new(WarningKind::NoOverviewImages).with_context("overview");
        assert_eq!(warning.to_string(), format!("{} (overview)", WarningKind::NoOverviewImages.default_message()));
    }

    #[test]
    fn test_wire_names_match_serde() {
        for kind in [ErrorKind::NoGroupIdSelected, ErrorKind::MultipleCapturingGroups, ErrorKind::InvalidRegexPattern] {
            assert_eq!(serde_json::to_value(kind).unwrap(), serde_json::json!(kind.as_str()));
        }
        for kind in [WarningKind::CaseSensitivityWarning, WarningKind::LowMatchRate, WarningKind::IncompleteGroups] {
            assert_eq!(serde_json::to_value(kind).unwrap(), serde_json::json!(kind.to_string()));
        }
    }

    #[test]
    fn test_validity_tracks_errors() {
        let mut result = ValidationResult::success();
        assert!(result.is_valid());

        result.add_warning(ValidationWarning::new(WarningKind::LowMatchRate));
        assert!(result.is_valid());
        assert!(result.has_warnings());

        result.add_error(ValidationError::new(ErrorKind::NoFilesMatched));
        assert!(!result.is_valid());
        assert!(result.has_error(ErrorKind::NoFilesMatched));
    }

    #[test]
    fn test_combine_concatenates_in_order() {
        let a = ValidationResult::from_error(ValidationError::new(ErrorKind::NoRolePatterns));
        let b = ValidationResult::from_parts(
            vec![ValidationError::new(ErrorKind::InvalidRuleValue)],
            vec![ValidationWarning::new(WarningKind::OverlappingRules)],
        );

        let combined = a.combine(b);
        assert!(!combined.is_valid());
        let kinds: Vec<ErrorKind> = combined.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::NoRolePatterns, ErrorKind::InvalidRuleValue]);
        assert_eq!(combined.warnings().len(), 1);
    }

    #[test]
    fn test_identity() {
        let a = ValidationResult::from_warning(ValidationWarning::new(WarningKind::UnmatchedFiles));
        assert_eq!(a.clone().combine(ValidationResult::success()), a);
        assert_eq!(ValidationResult::success().combine(a.clone()), a);
    }

    #[test]
    fn test_collect_results() {
        let combined: ValidationResult = vec![
            ValidationResult::success(),
            ValidationResult::from_error(ValidationError::new(ErrorKind::NoCapturingGroups)),
        ]
        .into_iter()
        .collect();
        assert!(!combined.is_valid());
    }

    #[test]
    fn test_json_round_trip_recomputes_validity() {
        let json = r#"{"valid": true, "errors": [{"kind": "NO_FILES_MATCHED", "message": "m"}], "warnings": []}"#;
        let result: ValidationResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].kind, ErrorKind::NoFilesMatched);
    }
}
