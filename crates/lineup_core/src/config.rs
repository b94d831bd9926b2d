//! Project configuration
//!
//! One TOML file per photo set: the chosen patterns, role rules and the
//! operator's segment and custom-token decisions.

use crate::error::{LineupError, Result};
use crate::pattern::generator::generate_role_pattern;
use crate::pattern::validator::PatternConfiguration;
use crate::segments::{SegmentLabel, UnknownSegmentHandler};
use crate::token::{Role, RoleRule, RuleType};
use crate::tokenizer::{CustomToken, CustomTokenRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupConfig {
    /// Group-extraction regex with exactly one capturing group
    #[serde(default)]
    pub group_pattern: Option<String>,

    /// Value of the token picked as group ID
    #[serde(default)]
    pub group_id_token: Option<String>,

    /// Role patterns; derived from `role_rules` when absent
    #[serde(default)]
    pub front_pattern: Option<String>,
    #[serde(default)]
    pub rear_pattern: Option<String>,
    #[serde(default)]
    pub overview_pattern: Option<String>,

    /// Upper bound on filenames fed to the engine per run
    #[serde(default = "default_max_sample_files")]
    pub max_sample_files: usize,

    #[serde(default)]
    pub role_rules: Vec<RoleRule>,

    /// Persisted unknown-segment decisions
    #[serde(default)]
    pub segment_labels: Vec<SegmentLabel>,

    #[serde(default)]
    pub custom_tokens: Vec<CustomToken>,
}

fn default_max_sample_files() -> usize {
    500
}

impl Default for LineupConfig {
    fn default() -> Self {
        Self {
            group_pattern: None,
            group_id_token: None,
            front_pattern: None,
            rear_pattern: None,
            overview_pattern: None,
            max_sample_files: default_max_sample_files(),
            role_rules: Vec::new(),
            segment_labels: Vec::new(),
            custom_tokens: Vec::new(),
        }
    }
}

impl LineupConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LineupConfig =
            toml::from_str(&content).map_err(|e| LineupError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| LineupError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Immutable snapshot for validation; explicit role patterns win
    ///
    /// The snapshot carries [`Self::effective_rules`], so sample validation
    /// groups files with the same rules as the `group` command.
    pub fn pattern_configuration(&self) -> PatternConfiguration {
        let role_pattern = |explicit: &Option<String>, role: Role| {
            explicit
                .clone()
                .filter(|p| !p.trim().is_empty())
                .or_else(|| Some(generate_role_pattern(&self.role_rules, role)).filter(|p| !p.is_empty()))
        };
        PatternConfiguration {
            group_pattern: self.group_pattern.clone(),
            group_id_token: self.group_id_token.clone(),
            front_pattern: role_pattern(&self.front_pattern, Role::Front),
            rear_pattern: role_pattern(&self.rear_pattern, Role::Rear),
            overview_pattern: role_pattern(&self.overview_pattern, Role::Overview),
            role_rules: self.effective_rules(),
        }
    }

    /// Rules for the grouping engine: explicit role patterns become overrides
    /// evaluated ahead of the configured rules
    pub fn effective_rules(&self) -> Vec<RoleRule> {
        let explicit = [
            (Role::Front, &self.front_pattern),
            (Role::Rear, &self.rear_pattern),
            (Role::Overview, &self.overview_pattern),
        ];
        let mut rules: Vec<RoleRule> = explicit
            .into_iter()
            .filter_map(|(role, pattern)| {
                let pattern = pattern.as_deref().filter(|p| !p.trim().is_empty())?;
                Some(RoleRule::new(role, RuleType::RegexOverride, pattern).with_priority(i32::MIN))
            })
            .collect();
        rules.extend(self.role_rules.iter().cloned());
        rules
    }

    pub fn segment_handler(&self) -> UnknownSegmentHandler {
        UnknownSegmentHandler::with_labels(self.segment_labels.iter().cloned())
    }

    pub fn custom_token_registry(&self) -> CustomTokenRegistry {
        CustomTokenRegistry::from_tokens(self.custom_tokens.iter().cloned())
    }

    /// The first `max_sample_files` filenames
    pub fn sample<'a>(&self, filenames: &'a [String]) -> &'a [String] {
        &filenames[..filenames.len().min(self.max_sample_files)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentAction;
    use crate::token::TokenType;
    use tempfile::TempDir;

    fn sample_config() -> LineupConfig {
        LineupConfig {
            group_pattern: Some(r"^car_([A-Za-z0-9]+)_\w+\.jpg$".to_string()),
            group_id_token: Some("ABC123".to_string()),
            overview_pattern: Some("(?i)scene".to_string()),
            role_rules: vec![
                RoleRule::new(Role::Front, RuleType::Contains, "front"),
                RoleRule::new(Role::Rear, RuleType::EndsWith, "_r.jpg").with_priority(2),
            ],
            segment_labels: vec![SegmentLabel::new("tmp", SegmentAction::Ignore)],
            custom_tokens: vec![CustomToken::new("lot", TokenType::GroupId).with_examples(["LOT7"])],
            ..LineupConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = LineupConfig::default();
        assert_eq!(config.max_sample_files, 500);
        assert!(config.group_pattern.is_none());
        assert!(config.role_rules.is_empty());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: LineupConfig = toml::from_str("group_pattern = '^(x)$'").unwrap();
        assert_eq!(config.max_sample_files, 500);
        assert_eq!(config.group_pattern.as_deref(), Some("^(x)$"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lineup.toml");

        let config = sample_config();
        config.save(&path).unwrap();
        let loaded = LineupConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "role_rules = 7").unwrap();

        let err = LineupConfig::load(&path).unwrap_err();
        assert!(matches!(err, LineupError::Config(_)));
    }

    #[test]
    fn test_pattern_configuration_derives_missing_roles() {
        let patterns = sample_config().pattern_configuration();
        assert_eq!(patterns.front_pattern.as_deref(), Some("(?i:front)"));
        assert!(patterns.rear_pattern.is_some());
        assert_eq!(patterns.overview_pattern.as_deref(), Some("(?i)scene"));
        assert_eq!(patterns.role_rules, sample_config().effective_rules());
    }

    #[test]
    fn test_explicit_patterns_drive_sample_grouping() {
        let config = LineupConfig {
            group_pattern: Some(r"^car_([A-Za-z0-9]+)_\w+\.jpg$".to_string()),
            group_id_token: Some("A1".to_string()),
            front_pattern: Some("front".to_string()),
            rear_pattern: Some("rear".to_string()),
            ..LineupConfig::default()
        };
        let files = vec!["car_A1_front.jpg".to_string(), "car_A1_rear.jpg".to_string()];

        let patterns = config.pattern_configuration();
        assert!(crate::validate_patterns(&patterns).is_valid());

        let grouped = crate::group_and_assign_roles(&files, r"^car_([A-Za-z0-9]+)_\w+\.jpg$", &config.effective_rules(), None);
        assert_eq!(grouped.file_to_role.len(), 2);

        let samples = crate::validate_against_samples(&patterns, &files);
        assert!(samples.is_valid(), "{:?}", samples.errors());
        assert!(!samples.has_error(crate::ErrorKind::NoFilesMatched));
    }

    #[test]
    fn test_effective_rules_put_explicit_patterns_first() {
        let rules = sample_config().effective_rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].target_role, Role::Overview);
        assert_eq!(rules[0].rule_type, RuleType::RegexOverride);
        assert_eq!(rules[0].rule_value, "(?i)scene");
        assert_eq!(rules[1].target_role, Role::Front);
    }

    #[test]
    fn test_handlers_from_config() {
        let config = sample_config();
        assert!(config.segment_handler().label_for("TMP").is_some());
        assert_eq!(config.custom_token_registry().len(), 1);
    }

    #[test]
    fn test_sample_caps_input() {
        let config = LineupConfig {
            max_sample_files: 2,
            ..LineupConfig::default()
        };
        let files: Vec<String> = (0..5).map(|i| format!("f{}.jpg", i)).collect();
        assert_eq!(config.sample(&files).len(), 2);
        assert_eq!(config.sample(&files[..1]).len(), 1);
    }
}
