//! Core value types shared by every Lineup component
//!
//! Tokens come out of the tokenizer, rules come from the operator.
//! Nothing in here carries logic beyond construction and display.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Token Types
// ============================================================================

/// What a filename segment is believed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Prefix,
    Suffix,
    GroupId,
    CameraSide,
    Date,
    Index,
    Extension,
    Unknown,
}

impl TokenType {
    pub const ALL: [TokenType; 8] = [
        TokenType::Prefix,
        TokenType::Suffix,
        TokenType::GroupId,
        TokenType::CameraSide,
        TokenType::Date,
        TokenType::Index,
        TokenType::Extension,
        TokenType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "PREFIX",
            Self::Suffix => "SUFFIX",
            Self::GroupId => "GROUP_ID",
            Self::CameraSide => "CAMERA_SIDE",
            Self::Date => "DATE",
            Self::Index => "INDEX",
            Self::Extension => "EXTENSION",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed segment of one filename
///
/// `position` is 0-based and dense within a single filename's sequence.
/// Only `suggested_type` and `confidence` change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub value: String,
    pub position: usize,
    pub suggested_type: TokenType,
    confidence: f64,
}

impl Token {
    pub fn new(value: impl Into<String>, position: usize, suggested_type: TokenType, confidence: f64) -> Self {
        Self {
            value: value.into(),
            position,
            suggested_type,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Overwrite the suggestion during an enhancement pass
    pub fn set_suggestion(&mut self, suggested_type: TokenType, confidence: f64) {
        self.suggested_type = suggested_type;
        self.confidence = clamp_confidence(confidence);
    }

    pub fn with_suggestion(mut self, suggested_type: TokenType, confidence: f64) -> Self {
        self.set_suggestion(suggested_type, confidence);
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Role of an image within a vehicle group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Front,
    Rear,
    Overview,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Front, Role::Rear, Role::Overview];

    /// Order in which roles claim files inside a group
    pub const PRECEDENCE: [Role; 3] = [Role::Overview, Role::Front, Role::Rear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "FRONT",
            Self::Rear => "REAR",
            Self::Overview => "OVERVIEW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|r| r.as_str() == upper)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Role Rules
// ============================================================================

/// How a rule value is compared against a filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    RegexOverride,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::RegexOverride => "REGEX_OVERRIDE",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator-defined rule assigning a role to matching filenames
///
/// Lower `priority` is evaluated first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRule {
    pub target_role: Role,
    pub rule_type: RuleType,
    pub rule_value: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub priority: i32,
}

impl RoleRule {
    pub fn new(target_role: Role, rule_type: RuleType, rule_value: impl Into<String>) -> Self {
        Self {
            target_role,
            rule_type,
            rule_value: rule_value.into(),
            case_sensitive: false,
            priority: 0,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Blank values never match and never produce a pattern
    pub fn is_blank(&self) -> bool {
        self.rule_value.trim().is_empty()
    }
}

impl fmt::Display for RoleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.target_role, self.rule_type, self.rule_value)
    }
}
