//! Lineup - vehicle photo grouping
//!
//! Infers a grouping pattern from the filenames of vehicle photos, then sorts
//! each photo into a group (one vehicle) and a role within it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Tokenizer  │     │   Segment   │     │   Pattern   │     │  Grouping   │
//! │ (filename → │────▶│   Handler   │────▶│  Generator  │────▶│   Engine    │
//! │   tokens)   │     │  (labels)   │     │  (regex)    │     │ (id + role) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │                   │
//!                                                ▼                   ▼
//!                                           Validation        Preview Summary
//! ```
//!
//! # Core Concepts
//!
//! - **Token**: A typed segment of one filename
//! - **Group pattern**: Anchored regex whose single capture is the group ID
//! - **RoleRule**: Condition assigning FRONT, REAR or OVERVIEW to a file
//! - **ValidationResult**: Errors and warnings, never exceptions

pub mod config;
pub mod error;
pub mod grouping;
pub mod pattern;
pub mod preview;
pub mod segments;
pub mod token;
pub mod tokenizer;
pub mod validation;

// Re-exports for convenience
pub use config::LineupConfig;
pub use error::{LineupError, Result};
pub use grouping::{group_and_assign_roles, matches_rule, validate_group_pattern, GroupingResult};
pub use pattern::{
    count_capturing_groups, generate_group_pattern, generate_role_pattern, lint_rules,
    validate_against_samples, validate_patterns, PatternConfiguration,
};
pub use preview::{PreviewOutcome, PreviewSummary};
pub use segments::{SegmentAction, SegmentLabel, SegmentSummary, UnknownSegmentHandler};
pub use token::{Role, RoleRule, RuleType, Token, TokenType};
pub use tokenizer::{
    CustomToken, CustomTokenLookup, CustomTokenRegistry, DelimiterTokenizer, TokenAnalysis, Tokenizer,
};
pub use validation::{
    ErrorKind, ValidationError, ValidationResult, ValidationWarning, WarningKind,
};
