//! Pattern generation and validation
//!
//! ## Flow
//!
//! ```text
//! tokens + chosen group token
//!     │
//!     ▼
//! generate_group_pattern ──▶ ^prefix[_\-.\s]+(group)[_\-.\s]+...$
//!     │
//!     ▼
//! PatternConfiguration ──▶ validate_patterns / validate_against_samples
//! ```

pub mod capture;
pub mod generator;
pub mod validator;

pub use capture::{count_capturing_groups, has_quantifier};
pub use generator::{generate_group_pattern, generate_role_pattern, rule_pattern, DELIMITER_PATTERN};
pub use validator::{lint_rules, validate_against_samples, validate_patterns, PatternConfiguration};
