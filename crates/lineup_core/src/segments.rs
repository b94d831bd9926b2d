//! Unknown Segment Handler
//!
//! Stores the operator's decision for each segment the tokenizer could not
//! classify, and rewrites token sequences accordingly. Decisions are keyed
//! by lowercased segment text.

use crate::token::{Token, TokenType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

pub const CUSTOM_TOKEN_CONFIDENCE: f64 = 0.8;
pub const FREE_TEXT_CONFIDENCE: f64 = 0.9;

/// What to do with an unknown segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentAction {
    /// Drop the token
    Ignore,
    /// Treat as a literal suffix
    CustomToken,
    /// Keep as free text, with higher confidence
    FreeText,
}

impl SegmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignore => "IGNORE",
            Self::CustomToken => "CUSTOM_TOKEN",
            Self::FreeText => "FREE_TEXT",
        }
    }
}

/// Operator decision for one segment value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentLabel {
    pub value: String,
    pub action: SegmentAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
}

impl SegmentLabel {
    pub fn new(value: impl Into<String>, action: SegmentAction) -> Self {
        Self {
            value: value.into(),
            action,
            custom_label: None,
        }
    }

    pub fn with_custom_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }
}

/// Labeled vs. unlabeled unknown values across a token analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentSummary {
    pub labeled: BTreeSet<String>,
    pub unlabeled: BTreeSet<String>,
}

impl SegmentSummary {
    /// Number of segments still needing a decision
    pub fn pending(&self) -> usize {
        self.unlabeled.len()
    }

    pub fn is_complete(&self) -> bool {
        self.unlabeled.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnknownSegmentHandler {
    labels: HashMap<String, SegmentLabel>,
}

impl UnknownSegmentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: impl IntoIterator<Item = SegmentLabel>) -> Self {
        let mut handler = Self::new();
        for label in labels {
            handler.set_label(label);
        }
        handler
    }

    /// Record a decision, replacing any earlier one for the same value
    pub fn set_label(&mut self, label: SegmentLabel) {
        self.labels.insert(label.value.to_lowercase(), label);
    }

    pub fn remove_label(&mut self, value: &str) -> Option<SegmentLabel> {
        self.labels.remove(&value.to_lowercase())
    }

    pub fn label_for(&self, value: &str) -> Option<&SegmentLabel> {
        self.labels.get(&value.to_lowercase())
    }

    /// All decisions, ordered by value
    pub fn labels(&self) -> Vec<&SegmentLabel> {
        let mut labels: Vec<&SegmentLabel> = self.labels.values().collect();
        labels.sort_by(|a, b| a.value.to_lowercase().cmp(&b.value.to_lowercase()));
        labels
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Distinct UNKNOWN values without a decision, in first-occurrence order
    pub fn identify_unknown_segments(&self, tokens: &[Token]) -> Vec<String> {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .filter(|t| t.suggested_type == TokenType::Unknown)
            .filter(|t| self.label_for(&t.value).is_none())
            .filter(|t| seen.insert(t.value.to_lowercase()))
            .map(|t| t.value.clone())
            .collect()
    }

    /// Rewrite tokens per the stored decisions, then renumber densely from 0
    pub fn apply_segment_labels(&self, tokens: &[Token]) -> Vec<Token> {
        let mut output: Vec<Token> = Vec::with_capacity(tokens.len());

        for token in tokens {
            match self.label_for(&token.value).map(|l| l.action) {
                Some(SegmentAction::Ignore) => {
                    debug!(value = %token.value, "ignoring segment");
                }
                Some(SegmentAction::CustomToken) => {
                    output.push(token.clone().with_suggestion(TokenType::Suffix, CUSTOM_TOKEN_CONFIDENCE));
                }
                Some(SegmentAction::FreeText) => {
                    output.push(token.clone().with_suggestion(TokenType::Unknown, FREE_TEXT_CONFIDENCE));
                }
                None => output.push(token.clone()),
            }
        }

        for (position, token) in output.iter_mut().enumerate() {
            token.position = position;
        }
        output
    }

    /// Partition every UNKNOWN value (lowercased) by whether it has a decision
    pub fn unknown_segment_summary(&self, all_tokens: &BTreeMap<String, Vec<Token>>) -> SegmentSummary {
        let mut summary = SegmentSummary::default();
        for token in all_tokens.values().flatten() {
            if token.suggested_type != TokenType::Unknown {
                continue;
            }
            let key = token.value.to_lowercase();
            if self.labels.contains_key(&key) {
                summary.labeled.insert(key);
            } else {
                summary.unlabeled.insert(key);
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<Token> {
        vec![
            Token::new("car", 0, TokenType::Prefix, 0.9),
            Token::new("x7", 1, TokenType::Unknown, 0.2),
            Token::new("A1", 2, TokenType::GroupId, 0.8),
            Token::new("X7", 3, TokenType::Unknown, 0.2),
            Token::new("cam", 4, TokenType::Unknown, 0.2),
            Token::new("jpg", 5, TokenType::Extension, 1.0),
        ]
    }

    #[test]
    fn test_identify_distinct_in_order() {
        let handler = UnknownSegmentHandler::new();
        assert_eq!(handler.identify_unknown_segments(&tokens()), vec!["x7", "cam"]);

        let handler = UnknownSegmentHandler::with_labels([SegmentLabel::new("CAM", SegmentAction::FreeText)]);
        assert_eq!(handler.identify_unknown_segments(&tokens()), vec!["x7"]);
    }

    #[test]
    fn test_ignore_removes_all_and_renumbers() {
        let handler = UnknownSegmentHandler::with_labels([SegmentLabel::new("x7", SegmentAction::Ignore)]);
        let output = handler.apply_segment_labels(&tokens());

        assert!(output.iter().all(|t| t.value.to_lowercase() != "x7"));
        let positions: Vec<usize> = output.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(output[1].value, "A1");
    }

    #[test]
    fn test_custom_and_free_text() {
        let handler = UnknownSegmentHandler::with_labels([
            SegmentLabel::new("cam", SegmentAction::CustomToken).with_custom_label("camera"),
            SegmentLabel::new("x7", SegmentAction::FreeText),
        ]);
        let output = handler.apply_segment_labels(&tokens());

        let cam = output.iter().find(|t| t.value == "cam").unwrap();
        assert_eq!(cam.suggested_type, TokenType::Suffix);
        assert_eq!(cam.confidence(), CUSTOM_TOKEN_CONFIDENCE);

        let x7 = output.iter().find(|t| t.value == "x7").unwrap();
        assert_eq!(x7.suggested_type, TokenType::Unknown);
        assert_eq!(x7.confidence(), FREE_TEXT_CONFIDENCE);

        let car = output.iter().find(|t| t.value == "car").unwrap();
        assert_eq!(car.confidence(), 0.9);
    }

    #[test]
    fn test_summary_partitions_values() {
        let mut all = BTreeMap::new();
        all.insert("a.jpg".to_string(), tokens());
        all.insert("b.jpg".to_string(), vec![Token::new("Misc", 0, TokenType::Unknown, 0.1)]);

        let handler = UnknownSegmentHandler::with_labels([SegmentLabel::new("X7", SegmentAction::Ignore)]);
        let summary = handler.unknown_segment_summary(&all);

        assert_eq!(summary.labeled.iter().collect::<Vec<_>>(), vec!["x7"]);
        assert_eq!(summary.unlabeled.iter().collect::<Vec<_>>(), vec!["cam", "misc"]);
        assert_eq!(summary.pending(), 2);
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_labels_replace_and_remove() {
        let mut handler = UnknownSegmentHandler::new();
        handler.set_label(SegmentLabel::new("Cam", SegmentAction::Ignore));
        handler.set_label(SegmentLabel::new("cam", SegmentAction::FreeText));
        assert_eq!(handler.labels().len(), 1);
        assert_eq!(handler.label_for("CAM").unwrap().action, SegmentAction::FreeText);
        assert!(handler.remove_label("cAm").is_some());
        assert!(handler.labels().is_empty());
    }
}
