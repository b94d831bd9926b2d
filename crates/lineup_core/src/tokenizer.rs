//! Tokenizer boundary
//!
//! The grouping engine only consumes tokens; where they come from is
//! pluggable. `DelimiterTokenizer` is the built-in implementation: it splits
//! on filename delimiters and types each segment with anchored regexes.
//!
//! Custom tokens let the operator pin a type to known example values
//! (e.g. `LOT7` is always the group ID). They are consulted first.

use crate::pattern::generator::camera_side_role;
use crate::token::{Token, TokenType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// ============================================================================
// Classification confidences
// ============================================================================

pub const CUSTOM_MATCH_CONFIDENCE: f64 = 1.0;
pub const EXTENSION_CONFIDENCE: f64 = 1.0;
pub const DATE_CONFIDENCE: f64 = 0.9;
pub const CAMERA_SIDE_CONFIDENCE: f64 = 0.85;
pub const PREFIX_CONFIDENCE: f64 = 0.8;
pub const GROUP_ID_CONFIDENCE: f64 = 0.7;
pub const INDEX_CONFIDENCE: f64 = 0.6;
pub const UNKNOWN_CONFIDENCE: f64 = 0.3;

/// One stem segment: a dashed date, or a run of non-delimiters
static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}|\d{2}-\d{2}-\d{4}|[^_\-.\s]+").expect("valid segment regex"));

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{4}-\d{2}-\d{2}|\d{2}-\d{2}-\d{4}|\d{8})$").expect("valid date regex"));

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid digits regex"));

static ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid alpha regex"));

/// Letters and digits, at least one of each
static ALNUM_WITH_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]*(?:[A-Za-z][A-Za-z0-9]*\d|\d[A-Za-z0-9]*[A-Za-z])[A-Za-z0-9]*$").expect("valid alphanumeric regex"));

static EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,5}$").expect("valid extension regex"));

// ============================================================================
// Custom tokens
// ============================================================================

/// Operator-defined token type, matched by example value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomToken {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mapped_type: TokenType,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl CustomToken {
    pub fn new(name: impl Into<String>, mapped_type: TokenType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            mapped_type,
            examples: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }
}

/// Source of operator-pinned token types
pub trait CustomTokenLookup {
    fn lookup(&self, value: &str) -> Option<TokenType>;
}

/// In-memory lookup over `CustomToken` examples, case-insensitive
///
/// When two tokens share an example, the one registered first wins.
#[derive(Debug, Clone, Default)]
pub struct CustomTokenRegistry {
    tokens: Vec<CustomToken>,
    by_example: HashMap<String, TokenType>,
}

impl CustomTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = CustomToken>) -> Self {
        let mut registry = Self::new();
        for token in tokens {
            registry.register(token);
        }
        registry
    }

    pub fn register(&mut self, token: CustomToken) {
        for example in &token.examples {
            let key = example.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            self.by_example.entry(key).or_insert(token.mapped_type);
        }
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[CustomToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl CustomTokenLookup for CustomTokenRegistry {
    fn lookup(&self, value: &str) -> Option<TokenType> {
        self.by_example.get(&value.trim().to_lowercase()).copied()
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Token sequences for a batch of filenames
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenAnalysis {
    pub tokens: BTreeMap<String, Vec<Token>>,
}

impl TokenAnalysis {
    pub fn tokens_for(&self, filename: &str) -> Option<&[Token]> {
        self.tokens.get(filename).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Mean confidence per token type, over every token in the analysis
    pub fn type_confidence(&self) -> BTreeMap<TokenType, f64> {
        let mut sums: BTreeMap<TokenType, (f64, usize)> = BTreeMap::new();
        for token in self.tokens.values().flatten() {
            let entry = sums.entry(token.suggested_type).or_insert((0.0, 0));
            entry.0 += token.confidence();
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(token_type, (sum, count))| (token_type, sum / count as f64))
            .collect()
    }
}

pub trait Tokenizer {
    fn tokenize(&self, filenames: &[String]) -> TokenAnalysis;
}

/// Splits on `_`, `-`, `.` and whitespace; dashed dates stay whole
#[derive(Default)]
pub struct DelimiterTokenizer<'a> {
    custom: Option<&'a dyn CustomTokenLookup>,
}

impl<'a> DelimiterTokenizer<'a> {
    pub fn new() -> Self {
        Self { custom: None }
    }

    pub fn with_custom_tokens(custom: &'a dyn CustomTokenLookup) -> Self {
        Self { custom: Some(custom) }
    }

    /// Tokens for a single filename, positions dense from 0
    pub fn tokenize_one(&self, filename: &str) -> Vec<Token> {
        let (stem, extension) = split_extension(filename);

        let mut tokens = Vec::new();
        let mut seen_prefix = false;
        for segment in SEGMENT.find_iter(stem).map(|m| m.as_str()) {
            let (token_type, confidence) = self.classify(segment, &mut seen_prefix);
            tokens.push(Token::new(segment, tokens.len(), token_type, confidence));
        }
        if let Some(ext) = extension {
            tokens.push(Token::new(ext, tokens.len(), TokenType::Extension, EXTENSION_CONFIDENCE));
        }
        tokens
    }

    fn classify(&self, segment: &str, seen_prefix: &mut bool) -> (TokenType, f64) {
        if let Some(token_type) = self.custom.and_then(|c| c.lookup(segment)) {
            debug!(segment, %token_type, "custom token match");
            if token_type == TokenType::Prefix {
                *seen_prefix = true;
            }
            return (token_type, CUSTOM_MATCH_CONFIDENCE);
        }

        if DATE.is_match(segment) {
            (TokenType::Date, DATE_CONFIDENCE)
        } else if camera_side_role(segment).is_some() {
            (TokenType::CameraSide, CAMERA_SIDE_CONFIDENCE)
        } else if DIGITS.is_match(segment) {
            (TokenType::Index, INDEX_CONFIDENCE)
        } else if ALNUM_WITH_DIGIT.is_match(segment) {
            (TokenType::GroupId, GROUP_ID_CONFIDENCE)
        } else if !*seen_prefix && ALPHA.is_match(segment) {
            *seen_prefix = true;
            (TokenType::Prefix, PREFIX_CONFIDENCE)
        } else {
            (TokenType::Unknown, UNKNOWN_CONFIDENCE)
        }
    }
}

impl Tokenizer for DelimiterTokenizer<'_> {
    fn tokenize(&self, filenames: &[String]) -> TokenAnalysis {
        let tokens: BTreeMap<String, Vec<Token>> = filenames
            .iter()
            .map(|name| (name.clone(), self.tokenize_one(name)))
            .collect();
        debug!(files = tokens.len(), "tokenized filenames");
        TokenAnalysis { tokens }
    }
}

/// Stem and extension; a trailing dot segment counts only if it looks like one
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && EXTENSION.is_match(ext) => (stem, Some(ext)),
        _ => (filename, None),
    }
}
