//! Infer command - synthesize a group pattern from sample filenames
//!
//! Samples are tokenized, saved segment labels are applied, and the token
//! sequences of every sample are pooled by position before generation.

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_percentage, print_json, print_table};
use crate::cli::{filenames, load_optional_config};
use anyhow::Context;
use lineup_core::{
    generate_group_pattern, validate_group_pattern, DelimiterTokenizer, LineupConfig, Token, TokenType,
    Tokenizer,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug)]
pub struct InferArgs {
    pub files: Vec<String>,
    pub group_token: String,
    pub config: Option<PathBuf>,
    pub write: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct InferOutput {
    pub group_pattern: String,
    pub group_token: String,
    pub group_position: usize,
    pub samples: usize,
    /// Unknown segments without a saved decision
    pub pending_segments: Vec<String>,
    pub type_confidence: BTreeMap<TokenType, f64>,
    pub written: bool,
}

pub fn run(args: InferArgs) -> anyhow::Result<ExitCode> {
    // --write may create the configuration
    let mut config = match args.config.as_ref() {
        Some(path) if args.write && !path.exists() => LineupConfig::default(),
        path => load_optional_config(path)?,
    };
    let files = filenames(config.sample(&args.files));

    let registry = config.custom_token_registry();
    let handler = config.segment_handler();
    let analysis = DelimiterTokenizer::with_custom_tokens(&registry).tokenize(&files);

    let mut pooled: Vec<Token> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for name in &files {
        let Some(tokens) = analysis.tokens_for(name) else {
            continue;
        };
        for segment in handler.identify_unknown_segments(tokens) {
            if !pending.iter().any(|p| p.eq_ignore_ascii_case(&segment)) {
                pending.push(segment);
            }
        }
        pooled.extend(handler.apply_segment_labels(tokens));
    }

    let group_token = find_group_token(&pooled, &args.group_token)
        .ok_or_else(|| HelpfulError::group_token_not_found(&args.group_token, &candidates(&pooled)))?;

    let group_pattern = generate_group_pattern(&pooled, Some(&group_token))
        .map_err(|e| HelpfulError::pattern_generation_failed(&e.to_string()))?;
    info!(pattern = %group_pattern, samples = files.len(), "inferred group pattern");

    let written = if args.write {
        match args.config.as_ref() {
            Some(path) => {
                config.group_pattern = Some(group_pattern.clone());
                config.group_id_token = Some(group_token.value.clone());
                config
                    .save(path)
                    .with_context(|| format!("Failed to write configuration: {}", path.display()))?;
                info!(path = %path.display(), "saved group pattern");
                true
            }
            None => false,
        }
    } else {
        false
    };

    let output = InferOutput {
        group_pattern,
        group_token: group_token.value.clone(),
        group_position: group_token.position,
        samples: files.len(),
        pending_segments: pending,
        type_confidence: analysis.type_confidence(),
        written,
    };

    if args.json {
        print_json(&output)?;
        return Ok(ExitCode::SUCCESS);
    }

    print_human(&output);
    Ok(ExitCode::SUCCESS)
}

/// Exact match first, then case-insensitive
fn find_group_token(tokens: &[Token], value: &str) -> Option<Token> {
    tokens
        .iter()
        .find(|t| t.value == value)
        .or_else(|| tokens.iter().find(|t| t.value.eq_ignore_ascii_case(value)))
        .cloned()
}

/// Distinct segment values that could plausibly be the group ID
fn candidates(tokens: &[Token]) -> Vec<String> {
    let mut values: Vec<String> = tokens
        .iter()
        .filter(|t| matches!(t.suggested_type, TokenType::GroupId | TokenType::Index | TokenType::Unknown))
        .map(|t| t.value.clone())
        .collect();
    values.sort();
    values.dedup();
    values
}

fn print_human(output: &InferOutput) {
    println!("Group pattern: {}", output.group_pattern);
    println!(
        "Group token:   {} (position {}, {} sample(s))",
        output.group_token, output.group_position, output.samples
    );

    let verdict = validate_group_pattern(&output.group_pattern);
    for error in verdict.errors() {
        println!("  ERROR: {}", error);
    }

    let rows: Vec<Vec<String>> = output
        .type_confidence
        .iter()
        .map(|(token_type, confidence)| vec![token_type.to_string(), format_percentage(confidence * 100.0)])
        .collect();
    if !rows.is_empty() {
        println!();
        print_table(&["TYPE", "CONFIDENCE"], rows);
    }

    if !output.pending_segments.is_empty() {
        println!();
        println!("Unlabeled segments: {}", output.pending_segments.join(", "));
        println!("  TRY: Label them under [[segment_labels]] in the configuration");
    }

    if output.written {
        println!();
        println!("Saved group pattern to configuration.");
    }
}
