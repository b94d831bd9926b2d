//! Segments command - list unknown filename segments

use crate::cli::output::{print_json, print_table_colored};
use crate::cli::{filenames, load_optional_config};
use comfy_table::Color;
use lineup_core::{DelimiterTokenizer, SegmentSummary, TokenType, Tokenizer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug)]
pub struct SegmentsArgs {
    pub files: Vec<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct SegmentRow {
    pub value: String,
    /// Number of sample files containing the segment
    pub files: usize,
    pub labeled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SegmentsOutput {
    pub segments: Vec<SegmentRow>,
    pub pending: usize,
    pub complete: bool,
}

pub fn run(args: SegmentsArgs) -> anyhow::Result<ExitCode> {
    let config = load_optional_config(args.config.as_ref())?;
    let files = filenames(config.sample(&args.files));

    let registry = config.custom_token_registry();
    let handler = config.segment_handler();
    let analysis = DelimiterTokenizer::with_custom_tokens(&registry).tokenize(&files);
    let summary = handler.unknown_segment_summary(&analysis.tokens);

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for tokens in analysis.tokens.values() {
        let mut values: Vec<String> = tokens
            .iter()
            .filter(|t| t.suggested_type == TokenType::Unknown)
            .map(|t| t.value.to_lowercase())
            .collect();
        values.sort();
        values.dedup();
        for value in values {
            *counts.entry(value).or_default() += 1;
        }
    }

    let output = SegmentsOutput {
        segments: rows(&summary, &counts, |value| {
            handler.label_for(value).map(|l| l.action.as_str().to_string())
        }),
        pending: summary.pending(),
        complete: summary.is_complete(),
    };

    if args.json {
        print_json(&output)?;
        return Ok(ExitCode::SUCCESS);
    }

    if output.segments.is_empty() {
        println!("No unknown segments.");
        return Ok(ExitCode::SUCCESS);
    }

    let table_rows = output
        .segments
        .iter()
        .map(|row| {
            let (status, color) = match &row.action {
                Some(action) => (action.clone(), Some(Color::Green)),
                None => ("PENDING".to_string(), Some(Color::Yellow)),
            };
            vec![(row.value.clone(), None), (row.files.to_string(), None), (status, color)]
        })
        .collect();
    print_table_colored(&["SEGMENT", "FILES", "STATUS"], table_rows);
    println!();
    println!("{} segment(s) still need a decision", output.pending);

    Ok(ExitCode::SUCCESS)
}

/// Unlabeled segments first, each part alphabetical
fn rows(
    summary: &SegmentSummary,
    counts: &BTreeMap<String, usize>,
    action_for: impl Fn(&str) -> Option<String>,
) -> Vec<SegmentRow> {
    let unlabeled = summary.unlabeled.iter().map(|v| (v, false));
    let labeled = summary.labeled.iter().map(|v| (v, true));
    unlabeled
        .chain(labeled)
        .map(|(value, labeled)| SegmentRow {
            value: value.clone(),
            files: counts.get(value).copied().unwrap_or(0),
            labeled,
            action: if labeled { action_for(value) } else { None },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_put_pending_first() {
        let mut summary = SegmentSummary::default();
        summary.labeled.insert("tmp".to_string());
        summary.unlabeled.insert("zz".to_string());
        summary.unlabeled.insert("blue".to_string());
        let counts: BTreeMap<String, usize> = [("tmp".to_string(), 3), ("blue".to_string(), 1)].into_iter().collect();

        let rows = rows(&summary, &counts, |_| Some("IGNORE".to_string()));
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["blue", "zz", "tmp"]);
        assert_eq!(rows[0].files, 1);
        assert_eq!(rows[1].files, 0);
        assert_eq!(rows[2].action.as_deref(), Some("IGNORE"));
        assert!(rows[0].action.is_none());
    }
}
