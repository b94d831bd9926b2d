//! Validate command - structural, rule and sample checks for a configuration

use crate::cli::output::{color_for_severity, print_json, print_table_colored};
use crate::cli::{filenames, load_config};
use comfy_table::Color;
use lineup_core::{lint_rules, validate_against_samples, validate_patterns, ValidationResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug)]
pub struct ValidateArgs {
    pub config: PathBuf,
    pub samples: Vec<String>,
    pub json: bool,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(&args.config)?;
    let patterns = config.pattern_configuration();

    let mut result = validate_patterns(&patterns).combine(lint_rules(&patterns.role_rules));
    if !args.samples.is_empty() {
        let samples = filenames(config.sample(&args.samples));
        result = result.combine(validate_against_samples(&patterns, &samples));
    }
    info!(
        valid = result.is_valid(),
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "validated configuration"
    );

    if args.json {
        print_json(&result)?;
    } else {
        print_human(&result);
    }

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_human(result: &ValidationResult) {
    let rows = table_rows(result);
    if !rows.is_empty() {
        print_table_colored(&["SEVERITY", "KIND", "MESSAGE", "CONTEXT"], rows);
        println!();
    }

    if result.is_valid() {
        println!(
            "Configuration is valid ({} warning{})",
            result.warnings().len(),
            if result.warnings().len() == 1 { "" } else { "s" }
        );
    } else {
        println!(
            "Configuration is INVALID ({} error{})",
            result.errors().len(),
            if result.errors().len() == 1 { "" } else { "s" }
        );
    }
}

fn table_rows(result: &ValidationResult) -> Vec<Vec<(String, Option<Color>)>> {
    let errors = result
        .errors()
        .iter()
        .map(|e| (true, e.kind.as_str(), &e.message, &e.context));
    let warnings = result
        .warnings()
        .iter()
        .map(|w| (false, w.kind.as_str(), &w.message, &w.context));

    errors
        .chain(warnings)
        .map(|(is_error, kind, message, context)| {
            let severity = if is_error { "ERROR" } else { "WARNING" };
            vec![
                (severity.to_string(), Some(color_for_severity(is_error))),
                (kind.to_string(), None),
                (message.clone(), None),
                (context.clone().unwrap_or_default(), None),
            ]
        })
        .collect()
}
