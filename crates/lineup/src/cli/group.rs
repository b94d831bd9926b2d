//! Group command - group a photo set and report role coverage

use crate::cli::error::HelpfulError;
use crate::cli::output::{
    color_for_role, format_health, format_percentage, print_json, print_table, print_table_colored,
};
use crate::cli::{filenames, load_config};
use comfy_table::Color;
use lineup_core::{group_and_assign_roles, GroupingResult, PreviewSummary, Role};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug)]
pub struct GroupArgs {
    pub config: PathBuf,
    pub files: Vec<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupOutput {
    pub grouping: GroupingResult,
    pub summary: PreviewSummary,
    pub healthy: bool,
}

pub fn run(args: GroupArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(&args.config)?;
    let pattern = config
        .group_pattern
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| HelpfulError::missing_group_pattern(&args.config))?;

    let files = filenames(config.sample(&args.files));
    let handler = config.segment_handler();
    let grouping = group_and_assign_roles(&files, pattern, &config.effective_rules(), Some(&handler));
    let summary = PreviewSummary::from_grouping(&grouping, &files);
    let output = GroupOutput {
        healthy: summary.is_healthy(),
        grouping,
        summary,
    };

    if args.json {
        print_json(&output)?;
    } else {
        print_human(&output);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_human(output: &GroupOutput) {
    let grouping = &output.grouping;
    let summary = &output.summary;

    if !grouping.groups.is_empty() {
        print_table_colored(&["GROUP", "FRONT", "REAR", "OVERVIEW", "FILES"], group_rows(grouping));
        println!();
    }

    if !grouping.unmatched_files.is_empty() {
        let rows = grouping
            .unmatched_files
            .iter()
            .map(|file| {
                vec![
                    file.clone(),
                    grouping.unmatched_reasons.get(file).cloned().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["UNMATCHED FILE", "REASON"], rows);
        println!();
    }

    println!(
        "Matched {}/{} files ({})",
        summary.matched_files(),
        summary.total_files(),
        format_percentage(summary.match_percentage())
    );
    println!(
        "Roles: FRONT {}  REAR {}  OVERVIEW {}",
        summary.role_count(Role::Front),
        summary.role_count(Role::Rear),
        summary.role_count(Role::Overview)
    );
    if !summary.incomplete_groups().is_empty() {
        println!("Incomplete groups: {}", summary.incomplete_groups().join(", "));
    }
    println!("Health: {}", format_health(output.healthy));
}

fn group_rows(grouping: &GroupingResult) -> Vec<Vec<(String, Option<Color>)>> {
    grouping
        .groups
        .iter()
        .map(|(id, members)| {
            let mut row = vec![(id.clone(), None)];
            for role in [Role::Front, Role::Rear, Role::Overview] {
                let files = grouping.files_with_role(id, role);
                let cell = if files.is_empty() {
                    ("-".to_string(), Some(Color::DarkGrey))
                } else {
                    (files.join("\n"), Some(color_for_role(role)))
                };
                row.push(cell);
            }
            row.push((members.len().to_string(), None));
            row
        })
        .collect()
}
