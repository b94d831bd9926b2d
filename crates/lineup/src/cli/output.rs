//! Output formatting utilities for CLI commands
//!
//! Provides consistent formatting for:
//! - Tables with column alignment
//! - Percentages and health verdicts
//! - Colors for roles and severities

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use lineup_core::Role;

/// Format a percentage with one decimal
///
/// Examples:
/// - 100.0 -> "100.0%"
/// - 66.666 -> "66.7%"
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Human label for a health verdict
pub fn format_health(healthy: bool) -> &'static str {
    if healthy {
        "HEALTHY"
    } else {
        "NEEDS ATTENTION"
    }
}

/// Print a table with headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    // Add header row with styling
    let header_cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    println!("{}", table);
}

/// Print a table with custom column colors
pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
    table.set_header(header_cells);

    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| {
                let cell = Cell::new(text);
                if let Some(c) = color {
                    cell.fg(c)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    println!("{}", table);
}

pub fn color_for_role(role: Role) -> Color {
    match role {
        Role::Front => Color::Green,
        Role::Rear => Color::Blue,
        Role::Overview => Color::Magenta,
    }
}

pub fn color_for_severity(is_error: bool) -> Color {
    if is_error {
        Color::Red
    } else {
        Color::Yellow
    }
}

/// Print captured log lines to stderr
pub fn print_log_tail(lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    eprintln!("--- last {} log line(s) ---", lines.len());
    for line in lines {
        eprintln!("{}", line);
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(100.0), "100.0%");
        assert_eq!(format_percentage(0.0), "0.0%");
        assert_eq!(format_percentage(200.0 / 3.0), "66.7%");
    }

    #[test]
    fn test_format_health() {
        assert_eq!(format_health(true), "HEALTHY");
        assert_eq!(format_health(false), "NEEDS ATTENTION");
    }

    #[test]
    fn test_role_colors_are_distinct() {
        let colors = [
            color_for_role(Role::Front),
            color_for_role(Role::Rear),
            color_for_role(Role::Overview),
        ];
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }
}
