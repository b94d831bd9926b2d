//! CLI module for Lineup
//!
//! Each command lives in its own module with an `*Args` struct and a `run`
//! function; `output` and `error` hold the shared rendering helpers.

pub mod error;
pub mod output;

pub mod group;
pub mod infer;
pub mod segments;
pub mod validate;

use anyhow::Context;
use lineup_core::LineupConfig;
use std::path::{Path, PathBuf};

use error::HelpfulError;

/// Bare filenames; any directory part of an argument is dropped
pub fn filenames(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            Path::new(arg)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| arg.clone())
        })
        .collect()
}

pub fn load_config(path: &Path) -> anyhow::Result<LineupConfig> {
    if !path.exists() {
        return Err(HelpfulError::config_not_found(path).into());
    }
    LineupConfig::load(path).with_context(|| format!("Failed to load configuration: {}", path.display()))
}

/// Configuration at `path`, or defaults when no path was given
pub fn load_optional_config(path: Option<&PathBuf>) -> anyhow::Result<LineupConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(LineupConfig::default()),
    }
}
