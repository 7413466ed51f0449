//! Output formatting for detection results
//!
//! This module provides:
//! - Text output, one package per line, for shell pipelines
//! - JSON output with change reasons for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::detect::Detection;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One package per line
    #[default]
    Text,
    /// JSON document with reasons
    Json,
}

/// What identifies a package in text output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageLabel {
    /// Import path, e.g. `example.com/repo/cmd/app`
    #[default]
    ImportPath,
    /// Package directory
    Dir,
}

/// Configuration for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Package label used by text output
    pub label: PackageLabel,
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, dirs: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            label: if dirs {
                PackageLabel::Dir
            } else {
                PackageLabel::ImportPath
            },
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the detection result
    fn format(&self, detection: &Detection, writer: &mut dyn Write) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::new(config.label)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
