//! Plain text output: one package per line

use crate::detect::Detection;
use crate::output::{OutputFormatter, PackageLabel};
use std::io::Write;

/// Text formatter for shell pipelines
pub struct TextFormatter {
    label: PackageLabel,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(label: PackageLabel) -> Self {
        Self { label }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, detection: &Detection, writer: &mut dyn Write) -> std::io::Result<()> {
        for package in &detection.packages {
            match self.label {
                PackageLabel::ImportPath => writeln!(writer, "{}", package.import_path)?,
                PackageLabel::Dir => writeln!(writer, "{}", package.dir.display())?,
            }
        }
        Ok(())
    }
}
