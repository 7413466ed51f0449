//! `go list -json ./...` backend

use crate::domain::BuildUnit;
use crate::error::ToolError;
use crate::process::run_captured;
use crate::toolchain::PackageLister;
use async_trait::async_trait;
use std::path::Path;

/// Default go executable
pub const DEFAULT_GO: &str = "go";

/// PackageLister implementation that shells out to the go command
#[derive(Debug, Clone)]
pub struct GoList {
    program: String,
}

impl GoList {
    /// Create a lister using the given go executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GoList {
    fn default() -> Self {
        Self::new(DEFAULT_GO)
    }
}

#[async_trait]
impl PackageLister for GoList {
    async fn list_build_units(&self, module_dir: &Path) -> Result<Vec<BuildUnit>, ToolError> {
        let stdout = run_captured(&self.program, &["list", "-json", "./..."], module_dir).await?;
        let units = decode_packages(&self.program, &stdout)?;
        tracing::debug!(
            module = %module_dir.display(),
            packages = units.len(),
            "listed packages"
        );
        Ok(units)
    }
}

/// Decode the concatenated JSON objects `go list -json` prints
fn decode_packages(program: &str, stdout: &[u8]) -> Result<Vec<BuildUnit>, ToolError> {
    serde_json::Deserializer::from_slice(stdout)
        .into_iter::<BuildUnit>()
        .map(|unit| {
            unit.map_err(|e| {
                ToolError::invalid_output(program, format!("failed to decode JSON: {}", e))
            })
        })
        .collect()
}
