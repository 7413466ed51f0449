//! Running external commands with captured output

use crate::error::ToolError;
use std::path::Path;
use tokio::process::Command;

/// Run `program args...` in `working_dir` and return its stdout
///
/// A non-zero exit status becomes `ToolError::Failed` carrying the
/// captured stderr.
pub async fn run_captured(
    program: &str,
    args: &[&str],
    working_dir: &Path,
) -> Result<Vec<u8>, ToolError> {
    tracing::debug!(program, ?args, dir = %working_dir.display(), "running command");

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ToolError::spawn(program, e))?;

    if !output.status.success() {
        return Err(ToolError::failed(
            program,
            args,
            output.status,
            &output.stderr,
        ));
    }
    Ok(output.stdout)
}
