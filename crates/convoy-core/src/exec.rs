//! External command execution for the helm and kubectl frontends.

use tokio::process::Command;

use crate::error::{Error, Result};

/// Run an external command and capture its combined output.
///
/// A non-zero exit surfaces the captured output in the error so the
/// failing tool's own message reaches the user.
pub async fn run(program: &str, args: &[String]) -> Result<String> {
    tracing::debug!(%program, ?args, "executing");

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| Error::Exec {
            program: program.to_string(),
            source,
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::CommandFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            output: combined.trim().to_string(),
        });
    }

    Ok(combined)
}
