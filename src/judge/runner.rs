//! Subprocess execution of submissions.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{KataError, Result};

/// Runs a submission against the given argument lists.
///
/// The submission plus a small harness is written to a tempfile and run
/// with the configured python binary. The harness reads the argument lists
/// as one JSON array on stdin, calls the entry point once per list, and
/// prints the collected results as the final stdout line; earlier stdout
/// lines belong to the submission and are ignored. The timeout kills the
/// subprocess on expiry.
pub async fn execute(
    python_bin: &str,
    user_code: &str,
    entry: &str,
    inputs: &[Vec<Value>],
    timeout: Duration,
) -> Result<Vec<Value>> {
    let source = format!(
        concat!(
            "{code}\n",
            "\n",
            "if __name__ == \"__main__\":\n",
            "    import json\n",
            "    import sys\n",
            "\n",
            "    _args_lists = json.load(sys.stdin)\n",
            "    _results = [{entry}(*_args) for _args in _args_lists]\n",
            "    print(json.dumps(_results))\n",
        ),
        code = user_code,
        entry = entry,
    );

    let mut file = tempfile::Builder::new()
        .prefix("kata-run-")
        .suffix(".py")
        .tempfile()?;
    file.write_all(source.as_bytes())?;

    let mut child = Command::new(python_bin)
        .arg(file.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| KataError::Judge(format!("spawn {python_bin}: {err}")))?;

    let payload = serde_json::to_vec(inputs)?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&payload).await?;
    }

    debug!(entry = entry, cases = inputs.len(), "running submission");
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            KataError::Judge(format!(
                "execution timed out after {}s",
                timeout.as_secs()
            ))
        })?
        .map_err(|err| KataError::Judge(format!("collect output: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KataError::Judge(format!(
            "execution failed: {}",
            tail(&stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| KataError::Judge("execution produced no output".to_string()))?;

    serde_json::from_str(last.trim())
        .map_err(|err| KataError::Judge(format!("malformed harness output: {err}")))
}

/// Last lines of stderr, capped in length. Python tracebacks put the error
/// at the end.
fn tail(text: &str) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(6);
    let mut out = lines[start..].join("\n");
    if out.len() > 500 {
        let cut = out
            .char_indices()
            .nth(500)
            .map(|(idx, _)| idx)
            .unwrap_or(out.len());
        out.truncate(cut);
        out.push_str("...");
    }
    out
}
