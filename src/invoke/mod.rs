//! Invocation of the external downloader and converter through their CLIs.
//!
//! Both tools are opaque collaborators: this crate builds their argv, relays
//! their output into the log, and reports the exit status. It never reaches
//! around them to the network or the dump files.

pub mod converter;
pub mod downloader;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// An external tool as configured: the program to exec plus the arguments
/// that always come first (typically the script path when the program is an
/// interpreter).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Full command line for log output.
    pub fn render(&self, extra: &[String]) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len() + extra.len());
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.extend(extra.iter().cloned());
        parts.join(" ")
    }

    /// Short name for log lines: the script being run when the program is an
    /// interpreter, otherwise the program itself.
    pub fn label(&self) -> String {
        let raw = self.args.first().unwrap_or(&self.program);
        Path::new(raw)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(raw)
            .to_string()
    }
}

/// Spawn the tool with `extra` appended to its base arguments, relay its
/// stdout (info) and stderr (warn) into the log line by line, and return the
/// exit status once it finishes.
///
/// A failure to spawn or wait is an error; a non-zero exit is not, the
/// caller decides what to do with the status.
pub async fn run_tool(
    spec: &ToolSpec,
    extra: &[String],
    workdir: Option<&Path>,
) -> Result<ExitStatus> {
    let rendered = spec.render(extra);
    info!(cmd = %rendered, "spawning");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .args(extra)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{rendered}`"))?;

    let mut relays = Vec::with_capacity(2);
    if let Some(out) = child.stdout.take() {
        let tool = spec.label();
        relays.push(tokio::spawn(async move {
            let mut lines = BufReader::new(out).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(tool = %tool, "{}", line);
            }
        }));
    }
    if let Some(err) = child.stderr.take() {
        let tool = spec.label();
        relays.push(tokio::spawn(async move {
            let mut lines = BufReader::new(err).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(tool = %tool, "{}", line);
            }
        }));
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{rendered}`"))?;
    for relay in relays {
        let _ = relay.await;
    }

    if !status.success() {
        warn!(cmd = %rendered, code = ?status.code(), "tool exited non-zero");
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_joins_program_base_args_and_extras() {
        let spec = ToolSpec::new("python3", ["download_wiki_revisions.py"]);
        let extra = vec!["Serbia".to_string(), "--update".to_string()];
        assert_eq!(
            spec.render(&extra),
            "python3 download_wiki_revisions.py Serbia --update"
        );
    }

    #[test]
    fn label_prefers_the_script_over_the_interpreter() {
        let spec = ToolSpec::new("python3", ["tools/xml_to_dataframe.py"]);
        assert_eq!(spec.label(), "xml_to_dataframe");
        let bare = ToolSpec::new("wiki-dl", Vec::<String>::new());
        assert_eq!(bare.label(), "wiki-dl");
    }

    #[tokio::test]
    async fn exit_status_is_reported() -> Result<()> {
        let spec = ToolSpec::new("sh", ["-c"]);
        let ok = run_tool(&spec, &["true".to_string()], None).await?;
        assert!(ok.success());
        let failed = run_tool(&spec, &["exit 3".to_string()], None).await?;
        assert_eq!(failed.code(), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let spec = ToolSpec::new("definitely-not-a-real-program", Vec::<String>::new());
        assert!(run_tool(&spec, &[], None).await.is_err());
    }
}
