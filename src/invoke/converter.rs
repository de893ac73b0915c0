//! Converter invocation: one call over the whole data directory.

use anyhow::Result;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Instant;
use tracing::info;

use super::{run_tool, ToolSpec};

/// Flags forwarded to the converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Forward `--include-text` so the tables keep the full revision text.
    pub include_text: bool,
    /// Forward `--batch-size <n>` (revisions per processing batch).
    pub batch_size: Option<usize>,
}

/// Argv tail: `--data-dir P --output-dir P [--include-text] [--batch-size N]`.
pub fn convert_args(data_dir: &Path, output_dir: &Path, opts: &ConvertOptions) -> Vec<String> {
    let mut args = vec![
        "--data-dir".to_string(),
        data_dir.display().to_string(),
        "--output-dir".to_string(),
        output_dir.display().to_string(),
    ];
    if opts.include_text {
        args.push("--include-text".to_string());
    }
    if let Some(n) = opts.batch_size {
        args.push("--batch-size".to_string());
        args.push(n.to_string());
    }
    args
}

/// Run the converter over everything under `data_dir`, writing one table
/// per article into `output_dir`.
pub async fn convert_dumps(
    spec: &ToolSpec,
    data_dir: &Path,
    output_dir: &Path,
    opts: &ConvertOptions,
    workdir: Option<&Path>,
) -> Result<ExitStatus> {
    let start = Instant::now();
    let status = run_tool(spec, &convert_args(data_dir, output_dir, opts), workdir).await?;
    info!(elapsed = ?start.elapsed(), "converter finished");
    Ok(status)
}
