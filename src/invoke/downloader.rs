//! Downloader invocation: one call per article title.

use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Instant;
use tracing::info;

use super::{run_tool, ToolSpec};

/// Flags forwarded to the downloader.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    /// Earliest revision date to fetch, forwarded as `--since YYYY-MM-DD`.
    pub since: Option<NaiveDate>,
    /// Forward `--update` so the downloader only fetches revisions newer
    /// than what is already on disk.
    pub update: bool,
}

/// Argv tail for one article: `<article> [--since YYYY-MM-DD] [--update]`.
pub fn download_args(article: &str, opts: &DownloadOptions) -> Vec<String> {
    let mut args = vec![article.to_string()];
    if let Some(since) = opts.since {
        args.push("--since".to_string());
        args.push(since.format("%Y-%m-%d").to_string());
    }
    if opts.update {
        args.push("--update".to_string());
    }
    args
}

/// Run the downloader for a single article. The downloader owns all network
/// and retry behavior; this only reports how the invocation went.
pub async fn download_article(
    spec: &ToolSpec,
    article: &str,
    opts: &DownloadOptions,
    workdir: Option<&Path>,
) -> Result<ExitStatus> {
    let start = Instant::now();
    let status = run_tool(spec, &download_args(article, opts), workdir).await?;
    info!(article = %article, elapsed = ?start.elapsed(), "downloader finished");
    Ok(status)
}
