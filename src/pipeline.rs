//! Sequential pipeline: download each article's revision history, convert
//! the dumps, summarize the resulting tables.

use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;
use tracing::{error, info};

use crate::config::Config;
use crate::inspect::{self, report};
use crate::invoke::converter::{convert_dumps, ConvertOptions};
use crate::invoke::downloader::{download_article, DownloadOptions};

/// Create the working directories if absent. Idempotent.
pub fn ensure_layout(cfg: &Config) -> Result<()> {
    for dir in [&cfg.data_dir, &cfg.output_dir] {
        fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;
    }
    Ok(())
}

/// Run the whole sequence for a set of articles.
///
/// Step failures are logged and the remaining work continues; later steps
/// operate on whatever files the earlier ones managed to leave on disk.
/// Only spawn-level failures abort.
pub async fn run_all(
    cfg: &Config,
    articles: &[String],
    download: &DownloadOptions,
    convert: &ConvertOptions,
) -> Result<()> {
    ensure_layout(cfg)?;
    let workdir = cfg.workdir.as_deref();
    let start = Instant::now();

    for article in articles {
        info!(article = %article, "downloading revision history");
        let status = download_article(&cfg.downloader, article, download, workdir).await?;
        if !status.success() {
            error!(article = %article, code = ?status.code(), "downloader failed");
        }
    }

    info!(data_dir = %cfg.data_dir.display(), "converting dumps");
    let status = convert_dumps(
        &cfg.converter,
        &cfg.data_dir,
        &cfg.output_dir,
        convert,
        workdir,
    )
    .await?;
    if !status.success() {
        error!(code = ?status.code(), "converter failed");
    }

    for article in articles {
        match inspect::summarize_article(&cfg.output_dir, article) {
            Ok(summary) => report::print_summary(&summary),
            Err(e) => error!(article = %article, "summary failed: {:#}", e),
        }
    }

    info!(elapsed = ?start.elapsed(), "pipeline finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::ToolSpec;
    use chrono::NaiveDate;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn recording_tool(dir: &std::path::Path, name: &str) -> Result<ToolSpec> {
        let script = dir.join(name);
        fs::write(&script, "#!/bin/sh\necho \"$0 $@\" >> calls.log\n")?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        Ok(ToolSpec::new(script.display().to_string(), Vec::<String>::new()))
    }

    #[test]
    fn ensure_layout_is_idempotent() -> Result<()> {
        let tmp = TempDir::new()?;
        let cfg = Config {
            data_dir: tmp.path().join("data"),
            output_dir: tmp.path().join("dataframes"),
            ..Config::default()
        };
        ensure_layout(&cfg)?;
        ensure_layout(&cfg)?;
        assert!(cfg.data_dir.is_dir());
        assert!(cfg.output_dir.is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn run_all_invokes_both_tools_with_the_expected_argv() -> Result<()> {
        let tmp = TempDir::new()?;
        let cfg = Config {
            data_dir: tmp.path().join("data"),
            output_dir: tmp.path().join("dataframes"),
            workdir: Some(tmp.path().to_path_buf()),
            downloader: recording_tool(tmp.path(), "downloader.sh")?,
            converter: recording_tool(tmp.path(), "converter.sh")?,
        };
        let download = DownloadOptions {
            since: NaiveDate::from_ymd_opt(2020, 1, 1),
            update: true,
        };
        let convert = ConvertOptions {
            include_text: true,
            batch_size: None,
        };

        let articles = vec!["Rust_(programming_language)".to_string()];
        run_all(&cfg, &articles, &download, &convert).await?;

        let calls = fs::read_to_string(tmp.path().join("calls.log"))?;
        let mut lines = calls.lines();
        let download_line = lines.next().expect("downloader call recorded");
        assert!(download_line.contains("downloader.sh"));
        assert!(download_line.contains("Rust_(programming_language) --since 2020-01-01 --update"));
        let convert_line = lines.next().expect("converter call recorded");
        assert!(convert_line.contains("converter.sh"));
        assert!(convert_line.contains(&format!(
            "--data-dir {} --output-dir {} --include-text",
            cfg.data_dir.display(),
            cfg.output_dir.display()
        )));
        // no table was produced, so the summary step logged and moved on
        assert!(cfg.output_dir.is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn run_all_survives_a_failing_downloader() -> Result<()> {
        let tmp = TempDir::new()?;
        let script = tmp.path().join("failing.sh");
        fs::write(&script, "#!/bin/sh\nexit 7\n")?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        let failing = ToolSpec::new(script.display().to_string(), Vec::<String>::new());

        let cfg = Config {
            data_dir: tmp.path().join("data"),
            output_dir: tmp.path().join("dataframes"),
            workdir: Some(tmp.path().to_path_buf()),
            downloader: failing.clone(),
            converter: failing,
        };
        let articles = vec!["Serbia".to_string()];
        run_all(
            &cfg,
            &articles,
            &DownloadOptions::default(),
            &ConvertOptions::default(),
        )
        .await?;
        Ok(())
    }
}
