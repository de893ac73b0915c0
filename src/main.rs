use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use wikirev::cli::{Cli, Command};
use wikirev::config::Config;
use wikirev::inspect::{self, report};
use wikirev::invoke::converter::{convert_dumps, ConvertOptions};
use wikirev::invoke::downloader::{download_article, DownloadOptions};
use wikirev::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    // ─── 2) load config, apply CLI overrides ─────────────────────────
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match cli.command {
        Command::Run {
            articles,
            since,
            update,
            include_text,
            batch_size,
        } => {
            let download = DownloadOptions { since, update };
            let convert = ConvertOptions {
                include_text,
                batch_size,
            };
            pipeline::run_all(&cfg, &articles, &download, &convert).await?;
        }

        Command::Download {
            articles,
            since,
            update,
        } => {
            pipeline::ensure_layout(&cfg)?;
            let opts = DownloadOptions { since, update };
            for article in &articles {
                let status =
                    download_article(&cfg.downloader, article, &opts, cfg.workdir.as_deref())
                        .await?;
                if !status.success() {
                    error!(article = %article, code = ?status.code(), "downloader failed");
                }
            }
        }

        Command::Convert {
            include_text,
            batch_size,
        } => {
            pipeline::ensure_layout(&cfg)?;
            let opts = ConvertOptions {
                include_text,
                batch_size,
            };
            let status = convert_dumps(
                &cfg.converter,
                &cfg.data_dir,
                &cfg.output_dir,
                &opts,
                cfg.workdir.as_deref(),
            )
            .await?;
            if !status.success() {
                error!(code = ?status.code(), "converter failed");
            }
        }

        Command::Inspect {
            article,
            path,
            all,
            json,
        } => {
            let summaries = if all {
                inspect::discover_tables(&cfg.output_dir)?
                    .iter()
                    .map(|p| inspect::summarize_file(p))
                    .collect::<Result<Vec<_>>>()?
            } else if let Some(path) = path {
                vec![inspect::summarize_file(&path)?]
            } else if let Some(article) = article {
                vec![inspect::summarize_article(&cfg.output_dir, &article)?]
            } else {
                bail!("nothing to inspect: give an article title, --path, or --all");
            };
            for summary in &summaries {
                if json {
                    report::print_json(summary)?;
                } else {
                    report::print_summary(summary);
                }
            }
        }
    }

    info!("done");
    Ok(())
}
