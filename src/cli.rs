//! Command-line interface definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pipeline driver for Wikipedia article revision history.
///
/// Shells out to an external downloader for the raw per-revision XML and an
/// external converter for the per-article table files, then loads the tables
/// itself to print summary statistics.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML config file (defaults to ./wikirev.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory the downloader writes raw revision XML into
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory the converter writes per-article tables into
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level CLI subcommands, one per pipeline step plus `run` for the
/// whole sequence.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download revision history, convert it, and summarize each article table
    Run {
        /// Article titles, as they appear in the wiki URL
        #[arg(required = true)]
        articles: Vec<String>,

        /// Earliest revision date to download (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Only fetch revisions newer than what is already on disk
        #[arg(long)]
        update: bool,

        /// Keep full revision text in the converted tables
        #[arg(long)]
        include_text: bool,

        /// Revisions per converter processing batch
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Download raw revision XML for one or more articles
    Download {
        /// Article titles, as they appear in the wiki URL
        #[arg(required = true)]
        articles: Vec<String>,

        /// Earliest revision date to download (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Only fetch revisions newer than what is already on disk
        #[arg(long)]
        update: bool,
    },

    /// Convert downloaded revision XML into per-article table files
    Convert {
        /// Keep full revision text in the converted tables
        #[arg(long)]
        include_text: bool,

        /// Revisions per converter processing batch
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Print summary statistics for converted article tables
    Inspect {
        /// Article title to summarize (resolved under the output directory)
        article: Option<String>,

        /// Summarize an explicit table file instead of an article name
        #[arg(long, conflicts_with = "article")]
        path: Option<PathBuf>,

        /// Summarize every table found in the output directory
        #[arg(long, conflicts_with_all = ["article", "path"])]
        all: bool,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from([
            "wikirev",
            "run",
            "Rust_(programming_language)",
            "--since",
            "2020-01-01",
            "--update",
        ]);
        match cli.command {
            Command::Run {
                articles,
                since,
                update,
                include_text,
                batch_size,
            } => {
                assert_eq!(articles, vec!["Rust_(programming_language)"]);
                assert_eq!(since, NaiveDate::from_ymd_opt(2020, 1, 1));
                assert!(update);
                assert!(!include_text);
                assert_eq!(batch_size, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_inspect_with_global_output_dir() {
        let cli = Cli::parse_from(["wikirev", "inspect", "Serbia", "--output-dir", "tables"]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("tables")));
        match cli.command {
            Command::Inspect { article, json, .. } => {
                assert_eq!(article.as_deref(), Some("Serbia"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_requires_an_article() {
        assert!(Cli::try_parse_from(["wikirev", "run"]).is_err());
    }

    #[test]
    fn bad_since_date_is_rejected() {
        assert!(Cli::try_parse_from(["wikirev", "download", "Serbia", "--since", "01/02/2020"]).is_err());
    }
}
