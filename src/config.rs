//! Pipeline configuration.
//!
//! Every field has a default so the tool runs with no config file at all; a
//! YAML file (`--config`, or `./wikirev.yaml` when present) overrides the
//! defaults, and CLI flags override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::invoke::ToolSpec;

/// Config file looked for in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "wikirev.yaml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory the downloader writes raw revision XML into.
    pub data_dir: PathBuf,
    /// Directory the converter writes per-article table files into.
    pub output_dir: PathBuf,
    /// Directory the external tools are spawned in. `None` means the current dir.
    pub workdir: Option<PathBuf>,
    /// Downloader command line: program plus leading arguments.
    pub downloader: ToolSpec,
    /// Converter command line: program plus leading arguments.
    pub converter: ToolSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("dataframes"),
            workdir: None,
            downloader: ToolSpec::new("python3", ["download_wiki_revisions.py"]),
            converter: ToolSpec::new("python3", ["xml_to_dataframe.py"]),
        }
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists, or
    /// fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    return Ok(Self::default());
                }
                p
            }
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(cfg)
    }
}
