use crate::LabelsetError;
use crate::cli::Cli;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_RECO_DIR: &str = "dataset/reco_by_category";
pub const DEFAULT_CHAT_DIR: &str = "dataset/chat/by_category";
pub const DEFAULT_OUT: &str = "docs/data.json";
pub const DEFAULT_SPLIT_THRESHOLD: usize = 200;

#[derive(Debug, Deserialize, Default)]
pub struct LabelsetConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct PathsConfig {
    pub reco_dir: Option<PathBuf>,
    pub chat_dir: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BuildConfig {
    pub max_items: Option<usize>,
    pub split_threshold: Option<usize>,
}

/// Fully resolved settings for one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub reco_dir: PathBuf,
    pub chat_dir: PathBuf,
    pub out: PathBuf,
    pub max_items: Option<usize>,
    /// Categories with more records than this are split into parts of this size.
    pub split_threshold: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            reco_dir: PathBuf::from(DEFAULT_RECO_DIR),
            chat_dir: PathBuf::from(DEFAULT_CHAT_DIR),
            out: PathBuf::from(DEFAULT_OUT),
            max_items: None,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }
}

/// Load the config file at `path`.
pub fn load_config(path: &Path) -> Result<LabelsetConfig, LabelsetError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LabelsetError::Config(format!("{}: {e}", path.display())))?;
    toml::from_str(&content).map_err(|e| LabelsetError::Config(format!("{}: {e}", path.display())))
}

/// Merge CLI flags over config file values over built-in defaults.
pub fn resolve_options(cli: &Cli, config: &LabelsetConfig) -> Result<BuildOptions, LabelsetError> {
    let defaults = BuildOptions::default();
    let opts = BuildOptions {
        reco_dir: pick(&cli.reco_dir, &config.paths.reco_dir, defaults.reco_dir),
        chat_dir: pick(&cli.chat_dir, &config.paths.chat_dir, defaults.chat_dir),
        out: pick(&cli.out, &config.paths.out, defaults.out),
        max_items: cli.max_items.or(config.build.max_items),
        split_threshold: cli
            .split_threshold
            .or(config.build.split_threshold)
            .unwrap_or(defaults.split_threshold),
    };
    validate_options(&opts)?;
    Ok(opts)
}

/// Resolve options for a parsed command line, reading `--config` when given.
pub fn options_from_cli(cli: &Cli) -> Result<BuildOptions, LabelsetError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LabelsetConfig::default(),
    };
    resolve_options(cli, &config)
}

fn pick<T: Clone>(flag: &Option<T>, file: &Option<T>, default: T) -> T {
    flag.clone().or_else(|| file.clone()).unwrap_or(default)
}

fn validate_options(opts: &BuildOptions) -> Result<(), LabelsetError> {
    if opts.split_threshold == 0 {
        return Err(LabelsetError::Config(
            "split_threshold must be at least 1".into(),
        ));
    }
    Ok(())
}
