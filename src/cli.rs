use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "labelset",
    version,
    about = "Build the annotator dataset from per-category recommendations and conversations"
)]
pub struct Cli {
    /// TOML config file with [paths] and [build] defaults
    #[arg(long, env = "LABELSET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory with top20_<Category>.jsonl outputs (default: dataset/reco_by_category)
    #[arg(long)]
    pub reco_dir: Option<PathBuf>,

    /// Directory with per-category conversations (default: dataset/chat/by_category)
    #[arg(long)]
    pub chat_dir: Option<PathBuf>,

    /// Output JSON for the annotator site (default: docs/data.json)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Maximum records to include across all categories
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Split categories with more records than this into numbered parts (default: 200)
    #[arg(long)]
    pub split_threshold: Option<usize>,
}
