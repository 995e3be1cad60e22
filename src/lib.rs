pub mod build;
pub mod category;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod jsonl;
pub mod writer;

use std::path::PathBuf;

pub use build::{BuildReport, OutputRecord};
pub use config::BuildOptions;

#[derive(Debug)]
pub enum LabelsetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(String),
}

impl std::fmt::Display for LabelsetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelsetError::Io(e) => write!(f, "io: {e}"),
            LabelsetError::Json(e) => write!(f, "json: {e}"),
            LabelsetError::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for LabelsetError {}

impl From<std::io::Error> for LabelsetError {
    fn from(e: std::io::Error) -> Self {
        LabelsetError::Io(e)
    }
}

impl From<serde_json::Error> for LabelsetError {
    fn from(e: serde_json::Error) -> Self {
        LabelsetError::Json(e)
    }
}

/// Outcome of a full count → join → write run.
#[derive(Debug)]
pub struct RunSummary {
    pub written: usize,
    pub out: PathBuf,
    pub report: BuildReport,
}

/// Count categories, join them into output records and write the dataset file.
pub fn run_build(opts: &BuildOptions) -> Result<RunSummary, LabelsetError> {
    let counts = category::count_categories(&opts.reco_dir)?;
    let (records, report) = build::build_records(opts, &counts)?;
    let written = writer::write_records(&opts.out, &records)?;
    log::info!(
        "built {written} records from {} categories ({} skipped)",
        report.categories.len(),
        report.skipped().count()
    );
    Ok(RunSummary {
        written,
        out: opts.out.clone(),
        report,
    })
}
