use crate::LabelsetError;
use crate::jsonl::read_jsonl;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const RECO_PREFIX: &str = "top20_";
pub const JSONL_EXT: &str = ".jsonl";

/// A recommendation file and the category its name encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFile {
    pub category: String,
    pub path: PathBuf,
}

/// Category name for a `top20_<Category>.jsonl` file name. Every `top20_`
/// in the stem is dropped, not only the leading one.
pub fn category_from_file_name(name: &str) -> Option<String> {
    if !name.starts_with(RECO_PREFIX) {
        return None;
    }
    let stem = name.strip_suffix(JSONL_EXT)?;
    Some(stem.replace(RECO_PREFIX, ""))
}

/// Recommendation files under `reco_dir`, sorted by file name.
///
/// A missing directory yields no files.
pub fn list_category_files(reco_dir: &Path) -> Result<Vec<CategoryFile>, LabelsetError> {
    let entries = match std::fs::read_dir(reco_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("recommendation directory {} not found", reco_dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(category) = category_from_file_name(name) {
            files.push(CategoryFile {
                category,
                path,
            });
        }
    }
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

/// Conversation file for `category` under `chat_dir`.
pub fn chat_path(chat_dir: &Path, category: &str) -> PathBuf {
    chat_dir.join(format!("{category}{JSONL_EXT}"))
}

/// Number of parseable recommendation rows per category.
pub fn count_categories(reco_dir: &Path) -> Result<BTreeMap<String, usize>, LabelsetError> {
    let mut counts = BTreeMap::new();
    for file in list_category_files(reco_dir)? {
        let n = read_jsonl(&file.path)?.count();
        log::debug!("{}: {n} recommendation rows", file.category);
        counts.insert(file.category, n);
    }
    Ok(counts)
}
