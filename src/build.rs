use crate::LabelsetError;
use crate::category::{chat_path, list_category_files};
use crate::config::BuildOptions;
use crate::conversation::{conversation_payload, conversation_to_text};
use crate::jsonl::read_jsonl;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Items kept per record from the ranked recommendation list.
pub const MAX_ITEMS_PER_RECORD: usize = 20;

/// One display-ready unit for the annotator page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub id: String,
    /// Chunk label (`<category>_<part>`) when the category was split.
    pub category: String,
    pub base_category: String,
    pub conversation_index: usize,
    pub conversation: Value,
    pub conversation_text: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: Value,
    pub title: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: String,
    /// Recommendation rows found by the counting pass.
    pub total: usize,
    pub emitted: usize,
    pub parts: usize,
    /// Conversations ran out before recommendations did.
    pub truncated: bool,
    pub skipped_missing_chat: bool,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub categories: Vec<CategoryReport>,
    pub stopped_at_max_items: bool,
}

impl BuildReport {
    pub fn skipped(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.skipped_missing_chat)
    }
}

/// Label for record `idx` (1-based) of `category`, split into parts of
/// `chunk_size` when given.
pub fn chunk_label(category: &str, idx: usize, chunk_size: Option<usize>) -> String {
    match chunk_size {
        Some(size) => format!("{category}_{}", chunk_part(idx, size)),
        None => category.to_string(),
    }
}

fn chunk_part(idx: usize, size: usize) -> usize {
    (idx - 1) / size + 1
}

/// `{id, title}` pairs from a recommendation row's ranked list.
pub fn extract_items(reco_row: &Value) -> Vec<Item> {
    let Some(list) = reco_row.get("llm_top20_items").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .take(MAX_ITEMS_PER_RECORD)
        .filter_map(Value::as_object)
        .map(|it| Item {
            id: field_or_empty(it.get("id")),
            title: field_or_empty(it.get("title")),
        })
        .collect()
}

fn field_or_empty(v: Option<&Value>) -> Value {
    v.cloned().unwrap_or_else(|| Value::String(String::new()))
}

fn cap_reached(max_items: Option<usize>, emitted: usize) -> bool {
    max_items.is_some_and(|max| emitted >= max)
}

/// Pair recommendation rows with conversation rows by line position and
/// reshape them into output records.
///
/// `counts` must come from a counting pass over the same directory; a
/// category whose count exceeds the split threshold gets chunk labels.
pub fn build_records(
    opts: &BuildOptions,
    counts: &BTreeMap<String, usize>,
) -> Result<(Vec<OutputRecord>, BuildReport), LabelsetError> {
    let mut records = Vec::new();
    let mut report = BuildReport::default();

    for file in list_category_files(&opts.reco_dir)? {
        if cap_reached(opts.max_items, records.len()) {
            report.stopped_at_max_items = true;
            break;
        }

        let category = file.category;
        let total = counts.get(&category).copied().unwrap_or(0);
        let mut entry = CategoryReport {
            category: category.clone(),
            total,
            ..Default::default()
        };

        let chat = chat_path(&opts.chat_dir, &category);
        if !chat.is_file() {
            log::debug!("{category}: no conversations at {}, skipping", chat.display());
            entry.skipped_missing_chat = true;
            report.categories.push(entry);
            continue;
        }

        let chat_rows: Vec<Value> = read_jsonl(&chat)?.collect();
        let chunk_size = (total > opts.split_threshold).then_some(opts.split_threshold);

        for (i, reco_row) in read_jsonl(&file.path)?.enumerate() {
            let idx = i + 1;
            let Some(chat_row) = chat_rows.get(i) else {
                log::debug!(
                    "{category}: only {} conversations, stopping at row {idx}",
                    chat_rows.len()
                );
                entry.truncated = true;
                break;
            };

            let conversation = conversation_payload(chat_row).clone();
            let conversation_text = conversation_to_text(&conversation)?;
            records.push(OutputRecord {
                id: format!("{category}:{idx}"),
                category: chunk_label(&category, idx, chunk_size),
                base_category: category.clone(),
                conversation_index: idx,
                conversation,
                conversation_text,
                items: extract_items(&reco_row),
            });
            entry.emitted += 1;

            if cap_reached(opts.max_items, records.len()) {
                log::debug!("reached max items ({}) in {category}", records.len());
                report.stopped_at_max_items = true;
                break;
            }
        }

        entry.parts = match chunk_size {
            Some(size) => entry.emitted.div_ceil(size),
            None => usize::from(entry.emitted > 0),
        };
        log::info!(
            "{category}: {} of {} records in {} part(s){}",
            entry.emitted,
            entry.total,
            entry.parts,
            if entry.truncated { " (conversations exhausted)" } else { "" }
        );
        report.categories.push(entry);

        if report.stopped_at_max_items {
            break;
        }
    }

    Ok((records, report))
}
