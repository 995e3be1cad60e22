use crate::LabelsetError;
use crate::build::OutputRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `records` to `out` as one JSON array, creating parent directories.
/// Non-ASCII text is written as-is. Returns the number of records written.
pub fn write_records(out: &Path, records: &[OutputRecord]) -> Result<usize, LabelsetError> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(out)?);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(records.len())
}
