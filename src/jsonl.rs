use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

/// Lazily parsed rows of a line-delimited JSON source.
///
/// Blank lines, lines that are not valid UTF-8 and lines that fail to parse
/// are skipped without notice; upstream dumps are noisy and a bad row must
/// not sink a run. Any other read error ends the sequence.
pub struct JsonlRows<R = BufReader<File>> {
    lines: Lines<R>,
}

impl<R: BufRead> JsonlRows<R> {
    pub fn from_reader(reader: R) -> Self {
        JsonlRows {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for JsonlRows<R> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(l) => l,
                Err(e) if e.kind() == ErrorKind::InvalidData => continue,
                Err(_) => return None,
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Ok(v) = serde_json::from_str(trimmed) {
                return Some(v);
            }
        }
        None
    }
}

/// Open `path` for row-by-row reading.
pub fn read_jsonl(path: &Path) -> std::io::Result<JsonlRows> {
    let file = File::open(path)?;
    Ok(JsonlRows::from_reader(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    /// Reader that fails every call after its prefix is consumed.
    struct Failing {
        prefix: std::io::Cursor<Vec<u8>>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.prefix.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            Err(std::io::Error::other("device gone"))
        }
    }

    #[test]
    fn yields_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jsonl", "{\"n\":1}\n{\"n\":2}\n[3]\n");
        let rows: Vec<Value> = read_jsonl(&path).unwrap().collect();
        assert_eq!(rows, vec![json!({"n": 1}), json!({"n": 2}), json!([3])]);
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "a.jsonl",
            "\n{\"n\":1}\n   \n{not json\n{\"n\":2}\n\"tail\"",
        );
        let rows: Vec<Value> = read_jsonl(&path).unwrap().collect();
        assert_eq!(rows, vec![json!({"n": 1}), json!({"n": 2}), json!("tail")]);
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_crlf() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jsonl", "  {\"n\":1}  \r\n{\"n\":2}\r\n");
        assert_eq!(read_jsonl(&path).unwrap().count(), 2);
    }

    #[test]
    fn skips_invalid_utf8_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jsonl");
        std::fs::write(&path, b"{\"n\":1}\n\xff\xfe\n{\"n\":2}\n").unwrap();
        let rows: Vec<Value> = read_jsonl(&path).unwrap().collect();
        assert_eq!(rows, vec![json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn read_error_ends_rows() {
        let reader = std::io::BufReader::new(Failing {
            prefix: std::io::Cursor::new(b"{\"n\":1}\n".to_vec()),
        });
        let rows: Vec<Value> = JsonlRows::from_reader(reader).collect();
        assert_eq!(rows, vec![json!({"n": 1})]);
    }

    #[test]
    fn empty_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.jsonl", "");
        assert_eq!(read_jsonl(&path).unwrap().count(), 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_jsonl(&dir.path().join("missing.jsonl")).is_err());
    }
}
