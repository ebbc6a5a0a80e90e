//! JSON Lines export: one record per line, UTF-8.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::record::Record;

/// Writes `records` to `path`, replacing any existing file.
pub fn write_json_lines(records: &[Record], path: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut out, record).map_err(|e| io_err(e.into()))?;
        out.write_all(b"\n").map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

/// Exports one sub-resource of a table as `{dir}/{name}.jsonl`.
pub(crate) fn save_resource(dir: &Path, name: &str, records: &[Record]) -> Result<PathBuf> {
    let path = dir.join(format!("{}.jsonl", name));
    write_json_lines(records, &path)?;
    log::info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use tempfile::TempDir;

    #[test]
    fn writes_one_record_per_line() {
        let dir = TempDir::new().unwrap();
        let mut a = Record::new();
        a.insert("ID".into(), Value::Integer(0));
        a.insert("Periods".into(), Value::from("2019"));
        let mut b = Record::new();
        b.insert("ID".into(), Value::Integer(1));
        b.insert("Periods".into(), Value::from("Zuid-Holland \u{e9}"));

        let path = save_resource(dir.path(), "TypedDataSet", &[a, b]).unwrap();
        assert_eq!(path, dir.path().join("TypedDataSet.jsonl"));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"ID":0,"Periods":"2019"}"#);
        assert!(lines[1].contains("Zuid-Holland \u{e9}"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        write_json_lines(&[], &path).unwrap();
        assert!(path.exists());
    }
}
