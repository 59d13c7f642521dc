//! Tanzil.net reference-text parsing (SPEC_FULL §4.M, spec.md §6).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::AyahKey;

#[derive(Error, Debug)]
pub enum ReftextError {
    #[error("could not read reference text file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed reference text record on line {line}: {text:?}")]
    Malformed { line: usize, text: String },
    #[error("invalid surah/ayah number on line {line}: {text:?}")]
    InvalidNumber { line: usize, text: String },
}

/// Load `surah|ayah|text` records, newline-terminated. Lines starting
/// with `#` are comments and discarded whole. The text field is split
/// on whitespace once, at load time, since every consumer needs the
/// per-ayah word list rather than the raw line.
pub fn load_reference_text(path: &Path) -> Result<HashMap<AyahKey, Vec<String>>, ReftextError> {
    let contents = fs::read_to_string(path).map_err(|source| ReftextError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut out = HashMap::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.splitn(3, '|');
        let (surah, ayah, text) = match (fields.next(), fields.next(), fields.next()) {
            (Some(s), Some(a), Some(t)) => (s, a, t),
            _ => {
                return Err(ReftextError::Malformed {
                    line: i + 1,
                    text: line.to_string(),
                })
            }
        };

        let surah: u16 = surah.parse().map_err(|_| ReftextError::InvalidNumber {
            line: i + 1,
            text: line.to_string(),
        })?;
        let ayah: u16 = ayah.parse().map_err(|_| ReftextError::InvalidNumber {
            line: i + 1,
            text: line.to_string(),
        })?;

        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        out.insert(AyahKey::new(surah, ayah), words);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_records_and_splits_words() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# Tanzil.net metadata header").unwrap();
        writeln!(f, "1|1|bismillah alrrahmani alrraheemi").unwrap();
        writeln!(f, "1|2|alhamdu lillahi rabbi alaalameena").unwrap();
        let map = load_reference_text(f.path()).unwrap();

        let ayah1 = map.get(&AyahKey::new(1, 1)).unwrap();
        assert_eq!(ayah1, &vec!["bismillah", "alrrahmani", "alrraheemi"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn skips_comment_and_blank_lines() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "#comment with | pipes | in it").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "2|1|word").unwrap();
        let map = load_reference_text(f.path()).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn rejects_record_missing_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "1|1").unwrap();
        assert!(load_reference_text(f.path()).is_err());
    }

    #[test]
    fn rejects_non_numeric_surah() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "x|1|word").unwrap();
        assert!(load_reference_text(f.path()).is_err());
    }
}
