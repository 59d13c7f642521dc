//! Pronunciation dictionary loading and per-job projection
//! (SPEC_FULL §4.L).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("could not read dictionary file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dictionary entry on line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}

/// Load `<word><space><phones...>` entries, one per line. The phone
/// string is everything after the first space, preserved verbatim
/// (including any leading whitespace it starts with) — spec.md §6.
pub fn load_dictionary(path: &Path) -> Result<HashMap<String, String>, DictionaryError> {
    let contents = fs::read_to_string(path).map_err(|source| DictionaryError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut dict = HashMap::new();
    for (i, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match line.find(' ') {
            Some(sp) => {
                let word = &line[..sp];
                let phones = &line[sp + 1..];
                dict.insert(word.to_string(), phones.to_string());
            }
            None => {
                return Err(DictionaryError::Malformed {
                    line: i + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    Ok(dict)
}

/// Project the global dictionary onto the words a single job needs,
/// dropping everything else so the decoder only ever sees the
/// vocabulary relevant to the ayah being aligned (spec.md §4.I step 1).
pub fn project_dictionary(
    global: &HashMap<String, String>,
    words: &[String],
) -> HashMap<String, String> {
    words
        .iter()
        .filter_map(|w| global.get(w).map(|phones| (w.clone(), phones.clone())))
        .collect()
}
