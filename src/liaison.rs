//! Liaison-file parsing (SPEC_FULL §4.N, spec.md §6).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::{AyahKey, LiaiseFlags, LiaisePoint};

#[derive(Error, Debug)]
pub enum LiaisonError {
    #[error("could not read liaison file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed liaison record on line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}

/// Load whitespace-separated `surah ayah word_index flags` records.
/// `flags` is an integer bitset (`1 = Backtrack`).
pub fn load_liaise_points(
    path: &Path,
) -> Result<HashMap<AyahKey, Vec<LiaisePoint>>, LiaisonError> {
    let contents = fs::read_to_string(path).map_err(|source| LiaisonError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut out: HashMap<AyahKey, Vec<LiaisePoint>> = HashMap::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let malformed = || LiaisonError::Malformed {
            line: i + 1,
            text: line.to_string(),
        };
        if fields.len() != 4 {
            return Err(malformed());
        }

        let surah: u16 = fields[0].parse().map_err(|_| malformed())?;
        let ayah: u16 = fields[1].parse().map_err(|_| malformed())?;
        let word_index: u16 = fields[2].parse().map_err(|_| malformed())?;
        let flags: u8 = fields[3].parse().map_err(|_| malformed())?;

        out.entry(AyahKey::new(surah, ayah))
            .or_default()
            .push(LiaisePoint {
                index: word_index,
                flags: LiaiseFlags::from_bits(flags),
            });
    }

    Ok(out)
}
