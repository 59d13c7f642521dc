//! Audio clip loading: memory-mapped fixed-header PCM plus fixed-offset
//! filename parsing (SPEC_FULL §4.O, spec.md §6).

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use thiserror::Error;

use crate::rates::samples_to_msec;

/// "I have it on good authority that the audio data starts 78 bytes
/// into the file" — the fixed-header container this tool expects.
const HEADER_LEN: usize = 78;

#[derive(Error, Debug)]
pub enum AudioFileError {
    #[error("could not open audio file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("audio file {path} is shorter than the {HEADER_LEN}-byte header")]
    TooShort { path: String },
    #[error(
        "input audio filename must end with sssaaa.wav, where sss is the surah number and aaa the ayah number: {0}"
    )]
    BadFilename(String),
}

/// A memory-mapped audio clip. Owns the `Mmap` so the mapping lives
/// exactly as long as the job needs it (spec.md §5).
pub struct Clip {
    mmap: Mmap,
}

impl Clip {
    /// The PCM samples following the fixed header, little-endian
    /// signed 16-bit at [`WAV_SAMPLE_RATE_HZ`].
    pub fn pcm(&self) -> Vec<i16> {
        self.mmap[HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    pub fn length_ms(&self) -> u32 {
        let samples = (self.mmap.len() - HEADER_LEN) / 2;
        samples_to_msec(samples as u32)
    }
}

/// Memory-map `path`, verifying it's at least as long as the header.
pub fn load_clip(path: &Path) -> Result<Clip, AudioFileError> {
    let file = File::open(path).map_err(|source| AudioFileError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| AudioFileError::Open {
        path: path.display().to_string(),
        source,
    })?;
    if mmap.len() < HEADER_LEN {
        return Err(AudioFileError::TooShort {
            path: path.display().to_string(),
        });
    }
    Ok(Clip { mmap })
}

/// Parse `(surah, ayah)` out of a filename ending `..._SSSAAA.wav`, by
/// fixed-offset slicing from the end of the string exactly as the
/// source tool does (`strlen(argv[i]) - 10` / `- 7`).
pub fn parse_clip_filename(path: &Path) -> Result<(u16, u16), AudioFileError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AudioFileError::BadFilename(path.display().to_string()))?;

    let bad = || AudioFileError::BadFilename(name.to_string());

    if name.len() < 10 || !name.ends_with(".wav") {
        return Err(bad());
    }

    let len = name.len();
    let surah_str = &name[len - 10..len - 7];
    let ayah_str = &name[len - 7..len - 4];

    let surah: u16 = surah_str.parse().map_err(|_| bad())?;
    let ayah: u16 = ayah_str.parse().map_err(|_| bad())?;
    Ok((surah, ayah))
}
