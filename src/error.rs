//! Crate-wide error type.
//!
//! Mirrors the layering the rest of this corpus uses: each module that
//! can fail on its own terms (reference-text parsing, dictionary
//! loading, audio file access, the decoder) defines its own small
//! `thiserror` enum, and those convert into [`AlignError`] via `#[from]`
//! so callers at the CLI boundary only ever match on one type.

use std::io;
use thiserror::Error;

use crate::audiofile::AudioFileError;
use crate::decoder::DecoderError;
use crate::dictionary::DictionaryError;
use crate::liaison::LiaisonError;
use crate::reftext::ReftextError;

pub type Result<T> = std::result::Result<T, AlignError>;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("reference text error: {0}")]
    Reftext(#[from] ReftextError),

    #[error("liaison file error: {0}")]
    Liaison(#[from] LiaisonError),

    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("audio file error: {0}")]
    AudioFile(#[from] AudioFileError),

    #[error("decoder error: {0}")]
    Decoder(#[from] DecoderError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
