//! Forced-alignment of Qur'anic recitation audio against a known
//! reference text: given an ayah's reference words and a recitation
//! clip, produce time-stamped word spans.

pub mod aligner;
pub mod audiofile;
pub mod decoder;
pub mod dictionary;
pub mod discriminator;
pub mod error;
pub mod liaison;
pub mod mfcc;
pub mod output;
pub mod rates;
pub mod reftext;
pub mod refiner;
pub mod runner;
pub mod span_builder;
pub mod types;
pub mod worker;

pub use error::{AlignError, Result};
