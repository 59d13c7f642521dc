//! Shared data model for the alignment core.

use std::ops::{BitOr, BitOrAssign};

/// A word segment as reported by the external decoder.
///
/// `end_ms >= start_ms` is the only invariant the decoder promises;
/// overlapping or zero-length segments are possible and every
/// downstream consumer must tolerate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedWord {
    pub start_ms: u32,
    pub end_ms: u32,
    pub text: String,
}

/// Bit flags carried by a [`LiaisePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiaiseFlags(u8);

impl LiaiseFlags {
    pub const NONE: LiaiseFlags = LiaiseFlags(0);
    pub const BACKTRACK: LiaiseFlags = LiaiseFlags(1);

    pub fn contains(self, other: LiaiseFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn from_bits(bits: u8) -> LiaiseFlags {
        LiaiseFlags(bits)
    }
}

impl BitOr for LiaiseFlags {
    type Output = LiaiseFlags;
    fn bitor(self, rhs: LiaiseFlags) -> LiaiseFlags {
        LiaiseFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for LiaiseFlags {
    fn bitor_assign(&mut self, rhs: LiaiseFlags) {
        self.0 |= rhs.0;
    }
}

/// A reference-word boundary where the preceding word's final sound and
/// the following word's initial sound elide in recitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiaisePoint {
    pub index: u16,
    pub flags: LiaiseFlags,
}

/// Bit flags carried by a [`SegmentedWordSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanFlag(u8);

impl SpanFlag {
    pub const NONE: SpanFlag = SpanFlag(0);
    pub const MATCHED_INPUT: SpanFlag = SpanFlag(1 << 0);
    pub const MATCHED_REFERENCE: SpanFlag = SpanFlag(1 << 1);
    pub const EXACT: SpanFlag = SpanFlag(1 << 2);
    pub const INEXACT: SpanFlag = SpanFlag(1 << 3);

    pub fn contains(self, other: SpanFlag) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SpanFlag {
    type Output = SpanFlag;
    fn bitor(self, rhs: SpanFlag) -> SpanFlag {
        SpanFlag(self.0 | rhs.0)
    }
}

impl BitOrAssign for SpanFlag {
    fn bitor_assign(&mut self, rhs: SpanFlag) {
        self.0 |= rhs.0;
    }
}

/// Sentinel used on the wire (JSON output, raw span fields) to mean "no
/// reference word assigned". Internally we prefer `Option<u32>` and
/// only collapse to this at the data-model boundary (see spec.md §9).
pub const NO_MATCH: u32 = u32::MAX;

/// A time-stamped span over a contiguous range of reference words,
/// half-open: covers reference words `[index_start, index_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentedWordSpan {
    pub index_start: u32,
    pub index_end: u32,
    pub start_ms: u32,
    pub end_ms: u32,
    pub flags: SpanFlag,
}

impl SegmentedWordSpan {
    pub fn is_no_match(&self) -> bool {
        self.index_start == NO_MATCH || self.index_end == NO_MATCH
    }

    pub fn index_start_opt(&self) -> Option<u32> {
        (self.index_start != NO_MATCH).then_some(self.index_start)
    }

    pub fn index_end_opt(&self) -> Option<u32> {
        (self.index_end != NO_MATCH).then_some(self.index_end)
    }
}

/// Counters accumulated by [`crate::aligner`] while reconciling the
/// recognized word stream against the reference word list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentationStats {
    /// Reference word not matched by any recognized word.
    pub insertions: u32,
    /// Spurious recognized word with no reference counterpart.
    pub deletions: u32,
    /// Recognized word substituted for a different reference word.
    pub transpositions: u32,
}

/// A single alignment job: one clip, one ayah's reference words.
#[derive(Debug, Clone)]
pub struct SegmentationJob {
    pub surah: u16,
    pub ayah: u16,
    pub audio_path: std::path::PathBuf,
    pub reference_words: Vec<String>,
    pub liaise_points: Vec<LiaisePoint>,
}

/// Output of running a [`SegmentationJob`] through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SegmentationResult {
    pub spans: Vec<SegmentedWordSpan>,
    pub stats: SegmentationStats,
}

/// `surah * 1000 + ayah`, used as the key into reference-text and
/// liaison-file lookups (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AyahKey(pub u32);

impl AyahKey {
    pub fn new(surah: u16, ayah: u16) -> AyahKey {
        AyahKey(surah as u32 * 1000 + ayah as u32)
    }
}
