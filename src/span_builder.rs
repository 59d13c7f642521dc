//! Walks the aligned-pair sequence and emits [`SegmentedWordSpan`]s
//! with provenance flags and timestamps (spec.md §4.G).

use crate::aligner::AlignedPair;
use crate::types::{SegmentedWordSpan, SpanFlag, NO_MATCH};

/// A span is worth keeping once its run is closed. Real index ranges
/// are always non-empty by construction (see below), so the ordinary
/// check is `index_end > index_start`; a purely spurious run (both
/// sentinels) represents unmatched input audio and must be kept
/// regardless — otherwise a spurious word immediately followed by an
/// exact match would silently vanish, which spec.md's S3 boundary
/// scenario rules out.
fn worth_closing(run: &SegmentedWordSpan) -> bool {
    run.index_start == NO_MATCH || run.index_end > run.index_start
}

/// Build the ordered span list from an aligned-pair sequence.
pub fn build_spans(pairs: &[AlignedPair], reference: &[String]) -> Vec<SegmentedWordSpan> {
    let mut result: Vec<SegmentedWordSpan> = Vec::new();
    let mut run = SegmentedWordSpan {
        index_start: NO_MATCH,
        index_end: NO_MATCH,
        start_ms: 0,
        end_ms: 0,
        flags: SpanFlag::NONE,
    };
    let mut in_run = false;

    for pair in pairs {
        match (pair.input, pair.ref_idx) {
            (Some(rec), Some(j)) if rec.text == reference[j] => {
                // Exact match: close any open run, then emit a fresh
                // one-word span just for this word.
                if in_run && worth_closing(&run) {
                    if run.end_ms == 0 {
                        run.end_ms = rec.start_ms;
                    }
                    result.push(run);
                }
                in_run = false;
                result.push(SegmentedWordSpan {
                    index_start: j as u32,
                    index_end: j as u32 + 1,
                    start_ms: rec.start_ms,
                    end_ms: rec.end_ms,
                    flags: SpanFlag::EXACT | SpanFlag::MATCHED_INPUT | SpanFlag::MATCHED_REFERENCE,
                });
            }
            (Some(rec), Some(j)) => {
                // Inexact match (substitution): open or extend a run.
                if !in_run {
                    in_run = true;
                    run = SegmentedWordSpan {
                        index_start: j as u32,
                        index_end: j as u32,
                        start_ms: rec.start_ms,
                        end_ms: 0,
                        flags: SpanFlag::NONE,
                    };
                } else if run.index_start == NO_MATCH {
                    run.index_start = j as u32;
                }
                run.index_end = j as u32 + 1;
                run.end_ms = rec.end_ms;
                run.flags |= SpanFlag::INEXACT | SpanFlag::MATCHED_INPUT | SpanFlag::MATCHED_REFERENCE;
            }
            (None, Some(j)) => {
                // Missing input: reference word the decoder dropped.
                if !in_run {
                    in_run = true;
                    run = SegmentedWordSpan {
                        index_start: j as u32,
                        index_end: j as u32,
                        start_ms: result.last().map(|s| s.end_ms).unwrap_or(0),
                        end_ms: 0,
                        flags: SpanFlag::NONE,
                    };
                }
                run.index_end = j as u32 + 1;
                run.flags |= SpanFlag::MATCHED_REFERENCE;
            }
            (Some(rec), None) => {
                // Spurious input: decoder heard something with no
                // reference counterpart.
                if !in_run {
                    in_run = true;
                    run = SegmentedWordSpan {
                        index_start: NO_MATCH,
                        index_end: NO_MATCH,
                        start_ms: rec.start_ms,
                        end_ms: 0,
                        flags: SpanFlag::NONE,
                    };
                }
                run.end_ms = rec.end_ms;
                run.flags |= SpanFlag::MATCHED_INPUT;
            }
            (None, None) => unreachable!("aligner never emits a pair with neither side set"),
        }
    }

    if in_run && worth_closing(&run) {
        result.push(run);
    }

    result
}
