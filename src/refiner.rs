//! Post-processes the raw span list from [`crate::span_builder`] against
//! silence intervals, transition points and liaison points (spec.md
//! §4.H). Five passes, strict order.

use crate::types::{LiaisePoint, SegmentedWordSpan, SpanFlag};

const MIN_WORD_LEN_MS: u32 = 100;
const MAX_BACKTRACK_MS: i64 = 300;
const INTERWORD_DELAY_MS: u32 = 10;

/// Tunables exposed for parity with the source tool. `forward_derate`
/// is read but never set to anything other than `1.0` by the driver —
/// the "prefer forward transitions" knob it once gated is dead code,
/// kept here only so a caller can exercise it in tests.
#[derive(Debug, Clone, Copy)]
pub struct SpanRefinerConfig {
    pub forward_derate: f32,
}

impl Default for SpanRefinerConfig {
    fn default() -> SpanRefinerConfig {
        SpanRefinerConfig { forward_derate: 1.0 }
    }
}

/// Run all five refinement passes in place.
pub fn refine_spans(
    spans: &mut Vec<SegmentedWordSpan>,
    clip_length_ms: u32,
    silences: &[(u32, u32)],
    transitions: &[u32],
    liaise_points: &[LiaisePoint],
    config: &SpanRefinerConfig,
) {
    pass1_end_time_patch(spans, clip_length_ms);
    pass2_drop_infeasible(spans);
    pass3_shift_starts_out_of_silences(spans, silences);
    pass4_liaison_resolution(spans, transitions, liaise_points, config);
    pass5_fix_word_endings(spans, silences);
    log_sanity_violations(spans);
}

fn pass1_end_time_patch(spans: &mut [SegmentedWordSpan], clip_length_ms: u32) {
    if let Some(last) = spans.last_mut() {
        if last.end_ms == 0 {
            last.end_ms = clip_length_ms;
        }
    }
}

/// Runs of unmatched reference words compressed into a sliver of audio
/// would yield impossible word rates; drop them.
fn pass2_drop_infeasible(spans: &mut Vec<SegmentedWordSpan>) {
    spans.retain(|s| {
        if s.flags.contains(SpanFlag::MATCHED_INPUT) {
            return true;
        }
        let word_count = s.index_end.saturating_sub(s.index_start);
        let duration = s.end_ms.saturating_sub(s.start_ms);
        duration >= word_count * MIN_WORD_LEN_MS
    });
}

fn pass3_shift_starts_out_of_silences(spans: &mut [SegmentedWordSpan], silences: &[(u32, u32)]) {
    let mut si = 0;
    for span in spans.iter_mut() {
        while si < silences.len() && silences[si].1 < span.start_ms {
            si += 1;
        }
        if si < silences.len() {
            let (sil_start, sil_end) = silences[si];
            if span.start_ms > sil_start && span.start_ms < sil_end {
                span.start_ms = sil_end;
            }
        }
    }
}

fn pass4_liaison_resolution(
    spans: &mut [SegmentedWordSpan],
    transitions: &[u32],
    liaise_points: &[LiaisePoint],
    config: &SpanRefinerConfig,
) {
    for pt in liaise_points {
        let idx = pt.index as u32;
        let pos = match spans
            .iter()
            .position(|s| s.index_start <= idx && idx < s.index_end)
        {
            Some(pos) => pos,
            None => continue,
        };

        let s_start = spans[pos].start_ms;
        let s_end = spans[pos].end_ms;

        let mut best_t: Option<u32> = None;
        let mut best_cost = f32::MAX;
        for &t in transitions {
            if t >= s_end {
                continue;
            }
            let backtrack = s_start as i64 - t as i64;
            if backtrack >= MAX_BACKTRACK_MS {
                continue;
            }
            let cost = (s_start as f32 - t as f32).abs() * config.forward_derate;
            if cost < best_cost {
                best_cost = cost;
                best_t = Some(t);
            } else {
                break;
            }
        }

        if let Some(best_t) = best_t {
            if pos > 0 {
                spans[pos - 1].end_ms = best_t;
                spans[pos].start_ms = best_t + INTERWORD_DELAY_MS;
            } else {
                spans[pos].start_ms = best_t;
            }
        }
    }
}

fn pass5_fix_word_endings(spans: &mut [SegmentedWordSpan], silences: &[(u32, u32)]) {
    let mut si = 0;
    let n = spans.len();
    for i in 0..n {
        if i + 1 < n {
            let end = spans[i].end_ms;
            while si < silences.len() && silences[si].1 <= end {
                si += 1;
            }
            let next_start = spans[i + 1].start_ms;
            if si < silences.len() && silences[si].1 > end && silences[si].0 < next_start {
                spans[i].end_ms = silences[si].0;
            } else {
                spans[i].end_ms = next_start.saturating_sub(INTERWORD_DELAY_MS);
            }
        } else if let Some(&(sil_start, _)) = silences.iter().find(|&&(_, e)| e > spans[i].end_ms) {
            spans[i].end_ms = sil_start;
        }
    }
}

fn log_sanity_violations(spans: &[SegmentedWordSpan]) {
    for (i, s) in spans.iter().enumerate() {
        if s.end_ms < s.start_ms {
            log::warn!(
                "span {} ends ({}) before it starts ({}); matching may have been poor",
                i, s.end_ms, s.start_ms
            );
        }
        if let Some(next) = spans.get(i + 1) {
            if s.end_ms > next.start_ms {
                log::warn!(
                    "span {} ends ({}) after successor span {} starts ({})",
                    i, s.end_ms, i + 1, next.start_ms
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(index_start: u32, index_end: u32, start_ms: u32, end_ms: u32) -> SegmentedWordSpan {
        SegmentedWordSpan {
            index_start,
            index_end,
            start_ms,
            end_ms,
            flags: SpanFlag::MATCHED_INPUT | SpanFlag::MATCHED_REFERENCE,
        }
    }

    #[test]
    fn pass1_patches_zero_end_of_last_span() {
        let mut spans = vec![span(0, 1, 0, 100), span(1, 2, 100, 0)];
        pass1_end_time_patch(&mut spans, 500);
        assert_eq!(spans[1].end_ms, 500);
    }

    #[test]
    fn pass1_leaves_nonzero_end_alone() {
        let mut spans = vec![span(0, 1, 0, 100)];
        pass1_end_time_patch(&mut spans, 500);
        assert_eq!(spans[0].end_ms, 100);
    }

    #[test]
    fn pass2_drops_short_unmatched_run() {
        let mut spans = vec![SegmentedWordSpan {
            index_start: 1,
            index_end: 3,
            start_ms: 100,
            end_ms: 150, // 50ms for 2 words < 200ms required
            flags: SpanFlag::MATCHED_REFERENCE,
        }];
        pass2_drop_infeasible(&mut spans);
        assert!(spans.is_empty());
    }

    #[test]
    fn pass2_keeps_matched_input_regardless_of_length() {
        let mut spans = vec![SegmentedWordSpan {
            index_start: crate::types::NO_MATCH,
            index_end: crate::types::NO_MATCH,
            start_ms: 100,
            end_ms: 101,
            flags: SpanFlag::MATCHED_INPUT,
        }];
        pass2_drop_infeasible(&mut spans);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn s5_silence_shift() {
        let mut spans = vec![span(0, 1, 150, 300)];
        pass3_shift_starts_out_of_silences(&mut spans, &[(120, 200)]);
        assert_eq!(spans[0].start_ms, 200);
    }

    #[test]
    fn s6_liaison_snap() {
        let mut spans = vec![span(0, 2, 100, 500), span(2, 3, 500, 700)];
        let liaise = vec![LiaisePoint {
            index: 2,
            flags: crate::types::LiaiseFlags::NONE,
        }];
        pass4_liaison_resolution(&mut spans, &[490, 520, 680], &liaise, &SpanRefinerConfig::default());
        assert_eq!(spans[0].end_ms, 490);
        assert_eq!(spans[1].start_ms, 500);
    }

    #[test]
    fn pass4_first_span_has_no_predecessor_to_adjust() {
        let mut spans = vec![span(0, 1, 500, 700)];
        let liaise = vec![LiaisePoint {
            index: 0,
            flags: crate::types::LiaiseFlags::NONE,
        }];
        pass4_liaison_resolution(&mut spans, &[490], &liaise, &SpanRefinerConfig::default());
        assert_eq!(spans[0].start_ms, 490);
    }

    #[test]
    fn pass5_snaps_to_intervening_silence() {
        let mut spans = vec![span(0, 1, 0, 190), span(1, 2, 220, 400)];
        pass5_fix_word_endings(&mut spans, &[(195, 210)]);
        assert_eq!(spans[0].end_ms, 195);
    }

    #[test]
    fn pass5_falls_back_to_interword_delay() {
        let mut spans = vec![span(0, 1, 0, 190), span(1, 2, 200, 400)];
        pass5_fix_word_endings(&mut spans, &[]);
        assert_eq!(spans[0].end_ms, 190); // 200 - INTERWORD_DELAY_MS
    }

    #[test]
    fn pass5_final_span_snaps_to_trailing_silence() {
        let mut spans = vec![span(0, 1, 0, 380)];
        pass5_fix_word_endings(&mut spans, &[(390, 450)]);
        assert_eq!(spans[0].end_ms, 390);
    }

    #[test]
    fn full_pipeline_keeps_spans_sorted_and_nonoverlapping() {
        let mut spans = vec![span(0, 1, 0, 100), span(1, 2, 110, 0), span(2, 3, 210, 300)];
        refine_spans(&mut spans, 350, &[], &[], &[], &SpanRefinerConfig::default());
        for w in spans.windows(2) {
            assert!(w[0].start_ms <= w[1].start_ms);
        }
    }
}
