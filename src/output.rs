//! Muqata'at span collapsing and JSON result serialization
//! (SPEC_FULL §4.S, spec.md §6).

use serde_json::{json, Value};

use crate::types::{SegmentationJob, SegmentationResult, SegmentedWordSpan, NO_MATCH};

/// Collapse consecutive reference words that begin with `_` (muqata'at
/// markers) into a single span. A merely-empty reference word
/// following a `_`-prefixed one also extends the collapse in
/// progress — the source conflates these two conditions, and this is
/// reproduced exactly rather than fixed (see DESIGN.md).
///
/// Spans after a collapse have their reference indices decremented by
/// `(collapsed_count - 1)`.
pub fn collapse_muqatat(
    spans: &[SegmentedWordSpan],
    reference_words: &[String],
) -> Vec<SegmentedWordSpan> {
    let mut out: Vec<SegmentedWordSpan> = Vec::with_capacity(spans.len());
    let mut shift: u32 = 0;
    let mut collapsing = false;

    for span in spans {
        let starts_muqatat = span
            .index_start_opt()
            .and_then(|i| reference_words.get(i as usize))
            .map(|w| w.starts_with('_'))
            .unwrap_or(false);
        let empty_continuation = collapsing
            && span
                .index_start_opt()
                .and_then(|i| reference_words.get(i as usize))
                .map(|w| w.is_empty())
                .unwrap_or(false);

        if (starts_muqatat || empty_continuation) && !out.is_empty() {
            collapsing = true;
            let last = out.last_mut().unwrap();
            last.index_end = span.index_end;
            last.end_ms = span.end_ms;
            shift += 1;
            continue;
        }
        collapsing = starts_muqatat;

        let mut shifted = *span;
        if shifted.index_start != NO_MATCH {
            shifted.index_start -= shift;
        }
        if shifted.index_end != NO_MATCH {
            shifted.index_end -= shift;
        }
        out.push(shifted);
    }

    out
}

/// Build the `{surah, ayah, stats, segments}` JSON document (spec.md
/// §6). `NO_MATCH` indices serialize as `null` rather than the raw
/// `4294967295` sentinel the source tool prints.
pub fn to_json(results: &[(SegmentationJob, SegmentationResult)]) -> Value {
    let entries: Vec<Value> = results
        .iter()
        .map(|(job, result)| {
            let segments: Vec<Value> = result
                .spans
                .iter()
                .map(|s| {
                    json!([
                        s.index_start_opt(),
                        s.index_end_opt(),
                        s.start_ms,
                        s.end_ms,
                    ])
                })
                .collect();

            json!({
                "surah": job.surah,
                "ayah": job.ayah,
                "stats": {
                    "insertions": result.stats.insertions,
                    "deletions": result.stats.deletions,
                    "transpositions": result.stats.transpositions,
                },
                "segments": segments,
            })
        })
        .collect();

    Value::Array(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SegmentationStats, SpanFlag};

    fn span(index_start: u32, index_end: u32, start_ms: u32, end_ms: u32) -> SegmentedWordSpan {
        SegmentedWordSpan {
            index_start,
            index_end,
            start_ms,
            end_ms,
            flags: SpanFlag::EXACT,
        }
    }

    #[test]
    fn collapses_consecutive_muqatat_tokens() {
        let reference = vec![
            "_alif".to_string(),
            "_lam".to_string(),
            "_meem".to_string(),
            "allah".to_string(),
        ];
        let spans = vec![
            span(0, 1, 0, 100),
            span(1, 2, 100, 200),
            span(2, 3, 200, 300),
            span(3, 4, 300, 400),
        ];
        let collapsed = collapse_muqatat(&spans, &reference);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].index_start, 0);
        assert_eq!(collapsed[0].index_end, 3);
        assert_eq!(collapsed[0].end_ms, 300);
        assert_eq!(collapsed[1].index_start, 1);
        assert_eq!(collapsed[1].index_end, 2);
    }

    #[test]
    fn empty_word_after_muqatat_extends_the_collapse() {
        let reference = vec!["_alif".to_string(), "".to_string(), "allah".to_string()];
        let spans = vec![span(0, 1, 0, 100), span(1, 2, 100, 200), span(2, 3, 200, 300)];
        let collapsed = collapse_muqatat(&spans, &reference);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].index_end, 2);
        assert_eq!(collapsed[1].index_start, 1);
    }

    #[test]
    fn no_match_spans_pass_through_untouched() {
        let reference = vec!["a".to_string(), "b".to_string()];
        let spans = vec![
            span(0, 1, 0, 100),
            SegmentedWordSpan {
                index_start: NO_MATCH,
                index_end: NO_MATCH,
                start_ms: 100,
                end_ms: 150,
                flags: SpanFlag::MATCHED_INPUT,
            },
            span(1, 2, 150, 250),
        ];
        let collapsed = collapse_muqatat(&spans, &reference);
        assert_eq!(collapsed.len(), 3);
        assert_eq!(collapsed[1].index_start, NO_MATCH);
    }

    #[test]
    fn json_shape_matches_spec() {
        let job = SegmentationJob {
            surah: 1,
            ayah: 1,
            audio_path: "x.wav".into(),
            reference_words: vec!["a".to_string()],
            liaise_points: vec![],
        };
        let result = SegmentationResult {
            spans: vec![span(0, 1, 0, 100)],
            stats: SegmentationStats {
                insertions: 1,
                deletions: 0,
                transpositions: 2,
            },
        };
        let doc = to_json(&[(job, result)]);
        assert_eq!(doc[0]["surah"], 1);
        assert_eq!(doc[0]["stats"]["transpositions"], 2);
        assert_eq!(doc[0]["segments"][0], json!([0, 1, 0, 100]));
    }

    #[test]
    fn no_match_serializes_as_null() {
        let job = SegmentationJob {
            surah: 1,
            ayah: 1,
            audio_path: "x.wav".into(),
            reference_words: vec![],
            liaise_points: vec![],
        };
        let result = SegmentationResult {
            spans: vec![SegmentedWordSpan {
                index_start: NO_MATCH,
                index_end: NO_MATCH,
                start_ms: 0,
                end_ms: 50,
                flags: SpanFlag::MATCHED_INPUT,
            }],
            stats: SegmentationStats::default(),
        };
        let doc = to_json(&[(job, result)]);
        assert_eq!(doc[0]["segments"][0], json!([null, null, 0, 50]));
    }
}
