//! Runs a single [`SegmentationJob`] end to end: dictionary
//! projection, audio loading, decode, MFCC, and the F→G→H pipeline
//! (SPEC_FULL §4.I, spec.md §4.I).

use std::collections::{HashMap, VecDeque};

use crate::aligner::align_words;
use crate::audiofile::load_clip;
use crate::decoder::Decoder;
use crate::dictionary::project_dictionary;
use crate::discriminator::{discriminate_silence_periods_msec, discriminate_transitions};
use crate::error::AlignError;
use crate::mfcc::MfccExtractor;
use crate::refiner::{refine_spans, SpanRefinerConfig};
use crate::span_builder::build_spans;
use crate::types::{SegmentationJob, SegmentationResult};

/// Decoder segmentation tokens that carry no lexical content and are
/// dropped before alignment (spec.md §4.I step 4).
const IGNORED_TOKENS: [&str; 3] = ["<s>", "</s>", "<sil>"];

/// One entry of the vestigial recursive sub-segmentation stack
/// (spec.md §9): currently always seeded with exactly one span
/// covering the whole clip and reference range, pushed once and
/// popped once. Kept as a real `VecDeque`-backed LIFO rather than
/// inlined, anticipating a future recursive refinement pass.
struct WorkSpan {
    reference_start: usize,
    reference_end: usize,
}

pub fn run_job<D: Decoder, M: MfccExtractor>(
    job: &SegmentationJob,
    decoder: &mut D,
    mfcc_extractor: &M,
    global_dictionary: &HashMap<String, String>,
) -> Result<SegmentationResult, AlignError> {
    let job_dictionary = project_dictionary(global_dictionary, &job.reference_words);
    decoder.configure(&job_dictionary)?;

    let clip = load_clip(&job.audio_path)?;
    let pcm = clip.pcm();
    let clip_length_ms = clip.length_ms();

    let mut stack: VecDeque<WorkSpan> = VecDeque::new();
    stack.push_back(WorkSpan {
        reference_start: 0,
        reference_end: job.reference_words.len(),
    });

    let mut spans = Vec::new();
    let mut stats = crate::types::SegmentationStats::default();

    while let Some(work) = stack.pop_back() {
        let reference_slice = &job.reference_words[work.reference_start..work.reference_end];

        let recognized = decoder.decode_utterance(&pcm)?;
        let recognized: Vec<_> = recognized
            .into_iter()
            .filter(|w| !IGNORED_TOKENS.contains(&w.text.as_str()))
            .collect();

        let mfcc = mfcc_extractor.compute(&pcm, crate::rates::WAV_SAMPLE_RATE_HZ)?;

        let (pairs, pass_stats) = align_words(&recognized, reference_slice);
        let mut pass_spans = build_spans(&pairs, reference_slice);

        let silences = discriminate_silence_periods_msec(&pcm, clip_length_ms);
        let transitions = discriminate_transitions(&pcm, &mfcc);

        let liaise_points: Vec<_> = job
            .liaise_points
            .iter()
            .filter(|p| {
                (p.index as usize) >= work.reference_start && (p.index as usize) < work.reference_end
            })
            .cloned()
            .collect();

        refine_spans(
            &mut pass_spans,
            clip_length_ms,
            &silences,
            &transitions,
            &liaise_points,
            &SpanRefinerConfig::default(),
        );

        stats.insertions += pass_stats.insertions;
        stats.deletions += pass_stats.deletions;
        stats.transpositions += pass_stats.transpositions;
        spans.extend(pass_spans);
    }

    Ok(SegmentationResult { spans, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::MockDecoder;
    use crate::mfcc::MockMfccExtractor;
    use std::io::Write;

    fn make_clip(samples: &[i16]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[0u8; 78]).unwrap();
        for s in samples {
            f.write_all(&s.to_le_bytes()).unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn runs_end_to_end_against_mock_decoder() {
        let reference = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let samples = vec![100i16; 16_000 * 2]; // 2s of nonzero audio
        let clip = make_clip(&samples);

        let job = SegmentationJob {
            surah: 1,
            ayah: 1,
            audio_path: clip.path().to_path_buf(),
            reference_words: reference.clone(),
            liaise_points: vec![],
        };

        let mut decoder = MockDecoder::identity(&reference, 300);
        let mfcc = MockMfccExtractor;
        let dictionary = HashMap::new();

        let result = run_job(&job, &mut decoder, &mfcc, &dictionary).unwrap();
        assert_eq!(result.stats, crate::types::SegmentationStats::default());
        assert_eq!(result.spans.len(), 3);
    }

    #[test]
    fn filters_segmentation_tokens_before_alignment() {
        let reference = vec!["a".to_string()];
        let samples = vec![100i16; 16_000];
        let clip = make_clip(&samples);

        let job = SegmentationJob {
            surah: 1,
            ayah: 1,
            audio_path: clip.path().to_path_buf(),
            reference_words: reference.clone(),
            liaise_points: vec![],
        };

        let mut decoder = MockDecoder::new(vec![
            crate::types::RecognizedWord {
                start_ms: 0,
                end_ms: 10,
                text: "<s>".to_string(),
            },
            crate::types::RecognizedWord {
                start_ms: 10,
                end_ms: 100,
                text: "a".to_string(),
            },
            crate::types::RecognizedWord {
                start_ms: 100,
                end_ms: 110,
                text: "</s>".to_string(),
            },
        ]);
        let mfcc = MockMfccExtractor;
        let dictionary = HashMap::new();

        let result = run_job(&job, &mut decoder, &mfcc, &dictionary).unwrap();
        assert_eq!(result.stats.deletions, 0);
        assert_eq!(result.stats.insertions, 0);
    }
}
