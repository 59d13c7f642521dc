//! The external MFCC feature extractor, abstracted behind a trait
//! (SPEC_FULL §4.Q).

use crate::decoder::DecoderError;
use crate::rates::MFCC_FRAME_PERIOD_MS;

/// Computes 13-wide MFCC vectors at one frame per `MFCC_FRAME_PERIOD_MS`
/// of audio. Errors reuse [`DecoderError`] since both traits front
/// external engines with the same failure modes (backend crash,
/// misconfiguration).
pub trait MfccExtractor {
    fn compute(&self, pcm: &[i16], sample_rate_hz: u32) -> Result<Vec<[f32; 13]>, DecoderError>;
}

/// Deterministic extractor for tests: each frame's first coefficient is
/// the frame's RMS energy, the rest are its harmonics scaled down, so
/// that frames differ exactly when the underlying audio does and
/// `MfccTransitionDetector` tests stay reproducible without a real
/// feature extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockMfccExtractor;

impl MfccExtractor for MockMfccExtractor {
    fn compute(&self, pcm: &[i16], sample_rate_hz: u32) -> Result<Vec<[f32; 13]>, DecoderError> {
        let frame_len = (sample_rate_hz * MFCC_FRAME_PERIOD_MS / 1000) as usize;
        if frame_len == 0 {
            return Err(DecoderError::Backend("zero-length MFCC frame".into()));
        }

        let frames = pcm
            .chunks(frame_len)
            .map(|chunk| {
                let energy = (chunk.iter().map(|&s| (s as f64).powi(2)).sum::<f64>()
                    / chunk.len().max(1) as f64)
                    .sqrt() as f32;
                let mut frame = [0f32; 13];
                for (k, c) in frame.iter_mut().enumerate() {
                    *c = energy / (k as f32 + 1.0);
                }
                frame
            })
            .collect();

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_clip_length() {
        let pcm = vec![1000i16; 16_000]; // 1s at 16kHz
        let frames = MockMfccExtractor.compute(&pcm, 16_000).unwrap();
        assert_eq!(frames.len(), 100); // 10ms frames
    }

    #[test]
    fn silence_yields_zero_energy_frames() {
        let pcm = vec![0i16; 1600];
        let frames = MockMfccExtractor.compute(&pcm, 16_000).unwrap();
        assert!(frames.iter().all(|f| f[0] == 0.0));
    }

    #[test]
    fn louder_audio_yields_higher_first_coefficient() {
        let quiet = vec![10i16; 1600];
        let loud = vec![10_000i16; 1600];
        let quiet_frames = MockMfccExtractor.compute(&quiet, 16_000).unwrap();
        let loud_frames = MockMfccExtractor.compute(&loud, 16_000).unwrap();
        assert!(loud_frames[0][0] > quiet_frames[0][0]);
    }
}
