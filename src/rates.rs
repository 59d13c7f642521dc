//! Pure conversions between msec, 16 kHz PCM sample indices, and 10 ms
//! MFCC frame indices. Every other component routes its time arithmetic
//! through here rather than hard-coding the constants locally.

/// Frame period of the MFCC feature stream, in milliseconds.
pub const MFCC_FRAME_PERIOD_MS: u32 = 10;

/// Sample rate of the input PCM, in Hz.
pub const WAV_SAMPLE_RATE_HZ: u32 = 16_000;

const SAMPLES_PER_MS: u32 = WAV_SAMPLE_RATE_HZ / 1000;

/// Convert milliseconds to a sample index at [`WAV_SAMPLE_RATE_HZ`].
pub fn msec_to_samples(msec: u32) -> u32 {
    msec * SAMPLES_PER_MS
}

/// Convert a sample index at [`WAV_SAMPLE_RATE_HZ`] to milliseconds.
pub fn samples_to_msec(samples: u32) -> u32 {
    samples / SAMPLES_PER_MS
}

/// Convert milliseconds to a 10 ms MFCC frame index.
pub fn msec_to_mfcc_frame(msec: u32) -> u32 {
    msec / MFCC_FRAME_PERIOD_MS
}

/// Convert a 10 ms MFCC frame index to milliseconds.
pub fn mfcc_frame_to_msec(frame: u32) -> u32 {
    frame * MFCC_FRAME_PERIOD_MS
}
