//! Silence detection: a sliding RMS-power window with Schmitt-trigger
//! hysteresis over raw 16-bit PCM.

use crate::rates::{samples_to_msec, WAV_SAMPLE_RATE_HZ};

/// Width of the non-overlapping power window: 50 ms at 16 kHz.
pub const POWER_WINDOW: usize = 800;

const ENTER_SILENCE_DBFS: f32 = -100.0;
const EXIT_SILENCE_DBFS: f32 = -75.0;

/// RMS power of `window`, in dBFS, following the `20 * log10(sum(x^2) /
/// (POWER_WINDOW / 2))` convention used throughout this module (`x` is
/// the sample normalized to `[-1, 1]`).
fn window_power_dbfs(window: &[i16]) -> f32 {
    let sum: f32 = window
        .iter()
        .map(|&s| {
            let x = s as f32 / 32768.0;
            x * x
        })
        .sum();
    20.0 * (sum / (POWER_WINDOW as f32 / 2.0)).log10()
}

/// Ordered list of `(start_ms, end_ms)` silence intervals found in
/// `audio`. Silence running off the beginning or end of the clip
/// (never exited) is not emitted.
pub fn discriminate_silence_periods(audio: &[i16]) -> Vec<(u32, u32)> {
    let mut results = Vec::new();
    let mut in_silence = false;
    let mut silence_start_ms = 0u32;

    let mut i = POWER_WINDOW;
    while i < audio.len() {
        let window = &audio[i - POWER_WINDOW..i];
        let power = window_power_dbfs(window);
        let right_edge_ms = samples_to_msec(i as u32);

        if !in_silence && power < ENTER_SILENCE_DBFS {
            in_silence = true;
            silence_start_ms = right_edge_ms;
        } else if in_silence && power > EXIT_SILENCE_DBFS {
            in_silence = false;
            results.push((silence_start_ms, right_edge_ms));
        }

        i += POWER_WINDOW;
    }

    results
}

/// Convenience wrapper taking an explicit clip length in milliseconds,
/// matching the signature spec.md §4.B describes. The length is only
/// used to bound how much of `audio` is scanned; `audio` must already
/// be sized to at least `length_msec` worth of samples.
pub fn discriminate_silence_periods_msec(audio: &[i16], length_msec: u32) -> Vec<(u32, u32)> {
    let max_samples = (length_msec as usize) * (WAV_SAMPLE_RATE_HZ as usize / 1000);
    let bounded = &audio[..audio.len().min(max_samples)];
    discriminate_silence_periods(bounded)
}
