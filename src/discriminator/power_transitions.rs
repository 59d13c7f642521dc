//! Power-transition detection: online-variance peak detector over the
//! velocity of RMS power between successive 50 ms windows.
//!
//! The online moments use a blended update (incremental mean folded
//! through an exponential decay) rather than a plain running variance;
//! spec.md §9 notes this is deliberate even though it looks unusual,
//! and that the mean's sample count is unbounded while the variance's
//! is clamped at 100. Both are preserved here exactly.

use super::silence::POWER_WINDOW;

const SKIP_SAMPLES: usize = 16 * 30; // 30ms beyond the initial window.
const VELOCITY_CAP: f32 = 10.0;
const A_MEAN: f32 = 0.99;
const A_VAR: f32 = 0.97;
const THRESHOLD_MULTIPLIER: f32 = 1.6;
const SILENCE_DBFS: f32 = -75.0;
const VAR_SAMPLE_CAP: usize = 100;

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

/// Ordered sample indices marking onsets of power-velocity peaks.
pub fn discriminate_transitions_power(audio: &[i16]) -> Vec<u32> {
    let mut last_power = 0.0f32;
    let mut mean_vel = 0.0f32;
    let mut m2_vel = 0.0f32;
    let mut n_samples: u32 = 0;
    let mut in_peak = false;
    let mut transitions = Vec::new();

    let mut i = POWER_WINDOW + SKIP_SAMPLES;
    while i < audio.len() {
        let window = &audio[i - POWER_WINDOW..i];
        let sum: f32 = window
            .iter()
            .map(|&s| {
                let x = s as f32 / 32768.0;
                x * x
            })
            .sum();

        if sum == 0.0 {
            i += POWER_WINDOW;
            continue;
        }
        n_samples += 1;

        let power = 20.0 * (sum / (POWER_WINDOW as f32 / 2.0)).log10();
        if power < SILENCE_DBFS {
            i += POWER_WINDOW;
            continue;
        }

        if last_power == 0.0 {
            last_power = power;
        }
        let vel = (power - last_power).abs().min(VELOCITY_CAP);
        last_power = power;

        let delta = vel - mean_vel;
        mean_vel = (mean_vel + delta / n_samples as f32) * A_MEAN + (1.0 - A_MEAN) * vel;
        m2_vel = (m2_vel + delta * (vel - mean_vel)) * A_VAR;

        if n_samples > 1 {
            let divisor = (n_samples - 1).min(VAR_SAMPLE_CAP as u32) as f32;
            let threshold = mean_vel + (m2_vel / divisor).sqrt() * THRESHOLD_MULTIPLIER;
            if vel > threshold {
                if !in_peak {
                    transitions.push((i - POWER_WINDOW) as u32);
                }
                in_peak = true;
            } else {
                in_peak = false;
            }
        }

        i += POWER_WINDOW;
    }

    transitions
}
