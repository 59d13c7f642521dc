//! Signal-level discriminators: silence detection and the two
//! transition detectors (power-velocity and MFCC-velocity), merged
//! into one chronological transition list.

pub mod merge;
pub mod mfcc_transitions;
pub mod power_transitions;
pub mod silence;

pub use merge::merge_transitions;
pub use mfcc_transitions::discriminate_transitions_mfcc;
pub use power_transitions::discriminate_transitions_power;
pub use silence::{discriminate_silence_periods, discriminate_silence_periods_msec};

/// Run both transition detectors and merge them into a single
/// msec-indexed list, per spec.md §4.I step 6 / §4.E.
pub fn discriminate_transitions(audio: &[i16], mfcc: &[[f32; 13]]) -> Vec<u32> {
    let power = discriminate_transitions_power(audio);
    let mfcc_tn = discriminate_transitions_mfcc(mfcc);
    merge_transitions(&mfcc_tn, &power)
}
