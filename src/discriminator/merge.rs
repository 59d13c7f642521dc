//! Chronological merge of the MFCC- and power-transition lists into a
//! single millisecond-indexed transition list.

use crate::rates::{mfcc_frame_to_msec, samples_to_msec};

/// Merge MFCC-frame transitions `mfcc` and power-sample transitions
/// `power` into msec, walking both ordered lists in lock-step and
/// emitting whichever side's next element converts to the smaller
/// msec value.
///
/// Known quirk, preserved from the source tool: this stops as soon as
/// *either* list is exhausted, silently dropping the tail of the
/// longer one. See [`merge_draining`] for the alternative that drains
/// both lists; spec.md §9 leaves the choice between the two an open
/// question and asks implementers to preserve the original behavior
/// for the production path.
pub fn merge_transitions(mfcc: &[u32], power: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut mi = 0;
    let mut pi = 0;

    while mi < mfcc.len() && pi < power.len() {
        let mfcc_ms = mfcc_frame_to_msec(mfcc[mi]);
        let power_ms = samples_to_msec(power[pi]);
        if mfcc_ms < power_ms {
            out.push(mfcc_ms);
            mi += 1;
        } else {
            out.push(power_ms);
            pi += 1;
        }
    }

    out
}

/// As [`merge_transitions`], but drains whichever list still has
/// elements once the other is exhausted, so no transition is dropped.
/// Not used by the production pipeline; kept for comparison and tests.
pub fn merge_draining(mfcc: &[u32], power: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut mi = 0;
    let mut pi = 0;

    loop {
        match (mi < mfcc.len(), pi < power.len()) {
            (true, true) => {
                let mfcc_ms = mfcc_frame_to_msec(mfcc[mi]);
                let power_ms = samples_to_msec(power[pi]);
                if mfcc_ms < power_ms {
                    out.push(mfcc_ms);
                    mi += 1;
                } else {
                    out.push(power_ms);
                    pi += 1;
                }
            }
            (true, false) => {
                out.push(mfcc_frame_to_msec(mfcc[mi]));
                mi += 1;
            }
            (false, true) => {
                out.push(samples_to_msec(power[pi]));
                pi += 1;
            }
            (false, false) => break,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_shorter_list() {
        let mfcc = [1, 2, 3]; // 10, 20, 30 ms
        let power = [160]; // 10 ms
        let merged = merge_transitions(&mfcc, &power);
        // power's single element (10ms) ties/loses to mfcc's first (10ms);
        // whichever is emitted first, the merge stops once one side drains.
        assert!(merged.len() <= mfcc.len().max(power.len()));
        assert!(merged.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn draining_keeps_every_element() {
        let mfcc = [1, 2, 3, 10];
        let power = [160];
        let merged = merge_draining(&mfcc, &power);
        assert_eq!(merged.len(), mfcc.len() + power.len());
        assert!(merged.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        assert!(merge_transitions(&[], &[]).is_empty());
        assert!(merge_draining(&[], &[]).is_empty());
    }
}
