//! Needleman-Wunsch-style global alignment between the recognized word
//! stream and the reference word list.

use crate::types::{RecognizedWord, SegmentationStats};

const MISMATCH_PENALTY: u32 = 1;
const GAP_PENALTY: u32 = 1;

/// Compact back-pointer tag. `I` = skip a recognized word (gap in the
/// reference axis), `J` = skip a reference word (gap in the input
/// axis), `Both` = consume one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Pick {
    I = 1,
    J = 2,
    Both = 3,
}

/// One slot of the backtraced alignment: `input` borrows the matched
/// recognized word (`None` if this reference word has no input
/// counterpart), `ref_idx` is the matched reference index (`None` if
/// this recognized word is spurious).
#[derive(Debug, Clone, Copy)]
pub struct AlignedPair<'a> {
    pub input: Option<&'a RecognizedWord>,
    pub ref_idx: Option<usize>,
}

/// Run the DP alignment and return the backtraced pair sequence plus
/// the accumulated [`SegmentationStats`].
///
/// Tie-break priority when multiple back-pointer choices tie for the
/// minimum cost is `Both` first, then `I`, then `J` — load-bearing,
/// changing it changes which spans get emitted downstream.
pub fn align_words<'a>(
    recognized: &'a [RecognizedWord],
    reference: &[String],
) -> (Vec<AlignedPair<'a>>, SegmentationStats) {
    let rows = recognized.len() + 1;
    let cols = reference.len() + 1;
    let idx = |i: usize, j: usize| i * cols + j;

    let mut cost = vec![0u32; rows * cols];
    let mut back = vec![Pick::Both; rows * cols];

    for i in 0..rows {
        cost[idx(i, 0)] = i as u32;
        back[idx(i, 0)] = Pick::I;
    }
    for j in 0..cols {
        cost[idx(0, j)] = j as u32;
        back[idx(0, j)] = Pick::J;
    }

    for i in 1..rows {
        for j in 1..cols {
            let match_cost = if recognized[i - 1].text == reference[j - 1] {
                0
            } else {
                MISMATCH_PENALTY
            };
            let cost_both = cost[idx(i - 1, j - 1)] + match_cost;
            let cost_i = cost[idx(i - 1, j)] + GAP_PENALTY;
            let cost_j = cost[idx(i, j - 1)] + GAP_PENALTY;

            let (pick, c) = if cost_both <= cost_i && cost_both <= cost_j {
                (Pick::Both, cost_both)
            } else if cost_i <= cost_both && cost_i <= cost_j {
                (Pick::I, cost_i)
            } else {
                (Pick::J, cost_j)
            };
            back[idx(i, j)] = pick;
            cost[idx(i, j)] = c;
        }
    }

    // Backtrace, producing pairs in reverse order.
    let mut pairs_rev: Vec<(Option<usize>, Option<usize>)> = Vec::new();
    let mut i = recognized.len();
    let mut j = reference.len();
    while i != 0 && j != 0 {
        match back[idx(i, j)] {
            Pick::Both => {
                i -= 1;
                j -= 1;
                pairs_rev.push((Some(i), Some(j)));
            }
            Pick::I => {
                i -= 1;
                pairs_rev.push((Some(i), None));
            }
            Pick::J => {
                j -= 1;
                pairs_rev.push((None, Some(j)));
            }
        }
    }
    // Every reference word must appear in exactly one aligned pair; if
    // we ran out of recognized words first, drain the rest of the
    // reference axis. We never drain leftover recognized words: those
    // would only remain if j reached 0 first, in which case they were
    // already fully consumed by the `i != 0 && j != 0` loop above
    // reaching j == 0 — nothing is left to drain on that axis.
    while j != 0 {
        j -= 1;
        pairs_rev.push((None, Some(j)));
    }
    pairs_rev.reverse();

    let mut stats = SegmentationStats::default();
    let pairs = pairs_rev
        .into_iter()
        .map(|(input_idx, ref_idx)| {
            match (input_idx, ref_idx) {
                (Some(_), None) => stats.deletions += 1,
                (None, Some(_)) => stats.insertions += 1,
                (Some(ii), Some(rj)) if recognized[ii].text != reference[rj] => {
                    stats.transpositions += 1
                }
                _ => {}
            }
            AlignedPair {
                input: input_idx.map(|ii| &recognized[ii]),
                ref_idx,
            }
        })
        .collect();

    (pairs, stats)
}
