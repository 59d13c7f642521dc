//! Bounded worker-pool thread model draining a shared job queue
//! (SPEC_FULL §4.R, spec.md §5).

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::decoder::Decoder;
use crate::mfcc::MfccExtractor;
use crate::runner::run_job;
use crate::types::{SegmentationJob, SegmentationResult};

/// A completed or failed job, tagged so a failed decode doesn't lose
/// the rest of the run (spec.md §7: a per-job decoder failure is
/// recorded, not propagated).
pub struct JobOutcome {
    pub job: SegmentationJob,
    pub result: Result<SegmentationResult, crate::error::AlignError>,
}

fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Run every job in `jobs` across a bounded pool of worker threads.
/// `jobs_per_worker` is the default unless `worker_count` overrides it.
/// Each worker constructs its own `Decoder`/`MfccExtractor` via the
/// supplied factories — decoders are not thread-safe and must never be
/// shared (spec.md §5) — runs to completion, and pushes results into
/// its own local `Vec`; the pool join flattens those vectors without
/// imposing any cross-worker ordering.
pub fn run_pool<D, M, DF, MF>(
    jobs: Vec<SegmentationJob>,
    worker_count: Option<usize>,
    dictionary: Arc<HashMap<String, String>>,
    make_decoder: DF,
    make_mfcc: MF,
) -> Vec<JobOutcome>
where
    D: Decoder + Send + 'static,
    M: MfccExtractor + Send + 'static,
    DF: Fn() -> D + Send + Sync + 'static,
    MF: Fn() -> M + Send + Sync + 'static,
{
    let n = worker_count.unwrap_or_else(default_worker_count).max(1);
    let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
    let done = Arc::new(AtomicBool::new(false));

    let reporter = {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                let remaining = queue.lock().unwrap().len();
                log::info!("{remaining} jobs remaining in queue");
                thread::sleep(Duration::from_secs(1));
            }
        })
    };

    let make_decoder = Arc::new(make_decoder);
    let make_mfcc = Arc::new(make_mfcc);

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let make_decoder = Arc::clone(&make_decoder);
            let make_mfcc = Arc::clone(&make_mfcc);
            let dictionary = Arc::clone(&dictionary);
            thread::spawn(move || {
                let mut decoder = make_decoder();
                let mfcc = make_mfcc();
                let mut results = Vec::new();
                loop {
                    let job = {
                        let mut q = queue.lock().unwrap();
                        q.pop_front()
                    };
                    let job = match job {
                        Some(job) => job,
                        None => break,
                    };
                    let outcome = run_job(&job, &mut decoder, &mfcc, &dictionary);
                    results.push(JobOutcome {
                        job,
                        result: outcome,
                    });
                }
                results
            })
        })
        .collect();

    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().expect("worker thread panicked"));
    }

    done.store(true, Ordering::Relaxed);
    reporter.join().expect("reporter thread panicked");

    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::MockDecoder;
    use crate::mfcc::MockMfccExtractor;
    use crate::types::LiaisePoint;

    fn job(surah: u16, ayah: u16) -> SegmentationJob {
        SegmentationJob {
            surah,
            ayah,
            audio_path: "/nonexistent.wav".into(),
            reference_words: vec!["a".to_string()],
            liaise_points: Vec::<LiaisePoint>::new(),
        }
    }

    #[test]
    fn runs_every_job_exactly_once() {
        let jobs = vec![job(1, 1), job(1, 2), job(1, 3)];
        let outcomes = run_pool(
            jobs,
            Some(2),
            Arc::new(HashMap::new()),
            || MockDecoder::new(vec![]),
            MockMfccExtractor::default,
        );
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn empty_job_list_yields_no_outcomes() {
        let outcomes = run_pool(
            Vec::new(),
            Some(2),
            Arc::new(HashMap::new()),
            || MockDecoder::new(vec![]),
            MockMfccExtractor::default,
        );
        assert!(outcomes.is_empty());
    }
}
