//! `align` — forced-alignment CLI (SPEC_FULL §4.J, spec.md §6).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use ayah_align::audiofile::parse_clip_filename;
use ayah_align::decoder::MockDecoder;
use ayah_align::dictionary::load_dictionary;
use ayah_align::error::AlignError;
use ayah_align::liaison::load_liaise_points;
use ayah_align::mfcc::MockMfccExtractor;
use ayah_align::output::{collapse_muqatat, to_json};
use ayah_align::reftext::load_reference_text;
use ayah_align::types::{AyahKey, SegmentationJob};
use ayah_align::worker::run_pool;

/// Forced-alignment of Qur'anic recitation audio against a known
/// reference text.
#[derive(Parser, Debug)]
#[command(name = "align", author, version, about)]
struct Args {
    /// Tanzil.net-format reference text file.
    reference_text: PathBuf,

    /// Liaison-points file.
    liaise_file: PathBuf,

    /// Decoder configuration file, handed through to the external
    /// speech engine (unused by the built-in mock decoder).
    decoder_cfg: PathBuf,

    /// One or more `..._SSSAAA.wav` recitation clips to align.
    #[arg(required = true)]
    clips: Vec<PathBuf>,

    /// Raise log verbosity.
    #[arg(short, long)]
    verbose: bool,

    /// Worker thread count override (default: hardware parallelism).
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Write JSON output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn build_jobs(
    args: &Args,
    reference: &HashMap<AyahKey, Vec<String>>,
    liaise: &HashMap<AyahKey, Vec<ayah_align::types::LiaisePoint>>,
) -> Result<Vec<SegmentationJob>, AlignError> {
    let mut jobs = Vec::with_capacity(args.clips.len());
    for clip in &args.clips {
        let (surah, ayah) = parse_clip_filename(clip)?;
        let key = AyahKey::new(surah, ayah);
        let reference_words = reference.get(&key).cloned().unwrap_or_default();
        let liaise_points = liaise.get(&key).cloned().unwrap_or_default();
        jobs.push(SegmentationJob {
            surah,
            ayah,
            audio_path: clip.clone(),
            reference_words,
            liaise_points,
        });
    }
    Ok(jobs)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let reference = load_reference_text(&args.reference_text)?;
    let liaise = load_liaise_points(&args.liaise_file)?;
    let dictionary = load_dictionary(&args.decoder_cfg)?;

    let jobs = build_jobs(&args, &reference, &liaise)?;
    info!("running {} job(s)", jobs.len());

    let outcomes = run_pool(
        jobs,
        args.jobs,
        Arc::new(dictionary),
        || MockDecoder::new(Vec::new()),
        MockMfccExtractor::default,
    );

    let mut pairs = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(mut result) => {
                result.spans = collapse_muqatat(&result.spans, &outcome.job.reference_words);
                if result.spans.len() != outcome.job.reference_words.len() {
                    warn!(
                        "surah {} ayah {}: {} spans for {} reference words after muqata'at collapse",
                        outcome.job.surah,
                        outcome.job.ayah,
                        result.spans.len(),
                        outcome.job.reference_words.len()
                    );
                }
                pairs.push((outcome.job, result));
            }
            Err(e) => {
                error!("surah {} ayah {} failed: {e}", outcome.job.surah, outcome.job.ayah);
            }
        }
    }

    let doc = to_json(&pairs);
    let text = serde_json::to_string_pretty(&doc).expect("JSON serialization cannot fail here");

    match &args.output {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }

    Ok(())
}
