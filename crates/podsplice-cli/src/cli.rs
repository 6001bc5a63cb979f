//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "podsplice")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Apply reviewed deletions to a podcast recording with seamless splices", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a recording with its deletions removed
    Cut(CutArgs),

    /// Resolve deletions and print the keep segments, without touching audio
    Plan(PlanArgs),

    /// Shorten long pauses in a finished recording
    TrimSilences(TrimArgs),
}

#[derive(Debug, Args)]
pub struct CutArgs {
    /// Output file; the extension picks the delivery format
    pub output: PathBuf,

    /// Source recording
    pub source: PathBuf,

    /// Reviewed deletions (JSON list or {"segments": [...]})
    pub deletions: PathBuf,

    /// Word-level transcript with speakers; enables loudness compensation
    #[arg(long)]
    pub speakers_json: Option<PathBuf>,

    /// Use click-suppressing fades only
    #[arg(long)]
    pub no_fade: bool,

    /// Extra deletions from the repeated-phrase detector
    #[arg(long)]
    pub phrase_repeats: Option<PathBuf>,

    /// Extra deletions carried over from the original review document
    #[arg(long)]
    pub original_deletions: Option<PathBuf>,

    /// Extra deletions from fast-mode filters
    #[arg(long)]
    pub fast_filter: Option<PathBuf>,

    /// Write the keep segments as JSON
    #[arg(long)]
    pub keep_segments_out: Option<PathBuf>,

    /// Write the run report as JSON
    #[arg(long)]
    pub report_out: Option<PathBuf>,

    /// Bitrate for lossy output (e.g. 64k)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Scratch parent directory (overrides SPLICE_WORK_DIR)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Reviewed deletions (JSON list or {"segments": [...]})
    pub deletions: PathBuf,

    /// Length of the recording in seconds
    #[arg(long)]
    pub duration: f64,

    /// Write the keep segments here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TrimArgs {
    /// Recording to trim
    pub input: PathBuf,

    /// Output file (default: <input>_trimmed.<ext>)
    pub output: Option<PathBuf>,

    /// Pauses at least this long are trimmed (seconds)
    #[arg(long, default_value_t = 0.8)]
    pub threshold: f64,

    /// Length each trimmed pause keeps (seconds)
    #[arg(long, default_value_t = 0.6)]
    pub target: f64,

    /// Silence level (dB)
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    pub noise: f64,

    /// Bitrate for lossy output (e.g. 64k)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Scratch parent directory (overrides SPLICE_WORK_DIR)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}
