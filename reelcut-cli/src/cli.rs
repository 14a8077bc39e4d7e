// reelcut-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelcut: Scene-split clip publishing",
    long_about = "Splits a video into scene-aligned clips and schedules them as reels via reelcut-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Splits one source video into clips and publishes them on a schedule
    Run(RunArgs),
}

#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["input", "url"]),
))]
pub struct RunArgs {
    // --- Source ---
    /// Local source video
    #[arg(short = 'i', long = "input", value_name = "VIDEO")]
    pub input: Option<PathBuf>,

    /// Remote source video, fetched with yt-dlp
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: Option<String>,

    // --- Clips ---
    /// Maximum clip length in seconds
    #[arg(short = 'm', long = "max-length", value_name = "SECONDS")]
    pub max_length: Option<f64>,

    /// Image overlaid on every clip
    #[arg(short = 'w', long, value_name = "IMAGE")]
    pub watermark: Option<PathBuf>,

    /// Clip descriptions read "<DESCRIPTION> <n>"
    #[arg(short = 'd', long, value_name = "TEXT", default_value = "")]
    pub description: String,

    /// Scene change threshold between 0 and 1 (lower finds more cuts)
    #[arg(long, value_name = "SCORE", env = "REELCUT_SCENE_THRESHOLD")]
    pub scene_threshold: Option<f64>,

    // --- Publishing ---
    /// Page that receives the reels
    #[arg(long, value_name = "ID", env = "REELCUT_PAGE_ID")]
    pub page_id: String,

    /// Page access token
    #[arg(long, value_name = "TOKEN", env = "REELCUT_PAGE_TOKEN", hide_env_values = true)]
    pub page_token: String,

    // --- Schedule Overrides ---
    /// Publish slots per day
    #[arg(long, value_name = "COUNT")]
    pub clips_per_day: Option<u32>,

    /// Hour of the first slot each day (UTC)
    #[arg(long, value_name = "HOUR", value_parser = clap::value_parser!(u32).range(0..=23))]
    pub start_hour: Option<u32>,

    /// Minutes between slots within a day
    #[arg(long, value_name = "MINUTES")]
    pub interval_minutes: Option<u32>,

    // --- Execution ---
    /// Clips processed at the same time
    #[arg(short = 'j', long, value_name = "WORKERS")]
    pub concurrency: Option<usize>,

    /// Attempts per external operation, including the first
    #[arg(long, value_name = "COUNT")]
    pub retry_attempts: Option<u32>,

    /// Parent directory for the per-batch scratch area
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Keep the scratch area after the batch finishes
    #[arg(long, default_value_t = false)]
    pub keep_scratch: bool,

    /// Optional: Directory for log files (defaults to ./logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print the report as JSON and stream progress events as NDJSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
