use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shinra-scorer",
    version,
    about = "Exact-match scoring of attribute extraction submissions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one submission file against gold annotations.
    Score(ScoreArgs),
    /// Score a directory of per-category submissions from a settings manifest.
    Batch(BatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Gold annotations, one JSON object per line.
    #[arg(long)]
    pub gold: PathBuf,

    /// Submitted annotations, one JSON object per line.
    #[arg(long)]
    pub submission: PathBuf,

    /// JSON array literal of page ids, or a CSV file of page ids.
    #[arg(long)]
    pub target: Option<String>,

    /// Directory of `<page_id>.html` documents; enables html offset checks.
    #[arg(long)]
    pub html_dir: Option<PathBuf>,

    /// Directory of `<page_id>.txt` documents; enables text offset checks.
    #[arg(long)]
    pub text_dir: Option<PathBuf>,

    #[arg(long)]
    pub score_dir: Option<PathBuf>,

    #[arg(long)]
    pub error_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(long)]
    pub settings: PathBuf,

    #[arg(long)]
    pub submission_dir: PathBuf,

    /// Defaults to `<submission_dir>/batch_report.json`.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    /// Writes per-category score CSVs under `<score_dir>/<category>/`.
    #[arg(long)]
    pub score_dir: Option<PathBuf>,
}
