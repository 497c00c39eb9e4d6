use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pdfcmp",
    about = "Structural and visual comparison of PDF documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two documents object by object, falling back to page images
    Content(ContentArgs),
    /// Compare the rendered pages of two documents
    Visual(VisualArgs),
    /// Compare the link annotations of two documents
    Links(PairArgs),
    /// Compare the title, author, subject and keywords of two documents
    Info(PairArgs),
}

#[derive(Args)]
pub struct DocumentPair {
    /// The document under test
    pub out: PathBuf,
    /// The reference document
    pub cmp: PathBuf,
}

#[derive(Args)]
pub struct ContentArgs {
    #[command(flatten)]
    pub docs: DocumentPair,
    /// Directory for page images, difference images and the report
    #[arg(long)]
    pub out_dir: PathBuf,
    #[arg(long, default_value = "diff_")]
    pub diff_prefix: String,
    /// Maximum number of differences to report
    #[arg(long)]
    pub limit: Option<usize>,
    /// Absolute tolerance for numbers
    #[arg(long, conflicts_with = "rel_error")]
    pub abs_error: Option<f64>,
    /// Relative tolerance for numbers
    #[arg(long)]
    pub rel_error: Option<f64>,
    /// Write an XML report into the output directory
    #[arg(long)]
    pub xml_report: bool,
    #[arg(long)]
    pub report_name: Option<String>,
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct VisualArgs {
    #[command(flatten)]
    pub docs: DocumentPair,
    #[arg(long)]
    pub out_dir: PathBuf,
    #[arg(long, default_value = "diff_")]
    pub diff_prefix: String,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PairArgs {
    #[command(flatten)]
    pub docs: DocumentPair,
}
