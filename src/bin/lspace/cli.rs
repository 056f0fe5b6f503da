use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lspace",
    about = "Lipidome vector space construction",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse the database exports into the unified record tables
    #[command(visible_alias = "pre")]
    Preprocess(PreprocessArgs),

    /// Train token embeddings on the nomenclature corpus
    Train(TrainArgs),

    /// Project the embeddings to 2D and 3D coordinates
    Reduce(ReduceArgs),

    /// Package the distributable tables as split ZIP archives
    #[command(visible_alias = "pack")]
    Package(PackageArgs),

    /// Run all four stages in order
    Run(RunArgs),
}

/// Options shared by all commands.
#[derive(Args)]
pub struct PipelineOptions {
    /// Working directory for the stage artifacts
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub workdir: PathBuf,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Database input options for the preprocessing stage.
#[derive(Args)]
#[command(next_help_heading = "Database Inputs")]
pub struct InputOptions {
    /// LIPID MAPS structure database export (SDF)
    #[arg(long, value_name = "FILE")]
    pub sdf: PathBuf,

    /// SwissLipids database export (TSV)
    #[arg(long, value_name = "FILE")]
    pub tsv: PathBuf,

    /// Keep SwissLipids rows above the isomeric subspecies level
    #[arg(long)]
    pub all_levels: bool,
}

/// Embedding hyperparameter overrides.
#[derive(Args)]
#[command(next_help_heading = "Training Options")]
pub struct TrainOptions {
    /// Hyperparameter file (TOML)
    #[arg(long = "train-params", value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Embedding dimensionality
    #[arg(long, value_name = "N")]
    pub dim: Option<usize>,

    /// Maximum context window
    #[arg(long, value_name = "N")]
    pub window: Option<usize>,

    /// Training epochs
    #[arg(long, value_name = "N")]
    pub epochs: Option<usize>,

    /// Random seed for reproducible training
    #[arg(long = "train-seed", value_name = "SEED")]
    pub seed: Option<u64>,
}

/// Projection hyperparameter overrides.
#[derive(Args)]
#[command(next_help_heading = "Reduction Options")]
pub struct ReduceOptions {
    /// Hyperparameter file (TOML)
    #[arg(long = "reduce-params", value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Target perplexity (capped for small inputs)
    #[arg(long, value_name = "P")]
    pub perplexity: Option<f64>,

    /// Gradient descent iterations
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Random seed for reproducible projections
    #[arg(long = "reduce-seed", value_name = "SEED")]
    pub seed: Option<u64>,
}

/// Archive packaging options.
#[derive(Args)]
#[command(next_help_heading = "Packaging Options")]
pub struct PackageOptions {
    /// Output directory for the archives (defaults to the working directory)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Maximum uncompressed CSV megabytes per archive part
    #[arg(long = "max-part-size", value_name = "MB", default_value = "100")]
    pub max_part_mb: usize,
}

#[derive(Args)]
pub struct PreprocessArgs {
    #[command(flatten)]
    pub pipeline: PipelineOptions,

    #[command(flatten)]
    pub input: InputOptions,
}

#[derive(Args)]
pub struct TrainArgs {
    #[command(flatten)]
    pub pipeline: PipelineOptions,

    #[command(flatten)]
    pub train: TrainOptions,
}

#[derive(Args)]
pub struct ReduceArgs {
    #[command(flatten)]
    pub pipeline: PipelineOptions,

    #[command(flatten)]
    pub reduce: ReduceOptions,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub pipeline: PipelineOptions,

    #[command(flatten)]
    pub package: PackageOptions,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub pipeline: PipelineOptions,

    #[command(flatten)]
    pub input: InputOptions,

    #[command(flatten)]
    pub train: TrainOptions,

    #[command(flatten)]
    pub reduce: ReduceOptions,

    #[command(flatten)]
    pub package: PackageOptions,
}

pub fn parse() -> Cli {
    Cli::parse()
}
