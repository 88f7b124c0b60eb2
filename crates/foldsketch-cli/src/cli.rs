use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "FoldSketch Developers",
    version,
    about = "FoldSketch CLI - Draws nucleic-acid secondary structures from pairing and stacking annotations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lay out a secondary structure diagram from annotation files.
    Draw(DrawArgs),
}

/// Arguments for the `draw` subcommand.
#[derive(Args, Debug)]
pub struct DrawArgs {
    // --- Input ---
    /// One-letter nucleic acid sequence.
    #[arg(short, long, required = true, value_name = "SEQ")]
    pub sequence: String,

    /// Annotation file(s): pairing and/or stacking files, or one dot-bracket file.
    #[arg(long = "ann", required = true, num_args(1..), value_name = "FILE")]
    pub annotations: Vec<PathBuf>,

    /// Read the annotation as dot-bracket (only the first --ann file is used).
    #[arg(long)]
    pub dotbracket: bool,

    /// Residue IDs absent from the sequence.
    #[arg(long, num_args(1..), value_name = "ID", allow_negative_numbers = true)]
    pub missing: Vec<i64>,

    /// Residue ID of the first sequence letter.
    #[arg(
        long,
        alias = "first_id",
        default_value_t = 1,
        value_name = "INT",
        allow_negative_numbers = true
    )]
    pub first_id: i64,

    // --- Annealing Overrides ---
    /// Initial annealing temperature.
    #[arg(short = 'T', long = "temperature", value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Number of minimization steps.
    #[arg(long, value_name = "INT")]
    pub nsteps: Option<usize>,

    /// Number of intermediate snapshots to draw.
    #[arg(long = "draw-interm", alias = "draw_interm", value_name = "INT")]
    pub draw_interm: Option<usize>,

    /// Leave tertiary (non-canonical) contacts out of the minimization.
    #[arg(long, alias = "no_tertiary_contacts")]
    pub no_tertiary_contacts: bool,

    /// Label residues by ID instead of letter.
    #[arg(long, alias = "output_ids")]
    pub output_ids: bool,

    // --- Output ---
    /// Output name; files are written as `<NAME>.DRAW*`.
    #[arg(short = 'o', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Write the per-step log records as CSV.
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,

    // --- Configuration ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Forcefield parameter file in TOML format, overriding the config file.
    #[arg(long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Seed for the annealing random generator. Drawn from entropy when absent.
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S schedule.wait-period=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
