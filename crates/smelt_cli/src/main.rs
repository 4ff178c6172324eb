//! Smelt CLI: runs a project's addon pipeline from the command line.
//!
//! `smelt compile` reads the compilation config, discovers addons, and emits
//! every root file through every active target.

#![warn(missing_docs)]

mod compile;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Smelt: configurable source-to-source addon pipelines.
#[derive(Parser, Debug)]
#[command(name = "smelt", version, about = "Smelt addon pipeline")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the project through every active target.
    Compile(CompileArgs),
}

/// Arguments for the `smelt compile` subcommand.
#[derive(Parser, Debug, Default)]
pub struct CompileArgs {
    /// Comma-separated addon names to apply (overrides the config).
    #[arg(short, long)]
    pub addons: Option<String>,

    /// Directory containing addons.
    #[arg(long)]
    pub addons_dir: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Path to the compilation config (default: `smelt.config.json`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug mode.
    #[arg(short, long)]
    pub debug: bool,

    /// Path to the project file (default: `smelt.project.json`).
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Generate source maps.
    #[arg(long)]
    pub source_map: bool,

    /// Comma-separated target names to compile.
    #[arg(short, long)]
    pub targets: Option<String>,

    /// Transpile without type checking.
    #[arg(long)]
    pub transpile_only: bool,

    /// Keep compiling on change.
    #[arg(short, long)]
    pub watch: bool,

    /// Additional compiler options as `--key value` pairs, after `--`.
    #[arg(last = true)]
    pub extra: Vec<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::env::var_os("TERM").is_some(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
    };

    let result = match cli.command {
        Command::Compile(ref args) => {
            logging::init(global.verbose || args.debug);
            compile::run(args, &global)
        }
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
