mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "threadswatch",
    about = "Export thread charts as Adobe (.ase) and CorelDRAW (.xml) swatch files, rewriting only what changed",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory with threadswatch.yaml)
    #[arg(long, global = true, env = "THREADSWATCH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log each file decision
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create threadswatch.yaml and a sample catalog
    Init,

    /// Write swatch files for every enabled chart, skipping unchanged ones
    Export {
        /// Only this format (ase or xml); default: output.formats from config
        #[arg(long)]
        format: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Decode a swatch file and list its colors
    Inspect {
        file: PathBuf,

        /// ase or xml (default: detect from extension, then content)
        #[arg(long)]
        format: Option<String>,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Export { format, dry_run } => {
            cmd::export::run(&root, format.as_deref(), dry_run, cli.json)
        }
        Commands::Inspect { file, format } => {
            cmd::inspect::run(&file, format.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
