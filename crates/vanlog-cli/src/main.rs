#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::{CliError, OutputMode, render_error};
use vanlog_core::config;

#[derive(Parser, Debug)]
#[command(
    name = "vj",
    author,
    version,
    about = "vanlog: campervan travel journal with self-review scoring",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Initialize a journal in the current directory",
        after_help = "EXAMPLES:\n    # Initialize with the starter catalog\n    vj init --seed"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Planning",
        about = "Manage trips and their lifecycle",
        after_help = "EXAMPLES:\n    # Create a trip\n    vj trip add --title \"Autumn in Doto\" --destination \"Hokkaido (Doto)\" \\\n        --start 2026-10-01 --end 2026-10-05\n\n    # Start it\n    vj trip status 1"
    )]
    Trip {
        #[command(subcommand)]
        command: cmd::trip::TripCommand,
    },

    #[command(
        next_help_heading = "Planning",
        about = "Attach travel purposes to a trip",
        after_help = "EXAMPLES:\n    # Catalog main purpose, by name\n    vj purpose add --trip 1 --main Hiking\n\n    # Free-text custom stop\n    vj purpose add --trip 1 --custom \"Lake Viewpoint\""
    )]
    Purpose {
        #[command(subcommand)]
        command: cmd::purpose::PurposeCommand,
    },

    #[command(
        next_help_heading = "Planning",
        about = "Manage the packing checklist",
        after_help = "EXAMPLES:\n    # See what the trip's purposes recommend\n    vj items list --trip 1\n\n    # Mark gear as packed\n    vj items check --trip 1 \"Hiking Boots\""
    )]
    Items {
        #[command(subcommand)]
        command: cmd::items::ItemsCommand,
    },

    #[command(
        next_help_heading = "Planning",
        about = "Review destination rules and confirm them",
        after_help = "EXAMPLES:\n    # Rules for the trip's main purposes\n    vj rules list --trip 1\n\n    # Confirm rule 3\n    vj rules confirm --trip 1 3"
    )]
    Rules {
        #[command(subcommand)]
        command: cmd::rules::RulesCommand,
    },

    #[command(
        next_help_heading = "Review",
        about = "Score a trip against its plan",
        after_help = "EXAMPLES:\n    # Current score\n    vj review show --trip 1\n\n    # Record what was achieved\n    vj review save --trip 1 --main Hiking --sub \"Lake Viewpoint\" --item \"Trail Map\""
    )]
    Review {
        #[command(subcommand)]
        command: cmd::review::ReviewCommand,
    },

    #[command(
        next_help_heading = "Maintenance",
        about = "Rewrite legacy custom ids in stored snapshots",
        after_help = "EXAMPLES:\n    vj migrate"
    )]
    Migrate(cmd::migrate::MigrateArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VANLOG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "vanlog=debug,info"
        } else {
            "vanlog=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = match env::current_dir() {
        Ok(dir) => dir,
        Err(error) => {
            eprintln!("error: cannot determine working directory: {error}");
            return ExitCode::FAILURE;
        }
    };

    // CLI flag > FORMAT env > user config > TTY detection.
    let mode = config::resolve_config(&project_root, cli.json)
        .map_or(OutputMode::Text, |cfg| {
            OutputMode::from_name(&cfg.resolved_output)
        });

    let result = match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &project_root, mode),
        Commands::Trip { command } => cmd::trip::run(command, &project_root, mode),
        Commands::Purpose { command } => cmd::purpose::run(command, &project_root, mode),
        Commands::Items { command } => cmd::items::run(command, &project_root, mode),
        Commands::Rules { command } => cmd::rules::run(command, &project_root, mode),
        Commands::Review { command } => cmd::review::run(command, &project_root, mode),
        Commands::Migrate(args) => cmd::migrate::run_migrate(args, &project_root, mode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let cli_error = CliError::new(format!("{error:#}"));
            if render_error(mode, &cli_error).is_err() {
                eprintln!("error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}
