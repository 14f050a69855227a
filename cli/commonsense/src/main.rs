//! CommonSense host adapter: composes toolchain environments for the build host.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use commonsense_env::Variant;
use log::LevelFilter;

#[derive(Parser)]
#[command(
    name = "commonsense",
    version,
    about = "Compose toolchain environments for CommonSense Cortex-M boards"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter commonsense.toml
    Init {
        /// PlatformIO packages directory
        #[arg(long)]
        packages_dir: String,
    },
    /// Compose the toolchain environment and emit it as JSON
    Compose {
        /// Host config file (default: nearest commonsense.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Composer variant (overrides the config)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,
        /// Board descriptor file (overrides the config)
        #[arg(long)]
        board: Option<PathBuf>,
        /// Write the JSON record here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Inspect board descriptors
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },
}

#[derive(Subcommand)]
enum BoardAction {
    /// List board descriptors in a directory
    List {
        /// Directory to scan
        #[arg(long, default_value = "boards")]
        dir: PathBuf,
    },
    /// Show a board and the switches it implies
    Describe {
        /// Board descriptor file (default: built-in SAMD51 board)
        #[arg(long)]
        board: Option<PathBuf>,
        /// Output format (default: human-readable, "toml" or "json")
        #[arg(long)]
        format: Option<String>,
    },
    /// Validate a board descriptor
    Validate {
        /// Board descriptor file
        #[arg(long)]
        board: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Bare,
    Framework,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Bare => Variant::Bare,
            VariantArg::Framework => Variant::Framework,
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { packages_dir } => commands::init::run(&cwd, &packages_dir),

        Commands::Compose {
            config,
            variant,
            board,
            output,
        } => {
            let args = commands::compose::ComposeArgs {
                config: config.as_deref(),
                variant: variant.map(Variant::from),
                board: board.as_deref(),
                output: output.as_deref(),
            };
            commands::compose::run(&cwd, &args)
        }

        Commands::Board { action } => match action {
            BoardAction::List { dir } => commands::board::list(&cwd.join(dir)),
            BoardAction::Describe { board, format } => {
                commands::board::describe(board.as_deref(), format.as_deref())
            }
            BoardAction::Validate { board } => commands::board::validate(&board),
        },
    }
}
