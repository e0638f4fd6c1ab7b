//! CLI frontend for the Rolltables random table engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "rolltables",
    about = "Rolltables: roll on random tables for tabletop games",
    version,
    propagate_version = true
)]
struct Cli {
    /// JSON file of table definitions keyed by identifier (repeatable)
    #[arg(short, long = "tables", global = true)]
    tables: Vec<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a table or bundle
    Roll {
        /// Identifier of the table or bundle, e.g. /dmg/treasure/gems
        path: String,

        /// Number of times to roll
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Initial context value as key=value (repeatable)
        #[arg(long = "set", value_parser = commands::parse_context_value)]
        set: Vec<(String, i64)>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a randomly chosen table
    Random {
        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a dice expression, e.g. 4d6k3
    Dice {
        /// Dice notation
        expr: String,

        /// Number of times to roll
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Validate every loaded table and report coverage problems
    Check,

    /// Roll every total of a table, expanding meta references
    Test {
        /// Identifier of the table
        path: String,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// List loaded tables and bundles
    List {
        /// Only show identifiers starting with this prefix
        prefix: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Roll {
            path,
            count,
            seed,
            set,
            json,
        } => commands::roll::run(&cli.tables, &path, count, seed, set, json),
        Commands::Random { seed, json } => commands::random::run(&cli.tables, seed, json),
        Commands::Dice { expr, count, seed } => commands::dice::run(&expr, count, seed),
        Commands::Check => commands::check::run(&cli.tables),
        Commands::Test { path, seed } => commands::test::run(&cli.tables, &path, seed),
        Commands::List { prefix } => commands::list::run(&cli.tables, prefix.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
