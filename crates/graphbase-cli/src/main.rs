//! Graphbase CLI - Command-line interface for graphbase
//!
//! Builds GB files from edge lists, inspects and verifies them, exports
//! them to JSON and keeps graphs in a local store.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "graphbase")]
#[command(author = "Graphbase Contributors")]
#[command(version)]
#[command(about = "Build, inspect and store GraphBase graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory of the graph store
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a GB file from an edge list ("src dst [len]" per line)
    Build {
        /// Edge-list file
        input: PathBuf,

        /// Output GB file
        #[arg(short, long)]
        output: PathBuf,

        /// Graph id written in the file
        #[arg(long)]
        id: Option<String>,

        /// Treat each line as an undirected edge
        #[arg(long)]
        undirected: bool,

        /// Expected number of vertices (sizing hint only)
        #[arg(long, default_value = "0")]
        capacity: usize,
    },

    /// Show counts and utility types of a GB file
    Info {
        /// GB file to inspect
        file: PathBuf,
    },

    /// Verify a GB file's structure and checksum
    Check {
        /// GB file to verify
        file: PathBuf,
    },

    /// Export a GB file to JSON
    Export {
        /// GB file to export
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },

    /// Manage stored graphs
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Save a GB file into the store under its graph id
    Save {
        /// GB file to save
        file: PathBuf,
    },

    /// Write a stored graph to a GB file
    Load {
        /// Graph id
        id: String,

        /// Output GB file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List stored graph ids
    List,

    /// Remove a stored graph
    Remove {
        /// Graph id
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let store_dir = cli.store.unwrap_or_else(commands::default_store_dir);

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            id,
            undirected,
            capacity,
        } => commands::build(&input, &output, id.as_deref(), undirected, capacity),
        Commands::Info { file } => commands::info(&file),
        Commands::Check { file } => commands::check(&file),
        Commands::Export { file, output } => commands::export(&file, &output),
        Commands::Store { action } => match action {
            StoreAction::Save { file } => commands::store_save(&store_dir, &file),
            StoreAction::Load { id, output } => commands::store_load(&store_dir, &id, &output),
            StoreAction::List => commands::store_list(&store_dir),
            StoreAction::Remove { id } => commands::store_remove(&store_dir, &id),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
