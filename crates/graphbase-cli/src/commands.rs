//! CLI command implementations.

use colored::Colorize;
use graphbase_graph::{Graph, GraphBuilder, GraphStore};
use graphbase_io::{load_gb, save_gb};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Store location used when `--store` is not given.
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("graphbase").join("store"))
        .unwrap_or_else(|| PathBuf::from(".graphbase").join("store"))
}

/// Build a GB file from an edge list.
pub fn build(
    input: &Path,
    output: &Path,
    id: Option<&str>,
    undirected: bool,
    capacity: usize,
) -> Result<()> {
    let started = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Reading {}...", input.display()));

    let mut builder = GraphBuilder::with_capacity(capacity).undirected(undirected);
    if let Some(id) = id {
        builder = builder.id(id);
    }
    let records = builder.read_from(BufReader::new(File::open(input)?))?;
    let graph = builder.build();

    spinner.set_message(format!("Writing {}...", output.display()));
    save_gb(&graph, output)?;
    spinner.finish_and_clear();

    println!(
        "{} Built {} from {} records ({} vertices, {} arcs) in {}ms",
        "✓".green(),
        output.display().to_string().cyan(),
        records,
        graph.n().to_string().cyan(),
        graph.m().to_string().cyan(),
        started.elapsed().as_millis()
    );
    Ok(())
}

/// Show statistics for a GB file.
pub fn info(file: &Path) -> Result<()> {
    let graph = load_gb(file)?;
    print_stats(&graph);
    Ok(())
}

fn print_stats(graph: &Graph) {
    let stats = graph.stats();
    println!("{}", stats.id.cyan().bold());
    println!();
    println!("  {} {}", "Vertices:".dimmed(), stats.vertex_count);
    println!("  {} {}", "Arcs:".dimmed(), stats.arc_count);
    println!("  {} {}", "Util types:".dimmed(), stats.util_types);
    if graph.is_empty() {
        println!();
        println!("  {}", "(no vertices)".dimmed());
    }
}

/// Verify a GB file.
pub fn check(file: &Path) -> Result<()> {
    let graph = load_gb(file)?;
    println!(
        "{} {} is valid ({} vertices, {} arcs)",
        "✓".green(),
        file.display(),
        graph.n(),
        graph.m()
    );
    Ok(())
}

/// Export a GB file to JSON.
pub fn export(file: &Path, output: &Path) -> Result<()> {
    let graph = load_gb(file)?;
    fs::write(output, serde_json::to_string_pretty(&graph.export())?)?;
    println!("{} Exported to {}", "✓".green(), output.display());
    Ok(())
}

/// Save a GB file into the store.
pub fn store_save(store_dir: &Path, file: &Path) -> Result<()> {
    let graph = load_gb(file)?;
    let store = GraphStore::open(store_dir)?;
    store.save_graph(&graph)?;
    println!("{} Stored graph {}", "✓".green(), graph.id().cyan());
    Ok(())
}

/// Write a stored graph out as a GB file.
pub fn store_load(store_dir: &Path, id: &str, output: &Path) -> Result<()> {
    let store = GraphStore::open(store_dir)?;
    let graph = store
        .load_graph(id)?
        .ok_or_else(|| format!("no stored graph with id '{}'", id))?;
    save_gb(&graph, output)?;
    println!(
        "{} Wrote {} to {}",
        "✓".green(),
        id.cyan(),
        output.display()
    );
    Ok(())
}

/// List stored graphs.
pub fn store_list(store_dir: &Path) -> Result<()> {
    let store = GraphStore::open(store_dir)?;
    let ids = store.list_graphs()?;
    if ids.is_empty() {
        println!("No stored graphs in {}", store_dir.display());
        return Ok(());
    }

    println!("{} stored graphs:\n", ids.len());
    for id in ids {
        println!("  {}", id.cyan());
    }
    Ok(())
}

/// Remove a stored graph.
pub fn store_remove(store_dir: &Path, id: &str) -> Result<()> {
    let store = GraphStore::open(store_dir)?;
    if store.remove_graph(id)? {
        println!("{} Removed {}", "✓".green(), id.cyan());
    } else {
        println!("{} No stored graph with id {}", "⚠".yellow(), id);
    }
    Ok(())
}
