//! PKI Forge - Self-Contained Certificate Hierarchy Generator
//!
//! Single-shot binary: loads the TOML configuration (or the built-in
//! defaults when no file is present), generates the root CA, intermediate
//! CA and the server/client leaf certificates, persists keys and
//! certificates under the output directory, and assembles the chain files.
//! Regeneration discards and replaces all prior artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pki_forge::chain_assembly::write_chain_files;
use pki_forge::configs::AppConfig;
use pki_forge::hierarchy::{build_hierarchy, persist_hierarchy};
use pki_forge::storage::DirectoryStore;

#[derive(Parser)]
#[command(name = "pki-forge")]
#[command(about = "Generate a root CA, intermediate CA and server/client certificates with chain files", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "pki.toml")]
    config: PathBuf,

    /// Output directory (overrides the configured one)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load_or_default(&cli.config).context("Failed to load configuration")?;
    if let Some(dir) = cli.out_dir {
        config.output.directory = dir;
    }

    let mut store = DirectoryStore::create(&config.output.directory)
        .context("Failed to prepare output directory")?;

    let hierarchy =
        build_hierarchy(&config).context("Failed to build certificate hierarchy")?;
    println!(
        "✓ Hierarchy generated: {} → {} → {}, {}",
        config.subjects.root,
        config.subjects.intermediate,
        config.subjects.server,
        config.subjects.client
    );

    persist_hierarchy(&hierarchy, &mut store)
        .context("Failed to write keys and certificates")?;
    println!(
        "✓ Keys and certificates written to '{}'",
        store.root().display()
    );

    write_chain_files(&mut store).context("Failed to assemble chain files")?;
    println!("✓ Chain files assembled (server-chain.crt, client-chain.crt, ca-chain.crt)");

    println!("\nCertificate generation complete!");
    Ok(())
}
