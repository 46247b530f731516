use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::warn;

use allowlist_cli::{parse_address, Artifact};

/// Re-check every proof in an artifact against its root
#[derive(Args, Debug)]
pub struct Cli {
    /// Artifact produced by `build-tree`
    #[arg(short, long)]
    artifact: PathBuf,

    /// Only check the entries of this account
    #[arg(long)]
    address: Option<String>,
}

pub fn run(cli: &Cli) -> Result<()> {
    let artifact = Artifact::load(&cli.artifact)
        .with_context(|| format!("Failed to load artifact {:?}", cli.artifact))?;

    let indices: Vec<usize> = match &cli.address {
        Some(address) => {
            let account = parse_address(address)
                .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", address, e))?;
            artifact.find_by_account(&account)
        }
        None => (0..artifact.data.len()).collect(),
    };
    if indices.is_empty() {
        anyhow::bail!("No entries to verify");
    }

    let results = artifact.verify_all().context("Invalid artifact root")?;
    let mut failed = 0usize;
    for &index in &indices {
        if !results[index] {
            let entry = &artifact.data[index];
            warn!(index, user_id = entry.user_id, address = %entry.address, "proof failed");
            failed += 1;
        }
    }

    println!("Root: {}", artifact.root);
    println!("Verified {}/{} entries", indices.len() - failed, indices.len());
    if failed > 0 {
        anyhow::bail!("{} entries failed verification", failed);
    }

    Ok(())
}
