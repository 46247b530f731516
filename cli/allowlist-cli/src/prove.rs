use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use allowlist_cli::{parse_address, write_file_atomic, Artifact, ArtifactEntry};

/// Extract the proof entries for one account from an artifact
#[derive(Args, Debug)]
pub struct Cli {
    /// Artifact produced by `build-tree`
    #[arg(short, long)]
    artifact: PathBuf,

    /// Account to look up (with or without 0x prefix)
    #[arg(long)]
    address: String,

    /// Write the claim JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClaimOutput<'a> {
    root: &'a str,
    entries: Vec<&'a ArtifactEntry>,
}

pub fn run(cli: &Cli) -> Result<()> {
    let account = parse_address(&cli.address)
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", cli.address, e))?;

    let artifact = Artifact::load(&cli.artifact)
        .with_context(|| format!("Failed to load artifact {:?}", cli.artifact))?;

    let indices = artifact.find_by_account(&account);
    if indices.is_empty() {
        anyhow::bail!("Address {} not found in allowlist", cli.address);
    }

    for &index in &indices {
        let valid = artifact
            .verify_entry(index)
            .with_context(|| format!("Failed to verify entry {}", index))?;
        if !valid {
            anyhow::bail!(
                "Entry {} (userID {}) does not verify against root {}",
                index,
                artifact.data[index].user_id,
                artifact.root
            );
        }
    }

    let claim = ClaimOutput {
        root: &artifact.root,
        entries: indices.iter().map(|&i| &artifact.data[i]).collect(),
    };
    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;

    match &cli.output {
        Some(path) => {
            write_file_atomic(path, &json_output).context("Failed to write claim file")?;
            println!("Wrote {} entries to {:?}", claim.entries.len(), path);
        }
        None => println!("{}", json_output),
    }

    Ok(())
}
