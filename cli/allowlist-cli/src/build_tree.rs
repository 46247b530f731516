use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use allowlist_cli::{run_build, BuildConfig, IdentifierPolicy};

/// Build the Merkle tree and proof artifact from an allowlist
#[derive(Args, Debug)]
pub struct Cli {
    /// Input file: `address,amount` lines, or a `.json` array of
    /// `{ "address", "maxTokens" }` objects
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for the artifact (root and per-account proofs)
    #[arg(short, long)]
    output: PathBuf,

    /// Scale every input amount by 10^decimals (e.g. 18 for whole tokens)
    #[arg(short, long, default_value_t = 0)]
    decimals: u8,

    /// Fold identifiers at or above this index into `base + index % threshold`
    #[arg(long, requires = "bucket_base")]
    bucket_threshold: Option<u64>,

    /// Base identifier for folded indices
    #[arg(long, requires = "bucket_threshold")]
    bucket_base: Option<u64>,

    /// Output file for every tree node (`level:index:0xhash` per line)
    #[arg(short, long)]
    tree_output: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> BuildConfig {
        let identifiers = match (self.bucket_threshold, self.bucket_base) {
            (Some(threshold), Some(base)) => IdentifierPolicy::Bucketed { threshold, base },
            _ => IdentifierPolicy::Sequential,
        };
        BuildConfig {
            input: self.input,
            output: self.output,
            decimals: self.decimals,
            identifiers,
            tree_output: self.tree_output,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config();

    println!("Reading records from {:?}...", config.input);
    let artifact = run_build(&config)
        .with_context(|| format!("Failed to build allowlist from {:?}", config.input))?;

    println!("Total records: {}", artifact.data.len());
    if let Some(total) = artifact.total_entitlement() {
        println!("Total entitlement: {}", total);
    }
    println!("Merkle root: {}", artifact.root);
    println!("Artifact written to {:?}", config.output);
    if let Some(tree_path) = &config.tree_output {
        println!("Tree written to {:?}", tree_path);
    }

    println!("Done!");
    Ok(())
}
