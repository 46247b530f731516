//! End-to-end build: load records, build the tree, package and write

use tracing::info;

use crate::artifact::Artifact;
use crate::common::write_file_atomic;
use crate::config::BuildConfig;
use crate::error::{AllowlistError, AllowlistResult};
use crate::input::load_records;
use crate::leaf::Record;
use crate::tree::AllowlistTree;

/// Runs a full build from `config.input` to `config.output`.
///
/// Everything is computed in memory and checked before the first byte is
/// written. The artifact is written first; if the tree dump then fails the
/// artifact is removed again, so a failed build leaves no output files.
pub fn run_build(config: &BuildConfig) -> AllowlistResult<Artifact> {
    let records = load_records(&config.input, config.decimals)?;
    info!(records = records.len(), input = %config.input.display(), "loaded records");

    let (artifact, tree) = build_in_memory(&records, config)?;
    let tree_dump = config.tree_output.as_ref().map(|_| tree.dump_layers());

    artifact.write(&config.output)?;

    if let (Some(tree_path), Some(dump)) = (&config.tree_output, tree_dump) {
        if let Err(e) = write_file_atomic(tree_path, &dump) {
            let _ = std::fs::remove_file(&config.output);
            return Err(AllowlistError::SerializationFailure(format!(
                "writing {}: {}",
                tree_path.display(),
                e
            )));
        }
    }

    Ok(artifact)
}

/// Builds and self-checks the artifact without touching the filesystem.
pub fn build_in_memory(
    records: &[Record],
    config: &BuildConfig,
) -> AllowlistResult<(Artifact, AllowlistTree)> {
    let tree = AllowlistTree::build(records)?;
    let artifact = Artifact::from_tree(records, &tree, config.identifiers)?;

    if let Some(index) = artifact.verify_all()?.iter().position(|ok| !ok) {
        return Err(AllowlistError::SerializationFailure(format!(
            "entry {index} does not verify against the computed root"
        )));
    }

    Ok((artifact, tree))
}
