//! Build configuration handed to the library by the CLI

use std::path::PathBuf;

use crate::identifier::IdentifierPolicy;

/// Everything one build needs; the engine reads no global state
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Record source (line format or `.json`)
    pub input: PathBuf,

    /// Artifact destination
    pub output: PathBuf,

    /// Amounts in the input are scaled by `10^decimals`
    pub decimals: u8,

    pub identifiers: IdentifierPolicy,

    /// Optional dump of every tree level as `level:index:0xhash`
    pub tree_output: Option<PathBuf>,
}

impl BuildConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            decimals: 0,
            identifiers: IdentifierPolicy::default(),
            tree_output: None,
        }
    }
}
