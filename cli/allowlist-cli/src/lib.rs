pub mod artifact;
pub mod common;
pub mod config;
pub mod error;
pub mod identifier;
pub mod input;
pub mod leaf;
pub mod pipeline;
pub mod tree;

pub use artifact::{Artifact, ArtifactEntry};
pub use common::{
    hash_pair, hex_encode, keccak256, parse_address, parse_hash, to_checksum_address,
    write_file_atomic, AddressError, HashError,
};
pub use config::BuildConfig;
pub use error::{AllowlistError, AllowlistResult};
pub use identifier::IdentifierPolicy;
pub use leaf::Record;
pub use pipeline::run_build;
pub use tree::{compute_root, verify_proof, AllowlistTree};
