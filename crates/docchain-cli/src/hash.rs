//! # Hash Subcommand
//!
//! Prints the fingerprint a document would be attested under. Local only.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use docchain_core::fingerprint_file;

/// Arguments for `docchain hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Document to fingerprint.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute `docchain hash`.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let fp = fingerprint_file(&args.file)
        .with_context(|| format!("failed to fingerprint {}", args.file.display()))?;
    println!("{fp}");
    Ok(crate::EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(run_hash(&HashArgs { file: path }).unwrap(), 0);
    }

    #[test]
    fn hash_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = HashArgs {
            file: dir.path().join("missing.txt"),
        };
        let err = run_hash(&args).unwrap_err();
        assert!(format!("{err:#}").contains("missing.txt"));
    }
}
