//! Content verification: turning same-size candidates into duplicate sets.
//!
//! The rule engine only ever sees [`DuplicateSet`]s, and never looks at file
//! content itself. [`ContentVerifier`] is the seam where a caller plugs in
//! whatever comparison it trusts; [`Blake3Verifier`] is the bundled one.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use super::DuplicateSet;

/// Splits a list of same-size paths into content-identical sets.
pub trait ContentVerifier {
    /// Return every group of 2+ paths whose content is identical.
    ///
    /// Paths that cannot be read are left out of every set.
    fn verify(&self, paths: &[PathBuf]) -> Vec<DuplicateSet>;
}

/// Verifier that compares whole-file BLAKE3 digests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Verifier;

impl Blake3Verifier {
    /// Create a new verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn digest(&self, path: &Path) -> io::Result<blake3::Hash> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(hasher.finalize())
    }
}

impl ContentVerifier for Blake3Verifier {
    fn verify(&self, paths: &[PathBuf]) -> Vec<DuplicateSet> {
        if paths.len() < 2 {
            return Vec::new();
        }

        // Insertion-ordered grouping keeps the output deterministic
        let mut order: Vec<blake3::Hash> = Vec::new();
        let mut groups: HashMap<blake3::Hash, Vec<PathBuf>> = HashMap::new();
        for path in paths {
            match self.digest(path) {
                Ok(hash) => {
                    groups
                        .entry(hash)
                        .or_insert_with(|| {
                            order.push(hash);
                            Vec::new()
                        })
                        .push(path.clone());
                }
                Err(e) => {
                    log::warn!("Could not hash {}: {}", path.display(), e);
                }
            }
        }

        order
            .into_iter()
            .filter_map(|hash| groups.remove(&hash))
            .filter(|group| group.len() > 1)
            .map(DuplicateSet::new)
            .collect()
    }
}
