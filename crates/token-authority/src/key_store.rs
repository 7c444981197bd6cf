//! Key file storage.
//!
//! Key material is read fresh on every call. Nothing is cached, so key files
//! rotated on disk take effect on the next request.

use crate::errors::TaError;
use std::path::PathBuf;
use tracing::instrument;

/// Read-only access to key files addressed by a path relative to a secrets root.
pub trait KeyStore: Send + Sync {
    /// Return the content of `relative_path`.
    ///
    /// Fails with `KeyMaterialUnavailable` if the file is missing, unreadable,
    /// or contains only whitespace.
    fn read(&self, relative_path: &str) -> Result<String, TaError>;
}

/// Filesystem-backed key store rooted at the configured secrets folder.
#[derive(Debug, Clone)]
pub struct FsKeyStore {
    secrets_root: PathBuf,
}

impl FsKeyStore {
    pub fn new(secrets_root: impl Into<PathBuf>) -> Self {
        Self {
            secrets_root: secrets_root.into(),
        }
    }
}

impl KeyStore for FsKeyStore {
    #[instrument(skip_all, name = "ta.key_store.read")]
    fn read(&self, relative_path: &str) -> Result<String, TaError> {
        let path = self.secrets_root.join(relative_path);

        let content = std::fs::read_to_string(&path).map_err(|e| {
            tracing::debug!(
                target: "ta.key_store",
                error = %e,
                file = %relative_path,
                "Failed to read key file"
            );
            TaError::KeyMaterialUnavailable(format!("{relative_path}: {e}"))
        })?;

        if content.trim().is_empty() {
            tracing::debug!(target: "ta.key_store", file = %relative_path, "Key file is empty");
            return Err(TaError::KeyMaterialUnavailable(format!(
                "{relative_path}: empty file"
            )));
        }

        Ok(content)
    }
}

/// In-memory key store for tests.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Key store holding files in a map. Counts reads.
    #[derive(Default)]
    pub struct InMemoryKeyStore {
        files: HashMap<String, String>,
        reads: AtomicUsize,
    }

    impl InMemoryKeyStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file and return the store (builder style).
        pub fn with_file(mut self, relative_path: &str, content: &str) -> Self {
            self.files
                .insert(relative_path.to_string(), content.to_string());
            self
        }

        /// Number of `read` calls made so far.
        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl KeyStore for InMemoryKeyStore {
        fn read(&self, relative_path: &str) -> Result<String, TaError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.files.get(relative_path) {
                Some(content) if !content.trim().is_empty() => Ok(content.clone()),
                Some(_) => Err(TaError::KeyMaterialUnavailable(format!(
                    "{relative_path}: empty file"
                ))),
                None => Err(TaError::KeyMaterialUnavailable(format!(
                    "{relative_path}: not found"
                ))),
            }
        }
    }
}
