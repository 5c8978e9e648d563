//! ABI file scanner - discovers and loads contract ABI files from the filesystem

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use walkdir::WalkDir;

use crate::domain::abi::AbiRegistry;

/// File name every contract directory carries its ABI under
const ABI_FILE_NAME: &str = "abi.json";

/// Skip ABI files larger than this
const MAX_ABI_BYTES: u64 = 5 * 1024 * 1024;

/// Loaded ABIs keyed by contract name
#[derive(Debug, Default, Clone)]
pub struct AbiCatalog {
    /// Registries by contract (directory) name
    contracts: BTreeMap<String, Arc<AbiRegistry>>,
    /// Number of ABI files scanned
    pub scanned_files: usize,
    /// Scan errors
    pub errors: Vec<String>,
    /// Scan duration in milliseconds
    pub scan_ms: u128,
}

impl AbiCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a contract ABI
    ///
    /// Note: First ABI for a given contract name wins (no overwrite)
    pub fn insert(&mut self, name: impl Into<String>, registry: AbiRegistry) {
        self.contracts
            .entry(name.into())
            .or_insert_with(|| Arc::new(registry));
    }

    /// Look up a contract's ABI by name
    pub fn get(&self, name: &str) -> Option<Arc<AbiRegistry>> {
        self.contracts.get(name).cloned()
    }

    /// Get the number of loaded contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Get all contract names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    /// Merge another catalog into this one (first wins)
    pub fn merge(&mut self, other: Self) {
        self.scanned_files = self.scanned_files.saturating_add(other.scanned_files);
        self.errors.extend(other.errors);
        for (name, registry) in other.contracts {
            self.contracts.entry(name).or_insert(registry);
        }
    }
}

/// ABI file scanner
pub struct AbiScanner;

impl AbiScanner {
    /// Scan a single root directory for `abi.json` files
    ///
    /// Expects the `<root>/<contract>/abi.json` layout; the directory name
    /// becomes the contract name.
    pub fn scan(root: impl AsRef<Path>) -> AbiCatalog {
        let started = Instant::now();
        let root = root.as_ref();
        let mut catalog = AbiCatalog::new();
        let mut scanned_files = 0;
        let mut errors = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name() != OsStr::new(ABI_FILE_NAME) {
                continue;
            }

            let path = entry.path();
            let Some(name) = Self::contract_name(path) else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_ABI_BYTES {
                tracing::warn!(path = %path.display(), "skipping oversized ABI file");
                continue;
            }

            scanned_files += 1;

            match AbiRegistry::from_file(path) {
                Ok(registry) => catalog.insert(name, registry),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping invalid ABI file");
                    errors.push(format!("{}: {}", path.display(), err));
                }
            }
        }

        catalog.scanned_files = scanned_files;
        catalog.errors = errors;
        catalog.scan_ms = started.elapsed().as_millis();

        tracing::info!(
            root = %root.display(),
            contracts = catalog.len(),
            errors = catalog.errors.len(),
            "scanned ABI files"
        );

        catalog
    }

    /// Scan multiple root directories
    pub fn scan_roots(roots: &[PathBuf]) -> AbiCatalog {
        let started = Instant::now();
        let mut catalog = AbiCatalog::new();

        for root in roots {
            catalog.merge(Self::scan(root));
        }

        catalog.scan_ms = started.elapsed().as_millis();
        catalog
    }

    /// Contract name from the ABI file's parent directory
    fn contract_name(path: &Path) -> Option<String> {
        path.parent()?
            .file_name()?
            .to_str()
            .map(|name| name.to_string())
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| matches!(name, ".git" | "target" | "node_modules" | "dist" | "build"))
            .unwrap_or(false)
    }
}
