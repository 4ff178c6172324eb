//! The language-service facility addons reach through their context.
//!
//! Parsing and type checking are out of scope; this module tracks what a
//! language service needs to know (root files, merged options, document
//! versions) and hands out [`Program`] snapshots. One service is shared by
//! every target. Each call names the target's [`LanguageHost`] explicitly,
//! so no shared "active host" slot has to be rebound between targets.

use smelt_common::ContentHash;
use smelt_config::CompilerOptionMap;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Per-target view of the project: what the service compiles for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct LanguageHost {
    target: String,
    root_files: Vec<PathBuf>,
    options: CompilerOptionMap,
}

impl LanguageHost {
    /// Creates the host for `target`.
    pub fn new(target: impl Into<String>, root_files: Vec<PathBuf>, options: CompilerOptionMap) -> Self {
        Self {
            target: target.into(),
            root_files,
            options,
        }
    }

    /// The target this host compiles for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The project's root files.
    pub fn root_files(&self) -> &[PathBuf] {
        &self.root_files
    }

    /// The target's merged compiler options.
    pub fn options(&self) -> &CompilerOptionMap {
        &self.options
    }
}

/// The last known state of one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Document {
    /// Bumped whenever the content changes; starts at 1.
    pub version: u32,
    /// Hash of the current content.
    pub hash: ContentHash,
}

/// Document versions shared by every target.
#[derive(Default)]
pub struct DocumentRegistry {
    documents: RwLock<HashMap<PathBuf, Document>>,
}

impl DocumentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `content` for `file` and returns the document's version.
    ///
    /// Re-submitting identical content keeps the version.
    pub fn update(&self, file: &Path, content: &str) -> u32 {
        let hash = ContentHash::from_text(content);
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        let doc = documents
            .entry(file.to_path_buf())
            .or_insert(Document { version: 0, hash });
        if doc.version == 0 || doc.hash != hash {
            doc.version += 1;
            doc.hash = hash;
        }
        doc.version
    }

    /// Returns the current state of `file`, if it was ever submitted.
    pub fn document(&self, file: &Path) -> Option<Document> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        documents.get(file).copied()
    }

    /// Returns every known document version, ordered by path.
    pub fn versions(&self) -> BTreeMap<PathBuf, u32> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        documents
            .iter()
            .map(|(path, doc)| (path.clone(), doc.version))
            .collect()
    }
}

/// A snapshot of what the service knows for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// The target the snapshot was taken for.
    pub target: String,
    /// The project's root files.
    pub root_files: Vec<PathBuf>,
    /// The target's merged compiler options.
    pub options: CompilerOptionMap,
    /// Versions of every document submitted so far.
    pub versions: BTreeMap<PathBuf, u32>,
}

/// The external language-service facility.
pub trait LanguageService: Send + Sync {
    /// Submits the current content of `file` on behalf of `host`.
    ///
    /// Returns the document version. Content that fails to parse is still
    /// accepted; parse problems are never a pipeline failure.
    fn update_document(&self, host: &LanguageHost, file: &Path, content: &str) -> u32;

    /// Returns a program snapshot for `host`.
    fn program(&self, host: &LanguageHost) -> Program;
}

/// The default service: one document registry shared by all targets.
#[derive(Default)]
pub struct SharedLanguageService {
    registry: DocumentRegistry,
}

impl SharedLanguageService {
    /// Creates a service with an empty document registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared document registry.
    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }
}

impl LanguageService for SharedLanguageService {
    fn update_document(&self, host: &LanguageHost, file: &Path, content: &str) -> u32 {
        let version = self.registry.update(file, content);
        tracing::trace!(target_name = host.target(), file = %file.display(), version, "document updated");
        version
    }

    fn program(&self, host: &LanguageHost) -> Program {
        Program {
            target: host.target().to_string(),
            root_files: host.root_files().to_vec(),
            options: host.options().clone(),
            versions: self.registry.versions(),
        }
    }
}
