//! Store abstraction for brokerdesk's persisted document.
//!
//! A `Store` is an explicit handle to one data root. It owns the lifecycle of
//! the JSON document (create-if-absent, load, recover, save) and the writer
//! lock that serializes load-mutate-save cycles. Nothing is cached between
//! operations: every call reads the file again.

use crate::core::config::DeskConfig;
use crate::core::document::Document;
use crate::core::error::{DeskError, DeskResult};
use crate::core::{schemas, time};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Store handle representing one brokerdesk data root.
///
/// Clones share the same writer lock, so every clone handed to a repository
/// takes part in the same serialization.
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory holding the document, audit log and config.
    pub root: PathBuf,
    document_path: PathBuf,
    writer: Arc<Mutex<()>>,
    /// Append broker events for mutations made through this handle.
    pub audit: bool,
    /// Caller identity recorded on audit events.
    pub actor: String,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_document_name(root, schemas::DOCUMENT_FILE_NAME)
    }

    pub fn with_document_name(root: impl Into<PathBuf>, name: &str) -> Self {
        let root = root.into();
        let document_path = root.join(name);
        Self {
            root,
            document_path,
            writer: Arc::new(Mutex::new(())),
            audit: true,
            actor: "brokerdesk".to_string(),
        }
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        Self::with_document_name(config.data_dir.clone(), &config.document)
            .with_audit(config.audit)
            .with_actor(&config.actor)
    }

    /// Same store and writer lock, different caller identity.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// Exclusive access for one load-mutate-save cycle. A poisoned lock only
    /// means an earlier operation panicked; the file on disk is still whole
    /// because saves go through a rename.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ensure the data root exists and holds a readable document.
    pub fn init(&self) -> DeskResult<Document> {
        let _guard = self.lock();
        self.load()
    }

    /// Load the document.
    ///
    /// - absent: the default document is written and returned.
    /// - unparseable: the file is moved aside to `<name>.corrupt-<ms>`, a
    ///   warning is logged, and a fresh default document replaces it.
    /// - parseable: missing collections come back empty, unreadable records
    ///   are skipped with a warning, and the user counter is repaired; nothing
    ///   is written and no valid record is dropped.
    pub fn load(&self) -> DeskResult<Document> {
        fs::create_dir_all(&self.root).map_err(DeskError::IoError)?;

        let bytes = match fs::read(&self.document_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let doc = Document::default();
                self.save(&doc)?;
                log::info!("initialized empty document at {}", self.document_path.display());
                return Ok(doc);
            }
            Err(e) => {
                return Err(DeskError::StoreError(format!(
                    "cannot read {}: {}",
                    self.document_path.display(),
                    e
                )));
            }
        };

        let value = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(value) if value.is_object() => value,
            Ok(_) => return self.recover(&"top-level value is not an object"),
            Err(parse_err) => return self.recover(&parse_err),
        };
        let mut doc = Document::from(value);
        doc.backfill();
        Ok(doc)
    }

    fn recover(&self, cause: &dyn std::fmt::Display) -> DeskResult<Document> {
        let backup = self.root.join(format!(
            "{}.corrupt-{}",
            self.document_file_name(),
            time::now_epoch_ms()
        ));
        fs::rename(&self.document_path, &backup).map_err(DeskError::IoError)?;
        log::warn!(
            "document {} is corrupt ({}); moved to {} and reinitialized",
            self.document_path.display(),
            cause,
            backup.display()
        );
        let doc = Document::default();
        self.save(&doc)?;
        Ok(doc)
    }

    /// Serialize the whole document and replace the file atomically
    /// (temp file, fsync, rename). Returns the SHA-256 of the written bytes.
    pub fn save(&self, doc: &Document) -> DeskResult<String> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp_path = self.root.join(format!(".{}.tmp", self.document_file_name()));

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.document_path)
        };
        if let Err(e) = write() {
            log::error!("failed to save {}: {}", self.document_path.display(), e);
            let _ = fs::remove_file(&tmp_path);
            return Err(DeskError::StoreError(format!(
                "cannot write {}: {}",
                self.document_path.display(),
                e
            )));
        }

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn document_file_name(&self) -> String {
        self.document_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}
