use crate::core::document::Document;
use crate::core::error::{DeskError, DeskResult};
use crate::core::schemas;
use crate::core::store::Store;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// The Doc Broker is the "Thin Waist" for state access.
/// Every repository operation goes through `read` or `mutate`; `mutate` holds
/// the store's writer lock across load, change and save so concurrent callers
/// cannot lose each other's updates.
pub struct DocBroker<'a> {
    store: &'a Store,
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub doc_id: String,
    pub status: String,
    /// SHA-256 of the document as written; absent when nothing was saved.
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<'a> DocBroker<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            audit_log_path: store.root.join(schemas::AUDIT_LOG_NAME),
        }
    }

    /// Run a read-only closure against a freshly loaded document.
    pub fn read<F, R>(&self, op_name: &str, f: F) -> DeskResult<R>
    where
        F: FnOnce(&Document) -> DeskResult<R>,
    {
        let _lock = self.store.lock();
        log::debug!("read {}", op_name);
        let doc = self.store.load()?;
        f(&doc)
    }

    /// Load, apply `f`, and save only if `f` succeeded. A failing closure
    /// leaves the file untouched.
    pub fn mutate<F, R>(&self, op_name: &str, f: F) -> DeskResult<R>
    where
        F: FnOnce(&mut Document) -> DeskResult<R>,
    {
        let _lock = self.store.lock();
        log::debug!("mutate {} as {}", op_name, self.store.actor);

        let result = self.store.load().and_then(|mut doc| {
            let value = f(&mut doc)?;
            let digest = self.store.save(&doc)?;
            Ok((value, digest))
        });

        match &result {
            Ok((_, digest)) => self.record(op_name, "success", Some(digest.clone()), None),
            Err(e) => self.record(op_name, "error", None, Some(e.to_string())),
        }

        result.map(|(value, _)| value)
    }

    fn record(&self, op: &str, status: &str, digest: Option<String>, error: Option<String>) {
        if !self.store.audit {
            return;
        }
        let ev = BrokerEvent {
            ts: time::now_iso(),
            event_id: time::new_event_id(),
            actor: self.store.actor.clone(),
            op: op.to_string(),
            doc_id: self
                .store
                .document_path()
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            status: status.to_string(),
            digest,
            error,
        };
        // The mutation is already durable at this point; a broken audit log
        // must not turn it into a reported failure.
        if let Err(e) = self.append_event(&ev) {
            log::error!("failed to append audit event for {}: {}", op, e);
        }
    }

    fn append_event(&self, ev: &BrokerEvent) -> DeskResult<()> {
        let line = serde_json::to_string(ev)?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(DeskError::IoError)?;
        writeln!(f, "{}", line).map_err(DeskError::IoError)?;
        Ok(())
    }

    /// All recorded events, oldest first. Unreadable lines are skipped.
    pub fn audit_log(&self) -> DeskResult<Vec<BrokerEvent>> {
        if !self.audit_log_path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.audit_log_path).map_err(DeskError::IoError)?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<BrokerEvent>(line) {
                Ok(ev) => Some(ev),
                Err(e) => {
                    log::warn!("skipping malformed audit line: {}", e);
                    None
                }
            })
            .collect())
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "broker",
        "version": "0.2.0",
        "description": "Serialized load-mutate-save boundary with an append-only audit log",
        "commands": [
            { "name": "audit", "description": "Show the mutation audit log" }
        ],
        "storage": [schemas::AUDIT_LOG_NAME]
    })
}
