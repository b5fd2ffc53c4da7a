//! Hands the draft from the creation wizard to the print view.
//!
//! The slot behaves like browser session storage: one text value under a
//! fixed key, visible only to the current shell session, with no schema tag.

use slug::slugify;
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::model::InvoiceDraft;

pub const PRINT_DATA_KEY: &str = "create-invoice-easy:printData";
pub const SESSION_ENV: &str = "INVOICE_EASY_SESSION";

/// Where the application goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    NewInvoice,
    Print,
}

pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed slots under `<root>/<session id>/`.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: &Path, session_id: &str) -> Self {
        FileSessionStore { dir: root.join(slugify(session_id)) }
    }

    /// Scoped to the invoking shell unless `INVOICE_EASY_SESSION` pins a name.
    pub fn for_current_session(root: &Path) -> Self {
        Self::new(root, &current_session_id())
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slugify(key)))
    }
}

pub fn current_session_id() -> String {
    if let Ok(id) = std::env::var(SESSION_ENV) {
        if !id.trim().is_empty() {
            return id;
        }
    }
    parent_session_id()
}

#[cfg(unix)]
fn parent_session_id() -> String {
    format!("shell-{}", std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
fn parent_session_id() -> String {
    "default".to_string()
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::io(&self.dir, e))?;
        let path = self.slot_path(key);
        fs::write(&path, value).map_err(|e| AppError::io(path, e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::io(path, e)),
        }
    }
}

/// In-process slots; can be switched off to act like disabled storage.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    slots: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        MemorySessionStore { unavailable: true, ..Default::default() }
    }
}

#[cfg(test)]
fn storage_disabled() -> AppError {
    AppError::io("memory", std::io::Error::new(ErrorKind::PermissionDenied, "session storage is disabled"))
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.unavailable {
            return Err(storage_disabled());
        }
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.unavailable {
            return Err(storage_disabled());
        }
        self.slots.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.unavailable {
            return Err(storage_disabled());
        }
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stashes the draft for the print view and returns the route to follow.
///
/// Storage failures are logged and otherwise ignored; navigation happens
/// regardless and the print view shows its empty state.
pub fn handoff(store: &dyn SessionStore, draft: &InvoiceDraft) -> Route {
    let stored = serde_json::to_string(draft)
        .map_err(AppError::from)
        .and_then(|payload| store.set(PRINT_DATA_KEY, &payload));
    match stored {
        Ok(()) => debug!(key = PRINT_DATA_KEY, "draft handed off"),
        Err(e) => warn!(error = %e, "could not store print data, continuing without it"),
    }
    Route::Print
}

/// Reads the handed-off draft back, if there is a usable one.
pub fn load(store: &dyn SessionStore) -> Option<InvoiceDraft> {
    let raw = match store.get(PRINT_DATA_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "could not read print data");
            return None;
        }
    };
    let value: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "stored print data is not valid JSON");
            return None;
        }
    };
    if is_falsy(&value) {
        debug!("stored print data is empty");
        return None;
    }
    if !value.is_object() {
        // Nothing to read fields from; every field renders as empty.
        debug!("stored print data is not an object");
        return Some(InvoiceDraft::default());
    }
    // Field decoding is lenient, so an object always yields a draft.
    serde_json::from_value(value).ok()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn clear(store: &dyn SessionStore) -> Result<()> {
    store.remove(PRINT_DATA_KEY)
}
