//! Host environment adapters: preference file and navigation history.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use scone_viewer::{Location, PreferenceError, PreferenceStore};

/// Preferences persisted as a JSON object on disk.
///
/// A missing or unreadable file starts an empty store; every write rewrites
/// the whole file.
#[derive(Debug)]
pub(crate) struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    pub(crate) fn open(path: &Path) -> Self {
        let values = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    fn save(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(&self.values).map_err(|e| e.to_string())?;
        std::fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.save().map_err(|message| PreferenceError {
            key: key.to_owned(),
            message,
        })
    }
}

#[derive(Debug, Default)]
struct History {
    entries: Vec<String>,
    index: usize,
}

/// Address-bar fragment with browser-style back and forward history.
///
/// Clones share one history, so the command loop can step through it while
/// the viewer owns another clone.
#[derive(Clone, Debug)]
pub(crate) struct HistoryLocation(Rc<RefCell<History>>);

impl HistoryLocation {
    pub(crate) fn new(fragment: &str) -> Self {
        Self(Rc::new(RefCell::new(History {
            entries: vec![fragment.to_owned()],
            index: 0,
        })))
    }

    /// Type a fragment into the address bar.
    pub(crate) fn navigate(&self, fragment: &str) -> bool {
        let mut history = self.0.borrow_mut();
        if history.entries[history.index] == fragment {
            return false;
        }
        let next = history.index + 1;
        history.entries.truncate(next);
        history.entries.push(fragment.to_owned());
        history.index = next;
        true
    }

    /// Step back; returns `false` at the oldest entry.
    pub(crate) fn back(&self) -> bool {
        let mut history = self.0.borrow_mut();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        true
    }

    /// Step forward; returns `false` at the newest entry.
    pub(crate) fn forward(&self) -> bool {
        let mut history = self.0.borrow_mut();
        if history.index + 1 >= history.entries.len() {
            return false;
        }
        history.index += 1;
        true
    }
}

impl Location for HistoryLocation {
    fn fragment(&self) -> String {
        let history = self.0.borrow();
        history.entries[history.index].clone()
    }

    fn set_fragment(&mut self, fragment: &str) {
        self.navigate(fragment);
    }
}
