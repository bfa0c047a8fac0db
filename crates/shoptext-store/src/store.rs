//! Scope-keyed variable storage, modeled on the host platform's
//! script/message variable API.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A storage scope: per-script (survives across messages) or per-message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scope {
    Script { script_id: String },
    Message { message_id: String },
}

impl Scope {
    #[must_use]
    pub fn script(script_id: impl Into<String>) -> Self {
        Scope::Script {
            script_id: script_id.into(),
        }
    }

    #[must_use]
    pub fn message(message_id: impl Into<String>) -> Self {
        Scope::Message {
            message_id: message_id.into(),
        }
    }

    /// Flat key used by file-backed storage.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Scope::Script { script_id } => format!("script:{script_id}"),
            Scope::Message { message_id } => format!("message:{message_id}"),
        }
    }
}

/// The persistence collaborator boundary. Implementations must be safe to
/// call concurrently through `&self`.
pub trait VariableStore {
    /// Reads the raw value stored under `(scope, key)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn read_raw(&self, scope: &Scope, key: &str) -> Result<Option<Value>, StoreError>;

    /// Writes the raw value under `(scope, key)`, replacing any previous
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn write_raw(&self, scope: &Scope, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<(Scope, String), Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl VariableStore for MemoryStore {
    fn read_raw(&self, scope: &Scope, key: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(inner.get(&(scope.clone(), key.to_string())).cloned())
    }

    fn write_raw(&self, scope: &Scope, key: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.insert((scope.clone(), key.to_string()), value);
        Ok(())
    }
}

/// JSON-file-backed store: one flat object keyed by
/// `"<scope key>\u{1f}<key>"`. Reads tolerate a missing file (empty
/// state); writes rewrite the whole file, which is fine at the bounded
/// sizes the caches enforce.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Value>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    fn save(&self, state: &HashMap<String, Value>) -> Result<(), StoreError> {
        let serialized = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, serialized).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn flat_key(scope: &Scope, key: &str) -> String {
        format!("{}\u{1f}{key}", scope.storage_key())
    }
}

impl VariableStore for FileStore {
    fn read_raw(&self, scope: &Scope, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let state = self.load()?;
        Ok(state.get(&Self::flat_key(scope, key)).cloned())
    }

    fn write_raw(&self, scope: &Scope, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut state = self.load()?;
        state.insert(Self::flat_key(scope, key), value);
        self.save(&state)
    }
}
