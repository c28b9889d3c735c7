use crate::error::{Result, TddError};
use crate::paths;
use crate::session::Session;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Where a session document lives. One store holds at most one session.
pub trait SessionStore {
    fn exists(&self) -> bool;

    /// Load the session. A missing document is [`TddError::NotInitialized`].
    fn load(&self) -> Result<Session>;

    fn save(&self, session: &Session) -> Result<()>;

    /// Delete the document. Returns false if there was nothing to delete.
    fn remove(&self) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// `<root>/.tdd-ai.json`, written atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: &Path) -> Self {
        Self {
            path: paths::session_path(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Err(TddError::NotInitialized);
        }
        let data = std::fs::read_to_string(&self.path)?;
        Session::from_json(&data)
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut data = session.to_json()?;
        data.push('\n');
        crate::io::atomic_write(&self.path, data.as_bytes())
    }

    fn remove(&self) -> Result<bool> {
        crate::io::remove_if_exists(&self.path)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Keeps the serialized document in memory. Goes through the same JSON
/// encoding as [`JsonFileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn exists(&self) -> bool {
        self.doc.borrow().is_some()
    }

    fn load(&self) -> Result<Session> {
        match self.doc.borrow().as_deref() {
            Some(data) => Session::from_json(data),
            None => Err(TddError::NotInitialized),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.doc.borrow_mut() = Some(session.to_json()?);
        Ok(())
    }

    fn remove(&self) -> Result<bool> {
        Ok(self.doc.borrow_mut().take().is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mode, Phase, TestResult};
    use crate::workflow;
    use tempfile::TempDir;

    fn exercise(store: &dyn SessionStore) {
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(TddError::NotInitialized)));

        let mut s = workflow::init(Mode::Greenfield, Some("cargo test".into()));
        workflow::add_specs(&mut s, &["adds numbers", "rejects overflow"]).unwrap();
        workflow::pick_spec(&mut s, 1).unwrap();
        store.save(&s).unwrap();
        assert!(store.exists());

        let mut loaded = store.load().unwrap();
        assert_eq!(loaded, s);

        workflow::advance(&mut loaded, Some(TestResult::Fail)).unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap().phase, Phase::Green);

        assert!(store.remove().unwrap());
        assert!(!store.remove().unwrap());
        assert!(!store.exists());
    }

    #[test]
    fn memory_store_lifecycle() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn json_file_store_lifecycle() {
        let dir = TempDir::new().unwrap();
        exercise(&JsonFileStore::new(dir.path()));
    }

    #[test]
    fn json_file_store_writes_pretty_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(&workflow::init(Mode::Retrofit, None)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(".tdd-ai.json")).unwrap();
        assert!(raw.contains("\n  \"phase\": \"red\""));
        assert!(raw.contains("\"mode\": \"retrofit\""));
        assert!(!raw.contains("test_cmd"));
    }

    #[test]
    fn corrupt_document_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".tdd-ai.json"), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.load(), Err(TddError::Json(_))));
    }
}
