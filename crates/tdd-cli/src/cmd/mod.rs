pub mod blockers;
pub mod commands;
pub mod complete;
pub mod config;
pub mod guide;
pub mod init;
pub mod phase;
pub mod record;
pub mod refactor;
pub mod reset;
pub mod resume;
pub mod spec;
pub mod status;

use anyhow::Context;
use std::path::Path;
use tdd_core::session::Session;
use tdd_core::store::{JsonFileStore, SessionStore};

/// Load the session under `root`, keeping the store for the matching save.
pub(crate) fn load_session(root: &Path) -> anyhow::Result<(JsonFileStore, Session)> {
    let store = JsonFileStore::new(root);
    let session = store
        .load()
        .with_context(|| format!("failed to load {}", store.path().display()))?;
    tracing::debug!(
        phase = %session.phase,
        mode = %session.mode,
        specs = session.specs.len(),
        "loaded session"
    );
    Ok((store, session))
}

pub(crate) fn save_session(store: &JsonFileStore, session: &Session) -> anyhow::Result<()> {
    store.save(session).context("failed to save session")?;
    tracing::debug!(path = %store.path().display(), phase = %session.phase, "saved session");
    Ok(())
}
