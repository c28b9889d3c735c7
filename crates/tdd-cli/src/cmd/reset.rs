use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use tdd_core::store::{JsonFileStore, SessionStore};
use tdd_core::TddError;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = JsonFileStore::new(root);
    let removed = store.remove().context("failed to remove session")?;
    if !removed {
        return Err(TddError::NotInitialized.into());
    }
    tracing::debug!(path = %store.path().display(), "removed session");

    if json {
        print_json(&serde_json::json!({ "removed": store.path() }))?;
    } else {
        println!("TDD session cleared. Run 'tdd-ai init' to start a new one.");
    }
    Ok(())
}
