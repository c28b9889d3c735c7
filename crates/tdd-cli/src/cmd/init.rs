use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use tdd_core::config::Config;
use tdd_core::store::{JsonFileStore, SessionStore};
use tdd_core::types::Mode;
use tdd_core::{workflow, TddError};

pub fn run(
    root: &Path,
    retrofit: bool,
    greenfield: bool,
    test_cmd: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let store = JsonFileStore::new(root);
    if store.exists() {
        return Err(TddError::AlreadyInitialized.into());
    }

    let config = Config::load(root).context("failed to load config")?;
    let mode = if retrofit {
        Mode::Retrofit
    } else if greenfield {
        Mode::Greenfield
    } else {
        config.defaults.mode
    };
    let test_cmd = test_cmd.or(config.defaults.test_cmd);

    let session = workflow::init(mode, test_cmd);
    super::save_session(&store, &session)?;

    if json {
        print_json(&serde_json::json!({
            "path": store.path(),
            "phase": session.phase,
            "mode": session.mode,
            "test_cmd": session.test_cmd,
        }))?;
    } else {
        println!("Initialized TDD session in {} mode", session.mode);
        if let Some(cmd) = &session.test_cmd {
            println!("Test command: {cmd}");
        }
        println!("Phase: {}", session.phase.as_str().to_uppercase());
        println!("Next: add specs with 'tdd-ai spec add \"description\"'");
    }
    Ok(())
}
