use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

/// Session document, one per project root.
pub const SESSION_FILE: &str = ".tdd-ai.json";

/// Optional project configuration.
pub const CONFIG_FILE: &str = ".tdd-ai.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_root() {
        let root = Path::new("/work/project");
        assert_eq!(
            session_path(root),
            PathBuf::from("/work/project/.tdd-ai.json")
        );
        assert_eq!(config_path(root), PathBuf::from("/work/project/.tdd-ai.yaml"));
    }
}
