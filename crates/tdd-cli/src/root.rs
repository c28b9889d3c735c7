use std::path::{Path, PathBuf};
use tdd_core::paths::SESSION_FILE;

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `TDD_AI_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.tdd-ai.json`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(&cwd)
}

fn resolve_from(start: &Path) -> PathBuf {
    find_upward(start, |dir| dir.join(SESSION_FILE).is_file())
        .or_else(|| find_upward(start, |dir| dir.join(".git").is_dir()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, matches: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| matches(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_session_file_above_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{}").unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(resolve_from(&subdir), dir.path());
    }

    #[test]
    fn session_file_beats_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let pkg = dir.path().join("packages/api");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join(SESSION_FILE), "{}").unwrap();

        assert_eq!(resolve_from(&pkg.join("src")), pkg);
    }

    #[test]
    fn falls_back_to_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let subdir = dir.path().join("src");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(resolve_from(&subdir), dir.path());
    }
}
