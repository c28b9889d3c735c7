//! Classification of a test run reported by the caller.
//!
//! Nothing here executes a test command; the caller supplies the exit code
//! and the captured output.

use crate::types::TestResult;

/// Substrings that mark a non-zero exit as an environment failure (missing
/// binary, broken dependency) rather than a failing test.
pub const INFRA_PATTERNS: [&str; 8] = [
    "command not found",
    "Executable doesn't exist",
    "Cannot find module",
    "ENOENT",
    "No such file or directory",
    "MODULE_NOT_FOUND",
    "not recognized as",
    "Permission denied",
];

pub fn classify<S: AsRef<str>>(exit_code: i32, output: &str, extra_patterns: &[S]) -> TestResult {
    if exit_code == 0 {
        return TestResult::Pass;
    }
    let infra = INFRA_PATTERNS.iter().any(|p| output.contains(p))
        || extra_patterns
            .iter()
            .map(AsRef::as_ref)
            .any(|p| !p.is_empty() && output.contains(p));
    if infra {
        TestResult::Error
    } else {
        TestResult::Fail
    }
}

/// Keep the last `max_lines` lines of `output`, prefixed by a marker line
/// when anything was dropped. Output that already fits is returned as is.
pub fn summarize(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.trim_end_matches('\n').split('\n').collect();
    let total = lines.len();
    if max_lines == 0 || total <= max_lines {
        return output.to_string();
    }

    let mut out = format!(
        "... ({} lines truncated, showing last {max_lines}) ...\n",
        total - max_lines
    );
    for line in &lines[total - max_lines..] {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn zero_exit_passes_even_with_scary_output() {
        assert_eq!(
            classify(0, "warning: No such file or directory", NONE),
            TestResult::Pass
        );
    }

    #[test]
    fn non_zero_exit_is_fail_by_default() {
        assert_eq!(
            classify(1, "test parser::ints ... FAILED\nassertion failed", NONE),
            TestResult::Fail
        );
    }

    #[test]
    fn infrastructure_patterns_yield_error() {
        for pattern in INFRA_PATTERNS {
            let output = format!("sh: line 1: {pattern}");
            assert_eq!(classify(127, &output, NONE), TestResult::Error, "{pattern}");
        }
    }

    #[test]
    fn extra_patterns_extend_the_list() {
        let extra = vec!["connection refused".to_string()];
        assert_eq!(
            classify(1, "db: connection refused", extra.as_slice()),
            TestResult::Error
        );
        assert_eq!(classify(1, "db: connection refused", NONE), TestResult::Fail);
        assert_eq!(classify(1, "anything", &[""]), TestResult::Fail);
    }

    #[test]
    fn summarize_keeps_short_output() {
        let out = "line 1\nline 2\n";
        assert_eq!(summarize(out, 20), out);
    }

    #[test]
    fn summarize_truncates_to_tail() {
        let out: String = (1..=25).map(|n| format!("line {n}\n")).collect();
        let summary = summarize(&out, 20);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], "... (5 lines truncated, showing last 20) ...");
        assert_eq!(lines[1], "line 6");
        assert_eq!(lines[20], "line 25");
    }
}
