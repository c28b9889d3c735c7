use crate::machine;
use crate::session::Session;
use crate::types::{Phase, TestResult};

pub const NO_ACTIVE_SPECS: &str = "No active specs";
pub const NO_SPEC_SELECTED: &str = "No spec selected";
pub const NO_TEST_RESULT: &str = "No test result recorded";
pub const PAST_DONE: &str = "Cannot advance past done";

/// Reasons advancement from the current phase is illegal. Empty means the
/// session may advance.
///
/// Every applicable blocker is reported, in a fixed order per phase.
pub fn get_blockers(session: &Session) -> Vec<String> {
    blockers_with_result(session, session.last_test_result)
}

/// Blockers evaluated as if `result` were the recorded test result.
pub(crate) fn blockers_with_result(session: &Session, result: Option<TestResult>) -> Vec<String> {
    let mut blockers = Vec::new();

    match session.phase {
        Phase::Red => {
            let active = session.active_specs().len();
            if active == 0 {
                blockers.push(NO_ACTIVE_SPECS.to_string());
            }
            if session.current_spec_id.is_none() && active > 0 {
                blockers.push(NO_SPEC_SELECTED.to_string());
            }
            test_result_blocker(session, result, &mut blockers);
        }
        Phase::Green => test_result_blocker(session, result, &mut blockers),
        Phase::Refactor => {
            test_result_blocker(session, result, &mut blockers);
            let pending = session.pending_reflections().len();
            if pending > 0 {
                blockers.push(format!("{pending} reflection questions unanswered"));
            }
        }
        Phase::Done => blockers.push(PAST_DONE.to_string()),
    }

    blockers
}

fn test_result_blocker(session: &Session, result: Option<TestResult>, out: &mut Vec<String>) {
    let Some(actual) = result else {
        out.push(NO_TEST_RESULT.to_string());
        return;
    };
    if let Some(expected) = machine::expected_result(session.phase, session.mode) {
        if actual != expected {
            out.push(format!(
                "Test result '{actual}' does not match expected '{expected}'"
            ));
        }
    }
}
