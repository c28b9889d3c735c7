//! Phase transition table and expected test results.
//!
//! Greenfield: `red -> green -> refactor -> done`.
//! Retrofit:   `red -> refactor -> done` (green is never entered).
//!
//! The per-spec loop adds one edge, `refactor -> red`, taken while active
//! specs remain after the current one.

use crate::error::{Result, TddError};
use crate::types::{Mode, Phase, TestResult};

/// Next phase in the cycle for `mode`.
///
/// `done` has no successor. A phase outside the mode's table (green under
/// retrofit) is reported as unknown rather than coerced.
pub fn next(current: Phase, mode: Mode) -> Result<Phase> {
    match (mode, current) {
        (_, Phase::Done) => Err(TddError::TerminalPhase),
        (Mode::Greenfield, Phase::Red) => Ok(Phase::Green),
        (Mode::Greenfield, Phase::Green) => Ok(Phase::Refactor),
        (Mode::Retrofit, Phase::Red) => Ok(Phase::Refactor),
        (_, Phase::Refactor) => Ok(Phase::Done),
        (Mode::Retrofit, Phase::Green) => Err(TddError::PhaseNotInMode {
            phase: current.to_string(),
            mode: mode.to_string(),
        }),
    }
}

/// Like [`next`], except that refactor loops back to red while specs remain.
pub fn next_in_loop(current: Phase, mode: Mode, has_remaining_specs: bool) -> Result<Phase> {
    if current == Phase::Refactor && has_remaining_specs {
        return Ok(Phase::Red);
    }
    next(current, mode)
}

pub fn can_transition(from: Phase, to: Phase, mode: Mode) -> bool {
    if from == Phase::Refactor && to == Phase::Red {
        return true;
    }
    matches!(next(from, mode), Ok(n) if n == to)
}

/// Whether `phase` belongs to the transition table of `mode`.
pub fn in_domain(phase: Phase, mode: Mode) -> bool {
    !(mode == Mode::Retrofit && phase == Phase::Green)
}

/// The test outcome required to leave `phase`. `None` at `done`.
pub fn expected_result(phase: Phase, mode: Mode) -> Option<TestResult> {
    match (phase, mode) {
        (Phase::Red, Mode::Greenfield) => Some(TestResult::Fail),
        (Phase::Red, Mode::Retrofit) | (Phase::Green, _) | (Phase::Refactor, _) => {
            Some(TestResult::Pass)
        }
        (Phase::Done, _) => None,
    }
}
