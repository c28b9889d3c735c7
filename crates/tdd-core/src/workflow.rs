//! Command-level mutations of a [`Session`].
//!
//! Each operation validates first, then mutates and appends exactly one
//! history event. An `Err` means the session was not touched.

use crate::blockers::{self, blockers_with_result};
use crate::error::{Result, TddError};
use crate::event::EventKind;
use crate::machine;
use crate::session::Session;
use crate::spec;
use crate::types::{Mode, Phase, SpecStatus, TestResult};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advance {
    pub from: Phase,
    pub to: Phase,
    pub result: TestResult,
    /// Spec completed by leaving refactor, if one was selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_spec: Option<u32>,
    pub iteration: u32,
    pub reflections_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseOverride {
    pub from: Phase,
    pub to: Phase,
    /// Whether `from -> to` is an edge of the transition table.
    pub follows_table: bool,
    pub reflections_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub from: Phase,
    /// Phases entered on the way to done, in order.
    pub path: Vec<Phase>,
    pub specs_completed: usize,
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

pub fn init(mode: Mode, test_cmd: Option<String>) -> Session {
    let mut session = Session::new(mode);
    session.test_cmd = test_cmd.filter(|c| !c.trim().is_empty());
    session.record(EventKind::Init { mode });
    session
}

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

pub fn add_specs<S: AsRef<str>>(session: &mut Session, descriptions: &[S]) -> Result<Vec<u32>> {
    let descriptions: Vec<&str> = descriptions
        .iter()
        .map(|d| d.as_ref().trim())
        .filter(|d| !d.is_empty())
        .collect();
    if descriptions.is_empty() {
        return Err(TddError::EmptySpecList);
    }

    // Refuse the whole batch if the id space cannot hold it.
    u32::try_from(descriptions.len())
        .ok()
        .and_then(|n| session.next_id.checked_add(n))
        .ok_or(TddError::SpecIdsExhausted)?;
    let ids = descriptions
        .iter()
        .map(|d| session.add_spec(*d))
        .collect::<Result<Vec<u32>>>()?;
    session.record(EventKind::SpecAdd {
        spec_count: ids.len(),
    });
    Ok(ids)
}

/// Select the spec to drive. Switching to a different spec outside REFACTOR
/// starts a new spec cycle, so leftover reflection answers are dropped.
pub fn pick_spec(session: &mut Session, id: u32) -> Result<()> {
    let switching = session.current_spec_id != Some(id);
    session.set_current_spec(id)?;
    if switching && session.phase != Phase::Refactor {
        session.reflections.clear();
    }
    session.record(EventKind::SpecPick { spec_id: id });
    Ok(())
}

/// Complete the given specs. Every id is checked before any is flipped, so a
/// bad id leaves all of them active. Repeated ids count once.
pub fn complete_specs(session: &mut Session, ids: &[u32]) -> Result<Vec<u32>> {
    let mut unique: Vec<u32> = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    if unique.is_empty() {
        return Err(TddError::NoActiveSpecs);
    }

    for &id in &unique {
        if spec::find(&session.specs, id)?.status == SpecStatus::Completed {
            return Err(TddError::SpecAlreadyCompleted(id));
        }
    }
    for &id in &unique {
        session.complete_spec(id)?;
    }
    session.clear_stale_current();
    session.record(EventKind::SpecDone {
        spec_count: unique.len(),
    });
    Ok(unique)
}

/// Complete every active spec. Having none to complete is an error here.
pub fn complete_all(session: &mut Session) -> Result<usize> {
    if session.active_specs().is_empty() {
        return Err(TddError::NoActiveSpecs);
    }
    let count = session.complete_all_specs();
    session.clear_stale_current();
    session.record(EventKind::SpecDone { spec_count: count });
    Ok(count)
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

pub fn record_test_result(session: &mut Session, result: TestResult) {
    session.last_test_result = Some(result);
    session.record(EventKind::TestRun { result });
}

/// Advance to the next phase of the loop.
///
/// `supplied` takes precedence over the stored result. The result is
/// consumed: it is cleared once the transition succeeds.
pub fn advance(session: &mut Session, supplied: Option<TestResult>) -> Result<Advance> {
    let effective = supplied.or(session.last_test_result);
    if effective == Some(TestResult::Error) {
        return Err(TddError::TestInfrastructure);
    }

    let blocked = blockers_with_result(session, effective);
    if !blocked.is_empty() {
        if blocked.iter().any(|b| b == blockers::PAST_DONE) {
            return Err(TddError::TerminalPhase);
        }
        return Err(TddError::Blocked(blocked));
    }
    let Some(result) = effective else {
        return Err(TddError::NoTestResult);
    };

    let from = session.phase;
    let has_remaining = !session.remaining_specs().is_empty();
    let to = machine::next_in_loop(from, session.mode, has_remaining)?;

    let mut completed_spec = None;
    if from == Phase::Refactor {
        if session.current_spec().is_some() {
            completed_spec = Some(session.complete_current_spec()?);
        }
        session.iteration += 1;
        session.reflections.clear();
    }
    let reflections_loaded = to == Phase::Refactor && session.load_reflections();

    session.phase = to;
    session.last_test_result = None;
    session.record(EventKind::PhaseNext {
        from,
        to,
        result: Some(result),
        spec_id: completed_spec,
    });

    Ok(Advance {
        from,
        to,
        result,
        completed_spec,
        iteration: session.iteration,
        reflections_loaded,
    })
}

/// Manual phase override. Any phase in the mode's domain is accepted; the
/// outcome reports whether the jump follows the transition table.
pub fn set_phase(session: &mut Session, phase: Phase) -> Result<PhaseOverride> {
    if !machine::in_domain(phase, session.mode) {
        return Err(TddError::PhaseNotInMode {
            phase: phase.to_string(),
            mode: session.mode.to_string(),
        });
    }

    let from = session.phase;
    let follows_table = machine::can_transition(from, phase, session.mode);
    let reflections_loaded = phase == Phase::Refactor && session.load_reflections();

    session.phase = phase;
    session.record(EventKind::PhaseSet { from, to: phase });

    Ok(PhaseOverride {
        from,
        to: phase,
        follows_table,
        reflections_loaded,
    })
}

// ---------------------------------------------------------------------------
// Reflections
// ---------------------------------------------------------------------------

pub fn answer_reflection(session: &mut Session, id: u32, answer: &str) -> Result<()> {
    if session.phase != Phase::Refactor {
        return Err(TddError::NotInRefactor(session.phase.to_string()));
    }
    session.answer_reflection(id, answer.trim())?;
    session.record(EventKind::ReflectionAnswer { question: id });
    Ok(())
}

// ---------------------------------------------------------------------------
// Cycle completion
// ---------------------------------------------------------------------------

/// Walk the session to done and complete every active spec in one step.
///
/// Requires a passing result (supplied or stored) and, in refactor, every
/// loaded reflection answered.
pub fn complete_cycle(session: &mut Session, supplied: Option<TestResult>) -> Result<Completion> {
    if session.phase == Phase::Done && session.active_specs().is_empty() {
        return Err(TddError::NothingToComplete);
    }
    match supplied.or(session.last_test_result) {
        None => return Err(TddError::NoTestResult),
        Some(TestResult::Error) => return Err(TddError::TestInfrastructure),
        Some(TestResult::Fail) => return Err(TddError::TestsFailing),
        Some(TestResult::Pass) => {}
    }
    if session.phase == Phase::Refactor {
        let pending = session.pending_reflections().len();
        if pending > 0 {
            return Err(TddError::Blocked(vec![format!(
                "{pending} reflection questions unanswered"
            )]));
        }
    }

    let from = session.phase;
    let mut path = Vec::new();
    let mut phase = from;
    while phase != Phase::Done {
        phase = machine::next(phase, session.mode)?;
        path.push(phase);
    }

    session.phase = Phase::Done;
    let specs_completed = session.complete_all_specs();
    session.current_spec_id = None;
    session.last_test_result = None;
    if from != Phase::Done {
        session.iteration += 1;
    }
    session.reflections.clear();
    session.record(EventKind::Complete {
        result: TestResult::Pass,
        spec_count: specs_completed,
    });

    Ok(Completion {
        from,
        path,
        specs_completed,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockers::get_blockers;

    const ANSWER: &str = "the code reads clearly enough already";

    fn answer_all(s: &mut Session) {
        for id in 1..=7 {
            answer_reflection(s, id, ANSWER).unwrap();
        }
    }

    fn greenfield_with(specs: &[&str]) -> Session {
        let mut s = init(Mode::Greenfield, None);
        add_specs(&mut s, specs).unwrap();
        s
    }

    #[test]
    fn init_records_mode_and_test_cmd() {
        let s = init(Mode::Retrofit, Some("cargo test".into()));
        assert_eq!(s.phase, Phase::Red);
        assert_eq!(s.test_cmd.as_deref(), Some("cargo test"));
        assert_eq!(s.history.len(), 1);
        assert_eq!(s.history[0].kind, EventKind::Init { mode: Mode::Retrofit });

        let s = init(Mode::Greenfield, Some("   ".into()));
        assert_eq!(s.test_cmd, None);
    }

    #[test]
    fn add_specs_requires_a_description() {
        let mut s = init(Mode::Greenfield, None);
        assert!(matches!(
            add_specs::<&str>(&mut s, &[]),
            Err(TddError::EmptySpecList)
        ));
        assert!(matches!(
            add_specs(&mut s, &["  "]),
            Err(TddError::EmptySpecList)
        ));
        assert_eq!(s.history.len(), 1);

        assert_eq!(add_specs(&mut s, &["a", "b"]).unwrap(), vec![1, 2]);
        assert_eq!(
            s.history.last().unwrap().kind,
            EventKind::SpecAdd { spec_count: 2 }
        );
    }

    #[test]
    fn complete_specs_is_all_or_nothing() {
        let mut s = greenfield_with(&["a", "b"]);
        let before = s.clone();
        assert!(matches!(
            complete_specs(&mut s, &[1, 9]),
            Err(TddError::SpecNotFound(9))
        ));
        assert_eq!(s, before);

        assert_eq!(complete_specs(&mut s, &[2, 2]).unwrap(), vec![2]);
        assert!(matches!(
            complete_specs(&mut s, &[1, 2]),
            Err(TddError::SpecAlreadyCompleted(2))
        ));
        assert!(s.specs[0].is_active());
    }

    #[test]
    fn completing_current_spec_drops_pointer() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        complete_specs(&mut s, &[1]).unwrap();
        assert_eq!(s.current_spec_id, None);

        pick_spec(&mut s, 2).unwrap();
        assert_eq!(complete_all(&mut s).unwrap(), 1);
        assert_eq!(s.current_spec_id, None);
    }

    #[test]
    fn complete_all_with_nothing_active_errors() {
        let mut s = init(Mode::Greenfield, None);
        assert!(matches!(complete_all(&mut s), Err(TddError::NoActiveSpecs)));
    }

    #[test]
    fn advance_requires_matching_result() {
        let mut s = greenfield_with(&["a"]);
        pick_spec(&mut s, 1).unwrap();
        record_test_result(&mut s, TestResult::Pass);
        let before = s.clone();

        match advance(&mut s, None) {
            Err(TddError::Blocked(b)) => {
                assert_eq!(b, vec!["Test result 'pass' does not match expected 'fail'"])
            }
            other => panic!("expected blocked, got {other:?}"),
        }
        assert_eq!(s, before);

        let out = advance(&mut s, Some(TestResult::Fail)).unwrap();
        assert_eq!((out.from, out.to), (Phase::Red, Phase::Green));
        assert_eq!(s.last_test_result, None);
    }

    #[test]
    fn advance_rejects_error_result_first() {
        let mut s = init(Mode::Greenfield, None);
        record_test_result(&mut s, TestResult::Error);
        assert!(matches!(
            advance(&mut s, None),
            Err(TddError::TestInfrastructure)
        ));
        assert_eq!(s.last_test_result, Some(TestResult::Error));
    }

    #[test]
    fn advance_from_done_is_terminal() {
        let mut s = init(Mode::Greenfield, None);
        s.phase = Phase::Done;
        assert!(matches!(
            advance(&mut s, Some(TestResult::Pass)),
            Err(TddError::TerminalPhase)
        ));
    }

    #[test]
    fn greenfield_loop_over_two_specs() {
        let mut s = greenfield_with(&["parses ints", "parses floats"]);

        pick_spec(&mut s, 1).unwrap();
        advance(&mut s, Some(TestResult::Fail)).unwrap();
        advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(s.phase, Phase::Refactor);
        assert_eq!(s.reflections.len(), 7);

        assert!(matches!(
            advance(&mut s, Some(TestResult::Pass)),
            Err(TddError::Blocked(_))
        ));
        answer_all(&mut s);
        let out = advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(out.to, Phase::Red);
        assert_eq!(out.completed_spec, Some(1));
        assert_eq!(s.iteration, 1);
        assert!(s.reflections.is_empty());
        assert_eq!(s.current_spec_id, None);

        pick_spec(&mut s, 2).unwrap();
        advance(&mut s, Some(TestResult::Fail)).unwrap();
        let out = advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert!(out.reflections_loaded);
        answer_all(&mut s);
        let out = advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(out.to, Phase::Done);
        assert_eq!(out.completed_spec, Some(2));
        assert!(s.active_specs().is_empty());
        assert_eq!(get_blockers(&s), vec![blockers::PAST_DONE]);
    }

    #[test]
    fn retrofit_loop_skips_green() {
        let mut s = init(Mode::Retrofit, None);
        add_specs(&mut s, &["existing parser"]).unwrap();
        pick_spec(&mut s, 1).unwrap();

        assert!(matches!(
            advance(&mut s, Some(TestResult::Fail)),
            Err(TddError::Blocked(_))
        ));
        let out = advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(out.to, Phase::Refactor);
        answer_all(&mut s);
        let out = advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(out.to, Phase::Done);
    }

    #[test]
    fn phase_next_event_carries_completed_spec() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_all(&mut s);
        advance(&mut s, Some(TestResult::Pass)).unwrap();
        assert_eq!(
            s.history.last().unwrap().kind,
            EventKind::PhaseNext {
                from: Phase::Refactor,
                to: Phase::Red,
                result: Some(TestResult::Pass),
                spec_id: Some(1),
            }
        );
    }

    #[test]
    fn set_phase_reports_table_conformance() {
        let mut s = greenfield_with(&["a"]);
        let out = set_phase(&mut s, Phase::Green).unwrap();
        assert!(out.follows_table);
        let out = set_phase(&mut s, Phase::Done).unwrap();
        assert!(!out.follows_table);
        let out = set_phase(&mut s, Phase::Red).unwrap();
        assert!(!out.follows_table);
        assert_eq!(s.phase, Phase::Red);
    }

    #[test]
    fn set_phase_refuses_green_in_retrofit() {
        let mut s = init(Mode::Retrofit, None);
        assert!(matches!(
            set_phase(&mut s, Phase::Green),
            Err(TddError::PhaseNotInMode { .. })
        ));
        assert_eq!(s.phase, Phase::Red);
    }

    #[test]
    fn set_phase_into_refactor_keeps_answers() {
        let mut s = greenfield_with(&["a"]);
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_reflection(&mut s, 1, ANSWER).unwrap();
        set_phase(&mut s, Phase::Green).unwrap();
        let out = set_phase(&mut s, Phase::Refactor).unwrap();
        assert!(!out.reflections_loaded);
        assert_eq!(s.reflections[0].answer, ANSWER);
    }

    #[test]
    fn answer_reflection_only_in_refactor() {
        let mut s = greenfield_with(&["a"]);
        assert!(matches!(
            answer_reflection(&mut s, 1, ANSWER),
            Err(TddError::NotInRefactor(_))
        ));
        set_phase(&mut s, Phase::Refactor).unwrap();
        let events = s.history.len();
        assert!(answer_reflection(&mut s, 1, "too short").is_err());
        assert_eq!(s.history.len(), events);
        answer_reflection(&mut s, 1, ANSWER).unwrap();
        assert_eq!(
            s.history.last().unwrap().kind,
            EventKind::ReflectionAnswer { question: 1 }
        );
    }

    #[test]
    fn complete_cycle_error_order() {
        let mut s = init(Mode::Greenfield, None);
        s.phase = Phase::Done;
        assert!(matches!(
            complete_cycle(&mut s, Some(TestResult::Pass)),
            Err(TddError::NothingToComplete)
        ));

        let mut s = greenfield_with(&["a"]);
        assert!(matches!(
            complete_cycle(&mut s, None),
            Err(TddError::NoTestResult)
        ));
        assert!(matches!(
            complete_cycle(&mut s, Some(TestResult::Error)),
            Err(TddError::TestInfrastructure)
        ));
        assert!(matches!(
            complete_cycle(&mut s, Some(TestResult::Fail)),
            Err(TddError::TestsFailing)
        ));

        set_phase(&mut s, Phase::Refactor).unwrap();
        assert!(matches!(
            complete_cycle(&mut s, Some(TestResult::Pass)),
            Err(TddError::Blocked(_))
        ));
        assert_eq!(s.phase, Phase::Refactor);
    }

    #[test]
    fn complete_cycle_walks_to_done() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        record_test_result(&mut s, TestResult::Pass);

        let out = complete_cycle(&mut s, None).unwrap();
        assert_eq!(out.from, Phase::Red);
        assert_eq!(out.path, vec![Phase::Green, Phase::Refactor, Phase::Done]);
        assert_eq!(out.specs_completed, 2);
        assert_eq!(s.phase, Phase::Done);
        assert_eq!(s.current_spec_id, None);
        assert_eq!(s.last_test_result, None);
        assert_eq!(s.iteration, 1);
        assert_eq!(
            s.history.last().unwrap().kind,
            EventKind::Complete {
                result: TestResult::Pass,
                spec_count: 2
            }
        );
    }

    #[test]
    fn complete_cycle_from_done_with_leftover_specs() {
        let mut s = greenfield_with(&["a"]);
        s.phase = Phase::Done;
        let out = complete_cycle(&mut s, Some(TestResult::Pass)).unwrap();
        assert!(out.path.is_empty());
        assert_eq!(out.specs_completed, 1);
        assert_eq!(s.iteration, 0);
    }

    /// Drive a freshly picked spec from RED into REFACTOR through the loop.
    fn walk_into_refactor(s: &mut Session, spec: u32) -> Advance {
        pick_spec(s, spec).unwrap();
        advance(s, Some(TestResult::Fail)).unwrap();
        advance(s, Some(TestResult::Pass)).unwrap()
    }

    #[test]
    fn completing_from_refactor_gives_next_spec_fresh_questions() {
        let mut s = greenfield_with(&["a"]);
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_all(&mut s);
        complete_cycle(&mut s, Some(TestResult::Pass)).unwrap();
        assert!(s.reflections.is_empty());

        add_specs(&mut s, &["b"]).unwrap();
        set_phase(&mut s, Phase::Red).unwrap();
        let out = walk_into_refactor(&mut s, 2);
        assert_eq!(out.to, Phase::Refactor);
        assert!(out.reflections_loaded);
        assert_eq!(s.pending_reflections().len(), 7);
        assert!(matches!(
            advance(&mut s, Some(TestResult::Pass)),
            Err(TddError::Blocked(_))
        ));
    }

    #[test]
    fn phase_set_back_to_red_keeps_answers_for_the_same_spec() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_all(&mut s);
        set_phase(&mut s, Phase::Red).unwrap();

        let out = walk_into_refactor(&mut s, 1);
        assert!(!out.reflections_loaded);
        assert!(s.all_reflections_answered());
        assert_eq!(s.reflections[6].answer, ANSWER);
    }

    #[test]
    fn phase_set_back_to_red_then_new_spec_gets_fresh_questions() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_all(&mut s);
        set_phase(&mut s, Phase::Red).unwrap();

        let out = walk_into_refactor(&mut s, 2);
        assert!(out.reflections_loaded);
        assert_eq!(s.pending_reflections().len(), 7);
    }

    #[test]
    fn pick_in_refactor_keeps_answers() {
        let mut s = greenfield_with(&["a", "b"]);
        pick_spec(&mut s, 1).unwrap();
        set_phase(&mut s, Phase::Refactor).unwrap();
        answer_reflection(&mut s, 1, ANSWER).unwrap();
        pick_spec(&mut s, 2).unwrap();
        assert_eq!(s.reflections[0].answer, ANSWER);
    }

    #[test]
    fn add_specs_refuses_a_batch_past_the_id_space() {
        let mut s = init(Mode::Greenfield, None);
        s.next_id = u32::MAX - 1;
        assert!(matches!(
            add_specs(&mut s, &["a", "b"]),
            Err(TddError::SpecIdsExhausted)
        ));
        assert!(s.specs.is_empty());
        assert_eq!(add_specs(&mut s, &["a"]).unwrap(), vec![u32::MAX - 1]);
    }

    #[test]
    fn reseeding_after_done() {
        let mut s = greenfield_with(&["a"]);
        complete_cycle(&mut s, Some(TestResult::Pass)).unwrap();
        add_specs(&mut s, &["b"]).unwrap();
        let out = set_phase(&mut s, Phase::Red).unwrap();
        assert!(!out.follows_table);
        pick_spec(&mut s, 2).unwrap();
        assert_eq!(get_blockers(&s), vec![blockers::NO_TEST_RESULT]);
    }
}
