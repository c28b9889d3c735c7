//! Read-only snapshot of a session for the agent driving it.

use crate::blockers::get_blockers;
use crate::event::Event;
use crate::machine;
use crate::reflection::ReflectionQuestion;
use crate::session::Session;
use crate::spec::Spec;
use crate::types::{Mode, Phase, TestResult};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Guidance {
    pub phase: Phase,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_test_result: Option<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cmd: Option<String>,
    pub blockers: Vec<String>,
    pub specs: Vec<Spec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_spec: Option<Spec>,
    pub iteration: u32,
    pub total_specs: usize,
    pub instructions: Vec<String>,
    pub rules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reflections: Vec<ReflectionQuestion>,
}

impl Guidance {
    pub fn can_advance(&self) -> bool {
        self.blockers.is_empty()
    }
}

pub fn generate(session: &Session) -> Guidance {
    let mode = session.mode;
    let has_remaining = !session.remaining_specs().is_empty();

    let (instructions, rules) = match (session.phase, mode) {
        (Phase::Red, Mode::Greenfield) => (red_instructions(session), red_rules()),
        (Phase::Red, Mode::Retrofit) => (retrofit_red_instructions(session), retrofit_red_rules()),
        (Phase::Green, Mode::Greenfield) => (green_instructions(session), green_rules()),
        (Phase::Green, Mode::Retrofit) => (retrofit_green_instructions(), retrofit_green_rules()),
        (Phase::Refactor, _) => (refactor_instructions(session), refactor_rules()),
        (Phase::Done, _) => (done_instructions(), Vec::new()),
    };

    Guidance {
        phase: session.phase,
        mode,
        next_phase: machine::next_in_loop(session.phase, mode, has_remaining).ok(),
        expected_test_result: machine::expected_result(session.phase, mode),
        test_cmd: session.test_cmd.clone(),
        blockers: get_blockers(session),
        specs: session.active_specs().into_iter().cloned().collect(),
        current_spec: session.current_spec().cloned(),
        iteration: session.iteration,
        total_specs: session.specs.len(),
        instructions: to_strings(instructions),
        rules: to_strings(rules),
        reflections: if session.phase == Phase::Refactor {
            session.reflections.clone()
        } else {
            Vec::new()
        },
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// Compact state for an agent re-orienting after losing its context.
#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    pub phase: Phase,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cmd: Option<String>,
    pub iteration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_spec: Option<Spec>,
    pub remaining_specs: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    pub next_action: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_events: Vec<Event>,
}

pub const RECENT_EVENTS: usize = 5;

pub fn checkpoint(session: &Session) -> Checkpoint {
    Checkpoint {
        phase: session.phase,
        mode: session.mode,
        test_cmd: session.test_cmd.clone(),
        iteration: session.iteration,
        current_spec: session.current_spec().cloned(),
        remaining_specs: session.remaining_specs().len(),
        blockers: get_blockers(session),
        next_action: next_action(session),
        recent_events: session.recent_history(RECENT_EVENTS).to_vec(),
    }
}

/// The single command most likely to move the session forward.
pub fn next_action(session: &Session) -> String {
    if session.specs.is_empty() {
        return r#"tdd-ai spec add "desc1" "desc2" ..."#.to_string();
    }
    let record_and_advance = match machine::expected_result(session.phase, session.mode) {
        Some(expected) => format!("tdd-ai record {expected} && tdd-ai phase next"),
        None => "tdd-ai guide".to_string(),
    };
    match session.phase {
        Phase::Done => {
            if session.active_specs().is_empty() {
                r#"All specs complete. Add more specs: tdd-ai spec add "desc1" ..."#.to_string()
            } else {
                "tdd-ai spec done --all".to_string()
            }
        }
        Phase::Red if session.current_spec_id.is_none() => match session.active_specs().first() {
            Some(spec) => format!("tdd-ai spec pick {}", spec.id),
            None => r#"tdd-ai spec add "desc1" ..."#.to_string(),
        },
        Phase::Refactor => match session.pending_reflections().first() {
            Some(q) => format!(r#"tdd-ai refactor reflect {} --answer "your answer here""#, q.id),
            None => record_and_advance,
        },
        _ => record_and_advance,
    }
}

fn to_strings<S: Into<String>>(items: Vec<S>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

const ADD_SPECS: [&str; 2] = [
    r#"No active specs. Add the behaviors to build: tdd-ai spec add "desc1" "desc2" ..."#,
    "Then pick one with 'tdd-ai spec pick <id>' and run 'tdd-ai guide' again.",
];

const PICK_SPEC: [&str; 3] = [
    "Pick a spec to work on: tdd-ai spec pick <id>",
    "Run 'tdd-ai spec list' to see available specs.",
    "After picking a spec, run 'tdd-ai guide' again for specific instructions.",
];

const ADVANCE: &str =
    "Record the test outcome and advance: tdd-ai record <pass|fail> && tdd-ai phase next";

/// Instructions for RED before a spec is selected.
fn select_spec(session: &Session) -> Vec<String> {
    if session.active_specs().is_empty() {
        to_strings(ADD_SPECS.to_vec())
    } else {
        to_strings(PICK_SPEC.to_vec())
    }
}

fn red_instructions(session: &Session) -> Vec<String> {
    let Some(spec) = session.current_spec() else {
        return select_spec(session);
    };
    vec![
        format!("Write a failing test for spec [{}]: {}", spec.id, spec.description),
        "Cover happy path, edge cases, and error conditions for this spec.".into(),
        "Run the project's test command to verify the new test FAILS.".into(),
        "Do NOT write any implementation code yet.".into(),
        format!("When the test is confirmed failing: {ADVANCE}"),
    ]
}

fn red_rules() -> Vec<&'static str> {
    vec![
        "DO NOT create implementation files.",
        "DO NOT write skeleton or stub implementations.",
        "Tests must assert specific expected values, not just 'does not throw'.",
    ]
}

fn retrofit_red_instructions(session: &Session) -> Vec<String> {
    let Some(spec) = session.current_spec() else {
        return select_spec(session);
    };
    vec![
        format!("Write a NEW test for spec [{}]: {}", spec.id, spec.description),
        "Do NOT rely on pre-existing tests to cover this spec; write explicit new tests even if similar coverage exists.".into(),
        "Run the project's test command to verify the new test PASSES against the existing implementation.".into(),
        "If tests fail, determine whether the test is wrong or the implementation has a bug.".into(),
        format!("When the test is confirmed passing: {ADVANCE}"),
        "Note: the next phase is REFACTOR (GREEN is skipped since the implementation exists).".into(),
    ]
}

fn retrofit_red_rules() -> Vec<&'static str> {
    vec![
        "DO NOT modify the existing implementation.",
        "Tests must assert specific expected values, not just 'does not throw'.",
        "Tests should document existing behavior, not desired behavior.",
    ]
}

fn green_instructions(session: &Session) -> Vec<String> {
    let first = match session.current_spec() {
        Some(spec) => format!(
            "Write the MINIMAL code to make the test for spec [{}] pass: {}",
            spec.id, spec.description
        ),
        None => "Write the MINIMAL code to make all failing tests pass.".to_string(),
    };
    vec![
        first,
        "Run tests after each change.".into(),
        "Do NOT modify any test files.".into(),
        "Do NOT add functionality beyond what the tests require.".into(),
        format!("When all tests pass: {ADVANCE}"),
    ]
}

fn green_rules() -> Vec<&'static str> {
    vec![
        "DO NOT modify test files.",
        "DO NOT add features not covered by existing tests.",
        "Prefer the simplest implementation that passes.",
    ]
}

fn retrofit_green_instructions() -> Vec<String> {
    to_strings(vec![
        "Implementation already exists; this phase is normally skipped in retrofit mode.",
        "Only make changes if tests revealed bugs in the existing implementation.",
        "Return to the retrofit cycle with: tdd-ai phase set refactor",
    ])
}

fn retrofit_green_rules() -> Vec<&'static str> {
    vec![
        "DO NOT modify test files.",
        "Only fix bugs discovered during the red phase.",
        "Prefer minimal changes to the existing implementation.",
    ]
}

fn refactor_instructions(session: &Session) -> Vec<String> {
    let mut out: Vec<String> = to_strings(vec![
        "Improve code quality: naming, structure, duplication, performance.",
        "Run tests after EVERY change to ensure they still pass.",
        "Do NOT add new functionality.",
        "Do NOT modify test assertions.",
    ]);

    let remaining = session.remaining_specs().len();
    if remaining > 0 {
        out.push(format!(
            "{remaining} spec(s) remaining after this one. Discovered new scenarios? Add them: tdd-ai spec add \"new scenario\""
        ));
    }

    let total = session.reflections.len();
    if total > 0 {
        let pending = session.pending_reflections().len();
        if pending > 0 {
            out.push(format!(
                "REQUIRED: Answer all {total} reflection questions before advancing. {pending} remaining."
            ));
            out.push("View questions: tdd-ai refactor status".into());
            out.push(
                "Answer a question: tdd-ai refactor reflect <number> --answer \"your response\""
                    .into(),
            );
        } else {
            out.push("All reflection questions answered. Ready to advance.".into());
        }
    }

    if remaining > 0 {
        out.push(format!(
            "When satisfied with code quality: {ADVANCE} (loops back to RED for the next spec)"
        ));
    } else {
        out.push(format!("When satisfied with code quality: {ADVANCE}"));
    }
    out.push("Or finish the entire cycle in one step: tdd-ai complete".into());
    out
}

fn refactor_rules() -> Vec<&'static str> {
    vec![
        "Tests must pass after every refactor step.",
        "DO NOT change test expectations.",
        "DO NOT add new features during refactor.",
    ]
}

fn done_instructions() -> Vec<String> {
    to_strings(vec![
        "TDD cycle is complete.",
        "Mark completed specs with: tdd-ai spec done <id> or tdd-ai spec done --all",
        "Or finish all at once: tdd-ai complete",
        "To start a new cycle, add more specs and run: tdd-ai phase set red",
    ])
}
