use crate::error::{Result, TddError};
use crate::event::{Event, EventKind};
use crate::reflection::{self, ReflectionQuestion};
use crate::spec::{self, Spec};
use crate::types::{empty_as_default, empty_as_none, Mode, Phase, SpecStatus, TestResult};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The whole persisted state of one TDD session (one document per directory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub phase: Phase,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub mode: Mode,
    /// Opaque to the state machine; shown to the agent in guidance.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub test_cmd: Option<String>,
    /// One-shot signal, cleared by the advancement decision that consumes it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub last_test_result: Option<TestResult>,
    #[serde(default)]
    pub specs: Vec<Spec>,
    #[serde(default = "default_next_id")]
    pub next_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_spec_id: Option<u32>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reflections: Vec<ReflectionQuestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Event>,
}

fn default_next_id() -> u32 {
    1
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            phase: Phase::Red,
            mode,
            test_cmd: None,
            last_test_result: None,
            specs: Vec::new(),
            next_id: default_next_id(),
            current_spec_id: None,
            iteration: 0,
            reflections: Vec::new(),
            history: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------------

    /// Parse a session document, repairing fields older documents may lack.
    pub fn from_json(data: &str) -> Result<Self> {
        let mut session: Session = serde_json::from_str(data)?;
        session.normalize();
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn normalize(&mut self) {
        let max_id = self.specs.iter().map(|s| s.id).max().unwrap_or(0);
        // Saturates at u32::MAX, which add_spec then refuses to hand out.
        self.next_id = self.next_id.max(max_id.saturating_add(1));
        self.clear_stale_current();
    }

    /// Drop a current-spec pointer that no longer references an active spec.
    pub(crate) fn clear_stale_current(&mut self) {
        if self.current_spec_id.is_some() && self.current_spec().is_none() {
            self.current_spec_id = None;
        }
    }

    // ---------------------------------------------------------------------------
    // Spec queries
    // ---------------------------------------------------------------------------

    pub fn active_specs(&self) -> Vec<&Spec> {
        self.specs.iter().filter(|s| s.is_active()).collect()
    }

    /// The selected spec, if the pointer resolves to an active spec.
    pub fn current_spec(&self) -> Option<&Spec> {
        let id = self.current_spec_id?;
        self.specs.iter().find(|s| s.id == id && s.is_active())
    }

    /// Active specs excluding the current one.
    pub fn remaining_specs(&self) -> Vec<&Spec> {
        self.specs
            .iter()
            .filter(|s| s.is_active() && Some(s.id) != self.current_spec_id)
            .collect()
    }

    // ---------------------------------------------------------------------------
    // Spec mutations
    // ---------------------------------------------------------------------------

    /// Append an active spec under the next free id.
    ///
    /// `next_id` stays strictly above every assigned id, so the id space runs
    /// out one short of `u32::MAX`.
    pub fn add_spec(&mut self, description: impl Into<String>) -> Result<u32> {
        let id = self.next_id;
        let next = id.checked_add(1).ok_or(TddError::SpecIdsExhausted)?;
        self.specs.push(Spec::new(id, description));
        self.next_id = next;
        Ok(id)
    }

    /// Mark one spec completed. Completing twice is an error.
    ///
    /// The current-spec pointer is left alone; callers completing the current
    /// spec clear it themselves (see [`Session::complete_current_spec`]).
    pub fn complete_spec(&mut self, id: u32) -> Result<()> {
        let spec = spec::find_mut(&mut self.specs, id)?;
        if spec.status == SpecStatus::Completed {
            return Err(TddError::SpecAlreadyCompleted(id));
        }
        spec.status = SpecStatus::Completed;
        Ok(())
    }

    /// Complete every active spec and return how many were flipped.
    pub fn complete_all_specs(&mut self) -> usize {
        let mut count = 0;
        for spec in self.specs.iter_mut().filter(|s| s.is_active()) {
            spec.status = SpecStatus::Completed;
            count += 1;
        }
        count
    }

    pub fn set_current_spec(&mut self, id: u32) -> Result<()> {
        let spec = spec::find(&self.specs, id)?;
        if !spec.is_active() {
            return Err(TddError::SpecNotActive(id));
        }
        self.current_spec_id = Some(id);
        Ok(())
    }

    /// Complete the current spec and clear the pointer. Returns its id.
    pub fn complete_current_spec(&mut self) -> Result<u32> {
        let id = self.current_spec_id.ok_or(TddError::NoCurrentSpec)?;
        self.complete_spec(id)?;
        self.current_spec_id = None;
        Ok(id)
    }

    // ---------------------------------------------------------------------------
    // Reflections
    // ---------------------------------------------------------------------------

    /// Load the seven reflection questions unless some are already present.
    /// Returns true if questions were loaded.
    pub fn load_reflections(&mut self) -> bool {
        if !self.reflections.is_empty() {
            return false;
        }
        self.reflections = reflection::default_questions();
        true
    }

    pub fn pending_reflections(&self) -> Vec<&ReflectionQuestion> {
        self.reflections.iter().filter(|r| !r.is_answered()).collect()
    }

    /// True when every question has an answer, or when none are loaded.
    pub fn all_reflections_answered(&self) -> bool {
        self.reflections.iter().all(ReflectionQuestion::is_answered)
    }

    pub fn answer_reflection(&mut self, id: u32, answer: &str) -> Result<()> {
        let idx = self
            .reflections
            .iter()
            .position(|r| r.id == id)
            .ok_or(TddError::ReflectionNotFound(id))?;
        reflection::validate_answer(answer)?;
        self.reflections[idx].answer = answer.to_string();
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------------

    pub fn record(&mut self, kind: EventKind) {
        self.history.push(Event::now(kind));
    }

    pub fn recent_history(&self, n: usize) -> &[Event] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
