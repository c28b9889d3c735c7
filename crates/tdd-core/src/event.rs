use crate::types::{Mode, Phase, TestResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the append-only session history.
///
/// Persisted flat: the variant name becomes the `action` field and the
/// variant's fields sit next to it, alongside the `at` timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub kind: EventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EventKind {
    Init {
        #[serde(rename = "result")]
        mode: Mode,
    },
    SpecAdd {
        #[serde(default)]
        spec_count: usize,
    },
    SpecPick {
        spec_id: u32,
    },
    SpecDone {
        #[serde(default)]
        spec_count: usize,
    },
    PhaseNext {
        from: Phase,
        to: Phase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<TestResult>,
        /// Spec completed by the per-spec loop when leaving refactor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spec_id: Option<u32>,
    },
    PhaseSet {
        from: Phase,
        to: Phase,
    },
    TestRun {
        result: TestResult,
    },
    ReflectionAnswer {
        #[serde(rename = "result", with = "question_ref")]
        question: u32,
    },
    Complete {
        result: TestResult,
        #[serde(default)]
        spec_count: usize,
    },
}

impl Event {
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            at: Utc::now(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self.kind {
            EventKind::Init { .. } => "init",
            EventKind::SpecAdd { .. } => "spec_add",
            EventKind::SpecPick { .. } => "spec_pick",
            EventKind::SpecDone { .. } => "spec_done",
            EventKind::PhaseNext { .. } => "phase_next",
            EventKind::PhaseSet { .. } => "phase_set",
            EventKind::TestRun { .. } => "test_run",
            EventKind::ReflectionAnswer { .. } => "reflection_answer",
            EventKind::Complete { .. } => "complete",
        }
    }

    /// One-line rendering: `phase_next (red -> green) [fail]`.
    pub fn summary(&self) -> String {
        let mut line = self.action().to_string();
        match &self.kind {
            EventKind::Init { mode } => line.push_str(&format!(" [{mode}]")),
            EventKind::SpecAdd { spec_count } | EventKind::SpecDone { spec_count } => {
                line.push_str(&format!(" ({spec_count} specs)"));
            }
            EventKind::SpecPick { spec_id } => line.push_str(&format!(" (spec {spec_id})")),
            EventKind::PhaseNext {
                from,
                to,
                result,
                spec_id,
            } => {
                line.push_str(&format!(" ({from} -> {to})"));
                if let Some(r) = result {
                    line.push_str(&format!(" [{r}]"));
                }
                if let Some(id) = spec_id {
                    line.push_str(&format!(" (completed spec {id})"));
                }
            }
            EventKind::PhaseSet { from, to } => line.push_str(&format!(" ({from} -> {to})")),
            EventKind::TestRun { result } => line.push_str(&format!(" [{result}]")),
            EventKind::ReflectionAnswer { question } => line.push_str(&format!(" [q{question}]")),
            EventKind::Complete { result, spec_count } => {
                line.push_str(&format!(" [{result}] ({spec_count} specs)"));
            }
        }
        line
    }
}

/// Reflection question ids are stored as `"q<N>"` in the `result` field.
mod question_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("q{id}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.strip_prefix('q')
            .unwrap_or(&raw)
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid question reference '{raw}'")))
    }
}
