use crate::error::{Result, TddError};
use crate::types::SpecStatus;
use serde::{Deserialize, Serialize};

/// A single requirement driven through the red-green-refactor cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub id: u32,
    pub description: String,
    pub status: SpecStatus,
}

impl Spec {
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            status: SpecStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SpecStatus::Active
    }
}

// ---------------------------------------------------------------------------
// Spec list operations (operate on a slice owned by the session)
// ---------------------------------------------------------------------------

pub(crate) fn find(specs: &[Spec], id: u32) -> Result<&Spec> {
    specs
        .iter()
        .find(|s| s.id == id)
        .ok_or(TddError::SpecNotFound(id))
}

pub(crate) fn find_mut(specs: &mut [Spec], id: u32) -> Result<&mut Spec> {
    specs
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(TddError::SpecNotFound(id))
}

/// Specs sorted by id, for display.
pub fn sorted_by_id<'a>(specs: impl IntoIterator<Item = &'a Spec>) -> Vec<&'a Spec> {
    let mut sorted: Vec<&Spec> = specs.into_iter().collect();
    sorted.sort_by_key(|s| s.id);
    sorted
}

/// Human-readable summary: "3 total, 2 active, 1 done"
pub fn summarize(specs: &[Spec]) -> String {
    let total = specs.len();
    let active = specs.iter().filter(|s| s.is_active()).count();
    format!("{total} total, {active} active, {} done", total - active)
}
