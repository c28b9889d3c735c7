use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TddError;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Red,
    Green,
    Refactor,
    Done,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[Phase::Red, Phase::Green, Phase::Refactor, Phase::Done]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Red => "red",
            Phase::Green => "green",
            Phase::Refactor => "refactor",
            Phase::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = TddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Phase::Red),
            "green" => Ok(Phase::Green),
            "refactor" => Ok(Phase::Refactor),
            "done" => Ok(Phase::Done),
            _ => Err(TddError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Workflow mode, fixed when the session is created.
///
/// `Greenfield` drives new code: RED expects failing tests. `Retrofit` adds
/// tests to code that already exists: RED expects passing tests and GREEN is
/// never entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Greenfield,
    Retrofit,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Greenfield => "greenfield",
            Mode::Retrofit => "retrofit",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greenfield" => Ok(Mode::Greenfield),
            "retrofit" => Ok(Mode::Retrofit),
            _ => Err(TddError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SpecStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecStatus {
    Active,
    Completed,
}

impl fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpecStatus::Active => "active",
            SpecStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// TestResult
// ---------------------------------------------------------------------------

/// Classification of one reported test run.
///
/// `Error` is an infrastructure or environment failure (missing binary,
/// broken dependencies), never a genuine test failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Pass,
    Fail,
    Error,
}

impl TestResult {
    pub fn as_str(self) -> &'static str {
        match self {
            TestResult::Pass => "pass",
            TestResult::Fail => "fail",
            TestResult::Error => "error",
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestResult {
    type Err = TddError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(TestResult::Pass),
            "fail" => Ok(TestResult::Fail),
            "error" => Ok(TestResult::Error),
            _ => Err(TddError::InvalidTestResult(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient deserializers for older documents
// ---------------------------------------------------------------------------

/// Treat a missing or empty string as `None`; anything else must parse.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Treat a missing or empty string as `T::default()`.
pub(crate) fn empty_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    Ok(empty_as_none(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_roundtrip() {
        for phase in Phase::all() {
            let parsed = Phase::from_str(phase.as_str()).unwrap();
            assert_eq!(*phase, parsed);
        }
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(matches!(
            Phase::from_str("blue"),
            Err(TddError::InvalidPhase(s)) if s == "blue"
        ));
        assert!(serde_json::from_str::<Phase>("\"blue\"").is_err());
    }

    #[test]
    fn mode_defaults_to_greenfield() {
        assert_eq!(Mode::default(), Mode::Greenfield);
        assert!(Mode::from_str("brownfield").is_err());
    }

    #[test]
    fn test_result_parse() {
        assert_eq!(TestResult::from_str("pass").unwrap(), TestResult::Pass);
        assert_eq!(TestResult::from_str("error").unwrap(), TestResult::Error);
        assert!(matches!(
            TestResult::from_str("PASS"),
            Err(TddError::InvalidTestResult(_))
        ));
    }

    #[test]
    fn spec_status_serializes_lowercase() {
        let json = serde_json::to_string(&SpecStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
