use thiserror::Error;

#[derive(Debug, Error)]
pub enum TddError {
    #[error("no TDD session found: run 'tdd-ai init' first")]
    NotInitialized,

    #[error("TDD session already exists: use 'tdd-ai reset' to start over")]
    AlreadyInitialized,

    #[error("spec {0} not found")]
    SpecNotFound(u32),

    #[error("spec id space exhausted: no ids left to assign")]
    SpecIdsExhausted,

    #[error("spec {0} is already completed")]
    SpecAlreadyCompleted(u32),

    #[error("spec {0} is not active")]
    SpecNotActive(u32),

    #[error("no current spec selected")]
    NoCurrentSpec,

    #[error("no active specs to mark as done")]
    NoActiveSpecs,

    #[error("at least one spec description is required")]
    EmptySpecList,

    #[error("nothing to complete: already in done phase with no active specs")]
    NothingToComplete,

    #[error("reflection question {0} not found")]
    ReflectionNotFound(u32),

    #[error("answer must be at least {min} words, got {got}")]
    AnswerTooShort { min: usize, got: usize },

    #[error("not in refactor phase (current: {0})")]
    NotInRefactor(String),

    #[error("TDD cycle is complete; start a new session or add more specs")]
    TerminalPhase,

    #[error("unknown phase '{phase}' for {mode} mode")]
    PhaseNotInMode { phase: String, mode: String },

    #[error("invalid phase '{0}': expected red, green, refactor or done")]
    InvalidPhase(String),

    #[error("invalid mode '{0}': expected greenfield or retrofit")]
    InvalidMode(String),

    #[error("invalid test result '{0}': expected pass, fail or error")]
    InvalidTestResult(String),

    #[error("cannot advance: {}", .0.join("; "))]
    Blocked(Vec<String>),

    #[error(
        "last test run was an infrastructure/environment error (not a test failure); \
         fix the environment and record a new result"
    )]
    TestInfrastructure,

    #[error("tests are failing; fix them before completing the cycle")]
    TestsFailing,

    #[error("no test result available: record one with 'tdd-ai record' or pass --test-result")]
    NoTestResult,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TddError>;
