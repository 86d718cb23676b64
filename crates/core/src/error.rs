use thiserror::Error;
use types::{EntryId, Scope};

/// Malformed or referentially invalid input; every issue found is collected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid input: {}", .issues.join("; "))]
pub struct InputError {
    pub issues: Vec<String>,
}

impl InputError {
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }

    pub(crate) fn from_issues(issues: Vec<String>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("timetable entry {0} not found")]
    EntryNotFound(EntryId),
    /// A commit lost a race against another change to the same scope.
    #[error("concurrent modification in scope {scope}: {detail}")]
    ConcurrentModification { scope: Scope, detail: String },
    #[error("a generation run for scope {0} is already in progress")]
    ScopeBusy(Scope),
    /// The storage collaborator failed; safe to retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Input(_) => "input_error",
            EngineError::EntryNotFound(_) => "input_error",
            EngineError::ConcurrentModification { .. } => "concurrent_modification",
            EngineError::ScopeBusy(_) => "concurrent_modification",
            EngineError::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, EngineError::Input(_) | EngineError::EntryNotFound(_))
    }
}
