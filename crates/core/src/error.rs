use std::fmt;

/// Broad class of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The database cannot be reached at all (open/IO failure, locked, read-only, full).
    Unavailable,
    /// A write violated a schema constraint.
    Constraint,
    /// Any other query failure.
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Query, message)
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind == StoreErrorKind::Unavailable
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StoreErrorKind::Unavailable => write!(f, "storage unavailable: {}", self.message),
            StoreErrorKind::Constraint => write!(f, "constraint violated: {}", self.message),
            StoreErrorKind::Query => write!(f, "storage error: {}", self.message),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors surfaced by the evaluation services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Missing/empty required field, or a corrected name absent from the registry.
    Validation(String),
    /// Record absent or not owned by the caller. Deliberately one variant.
    NotFoundOrForbidden,
    /// Underlying persistence failure.
    Storage(StoreError),
}

impl EvalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::NotFoundOrForbidden => write!(f, "evaluation not found or not permitted"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for EvalError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}
