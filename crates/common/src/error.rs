/// Precondition violations surfaced by the engine.
///
/// Every variant aborts the current `reset`/`step` call. The caller keeps its
/// previous state; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("action index {index} is outside the action table (length {len})")]
    InvalidAction { index: usize, len: usize },
    #[error("requested {requested} free cells but only {available} are available")]
    InsufficientFreeCells { requested: usize, available: usize },
    #[error("grid {height}x{width} is too small: both dimensions must be at least {minimum}")]
    InvalidGridDimensions {
        height: usize,
        width: usize,
        minimum: usize,
    },
    #[error("{what} holds {actual} entries where its shape requires {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Convenience alias for results using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;
