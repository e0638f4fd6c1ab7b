//! Error types for dice parsing.

/// Errors that can occur while parsing dice notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// The input contained no dice terms at all.
    #[error("empty dice expression")]
    Empty,

    /// The input could not be parsed as dice notation.
    #[error("cannot parse dice expression \"{input}\": {reason}")]
    Unparseable {
        /// The original input text.
        input: String,
        /// What went wrong.
        reason: String,
    },
}

/// Convenience result type for dice operations.
pub type DiceResult<T> = Result<T, DiceError>;
