use thiserror::Error;

/// Errors raised while walking a symbol string with the turtle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurtleError {
    /// A `]` with no matching `[`. `index` is the offending symbol's position
    /// in the input, counted in chars.
    #[error("Popping from an empty turtle stack at symbol {index}.")]
    PoppedEmptyStack { index: usize },
}
