//! FILENAME: parser/src/error.rs
//! PURPOSE: Parser-level error type.
//! CONTEXT: Every variant here collapses to the single `InvalidFormula`
//! outcome at the engine's coordinator boundary, which only tracks a
//! coarse status per cell; keeping them distinct here gives better log
//! messages and test assertions.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("empty formula")]
    Empty,
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    #[error("expected ':' in range argument")]
    MissingColon,
    #[error("expected a cell reference")]
    ExpectedCellRef,
    #[error("trailing input after expression")]
    TrailingInput,
}

pub type ParseResult<T> = Result<T, ParseError>;
