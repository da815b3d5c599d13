use thiserror::Error;

/// Errors produced when reading a SMARTS pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmartsError {
    #[error("empty SMARTS string")]
    EmptyInput,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("unclosed bracket starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid atomic number at position {pos}")]
    InvalidAtomicNum { pos: usize },
    #[error("unclosed recursive SMARTS at position {pos}")]
    UnclosedRecursive { pos: usize },
    #[error("invalid SMARTS at position {pos}: {msg}")]
    InvalidSmarts { pos: usize, msg: String },
}
