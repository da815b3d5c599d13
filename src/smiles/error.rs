use thiserror::Error;

use crate::kekulize::KekulizeError;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    EmptyInput,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    #[error("ring bond {digit} at position {pos} has no preceding atom")]
    InvalidRingBond { digit: u16, pos: usize },
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
    #[error("ring closure {digit} joins an atom to itself or duplicates a bond")]
    DuplicateBond { digit: u16 },
    #[error("bond at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
}
