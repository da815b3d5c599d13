use thiserror::Error;

use crate::smarts::SmartsError;

/// Error returned when parsing a reaction SMARTS string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionSmartsError {
    #[error("no '>>' separator found in reaction SMARTS")]
    MissingSeparator,
    #[error("too many '>' separators in reaction SMARTS")]
    TooManySeparators,
    #[error("reaction has no reactant templates")]
    EmptyReactants,
    #[error("reaction has no product templates")]
    EmptyProducts,
    #[error("unbalanced component group in {section}")]
    UnbalancedGroup { section: &'static str },
    #[error("atom map number {map_num} appears more than once in the reactant templates")]
    DuplicateAtomMap { map_num: u16 },
    #[error("invalid {section} component: {detail}")]
    InvalidComponent {
        section: &'static str,
        #[source]
        detail: SmartsError,
    },
}

/// Error returned when applying a reaction to reactant molecules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    #[error("expected {expected} reactants, got {got}")]
    WrongReactantCount { expected: usize, got: usize },
    #[error("match combination count exceeds {limit}")]
    TooManyCombinations { limit: usize },
}
