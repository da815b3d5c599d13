use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::molecule::CanonicalForm;
use crate::sanitize::UndesiredPattern;

/// Which input string a parse failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRole {
    Substrate,
    Product,
    ForbiddenProduct,
    ReactionSmarts,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputRole::Substrate => "substrate",
            InputRole::Product => "product",
            InputRole::ForbiddenProduct => "forbidden product",
            InputRole::ReactionSmarts => "reaction SMARTS",
        })
    }
}

/// Why an example could not be judged on its chemistry.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("could not parse {role} '{input}': {message}")]
    Parse {
        role: InputRole,
        input: String,
        message: String,
    },
    #[error("pattern needs {expected} reactant molecule(s) but the substrate has {got} fragment(s)")]
    TopologyMismatch { expected: usize, got: usize },
    #[error("{0}")]
    InvariantViolation(String),
    #[error("forbidden product(s) also listed as expected: {}", .overlap.join(", "))]
    Configuration { overlap: Vec<String> },
    #[error(transparent)]
    UndesiredPattern(#[from] UndesiredPattern),
    #[error("reaction could not be applied: {0}")]
    Engine(String),
}

/// The pattern ran, but its products disagree with the example.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChemistryMismatch {
    #[error(
        "reaction did not produce the expected products\n  expected: {}\n  produced: {}",
        join(.expected),
        outcomes(.produced)
    )]
    ExpectedNotProduced {
        expected: Vec<CanonicalForm>,
        produced: Vec<Vec<CanonicalForm>>,
    },
    #[error("reaction produced forbidden product(s): {}", join(.forbidden))]
    ForbiddenProduced { forbidden: Vec<CanonicalForm> },
}

fn join(forms: &[CanonicalForm]) -> String {
    forms
        .iter()
        .map(CanonicalForm::as_str)
        .collect::<Vec<_>>()
        .join(" + ")
}

fn outcomes(produced: &[Vec<CanonicalForm>]) -> String {
    if produced.is_empty() {
        return "nothing (pattern did not match)".to_string();
    }
    produced
        .iter()
        .map(|o| format!("[{}]", join(o)))
        .collect::<Vec<_>>()
        .join(", ")
}
