use serde::Serialize;

use crate::config::ValidatorConfig;
use crate::engine::ChemistryEngine;
use crate::entry::Entry;
use crate::error::ValidationError;
use crate::sanitize::{sanitize_reaction_smarts, sanitize_smiles, split_smiles};
use crate::validator::{RecordReport, ReactionValidator};

/// Outcome of validating every reaction of one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryVerdict {
    pub accession: Option<String>,
    pub reactions: Vec<RecordReport>,
    /// Entry-level problem, such as having no reactions at all.
    pub error: Option<ValidationError>,
}

impl EntryVerdict {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.reactions.iter().all(RecordReport::passed)
    }

    /// Numbers of (passing, failing) examples across all reactions.
    pub fn example_counts(&self) -> (usize, usize) {
        self.reactions
            .iter()
            .flat_map(|r| &r.examples)
            .fold((0, 0), |(pass, fail), e| {
                if e.verdict.is_pass() {
                    (pass + 1, fail)
                } else {
                    (pass, fail + 1)
                }
            })
    }
}

pub struct ValidationManager<'e, E> {
    validator: ReactionValidator<'e, E>,
}

impl<'e, E: ChemistryEngine> ValidationManager<'e, E> {
    pub fn new(engine: &'e E, config: ValidatorConfig) -> Self {
        Self {
            validator: ReactionValidator::new(engine, config),
        }
    }

    /// Validates every reaction of the entry. A failing reaction never
    /// hides the ones after it.
    pub fn validate_entry(&self, entry: &Entry) -> EntryVerdict {
        let mut verdict = EntryVerdict {
            accession: entry.accession.clone(),
            reactions: Vec::new(),
            error: None,
        };
        if entry.reactions.is_empty() {
            verdict.error = Some(ValidationError::InvariantViolation(
                "entry has no reactions".to_string(),
            ));
            log::warn!("{}: no reactions to validate", entry.label());
            return verdict;
        }

        verdict.reactions = entry
            .reactions
            .iter()
            .map(|reaction| self.validator.validate(&reaction.record()))
            .collect();

        let (pass, fail) = verdict.example_counts();
        if verdict.passed() {
            log::info!("{}: {pass} example(s) passed", entry.label());
        } else {
            log::warn!("{}: {fail} of {} example(s) failed", entry.label(), pass + fail);
        }
        verdict
    }
}

/// Copy of the entry with every SMILES and reaction SMARTS normalized.
/// Forbidden products written as one dot-joined string become separate
/// list items.
pub fn sanitized_entry(entry: &Entry) -> Entry {
    let mut out = entry.clone();
    for reaction in &mut out.reactions {
        let smarts = sanitize_reaction_smarts(reaction.reaction_smarts.as_str());
        reaction.reaction_smarts = reaction.reaction_smarts.with_smarts(smarts);
        for example in &mut reaction.examples {
            example.substrate = sanitize_smiles(&example.substrate);
            for product in &mut example.products {
                *product = sanitize_smiles(product);
            }
            if let Some(forbidden) = &mut example.forbidden_products {
                *forbidden = forbidden
                    .iter()
                    .flat_map(|p| split_smiles(&sanitize_smiles(p)))
                    .collect();
            }
        }
    }
    out
}
