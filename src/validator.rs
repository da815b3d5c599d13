//! Checks a reaction pattern against its worked examples.
//!
//! For every example the substrate is run through every variant of the
//! pattern, every candidate outcome is reduced to a set of canonical
//! forms, and the example passes when one outcome reproduces the expected
//! products and no forbidden product is reachable. Failures are returned
//! as data; one bad example never stops the others from being checked.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{ForbiddenPolicy, ValidatorConfig};
use crate::engine::ChemistryEngine;
use crate::error::{ChemistryMismatch, InputRole, ValidationError};
use crate::molecule::CanonicalForm;
use crate::sanitize::{
    check_undesired_patterns, expand_alternatives, sanitize_reaction_smarts, sanitize_smiles,
    split_smiles,
};
use crate::topology::ReactionTopology;

type Outcome = BTreeSet<CanonicalForm>;

/// One reaction pattern with the examples it must explain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionRecord {
    pub smarts: String,
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Example {
    pub substrate: String,
    pub products: Vec<String>,
    pub forbidden_products: Vec<String>,
    /// Intermediates only need the expected products to be among an
    /// outcome's products, not to be all of them.
    pub is_intermediate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail(ChemistryMismatch),
    Error(ValidationError),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Human-readable explanation; `None` for a pass.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(m) => Some(m.to_string()),
            Verdict::Error(e) => Some(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleReport {
    pub index: usize,
    pub substrate: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    /// The pattern after sanitizing.
    pub smarts: String,
    pub topology: Option<ReactionTopology>,
    pub examples: Vec<ExampleReport>,
    /// Set when the record as a whole is unusable.
    pub error: Option<ValidationError>,
}

impl RecordReport {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.examples.iter().all(|e| e.verdict.is_pass())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExampleReport> {
        self.examples.iter().filter(|e| !e.verdict.is_pass())
    }
}

pub struct ReactionValidator<'e, E> {
    engine: &'e E,
    config: ValidatorConfig,
}

impl<'e, E: ChemistryEngine> ReactionValidator<'e, E> {
    pub fn new(engine: &'e E, config: ValidatorConfig) -> Self {
        Self { engine, config }
    }

    pub fn validate(&self, record: &ReactionRecord) -> RecordReport {
        let smarts = sanitize_reaction_smarts(&record.smarts);
        let mut report = RecordReport {
            smarts,
            topology: None,
            examples: Vec::new(),
            error: None,
        };
        if record.examples.is_empty() {
            report.error = Some(ValidationError::InvariantViolation(
                "reaction has no examples to validate against".to_string(),
            ));
            return report;
        }

        let patterns = match self.prepare(&record.smarts, &report.smarts) {
            Ok(patterns) => patterns,
            Err(e) => {
                log::debug!("pattern {:?} unusable: {e}", record.smarts);
                report.examples = record
                    .examples
                    .iter()
                    .enumerate()
                    .map(|(index, ex)| ExampleReport {
                        index,
                        substrate: ex.substrate.clone(),
                        verdict: Verdict::Error(e.clone()),
                    })
                    .collect();
                return report;
            }
        };
        let topology = self.engine.topology(&patterns[0]);
        report.topology = Some(topology);

        report.examples = record
            .examples
            .iter()
            .enumerate()
            .map(|(index, ex)| {
                let verdict = self.validate_example(&patterns, topology, ex);
                log::debug!("example {index} ({}): {verdict:?}", ex.substrate);
                ExampleReport {
                    index,
                    substrate: ex.substrate.clone(),
                    verdict,
                }
            })
            .collect();
        report
    }

    /// Parses every variant of a sanitized pattern. Variants the engine
    /// rejects are skipped; the pattern is an error only if none parse.
    fn prepare(&self, raw: &str, sanitized: &str) -> Result<Vec<E::Pattern>, ValidationError> {
        if self.config.check_undesired_patterns {
            check_undesired_patterns(raw)?;
        }
        let variants = if self.config.expand_alternatives {
            expand_alternatives(sanitized)
        } else {
            vec![sanitized.to_string()]
        };

        let mut patterns = Vec::with_capacity(variants.len());
        let mut first_error = None;
        for variant in &variants {
            match self.engine.parse_pattern(variant) {
                Ok(p) => patterns.push(p),
                Err(e) => {
                    log::debug!("skipping SMARTS variant {variant:?}: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        if patterns.is_empty() {
            return Err(ValidationError::Parse {
                role: InputRole::ReactionSmarts,
                input: sanitized.to_string(),
                message: first_error.map_or_else(|| "no usable variant".to_string(), |e| e.to_string()),
            });
        }
        Ok(patterns)
    }

    fn validate_example(
        &self,
        patterns: &[E::Pattern],
        topology: ReactionTopology,
        example: &Example,
    ) -> Verdict {
        match self.check_example(patterns, topology, example) {
            Ok(None) => Verdict::Pass,
            Ok(Some(mismatch)) => Verdict::Fail(mismatch),
            Err(e) => Verdict::Error(e),
        }
    }

    fn check_example(
        &self,
        patterns: &[E::Pattern],
        topology: ReactionTopology,
        example: &Example,
    ) -> Result<Option<ChemistryMismatch>, ValidationError> {
        if example.products.is_empty() {
            return Err(ValidationError::InvariantViolation(
                "example lists no expected products".to_string(),
            ));
        }
        let expected = self.canonical_set(InputRole::Product, &example.products)?;
        let forbidden = self.canonical_set(InputRole::ForbiddenProduct, &example.forbidden_products)?;
        let overlap: Vec<String> = expected
            .intersection(&forbidden)
            .map(|f| f.to_string())
            .collect();
        if !overlap.is_empty() {
            return Err(ValidationError::Configuration { overlap });
        }

        let substrate = self.parse(InputRole::Substrate, &sanitize_smiles(&example.substrate))?;
        let outcomes = self.outcomes(patterns, topology, &substrate)?;
        Ok(judge(
            &outcomes,
            &expected,
            &forbidden,
            example.is_intermediate,
            self.config.forbidden_policy,
        ))
    }

    fn parse(&self, role: InputRole, smiles: &str) -> Result<E::Molecule, ValidationError> {
        self.engine
            .parse(smiles)
            .map_err(|e| ValidationError::Parse {
                role,
                input: smiles.to_string(),
                message: e.to_string(),
            })
    }

    /// Canonical forms of every component of every listed SMILES.
    fn canonical_set(&self, role: InputRole, smiles: &[String]) -> Result<Outcome, ValidationError> {
        let mut out = Outcome::new();
        for s in smiles {
            for part in split_smiles(&sanitize_smiles(s)) {
                let mol = self.parse(role, &part)?;
                out.insert(self.engine.canonicalize(&mol));
            }
        }
        Ok(out)
    }

    /// Every distinct outcome over all pattern variants and, for
    /// multi-reactant patterns, every assignment of substrate fragments to
    /// reactant templates.
    fn outcomes(
        &self,
        patterns: &[E::Pattern],
        topology: ReactionTopology,
        substrate: &E::Molecule,
    ) -> Result<BTreeSet<Outcome>, ValidationError> {
        let arity = topology.arity();
        let pieces = if arity > 1 || topology == ReactionTopology::Intramolecular {
            self.engine.fragments(substrate)
        } else {
            Vec::new()
        };
        // a grouped template must not join separate molecules
        if topology == ReactionTopology::Intramolecular && pieces.len() != 1 {
            return Err(ValidationError::TopologyMismatch {
                expected: 1,
                got: pieces.len(),
            });
        }
        let assignments: Vec<Vec<&E::Molecule>> = if arity > 1 {
            if pieces.len() != arity {
                return Err(ValidationError::TopologyMismatch {
                    expected: arity,
                    got: pieces.len(),
                });
            }
            permutations(&pieces)
        } else {
            vec![vec![substrate]]
        };

        let mut outcomes = BTreeSet::new();
        let mut applied = false;
        let mut last_error = None;
        for pattern in patterns {
            for reactants in &assignments {
                match self.engine.apply(pattern, reactants) {
                    Ok(found) => {
                        applied = true;
                        for products in found {
                            outcomes.insert(
                                products
                                    .iter()
                                    .map(|m| self.engine.canonicalize(m))
                                    .collect::<Outcome>(),
                            );
                        }
                    }
                    Err(e) => {
                        log::debug!("reaction application failed: {e}");
                        last_error = Some(e);
                    }
                }
            }
        }
        match (applied, last_error) {
            (false, Some(e)) => Err(ValidationError::Engine(e.to_string())),
            _ => Ok(outcomes),
        }
    }
}

/// `None` when the example passes.
fn judge(
    outcomes: &BTreeSet<Outcome>,
    expected: &Outcome,
    forbidden: &Outcome,
    intermediate: bool,
    policy: ForbiddenPolicy,
) -> Option<ChemistryMismatch> {
    let reproduces = |o: &Outcome| {
        if intermediate {
            expected.is_subset(o)
        } else {
            o == expected
        }
    };
    let matching: Vec<&Outcome> = outcomes.iter().filter(|o| reproduces(o)).collect();
    if matching.is_empty() {
        return Some(ChemistryMismatch::ExpectedNotProduced {
            expected: expected.iter().cloned().collect(),
            produced: outcomes.iter().map(|o| o.iter().cloned().collect()).collect(),
        });
    }

    let checked: Vec<&Outcome> = match policy {
        ForbiddenPolicy::Strict => outcomes.iter().collect(),
        ForbiddenPolicy::Lenient => matching,
    };
    let reached: BTreeSet<&CanonicalForm> = checked
        .iter()
        .flat_map(|o| o.intersection(forbidden))
        .collect();
    if reached.is_empty() {
        None
    } else {
        Some(ChemistryMismatch::ForbiddenProduced {
            forbidden: reached.into_iter().cloned().collect(),
        })
    }
}

fn permutations<T>(items: &[T]) -> Vec<Vec<&T>> {
    fn extend<'a, T>(
        items: &'a [T],
        used: &mut [bool],
        current: &mut Vec<&'a T>,
        out: &mut Vec<Vec<&'a T>>,
    ) {
        if current.len() == items.len() {
            out.push(current.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            current.push(&items[i]);
            extend(items, used, current, out);
            current.pop();
            used[i] = false;
        }
    }

    let mut out = Vec::new();
    extend(items, &mut vec![false; items.len()], &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(items: &[&str]) -> Outcome {
        items.iter().map(|s| CanonicalForm::new(*s)).collect()
    }

    #[test]
    fn permutations_cover_every_order() {
        let p = permutations(&[1, 2, 3]);
        assert_eq!(p.len(), 6);
        assert_eq!(p[0], vec![&1, &2, &3]);
        assert_eq!(p[5], vec![&3, &2, &1]);
        assert_eq!(permutations::<u8>(&[]), vec![Vec::<&u8>::new()]);
    }

    #[test]
    fn judge_needs_one_outcome_with_all_products() {
        let outcomes: BTreeSet<Outcome> = [forms(&["A"]), forms(&["B"])].into_iter().collect();
        let verdict = judge(
            &outcomes,
            &forms(&["A", "B"]),
            &Outcome::new(),
            false,
            ForbiddenPolicy::Strict,
        );
        assert!(matches!(
            verdict,
            Some(ChemistryMismatch::ExpectedNotProduced { .. })
        ));

        let outcomes: BTreeSet<Outcome> = [forms(&["A", "B"])].into_iter().collect();
        assert_eq!(
            judge(&outcomes, &forms(&["A", "B"]), &Outcome::new(), false, ForbiddenPolicy::Strict),
            None
        );
    }

    #[test]
    fn judge_forbidden_policies() {
        let outcomes: BTreeSet<Outcome> = [forms(&["A"]), forms(&["X"])].into_iter().collect();
        let strict = judge(&outcomes, &forms(&["A"]), &forms(&["X"]), false, ForbiddenPolicy::Strict);
        assert_eq!(
            strict,
            Some(ChemistryMismatch::ForbiddenProduced {
                forbidden: vec![CanonicalForm::new("X")]
            })
        );
        let lenient = judge(&outcomes, &forms(&["A"]), &forms(&["X"]), false, ForbiddenPolicy::Lenient);
        assert_eq!(lenient, None);
    }

    #[test]
    fn judge_intermediate_uses_subset() {
        let outcomes: BTreeSet<Outcome> = [forms(&["A", "B"])].into_iter().collect();
        assert_eq!(
            judge(&outcomes, &forms(&["A"]), &Outcome::new(), true, ForbiddenPolicy::Strict),
            None
        );
        assert!(judge(&outcomes, &forms(&["A"]), &Outcome::new(), false, ForbiddenPolicy::Strict).is_some());
    }

    #[test]
    fn lenient_still_checks_matching_outcome_of_intermediate() {
        let outcomes: BTreeSet<Outcome> = [forms(&["A", "X"])].into_iter().collect();
        let verdict = judge(&outcomes, &forms(&["A"]), &forms(&["X"]), true, ForbiddenPolicy::Lenient);
        assert!(matches!(
            verdict,
            Some(ChemistryMismatch::ForbiddenProduced { .. })
        ));
    }
}
