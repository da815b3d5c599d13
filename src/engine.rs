//! The chemistry capability the validator runs on.
//!
//! Validation only ever talks to chemistry through [`ChemistryEngine`], so
//! a deterministic fake can stand in for the real toolkit in tests.

use thiserror::Error;

use crate::molecule::{CanonicalForm, Molecule, MoleculeError};
use crate::pattern::Pattern;
use crate::reaction::{ReactionError, ReactionSmartsError};
use crate::topology::ReactionTopology;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Molecule(#[from] MoleculeError),
    #[error(transparent)]
    Pattern(#[from] ReactionSmartsError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    /// Failure reported by an engine other than [`DefaultEngine`].
    #[error("{0}")]
    Rejected(String),
}

pub trait ChemistryEngine {
    type Molecule;
    type Pattern;

    fn parse(&self, smiles: &str) -> Result<Self::Molecule, EngineError>;

    fn parse_pattern(&self, smarts: &str) -> Result<Self::Pattern, EngineError>;

    fn topology(&self, pattern: &Self::Pattern) -> ReactionTopology;

    /// Connected components, in a stable order.
    fn fragments(&self, molecule: &Self::Molecule) -> Vec<Self::Molecule>;

    /// Applies a pattern; every candidate outcome is returned, each as the
    /// list of product molecules it yields.
    fn apply(
        &self,
        pattern: &Self::Pattern,
        reactants: &[&Self::Molecule],
    ) -> Result<Vec<Vec<Self::Molecule>>, EngineError>;

    fn canonicalize(&self, molecule: &Self::Molecule) -> CanonicalForm;
}

/// Engine backed by this crate's SMILES, SMARTS and reaction code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEngine;

impl ChemistryEngine for DefaultEngine {
    type Molecule = Molecule;
    type Pattern = Pattern;

    fn parse(&self, smiles: &str) -> Result<Molecule, EngineError> {
        Ok(Molecule::parse(smiles)?)
    }

    fn parse_pattern(&self, smarts: &str) -> Result<Pattern, EngineError> {
        Ok(Pattern::parse(smarts)?)
    }

    fn topology(&self, pattern: &Pattern) -> ReactionTopology {
        pattern.topology()
    }

    fn fragments(&self, molecule: &Molecule) -> Vec<Molecule> {
        molecule.fragments()
    }

    fn apply(
        &self,
        pattern: &Pattern,
        reactants: &[&Molecule],
    ) -> Result<Vec<Vec<Molecule>>, EngineError> {
        Ok(pattern.apply(reactants)?)
    }

    fn canonicalize(&self, molecule: &Molecule) -> CanonicalForm {
        molecule.canonical()
    }
}
