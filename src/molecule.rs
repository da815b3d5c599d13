use std::fmt;

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::fragments;
use crate::mol::Mol;
use crate::smiles::{from_smiles, to_canonical_smiles, SmilesError};
use crate::valence::{check_valence, ValenceError};

/// Canonical SMILES of a molecule; the only notion of "same compound"
/// used by the validator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    /// Wraps a string that is already canonical for the engine that made it.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoleculeError {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}

/// A parsed, perceived molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    mol: Mol<Atom, Bond>,
}

impl Molecule {
    /// Parses SMILES and rejects structures with impossible valences.
    pub fn parse(smiles: &str) -> Result<Self, MoleculeError> {
        let mol = from_smiles(smiles)?;
        check_valence(&mol)?;
        Ok(Self { mol })
    }

    pub fn from_mol(mol: Mol<Atom, Bond>) -> Self {
        Self { mol }
    }

    pub fn as_mol(&self) -> &Mol<Atom, Bond> {
        &self.mol
    }

    pub fn canonical(&self) -> CanonicalForm {
        CanonicalForm(to_canonical_smiles(&self.mol))
    }

    /// One molecule per dot-separated component.
    pub fn fragments(&self) -> Vec<Molecule> {
        fragments(&self.mol).into_iter().map(Molecule::from_mol).collect()
    }
}
