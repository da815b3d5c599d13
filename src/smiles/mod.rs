mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::perceive;
use crate::mol::Mol;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles, write_atom};

/// Parses SMILES into a raw graph: bracket hydrogens only, aromatic bonds
/// unassigned.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let tokens = tokenizer::tokenize(s.trim())?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

/// Parses SMILES into a finished molecule with hydrogen counts, Kekulé bond
/// orders and perceived aromaticity.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mut mol = parse_smiles(s)?;
    perceive(&mut mol)?;
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn hydrogens(smiles: &str) -> Vec<u8> {
        let mol = from_smiles(smiles).unwrap();
        mol.atoms().map(|a| mol.atom(a).hydrogen_count).collect()
    }

    #[test]
    fn simple_chains() {
        assert_eq!(hydrogens("C"), vec![4]);
        assert_eq!(hydrogens("CCO"), vec![3, 2, 1]);
        assert_eq!(hydrogens("C=C"), vec![2, 2]);
        assert_eq!(hydrogens("C#N"), vec![1, 0]);
    }

    #[test]
    fn higher_valences() {
        assert_eq!(hydrogens("CS(=O)(=O)C"), vec![3, 0, 0, 0, 3]);
        assert_eq!(hydrogens("CP(=O)(O)O"), vec![3, 0, 0, 1, 1]);
    }

    #[test]
    fn charged_bracket_atoms() {
        let mol = from_smiles("C[N+](C)(C)C").unwrap();
        assert_eq!(mol.atom(n(1)).formal_charge, 1);
        assert_eq!(mol.atom(n(1)).hydrogen_count, 0);
    }

    #[test]
    fn acetaldehyde_bonds() {
        let mol = from_smiles("CC=O").unwrap();
        let e = mol.bond_between(n(1), n(2)).unwrap();
        assert_eq!(mol.bond(e).order, BondOrder::Double);
        assert!(!mol.bond(e).is_aromatic);
    }

    #[test]
    fn stereo_marks_are_accepted() {
        assert!(from_smiles("C/C=C/C").is_ok());
        assert!(from_smiles("N[C@@H](C)C(=O)O").is_ok());
        assert_eq!(hydrogens("F/C=C\\F"), vec![0, 1, 1, 0]);
    }

    #[test]
    fn parse_failures() {
        assert!(from_smiles("C1CC1(").is_err());
        assert!(from_smiles("").is_err());
        assert!(from_smiles("   ").is_err());
        assert!(from_smiles("C[Zz]").is_err());
    }
}
