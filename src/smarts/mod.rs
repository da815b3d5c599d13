mod error;
mod parser;
pub mod query;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr, MatchContext};

use crate::mol::Mol;

/// Parses a SMARTS pattern into a query graph.
pub fn from_smarts(s: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    parser::parse(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;
    use crate::substruct::has_substruct_match;

    fn hit(smarts: &str, smiles: &str) -> bool {
        has_substruct_match(&from_smiles(smiles).unwrap(), &from_smarts(smarts).unwrap())
    }

    #[test]
    fn functional_groups() {
        assert!(hit("[CX3](=O)[OX2H1]", "CC(=O)O"));
        assert!(!hit("[CX3](=O)[OX2H1]", "CC(=O)OC"));
        assert!(hit("[NX3;H2]c", "Nc1ccccc1"));
        assert!(hit("[#7;R]", "c1ccncc1"));
        assert!(!hit("[#7;R]", "CCN"));
    }

    #[test]
    fn mapped_patterns() {
        assert!(hit("[C:1][OH:2]", "CCO"));
        assert!(hit("[c:1]1[c:2][c:3][c:4][c:5][c:6]1", "Oc1ccccc1"));
    }

    #[test]
    fn ring_bond_queries() {
        assert!(hit("C@C", "C1CCCCC1"));
        assert!(!hit("C@C", "CCCC"));
        assert!(hit("C!@C", "CCCC"));
    }

    #[test]
    fn recursive() {
        assert!(hit("[O;$(OC=O)]", "CC(=O)O"));
        assert!(!hit("[O;$(OC=O)]", "CCO"));
    }
}
