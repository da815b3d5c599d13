pub mod error;
mod parser;
mod runner;

pub use error::{ReactionError, ReactionSmartsError};
pub use parser::parse_reaction_smarts;
pub(crate) use parser::{component_group, split_on_dot, split_reaction};

use crate::mol::Mol;
use crate::smarts::{AtomExpr, BondExpr};

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub(crate) reactant_templates: Vec<Mol<AtomExpr, BondExpr>>,
    pub(crate) product_templates: Vec<Mol<AtomExpr, BondExpr>>,
    pub(crate) agent_templates: Vec<Mol<AtomExpr, BondExpr>>,
    pub(crate) grouped_reactants: bool,
}

impl Reaction {
    pub fn reactant_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.reactant_templates
    }

    pub fn product_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.product_templates
    }

    pub fn agent_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.agent_templates
    }

    /// True when the reactant side was written as one `( ... )` group, so
    /// all of its components must come from a single molecule.
    pub fn has_reactant_group(&self) -> bool {
        self.grouped_reactants
    }
}

pub fn from_reaction_smarts(s: &str) -> Result<Reaction, ReactionSmartsError> {
    parse_reaction_smarts(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};
    use crate::smiles::{from_smiles, to_canonical_smiles};

    fn mol(smiles: &str) -> Mol<Atom, Bond> {
        from_smiles(smiles).unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"))
    }

    fn products(smarts: &str, reactants: &[&str]) -> Vec<Vec<String>> {
        let rxn = from_reaction_smarts(smarts).unwrap();
        let mols: Vec<Mol<Atom, Bond>> = reactants.iter().map(|s| mol(s)).collect();
        let refs: Vec<&Mol<Atom, Bond>> = mols.iter().collect();
        rxn.run(&refs)
            .unwrap()
            .iter()
            .map(|outcome| outcome.iter().map(to_canonical_smiles).collect())
            .collect()
    }

    #[test]
    fn parse_counts() {
        let rxn = from_reaction_smarts("[C:1]=[C:2]>[Pd]>[C:1][C:2]").unwrap();
        assert_eq!(rxn.reactant_templates().len(), 1);
        assert_eq!(rxn.product_templates().len(), 1);
        assert_eq!(rxn.agent_templates().len(), 1);
        assert!(!rxn.has_reactant_group());

        let rxn = from_reaction_smarts("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]").unwrap();
        assert_eq!(rxn.reactant_templates().len(), 2);
        assert_eq!(rxn.product_templates().len(), 2);
    }

    #[test]
    fn parse_errors() {
        assert!(from_reaction_smarts("[C:1]>>").is_err());
        assert!(from_reaction_smarts(">>[C:1]").is_err());
        assert!(matches!(
            from_reaction_smarts("[C:1][Q]>>[C:1]"),
            Err(ReactionSmartsError::InvalidComponent {
                section: "reactant",
                ..
            })
        ));
    }

    #[test]
    fn alcohol_oxidation() {
        assert_eq!(
            products("[C:1][OH:2]>>[C:1]=[O:2]", &["CCO"]),
            vec![vec![to_canonical_smiles(&mol("CC=O"))]]
        );
    }

    #[test]
    fn substitution_keeps_substituents() {
        let out = products(
            "[C:1][Br:2].[OH-:3]>>[C:1][O+0:3].[Br-:2]",
            &["CCCBr", "[OH-]"],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0][0], to_canonical_smiles(&mol("CCCO")));
        assert_eq!(out[0][1], "[Br-]");
    }

    #[test]
    fn no_match_is_empty() {
        assert!(products("[C:1][Br:2]>>[C:1][OH]", &["CC"]).is_empty());
    }

    #[test]
    fn wrong_reactant_count() {
        let rxn = from_reaction_smarts("[C:1][Br:2].[OH-:3]>>[C:1][O:3]").unwrap();
        let r = mol("CBr");
        assert_eq!(
            rxn.run(&[&r]).unwrap_err(),
            ReactionError::WrongReactantCount {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn each_match_is_an_outcome() {
        let out = products("[C:1][Br:2]>>[C:1][OH]", &["BrCCBr"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0][0], to_canonical_smiles(&mol("OCCBr")));
    }

    #[test]
    fn unspecified_product_bond_keeps_reactant_order() {
        let rxn = from_reaction_smarts("[C:1]=[C:2]>>[C:1][C:2]").unwrap();
        let r = mol("C=C");
        let outcomes = rxn.run(&[&r]).unwrap();
        let product = &outcomes[0][0];
        let e = product.bonds().next().unwrap();
        assert_eq!(product.bond(e).order, BondOrder::Double);
    }

    #[test]
    fn bond_order_changes() {
        assert_eq!(
            products("[C:1][C:2]>>[C:1]#[C:2]", &["CC"])[0][0],
            to_canonical_smiles(&mol("C#C"))
        );
    }

    #[test]
    fn charge_change() {
        assert_eq!(products("[OH:1]>>[O-:1]", &["CO"])[0][0], "C[O-]");
    }

    #[test]
    fn aromatic_substrate_reacts_and_stays_aromatic() {
        let out = products(
            "[c:1][Br:2].[OH-:3]>>[c:1][O+0:3].[Br-:2]",
            &["c1ccc(Br)cc1", "[OH-]"],
        );
        assert!(!out.is_empty());
        assert_eq!(out[0][0], to_canonical_smiles(&mol("Oc1ccccc1")));
    }

    #[test]
    fn unmapped_reactant_atoms_are_removed() {
        assert_eq!(
            products("[C:1]O>>[C:1]", &["CCO"])[0][0],
            to_canonical_smiles(&mol("CC"))
        );
    }

    #[test]
    fn ring_closure_within_one_molecule() {
        let out = products("([C:1][OH].[C:2][OH])>>[C:1][C:2]", &["OCCCCO"]);
        let ring = to_canonical_smiles(&mol("C1CCC1"));
        assert!(out.iter().any(|o| o[0] == ring));
    }

    #[test]
    fn ring_opening_hydrolysis() {
        let out = products("[C:1]1[O:2][C:3]1>>[C:1]([OH:2])[C:3]O", &["C1OC1"]);
        assert!(out
            .iter()
            .all(|o| o[0] == to_canonical_smiles(&mol("OCCO"))));
    }
}
