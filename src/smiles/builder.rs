use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::ParseTree;
use crate::smiles::tokenizer::BondToken;

/// Converts a parse tree to a graph with raw (unassigned) aromatic bonds.
/// Hydrogen counts are only set for bracket atoms.
pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let nodes: Vec<NodeIndex> = tree
        .atoms
        .iter()
        .map(|tok| {
            mol.add_atom(Atom {
                atomic_num: tok.element.atomic_num(),
                formal_charge: tok.charge,
                isotope: tok.isotope,
                hydrogen_count: tok.hcount.unwrap_or(0),
                is_aromatic: tok.is_aromatic,
                map_num: tok.map_num,
                explicit_hydrogens: tok.is_bracket,
            })
        })
        .collect();

    for pb in &tree.bonds {
        let both_aromatic = tree.atoms[pb.a].is_aromatic && tree.atoms[pb.b].is_aromatic;
        mol.add_bond(nodes[pb.a], nodes[pb.b], resolve_bond(pb.bond, both_aromatic));
    }
    mol
}

fn resolve_bond(token: Option<BondToken>, both_aromatic: bool) -> Bond {
    match token {
        Some(BondToken::Double) => Bond::with_order(BondOrder::Double),
        Some(BondToken::Triple) => Bond::with_order(BondOrder::Triple),
        Some(BondToken::Aromatic) => Bond::aromatic(),
        Some(BondToken::Single | BondToken::Directional) => Bond::single(),
        None if both_aromatic => Bond::aromatic(),
        None => Bond::single(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_tree::build_parse_tree;
    use crate::smiles::tokenizer::tokenize;

    fn raw(s: &str) -> Mol<Atom, Bond> {
        build_mol(&build_parse_tree(&tokenize(s).unwrap()).unwrap())
    }

    #[test]
    fn implicit_bonds_between_aromatic_atoms_are_aromatic() {
        let mol = raw("c1ccccc1C");
        let aromatic = mol.bonds().filter(|&e| mol.bond(e).is_aromatic).count();
        assert_eq!(aromatic, 6);
    }

    #[test]
    fn explicit_single_between_aromatic_atoms() {
        let mol = raw("c1ccccc1-c1ccccc1");
        let plain = mol.bonds().filter(|&e| !mol.bond(e).is_aromatic).count();
        assert_eq!(plain, 1);
    }

    #[test]
    fn bracket_atoms_fix_hydrogens() {
        let mol = raw("[NH4+]C");
        let n = mol.atom(NodeIndex::new(0));
        assert!(n.explicit_hydrogens);
        assert_eq!(n.hydrogen_count, 4);
        assert!(!mol.atom(NodeIndex::new(1)).explicit_hydrogens);
    }
}
