use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::mol::Mol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("atom {} ({symbol}): valence {actual} not in {allowed:?}", atom.index())]
pub struct ValenceError {
    pub atom: NodeIndex,
    pub symbol: &'static str,
    pub actual: u8,
    pub allowed: Vec<u8>,
}

/// Default valences shifted by formal charge: N+ behaves like C (4),
/// O- like F (1), C+ and C- have three bonds, B- has four.
pub fn allowed_valences(atomic_num: u8, charge: i8) -> Vec<u8> {
    let Some(element) = Element::from_atomic_num(atomic_num) else {
        return Vec::new();
    };
    let base = element.default_valences();
    let shift = |v: u8| -> Option<u8> {
        let v = v as i16;
        let c = charge as i16;
        let shifted = match element.main_group() {
            Some(13) => v - c,
            Some(14) => v - c.abs(),
            Some(15..=17) => v + c,
            _ => v,
        };
        u8::try_from(shifted).ok()
    };
    let mut out: Vec<u8> = base.iter().filter_map(|&v| shift(v)).collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Hydrogens implied by the SMILES organic-subset rules.
///
/// `bond_sum` counts unassigned aromatic bonds as 1. An aromatic atom
/// reserves one extra valence unit for its share of the pi system, and only
/// its lowest valence is considered.
pub fn implicit_hydrogens(atomic_num: u8, charge: i8, aromatic: bool, bond_sum: u8) -> u8 {
    let allowed = allowed_valences(atomic_num, charge);
    if aromatic {
        return allowed
            .first()
            .map(|&v| v.saturating_sub(bond_sum + 1))
            .unwrap_or(0);
    }
    allowed
        .iter()
        .find(|&&v| v >= bond_sum)
        .map(|&v| v - bond_sum)
        .unwrap_or(0)
}

/// Bond order sum with unassigned aromatic bonds counted as 1.
pub fn raw_bond_sum(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> u8 {
    mol.bonds_of(atom)
        .map(|e| mol.bond(e).order.valence())
        .sum()
}

pub fn total_valence(mol: &Mol<Atom, Bond>, atom: NodeIndex) -> u8 {
    raw_bond_sum(mol, atom) + mol.atom(atom).hydrogen_count
}

/// Rejects atoms whose Kekulé valence exceeds every allowed valence.
/// Elements without a valence model are not checked.
pub fn check_valence(mol: &Mol<Atom, Bond>) -> Result<(), ValenceError> {
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
        let Some(&max) = allowed.last() else {
            continue;
        };
        let actual = total_valence(mol, idx);
        if actual > max {
            return Err(ValenceError {
                atom: idx,
                symbol: atom.symbol(),
                actual,
                allowed,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;

    #[test]
    fn charge_shifts_valence() {
        assert_eq!(allowed_valences(7, 1), vec![4, 6]);
        assert_eq!(allowed_valences(8, -1), vec![1]);
        assert_eq!(allowed_valences(6, 1), vec![3]);
        assert_eq!(allowed_valences(6, -1), vec![3]);
        assert_eq!(allowed_valences(5, -1), vec![4]);
        assert!(allowed_valences(26, 2).is_empty());
    }

    #[test]
    fn implicit_h_rules() {
        assert_eq!(implicit_hydrogens(6, 0, false, 1), 3);
        assert_eq!(implicit_hydrogens(7, 0, false, 4), 1);
        assert_eq!(implicit_hydrogens(16, 0, false, 3), 1);
        assert_eq!(implicit_hydrogens(6, 0, true, 2), 1);
        assert_eq!(implicit_hydrogens(7, 0, true, 2), 0);
        assert_eq!(implicit_hydrogens(7, 0, true, 3), 0);
        assert_eq!(implicit_hydrogens(8, 0, true, 2), 0);
    }

    #[test]
    fn pentavalent_carbon_is_rejected() {
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let c = mol.add_atom(Atom::new(6));
        for _ in 0..2 {
            let o = mol.add_atom(Atom::new(8));
            mol.add_bond(c, o, Bond::with_order(BondOrder::Double));
        }
        mol.atom_mut(c).hydrogen_count = 1;
        let err = check_valence(&mol).unwrap_err();
        assert_eq!(err.actual, 5);
        assert_eq!(err.symbol, "C");
    }
}
