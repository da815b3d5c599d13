//! Kekulization assigns alternating single and double bonds to aromatic
//! systems read from lowercase SMILES atoms.
//!
//! Every aromatic atom whose valence is not yet satisfied must receive
//! exactly one double bond from among its aromatic bonds. That is a perfect
//! matching problem on the aromatic subgraph; it is solved by a depth-first
//! search that always extends the atom with the fewest remaining partners,
//! which settles chains and isolated rings without backtracking.

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::valence::{allowed_valences, raw_bond_sum};

const SEARCH_LIMIT: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    #[error("cannot kekulize aromatic system around atoms {0:?}")]
    Unkekulizable(Vec<usize>),
    #[error("kekulization search gave up after {SEARCH_LIMIT} steps")]
    SearchLimit,
}

/// True when an aromatic atom still has one valence unit to fill with a
/// ring double bond.
fn needs_double(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    let used = raw_bond_sum(mol, idx) + atom.hydrogen_count;
    allowed_valences(atom.atomic_num, atom.formal_charge)
        .into_iter()
        .find(|&v| v >= used)
        .is_some_and(|v| v > used)
}

/// Replaces every unassigned aromatic bond with a single or double bond.
///
/// Only bond orders change; aromatic flags are left for perception to
/// recompute.
pub fn kekulize(mol: &mut Mol<Atom, Bond>) -> Result<(), KekulizeError> {
    let aromatic_edges: Vec<EdgeIndex> = mol
        .bonds()
        .filter(|&e| mol.bond(e).is_aromatic && mol.bond(e).order == BondOrder::Single)
        .collect();
    if aromatic_edges.is_empty() {
        return Ok(());
    }

    let n = mol.atom_count();
    let mut touched = vec![false; n];
    for &e in &aromatic_edges {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            touched[a.index()] = true;
            touched[b.index()] = true;
        }
    }
    let wants: Vec<bool> = (0..n)
        .map(|i| {
            let idx = NodeIndex::new(i);
            touched[i] && mol.atom(idx).is_aromatic && needs_double(mol, idx)
        })
        .collect();

    let mut adj: Vec<Vec<(usize, EdgeIndex)>> = vec![Vec::new(); n];
    for &e in &aromatic_edges {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            if wants[a.index()] && wants[b.index()] {
                adj[a.index()].push((b.index(), e));
                adj[b.index()].push((a.index(), e));
            }
        }
    }

    let mut search = Matching {
        adj: &adj,
        partner: vec![None; n],
        steps: 0,
    };
    let open: Vec<usize> = (0..n).filter(|&i| wants[i]).collect();
    if !search.solve(&open)? {
        let stuck: Vec<usize> = open
            .iter()
            .copied()
            .filter(|&i| adj[i].is_empty())
            .collect();
        return Err(KekulizeError::Unkekulizable(if stuck.is_empty() {
            open
        } else {
            stuck
        }));
    }

    for e in aromatic_edges {
        mol.bond_mut(e).order = BondOrder::Single;
    }
    for (i, slot) in search.partner.iter().enumerate() {
        if let Some((j, e)) = *slot {
            if i < j {
                mol.bond_mut(e).order = BondOrder::Double;
            }
        }
    }
    Ok(())
}

struct Matching<'a> {
    adj: &'a [Vec<(usize, EdgeIndex)>],
    partner: Vec<Option<(usize, EdgeIndex)>>,
    steps: usize,
}

impl Matching<'_> {
    fn free_partners(&self, atom: usize) -> impl Iterator<Item = (usize, EdgeIndex)> + '_ {
        self.adj[atom]
            .iter()
            .copied()
            .filter(|(nb, _)| self.partner[*nb].is_none())
    }

    fn solve(&mut self, open: &[usize]) -> Result<bool, KekulizeError> {
        self.steps += 1;
        if self.steps > SEARCH_LIMIT {
            return Err(KekulizeError::SearchLimit);
        }
        let Some(&atom) = open
            .iter()
            .filter(|&&a| self.partner[a].is_none())
            .min_by_key(|&&a| self.free_partners(a).count())
        else {
            return Ok(true);
        };
        let options: Vec<(usize, EdgeIndex)> = self.free_partners(atom).collect();
        for (nb, e) in options {
            self.partner[atom] = Some((nb, e));
            self.partner[nb] = Some((atom, e));
            if self.solve(open)? {
                return Ok(true);
            }
            self.partner[atom] = None;
            self.partner[nb] = None;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn double_bonds(mol: &Mol<Atom, Bond>) -> usize {
        mol.bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count()
    }

    #[test]
    fn benzene() {
        let mol = from_smiles("c1ccccc1").unwrap();
        assert_eq!(double_bonds(&mol), 3);
        for idx in mol.atoms() {
            let doubles = mol
                .bonds_of(idx)
                .filter(|&e| mol.bond(e).order == BondOrder::Double)
                .count();
            assert_eq!(doubles, 1);
        }
    }

    #[test]
    fn fused_rings() {
        assert_eq!(double_bonds(&from_smiles("c1ccc2ccccc2c1").unwrap()), 5);
        assert_eq!(double_bonds(&from_smiles("c1ccc2cc3ccccc3cc2c1").unwrap()), 7);
    }

    #[test]
    fn heteroaromatics() {
        assert_eq!(double_bonds(&from_smiles("c1ccncc1").unwrap()), 3);
        assert_eq!(double_bonds(&from_smiles("c1cc[nH]c1").unwrap()), 2);
        assert_eq!(double_bonds(&from_smiles("c1ccoc1").unwrap()), 2);
        assert_eq!(double_bonds(&from_smiles("c1ccsc1").unwrap()), 2);
        assert_eq!(double_bonds(&from_smiles("c1c[nH]cn1").unwrap()), 2);
        assert_eq!(double_bonds(&from_smiles("Cn1cccc1").unwrap()), 2);
    }

    #[test]
    fn charged_rings() {
        assert_eq!(double_bonds(&from_smiles("[cH-]1cccc1").unwrap()), 2);
        assert_eq!(double_bonds(&from_smiles("c1cc[nH+]cc1").unwrap()), 3);
        assert_eq!(double_bonds(&from_smiles("C[n+]1ccccc1").unwrap()), 3);
    }

    #[test]
    fn exocyclic_carbonyl() {
        let mol = from_smiles("O=c1cccc[nH]1").unwrap();
        assert_eq!(double_bonds(&mol), 3);
    }

    #[test]
    fn odd_ring_fails() {
        assert!(matches!(
            from_smiles("c1cccc1"),
            Err(crate::SmilesError::Kekulize(_))
        ));
        assert!(from_smiles("c1ccccc1c").is_err());
    }

    #[test]
    fn hydrogen_counts_survive() {
        let mol = from_smiles("Oc1ccccc1").unwrap();
        let total: u32 = mol.atoms().map(|i| mol.atom(i).hydrogen_count as u32).sum();
        assert_eq!(total, 6);
    }
}
