use std::collections::HashSet;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

/// Result of aromaticity perception: per-atom and per-bond flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aromaticity {
    pub atoms: Vec<bool>,
    pub bonds: Vec<bool>,
}

/// Finds aromatic rings in a Kekulé structure.
///
/// Candidate systems are the small rings from [`RingInfo`] plus every pair
/// of those rings fused through exactly one shared bond. A system is
/// aromatic when every member can take part in the pi system and the
/// electron count satisfies Hückel's 4n+2 rule.
pub fn find_aromaticity<A, B>(mol: &Mol<A, B>, ring_info: &RingInfo) -> Aromaticity
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let mut out = Aromaticity {
        atoms: vec![false; mol.atom_count()],
        bonds: vec![false; mol.bond_count()],
    };
    let donors: Vec<Option<u8>> = mol
        .atoms()
        .map(|a| pi_electrons(mol, ring_info, a))
        .collect();

    let rings: Vec<&Vec<NodeIndex>> = ring_info
        .rings()
        .iter()
        .filter(|r| r.iter().all(|a| donors[a.index()].is_some()))
        .collect();
    let edge_sets: Vec<Vec<EdgeIndex>> = rings.iter().map(|r| ring_edges(mol, r)).collect();

    let mark = |atoms: &[NodeIndex], edges: &[EdgeIndex], out: &mut Aromaticity| {
        for a in atoms {
            out.atoms[a.index()] = true;
        }
        for e in edges {
            out.bonds[e.index()] = true;
        }
    };

    for (ring, edges) in rings.iter().zip(&edge_sets) {
        if is_huckel(ring.iter().map(|a| donors[a.index()].unwrap_or(0))) {
            mark(ring, edges, &mut out);
        }
    }

    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            let shared: Vec<&EdgeIndex> = edge_sets[i]
                .iter()
                .filter(|e| edge_sets[j].contains(e))
                .collect();
            if shared.len() != 1 {
                continue;
            }
            let union: HashSet<NodeIndex> =
                rings[i].iter().chain(rings[j].iter()).copied().collect();
            if union.len() != rings[i].len() + rings[j].len() - 2 {
                continue;
            }
            if is_huckel(union.iter().map(|a| donors[a.index()].unwrap_or(0))) {
                let atoms: Vec<NodeIndex> = union.into_iter().collect();
                let edges: Vec<EdgeIndex> = edge_sets[i]
                    .iter()
                    .chain(edge_sets[j].iter())
                    .copied()
                    .collect();
                mark(&atoms, &edges, &mut out);
            }
        }
    }

    out
}

/// Recomputes aromatic flags from scratch. Bond orders are untouched.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>) {
    let ring_info = RingInfo::new(mol);
    let found = find_aromaticity(mol, &ring_info);
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for a in atoms {
        mol.atom_mut(a).is_aromatic = found.atoms[a.index()];
    }
    let bonds: Vec<EdgeIndex> = mol.bonds().collect();
    for e in bonds {
        mol.bond_mut(e).is_aromatic = found.bonds[e.index()];
    }
}

fn ring_edges<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Vec<EdgeIndex> {
    (0..ring.len())
        .filter_map(|i| mol.bond_between(ring[i], ring[(i + 1) % ring.len()]))
        .collect()
}

fn is_huckel(electrons: impl Iterator<Item = u8>) -> bool {
    let total: u32 = electrons.map(u32::from).sum();
    total >= 2 && (total - 2) % 4 == 0
}

/// Pi electrons an atom contributes to a ring system, or `None` when it
/// cannot be part of one.
fn pi_electrons<A, B>(mol: &Mol<A, B>, ring_info: &RingInfo, atom: NodeIndex) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    if !ring_info.is_ring_atom(atom) {
        return None;
    }
    let data = mol.atom(atom);
    let anum = data.atomic_num();
    let charge = data.formal_charge();
    let connections = mol.degree(atom) + data.hydrogen_count() as usize;
    if connections > 3 {
        return None;
    }

    let mut ring_double = false;
    let mut exocyclic_double: Option<u8> = None;
    for e in mol.bonds_of(atom) {
        match mol.bond(e).bond_order() {
            BondOrder::Triple => return None,
            BondOrder::Double => {
                if ring_info.is_ring_bond(e) {
                    ring_double = true;
                } else if let Some(other) = mol.other_end(e, atom) {
                    exocyclic_double = Some(mol.atom(other).atomic_num());
                }
            }
            BondOrder::Single => {}
        }
    }

    if ring_double {
        return match anum {
            6 | 7 | 15 | 33 if charge >= 0 => Some(1),
            8 | 16 | 34 | 52 if charge == 1 => Some(1),
            16 | 34 | 52 if charge == 0 => Some(1),
            5 if charge <= 0 => Some(1),
            _ => None,
        };
    }
    if let Some(partner) = exocyclic_double {
        return match (anum, partner) {
            (6, 7 | 8 | 16) => Some(0),
            (16 | 34, 8) => Some(0),
            _ => None,
        };
    }

    match (anum, charge) {
        (6, -1) => Some(2),
        (6, 1) => Some(0),
        (7 | 15 | 33, 0) if connections == 3 => Some(2),
        (7 | 15 | 33, -1) if connections == 2 => Some(2),
        (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
        (5, 0) if connections == 3 => Some(0),
        _ => None,
    }
}
