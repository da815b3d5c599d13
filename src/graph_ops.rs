use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::aromaticity::set_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::traits::HasAtomMap;
use crate::valence::{implicit_hydrogens, raw_bond_sum};

/// Atoms of each connected component, components ordered by their lowest
/// atom index.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let mut seen = vec![false; mol.atom_count()];
    let mut components = Vec::new();
    for start in mol.atoms() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut queue = VecDeque::from([start]);
        let mut component = Vec::new();
        while let Some(cur) = queue.pop_front() {
            component.push(cur);
            for nb in mol.neighbors(cur) {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    queue.push_back(nb);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Copies the given atoms, and the bonds among them, into a new molecule.
/// Atom order follows `atoms`.
pub fn extract<A: Clone, B: Clone>(mol: &Mol<A, B>, atoms: &[NodeIndex]) -> Mol<A, B> {
    let mut out = Mol::new();
    let mut remap: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
    for &a in atoms {
        remap[a.index()] = Some(out.add_atom(mol.atom(a).clone()));
    }
    for e in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(e) else {
            continue;
        };
        if let (Some(na), Some(nb)) = (remap[a.index()], remap[b.index()]) {
            out.add_bond(na, nb, mol.bond(e).clone());
        }
    }
    out
}

/// Splits a molecule into one molecule per connected component.
pub fn fragments<A: Clone, B: Clone>(mol: &Mol<A, B>) -> Vec<Mol<A, B>> {
    connected_components(mol)
        .iter()
        .map(|atoms| extract(mol, atoms))
        .collect()
}

pub fn clear_atom_maps<A: HasAtomMap, B>(mol: &mut Mol<A, B>) {
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for a in atoms {
        mol.atom_mut(a).set_map_num(0);
    }
}

/// Fills in hydrogen counts for atoms whose count was not stated.
///
/// The aromatic rule only applies to atoms that still have unassigned
/// aromatic bonds; everything else follows the plain valence rule.
pub fn assign_implicit_hydrogens(mol: &mut Mol<Atom, Bond>) {
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for a in atoms {
        if mol.atom(a).explicit_hydrogens {
            continue;
        }
        let pending_aromatic = mol.atom(a).is_aromatic
            && mol.bonds_of(a).any(|e| mol.bond(e).is_aromatic);
        let sum = raw_bond_sum(mol, a);
        let atom = mol.atom(a);
        let h = implicit_hydrogens(atom.atomic_num, atom.formal_charge, pending_aromatic, sum);
        mol.atom_mut(a).hydrogen_count = h;
    }
}

/// Turns a freshly built graph into a finished molecule: implicit
/// hydrogens, Kekulé bond orders, then aromaticity flags.
pub fn perceive(mol: &mut Mol<Atom, Bond>) -> Result<(), KekulizeError> {
    assign_implicit_hydrogens(mol);
    kekulize(mol)?;
    set_aromaticity(mol);
    Ok(())
}
