use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Largest ring enumerated explicitly. Bigger rings still count as ring
/// membership through the bridge analysis.
pub const MAX_RING_SIZE: usize = 8;

/// Ring membership and small-ring perception for one molecule.
///
/// Ring bonds are the non-bridge bonds. `rings()` lists every simple cycle
/// of at most [`MAX_RING_SIZE`] atoms, which makes the result independent of
/// atom order, unlike a minimal cycle basis.
#[derive(Debug, Clone)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
    ring_bond: Vec<bool>,
    ring_bond_count: Vec<u8>,
    smallest: Vec<Option<usize>>,
    membership: Vec<u8>,
}

impl RingInfo {
    pub fn new<A, B>(mol: &Mol<A, B>) -> Self {
        let ring_bond = ring_bonds(mol);
        let mut ring_bond_count = vec![0u8; mol.atom_count()];
        for e in mol.bonds() {
            if ring_bond[e.index()] {
                if let Some((a, b)) = mol.bond_endpoints(e) {
                    ring_bond_count[a.index()] += 1;
                    ring_bond_count[b.index()] += 1;
                }
            }
        }

        let rings = enumerate_cycles(mol, &ring_bond);

        let mut membership = vec![0u8; mol.atom_count()];
        let mut smallest: Vec<Option<usize>> = vec![None; mol.atom_count()];
        for ring in &rings {
            for &a in ring {
                membership[a.index()] = membership[a.index()].saturating_add(1);
                let s = &mut smallest[a.index()];
                *s = Some(s.map_or(ring.len(), |v| v.min(ring.len())));
            }
        }
        for a in mol.atoms() {
            if ring_bond_count[a.index()] > 0 && smallest[a.index()].is_none() {
                smallest[a.index()] = shortest_cycle_through(mol, &ring_bond, a);
                membership[a.index()] = 1;
            }
        }

        Self {
            rings,
            ring_bond,
            ring_bond_count,
            smallest,
            membership,
        }
    }

    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.ring_bond_count
            .get(atom.index())
            .is_some_and(|&c| c > 0)
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.ring_bond.get(bond.index()).copied().unwrap_or(false)
    }

    pub fn ring_bond_count(&self, atom: NodeIndex) -> u8 {
        self.ring_bond_count.get(atom.index()).copied().unwrap_or(0)
    }

    /// Number of small rings containing the atom; 1 for atoms that only sit
    /// in a ring larger than [`MAX_RING_SIZE`].
    pub fn membership(&self, atom: NodeIndex) -> u8 {
        self.membership.get(atom.index()).copied().unwrap_or(0)
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.smallest.get(atom.index()).copied().flatten()
    }
}

/// Marks every bond that lies on a cycle (the complement of the bridges).
fn ring_bonds<A, B>(mol: &Mol<A, B>) -> Vec<bool> {
    let n = mol.atom_count();
    let mut order = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut is_ring = vec![true; mol.bond_count()];
    let mut counter = 0;

    for root in mol.atoms() {
        if order[root.index()] != usize::MAX {
            continue;
        }
        // (atom, bond used to reach it, pending incident bonds)
        let mut stack: Vec<(NodeIndex, Option<EdgeIndex>, Vec<EdgeIndex>)> = Vec::new();
        order[root.index()] = counter;
        low[root.index()] = counter;
        counter += 1;
        stack.push((root, None, mol.bonds_of(root).collect()));

        loop {
            let Some(top) = stack.last_mut() else {
                break;
            };
            let (atom, via) = (top.0, top.1);
            let next_bond = top.2.pop();
            if let Some(e) = next_bond {
                if Some(e) == via {
                    continue;
                }
                let Some(next) = mol.other_end(e, atom) else {
                    continue;
                };
                if order[next.index()] == usize::MAX {
                    order[next.index()] = counter;
                    low[next.index()] = counter;
                    counter += 1;
                    stack.push((next, Some(e), mol.bonds_of(next).collect()));
                } else {
                    low[atom.index()] = low[atom.index()].min(order[next.index()]);
                }
            } else {
                stack.pop();
                if let (Some(e), Some((parent, _, _))) = (via, stack.last()) {
                    let parent = *parent;
                    low[parent.index()] = low[parent.index()].min(low[atom.index()]);
                    if low[atom.index()] > order[parent.index()] {
                        is_ring[e.index()] = false;
                    }
                }
            }
        }
    }
    is_ring
}

/// Every simple cycle of up to [`MAX_RING_SIZE`] atoms, each reported once,
/// starting from its lowest-index atom.
fn enumerate_cycles<A, B>(mol: &Mol<A, B>, ring_bond: &[bool]) -> Vec<Vec<NodeIndex>> {
    let ring_neighbors = |a: NodeIndex| -> Vec<NodeIndex> {
        mol.bonds_of(a)
            .filter(|e| ring_bond[e.index()])
            .filter_map(|e| mol.other_end(e, a))
            .collect()
    };

    let mut cycles = Vec::new();
    for start in mol.atoms() {
        let mut path = vec![start];
        let mut on_path = vec![false; mol.atom_count()];
        on_path[start.index()] = true;
        extend_cycle(start, &mut path, &mut on_path, &ring_neighbors, &mut cycles);
    }
    cycles
}

fn extend_cycle(
    start: NodeIndex,
    path: &mut Vec<NodeIndex>,
    on_path: &mut [bool],
    ring_neighbors: &dyn Fn(NodeIndex) -> Vec<NodeIndex>,
    cycles: &mut Vec<Vec<NodeIndex>>,
) {
    let Some(&last) = path.last() else {
        return;
    };
    for next in ring_neighbors(last) {
        if next == start {
            if path.len() >= 3 && path[1] < last {
                cycles.push(path.clone());
            }
            continue;
        }
        if next < start || on_path[next.index()] || path.len() >= MAX_RING_SIZE {
            continue;
        }
        path.push(next);
        on_path[next.index()] = true;
        extend_cycle(start, path, on_path, ring_neighbors, cycles);
        on_path[next.index()] = false;
        path.pop();
    }
}

fn shortest_cycle_through<A, B>(
    mol: &Mol<A, B>,
    ring_bond: &[bool],
    atom: NodeIndex,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for first in mol.bonds_of(atom).filter(|e| ring_bond[e.index()]) {
        let Some(target) = mol.other_end(first, atom) else {
            continue;
        };
        let mut dist = vec![usize::MAX; mol.atom_count()];
        let mut queue = VecDeque::new();
        dist[atom.index()] = 0;
        queue.push_back(atom);
        while let Some(cur) = queue.pop_front() {
            for e in mol.bonds_of(cur) {
                if e == first || !ring_bond[e.index()] {
                    continue;
                }
                let Some(nb) = mol.other_end(e, cur) else {
                    continue;
                };
                if dist[nb.index()] == usize::MAX {
                    dist[nb.index()] = dist[cur.index()] + 1;
                    queue.push_back(nb);
                }
            }
        }
        if dist[target.index()] != usize::MAX {
            let len = dist[target.index()] + 1;
            best = Some(best.map_or(len, |b| b.min(len)));
        }
    }
    best
}
