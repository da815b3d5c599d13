//! Canonical atom ranking.
//!
//! Atoms start out partitioned by local invariants. The partition is then
//! refined by neighbor ranks until it stops splitting. Remaining ties are
//! broken by an individualization search: each member of the first tied
//! class is tried in turn, and the labeling whose graph certificate sorts
//! lowest wins. Terminal atoms hanging off the same parent are
//! interchangeable, so only one of them is tried.

use petgraph::graph::NodeIndex;

use crate::mol::Mol;
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
};

/// Leaves explored before the search falls back to the first branch only.
const LEAF_BUDGET: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    /// Counts of single, double, triple and aromatic bonds.
    bond_types: [u8; 4],
}

fn bond_code<B: HasBondOrder>(bond: &B) -> u8 {
    if bond.is_aromatic_bond() {
        4
    } else {
        bond.bond_order().valence()
    }
}

fn atom_invariant<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> AtomInvariant
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let mut bond_types = [0u8; 4];
    for e in mol.bonds_of(idx) {
        let code = bond_code(mol.bond(e));
        bond_types[(code - 1) as usize] += 1;
    }
    AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: mol.degree(idx) as u8,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        is_aromatic: atom.is_aromatic(),
        isotope: atom.isotope(),
        bond_types,
    }
}

/// Rank of each item = number of items with a strictly smaller key.
fn ranks_from_keys<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; keys.len()];
    for i in 1..order.len() {
        ranks[order[i]] = if keys[order[i]] == keys[order[i - 1]] {
            ranks[order[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

struct Graph {
    labels: Vec<AtomInvariant>,
    adjacency: Vec<Vec<(usize, u8)>>,
}

impl Graph {
    fn new<A, B>(mol: &Mol<A, B>) -> Self
    where
        A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
        B: HasBondOrder,
    {
        let labels = mol.atoms().map(|a| atom_invariant(mol, a)).collect();
        let adjacency = mol
            .atoms()
            .map(|a| {
                mol.bonds_of(a)
                    .filter_map(|e| Some((mol.other_end(e, a)?.index(), bond_code(mol.bond(e)))))
                    .collect()
            })
            .collect();
        Self { labels, adjacency }
    }

    fn refine(&self, mut ranks: Vec<usize>) -> Vec<usize> {
        let mut classes = count_distinct(&ranks);
        loop {
            let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..ranks.len())
                .map(|i| {
                    let mut nbrs: Vec<(usize, u8)> = self.adjacency[i]
                        .iter()
                        .map(|&(j, code)| (ranks[j], code))
                        .collect();
                    nbrs.sort_unstable();
                    (ranks[i], nbrs)
                })
                .collect();
            ranks = ranks_from_keys(&keys);
            let next = count_distinct(&ranks);
            if next == classes {
                return ranks;
            }
            classes = next;
        }
    }

    fn individualize(&self, ranks: &[usize], atom: usize) -> Vec<usize> {
        let keys: Vec<(usize, bool)> = (0..ranks.len()).map(|i| (ranks[i], i != atom)).collect();
        self.refine(ranks_from_keys(&keys))
    }

    fn certificate(&self, ranks: &[usize]) -> Vec<(&AtomInvariant, Vec<(usize, u8)>)> {
        let mut order: Vec<usize> = (0..ranks.len()).collect();
        order.sort_by_key(|&i| ranks[i]);
        order
            .into_iter()
            .map(|i| {
                let mut nbrs: Vec<(usize, u8)> = self.adjacency[i]
                    .iter()
                    .map(|&(j, code)| (ranks[j], code))
                    .collect();
                nbrs.sort_unstable();
                (&self.labels[i], nbrs)
            })
            .collect()
    }

    /// Members of the lowest-ranked tied class, with interchangeable
    /// terminal atoms collapsed to one representative.
    fn target_cell(&self, ranks: &[usize]) -> Option<Vec<usize>> {
        let mut counts = vec![0usize; ranks.len()];
        for &r in ranks {
            counts[r] += 1;
        }
        let rank = (0..ranks.len()).find(|&r| counts[r] > 1)?;
        let mut seen_parents = Vec::new();
        let mut cell = Vec::new();
        for i in (0..ranks.len()).filter(|&i| ranks[i] == rank) {
            if let [(parent, _)] = self.adjacency[i].as_slice() {
                if seen_parents.contains(parent) {
                    continue;
                }
                seen_parents.push(*parent);
            }
            cell.push(i);
        }
        Some(cell)
    }

    fn search(&self, ranks: Vec<usize>, best: &mut Option<Vec<usize>>, leaves: &mut usize) {
        let Some(cell) = self.target_cell(&ranks) else {
            *leaves += 1;
            let better = match best {
                Some(current) => self.certificate(&ranks) < self.certificate(current),
                None => true,
            };
            if better {
                *best = Some(ranks);
            }
            return;
        };
        for (k, atom) in cell.into_iter().enumerate() {
            if k > 0 && *leaves >= LEAF_BUDGET {
                break;
            }
            let next = self.individualize(&ranks, atom);
            self.search(next, best, leaves);
        }
    }
}

/// Canonical rank (0..n) of every atom, indexed by atom index.
///
/// Two molecules that are the same graph up to atom order receive ranks that
/// map one onto the other.
pub fn canonical_ranks<A, B>(mol: &Mol<A, B>) -> Vec<usize>
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity + HasIsotope,
    B: HasBondOrder,
{
    if mol.atom_count() == 0 {
        return Vec::new();
    }
    let graph = Graph::new(mol);
    let initial = graph.refine(ranks_from_keys(&graph.labels));
    let mut best = None;
    let mut leaves = 0;
    graph.search(initial.clone(), &mut best, &mut leaves);
    best.unwrap_or(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn ranks(smiles: &str) -> Vec<usize> {
        canonical_ranks(&from_smiles(smiles).unwrap())
    }

    #[test]
    fn ranks_are_a_permutation() {
        for smiles in ["CCO", "c1ccccc1", "CC(C)(C)C", "C1CC2CCC1C2", "OC(=O)C(N)C"] {
            let mut r = ranks(smiles);
            r.sort_unstable();
            assert_eq!(r, (0..r.len()).collect::<Vec<_>>(), "{smiles}");
        }
    }

    #[test]
    fn reordered_input_gives_matching_labels() {
        let a = from_smiles("OCC").unwrap();
        let b = from_smiles("CCO").unwrap();
        let ra = canonical_ranks(&a);
        let rb = canonical_ranks(&b);
        let oxygen_a = a.atoms().find(|&i| a.atom(i).atomic_num == 8).unwrap();
        let oxygen_b = b.atoms().find(|&i| b.atom(i).atomic_num == 8).unwrap();
        assert_eq!(ra[oxygen_a.index()], rb[oxygen_b.index()]);
    }

    #[test]
    fn refinement_separates_chain_positions() {
        let r = ranks("CCCC");
        assert_ne!(r[0], r[1]);
        assert_ne!(r[1], r[2]);
    }

    #[test]
    fn ranks_from_keys_ties() {
        assert_eq!(ranks_from_keys(&[3, 1, 3, 2]), vec![2, 0, 2, 1]);
    }
}
