//! Backtracking substructure search for SMARTS queries.
//!
//! Query atoms are visited breadth-first within each connected component,
//! so every atom after the first of a component has an already-mapped
//! parent and only that parent's target neighbors need to be tried.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::smarts::{AtomExpr, BondExpr, MatchContext};

/// Target atom for each query atom, indexed by query atom index.
pub type AtomMapping = Vec<NodeIndex>;

/// Upper bound on matches collected by a single search.
pub const MAX_MATCHES: usize = 1000;

pub fn has_substruct_match(target: &Mol<Atom, Bond>, query: &Mol<AtomExpr, BondExpr>) -> bool {
    let ctx = MatchContext::new(target);
    let mut search = Search::new(&ctx, query, 1);
    search.run();
    !search.results.is_empty()
}

/// Every embedding of `query` in `target`, up to [`MAX_MATCHES`].
pub fn get_substruct_matches(
    target: &Mol<Atom, Bond>,
    query: &Mol<AtomExpr, BondExpr>,
) -> Vec<AtomMapping> {
    let ctx = MatchContext::new(target);
    get_substruct_matches_in(&ctx, query, MAX_MATCHES)
}

pub fn get_substruct_matches_in(
    ctx: &MatchContext,
    query: &Mol<AtomExpr, BondExpr>,
    limit: usize,
) -> Vec<AtomMapping> {
    if query.atom_count() == 0 {
        return Vec::new();
    }
    let mut search = Search::new(ctx, query, limit);
    search.run();
    if search.truncated {
        log::debug!("substructure search stopped after {limit} matches");
    }
    search.results
}

/// Whether `query` embeds with its first atom on `anchor`.
pub fn matches_anchored(ctx: &MatchContext, query: &Mol<AtomExpr, BondExpr>, anchor: NodeIndex) -> bool {
    if query.atom_count() == 0 {
        return false;
    }
    let mut search = Search::new(ctx, query, 1);
    search.anchor = Some(anchor);
    search.run();
    !search.results.is_empty()
}

struct Step {
    atom: NodeIndex,
    parent: Option<NodeIndex>,
}

fn visit_order(query: &Mol<AtomExpr, BondExpr>, first: Option<NodeIndex>) -> Vec<Step> {
    let mut seen = vec![false; query.atom_count()];
    let mut steps = Vec::with_capacity(query.atom_count());
    let mut starts: Vec<NodeIndex> = query.atoms().collect();
    starts.sort_by_key(|&a| (std::cmp::Reverse(query.degree(a)), a.index()));
    if let Some(first) = first {
        starts.insert(0, first);
    }
    for start in starts {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut queue = VecDeque::from([(start, None)]);
        while let Some((atom, parent)) = queue.pop_front() {
            steps.push(Step { atom, parent });
            let mut next: Vec<NodeIndex> = query
                .neighbors(atom)
                .filter(|nb| !seen[nb.index()])
                .collect();
            next.sort_by_key(|&a| (std::cmp::Reverse(query.degree(a)), a.index()));
            for nb in next {
                seen[nb.index()] = true;
                queue.push_back((nb, Some(atom)));
            }
        }
    }
    steps
}

struct Search<'a, 'c> {
    ctx: &'a MatchContext<'c>,
    query: &'a Mol<AtomExpr, BondExpr>,
    steps: Vec<Step>,
    anchor: Option<NodeIndex>,
    mapping: Vec<Option<NodeIndex>>,
    used: Vec<bool>,
    limit: usize,
    truncated: bool,
    results: Vec<AtomMapping>,
}

impl<'a, 'c> Search<'a, 'c> {
    fn new(ctx: &'a MatchContext<'c>, query: &'a Mol<AtomExpr, BondExpr>, limit: usize) -> Self {
        Self {
            ctx,
            query,
            steps: Vec::new(),
            anchor: None,
            mapping: vec![None; query.atom_count()],
            used: vec![false; ctx.mol.atom_count()],
            limit,
            truncated: false,
            results: Vec::new(),
        }
    }

    fn run(&mut self) {
        let first = self.anchor.map(|_| NodeIndex::new(0));
        self.steps = visit_order(self.query, first);
        self.extend(0);
    }

    fn done(&self) -> bool {
        self.results.len() >= self.limit
    }

    fn candidates(&self, depth: usize) -> Vec<NodeIndex> {
        let step = &self.steps[depth];
        if depth == 0 {
            if let Some(anchor) = self.anchor {
                return vec![anchor];
            }
        }
        match step.parent.and_then(|p| self.mapping[p.index()]) {
            Some(t_parent) => self.ctx.mol.neighbors(t_parent).collect(),
            None => self.ctx.mol.atoms().collect(),
        }
    }

    fn extend(&mut self, depth: usize) {
        if depth == self.steps.len() {
            let mapping: Option<AtomMapping> = self.mapping.iter().copied().collect();
            if let Some(mapping) = mapping {
                if !self.results.contains(&mapping) {
                    self.results.push(mapping);
                }
            }
            return;
        }
        let q_atom = self.steps[depth].atom;
        for t_atom in self.candidates(depth) {
            if self.done() {
                self.truncated = true;
                return;
            }
            if self.used[t_atom.index()] || !self.feasible(q_atom, t_atom) {
                continue;
            }
            self.mapping[q_atom.index()] = Some(t_atom);
            self.used[t_atom.index()] = true;
            self.extend(depth + 1);
            self.mapping[q_atom.index()] = None;
            self.used[t_atom.index()] = false;
        }
    }

    fn feasible(&self, q_atom: NodeIndex, t_atom: NodeIndex) -> bool {
        if !self.query.atom(q_atom).matches(self.ctx, t_atom) {
            return false;
        }
        for q_edge in self.query.bonds_of(q_atom) {
            let Some(q_nb) = self.query.other_end(q_edge, q_atom) else {
                continue;
            };
            let Some(t_nb) = self.mapping[q_nb.index()] else {
                continue;
            };
            match self.ctx.mol.bond_between(t_atom, t_nb) {
                Some(t_edge) if self.query.bond(q_edge).matches(self.ctx, t_edge) => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smarts::from_smarts;
    use crate::smiles::from_smiles;

    fn count(smarts: &str, smiles: &str) -> usize {
        get_substruct_matches(&from_smiles(smiles).unwrap(), &from_smarts(smarts).unwrap()).len()
    }

    #[test]
    fn hydroxyl_in_ethanol() {
        let mol = from_smiles("CCO").unwrap();
        let query = from_smarts("[C:1][OH:2]").unwrap();
        let matches = get_substruct_matches(&mol, &query);
        assert_eq!(matches, vec![vec![NodeIndex::new(1), NodeIndex::new(2)]]);
    }

    #[test]
    fn symmetric_matches_are_all_reported() {
        assert_eq!(count("CC", "CCC"), 4);
        assert_eq!(count("c1ccccc1", "c1ccccc1"), 12);
    }

    #[test]
    fn aromatic_and_aliphatic_bonds() {
        assert_eq!(count("C=C", "c1ccccc1"), 0);
        assert_eq!(count("c:c", "c1ccccc1"), 12);
        assert_eq!(count("C=O", "CC(=O)O"), 1);
    }

    #[test]
    fn disconnected_queries() {
        assert_eq!(count("O.O", "OCCO"), 2);
        assert_eq!(count("N.O", "OCCO"), 0);
    }

    #[test]
    fn no_match() {
        assert!(!has_substruct_match(
            &from_smiles("CCC").unwrap(),
            &from_smarts("C=O").unwrap()
        ));
        assert!(has_substruct_match(
            &from_smiles("CC=O").unwrap(),
            &from_smarts("[CX3]=O").unwrap()
        ));
    }

    #[test]
    fn anchored() {
        let mol = from_smiles("OCC=O").unwrap();
        let ctx = MatchContext::new(&mol);
        let query = from_smarts("C=O").unwrap();
        assert!(matches_anchored(&ctx, &query, NodeIndex::new(2)));
        assert!(!matches_anchored(&ctx, &query, NodeIndex::new(1)));
    }
}
