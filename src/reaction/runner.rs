use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::perceive;
use crate::kekulize::KekulizeError;
use crate::mol::Mol;
use crate::smarts::{AtomExpr, BondExpr, MatchContext};
use crate::substruct::{get_substruct_matches_in, AtomMapping, MAX_MATCHES};
use crate::valence::{check_valence, raw_bond_sum, ValenceError};

use super::error::ReactionError;
use super::Reaction;

const MAX_COMBINATIONS: usize = 10_000;

/// Why a single candidate product was discarded.
#[derive(Debug, Error)]
enum ProductError {
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Valence(#[from] ValenceError),
}

/// One reactant's share of a match combination.
struct Matched<'a> {
    mol: &'a Mol<Atom, Bond>,
    /// Target atoms covered by the template.
    atoms: HashSet<NodeIndex>,
    /// Target bonds covered by template bonds.
    bonds: HashSet<EdgeIndex>,
}

impl Reaction {
    /// Applies the reaction to one molecule per reactant template.
    ///
    /// Every combination of template matches yields one outcome holding
    /// one molecule per product template. Outcomes whose products cannot
    /// be kekulized or break valence rules are dropped. No match is an
    /// empty result, not an error.
    pub fn run(
        &self,
        reactants: &[&Mol<Atom, Bond>],
    ) -> Result<Vec<Vec<Mol<Atom, Bond>>>, ReactionError> {
        if reactants.len() != self.reactant_templates.len() {
            return Err(ReactionError::WrongReactantCount {
                expected: self.reactant_templates.len(),
                got: reactants.len(),
            });
        }

        let per_template: Vec<Vec<AtomMapping>> = self
            .reactant_templates
            .iter()
            .zip(reactants)
            .map(|(tmpl, mol)| {
                let ctx = MatchContext::new(mol);
                get_substruct_matches_in(&ctx, tmpl, MAX_MATCHES)
            })
            .collect();
        if per_template.iter().any(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::new();
        for combo in cartesian_product(&per_template, MAX_COMBINATIONS)? {
            match self.outcome(&combo, reactants) {
                Ok(products) => outcomes.push(products),
                Err(e) => log::debug!("dropping reaction outcome: {e}"),
            }
        }
        Ok(outcomes)
    }

    fn outcome(
        &self,
        combo: &[&AtomMapping],
        reactants: &[&Mol<Atom, Bond>],
    ) -> Result<Vec<Mol<Atom, Bond>>, ProductError> {
        let mut by_map: HashMap<u16, (usize, NodeIndex)> = HashMap::new();
        let mut matched = Vec::with_capacity(reactants.len());
        for (ri, (tmpl, mapping)) in self.reactant_templates.iter().zip(combo).enumerate() {
            let mol = reactants[ri];
            for q in tmpl.atoms() {
                if let Some(map_num) = tmpl.atom(q).map_num() {
                    by_map.insert(map_num, (ri, mapping[q.index()]));
                }
            }
            let bonds = tmpl
                .bonds()
                .filter_map(|e| {
                    let (qa, qb) = tmpl.bond_endpoints(e)?;
                    mol.bond_between(mapping[qa.index()], mapping[qb.index()])
                })
                .collect();
            matched.push(Matched {
                mol,
                atoms: mapping.iter().copied().collect(),
                bonds,
            });
        }

        self.product_templates
            .iter()
            .map(|tmpl| {
                let mut product = build_product(tmpl, &by_map, &matched);
                perceive(&mut product)?;
                check_valence(&product)?;
                Ok(product)
            })
            .collect()
    }
}

fn build_product(
    tmpl: &Mol<AtomExpr, BondExpr>,
    by_map: &HashMap<u16, (usize, NodeIndex)>,
    matched: &[Matched],
) -> Mol<Atom, Bond> {
    let mut product: Mol<Atom, Bond> = Mol::new();
    let mut copies: HashMap<(usize, NodeIndex), NodeIndex> = HashMap::new();
    let mut origin: Vec<Option<(usize, NodeIndex)>> = Vec::with_capacity(tmpl.atom_count());

    for q in tmpl.atoms() {
        let expr = tmpl.atom(q);
        let source = expr.map_num().and_then(|m| by_map.get(&m).copied());
        let atom = match source {
            Some((ri, t)) => mapped_atom(matched[ri].mol.atom(t), expr),
            None => new_atom(expr),
        };
        let idx = product.add_atom(atom);
        if let Some(key) = source {
            copies.insert(key, idx);
        }
        origin.push(source);
    }

    for e in tmpl.bonds() {
        let Some((qa, qb)) = tmpl.bond_endpoints(e) else {
            continue;
        };
        let reactant_bond = match (origin[qa.index()], origin[qb.index()]) {
            (Some((ra, ta)), Some((rb, tb))) if ra == rb => {
                let mol = matched[ra].mol;
                mol.bond_between(ta, tb).map(|re| mol.bond(re))
            }
            _ => None,
        };
        let both_lowercase =
            tmpl.atom(qa).is_aromatic_symbol() && tmpl.atom(qb).is_aromatic_symbol();
        let bond = product_bond(tmpl.bond(e), reactant_bond, both_lowercase);
        product.add_bond(qa, qb, bond);
    }

    carry_unmatched(&mut product, &mut copies, matched);

    for q in tmpl.atoms() {
        let Some((ri, t)) = origin[q.index()] else {
            continue;
        };
        let reactant = matched[ri].mol;
        let before = reactant.atom(t);
        if tmpl.atom(q).hydrogen_count().is_some() || !before.explicit_hydrogens {
            continue;
        }
        // a bracket atom keeps its hydrogens only while its bonding is unchanged
        let after = product.atom(q);
        if after.atomic_num != before.atomic_num
            || after.formal_charge != before.formal_charge
            || raw_bond_sum(&product, q) != raw_bond_sum(reactant, t)
        {
            product.atom_mut(q).explicit_hydrogens = false;
        }
    }

    product
}

/// Copies atoms and bonds reachable from mapped atoms without passing
/// through the template, so substituents outside the pattern survive.
fn carry_unmatched(
    product: &mut Mol<Atom, Bond>,
    copies: &mut HashMap<(usize, NodeIndex), NodeIndex>,
    matched: &[Matched],
) {
    let mut queue: VecDeque<(usize, NodeIndex)> = copies.keys().copied().collect();
    while let Some((ri, r_atom)) = queue.pop_front() {
        let side = &matched[ri];
        let Some(&p_atom) = copies.get(&(ri, r_atom)) else {
            continue;
        };
        for e in side.mol.bonds_of(r_atom) {
            if side.bonds.contains(&e) {
                continue;
            }
            let Some(nb) = side.mol.other_end(e, r_atom) else {
                continue;
            };
            let p_nb = match copies.get(&(ri, nb)) {
                Some(&existing) => existing,
                // matched but unmapped, or mapped to no product: deleted
                None if side.atoms.contains(&nb) => continue,
                None => {
                    let created = product.add_atom(side.mol.atom(nb).clone());
                    copies.insert((ri, nb), created);
                    queue.push_back((ri, nb));
                    created
                }
            };
            if product.bond_between(p_atom, p_nb).is_none() {
                product.add_bond(p_atom, p_nb, Bond::with_order(side.mol.bond(e).order));
            }
        }
    }
}

fn mapped_atom(reactant: &Atom, expr: &AtomExpr) -> Atom {
    let mut atom = reactant.clone();
    if let Some((atomic_num, _)) = expr.element() {
        atom.atomic_num = atomic_num;
    }
    if let Some(charge) = expr.charge() {
        atom.formal_charge = charge;
    }
    if let Some(isotope) = expr.isotope() {
        atom.isotope = isotope;
    }
    if let Some(h) = expr.hydrogen_count() {
        atom.hydrogen_count = h;
        atom.explicit_hydrogens = true;
    }
    atom
}

fn new_atom(expr: &AtomExpr) -> Atom {
    let mut atom = Atom::new(expr.element().map_or(0, |(n, _)| n));
    atom.formal_charge = expr.charge().unwrap_or(0);
    atom.isotope = expr.isotope().unwrap_or(0);
    atom.is_aromatic = expr.is_aromatic_symbol();
    if let Some(h) = expr.hydrogen_count() {
        atom.hydrogen_count = h;
        atom.explicit_hydrogens = true;
    }
    atom
}

/// Bond for a product template edge. Query-only bonds and aromatic bonds
/// between atoms that were already bonded inherit the reactant's Kekulé
/// order; new bonds follow what the template wrote.
fn product_bond(expr: &BondExpr, reactant: Option<&Bond>, both_lowercase: bool) -> Bond {
    match (expr.definite_bond(), reactant) {
        (Some(b), Some(r)) if b.is_aromatic && r.is_aromatic => Bond::with_order(r.order),
        (Some(b), _) => b,
        (None, Some(r)) => Bond::with_order(r.order),
        (None, None) if both_lowercase => Bond::aromatic(),
        (None, None) => Bond::single(),
    }
}

fn cartesian_product<T>(sets: &[Vec<T>], limit: usize) -> Result<Vec<Vec<&T>>, ReactionError> {
    let total = sets
        .iter()
        .try_fold(1usize, |acc, s| acc.checked_mul(s.len()))
        .filter(|&n| n <= limit)
        .ok_or(ReactionError::TooManyCombinations { limit })?;
    let mut out: Vec<Vec<&T>> = Vec::with_capacity(total);
    out.push(Vec::new());
    for set in sets {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                set.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item);
                    next
                })
            })
            .collect();
    }
    Ok(out)
}
