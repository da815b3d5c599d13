use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::substruct::matches_anchored;

/// A SMARTS atom query.
///
/// Primitives test one property of a target atom; `And`, `Or` and `Not`
/// combine them.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// `*`, and anything that constrains nothing we model (chirality).
    True,
    /// `aromatic` is `None` for `#n`, `Some(true)` for lowercase symbols and
    /// `Some(false)` for uppercase ones.
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// `a`
    Aromatic,
    /// `A`
    Aliphatic,
    Isotope(u16),
    /// `D`: explicit connections.
    Degree(u8),
    /// `X`: connections including hydrogens.
    Connectivity(u8),
    /// `v`: bond-order sum including hydrogens.
    Valence(u8),
    /// `H`: total hydrogens.
    TotalH(u8),
    /// `h`: implicit hydrogens.
    ImplicitH(u8),
    /// `R` with no count.
    InRing,
    /// `R0`
    NotInRing,
    /// `Rn`: number of small rings the atom belongs to.
    RingMembership(u8),
    /// `rn`
    SmallestRing(u8),
    /// `xn`
    RingBondCount(u8),
    Charge(i8),
    /// `$(...)`: the atom is the first atom of a match of the inner pattern.
    Recursive(Box<Mol<AtomExpr, BondExpr>>),
    /// `:n`. Never constrains a match.
    MapClass(u16),
    And(Vec<AtomExpr>),
    Or(Vec<AtomExpr>),
    Not(Box<AtomExpr>),
}

/// A SMARTS bond query. An unwritten bond is [`BondExpr::SingleOrAromatic`].
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// `~`
    True,
    Single,
    Double,
    Triple,
    /// `:`
    Aromatic,
    /// `@`
    Ring,
    SingleOrAromatic,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

/// The molecule being searched, with ring data computed once per search.
pub struct MatchContext<'a> {
    pub mol: &'a Mol<Atom, Bond>,
    pub ring_info: RingInfo,
}

impl<'a> MatchContext<'a> {
    pub fn new(mol: &'a Mol<Atom, Bond>) -> Self {
        Self {
            mol,
            ring_info: RingInfo::new(mol),
        }
    }

    fn total_h(&self, idx: NodeIndex) -> u8 {
        let attached = self
            .mol
            .neighbors(idx)
            .filter(|&nb| self.mol.atom(nb).atomic_num == 1)
            .count() as u8;
        self.mol.atom(idx).hydrogen_count + attached
    }

    fn order_sum(&self, idx: NodeIndex) -> u8 {
        self.mol
            .bonds_of(idx)
            .map(|e| self.mol.bond(e).order.valence())
            .sum()
    }
}

impl AtomExpr {
    pub fn matches(&self, ctx: &MatchContext, idx: NodeIndex) -> bool {
        let atom = ctx.mol.atom(idx);
        match self {
            AtomExpr::True | AtomExpr::MapClass(_) => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => atom.atomic_num == *atomic_num && aromatic.is_none_or(|a| a == atom.is_aromatic),
            AtomExpr::Aromatic => atom.is_aromatic,
            AtomExpr::Aliphatic => !atom.is_aromatic,
            AtomExpr::Isotope(iso) => atom.isotope == *iso,
            AtomExpr::Degree(d) => ctx.mol.degree(idx) == *d as usize,
            AtomExpr::Connectivity(x) => {
                ctx.mol.degree(idx) + atom.hydrogen_count as usize == *x as usize
            }
            AtomExpr::Valence(v) => ctx.order_sum(idx) + atom.hydrogen_count == *v,
            AtomExpr::TotalH(h) => ctx.total_h(idx) == *h,
            AtomExpr::ImplicitH(h) => {
                let implicit = if atom.explicit_hydrogens {
                    0
                } else {
                    atom.hydrogen_count
                };
                implicit == *h
            }
            AtomExpr::InRing => ctx.ring_info.is_ring_atom(idx),
            AtomExpr::NotInRing => !ctx.ring_info.is_ring_atom(idx),
            AtomExpr::RingMembership(n) => ctx.ring_info.membership(idx) == *n,
            AtomExpr::SmallestRing(r) => {
                ctx.ring_info.smallest_ring_size(idx).unwrap_or(0) == *r as usize
            }
            AtomExpr::RingBondCount(x) => ctx.ring_info.ring_bond_count(idx) == *x,
            AtomExpr::Charge(c) => atom.formal_charge == *c,
            AtomExpr::Recursive(inner) => matches_anchored(ctx, inner, idx),
            AtomExpr::And(parts) => parts.iter().all(|p| p.matches(ctx, idx)),
            AtomExpr::Or(parts) => parts.iter().any(|p| p.matches(ctx, idx)),
            AtomExpr::Not(inner) => !inner.matches(ctx, idx),
        }
    }

    /// Top-level conjuncts: the expression itself, or the members of a
    /// top-level `And`.
    fn conjuncts(&self) -> &[AtomExpr] {
        match self {
            AtomExpr::And(parts) => parts,
            other => std::slice::from_ref(other),
        }
    }

    /// The atom-map class, if one is attached.
    pub fn map_num(&self) -> Option<u16> {
        self.conjuncts().iter().find_map(|p| match p {
            AtomExpr::MapClass(n) if *n > 0 => Some(*n),
            _ => None,
        })
    }

    /// Element stated unconditionally, with its aromaticity constraint.
    pub fn element(&self) -> Option<(u8, Option<bool>)> {
        self.conjuncts().iter().find_map(|p| match p {
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => Some((*atomic_num, *aromatic)),
            _ => None,
        })
    }

    pub fn charge(&self) -> Option<i8> {
        self.conjuncts().iter().find_map(|p| match p {
            AtomExpr::Charge(c) => Some(*c),
            _ => None,
        })
    }

    pub fn isotope(&self) -> Option<u16> {
        self.conjuncts().iter().find_map(|p| match p {
            AtomExpr::Isotope(i) => Some(*i),
            _ => None,
        })
    }

    pub fn hydrogen_count(&self) -> Option<u8> {
        self.conjuncts().iter().find_map(|p| match p {
            AtomExpr::TotalH(h) | AtomExpr::ImplicitH(h) => Some(*h),
            _ => None,
        })
    }

    /// Whether the atom was written as a lowercase (aromatic) symbol.
    pub fn is_aromatic_symbol(&self) -> bool {
        matches!(self.element(), Some((_, Some(true))))
            || self.conjuncts().iter().any(|p| *p == AtomExpr::Aromatic)
    }

    pub fn set_map_num(&mut self, map: u16) {
        let mut parts: Vec<AtomExpr> = self
            .conjuncts()
            .iter()
            .filter(|p| !matches!(p, AtomExpr::MapClass(_)))
            .cloned()
            .collect();
        if map > 0 {
            parts.push(AtomExpr::MapClass(map));
        }
        *self = match parts.len() {
            0 => AtomExpr::True,
            1 => parts.remove(0),
            _ => AtomExpr::And(parts),
        };
    }
}

impl BondExpr {
    pub fn matches(&self, ctx: &MatchContext, edge: EdgeIndex) -> bool {
        let bond = ctx.mol.bond(edge);
        match self {
            BondExpr::True => true,
            BondExpr::Single => !bond.is_aromatic && bond.order == BondOrder::Single,
            BondExpr::Double => !bond.is_aromatic && bond.order == BondOrder::Double,
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => bond.is_aromatic,
            BondExpr::Ring => ctx.ring_info.is_ring_bond(edge),
            BondExpr::SingleOrAromatic => bond.is_aromatic || bond.order == BondOrder::Single,
            BondExpr::And(parts) => parts.iter().all(|p| p.matches(ctx, edge)),
            BondExpr::Or(parts) => parts.iter().any(|p| p.matches(ctx, edge)),
            BondExpr::Not(inner) => !inner.matches(ctx, edge),
        }
    }

    /// The concrete bond this expression stands for when written in a
    /// reaction product, or `None` for a pure query such as `~` or `@`.
    pub fn definite_bond(&self) -> Option<Bond> {
        match self {
            BondExpr::Single => Some(Bond::single()),
            BondExpr::Double => Some(Bond::with_order(BondOrder::Double)),
            BondExpr::Triple => Some(Bond::with_order(BondOrder::Triple)),
            BondExpr::Aromatic => Some(Bond::aromatic()),
            BondExpr::And(parts) => parts.iter().find_map(BondExpr::definite_bond),
            _ => None,
        }
    }
}
