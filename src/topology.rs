//! Intra- versus intermolecular reading of a reaction pattern.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::reaction::{component_group, split_reaction, Reaction};
use crate::smarts::{AtomExpr, BondExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReactionTopology {
    /// Each reactant template consumes its own input molecule.
    Intermolecular { arity: usize },
    /// The whole reactant side is matched against one input molecule.
    Intramolecular,
}

impl ReactionTopology {
    /// Number of input molecules an application consumes.
    pub fn arity(self) -> usize {
        match self {
            ReactionTopology::Intermolecular { arity } => arity,
            ReactionTopology::Intramolecular => 1,
        }
    }
}

/// Classifies a parsed reaction.
///
/// Several top-level reactant templates make the reaction intermolecular.
/// A component group, or a single template whose mapped atoms gain, lose
/// or re-order a bond between them, makes it intramolecular. Anything else
/// is a one-reactant intermolecular reaction.
pub fn classify(reaction: &Reaction) -> ReactionTopology {
    let n = reaction.reactant_templates().len();
    if n >= 2 {
        return ReactionTopology::Intermolecular { arity: n };
    }
    if reaction.has_reactant_group() || rearranges_mapped_bonds(reaction) {
        ReactionTopology::Intramolecular
    } else {
        ReactionTopology::Intermolecular { arity: 1 }
    }
}

/// Reactant side wrapped into one component group, so every reactant
/// template is matched against the same molecule. Text that already has a
/// group, or does not split into sides, is returned unchanged.
pub fn merged_pattern(smarts: &str) -> String {
    let Ok((reactants, agents, products)) = split_reaction(smarts.trim()) else {
        return smarts.to_string();
    };
    if component_group(reactants).is_some() {
        return smarts.to_string();
    }
    format!("({reactants})>{agents}>{products}")
}

type MappedBonds = BTreeMap<(u16, u16), BondExpr>;

fn rearranges_mapped_bonds(reaction: &Reaction) -> bool {
    let before = mapped_bonds(reaction.reactant_templates());
    let after = mapped_bonds(reaction.product_templates());
    let shared: BTreeSet<u16> = map_numbers(reaction.reactant_templates())
        .intersection(&map_numbers(reaction.product_templates()))
        .copied()
        .collect();
    let relevant = |key: &(u16, u16)| shared.contains(&key.0) && shared.contains(&key.1);

    let formed_or_broken = before
        .keys()
        .filter(|k| relevant(k))
        .any(|k| !after.contains_key(k))
        || after
            .keys()
            .filter(|k| relevant(k))
            .any(|k| !before.contains_key(k));
    formed_or_broken
        || before.iter().any(|(k, expr)| {
            after
                .get(k)
                .is_some_and(|product| changes_order(expr, product.definite_bond()))
        })
}

/// A product bond without a stated order keeps the reactant's order.
fn changes_order(before: &BondExpr, after: Option<Bond>) -> bool {
    let Some(after) = after else {
        return false;
    };
    match before.definite_bond() {
        Some(b) => b.order != after.order || b.is_aromatic != after.is_aromatic,
        None => !matches!(
            (before, after.order),
            (BondExpr::SingleOrAromatic, BondOrder::Single)
        ),
    }
}

fn map_numbers(templates: &[Mol<AtomExpr, BondExpr>]) -> BTreeSet<u16> {
    templates
        .iter()
        .flat_map(|t| t.atoms().filter_map(|a| t.atom(a).map_num()))
        .collect()
}

/// Bonds between two mapped atoms, keyed by the ordered map-number pair.
fn mapped_bonds(templates: &[Mol<AtomExpr, BondExpr>]) -> MappedBonds {
    let mut out = MappedBonds::new();
    for t in templates {
        for e in t.bonds() {
            let Some((a, b)) = t.bond_endpoints(e) else {
                continue;
            };
            let (Some(ma), Some(mb)) = (t.atom(a).map_num(), t.atom(b).map_num()) else {
                continue;
            };
            out.insert((ma.min(mb), ma.max(mb)), t.bond(e).clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction::from_reaction_smarts;

    fn topology(smarts: &str) -> ReactionTopology {
        classify(&from_reaction_smarts(smarts).unwrap())
    }

    #[test]
    fn two_templates_are_intermolecular() {
        assert_eq!(
            topology("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]"),
            ReactionTopology::Intermolecular { arity: 2 }
        );
    }

    #[test]
    fn group_is_intramolecular() {
        assert_eq!(
            topology("([C:1][OH].[C:2][OH])>>[C:1][C:2]"),
            ReactionTopology::Intramolecular
        );
    }

    #[test]
    fn ring_closure_is_intramolecular() {
        assert_eq!(
            topology("[C:1]=[C:2][C:3][C:4][C:5][C:6]=[O:7]>>[C:1]1[C:2][C:3][C:4][C:5][C:6]1[OH:7]"),
            ReactionTopology::Intramolecular
        );
    }

    #[test]
    fn order_change_is_intramolecular() {
        assert_eq!(
            topology("[C:1][OH:2]>>[C:1]=[O:2]"),
            ReactionTopology::Intramolecular
        );
    }

    #[test]
    fn substituent_swap_is_one_reactant_intermolecular() {
        let t = topology("[c:1][Cl]>>[c:1][OH]");
        assert_eq!(t, ReactionTopology::Intermolecular { arity: 1 });
        assert_eq!(t.arity(), 1);
    }

    #[test]
    fn unstated_product_bond_is_not_a_change() {
        assert_eq!(
            topology("[C:1]=[C:2]>>[C:1]~[C:2]"),
            ReactionTopology::Intermolecular { arity: 1 }
        );
    }

    #[test]
    fn merged_pattern_wraps_reactants_once() {
        assert_eq!(
            merged_pattern("[C:1][OH:2]>>[C:1]=[O:2]"),
            "([C:1][OH:2])>>[C:1]=[O:2]"
        );
        assert_eq!(
            merged_pattern("([C:1].[C:2])>>[C:1][C:2]"),
            "([C:1].[C:2])>>[C:1][C:2]"
        );
        assert_eq!(merged_pattern("not a reaction"), "not a reaction");
    }

    #[test]
    fn merged_pattern_consumes_one_molecule() {
        let rxn = from_reaction_smarts(&merged_pattern("[C:1][OH:2]>>[C:1]=[O:2]")).unwrap();
        assert_eq!(rxn.reactant_templates().len(), 1);
        assert!(rxn.has_reactant_group());
    }
}
