use std::fmt::Write as _;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ranks;
use crate::element::Element;
use crate::graph_ops::{clear_atom_maps, connected_components, fragments};
use crate::mol::Mol;
use crate::valence::implicit_hydrogens;

/// Writes SMILES in input atom order, keeping atom-map numbers.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    let order: Vec<usize> = (0..mol.atom_count()).collect();
    connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, &order, true))
        .collect::<Vec<_>>()
        .join(".")
}

/// Writes the canonical SMILES of a molecule.
///
/// Atom-map numbers are dropped. Each connected component is written from
/// its own canonical ranking, and the component strings are sorted, so the
/// result depends only on the molecule's constitution.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let mut mol = mol.clone();
    clear_atom_maps(&mut mol);
    let mut parts: Vec<String> = fragments(&mol)
        .iter()
        .map(|frag| {
            let ranks = canonical_ranks(frag);
            let atoms: Vec<NodeIndex> = frag.atoms().collect();
            write_fragment(frag, &atoms, &ranks, false)
        })
        .collect();
    parts.sort();
    parts.join(".")
}

struct Closure {
    opener: NodeIndex,
    closer: NodeIndex,
    bond: EdgeIndex,
}

struct Plan {
    children: Vec<Vec<NodeIndex>>,
    closures: Vec<Closure>,
}

fn plan(mol: &Mol<Atom, Bond>, start: NodeIndex, order: &[usize]) -> Plan {
    let mut plan = Plan {
        children: vec![Vec::new(); mol.atom_count()],
        closures: Vec::new(),
    };
    let mut visited = vec![false; mol.atom_count()];
    let mut handled = vec![false; mol.bond_count()];
    visit(mol, start, None, order, &mut visited, &mut handled, &mut plan);
    plan
}

fn visit(
    mol: &Mol<Atom, Bond>,
    atom: NodeIndex,
    via: Option<EdgeIndex>,
    order: &[usize],
    visited: &mut [bool],
    handled: &mut [bool],
    plan: &mut Plan,
) {
    visited[atom.index()] = true;
    let mut bonds: Vec<(NodeIndex, EdgeIndex)> = mol
        .bonds_of(atom)
        .filter(|&e| Some(e) != via)
        .filter_map(|e| Some((mol.other_end(e, atom)?, e)))
        .collect();
    bonds.sort_by_key(|(nb, _)| order[nb.index()]);

    for (nb, e) in bonds {
        if handled[e.index()] {
            continue;
        }
        handled[e.index()] = true;
        if visited[nb.index()] {
            plan.closures.push(Closure {
                opener: nb,
                closer: atom,
                bond: e,
            });
        } else {
            plan.children[atom.index()].push(nb);
            visit(mol, nb, Some(e), order, visited, handled, plan);
        }
    }
}

fn write_fragment(
    mol: &Mol<Atom, Bond>,
    component: &[NodeIndex],
    order: &[usize],
    keep_maps: bool,
) -> String {
    let Some(&start) = component.iter().min_by_key(|a| order[a.index()]) else {
        return String::new();
    };
    let plan = plan(mol, start, order);
    let mut writer = Writer {
        mol,
        order,
        plan: &plan,
        keep_maps,
        digit_of: vec![None; mol.bond_count()],
        // slot 0 is never handed out
        in_use: vec![true],
        out: String::new(),
    };
    writer.write(start, None);
    writer.out
}

struct Writer<'a> {
    mol: &'a Mol<Atom, Bond>,
    order: &'a [usize],
    plan: &'a Plan,
    keep_maps: bool,
    digit_of: Vec<Option<usize>>,
    in_use: Vec<bool>,
    out: String,
}

impl Writer<'_> {
    fn write(&mut self, atom: NodeIndex, parent: Option<NodeIndex>) {
        if let Some(p) = parent {
            self.write_bond(p, atom);
        }
        self.out.push_str(&write_atom(self.mol, atom, self.keep_maps));

        let plan = self.plan;
        let mut closing: Vec<&Closure> = plan
            .closures
            .iter()
            .filter(|c| c.closer == atom)
            .collect();
        closing.sort_by_key(|c| self.order[c.opener.index()]);
        let mut opening: Vec<&Closure> = plan
            .closures
            .iter()
            .filter(|c| c.opener == atom)
            .collect();
        opening.sort_by_key(|c| self.order[c.closer.index()]);

        let mut freed = Vec::new();
        for c in &closing {
            let digit = self.digit_of[c.bond.index()].unwrap_or(0);
            self.write_bond(c.opener, c.closer);
            push_ring_digit(&mut self.out, digit);
            freed.push(digit);
        }
        for c in &opening {
            let digit = match (1..self.in_use.len()).find(|&d| !self.in_use[d]) {
                Some(d) => d,
                None => {
                    self.in_use.push(false);
                    self.in_use.len() - 1
                }
            };
            self.in_use[digit] = true;
            self.digit_of[c.bond.index()] = Some(digit);
            push_ring_digit(&mut self.out, digit);
        }
        for digit in freed {
            if let Some(slot) = self.in_use.get_mut(digit) {
                *slot = false;
            }
        }

        let children = &plan.children[atom.index()];
        let last = children.len().saturating_sub(1);
        for (i, &child) in children.iter().enumerate() {
            if i < last {
                self.out.push('(');
                self.write(child, Some(atom));
                self.out.push(')');
            } else {
                self.write(child, Some(atom));
            }
        }
    }

    fn write_bond(&mut self, a: NodeIndex, b: NodeIndex) {
        let Some(e) = self.mol.bond_between(a, b) else {
            return;
        };
        let bond = self.mol.bond(e);
        if bond.is_aromatic {
            return;
        }
        match bond.order {
            BondOrder::Single => {
                if self.mol.atom(a).is_aromatic && self.mol.atom(b).is_aromatic {
                    self.out.push('-');
                }
            }
            BondOrder::Double => self.out.push('='),
            BondOrder::Triple => self.out.push('#'),
        }
    }
}

fn push_ring_digit(out: &mut String, digit: usize) {
    if digit < 10 {
        let _ = write!(out, "{digit}");
    } else {
        let _ = write!(out, "%{digit:02}");
    }
}

/// Hydrogen count a SMILES reader would infer for this atom written
/// without brackets, given how its bonds are written.
fn bare_hydrogens(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> u8 {
    let atom = mol.atom(idx);
    let mut sum = 0u8;
    let mut has_aromatic = false;
    for e in mol.bonds_of(idx) {
        let bond = mol.bond(e);
        if bond.is_aromatic {
            has_aromatic = true;
            sum += 1;
        } else {
            sum += bond.order.valence();
        }
    }
    implicit_hydrogens(atom.atomic_num, 0, atom.is_aromatic && has_aromatic, sum)
}

/// SMILES text for a single atom, bracketed only when necessary.
pub fn write_atom(mol: &Mol<Atom, Bond>, idx: NodeIndex, keep_map: bool) -> String {
    let atom = mol.atom(idx);
    let element = atom.element().unwrap_or(Element::WILDCARD);
    let map = if keep_map { atom.map_num } else { 0 };

    let symbol = if atom.is_aromatic && element.can_be_aromatic() {
        element.symbol().to_ascii_lowercase()
    } else {
        element.symbol().to_string()
    };

    let bare_ok = atom.formal_charge == 0
        && atom.isotope == 0
        && map == 0
        && if element == Element::WILDCARD {
            atom.hydrogen_count == 0
        } else {
            element.is_organic_subset() && atom.hydrogen_count == bare_hydrogens(mol, idx)
        };
    if bare_ok {
        return symbol;
    }

    let mut s = String::from("[");
    if atom.isotope > 0 {
        let _ = write!(s, "{}", atom.isotope);
    }
    s.push_str(&symbol);
    match atom.hydrogen_count {
        0 => {}
        1 => s.push('H'),
        n => {
            let _ = write!(s, "H{n}");
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => s.push('+'),
        -1 => s.push('-'),
        c if c > 0 => {
            let _ = write!(s, "+{c}");
        }
        c => {
            let _ = write!(s, "-{}", -(c as i16));
        }
    }
    if map > 0 {
        let _ = write!(s, ":{map}");
    }
    s.push(']');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn canon(s: &str) -> String {
        to_canonical_smiles(&from_smiles(s).unwrap())
    }

    #[test]
    fn same_molecule_different_spelling() {
        assert_eq!(canon("OCC"), canon("CCO"));
        assert_eq!(canon("C(C)O"), canon("CCO"));
        assert_eq!(canon("O=CC"), canon("CC=O"));
        assert_eq!(canon("C1=CC=CC=C1"), canon("c1ccccc1"));
        assert_eq!(canon("Oc1ccccc1"), canon("c1ccc(O)cc1"));
        assert_eq!(canon("c1ccc2ccccc2c1"), canon("C1=CC2=CC=CC=C2C=C1"));
    }

    #[test]
    fn different_molecules_differ() {
        assert_ne!(canon("CCO"), canon("COC"));
        assert_ne!(canon("CC=O"), canon("CCO"));
        assert_ne!(canon("Oc1ccccc1C"), canon("Oc1ccc(C)cc1"));
    }

    #[test]
    fn simple_outputs() {
        assert_eq!(canon("C"), "C");
        assert_eq!(canon("[NH4+]"), "[NH4+]");
        assert_eq!(canon("[O-]C=O"), canon("O=C[O-]"));
        assert_eq!(canon("c1cc[nH]c1").matches("[nH]").count(), 1);
    }

    #[test]
    fn idempotent() {
        for s in [
            "CCO",
            "c1ccccc1-c1ccccc1",
            "O=c1cccc[nH]1",
            "CC(=O)Oc1ccccc1C(=O)O",
            "C1CC2CCC1C2",
            "C[N+](C)(C)C.[Cl-]",
            "[13CH3]C#N",
            "C1CCCCCCCCCCC1",
        ] {
            let once = canon(s);
            assert_eq!(canon(&once), once, "{s}");
        }
    }

    #[test]
    fn fragments_are_sorted() {
        assert_eq!(canon("O.C"), canon("C.O"));
        assert_eq!(canon("O.C"), "C.O");
    }

    #[test]
    fn maps_are_kept_or_dropped() {
        let mol = from_smiles("[CH3:1][OH:2]").unwrap();
        assert_eq!(to_smiles(&mol), "[CH3:1][OH:2]");
        assert_eq!(to_canonical_smiles(&mol), "CO");
    }

    #[test]
    fn ring_digits_are_reused() {
        let mol = from_smiles("C1CC1C1CC1").unwrap();
        assert_eq!(to_smiles(&mol), "C1CC1C1CC1");
    }

    #[test]
    fn aromatic_neighbors_joined_by_single_bond() {
        assert!(canon("c1ccccc1-c1ccccc1").contains("-"));
    }
}
