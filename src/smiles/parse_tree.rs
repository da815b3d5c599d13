use std::collections::HashMap;

use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

/// Atoms in input order plus the bonds between them, before any chemistry
/// is applied.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    pub atoms: Vec<AtomToken>,
    pub bonds: Vec<ParseBond>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBond {
    pub a: usize,
    pub b: usize,
    pub bond: Option<BondToken>,
}

struct OpenRing {
    atom: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree::default();
    let mut branches: Vec<usize> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending: Option<(BondToken, usize)> = None;
    let mut rings: HashMap<u16, OpenRing> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(atom) => {
                let idx = tree.atoms.len();
                tree.atoms.push(atom.clone());
                match current {
                    Some(prev) => tree.bonds.push(ParseBond {
                        a: prev,
                        b: idx,
                        bond: pending.take().map(|(b, _)| b),
                    }),
                    None => {
                        if let Some((_, pos)) = pending {
                            return Err(SmilesError::DanglingBond { pos });
                        }
                    }
                }
                current = Some(idx);
            }
            Token::Bond(bond, pos) => {
                if pending.is_some() || current.is_none() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '-' });
                }
                pending = Some((*bond, *pos));
            }
            Token::RingClosure { digit, pos } => {
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let bond = pending.take().map(|(b, _)| b);
                match rings.remove(digit) {
                    Some(open) => {
                        let bond = match (open.bond, bond) {
                            (Some(x), Some(y)) if x != y => {
                                return Err(SmilesError::RingBondConflict { digit: *digit })
                            }
                            (x, y) => x.or(y),
                        };
                        let duplicate = tree.bonds.iter().any(|pb| {
                            (pb.a == open.atom && pb.b == cur) || (pb.a == cur && pb.b == open.atom)
                        });
                        if open.atom == cur || duplicate {
                            return Err(SmilesError::DuplicateBond { digit: *digit });
                        }
                        tree.bonds.push(ParseBond {
                            a: open.atom,
                            b: cur,
                            bond,
                        });
                    }
                    None => {
                        rings.insert(*digit, OpenRing { atom: cur, bond });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                branches.push(cur);
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                current = Some(branches.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?);
            }
            Token::Dot(pos) => {
                if pending.is_some() || !branches.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                current = None;
            }
        }
    }

    if let Some((_, pos)) = pending {
        return Err(SmilesError::DanglingBond { pos });
    }
    if !branches.is_empty() {
        return Err(SmilesError::UnmatchedParen { pos: 0 });
    }
    if let Some(digit) = rings.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }
    if tree.atoms.is_empty() {
        return Err(SmilesError::EmptyInput);
    }

    Ok(tree)
}
