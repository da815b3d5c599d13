use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::element::Element;
use crate::mol::Mol;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

/// Lowercase symbols accepted for aromatic atoms, longest first.
const AROMATIC_SYMBOLS: &[(&str, u8)] = &[
    ("se", 34),
    ("as", 33),
    ("te", 52),
    ("b", 5),
    ("c", 6),
    ("n", 7),
    ("o", 8),
    ("p", 15),
    ("s", 16),
];

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

struct Open {
    atom: NodeIndex,
    bond: Option<BondExpr>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmartsError {
        match self.input[self.pos..].chars().next() {
            Some(ch) => SmartsError::UnexpectedChar { pos: self.pos, ch },
            None => SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "unexpected end of input".into(),
            },
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input[start..self.pos].parse().ok()
    }

    fn small_number(&mut self, default: u8) -> Result<u8, SmartsError> {
        let start = self.pos;
        match self.number() {
            None => Ok(default),
            Some(n) => u8::try_from(n).map_err(|_| SmartsError::InvalidSmarts {
                pos: start,
                msg: format!("count {n} out of range"),
            }),
        }
    }

    fn parse_pattern(&mut self) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
        let mut mol = Mol::new();
        let mut branches: Vec<(NodeIndex, usize)> = Vec::new();
        let mut current: Option<NodeIndex> = None;
        let mut pending: Option<BondExpr> = None;
        let mut rings: HashMap<u16, Open> = HashMap::new();

        while let Some(b) = self.peek() {
            match b {
                b'(' => {
                    let Some(cur) = current else {
                        return Err(SmartsError::UnmatchedParen { pos: self.pos });
                    };
                    if pending.is_some() {
                        return Err(self.unexpected());
                    }
                    branches.push((cur, self.pos));
                    self.pos += 1;
                }
                b')' => {
                    let Some((atom, _)) = branches.pop() else {
                        return Err(SmartsError::UnmatchedParen { pos: self.pos });
                    };
                    if pending.is_some() {
                        return Err(self.unexpected());
                    }
                    current = Some(atom);
                    self.pos += 1;
                }
                b'.' => {
                    if pending.is_some() || !branches.is_empty() {
                        return Err(self.unexpected());
                    }
                    current = None;
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b'~' | b':' | b'@' | b'/' | b'\\' | b'!' => {
                    if current.is_none() || pending.is_some() {
                        return Err(self.unexpected());
                    }
                    pending = Some(self.bond_expr()?);
                }
                b'0'..=b'9' | b'%' => {
                    let Some(cur) = current else {
                        return Err(self.unexpected());
                    };
                    let digit = self.ring_digit()?;
                    match rings.remove(&digit) {
                        Some(open) => {
                            if open.atom == cur || mol.bond_between(open.atom, cur).is_some() {
                                return Err(SmartsError::InvalidSmarts {
                                    pos: self.pos,
                                    msg: format!("ring closure {digit} duplicates a bond"),
                                });
                            }
                            let bond = pending
                                .take()
                                .or(open.bond)
                                .unwrap_or(BondExpr::SingleOrAromatic);
                            mol.add_bond(open.atom, cur, bond);
                        }
                        None => {
                            rings.insert(
                                digit,
                                Open {
                                    atom: cur,
                                    bond: pending.take(),
                                },
                            );
                        }
                    }
                }
                _ => {
                    let expr = if b == b'[' {
                        self.bracket_atom()?
                    } else {
                        self.bare_atom()?
                    };
                    let idx = mol.add_atom(expr);
                    if let Some(prev) = current {
                        let bond = pending.take().unwrap_or(BondExpr::SingleOrAromatic);
                        mol.add_bond(prev, idx, bond);
                    }
                    current = Some(idx);
                }
            }
        }

        if let Some(&(_, pos)) = branches.last() {
            return Err(SmartsError::UnmatchedParen { pos });
        }
        if pending.is_some() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "bond without a following atom".into(),
            });
        }
        if let Some(digit) = rings.keys().min() {
            return Err(SmartsError::UnclosedRing { digit: *digit });
        }
        if mol.atom_count() == 0 {
            return Err(SmartsError::EmptyInput);
        }
        Ok(mol)
    }

    fn ring_digit(&mut self) -> Result<u16, SmartsError> {
        if self.peek() == Some(b'%') {
            let start = self.pos;
            self.pos += 1;
            let (Some(d1), Some(d2)) = (self.peek(), self.peek_at(1)) else {
                return Err(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected two digits after %".into(),
                });
            };
            if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
                return Err(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected two digits after %".into(),
                });
            }
            self.pos += 2;
            return Ok(u16::from(d1 - b'0') * 10 + u16::from(d2 - b'0'));
        }
        let d = self.bytes[self.pos] - b'0';
        self.pos += 1;
        Ok(u16::from(d))
    }

    fn bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let rest = &self.input[self.pos..];
        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                return Ok(AtomExpr::True);
            }
            Some(b'a') => {
                self.pos += 1;
                return Ok(AtomExpr::Aromatic);
            }
            Some(b'A') => {
                self.pos += 1;
                return Ok(AtomExpr::Aliphatic);
            }
            _ => {}
        }
        for sym in ["Cl", "Br", "B", "C", "N", "O", "P", "S", "F", "I"] {
            if rest.starts_with(sym) {
                if let Some(el) = Element::from_symbol(sym) {
                    self.pos += sym.len();
                    return Ok(AtomExpr::Element {
                        atomic_num: el.atomic_num(),
                        aromatic: Some(false),
                    });
                }
            }
        }
        for &(sym, num) in &AROMATIC_SYMBOLS[3..] {
            if rest.starts_with(sym) {
                self.pos += sym.len();
                return Ok(AtomExpr::Element {
                    atomic_num: num,
                    aromatic: Some(true),
                });
            }
        }
        Err(self.unexpected())
    }

    fn bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let open = self.pos;
        self.pos += 1;
        let mut expr = self.atom_low(open)?;
        if self.peek() == Some(b':') {
            self.pos += 1;
            let start = self.pos;
            let map = self
                .number()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected atom-map number".into(),
                })?;
            let mut parts = vec![expr, AtomExpr::MapClass(map)];
            if matches!(self.peek(), Some(b';' | b'&')) {
                self.pos += 1;
                parts.push(self.atom_low(open)?);
            }
            expr = flatten_and(parts);
        }
        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(expr)
            }
            None => Err(SmartsError::UnclosedBracket { pos: open }),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// `;`-separated conjunction, the loosest binding operator.
    fn atom_low(&mut self, open: usize) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.atom_or(open)?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            parts.push(self.atom_or(open)?);
        }
        Ok(flatten_and(parts))
    }

    fn atom_or(&mut self, open: usize) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.atom_and(open)?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            parts.push(self.atom_and(open)?);
        }
        Ok(flatten_or(parts))
    }

    /// `&` and implicit juxtaposition.
    fn atom_and(&mut self, open: usize) -> Result<AtomExpr, SmartsError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None => return Err(SmartsError::UnclosedBracket { pos: open }),
                Some(b']' | b',' | b';' | b':') => break,
                Some(b'&') => self.pos += 1,
                Some(_) => {
                    let first = self.only_isotope_since(open);
                    parts.push(self.atom_not(open, first)?);
                }
            }
        }
        if parts.is_empty() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "empty atom expression".into(),
            });
        }
        Ok(flatten_and(parts))
    }

    fn atom_not(&mut self, open: usize, first: bool) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            return Ok(AtomExpr::Not(Box::new(self.atom_not(open, false)?)));
        }
        self.primitive(first)
    }

    fn only_isotope_since(&self, open: usize) -> bool {
        self.bytes[open + 1..self.pos]
            .iter()
            .all(|b| b.is_ascii_digit())
    }

    fn primitive(&mut self, first: bool) -> Result<AtomExpr, SmartsError> {
        let Some(b) = self.peek() else {
            return Err(self.unexpected());
        };
        let next_lower = self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase());
        match b {
            b'*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            b'a' if self.peek_at(1) != Some(b's') => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            b'A' if !next_lower || self.two_letter_element().is_none() => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            b'#' => {
                self.pos += 1;
                let start = self.pos;
                match self.number() {
                    Some(n @ 1..=118) => Ok(AtomExpr::Element {
                        atomic_num: n as u8,
                        aromatic: None,
                    }),
                    _ => Err(SmartsError::InvalidAtomicNum { pos: start }),
                }
            }
            b'0'..=b'9' => {
                let start = self.pos;
                let n = self.number().unwrap_or(0);
                u16::try_from(n)
                    .map(AtomExpr::Isotope)
                    .map_err(|_| SmartsError::InvalidSmarts {
                        pos: start,
                        msg: format!("isotope {n} out of range"),
                    })
            }
            b'H' if first && !next_lower => {
                self.pos += 1;
                Ok(AtomExpr::Element {
                    atomic_num: 1,
                    aromatic: Some(false),
                })
            }
            b'D' | b'X' | b'H' | b'R' if !next_lower || self.two_letter_element().is_none() => {
                self.pos += 1;
                Ok(match b {
                    b'D' => AtomExpr::Degree(self.small_number(1)?),
                    b'X' => AtomExpr::Connectivity(self.small_number(1)?),
                    b'H' => AtomExpr::TotalH(self.small_number(1)?),
                    _ => match self.number() {
                        None => AtomExpr::InRing,
                        Some(0) => AtomExpr::NotInRing,
                        Some(n) => AtomExpr::RingMembership(n.min(255) as u8),
                    },
                })
            }
            b'h' => {
                self.pos += 1;
                Ok(AtomExpr::ImplicitH(self.small_number(1)?))
            }
            b'v' => {
                self.pos += 1;
                Ok(AtomExpr::Valence(self.small_number(1)?))
            }
            b'x' => {
                self.pos += 1;
                Ok(AtomExpr::RingBondCount(self.small_number(1)?))
            }
            b'r' => {
                self.pos += 1;
                Ok(match self.number() {
                    None => AtomExpr::InRing,
                    Some(0) => AtomExpr::NotInRing,
                    Some(n) => AtomExpr::SmallestRing(n.min(255) as u8),
                })
            }
            b'+' | b'-' => Ok(AtomExpr::Charge(self.charge()?)),
            b'@' => {
                // chirality is accepted and ignored
                self.pos += 1;
                if self.peek() == Some(b'@') {
                    self.pos += 1;
                }
                for tag in ["TH", "AL", "SP", "TB", "OH"] {
                    if self.input[self.pos..].starts_with(tag) {
                        self.pos += 2;
                        self.number();
                        break;
                    }
                }
                if self.peek() == Some(b'?') {
                    self.pos += 1;
                }
                Ok(AtomExpr::True)
            }
            b'$' => {
                if self.peek_at(1) != Some(b'(') {
                    return Err(SmartsError::UnclosedRecursive { pos: self.pos });
                }
                let inner = self.balanced_parens()?;
                Ok(AtomExpr::Recursive(Box::new(parse(inner)?)))
            }
            b'A'..=b'Z' => self.uppercase_element(),
            b'a'..=b'z' => self.aromatic_element(),
            _ => Err(self.unexpected()),
        }
    }

    fn two_letter_element(&self) -> Option<Element> {
        let sym = self.input.get(self.pos..self.pos + 2)?;
        // `[NH]`-style hydrogen counts read as N then h, not nihonium
        if sym == "Nh" {
            return None;
        }
        Element::from_symbol(sym)
    }

    fn uppercase_element(&mut self) -> Result<AtomExpr, SmartsError> {
        if let Some(el) = self.two_letter_element() {
            self.pos += 2;
            return Ok(AtomExpr::Element {
                atomic_num: el.atomic_num(),
                aromatic: Some(false),
            });
        }
        let sym = self.input.get(self.pos..self.pos + 1).unwrap_or("");
        match Element::from_symbol(sym) {
            Some(el) => {
                self.pos += 1;
                Ok(AtomExpr::Element {
                    atomic_num: el.atomic_num(),
                    aromatic: Some(false),
                })
            }
            None => Err(self.unexpected()),
        }
    }

    fn aromatic_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let rest = &self.input[self.pos..];
        for &(sym, num) in AROMATIC_SYMBOLS {
            if rest.starts_with(sym) {
                self.pos += sym.len();
                return Ok(AtomExpr::Element {
                    atomic_num: num,
                    aromatic: Some(true),
                });
            }
        }
        Err(self.unexpected())
    }

    /// `+`, `++`, `+2`, and the negative forms.
    fn charge(&mut self) -> Result<i8, SmartsError> {
        let sign = self.bytes[self.pos];
        let start = self.pos;
        self.pos += 1;
        let mut magnitude: u32 = 1;
        if let Some(n) = self.number() {
            magnitude = n;
        } else {
            while self.peek() == Some(sign) {
                self.pos += 1;
                magnitude += 1;
            }
        }
        let value = i8::try_from(magnitude).map_err(|_| SmartsError::InvalidSmarts {
            pos: start,
            msg: "charge out of range".into(),
        })?;
        Ok(if sign == b'-' { -value } else { value })
    }

    /// Consumes `$( ... )` and returns the text between the parentheses.
    fn balanced_parens(&mut self) -> Result<&'a str, SmartsError> {
        let start = self.pos;
        self.pos += 2;
        let inner_start = self.pos;
        let mut depth = 1usize;
        while let Some(b) = self.peek() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &self.input[inner_start..self.pos];
                        self.pos += 1;
                        return Ok(inner);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(SmartsError::UnclosedRecursive { pos: start })
    }

    fn bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let mut low = vec![self.bond_comma()?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            low.push(self.bond_comma()?);
        }
        Ok(bond_and(low))
    }

    fn bond_comma(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.bond_high()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            parts.push(self.bond_high()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            BondExpr::Or(parts)
        })
    }

    fn bond_high(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.bond_not()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    parts.push(self.bond_not()?);
                }
                Some(b'-' | b'=' | b'#' | b'~' | b':' | b'@' | b'/' | b'\\' | b'!') => {
                    parts.push(self.bond_not()?);
                }
                _ => break,
            }
        }
        Ok(bond_and(parts))
    }

    fn bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            return Ok(BondExpr::Not(Box::new(self.bond_not()?)));
        }
        let expr = match self.peek() {
            Some(b'-' | b'/' | b'\\') => BondExpr::Single,
            Some(b'=') => BondExpr::Double,
            Some(b'#') => BondExpr::Triple,
            Some(b'~') => BondExpr::True,
            Some(b':') => BondExpr::Aromatic,
            Some(b'@') => BondExpr::Ring,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(expr)
    }
}

fn bond_and(mut parts: Vec<BondExpr>) -> BondExpr {
    if parts.len() == 1 {
        parts.remove(0)
    } else {
        BondExpr::And(parts)
    }
}

fn flatten_and(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p {
            AtomExpr::And(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else {
        AtomExpr::And(flat)
    }
}

fn flatten_or(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flat = Vec::with_capacity(parts.len());
    for p in parts {
        match p {
            AtomExpr::Or(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if flat.len() == 1 {
        flat.remove(0)
    } else {
        AtomExpr::Or(flat)
    }
}

pub fn parse(input: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser::new(trimmed).parse_pattern()
}
