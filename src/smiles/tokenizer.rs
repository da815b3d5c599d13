use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken, usize),
    RingClosure { digit: u16, pos: usize },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    /// Stated hydrogen count; always `Some` for bracket atoms.
    pub hcount: Option<u8>,
    pub charge: i8,
    pub map_num: u16,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    /// `/` or `\`. Double-bond geometry is not kept, so these read as single.
    Directional,
}

/// Splits a SMILES string into tokens. Scanning stops at the first
/// whitespace character, which SMILES treats as the end of the string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        let ch = self.src[self.pos..].chars().next().unwrap_or('\0');
        SmilesError::UnexpectedChar { pos: self.pos, ch }
    }

    fn run(mut self) -> Result<Vec<Token>, SmilesError> {
        let mut tokens = Vec::new();
        while let Some(b) = self.peek() {
            let start = self.pos;
            let token = match b {
                b' ' | b'\t' | b'\r' | b'\n' => break,
                b'[' => Token::Atom(self.bracket_atom()?),
                b'(' => {
                    self.pos += 1;
                    Token::OpenParen(start)
                }
                b')' => {
                    self.pos += 1;
                    Token::CloseParen(start)
                }
                b'.' => {
                    self.pos += 1;
                    Token::Dot(start)
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    self.pos += 1;
                    let bond = match b {
                        b'-' => BondToken::Single,
                        b'=' => BondToken::Double,
                        b'#' => BondToken::Triple,
                        b':' => BondToken::Aromatic,
                        _ => BondToken::Directional,
                    };
                    Token::Bond(bond, start)
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    Token::RingClosure {
                        digit: (b - b'0') as u16,
                        pos: start,
                    }
                }
                b'%' => Token::RingClosure {
                    digit: self.percent_digit()?,
                    pos: start,
                },
                _ => Token::Atom(self.organic_atom()?),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn percent_digit(&mut self) -> Result<u16, SmilesError> {
        let start = self.pos;
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                self.pos += 3;
                Ok(((a - b'0') as u16) * 10 + (b - b'0') as u16)
            }
            _ => Err(SmilesError::UnexpectedChar {
                pos: start,
                ch: '%',
            }),
        }
    }

    fn organic_atom(&mut self) -> Result<AtomToken, SmilesError> {
        let start = self.pos;
        let two = (self.peek(), self.peek_at(1));
        let (element, aromatic, len) = match two {
            (Some(b'C'), Some(b'l')) => (Element::CL, false, 2),
            (Some(b'B'), Some(b'r')) => (Element::BR, false, 2),
            (Some(b'B'), _) => (Element::B, false, 1),
            (Some(b'C'), _) => (Element::C, false, 1),
            (Some(b'N'), _) => (Element::N, false, 1),
            (Some(b'O'), _) => (Element::O, false, 1),
            (Some(b'P'), _) => (Element::P, false, 1),
            (Some(b'S'), _) => (Element::S, false, 1),
            (Some(b'F'), _) => (Element::F, false, 1),
            (Some(b'I'), _) => (Element::I, false, 1),
            (Some(b'b'), _) => (Element::B, true, 1),
            (Some(b'c'), _) => (Element::C, true, 1),
            (Some(b'n'), _) => (Element::N, true, 1),
            (Some(b'o'), _) => (Element::O, true, 1),
            (Some(b'p'), _) => (Element::P, true, 1),
            (Some(b's'), _) => (Element::S, true, 1),
            (Some(b'*'), _) => (Element::WILDCARD, false, 1),
            _ => return Err(self.unexpected()),
        };
        self.pos += len;
        Ok(AtomToken {
            element,
            is_aromatic: aromatic,
            isotope: 0,
            hcount: None,
            charge: 0,
            map_num: 0,
            is_bracket: false,
            pos: start,
        })
    }

    fn bracket_atom(&mut self) -> Result<AtomToken, SmilesError> {
        let start = self.pos;
        self.pos += 1;

        let isotope = self.number().unwrap_or(0);
        let (element, is_aromatic) = self.bracket_element(start)?;
        self.skip_chirality();

        let hcount = if self.peek() == Some(b'H') {
            self.pos += 1;
            Some(self.number().unwrap_or(1) as u8)
        } else {
            Some(0)
        };

        let charge = self.charge(start)?;

        let map_num = if self.peek() == Some(b':') {
            self.pos += 1;
            self.number().ok_or_else(|| self.unexpected())?
        } else {
            0
        };

        match self.peek() {
            Some(b']') => self.pos += 1,
            Some(_) => return Err(self.unexpected()),
            None => return Err(SmilesError::UnclosedBracket { pos: start }),
        }

        Ok(AtomToken {
            element,
            is_aromatic,
            isotope,
            hcount,
            charge,
            map_num,
            is_bracket: true,
            pos: start,
        })
    }

    fn number(&mut self) -> Option<u16> {
        let mut value: Option<u16> = None;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            let next = value.unwrap_or(0).checked_mul(10)?.checked_add((d - b'0') as u16)?;
            value = Some(next);
            self.pos += 1;
        }
        value
    }

    fn bracket_element(&mut self, bracket: usize) -> Result<(Element, bool), SmilesError> {
        let rest = &self.src[self.pos..];
        if rest.is_empty() {
            return Err(SmilesError::UnclosedBracket { pos: bracket });
        }
        if rest.starts_with('*') {
            self.pos += 1;
            return Ok((Element::WILDCARD, false));
        }
        for (sym, atomic_num) in [("se", 34), ("te", 52), ("as", 33)] {
            if rest.starts_with(sym) {
                self.pos += 2;
                return Ok((Element::from_atomic_num(atomic_num).unwrap_or(Element::C), true));
            }
        }
        let first = rest.as_bytes()[0];
        if first.is_ascii_lowercase() {
            let upper = (first as char).to_ascii_uppercase().to_string();
            if let Some(element) = Element::from_symbol(&upper).filter(|e| e.can_be_aromatic()) {
                self.pos += 1;
                return Ok((element, true));
            }
        }
        if first.is_ascii_uppercase() {
            if let Some(two) = rest.get(..2) {
                if let Some(element) = Element::from_symbol(two) {
                    self.pos += 2;
                    return Ok((element, false));
                }
            }
            if let Some(element) = Element::from_symbol(&rest[..1]) {
                self.pos += 1;
                return Ok((element, false));
            }
        }
        Err(SmilesError::InvalidElement {
            pos: self.pos,
            text: rest.chars().take(2).collect(),
        })
    }

    fn skip_chirality(&mut self) {
        if self.peek() != Some(b'@') {
            return;
        }
        self.pos += 1;
        if self.peek() == Some(b'@') {
            self.pos += 1;
            return;
        }
        let class = self.src.get(self.pos..self.pos + 2);
        if matches!(class, Some("TH" | "AL" | "SP" | "TB" | "OH"))
            && self.peek_at(2).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 2;
            self.number();
        }
    }

    fn charge(&mut self, bracket: usize) -> Result<i8, SmilesError> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.bytes[self.pos];
        self.pos += 1;
        if let Some(n) = self.number() {
            let n = i8::try_from(n).map_err(|_| SmilesError::InvalidCharge { pos: bracket })?;
            return Ok(sign * n);
        }
        let mut count: i8 = 1;
        while self.peek() == Some(symbol) {
            self.pos += 1;
            count = count
                .checked_add(1)
                .ok_or(SmilesError::InvalidCharge { pos: bracket })?;
        }
        Ok(sign * count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(input: &str) -> Vec<AtomToken> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Atom(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn organic_subset_two_letter_symbols() {
        let a = atoms("ClCBr");
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].element, Element::CL);
        assert_eq!(a[1].element, Element::C);
        assert_eq!(a[2].element, Element::BR);
    }

    #[test]
    fn bracket_atom_fields() {
        let a = atoms("[13CH3+:7]");
        assert_eq!(a[0].isotope, 13);
        assert_eq!(a[0].hcount, Some(3));
        assert_eq!(a[0].charge, 1);
        assert_eq!(a[0].map_num, 7);
        assert!(a[0].is_bracket);
    }

    #[test]
    fn charges() {
        assert_eq!(atoms("[O-]")[0].charge, -1);
        assert_eq!(atoms("[Fe+++]")[0].charge, 3);
        assert_eq!(atoms("[Cu+2]")[0].charge, 2);
        assert_eq!(atoms("[O--]")[0].charge, -2);
    }

    #[test]
    fn chirality_is_skipped() {
        let a = atoms("N[C@@H](C)C(=O)O");
        assert_eq!(a[1].hcount, Some(1));
        let a = atoms("[C@TH2H](F)(Cl)Br");
        assert_eq!(a[0].hcount, Some(1));
    }

    #[test]
    fn aromatic_brackets() {
        let a = atoms("[nH]1cc[se]c1");
        assert!(a[0].is_aromatic);
        assert_eq!(a[0].element, Element::N);
        assert_eq!(a[3].element.symbol(), "Se");
        assert!(a[3].is_aromatic);
    }

    #[test]
    fn percent_ring_closure() {
        let tokens = tokenize("C%12CC%12").unwrap();
        assert!(tokens.contains(&Token::RingClosure { digit: 12, pos: 1 }));
    }

    #[test]
    fn whitespace_ends_input() {
        assert_eq!(atoms("CCO |LN:1:1.2|").len(), 3);
    }

    #[test]
    fn bad_input() {
        assert!(tokenize("[C").is_err());
        assert!(tokenize("X").is_err());
        assert!(tokenize("[Xx]").is_err());
        assert!(tokenize("C%1").is_err());
    }
}
