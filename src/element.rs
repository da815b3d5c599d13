/// Element symbols indexed by atomic number. Index 0 is the wildcard `*`.
static SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// A chemical element identified by atomic number.
///
/// Atomic number 0 is reserved for the SMILES/SMARTS wildcard atom `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub const WILDCARD: Element = Element(0);
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const BR: Element = Element(35);
    pub const I: Element = Element(53);

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        if (n as usize) < SYMBOLS.len() {
            Some(Element(n))
        } else {
            None
        }
    }

    /// Looks up an element by its case-sensitive symbol (`"Cl"`, not `"CL"`).
    pub fn from_symbol(symbol: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .skip(1)
            .position(|s| *s == symbol)
            .map(|i| Element(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self.0 as usize]
    }

    /// Allowed valences in increasing order, used to derive implicit
    /// hydrogens. Empty for elements without a conventional valence model.
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 => &[3],
            6 => &[4],
            7 => &[3, 5],
            8 => &[2],
            9 | 17 | 35 => &[1],
            14 | 32 => &[4],
            15 | 33 => &[3, 5],
            16 | 34 | 52 => &[2, 4, 6],
            53 => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Elements that may appear unbracketed in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// Elements that may be written in lowercase aromatic form.
    pub fn can_be_aromatic(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
    }

    /// Periodic-table main group (1, 2, 13..=18), or `None` for transition
    /// metals, lanthanides and actinides.
    pub fn main_group(self) -> Option<u8> {
        match self.0 {
            1 | 3 | 11 | 19 | 37 | 55 | 87 => Some(1),
            4 | 12 | 20 | 38 | 56 | 88 => Some(2),
            5 | 13 | 31 | 49 | 81 | 113 => Some(13),
            6 | 14 | 32 | 50 | 82 | 114 => Some(14),
            7 | 15 | 33 | 51 | 83 | 115 => Some(15),
            8 | 16 | 34 | 52 | 84 | 116 => Some(16),
            9 | 17 | 35 | 53 | 85 | 117 => Some(17),
            2 | 10 | 18 | 36 | 54 | 86 | 118 => Some(18),
            _ => None,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_lookup_is_case_sensitive() {
        assert_eq!(Element::from_symbol("Cl"), Some(Element::CL));
        assert_eq!(Element::from_symbol("CL"), None);
        assert_eq!(Element::from_symbol("*"), None);
    }

    #[test]
    fn symbols_match_atomic_numbers() {
        assert_eq!(Element::C.symbol(), "C");
        assert_eq!(Element::from_atomic_num(26).map(|e| e.symbol()), Some("Fe"));
        assert_eq!(Element::from_atomic_num(118).map(|e| e.symbol()), Some("Og"));
        assert_eq!(Element::from_atomic_num(119), None);
    }

    #[test]
    fn valence_tables() {
        assert_eq!(Element::N.default_valences(), &[3, 5]);
        assert_eq!(Element::S.default_valences(), &[2, 4, 6]);
        assert!(Element::from_symbol("Fe").unwrap().default_valences().is_empty());
    }

    #[test]
    fn groups() {
        assert_eq!(Element::O.main_group(), Some(16));
        assert_eq!(Element::from_symbol("Se").unwrap().main_group(), Some(16));
        assert_eq!(Element::from_symbol("Cu").unwrap().main_group(), None);
    }
}
