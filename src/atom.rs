use crate::element::Element;

/// Default atom type for a molecular graph node.
///
/// `hydrogen_count` is the number of suppressed hydrogens. When
/// `explicit_hydrogens` is set the count was stated (bracket atom or reaction
/// template) and is never recomputed; otherwise it is derived from the
/// element's default valences.
///
/// ```
/// use mite_validate::Atom;
///
/// let carbon = Atom::new(6);
/// assert_eq!(carbon.atomic_num, 6);
/// assert!(!carbon.explicit_hydrogens);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Atom {
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Mass number; `0` means natural abundance.
    pub isotope: u16,
    pub hydrogen_count: u8,
    pub is_aromatic: bool,
    /// Reaction atom-map number; `0` when unmapped.
    pub map_num: u16,
    pub explicit_hydrogens: bool,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }

    pub fn symbol(&self) -> &'static str {
        self.element().map(Element::symbol).unwrap_or("*")
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

impl crate::traits::HasAtomMap for Atom {
    fn map_num(&self) -> u16 {
        self.map_num
    }

    fn set_map_num(&mut self, map_num: u16) {
        self.map_num = map_num;
    }
}
