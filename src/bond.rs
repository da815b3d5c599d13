/// Kekulé bond order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// A bond with a concrete Kekulé order and an aromaticity flag.
///
/// Aromatic bonds keep their Kekulé order so that valence arithmetic stays
/// exact; anything that compares structures (canonical ranking, SMILES
/// output, SMARTS matching) looks at `is_aromatic` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn with_order(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: false,
        }
    }

    /// An aromatic bond whose Kekulé order has not been assigned yet.
    pub fn aromatic() -> Self {
        Self {
            order: BondOrder::Single,
            is_aromatic: true,
        }
    }

    /// Small integer describing the bond type as the outside world sees it:
    /// 1, 2, 3 for Kekulé orders and 4 for aromatic.
    pub fn type_code(&self) -> u8 {
        if self.is_aromatic {
            4
        } else {
            self.order.valence()
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }

    fn is_aromatic_bond(&self) -> bool {
        self.is_aromatic
    }
}
