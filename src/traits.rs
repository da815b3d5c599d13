use crate::bond::BondOrder;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasIsotope {
    fn isotope(&self) -> u16;
}

pub trait HasHydrogenCount {
    fn hydrogen_count(&self) -> u8;
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasAtomMap {
    fn map_num(&self) -> u16;
    fn set_map_num(&mut self, map_num: u16);
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
    fn is_aromatic_bond(&self) -> bool;
}
