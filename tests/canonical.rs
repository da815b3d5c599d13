use mite_validate::graph_ops::extract;
use mite_validate::{from_smiles, to_canonical_smiles, Molecule};
use petgraph::graph::NodeIndex;

// Substrates and products of common tailoring steps, plus the awkward
// cases canonical ranking has to get right.
const MOLECULES: &[&str] = &[
    // Small products and leaving groups
    "O",
    "C=O",
    "CO",
    "CC(=O)O",
    "OC(=O)O",
    "[Cl-]",
    "[Br-]",
    "C[S+](C)C",
    "CSC",
    // Oxidations and reductions
    "CCO",
    "CC=O",
    "OCC(O)C",
    "CC(O)C=O",
    "CC(=O)CO",
    "OCCCC(=O)O",
    "O=C1CCCO1",
    // Halogenation
    "Clc1ccc(O)cc1",
    "Brc1c[nH]c2ccccc12",
    "ClC(Cl)C(=O)N",
    // Methylation and acylation
    "COc1ccc(O)cc1",
    "CN(C)c1ccccc1",
    "CC(=O)Nc1ccccc1",
    "CC(=O)OC1CCCCC1",
    // Glycosylation
    "OCC1OC(O)C(O)C(O)C1O",
    "OCC1OC(Oc2ccccc2)C(O)C(O)C1O",
    // Heteroaromatics
    "c1ccncc1",
    "c1ccoc1",
    "c1ccsc1",
    "c1cc[nH]c1",
    "c1ccc2c(c1)[nH]cc2",
    "c1cnc2ccccc2n1",
    "O=c1cccc[nH]1",
    // Symmetric ring systems
    "C1CC1",
    "C1CCCCC1",
    "c1ccccc1",
    "c1ccc2ccccc2c1",
    "C1CC2CCCC(C1)C2",
    "c1ccc(cc1)-c1ccccc1",
    // Charges, salts and isotopes
    "[NH4+]",
    "[O-][N+](=O)c1ccccc1",
    "CC(=O)[O-].[Na+]",
    "[Na+].[Cl-].O",
    "[Fe+3]",
    "[2H]C([2H])([2H])O",
    "[13C]c1ccccc1",
    // Natural-product sized
    "CN1C=NC2=C1C(=O)N(C(=O)N2C)C",
    "CC12CCC3C(C1CCC2O)CCC4=CC(=O)CCC34C",
    "CCC1OC(=O)C(C)C(O)C(C)C(O)C(C)(O)CC(C)C(=O)C(C)C(O)C1C",
    "OC(=O)C1=CC(O)C(O)C(O)C1",
    "Oc1cc(O)c2c(c1)OC(c1ccc(O)c(O)c1)C(O)C2",
];

fn canonical(smiles: &str) -> String {
    let mol = from_smiles(smiles).unwrap_or_else(|e| panic!("parse failed for '{smiles}': {e}"));
    to_canonical_smiles(&mol)
}

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn shuffle(&mut self, slice: &mut [NodeIndex]) {
        for i in (1..slice.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            slice.swap(i, j);
        }
    }
}

const SHUFFLES: usize = 20;

#[test]
fn determinism() {
    for &smiles in MOLECULES {
        let mol =
            from_smiles(smiles).unwrap_or_else(|e| panic!("parse failed for '{smiles}': {e}"));
        let a = to_canonical_smiles(&mol);
        let b = to_canonical_smiles(&mol);
        assert_eq!(a, b, "determinism failed for '{smiles}': '{a}' vs '{b}'");
    }
}

#[test]
fn round_trip_idempotence() {
    for &smiles in MOLECULES {
        let first = canonical(smiles);
        let second = canonical(&first);
        assert_eq!(
            first, second,
            "round-trip failed for '{smiles}': first='{first}', second='{second}'"
        );
    }
}

#[test]
fn atom_order_invariance() {
    let mut rng = Xorshift64(0xDEAD_BEEF_CAFE_BABE);
    for &smiles in MOLECULES {
        let mol =
            from_smiles(smiles).unwrap_or_else(|e| panic!("parse failed for '{smiles}': {e}"));
        let expected = to_canonical_smiles(&mol);

        let mut order: Vec<NodeIndex> = mol.atoms().collect();
        order.reverse();
        let got = to_canonical_smiles(&extract(&mol, &order));
        assert_eq!(expected, got, "reversed order failed for '{smiles}'");

        for _ in 0..SHUFFLES {
            rng.shuffle(&mut order);
            let got = to_canonical_smiles(&extract(&mol, &order));
            assert_eq!(
                expected, got,
                "atom order invariance failed for '{smiles}' with order {order:?}: \
                 expected='{expected}', got='{got}'"
            );
        }
    }
}

#[test]
fn fragment_ordering() {
    let a = canonical("[Na+].[Cl-].O");
    let b = canonical("O.[Cl-].[Na+]");
    assert_eq!(a, b, "fragment ordering: '{a}' vs '{b}'");
}

#[test]
fn atom_maps_do_not_change_the_form() {
    let a = canonical("[CH3:1][CH2:2][OH:3]");
    let b = canonical("CCO");
    assert_eq!(a, b, "atom maps: '{a}' vs '{b}'");
}

#[test]
fn stereo_marks_do_not_change_the_form() {
    let a = canonical(r"F/C=C/F");
    let b = canonical(r"F/C=C\F");
    assert_eq!(a, b, "E/Z: '{a}' vs '{b}'");
    let a = canonical("N[C@@H](C)C(=O)O");
    let b = canonical("NC(C)C(=O)O");
    assert_eq!(a, b, "chirality: '{a}' vs '{b}'");
}

#[test]
fn kekule_and_aromatic_spellings_agree() {
    for (kekule, aromatic) in [
        ("C1=CC=CC=C1", "c1ccccc1"),
        ("C1=CC=CN=C1", "c1ccncc1"),
        ("C1=CC=C2C=CC=CC2=C1", "c1ccc2ccccc2c1"),
        ("C1=CNC=C1", "c1cc[nH]c1"),
    ] {
        let a = canonical(kekule);
        let b = canonical(aromatic);
        assert_eq!(a, b, "aromaticity: '{a}' vs '{b}'");
    }
}

#[test]
fn molecule_handle_matches_free_function() {
    for &smiles in MOLECULES {
        let handle = Molecule::parse(smiles).unwrap_or_else(|e| panic!("'{smiles}': {e}"));
        assert_eq!(handle.canonical().as_str(), canonical(smiles), "'{smiles}'");
    }
}
