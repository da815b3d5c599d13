pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod config;
pub mod element;
pub mod engine;
pub mod entry;
pub mod error;
pub mod graph_ops;
pub mod kekulize;
pub mod manager;
pub mod mol;
pub mod molecule;
pub mod pattern;
pub mod reaction;
pub mod rings;
pub mod sanitize;
pub mod smarts;
pub mod smiles;
pub mod substruct;
pub mod topology;
pub mod traits;
pub mod valence;
pub mod validator;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use config::{ForbiddenPolicy, ValidatorConfig};
pub use element::Element;
pub use engine::{ChemistryEngine, DefaultEngine, EngineError};
pub use entry::{Entry, ExampleEntry, ReactionEntry, ReactionSmarts};
pub use error::{ChemistryMismatch, InputRole, ValidationError};
pub use kekulize::{kekulize, KekulizeError};
pub use manager::{sanitized_entry, EntryVerdict, ValidationManager};
pub use mol::Mol;
pub use molecule::{CanonicalForm, Molecule, MoleculeError};
pub use pattern::Pattern;
pub use reaction::{from_reaction_smarts, Reaction, ReactionError, ReactionSmartsError};
pub use sanitize::{
    check_undesired_patterns, expand_alternatives, sanitize_reaction_smarts, sanitize_smiles,
    split_smiles, UndesiredPattern,
};
pub use smarts::{from_smarts, SmartsError};
pub use smiles::{from_smiles, parse_smiles, to_canonical_smiles, to_smiles, SmilesError};
pub use topology::{classify, ReactionTopology};
pub use validator::{
    Example, ExampleReport, ReactionRecord, ReactionValidator, RecordReport, Verdict,
};
