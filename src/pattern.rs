use crate::molecule::Molecule;
use crate::reaction::{from_reaction_smarts, Reaction, ReactionError, ReactionSmartsError};
use crate::topology::{classify, merged_pattern, ReactionTopology};

/// A parsed reaction pattern together with its topology.
///
/// Intramolecular patterns are stored in merged form, with the reactant
/// side as one component group, so they always consume exactly one
/// molecule.
#[derive(Debug, Clone)]
pub struct Pattern {
    reaction: Reaction,
    topology: ReactionTopology,
}

impl Pattern {
    pub fn parse(smarts: &str) -> Result<Self, ReactionSmartsError> {
        let reaction = from_reaction_smarts(smarts)?;
        let topology = classify(&reaction);
        let reaction = match topology {
            ReactionTopology::Intramolecular if !reaction.has_reactant_group() => {
                from_reaction_smarts(&merged_pattern(smarts))?
            }
            _ => reaction,
        };
        Ok(Self { reaction, topology })
    }

    pub fn topology(&self) -> ReactionTopology {
        self.topology
    }

    /// Input molecules one application consumes.
    pub fn reactant_count(&self) -> usize {
        self.reaction.reactant_templates().len()
    }

    /// Every candidate outcome of applying the pattern, with each product
    /// split into its connected components. No match gives no outcomes.
    pub fn apply(&self, reactants: &[&Molecule]) -> Result<Vec<Vec<Molecule>>, ReactionError> {
        let mols: Vec<_> = reactants.iter().map(|m| m.as_mol()).collect();
        let outcomes = self.reaction.run(&mols)?;
        Ok(outcomes
            .into_iter()
            .map(|products| {
                products
                    .into_iter()
                    .flat_map(|p| Molecule::from_mol(p).fragments())
                    .collect()
            })
            .collect())
    }
}
