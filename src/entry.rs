//! JSON model of a MITE entry, limited to the fields validation reads.
//! Everything else is kept verbatim in `extra` so a sanitized entry can
//! be written back without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validator::{Example, ReactionRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub reactions: Vec<ReactionEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Accession, or a placeholder for entries that have none yet.
    pub fn label(&self) -> &str {
        self.accession.as_deref().unwrap_or("<no accession>")
    }
}

/// One tailoring reaction: a pattern and its worked examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tailoring: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "reactionSMARTS")]
    pub reaction_smarts: ReactionSmarts,
    #[serde(rename = "reactions", default)]
    pub examples: Vec<ExampleEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReactionEntry {
    pub fn record(&self) -> ReactionRecord {
        ReactionRecord {
            smarts: self.reaction_smarts.as_str().to_string(),
            examples: self.examples.iter().map(ExampleEntry::example).collect(),
        }
    }
}

/// `reactionSMARTS` appears either as a bare string or as an object that
/// carries the string alongside other keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReactionSmarts {
    Plain(String),
    Wrapped {
        #[serde(rename = "reactionSMARTS")]
        reaction_smarts: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl ReactionSmarts {
    pub fn as_str(&self) -> &str {
        match self {
            ReactionSmarts::Plain(s) => s,
            ReactionSmarts::Wrapped { reaction_smarts, .. } => reaction_smarts,
        }
    }

    /// Same shape, different pattern text.
    pub fn with_smarts(&self, smarts: String) -> Self {
        match self {
            ReactionSmarts::Plain(_) => ReactionSmarts::Plain(smarts),
            ReactionSmarts::Wrapped { extra, .. } => ReactionSmarts::Wrapped {
                reaction_smarts: smarts,
                extra: extra.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleEntry {
    pub substrate: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_products: Option<Vec<String>>,
    #[serde(rename = "isIntermediate", default)]
    pub is_intermediate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExampleEntry {
    pub fn example(&self) -> Example {
        Example {
            substrate: self.substrate.clone(),
            products: self.products.clone(),
            forbidden_products: self.forbidden_products.clone().unwrap_or_default(),
            is_intermediate: self.is_intermediate,
        }
    }
}
