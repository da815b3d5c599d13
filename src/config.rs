use serde::{Deserialize, Serialize};

/// How far the forbidden-product check reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenPolicy {
    /// A forbidden product reachable through any candidate outcome fails
    /// the example.
    #[default]
    Strict,
    /// Only outcomes that reproduce the expected products are checked.
    Lenient,
}

/// Options for [`ReactionValidator`](crate::validator::ReactionValidator).
///
/// Every field has a default, so a partial JSON document is accepted:
///
/// ```
/// use mite_validate::{ForbiddenPolicy, ValidatorConfig};
///
/// let config = ValidatorConfig::from_json(r#"{"forbidden_policy": "lenient"}"#).unwrap();
/// assert_eq!(config.forbidden_policy, ForbiddenPolicy::Lenient);
/// assert!(config.check_undesired_patterns);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub forbidden_policy: ForbiddenPolicy,
    /// Reject SMARTS without atom maps, with `[H]`, or with a CXSMARTS suffix.
    pub check_undesired_patterns: bool,
    /// Expand `[A,B:n]` alternatives into separate patterns.
    pub expand_alternatives: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            forbidden_policy: ForbiddenPolicy::Strict,
            check_undesired_patterns: true,
            expand_alternatives: true,
        }
    }
}

impl ValidatorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
