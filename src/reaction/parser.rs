use std::collections::HashSet;

use crate::mol::Mol;
use crate::smarts::{from_smarts, AtomExpr, BondExpr};

use super::error::ReactionSmartsError;
use super::Reaction;

pub fn parse_reaction_smarts(s: &str) -> Result<Reaction, ReactionSmartsError> {
    let (reactant_text, agent_text, product_text) = split_reaction(s.trim())?;

    let (reactant_templates, grouped_reactants) = parse_section(reactant_text, "reactant")?;
    if reactant_templates.is_empty() {
        return Err(ReactionSmartsError::EmptyReactants);
    }

    let (product_templates, _) = parse_section(product_text, "product")?;
    if product_templates.is_empty() {
        return Err(ReactionSmartsError::EmptyProducts);
    }

    let (agent_templates, _) = parse_section(agent_text, "agent")?;

    let mut seen = HashSet::new();
    for tmpl in &reactant_templates {
        for a in tmpl.atoms() {
            if let Some(map_num) = tmpl.atom(a).map_num() {
                if !seen.insert(map_num) {
                    return Err(ReactionSmartsError::DuplicateAtomMap { map_num });
                }
            }
        }
    }

    Ok(Reaction {
        reactant_templates,
        product_templates,
        agent_templates,
        grouped_reactants,
    })
}

/// Splits `reactants>>products` or `reactants>agents>products`.
pub(crate) fn split_reaction(s: &str) -> Result<(&str, &str, &str), ReactionSmartsError> {
    let gt = find_gt_positions(s);
    match gt.as_slice() {
        [] | [_] => Err(ReactionSmartsError::MissingSeparator),
        [a, b] => Ok((&s[..*a], &s[a + 1..*b], &s[b + 1..])),
        _ => Err(ReactionSmartsError::TooManySeparators),
    }
}

fn find_gt_positions(s: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut bracket_depth = 0u32;
    for (i, ch) in s.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '>' if bracket_depth == 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Splits on `.` outside brackets and parentheses, dropping empty parts.
pub(crate) fn split_on_dot(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut bracket_depth = 0u32;
    let mut paren_depth = 0u32;
    for (i, ch) in s.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '(' if bracket_depth == 0 => paren_depth += 1,
            ')' if bracket_depth == 0 => paren_depth = paren_depth.saturating_sub(1),
            '.' if bracket_depth == 0 && paren_depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// The inside of a component group `( ... )`, or `None` when the component
/// is not wrapped in one pair of outer parentheses.
pub(crate) fn component_group(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Parses one side of a reaction. A component group becomes a single,
/// possibly disconnected template; the flag reports whether one was seen.
fn parse_section(
    text: &str,
    section: &'static str,
) -> Result<(Vec<Mol<AtomExpr, BondExpr>>, bool), ReactionSmartsError> {
    let mut templates = Vec::new();
    let mut grouped = false;
    for comp in split_on_dot(text) {
        let source = match component_group(comp) {
            Some(inner) => {
                grouped = true;
                inner
            }
            None if comp.starts_with('(') => {
                return Err(ReactionSmartsError::UnbalancedGroup { section });
            }
            None => comp,
        };
        let mol = from_smarts(source)
            .map_err(|detail| ReactionSmartsError::InvalidComponent { section, detail })?;
        templates.push(mol);
    }
    Ok((templates, grouped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple_reaction() {
        let (r, a, p) = split_reaction("[C:1][Br:2]>>[C:1][OH]").unwrap();
        assert_eq!((r, a, p), ("[C:1][Br:2]", "", "[C:1][OH]"));
    }

    #[test]
    fn split_with_agents() {
        let (r, a, p) = split_reaction("[C:1]=[C:2]>[Pd]>[C:1][C:2]").unwrap();
        assert_eq!((r, a, p), ("[C:1]=[C:2]", "[Pd]", "[C:1][C:2]"));
    }

    #[test]
    fn separator_errors() {
        assert_eq!(
            split_reaction("[C][Br]"),
            Err(ReactionSmartsError::MissingSeparator)
        );
        assert_eq!(
            split_reaction("[C]>[Br]"),
            Err(ReactionSmartsError::MissingSeparator)
        );
        assert_eq!(
            split_reaction("[C:1]>[A]>[B]>[C:1]"),
            Err(ReactionSmartsError::TooManySeparators)
        );
    }

    #[test]
    fn dots_inside_groups_and_brackets_do_not_split() {
        assert_eq!(split_on_dot("[C:1]Br.[N:2]"), vec!["[C:1]Br", "[N:2]"]);
        assert_eq!(split_on_dot("([C:1].[N:2]).O"), vec!["([C:1].[N:2])", "O"]);
    }

    #[test]
    fn component_groups() {
        assert_eq!(component_group("(A.B)"), Some("A.B"));
        assert_eq!(component_group("(A(=O).B)"), Some("A(=O).B"));
        assert_eq!(component_group("(A)(B)"), None);
        assert_eq!(component_group("A.B"), None);
    }

    #[test]
    fn group_becomes_one_template() {
        let rxn = parse_reaction_smarts("([C:1]=O.[N:2])>>[C:1][N:2]").unwrap();
        assert_eq!(rxn.reactant_templates.len(), 1);
        assert_eq!(rxn.reactant_templates[0].atom_count(), 3);
        assert!(rxn.grouped_reactants);
    }

    #[test]
    fn duplicate_maps_rejected() {
        assert_eq!(
            parse_reaction_smarts("[C:1].[O:1]>>[C:1]").unwrap_err(),
            ReactionSmartsError::DuplicateAtomMap { map_num: 1 }
        );
    }
}
