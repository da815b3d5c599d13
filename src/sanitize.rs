//! String-level clean-up applied before anything is parsed.
//!
//! Structure editors such as Ketcher export SMARTS with a few habits the
//! parser does not accept (unbracketed halogens carrying map numbers,
//! `;h` hydrogen counts on `#7`, charges after the map number). These are
//! rewritten here, one reaction component at a time. Every function in
//! this module is total: text that matches no rule comes back unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use thiserror::Error;

use crate::reaction::split_on_dot;

/// Upper bound on patterns produced by [`expand_alternatives`].
pub const MAX_VARIANTS: usize = 256;

static DOUBLED_BACKSLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\\").expect("valid pattern"));
static LOWERCASE_H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";h\d").expect("valid pattern"));

static HALOGEN_MAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([FCBI]l?):(\d+)").expect("valid pattern"));
static HALOGEN_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([FCBI]l)(\[)?").expect("valid pattern"));
static HALOGEN_BRANCH_MAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(-([FCBI]l?):(\d+)\)").expect("valid pattern"));
static HALOGEN_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(-([FCBI]l)\)").expect("valid pattern"));
static PYRROLE_N_MAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[#7:(\d+);h(\d+)\]").expect("valid pattern"));
static PYRROLE_N: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[#7;h(\d+)\]").expect("valid pattern"));
static TRAILING_CHARGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(#\d+):(\d+);([+-])\]").expect("valid pattern"));

static MAPPED_ATOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.+:\d+\]").expect("valid pattern"));
static EXPLICIT_HYDROGEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[H\]").expect("valid pattern"));
static CX_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|").expect("valid pattern"));

static ALTERNATIVES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]:]+(?:,[^\]:]+)*):(\d+)\]").expect("valid pattern")
});

/// A reaction SMARTS feature that curated records must not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndesiredPattern {
    #[error("no atom mapping found in reaction SMARTS (e.g. '[#6:1]>>[#6:1]-[#8]')")]
    MissingAtomMap,
    #[error(
        "explicit hydrogen atoms ('[H]') are not allowed; \
         specify stereochemistry on a heavy atom next to the stereocenter"
    )]
    ExplicitHydrogen,
    #[error(
        "CXSMARTS extension ('|...') is not supported; \
         export as Daylight SMARTS or remove the suffix"
    )]
    CxExtension,
}

/// Normalizes a SMILES string: drops any CXSMILES suffix after whitespace,
/// collapses doubled backslashes and removes `;h<n>` annotations.
pub fn sanitize_smiles(raw: &str) -> String {
    let head = raw.split_whitespace().next().unwrap_or("");
    let unescaped = DOUBLED_BACKSLASH.replace_all(head, r"\");
    LOWERCASE_H.replace_all(&unescaped, "").into_owned()
}

/// Rewrites Ketcher-flavoured reaction SMARTS into plain Daylight SMARTS.
///
/// The reaction is split on `>` and each side on top-level `.`; the rules
/// run on every component on its own.
pub fn sanitize_reaction_smarts(raw: &str) -> String {
    let unescaped = DOUBLED_BACKSLASH.replace_all(raw.trim(), r"\");
    unescaped
        .split('>')
        .map(|section| {
            split_on_dot(section)
                .into_iter()
                .map(sanitize_component)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join(">")
}

fn sanitize_component(component: &str) -> String {
    let s = HALOGEN_MAPPED.replace_all(component, "-[$1:$2]");
    // `-Cl[` is left alone; the regex crate has no lookahead
    let s = HALOGEN_BARE.replace_all(&s, |caps: &Captures| {
        if caps.get(2).is_some() {
            caps[0].to_string()
        } else {
            format!("-[{}]", &caps[1])
        }
    });
    let s = HALOGEN_BRANCH_MAPPED.replace_all(&s, "(-[$1:$2])");
    let s = HALOGEN_BRANCH.replace_all(&s, "(-[$1])");
    let s = PYRROLE_N_MAPPED.replace_all(&s, "[nH${2}:$1]");
    let s = PYRROLE_N.replace_all(&s, "[nH$1]");
    let s = TRAILING_CHARGE.replace_all(&s, "[$1;$3:$2]");
    s.into_owned()
}

/// Rejects reaction SMARTS that carry no atom map, an explicit `[H]`, or
/// a CXSMARTS suffix.
pub fn check_undesired_patterns(smarts: &str) -> Result<(), UndesiredPattern> {
    if !MAPPED_ATOM.is_match(smarts) {
        return Err(UndesiredPattern::MissingAtomMap);
    }
    if EXPLICIT_HYDROGEN.is_match(smarts) {
        return Err(UndesiredPattern::ExplicitHydrogen);
    }
    if CX_EXTENSION.is_match(smarts) {
        return Err(UndesiredPattern::CxExtension);
    }
    Ok(())
}

/// Splits a dot-disconnected SMILES into its components.
pub fn split_smiles(smiles: &str) -> Vec<String> {
    smiles
        .split('.')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expands mapped bracket atoms with comma alternatives, such as
/// `[#17,#35:3]`, into one reaction SMARTS per choice.
///
/// Occurrences that share a map number and the same alternative list are
/// chosen together, so `[#17,#35:3]>>[#17,#35:3]` gives two variants, not
/// four, even when one side is written as a component group. The result
/// is truncated to [`MAX_VARIANTS`].
pub fn expand_alternatives(smarts: &str) -> Vec<String> {
    let sections: Vec<&str> = smarts.split('>').collect();

    struct Site {
        section: usize,
        start: usize,
        end: usize,
        choice: usize,
        map: String,
    }

    let mut sites = Vec::new();
    let mut choices: Vec<Vec<String>> = Vec::new();
    let mut keyed: HashMap<(String, String), usize> = HashMap::new();
    for (si, section) in sections.iter().enumerate() {
        for caps in ALTERNATIVES.captures_iter(section) {
            let (Some(whole), Some(options), Some(map)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if !options.as_str().contains(',') {
                continue;
            }
            let key = (options.as_str().to_string(), map.as_str().to_string());
            let choice = *keyed.entry(key).or_insert_with(|| {
                choices.push(options.as_str().split(',').map(str::to_string).collect());
                choices.len() - 1
            });
            sites.push(Site {
                section: si,
                start: whole.start(),
                end: whole.end(),
                choice,
                map: map.as_str().to_string(),
            });
        }
    }
    if sites.is_empty() {
        return vec![smarts.to_string()];
    }

    let total = choices
        .iter()
        .try_fold(1usize, |acc, c| acc.checked_mul(c.len()))
        .unwrap_or(usize::MAX);
    if total > MAX_VARIANTS {
        log::warn!("{total} SMARTS variants requested, keeping the first {MAX_VARIANTS}");
    }

    let mut variants = Vec::with_capacity(total.min(MAX_VARIANTS));
    let mut picks = vec![0usize; choices.len()];
    loop {
        let rendered: Vec<String> = sections
            .iter()
            .enumerate()
            .map(|(si, section)| {
                let mut out = String::with_capacity(section.len());
                let mut cursor = 0;
                for site in sites.iter().filter(|s| s.section == si) {
                    out.push_str(&section[cursor..site.start]);
                    out.push('[');
                    out.push_str(&choices[site.choice][picks[site.choice]]);
                    out.push(':');
                    out.push_str(&site.map);
                    out.push(']');
                    cursor = site.end;
                }
                out.push_str(&section[cursor..]);
                out
            })
            .collect();
        variants.push(rendered.join(">"));
        if variants.len() == MAX_VARIANTS || !advance(&mut picks, &choices) {
            break;
        }
    }
    variants
}

/// Odometer step over the choice lists; false once every combination
/// has been visited.
fn advance(picks: &mut [usize], choices: &[Vec<String>]) -> bool {
    for i in (0..picks.len()).rev() {
        picks[i] += 1;
        if picks[i] < choices[i].len() {
            return true;
        }
        picks[i] = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smiles_cleanup() {
        assert_eq!(sanitize_smiles("OCO |LN:1:1.2|"), "OCO");
        assert_eq!(sanitize_smiles("C/C=C\\\\C"), "C/C=C\\C");
        assert_eq!(sanitize_smiles("[#7;h1]"), "[#7]");
        assert_eq!(sanitize_smiles("  CCO  "), "CCO");
    }

    #[test]
    fn mapped_chloride() {
        assert_eq!(
            sanitize_reaction_smarts("[#6:1]-Cl:2>>[#6:1](-Cl)-Cl:2"),
            "[#6:1]-[Cl:2]>>[#6:1](-[Cl])-[Cl:2]"
        );
    }

    #[test]
    fn bare_chloride() {
        assert_eq!(
            sanitize_reaction_smarts("[#6:1]>>[#6:1]-Cl"),
            "[#6:1]>>[#6:1]-[Cl]"
        );
    }

    #[test]
    fn chloride_on_ring() {
        assert_eq!(
            sanitize_reaction_smarts(
                "[#6:1]1-[#6:5]=[#6:6]-[#6:4]=[#6:2]-[#6:3]=1-Cl:7>>\
                 [#6:1]1-[#6:5]=[#6:6]-[#6:4]=[#6:2](-Cl)-[#6:3]=1-Cl:7"
            ),
            "[#6:1]1-[#6:5]=[#6:6]-[#6:4]=[#6:2]-[#6:3]=1-[Cl:7]>>\
             [#6:1]1-[#6:5]=[#6:6]-[#6:4]=[#6:2](-[Cl])-[#6:3]=1-[Cl:7]"
        );
    }

    #[test]
    fn pyrrole_nitrogen() {
        assert_eq!(
            sanitize_reaction_smarts("[#7:1;h1]1:[#6:3]:[#6:2]:[#6:5]:1>>[#7:1;h1]1:[#6:3]:[#6:2]:[#6:5]:1"),
            "[nH1:1]1:[#6:3]:[#6:2]:[#6:5]:1>>[nH1:1]1:[#6:3]:[#6:2]:[#6:5]:1"
        );
        assert_eq!(
            sanitize_reaction_smarts("[#7;h1]1:[#6:3]:[#6:2]:[#6:5]:1>>[#7;h1]1:[#6:3]:[#6:2]:[#6:5]:1"),
            "[nH1]1:[#6:3]:[#6:2]:[#6:5]:1>>[nH1]1:[#6:3]:[#6:2]:[#6:5]:1"
        );
    }

    #[test]
    fn charge_after_map_number() {
        assert_eq!(
            sanitize_reaction_smarts("[#6:1]-[#8:2;-]>>[#6:1]-[#8:2]"),
            "[#6:1]-[#8;-:2]>>[#6:1]-[#8:2]"
        );
    }

    #[test]
    fn plain_smarts_untouched() {
        let s = "[C:1][O:2]>>[C:1]=[O:2]";
        assert_eq!(sanitize_reaction_smarts(s), s);
        let s = "([C:1][OH].[C:2][OH])>[Pd]>[C:1][C:2]";
        assert_eq!(sanitize_reaction_smarts(s), s);
    }

    #[test]
    fn chloride_followed_by_bracket_kept() {
        assert_eq!(sanitize_component("-Cl[C:1]"), "-Cl[C:1]");
    }

    #[test]
    fn undesired_patterns() {
        assert_eq!(check_undesired_patterns("[C:1]>>[C:1]O"), Ok(()));
        assert_eq!(
            check_undesired_patterns("CO>>C=O"),
            Err(UndesiredPattern::MissingAtomMap)
        );
        assert_eq!(
            check_undesired_patterns("[C:1][H]>>[C:1]O"),
            Err(UndesiredPattern::ExplicitHydrogen)
        );
        assert_eq!(
            check_undesired_patterns("[C:1]>>[C:1]O |$;;$|"),
            Err(UndesiredPattern::CxExtension)
        );
    }

    #[test]
    fn alternatives_expand_jointly() {
        let variants = expand_alternatives("[C:1]-[#17,#35:2]>>[C:1]-[O].[#17,#35:2]");
        assert_eq!(
            variants,
            vec![
                "[C:1]-[#17:2]>>[C:1]-[O].[#17:2]".to_string(),
                "[C:1]-[#35:2]>>[C:1]-[O].[#35:2]".to_string(),
            ]
        );
    }

    #[test]
    fn independent_alternatives_multiply() {
        let variants = expand_alternatives("[N,O:1][C:2][F,Cl:3]>>[N,O:1][C:2]");
        assert_eq!(variants.len(), 4);
        assert!(variants.contains(&"[O:1][C:2][Cl:3]>>[O:1][C:2]".to_string()));
    }

    #[test]
    fn no_alternatives_single_variant() {
        assert_eq!(
            expand_alternatives("[C:1][OH:2]>>[C:1]=[O:2]"),
            vec!["[C:1][OH:2]>>[C:1]=[O:2]".to_string()]
        );
    }

    #[test]
    fn groups_expanded_with_the_other_side() {
        assert_eq!(
            expand_alternatives("([C:1][O,S:2])>>[C:1]=[O,S:2]"),
            vec![
                "([C:1][O:2])>>[C:1]=[O:2]".to_string(),
                "([C:1][S:2])>>[C:1]=[S:2]".to_string(),
            ]
        );
        assert_eq!(
            expand_alternatives("([N,O:1].[C:2])>>[N,O:1][C:2]"),
            vec![
                "([N:1].[C:2])>>[N:1][C:2]".to_string(),
                "([O:1].[C:2])>>[O:1][C:2]".to_string(),
            ]
        );
    }

    #[test]
    fn forbidden_products_split() {
        assert_eq!(split_smiles("CC=O.O"), vec!["CC=O", "O"]);
        assert_eq!(split_smiles("CCO"), vec!["CCO"]);
    }
}
