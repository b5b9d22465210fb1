//! Style-rule reconciliation.
//!
//! Directives from every source are unioned, then a directive is dropped when
//! another directive already covers it once negation markers are ignored:
//! `"never use slang"` strips to `" use slang"`, which appears inside
//! `"i use slang constantly"`, so the negative rule goes and the other stays.
//!
//! This is a plain substring heuristic with known false positives: a rule
//! that is only a negation marker strips to `""` and is covered by anything,
//! and `"no"` is also removed from inside words (`"know"` becomes `"kw"`).

use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Negation markers, matched leftmost-first in a single pass over the
/// lowercased rule.
static NEGATION_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("don't|never|no").expect("negation pattern is valid"));

/// Lowercase `rule` and remove every negation marker.
pub fn strip_negations(rule: &str) -> String {
    NEGATION_MARKERS
        .replace_all(&rule.to_lowercase(), "")
        .into_owned()
}

/// Merge one channel's directives from all sources.
///
/// `channels` yields each source's directive list in source order. The result
/// is the first-seen-order union minus every rule `R` for which some rule `O`
/// in the full concatenation (duplicates included) with `O != R` contains the
/// negation-stripped form of `R` in its lowercased text.
pub fn reconcile_style_rules<'a, I>(channels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let all: Vec<&'a String> = channels.into_iter().flatten().collect();
    let lowered: Vec<String> = all.iter().map(|rule| rule.to_lowercase()).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    all.iter()
        .filter(|rule| seen.insert(rule.as_str()))
        .filter(|rule| !is_superseded(rule, &all, &lowered))
        .map(|rule| (*rule).clone())
        .collect()
}

fn is_superseded(rule: &str, all: &[&String], lowered: &[String]) -> bool {
    let stripped = strip_negations(rule);
    let covering = all
        .iter()
        .zip(lowered)
        .find(|(other, other_lower)| other.as_str() != rule && other_lower.contains(&stripped));

    match covering {
        Some((other, _)) => {
            debug!(rule, superseded_by = other.as_str(), "Style rule suppressed");
            true
        }
        None => false,
    }
}
