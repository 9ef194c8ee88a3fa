use serde::{Deserialize, Serialize};

use super::config::IndustryPreference;
use super::normalize::matching_key;

const EXACT_STRENGTH: f64 = 1.0;
const SUBSTRING_STRENGTH: f64 = 0.9;
const TOKEN_OVERLAP_STRENGTH: f64 = 0.8;
const MIN_TOKEN_OVERLAP: f64 = 0.5;
/// Shorter needles only match on whole tokens so "ai" does not hit "retail".
const MIN_RAW_SUBSTRING_LEN: usize = 4;

/// Decides whether a lead's industry refers to a configured industry name.
///
/// Both arguments are matching keys (see [`matching_key`]). Implementations return the
/// strength of the match in `(0, 1]`, or `None` when the two do not match at all.
pub trait IndustryMatcher: Send + Sync {
    fn strength(&self, candidate: &str, target: &str) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl IndustryMatcher for ExactMatcher {
    fn strength(&self, candidate: &str, target: &str) -> Option<f64> {
        (!candidate.is_empty() && candidate == target).then_some(EXACT_STRENGTH)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl IndustryMatcher for SubstringMatcher {
    fn strength(&self, candidate: &str, target: &str) -> Option<f64> {
        if let Some(exact) = ExactMatcher.strength(candidate, target) {
            return Some(exact);
        }
        if candidate.is_empty() || target.is_empty() {
            return None;
        }
        (contains_phrase(candidate, target) || contains_phrase(target, candidate))
            .then_some(SUBSTRING_STRENGTH)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlapMatcher;

impl IndustryMatcher for TokenOverlapMatcher {
    fn strength(&self, candidate: &str, target: &str) -> Option<f64> {
        if let Some(exact) = ExactMatcher.strength(candidate, target) {
            return Some(exact);
        }
        let target_tokens: Vec<&str> = target.split_whitespace().collect();
        if target_tokens.is_empty() {
            return None;
        }
        let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
        let shared = target_tokens
            .iter()
            .filter(|token| candidate_tokens.contains(token))
            .count();
        let overlap = shared as f64 / target_tokens.len() as f64;
        (overlap > MIN_TOKEN_OVERLAP).then_some(TOKEN_OVERLAP_STRENGTH)
    }
}

/// Substring first, then token overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl IndustryMatcher for FuzzyMatcher {
    fn strength(&self, candidate: &str, target: &str) -> Option<f64> {
        SubstringMatcher
            .strength(candidate, target)
            .or_else(|| TokenOverlapMatcher.strength(candidate, target))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Substring,
    TokenOverlap,
    #[default]
    Fuzzy,
}

impl MatchStrategy {
    pub fn build(self) -> Box<dyn IndustryMatcher> {
        match self {
            Self::Exact => Box::new(ExactMatcher),
            Self::Substring => Box::new(SubstringMatcher),
            Self::TokenOverlap => Box::new(TokenOverlapMatcher),
            Self::Fuzzy => Box::new(FuzzyMatcher),
        }
    }
}

/// `needle` occurs in `haystack` as a run of whole tokens, or as a raw substring when long enough.
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let hay: Vec<&str> = haystack.split_whitespace().collect();
    let pins: Vec<&str> = needle.split_whitespace().collect();
    if !pins.is_empty() && hay.windows(pins.len()).any(|window| window == pins.as_slice()) {
        return true;
    }
    needle.chars().count() >= MIN_RAW_SUBSTRING_LEN && haystack.contains(needle)
}

#[derive(Debug, Clone, PartialEq)]
struct TableEntry {
    key: String,
    name: String,
    score: f64,
}

/// Preference table with precomputed matching keys.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryTable {
    entries: Vec<TableEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryMatch<'a> {
    pub name: &'a str,
    /// Matching key of the configured industry.
    pub key: &'a str,
    pub tier_score: f64,
    pub strength: f64,
}

impl IndustryMatch<'_> {
    /// Tier score weighted by match strength.
    pub fn score(&self) -> f64 {
        self.tier_score * self.strength
    }
}

impl IndustryTable {
    pub fn new(preferences: &[IndustryPreference]) -> Self {
        let entries = preferences
            .iter()
            .map(|preference| TableEntry {
                key: matching_key(&preference.name),
                name: preference.name.trim().to_string(),
                score: preference.score,
            })
            .filter(|entry| !entry.key.is_empty())
            .collect();
        Self { entries }
    }

    /// An exact match always wins ("biotechnology" must not become "technology"). Otherwise the
    /// highest weighted score wins; ties go to the longer name, then the alphabetically first.
    pub fn best_match(&self, matcher: &dyn IndustryMatcher, key: &str) -> Option<IndustryMatch<'_>> {
        let mut best: Option<IndustryMatch<'_>> = None;
        for entry in &self.entries {
            let Some(strength) = matcher.strength(key, &entry.key) else {
                continue;
            };
            let candidate = IndustryMatch {
                name: &entry.name,
                key: &entry.key,
                tier_score: entry.score,
                strength,
            };
            if best.map_or(true, |current| outranks(&candidate, &current)) {
                best = Some(candidate);
            }
        }
        best
    }
}

fn outranks(candidate: &IndustryMatch<'_>, current: &IndustryMatch<'_>) -> bool {
    let (candidate_exact, current_exact) = (
        candidate.strength >= EXACT_STRENGTH,
        current.strength >= EXACT_STRENGTH,
    );
    if candidate_exact != current_exact {
        return candidate_exact;
    }
    let (new_score, old_score) = (candidate.score(), current.score());
    if new_score != old_score {
        return new_score > old_score;
    }
    if candidate.name.len() != current.name.len() {
        return candidate.name.len() > current.name.len();
    }
    candidate.name < current.name
}

/// First configured term occurring inside `key`. Containment runs one way: a broader
/// industry never claims a narrower term.
pub fn first_contained_term<'a>(key: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .find(|term| {
            let needle = matching_key(term);
            !needle.is_empty() && contains_phrase(key, &needle)
        })
        .map(String::as_str)
}
