//! Five independent extractors, one per scoring factor. Each maps a cleaned lead to a bounded
//! sub-score with evidence and never fails: missing inputs produce a documented fallback.

mod financial;
mod industry;
mod market;
mod size;
mod website;

use std::collections::BTreeSet;

pub use financial::score_financials;
pub use industry::score_industry;
pub use market::score_market_position;
pub use size::score_company_size;
pub use website::score_website;

use super::config::ScoringConfig;
use super::domain::{CleanedLead, ScoreComponents};
use super::matcher::{IndustryMatcher, IndustryTable};

/// Shared, read-only state the extractors need beyond the config itself.
pub struct SignalContext<'a> {
    pub config: &'a ScoringConfig,
    pub matcher: &'a dyn IndustryMatcher,
    pub industries: &'a IndustryTable,
}

pub fn extract_components(lead: &CleanedLead, context: &SignalContext<'_>) -> ScoreComponents {
    ScoreComponents {
        company_size: score_company_size(lead, &context.config.company_size),
        industry: score_industry(lead, context),
        financial: score_financials(lead, &context.config.financial),
        website: score_website(lead, &context.config.website),
        market_position: score_market_position(lead, context),
    }
}

/// Configured terms found in a matching key. Terms shorter than three characters must match a
/// whole token; longer ones may appear anywhere ("tech" in "acmetech").
pub(crate) fn matched_terms<'t>(text: &str, terms: &'t [String]) -> BTreeSet<&'t str> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    terms
        .iter()
        .map(|term| term.trim())
        .filter(|term| !term.is_empty())
        .filter(|term| {
            let lowered = term.to_lowercase();
            tokens.iter().any(|token| *token == lowered)
                || (lowered.chars().count() >= 3 && text.contains(lowered.as_str()))
        })
        .collect()
}

pub(crate) fn capped_bonus(hits: usize, per_hit: f64, cap: f64) -> f64 {
    (hits as f64 * per_hit).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn short_terms_need_whole_tokens() {
        let list = terms(&["ai", "tech"]);

        assert!(matched_terms("retail", &list).is_empty());
        assert_eq!(
            matched_terms("openai labs", &list).into_iter().collect::<Vec<_>>(),
            Vec::<&str>::new()
        );
        assert_eq!(
            matched_terms("ai first", &list).into_iter().collect::<Vec<_>>(),
            vec!["ai"]
        );
    }

    #[test]
    fn longer_terms_match_inside_words() {
        let list = terms(&["tech", "market leader"]);

        let hits = matched_terms("acmetech is the market leader", &list);

        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn bonus_is_capped() {
        assert_eq!(capped_bonus(2, 8.0, 20.0), 16.0);
        assert_eq!(capped_bonus(4, 8.0, 20.0), 20.0);
    }
}
