use super::{matched_terms, SignalContext};
use crate::workflows::scoring::domain::{
    CleanedLead, DataAvailability, Factor, FactorScore, MAX_SUB_SCORE,
};

pub fn score_industry(lead: &CleanedLead, context: &SignalContext<'_>) -> FactorScore {
    let config = &context.config.industry;
    let Some(key) = lead.industry_key.as_deref() else {
        return FactorScore::new(Factor::Industry, config.missing_score, DataAvailability::Absent)
            .with_evidence("Industry not provided");
    };
    let display = lead.industry.as_deref().unwrap_or(key);

    let (mut score, headline) = match context.industries.best_match(context.matcher, key) {
        Some(found) if found.strength >= 1.0 => (
            found.score(),
            format!("{} industry ({display})", priority_label(found.score())),
        ),
        Some(found) => (
            found.score(),
            format!(
                "{} industry ({display}, closest to {})",
                priority_label(found.score()),
                found.name
            ),
        ),
        None => (
            config.unmatched_score,
            format!("Industry outside preferred sectors ({display})"),
        ),
    };

    let mut notes = vec![headline];
    if !matched_terms(key, &config.tech_terms).is_empty() {
        score += config.tech_bonus;
        notes.push(format!("Technology-oriented sector (+{:.0})", config.tech_bonus));
    }
    if !matched_terms(key, &config.service_terms).is_empty() {
        score += config.service_bonus;
        notes.push(format!("Service-oriented sector (+{:.0})", config.service_bonus));
    }

    notes.into_iter().fold(
        FactorScore::new(
            Factor::Industry,
            score.min(MAX_SUB_SCORE),
            DataAvailability::Present,
        ),
        |result, note| result.with_evidence(note),
    )
}

fn priority_label(score: f64) -> &'static str {
    if score >= 85.0 {
        "High-priority"
    } else if score >= 70.0 {
        "Attractive"
    } else if score >= 55.0 {
        "Moderate"
    } else {
        "Lower-priority"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scoring::config::ScoringConfig;
    use crate::workflows::scoring::matcher::{FuzzyMatcher, IndustryTable};
    use crate::workflows::scoring::normalize::matching_key;

    fn score_for(industry: Option<&str>) -> FactorScore {
        let config = ScoringConfig::default();
        let table = IndustryTable::new(&config.industry.preferences);
        let context = SignalContext {
            config: &config,
            matcher: &FuzzyMatcher,
            industries: &table,
        };
        let mut lead = CleanedLead::empty(1);
        lead.industry = industry.map(str::to_string);
        lead.industry_key = industry.map(matching_key);
        score_industry(&lead, &context)
    }

    #[test]
    fn preferred_industry_scores_its_tier() {
        let result = score_for(Some("SaaS"));

        assert_eq!(result.score, 95.0);
        assert_eq!(result.headline(), Some("High-priority industry (SaaS)"));
    }

    #[test]
    fn tech_terms_add_bonus_up_to_cap() {
        let result = score_for(Some("Software"));

        assert_eq!(result.score, 97.0);
        assert_eq!(result.evidence.len(), 2);
    }

    #[test]
    fn service_terms_add_bonus() {
        let result = score_for(Some("Professional Services"));

        assert_eq!(result.score, 78.0);
    }

    #[test]
    fn unmatched_industry_scores_neutral() {
        let result = score_for(Some("Mining"));

        assert_eq!(result.score, 45.0);
        assert_eq!(result.availability, DataAvailability::Present);
    }

    #[test]
    fn missing_industry_scores_fallback() {
        let result = score_for(None);

        assert_eq!(result.score, 40.0);
        assert!(result.is_absent());
    }

    #[test]
    fn retail_is_not_mistaken_for_ai() {
        let result = score_for(Some("Retail"));

        assert_eq!(result.score, 55.0);
    }
}
