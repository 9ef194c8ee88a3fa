use super::{capped_bonus, matched_terms, SignalContext};
use crate::workflows::scoring::domain::{CleanedLead, DataAvailability, Factor, FactorScore};

const CONCISE_NAME_MAX_WORDS: usize = 3;

/// Text-signal heuristic over company name, description and industry.
pub fn score_market_position(lead: &CleanedLead, context: &SignalContext<'_>) -> FactorScore {
    let config = &context.config.market;
    let name = lead.company_key.as_deref().unwrap_or_default();
    let description = lead.description_key.as_deref().unwrap_or_default();
    let industry = lead.industry_key.as_deref();

    let mut score = config.base_score;
    let mut details = Vec::new();

    let mut leadership = matched_terms(name, &config.leadership_terms);
    leadership.extend(matched_terms(description, &config.leadership_terms));
    if !leadership.is_empty() {
        let bonus = capped_bonus(leadership.len(), config.leadership_bonus, config.leadership_cap);
        score += bonus;
        details.push(format!("Leadership language (+{bonus:.0})"));
    }

    let mut innovation = matched_terms(name, &config.innovation_terms);
    innovation.extend(matched_terms(description, &config.innovation_terms));
    if !innovation.is_empty() {
        let bonus = capped_bonus(innovation.len(), config.innovation_bonus, config.innovation_cap);
        score += bonus;
        details.push(format!("Innovation signals (+{bonus:.0})"));
    }

    if let Some(industry) = industry {
        if !matched_terms(industry, &config.core_sector_terms).is_empty() {
            score += config.core_sector_bonus;
            details.push(format!("Core technology sector (+{:.0})", config.core_sector_bonus));
        } else if !matched_terms(industry, &config.adjacent_sector_terms).is_empty() {
            score += config.adjacent_sector_bonus;
            details.push(format!(
                "Adjacent growth sector (+{:.0})",
                config.adjacent_sector_bonus
            ));
        }

        let name_tokens: Vec<&str> = name.split_whitespace().collect();
        let named_after_sector = context
            .industries
            .best_match(context.matcher, industry)
            .is_some_and(|found| {
                found
                    .key
                    .split_whitespace()
                    .filter(|term| term.len() >= 3)
                    .any(|term| name_tokens.contains(&term))
            });
        if named_after_sector {
            score += config.industry_name_bonus;
            details.push(format!(
                "Name reflects its sector (+{:.0})",
                config.industry_name_bonus
            ));
        }
    }

    let concise = lead.company.as_deref().is_some_and(|company| {
        let words: Vec<&str> = company.split_whitespace().collect();
        words.len() <= CONCISE_NAME_MAX_WORDS
            && words
                .iter()
                .all(|word| word.chars().all(char::is_alphanumeric))
    });
    if concise {
        score += config.concise_name_bonus;
        details.push(format!("Concise brand name (+{:.0})", config.concise_name_bonus));
    }

    let availability = if lead.company.is_none() && lead.description_key.is_none() {
        DataAvailability::Absent
    } else if lead.description_key.is_none() || industry.is_none() {
        DataAvailability::Partial
    } else {
        DataAvailability::Present
    };

    let position = if score >= 70.0 {
        "Strong market signals"
    } else if score >= 50.0 {
        "Moderate market signals"
    } else {
        "Limited market signals"
    };

    let mut result = FactorScore::new(Factor::MarketPosition, score, availability)
        .with_evidence(position.to_string());
    result.evidence.extend(details);
    result
}
