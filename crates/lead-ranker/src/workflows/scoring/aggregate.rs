use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use super::domain::{
    clamp_score, round1, Adjustment, AdjustmentKind, CleanedLead, Factor, ScoreComponents,
};
use super::matcher::first_contained_term;

/// Weighted sum plus the rule-based adjustments applied on top of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub raw_score: f64,
    pub adjustments: Vec<Adjustment>,
    pub composite_score: f64,
}

impl Aggregate {
    pub fn has(&self, kind: AdjustmentKind) -> bool {
        self.adjustments.iter().any(|adjustment| adjustment.kind == kind)
    }
}

pub fn aggregate(
    lead: &CleanedLead,
    components: &ScoreComponents,
    config: &ScoringConfig,
) -> Aggregate {
    let raw_score: f64 = Factor::ordered()
        .into_iter()
        .map(|factor| config.weights.weight(factor) * components.get(factor).score)
        .sum();

    let rules = &config.adjustments;
    let mut bonuses = Vec::new();
    let mut penalties = Vec::new();

    if let Some(sector) = lead
        .industry_key
        .as_deref()
        .and_then(|key| first_contained_term(key, &rules.high_growth_sectors))
    {
        bonuses.push(adjustment(
            AdjustmentKind::HighGrowthSector,
            rules.high_growth_bonus,
            format!("high-growth sector ({sector})"),
        ));
    }

    let strong = components
        .iter()
        .filter(|factor| factor.score >= rules.strong_factor_threshold)
        .count();
    if strong >= 3 {
        bonuses.push(adjustment(
            AdjustmentKind::StrongFactors,
            rules.strong_factor_bonus_three,
            format!("{strong} strong factors"),
        ));
    } else if strong == 2 {
        bonuses.push(adjustment(
            AdjustmentKind::StrongFactors,
            rules.strong_factor_bonus_two,
            "2 strong factors".to_string(),
        ));
    }

    if components.industry.score >= rules.strategic_fit_threshold
        && components.company_size.score >= rules.strategic_fit_threshold
    {
        bonuses.push(adjustment(
            AdjustmentKind::StrategicFit,
            rules.strategic_fit_bonus,
            "strategic fit: preferred industry at ideal size".to_string(),
        ));
    }

    let scored: Vec<f64> = components
        .iter()
        .map(|factor| factor.score)
        .filter(|score| *score > 0.0)
        .collect();
    if scored.len() >= rules.consistency_min_factors {
        let spread = population_std_dev(&scored);
        let bonus = if spread < rules.consistency_tight_spread {
            Some(rules.consistency_tight_bonus)
        } else if spread < rules.consistency_loose_spread {
            Some(rules.consistency_loose_bonus)
        } else {
            None
        };
        if let Some(bonus) = bonus.filter(|bonus| *bonus > 0.0) {
            bonuses.push(adjustment(
                AdjustmentKind::Consistency,
                bonus,
                format!("consistent profile (spread {spread:.1})"),
            ));
        }
    }

    if components.website.score < rules.weak_web_threshold {
        penalties.push(adjustment(
            AdjustmentKind::WeakWebPresence,
            -rules.weak_web_penalty,
            "weak web presence".to_string(),
        ));
    }
    for factor in [Factor::Industry, Factor::CompanySize] {
        if components.get(factor).score < rules.critical_threshold {
            penalties.push(adjustment(
                AdjustmentKind::CriticalFactor,
                -rules.critical_penalty,
                format!("{} critically low", factor.label().to_lowercase()),
            ));
        }
    }
    let absent = components.absent_count();
    if absent >= config.low_quality_min_absent {
        penalties.push(adjustment(
            AdjustmentKind::LowDataCompleteness,
            -rules.low_completeness_penalty,
            format!("{absent} factors lack data"),
        ));
    }

    let bonus_total: f64 = bonuses.iter().map(|item| item.delta).sum();
    if bonus_total > rules.max_total_bonus {
        bonuses.push(adjustment(
            AdjustmentKind::BonusCap,
            rules.max_total_bonus - bonus_total,
            format!("bonuses capped at +{:.0}", rules.max_total_bonus),
        ));
    }
    let penalty_total: f64 = penalties.iter().map(|item| item.delta).sum();
    if penalty_total < -rules.max_total_penalty {
        penalties.push(adjustment(
            AdjustmentKind::PenaltyFloor,
            -rules.max_total_penalty - penalty_total,
            format!("penalties floored at -{:.0}", rules.max_total_penalty),
        ));
    }

    let mut adjustments = bonuses;
    adjustments.extend(penalties);
    let delta: f64 = adjustments.iter().map(|item| item.delta).sum();

    Aggregate {
        raw_score: round1(raw_score),
        composite_score: round1(clamp_score(raw_score + delta)),
        adjustments,
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    variance.sqrt()
}

fn adjustment(kind: AdjustmentKind, delta: f64, reason: String) -> Adjustment {
    Adjustment {
        kind,
        delta,
        reason,
    }
}
