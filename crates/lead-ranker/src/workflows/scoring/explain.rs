use std::collections::BTreeSet;

use super::aggregate::Aggregate;
use super::config::ScoringConfig;
use super::domain::{
    AdjustmentKind, CleanedLead, Factor, GrowthFlag, IssueKind, LeadField, RiskFlag,
    ScoreComponents,
};

const FALLBACK_RATIONALE: &str = "Standard analysis applied";

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub rationale: String,
    pub risk_flags: BTreeSet<RiskFlag>,
    pub growth_flags: BTreeSet<GrowthFlag>,
}

pub fn explain(
    lead: &CleanedLead,
    components: &ScoreComponents,
    aggregate: &Aggregate,
    final_score: f64,
    config: &ScoringConfig,
) -> Explanation {
    Explanation {
        rationale: rationale(components, aggregate, config),
        risk_flags: risk_flags(lead, components, final_score, config),
        growth_flags: growth_flags(lead, components, aggregate, config),
    }
}

/// Headline evidence of the factors contributing most (weight times score), then adjustments.
fn rationale(components: &ScoreComponents, aggregate: &Aggregate, config: &ScoringConfig) -> String {
    let mut contributions: Vec<(Factor, f64)> = Factor::ordered()
        .into_iter()
        .map(|factor| (factor, config.weights.weight(factor) * components.get(factor).score))
        .collect();
    contributions.sort_by(|(left, a), (right, b)| b.total_cmp(a).then(left.cmp(right)));

    let mut parts: Vec<String> = contributions
        .into_iter()
        .take(config.explain.rationale_factors)
        .filter_map(|(factor, _)| components.get(factor).headline())
        .map(str::to_string)
        .collect();

    parts.extend(
        aggregate
            .adjustments
            .iter()
            .map(|adjustment| format!("{:+.0} {}", adjustment.delta, adjustment.reason)),
    );

    if parts.is_empty() {
        FALLBACK_RATIONALE.to_string()
    } else {
        parts.join("; ")
    }
}

fn risk_flags(
    lead: &CleanedLead,
    components: &ScoreComponents,
    final_score: f64,
    config: &ScoringConfig,
) -> BTreeSet<RiskFlag> {
    let thresholds = &config.explain;
    let mut flags = BTreeSet::new();

    if lead.employee_count.is_none() {
        flags.insert(RiskFlag::MissingEmployeeCount);
    }
    if lead.industry_key.is_none() {
        flags.insert(RiskFlag::MissingIndustry);
    }
    if !lead.has_financials() {
        flags.insert(RiskFlag::MissingFinancials);
    }
    if lead.website.is_none() {
        flags.insert(RiskFlag::NoWebsite);
    }
    for issue in &lead.issues {
        match issue.kind {
            IssueKind::Missing => {
                if !covered_by_specific_flag(lead, issue.field) {
                    flags.insert(RiskFlag::MissingField(issue.field));
                }
            }
            IssueKind::Malformed | IssueKind::OutOfRange => {
                flags.insert(RiskFlag::InvalidField(issue.field));
            }
        }
    }
    if components.absent_count() >= config.low_quality_min_absent {
        flags.insert(RiskFlag::LowDataQuality);
    }
    if lead.data_completeness() < thresholds.limited_data_below {
        flags.insert(RiskFlag::LimitedData);
    }

    if components.company_size.score < thresholds.size_mismatch_below {
        flags.insert(RiskFlag::SizeMismatch);
    }
    if components.industry.score < thresholds.industry_challenge_below {
        flags.insert(RiskFlag::IndustryChallenges);
    }
    if components.financial.score < thresholds.financial_uncertainty_below {
        flags.insert(RiskFlag::FinancialUncertainty);
    }
    if components.website.score < thresholds.weak_digital_below {
        flags.insert(RiskFlag::WeakDigitalPresence);
    }
    if final_score < thresholds.low_score_threshold {
        flags.insert(RiskFlag::LowPriority);
    }

    flags
}

/// Fields whose absence already has a dedicated flag.
fn covered_by_specific_flag(lead: &CleanedLead, field: LeadField) -> bool {
    match field {
        LeadField::EmployeeCount | LeadField::Industry | LeadField::Website => true,
        LeadField::Revenue | LeadField::GrowthRate | LeadField::ProfitMargin => {
            !lead.has_financials()
        }
        _ => false,
    }
}

fn growth_flags(
    lead: &CleanedLead,
    components: &ScoreComponents,
    aggregate: &Aggregate,
    config: &ScoringConfig,
) -> BTreeSet<GrowthFlag> {
    let thresholds = &config.explain;
    let mut flags = BTreeSet::new();

    if aggregate.has(AdjustmentKind::HighGrowthSector) {
        flags.insert(GrowthFlag::HighGrowthSector);
    }
    if components.industry.score >= thresholds.high_priority_industry_min {
        flags.insert(GrowthFlag::HighPriorityIndustry);
    }
    if components.market_position.score >= thresholds.strong_market_min {
        flags.insert(GrowthFlag::StrongMarketPosition);
    }
    if lead
        .growth_rate
        .is_some_and(|rate| rate > thresholds.high_growth_rate)
    {
        flags.insert(GrowthFlag::HighGrowthRate);
    }
    if lead
        .tld
        .as_deref()
        .is_some_and(|tld| config.website.is_tech_tld(tld))
    {
        flags.insert(GrowthFlag::TechForwardDomain);
    }
    if components.company_size.score >= thresholds.optimal_size_min {
        flags.insert(GrowthFlag::OptimalCompanySize);
    }
    if lead.company_age.is_some_and(|age| thresholds.is_mature(age)) {
        flags.insert(GrowthFlag::MaturitySweetSpot);
    }

    flags
}

/// Invalid-field flags only; used when reporting data problems separately from score risks.
pub fn invalid_fields(flags: &BTreeSet<RiskFlag>) -> Vec<LeadField> {
    flags
        .iter()
        .filter_map(|flag| match flag {
            RiskFlag::InvalidField(field) => Some(*field),
            _ => None,
        })
        .collect()
}
