use super::common::*;
use crate::workflows::scoring::LeadFilter;

fn companies(leads: &[&crate::workflows::scoring::ScoredLead]) -> Vec<String> {
    leads
        .iter()
        .map(|lead| lead.lead.company.clone().unwrap_or_default())
        .collect()
}

#[test]
fn summary_counts_tiers_and_industries() {
    let batch = score(mixed_batch());
    let summary = &batch.summary;

    assert_eq!(summary.scored, 4);
    assert_eq!(summary.high_priority, 2);
    assert_eq!(
        summary.high_priority + summary.medium_priority + summary.low_priority,
        summary.scored
    );
    assert_eq!(summary.industries.len(), 4);
    assert!(summary.industries.iter().all(|entry| entry.count == 1));
    assert!(summary.final_quartiles.is_some());
    assert!(summary.mean_score.is_some());
}

#[test]
fn industry_filter_is_case_insensitive() {
    let batch = score(mixed_batch());
    let filter = LeadFilter {
        industry: Some("SAAS".to_string()),
        ..LeadFilter::default()
    };

    assert_eq!(companies(&filter.apply(&batch.leads)), vec!["Acme Tech"]);
}

#[test]
fn minimum_score_keeps_high_tier_only() {
    let batch = score(mixed_batch());
    let filter = LeadFilter {
        min_score: Some(80.0),
        ..LeadFilter::default()
    };

    assert_eq!(
        companies(&filter.apply(&batch.leads)),
        vec!["Contoso Health", "Acme Tech"]
    );
}

#[test]
fn employee_bounds_skip_unknown_headcounts() {
    let batch = score(mixed_batch());
    let filter = LeadFilter {
        min_employees: Some(100),
        ..LeadFilter::default()
    };

    assert_eq!(
        companies(&filter.apply(&batch.leads)),
        vec!["Contoso Health", "Northwind Traders"]
    );
}

#[test]
fn top_truncates_after_ranking() {
    let batch = score(mixed_batch());
    let filter = LeadFilter {
        top: Some(1),
        ..LeadFilter::default()
    };

    assert_eq!(companies(&filter.apply(&batch.leads)), vec!["Contoso Health"]);
}

#[test]
fn report_views_carry_labels() {
    let batch = score(mixed_batch());

    let report = batch.report(&LeadFilter::default());

    assert_eq!(report.matched, 4);
    let top = &report.leads[0];
    assert_eq!(top.company.as_deref(), Some("Contoso Health"));
    assert_eq!(top.tier_label, "High");
    let last = &report.leads[3];
    assert!(last.risk_factors.iter().any(|label| label == "Missing financials"));
}
