use serde::Serialize;

use super::dedup::DuplicateRecord;
use super::domain::{round1, Factor, LeadField, ScoredLead, Tier};
use super::explain::invalid_fields;
use super::report::{BatchSummary, LeadFilter};
use super::ScoredBatch;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredLeadView {
    pub row: usize,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub employee_count: Option<u32>,
    pub company_size_score: f64,
    pub industry_score: f64,
    pub financial_score: f64,
    pub website_quality_score: f64,
    pub market_position_score: f64,
    pub raw_score: f64,
    pub composite_score: f64,
    pub data_completeness: f64,
    pub score_percentile: f64,
    pub score: f64,
    pub tier: Tier,
    pub tier_label: &'static str,
    pub scoring_rationale: String,
    pub risk_factors: Vec<String>,
    pub growth_indicators: Vec<&'static str>,
    pub invalid_fields: Vec<LeadField>,
}

impl ScoredLead {
    pub fn to_view(&self) -> ScoredLeadView {
        let sub_score = |factor: Factor| round1(self.components.get(factor).score);

        ScoredLeadView {
            row: self.row,
            company: self.lead.company.clone(),
            industry: self.lead.industry.clone(),
            website: self.lead.website.clone(),
            employee_count: self.lead.employee_count,
            company_size_score: sub_score(Factor::CompanySize),
            industry_score: sub_score(Factor::Industry),
            financial_score: sub_score(Factor::Financial),
            website_quality_score: sub_score(Factor::Website),
            market_position_score: sub_score(Factor::MarketPosition),
            raw_score: self.raw_score,
            composite_score: self.composite_score,
            data_completeness: self.data_completeness,
            score_percentile: self.percentile,
            score: self.final_score,
            tier: self.tier,
            tier_label: self.tier.label(),
            scoring_rationale: self.rationale.clone(),
            risk_factors: self.risk_flags.iter().map(|flag| flag.label()).collect(),
            growth_indicators: self.growth_flags.iter().map(|flag| flag.label()).collect(),
            invalid_fields: invalid_fields(&self.risk_flags),
        }
    }
}

/// Ranked, filtered batch output as served by the API and the `--json` CLI mode.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub duplicates: Vec<DuplicateRecord>,
    pub matched: usize,
    pub leads: Vec<ScoredLeadView>,
}

impl ScoredBatch {
    pub fn report(&self, filter: &LeadFilter) -> BatchReport {
        let leads: Vec<ScoredLeadView> = filter
            .apply(&self.leads)
            .into_iter()
            .map(ScoredLead::to_view)
            .collect();

        BatchReport {
            summary: self.summary.clone(),
            duplicates: self.duplicates.clone(),
            matched: leads.len(),
            leads,
        }
    }
}
