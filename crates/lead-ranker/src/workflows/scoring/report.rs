use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{round1, ScoredLead, Tier};
use super::normalize::matching_key;

const UNKNOWN_INDUSTRY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quartiles with linear interpolation between closest ranks.
pub fn quartiles(values: &[f64]) -> Option<Quartiles> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let at = |fraction: f64| {
        let position = fraction * (sorted.len() - 1) as f64;
        let lower = position.floor() as usize;
        let upper = position.ceil() as usize;
        let weight = position - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    };

    Some(Quartiles {
        q1: at(0.25),
        median: at(0.5),
        q3: at(0.75),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryBreakdownEntry {
    pub industry: String,
    pub count: usize,
    pub mean_score: f64,
}

/// Batch-level statistics over the surviving leads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub scored: usize,
    pub duplicates_removed: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub field_issues: usize,
    pub mean_score: Option<f64>,
    pub composite_quartiles: Option<Quartiles>,
    pub final_quartiles: Option<Quartiles>,
    pub industries: Vec<IndustryBreakdownEntry>,
}

impl BatchSummary {
    pub fn from_leads(leads: &[ScoredLead], total_rows: usize, duplicates_removed: usize) -> Self {
        let tier_count = |tier: Tier| leads.iter().filter(|lead| lead.tier == tier).count();
        let finals: Vec<f64> = leads.iter().map(|lead| lead.final_score).collect();
        let composites: Vec<f64> = leads.iter().map(|lead| lead.composite_score).collect();
        let mean_score = (!finals.is_empty())
            .then(|| round1(finals.iter().sum::<f64>() / finals.len() as f64));

        let mut by_industry: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for lead in leads {
            let industry = lead.lead.industry.as_deref().unwrap_or(UNKNOWN_INDUSTRY);
            let entry = by_industry.entry(industry).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += lead.final_score;
        }
        let mut industries: Vec<IndustryBreakdownEntry> = by_industry
            .into_iter()
            .map(|(industry, (count, total))| IndustryBreakdownEntry {
                industry: industry.to_string(),
                count,
                mean_score: round1(total / count as f64),
            })
            .collect();
        industries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.industry.cmp(&b.industry)));

        Self {
            total_rows,
            scored: leads.len(),
            duplicates_removed,
            high_priority: tier_count(Tier::High),
            medium_priority: tier_count(Tier::Medium),
            low_priority: tier_count(Tier::Low),
            field_issues: leads.iter().map(|lead| lead.lead.issues.len()).sum(),
            mean_score,
            composite_quartiles: quartiles(&composites),
            final_quartiles: quartiles(&finals),
            industries,
        }
    }
}

/// Best first: final score, then composite, then the earlier row.
pub fn rank(leads: &[ScoredLead]) -> Vec<&ScoredLead> {
    let mut ranked: Vec<&ScoredLead> = leads.iter().collect();
    ranked.sort_by(|a, b| compare_rank(a, b));
    ranked
}

fn compare_rank(a: &ScoredLead, b: &ScoredLead) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then_with(|| b.composite_score.total_cmp(&a.composite_score))
        .then_with(|| a.row.cmp(&b.row))
}

/// Presentation filter. Leads without an employee count never pass an employee bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFilter {
    pub min_score: Option<f64>,
    /// Case-insensitive fragment of the industry name.
    pub industry: Option<String>,
    pub min_employees: Option<u32>,
    pub max_employees: Option<u32>,
    pub top: Option<usize>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &ScoredLead) -> bool {
        if self.min_score.is_some_and(|min| lead.final_score < min) {
            return false;
        }

        if let Some(wanted) = self.industry.as_deref().map(matching_key) {
            let found = lead
                .lead
                .industry_key
                .as_deref()
                .is_some_and(|industry| industry.contains(wanted.as_str()));
            if !wanted.is_empty() && !found {
                return false;
            }
        }

        if self.min_employees.is_some() || self.max_employees.is_some() {
            let Some(count) = lead.lead.employee_count else {
                return false;
            };
            if self.min_employees.is_some_and(|min| count < min)
                || self.max_employees.is_some_and(|max| count > max)
            {
                return false;
            }
        }

        true
    }

    /// Ranks, filters, then truncates to `top`.
    pub fn apply<'a>(&self, leads: &'a [ScoredLead]) -> Vec<&'a ScoredLead> {
        let mut selected: Vec<&ScoredLead> = rank(leads)
            .into_iter()
            .filter(|lead| self.matches(lead))
            .collect();
        if let Some(top) = self.top {
            selected.truncate(top);
        }
        selected
    }
}
