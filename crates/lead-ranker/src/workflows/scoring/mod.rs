//! Rule-based lead scoring.
//!
//! A batch flows through normalization, deduplication, five independent signal extractors,
//! the weighted aggregator, the batch-relative rescaler and finally the explainability pass.
//! Only the rescaler looks across leads; everything else is a pure function of one lead and
//! the configuration.

pub mod aggregate;
pub mod config;
pub mod dedup;
pub mod domain;
pub mod explain;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod rescale;
pub mod signals;
pub mod views;

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;
use std::thread;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use aggregate::Aggregate;
pub use config::{DedupPolicy, ScoringConfig, ScoringConfigError};
pub use dedup::{DedupOutcome, DuplicateRecord};
pub use domain::{
    CleanedLead, DataAvailability, Factor, FactorScore, GrowthFlag, LeadBatch, LeadField,
    LeadIdentity, RawLead, RiskFlag, ScoreComponents, ScoredLead, Tier,
};
pub use matcher::{IndustryMatcher, MatchStrategy};
pub use report::{BatchSummary, LeadFilter};
pub use views::{BatchReport, ScoredLeadView};

use matcher::IndustryTable;
use signals::SignalContext;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Config(#[from] ScoringConfigError),
    #[error("required column '{column}' not found (available columns: {available})")]
    MissingRequiredColumn {
        column: &'static str,
        available: String,
    },
}

/// Every surviving lead of one batch run plus batch-level bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredBatch {
    /// Original column layout, used when exporting.
    pub headers: Vec<String>,
    /// Surviving leads in input order.
    pub leads: Vec<ScoredLead>,
    pub duplicates: Vec<DuplicateRecord>,
    pub summary: BatchSummary,
}

impl ScoredBatch {
    pub fn duplicates_removed(&self) -> usize {
        self.duplicates.len()
    }

    pub fn ranked(&self) -> Vec<&ScoredLead> {
        report::rank(&self.leads)
    }
}

struct Assessment {
    components: ScoreComponents,
    aggregate: Aggregate,
}

/// Holds a validated configuration. Scoring never mutates it, so one engine can serve
/// concurrent batches.
pub struct LeadScoringEngine {
    config: ScoringConfig,
    matcher: Box<dyn IndustryMatcher>,
    industries: IndustryTable,
}

impl LeadScoringEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        let matcher = config.industry.matcher.build();
        Self::with_matcher(config, matcher)
    }

    /// Uses a caller-supplied industry matcher instead of the configured strategy.
    pub fn with_matcher(
        config: ScoringConfig,
        matcher: Box<dyn IndustryMatcher>,
    ) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        let industries = IndustryTable::new(&config.industry.preferences);
        Ok(Self {
            config,
            matcher,
            industries,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score_batch(&self, batch: LeadBatch) -> Result<ScoredBatch, ScoringError> {
        if !batch.recognized.contains(&LeadField::Company) {
            return Err(ScoringError::MissingRequiredColumn {
                column: LeadField::Company.label(),
                available: batch.headers.join(", "),
            });
        }

        let total_rows = batch.len();
        info!(rows = total_rows, "scoring lead batch");

        let cleaned = normalize::normalize_batch(&batch, &self.config.normalizer);
        for issue in cleaned.iter().flat_map(|lead| &lead.issues) {
            debug!(row = issue.row, field = %issue.field, kind = issue.kind.label(), "field issue");
        }

        let DedupOutcome { leads, duplicates } = dedup::deduplicate(cleaned, self.config.dedup);
        for duplicate in &duplicates {
            debug!(
                row = duplicate.row,
                kept_row = duplicate.kept_row,
                identity = %duplicate.identity,
                "duplicate lead dropped"
            );
        }
        if !duplicates.is_empty() {
            info!(removed = duplicates.len(), "collapsed duplicate leads");
        }
        if leads.is_empty() {
            warn!("lead batch contained no rows");
        }

        let assessments = self.assess_all(&leads);
        let composites: Vec<f64> = assessments
            .iter()
            .map(|assessment| assessment.aggregate.composite_score)
            .collect();
        let rescaled = rescale::rescale(&composites, &self.config.rescale);

        let scored: Vec<ScoredLead> = leads
            .into_iter()
            .zip(assessments)
            .zip(rescaled)
            .map(|((lead, assessment), rescaled)| {
                self.finish(lead, assessment, rescaled.percentile, rescaled.final_score)
            })
            .collect();

        let summary = BatchSummary::from_leads(&scored, total_rows, duplicates.len());
        info!(
            scored = summary.scored,
            high = summary.high_priority,
            medium = summary.medium_priority,
            low = summary.low_priority,
            "lead batch scored"
        );

        Ok(ScoredBatch {
            headers: batch.headers,
            leads: scored,
            duplicates,
            summary,
        })
    }

    /// Per-lead work is independent, so large batches are split across scoped threads.
    fn assess_all(&self, leads: &[CleanedLead]) -> Vec<Assessment> {
        if leads.len() <= self.config.parallel_threshold {
            return leads.iter().map(|lead| self.assess(lead)).collect();
        }

        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let chunk_size = leads.len().div_ceil(workers).max(1);
        debug!(workers, chunk_size, "scoring batch in parallel");

        thread::scope(|scope| {
            let handles: Vec<_> = leads
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|lead| self.assess(lead))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    fn assess(&self, lead: &CleanedLead) -> Assessment {
        let context = SignalContext {
            config: &self.config,
            matcher: self.matcher.as_ref(),
            industries: &self.industries,
        };
        let components = signals::extract_components(lead, &context);
        let aggregate = aggregate::aggregate(lead, &components, &self.config);
        Assessment {
            components,
            aggregate,
        }
    }

    fn finish(
        &self,
        lead: CleanedLead,
        assessment: Assessment,
        percentile: f64,
        final_score: f64,
    ) -> ScoredLead {
        let Assessment {
            components,
            aggregate,
        } = assessment;
        // Batch position may not lift a lead whose factors mostly lack data.
        let final_score = if components.absent_count() >= self.config.low_quality_min_absent {
            final_score.min(aggregate.composite_score)
        } else {
            final_score
        };
        let explanation =
            explain::explain(&lead, &components, &aggregate, final_score, &self.config);
        let tier = Tier::from_score(
            final_score,
            self.config.explain.high_tier_min,
            self.config.explain.medium_tier_min,
        );

        ScoredLead {
            row: lead.row,
            identity: lead.identity(),
            components,
            raw_score: aggregate.raw_score,
            adjustments: aggregate.adjustments,
            composite_score: aggregate.composite_score,
            data_completeness: lead.data_completeness(),
            percentile,
            final_score,
            tier,
            rationale: explanation.rationale,
            risk_flags: explanation.risk_flags,
            growth_flags: explanation.growth_flags,
            lead,
        }
    }
}
