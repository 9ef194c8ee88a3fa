use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{Factor, MAX_SUB_SCORE};
use super::matcher::MatchStrategy;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Every tunable constant of the pipeline. Missing JSON keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    pub company_size: CompanySizeConfig,
    pub industry: IndustryConfig,
    pub financial: FinancialConfig,
    pub website: WebsiteConfig,
    pub market: MarketConfig,
    pub adjustments: AdjustmentConfig,
    pub rescale: RescaleConfig,
    pub explain: ExplainConfig,
    pub normalizer: NormalizerSettings,
    pub dedup: DedupPolicy,
    /// Absent-factor count at which a lead is treated as low data quality.
    pub low_quality_min_absent: usize,
    /// Batches larger than this are scored across worker threads.
    pub parallel_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            company_size: CompanySizeConfig::default(),
            industry: IndustryConfig::default(),
            financial: FinancialConfig::default(),
            website: WebsiteConfig::default(),
            market: MarketConfig::default(),
            adjustments: AdjustmentConfig::default(),
            rescale: RescaleConfig::default(),
            explain: ExplainConfig::default(),
            normalizer: NormalizerSettings::default(),
            dedup: DedupPolicy::default(),
            low_quality_min_absent: 3,
            parallel_threshold: 2048,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid scoring configuration: {}", problems.join("; "))]
pub struct ScoringConfigError {
    pub problems: Vec<String>,
}

impl ScoringConfig {
    /// Reports every problem at once so a bad config file can be fixed in one pass.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let mut problems = Vec::new();

        let mut sum = 0.0;
        for factor in Factor::ordered() {
            let weight = self.weights.weight(factor);
            if !weight.is_finite() || weight < 0.0 {
                problems.push(format!(
                    "weights.{}: must be a finite non-negative number (got {weight})",
                    factor_key(factor)
                ));
            } else {
                sum += weight;
            }
        }
        if problems.is_empty() && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            problems.push(format!("weights: must sum to 1.0 (got {sum:.6})"));
        }

        let size = &self.company_size;
        if size.ideal_min == 0 || size.ideal_min >= size.ideal_max {
            problems.push(format!(
                "company_size: ideal_min must be positive and below ideal_max (got {}..{})",
                size.ideal_min, size.ideal_max
            ));
        }
        check_score(&mut problems, "company_size.peak_score", size.peak_score);
        check_score(&mut problems, "company_size.edge_score", size.edge_score);
        check_score(&mut problems, "company_size.floor_score", size.floor_score);
        check_score(&mut problems, "company_size.missing_score", size.missing_score);
        check_magnitude(&mut problems, "company_size.taper_per_doubling", size.taper_per_doubling);

        let industry = &self.industry;
        if industry.preferences.is_empty() {
            problems.push("industry.preferences: at least one industry is required".to_string());
        }
        for (index, preference) in industry.preferences.iter().enumerate() {
            if preference.name.trim().is_empty() {
                problems.push(format!("industry.preferences[{index}].name: must not be blank"));
            }
            check_score(
                &mut problems,
                &format!("industry.preferences[{index}].score"),
                preference.score,
            );
        }
        check_score(&mut problems, "industry.unmatched_score", industry.unmatched_score);
        check_score(&mut problems, "industry.missing_score", industry.missing_score);
        check_magnitude(&mut problems, "industry.tech_bonus", industry.tech_bonus);
        check_magnitude(&mut problems, "industry.service_bonus", industry.service_bonus);

        for (name, scale) in [
            ("financial.revenue", &self.financial.revenue),
            ("financial.growth", &self.financial.growth),
            ("financial.margin", &self.financial.margin),
        ] {
            for (index, band) in scale.bands.iter().enumerate() {
                if !band.at_least.is_finite() {
                    problems.push(format!("{name}.bands[{index}].at_least: must be finite"));
                }
                check_score(&mut problems, &format!("{name}.bands[{index}].score"), band.score);
            }
            check_score(&mut problems, &format!("{name}.otherwise"), scale.otherwise);
        }
        check_score(&mut problems, "financial.missing_score", self.financial.missing_score);

        let website = &self.website;
        check_score(&mut problems, "website.base_score", website.base_score);
        check_score(&mut problems, "website.missing_score", website.missing_score);
        check_magnitude(&mut problems, "website.keyword_bonus", website.keyword_bonus);
        check_magnitude(&mut problems, "website.keyword_cap", website.keyword_cap);

        let market = &self.market;
        check_score(&mut problems, "market.base_score", market.base_score);
        check_magnitude(&mut problems, "market.leadership_bonus", market.leadership_bonus);
        check_magnitude(&mut problems, "market.leadership_cap", market.leadership_cap);
        check_magnitude(&mut problems, "market.innovation_bonus", market.innovation_bonus);
        check_magnitude(&mut problems, "market.innovation_cap", market.innovation_cap);

        let adjustments = &self.adjustments;
        for (name, value) in [
            ("adjustments.high_growth_bonus", adjustments.high_growth_bonus),
            ("adjustments.strong_factor_bonus_two", adjustments.strong_factor_bonus_two),
            ("adjustments.strong_factor_bonus_three", adjustments.strong_factor_bonus_three),
            ("adjustments.strategic_fit_bonus", adjustments.strategic_fit_bonus),
            ("adjustments.weak_web_penalty", adjustments.weak_web_penalty),
            ("adjustments.critical_penalty", adjustments.critical_penalty),
            ("adjustments.low_completeness_penalty", adjustments.low_completeness_penalty),
            ("adjustments.consistency_tight_spread", adjustments.consistency_tight_spread),
            ("adjustments.consistency_tight_bonus", adjustments.consistency_tight_bonus),
            ("adjustments.consistency_loose_spread", adjustments.consistency_loose_spread),
            ("adjustments.consistency_loose_bonus", adjustments.consistency_loose_bonus),
            ("adjustments.max_total_bonus", adjustments.max_total_bonus),
            ("adjustments.max_total_penalty", adjustments.max_total_penalty),
        ] {
            check_magnitude(&mut problems, name, value);
        }
        if adjustments.consistency_tight_spread > adjustments.consistency_loose_spread {
            problems.push(
                "adjustments: consistency_tight_spread must not exceed consistency_loose_spread"
                    .to_string(),
            );
        }
        if adjustments.consistency_min_factors < 2
            || adjustments.consistency_min_factors > Factor::ordered().len()
        {
            problems.push(format!(
                "adjustments.consistency_min_factors: must be between 2 and {} (got {})",
                Factor::ordered().len(),
                adjustments.consistency_min_factors
            ));
        }

        let weight = self.rescale.percentile_weight;
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            problems.push(format!(
                "rescale.percentile_weight: must lie within [0, 1] (got {weight})"
            ));
        }

        let explain = &self.explain;
        if explain.rationale_factors == 0 || explain.rationale_factors > Factor::ordered().len() {
            problems.push(format!(
                "explain.rationale_factors: must be between 1 and {} (got {})",
                Factor::ordered().len(),
                explain.rationale_factors
            ));
        }
        check_score(&mut problems, "explain.high_tier_min", explain.high_tier_min);
        check_score(&mut problems, "explain.medium_tier_min", explain.medium_tier_min);
        if explain.medium_tier_min > explain.high_tier_min {
            problems.push("explain: medium_tier_min must not exceed high_tier_min".to_string());
        }
        for (name, value) in [
            ("explain.low_score_threshold", explain.low_score_threshold),
            ("explain.limited_data_below", explain.limited_data_below),
            ("explain.size_mismatch_below", explain.size_mismatch_below),
            ("explain.industry_challenge_below", explain.industry_challenge_below),
            ("explain.financial_uncertainty_below", explain.financial_uncertainty_below),
            ("explain.weak_digital_below", explain.weak_digital_below),
            ("explain.high_priority_industry_min", explain.high_priority_industry_min),
            ("explain.strong_market_min", explain.strong_market_min),
            ("explain.optimal_size_min", explain.optimal_size_min),
        ] {
            check_score(&mut problems, name, value);
        }
        if !explain.high_growth_rate.is_finite() {
            problems.push(format!(
                "explain.high_growth_rate: must be finite (got {})",
                explain.high_growth_rate
            ));
        }
        if explain.maturity_min_years > explain.maturity_max_years {
            problems.push(format!(
                "explain: maturity_min_years must not exceed maturity_max_years (got {}..{})",
                explain.maturity_min_years, explain.maturity_max_years
            ));
        }

        if let Some(reference) = self.normalizer.reference_year {
            if reference < self.normalizer.min_founding_year {
                problems.push(format!(
                    "normalizer: reference_year {reference} precedes min_founding_year {}",
                    self.normalizer.min_founding_year
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ScoringConfigError { problems })
        }
    }
}

fn factor_key(factor: Factor) -> &'static str {
    match factor {
        Factor::CompanySize => "company_size",
        Factor::Industry => "industry",
        Factor::Financial => "financial",
        Factor::Website => "website",
        Factor::MarketPosition => "market_position",
    }
}

fn check_score(problems: &mut Vec<String>, name: &str, value: f64) {
    if !value.is_finite() || !(0.0..=MAX_SUB_SCORE).contains(&value) {
        problems.push(format!("{name}: must lie within [0, 100] (got {value})"));
    }
}

fn check_magnitude(problems: &mut Vec<String>, name: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        problems.push(format!("{name}: must be a finite non-negative number (got {value})"));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub company_size: f64,
    pub industry: f64,
    pub financial: f64,
    pub website: f64,
    pub market_position: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            company_size: 0.25,
            industry: 0.30,
            financial: 0.25,
            website: 0.10,
            market_position: 0.10,
        }
    }
}

impl FactorWeights {
    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::CompanySize => self.company_size,
            Factor::Industry => self.industry,
            Factor::Financial => self.financial,
            Factor::Website => self.website,
            Factor::MarketPosition => self.market_position,
        }
    }
}

/// Sweet-spot band scored on a log2 scale: the peak sits at the geometric midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySizeConfig {
    pub ideal_min: u32,
    pub ideal_max: u32,
    pub peak_score: f64,
    pub edge_score: f64,
    pub taper_per_doubling: f64,
    pub floor_score: f64,
    pub missing_score: f64,
}

impl Default for CompanySizeConfig {
    fn default() -> Self {
        Self {
            ideal_min: 50,
            ideal_max: 300,
            peak_score: 95.0,
            edge_score: 85.0,
            taper_per_doubling: 12.0,
            floor_score: 20.0,
            missing_score: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryPreference {
    pub name: String,
    pub score: f64,
}

impl IndustryPreference {
    fn new(name: &str, score: f64) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryConfig {
    pub preferences: Vec<IndustryPreference>,
    pub matcher: MatchStrategy,
    pub unmatched_score: f64,
    pub missing_score: f64,
    pub tech_terms: Vec<String>,
    pub tech_bonus: f64,
    pub service_terms: Vec<String>,
    pub service_bonus: f64,
}

impl Default for IndustryConfig {
    fn default() -> Self {
        let preferences = [
            ("SaaS", 95.0),
            ("Software", 92.0),
            ("Technology", 90.0),
            ("Fintech", 88.0),
            ("Healthcare Technology", 87.0),
            ("HealthTech", 87.0),
            ("E-commerce", 85.0),
            ("Ecommerce", 85.0),
            ("Healthcare", 82.0),
            ("Medical Devices", 80.0),
            ("Biotechnology", 78.0),
            ("Professional Services", 75.0),
            ("Business Services", 73.0),
            ("Industrial", 72.0),
            ("Manufacturing", 70.0),
            ("EdTech", 68.0),
            ("Education", 65.0),
            ("Financial Services", 63.0),
            ("Real Estate", 60.0),
            ("Insurance", 58.0),
            ("Retail", 55.0),
            ("Energy", 52.0),
            ("Construction", 50.0),
            ("Transportation", 48.0),
            ("Agriculture", 45.0),
            ("Utilities", 40.0),
            ("Government", 35.0),
        ]
        .into_iter()
        .map(|(name, score)| IndustryPreference::new(name, score))
        .collect();

        Self {
            preferences,
            matcher: MatchStrategy::default(),
            unmatched_score: 45.0,
            missing_score: 40.0,
            tech_terms: strings(&["tech", "software", "digital", "ai", "data"]),
            tech_bonus: 5.0,
            service_terms: strings(&["service", "consulting", "solution"]),
            service_bonus: 3.0,
        }
    }
}

/// Threshold step function: the band with the highest `at_least` not above the value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScale {
    pub bands: Vec<Threshold>,
    pub otherwise: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub at_least: f64,
    pub score: f64,
}

impl ThresholdScale {
    fn from_pairs(pairs: &[(f64, f64)], otherwise: f64) -> Self {
        Self {
            bands: pairs
                .iter()
                .map(|&(at_least, score)| Threshold { at_least, score })
                .collect(),
            otherwise,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .filter(|band| value >= band.at_least)
            .max_by(|a, b| a.at_least.total_cmp(&b.at_least))
            .map_or(self.otherwise, |band| band.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialConfig {
    pub revenue: ThresholdScale,
    pub growth: ThresholdScale,
    pub margin: ThresholdScale,
    pub missing_score: f64,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            revenue: ThresholdScale::from_pairs(
                &[
                    (100_000_000.0, 95.0),
                    (50_000_000.0, 90.0),
                    (25_000_000.0, 85.0),
                    (10_000_000.0, 80.0),
                    (5_000_000.0, 75.0),
                    (1_000_000.0, 70.0),
                    (500_000.0, 60.0),
                ],
                50.0,
            ),
            growth: ThresholdScale::from_pairs(
                &[
                    (100.0, 95.0),
                    (50.0, 90.0),
                    (25.0, 80.0),
                    (10.0, 70.0),
                    (0.0, 60.0),
                    (-10.0, 40.0),
                ],
                20.0,
            ),
            margin: ThresholdScale::from_pairs(&[(20.0, 90.0), (10.0, 80.0), (0.0, 65.0)], 35.0),
            missing_score: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TldBonus {
    pub tld: String,
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    pub base_score: f64,
    pub tld_bonuses: Vec<TldBonus>,
    pub other_tld_bonus: f64,
    /// TLDs treated as a tech-forward signal in the growth flags.
    pub tech_tlds: Vec<String>,
    pub tech_keywords: Vec<String>,
    pub keyword_bonus: f64,
    pub keyword_cap: f64,
    pub missing_score: f64,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        let tld_bonuses = [
            ("io", 25.0),
            ("ai", 25.0),
            ("tech", 25.0),
            ("co", 25.0),
            ("com", 20.0),
            ("net", 10.0),
            ("org", 10.0),
        ]
        .into_iter()
        .map(|(tld, bonus)| TldBonus {
            tld: tld.to_string(),
            bonus,
        })
        .collect();

        Self {
            base_score: 40.0,
            tld_bonuses,
            other_tld_bonus: 5.0,
            tech_tlds: strings(&["io", "ai", "tech", "co"]),
            tech_keywords: strings(&[
                "tech", "soft", "data", "cloud", "ai", "digital", "app", "platform",
            ]),
            keyword_bonus: 5.0,
            keyword_cap: 15.0,
            missing_score: 20.0,
        }
    }
}

impl WebsiteConfig {
    pub fn tld_bonus(&self, tld: &str) -> f64 {
        self.tld_bonuses
            .iter()
            .find(|entry| entry.tld.trim_start_matches('.').eq_ignore_ascii_case(tld))
            .map_or(self.other_tld_bonus, |entry| entry.bonus)
    }

    pub fn is_tech_tld(&self, tld: &str) -> bool {
        self.tech_tlds
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(tld))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_score: f64,
    pub leadership_terms: Vec<String>,
    pub leadership_bonus: f64,
    pub leadership_cap: f64,
    pub innovation_terms: Vec<String>,
    pub innovation_bonus: f64,
    pub innovation_cap: f64,
    pub core_sector_terms: Vec<String>,
    pub core_sector_bonus: f64,
    pub adjacent_sector_terms: Vec<String>,
    pub adjacent_sector_bonus: f64,
    pub industry_name_bonus: f64,
    pub concise_name_bonus: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_score: 45.0,
            leadership_terms: strings(&[
                "leader",
                "leading",
                "premier",
                "top",
                "best",
                "first",
                "#1",
                "market leader",
            ]),
            leadership_bonus: 8.0,
            leadership_cap: 20.0,
            innovation_terms: strings(&[
                "ai",
                "tech",
                "digital",
                "cloud",
                "data",
                "analytics",
                "automation",
                "platform",
                "saas",
            ]),
            innovation_bonus: 4.0,
            innovation_cap: 16.0,
            core_sector_terms: strings(&["software", "tech", "saas"]),
            core_sector_bonus: 12.0,
            adjacent_sector_terms: strings(&["healthcare", "medical", "fintech"]),
            adjacent_sector_bonus: 8.0,
            industry_name_bonus: 10.0,
            concise_name_bonus: 5.0,
        }
    }
}

/// Penalty values are magnitudes; the aggregator applies them as negative deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    pub high_growth_sectors: Vec<String>,
    pub high_growth_bonus: f64,
    pub strong_factor_threshold: f64,
    pub strong_factor_bonus_two: f64,
    pub strong_factor_bonus_three: f64,
    pub strategic_fit_threshold: f64,
    pub strategic_fit_bonus: f64,
    pub weak_web_threshold: f64,
    pub weak_web_penalty: f64,
    pub critical_threshold: f64,
    pub critical_penalty: f64,
    pub low_completeness_penalty: f64,
    /// Consistency is only judged when at least this many sub-scores are non-zero.
    pub consistency_min_factors: usize,
    /// Population standard deviation of the sub-scores below which the tight bonus applies.
    pub consistency_tight_spread: f64,
    pub consistency_tight_bonus: f64,
    pub consistency_loose_spread: f64,
    pub consistency_loose_bonus: f64,
    pub max_total_bonus: f64,
    pub max_total_penalty: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            high_growth_sectors: strings(&[
                "saas",
                "software",
                "fintech",
                "healthtech",
                "healthcare technology",
                "e-commerce",
                "ecommerce",
                "ai",
            ]),
            high_growth_bonus: 5.0,
            strong_factor_threshold: 85.0,
            strong_factor_bonus_two: 4.0,
            strong_factor_bonus_three: 8.0,
            strategic_fit_threshold: 80.0,
            strategic_fit_bonus: 6.0,
            weak_web_threshold: 25.0,
            weak_web_penalty: 12.0,
            critical_threshold: 40.0,
            critical_penalty: 8.0,
            low_completeness_penalty: 8.0,
            consistency_min_factors: 4,
            consistency_tight_spread: 12.0,
            consistency_tight_bonus: 5.0,
            consistency_loose_spread: 20.0,
            consistency_loose_bonus: 2.0,
            max_total_bonus: 15.0,
            max_total_penalty: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescaleConfig {
    /// Share of the final score taken from the batch percentile; the rest is the composite.
    pub percentile_weight: f64,
}

impl Default for RescaleConfig {
    fn default() -> Self {
        Self {
            percentile_weight: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub rationale_factors: usize,
    pub low_score_threshold: f64,
    pub high_tier_min: f64,
    pub medium_tier_min: f64,
    /// Data completeness (0-100) below which a lead is flagged as having limited data.
    pub limited_data_below: f64,
    pub size_mismatch_below: f64,
    pub industry_challenge_below: f64,
    pub financial_uncertainty_below: f64,
    pub weak_digital_below: f64,
    pub high_priority_industry_min: f64,
    pub strong_market_min: f64,
    pub optimal_size_min: f64,
    /// Growth rate in percent; strictly above this counts as high growth.
    pub high_growth_rate: f64,
    pub maturity_min_years: u32,
    pub maturity_max_years: u32,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            rationale_factors: 3,
            low_score_threshold: 40.0,
            high_tier_min: 80.0,
            medium_tier_min: 60.0,
            limited_data_below: 60.0,
            size_mismatch_below: 40.0,
            industry_challenge_below: 50.0,
            financial_uncertainty_below: 50.0,
            weak_digital_below: 40.0,
            high_priority_industry_min: 85.0,
            strong_market_min: 70.0,
            optimal_size_min: 85.0,
            high_growth_rate: 25.0,
            maturity_min_years: 5,
            maturity_max_years: 15,
        }
    }
}

impl ExplainConfig {
    pub fn is_mature(&self, age: u32) -> bool {
        (self.maturity_min_years..=self.maturity_max_years).contains(&age)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    pub min_founding_year: i32,
    /// Year used for founding-year bounds and company age. Defaults to the current year.
    pub reference_year: Option<i32>,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            min_founding_year: 1800,
            reference_year: None,
        }
    }
}

impl NormalizerSettings {
    pub fn resolved_reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep the first occurrence untouched.
    #[default]
    FirstWins,
    /// Keep the first occurrence, filling its missing fields from later duplicates.
    FillMissing,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
