use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic fields the engine understands. Any other column is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Company,
    Industry,
    Website,
    EmployeeCount,
    Revenue,
    GrowthRate,
    ProfitMargin,
    FoundedYear,
    Description,
    Location,
}

impl LeadField {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Company,
            Self::Industry,
            Self::Website,
            Self::EmployeeCount,
            Self::Revenue,
            Self::GrowthRate,
            Self::ProfitMargin,
            Self::FoundedYear,
            Self::Description,
            Self::Location,
        ]
    }

    /// Canonical column name used when a lead is built without an ingested header.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Industry => "Industry",
            Self::Website => "Website",
            Self::EmployeeCount => "EmployeeCount",
            Self::Revenue => "Revenue",
            Self::GrowthRate => "Growth",
            Self::ProfitMargin => "ProfitMargin",
            Self::FoundedYear => "Founded",
            Self::Description => "Description",
            Self::Location => "Location",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A lead exactly as ingested. Values are untrimmed and untyped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLead {
    /// 1-based data row (header excluded).
    pub row: usize,
    /// Original `(header, value)` pairs in column order.
    pub columns: Vec<(String, String)>,
    pub fields: BTreeMap<LeadField, String>,
}

impl RawLead {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            columns: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder used by tests and the JSON intake: records the value under the field's canonical
    /// column name as well.
    pub fn with_field(mut self, field: LeadField, value: impl Into<String>) -> Self {
        let value = value.into();
        self.columns.push((field.label().to_string(), value.clone()));
        self.fields.insert(field, value);
        self
    }

    pub fn field(&self, field: LeadField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

/// One uploaded dataset: rows plus the column layout they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadBatch {
    pub headers: Vec<String>,
    pub recognized: BTreeSet<LeadField>,
    pub leads: Vec<RawLead>,
}

impl LeadBatch {
    pub fn new(headers: Vec<String>, recognized: BTreeSet<LeadField>, leads: Vec<RawLead>) -> Self {
        Self {
            headers,
            recognized,
            leads,
        }
    }

    /// Derives the header layout from the leads themselves.
    pub fn from_leads(leads: Vec<RawLead>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        let mut recognized = BTreeSet::new();
        for lead in &leads {
            recognized.extend(lead.fields.keys().copied());
            for (header, _) in &lead.columns {
                if !headers.iter().any(|existing| existing == header) {
                    headers.push(header.clone());
                }
            }
        }

        Self {
            headers,
            recognized,
            leads,
        }
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    Malformed,
    OutOfRange,
}

impl IssueKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::OutOfRange => "out of range",
        }
    }
}

/// Per-field data problem recorded by the normalizer. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub row: usize,
    pub field: LeadField,
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} {}", self.row, self.field, self.kind.label())?;
        if let Some(value) = &self.value {
            write!(f, " ('{value}')")?;
        }
        Ok(())
    }
}

/// Lead after cleaning. Every typed field is either valid or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedLead {
    pub row: usize,
    pub company: Option<String>,
    /// Lower-cased, punctuation-free form of `company` used for keyword matching.
    pub company_key: Option<String>,
    pub industry: Option<String>,
    pub industry_key: Option<String>,
    pub description_key: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub tld: Option<String>,
    pub employee_count: Option<u32>,
    pub revenue: Option<f64>,
    pub growth_rate: Option<f64>,
    pub profit_margin: Option<f64>,
    pub founded_year: Option<i32>,
    pub company_age: Option<u32>,
    pub issues: Vec<FieldIssue>,
    pub original: Vec<(String, String)>,
}

impl CleanedLead {
    pub fn empty(row: usize) -> Self {
        Self {
            row,
            company: None,
            company_key: None,
            industry: None,
            industry_key: None,
            description_key: None,
            location: None,
            website: None,
            domain: None,
            tld: None,
            employee_count: None,
            revenue: None,
            growth_rate: None,
            profit_margin: None,
            founded_year: None,
            company_age: None,
            issues: Vec::new(),
            original: Vec::new(),
        }
    }

    pub fn identity(&self) -> LeadIdentity {
        LeadIdentity {
            name: self
                .company
                .as_deref()
                .and_then(super::normalize::normalize_company_name),
            domain: self.domain.clone(),
        }
    }

    /// Share of profile data present, 0-100. Core fields weigh four times as much as the
    /// optional financial and background fields.
    pub fn data_completeness(&self) -> f64 {
        const CORE_POINTS: f64 = 20.0;
        const OPTIONAL_POINTS: f64 = 5.0;

        let core = [
            self.company.is_some(),
            self.industry_key.is_some(),
            self.website.is_some(),
            self.employee_count.is_some(),
        ];
        let optional = [
            self.revenue.is_some(),
            self.growth_rate.is_some(),
            self.founded_year.is_some(),
            self.location.is_some(),
        ];
        let points = core.iter().filter(|present| **present).count() as f64 * CORE_POINTS
            + optional.iter().filter(|present| **present).count() as f64 * OPTIONAL_POINTS;
        points.min(MAX_SUB_SCORE)
    }

    pub fn has_financials(&self) -> bool {
        self.revenue.is_some() || self.growth_rate.is_some() || self.profit_margin.is_some()
    }

    pub fn issues_for(&self, field: LeadField) -> impl Iterator<Item = &FieldIssue> {
        self.issues.iter().filter(move |issue| issue.field == field)
    }

    /// Original value for a column header, if the lead carried one.
    pub fn original_value(&self, header: &str) -> Option<&str> {
        self.original
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    /// Copies values this lead lacks from a later duplicate of the same company.
    pub(crate) fn fill_from(&mut self, other: &CleanedLead) {
        let mut filled = Vec::new();

        if self.industry.is_none() && other.industry.is_some() {
            self.industry = other.industry.clone();
            self.industry_key = other.industry_key.clone();
            filled.push(LeadField::Industry);
        }
        if self.description_key.is_none() && other.description_key.is_some() {
            self.description_key = other.description_key.clone();
            filled.push(LeadField::Description);
        }
        if self.location.is_none() && other.location.is_some() {
            self.location = other.location.clone();
            filled.push(LeadField::Location);
        }
        if self.domain.is_none() && other.domain.is_some() {
            self.website = other.website.clone();
            self.domain = other.domain.clone();
            self.tld = other.tld.clone();
            filled.push(LeadField::Website);
        }
        if self.employee_count.is_none() && other.employee_count.is_some() {
            self.employee_count = other.employee_count;
            filled.push(LeadField::EmployeeCount);
        }
        if self.revenue.is_none() && other.revenue.is_some() {
            self.revenue = other.revenue;
            filled.push(LeadField::Revenue);
        }
        if self.growth_rate.is_none() && other.growth_rate.is_some() {
            self.growth_rate = other.growth_rate;
            filled.push(LeadField::GrowthRate);
        }
        if self.profit_margin.is_none() && other.profit_margin.is_some() {
            self.profit_margin = other.profit_margin;
            filled.push(LeadField::ProfitMargin);
        }
        if self.founded_year.is_none() && other.founded_year.is_some() {
            self.founded_year = other.founded_year;
            self.company_age = other.company_age;
            filled.push(LeadField::FoundedYear);
        }

        self.issues.retain(|issue| !filled.contains(&issue.field));
    }
}

/// Identity used for deduplication and for keying batch-relative results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeadIdentity {
    pub name: Option<String>,
    pub domain: Option<String>,
}

impl LeadIdentity {
    /// A key with neither component can never be matched against another lead.
    pub fn is_usable(&self) -> bool {
        self.name.is_some() || self.domain.is_some()
    }
}

impl fmt::Display for LeadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}",
            self.name.as_deref().unwrap_or("-"),
            self.domain.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    CompanySize,
    Industry,
    Financial,
    Website,
    MarketPosition,
}

impl Factor {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::CompanySize,
            Self::Industry,
            Self::Financial,
            Self::Website,
            Self::MarketPosition,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CompanySize => "Company size",
            Self::Industry => "Industry",
            Self::Financial => "Financials",
            Self::Website => "Website",
            Self::MarketPosition => "Market position",
        }
    }

    /// Output column carrying this factor's sub-score.
    pub const fn column(self) -> &'static str {
        match self {
            Self::CompanySize => "company_size_score",
            Self::Industry => "industry_score",
            Self::Financial => "financial_score",
            Self::Website => "website_quality_score",
            Self::MarketPosition => "market_position_score",
        }
    }
}

/// How much of a factor's input data was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataAvailability {
    Present,
    Partial,
    Absent,
}

pub const MAX_SUB_SCORE: f64 = 100.0;

/// Bounded output of one signal extractor plus the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub score: f64,
    pub availability: DataAvailability,
    pub evidence: Vec<String>,
}

impl FactorScore {
    pub(crate) fn new(factor: Factor, score: f64, availability: DataAvailability) -> Self {
        Self {
            factor,
            score: clamp_score(score),
            availability,
            evidence: Vec::new(),
        }
    }

    pub(crate) fn with_evidence(mut self, note: impl Into<String>) -> Self {
        self.evidence.push(note.into());
        self
    }

    /// First evidence item; extractors put their summary sentence there.
    pub fn headline(&self) -> Option<&str> {
        self.evidence.first().map(String::as_str)
    }

    pub fn is_absent(&self) -> bool {
        self.availability == DataAvailability::Absent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub company_size: FactorScore,
    pub industry: FactorScore,
    pub financial: FactorScore,
    pub website: FactorScore,
    pub market_position: FactorScore,
}

impl ScoreComponents {
    pub fn get(&self, factor: Factor) -> &FactorScore {
        match factor {
            Factor::CompanySize => &self.company_size,
            Factor::Industry => &self.industry,
            Factor::Financial => &self.financial,
            Factor::Website => &self.website,
            Factor::MarketPosition => &self.market_position,
        }
    }

    /// Factors in their fixed order.
    pub fn iter(&self) -> impl Iterator<Item = &FactorScore> {
        Factor::ordered().into_iter().map(move |factor| self.get(factor))
    }

    pub fn absent_count(&self) -> usize {
        self.iter().filter(|score| score.is_absent()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    HighGrowthSector,
    StrongFactors,
    StrategicFit,
    WeakWebPresence,
    CriticalFactor,
    LowDataCompleteness,
    Consistency,
    BonusCap,
    PenaltyFloor,
}

/// Additive delta applied on top of the weighted sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub kind: AdjustmentKind,
    pub delta: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    MissingEmployeeCount,
    MissingIndustry,
    MissingFinancials,
    NoWebsite,
    MissingField(LeadField),
    InvalidField(LeadField),
    LowDataQuality,
    LimitedData,
    SizeMismatch,
    IndustryChallenges,
    FinancialUncertainty,
    WeakDigitalPresence,
    LowPriority,
}

impl RiskFlag {
    pub fn label(&self) -> String {
        match self {
            Self::MissingEmployeeCount => "Missing employee count".to_string(),
            Self::MissingIndustry => "Missing industry".to_string(),
            Self::MissingFinancials => "Missing financials".to_string(),
            Self::NoWebsite => "No website".to_string(),
            Self::MissingField(field) => format!("Missing {}", field.label()),
            Self::InvalidField(field) => format!("Invalid {}", field.label()),
            Self::LowDataQuality => "Low data quality".to_string(),
            Self::LimitedData => "Limited data".to_string(),
            Self::SizeMismatch => "Size mismatch".to_string(),
            Self::IndustryChallenges => "Industry challenges".to_string(),
            Self::FinancialUncertainty => "Financial uncertainty".to_string(),
            Self::WeakDigitalPresence => "Weak digital presence".to_string(),
            Self::LowPriority => "Low priority".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthFlag {
    HighGrowthSector,
    HighPriorityIndustry,
    StrongMarketPosition,
    HighGrowthRate,
    TechForwardDomain,
    OptimalCompanySize,
    MaturitySweetSpot,
}

impl GrowthFlag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighGrowthSector => "High-growth sector bonus applied",
            Self::HighPriorityIndustry => "High-priority industry",
            Self::StrongMarketPosition => "Strong market position",
            Self::HighGrowthRate => "High growth rate",
            Self::TechForwardDomain => "Tech-forward domain",
            Self::OptimalCompanySize => "Optimal company size",
            Self::MaturitySweetSpot => "Company maturity sweet spot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn from_score(score: f64, high_min: f64, medium_min: f64) -> Self {
        if score >= high_min {
            Self::High
        } else if score >= medium_min {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Terminal record for one surviving lead. Built once per batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLead {
    pub row: usize,
    pub identity: LeadIdentity,
    pub lead: CleanedLead,
    pub components: ScoreComponents,
    pub raw_score: f64,
    pub adjustments: Vec<Adjustment>,
    pub composite_score: f64,
    /// See [`CleanedLead::data_completeness`].
    pub data_completeness: f64,
    pub percentile: f64,
    pub final_score: f64,
    pub tier: Tier,
    pub rationale: String,
    pub risk_flags: BTreeSet<RiskFlag>,
    pub growth_flags: BTreeSet<GrowthFlag>,
}

pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_SUB_SCORE)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
