use crate::workflows::scoring::{
    LeadBatch, LeadField, LeadScoringEngine, RawLead, ScoredBatch, ScoredLead, ScoringConfig,
};

pub(super) fn scoring_config() -> ScoringConfig {
    let mut config = ScoringConfig::default();
    config.normalizer.reference_year = Some(2024);
    config
}

pub(super) fn engine() -> LeadScoringEngine {
    LeadScoringEngine::new(scoring_config()).expect("default config is valid")
}

pub(super) fn lead(row: usize, fields: &[(LeadField, &str)]) -> RawLead {
    fields
        .iter()
        .fold(RawLead::new(row), |lead, (field, value)| {
            lead.with_field(*field, *value)
        })
}

/// Small SaaS company on a tech domain: everything lines up.
pub(super) fn acme_tech(row: usize) -> RawLead {
    lead(
        row,
        &[
            (LeadField::Company, "Acme Tech"),
            (LeadField::Industry, "SaaS"),
            (LeadField::EmployeeCount, "50"),
            (LeadField::Revenue, "$5M"),
            (LeadField::Website, "https://acmetech.io"),
            (LeadField::FoundedYear, "2016"),
        ],
    )
}

/// Only a name and a low-priority industry.
pub(super) fn harbor_freight(row: usize) -> RawLead {
    lead(
        row,
        &[
            (LeadField::Company, "Harbor Freight Logistics"),
            (LeadField::Industry, "Transportation"),
        ],
    )
}

/// Preferred industry but nothing else to go on.
pub(super) fn vertex_cloud(row: usize) -> RawLead {
    lead(
        row,
        &[
            (LeadField::Company, "Vertex Cloud"),
            (LeadField::Industry, "SaaS"),
        ],
    )
}

pub(super) fn northwind(row: usize) -> RawLead {
    lead(
        row,
        &[
            (LeadField::Company, "Northwind Traders"),
            (LeadField::Industry, "Retail"),
            (LeadField::EmployeeCount, "800"),
            (LeadField::Revenue, "2.4M"),
            (LeadField::GrowthRate, "6%"),
            (LeadField::ProfitMargin, "4%"),
            (LeadField::Website, "northwind.com"),
        ],
    )
}

pub(super) fn contoso(row: usize) -> RawLead {
    lead(
        row,
        &[
            (LeadField::Company, "Contoso Health"),
            (LeadField::Industry, "Healthcare Technology"),
            (LeadField::EmployeeCount, "180"),
            (LeadField::Revenue, "$32M"),
            (LeadField::GrowthRate, "40%"),
            (LeadField::ProfitMargin, "12%"),
            (LeadField::Website, "contosohealth.com"),
            (LeadField::Description, "Leading cloud platform for clinics"),
        ],
    )
}

pub(super) fn mixed_batch() -> LeadBatch {
    LeadBatch::from_leads(vec![
        acme_tech(1),
        harbor_freight(2),
        northwind(3),
        contoso(4),
    ])
}

pub(super) fn score(batch: LeadBatch) -> ScoredBatch {
    engine().score_batch(batch).expect("batch scores")
}

pub(super) fn by_company<'a>(batch: &'a ScoredBatch, company: &str) -> &'a ScoredLead {
    batch
        .leads
        .iter()
        .find(|lead| lead.lead.company.as_deref() == Some(company))
        .unwrap_or_else(|| panic!("{company} missing from scored batch"))
}
