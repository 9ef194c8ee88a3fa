use lead_ranker::workflows::export;
use lead_ranker::workflows::ingest::LeadImporter;
use lead_ranker::workflows::scoring::{
    LeadField, LeadFilter, LeadScoringEngine, RiskFlag, ScoredBatch, ScoringConfig, Tier,
};

fn score_sample() -> ScoredBatch {
    let data = include_bytes!("../sample_leads.csv");
    let batch = LeadImporter::from_reader(&data[..]).expect("sample leads import");

    let mut config = ScoringConfig::default();
    config.normalizer.reference_year = Some(2024);
    let engine = LeadScoringEngine::new(config).expect("default config is valid");
    engine.score_batch(batch).expect("sample batch scores")
}

fn company_of(lead: &lead_ranker::workflows::scoring::ScoredLead) -> &str {
    lead.lead.company.as_deref().unwrap_or_default()
}

#[test]
fn sample_export_collapses_duplicate_acme_row() {
    let scored = score_sample();

    assert_eq!(scored.summary.total_rows, 7);
    assert_eq!(scored.summary.scored, 6);
    assert_eq!(scored.duplicates_removed(), 1);
    let duplicate = &scored.duplicates[0];
    assert_eq!(duplicate.row, 6);
    assert_eq!(duplicate.kept_row, 1);
    assert_eq!(duplicate.identity.name.as_deref(), Some("acme tech"));
}

#[test]
fn strongest_leads_rank_first_and_sparse_lead_last() {
    let scored = score_sample();
    let ranked = scored.ranked();

    let mut top_two: Vec<&str> = ranked[..2].iter().map(|lead| company_of(lead)).collect();
    top_two.sort_unstable();
    assert_eq!(top_two, vec!["Acme Tech Inc.", "Contoso Health"]);
    assert!(ranked[..2].iter().all(|lead| lead.tier == Tier::High));

    let last = ranked.last().expect("leads present");
    assert_eq!(company_of(last), "Harbor Freight Logistics");
    assert!(last.risk_flags.contains(&RiskFlag::LowPriority));
    assert!(last.risk_flags.contains(&RiskFlag::MissingFinancials));
    assert!(last.risk_flags.contains(&RiskFlag::NoWebsite));
}

#[test]
fn unparseable_headcount_is_reported_not_fatal() {
    let scored = score_sample();

    let blue_yonder = scored
        .leads
        .iter()
        .find(|lead| company_of(lead) == "Blue Yonder Analytics")
        .expect("lead scored");

    assert!(blue_yonder.lead.employee_count.is_none());
    assert!(blue_yonder
        .risk_flags
        .contains(&RiskFlag::InvalidField(LeadField::EmployeeCount)));
    assert!(scored.summary.field_issues >= 1);
}

#[test]
fn every_score_is_within_bounds() {
    let scored = score_sample();

    for lead in &scored.leads {
        for factor in lead.components.iter() {
            assert!((0.0..=100.0).contains(&factor.score));
        }
        assert!((0.0..=100.0).contains(&lead.composite_score));
        assert!((0.0..=100.0).contains(&lead.final_score));
        assert!((0.0..=100.0).contains(&lead.percentile));
        assert!(!lead.rationale.is_empty());
    }
}

#[test]
fn headcount_filter_excludes_unknown_sizes() {
    let scored = score_sample();
    let filter = LeadFilter {
        min_employees: Some(100),
        ..LeadFilter::default()
    };

    let report = scored.report(&filter);

    let mut companies: Vec<&str> = report
        .leads
        .iter()
        .filter_map(|lead| lead.company.as_deref())
        .collect();
    companies.sort_unstable();
    assert_eq!(
        companies,
        vec!["Acme Tech Inc.", "Contoso Health", "Northwind Traders"]
    );
    assert_eq!(report.matched, 3);
    assert_eq!(report.summary.scored, 6);
}

#[test]
fn csv_export_keeps_original_columns_and_ranks_rows() {
    let scored = score_sample();
    let ranked = scored.ranked();

    let mut buffer = Vec::new();
    export::write_csv(&mut buffer, &scored, &ranked).expect("export succeeds");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("header row").clone();
    assert_eq!(&headers[0], "Company Name");
    assert_eq!(&headers[9], "Location");
    let score_column = headers
        .iter()
        .position(|name| name == "Score")
        .expect("score column");

    let records: Vec<csv::StringRecord> = reader
        .records()
        .map(|record| record.expect("valid record"))
        .collect();
    assert_eq!(records.len(), 6);
    assert_eq!(&records[5][0], "Harbor Freight Logistics");

    let exported_scores: Vec<f64> = records
        .iter()
        .map(|record| record[score_column].parse().expect("numeric score"))
        .collect();
    assert!(exported_scores.windows(2).all(|pair| pair[0] >= pair[1]));
}
