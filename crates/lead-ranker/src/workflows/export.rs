use std::io::Write;

use crate::workflows::scoring::{Factor, ScoredBatch, ScoredLead};

const NO_RISKS: &str = "Low risk profile";
const NO_GROWTH_SIGNALS: &str = "Standard growth potential";

const SCORE_COLUMNS: &[&str] = &[
    "raw_score",
    "composite_score",
    "data_completeness",
    "score_percentile",
    "Score",
    "tier",
    "scoring_rationale",
    "risk_factors",
    "growth_indicators",
    "duplicates_removed",
];

/// Writes the original columns of each lead followed by the scoring columns.
///
/// Original columns whose name collides with a scoring column are dropped so the output
/// header stays unambiguous.
pub fn write_csv<W: Write>(
    writer: W,
    batch: &ScoredBatch,
    leads: &[&ScoredLead],
) -> Result<(), csv::Error> {
    let appended: Vec<&str> = Factor::ordered()
        .into_iter()
        .map(Factor::column)
        .chain(SCORE_COLUMNS.iter().copied())
        .collect();
    let originals: Vec<&str> = batch
        .headers
        .iter()
        .map(String::as_str)
        .filter(|header| {
            !appended
                .iter()
                .any(|column| column.eq_ignore_ascii_case(header))
        })
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(originals.iter().chain(appended.iter()))?;

    let duplicates_removed = batch.duplicates_removed().to_string();
    for lead in leads {
        let mut record: Vec<String> = originals
            .iter()
            .map(|header| lead.lead.original_value(header).unwrap_or_default().to_string())
            .collect();
        record.extend(
            lead.components
                .iter()
                .map(|factor| format!("{:.1}", factor.score)),
        );
        record.push(format!("{:.1}", lead.raw_score));
        record.push(format!("{:.1}", lead.composite_score));
        record.push(format!("{:.0}", lead.data_completeness));
        record.push(format!("{:.1}", lead.percentile));
        record.push(format!("{:.1}", lead.final_score));
        record.push(lead.tier.label().to_string());
        record.push(lead.rationale.clone());
        record.push(risk_text(lead));
        record.push(growth_text(lead));
        record.push(duplicates_removed.clone());
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn risk_text(lead: &ScoredLead) -> String {
    if lead.risk_flags.is_empty() {
        return NO_RISKS.to_string();
    }
    lead.risk_flags
        .iter()
        .map(|flag| flag.label())
        .collect::<Vec<_>>()
        .join("; ")
}

fn growth_text(lead: &ScoredLead) -> String {
    if lead.growth_flags.is_empty() {
        return NO_GROWTH_SIGNALS.to_string();
    }
    lead.growth_flags
        .iter()
        .map(|flag| flag.label())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::ingest::LeadImporter;
    use crate::workflows::scoring::{LeadScoringEngine, ScoringConfig};
    use std::io::Cursor;

    fn scored(csv: &str) -> ScoredBatch {
        let mut config = ScoringConfig::default();
        config.normalizer.reference_year = Some(2024);
        let engine = LeadScoringEngine::new(config).expect("valid config");
        let batch = LeadImporter::from_reader(Cursor::new(csv.to_string())).expect("csv parses");
        engine.score_batch(batch).expect("batch scores")
    }

    fn exported(batch: &ScoredBatch) -> Vec<csv::StringRecord> {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, batch, &batch.ranked()).expect("export succeeds");
        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let mut records = vec![reader.headers().expect("header row").clone()];
        records.extend(reader.records().map(|record| record.expect("valid record")));
        records
    }

    #[test]
    fn original_columns_come_first() {
        let batch = scored("Company,Owner,Industry\nAcme Tech,Dana,SaaS\n");

        let records = exported(&batch);

        let header: Vec<&str> = records[0].iter().collect();
        assert_eq!(&header[..4], &["Company", "Owner", "Industry", "company_size_score"]);
        assert_eq!(header.last(), Some(&"duplicates_removed"));
        assert_eq!(&records[1][1], "Dana");
    }

    #[test]
    fn colliding_original_column_is_replaced() {
        let batch = scored("Company,Score\nAcme Tech,12\n");

        let records = exported(&batch);

        let header: Vec<&str> = records[0].iter().collect();
        let score_columns: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, name)| **name == "Score")
            .map(|(index, _)| index)
            .collect();
        assert_eq!(score_columns.len(), 1);
        assert_eq!(
            &records[1][score_columns[0]],
            format!("{:.1}", batch.leads[0].final_score).as_str()
        );
    }

    #[test]
    fn duplicates_removed_is_reported_on_every_row() {
        let batch = scored("Company,Industry\nAcme Tech,SaaS\nBeta,SaaS\nAcme Tech,SaaS\n");

        let records = exported(&batch);

        assert_eq!(records.len(), 3);
        let header: Vec<&str> = records[0].iter().collect();
        let column = header
            .iter()
            .position(|name| *name == "duplicates_removed")
            .expect("duplicates column");
        assert_eq!(&records[1][column], "1");
        assert_eq!(&records[2][column], "1");
    }

    #[test]
    fn completeness_is_exported_per_row() {
        let batch = scored("Company,Industry,Employees,Website
Acme Tech,SaaS,50,acmetech.io
");

        let records = exported(&batch);

        let header: Vec<&str> = records[0].iter().collect();
        let column = header
            .iter()
            .position(|name| *name == "data_completeness")
            .expect("completeness column");
        assert_eq!(&records[1][column], "80");
    }

    #[test]
    fn empty_growth_flags_use_placeholder() {
        let batch = scored("Company,Industry\nHarbor Freight Logistics,Transportation\n");

        let records = exported(&batch);

        let header: Vec<&str> = records[0].iter().collect();
        let column = header
            .iter()
            .position(|name| *name == "growth_indicators")
            .expect("growth column");
        assert_eq!(&records[1][column], NO_GROWTH_SIGNALS);
    }
}
