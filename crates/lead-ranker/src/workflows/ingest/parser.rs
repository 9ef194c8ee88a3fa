use super::mapping::{contained_field, exact_field};
use crate::workflows::scoring::{LeadBatch, LeadField, RawLead};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::io::Read;

pub(crate) fn parse_batch<R: Read>(reader: R) -> Result<LeadBatch, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = resolve_columns(&headers);
    let mut leads = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let values = headers
            .iter()
            .enumerate()
            .map(|(position, header)| {
                (header.clone(), record.get(position).unwrap_or_default().to_string())
            })
            .collect();
        leads.push(build_lead(index + 1, values, &columns));
    }

    Ok(LeadBatch::new(headers, recognized(&columns), leads))
}

/// JSON intake: one object per lead, keyed by column header.
pub(crate) fn batch_from_rows(rows: &[Map<String, Value>]) -> LeadBatch {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let columns = resolve_columns(&headers);

    let leads = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let values = headers
                .iter()
                .map(|header| {
                    let value = row.get(header).map(value_text).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect();
            build_lead(index + 1, values, &columns)
        })
        .collect();

    LeadBatch::new(headers, recognized(&columns), leads)
}

fn build_lead(row: usize, values: Vec<(String, String)>, columns: &[Option<LeadField>]) -> RawLead {
    let mut lead = RawLead::new(row);
    for (position, (_, value)) in values.iter().enumerate() {
        if let Some(Some(field)) = columns.get(position) {
            if !value.trim().is_empty() {
                lead.fields.insert(*field, value.clone());
            }
        }
    }
    lead.columns = values;
    lead
}

/// Assigns each field to at most one column. Exact aliases are resolved first, in column
/// order, so a decorated header can never steal a field from an exact one.
fn resolve_columns(headers: &[String]) -> Vec<Option<LeadField>> {
    let mut claimed = BTreeSet::new();
    let mut columns: Vec<Option<LeadField>> = headers
        .iter()
        .map(|header| exact_field(header).filter(|field| claimed.insert(*field)))
        .collect();

    for (column, header) in columns.iter_mut().zip(headers) {
        if column.is_none() {
            *column = contained_field(header).filter(|field| claimed.insert(*field));
        }
    }

    columns
}

fn recognized(columns: &[Option<LeadField>]) -> BTreeSet<LeadField> {
    columns.iter().flatten().copied().collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_matching_column_wins() {
        let csv = "Name,Company Name,Sector\nAcme,Acme Holdings,SaaS\n";

        let batch = parse_batch(csv.as_bytes()).expect("csv parses");

        let lead = &batch.leads[0];
        assert_eq!(lead.field(LeadField::Company), Some("Acme"));
        assert_eq!(lead.columns[1], ("Company Name".to_string(), "Acme Holdings".to_string()));
    }

    #[test]
    fn exact_headers_beat_decorated_ones() {
        let headers = vec!["Company Website URL".to_string(), "Website".to_string()];

        assert_eq!(resolve_columns(&headers), vec![None, Some(LeadField::Website)]);
    }

    #[test]
    fn blank_rows_are_skipped_but_rows_keep_their_numbers() {
        let csv = "Company,Industry\nAcme,SaaS\n,\nBeta,Retail\n";

        let batch = parse_batch(csv.as_bytes()).expect("csv parses");

        let rows: Vec<usize> = batch.leads.iter().map(|lead| lead.row).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = "Company,Industry,Website\nAcme,SaaS\n";

        let batch = parse_batch(csv.as_bytes()).expect("flexible csv parses");

        let lead = &batch.leads[0];
        assert_eq!(lead.field(LeadField::Website), None);
        assert_eq!(lead.columns.len(), 3);
    }

    #[test]
    fn json_rows_stringify_values() {
        let rows = vec![json!({"Company": "Acme", "Employees": 120, "Revenue": null})];
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();

        let batch = batch_from_rows(&rows);

        let lead = &batch.leads[0];
        assert_eq!(lead.field(LeadField::EmployeeCount), Some("120"));
        assert_eq!(lead.field(LeadField::Revenue), None);
        assert!(batch.recognized.contains(&LeadField::Revenue));
    }

    #[test]
    fn json_rows_keep_their_key_order() {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(
            r#"[{"Website": "acme.io", "Name": "Acme", "Company Name": "Acme Holdings", "Address": "Leeds"}]"#,
        )
        .expect("valid rows");

        let batch = batch_from_rows(&rows);

        assert_eq!(batch.headers, vec!["Website", "Name", "Company Name", "Address"]);
        let lead = &batch.leads[0];
        assert_eq!(lead.field(LeadField::Company), Some("Acme"));
        assert_eq!(lead.columns[3], ("Address".to_string(), "Leeds".to_string()));
    }
}
