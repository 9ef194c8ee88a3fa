//! Lead intake from CSV exports and JSON payloads.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::scoring::LeadBatch;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum LeadImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for LeadImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadImportError::Io(err) => write!(f, "failed to read lead file: {}", err),
            LeadImportError::Csv(err) => write!(f, "invalid lead CSV data: {}", err),
        }
    }
}

impl std::error::Error for LeadImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeadImportError::Io(err) => Some(err),
            LeadImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LeadImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LeadImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct LeadImporter;

impl LeadImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LeadBatch, LeadImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<LeadBatch, LeadImportError> {
        Ok(parser::parse_batch(reader)?)
    }

    pub fn from_json_rows(rows: &[Map<String, Value>]) -> LeadBatch {
        parser::batch_from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scoring::LeadField;
    use std::io::Cursor;

    #[test]
    fn importer_maps_aliased_headers() {
        let csv = "\u{feff}Organization Name,Number of Employees,Company Website,Annual Revenue\n\
                   Acme Tech,51-200,acmetech.io,$5M\n";

        let batch = LeadImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(batch.len(), 1);
        for field in [
            LeadField::Company,
            LeadField::EmployeeCount,
            LeadField::Website,
            LeadField::Revenue,
        ] {
            assert!(batch.recognized.contains(&field), "{field} not recognized");
        }
        assert_eq!(batch.leads[0].field(LeadField::EmployeeCount), Some("51-200"));
        assert_eq!(batch.headers.len(), 4);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let result = LeadImporter::from_path("/definitely/not/here.csv");

        assert!(matches!(result, Err(LeadImportError::Io(_))));
    }

    #[test]
    fn invalid_utf8_reports_csv_error() {
        let bytes: &[u8] = b"Company,Industry\n\xff\xfe,SaaS\n";

        let result = LeadImporter::from_reader(Cursor::new(bytes));

        assert!(matches!(result, Err(LeadImportError::Csv(_))));
    }
}
