use std::io::Read;
use std::path::Path;

use super::predictor::Prediction;
use super::profile::{CustomerProfile, ProfileField};

/// One customer row read from an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedProfile {
    /// 1-based data row number, header excluded.
    pub row: usize,
    pub customer_id: Option<String>,
    pub profile: CustomerProfile,
    /// Observed campaign response, when the export carries a `Response` column.
    pub observed: Option<Prediction>,
}

#[derive(Debug)]
pub enum ProfileImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for ProfileImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileImportError::Io(err) => write!(f, "failed to read profile export: {}", err),
            ProfileImportError::Csv(err) => write!(f, "invalid profile CSV data: {}", err),
            ProfileImportError::InvalidCell { row, column, value } => write!(
                f,
                "row {}: column '{}' holds non-numeric value '{}'",
                row, column, value
            ),
        }
    }
}

impl std::error::Error for ProfileImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileImportError::Io(err) => Some(err),
            ProfileImportError::Csv(err) => Some(err),
            ProfileImportError::InvalidCell { .. } => None,
        }
    }
}

impl From<std::io::Error> for ProfileImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProfileImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

const ID_COLUMN: &str = "ID";
const RESPONSE_COLUMN: &str = "Response";

/// Reads customer exports whose headers use the model's column names.
///
/// Columns the model does not use are skipped. Blank cells keep the default
/// value for that field.
#[derive(Debug, Clone, Copy)]
pub struct ProfileImporter {
    delimiter: u8,
}

impl Default for ProfileImporter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl ProfileImporter {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<ImportedProfile>, ProfileImportError> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<ImportedProfile>, ProfileImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut columns: Vec<(usize, ProfileField)> = Vec::new();
        let mut id_column = None;
        let mut response_column = None;
        for (index, header) in headers.iter().enumerate() {
            if let Ok(field) = header.parse::<ProfileField>() {
                columns.push((index, field));
            } else if header == ID_COLUMN {
                id_column = Some(index);
            } else if header == RESPONSE_COLUMN {
                response_column = Some(index);
            }
        }
        tracing::debug!(
            mapped = columns.len(),
            total = headers.len(),
            "profile export columns mapped"
        );

        let mut imported = Vec::new();
        for (offset, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = offset + 1;
            let mut profile = CustomerProfile::default();

            for &(index, field) in &columns {
                if let Some(value) = parse_cell(&record, index, row, field.wire_name())? {
                    profile.set(field, value);
                }
            }

            let observed = match response_column {
                Some(index) => parse_cell(&record, index, row, RESPONSE_COLUMN)?
                    .map(|value| Prediction::from(value != 0.0)),
                None => None,
            };
            let customer_id = id_column
                .and_then(|index| record.get(index))
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            imported.push(ImportedProfile {
                row,
                customer_id,
                profile,
                observed,
            });
        }

        Ok(imported)
    }
}

fn parse_cell(
    record: &csv::StringRecord,
    index: usize,
    row: usize,
    column: &str,
) -> Result<Option<f64>, ProfileImportError> {
    let raw = record.get(index).unwrap_or_default();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(Some)
        .ok_or_else(|| ProfileImportError::InvalidCell {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}
