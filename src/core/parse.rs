use crate::domain::model::{ProviderRecord, REQUIRED_COLUMNS};
use crate::utils::error::{DashboardError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes register bytes: UTF-8 (BOM stripped), or Latin-1 when not valid UTF-8.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::debug!("Register is not valid UTF-8 ({}), decoding as Latin-1", e);
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Parses the register into one record per data row, in file order.
pub fn parse_providers(text: &str) -> Result<Vec<ProviderRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(DashboardError::MissingColumnError {
                column: column.to_string(),
                found: headers.iter().collect::<Vec<_>>().join(", "),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<ProviderRecord>() {
        records.push(row?);
    }

    tracing::debug!("Parsed {} register rows with {} columns", records.len(), headers.len());
    Ok(records)
}
