//! Parsing of the CSV file Athena writes for the API activity query.
//!
//! Columns are located by header name (ASCII case-insensitive, since Athena
//! may lower-case aliases), so a reordered result still parses.

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use apiwatch_athena::columns;
use apiwatch_athena::query::UNKNOWN_PRINCIPAL;

/// One aggregated row: how often a principal made one kind of API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallRow {
    pub event_source: String,
    pub user_agent: String,
    pub principal_type: String,
    pub principal: String,
    pub event_name: String,
    pub frequency: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("result has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("line {line}: frequency {value:?} is not a non-negative integer")]
    InvalidFrequency { line: u64, value: String },
}

/// Header positions of the six expected columns.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    event_source: usize,
    user_agent: usize,
    principal_type: usize,
    principal: usize,
    event_name: usize,
    frequency: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, RowError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(RowError::MissingColumn(name))
        };

        Ok(Self {
            event_source: find(columns::EVENT_SOURCE)?,
            user_agent: find(columns::USER_AGENT)?,
            principal_type: find(columns::PRINCIPAL_TYPE)?,
            principal: find(columns::PRINCIPAL)?,
            event_name: find(columns::EVENT_NAME)?,
            frequency: find(columns::FREQUENCY)?,
        })
    }
}

/// Parse Athena's CSV output (header row + data rows) in file order.
pub fn parse_rows(data: &[u8]) -> Result<Vec<ApiCallRow>, RowError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let map = ColumnMap::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let or_unknown = |value: String| {
            if value.trim().is_empty() {
                UNKNOWN_PRINCIPAL.to_string()
            } else {
                value
            }
        };

        let raw_frequency = record.get(map.frequency).unwrap_or("").trim();
        let frequency = raw_frequency
            .parse::<u64>()
            .map_err(|_| RowError::InvalidFrequency {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                value: raw_frequency.to_string(),
            })?;

        rows.push(ApiCallRow {
            event_source: field(map.event_source),
            user_agent: field(map.user_agent),
            principal_type: or_unknown(field(map.principal_type)),
            principal: or_unknown(field(map.principal)),
            event_name: field(map.event_name),
            frequency,
        });
    }

    Ok(rows)
}
