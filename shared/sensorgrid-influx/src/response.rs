//! Decoding of Flux query responses
//!
//! Queries are issued with a CSV dialect carrying no annotations, so the
//! response is a sequence of plain CSV tables, each with its own header row,
//! separated by blank lines. All values arrive as strings; typed accessors
//! parse on demand.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::{Result, StoreError};

/// One row of a query result, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxRecord {
    columns: HashMap<String, String>,
}

impl FluxRecord {
    pub fn from_columns(columns: HashMap<String, String>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(|v| v.as_str()).filter(|v| !v.is_empty())
    }

    /// String column, empty when absent
    pub fn get_string(&self, column: &str) -> String {
        self.get(column).unwrap_or_default().to_string()
    }

    /// Numeric column, `None` when absent or unparseable
    pub fn get_f64_opt(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(|v| v.parse().ok())
    }

    /// Numeric column, zero when absent. Matches the aggregation pivot
    /// policy: a statistic the rollup omitted reads as 0.0.
    pub fn get_f64(&self, column: &str) -> f64 {
        self.get_f64_opt(column).unwrap_or(0.0)
    }

    /// RFC 3339 time column
    pub fn get_time(&self, column: &str) -> Option<DateTime<Utc>> {
        self.get(column)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Parse a multi-table CSV response body into a flat record list
pub fn parse_tables(body: &str) -> Result<Vec<FluxRecord>> {
    let normalized = body.replace("\r\n", "\n");
    let mut records = Vec::new();

    for table in normalized.split("\n\n") {
        let table = table.trim_matches('\n');
        if table.is_empty() {
            continue;
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(table.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| StoreError::Response(e.to_string()))?
            .clone();

        for row in reader.records() {
            let row = row.map_err(|e| StoreError::Response(e.to_string()))?;
            let mut columns = HashMap::with_capacity(headers.len());
            for (header, value) in headers.iter().zip(row.iter()) {
                columns.insert(header.to_string(), value.to_string());
            }
            records.push(FluxRecord::from_columns(columns));
        }
    }

    Ok(records)
}
