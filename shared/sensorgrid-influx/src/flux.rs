//! Typed Flux query construction
//!
//! Queries are composed from a time-bounded base scan plus optional equality
//! predicates, then lowered to Flux source in one place. Predicates are kept
//! in a sorted map, so the rendered filter set does not depend on the order
//! clauses were added, and every string literal is escaped on the way out.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Closed time interval scanned by a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self { start, stop }
    }

    /// The window ending at `now` and reaching `duration` back
    pub fn last(duration: Duration, now: DateTime<Utc>) -> Self {
        Self {
            start: now - duration,
            stop: now,
        }
    }

    /// Everything ever recorded, up to `now`
    pub fn full_history(now: DateTime<Utc>) -> Self {
        Self {
            start: Utc.timestamp_opt(0, 0).single().unwrap_or(now),
            stop: now,
        }
    }
}

/// Builder for one Flux pipeline over a bucket
#[derive(Debug, Clone)]
pub struct FluxQuery {
    bucket: String,
    range: TimeRange,
    measurements: Vec<String>,
    tags: BTreeMap<String, String>,
    field: Option<String>,
    keep: Vec<String>,
    group: Option<Vec<String>>,
    distinct: Option<String>,
    pivot_tag: Option<String>,
    sort_desc: bool,
    limit: Option<u32>,
}

impl FluxQuery {
    pub fn scan(bucket: impl Into<String>, range: TimeRange) -> Self {
        Self {
            bucket: bucket.into(),
            range,
            measurements: Vec::new(),
            tags: BTreeMap::new(),
            field: None,
            keep: Vec::new(),
            group: None,
            distinct: None,
            pivot_tag: None,
            sort_desc: false,
            limit: None,
        }
    }

    /// Restrict to one measurement. Calling repeatedly widens the filter to
    /// the union of the named measurements.
    pub fn measurement(mut self, name: impl Into<String>) -> Self {
        self.measurements.push(name.into());
        self
    }

    /// Equality predicate on a tag. Last value wins per tag key.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Restrict to one field key
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    /// Keep only the named columns
    pub fn keep(mut self, columns: &[&str]) -> Self {
        self.keep = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Regroup by the named columns (empty slice ungroups into one table)
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Deduplicate on one column
    pub fn distinct(mut self, column: impl Into<String>) -> Self {
        self.distinct = Some(column.into());
        self
    }

    /// Pivot rows sharing a timestamp into columns keyed by a tag's values
    pub fn pivot_on_tag(mut self, tag: impl Into<String>) -> Self {
        self.pivot_tag = Some(tag.into());
        self
    }

    /// Newest first
    pub fn sort_desc(mut self) -> Self {
        self.sort_desc = true;
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Lower to Flux source
    pub fn render(&self) -> String {
        let mut q = String::new();
        let _ = write!(
            q,
            "from(bucket: \"{}\")\n    |> range(start: {}, stop: {})",
            escape(&self.bucket),
            flux_time(&self.range.start),
            flux_time(&self.range.stop),
        );

        if !self.measurements.is_empty() {
            let clauses: Vec<String> = self
                .measurements
                .iter()
                .map(|m| format!("r._measurement == \"{}\"", escape(m)))
                .collect();
            let _ = write!(q, "\n    |> filter(fn: (r) => {})", clauses.join(" or "));
        }

        for (key, value) in &self.tags {
            let _ = write!(
                q,
                "\n    |> filter(fn: (r) => r[\"{}\"] == \"{}\")",
                escape(key),
                escape(value)
            );
        }

        if let Some(field) = &self.field {
            let _ = write!(q, "\n    |> filter(fn: (r) => r._field == \"{}\")", escape(field));
        }

        if !self.keep.is_empty() {
            let _ = write!(q, "\n    |> keep(columns: [{}])", column_list(&self.keep));
        }

        if let Some(group) = &self.group {
            if group.is_empty() {
                q.push_str("\n    |> group()");
            } else {
                let _ = write!(q, "\n    |> group(columns: [{}])", column_list(group));
            }
        }

        if let Some(column) = &self.distinct {
            let _ = write!(q, "\n    |> distinct(column: \"{}\")", escape(column));
        }

        if let Some(tag) = &self.pivot_tag {
            let _ = write!(
                q,
                "\n    |> pivot(rowKey: [\"_time\"], columnKey: [\"{}\"], valueColumn: \"_value\")",
                escape(tag)
            );
        }

        if self.sort_desc {
            q.push_str("\n    |> sort(columns: [\"_time\"], desc: true)");
        }

        if let Some(n) = self.limit {
            let _ = write!(q, "\n    |> limit(n: {})", n);
        }

        q
    }
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", escape(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn flux_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
