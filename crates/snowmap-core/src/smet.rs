// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_NODATA: f64 = -999.0;

const TIMESTAMP_FIELD: &str = "timestamp";
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug)]
pub enum SmetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SMET file missing 'fields' definition in header")]
    MissingFields,
    #[error("SMET data missing 'timestamp' column")]
    MissingTimestamp,
    #[error("SMET file has no [DATA] section")]
    MissingData,
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid timestamp '{value}'")]
    Timestamp { line: usize, value: String },
}

/// Station metadata from the `[HEADER]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmetHeader {
    entries: HashMap<String, String>,
    fields: Vec<String>,
    signature: Option<String>,
}

impl SmetHeader {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Version string from a leading `SMET 1.1 ASCII` line, if present.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn nodata(&self) -> f64 {
        self.get_f64("nodata").unwrap_or(DEFAULT_NODATA)
    }

    pub fn station_id(&self) -> &str {
        self.get("station_id").unwrap_or("Unknown")
    }

    pub fn station_name(&self) -> &str {
        self.get("station_name").unwrap_or("Unknown")
    }

    pub fn latitude(&self) -> f64 {
        self.get_f64("latitude").unwrap_or(0.0)
    }

    pub fn longitude(&self) -> f64 {
        self.get_f64("longitude").unwrap_or(0.0)
    }

    pub fn altitude(&self) -> f64 {
        self.get_f64("altitude").unwrap_or(0.0)
    }

    /// Timezone offset in hours.
    pub fn tz(&self) -> Option<f64> {
        self.get_f64("tz")
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.parse::<f64>().ok())
    }

    fn insert(&mut self, key: &str, value: &str) {
        if key == "fields" {
            self.fields = value.split_whitespace().map(|s| s.to_string()).collect();
        }
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmetRow {
    pub timestamp: NaiveDateTime,
    /// Aligned with `SmetFile::columns`; nodata becomes `None`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmetFile {
    pub header: SmetHeader,
    pub columns: Vec<String>,
    pub rows: Vec<SmetRow>,
}

impl SmetFile {
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, SmetError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::parse(reader)
    }

    pub fn parse<R: BufRead>(reader: R) -> Result<Self, SmetError> {
        let mut header = SmetHeader::default();
        let mut lines = reader.lines().enumerate();
        let mut in_data = false;
        let mut seen_content = false;

        for (_, line) in lines.by_ref() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let first_content = !seen_content;
            seen_content = true;

            if trimmed.eq_ignore_ascii_case("[DATA]") {
                in_data = true;
                break;
            }
            if trimmed.eq_ignore_ascii_case("[HEADER]") {
                continue;
            }

            if first_content && trimmed.starts_with("SMET") && !trimmed.contains('=') {
                header.signature = trimmed.split_whitespace().nth(1).map(|s| s.to_string());
                continue;
            }

            if let Some((key, value)) = trimmed.split_once('=') {
                header.insert(key.trim(), value.trim());
            } else if let Some(rest) = trimmed.strip_prefix("fields") {
                // Some writers omit the '=' on the fields line
                header.insert("fields", rest.trim());
            }
        }

        if header.fields.is_empty() {
            return Err(SmetError::MissingFields);
        }
        let ts_idx = header
            .fields
            .iter()
            .position(|f| f == TIMESTAMP_FIELD)
            .ok_or(SmetError::MissingTimestamp)?;
        if !in_data {
            return Err(SmetError::MissingData);
        }

        let columns: Vec<String> = header
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ts_idx)
            .map(|(_, f)| f.clone())
            .collect();
        let nodata = header.nodata();
        let expected = header.fields.len();
        let mut rows = Vec::new();

        for (idx, line) in lines {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let line_no = idx + 1;
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() != expected {
                return Err(SmetError::ColumnCount {
                    line: line_no,
                    expected,
                    found: parts.len(),
                });
            }

            let timestamp = parse_timestamp(parts[ts_idx]).ok_or_else(|| SmetError::Timestamp {
                line: line_no,
                value: parts[ts_idx].to_string(),
            })?;

            let values = parts
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != ts_idx)
                .map(|(_, raw)| parse_value(raw, nodata))
                .collect();

            rows.push(SmetRow { timestamp, values });
        }

        // Stable sort keeps file order for duplicate timestamps
        rows.sort_by_key(|r| r.timestamp);

        Ok(Self {
            header,
            columns,
            rows,
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.column(name)?;
        self.rows.get(row)?.values.get(col).copied().flatten()
    }

    pub fn latest(&self) -> Option<&SmetRow> {
        self.rows.last()
    }

    /// Index of the row closest in time to `target`. Ties go to the later row.
    pub fn nearest_row(&self, target: NaiveDateTime) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }

        let after = self.rows.partition_point(|r| r.timestamp < target);
        if after == 0 {
            return Some(0);
        }
        if after == self.rows.len() {
            return Some(self.rows.len() - 1);
        }

        let before_gap = target - self.rows[after - 1].timestamp;
        let after_gap = self.rows[after].timestamp - target;
        if after_gap <= before_gap {
            Some(after)
        } else {
            Some(after - 1)
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_value(raw: &str, nodata: f64) -> Option<f64> {
    let v = raw.parse::<f64>().ok()?;
    if !v.is_finite() || (v - nodata).abs() < 1e-9 {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const SAMPLE: &str = "SMET 1.1 ASCII
[HEADER]
station_id       = 27240
station_name     = Crystal Basin
latitude         = 50.94
longitude        = -115.40
altitude         = 2140
nodata           = -999
tz               = -7
fields           = timestamp HS_mod HN24 SWE
[DATA]
2025-01-02T00:00:00 120.5 10.0 310.0
2025-01-01T00:00:00 110.0 -999 300.0
2025-01-01T12:00 115.0 5.0 -999
";

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let smet = SmetFile::parse(Cursor::new(SAMPLE)).unwrap();

        assert_eq!(smet.header.signature(), Some("1.1"));
        assert_eq!(smet.header.station_id(), "27240");
        assert_eq!(smet.header.station_name(), "Crystal Basin");
        assert_eq!(smet.header.latitude(), 50.94);
        assert_eq!(smet.header.longitude(), -115.40);
        assert_eq!(smet.header.altitude(), 2140.0);
        assert_eq!(smet.header.tz(), Some(-7.0));
        assert_eq!(smet.columns, vec!["HS_mod", "HN24", "SWE"]);

        // Sorted by time
        assert_eq!(smet.rows.len(), 3);
        assert_eq!(smet.rows[0].timestamp, ts(1, 0));
        assert_eq!(smet.rows[1].timestamp, ts(1, 12));
        assert_eq!(smet.rows[2].timestamp, ts(2, 0));

        // nodata becomes None
        assert_eq!(smet.value(0, "HN24"), None);
        assert_eq!(smet.value(1, "SWE"), None);
        assert_eq!(smet.value(2, "HS_mod"), Some(120.5));
        assert_eq!(smet.value(2, "missing"), None);
        assert_eq!(smet.latest().unwrap().timestamp, ts(2, 0));
    }

    #[test]
    fn test_signature_after_leading_blank_lines() {
        let data = "\n# generated by SNOWPACK\n  \nSMET 1.1 ASCII\n[HEADER]\nfields = timestamp HS_mod\n[DATA]\n";
        let smet = SmetFile::parse(Cursor::new(data)).unwrap();
        assert_eq!(smet.header.signature(), Some("1.1"));

        // Only the first content line can carry the signature
        let data = "[HEADER]\nSMET 1.1 ASCII\nfields = timestamp HS_mod\n[DATA]\n";
        let smet = SmetFile::parse(Cursor::new(data)).unwrap();
        assert_eq!(smet.header.signature(), None);
    }

    #[test]
    fn test_fields_without_equals() {
        let data = "[HEADER]\nfields timestamp HS_mod\n[DATA]\n2025-01-01T00:00 1.0\n";
        let smet = SmetFile::parse(Cursor::new(data)).unwrap();
        assert_eq!(smet.columns, vec!["HS_mod"]);
        assert_eq!(smet.value(0, "HS_mod"), Some(1.0));
    }

    #[test]
    fn test_custom_nodata() {
        let data = "[HEADER]\nnodata = -9999\nfields = timestamp HS_mod\n[DATA]\n2025-01-01T00:00 -9999\n2025-01-01T01:00 -999\n";
        let smet = SmetFile::parse(Cursor::new(data)).unwrap();
        assert_eq!(smet.value(0, "HS_mod"), None);
        assert_eq!(smet.value(1, "HS_mod"), Some(-999.0));
    }

    #[test]
    fn test_header_defaults() {
        let data = "[HEADER]\nfields = timestamp HS_mod\n[DATA]\n";
        let smet = SmetFile::parse(Cursor::new(data)).unwrap();
        assert_eq!(smet.header.station_id(), "Unknown");
        assert_eq!(smet.header.station_name(), "Unknown");
        assert_eq!(smet.header.latitude(), 0.0);
        assert_eq!(smet.header.nodata(), DEFAULT_NODATA);
        assert_eq!(smet.header.tz(), None);
        assert!(smet.rows.is_empty());
        assert!(smet.latest().is_none());
        assert!(smet.nearest_row(ts(1, 0)).is_none());
    }

    #[test]
    fn test_missing_fields() {
        let data = "[HEADER]\nstation_id = X\n[DATA]\n";
        let err = SmetFile::parse(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SmetError::MissingFields));
    }

    #[test]
    fn test_missing_timestamp_column() {
        let data = "[HEADER]\nfields = HS_mod HN24\n[DATA]\n1.0 2.0\n";
        let err = SmetFile::parse(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SmetError::MissingTimestamp));
    }

    #[test]
    fn test_missing_data_section() {
        let data = "[HEADER]\nfields = timestamp HS_mod\n";
        let err = SmetFile::parse(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SmetError::MissingData));
    }

    #[test]
    fn test_column_count_mismatch() {
        let data = "[HEADER]\nfields = timestamp HS_mod HN24\n[DATA]\n2025-01-01T00:00 1.0\n";
        let err = SmetFile::parse(Cursor::new(data)).unwrap_err();
        match err {
            SmetError::ColumnCount {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 4);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let data = "[HEADER]\nfields = timestamp HS_mod\n[DATA]\nyesterday 1.0\n";
        let err = SmetFile::parse(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SmetError::Timestamp { line: 4, .. }));
    }

    #[test]
    fn test_nearest_row() {
        let smet = SmetFile::parse(Cursor::new(SAMPLE)).unwrap();

        assert_eq!(smet.nearest_row(ts(1, 0)), Some(0));
        assert_eq!(smet.nearest_row(ts(1, 5)), Some(0));
        assert_eq!(smet.nearest_row(ts(1, 7)), Some(1));
        // Exact tie between 12:00 and 00:00 next day
        assert_eq!(smet.nearest_row(ts(1, 18)), Some(2));
        assert_eq!(smet.nearest_row(ts(3, 0)), Some(2));
        // Before the first row clamps to the first
        let early = NaiveDate::from_ymd_opt(2024, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(smet.nearest_row(early), Some(0));
    }
}
