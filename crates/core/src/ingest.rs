//! CSV ingestion and upload body classification.
//!
//! The upload endpoint accepts either a raw JSON array or CSV text. The CSV
//! dialect is deliberately naive and fixed by the dashboard's export format:
//! newline-separated rows, comma-separated cells, no quoting rules.

use crate::record::Record;
use serde_json::Value;

/// How an upload body should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Json,
    Csv,
}

/// Classify an upload body.
///
/// A `Content-Type` mentioning `json` or `csv` decides directly; otherwise
/// the first non-whitespace byte is sniffed (`[` or `{` start JSON).
pub fn classify(content_type: Option<&str>, body: &str) -> UploadFormat {
    if let Some(ct) = content_type {
        let ct = ct.to_ascii_lowercase();
        if ct.contains("json") {
            return UploadFormat::Json;
        }
        if ct.contains("csv") {
            return UploadFormat::Csv;
        }
    }
    match body.trim_start().as_bytes().first() {
        Some(b'[') | Some(b'{') => UploadFormat::Json,
        _ => UploadFormat::Csv,
    }
}

/// Parse CSV text into records.
///
/// The first non-blank line is the header row; each subsequent non-blank line
/// becomes one record by positional header-to-value mapping. Short rows are
/// padded with empty strings, extra cells beyond the headers are dropped.
pub fn parse_csv(text: &str) -> Result<Vec<Record>, String> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| "CSV body has no header row".to_string())?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for line in lines {
        let mut cells = line.split(',').map(str::trim);
        let mut map = serde_json::Map::new();
        for header in &headers {
            let cell = cells.next().unwrap_or("");
            map.insert(header.clone(), Value::String(cell.to_string()));
        }
        records.push(Record(map));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_basic_csv() {
        let records = parse_csv("id,Status\n1,Open\n2,Closed\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0["id"], json!("1"));
        assert_eq!(records[0].0["Status"], json!("Open"));
        assert_eq!(records[1].0["Status"], json!("Closed"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let records = parse_csv("id,name\n\n1,alpha\n\n\n2,beta\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_short_rows_padded_with_empty_strings() {
        let records = parse_csv("id,name,owner\n1,alpha\n").unwrap();
        assert_eq!(records[0].0["owner"], json!(""));
    }

    #[test]
    fn test_extra_cells_are_dropped() {
        let records = parse_csv("id,name\n1,alpha,spurious\n").unwrap();
        assert_eq!(records[0].0.len(), 2);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let records = parse_csv("id , name\n 1 , alpha \n").unwrap();
        assert_eq!(records[0].0["id"], json!("1"));
        assert_eq!(records[0].0["name"], json!("alpha"));
    }

    #[test]
    fn test_header_only_yields_empty_dataset() {
        assert!(parse_csv("id,name\n").unwrap().is_empty());
    }

    #[test]
    fn test_empty_body_is_an_error() {
        assert!(parse_csv("").is_err());
        assert!(parse_csv("\n\n").is_err());
    }

    #[test]
    fn test_classify_by_content_type() {
        assert_eq!(
            classify(Some("application/json"), "id,name"),
            UploadFormat::Json
        );
        assert_eq!(classify(Some("text/csv"), "[{}]"), UploadFormat::Csv);
    }

    #[test]
    fn test_classify_sniffs_body() {
        assert_eq!(classify(None, "  [{\"a\":1}]"), UploadFormat::Json);
        assert_eq!(classify(None, "id,name\n1,x"), UploadFormat::Csv);
        assert_eq!(classify(Some("text/plain"), "[1]"), UploadFormat::Json);
    }
}
