use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

// datasets-server /rows payload, reduced to what we store
#[derive(Deserialize)]
struct RowsPayload {
    rows: Vec<RowEntry>,
    num_rows_total: Option<i64>,
}

#[derive(Deserialize)]
struct RowEntry {
    row_idx: i64,
    row: Value,
}

pub struct ExampleRow {
    pub row_index: i64,
    pub fields: Map<String, Value>,
}

pub struct RowsPage {
    pub rows: Vec<ExampleRow>,
    pub num_rows_total: Option<i64>,
}

/// Parse a /rows payload into example rows. Rows whose body is not a JSON
/// object are dropped and counted.
pub fn parse_rows(payload: &Value) -> Result<(RowsPage, usize)> {
    let parsed: RowsPayload = serde_json::from_value(payload.clone())
        .map_err(|e| anyhow!("unexpected rows payload: {}", e))?;

    let mut rows = Vec::with_capacity(parsed.rows.len());
    let mut dropped = 0usize;
    for entry in parsed.rows {
        match entry.row {
            Value::Object(fields) => rows.push(ExampleRow { row_index: entry.row_idx, fields }),
            _ => dropped += 1,
        }
    }
    Ok((RowsPage { rows, num_rows_total: parsed.num_rows_total }, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rows_payload() {
        let payload = json!({
            "features": [{"name": "dialogue", "type": {"dtype": "string"}}],
            "rows": [
                {"row_idx": 0, "row": {"dialogue": "A: hi", "summary": "hi"}, "truncated_cells": []},
                {"row_idx": 1, "row": {"dialogue": "B: yo", "summary": "yo"}, "truncated_cells": []}
            ],
            "num_rows_total": 14732
        });
        let (page, dropped) = parse_rows(&payload).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(dropped, 0);
        assert_eq!(page.rows[0].row_index, 0);
        assert_eq!(page.rows[1].fields["summary"], "yo");
        assert_eq!(page.num_rows_total, Some(14732));
    }

    #[test]
    fn non_object_rows_are_dropped() {
        let payload = json!({
            "rows": [
                {"row_idx": 0, "row": "not-an-object"},
                {"row_idx": 1, "row": {"dialogue": "ok", "summary": "ok"}}
            ]
        });
        let (page, dropped) = parse_rows(&payload).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(dropped, 1);
        assert_eq!(page.num_rows_total, None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_rows(&json!({"rows": "nope"})).is_err());
    }
}
