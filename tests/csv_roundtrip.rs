//! Lookup-table CSV output must read back cell for cell with a standard
//! CSV parser.

use mixpanel_mcp::mixpanel::csv::rows_to_csv;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}",
        Just(String::new()),
        "[a-z,\"\n\r ]{1,12}",
        Just("Acme, Inc".to_string()),
        Just("say \"hi\"".to_string()),
    ]
}

fn table() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
    (1usize..5).prop_flat_map(|width| {
        (
            prop::collection::vec("[a-z_]{1,8}", width),
            prop::collection::vec(prop::collection::vec(cell(), width), 1..8),
        )
    })
}

fn read_back(text: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes())
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

proptest! {
    #[test]
    fn csv_output_parses_back((columns, rows) in table()) {
        let mut columns = columns;
        columns.sort();
        columns.dedup();
        let width = columns.len();

        let maps: Vec<Map<String, Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), Value::String(v.clone())))
                    .collect()
            })
            .collect();

        let text = rows_to_csv(&maps).unwrap();
        let records = read_back(&text);

        prop_assert_eq!(records.len(), rows.len() + 1);
        prop_assert_eq!(&records[0], &columns);
        for (record, row) in records[1..].iter().zip(&rows) {
            prop_assert_eq!(record.as_slice(), &row[..width]);
        }
    }
}

#[test]
fn test_non_string_cells_use_json_text() {
    let rows: Vec<Map<String, Value>> = vec![
        serde_json::from_str(r#"{"id": 1, "tags": ["a","b"], "ok": true, "gone": null}"#).unwrap(),
        serde_json::from_str(r#"{"id": 2}"#).unwrap(),
    ];
    let text = rows_to_csv(&rows).unwrap();
    let records = read_back(&text);
    assert_eq!(records[0], ["id", "tags", "ok", "gone"]);
    assert_eq!(records[1], ["1", r#"["a","b"]"#, "true", ""]);
    assert_eq!(records[2], ["2", "", "", ""]);
}

#[test]
fn test_one_column_table_keeps_empty_rows() {
    let rows: Vec<Map<String, Value>> =
        serde_json::from_str(r#"[{"id":"a"},{"id":""},{"id":null},{},{"id":"c"}]"#).unwrap();
    let records = read_back(&rows_to_csv(&rows).unwrap());
    assert_eq!(records, [["id"], ["a"], [""], [""], [""], ["c"]]);
}
