//! Renders facade row types as a tab-separated table or, with `--json`, as
//! JSON — the CLI's only opinion about presentation, kept well away from
//! the query logic it renders.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

pub fn print_rows<T: Serialize>(rows: &[T], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(rows).expect("row types always serialize"));
        return;
    }
    print_table(rows);
}

pub fn print_row<T: Serialize>(row: &T, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(row).expect("row types always serialize"));
        return;
    }
    print_table(std::slice::from_ref(row));
}

fn print_table<T: Serialize>(rows: &[T]) {
    let values: Vec<serde_json::Value> =
        rows.iter().map(|row| serde_json::to_value(row).expect("row types always serialize")).collect();
    let Some(serde_json::Value::Object(first)) = values.first() else {
        return;
    };
    let columns: Vec<&String> = first.keys().collect();
    println!("{}", columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join("\t"));
    for value in &values {
        let serde_json::Value::Object(map) = value else { continue };
        let cells: Vec<String> = columns.iter().map(|c| cell(map.get(c.as_str()))).collect();
        println!("{}", cells.join("\t"));
    }
}

fn cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn write_bytes(bytes: &[u8]) -> Result<()> {
    std::io::stdout().write_all(bytes)?;
    Ok(())
}
