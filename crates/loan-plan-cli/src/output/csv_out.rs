use serde_json::Value;
use std::io;

use super::{result_of, SCHEDULE_COLUMNS};

/// Write the schedule as CSV when there is one, otherwise the result as
/// `field,value` pairs. Values keep full precision.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    let outcome = match result.get("schedule") {
        Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
        _ => write_fields(&mut wtr, result),
    };
    if let Err(e) = outcome.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    wtr.write_record(SCHEDULE_COLUMNS.iter().map(|(key, _)| *key))?;

    for row in rows {
        let record: Vec<String> = SCHEDULE_COLUMNS
            .iter()
            .map(|(key, _)| row.get(*key).map(csv_value).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    write_flattened(wtr, "", value)
}

/// Nested objects are flattened to dotted field names.
fn write_flattened<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    prefix: &str,
    value: &Value,
) -> csv::Result<()> {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                write_flattened(wtr, &name, val)?;
            }
            Ok(())
        }
        other => wtr.write_record([prefix, &csv_value(other)]),
    }
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
