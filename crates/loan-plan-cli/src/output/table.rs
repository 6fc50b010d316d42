use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, result_of, SCHEDULE_COLUMNS};

/// Print summaries as field/value tables and the schedule as one row per
/// month.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            for (key, section) in result {
                match section {
                    Value::Object(fields) => {
                        println!("{}", heading(key));
                        println!("{}", field_table(fields));
                    }
                    Value::Array(rows) if key == "schedule" => {
                        println!("{}", heading(key));
                        println!("{}", schedule_table(rows));
                    }
                    _ => {}
                }
            }

            let scalars: Map<String, Value> = result
                .iter()
                .filter(|(_, v)| !v.is_object() && !v.is_array())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if !scalars.is_empty() {
                println!("{}", field_table(&scalars));
            }
        }
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
}

fn heading(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

fn field_table(fields: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    Table::from(builder)
}

fn schedule_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS.iter().map(|(_, title)| title.to_string()));
    for row in rows {
        builder.push_record(
            SCHEDULE_COLUMNS
                .iter()
                .map(|(key, _)| row.get(*key).map(format_value).unwrap_or_default()),
        );
    }
    Table::from(builder)
}
