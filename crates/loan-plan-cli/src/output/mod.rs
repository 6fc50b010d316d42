pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Schedule row fields in display order, with table headings.
pub(crate) const SCHEDULE_COLUMNS: [(&str, &str); 7] = [
    ("month", "#"),
    ("year", "Year"),
    ("month_of_year", "Month"),
    ("total_payment", "Payment"),
    ("principal", "Principal"),
    ("interest", "Interest"),
    ("remaining_principal", "Remaining"),
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` payload of an output envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Render a scalar for display. Decimal strings are shown to the cent.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<rust_decimal::Decimal>() {
            Ok(d) if d.scale() > 2 => d.round_dp(2).to_string(),
            _ => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
