use serde_json::Value;

use super::{format_value, result_of};

/// Fields that answer each command, in priority order.
const PRIORITY_KEYS: [&str; 2] = ["lower_interest_method", "monthly_total"];

/// Print just the key answer: the solved value, the plan's total interest,
/// or the cheaper repayment method.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Some(solved_for) = value.get("solved_for").and_then(Value::as_str) {
        if let Some(val) = result.get(solved_for) {
            println!("{}", format_value(val));
            return;
        }
    }

    if let Some(summary) = result.get("summary") {
        if let Some(interest) = summary.get("total_interest") {
            println!("{}", format_value(interest));
            return;
        }
    }

    for key in PRIORITY_KEYS {
        if let Some(val) = result.get(key) {
            if !val.is_null() {
                println!("{}", format_value(val));
                return;
            }
        }
    }

    println!("{}", format_value(result));
}
