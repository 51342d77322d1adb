use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, is_row_array};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into one Field/Value table. Row arrays (cash-flow years,
/// portfolio categories, scenarios) and nested sections get a titled table each.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section(None, result);
                print_envelope_notes(map);
            } else {
                print_section(None, value);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_section(title: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            // A section that is only a row list prints as that list.
            if map.len() == 1 {
                if let Some(Value::Array(arr)) = map.get("rows") {
                    print_title(title);
                    print_rows(arr);
                    return;
                }
            }

            let scalars: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(_, v)| !is_row_array(v) && !v.is_object())
                .collect();
            if !scalars.is_empty() {
                print_title(title);
                print_fields(&scalars);
            }

            for (key, val) in map {
                if is_row_array(val) || val.is_object() {
                    let nested = match title {
                        Some(t) => format!("{t}.{key}"),
                        None => key.clone(),
                    };
                    print_section(Some(&nested), val);
                }
            }
        }
        Value::Array(arr) => {
            print_title(title);
            print_rows(arr);
        }
        other => {
            print_title(title);
            println!("{}", format_scalar(other));
        }
    }
}

fn print_title(title: Option<&str>) {
    if let Some(t) = title {
        println!("\n{t}:");
    }
}

fn print_fields(fields: &[(&String, &Value)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        other => format_scalar(other),
    }
}
