use serde_json::Value;

use super::format_scalar;

/// Headline figures, most telling first. `lp_returns` covers the full-run report.
const PRIORITY_KEYS: [&str; 5] = [
    "net_irr",
    "net_moic",
    "gross_moic",
    "total_deployable",
    "directory",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known headline fields in the result (and its `lp_returns`
/// section), then the last row of a row table (the portfolio total, the
/// final cash-flow year), then the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        return format_scalar(result);
    };

    let sections = [Some(map), map.get("lp_returns").and_then(Value::as_object)];
    for key in PRIORITY_KEYS {
        for section in sections.iter().flatten() {
            if let Some(val) = section.get(key).filter(|v| !v.is_null()) {
                return format_scalar(val);
            }
        }
    }

    if let Some(Value::Object(last)) = map
        .get("rows")
        .and_then(Value::as_array)
        .and_then(|rows| rows.last())
    {
        return last
            .iter()
            .map(|(k, v)| format!("{k}={}", format_scalar(v)))
            .collect::<Vec<_>>()
            .join(" ");
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_scalar(val)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_run_prints_net_irr() {
        let out = json!({"result": {"fund_overview": {}, "lp_returns": {"net_moic": "4.2656", "net_irr": "0.187"}}});
        assert_eq!(minimal_line(&out), "0.187");
    }

    #[test]
    fn test_row_table_prints_last_row() {
        let out = json!({"result": {"rows": [{"category": "Seed"}, {"category": "Total Portfolio"}]}});
        assert_eq!(minimal_line(&out), "category=Total Portfolio");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let out = json!({"fund_size": "50.0"});
        assert_eq!(minimal_line(&out), "fund_size: 50.0");
    }
}
