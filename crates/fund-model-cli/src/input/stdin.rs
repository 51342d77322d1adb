use fund_model_core::fund::FundModelRequest;
use std::io::{self, Read};

/// Read a model request piped on stdin.
/// Returns None if stdin is a TTY or the pipe is empty.
pub fn read_stdin_request() -> Result<Option<FundModelRequest>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_request(&buffer)
}

/// JSON is valid YAML, so one parser covers both piped formats.
fn parse_request(text: &str) -> Result<Option<FundModelRequest>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let request = serde_yaml::from_str(trimmed)
        .map_err(|e| format!("Failed to parse request from stdin: {}", e))?;
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_input_is_no_request() {
        assert!(parse_request("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_json_request() {
        let request = parse_request(r#"{"fund_size": 75, "management_fee_rate": 0.015}"#)
            .unwrap()
            .unwrap();
        assert_eq!(request.fund_size, Some(dec!(75)));
        assert_eq!(request.management_fee_rate, Some(dec!(0.015)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_request(r#"{"fund_sise": 75}"#).is_err());
    }
}
