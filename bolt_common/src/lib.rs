mod money;

pub use money::{parse_decimal_price, MinorUnits, PriceParseError};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boolean_flags_accept_the_usual_spellings() {
        assert!(parse_boolean_flag(Some("1".to_string()), false));
        assert!(parse_boolean_flag(Some(" Yes ".to_string()), false));
        assert!(!parse_boolean_flag(Some("off".to_string()), true));
        assert!(!parse_boolean_flag(Some("FALSE".to_string()), true));
    }

    #[test]
    fn unparseable_or_missing_flags_fall_back_to_the_default() {
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(None, false));
        assert!(parse_boolean_flag(Some("maybe".to_string()), true));
    }
}
