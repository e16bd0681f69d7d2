use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE (e.g., 'weights.quickness=2.0').")]
    MissingSeparator(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },

    #[error("Invalid {expected} value for '{key}': '{value}'.")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Splits `KEY=VALUE` at the first `=`, trimming both sides.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::MissingSeparator(input.to_string()))?;
    let (key, value) = (key.trim(), value.trim());

    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    if value.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "value",
            input: input.to_string(),
        });
    }
    Ok((key, value))
}

/// Parses `value` as `T`, naming `key` and the `expected` kind in the error.
pub fn parse_value<T: FromStr>(key: &str, value: &str, expected: &'static str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_equals_sign() {
        assert_eq!(parse_key_value("solver.seed=42"), Ok(("solver.seed", "42")));
        assert_eq!(parse_key_value(" mode = wvw "), Ok(("mode", "wvw")));
        assert_eq!(parse_key_value("a=b=c"), Ok(("a", "b=c")));
    }

    #[test]
    fn rejects_missing_separator_and_empty_parts() {
        assert_eq!(
            parse_key_value("solver.seed"),
            Err(ParseError::MissingSeparator("solver.seed".to_string()))
        );
        assert!(matches!(
            parse_key_value("=3"),
            Err(ParseError::EmptyComponent { component: "key", .. })
        ));
        assert!(matches!(
            parse_key_value("solver.seed= "),
            Err(ParseError::EmptyComponent { component: "value", .. })
        ));
    }

    #[test]
    fn parse_value_reports_the_key() {
        assert_eq!(parse_value::<u64>("solver.seed", "7", "integer"), Ok(7));
        let err = parse_value::<f64>("weights.quickness", "lots", "float").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid float value for 'weights.quickness': 'lots'."
        );
    }
}
