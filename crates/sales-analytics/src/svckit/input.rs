//! Action Input parsing
//!
//! Models write tool arguments in whatever shape they like. Accepted forms:
//!
//! ```text
//! (empty) | None        -> defaults
//! 3                     -> first parameter
//! 2024-01-01, 2024-01-31 -> parameters in declaration order
//! {"top_n": 3}          -> JSON object
//! top_n=3; metric=local -> key=value pairs, `,` or `;` separated
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use agent_core::ToolError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::dataset::{parse_date, parse_decimal};

/// Named arguments for one tool call
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ToolArgs {
    values: BTreeMap<String, String>,
}

impl ToolArgs {
    /// Bind `input` to the tool's parameter names
    pub fn parse(input: &str, params: &[&str]) -> Result<Self, ToolError> {
        let input = strip_quotes(input.trim());
        if input.is_empty() || matches!(input.to_lowercase().as_str(), "none" | "null") {
            return Ok(Self::default());
        }

        if input.starts_with('{') {
            return Self::from_json(input);
        }

        if input.contains('=') {
            return Self::from_pairs(input);
        }

        let positional: Vec<&str> = input
            .split([',', ';'])
            .map(|v| strip_quotes(v.trim()))
            .collect();
        if positional.len() > params.len() {
            return Err(ToolError::InvalidInput(format!(
                "expected at most {} value(s) ({}), got '{input}'",
                params.len(),
                params.join(", ")
            )));
        }

        Ok(Self {
            values: params
                .iter()
                .zip(positional)
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| ((*k).to_string(), v.to_string()))
                .collect(),
        })
    }

    fn from_json(input: &str) -> Result<Self, ToolError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(input)
            .map_err(|e| ToolError::InvalidInput(format!("invalid JSON: {e}")))?;

        let values = object
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((k, s)),
                other => Some((k, other.to_string())),
            })
            .collect();
        Ok(Self { values })
    }

    fn from_pairs(input: &str) -> Result<Self, ToolError> {
        let mut values = BTreeMap::new();
        for pair in input.split([',', ';']).map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ToolError::InvalidInput(format!("expected key=value, got '{pair}'")))?;
            values.insert(
                strip_quotes(key.trim()).to_string(),
                strip_quotes(value.trim()).to_string(),
            );
        }
        Ok(Self { values })
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Required text argument
    pub fn required(&self, key: &str) -> Result<&str, ToolError> {
        self.text(key)
            .ok_or_else(|| ToolError::InvalidInput(format!("missing argument '{key}'")))
    }

    /// Column or enum-like argument parsed through `FromStr`
    pub fn parsed<T>(&self, key: &str, default: T) -> Result<T, ToolError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.text(key).map_or(Ok(default), |raw| {
            raw.parse()
                .map_err(|e| ToolError::InvalidInput(format!("{key}: {e}")))
        })
    }

    /// Non-negative whole number, `3.0` accepted
    pub fn count(&self, key: &str, default: usize) -> Result<usize, ToolError> {
        let Some(raw) = self.text(key) else {
            return Ok(default);
        };
        raw.parse::<usize>()
            .ok()
            .or_else(|| {
                parse_decimal(raw)
                    .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
                    .and_then(|d| d.to_usize())
            })
            .ok_or_else(|| ToolError::InvalidInput(format!("{key} must be a whole number, got '{raw}'")))
    }

    /// Decimal; `20%` is read as 0.2
    pub fn decimal(&self, key: &str, default: Decimal) -> Result<Decimal, ToolError> {
        let Some(raw) = self.text(key) else {
            return Ok(default);
        };
        let parsed = match raw.strip_suffix('%') {
            Some(pct) => parse_decimal(pct).map(|v| v / Decimal::ONE_HUNDRED),
            None => parse_decimal(raw),
        };
        parsed.ok_or_else(|| ToolError::InvalidInput(format!("{key} must be a number, got '{raw}'")))
    }

    /// Required date, ISO or day-first
    pub fn date(&self, key: &str) -> Result<NaiveDate, ToolError> {
        let raw = self.required(key)?;
        parse_date(raw)
            .ok_or_else(|| ToolError::InvalidInput(format!("{key} must be a date (YYYY-MM-DD), got '{raw}'")))
    }
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, '"' | '\'' | '`')).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOP: &[&str] = &["group_by_col", "metric", "top_n"];

    #[test]
    fn test_empty_and_none_use_defaults() {
        for input in ["", "  ", "None", "\"\"", "null"] {
            let args = ToolArgs::parse(input, TOP).unwrap();
            assert_eq!(args.count("top_n", 5).unwrap(), 5, "input {input:?}");
        }
    }

    #[test]
    fn test_positional() {
        let args = ToolArgs::parse("local, receita, 3", TOP).unwrap();
        assert_eq!(args.text("group_by_col"), Some("local"));
        assert_eq!(args.text("metric"), Some("receita"));
        assert_eq!(args.count("top_n", 5).unwrap(), 3);
    }

    #[test]
    fn test_bare_value_binds_first_param() {
        let args = ToolArgs::parse("3", &["top_n"]).unwrap();
        assert_eq!(args.count("top_n", 10).unwrap(), 3);
    }

    #[test]
    fn test_too_many_positional_values() {
        assert!(matches!(
            ToolArgs::parse("1, 2", &["top_n"]),
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_json_object() {
        let args = ToolArgs::parse(r#"{"top_n": 3, "metric": "actual_price", "x": null}"#, TOP).unwrap();
        assert_eq!(args.count("top_n", 5).unwrap(), 3);
        assert_eq!(args.text("metric"), Some("actual_price"));
        assert_eq!(args.text("x"), None);

        assert!(ToolArgs::parse("{top_n: 3", TOP).is_err());
    }

    #[test]
    fn test_key_value_pairs() {
        let args = ToolArgs::parse("start_date=2024-01-01; end_date='2024-01-31'", &[]).unwrap();
        assert_eq!(
            args.date("end_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert!(args.date("missing").is_err());
    }

    #[test]
    fn test_numbers() {
        let args = ToolArgs::parse("threshold=20%, top_n=2.0, bad=x", &[]).unwrap();
        assert_eq!(args.decimal("threshold", dec!(0.1)).unwrap(), dec!(0.2));
        assert_eq!(args.count("top_n", 1).unwrap(), 2);
        assert!(args.count("bad", 1).is_err());
        assert!(args.decimal("bad", dec!(1)).is_err());

        let args = ToolArgs::parse("0,3", &["threshold"]);
        // a comma is a separator in positional form
        assert!(args.is_err());
    }
}
