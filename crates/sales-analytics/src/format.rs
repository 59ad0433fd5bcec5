//! Text rendering for tool observations

use comfy_table::{Table, presets};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Human-scale number: `1.50 Mil`, `2.30 Milhões`, `1.00 Bilhões`
pub fn magnitude(value: Decimal) -> String {
    if value >= dec!(1000000000) {
        format!("{:.2} Bilhões", value / dec!(1000000000))
    } else if value >= dec!(1000000) {
        format!("{:.2} Milhões", value / dec!(1000000))
    } else if value >= dec!(1000) {
        format!("{:.2} Mil", value / dec!(1000))
    } else {
        plain(value)
    }
}

/// Rounded to two places, trailing zeros dropped
pub fn plain(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

/// Fixed two decimal places
pub fn fixed(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Percentage already scaled to 0..100
pub fn percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Whitespace-aligned table, no borders
pub fn table<R>(headers: &[&str], rows: impl IntoIterator<Item = R>) -> String
where
    R: IntoIterator<Item = String>,
{
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(headers.iter().copied());
    for row in rows {
        table.add_row(row.into_iter().collect::<Vec<_>>());
    }

    table
        .to_string()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `key: value` lines
pub fn pairs<'a>(entries: impl IntoIterator<Item = (&'a str, String)>) -> String {
    entries
        .into_iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
