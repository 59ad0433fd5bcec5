//! Sales Metrics
//!
//! Pure aggregations over a [`SalesDataset`](crate::SalesDataset). Each
//! function returns typed results; rendering them for the model is the tools'
//! job.
//!
//! Grouped results come back in key order (ties in a ranking keep that order).
//! Arithmetic is overflow-checked: a table whose figures exceed `Decimal`'s
//! range yields [`AnalyticsError::Overflow`] instead of a result.

pub mod overview;
pub mod period;
pub mod planning;
pub mod promotion;
pub mod ranking;
pub mod service;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{AnalyticsError, Result};
use crate::model::SalesRecord;

/// Checked `a + b`
pub(crate) fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or(AnalyticsError::Overflow("sum"))
}

/// Checked `a - b`
pub(crate) fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or(AnalyticsError::Overflow("difference"))
}

/// Sum of fallible values
pub(crate) fn try_total(values: impl IntoIterator<Item = Result<Decimal>>) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| add(acc, value?))
}

pub(crate) fn total(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal> {
    try_total(values.into_iter().map(Ok))
}

/// `part / whole` in percent, 0 for an empty whole
pub(crate) fn pct_of(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(AnalyticsError::Overflow("percentage"))
}

/// Sum `value` per `key`
pub(crate) fn sum_by<'a, K, V>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
    key: K,
    value: V,
) -> Result<BTreeMap<&'a str, Decimal>>
where
    K: Fn(&'a SalesRecord) -> &'a str,
    V: Fn(&SalesRecord) -> Result<Decimal>,
{
    let mut totals = BTreeMap::new();
    for record in records {
        let entry = totals.entry(key(record)).or_insert(Decimal::ZERO);
        *entry = add(*entry, value(record)?)?;
    }
    Ok(totals)
}

/// Arithmetic mean, `None` for no values
pub(crate) fn mean(values: impl IntoIterator<Item = Decimal>) -> Result<Option<Decimal>> {
    let mut count = 0u64;
    let sum = total(values.into_iter().inspect(|_| count += 1))?;
    Ok((count > 0).then(|| sum / Decimal::from(count)))
}

/// The `n` largest entries, descending
pub(crate) fn largest<K: ToString>(
    totals: impl IntoIterator<Item = (K, Decimal)>,
    n: usize,
) -> Vec<(String, Decimal)> {
    let mut ranked: Vec<_> = totals.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::SalesDataset;
    use crate::model::SalesRecord;

    #[allow(clippy::too_many_arguments)]
    pub fn row(
        date: &str,
        product: &str,
        local: &str,
        planned: i64,
        actual: i64,
        price: Decimal,
        promo: Option<&str>,
        service: Decimal,
    ) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            product_id: product.into(),
            local: local.into(),
            planned_quantity: Decimal::from(planned),
            actual_quantity: Decimal::from(actual),
            actual_price: price,
            promotion_type: promo.map(String::from),
            service_level: service,
        }
    }

    /// Small table with two products, two locations and one promotion
    pub fn dataset() -> SalesDataset {
        use rust_decimal_macros::dec;

        SalesDataset::from_records(vec![
            row("2024-01-10", "P1", "SP", 100, 120, dec!(10), None, dec!(0.98)),
            row("2024-01-10", "P2", "RJ", 50, 30, dec!(20), Some("desconto"), dec!(0.80)),
            row("2024-01-11", "P1", "RJ", 80, 80, dec!(10), Some("desconto"), dec!(0.90)),
            row("2024-02-05", "P2", "SP", 40, 10, dec!(20), None, dec!(0.99)),
        ])
    }
}
