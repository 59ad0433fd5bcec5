//! Time-based aggregations

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{add, mean, total};
use crate::SalesDataset;
use crate::error::{AnalyticsError, Result};

/// Total `actual_quantity` between two dates, both inclusive
pub fn total_volume_in_period(
    dataset: &SalesDataset,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal> {
    if start > end {
        return Err(AnalyticsError::InvalidPeriod { start, end });
    }

    total(
        dataset
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .map(|r| r.actual_quantity),
    )
}

/// Volume per calendar month, keyed `(year, month)`
pub fn volume_by_month(dataset: &SalesDataset) -> Result<BTreeMap<(i32, u32), Decimal>> {
    let mut months = BTreeMap::new();
    for record in dataset {
        let volume = months
            .entry((record.date.year(), record.date.month()))
            .or_insert(Decimal::ZERO);
        *volume = add(*volume, record.actual_quantity)?;
    }
    Ok(months)
}

/// Calendar month with the lowest volume, as `("YYYY-MM", volume)`
pub fn month_lowest_volume(dataset: &SalesDataset) -> Result<Option<(String, Decimal)>> {
    Ok(volume_by_month(dataset)?
        .into_iter()
        .fold(None, |best: Option<((i32, u32), Decimal)>, (month, volume)| match best {
            Some((_, low)) if low <= volume => best,
            _ => Some((month, volume)),
        })
        .map(|((year, month), volume)| (format!("{year:04}-{month:02}"), volume)))
}

/// Volume per day, averaged over the days that have sales
pub fn mean_daily_volume(dataset: &SalesDataset) -> Result<Option<Decimal>> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in dataset {
        let volume = days.entry(record.date).or_insert(Decimal::ZERO);
        *volume = add(*volume, record.actual_quantity)?;
    }
    mean(days.into_values())
}

/// Largest single-day volume of one product
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyPeak {
    pub product_id: String,
    pub date: NaiveDate,
    pub volume: Decimal,
}

pub fn peak_daily_product(dataset: &SalesDataset) -> Result<Option<DailyPeak>> {
    let mut days: BTreeMap<(&str, NaiveDate), Decimal> = BTreeMap::new();
    for record in dataset {
        let volume = days
            .entry((record.product_id.as_str(), record.date))
            .or_insert(Decimal::ZERO);
        *volume = add(*volume, record.actual_quantity)?;
    }

    Ok(days
        .into_iter()
        .fold(None, |best: Option<((&str, NaiveDate), Decimal)>, (key, volume)| match best {
            Some((_, top)) if top >= volume => best,
            _ => Some((key, volume)),
        })
        .map(|((product, date), volume)| DailyPeak {
            product_id: product.to_string(),
            date,
            volume,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_period_is_inclusive() {
        let ds = fixtures::dataset();

        assert_eq!(
            total_volume_in_period(&ds, day("2024-01-10"), day("2024-01-10")).unwrap(),
            dec!(150)
        );
        assert_eq!(
            total_volume_in_period(&ds, day("2024-01-01"), day("2024-01-31")).unwrap(),
            dec!(230)
        );
        assert_eq!(
            total_volume_in_period(&ds, day("2023-01-01"), day("2023-12-31")).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let ds = fixtures::dataset();
        assert!(matches!(
            total_volume_in_period(&ds, day("2024-02-01"), day("2024-01-01")),
            Err(AnalyticsError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_months_and_days() {
        let ds = fixtures::dataset();

        assert_eq!(month_lowest_volume(&ds).unwrap(), Some(("2024-02".into(), dec!(10))));
        // 150, 80, 10 over three days
        assert_eq!(mean_daily_volume(&ds).unwrap(), Some(dec!(80)));
    }

    #[test]
    fn test_peak_daily_product() {
        let peak = peak_daily_product(&fixtures::dataset()).unwrap().unwrap();
        assert_eq!(peak.product_id, "P1");
        assert_eq!(peak.date, day("2024-01-10"));
        assert_eq!(peak.volume, dec!(120));
    }
}
