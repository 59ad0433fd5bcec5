//! Whole-table figures

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{mean, total, try_total};
use crate::SalesDataset;
use crate::error::Result;
use crate::model::{Dimension, SalesRecord};

/// Headline numbers for the whole dataset
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub rows: usize,
    pub products: usize,
    pub locations: usize,
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub total_volume: Decimal,
    pub total_revenue: Decimal,
    pub mean_price: Option<Decimal>,
    pub mean_service_level: Option<Decimal>,
}

pub fn overview(dataset: &SalesDataset) -> Result<Overview> {
    Ok(Overview {
        rows: dataset.len(),
        products: dataset.distinct(Dimension::Product),
        locations: dataset.distinct(Dimension::Location),
        period: dataset.date_range(),
        total_volume: total(dataset.iter().map(|r| r.actual_quantity))?,
        total_revenue: try_total(dataset.iter().map(SalesRecord::revenue))?,
        mean_price: mean_price(dataset)?,
        mean_service_level: mean(dataset.iter().map(|r| r.service_level))?,
    })
}

/// Plain mean of `actual_price` over all rows
pub fn mean_price(dataset: &SalesDataset) -> Result<Option<Decimal>> {
    mean(dataset.iter().map(|r| r.actual_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overview() {
        let o = overview(&fixtures::dataset()).unwrap();

        assert_eq!(o.rows, 4);
        assert_eq!(o.products, 2);
        assert_eq!(o.locations, 2);
        assert_eq!(o.total_volume, dec!(240));
        assert_eq!(o.total_revenue, dec!(2800));
        assert_eq!(o.mean_price, Some(dec!(15)));
    }

    #[test]
    fn test_empty_overview() {
        let o = overview(&SalesDataset::default()).unwrap();
        assert_eq!(o.rows, 0);
        assert_eq!(o.mean_price, None);
        assert_eq!(o.total_revenue, Decimal::ZERO);
    }
}
