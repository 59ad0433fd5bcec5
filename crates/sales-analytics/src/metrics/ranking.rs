//! Rankings by volume and revenue

use rust_decimal::Decimal;
use serde::Serialize;

use super::{largest, mean, pct_of, sub, sum_by, total, try_total};
use crate::SalesDataset;
use crate::error::{AnalyticsError, Result};
use crate::model::{Dimension, Metric, SalesRecord};

/// Top `n` products by total `actual_quantity`
pub fn top_products_by_volume(dataset: &SalesDataset, n: usize) -> Result<Vec<(String, Decimal)>> {
    top_entities(dataset, Dimension::Product, Metric::ActualQuantity, n)
}

/// Revenue per location, highest first
pub fn revenue_by_location(dataset: &SalesDataset) -> Result<Vec<(String, Decimal)>> {
    top_entities(dataset, Dimension::Location, Metric::Revenue, usize::MAX)
}

/// Top `n` values of `group_by` by the summed `metric`
pub fn top_entities(
    dataset: &SalesDataset,
    group_by: Dimension,
    metric: Metric,
    n: usize,
) -> Result<Vec<(String, Decimal)>> {
    Ok(largest(
        sum_by(dataset, |r| group_by.key(r), |r| metric.value(r))?,
        n,
    ))
}

/// Product with the highest total revenue
pub fn product_max_revenue(dataset: &SalesDataset) -> Result<Option<(String, Decimal)>> {
    Ok(top_entities(dataset, Dimension::Product, Metric::Revenue, 1)?
        .into_iter()
        .next())
}

/// One location's slice of total revenue
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocationShare {
    pub local: String,
    pub revenue: Decimal,
    /// Percent of total revenue
    pub share_pct: Decimal,
}

pub fn revenue_share_by_location(dataset: &SalesDataset) -> Result<Vec<LocationShare>> {
    let ranking = revenue_by_location(dataset)?;
    let whole = total(ranking.iter().map(|(_, revenue)| *revenue))?;

    ranking
        .into_iter()
        .map(|(local, revenue)| {
            Ok(LocationShare {
                share_pct: pct_of(revenue, whole)?,
                local,
                revenue,
            })
        })
        .collect()
}

/// Among the `n` best sellers by volume, the one with the highest mean price
pub fn top_volume_highest_mean_price(
    dataset: &SalesDataset,
    n: usize,
) -> Result<Option<(String, Decimal)>> {
    best_among_top_sellers(
        dataset,
        n,
        |records| mean(records.iter().map(|r| r.actual_price)),
        |a, b| a > b,
    )
}

/// Among the `n` best sellers by volume, the one with the lowest revenue per unit
pub fn top_volume_lowest_unit_revenue(
    dataset: &SalesDataset,
    n: usize,
) -> Result<Option<(String, Decimal)>> {
    best_among_top_sellers(
        dataset,
        n,
        |records| {
            let volume = total(records.iter().map(|r| r.actual_quantity))?;
            let revenue = try_total(records.iter().map(|r| r.revenue()))?;
            if volume.is_zero() {
                return Ok(None);
            }
            revenue
                .checked_div(volume)
                .map(Some)
                .ok_or(AnalyticsError::Overflow("unit revenue"))
        },
        |a, b| a < b,
    )
}

fn best_among_top_sellers<S, B>(
    dataset: &SalesDataset,
    n: usize,
    score: S,
    better: B,
) -> Result<Option<(String, Decimal)>>
where
    S: Fn(&[&SalesRecord]) -> Result<Option<Decimal>>,
    B: Fn(Decimal, Decimal) -> bool,
{
    let mut best: Option<(String, Decimal)> = None;

    for (product, _) in top_products_by_volume(dataset, n)? {
        let records: Vec<&SalesRecord> = dataset.iter().filter(|r| r.product_id == product).collect();
        let Some(value) = score(&records)? else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, top)| better(value, *top)) {
            best = Some((product, value));
        }
    }
    Ok(best)
}

/// What removing the top revenue product would leave behind
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RevenueConcentration {
    pub product_id: String,
    pub product_revenue: Decimal,
    pub remaining_revenue: Decimal,
    /// Percent of total revenue the product accounts for
    pub share_pct: Decimal,
}

pub fn revenue_without_top_product(dataset: &SalesDataset) -> Result<Option<RevenueConcentration>> {
    let Some((product_id, product_revenue)) = product_max_revenue(dataset)? else {
        return Ok(None);
    };
    let whole = try_total(dataset.iter().map(SalesRecord::revenue))?;

    Ok(Some(RevenueConcentration {
        share_pct: pct_of(product_revenue, whole)?,
        remaining_revenue: sub(whole, product_revenue)?,
        product_id,
        product_revenue,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_top_products() {
        let ds = fixtures::dataset();

        let top = top_products_by_volume(&ds, 10).unwrap();
        assert_eq!(top, vec![("P1".into(), dec!(200)), ("P2".into(), dec!(40))]);

        assert_eq!(top_products_by_volume(&ds, 1).unwrap().len(), 1);
        assert!(top_products_by_volume(&ds, 0).unwrap().is_empty());
    }

    #[test]
    fn test_revenue_ranking_and_share() {
        let ds = fixtures::dataset();

        // tie: key order decides
        let ranking = revenue_by_location(&ds).unwrap();
        assert_eq!(ranking[0], ("RJ".into(), dec!(1400)));
        assert_eq!(ranking[1], ("SP".into(), dec!(1400)));

        let shares = revenue_share_by_location(&ds).unwrap();
        assert!(shares.iter().all(|s| s.share_pct == dec!(50)));
    }

    #[test]
    fn test_top_entities_by_location_volume() {
        let ds = fixtures::dataset();
        let top = top_entities(&ds, Dimension::Location, Metric::ActualQuantity, 5).unwrap();
        assert_eq!(top, vec![("SP".into(), dec!(130)), ("RJ".into(), dec!(110))]);
    }

    #[test]
    fn test_product_max_revenue() {
        assert_eq!(
            product_max_revenue(&fixtures::dataset()).unwrap(),
            Some(("P1".into(), dec!(2000)))
        );
        assert_eq!(product_max_revenue(&SalesDataset::default()).unwrap(), None);
    }

    #[test]
    fn test_best_among_top_sellers() {
        let ds = fixtures::dataset();
        assert_eq!(
            top_volume_highest_mean_price(&ds, 5).unwrap(),
            Some(("P2".into(), dec!(20)))
        );
        assert_eq!(
            top_volume_lowest_unit_revenue(&ds, 10).unwrap(),
            Some(("P1".into(), dec!(10)))
        );
    }

    #[test]
    fn test_revenue_concentration() {
        let c = revenue_without_top_product(&fixtures::dataset())
            .unwrap()
            .unwrap();
        assert_eq!(c.product_id, "P1");
        assert_eq!(c.remaining_revenue, dec!(800));
        assert_eq!(c.share_pct.round_dp(2), dec!(71.43));
    }

    #[test]
    fn test_revenue_overflow_is_an_error() {
        let huge = dec!(1000000000000000);
        let ds = SalesDataset::from_records(vec![fixtures::row(
            "2024-01-10",
            "P1",
            "SP",
            1,
            1_000_000_000_000_000,
            huge,
            None,
            dec!(0.9),
        )]);

        assert!(matches!(
            product_max_revenue(&ds),
            Err(AnalyticsError::Overflow(_))
        ));
        assert_eq!(
            top_products_by_volume(&ds, 1).unwrap(),
            vec![("P1".into(), huge)]
        );
    }
}
