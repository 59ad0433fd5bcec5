//! Promotion impact

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::{add, pct_of, sub};
use crate::SalesDataset;
use crate::error::Result;
use crate::model::SalesRecord;

/// Means over a group of rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromotionStats {
    pub rows: usize,
    pub mean_volume: Decimal,
    pub mean_price: Decimal,
    pub mean_service_level: Decimal,
}

#[derive(Default)]
struct Accumulator {
    rows: u64,
    volume: Decimal,
    price: Decimal,
    service: Decimal,
}

impl Accumulator {
    fn push(&mut self, record: &SalesRecord) -> Result<()> {
        self.rows += 1;
        self.volume = add(self.volume, record.actual_quantity)?;
        self.price = add(self.price, record.actual_price)?;
        self.service = add(self.service, record.service_level)?;
        Ok(())
    }

    fn finish(self) -> PromotionStats {
        let n = Decimal::from(self.rows.max(1));
        PromotionStats {
            rows: usize::try_from(self.rows).unwrap_or(usize::MAX),
            mean_volume: self.volume / n,
            mean_price: self.price / n,
            mean_service_level: self.service / n,
        }
    }
}

/// Means per (product, promotion type)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductPromotionImpact {
    pub product_id: String,
    pub promotion_type: String,
    pub stats: PromotionStats,
}

pub fn impact_by_product(dataset: &SalesDataset) -> Result<Vec<ProductPromotionImpact>> {
    let mut groups: BTreeMap<(&str, &str), Accumulator> = BTreeMap::new();
    for record in dataset {
        groups
            .entry((record.product_id.as_str(), record.promotion_label()))
            .or_default()
            .push(record)?;
    }

    Ok(groups
        .into_iter()
        .map(|((product, promotion), acc)| ProductPromotionImpact {
            product_id: product.to_string(),
            promotion_type: promotion.to_string(),
            stats: acc.finish(),
        })
        .collect())
}

/// Means per promotion type
pub fn impact_by_type(dataset: &SalesDataset) -> Result<Vec<(String, PromotionStats)>> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in dataset {
        groups.entry(record.promotion_label()).or_default().push(record)?;
    }

    Ok(groups
        .into_iter()
        .map(|(promotion, acc)| (promotion.to_string(), acc.finish()))
        .collect())
}

/// Share of the business done under a promotion, in percent
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromotionShare {
    pub rows_pct: Decimal,
    pub volume_pct: Decimal,
    pub revenue_pct: Decimal,
}

pub fn promotion_share(dataset: &SalesDataset) -> Result<PromotionShare> {
    let (mut rows, mut volume, mut revenue) = (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    let (mut promo_rows, mut promo_volume, mut promo_revenue) =
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);

    for record in dataset {
        let row_revenue = record.revenue()?;
        rows += Decimal::ONE;
        volume = add(volume, record.actual_quantity)?;
        revenue = add(revenue, row_revenue)?;
        if record.has_promotion() {
            promo_rows += Decimal::ONE;
            promo_volume = add(promo_volume, record.actual_quantity)?;
            promo_revenue = add(promo_revenue, row_revenue)?;
        }
    }

    Ok(PromotionShare {
        rows_pct: pct_of(promo_rows, rows)?,
        volume_pct: pct_of(promo_volume, volume)?,
        revenue_pct: pct_of(promo_revenue, revenue)?,
    })
}

/// Product whose mean volume grows the most under promotion.
///
/// Only products sold both with and without promotion are compared. Returns
/// the product and `mean(with) - mean(without)`.
pub fn max_promotion_lift(dataset: &SalesDataset) -> Result<Option<(String, Decimal)>> {
    let mut groups: BTreeMap<&str, (Accumulator, Accumulator)> = BTreeMap::new();
    for record in dataset {
        let (with, without) = groups.entry(record.product_id.as_str()).or_default();
        if record.has_promotion() {
            with.push(record)?;
        } else {
            without.push(record)?;
        }
    }

    let mut best: Option<(&str, Decimal)> = None;
    for (product, (with, without)) in groups {
        if with.rows == 0 || without.rows == 0 {
            continue;
        }
        let lift = sub(with.finish().mean_volume, without.finish().mean_volume)?;
        if best.is_none_or(|(_, top)| lift > top) {
            best = Some((product, lift));
        }
    }
    Ok(best.map(|(product, lift)| (product.to_string(), lift)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures;
    use crate::model::NO_PROMOTION;
    use rust_decimal_macros::dec;

    #[test]
    fn test_impact_by_type() {
        let impact = impact_by_type(&fixtures::dataset()).unwrap();

        assert_eq!(impact.len(), 2);
        let (label, stats) = &impact[0];
        assert_eq!(label, "desconto");
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.mean_volume, dec!(55));
        assert_eq!(stats.mean_service_level, dec!(0.85));

        let (label, stats) = &impact[1];
        assert_eq!(label, NO_PROMOTION);
        assert_eq!(stats.mean_volume, dec!(65));
    }

    #[test]
    fn test_impact_by_product() {
        let impact = impact_by_product(&fixtures::dataset()).unwrap();

        assert_eq!(impact.len(), 4);
        assert_eq!(impact[0].product_id, "P1");
        assert_eq!(impact[0].promotion_type, "desconto");
        assert_eq!(impact[0].stats.mean_volume, dec!(80));
    }

    #[test]
    fn test_promotion_share() {
        let share = promotion_share(&fixtures::dataset()).unwrap();

        assert_eq!(share.rows_pct, dec!(50));
        assert_eq!(share.revenue_pct, dec!(50));
        assert_eq!(share.volume_pct.round_dp(2), dec!(45.83));
    }

    #[test]
    fn test_promotion_share_of_empty_dataset() {
        let share = promotion_share(&SalesDataset::default()).unwrap();
        assert_eq!(share.rows_pct, Decimal::ZERO);
    }

    #[test]
    fn test_max_promotion_lift() {
        // P1: 80 - 120, P2: 30 - 10
        assert_eq!(
            max_promotion_lift(&fixtures::dataset()).unwrap(),
            Some(("P2".to_string(), dec!(20)))
        );
    }
}
