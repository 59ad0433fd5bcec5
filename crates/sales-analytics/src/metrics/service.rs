//! Service level health

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::mean;
use crate::SalesDataset;
use crate::error::Result;
use crate::model::SalesRecord;

/// Rows served below `min_service_level`
pub fn service_degradation(dataset: &SalesDataset, min_service_level: Decimal) -> Vec<&SalesRecord> {
    dataset
        .iter()
        .filter(|r| r.service_level < min_service_level)
        .collect()
}

/// A location/product pair running below the service threshold
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceRisk {
    pub local: String,
    pub product_id: String,
    /// Mean service level over the rows below the threshold
    pub mean_service_level: Decimal,
}

/// Pairs with rows below `threshold`, worst first
pub fn service_risk(dataset: &SalesDataset, threshold: Decimal) -> Result<Vec<ServiceRisk>> {
    let mut groups: BTreeMap<(&str, &str), Vec<Decimal>> = BTreeMap::new();
    for record in service_degradation(dataset, threshold) {
        groups
            .entry((record.local.as_str(), record.product_id.as_str()))
            .or_default()
            .push(record.service_level);
    }

    let mut risks = Vec::with_capacity(groups.len());
    for ((local, product), levels) in groups {
        if let Some(m) = mean(levels)? {
            risks.push(ServiceRisk {
                local: local.to_string(),
                product_id: product.to_string(),
                mean_service_level: m,
            });
        }
    }
    risks.sort_by(|a, b| a.mean_service_level.cmp(&b.mean_service_level));
    Ok(risks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_degradation() {
        let ds = fixtures::dataset();

        assert_eq!(service_degradation(&ds, dec!(0.95)).len(), 2);
        assert!(service_degradation(&ds, dec!(0.5)).is_empty());
    }

    #[test]
    fn test_risk_is_sorted_worst_first() {
        let ds = fixtures::dataset();
        let risks = service_risk(&ds, dec!(0.95)).unwrap();

        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0].product_id, "P2");
        assert_eq!(risks[0].mean_service_level, dec!(0.80));
        assert_eq!(risks[1].mean_service_level, dec!(0.90));
    }

    #[test]
    fn test_default_threshold_excludes_borderline() {
        // only 0.80 is below 0.85
        assert_eq!(service_risk(&fixtures::dataset(), dec!(0.85)).unwrap().len(), 1);
    }
}
