//! Planning accuracy: how far actual sales landed from the plan

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{add, mean, sub, sum_by, try_total};
use crate::SalesDataset;
use crate::error::Result;
use crate::model::SalesRecord;

/// Per-row deviation from the plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanningAccuracy<'a> {
    pub product_id: &'a str,
    pub date: NaiveDate,
    pub planned_quantity: Decimal,
    pub actual_quantity: Decimal,
    /// `None` when nothing was planned
    pub pct_deviation: Option<Decimal>,
}

pub fn planning_accuracy(dataset: &SalesDataset) -> Result<Vec<PlanningAccuracy<'_>>> {
    dataset
        .iter()
        .map(|r| {
            Ok(PlanningAccuracy {
                product_id: &r.product_id,
                date: r.date,
                planned_quantity: r.planned_quantity,
                actual_quantity: r.actual_quantity,
                pct_deviation: r.pct_deviation()?,
            })
        })
        .collect()
}

/// Rows whose `actual / planned` ratio falls outside `1 ± threshold`.
///
/// A row with nothing planned but something sold counts as an alert; a row
/// with neither is skipped.
pub fn rupture_or_excess(dataset: &SalesDataset, threshold: Decimal) -> Result<Vec<&SalesRecord>> {
    let low = sub(Decimal::ONE, threshold)?;
    let high = add(Decimal::ONE, threshold)?;

    let mut alerts = Vec::new();
    for record in dataset {
        let alert = match record.plan_ratio()? {
            Some(ratio) => ratio < low || ratio > high,
            None => !record.actual_quantity.is_zero(),
        };
        if alert {
            alerts.push(record);
        }
    }
    Ok(alerts)
}

/// Direction of the aggregate planning error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Tendency {
    /// Sold more than planned
    Underestimated,
    /// Sold less than (or exactly) what was planned
    Overestimated,
}

impl fmt::Display for Tendency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Underestimated => "Subestimado",
            Self::Overestimated => "Superestimado",
        })
    }
}

/// Aggregate gap between plan and actuals
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanningGap {
    /// Sum of `actual - planned`
    pub total_gap: Decimal,
    /// Mean absolute percentage error, in percent; rows with no plan count as 0
    pub mape: Decimal,
    pub tendency: Tendency,
}

pub fn planning_gap(dataset: &SalesDataset) -> Result<PlanningGap> {
    let total_gap = try_total(dataset.iter().map(SalesRecord::gap))?;
    let errors = dataset
        .iter()
        .map(|r| Ok(r.pct_deviation()?.map_or(Decimal::ZERO, |pct| pct.abs())))
        .collect::<Result<Vec<_>>>()?;
    let mape = mean(errors)?.unwrap_or_default();

    Ok(PlanningGap {
        total_gap,
        mape,
        tendency: if total_gap > Decimal::ZERO {
            Tendency::Underestimated
        } else {
            Tendency::Overestimated
        },
    })
}

/// Product with the largest summed `|actual - planned|`
pub fn product_max_abs_deviation(dataset: &SalesDataset) -> Result<Option<(String, Decimal)>> {
    let deviations = sum_by(dataset, |r| r.product_id.as_str(), |r| r.gap().map(|g| g.abs()))?;

    Ok(deviations
        .into_iter()
        .fold(None, |best: Option<(&str, Decimal)>, (product, dev)| match best {
            Some((_, top)) if top >= dev => best,
            _ => Some((product, dev)),
        })
        .map(|(product, dev)| (product.to_string(), dev)))
}

/// Location with the largest mean absolute percentage deviation
pub fn location_max_pct_deviation(dataset: &SalesDataset) -> Result<Option<(String, Decimal)>> {
    let mut per_location: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
    for record in dataset {
        if let Some(pct) = record.pct_deviation()? {
            per_location.entry(record.local.as_str()).or_default().push(pct.abs());
        }
    }

    let mut best: Option<(&str, Decimal)> = None;
    for (local, values) in per_location {
        let Some(m) = mean(values)? else {
            continue;
        };
        if best.is_none_or(|(_, top)| m > top) {
            best = Some((local, m));
        }
    }
    Ok(best.map(|(local, m)| (local.to_string(), m)))
}
