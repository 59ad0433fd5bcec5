//! Planning accuracy tools

use agent_core::ToolError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{NO_DATA, ToolArgs, shown_of};
use crate::SalesDataset;
use crate::format::{fixed, pairs, percent, plain, table};
use crate::metrics::planning as metrics;

const ACCURACY_ROWS: usize = 20;
const ALERT_ROWS: usize = 50;

/// Largest accepted `threshold`, as a fraction of the plan
const MAX_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

pub fn accuracy(dataset: &SalesDataset) -> Result<String, ToolError> {
    let rows = metrics::planning_accuracy(dataset)?;
    if rows.is_empty() {
        return Ok(NO_DATA.into());
    }

    let body = table(
        &["product_id", "date", "planned_quantity", "actual_quantity", "pct_desvio"],
        rows.iter().take(ACCURACY_ROWS).map(|r| {
            vec![
                r.product_id.to_string(),
                r.date.to_string(),
                plain(r.planned_quantity),
                plain(r.actual_quantity),
                r.pct_deviation.map_or_else(|| "n/a".into(), fixed),
            ]
        }),
    );
    Ok(body + &shown_of(rows.len().min(ACCURACY_ROWS), rows.len()))
}

pub fn rupture_or_excess(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let threshold = args.decimal("threshold", dec!(0.2))?;
    if threshold.is_sign_negative() || threshold > MAX_THRESHOLD {
        return Err(ToolError::InvalidInput(format!(
            "threshold must be between 0 and {MAX_THRESHOLD}"
        )));
    }

    let alerts = metrics::rupture_or_excess(dataset, threshold)?;
    if alerts.is_empty() {
        return Ok(format!("Nenhum alerta encontrado com threshold={}.", fixed(threshold)));
    }

    let rows = alerts
        .iter()
        .take(ALERT_ROWS)
        .map(|r| {
            Ok(vec![
                r.date.to_string(),
                r.product_id.clone(),
                r.local.clone(),
                plain(r.planned_quantity),
                plain(r.actual_quantity),
                r.plan_ratio()?.map_or_else(|| "inf".into(), fixed),
            ])
        })
        .collect::<crate::Result<Vec<_>>>()?;
    let body = table(
        &[
            "date",
            "product_id",
            "local",
            "planned_quantity",
            "actual_quantity",
            "razao_real_plan",
        ],
        rows,
    );
    Ok(body + &shown_of(alerts.len().min(ALERT_ROWS), alerts.len()))
}

pub fn gap(dataset: &SalesDataset) -> Result<String, ToolError> {
    if dataset.is_empty() {
        return Ok(NO_DATA.into());
    }
    let gap = metrics::planning_gap(dataset)?;

    Ok(pairs([
        ("gap_total", plain(gap.total_gap)),
        ("mape_medio", percent(gap.mape)),
        ("tendencia", gap.tendency.to_string()),
    ]))
}

pub fn product_max_deviation(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::product_max_abs_deviation(dataset)?.map_or_else(
        || NO_DATA.into(),
        |(product, deviation)| {
            pairs([
                ("product_id", product),
                ("desvio_absoluto_total", plain(deviation)),
            ])
        },
    ))
}

pub fn location_max_deviation(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::location_max_pct_deviation(dataset)?.map_or_else(
        || NO_DATA.into(),
        |(local, deviation)| {
            pairs([
                ("local", local),
                ("desvio_percentual_medio", percent(deviation)),
            ])
        },
    ))
}
