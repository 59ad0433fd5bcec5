//! Service level tools

use agent_core::ToolError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ToolArgs, shown_of};
use crate::SalesDataset;
use crate::format::{fixed, plain, table};
use crate::metrics::service as metrics;

const DEGRADATION_ROWS: usize = 50;

fn level(args: &ToolArgs, key: &str, default: Decimal) -> Result<Decimal, ToolError> {
    let value = args.decimal(key, default)?;
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ToolError::InvalidInput(format!(
            "{key} must be between 0 and 1, got {value}"
        )));
    }
    Ok(value)
}

pub fn degradation(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let min = level(args, "min_service_level", dec!(0.95))?;

    let rows = metrics::service_degradation(dataset, min);
    if rows.is_empty() {
        return Ok(format!(
            "Nenhuma transação abaixo de min_service_level={}.",
            fixed(min)
        ));
    }

    let body = table(
        &["date", "product_id", "local", "actual_quantity", "promotion_type", "service_level"],
        rows.iter().take(DEGRADATION_ROWS).map(|r| {
            vec![
                r.date.to_string(),
                r.product_id.clone(),
                r.local.clone(),
                plain(r.actual_quantity),
                r.promotion_label().to_string(),
                plain(r.service_level),
            ]
        }),
    );
    Ok(body + &shown_of(rows.len().min(DEGRADATION_ROWS), rows.len()))
}

pub fn risk(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let threshold = level(args, "threshold", dec!(0.85))?;

    let risks = metrics::service_risk(dataset, threshold)?;
    if risks.is_empty() {
        return Ok(format!(
            "Nenhuma combinação local+produto abaixo de threshold={}.",
            fixed(threshold)
        ));
    }

    Ok(table(
        &["local", "product_id", "nivel_servico_medio"],
        risks
            .into_iter()
            .map(|r| vec![r.local, r.product_id, fixed(r.mean_service_level)]),
    ))
}
