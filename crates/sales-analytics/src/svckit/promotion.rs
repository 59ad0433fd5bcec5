//! Promotion tools

use agent_core::ToolError;

use super::{NO_DATA, shown_of};
use crate::SalesDataset;
use crate::format::{fixed, pairs, percent, table};
use crate::metrics::promotion as metrics;

const IMPACT_ROWS: usize = 50;

pub fn impact_by_product(dataset: &SalesDataset) -> Result<String, ToolError> {
    let impact = metrics::impact_by_product(dataset)?;
    if impact.is_empty() {
        return Ok("Sem dados para analisar impacto de promoção por produto.".into());
    }

    let body = table(
        &["product_id", "promotion_type", "actual_quantity", "actual_price", "service_level"],
        impact.iter().take(IMPACT_ROWS).map(|i| {
            vec![
                i.product_id.clone(),
                i.promotion_type.clone(),
                fixed(i.stats.mean_volume),
                fixed(i.stats.mean_price),
                fixed(i.stats.mean_service_level),
            ]
        }),
    );
    Ok(body + &shown_of(impact.len().min(IMPACT_ROWS), impact.len()))
}

pub fn impact_by_type(dataset: &SalesDataset) -> Result<String, ToolError> {
    let impact = metrics::impact_by_type(dataset)?;
    if impact.is_empty() {
        return Ok(NO_DATA.into());
    }

    Ok(table(
        &["promotion_type", "linhas", "media_volume", "preco_medio", "nivel_servico_medio"],
        impact.into_iter().map(|(label, stats)| {
            vec![
                label,
                stats.rows.to_string(),
                fixed(stats.mean_volume),
                fixed(stats.mean_price),
                fixed(stats.mean_service_level),
            ]
        }),
    ))
}

pub fn share(dataset: &SalesDataset) -> Result<String, ToolError> {
    if dataset.is_empty() {
        return Ok(NO_DATA.into());
    }
    let share = metrics::promotion_share(dataset)?;

    Ok(pairs([
        ("share_linhas_com_promocao", percent(share.rows_pct)),
        ("share_volume_com_promocao", percent(share.volume_pct)),
        ("share_receita_com_promocao", percent(share.revenue_pct)),
    ]))
}

pub fn max_lift(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::max_promotion_lift(dataset)?.map_or_else(
        || "Nenhum produto vendido com e sem promoção para comparar.".into(),
        |(product, lift)| {
            pairs([
                ("product_id", product),
                ("delta_volume_medio_com_promocao", fixed(lift)),
            ])
        },
    ))
}
