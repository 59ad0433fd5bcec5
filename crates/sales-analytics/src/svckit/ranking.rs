//! Ranking tools

use agent_core::ToolError;

use super::{NO_DATA, ToolArgs, shown_of, top_n};
use crate::SalesDataset;
use crate::format::{fixed, magnitude, pairs, percent, plain, table};
use crate::metrics::ranking as metrics;
use crate::model::{Dimension, Metric};

const RANKING_ROWS: usize = 20;

pub fn top_products(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let n = top_n(args, 10)?;
    let top = metrics::top_products_by_volume(dataset, n)?;
    if top.is_empty() {
        return Ok(NO_DATA.into());
    }

    Ok(table(
        &["product_id", "actual_quantity"],
        top.into_iter().map(|(product, volume)| vec![product, plain(volume)]),
    ))
}

pub fn revenue_by_location(dataset: &SalesDataset) -> Result<String, ToolError> {
    let ranking = metrics::revenue_by_location(dataset)?;
    if ranking.is_empty() {
        return Ok(NO_DATA.into());
    }

    let total = ranking.len();
    let body = table(
        &["local", "receita_real"],
        ranking
            .into_iter()
            .take(RANKING_ROWS)
            .map(|(local, revenue)| vec![local, fixed(revenue)]),
    );
    Ok(body + &shown_of(total.min(RANKING_ROWS), total))
}

pub fn top_entities(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let group_by = args.parsed("group_by_col", Dimension::Product)?;
    let metric = args.parsed("metric", Metric::ActualQuantity)?;
    let n = top_n(args, 5)?;

    let top = metrics::top_entities(dataset, group_by, metric, n)?;
    if top.is_empty() {
        return Ok(NO_DATA.into());
    }

    let group_header = group_by.to_string();
    let metric_header = metric.to_string();
    Ok(table(
        &[group_header.as_str(), metric_header.as_str()],
        top.into_iter().map(|(key, value)| vec![key, plain(value)]),
    ))
}

pub fn product_max_revenue(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::product_max_revenue(dataset)?.map_or_else(
        || NO_DATA.into(),
        |(product, revenue)| {
            pairs([
                ("product_id", product),
                ("receita_total", fixed(revenue)),
                ("receita_total_formatada", magnitude(revenue)),
            ])
        },
    ))
}

pub fn revenue_share_by_location(dataset: &SalesDataset) -> Result<String, ToolError> {
    let shares = metrics::revenue_share_by_location(dataset)?;
    if shares.is_empty() {
        return Ok(NO_DATA.into());
    }

    Ok(table(
        &["local", "receita", "share_receita"],
        shares
            .into_iter()
            .map(|s| vec![s.local, fixed(s.revenue), percent(s.share_pct)]),
    ))
}

pub fn top_volume_highest_price(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::top_volume_highest_mean_price(dataset, 5)?.map_or_else(
        || NO_DATA.into(),
        |(product, price)| pairs([("product_id", product), ("preco_medio", fixed(price))]),
    ))
}

pub fn top_volume_lowest_unit_revenue(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::top_volume_lowest_unit_revenue(dataset, 10)?.map_or_else(
        || NO_DATA.into(),
        |(product, unit)| {
            pairs([
                ("product_id", product),
                ("receita_por_unidade", fixed(unit)),
            ])
        },
    ))
}

pub fn revenue_without_top_product(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::revenue_without_top_product(dataset)?.map_or_else(
        || NO_DATA.into(),
        |c| {
            pairs([
                ("produto_removido", c.product_id),
                ("receita_do_produto", fixed(c.product_revenue)),
                ("receita_restante", fixed(c.remaining_revenue)),
                ("queda_percentual", percent(c.share_pct)),
            ])
        },
    ))
}
