//! Time-based tools

use agent_core::ToolError;

use super::{NO_DATA, ToolArgs};
use crate::SalesDataset;
use crate::format::{fixed, magnitude, pairs, plain};
use crate::metrics::period as metrics;

pub fn sales_in_period(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let start = args.date("start_date")?;
    let end = args.date("end_date")?;
    let total = metrics::total_volume_in_period(dataset, start, end)?;

    Ok(pairs([
        ("periodo", format!("{start} a {end}")),
        ("total_vendas", plain(total)),
        ("total_vendas_formatado", magnitude(total)),
    ]))
}

pub fn month_lowest_volume(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::month_lowest_volume(dataset)?.map_or_else(
        || NO_DATA.into(),
        |(month, volume)| pairs([("mes", month), ("volume", plain(volume))]),
    ))
}

pub fn mean_daily_volume(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::mean_daily_volume(dataset)?.map_or_else(
        || NO_DATA.into(),
        |mean| pairs([("media_volume_diario", fixed(mean))]),
    ))
}

pub fn peak_daily_product(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(metrics::peak_daily_product(dataset)?.map_or_else(
        || NO_DATA.into(),
        |peak| {
            pairs([
                ("product_id", peak.product_id),
                ("date", peak.date.to_string()),
                ("volume", plain(peak.volume)),
            ])
        },
    ))
}
