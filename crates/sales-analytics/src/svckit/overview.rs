//! Whole-table tools: mean price and the executive report

use std::fmt::Write;
use std::path::Path;

use agent_core::ToolError;
use rust_decimal_macros::dec;

use super::{NO_DATA, ToolArgs, top_n};
use crate::SalesDataset;
use crate::format::{fixed, magnitude, pairs, percent};
use crate::metrics::{overview, planning, promotion, ranking, service};
use crate::pdf;

const REPORT_TITLE: &str = "RELATÓRIO EXECUTIVO DE VENDAS";

/// Where `gerar_relatorio_pdf` writes when no `output_path` is given
pub const DEFAULT_PDF_PATH: &str = "reports/relatorio_executivo.pdf";

pub fn mean_price(dataset: &SalesDataset) -> Result<String, ToolError> {
    Ok(overview::mean_price(dataset)?.map_or_else(
        || NO_DATA.into(),
        |price| format!("preco_medio_geral: {}", fixed(price)),
    ))
}

/// Plain-text executive summary of the dataset
pub fn report(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let n = top_n(args, 5)?;
    if dataset.is_empty() {
        return Ok(NO_DATA.into());
    }
    executive_summary(dataset, n)
}

/// The executive summary written to a PDF file; the observation is the path
pub fn report_pdf(dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
    let n = top_n(args, 5)?;
    let path = Path::new(args.text("output_path").unwrap_or(DEFAULT_PDF_PATH));
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    {
        return Err(ToolError::InvalidInput(format!(
            "output_path must end in .pdf, got '{}'",
            path.display()
        )));
    }
    if dataset.is_empty() {
        return Ok(NO_DATA.into());
    }

    let text = executive_summary(dataset, n)?;
    pdf::write_report(REPORT_TITLE, &text, path)?;
    tracing::info!(path = %path.display(), "Executive report written");

    Ok(pairs([("relatorio_pdf", path.display().to_string())]))
}

fn executive_summary(dataset: &SalesDataset, n: usize) -> Result<String, ToolError> {
    let summary = overview::overview(dataset)?;
    let gap = planning::planning_gap(dataset)?;
    let share = promotion::promotion_share(dataset)?;
    let degraded = service::service_degradation(dataset, dec!(0.95)).len();

    let mut out = format!("{REPORT_TITLE}\n");
    let w = &mut out;

    if let Some((first, last)) = summary.period {
        let _ = writeln!(w, "Período: {} a {}", first.format("%d/%m/%Y"), last.format("%d/%m/%Y"));
    }
    let _ = writeln!(
        w,
        "Registros: {} | Produtos: {} | Locais: {}",
        summary.rows, summary.products, summary.locations
    );
    let _ = writeln!(
        w,
        "Volume total: {} | Receita total: {} | Preço médio: {}",
        magnitude(summary.total_volume),
        magnitude(summary.total_revenue),
        summary.mean_price.map_or_else(|| "n/a".into(), fixed),
    );

    let _ = writeln!(w, "\nTop {n} produtos por volume:");
    for (i, (product, volume)) in ranking::top_products_by_volume(dataset, n)?.into_iter().enumerate() {
        let _ = writeln!(w, "  {}. {product}: {}", i + 1, magnitude(volume));
    }

    let _ = writeln!(w, "\nTop {n} locais por receita:");
    for (i, (local, revenue)) in ranking::revenue_by_location(dataset)?.into_iter().take(n).enumerate() {
        let _ = writeln!(w, "  {}. {local}: {}", i + 1, magnitude(revenue));
    }

    let _ = writeln!(w, "\nPlanejamento:");
    let _ = writeln!(w, "  Gap total (realizado - planejado): {}", magnitude(gap.total_gap));
    let _ = writeln!(w, "  MAPE médio: {}", percent(gap.mape));
    let _ = writeln!(w, "  Tendência: {}", gap.tendency);

    let _ = writeln!(w, "\nPromoções:");
    let _ = writeln!(
        w,
        "  Linhas: {} | Volume: {} | Receita: {}",
        percent(share.rows_pct),
        percent(share.volume_pct),
        percent(share.revenue_pct)
    );

    let _ = writeln!(w, "\nNível de serviço:");
    let _ = writeln!(
        w,
        "  Média geral: {}",
        summary.mean_service_level.map_or_else(|| "n/a".into(), fixed)
    );
    let _ = writeln!(w, "  Transações abaixo de 0.95: {degraded}");

    Ok(out.trim_end().to_string())
}
