//! Service Kit - Agent Tools
//!
//! Every analytics query exposed to the model as an `agent_core::Tool`. A
//! [`SalesTool`] pairs one [`SalesToolKind`] with the shared dataset; the kind
//! decides the name, the description, the accepted arguments and how the
//! result is rendered.

mod input;
mod overview;
mod period;
mod planning;
mod promotion;
mod ranking;
mod service;

pub use input::ToolArgs;

use std::sync::Arc;

use agent_core::{Tool, ToolError};

use crate::SalesDataset;

/// Observation for an empty result set
pub(crate) const NO_DATA: &str = "Sem dados para esta consulta.";

/// The analytics queries the agent can run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SalesToolKind {
    PlanningAccuracy,
    RuptureOrExcess,
    PromotionImpactByProduct,
    RevenueByLocation,
    TopProducts,
    ServiceDegradation,
    TopEntities,
    SalesInPeriod,
    PlanningGap,
    PromotionShare,
    MeanPrice,
    ProductMaxRevenue,
    PromotionImpact,
    ServiceRisk,
    ExecutiveReport,
    ProductMaxDeviation,
    LocationMaxDeviation,
    TopVolumeHighestPrice,
    MonthLowestVolume,
    TopVolumeLowestUnitRevenue,
    MeanDailyVolume,
    MaxPromotionLift,
    RevenueShareByLocation,
    PeakDailyProduct,
    RevenueWithoutTopProduct,
    ExecutiveReportPdf,
}

impl SalesToolKind {
    /// Registration order
    pub const ALL: [Self; 26] = [
        Self::PlanningAccuracy,
        Self::RuptureOrExcess,
        Self::PromotionImpactByProduct,
        Self::RevenueByLocation,
        Self::TopProducts,
        Self::ServiceDegradation,
        Self::TopEntities,
        Self::SalesInPeriod,
        Self::PlanningGap,
        Self::PromotionShare,
        Self::MeanPrice,
        Self::ProductMaxRevenue,
        Self::PromotionImpact,
        Self::ServiceRisk,
        Self::ExecutiveReport,
        Self::ProductMaxDeviation,
        Self::LocationMaxDeviation,
        Self::TopVolumeHighestPrice,
        Self::MonthLowestVolume,
        Self::TopVolumeLowestUnitRevenue,
        Self::MeanDailyVolume,
        Self::MaxPromotionLift,
        Self::RevenueShareByLocation,
        Self::PeakDailyProduct,
        Self::RevenueWithoutTopProduct,
        Self::ExecutiveReportPdf,
    ];

    /// Name the model writes after `Action:`
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlanningAccuracy => "calcular_acuracia_planejamento",
            Self::RuptureOrExcess => "identificar_ruptura_ou_excesso",
            Self::PromotionImpactByProduct => "impacto_promocao_por_produto",
            Self::RevenueByLocation => "ranking_receita_por_local",
            Self::TopProducts => "produtos_mais_vendidos",
            Self::ServiceDegradation => "analisar_degradacao_servico",
            Self::TopEntities => "top_entidades",
            Self::SalesInPeriod => "vendas_por_periodo",
            Self::PlanningGap => "gap_planejamento",
            Self::PromotionShare => "promocao_share",
            Self::MeanPrice => "preco_medio_geral",
            Self::ProductMaxRevenue => "produto_maior_receita",
            Self::PromotionImpact => "impacto_promocao",
            Self::ServiceRisk => "risco_servico",
            Self::ExecutiveReport => "gerar_relatorio",
            Self::ProductMaxDeviation => "produto_maior_desvio_absoluto",
            Self::LocationMaxDeviation => "local_maior_desvio_percentual_medio",
            Self::TopVolumeHighestPrice => "top5_volume_maior_preco_medio",
            Self::MonthLowestVolume => "mes_menor_volume",
            Self::TopVolumeLowestUnitRevenue => "top10_volume_menor_receita_unitaria",
            Self::MeanDailyVolume => "media_volume_diario",
            Self::MaxPromotionLift => "maior_delta_promocao",
            Self::RevenueShareByLocation => "share_receita_por_local",
            Self::PeakDailyProduct => "pico_diario_produto",
            Self::RevenueWithoutTopProduct => "impacto_remover_top_receita",
            Self::ExecutiveReportPdf => "gerar_relatorio_pdf",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::PlanningAccuracy => {
                "Desvio percentual (pct_desvio) entre planned_quantity e actual_quantity por linha. Sem input."
            }
            Self::RuptureOrExcess => {
                "Linhas em que actual_quantity diverge de planned_quantity além de ±threshold (risco de ruptura ou excesso). Input: threshold (padrão 0.2)."
            }
            Self::PromotionImpactByProduct => {
                "Médias de volume, preço e nível de serviço por product_id e promotion_type. Sem input."
            }
            Self::RevenueByLocation => {
                "Ranking de receita real (actual_quantity * actual_price) por local. Sem input."
            }
            Self::TopProducts => {
                "Top N produtos por volume total vendido (actual_quantity). Input: top_n (padrão 10)."
            }
            Self::ServiceDegradation => {
                "Transações com service_level abaixo de um mínimo. Input: min_service_level (padrão 0.95)."
            }
            Self::TopEntities => {
                "Top N entidades pelo somatório de uma métrica. Input: group_by_col (product_id|local|promotion_type, padrão product_id), metric (actual_quantity|planned_quantity|actual_price|receita|service_level, padrão actual_quantity), top_n (padrão 5)."
            }
            Self::SalesInPeriod => {
                "Total de vendas (actual_quantity) em um período, datas inclusivas. Input: start_date, end_date (YYYY-MM-DD)."
            }
            Self::PlanningGap => {
                "Diferença entre planejado e realizado: gap_total, mape_medio e tendência. Sem input."
            }
            Self::PromotionShare => {
                "Percentual das vendas com promoção (linhas, volume e receita). Sem input."
            }
            Self::MeanPrice => "Preço médio geral (actual_price). Sem input.",
            Self::ProductMaxRevenue => {
                "Produto com maior receita total (soma de actual_quantity * actual_price). Sem input."
            }
            Self::PromotionImpact => {
                "Compara médias de volume, preço e nível de serviço por promotion_type. Sem input."
            }
            Self::ServiceRisk => {
                "Combinações local+produto com nível de serviço médio crítico. Input: threshold (padrão 0.85)."
            }
            Self::ExecutiveReport => {
                "Relatório executivo em texto com os principais indicadores. Input: top_n (padrão 5)."
            }
            Self::ProductMaxDeviation => {
                "Produto com maior desvio absoluto acumulado entre planejado e realizado. Sem input."
            }
            Self::LocationMaxDeviation => {
                "Local com maior desvio percentual médio entre planejado e realizado. Sem input."
            }
            Self::TopVolumeHighestPrice => {
                "Entre os 5 produtos de maior volume, o de maior preço médio. Sem input."
            }
            Self::MonthLowestVolume => "Mês com menor volume vendido. Sem input.",
            Self::TopVolumeLowestUnitRevenue => {
                "Entre os 10 produtos de maior volume, o de menor receita por unidade. Sem input."
            }
            Self::MeanDailyVolume => "Volume médio vendido por dia. Sem input.",
            Self::MaxPromotionLift => {
                "Produto com maior aumento de volume médio com promoção versus sem promoção. Sem input."
            }
            Self::RevenueShareByLocation => {
                "Participação de cada local na receita total. Sem input."
            }
            Self::PeakDailyProduct => {
                "Maior volume diário de um único produto (produto e data). Sem input."
            }
            Self::RevenueWithoutTopProduct => {
                "Impacto na receita total se o produto de maior receita fosse removido. Sem input."
            }
            Self::ExecutiveReportPdf => {
                "Gera o relatório executivo e salva em PDF; retorna o caminho do arquivo. Input: top_n (padrão 5), output_path (padrão reports/relatorio_executivo.pdf)."
            }
        }
    }

    /// Parameter names, in the order positional values bind to them
    pub const fn params(self) -> &'static [&'static str] {
        match self {
            Self::RuptureOrExcess | Self::ServiceRisk => &["threshold"],
            Self::TopProducts | Self::ExecutiveReport => &["top_n"],
            Self::ServiceDegradation => &["min_service_level"],
            Self::TopEntities => &["group_by_col", "metric", "top_n"],
            Self::SalesInPeriod => &["start_date", "end_date"],
            Self::ExecutiveReportPdf => &["top_n", "output_path"],
            _ => &[],
        }
    }

    fn run(self, dataset: &SalesDataset, args: &ToolArgs) -> Result<String, ToolError> {
        match self {
            Self::PlanningAccuracy => planning::accuracy(dataset),
            Self::RuptureOrExcess => planning::rupture_or_excess(dataset, args),
            Self::PlanningGap => planning::gap(dataset),
            Self::ProductMaxDeviation => planning::product_max_deviation(dataset),
            Self::LocationMaxDeviation => planning::location_max_deviation(dataset),
            Self::PromotionImpactByProduct => promotion::impact_by_product(dataset),
            Self::PromotionImpact => promotion::impact_by_type(dataset),
            Self::PromotionShare => promotion::share(dataset),
            Self::MaxPromotionLift => promotion::max_lift(dataset),
            Self::RevenueByLocation => ranking::revenue_by_location(dataset),
            Self::TopProducts => ranking::top_products(dataset, args),
            Self::TopEntities => ranking::top_entities(dataset, args),
            Self::ProductMaxRevenue => ranking::product_max_revenue(dataset),
            Self::RevenueShareByLocation => ranking::revenue_share_by_location(dataset),
            Self::TopVolumeHighestPrice => ranking::top_volume_highest_price(dataset),
            Self::TopVolumeLowestUnitRevenue => ranking::top_volume_lowest_unit_revenue(dataset),
            Self::RevenueWithoutTopProduct => ranking::revenue_without_top_product(dataset),
            Self::ServiceDegradation => service::degradation(dataset, args),
            Self::ServiceRisk => service::risk(dataset, args),
            Self::SalesInPeriod => period::sales_in_period(dataset, args),
            Self::MonthLowestVolume => period::month_lowest_volume(dataset),
            Self::MeanDailyVolume => period::mean_daily_volume(dataset),
            Self::PeakDailyProduct => period::peak_daily_product(dataset),
            Self::MeanPrice => overview::mean_price(dataset),
            Self::ExecutiveReport => overview::report(dataset, args),
            Self::ExecutiveReportPdf => overview::report_pdf(dataset, args),
        }
    }
}

/// One analytics query bound to the dataset
pub struct SalesTool {
    kind: SalesToolKind,
    dataset: Arc<SalesDataset>,
}

impl SalesTool {
    pub const fn new(kind: SalesToolKind, dataset: Arc<SalesDataset>) -> Self {
        Self { kind, dataset }
    }

    pub const fn kind(&self) -> SalesToolKind {
        self.kind
    }
}

impl Tool for SalesTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let args = ToolArgs::parse(input, self.kind.params())?;
        self.kind.run(&self.dataset, &args)
    }
}

/// Footer noting how many rows a table left out
pub(crate) fn shown_of(shown: usize, total: usize) -> String {
    if shown < total {
        format!("\n({shown} de {total} linhas)")
    } else {
        String::new()
    }
}

/// `top_n` argument, at least 1
pub(crate) fn top_n(args: &ToolArgs, default: usize) -> Result<usize, ToolError> {
    match args.count("top_n", default)? {
        0 => Err(ToolError::InvalidInput("top_n must be at least 1".into())),
        n => Ok(n),
    }
}
