//! Sales tools driven through the registry against the fixture dataset.

use std::path::PathBuf;
use std::sync::Arc;

use agent_core::{AgentBuilder, RetryPolicy, ScriptedProvider, ToolError, ToolRegistry};
use sales_analytics::{SALES_ANALYST_PROMPT, SalesDataset, tool_registry};

fn fixture() -> Arc<SalesDataset> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sales.csv");
    Arc::new(SalesDataset::load(path).unwrap())
}

fn registry() -> ToolRegistry {
    tool_registry(fixture()).unwrap()
}

fn call(registry: &ToolRegistry, tool: &str, input: &str) -> Result<String, ToolError> {
    registry.lookup(tool).unwrap().invoke(input)
}

#[test]
fn fixture_loads_day_first_rows_with_comma_decimals() {
    let dataset = fixture();
    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.records()[0].actual_price.to_string(), "12.50");
}

#[test]
fn top_products_honours_top_n() {
    let out = call(&registry(), "produtos_mais_vendidos", "2").unwrap();

    let a = out.find("SKU-A").unwrap();
    let c = out.find("SKU-C").unwrap();
    assert!(a < c);
    assert!(!out.contains("SKU-B"));
    assert!(out.contains("225"));
}

#[test]
fn sales_in_period_accepts_json_and_positional_input() {
    let registry = registry();

    let json = call(
        &registry,
        "vendas_por_periodo",
        r#"{"start_date": "2024-03-01", "end_date": "2024-03-31"}"#,
    )
    .unwrap();
    assert!(json.contains("total_vendas: 326"));

    let positional = call(&registry, "vendas_por_periodo", "2024-03-01, 2024-03-31").unwrap();
    assert_eq!(json, positional);
}

#[test]
fn reversed_period_is_invalid_input() {
    let err = call(&registry(), "vendas_por_periodo", "2024-04-30, 2024-03-01").unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput(_)));
}

#[test]
fn missing_dates_are_invalid_input() {
    let err = call(&registry(), "vendas_por_periodo", "").unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("start_date")));
}

#[test]
fn top_entities_by_location_revenue() {
    let out = call(&registry(), "top_entidades", "group_by_col=local, metric=receita, top_n=1").unwrap();

    assert!(out.contains("Loja Norte"));
    assert!(out.contains("3167.5"));
    assert!(!out.contains("Loja Centro"));
}

#[test]
fn top_entities_rejects_unknown_column() {
    let err = call(&registry(), "top_entidades", "group_by_col=cor").unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("cor")));
}

#[test]
fn service_risk_lists_critical_pairs() {
    let out = call(&registry(), "risco_servico", "").unwrap();

    assert!(out.contains("Loja Centro"));
    assert!(out.contains("SKU-B"));
    assert!(out.contains("0.80"));
    assert!(!out.contains("SKU-A"));
}

#[test]
fn no_alerts_message_names_threshold() {
    let out = call(&registry(), "identificar_ruptura_ou_excesso", "threshold=5").unwrap();
    assert_eq!(out, "Nenhum alerta encontrado com threshold=5.00.");
}

#[test]
fn single_answer_tools() {
    let registry = registry();

    assert!(call(&registry, "produto_maior_receita", "")
        .unwrap()
        .contains("product_id: SKU-A"));
    assert!(call(&registry, "mes_menor_volume", "")
        .unwrap()
        .contains("mes: 2024-04"));
    assert!(call(&registry, "gerar_relatorio", "top_n=3")
        .unwrap()
        .contains("Período: 01/03/2024 a 16/04/2024"));
}

#[test]
fn pdf_report_lands_at_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("executivo.pdf");

    let out = call(
        &registry(),
        "gerar_relatorio_pdf",
        &format!("3, {}", path.display()),
    )
    .unwrap();

    assert!(out.ends_with(&path.display().to_string()));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn overflowing_csv_figures_are_execution_errors() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("enorme.csv");
    std::fs::write(
        &csv,
        "date;product_id;local;planned_quantity;actual_quantity;actual_price;promotion_type;service_level\n\
         01/03/2024;SKU-X;Loja Centro;1;1000000000000000;1000000000000000;;0.9\n",
    )
    .unwrap();
    let registry = tool_registry(Arc::new(SalesDataset::load(&csv).unwrap())).unwrap();

    for tool in ["produto_maior_receita", "ranking_receita_por_local", "gerar_relatorio"] {
        let err = call(&registry, tool, "").unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)), "{tool}: {err:?}");
    }
    // volume alone still fits
    assert!(call(&registry, "produtos_mais_vendidos", "")
        .unwrap()
        .contains("SKU-X"));
}

#[tokio::test]
async fn agent_answers_from_tool_observation() {
    let provider = Arc::new(ScriptedProvider::new([
        "Thought: preciso do ranking de volume\nAction: produtos_mais_vendidos\nAction Input: 1",
        "Thought: já sei\nFinal Answer: O produto mais vendido é o SKU-A. Ferramentas utilizadas: produtos_mais_vendidos",
    ]));
    let agent = AgentBuilder::new()
        .provider(provider.clone())
        .tools(registry())
        .system_prompt(SALES_ANALYST_PROMPT)
        .retry(RetryPolicy::none())
        .build()
        .unwrap();

    let result = agent.ask("Qual produto foi mais vendido?").await.unwrap();

    assert_eq!(result.tools_invoked, vec!["produtos_mais_vendidos"]);
    assert!(result.final_answer.contains("SKU-A"));

    let prompts = provider.prompts();
    assert!(prompts[0].starts_with("Você é um Analista de IA Sênior"));
    assert!(prompts[0].contains("- produtos_mais_vendidos:"));
    assert!(prompts[1].contains("Observation:"));
    assert!(prompts[1].contains("225"));
}
