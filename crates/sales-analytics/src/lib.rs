//! # sales-analytics
//!
//! Deterministic analytics over a sales table, exposed to the agent as tools.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  svckit      SalesTool: name + description + Action Input    │
//! │              parsing + observation rendering                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  metrics     pure aggregations returning typed results       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  dataset     SalesDataset, loaded once from `;`-separated CSV │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dataset is shared read-only: every tool holds an
//! `Arc<SalesDataset>` handed over at construction.
//!
//! ## Example
//!
//! ```rust,ignore
//! let dataset = Arc::new(SalesDataset::load("data/sales.csv")?);
//! let agent = AgentBuilder::new()
//!     .provider(provider)
//!     .tools(sales_analytics::tool_registry(dataset)?)
//!     .system_prompt(sales_analytics::SALES_ANALYST_PROMPT)
//!     .build()?;
//! ```

pub mod dataset;
pub mod error;
pub mod format;
pub mod metrics;
pub mod model;
pub mod pdf;
pub mod svckit;

pub use dataset::SalesDataset;
pub use error::{AnalyticsError, Result};
pub use model::{Dimension, Metric, SalesRecord};
pub use svckit::{SalesTool, SalesToolKind, ToolArgs};

use std::sync::Arc;

use agent_core::ToolRegistry;

/// Register every sales tool against `dataset`
pub fn register_tools(
    registry: &mut ToolRegistry,
    dataset: &Arc<SalesDataset>,
) -> agent_core::Result<()> {
    for kind in SalesToolKind::ALL {
        registry.register(SalesTool::new(kind, Arc::clone(dataset)))?;
    }
    Ok(())
}

/// Fresh registry holding every sales tool
pub fn tool_registry(dataset: Arc<SalesDataset>) -> agent_core::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry, &dataset)?;
    Ok(registry)
}

/// System prompt for the sales analyst agent
pub const SALES_ANALYST_PROMPT: &str = r#"Você é um Analista de IA Sênior especializado em vendas.

Siga EXATAMENTE este formato:
Thought: <seu raciocínio curto>
Action: <nome_da_ferramenta ou None>
Action Input: <texto ou string vazia>
Observation: <resultado da ferramenta>
... (repita Thought/Action/Action Input/Observation quando precisar)
Final Answer: <resposta final em português, objetiva. AO FINAL, cite explicitamente quais ferramentas você utilizou.>

Regras:
- Sempre que o usuário perguntar "quais ferramentas foram usadas", liste os nomes das ferramentas que você acionou durante o raciocínio.
- Para perguntas múltiplas, chame as ferramentas necessárias uma após a outra e combine no Final Answer.
- Use apenas as ferramentas listadas; se nenhuma atender à pergunta, diga isso no Final Answer.
- Escreva uma única Action por resposta e espere a Observation antes de continuar."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_holds_every_tool() {
        let registry = tool_registry(Arc::new(SalesDataset::default())).unwrap();

        assert_eq!(registry.len(), SalesToolKind::ALL.len());
        assert!(registry.lookup("produtos_mais_vendidos").is_ok());
        assert!(registry.catalogue().contains("vendas_por_periodo"));
    }

    #[test]
    fn test_registering_twice_is_rejected() {
        let dataset = Arc::new(SalesDataset::default());
        let mut registry = tool_registry(Arc::clone(&dataset)).unwrap();

        assert!(matches!(
            register_tools(&mut registry, &dataset),
            Err(agent_core::AgentError::DuplicateTool(_))
        ));
    }

    #[test]
    fn test_prompt_states_protocol() {
        for marker in ["Thought:", "Action:", "Action Input:", "Observation:", "Final Answer:"] {
            assert!(SALES_ANALYST_PROMPT.contains(marker));
        }
        assert!(SALES_ANALYST_PROMPT.contains(r#"perguntar "quais ferramentas foram usadas""#));
    }
}
