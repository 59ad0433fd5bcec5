//! Text Protocol Parser
//!
//! Turns one raw model completion into a [`Turn`]. The grammar is a handful
//! of line prefixes; parsing is a small state machine whose state is the
//! field currently being accumulated.
//!
//! ```text
//! Thought: <reasoning>
//! Action: <tool name | None>
//! Action Input: <text, may span lines>
//! Final Answer: <answer, may span lines>
//! ```

use thiserror::Error;

use crate::error::AgentError;
use crate::transcript::{Step, Turn};

pub const THOUGHT: &str = "Thought:";
pub const ACTION: &str = "Action:";
pub const ACTION_INPUT: &str = "Action Input:";
pub const FINAL_ANSWER: &str = "Final Answer:";

/// Not a field: the model starting to invent its own observation. Everything
/// from this prefix on is dropped.
pub const OBSERVATION: &str = "Observation:";

/// Reasons a completion cannot be turned into a turn
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("response has neither an Action nor a Final Answer")]
    MissingActionAndAnswer,

    #[error("Action requests no tool and no Final Answer was given")]
    NoToolRequested,
}

impl From<ParseError> for AgentError {
    fn from(err: ParseError) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Thought,
    Action,
    ActionInput,
    FinalAnswer,
}

enum Marker<'a> {
    Field(Field, &'a str),
    Stop,
}

const PREFIXES: [(&str, Field); 4] = [
    (ACTION_INPUT, Field::ActionInput),
    (ACTION, Field::Action),
    (FINAL_ANSWER, Field::FinalAnswer),
    (THOUGHT, Field::Thought),
];

fn classify(line: &str) -> Option<Marker<'_>> {
    let line = line.trim_start();
    if line.starts_with(OBSERVATION) {
        return Some(Marker::Stop);
    }
    PREFIXES.iter().find_map(|(prefix, field)| {
        line.strip_prefix(prefix)
            .map(|rest| Marker::Field(*field, rest))
    })
}

#[derive(Default, Debug)]
struct Fields {
    thought: Option<String>,
    action: Option<String>,
    action_input: Option<String>,
    final_answer: Option<String>,
}

impl Fields {
    fn commit(&mut self, pending: Option<(Field, String)>) {
        let Some((field, value)) = pending else {
            return;
        };
        let slot = match field {
            Field::Thought => &mut self.thought,
            Field::Action => &mut self.action,
            Field::ActionInput => &mut self.action_input,
            Field::FinalAnswer => &mut self.final_answer,
        };
        // first occurrence wins
        if slot.is_none() {
            *slot = Some(value.trim().to_string());
        }
    }
}

fn scan(raw: &str) -> Fields {
    let mut fields = Fields::default();
    let mut current: Option<(Field, String)> = None;

    for line in raw.lines() {
        match classify(line) {
            Some(Marker::Stop) => break,
            Some(Marker::Field(field, rest)) => {
                fields.commit(current.take());
                current = Some((field, rest.to_string()));
            }
            None => {
                if let Some((_, value)) = current.as_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }
    fields.commit(current);
    fields
}

fn clean_tool_name(action: &str) -> &str {
    action.trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c.is_whitespace())
}

/// Parse a raw model completion.
///
/// Never fails on odd formatting; the only failures are the two
/// [`ParseError`] cases.
pub fn parse(raw: &str) -> Result<Turn, ParseError> {
    let fields = scan(raw);
    let thought = fields.thought.filter(|t| !t.is_empty());

    if let Some(answer) = fields.final_answer {
        return Ok(Turn::new(thought, Step::Finish { answer }));
    }

    match fields.action.as_deref().map(clean_tool_name) {
        Some(tool) if !tool.is_empty() && !tool.eq_ignore_ascii_case("none") => Ok(Turn::new(
            thought,
            Step::Act {
                tool: tool.to_string(),
                input: fields.action_input.unwrap_or_default(),
            },
        )),
        Some(_) => Err(ParseError::NoToolRequested),
        None => Err(ParseError::MissingActionAndAnswer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        let turn = parse("Thought: preciso do ranking\nAction: produtos_mais_vendidos\nAction Input: 3")
            .unwrap();

        assert_eq!(turn.thought.as_deref(), Some("preciso do ranking"));
        assert_eq!(
            turn.step,
            Step::Act {
                tool: "produtos_mais_vendidos".into(),
                input: "3".into()
            }
        );
        assert!(turn.observation.is_none());
    }

    #[test]
    fn test_final_answer_wins_over_action() {
        let turn = parse("Thought: pronto\nAction: foo\nAction Input: 1\nFinal Answer: São 3 produtos.")
            .unwrap();
        assert_eq!(turn.final_answer(), Some("São 3 produtos."));
    }

    #[test]
    fn test_multiline_values() {
        let raw = "Action: top_entidades\nAction Input: {\n  \"top_n\": 3\n}\n";
        let turn = parse(raw).unwrap();
        assert_eq!(
            turn.step,
            Step::Act {
                tool: "top_entidades".into(),
                input: "{\n  \"top_n\": 3\n}".into()
            }
        );

        let turn = parse("Final Answer: linha 1\nlinha 2\n\nFerramentas utilizadas: x").unwrap();
        assert_eq!(
            turn.final_answer(),
            Some("linha 1\nlinha 2\n\nFerramentas utilizadas: x")
        );
    }

    #[test]
    fn test_none_action_is_malformed() {
        assert_eq!(
            parse("Thought: hmm\nAction: None\nAction Input:"),
            Err(ParseError::NoToolRequested)
        );
        assert_eq!(parse("Action: NONE"), Err(ParseError::NoToolRequested));
        assert_eq!(parse("Action:   \nAction Input: x"), Err(ParseError::NoToolRequested));
    }

    #[test]
    fn test_none_action_with_final_answer_is_terminal() {
        let turn = parse("Action: None\nAction Input:\nFinal Answer: ok").unwrap();
        assert!(turn.is_final());
    }

    #[test]
    fn test_missing_fields_is_malformed() {
        assert_eq!(parse(""), Err(ParseError::MissingActionAndAnswer));
        assert_eq!(
            parse("Olá! Posso ajudar com vendas."),
            Err(ParseError::MissingActionAndAnswer)
        );
        assert_eq!(parse("Thought: só pensando"), Err(ParseError::MissingActionAndAnswer));
    }

    #[test]
    fn test_prefixes_are_case_sensitive() {
        assert_eq!(
            parse("action: foo\nfinal answer: bar"),
            Err(ParseError::MissingActionAndAnswer)
        );
    }

    #[test]
    fn test_hallucinated_observation_is_dropped() {
        let raw = "Action: preco_medio_geral\nAction Input:\nObservation: 12.0\nFinal Answer: 12.0";
        let turn = parse(raw).unwrap();
        assert_eq!(
            turn.step,
            Step::Act {
                tool: "preco_medio_geral".into(),
                input: String::new()
            }
        );
    }

    #[test]
    fn test_preamble_ignored_and_first_field_wins() {
        let raw = "Claro!\nThought: a\nAction: `gap_planejamento`\nAction Input: \nThought: b\nAction: outro";
        let turn = parse(raw).unwrap();
        assert_eq!(turn.thought.as_deref(), Some("a"));
        assert_eq!(
            turn.step,
            Step::Act {
                tool: "gap_planejamento".into(),
                input: String::new()
            }
        );
    }

    #[test]
    fn test_missing_thought_tolerated() {
        let turn = parse("Final Answer: 10").unwrap();
        assert!(turn.thought.is_none());
    }

    #[test]
    fn test_rendered_turns_reparse() {
        let turns = [
            Turn::act("produtos_mais_vendidos", "3").with_thought("ranking"),
            Turn::act("vendas_por_periodo", "start_date=2024-01-01, end_date=2024-01-31"),
            Turn::act("gap_planejamento", ""),
            Turn::finish("Resposta\ncom duas linhas").with_thought("fim"),
        ];
        for turn in turns {
            assert_eq!(parse(&turn.render_response()).unwrap(), turn);
        }
    }

    #[test]
    fn test_parse_error_maps_to_agent_error() {
        let err: AgentError = ParseError::NoToolRequested.into();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }
}
