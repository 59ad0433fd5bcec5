//! Interactive console
//!
//! Reads one question per line and answers it through the session, so
//! follow-up questions see the earlier turns. Ctrl-C while a question runs
//! cancels it; Ctrl-C at the prompt leaves.

use std::io::{self, Write};

use agent_core::{CancellationToken, Session};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of operator input
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    Help,
    Tools,
    History,
    Ask(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Command::Empty,
        "sair" | "exit" | "quit" => Command::Exit,
        "/ajuda" | "/help" => Command::Help,
        "/ferramentas" => Command::Tools,
        "/historico" | "/histórico" => Command::History,
        _ => Command::Ask(line),
    }
}

const HELP: &str = "Comandos: /ferramentas, /historico, /ajuda, sair\n\
                    Ctrl-C cancela a pergunta em andamento.";

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    session: Session,
}

impl Repl {
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        println!("{HELP}\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = io::stdout();

        loop {
            print!("Você: ");
            stdout.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    None
                }
            };

            // EOF (Ctrl-D) or Ctrl-C
            let Some(line) = line else {
                println!("Até logo!");
                break;
            };

            match parse_command(&line) {
                Command::Empty => {}
                Command::Exit => {
                    println!("Até logo!");
                    break;
                }
                Command::Help => println!("{HELP}\n"),
                Command::Tools => println!("{}", self.session.agent().tools().catalogue()),
                Command::History => {
                    let transcript = self.session.transcript().await;
                    if transcript.is_empty() {
                        println!("(histórico vazio)\n");
                    } else {
                        println!("{}\n", transcript.render());
                    }
                }
                Command::Ask(question) => self.ask(question).await,
            }
        }

        Ok(())
    }

    /// Answer one question, printing the answer or a user-facing error
    pub async fn ask(&self, question: &str) {
        let cancel = CancellationToken::new();
        let run = self.session.ask_with_cancel(question, &cancel);
        tokio::pin!(run);

        let outcome = tokio::select! {
            outcome = &mut run => outcome,
            _ = tokio::signal::ctrl_c() => {
                println!("\n(cancelando...)");
                cancel.cancel();
                run.await
            }
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    tools = ?result.tools_invoked,
                    iterations = result.iterations,
                    "Question answered"
                );
                println!("\nAgente: {}\n", result.final_answer);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Question failed");
                println!("\n{}\n", err.user_message());
            }
        }
    }
}
