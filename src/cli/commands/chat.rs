//! Interactive chat command.
//!
//! The session owns the chat history; the answering chain only borrows it,
//! and a turn is appended once its answer has been produced.

use crate::cli::commands::ask::chat_model;
use crate::cli::commands::build::build_index;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::knowledge_base::KnowledgeBase;
use crate::llm::ChatModel;
use crate::rag::{AnswerChain, ChainAnswer, ChatTurn};
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// Run the interactive chat command.
pub async fn run_chat(
    model: Option<String>,
    settings: Settings,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings, credentials) {
        Output::error(&e.to_string());
        Output::info("Run 'candlelight doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let chat_model = chat_model(&settings, credentials, model)?;
    let kb = KnowledgeBase::new(settings, credentials)?;
    let mut session = ChatSession::new(kb, chat_model);

    println!("\n{}", style("Candlelight Concert AI Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Ask about concerts, venues and tickets. Commands: history, build, clear, exit.").dim()
    );

    if !session.kb.index_exists() {
        Output::warning("The knowledge base has not been built yet. Type 'build' to create it.");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match ReplCommand::parse(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ReplCommand::Clear => {
                session.clear();
                Output::info("Started a new conversation.");
            }
            ReplCommand::History => {
                if session.history().is_empty() {
                    Output::info("No questions asked yet.");
                }
                for (i, turn) in session.history().iter().enumerate() {
                    Output::chat_turn(i + 1, &turn.question, &turn.answer);
                }
            }
            ReplCommand::Build => {
                let dataset = session.kb.configured_dataset();
                // The old chain still reads the replaced file.
                if build_index(&session.kb, &dataset).await.is_ok() {
                    session.chain = None;
                }
            }
            ReplCommand::Ask(question) => {
                if !session.kb.index_exists() {
                    Output::warning("Build the knowledge base first (type 'build').");
                    continue;
                }

                let spinner = Output::spinner("Thinking...");
                let result = session.ask(&question).await;
                spinner.finish_and_clear();

                match result {
                    Ok(response) => {
                        println!("\n{} {}\n", style("Assistant:").cyan().bold(), response.answer);
                        if !response.sources.is_empty() {
                            let sources: Vec<&str> = response
                                .sources
                                .iter()
                                .map(|s| s.document.source.as_str())
                                .collect();
                            println!("{}\n", style(format!("Sources: {}", sources.join(" | "))).dim());
                        }
                    }
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Empty,
    Exit,
    Clear,
    History,
    Build,
    Ask(String),
}

impl ReplCommand {
    fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "" => ReplCommand::Empty,
            "exit" | "quit" => ReplCommand::Exit,
            "clear" => ReplCommand::Clear,
            "history" => ReplCommand::History,
            "build" | "rebuild" => ReplCommand::Build,
            _ => ReplCommand::Ask(input.to_string()),
        }
    }
}

/// One conversation with the assistant.
struct ChatSession {
    kb: KnowledgeBase,
    model: Arc<dyn ChatModel>,
    chain: Option<AnswerChain>,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    fn new(kb: KnowledgeBase, model: Arc<dyn ChatModel>) -> Self {
        Self {
            kb,
            model,
            chain: None,
            history: Vec::new(),
        }
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn clear(&mut self) {
        self.history.clear();
    }

    /// Answer a question and record the turn.
    async fn ask(&mut self, question: &str) -> Result<ChainAnswer> {
        let chain = match self.chain.take() {
            Some(chain) => chain,
            None => self.kb.answer_chain(Arc::clone(&self.model)).await?,
        };

        let result = chain.answer(question, &self.history).await;
        self.chain = Some(chain);
        let response = result?;
        debug!("History now holds {} turns", self.history.len() + 1);
        self.history
            .push(ChatTurn::new(question, response.answer.clone()));
        Ok(response)
    }
}
