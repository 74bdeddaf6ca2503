//! Retrieval-augmented question answering over the FAQ index.
//!
//! A query flows through [`AnswerChain`]: an optional condensing step turns
//! a follow-up into a standalone question, the [`Retriever`] fetches the most
//! similar FAQ entries, and the chat model answers from them.

mod chain;
mod history;
mod retriever;
mod template;

pub use chain::{AnswerChain, ChainAnswer};
pub use history::{format_chat_history, ChatTurn};
pub use retriever::{format_context, Retriever};
pub use template::PromptTemplate;
