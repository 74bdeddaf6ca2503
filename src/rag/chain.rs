//! The conversational answering chain: condense, retrieve, answer.

use super::history::{format_chat_history, ChatTurn};
use super::retriever::{format_context, Retriever};
use super::template::PromptTemplate;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};
use crate::vector_store::SearchResult;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answers questions about the FAQ in the context of earlier turns.
///
/// The chain holds no conversation state; callers own the history and pass
/// it to every call.
pub struct AnswerChain {
    model: Arc<dyn ChatModel>,
    retriever: Retriever,
    condense: PromptTemplate,
    qa_system: PromptTemplate,
    qa_user: PromptTemplate,
}

impl AnswerChain {
    /// Compose a chain, validating that every prompt has the placeholders it needs.
    pub fn new(model: Arc<dyn ChatModel>, retriever: Retriever, prompts: &Prompts) -> Result<Self> {
        Ok(Self {
            model,
            retriever,
            condense: PromptTemplate::with_required(
                prompts.condense.template.as_str(),
                &["chat_history", "question"],
            )?,
            qa_system: PromptTemplate::with_required(prompts.qa.system.as_str(), &["context"])?,
            qa_user: PromptTemplate::with_required(prompts.qa.user.as_str(), &["question"])?,
        })
    }

    /// Rewrite a follow-up into a standalone question.
    ///
    /// Returns the question unchanged, without calling the model, when there
    /// is no history.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn condense_question(&self, question: &str, history: &[ChatTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let chat_history = format_chat_history(history);
        let prompt = self
            .condense
            .render(&[("chat_history", chat_history.as_str()), ("question", question)])?;

        let rewritten = self.model.complete(&[ChatMessage::user(prompt)]).await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            debug!("Model returned an empty standalone question, using the original");
            return Ok(question.to_string());
        }

        debug!("Standalone question: {}", rewritten);
        Ok(rewritten.to_string())
    }

    /// Answer one question.
    #[instrument(skip(self, history), fields(question = %question, turns = history.len()))]
    pub async fn answer(&self, question: &str, history: &[ChatTurn]) -> Result<ChainAnswer> {
        info!("Processing question: {}", question);

        let standalone_question = self.condense_question(question, history).await?;
        let sources = self.retriever.retrieve(&standalone_question).await?;

        if sources.is_empty() {
            info!(
                "No FAQ entry scored at least {}, answering without context",
                self.retriever.score_threshold()
            );
        }

        let context = format_context(&sources);
        let messages = [
            ChatMessage::system(self.qa_system.render(&[("context", context.as_str())])?),
            ChatMessage::user(
                self.qa_user
                    .render(&[("question", standalone_question.as_str())])?,
            ),
        ];

        let answer = self.model.complete(&messages).await?;

        debug!("Generated answer with {} sources", sources.len());

        Ok(ChainAnswer {
            answer: answer.trim().to_string(),
            standalone_question,
            sources,
        })
    }
}

/// An answer together with what it was based on.
#[derive(Debug, Clone, Serialize)]
pub struct ChainAnswer {
    /// The generated answer.
    pub answer: String,
    /// The question used for retrieval and answering.
    pub standalone_question: String,
    /// FAQ entries handed to the model.
    pub sources: Vec<SearchResult>,
}

impl ChainAnswer {
    /// Format the answer and its sources for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} (row {}, score: {:.2})",
                    source.document.source, source.document.row, source.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CondensePrompts, QaPrompts};
    use crate::error::CandlelightError;
    use crate::llm::Role;
    use crate::testing::{faq_store, HashEmbedder, ScriptedChatModel};

    async fn chain_with(
        model: Arc<ScriptedChatModel>,
        embedder: Arc<HashEmbedder>,
        threshold: f32,
    ) -> AnswerChain {
        let store = faq_store(embedder.as_ref()).await;
        let retriever = Retriever::new(store, embedder)
            .with_top_k(2)
            .with_score_threshold(threshold);
        AnswerChain::new(model, retriever, &Prompts::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_history_uses_raw_question() {
        let model = Arc::new(ScriptedChatModel::new(["Yes, we offer one."]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model.clone(), embedder.clone(), 0.0).await;

        let answer = chain.answer("Do you have javascript course?", &[]).await.unwrap();

        assert_eq!(answer.answer, "Yes, we offer one.");
        assert_eq!(answer.standalone_question, "Do you have javascript course?");
        assert_eq!(embedder.queries(), vec!["Do you have javascript course?".to_string()]);

        // Only the answer call, no condensing.
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, Role::System);
        assert_eq!(calls[0][1].content, "Do you have javascript course?");
    }

    #[tokio::test]
    async fn test_javascript_course_scenario() {
        let model = Arc::new(ScriptedChatModel::new(["Yes."]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model.clone(), embedder, 0.0).await;

        let answer = chain.answer("Do you have javascript course?", &[]).await.unwrap();

        let top = &answer.sources[0].document;
        assert_eq!(top.source, "Do you offer a JavaScript course?");
        assert!(model.calls()[0][0].content.contains(&top.content));
    }

    #[tokio::test]
    async fn test_follow_up_is_condensed_before_retrieval() {
        let model = Arc::new(ScriptedChatModel::new([
            "  What is the dress code for Candlelight concerts?  ",
            "Smart casual.",
        ]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model.clone(), embedder.clone(), 0.0).await;

        let history = vec![ChatTurn::new("Where are the concerts held?", "In historic venues.")];
        let answer = chain.answer("And what should I wear?", &history).await.unwrap();

        assert_eq!(answer.answer, "Smart casual.");
        assert_eq!(
            answer.standalone_question,
            "What is the dress code for Candlelight concerts?"
        );
        assert_eq!(
            embedder.queries(),
            vec!["What is the dress code for Candlelight concerts?".to_string()]
        );

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        let condense_prompt = &calls[0][0].content;
        assert!(condense_prompt.contains("Human: Where are the concerts held?\nAssistant: In historic venues."));
        assert!(condense_prompt.contains("Follow-up question:\nAnd what should I wear?"));
        assert_eq!(calls[1][1].content, "What is the dress code for Candlelight concerts?");
        assert_eq!(answer.sources[0].document.source, "What is the dress code?");
    }

    #[tokio::test]
    async fn test_empty_rewrite_falls_back_to_question() {
        let model = Arc::new(ScriptedChatModel::new(["   ", "Answer"]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model, embedder, 0.0).await;

        let history = vec![ChatTurn::new("Hi", "Hello")];
        let answer = chain.answer("Can I bring kids?", &history).await.unwrap();
        assert_eq!(answer.standalone_question, "Can I bring kids?");
    }

    #[tokio::test]
    async fn test_no_documents_above_threshold() {
        let model = Arc::new(ScriptedChatModel::new(["I don't know."]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model.clone(), embedder, 0.99).await;

        let answer = chain.answer("Quantum chromodynamics?", &[]).await.unwrap();
        assert!(answer.sources.is_empty());
        assert_eq!(answer.answer, "I don't know.");
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_not_mutated() {
        let model = Arc::new(ScriptedChatModel::new(["standalone", "answer"]));
        let embedder = Arc::new(HashEmbedder::new());
        let chain = chain_with(model, embedder, 0.0).await;

        let history = vec![ChatTurn::new("q1", "a1")];
        let snapshot = history.clone();
        chain.answer("q2", &history).await.unwrap();
        assert_eq!(history, snapshot);
    }

    #[tokio::test]
    async fn test_templates_missing_placeholders_are_rejected() {
        let model = Arc::new(ScriptedChatModel::new(Vec::<String>::new()));
        let embedder = Arc::new(HashEmbedder::new());
        let store = faq_store(embedder.as_ref()).await;

        let prompts = Prompts {
            condense: CondensePrompts {
                template: "Rephrase: {question}".to_string(),
            },
            qa: QaPrompts::default(),
        };
        let err = AnswerChain::new(model, Retriever::new(store, embedder), &prompts).err();
        assert!(matches!(err, Some(CandlelightError::Prompt(ref msg)) if msg.contains("chat_history")));
    }

    #[test]
    fn test_format_for_display() {
        use crate::vector_store::Document;

        let answer = ChainAnswer {
            answer: "No dress code.".to_string(),
            standalone_question: "Dress code?".to_string(),
            sources: vec![SearchResult {
                document: Document::new(4, "What is the dress code?".into(), String::new(), vec![]),
                score: 0.91,
            }],
        };
        assert_eq!(
            answer.format_for_display(),
            "No dress code.\n\n--- Sources ---\nWhat is the dress code? (row 4, score: 0.91)"
        );
    }
}
