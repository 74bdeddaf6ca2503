//! Conversation turns passed into each query.

use serde::{Deserialize, Serialize};

/// One answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Render turns for the `{chat_history}` placeholder.
pub fn format_chat_history(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("Human: {}\nAssistant: {}", turn.question, turn.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chat_history() {
        let turns = vec![
            ChatTurn::new("Is there a dress code?", "No."),
            ChatTurn::new("And for kids?", "Kids from 8 are welcome."),
        ];
        assert_eq!(
            format_chat_history(&turns),
            "Human: Is there a dress code?\nAssistant: No.\n\
             Human: And for kids?\nAssistant: Kids from 8 are welcome."
        );
        assert_eq!(format_chat_history(&[]), "");
    }
}
