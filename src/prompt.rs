use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssistantError;
use crate::modes::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// The system directive and user input for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub id: Uuid,
    pub mode: Mode,
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    /// Ordered (system, user) messages as sent to the provider.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.system.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: self.user.clone(),
            },
        ]
    }
}

/// Build the request for `mode`, refusing blank input.
pub fn compose(mode: Mode, user_input: &str) -> Result<CompletionRequest, AssistantError> {
    if user_input.trim().is_empty() {
        return Err(AssistantError::EmptyInput);
    }

    Ok(CompletionRequest {
        id: Uuid::new_v4(),
        mode,
        system: mode.directive().to_string(),
        user: user_input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_system_then_user() {
        let req = compose(Mode::Chat, "What is photosynthesis?").unwrap();
        let messages = req.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You're a helpful tutor.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "What is photosynthesis?");
    }

    #[test]
    fn user_input_is_sent_untrimmed() {
        let req = compose(Mode::Summary, "  notes\n").unwrap();
        assert_eq!(req.user, "  notes\n");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(matches!(compose(Mode::Chat, ""), Err(AssistantError::EmptyInput)));
        assert!(matches!(
            compose(Mode::Flashcards, " \n\t"),
            Err(AssistantError::EmptyInput)
        ));
    }

    #[test]
    fn each_request_gets_a_fresh_id() {
        let a = compose(Mode::Chat, "x").unwrap();
        let b = compose(Mode::Chat, "x").unwrap();
        assert_ne!(a.id, b.id);
    }
}
