pub mod ai;
pub mod config;
pub mod dispatcher;
pub mod document;
pub mod error;
pub mod formatter;
pub mod modes;
pub mod prompt;

pub use ai::{build_client, Completion, CompletionClient, TokenSink};
pub use config::{AppConfig, LLMProvider};
pub use dispatcher::{Assistant, Response, Submission};
pub use error::AssistantError;
pub use formatter::{Flashcard, FormattedOutput};
pub use modes::Mode;
