//! Runs one submission: compose the prompt for the mode, call the model,
//! format the completion.

use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::ai::{Completion, CompletionClient, TokenSink};
use crate::document;
use crate::error::AssistantError;
use crate::formatter::FormattedOutput;
use crate::modes::Mode;
use crate::prompt::{compose, CompletionRequest};

/// What the user handed in for a submission.
#[derive(Debug, Clone)]
pub enum Submission {
    Text(String),
    /// An uploaded document held in memory.
    Upload { file_name: String, bytes: Vec<u8> },
    /// A document already on disk.
    File(PathBuf),
}

impl Submission {
    fn is_document(&self) -> bool {
        !matches!(self, Submission::Text(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Uuid,
    pub mode: Mode,
    pub output: FormattedOutput,
    pub raw: String,
    pub provider: String,
    pub model: String,
    pub timestamp: String,
    /// Start of the extracted text, for document submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_preview: Option<String>,
    /// Message for a non-fatal problem, e.g. no flashcards could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Response {
    fn new(request: &CompletionRequest, completion: Completion, preview: Option<String>) -> Self {
        let output = request.mode.formatter().apply(&completion.content);
        let warning = notice_for(&output).map(|n| n.to_string());
        Self {
            id: request.id,
            mode: request.mode,
            output,
            raw: completion.content,
            provider: completion.provider,
            model: completion.model,
            timestamp: completion.timestamp,
            document_preview: preview,
            warning,
        }
    }

    /// Non-fatal problem to show alongside the output.
    pub fn notice(&self) -> Option<AssistantError> {
        notice_for(&self.output)
    }
}

fn notice_for(output: &FormattedOutput) -> Option<AssistantError> {
    match output {
        FormattedOutput::Flashcards(cards) if cards.is_empty() => Some(AssistantError::NoFlashcardsParsed),
        _ => None,
    }
}

pub struct Assistant<C> {
    client: C,
    preview_chars: usize,
}

impl<C: CompletionClient> Assistant<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            preview_chars: 3000,
        }
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn submit(
        &self,
        mode: Mode,
        submission: Submission,
    ) -> Result<Response, AssistantError> {
        let (request, preview) = self.prepare(mode, submission).await?;
        let completion = self.client.complete(&request).await?;
        Ok(self.finish(&request, completion, preview))
    }

    /// Same as `submit`, forwarding tokens to `on_token` while the model
    /// is still writing.
    pub async fn submit_streaming(
        &self,
        mode: Mode,
        submission: Submission,
        on_token: &mut TokenSink<'_>,
    ) -> Result<Response, AssistantError> {
        let (request, preview) = self.prepare(mode, submission).await?;
        let completion = self.client.complete_streaming(&request, on_token).await?;
        Ok(self.finish(&request, completion, preview))
    }

    async fn prepare(
        &self,
        mode: Mode,
        submission: Submission,
    ) -> Result<(CompletionRequest, Option<String>), AssistantError> {
        let takes_document = mode.spec().takes_document;
        if takes_document != submission.is_document() {
            return Err(AssistantError::InvalidInput(if takes_document {
                format!("{} mode needs a PDF or DOCX file", mode)
            } else {
                format!("{} mode takes text, not a file", mode)
            }));
        }

        let (text, preview) = match submission {
            Submission::Text(text) => (text, None),
            Submission::Upload { file_name, bytes } => {
                let text = run_extraction(move || document::extract_bytes(&file_name, &bytes)).await?;
                let preview = document::preview(&text, self.preview_chars);
                (text, Some(preview))
            }
            Submission::File(path) => {
                let text = run_extraction(move || document::extract_file(&path)).await?;
                let preview = document::preview(&text, self.preview_chars);
                (text, Some(preview))
            }
        };

        let request = compose(mode, &text)?;
        log::info!("[{}] {} submission via {}", request.id, mode, self.client.provider_name());
        log::debug!("[{}] sending {} chars of input", request.id, request.user.len());
        Ok((request, preview))
    }

    fn finish(
        &self,
        request: &CompletionRequest,
        completion: Completion,
        preview: Option<String>,
    ) -> Response {
        log::debug!(
            "[{}] received {} chars from {}",
            request.id,
            completion.content.len(),
            completion.model
        );
        let response = Response::new(request, completion, preview);
        if let Some(warning) = &response.warning {
            log::warn!("[{}] {}", request.id, warning);
        }
        response
    }
}

async fn run_extraction<F>(extract: F) -> Result<String, AssistantError>
where
    F: FnOnce() -> Result<String, AssistantError> + Send + 'static,
{
    tokio::task::spawn_blocking(extract)
        .await
        .map_err(|e| AssistantError::CorruptDocument(format!("extraction aborted: {}", e)))?
}
