//! Plain-text extraction from uploaded study documents.

use std::io::Write;
use std::path::Path;

use crate::error::AssistantError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Result<Self, AssistantError> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            other => Err(AssistantError::UnsupportedFileType(if other.is_empty() {
                "(no extension)".to_string()
            } else {
                other.to_string()
            })),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AssistantError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Extract the text of a PDF or DOCX file, in page order.
pub fn extract_file(path: &Path) -> Result<String, AssistantError> {
    let kind = DocumentKind::from_path(path)?;
    if !path.is_file() {
        return Err(AssistantError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let text = match kind {
        // pdf_extract panics on some malformed files instead of erroring.
        DocumentKind::Pdf => std::panic::catch_unwind(|| pdf_extract::extract_text(path))
            .map_err(|_| {
                AssistantError::CorruptDocument(format!("{}: unreadable PDF", path.display()))
            })?
            .map_err(|e| AssistantError::CorruptDocument(format!("{}: {}", path.display(), e)))?,
        DocumentKind::Docx => docx_lite::extract_text(path).map_err(|e| {
            AssistantError::CorruptDocument(format!("{}: {}", path.display(), e))
        })?,
    };

    log::debug!(
        "Extracted {} chars from {} ({})",
        text.chars().count(),
        path.display(),
        kind.extension()
    );
    Ok(text)
}

/// Extract an uploaded document held in memory.
///
/// The bytes are written to a temporary file that is removed once
/// extraction finishes.
pub fn extract_bytes(file_name: &str, bytes: &[u8]) -> Result<String, AssistantError> {
    let kind = DocumentKind::from_path(Path::new(file_name))?;

    let mut upload = tempfile::Builder::new()
        .prefix("study-upload-")
        .suffix(&format!(".{}", kind.extension()))
        .tempfile()?;
    upload.write_all(bytes)?;
    upload.flush()?;

    extract_file(upload.path())
}

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
