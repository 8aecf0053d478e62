use std::sync::Mutex;

use async_trait::async_trait;
use study_assistant_lib::document;
use study_assistant_lib::prompt::CompletionRequest;
use study_assistant_lib::{
    Assistant, AssistantError, Completion, CompletionClient, Flashcard, FormattedOutput, Mode,
    Submission,
};

/// Answers every request with the same text and keeps what it was sent.
#[derive(Default)]
struct RecordingClient {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingClient {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AssistantError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Completion::new(self.reply.clone(), "Recording", "test-model"))
    }

    fn provider_name(&self) -> &str {
        "Recording"
    }
}

#[tokio::test]
async fn each_text_mode_uses_its_directive() {
    for mode in [Mode::Chat, Mode::Summary, Mode::Flashcards, Mode::ExamGenerator] {
        let assistant = Assistant::new(RecordingClient::new("reply"));
        assistant
            .submit(mode, Submission::Text("the water cycle".to_string()))
            .await
            .unwrap();

        let requests = assistant.client().requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "{mode}");
        let messages = requests[0].messages();
        assert_eq!(messages[0].content, mode.directive());
        assert_eq!(messages[1].content, "the water cycle");
    }
}

#[tokio::test]
async fn submissions_are_independent() {
    let assistant = Assistant::new(RecordingClient::new("Q: one\nA: 1"));

    let first = assistant
        .submit(Mode::Flashcards, Submission::Text("numbers".into()))
        .await
        .unwrap();
    let blank = assistant.submit(Mode::Flashcards, Submission::Text("\n".into())).await;
    let second = assistant
        .submit(Mode::Flashcards, Submission::Text("numbers".into()))
        .await
        .unwrap();

    assert!(matches!(blank, Err(AssistantError::EmptyInput)));
    assert_eq!(assistant.client().count(), 2);
    assert_ne!(first.id, second.id);
    assert_eq!(first.output, second.output);
}

#[tokio::test]
async fn flashcards_keep_source_order_and_drop_orphans() {
    let reply = "Sure! Here are 5 flashcards:\n\
                 Q: Orphan?\n\
                 Q: Speed of light?\n\
                 A: About 300,000 km/s\n\
                 A: stray answer\n\
                 Q: Newton's first law?\n\
                 A: Inertia\n\
                 Q: Unanswered?";
    let assistant = Assistant::new(RecordingClient::new(reply));
    let response = assistant
        .submit(Mode::Flashcards, Submission::Text("physics".into()))
        .await
        .unwrap();

    assert_eq!(
        response.output,
        FormattedOutput::Flashcards(vec![
            Flashcard {
                question: "Speed of light?".into(),
                answer: "About 300,000 km/s".into()
            },
            Flashcard {
                question: "Newton's first law?".into(),
                answer: "Inertia".into()
            },
        ])
    );
}

#[tokio::test]
async fn unsupported_file_on_disk_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain notes").unwrap();

    let assistant = Assistant::new(RecordingClient::new("unused"));
    let err = assistant
        .submit(Mode::FileUpload, Submission::File(path))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::UnsupportedFileType(ref ext) if ext == "txt"));
    assert_eq!(assistant.client().count(), 0);
}

#[tokio::test]
async fn corrupt_upload_is_reported() {
    let assistant = Assistant::new(RecordingClient::new("unused"));
    let err = assistant
        .submit(
            Mode::FileUpload,
            Submission::Upload {
                file_name: "Revision Notes.DOCX".into(),
                bytes: vec![0xde, 0xad, 0xbe, 0xef],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::CorruptDocument(_)));
    assert_eq!(assistant.client().count(), 0);
}

#[tokio::test]
async fn response_serializes_for_json_output() {
    let assistant = Assistant::new(RecordingClient::new("Q: a\nA: b"));
    let response = assistant
        .submit(Mode::Flashcards, Submission::Text("x".into()))
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["mode"], "flashcards");
    assert_eq!(json["output"]["kind"], "flashcards");
    assert_eq!(json["output"]["value"][0]["question"], "a");
    assert!(json.get("document_preview").is_none());
}

#[tokio::test]
async fn json_output_carries_the_flashcard_warning() {
    let assistant = Assistant::new(RecordingClient::new("I can't make flashcards from that."));
    let response = assistant
        .submit(Mode::Flashcards, Submission::Text("??".into()))
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["output"]["value"], serde_json::json!([]));
    assert_eq!(
        json["warning"],
        "Could not generate flashcards. Try rephrasing your input."
    );
}

#[tokio::test]
async fn successful_response_has_no_warning_field() {
    let assistant = Assistant::new(RecordingClient::new("Q: a\nA: b"));
    let response = assistant
        .submit(Mode::Flashcards, Submission::Text("x".into()))
        .await
        .unwrap();

    assert!(serde_json::to_value(&response).unwrap().get("warning").is_none());
}

/// Single-page PDF showing `text` in Helvetica, or an empty page for `None`.
fn one_page_pdf(text: Option<&str>) -> Vec<u8> {
    let content = match text {
        Some(text) => format!("BT /F1 12 Tf 72 712 Td ({}) Tj ET", text),
        None => String::new(),
    };
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    pdf
}

#[tokio::test]
async fn uploaded_pdf_is_summarized_with_preview() {
    let assistant =
        Assistant::new(RecordingClient::new("- greets the reader")).with_preview_chars(5);
    let response = assistant
        .submit(
            Mode::FileUpload,
            Submission::Upload {
                file_name: "Week 1.pdf".into(),
                bytes: one_page_pdf(Some("Hello Study")),
            },
        )
        .await
        .unwrap();

    let requests = assistant.client().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system, "Summarize this document for easier revision.");
    assert!(requests[0].user.contains("Hello Study"), "{:?}", requests[0].user);

    let preview = response.document_preview.as_deref().unwrap();
    assert_eq!(preview, document::preview(&requests[0].user, 5));
    assert_eq!(preview.chars().count(), 5);
    assert_eq!(response.output, FormattedOutput::Text("- greets the reader".into()));
}

#[tokio::test]
async fn pdf_on_disk_is_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chapter.pdf");
    std::fs::write(&path, one_page_pdf(Some("Hello Study"))).unwrap();

    let assistant = Assistant::new(RecordingClient::new("summary"));
    let response = assistant
        .submit(Mode::FileUpload, Submission::File(path))
        .await
        .unwrap();

    assert!(response.document_preview.unwrap().contains("Hello Study"));
    assert_eq!(assistant.client().count(), 1);
}

#[tokio::test]
async fn blank_pdf_issues_no_request() {
    let assistant = Assistant::new(RecordingClient::new("unused"));
    let result = assistant
        .submit(
            Mode::FileUpload,
            Submission::Upload {
                file_name: "empty.pdf".into(),
                bytes: one_page_pdf(None),
            },
        )
        .await;

    assert!(matches!(result, Err(AssistantError::EmptyInput)), "{result:?}");
    assert_eq!(assistant.client().count(), 0);
}
