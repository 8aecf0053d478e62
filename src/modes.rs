//! Study modes and the directive/formatter table that drives dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::formatter::FormatterKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Chat,
    Summary,
    Flashcards,
    FileUpload,
    ExamGenerator,
}

/// Everything a mode contributes to a submission.
#[derive(Debug, Clone, Copy)]
pub struct ModeSpec {
    pub mode: Mode,
    pub label: &'static str,
    pub directive: &'static str,
    pub formatter: FormatterKind,
    /// FileUpload takes a document instead of free text.
    pub takes_document: bool,
}

static MODE_TABLE: [ModeSpec; 5] = [
    ModeSpec {
        mode: Mode::Chat,
        label: "Chat",
        directive: "You're a helpful tutor.",
        formatter: FormatterKind::PassThrough,
        takes_document: false,
    },
    ModeSpec {
        mode: Mode::Summary,
        label: "Summary",
        directive: "Summarize the text into clear bullet points.",
        formatter: FormatterKind::PassThrough,
        takes_document: false,
    },
    ModeSpec {
        mode: Mode::Flashcards,
        label: "Flashcards",
        directive: "Create 5 Quizizz-style flashcards in this format:\n\
                    Q: [question]\n\
                    A: [answer]\n\
                    Only include educational content.",
        formatter: FormatterKind::Flashcards,
        takes_document: false,
    },
    ModeSpec {
        mode: Mode::FileUpload,
        label: "File Upload",
        directive: "Summarize this document for easier revision.",
        formatter: FormatterKind::PassThrough,
        takes_document: true,
    },
    ModeSpec {
        mode: Mode::ExamGenerator,
        label: "Exam Generator",
        directive: "Make 5 neat multiple-choice questions (A–D) with the correct answer \
                    marked clearly. Use clean formatting.",
        formatter: FormatterKind::ExamMarkup,
        takes_document: false,
    },
];

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Chat,
        Mode::Summary,
        Mode::Flashcards,
        Mode::FileUpload,
        Mode::ExamGenerator,
    ];

    pub fn spec(self) -> &'static ModeSpec {
        // Table order follows declaration order.
        &MODE_TABLE[self as usize]
    }

    pub fn directive(self) -> &'static str {
        self.spec().directive
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn formatter(self) -> FormatterKind {
        self.spec().formatter
    }

    /// Name accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Summary => "summary",
            Mode::Flashcards => "flashcards",
            Mode::FileUpload => "file-upload",
            Mode::ExamGenerator => "exam-generator",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Mode::ALL
            .into_iter()
            .find(|m| m.slug() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Mode::ALL.iter().map(|m| m.slug()).collect();
                format!("unknown mode '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
