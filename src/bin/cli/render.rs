use study_assistant_lib::{AssistantError, FormattedOutput, Mode, Response};

use crate::OutputFormat;

pub fn response(response: &Response, format: &OutputFormat, streamed: bool) {
    if *format == OutputFormat::Json {
        match serde_json::to_string_pretty(response) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize response: {}", e),
        }
    } else {
        plain(response, streamed);
    }

    if let Some(warning) = &response.warning {
        eprintln!("warning: {}", warning);
    }
}

fn plain(response: &Response, streamed: bool) {
    if let Some(preview) = &response.document_preview {
        println!("--- File content (preview) ---");
        println!("{}", preview.trim_end());
        println!("------------------------------\n");
    }

    match &response.output {
        FormattedOutput::Text(text) => {
            // Streamed text is already on screen.
            if !streamed {
                println!("{}", text);
            }
        }
        FormattedOutput::Flashcards(cards) => {
            if streamed && !cards.is_empty() {
                println!();
            }
            for (i, card) in cards.iter().enumerate() {
                println!("Flashcard {}: {}", i + 1, card.question);
                println!("    Answer: {}", card.answer);
            }
        }
    }
}

pub fn notice(err: &AssistantError) {
    eprintln!("note: {}", err);
}

pub fn failure(err: &AssistantError) {
    eprintln!("error: {}", failure_message(err));
}

fn failure_message(err: &AssistantError) -> String {
    match err {
        AssistantError::RequestRejected(_) => {
            format!("{} (check the API key and model name)", err)
        }
        e if e.is_retryable() => format!("{} (temporary, try again)", e),
        e => e.to_string(),
    }
}

pub fn modes(format: &OutputFormat) {
    if *format == OutputFormat::Json {
        let list: Vec<_> = Mode::ALL
            .iter()
            .map(|m| {
                serde_json::json!({
                    "mode": m.slug(),
                    "label": m.label(),
                    "directive": m.directive(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(list));
        return;
    }

    for mode in Mode::ALL {
        println!("{:<16} {}", mode.slug(), mode.label());
        for line in mode.directive().lines() {
            println!("{:<16}   {}", "", line);
        }
    }
}
