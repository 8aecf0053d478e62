use std::io::Write;
use std::path::PathBuf;

use study_assistant_lib::{Assistant, CompletionClient, Mode, Submission};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{execute, render, OutputFormat};

const HELP: &str = "\
Type text and press Enter to submit it in the current mode.
  :mode <name>   switch mode (chat, summary, flashcards, file-upload, exam-generator)
  :file <path>   summarize a PDF or DOCX file
  :modes         list modes
  :help          show this help
  :quit          exit
In file-upload mode a plain line is read as a file path.
Each line is one submission. For multi-line notes, pipe them in instead:
  study-assistant ask --mode summary - < notes.txt";

#[derive(Debug, PartialEq)]
enum Line {
    Submit(String),
    SwitchMode(Mode),
    File(PathBuf),
    ListModes,
    Help,
    Quit,
    Invalid(String),
}

fn parse_line(line: &str) -> Line {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Line::Submit(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "mode" | "m" => match arg.parse() {
            Ok(mode) => Line::SwitchMode(mode),
            Err(e) => Line::Invalid(e),
        },
        "file" | "f" if !arg.is_empty() => Line::File(PathBuf::from(arg)),
        "file" | "f" => Line::Invalid("usage: :file <path>".to_string()),
        "modes" => Line::ListModes,
        "help" | "h" | "?" => Line::Help,
        "quit" | "q" | "exit" => Line::Quit,
        other => Line::Invalid(format!("unknown command ':{}' (try :help)", other)),
    }
}

pub async fn run<C: CompletionClient>(
    assistant: &Assistant<C>,
    mut mode: Mode,
    stream: bool,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    println!("Study assistant. Mode: {}. Type :help for commands.", mode);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("[{}]> ", mode.slug());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let (submit_mode, submission) = match parse_line(&line) {
            Line::Submit(text) if text.trim().is_empty() => continue,
            Line::Submit(text) if mode == Mode::FileUpload => {
                (mode, Submission::File(PathBuf::from(text.trim())))
            }
            Line::Submit(text) => (mode, Submission::Text(text)),
            Line::File(path) => (Mode::FileUpload, Submission::File(path)),
            Line::SwitchMode(next) => {
                mode = next;
                println!("Mode: {}", mode);
                continue;
            }
            Line::ListModes => {
                render::modes(format);
                continue;
            }
            Line::Help => {
                println!("{}", HELP);
                continue;
            }
            Line::Quit => break,
            Line::Invalid(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };

        // A failed submission never ends the session.
        if let Err(e) = execute(assistant, submit_mode, submission, stream, format).await {
            render::failure(&e);
        }
    }

    Ok(())
}
