mod render;
mod repl;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use study_assistant_lib::{
    build_client, AppConfig, Assistant, AssistantError, CompletionClient, LLMProvider, Mode,
    Submission,
};

#[derive(Parser)]
#[command(
    name = "study-assistant",
    about = "Ask questions, summarize notes, and generate flashcards or exam questions",
    version
)]
struct Cli {
    /// Model provider (groq, openai, ollama); overrides the config file
    #[arg(long, global = true, value_parser = parse_provider)]
    provider: Option<LLMProvider>,

    /// Model id for the selected provider
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory holding config.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Send one submission and print the result
    Ask {
        /// chat, summary, flashcards, file-upload or exam-generator
        /// (default: file-upload with --file, chat otherwise)
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<Mode>,
        /// Input text (use "-" to read from stdin)
        text: Option<String>,
        /// PDF or DOCX document to summarize
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Print tokens as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// Interactive session, one submission per line
    Repl {
        /// Starting mode
        #[arg(short, long, value_parser = parse_mode, default_value = "chat")]
        mode: Mode,
        /// Print tokens as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// List modes and their directives
    Modes,

    /// Show the effective configuration (API keys masked)
    Config {
        /// Only print the config file location
        #[arg(long)]
        path: bool,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse()
}

fn parse_provider(s: &str) -> Result<LLMProvider, String> {
    s.parse()
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> anyhow::Result<Option<String>> {
    use std::io::IsTerminal;

    match content.as_deref() {
        Some("-") => Ok(Some(read_all(std::io::stdin())?)),
        Some(_) => Ok(content),
        None => {
            if std::io::stdin().is_terminal() {
                return Ok(None);
            }
            let buf = read_all(std::io::stdin())?;
            Ok(if buf.is_empty() { None } else { Some(buf) })
        }
    }
}

fn read_all(mut reader: impl std::io::Read) -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::Read::read_to_string(&mut reader, &mut buf)
        .context("Failed to read input from stdin")?;
    Ok(buf)
}

fn load_config(cli: &Cli) -> anyhow::Result<(AppConfig, PathBuf)> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => AppConfig::default_dir()?,
    };
    let mut config = AppConfig::load(&dir);
    if let Some(provider) = cli.provider {
        config.llm_provider = provider;
    }
    if let Some(model) = &cli.model {
        config.set_model(model.clone());
    }
    Ok((config, dir))
}

/// Run one submission and print its outcome. Notices (empty input, no
/// flashcards) are reported but do not fail.
pub(crate) async fn execute<C: CompletionClient>(
    assistant: &Assistant<C>,
    mode: Mode,
    submission: Submission,
    stream: bool,
    format: &OutputFormat,
) -> Result<(), AssistantError> {
    let streamed = stream && *format == OutputFormat::Plain;

    let result = if streamed {
        let mut on_token = |token: &str| {
            print!("{}", token);
            std::io::stdout().flush().ok();
        };
        let result = assistant.submit_streaming(mode, submission, &mut on_token).await;
        println!();
        result
    } else {
        assistant.submit(mode, submission).await
    };

    match result {
        Ok(response) => {
            render::response(&response, format, streamed);
            Ok(())
        }
        Err(e) if e.is_notice() => {
            render::notice(&e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Modes => {
            render::modes(&cli.format);
        }
        Command::Config { path } => {
            let (config, dir) = load_config(&cli)?;
            if *path {
                println!("{}", AppConfig::file_path(&dir).display());
            } else {
                println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            }
        }
        Command::Ask { mode, text, file, stream } => {
            let (config, _) = load_config(&cli)?;
            let submission = match file {
                Some(path) => Submission::File(path.clone()),
                None => Submission::Text(resolve_content(text.clone())?.unwrap_or_default()),
            };
            let mode = (*mode).unwrap_or(if file.is_some() { Mode::FileUpload } else { Mode::Chat });

            let assistant = Assistant::new(build_client(&config)?)
                .with_preview_chars(config.preview_chars);
            if let Err(e) = execute(&assistant, mode, submission, *stream, &cli.format).await {
                render::failure(&e);
                std::process::exit(1);
            }
        }
        Command::Repl { mode, stream } => {
            let (config, _) = load_config(&cli)?;
            let assistant = Assistant::new(build_client(&config)?)
                .with_preview_chars(config.preview_chars);
            repl::run(&assistant, *mode, *stream, &cli.format).await?;
        }
    }

    Ok(())
}
