//! # Doc Chat CLI (`docchat`)
//!
//! The `docchat` binary is the presentation surface for the retrieval
//! core: it wires a file into a session and either runs one pipeline
//! command or hosts an interactive chat loop.
//!
//! ## Usage
//!
//! ```bash
//! docchat [--config ./docchat.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat chunks <file>` | Extract and chunk a document, print chunk stats |
//! | `docchat retrieve <file> "<query>"` | Rank chunks against a query (no model call) |
//! | `docchat ask <file> "<question>"` | Answer a question about a document |
//! | `docchat summarize <file>` | Summarize a document |
//! | `docchat chat <file>` | Interactive chat with a document |
//!
//! The media type is inferred from the file extension (`.txt`/`.md`,
//! `.pdf`, `.png`/`.jpg`/`.jpeg`) and can be overridden with
//! `--media-type`. `ask`, `summarize`, and `chat` need the API key
//! environment variable from the config (default `ANTHROPIC_API_KEY`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use doc_chat::config::{self, Config};
use doc_chat::embedding::HashedBowProvider;
use doc_chat::extract::{DefaultExtractor, MediaType};
use doc_chat::model::{AnthropicModel, ChatModel};
use doc_chat::models::SessionStage;
use doc_chat::session::Session;

/// Doc Chat — ask questions about a single document from the command
/// line.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "Talk to a document: chunk it, rank chunks against questions, and ask a hosted model",
    version,
    long_about = "Doc Chat extracts text from a document, splits it into overlapping word-based \
    chunks, ranks chunks against each question with deterministic embeddings and cosine \
    similarity, and forwards the best matches plus the question to a hosted language model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults are used when omitted; every key in the file is
    /// optional.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Extract and chunk a document, printing chunk statistics.
    ///
    /// Runs only the extraction and chunking stages. Useful for checking
    /// what the retrieval pipeline will see before spending model calls.
    Chunks {
        /// Document to process.
        file: PathBuf,

        /// Declared media type (overrides extension-based inference).
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Rank a document's chunks against a query and print the top
    /// matches.
    ///
    /// Runs the full retrieval pipeline (extract, chunk, embed, score)
    /// without calling the model, so it works offline.
    Retrieve {
        /// Document to process.
        file: PathBuf,

        /// The query to rank chunks against.
        query: String,

        /// Declared media type (overrides extension-based inference).
        #[arg(long)]
        media_type: Option<String>,

        /// Number of chunks to return (overrides config).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Ask a single question about a document.
    ///
    /// Retrieves the most relevant chunks and sends them with the
    /// question to the configured model.
    Ask {
        /// Document to process.
        file: PathBuf,

        /// The question to answer.
        question: String,

        /// Declared media type (overrides extension-based inference).
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Summarize a document with the configured model.
    Summarize {
        /// Document to process.
        file: PathBuf,

        /// Declared media type (overrides extension-based inference).
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Chat interactively with a document.
    ///
    /// Reads questions from stdin until EOF. `/summary` prints a model
    /// summary, `/reset` clears the session, `/quit` exits.
    Chat {
        /// Document to process.
        file: PathBuf,

        /// Declared media type (overrides extension-based inference).
        #[arg(long)]
        media_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Chunks { file, media_type } => {
            let session = load_session(&cfg, &file, media_type.as_deref()).await?;
            println!("file: {}", file.display());
            println!("chunks: {}", session.chunk_count());
            for chunk in session_chunks(&session) {
                println!(
                    "  [{}] words {}..{} \"{}\"",
                    chunk.0, chunk.1, chunk.2, chunk.3
                );
            }
        }
        Commands::Retrieve {
            file,
            query,
            media_type,
            top_k,
        } => {
            let mut cfg = cfg;
            if let Some(k) = top_k {
                cfg.retrieval.top_k = k;
            }
            let session = load_session(&cfg, &file, media_type.as_deref()).await?;
            let hits = session.retrieve_context(&query)?;
            if hits.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "{}. [{:.3}] chunk {} (word {})",
                    i + 1,
                    hit.score,
                    hit.chunk.id,
                    hit.chunk.start_word
                );
                println!("    excerpt: \"{}\"", excerpt(&hit.chunk.text, 160));
            }
        }
        Commands::Ask {
            file,
            question,
            media_type,
        } => {
            let mut session = load_session(&cfg, &file, media_type.as_deref()).await?;
            let model = AnthropicModel::new(&cfg.model)?;
            let answer = session.ask(&question, &model).await?;
            println!("{answer}");
        }
        Commands::Summarize { file, media_type } => {
            let mut session = load_session(&cfg, &file, media_type.as_deref()).await?;
            let model = AnthropicModel::new(&cfg.model)?;
            let summary = session.summarize(&model).await?;
            println!("{summary}");
        }
        Commands::Chat { file, media_type } => {
            let mut session = load_session(&cfg, &file, media_type.as_deref()).await?;
            let model = AnthropicModel::new(&cfg.model)?;
            println!(
                "processed {} ({} chunks). Ask a question, or /summary, /reset, /quit.",
                file.display(),
                session.chunk_count()
            );
            run_chat_loop(&mut session, &model).await?;
        }
    }

    Ok(())
}

/// Read a file, infer its declared media type, and run it through a fresh
/// session's upload.
async fn load_session(
    cfg: &Config,
    file: &Path,
    media_type: Option<&str>,
) -> anyhow::Result<Session> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let declared = declared_type(file, media_type)?;

    let provider = Box::new(HashedBowProvider::new(cfg.embedding.dims));
    let mut session = Session::new(cfg.clone(), provider);
    session
        .upload(&bytes, &declared, &DefaultExtractor)
        .await
        .with_context(|| format!("Failed to process {}", file.display()))?;
    Ok(session)
}

/// Resolve the declared media type: explicit flag first, then file
/// extension.
fn declared_type(file: &Path, explicit: Option<&str>) -> anyhow::Result<String> {
    if let Some(t) = explicit {
        return Ok(t.to_string());
    }
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    MediaType::infer_from_extension(ext)
        .map(|t| t.to_string())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "cannot infer media type for '{}'; pass --media-type",
                file.display()
            )
        })
}

/// `(id, start word, end word, excerpt)` rows for the chunks listing.
fn session_chunks(session: &Session) -> Vec<(usize, usize, usize, String)> {
    session
        .chunks()
        .iter()
        .map(|chunk| {
            let words = chunk.text.split_whitespace().count();
            (
                chunk.id,
                chunk.start_word,
                chunk.start_word + words,
                excerpt(&chunk.text, 60),
            )
        })
        .collect()
}

/// First `max_chars` characters with newlines flattened.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let mut out: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        out.push('…');
    }
    out
}

/// Interactive loop for the `chat` command.
async fn run_chat_loop(session: &mut Session, model: &dyn ChatModel) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" => break,
            "/reset" => {
                session.reset();
                println!("session reset; upload a new document to continue.");
            }
            "/summary" => match session.summarize(model).await {
                Ok(summary) => println!("{summary}"),
                Err(e) => println!("error: {e}"),
            },
            question => {
                if session.stage() != SessionStage::Ready {
                    println!("no document loaded; restart docchat with a file.");
                    continue;
                }
                match session.ask(question, model).await {
                    Ok(answer) => println!("{answer}"),
                    Err(e) => println!("error: {e}"),
                }
            }
        }
    }

    Ok(())
}
