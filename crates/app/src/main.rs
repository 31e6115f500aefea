mod client;
mod config;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client::ApiClient;
use config::{EmbeddingBackend, ServeArgs};
use docqa_core::{
    Assistant, CharacterNgramEmbedder, Embedder, EvaluationRequest, HuggingFaceClient, ModelSuite,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the docqa server used by client commands
    #[arg(long, env = "DOCQA_SERVER_URL", default_value = "http://127.0.0.1:8000", global = true)]
    server_url: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Upload a PDF or TXT file and print its summary.
    Upload {
        /// File to upload.
        #[arg(long)]
        file: PathBuf,
    },
    /// Ask a question about an uploaded document.
    Ask {
        #[arg(long)]
        doc_id: String,
        #[arg(long)]
        question: String,
    },
    /// Show stored metadata for a document.
    Show {
        #[arg(long)]
        doc_id: String,
    },
    /// Generate challenge questions for a document.
    Challenge {
        #[arg(long)]
        doc_id: String,
    },
    /// Grade answers to challenge questions. Pair each --question with an --answer.
    Evaluate {
        #[arg(long)]
        doc_id: String,
        #[arg(long = "question")]
        questions: Vec<String>,
        #[arg(long = "answer")]
        answers: Vec<String>,
    },
    /// Generate questions, read answers from stdin, and grade them.
    Quiz {
        #[arg(long)]
        doc_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docqa=info,docqa_core=info,tower_http=info")),
        )
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server_url);

    match cli.command {
        Command::Serve(args) => serve(args).await?,
        Command::Upload { file } => {
            let receipt = client.upload(&file).await?;
            println!("doc_id: {}", receipt.doc_id);
            println!("{}", receipt.message);
            println!("summary:\n{}", receipt.summary);
        }
        Command::Ask { doc_id, question } => {
            let response = client.ask(&doc_id, &question).await?;
            println!("answer: {}", response.answer);
            println!("confidence: {:.2}%", response.confidence * 100.0);
            println!(
                "justification (paragraph {}):\n{}",
                response.justification.paragraph, response.justification.text
            );
        }
        Command::Show { doc_id } => {
            let summary = client.document(&doc_id).await?;
            println!("doc_id: {}", summary.doc_id);
            println!("file: {}", summary.file_name);
            println!("sha256: {}", summary.checksum);
            println!("uploaded_at: {}", summary.uploaded_at.to_rfc3339());
            println!(
                "paragraphs: {}, pages: {}, chunks: {}",
                summary.paragraphs, summary.pages, summary.chunks
            );
        }
        Command::Challenge { doc_id } => {
            let challenge = client.challenge(&doc_id).await?;
            for (index, question) in challenge.questions.iter().enumerate() {
                println!("Q{}: {question}", index + 1);
            }
        }
        Command::Evaluate {
            doc_id,
            questions,
            answers,
        } => {
            let request = EvaluationRequest {
                doc_id,
                questions,
                answers,
            };
            print_evaluation(&client, &request).await?;
        }
        Command::Quiz { doc_id } => {
            let challenge = client.challenge(&doc_id).await?;
            if challenge.questions.is_empty() {
                println!("no questions could be generated for {doc_id}");
                return Ok(());
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut answers = Vec::with_capacity(challenge.questions.len());
            for (index, question) in challenge.questions.iter().enumerate() {
                println!("Q{}: {question}", index + 1);
                println!("your answer:");
                answers.push(lines.next_line().await?.unwrap_or_default());
            }

            let request = EvaluationRequest {
                doc_id,
                questions: challenge.questions,
                answers,
            };
            print_evaluation(&client, &request).await?;
        }
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let backend = Arc::new(
        HuggingFaceClient::new(args.huggingface_config())
            .context("configuring inference backend")?,
    );

    let embedder: Arc<dyn Embedder> = match args.embedding_backend {
        EmbeddingBackend::Huggingface => backend.clone(),
        EmbeddingBackend::Ngram => Arc::new(CharacterNgramEmbedder {
            dimensions: args.embedding_dimensions,
        }),
    };

    let models = ModelSuite {
        embedder,
        summarizer: backend.clone(),
        qa: backend.clone(),
        generator: backend,
    };
    let assistant = Assistant::new(models, args.assistant_options())?;
    let router = server::router(Arc::new(assistant), args.max_upload_bytes);

    let address = args.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %address,
        embedding_backend = ?args.embedding_backend,
        "docqa server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn print_evaluation(client: &ApiClient, request: &EvaluationRequest) -> anyhow::Result<()> {
    let report = client.evaluate(request).await?;
    for result in report.results {
        println!("Q: {}", result.question);
        println!("your answer: {}", result.your_answer);
        println!("feedback: {}", result.feedback);
        println!("justification:\n{}\n", result.justification);
    }
    Ok(())
}
