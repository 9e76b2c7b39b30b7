use clap::{Parser, Subcommand};
use doc_rag::Result;
use doc_rag::commands::{ingest_document, query_document, show_status};
use doc_rag::config::{run_interactive_config, show_config};
use doc_rag::pipeline::DEFAULT_TOP_K;

#[derive(Parser)]
#[command(name = "doc-rag")]
#[command(about = "Retrieval-augmented question answering over document chunks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Qdrant and OpenAI settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a document into the vector collection
    Ingest {
        /// Path of the document to ingest
        path: String,
        /// Identifier to store the document under; defaults to the path
        #[arg(long)]
        source_id: Option<String>,
    },
    /// Answer a question against the ingested corpus
    Query {
        /// The question to answer
        question: String,
        /// How many chunks to retrieve
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Show collection status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { path, source_id } => {
            ingest_document(&path, source_id)?;
        }
        Commands::Query { question, top_k } => {
            query_document(&question, top_k)?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}
