//! Command-line interface for fluent-sns
//!
//! # Usage Examples
//!
//! ## Deliver
//! ```bash
//! # One topic for everything
//! fluent-sns deliver --aws-region us-east-1 --topic-name alerts buffer/*.chunk
//!
//! # Topic from a record field, subject from another field
//! fluent-sns deliver --aws-region us-east-1 \
//!   --topic-map-key topic --subject-key title \
//!   /var/lib/fluent/buffer/
//!
//! # Topic from the tag: "sns.orders.created" → "orders-created"
//! fluent-sns deliver --topic-map-tag --remove-tag-prefix sns buffer/
//! ```
//!
//! ## Inspect
//! ```bash
//! fluent-sns topics --aws-region us-east-1
//! ```
//!
//! ## Produce test input
//! ```bash
//! fluent-sns pack --input events.jsonl --output events.chunk
//! ```
//!
//! Exits with status 1 on configuration errors, when topic discovery gives up
//! after repeated throttling, and when a chunk fails to deliver.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fluent_sns::deliver::{chunk_files, deliver_files};
use fluent_sns::pack::jsonl_to_chunk;
use fluent_sns::AwsOpts;
use sns_client::SnsClient;
use sns_output::{BackoffPolicy, SnsOutput, TopicDirectory};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fluent-sns")]
#[command(about = "Publish buffered log chunks as Amazon SNS notifications")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish every record of the given chunk files
    Deliver {
        /// Chunk files, or directories of chunk files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// AWS connection options
        #[command(flatten)]
        aws: AwsOpts,

        /// Topic, subject and record options
        #[command(flatten)]
        output: sns_output::Config,
    },

    /// Discover SNS topics and print the name → ARN directory
    Topics {
        /// AWS connection options
        #[command(flatten)]
        aws: AwsOpts,
    },

    /// Encode JSON lines of {"tag","time","record"} into a chunk file
    Pack {
        /// JSON lines input file
        #[arg(long)]
        input: PathBuf,

        /// Chunk file to write
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deliver { paths, aws, output } => {
            let output = SnsOutput::configure(&output).context("Invalid output configuration")?;
            let files = chunk_files(&paths).await?;

            let client = SnsClient::new(&(&aws).into())
                .await
                .context("Failed to create SNS client")?;
            let publisher = output.start(Arc::new(client)).await?;

            let summary = deliver_files(&publisher, &files).await?;
            info!(
                "Delivered {} chunks: {} published, {} dropped",
                summary.chunks, summary.published, summary.dropped
            );
        }
        Commands::Topics { aws } => {
            let client = SnsClient::new(&(&aws).into())
                .await
                .context("Failed to create SNS client")?;
            let directory = TopicDirectory::discover(&client, &BackoffPolicy::default()).await?;

            let mut topics: Vec<(&str, &str)> = directory.iter().collect();
            topics.sort();
            for (name, arn) in topics {
                println!("{name}\t{arn}");
            }
        }
        Commands::Pack { input, output } => {
            let file = std::fs::File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let chunk = jsonl_to_chunk(BufReader::new(file))?;
            chunk.write_to(&output)?;
            info!("Wrote {} entries to {}", chunk.len(), output.display());
        }
    }

    Ok(())
}
