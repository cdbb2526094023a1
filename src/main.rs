// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use voyage_rs::voyage::config::AppConfig;
use voyage_rs::voyage::server;
use voyage_rs::voyage::service::{ChatRequest, ChatService};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the chat API over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "VOYAGE_PORT")]
        port: Option<u16>,

        /// Directory for durable checkpoints (in memory when unset)
        #[arg(long, env = "VOYAGE_CHECKPOINT_DIR")]
        checkpoint_dir: Option<PathBuf>,
    },
    /// Chat with the travel system on the terminal
    Chat {
        /// Conversation thread to use or continue
        #[arg(short, long, default_value = "cli")]
        thread: String,

        /// Talk to the requirements graph alone
        #[arg(long)]
        requirements_only: bool,

        /// Directory for durable checkpoints (in memory when unset)
        #[arg(long, env = "VOYAGE_CHECKPOINT_DIR")]
        checkpoint_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;

    match args.command {
        Commands::Serve {
            port,
            checkpoint_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if checkpoint_dir.is_some() {
                config.checkpoint_dir = checkpoint_dir;
            }
            let service = ChatService::from_config(&config).context("failed to build agents")?;
            server::serve(Arc::new(service), config.port).await?;
        }
        Commands::Chat {
            thread,
            requirements_only,
            checkpoint_dir,
        } => {
            if checkpoint_dir.is_some() {
                config.checkpoint_dir = checkpoint_dir;
            }
            let service = ChatService::from_config(&config).context("failed to build agents")?;
            chat(&service, &thread, requirements_only).await?;
        }
    }

    Ok(())
}

/// Read turns from stdin; a line typed after a question resumes the thread
async fn chat(service: &ChatService, thread: &str, requirements_only: bool) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut resume = false;

    loop {
        print!("{} ", if resume { "answer>" } else { "you>" });
        std::io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }

        let request = ChatRequest {
            message: line.to_string(),
            thread_id: thread.to_string(),
            resume,
        };
        let result = if requirements_only {
            service.requirements_chat(request).await
        } else {
            service.travel_chat(request).await
        };

        match result {
            Ok(response) => {
                println!("voyage> {}", response.message);
                resume = response.is_interrupt;
                if !resume {
                    if let Some(itinerary) = &response.itinerary {
                        println!("{}", serde_json::to_string_pretty(itinerary)?);
                    }
                    if let Some(bookings) = &response.bookings {
                        println!("{}", serde_json::to_string_pretty(bookings)?);
                    }
                }
            }
            // The checkpoint is untouched; the same line can be retried
            Err(e) => eprintln!("error ({}): {}", e.kind(), e),
        }
    }

    Ok(())
}
