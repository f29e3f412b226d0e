use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod chart;
mod chat;
mod config;
mod router;

use chart::PieChartRenderer;
use router::{Command as ChatCommand, Incoming, Reply, Router};
use spesa_core::total;
use spesa_extract::GeminiClient;
use spesa_ledger::{CsvLedger, LedgerStore, undo_last};

#[derive(Parser, Debug)]
#[command(name = "spesa", version, about = "Conversational expense ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default config to ~/.spesa/config.toml
    Init,

    /// Interactive chat: log expenses and query the ledger
    Chat,

    /// Log one expense from the command line
    Add {
        /// Free-text expense, e.g. "Pizza 15 euro"
        text: Vec<String>,
    },

    /// Expenses by category for a month (defaults to the current one)
    Report {
        /// Period phrase, e.g. "last month" or "03-2025"
        phrase: Vec<String>,
    },

    /// Pie chart of a month's expenses (defaults to the current one)
    Graph {
        /// Period phrase, e.g. "last month" or "03-2025"
        phrase: Vec<String>,

        /// Where to write the SVG (default: ~/.spesa/charts/)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete the last logged expense
    Undo,

    /// Running total over the whole ledger
    Total,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Init => {
            config::init_config()?;
        }

        Command::Chat => {
            let mut router = build_router(&cfg)?;
            chat::run_chat(&mut router).await?;
        }

        Command::Add { text } => {
            let text = text.join(" ");
            let mut router = build_router(&cfg)?;
            let reply = router
                .handle(Incoming::Expense(text), Local::now().date_naive())
                .await;
            chat::print_reply(reply);
        }

        Command::Report { phrase } => {
            let mut router = build_router(&cfg)?;
            let reply = router
                .handle(
                    Incoming::Command(ChatCommand::Report(join_phrase(phrase))),
                    Local::now().date_naive(),
                )
                .await;
            chat::print_reply(reply);
        }

        Command::Graph { phrase, out } => {
            let mut router = build_router(&cfg)?;
            let reply = router
                .handle(
                    Incoming::Command(ChatCommand::Graph(join_phrase(phrase))),
                    Local::now().date_naive(),
                )
                .await;
            match (reply, out) {
                (Reply::Chart { svg, caption }, Some(path)) => {
                    std::fs::write(&path, svg)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("{caption}");
                    println!("Chart written to {}", path.display());
                }
                (reply, _) => chat::print_reply(reply),
            }
        }

        Command::Undo => {
            let mut ledger = open_ledger(&cfg)?;
            println!("{}", router::undo_reply(undo_last(&mut ledger)));
        }

        Command::Total => {
            let ledger = open_ledger(&cfg)?;
            match ledger.read_all() {
                Ok(rows) => println!("{}", router::total_reply(&total(&rows))),
                Err(_) => println!(
                    "{}",
                    spesa_core::ReplyError::StoreUnavailable.user_message()
                ),
            }
        }
    }

    Ok(())
}

fn join_phrase(words: Vec<String>) -> Option<String> {
    let joined = words.join(" ").trim().to_string();
    if joined.is_empty() { None } else { Some(joined) }
}

fn open_ledger(cfg: &config::Config) -> Result<CsvLedger> {
    let path = cfg.ledger_path()?;
    CsvLedger::open(&path).with_context(|| format!("opening ledger {}", path.display()))
}

fn build_router(
    cfg: &config::Config,
) -> Result<Router<GeminiClient, CsvLedger, PieChartRenderer>> {
    let api_key = config::api_key()?;
    let client = GeminiClient::with_options(
        api_key,
        &cfg.llm.base_url,
        &cfg.llm.model,
        Duration::from_secs(cfg.llm.timeout_secs),
    )
    .context("building inference client")?;
    let ledger = open_ledger(cfg)?;
    Ok(Router::new(client, ledger, PieChartRenderer::default()))
}
