//! Line-oriented chat loop.
//!
//! Stands in for the chat transport: reads one line, routes it to
//! completion, prints the reply, then reads the next. Charts are written
//! to ~/.spesa/charts and the path is printed in place of the image.

use anyhow::{Context, Result};
use chrono::Local;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use spesa_extract::InferenceClient;
use spesa_ledger::LedgerStore;

use crate::chart::ChartRenderer;
use crate::config::ensure_spesa_home;
use crate::router::{Incoming, Reply, Router, START_TEXT};

pub async fn run_chat<C, S, R>(router: &mut Router<C, S, R>) -> Result<()>
where
    C: InferenceClient,
    S: LedgerStore,
    R: ChartRenderer,
{
    println!("{START_TEXT}");
    println!("(type 'quit' to exit)\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let line = match lines.next() {
            Some(line) => line.context("reading stdin")?,
            None => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            break;
        }

        let reference_date = Local::now().date_naive();
        let reply = router.handle(Incoming::parse(trimmed), reference_date).await;
        print_reply(reply);
    }

    Ok(())
}

/// Print one reply. A chart that cannot be saved only fails this request;
/// the session goes on.
pub fn print_reply(reply: Reply) {
    match reply {
        Reply::Text(text) => println!("{text}\n"),
        Reply::Chart { svg, caption } => {
            println!("{caption}");
            println!("{}\n", chart_note(write_chart(&svg)));
        }
    }
}

/// Line printed under a chart caption: the saved path, or a fixed failure
/// note that leaks no I/O detail.
fn chart_note(result: Result<PathBuf>) -> String {
    match result {
        Ok(path) => format!("Chart written to {}", path.display()),
        Err(err) => {
            tracing::warn!(error = %err, "saving chart failed");
            "Could not save the chart, please retry.".to_string()
        }
    }
}

fn write_chart(svg: &[u8]) -> Result<PathBuf> {
    let dir = ensure_spesa_home()?.join("charts");
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("spesa-{stamp}.svg"));
    std::fs::write(&path, svg).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
