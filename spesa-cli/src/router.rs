//! Command routing: maps inbound chat events onto the extractor, resolver,
//! aggregator, and ledger store, and renders the replies the user sees.
//!
//! One inbound event is handled start-to-finish before the next. Each
//! request makes at most two external calls, the inference call and the
//! ledger store access, and both complete before the reply is rendered.
//! Every external failure is mapped onto a fixed user-facing message here
//! and never leaks transport detail.

use chrono::NaiveDate;

use spesa_core::{LedgerTotal, PeriodKey, ReplyError, Summary, period_summary, total};
use spesa_extract::{InferenceClient, PeriodResolver, TransactionExtractor};
use spesa_ledger::{LedgerStore, UndoError, undo_last};

use crate::chart::ChartRenderer;

/// An inbound chat event after command parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Free text describing an expense
    Expense(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Undo,
    Total,
    /// Optional trailing period phrase; None means the current month
    Report(Option<String>),
    Graph(Option<String>),
    Unknown(String),
}

impl Incoming {
    /// Split an inbound text into command + optional argument, or treat it
    /// as a plain expense message.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            return Incoming::Expense(trimmed.to_string());
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let arg = if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        };

        let command = match name {
            "/start" => Command::Start,
            "/undo" => Command::Undo,
            "/total" => Command::Total,
            "/report" => Command::Report(arg),
            "/graph" => Command::Graph(arg),
            other => Command::Unknown(other.to_string()),
        };
        Incoming::Command(command)
    }
}

/// What goes back to the chat surface
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Chart { svg: Vec<u8>, caption: String },
}

pub const START_TEXT: &str = "Hi! I am Spesa, your expense ledger.\n\
Write an expense as plain text (e.g. 'Pizza 15 euro') and I will log it.\n\
Commands:\n\
- /report [month] - expenses by category\n\
- /graph [month] - pie chart of a month\n\
- /total - total of everything logged\n\
- /undo - delete the last entry\n\
- /start - this message";

/// Reply line for an undo outcome; shared by the router and the CLI.
pub fn undo_reply(result: Result<Vec<String>, UndoError>) -> String {
    match result {
        Ok(row) => {
            let description = row.get(2).map(String::as_str).unwrap_or("?");
            let amount = row.get(3).map(String::as_str).unwrap_or("?");
            format!("Deleted last entry: [{description}] - [{amount}]")
        }
        Err(UndoError::NothingToUndo) => "Nothing to undo: the ledger is empty.".to_string(),
        Err(UndoError::Store(_)) => ReplyError::StoreUnavailable.user_message(),
    }
}

/// Reply line for the running total; shared by the router and the CLI.
pub fn total_reply(t: &LedgerTotal) -> String {
    let mut out = format!("Total expenses: {:.2}", t.total);
    if t.skipped > 0 {
        out.push_str(&format!(" ({} malformed rows skipped)", t.skipped));
    }
    out
}

/// Multi-line period report; shared by the router and the CLI.
pub fn report_reply(summary: &Summary) -> String {
    let mut out = format!(
        "Expenses for {}: {:.2}\n",
        summary.period, summary.total
    );
    for (category, amount) in &summary.by_category {
        out.push_str(&format!("- {category}: {amount:.2}\n"));
    }
    if summary.skipped > 0 {
        out.push_str(&format!("({} malformed rows skipped)\n", summary.skipped));
    }
    out.trim_end().to_string()
}

pub struct Router<C: InferenceClient, S: LedgerStore, R: ChartRenderer> {
    client: C,
    store: S,
    chart: R,
}

impl<C: InferenceClient, S: LedgerStore, R: ChartRenderer> Router<C, S, R> {
    pub fn new(client: C, store: S, chart: R) -> Self {
        Self {
            client,
            store,
            chart,
        }
    }

    /// Handle one inbound event to completion.
    pub async fn handle(&mut self, incoming: Incoming, reference_date: NaiveDate) -> Reply {
        match incoming {
            Incoming::Expense(text) => self.handle_expense(&text, reference_date).await,
            Incoming::Command(Command::Start) => Reply::Text(START_TEXT.to_string()),
            Incoming::Command(Command::Undo) => {
                Reply::Text(undo_reply(undo_last(&mut self.store)))
            }
            Incoming::Command(Command::Total) => self.handle_total(),
            Incoming::Command(Command::Report(arg)) => {
                match self.summarize(arg, reference_date).await {
                    Ok(summary) => Reply::Text(report_reply(&summary)),
                    Err(err) => Reply::Text(err.user_message()),
                }
            }
            Incoming::Command(Command::Graph(arg)) => {
                match self.summarize(arg, reference_date).await {
                    Ok(summary) => self.handle_graph(&summary),
                    Err(err) => Reply::Text(err.user_message()),
                }
            }
            Incoming::Command(Command::Unknown(name)) => {
                Reply::Text(format!("Unknown command {name}. Try /start."))
            }
        }
    }

    async fn handle_expense(&mut self, text: &str, reference_date: NaiveDate) -> Reply {
        if text.is_empty() {
            return Reply::Text(ReplyError::Unparseable.user_message());
        }

        let extractor = TransactionExtractor::new(&self.client);
        let txn = match extractor.extract(text, reference_date).await {
            Ok(txn) => txn,
            Err(err) => {
                tracing::debug!(error = %err, "extraction failed");
                return Reply::Text(ReplyError::Unparseable.user_message());
            }
        };

        if let Err(err) = self.store.append_row(&txn.to_row()) {
            tracing::warn!(error = %err, "append failed");
            return Reply::Text(ReplyError::StoreUnavailable.user_message());
        }

        Reply::Text(format!(
            "Saved: [{}] - [{:.2}]",
            txn.description, txn.amount
        ))
    }

    fn handle_total(&mut self) -> Reply {
        match self.store.read_all() {
            Ok(rows) => Reply::Text(total_reply(&total(&rows))),
            Err(err) => {
                tracing::warn!(error = %err, "read failed");
                Reply::Text(ReplyError::StoreUnavailable.user_message())
            }
        }
    }

    fn handle_graph(&self, summary: &Summary) -> Reply {
        let caption = format!("Expenses for {}: {:.2}", summary.period, summary.total);
        match self.chart.render(&caption, &summary.by_category) {
            Ok(svg) => Reply::Chart { svg, caption },
            Err(err) => {
                tracing::warn!(error = %err, "chart rendering failed");
                Reply::Text("Could not draw the chart, please retry.".to_string())
            }
        }
    }

    /// Resolve the period (explicit phrase or current month), read the
    /// ledger, and aggregate. Zero matched rows is reported as empty, not
    /// as a zero-total report.
    async fn summarize(
        &mut self,
        arg: Option<String>,
        reference_date: NaiveDate,
    ) -> Result<Summary, ReplyError> {
        let period = match arg {
            None => PeriodKey::from_date(reference_date),
            Some(phrase) => {
                let resolver = PeriodResolver::new(&self.client);
                match resolver.resolve(&phrase, reference_date).await {
                    Ok(period) => period,
                    Err(err) => {
                        tracing::debug!(error = %err, "period resolution failed");
                        return Err(ReplyError::Unresolvable);
                    }
                }
            }
        };

        let rows = self
            .store
            .read_all()
            .map_err(|_| ReplyError::StoreUnavailable)?;
        let summary = period_summary(&rows, &period);

        if summary.matched == 0 {
            return Err(ReplyError::EmptyResult(period));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use spesa_extract::MockInference;
    use spesa_ledger::MemoryLedger;
    use std::cell::Cell;

    /// Chart double: counts calls, returns fixed bytes.
    #[derive(Default)]
    struct FakeChart {
        calls: Cell<usize>,
    }

    impl ChartRenderer for FakeChart {
        fn render(&self, _title: &str, _by_category: &[(String, f64)]) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(b"<svg/>".to_vec())
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()
    }

    fn seeded_ledger() -> MemoryLedger {
        MemoryLedger::from_rows(vec![
            vec!["Date", "Category", "Description", "Amount"],
            vec!["15-03-2025", "Food", "Pizza", "15.00"],
            vec!["16-03-2025", "Transport", "Bus", "2,50"],
        ]
        .into_iter()
        .map(|row| row.into_iter().map(String::from).collect())
        .collect())
    }

    /// Store double that fails selected operations, as an unreachable or
    /// rate-limited backend would.
    struct FailingLedger {
        inner: MemoryLedger,
        fail_read: bool,
        fail_append: bool,
        fail_delete: bool,
    }

    impl FailingLedger {
        fn new(inner: MemoryLedger) -> Self {
            Self {
                inner,
                fail_read: false,
                fail_append: false,
                fail_delete: false,
            }
        }
    }

    impl LedgerStore for FailingLedger {
        fn read_all(&self) -> Result<Vec<Vec<String>>, spesa_ledger::StoreError> {
            if self.fail_read {
                return Err(spesa_ledger::StoreError::Read("backend down".to_string()));
            }
            self.inner.read_all()
        }

        fn append_row(&mut self, row: &[String; 4]) -> Result<(), spesa_ledger::StoreError> {
            if self.fail_append {
                return Err(spesa_ledger::StoreError::Append("backend down".to_string()));
            }
            self.inner.append_row(row)
        }

        fn delete_row(&mut self, index: usize) -> Result<(), spesa_ledger::StoreError> {
            if self.fail_delete {
                return Err(spesa_ledger::StoreError::Delete("backend down".to_string()));
            }
            self.inner.delete_row(index)
        }
    }

    #[test]
    fn test_parse_plain_text_is_expense() {
        assert_eq!(
            Incoming::parse("Pizza 15 euro"),
            Incoming::Expense("Pizza 15 euro".to_string())
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Incoming::parse("/start"), Incoming::Command(Command::Start));
        assert_eq!(Incoming::parse("/undo"), Incoming::Command(Command::Undo));
        assert_eq!(Incoming::parse("/total"), Incoming::Command(Command::Total));
        assert_eq!(
            Incoming::parse("/report"),
            Incoming::Command(Command::Report(None))
        );
        assert_eq!(
            Incoming::parse("/report last month"),
            Incoming::Command(Command::Report(Some("last month".to_string())))
        );
        assert_eq!(
            Incoming::parse("/graph 03-2025"),
            Incoming::Command(Command::Graph(Some("03-2025".to_string())))
        );
        assert_eq!(
            Incoming::parse("/frobnicate"),
            Incoming::Command(Command::Unknown("/frobnicate".to_string()))
        );
    }

    #[tokio::test]
    async fn test_expense_saved_and_confirmed() {
        let client = MockInference::replying(
            r#"{"date": "16-03-2025", "category": "Food", "description": "Pizza", "amount": 15.0}"#,
        );
        let mut router = Router::new(client, MemoryLedger::with_header(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("Pizza 15 euro"), reference())
            .await;

        assert_eq!(reply, Reply::Text("Saved: [Pizza] - [15.00]".to_string()));
        let rows = router.store.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ["16-03-2025", "Food", "Pizza", "15.00"]);
    }

    #[tokio::test]
    async fn test_unparseable_expense_writes_nothing() {
        let client = MockInference::replying("not json at all");
        let mut router = Router::new(client, MemoryLedger::with_header(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("asdfghjkl"), reference())
            .await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::Unparseable.user_message())
        );
        assert_eq!(router.store.read_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_without_argument_uses_current_month() {
        let client = MockInference::failing(); // resolver must not be called
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router.handle(Incoming::parse("/report"), reference()).await;

        let Reply::Text(text) = reply else {
            panic!("expected text reply");
        };
        assert!(text.contains("03-2025"));
        assert!(text.contains("17.50"));
        assert!(text.contains("- Food: 15.00"));
        assert!(text.contains("- Transport: 2.50"));
        assert!(router.client.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_report_with_phrase_resolves_period() {
        let client = MockInference::replying(r#"{"target": "03-2025"}"#);
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("/report last month"), reference())
            .await;

        let Reply::Text(text) = reply else {
            panic!("expected text reply");
        };
        assert!(text.starts_with("Expenses for 03-2025: 17.50"));
    }

    #[tokio::test]
    async fn test_unresolvable_phrase_skips_aggregation() {
        let client = MockInference::replying(r#"{"target": null}"#);
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("/report bananas"), reference())
            .await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::Unresolvable.user_message())
        );
    }

    #[tokio::test]
    async fn test_empty_period_reports_no_expenses() {
        let client = MockInference::replying(r#"{"target": "01-2020"}"#);
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("/report january 2020"), reference())
            .await;

        let Reply::Text(text) = reply else {
            panic!("expected text reply");
        };
        assert!(text.contains("No expenses found for 01-2020"));
    }

    #[tokio::test]
    async fn test_graph_renders_chart_with_caption() {
        let client = MockInference::failing();
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router.handle(Incoming::parse("/graph"), reference()).await;

        let Reply::Chart { svg, caption } = reply else {
            panic!("expected chart reply");
        };
        assert_eq!(svg, b"<svg/>");
        assert_eq!(caption, "Expenses for 03-2025: 17.50");
        assert_eq!(router.chart.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_graph_on_empty_period_never_renders() {
        let client = MockInference::replying(r#"{"target": "01-2020"}"#);
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router
            .handle(Incoming::parse("/graph january 2020"), reference())
            .await;

        assert!(matches!(reply, Reply::Text(_)));
        assert_eq!(router.chart.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_undo_removes_last_entry() {
        let client = MockInference::failing();
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router.handle(Incoming::parse("/undo"), reference()).await;

        assert_eq!(
            reply,
            Reply::Text("Deleted last entry: [Bus] - [2,50]".to_string())
        );
        assert_eq!(router.store.read_all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_undo_on_header_only_ledger() {
        let client = MockInference::failing();
        let mut router = Router::new(client, MemoryLedger::with_header(), FakeChart::default());

        let reply = router.handle(Incoming::parse("/undo"), reference()).await;

        assert_eq!(
            reply,
            Reply::Text("Nothing to undo: the ledger is empty.".to_string())
        );
    }

    #[tokio::test]
    async fn test_total_over_whole_ledger() {
        let client = MockInference::failing();
        let mut router = Router::new(client, seeded_ledger(), FakeChart::default());

        let reply = router.handle(Incoming::parse("/total"), reference()).await;

        assert_eq!(reply, Reply::Text("Total expenses: 17.50".to_string()));
    }

    #[tokio::test]
    async fn test_append_failure_reports_store_unavailable() {
        let client = MockInference::replying(
            r#"{"date": "16-03-2025", "category": "Food", "description": "Pizza", "amount": 15.0}"#,
        );
        let mut store = FailingLedger::new(MemoryLedger::with_header());
        store.fail_append = true;
        let mut router = Router::new(client, store, FakeChart::default());

        let reply = router
            .handle(Incoming::parse("Pizza 15 euro"), reference())
            .await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::StoreUnavailable.user_message())
        );
        // Nothing was written.
        assert_eq!(router.store.inner.read_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_read_failure_reports_store_unavailable() {
        let client = MockInference::failing();
        let mut store = FailingLedger::new(seeded_ledger());
        store.fail_read = true;
        let mut router = Router::new(client, store, FakeChart::default());

        let reply = router.handle(Incoming::parse("/report"), reference()).await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::StoreUnavailable.user_message())
        );
    }

    #[tokio::test]
    async fn test_total_read_failure_reports_store_unavailable() {
        let client = MockInference::failing();
        let mut store = FailingLedger::new(seeded_ledger());
        store.fail_read = true;
        let mut router = Router::new(client, store, FakeChart::default());

        let reply = router.handle(Incoming::parse("/total"), reference()).await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::StoreUnavailable.user_message())
        );
    }

    #[tokio::test]
    async fn test_undo_delete_failure_reports_store_unavailable() {
        let client = MockInference::failing();
        let mut store = FailingLedger::new(seeded_ledger());
        store.fail_delete = true;
        let mut router = Router::new(client, store, FakeChart::default());

        let reply = router.handle(Incoming::parse("/undo"), reference()).await;

        assert_eq!(
            reply,
            Reply::Text(ReplyError::StoreUnavailable.user_message())
        );
        // The last row is still there.
        assert_eq!(router.store.inner.read_all().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_full_flow_against_file_ledger() {
        use spesa_ledger::CsvLedger;

        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::open(dir.path().join("ledger.csv")).unwrap();
        let client = MockInference::sequence(&[
            r#"{"date": "15-03-2025", "category": "Food", "description": "Pizza", "amount": 15.0}"#,
            r#"{"date": "16-03-2025", "category": "Transport", "description": "Bus", "amount": "2,50"}"#,
        ]);
        let mut router = Router::new(client, ledger, FakeChart::default());

        router
            .handle(Incoming::parse("Pizza 15 euro"), reference())
            .await;
        router
            .handle(Incoming::parse("Bus ticket 2,50"), reference())
            .await;

        let reply = router.handle(Incoming::parse("/report"), reference()).await;
        let Reply::Text(text) = reply else {
            panic!("expected text reply");
        };
        assert!(text.contains("17.50"));

        router.handle(Incoming::parse("/undo"), reference()).await;
        let reply = router.handle(Incoming::parse("/total"), reference()).await;
        assert_eq!(reply, Reply::Text("Total expenses: 15.00".to_string()));
    }

    #[tokio::test]
    async fn test_start_lists_commands() {
        let client = MockInference::failing();
        let mut router = Router::new(client, MemoryLedger::with_header(), FakeChart::default());

        let Reply::Text(text) = router.handle(Incoming::parse("/start"), reference()).await
        else {
            panic!("expected text reply");
        };
        for cmd in ["/report", "/graph", "/total", "/undo"] {
            assert!(text.contains(cmd), "missing {cmd}");
        }
    }
}
