// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort persistence of ledger entries and worker results.
//!
//! The pipeline never depends on a write succeeding. Sinks implement the
//! fallible [`Persistence`] trait; callers use the free functions in this
//! module, which swallow and log failures and hand back `Option` ids.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cortex_config::model::StorageConfig;
use cortex_core::{CortexError, WorkerResult};
use tracing::{debug, info};

use crate::ledger::TokenLedgerEntry;

/// Maximum characters of the task summary stored with a worker result.
pub const SUMMARY_CHARS: usize = 100;

/// A destination for ledger entries and worker results.
#[async_trait]
pub trait Persistence: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Store one ledger entry and return its id.
    async fn persist_token_entry(&self, entry: &TokenLedgerEntry) -> Result<String, CortexError>;

    /// Store one worker result, optionally linked to its ledger entry.
    async fn persist_worker_result(
        &self,
        result: &WorkerResult,
        summary: &str,
        token_entry_id: Option<&str>,
    ) -> Result<String, CortexError>;
}

/// Ids returned by [`persist_worker_execution`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedIds {
    pub token_entry_id: Option<String>,
    pub worker_result_id: Option<String>,
}

/// A worker result may be re-run unless it failed on authentication.
pub fn is_rerunnable(result: &WorkerResult) -> bool {
    !result.error.as_deref().is_some_and(|e| e.contains("auth"))
}

/// First [`SUMMARY_CHARS`] characters of a task summary.
pub fn truncate_summary(summary: &str) -> String {
    summary.chars().take(SUMMARY_CHARS).collect()
}

/// Store a ledger entry, logging and discarding any failure.
pub async fn persist_token_entry(
    sink: &dyn Persistence,
    entry: &TokenLedgerEntry,
) -> Option<String> {
    match sink.persist_token_entry(entry).await {
        Ok(id) => {
            debug!(sink = sink.name(), id = %id, task_id = %entry.task_id, "token entry persisted");
            Some(id)
        }
        Err(e) => {
            debug!(
                sink = sink.name(),
                task_id = %entry.task_id,
                reason = %e,
                "persistence skipped (token entry)"
            );
            None
        }
    }
}

/// Store a worker result, logging and discarding any failure.
pub async fn persist_worker_result(
    sink: &dyn Persistence,
    result: &WorkerResult,
    summary: &str,
    token_entry_id: Option<&str>,
) -> Option<String> {
    let summary = truncate_summary(summary);
    match sink.persist_worker_result(result, &summary, token_entry_id).await {
        Ok(id) => {
            debug!(sink = sink.name(), id = %id, task_id = %result.task_id, "worker result persisted");
            Some(id)
        }
        Err(e) => {
            debug!(
                sink = sink.name(),
                task_id = %result.task_id,
                reason = %e,
                "persistence skipped (worker result)"
            );
            None
        }
    }
}

/// Store the ledger entry for `result`, then the result linked to it.
pub async fn persist_worker_execution(
    sink: &dyn Persistence,
    result: &WorkerResult,
    summary: &str,
) -> PersistedIds {
    let entry = TokenLedgerEntry::from_result(result);
    persist_recorded_execution(sink, &entry, result, summary).await
}

/// Like [`persist_worker_execution`], but stores an entry the in-memory
/// ledger already holds so both carry the same id.
pub async fn persist_recorded_execution(
    sink: &dyn Persistence,
    entry: &TokenLedgerEntry,
    result: &WorkerResult,
    summary: &str,
) -> PersistedIds {
    let token_entry_id = persist_token_entry(sink, entry).await;
    let worker_result_id =
        persist_worker_result(sink, result, summary, token_entry_id.as_deref()).await;
    PersistedIds {
        token_entry_id,
        worker_result_id,
    }
}

/// Store entries one by one; returns how many were written.
pub async fn batch_persist_token_entries(
    sink: &dyn Persistence,
    entries: &[TokenLedgerEntry],
) -> usize {
    let mut persisted = 0;
    for entry in entries {
        if persist_token_entry(sink, entry).await.is_some() {
            persisted += 1;
        }
    }
    info!(total = entries.len(), success = persisted, "batch persisted token entries");
    persisted
}

/// Sink used when storage is disabled. Every write fails softly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

#[async_trait]
impl Persistence for NoopPersistence {
    fn name(&self) -> &str {
        "noop"
    }

    async fn persist_token_entry(&self, _entry: &TokenLedgerEntry) -> Result<String, CortexError> {
        Err(CortexError::Storage {
            source: "storage disabled".into(),
        })
    }

    async fn persist_worker_result(
        &self,
        _result: &WorkerResult,
        _summary: &str,
        _token_entry_id: Option<&str>,
    ) -> Result<String, CortexError> {
        Err(CortexError::Storage {
            source: "storage disabled".into(),
        })
    }
}

/// Convert a tokio-rusqlite error into CortexError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CortexError {
    CortexError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS token_ledger (
    id TEXT PRIMARY KEY NOT NULL,
    task_id TEXT NOT NULL,
    model TEXT NOT NULL,
    provider TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    input_tokens INTEGER NOT NULL DEFAULT 0,
    output_tokens INTEGER NOT NULL DEFAULT 0,
    cost_usd REAL NOT NULL DEFAULT 0.0,
    latency_ms INTEGER NOT NULL DEFAULT 0,
    success INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_token_ledger_timestamp ON token_ledger(timestamp);
CREATE TABLE IF NOT EXISTS worker_results (
    id TEXT PRIMARY KEY NOT NULL,
    task_summary TEXT NOT NULL,
    task_id TEXT NOT NULL,
    model TEXT NOT NULL,
    provider TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    status TEXT NOT NULL,
    cost_usd REAL NOT NULL DEFAULT 0.0,
    latency_ms INTEGER NOT NULL DEFAULT 0,
    rerunnable INTEGER NOT NULL,
    token_entry_id TEXT REFERENCES token_ledger(id),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_worker_results_task ON worker_results(task_id);
";

/// SQLite sink. All statements run on tokio-rusqlite's background thread.
pub struct SqlitePersistence {
    conn: tokio_rusqlite::Connection,
}

impl SqlitePersistence {
    /// Open (or create) the database file and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CortexError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CortexError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CortexError::Storage {
                source: Box::new(e),
            })?;
        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, CortexError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| CortexError::Storage {
                source: Box::new(e),
            })?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self, CortexError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Most recent ledger entries, newest first.
    pub async fn recent_token_entries(
        &self,
        limit: usize,
    ) -> Result<Vec<TokenLedgerEntry>, CortexError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<RawEntry>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, task_id, model, provider, endpoint, input_tokens, \
                     output_tokens, cost_usd, latency_ms, success, timestamp \
                     FROM token_ledger ORDER BY timestamp DESC LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![limit], |row| {
                        Ok(RawEntry {
                            id: row.get(0)?,
                            task_id: row.get(1)?,
                            model: row.get(2)?,
                            provider: row.get(3)?,
                            endpoint: row.get(4)?,
                            input_tokens: row.get(5)?,
                            output_tokens: row.get(6)?,
                            cost_usd: row.get(7)?,
                            latency_ms: row.get(8)?,
                            success: row.get(9)?,
                            timestamp: row.get(10)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;

        rows.into_iter().map(RawEntry::into_entry).collect()
    }

    /// Spend across the most recent `limit` entries.
    pub async fn total_spend(&self, limit: usize) -> Result<f64, CortexError> {
        let entries = self.recent_token_entries(limit).await?;
        Ok(entries.iter().fold(0.0, |acc, e| acc + e.cost_usd))
    }
}

struct RawEntry {
    id: String,
    task_id: String,
    model: String,
    provider: String,
    endpoint: String,
    input_tokens: u32,
    output_tokens: u32,
    cost_usd: f64,
    latency_ms: i64,
    success: bool,
    timestamp: String,
}

impl RawEntry {
    fn into_entry(self) -> Result<TokenLedgerEntry, CortexError> {
        let corrupt = |field: &str, value: &str| CortexError::Storage {
            source: format!("invalid {field} in token_ledger: {value}").into(),
        };
        Ok(TokenLedgerEntry {
            model: self.model.parse().map_err(|_| corrupt("model", &self.model))?,
            provider: self
                .provider
                .parse()
                .map_err(|_| corrupt("provider", &self.provider))?,
            endpoint: self
                .endpoint
                .parse()
                .map_err(|_| corrupt("endpoint", &self.endpoint))?,
            timestamp: DateTime::parse_from_rfc3339(&self.timestamp)
                .map_err(|_| corrupt("timestamp", &self.timestamp))?
                .with_timezone(&Utc),
            id: self.id,
            task_id: self.task_id,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cost_usd: self.cost_usd,
            latency_ms: u64::try_from(self.latency_ms).unwrap_or_default(),
            success: self.success,
        })
    }
}

fn to_sql_millis(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

#[async_trait]
impl Persistence for SqlitePersistence {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn persist_token_entry(&self, entry: &TokenLedgerEntry) -> Result<String, CortexError> {
        let e = entry.clone();
        let id = e.id.clone();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO token_ledger (id, task_id, model, provider, endpoint, \
                     input_tokens, output_tokens, cost_usd, latency_ms, success, timestamp) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    rusqlite::params![
                        e.id,
                        e.task_id,
                        e.model.as_str(),
                        e.provider.to_string(),
                        e.endpoint.to_string(),
                        e.input_tokens,
                        e.output_tokens,
                        e.cost_usd,
                        to_sql_millis(e.latency_ms),
                        e.success,
                        e.timestamp.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(id)
    }

    async fn persist_worker_result(
        &self,
        result: &WorkerResult,
        summary: &str,
        token_entry_id: Option<&str>,
    ) -> Result<String, CortexError> {
        let id = uuid::Uuid::new_v4().to_string();
        let row_id = id.clone();
        let summary = summary.to_string();
        let task_id = result.task_id.clone();
        let model = result.model.as_str();
        let provider = result.provider.to_string();
        let endpoint = result.endpoint.to_string();
        let status = if result.success { "Success" } else { "Failed" };
        let cost_usd = result.usage.cost;
        let latency_ms = to_sql_millis(result.latency_ms);
        let rerunnable = is_rerunnable(result);
        let token_entry_id = token_entry_id.map(str::to_string);
        let created_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO worker_results (id, task_summary, task_id, model, provider, \
                     endpoint, status, cost_usd, latency_ms, rerunnable, token_entry_id, \
                     created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    rusqlite::params![
                        row_id,
                        summary,
                        task_id,
                        model,
                        provider,
                        endpoint,
                        status,
                        cost_usd,
                        latency_ms,
                        rerunnable,
                        token_entry_id,
                        created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(id)
    }
}

/// Build the sink selected by configuration.
///
/// A database that cannot be opened degrades to [`NoopPersistence`].
pub async fn from_config(config: &StorageConfig) -> Box<dyn Persistence> {
    if !config.enabled {
        return Box::new(NoopPersistence);
    }
    match SqlitePersistence::open(&config.database_path).await {
        Ok(sink) => {
            info!(path = %config.database_path, "sqlite persistence enabled");
            Box::new(sink)
        }
        Err(e) => {
            tracing::warn!(path = %config.database_path, error = %e, "persistence unavailable, continuing without it");
            Box::new(NoopPersistence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::{Endpoint, ModelId, Provider, TokenUsage};
    use tracing_test::traced_test;

    fn result(success: bool, error: Option<&str>) -> WorkerResult {
        WorkerResult {
            task_id: "task_1_abcdef".into(),
            success,
            content: success.then(|| "done".to_string()),
            tool_calls: vec![],
            parsed_json: None,
            usage: TokenUsage::new(100, 50, if success { 0.0003 } else { 0.0 }),
            latency_ms: 900,
            model: ModelId::ClaudeHaiku35,
            provider: Provider::Anthropic,
            endpoint: Endpoint::Direct,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn rerunnable_unless_auth_error() {
        assert!(is_rerunnable(&result(true, None)));
        assert!(is_rerunnable(&result(false, Some("503 Service Unavailable"))));
        assert!(!is_rerunnable(&result(false, Some("authentication_error: bad key"))));
    }

    #[test]
    fn summary_is_truncated_by_chars() {
        let long = "é".repeat(150);
        assert_eq!(truncate_summary(&long).chars().count(), SUMMARY_CHARS);
        assert_eq!(truncate_summary("short"), "short");
    }

    #[tokio::test]
    async fn noop_sink_yields_no_ids() {
        let ids = persist_worker_execution(&NoopPersistence, &result(true, None), "task").await;
        assert_eq!(ids, PersistedIds::default());
    }

    #[tokio::test]
    async fn sqlite_round_trips_entries() {
        let sink = SqlitePersistence::open_in_memory().await.unwrap();
        let entry = TokenLedgerEntry::from_result(&result(true, None));
        let id = sink.persist_token_entry(&entry).await.unwrap();
        assert_eq!(id, entry.id);

        let recent = sink.recent_token_entries(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].task_id, entry.task_id);
        assert_eq!(recent[0].model, ModelId::ClaudeHaiku35);
        assert_eq!(recent[0].endpoint, Endpoint::Direct);
        assert_eq!(recent[0].latency_ms, 900);
        assert!((recent[0].cost_usd - 0.0003).abs() < 1e-12);
    }

    #[tokio::test]
    async fn execution_links_result_to_entry() {
        let sink = SqlitePersistence::open_in_memory().await.unwrap();
        let ids = persist_worker_execution(&sink, &result(true, None), "summarize inbox").await;
        assert!(ids.token_entry_id.is_some());
        assert!(ids.worker_result_id.is_some());

        let linked = ids.token_entry_id.clone().unwrap();
        let count: i64 = sink
            .conn
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM worker_results WHERE token_entry_id = ?1",
                    rusqlite::params![linked],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn recorded_execution_keeps_ledger_id() {
        let ledger = crate::TokenLedger::new();
        let outcome = result(true, None);
        let entry = ledger.record(&outcome).await;

        let sink = SqlitePersistence::open_in_memory().await.unwrap();
        let ids = persist_recorded_execution(&sink, &entry, &outcome, "summarize inbox").await;
        assert_eq!(ids.token_entry_id.as_deref(), Some(entry.id.as_str()));

        let stored = sink.recent_token_entries(1).await.unwrap();
        assert_eq!(stored[0].id, ledger.entries().await[0].id);
        assert_eq!(stored[0].timestamp, entry.timestamp);
    }

    #[tokio::test]
    async fn total_spend_sums_recent_entries() {
        let sink = SqlitePersistence::open_in_memory().await.unwrap();
        let entries: Vec<TokenLedgerEntry> = (0..3)
            .map(|_| TokenLedgerEntry::from_result(&result(true, None)))
            .collect();
        assert_eq!(batch_persist_token_entries(&sink, &entries).await, 3);
        let total = sink.total_spend(100).await.unwrap();
        assert!((total - 0.0009).abs() < 1e-12);
    }

    #[tokio::test]
    async fn duplicate_entry_fails_softly() {
        let sink = SqlitePersistence::open_in_memory().await.unwrap();
        let entry = TokenLedgerEntry::from_result(&result(true, None));
        let entries = vec![entry.clone(), entry];
        assert_eq!(batch_persist_token_entries(&sink, &entries).await, 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn swallowed_failures_are_logged() {
        let entry = TokenLedgerEntry::from_result(&result(false, Some("timeout")));
        assert!(persist_token_entry(&NoopPersistence, &entry).await.is_none());
        assert!(logs_contain("persistence skipped (token entry)"));
        assert!(logs_contain("storage disabled"));
    }

    #[tokio::test]
    async fn disabled_storage_builds_noop() {
        let config = StorageConfig {
            enabled: false,
            database_path: String::new(),
        };
        assert_eq!(from_config(&config).await.name(), "noop");
    }
}
