// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory token ledger for one session.
//!
//! Every worker result, successful or not, is appended as a
//! [`TokenLedgerEntry`] and folded into running [`SessionStats`]. The append
//! and the aggregate update happen under one async mutex so concurrent
//! workers never observe a half-applied record.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cortex_core::{Endpoint, ModelId, Provider, TokenUsage, WorkerResult};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One recorded execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLedgerEntry {
    /// Unique entry identifier (UUID v4).
    pub id: String,
    pub task_id: String,
    pub model: ModelId,
    pub provider: Provider,
    pub endpoint: Endpoint,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl TokenLedgerEntry {
    /// Snapshot a worker result, stamped now.
    pub fn from_result(result: &WorkerResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: result.task_id.clone(),
            model: result.model,
            provider: result.provider,
            endpoint: result.endpoint,
            input_tokens: result.usage.input_tokens,
            output_tokens: result.usage.output_tokens,
            cost_usd: result.usage.cost,
            latency_ms: result.latency_ms,
            success: result.success,
            timestamp: Utc::now(),
        }
    }
}

/// Running totals for one model or provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub tokens: u64,
    pub cost: f64,
    pub count: u64,
}

impl Bucket {
    fn add(&mut self, entry: &TokenLedgerEntry) {
        self.tokens += u64::from(entry.input_tokens) + u64::from(entry.output_tokens);
        self.cost += entry.cost_usd;
        self.count += 1;
    }
}

/// Aggregates for the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
    pub request_count: u64,
    pub by_model: BTreeMap<ModelId, Bucket>,
    /// Every provider is present, zeroed until used.
    pub by_provider: BTreeMap<Provider, Bucket>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cost: 0.0,
            request_count: 0,
            by_model: BTreeMap::new(),
            by_provider: Provider::iter().map(|p| (p, Bucket::default())).collect(),
        }
    }
}

impl SessionStats {
    fn apply(&mut self, entry: &TokenLedgerEntry) {
        self.total_input_tokens += u64::from(entry.input_tokens);
        self.total_output_tokens += u64::from(entry.output_tokens);
        self.total_cost += entry.cost_usd;
        self.request_count += 1;
        self.by_model.entry(entry.model).or_default().add(entry);
        self.by_provider.entry(entry.provider).or_default().add(entry);
    }
}

struct LedgerState {
    entries: Vec<TokenLedgerEntry>,
    session_start: DateTime<Utc>,
    stats: SessionStats,
}

impl LedgerState {
    fn fresh() -> Self {
        Self {
            entries: Vec::new(),
            session_start: Utc::now(),
            stats: SessionStats::default(),
        }
    }
}

/// Append-only session ledger. Share it behind an `Arc`.
pub struct TokenLedger {
    state: Mutex<LedgerState>,
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenLedger").finish_non_exhaustive()
    }
}

impl TokenLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::fresh()),
        }
    }

    /// Append a result and update the session aggregates.
    pub async fn record(&self, result: &WorkerResult) -> TokenLedgerEntry {
        let entry = TokenLedgerEntry::from_result(result);
        let mut state = self.state.lock().await;
        state.stats.apply(&entry);
        state.entries.push(entry.clone());
        drop(state);

        debug!(
            task_id = %entry.task_id,
            model = %entry.model,
            cost_usd = entry.cost_usd,
            success = entry.success,
            "token ledger entry recorded"
        );
        entry
    }

    pub async fn stats(&self) -> SessionStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn entries(&self) -> Vec<TokenLedgerEntry> {
        self.state.lock().await.entries.clone()
    }

    /// Entries recorded strictly after `since`.
    pub async fn unflushed_entries(&self, since: DateTime<Utc>) -> Vec<TokenLedgerEntry> {
        self.state
            .lock()
            .await
            .entries
            .iter()
            .filter(|e| e.timestamp > since)
            .cloned()
            .collect()
    }

    pub async fn session_duration(&self) -> Duration {
        let start = self.state.lock().await.session_start;
        (Utc::now() - start).to_std().unwrap_or_default()
    }

    /// True when session spend is strictly above `threshold`.
    pub async fn is_over_budget(&self, threshold: f64) -> bool {
        self.state.lock().await.stats.total_cost > threshold
    }

    /// Budget left, floored at zero.
    pub async fn remaining_budget(&self, budget: f64) -> f64 {
        (budget - self.state.lock().await.stats.total_cost).max(0.0)
    }

    /// Drop all entries and start a new session.
    pub async fn reset(&self) {
        *self.state.lock().await = LedgerState::fresh();
        info!("token ledger reset");
    }

    /// Multi-line session report for terminals and chat replies.
    pub async fn summary(&self) -> String {
        let (stats, start) = {
            let state = self.state.lock().await;
            (state.stats.clone(), state.session_start)
        };
        let minutes = (Utc::now() - start).num_milliseconds().max(0) as f64 / 60_000.0;
        format_summary(&stats, minutes)
    }
}

fn format_summary(stats: &SessionStats, minutes: f64) -> String {
    let cost = if stats.total_cost > 0.0 {
        format!("${:.4}", stats.total_cost)
    } else {
        "$0.00".to_string()
    };

    let mut lines = vec![
        format!(
            "Session: {minutes:.1} min | {} requests | {cost}",
            stats.request_count
        ),
        format!(
            "Tokens: {} in / {} out",
            group_thousands(stats.total_input_tokens),
            group_thousands(stats.total_output_tokens)
        ),
    ];

    let mut models: Vec<(&ModelId, &Bucket)> = stats.by_model.iter().collect();
    models.sort_by(|a, b| b.1.cost.total_cmp(&a.1.cost));
    if !models.is_empty() {
        lines.push("Top models:".to_string());
        for (model, bucket) in models.into_iter().take(3) {
            lines.push(format!("  {model}: {}x, ${:.4}", bucket.count, bucket.cost));
        }
    }

    lines.join("\n")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Sum usage across results.
pub fn aggregate_usage(results: &[WorkerResult]) -> TokenUsage {
    results.iter().fold(TokenUsage::default(), |mut acc, r| {
        acc.accumulate(&r.usage);
        acc
    })
}
