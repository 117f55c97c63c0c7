// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence sink that remembers every write.

use async_trait::async_trait;
use cortex_core::{CortexError, WorkerResult};
use cortex_cost::{Persistence, TokenLedgerEntry};
use tokio::sync::Mutex;

/// A stored worker result with its summary and linked entry id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedResult {
    pub result: WorkerResult,
    pub summary: String,
    pub token_entry_id: Option<String>,
}

/// Records writes, or rejects them all when built with [`failing`](Self::failing).
#[derive(Default)]
pub struct RecordingPersistence {
    entries: Mutex<Vec<TokenLedgerEntry>>,
    results: Mutex<Vec<RecordedResult>>,
    fail: bool,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write returns a storage error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn token_entries(&self) -> Vec<TokenLedgerEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn worker_results(&self) -> Vec<RecordedResult> {
        self.results.lock().await.clone()
    }

    fn check(&self) -> Result<(), CortexError> {
        if self.fail {
            return Err(CortexError::Storage {
                source: "recording sink configured to fail".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Persistence for RecordingPersistence {
    fn name(&self) -> &str {
        "recording"
    }

    async fn persist_token_entry(&self, entry: &TokenLedgerEntry) -> Result<String, CortexError> {
        self.check()?;
        self.entries.lock().await.push(entry.clone());
        Ok(entry.id.clone())
    }

    async fn persist_worker_result(
        &self,
        result: &WorkerResult,
        summary: &str,
        token_entry_id: Option<&str>,
    ) -> Result<String, CortexError> {
        self.check()?;
        let mut results = self.results.lock().await;
        results.push(RecordedResult {
            result: result.clone(),
            summary: summary.to_string(),
            token_entry_id: token_entry_id.map(str::to_string),
        });
        Ok(format!("result-{}", results.len()))
    }
}
