// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spend accounting for the Cortex model router.
//!
//! This crate provides:
//! - **Token ledger**: per-session, append-only record of every execution
//!   attempt with aggregate statistics and budget queries
//! - **Persistence**: best-effort sinks (SQLite or no-op) whose failures are
//!   logged and never reach the caller

pub mod ledger;
pub mod persistence;

pub use ledger::{Bucket, SessionStats, TokenLedger, TokenLedgerEntry, aggregate_usage};
pub use persistence::{
    NoopPersistence, PersistedIds, Persistence, SqlitePersistence, batch_persist_token_entries,
    persist_recorded_execution, persist_token_entry, persist_worker_execution, persist_worker_result,
};
