// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cortex integration tests.
//!
//! Provides test doubles and harness infrastructure for fast,
//! deterministic tests without network access.
//!
//! # Components
//!
//! - [`MockExecutor`] - scripted executor that records every request
//! - [`RecordingPersistence`] - in-memory persistence sink
//! - [`TestHarness`] - a supervisor wired to both

pub mod harness;
pub mod mock_executor;
pub mod recording_persistence;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_executor::{MockExecutor, MockOutcome};
pub use recording_persistence::{RecordedResult, RecordingPersistence};
