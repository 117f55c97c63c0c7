// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams of the routing pipeline.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` and swapped for mocks in tests.

pub mod executor;
pub mod provider;

pub use executor::Execute;
pub use provider::ProviderAdapter;
