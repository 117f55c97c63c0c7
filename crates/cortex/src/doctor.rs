// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cortex doctor` command implementation.
//!
//! Runs diagnostic checks against the loaded configuration: catalog
//! integrity, credential availability, routing order, storage and the
//! allocator's memory footprint.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use cortex_config::{CortexConfig, Credentials};
use cortex_core::{Endpoint, Provider};
use cortex_cost::SqlitePersistence;
use cortex_router::{ProviderRouter, provider_display_name};

/// Ledger rows sampled when reporting recorded spend.
const SPEND_SAMPLE: usize = 1000;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run every check and print the report. Returns the number of failures.
pub async fn run_doctor(config: &CortexConfig, plain: bool) -> usize {
    let use_color = !plain && std::io::stdout().is_terminal();
    let credentials = Credentials::from_config(config);
    let router = ProviderRouter::from_config(config, &credentials);

    let mut results = vec![check_catalog()];
    results.extend(check_credentials(&credentials));
    results.push(check_routing(&router));
    results.push(check_routing_order(&router));
    results.push(check_storage(config).await);
    results.push(check_memory());

    print!("{}", render_report(&results, use_color));
    results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count()
}

fn render_report(results: &[CheckResult], use_color: bool) -> String {
    use colored::Colorize;

    let mut out = String::new();
    out.push_str("\n  cortex doctor\n");
    out.push_str(&format!("  {}\n", "-".repeat(50)));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let (symbol, message) = match (&result.status, use_color) {
            (CheckStatus::Pass, true) => ("✓".green().to_string(), result.message.clone()),
            (CheckStatus::Warn, true) => ("!".yellow().to_string(), result.message.yellow().to_string()),
            (CheckStatus::Fail, true) => ("✗".red().to_string(), result.message.red().to_string()),
            (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
            (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
            (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        out.push_str(&format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)\n",
            result.name
        ));
    }

    out.push('\n');
    if issues > 0 {
        let word = if issues == 1 { "issue" } else { "issues" };
        out.push_str(&format!("  {issues} {word} found.\n"));
    } else {
        out.push_str("  All checks passed.\n");
    }
    out.push('\n');
    out
}

fn check_catalog() -> CheckResult {
    let start = Instant::now();
    match cortex_catalog::verify_catalog() {
        Ok(()) => CheckResult::new(
            "Catalog",
            CheckStatus::Pass,
            format!("{} models", cortex_catalog::all_models().len()),
            start,
        ),
        Err(issues) => {
            let first = issues.first().map(ToString::to_string).unwrap_or_default();
            CheckResult::new(
                "Catalog",
                CheckStatus::Fail,
                format!("{} issue(s), first: {first}", issues.len()),
                start,
            )
        }
    }
}

fn check_credentials(credentials: &Credentials) -> Vec<CheckResult> {
    [Provider::Anthropic, Provider::OpenAi, Provider::OpenRouter]
        .into_iter()
        .map(|provider| {
            let start = Instant::now();
            let name = format!("{} key", provider_display_name(provider));
            if credentials.is_available(provider) {
                CheckResult::new(&name, CheckStatus::Pass, "configured", start)
            } else {
                CheckResult::new(&name, CheckStatus::Warn, "not configured", start)
            }
        })
        .collect()
}

fn check_routing(router: &ProviderRouter) -> CheckResult {
    let start = Instant::now();
    let health = router.health();
    let status = if health.healthy {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    };
    CheckResult::new("Routing", status, health.summary, start)
}

fn check_routing_order(router: &ProviderRouter) -> CheckResult {
    let start = Instant::now();
    let order: Vec<String> = [Provider::Anthropic, Provider::OpenAi]
        .into_iter()
        .map(|provider| {
            let steps: Vec<String> = router
                .routing_order(provider)
                .iter()
                .map(Endpoint::to_string)
                .collect();
            format!("{}: {}", provider_display_name(provider), steps.join(" → "))
        })
        .collect();
    CheckResult::new("Routing order", CheckStatus::Pass, order.join("; "), start)
}

async fn check_storage(config: &CortexConfig) -> CheckResult {
    let start = Instant::now();
    if !config.storage.enabled {
        return CheckResult::new(
            "Storage",
            CheckStatus::Pass,
            "disabled (ledger kept in memory)",
            start,
        );
    }

    let path = Path::new(&config.storage.database_path);
    if !path.exists() {
        return CheckResult::new(
            "Storage",
            CheckStatus::Warn,
            format!(
                "not found: {} (will be created on first run)",
                path.display()
            ),
            start,
        );
    }

    let sink = match SqlitePersistence::open(path).await {
        Ok(sink) => sink,
        Err(e) => return CheckResult::new("Storage", CheckStatus::Fail, format!("open failed: {e}"), start),
    };
    match sink.total_spend(SPEND_SAMPLE).await {
        Ok(spend) => CheckResult::new(
            "Storage",
            CheckStatus::Pass,
            format!("connected, ${spend:.4} recorded"),
            start,
        ),
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// Heap and resident size as reported by jemalloc.
fn check_memory() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);
        CheckResult::new(
            "Memory",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new("Memory", CheckStatus::Warn, "jemalloc not available on MSVC", start)
    }
}
