// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cortex run`, `cortex batch` and `cortex models`.

use std::path::Path;

use cortex_config::{CortexConfig, Credentials};
use cortex_core::CortexError;
use cortex_router::{provider_display_name, tier_label};
use cortex_supervisor::{Supervisor, SupervisorRequest, SupervisorResponse};

async fn supervisor(config: &CortexConfig) -> Result<Supervisor, CortexError> {
    let credentials = Credentials::from_config(config);
    Supervisor::from_config(config, &credentials).await
}

/// Run one request and print the answer followed by the session summary.
///
/// Returns whether the request succeeded.
pub async fn run(
    config: &CortexConfig,
    request: SupervisorRequest,
    json: bool,
) -> Result<bool, CortexError> {
    let supervisor = supervisor(config).await?;
    let response = supervisor.supervise(&request).await;

    if json {
        println!("{}", to_json(&response)?);
    } else {
        println!("{}", render_response(&response));
        println!();
        println!("{}", supervisor.ledger().summary().await);
    }

    supervisor.drain().await;
    Ok(response.success)
}

/// Run every non-empty line of `path` through the parallel dispatcher.
///
/// Returns whether every request succeeded.
pub async fn batch(config: &CortexConfig, path: &Path, json: bool) -> Result<bool, CortexError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CortexError::Config(format!("cannot read {}: {e}", path.display())))?;
    let requests = parse_batch(&text);
    if requests.is_empty() {
        eprintln!("cortex: {} contains no requests", path.display());
        return Ok(true);
    }

    let supervisor = supervisor(config).await?;
    let responses = supervisor.supervise_parallel(&requests).await;

    if json {
        println!("{}", to_json(&responses)?);
    } else {
        print!("{}", render_batch(&requests, &responses));
        println!("{}", supervisor.ledger().summary().await);
    }

    supervisor.drain().await;
    Ok(responses.iter().all(|r| r.success))
}

/// One request per non-empty, trimmed line.
pub fn parse_batch(text: &str) -> Vec<SupervisorRequest> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(SupervisorRequest::new)
        .collect()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CortexError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CortexError::Internal(format!("failed to encode response: {e}")))
}

/// Human-readable rendering of one response.
pub fn render_response(response: &SupervisorResponse) -> String {
    let mut out = String::new();
    if let Some(content) = &response.content {
        out.push_str(content);
    }
    if response.needs_review {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Needs review: ");
        out.push_str(response.review_reason.as_deref().unwrap_or("no reason given"));
    }

    let model = response
        .final_model()
        .map_or_else(|| "no model".to_string(), |m| m.to_string());
    out.push_str(&format!(
        "\n[{} | {model} | ${:.4} | {}ms]",
        response.outcome, response.total_cost, response.total_latency_ms
    ));
    out
}

fn render_batch(requests: &[SupervisorRequest], responses: &[SupervisorResponse]) -> String {
    let mut out = String::new();
    for (i, (request, response)) in requests.iter().zip(responses).enumerate() {
        out.push_str(&format!("#{} {}\n", i + 1, request.input));
        out.push_str(&render_response(response));
        out.push_str("\n\n");
    }
    out
}

/// The catalog as a fixed-width table.
pub fn models_table() -> String {
    let mut out = format!(
        "{:<26} {:<11} {:<10} {:>8} {:>9} {:>9}  {}\n",
        "MODEL", "PROVIDER", "TIER", "CONTEXT", "IN/MTOK", "OUT/MTOK", "AGGREGATOR ID"
    );
    for spec in cortex_catalog::all_models() {
        let context = spec
            .context_window
            .map_or_else(|| "-".to_string(), |n| format!("{}k", n / 1000));
        out.push_str(&format!(
            "{:<26} {:<11} {:<10} {:>8} {:>9.2} {:>9.2}  {}\n",
            spec.id.as_str(),
            provider_display_name(spec.provider),
            tier_label(spec.id),
            context,
            spec.input_per_mtok,
            spec.output_per_mtok,
            spec.aggregator_id.unwrap_or("-"),
        ));
    }
    out
}
