// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly.

use cortex_core::TaskProfile;

/// Persona used when `agent.system_prompt` is not configured.
pub const DEFAULT_PERSONA: &str =
    "You are a concise personal assistant. Be concise and direct. This is a mobile interface.";

const JSON_ONLY: &str = "Return valid JSON only, no markdown.";
const CODE_GUIDANCE: &str =
    "When providing code, follow the conventions of the language in use and best practices.";
const BRIEF: &str = "Keep responses brief - under 100 words if possible.";

/// The persona plus instructions implied by the profile, space-separated.
pub fn build_system_prompt(persona: &str, profile: &TaskProfile) -> String {
    let mut parts = vec![persona.trim()];
    if profile.capabilities.structured_output {
        parts.push(JSON_ONLY);
    }
    if profile.capabilities.code {
        parts.push(CODE_GUIDANCE);
    }
    if profile.latency_sensitive {
        parts.push(BRIEF);
    }
    parts.join(" ")
}
