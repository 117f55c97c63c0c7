// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-stage heuristic validation of model output.
//!
//! Stage 1 (spec compliance) asks whether the response answers the request
//! at all. Stage 2 (output quality) looks for filler, verbosity and stray
//! formatting. Both score 0-100 and pass at [`PASS_THRESHOLD`].

use cortex_core::{ValidationResult, ValidationStage};

pub const PASS_THRESHOLD: u8 = 60;

/// Inputs longer than this expect more than a token reply.
const LONG_INPUT_CHARS: usize = 100;
const BRIEF_RESPONSE_CHARS: usize = 20;
const VERBOSE_RESPONSE_CHARS: usize = 2000;
/// More fences than this is more code than a chat reply should carry.
const MAX_CODE_FENCES: usize = 3;

const REFUSALS: &[&str] = &["I cannot", "I'm unable"];
const FILLER: &[&str] = &[
    "I'd be happy to",
    "Great question",
    "Certainly!",
    "Of course!",
    "Let me help",
];

fn finish(stage: ValidationStage, score: i32, issues: Vec<String>, suggestion: &str) -> ValidationResult {
    let score = score.clamp(0, 100) as u8;
    let suggestions = if issues.is_empty() {
        Vec::new()
    } else {
        vec![suggestion.to_string()]
    };
    ValidationResult {
        stage,
        passed: score >= PASS_THRESHOLD,
        score,
        issues,
        suggestions,
    }
}

/// Stage 1: does `content` plausibly satisfy `input`?
pub fn validate_spec_compliance(input: &str, content: &str) -> ValidationResult {
    let mut issues = Vec::new();
    let mut score = 100;

    if content.trim().is_empty() {
        issues.push("Empty response".to_string());
        score -= 50;
    }

    let length = content.chars().count();
    if length > 0 && length < BRIEF_RESPONSE_CHARS && input.chars().count() > LONG_INPUT_CHARS {
        issues.push("Response may be too brief".to_string());
        score -= 20;
    }

    if REFUSALS.iter().any(|r| content.contains(r)) {
        issues.push("Response indicates inability to complete".to_string());
        score -= 30;
    }

    finish(
        ValidationStage::SpecCompliance,
        score,
        issues,
        "Try with a more capable model",
    )
}

/// Stage 2: is `content` tight and well-formed?
pub fn validate_output_quality(content: &str) -> ValidationResult {
    let mut issues = Vec::new();
    let mut score = 80;

    if FILLER.iter().any(|f| content.contains(f)) {
        issues.push("Contains filler phrases".to_string());
        score -= 10;
    }

    if content.chars().count() > VERBOSE_RESPONSE_CHARS {
        issues.push("Response may be too verbose".to_string());
        score -= 10;
    }

    if content.matches("```").count() > MAX_CODE_FENCES {
        issues.push("Excessive code blocks".to_string());
        score -= 5;
    }

    finish(
        ValidationStage::OutputQuality,
        score,
        issues,
        "Consider refining the response",
    )
}
