//! Recognition gate: the pure accept/reject decision over a recognition
//! attempt's measurements.
//!
//! The gate receives confidence, liveness, and image quality as
//! already-computed inputs from an external matcher and compares each
//! against its threshold. All checks must pass independently; a rejection
//! reason enumerates **every** failing check with its measured and required
//! values, since that string is the user-visible diagnostic. The gate has no
//! state and is safe to call concurrently from any number of sessions.

use serde::Serialize;

/// Minimum match confidence for an attempt to be accepted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.93;

/// Minimum liveness score (anti-spoofing) for an attempt to be accepted.
pub const DEFAULT_LIVENESS_THRESHOLD: f64 = 0.80;

/// Minimum image quality. Quality is optional; an absent measurement is
/// treated as passing.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.75;

/// Threshold set applied by [`decide`].
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub confidence: f64,
    pub liveness: f64,
    pub quality: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE_THRESHOLD,
            liveness: DEFAULT_LIVENESS_THRESHOLD,
            quality: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

/// Outcome of a gate decision.
///
/// A rejection is a normal, reportable result, not an error: `reason` carries
/// the full diagnostic either way, and the per-check flags are persisted on
/// the attempt log row.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    pub accept: bool,
    pub reason: String,
    pub confidence_passed: bool,
    pub liveness_passed: bool,
    pub quality_passed: bool,
}

/// Render a unit-interval score as a whole percentage, e.g. `0.93` → `93%`.
fn pct(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Decide whether a recognition attempt is accepted.
///
/// All three checks must independently pass for `accept = true`. On
/// rejection the reason lists every failing check, not just the first.
pub fn decide(
    confidence: f64,
    liveness: f64,
    quality: Option<f64>,
    thresholds: &Thresholds,
) -> GateDecision {
    let confidence_passed = confidence >= thresholds.confidence;
    let liveness_passed = liveness >= thresholds.liveness;
    // Absent quality is treated as passing.
    let quality_passed = quality.is_none_or(|q| q >= thresholds.quality);

    let mut failures = Vec::new();
    if !confidence_passed {
        failures.push(format!(
            "confidence {} is below the required {}",
            pct(confidence),
            pct(thresholds.confidence)
        ));
    }
    if !liveness_passed {
        failures.push(format!(
            "liveness {} is below the required {}",
            pct(liveness),
            pct(thresholds.liveness)
        ));
    }
    if !quality_passed {
        // quality is Some here, otherwise the check passed.
        failures.push(format!(
            "image quality {} is below the required {}",
            pct(quality.unwrap_or_default()),
            pct(thresholds.quality)
        ));
    }

    let accept = failures.is_empty();
    let reason = if accept {
        "All recognition checks passed".to_string()
    } else {
        format!("Recognition rejected: {}", failures.join("; "))
    };

    GateDecision {
        accept,
        reason,
        confidence_passed,
        liveness_passed,
        quality_passed,
    }
}
