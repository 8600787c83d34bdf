//! P95 latency severity tiers.
//!
//! Used to colour scatter points and percentile curves. Every threshold is
//! inclusive: a P95 exactly on a boundary belongs to the faster tier.

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of [`SeverityTier::Fast`], in milliseconds.
pub const FAST_P95_MS: f64 = 300.0;
/// Upper bound (inclusive) of [`SeverityTier::Moderate`], in milliseconds.
pub const MODERATE_P95_MS: f64 = 1_000.0;
/// Upper bound (inclusive) of [`SeverityTier::Slow`], in milliseconds.
pub const SLOW_P95_MS: f64 = 5_000.0;
/// Upper bound (inclusive) of [`SeverityTier::VerySlow`], in milliseconds.
pub const VERY_SLOW_P95_MS: f64 = 10_000.0;

/// Five fixed latency classes derived from a P95 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    /// `p95 <= 300 ms`
    Fast,
    /// `300 ms < p95 <= 1000 ms`
    Moderate,
    /// `1000 ms < p95 <= 5000 ms`
    Slow,
    /// `5000 ms < p95 <= 10000 ms`
    VerySlow,
    /// `p95 > 10000 ms`
    Critical,
}

impl SeverityTier {
    /// Classify a P95 latency in milliseconds.
    ///
    /// NaN fails every comparison and lands in [`SeverityTier::Critical`].
    pub fn from_p95(p95_ms: f64) -> Self {
        if p95_ms <= FAST_P95_MS {
            SeverityTier::Fast
        } else if p95_ms <= MODERATE_P95_MS {
            SeverityTier::Moderate
        } else if p95_ms <= SLOW_P95_MS {
            SeverityTier::Slow
        } else if p95_ms <= VERY_SLOW_P95_MS {
            SeverityTier::VerySlow
        } else {
            SeverityTier::Critical
        }
    }

    /// One-based tier number, 1 (fastest) to 5 (slowest).
    pub fn rank(self) -> u8 {
        match self {
            SeverityTier::Fast => 1,
            SeverityTier::Moderate => 2,
            SeverityTier::Slow => 3,
            SeverityTier::VerySlow => 4,
            SeverityTier::Critical => 5,
        }
    }

    /// Hex colour for the tier: green, blue, yellow, orange, red.
    pub fn color(self) -> &'static str {
        match self {
            SeverityTier::Fast => "#22c55e",
            SeverityTier::Moderate => "#3b82f6",
            SeverityTier::Slow => "#eab308",
            SeverityTier::VerySlow => "#f97316",
            SeverityTier::Critical => "#ef4444",
        }
    }
}
