use crate::netlist::Signal;
use serde::{Deserialize, Serialize};

/// Level reported for a net that two or more drivers disagree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictFallback {
    /// Any driver pulling low wins.
    WiredAnd,
    /// Any driver pulling high wins.
    WiredOr,
    /// The net reads as if it were floating.
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    pub fallback: ConflictFallback,
    /// Return conflicts as errors instead of reporting them as faults.
    pub strict: bool,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        ConflictPolicy {
            fallback: ConflictFallback::WiredAnd,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    /// Every tick advances a single phase.
    SingleStep,
    /// Every tick advances `phases_per_tick` phases, stopping early on halt.
    FreeRun { phases_per_tick: usize },
}

/// Runtime knobs of a simulation.
///
/// Every field has a default, so a partial document deserializes:
/// ```
/// # use ttlsim::{ConflictFallback, SimConfig};
/// let config: SimConfig = serde_json::from_str(r#"{ "conflict": { "fallback": "WiredOr" } }"#).unwrap();
///
/// assert_eq!(config.conflict.fallback, ConflictFallback::WiredOr);
/// assert_eq!(config.phases, SimConfig::default().phases);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Level read from a net with no active driver.
    pub floating_level: Signal,
    pub conflict: ConflictPolicy,
    /// Settle passes allowed per part before the circuit is declared divergent.
    pub settle_factor: usize,
    /// Clock edge batches allowed to follow each other within a single phase.
    pub edge_cascade_limit: usize,
    /// Clock phases per machine cycle, at least 2.
    pub phases: usize,
    pub clock_mode: ClockMode,
    /// Advisory rate for callers driving [ClockMode::FreeRun], never used by the core.
    pub frequency_hz: u32,
}

/// Fewest settle passes ever allowed, for very small circuits.
pub const MIN_SETTLE_PASSES: usize = 16;

impl SimConfig {
    /// Returns the pass cap for a circuit with `parts` parts.
    pub fn settle_cap(&self, parts: usize) -> usize {
        self.settle_factor
            .saturating_mul(parts)
            .max(MIN_SETTLE_PASSES)
    }

    /// Returns the phase count clamped to its minimum.
    pub fn phase_count(&self) -> usize {
        self.phases.max(2)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            floating_level: Signal::High,
            conflict: Default::default(),
            settle_factor: 4,
            edge_cascade_limit: 8,
            phases: 2,
            clock_mode: ClockMode::SingleStep,
            frequency_hz: 10,
        }
    }
}
