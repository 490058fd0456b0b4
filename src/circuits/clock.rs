use crate::error::WiringError;
use crate::netlist::*;

/// Adds the phase levers `CLOCK.PHI0`..`CLOCK.PHI{phases-1}`, with phase 0 active.
///
/// Only the simulation can move them, see [Clock](crate::clock::Clock).
pub fn clock(g: &mut CircuitBuilder, phases: usize) -> Result<Vec<LeverHandle>, WiringError> {
    let mut m = g.module("CLOCK");
    (0..phases)
        .map(|i| m.internal_lever(format!("PHI{}", i), i == 0))
        .collect()
}
