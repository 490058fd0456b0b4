//! Pin-level simulation of a 16-bit computer built from 74HC-series logic.
//!
//! Every chip is modeled at its pins and every wire is a net. A [netlist::CircuitBuilder] declares the
//! static topology, the built [netlist::Circuit] settles combinational logic and fires clock edges,
//! and [Computer] wires the whole machine and steps it by phase, cycle or instruction.
#[macro_use]
pub mod netlist;
pub mod backplane;
pub mod chips;
pub mod circuits;
pub mod clock;
pub mod computer;
pub mod config;
pub mod data_structures;
pub mod error;
pub mod isa;
pub mod microcode;
extern crate concat_idents;

pub use clock::{Clock, PhaseOutcome};
pub use computer::{Computer, Snapshot, StepMode, StepReport};
pub use config::{ClockMode, ConflictFallback, ConflictPolicy, SimConfig};
pub use error::{
    BusConflict, ConflictDriver, PinAccessError, RomLoadError, SettleDivergence, SimError,
    WiringError,
};
