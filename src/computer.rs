//! The assembled machine and the only entry point that moves it forward.
use crate::backplane::{self, Backplane};
use crate::clock::{Clock, PhaseOutcome};
use crate::config::SimConfig;
use crate::error::{BusConflict, PinAccessError, SimError};
use crate::microcode::{ControlSignal, MAX_STEPS};
use crate::netlist::{BusValue, Circuit, CircuitBuilder, Signal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{event, span, Level};

/// How far a call to [Computer::step] moves the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMode {
    /// One clock phase.
    Phase,
    /// Phases until the clock is back in phase 0.
    Cycle,
    /// Cycles until the step counter is back to 0.
    Instruction,
}

/// What happened during one call to [Computer::step] or [Computer::tick].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: u64,
    /// Clock phases advanced, 0 if the machine was halted or reset.
    pub phases: usize,
    pub halted: bool,
    /// Bus conflicts present once the step settled.
    pub faults: Vec<BusConflict>,
    /// Nets whose level changed during the step.
    pub changed: Vec<String>,
}

/// Observable state of the machine at a pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub phase: usize,
    pub halted: bool,
    pub buses: BTreeMap<String, BusValue>,
    pub registers: BTreeMap<String, Vec<(&'static str, u64)>>,
    pub faults: Vec<BusConflict>,
}

/// The 16-bit computer, wired from 74HC parts.
///
/// # Example
/// ```
/// # use ttlsim::{Computer, StepMode};
/// # use ttlsim::isa::{assemble, Opcode::*};
/// let mut computer = Computer::new().unwrap();
/// computer
///     .load_program(&assemble(&[LDI.with_operand(20), ADI.with_operand(22), OUT.with_0(), HLT.with_0()]))
///     .unwrap();
///
/// while !computer.step(StepMode::Instruction).unwrap().halted {}
/// assert_eq!(computer.read_bus("OUT").unwrap().value, 42);
/// ```
#[derive(Debug, Clone)]
pub struct Computer {
    circuit: Circuit,
    clock: Clock,
    backplane: Backplane,
    step: u64,
}

impl Computer {
    /// Returns a powered on and reset [Computer] with the default [SimConfig] and an erased program ROM.
    pub fn new() -> Result<Computer, SimError> {
        Computer::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Result<Computer, SimError> {
        let mut g = CircuitBuilder::with_config(config);
        let backplane = backplane::wire(&mut g, config.phase_count())?;
        let mut circuit = g.build()?;
        backplane.control_unit().load_microcode(&mut circuit)?;
        let clock = Clock::new(
            backplane.phases(),
            backplane.line(ControlSignal::HLT),
            backplane.rst(),
            config.clock_mode,
            config.frequency_hz,
        );
        event!(
            Level::DEBUG,
            parts = circuit.part_count(),
            nets = circuit.net_count(),
            "computer built"
        );
        let mut computer = Computer {
            circuit,
            clock,
            backplane,
            step: 0,
        };
        computer.reset()?;
        Ok(computer)
    }

    /// Replaces the program ROM contents with `image`, little endian words, and settles so the
    /// new contents show on the buses right away. Does not reset the machine.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), SimError> {
        self.backplane.program_rom().load(&mut self.circuit, image)?;
        self.circuit.settle_and_check()?;
        event!(Level::DEBUG, words = image.len() / 2, "program loaded");
        Ok(())
    }

    /// Presses and releases the reset switch.
    ///
    /// Registers, counters, flags and memory are cleared, ROM contents are kept.
    pub fn reset(&mut self) -> Result<(), SimError> {
        let span = span!(Level::DEBUG, "reset", step = self.step);
        let _enter = span.enter();
        let switch = self.backplane.reset_switch();
        self.circuit.set_lever(switch, false);
        self.circuit.settle_and_check()?;
        self.clock.advance(&mut self.circuit)?;
        self.circuit.set_lever(switch, true);
        self.circuit.settle_and_check()?;
        self.circuit.resample();
        Ok(())
    }

    /// Moves the machine forward by `mode`, after applying inputs set since the last step.
    pub fn step(&mut self, mode: StepMode) -> Result<StepReport, SimError> {
        self.begin_step();
        let span = span!(Level::DEBUG, "step", step = self.step, ?mode);
        let _enter = span.enter();
        self.circuit.tick()?;
        let phases = match mode {
            StepMode::Phase => match self.clock.advance(&mut self.circuit)? {
                PhaseOutcome::Advanced { .. } => 1,
                PhaseOutcome::Inhibited | PhaseOutcome::Reset => 0,
            },
            StepMode::Cycle => self.cycle()?.0,
            StepMode::Instruction => self.instruction()?,
        };
        Ok(self.report(phases))
    }

    /// Advances the clock by one tick of its [ClockMode](crate::ClockMode).
    pub fn tick(&mut self) -> Result<StepReport, SimError> {
        self.begin_step();
        let span = span!(Level::DEBUG, "tick", step = self.step);
        let _enter = span.enter();
        self.circuit.tick()?;
        let phases = self.clock.tick(&mut self.circuit)?;
        Ok(self.report(phases))
    }

    fn begin_step(&mut self) {
        self.step += 1;
        self.circuit.set_step(self.step);
        self.circuit.clear_changed();
    }

    fn report(&self, phases: usize) -> StepReport {
        let report = StepReport {
            step: self.step,
            phases,
            halted: self.is_halted(),
            faults: self.circuit.conflicts(),
            changed: self.circuit.changed_nets(),
        };
        event!(
            Level::TRACE,
            phases,
            halted = report.halted,
            changed = report.changed.len(),
            "step done"
        );
        report
    }

    /// Advances until the clock is back in phase 0.
    ///
    /// Returns the phases advanced and whether the cycle completed.
    fn cycle(&mut self) -> Result<(usize, bool), SimError> {
        let mut phases = 0;
        loop {
            match self.clock.advance(&mut self.circuit)? {
                PhaseOutcome::Advanced { phase } => {
                    phases += 1;
                    if phase == 0 {
                        return Ok((phases, true));
                    }
                }
                PhaseOutcome::Inhibited | PhaseOutcome::Reset => return Ok((phases, false)),
            }
        }
    }

    fn instruction(&mut self) -> Result<usize, SimError> {
        let mut phases = 0;
        // Every instruction ends within a full turn of the step counter.
        for _ in 0..=MAX_STEPS {
            let (advanced, completed) = self.cycle()?;
            phases += advanced;
            if !completed || self.step_counter() == 0 {
                break;
            }
        }
        Ok(phases)
    }

    fn step_counter(&self) -> u64 {
        self.circuit.read_probe("STEP").map_or(0, |step| step.value)
    }

    /// Returns the value of the probe or net called `name`.
    pub fn read_bus(&self, name: &str) -> Result<BusValue, PinAccessError> {
        self.circuit
            .read_probe(name)
            .or_else(|| {
                self.circuit
                    .net_index(name)
                    .map(|net| self.circuit.nets_value(&[net]))
            })
            .ok_or_else(|| PinAccessError::UnknownBus(name.to_string()))
    }

    /// Returns the level seen by the pin called `pin` of `part`.
    pub fn read_pin(&self, part: &str, pin: &str) -> Result<Signal, PinAccessError> {
        let idx = self
            .circuit
            .part_index(part)
            .ok_or_else(|| PinAccessError::UnknownPart(part.to_string()))?;
        let pin_idx = self
            .circuit
            .chip(idx)
            .pin_named(pin)
            .ok_or_else(|| PinAccessError::UnknownPin {
                part: part.to_string(),
                pin: pin.to_string(),
            })?;
        Ok(self.circuit.pin_level(idx, pin_idx))
    }

    /// Moves the external lever `part`, the change takes effect on the next step.
    pub fn set_input_pin(&mut self, part: &str, pin: &str, level: bool) -> Result<(), PinAccessError> {
        let idx = self
            .circuit
            .part_index(part)
            .ok_or_else(|| PinAccessError::UnknownPart(part.to_string()))?;
        let lever = self
            .circuit
            .lever_handle(idx)
            .filter(|_| !self.circuit.is_internal_lever(idx))
            .ok_or_else(|| PinAccessError::NotAnInput(part.to_string()))?;
        if self.circuit.chip(idx).pin_named(pin).is_none() {
            return Err(PinAccessError::UnknownPin {
                part: part.to_string(),
                pin: pin.to_string(),
            });
        }
        self.circuit.set_lever(lever, level);
        Ok(())
    }

    /// Returns true if the halt line is asserted.
    pub fn is_halted(&self) -> bool {
        self.clock.is_inhibited(&self.circuit)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            phase: self.clock.phase(),
            halted: self.is_halted(),
            buses: self
                .circuit
                .probe_values()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            registers: self
                .circuit
                .registers()
                .map(|(name, registers)| (name.to_string(), registers))
                .collect(),
            faults: self.circuit.conflicts(),
        }
    }

    /// Writes the part dependency graph to `filename` in dot format.
    pub fn dump_dot<P: AsRef<Path>>(&self, filename: P) -> std::io::Result<()> {
        self.circuit.dump_dot(filename)
    }

    pub fn program_rom_word(&self, address: usize) -> u16 {
        self.backplane.program_rom().word(&self.circuit, address)
    }

    pub fn memory_word(&self, address: usize) -> u16 {
        self.backplane.memory().word(&self.circuit, address)
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }
}
