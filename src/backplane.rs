//! Global nets of the machine and the wiring between its modules.
use crate::circuits::{self, AluLines, ControlUnit, Memory, MemoryLines, ProgramRom, WORD};
use crate::error::WiringError;
use crate::isa::OPCODE_LENGTH;
use crate::microcode::{ControlSignal, CONTROL_WIDTH, STEP_BITS};
use crate::netlist::*;
use smallvec::SmallVec;
use strum::IntoEnumIterator;
use tracing::{event, Level};

/// Handles to everything the scheduler and the [Computer](crate::Computer) need after wiring.
///
/// Buses registered as probes: `DATA`, `A`, `B`, `OUT`, `IR`, `PC`, `STEP`, `MAR`, `CTRL`, `FLAGS` and `PHI`.
#[derive(Debug, Clone)]
pub struct Backplane {
    control: SmallVec<[NetIndex; CONTROL_WIDTH]>,
    phases: Vec<LeverHandle>,
    reset_switch: LeverHandle,
    rst: NetIndex,
    control_unit: ControlUnit,
    program_rom: ProgramRom,
    memory: Memory,
}

/// Returns the name of control line `bit`, spare lines are called `SPARE{bit}`.
fn control_net_name(bit: usize) -> String {
    ControlSignal::iter()
        .find(|signal| *signal as usize == bit)
        .map(ControlSignal::net_name)
        .unwrap_or_else(|| format!("SPARE{}", bit))
}

/// Wires the whole machine with a `phases` phase clock.
///
/// PHI0 clocks the step counter, PHI1 every other register, so memory writes land when PHI1 falls.
pub fn wire(g: &mut CircuitBuilder, phases: usize) -> Result<Backplane, WiringError> {
    let phases = circuits::clock(g, phases)?;
    let phase_nets: Vec<NetIndex> = phases.iter().map(|phase| phase.net()).collect();
    g.probe("PHI", &phase_nets)?;
    let (phi0, phi1) = (phase_nets[0], phase_nets[1]);

    let data = g.bus("DATA", WORD)?;
    let a = g.bus("A", WORD)?;
    let b = g.bus("B", WORD)?;
    let out = g.bus("OUT", WORD)?;
    let ir = g.bus("IR", WORD)?;
    let pc = g.bus("PC", WORD)?;
    let step = g.bus("STEP", STEP_BITS)?;
    let mar = g.bus("MAR", WORD)?;
    let control = (0..CONTROL_WIDTH)
        .map(|bit| g.net(control_net_name(bit)))
        .collect::<Result<SmallVec<[NetIndex; CONTROL_WIDTH]>, _>>()?;
    g.probe("CTRL", &control)?;
    let line = |signal: ControlSignal| control[signal as usize];

    let carry_flag = g.net("CF")?;
    let zero_flag = g.net("ZF")?;
    g.probe("FLAGS", &[carry_flag, zero_flag])?;
    let rst = g.net("RST")?;
    let reset_switch = circuits::reset(g, rst)?;

    use ControlSignal::*;
    let data = data.bits();
    circuits::word_register(g, "A", data, a.bits(), phi1, line(AI), Some(line(AO)))?;
    circuits::word_register(g, "B", data, b.bits(), phi1, line(BI), None)?;
    circuits::word_register(g, "OUT", data, out.bits(), phi1, line(OI), None)?;
    let alu_lines = AluLines {
        neo: line(EO),
        su: line(SU),
        fi: line(FI),
        clock: phi1,
        nclear: reset_switch.net(),
    };
    circuits::alu(g, a.bits(), b.bits(), data, alu_lines, carry_flag, zero_flag)?;
    circuits::instruction_register(g, data, ir.bits(), phi1, line(II), line(IO))?;
    circuits::program_counter(g, data, pc.bits(), phi1, line(CE), line(J))?;
    let program_rom = circuits::program_rom(g, pc.bits(), data, line(PO))?;
    let opcode = &ir.bits()[WORD - OPCODE_LENGTH as usize..];
    let control_unit = circuits::control(
        g,
        step.bits(),
        opcode,
        carry_flag,
        zero_flag,
        &control,
        phi0,
        line(SR),
    )?;
    let memory_lines = MemoryLines {
        nmi: line(MI),
        nro: line(RO),
        ri: line(RI),
        clock: phi1,
    };
    let memory = circuits::memory(g, data, mar.bits(), memory_lines)?;

    event!(Level::DEBUG, parts = g.part_count(), phases = phases.len(), "backplane wired");
    Ok(Backplane {
        control,
        phases,
        reset_switch,
        rst,
        control_unit,
        program_rom,
        memory,
    })
}

impl Backplane {
    /// Returns the net carrying `signal`.
    pub fn line(&self, signal: ControlSignal) -> NetIndex {
        self.control[signal as usize]
    }

    pub fn phases(&self) -> &[LeverHandle] {
        &self.phases
    }

    /// The /RESET switch, high while released.
    pub fn reset_switch(&self) -> LeverHandle {
        self.reset_switch
    }

    pub fn rst(&self) -> NetIndex {
        self.rst
    }

    pub fn control_unit(&self) -> &ControlUnit {
        &self.control_unit
    }

    pub fn program_rom(&self) -> &ProgramRom {
        &self.program_rom
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_net_names() {
        assert_eq!(control_net_name(0), "HLT");
        assert_eq!(control_net_name(1), "/MI");
        assert_eq!(control_net_name(16), "/SR");
        assert_eq!(control_net_name(17), "SPARE17");
    }

    #[test]
    fn test_wire() {
        let mut g = CircuitBuilder::new();
        let backplane = wire(&mut g, 3).unwrap();
        let c = g.build().unwrap();
        assert!(c.loops().is_empty());
        assert_eq!(backplane.phases().len(), 3);
        assert_eq!(c.net_index("/SR"), Some(backplane.line(ControlSignal::SR)));
        assert_eq!(c.net_index("RST"), Some(backplane.rst()));
        for probe in ["DATA", "A", "B", "OUT", "IR", "PC", "STEP", "MAR", "CTRL", "FLAGS", "PHI"] {
            assert!(c.probe_handle(probe).is_some(), "missing probe {}", probe);
        }
        assert_eq!(c.read_probe("CTRL").unwrap().width, CONTROL_WIDTH);
        assert_eq!(c.part_name(c.part_index("CONTROL.U1").unwrap()), "CONTROL.U1");
    }

    #[test]
    fn test_duplicate_wiring() {
        let mut g = CircuitBuilder::new();
        wire(&mut g, 2).unwrap();
        assert_eq!(
            wire(&mut g, 2).unwrap_err(),
            WiringError::DuplicateName("CLOCK.PHI0".into())
        );
    }
}
