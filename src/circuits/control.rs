use crate::chips::{hc163, mem32k};
use crate::error::{RomLoadError, WiringError};
use crate::microcode::{control_rom_images, CONTROL_WIDTH, STEP_BITS};
use crate::netlist::*;

/// Step counter and the three control ROMs decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlUnit {
    counter: PartIndex,
    roms: [PartIndex; 3],
}

/// Wires the control unit.
///
/// * U1: 74HC163 step counter, counts on the rising edge of `clock` and clears synchronously while `nreset` is low.
/// * U2-U4: AT28C256 addressed by step, `opcode`, `carry_flag` and `zero_flag`, driving bits 0-7, 8-15 and 16-23 of `control`.
#[allow(clippy::too_many_arguments)]
pub fn control(
    g: &mut CircuitBuilder,
    step: &[NetIndex],
    opcode: &[NetIndex],
    carry_flag: NetIndex,
    zero_flag: NetIndex,
    control: &[NetIndex],
    clock: NetIndex,
    nreset: NetIndex,
) -> Result<ControlUnit, WiringError> {
    let mut m = g.module("CONTROL");
    let counter = m.hc163("U1")?;
    m.connect(counter, hc163::CLK, clock)?;
    m.connect(counter, hc163::NCLR, nreset)?;
    m.tie(counter, &[hc163::NLD, hc163::ENP, hc163::ENT], VCC)?;
    m.tie(counter, &hc163::D, GND)?;
    m.connect_word(counter, &hc163::Q, step)?;

    let address: Vec<NetIndex> = step
        .iter()
        .chain(opcode)
        .chain([carry_flag, zero_flag].iter())
        .copied()
        .collect();
    let mut roms = [counter; 3];
    for (i, rom) in roms.iter_mut().enumerate() {
        let u = m.at28c256(format!("U{}", i + 2))?;
        m.connect_word(u, &mem32k::A[..address.len()], &address)?;
        m.tie(u, &mem32k::A[address.len()..], GND)?;
        m.connect_word(u, &mem32k::D, &control[i * 8..i * 8 + 8])?;
        m.tie(u, &[mem32k::NCE, mem32k::NOE], GND)?;
        m.connect(u, mem32k::NWE, VCC)?;
        *rom = u;
    }
    debug_assert_eq!(step.len(), STEP_BITS);
    debug_assert_eq!(control.len(), CONTROL_WIDTH);
    Ok(ControlUnit { counter, roms })
}

impl ControlUnit {
    /// Programs the control ROMs with the microcode.
    pub fn load_microcode(&self, c: &mut Circuit) -> Result<(), RomLoadError> {
        for (rom, image) in self.roms.iter().zip(control_rom_images()) {
            c.load_rom(*rom, &image)?;
        }
        Ok(())
    }

    pub fn counter(&self) -> PartIndex {
        self.counter
    }
}
