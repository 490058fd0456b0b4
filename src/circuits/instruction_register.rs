use super::{bus_driver, latch};
use crate::error::WiringError;
use crate::isa::OPERAND_LENGTH;
use crate::netlist::*;

/// Wires the instruction register, loading `data` into `ir` on the rising edge of `clock` while `nin` is low.
///
/// While `nout` is low the operand bits of `ir` are driven onto `data`, with the opcode bits replaced by zeros.
pub fn instruction_register(
    g: &mut CircuitBuilder,
    data: &[NetIndex],
    ir: &[NetIndex],
    clock: NetIndex,
    nin: NetIndex,
    nout: NetIndex,
) -> Result<(), WiringError> {
    let mut m = g.module("IR");
    let latches = latch(&mut m, 1, data, ir, clock, nin)?;
    bus_driver(
        &mut m,
        latches.len() + 1,
        &ir[..OPERAND_LENGTH as usize],
        data,
        nout,
    )?;
    Ok(())
}
