use crate::chips::hex;
use crate::error::WiringError;
use crate::netlist::*;

/// Adds the reset switch `RESET.SW` and the inverter driving `rst`.
///
/// The switch net is the active low /RESET line, high while the switch is released.
pub fn reset(g: &mut CircuitBuilder, rst: NetIndex) -> Result<LeverHandle, WiringError> {
    let mut m = g.module("RESET");
    let switch = m.lever("SW", true)?;
    let inverter = m.hc04("U1")?;
    m.connect(inverter, hex::A[0], switch.net())?;
    m.connect(inverter, hex::Y[0], rst)?;
    m.tie(inverter, &hex::A[1..], GND)?;
    Ok(switch)
}
