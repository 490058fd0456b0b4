use crate::chips::{hc245, hc377};
use crate::error::WiringError;
use crate::netlist::*;

/// Adds one 74HC377 per byte of `q`, starting at designator `first`, that load `d` on the rising edge of `clock`
/// while `ne` is low. Inputs past the end of `d` are tied to [GND].
pub fn latch(
    m: &mut ModuleBuilder,
    first: usize,
    d: &[NetIndex],
    q: &[NetIndex],
    clock: NetIndex,
    ne: NetIndex,
) -> Result<Vec<PartIndex>, WiringError> {
    let mut parts = Vec::new();
    for (i, q) in q.chunks(8).enumerate() {
        let u = m.hc377(format!("U{}", first + i))?;
        m.connect(u, hc377::CLK, clock)?;
        m.connect(u, hc377::NE, ne)?;
        for (bit, q) in q.iter().enumerate() {
            m.connect(u, hc377::D[bit], d.get(i * 8 + bit).copied().unwrap_or(GND))?;
            m.connect(u, hc377::Q[bit], *q)?;
        }
        for pin in &hc377::D[q.len()..] {
            m.connect(u, *pin, GND)?;
        }
        parts.push(u);
    }
    Ok(parts)
}

/// Adds one 74HC245 per byte of `to`, starting at designator `first`, that drive `from` onto `to`
/// while `noe` is low. Inputs past the end of `from` are tied to [GND].
pub fn bus_driver(
    m: &mut ModuleBuilder,
    first: usize,
    from: &[NetIndex],
    to: &[NetIndex],
    noe: NetIndex,
) -> Result<Vec<PartIndex>, WiringError> {
    let mut parts = Vec::new();
    for (i, to) in to.chunks(8).enumerate() {
        let u = m.hc245(format!("U{}", first + i))?;
        m.connect(u, hc245::DIR, VCC)?;
        m.connect(u, hc245::NOE, noe)?;
        for (bit, to) in to.iter().enumerate() {
            m.connect(u, hc245::A[bit], from.get(i * 8 + bit).copied().unwrap_or(GND))?;
            m.connect(u, hc245::B[bit], *to)?;
        }
        parts.push(u);
    }
    Ok(parts)
}

/// Wires the register `name`, loading `data` on the rising edge of `clock` while `nin` is low.
///
/// The content is always visible on `q`. If `nout` is given, it is also driven onto `data` while `nout` is low.
pub fn word_register(
    g: &mut CircuitBuilder,
    name: &str,
    data: &[NetIndex],
    q: &[NetIndex],
    clock: NetIndex,
    nin: NetIndex,
    nout: Option<NetIndex>,
) -> Result<(), WiringError> {
    let mut m = g.module(name);
    let latches = latch(&mut m, 1, data, q, clock, nin)?;
    if let Some(nout) = nout {
        bus_driver(&mut m, latches.len() + 1, q, data, nout)?;
    }
    Ok(())
}
