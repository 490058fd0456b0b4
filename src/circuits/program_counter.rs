use crate::chips::hc163;
use crate::error::WiringError;
use crate::netlist::*;

/// Wires the program counter: 74HC163s cascaded through RCO, one per nibble of `pc`.
///
/// On the rising edge of `clock` the counter loads `data` if `nload` is low,
/// otherwise it counts up if `enable` is high.
pub fn program_counter(
    g: &mut CircuitBuilder,
    data: &[NetIndex],
    pc: &[NetIndex],
    clock: NetIndex,
    enable: NetIndex,
    nload: NetIndex,
) -> Result<(), WiringError> {
    let mut m = g.module("PC");
    let nibbles = pc.len() / 4;
    let mut carry_in = VCC;
    for nibble in 0..nibbles {
        let bits = nibble * 4..nibble * 4 + 4;
        let u = m.hc163(format!("U{}", nibble + 1))?;
        m.connect(u, hc163::CLK, clock)?;
        m.connect(u, hc163::NCLR, VCC)?;
        m.connect(u, hc163::NLD, nload)?;
        m.connect(u, hc163::ENP, enable)?;
        m.connect(u, hc163::ENT, carry_in)?;
        m.connect_word(u, &hc163::D, &data[bits.clone()])?;
        m.connect_word(u, &hc163::Q, &pc[bits])?;
        if nibble + 1 < nibbles {
            carry_in = m.net(format!("RCO{}", nibble + 1))?;
            m.connect(u, hc163::RCO, carry_in)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{WordInput, WORD};
    use super::*;

    #[test]
    fn test_count_and_load() {
        let mut g = CircuitBuilder::new();
        let data = WordInput::new(&mut g, WORD, "DATA").unwrap();
        let pc = g.bus("PC", WORD).unwrap();
        let clock = g.lever("CLK", false).unwrap();
        let enable = g.lever("CE", true).unwrap();
        let nload = g.lever("/J", true).unwrap();
        program_counter(&mut g, &data.bits(), pc.bits(), clock.net(), enable.net(), nload.net())
            .unwrap();

        let c = &mut g.build().unwrap();
        c.reset_edge().unwrap();
        let pc = c.probe_handle("PC").unwrap();
        let pulse = |c: &mut Circuit| {
            c.set_lever(clock, true);
            c.tick().unwrap();
            c.set_lever(clock, false);
            c.tick().unwrap();
        };

        pulse(c);
        pulse(c);
        assert_eq!(pc.u16(c), 2);

        data.set_to(c, 0x0fffu16);
        c.set_lever(nload, false);
        pulse(c);
        assert_eq!(pc.u16(c), 0x0fff);

        // Carry ripples through every nibble.
        c.set_lever(nload, true);
        pulse(c);
        assert_eq!(pc.u16(c), 0x1000);

        c.set_lever(enable, false);
        pulse(c);
        assert_eq!(pc.u16(c), 0x1000);

        data.set_to(c, 0xffffu16);
        c.set_lever(nload, false);
        pulse(c);
        c.set_lever(nload, true);
        c.set_lever(enable, true);
        pulse(c);
        assert_eq!(pc.u16(c), 0);
    }
}
