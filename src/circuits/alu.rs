use super::{bus_driver, WORD};
use crate::chips::{hc157, hc283, hc688, hc74, hex, quad};
use crate::error::WiringError;
use crate::netlist::*;

/// Backplane lines the ALU listens to.
#[derive(Debug, Clone, Copy)]
pub struct AluLines {
    /// Active low, drives the result onto the data bus.
    pub neo: NetIndex,
    /// Subtracts B from A instead of adding it.
    pub su: NetIndex,
    /// Loads the flags on the next clock edge.
    pub fi: NetIndex,
    pub clock: NetIndex,
    /// Active low, asynchronously clears the flags.
    pub nclear: NetIndex,
}

/// Wires the ALU: A plus B, or A minus B in two's complement, with carry and zero flags.
///
/// * U1-U4: 74HC86 inverting B when subtracting.
/// * U5-U8: 74HC283 adder chain, the carry in of the first one is SU.
/// * U9-U10: 74HC245 driving the result onto `data`.
/// * U11-U13: two cascaded 74HC688 comparing the result to 0 and a 74HC04 producing ZERO.
/// * U14-U15: 74HC157 picking the new or the current flags, 74HC74 holding them.
///
/// The flags on `carry_flag` and `zero_flag` only change on a rising edge of `clock` with FI high.
pub fn alu(
    g: &mut CircuitBuilder,
    a: &[NetIndex],
    b: &[NetIndex],
    data: &[NetIndex],
    lines: AluLines,
    carry_flag: NetIndex,
    zero_flag: NetIndex,
) -> Result<(), WiringError> {
    let mut m = g.module("ALU");
    let operand = m.bus("OPERAND", WORD)?;
    let sum = m.bus("SUM", WORD)?;

    for nibble in 0..WORD / 4 {
        let bits = nibble * 4..nibble * 4 + 4;
        let xor = m.hc86(format!("U{}", nibble + 1))?;
        m.connect_word(xor, &quad::A, &b[bits.clone()])?;
        for pin in quad::B {
            m.connect(xor, pin, lines.su)?;
        }
        m.connect_word(xor, &quad::Y, operand.slice(bits))?;
    }

    let mut carry = lines.su;
    for nibble in 0..WORD / 4 {
        let bits = nibble * 4..nibble * 4 + 4;
        let adder = m.hc283(format!("U{}", nibble + 5))?;
        m.connect_word(adder, &hc283::A, &a[bits.clone()])?;
        m.connect_word(adder, &hc283::B, operand.slice(bits.clone()))?;
        m.connect(adder, hc283::C0, carry)?;
        m.connect_word(adder, &hc283::S, sum.slice(bits.clone()))?;
        carry = if bits.end == WORD {
            m.net("CARRY")?
        } else {
            m.net(format!("C{}", bits.end))?
        };
        m.connect(adder, hc283::C4, carry)?;
    }

    bus_driver(&mut m, 9, sum.bits(), data, lines.neo)?;

    let neq_low = m.net("/EQL")?;
    let neq = m.net("/EQ")?;
    let zero = m.net("ZERO")?;
    let low = m.hc688("U11")?;
    m.connect_word(low, &hc688::P, sum.slice(0..8))?;
    m.tie(low, &hc688::Q, GND)?;
    m.connect(low, hc688::NG, GND)?;
    m.connect(low, hc688::NEQ, neq_low)?;
    let high = m.hc688("U12")?;
    m.connect_word(high, &hc688::P, sum.slice(8..16))?;
    m.tie(high, &hc688::Q, GND)?;
    m.connect(high, hc688::NG, neq_low)?;
    m.connect(high, hc688::NEQ, neq)?;
    let inverter = m.hc04("U13")?;
    m.connect(inverter, hex::A[0], neq)?;
    m.connect(inverter, hex::Y[0], zero)?;
    m.tie(inverter, &hex::A[1..], GND)?;

    let next_carry = m.net("CF.D")?;
    let next_zero = m.net("ZF.D")?;
    let mux = m.hc157("U14")?;
    m.connect(mux, hc157::S, lines.fi)?;
    m.connect(mux, hc157::NE, GND)?;
    m.connect_word(mux, &hc157::A[..2], &[carry_flag, zero_flag])?;
    m.connect_word(mux, &hc157::B[..2], &[carry, zero])?;
    m.connect_word(mux, &hc157::Y[..2], &[next_carry, next_zero])?;
    m.tie(mux, &hc157::A[2..], GND)?;
    m.tie(mux, &hc157::B[2..], GND)?;

    let flags = m.hc74("U15")?;
    for (ff, (d, q)) in [(next_carry, carry_flag), (next_zero, zero_flag)]
        .into_iter()
        .enumerate()
    {
        m.connect(flags, hc74::D[ff], d)?;
        m.connect(flags, hc74::CLK[ff], lines.clock)?;
        m.connect(flags, hc74::NPRE[ff], VCC)?;
        m.connect(flags, hc74::NCLR[ff], lines.nclear)?;
        m.connect(flags, hc74::Q[ff], q)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::WordInput;
    use super::*;
    use proptest::prop_assert_eq;
    use test_strategy::proptest;

    struct Rig {
        c: Circuit,
        a: WordInput,
        b: WordInput,
        su: LeverHandle,
        fi: LeverHandle,
        neo: LeverHandle,
        clock: LeverHandle,
    }

    fn rig() -> Rig {
        let mut g = CircuitBuilder::new();
        let a = WordInput::new(&mut g, WORD, "A").unwrap();
        let b = WordInput::new(&mut g, WORD, "B").unwrap();
        let data = g.bus("DATA", WORD).unwrap();
        let su = g.lever("SU", false).unwrap();
        let fi = g.lever("FI", false).unwrap();
        let neo = g.lever("/EO", true).unwrap();
        let clock = g.lever("CLK", false).unwrap();
        let nclear = g.lever("/CLR", true).unwrap();
        let cf = g.net("CF").unwrap();
        let zf = g.net("ZF").unwrap();
        g.probe("FLAGS", &[cf, zf]).unwrap();
        let lines = AluLines {
            neo: neo.net(),
            su: su.net(),
            fi: fi.net(),
            clock: clock.net(),
            nclear: nclear.net(),
        };
        alu(&mut g, &a.bits(), &b.bits(), data.bits(), lines, cf, zf).unwrap();
        let mut c = g.build().unwrap();
        c.reset_edge().unwrap();
        Rig {
            c,
            a,
            b,
            su,
            fi,
            neo,
            clock,
        }
    }

    impl Rig {
        /// Computes `a op b`, loads the flags and returns (result on the bus, carry, zero).
        fn run(&mut self, a: u16, b: u16, subtract: bool) -> (u16, bool, bool) {
            let c = &mut self.c;
            self.a.set_to(c, a);
            self.b.set_to(c, b);
            c.set_lever(self.su, subtract);
            c.set_lever(self.neo, false);
            c.set_lever(self.fi, true);
            c.set_lever(self.clock, true);
            c.tick().unwrap();
            c.set_lever(self.clock, false);
            c.set_lever(self.fi, false);
            c.tick().unwrap();
            let flags = c.read_probe("FLAGS").unwrap().value;
            (
                c.read_probe("DATA").unwrap().value as u16,
                flags & 1 == 1,
                flags & 2 == 2,
            )
        }
    }

    #[test]
    fn test_add() {
        let r = &mut rig();
        assert_eq!(r.run(2, 3, false), (5, false, false));
        assert_eq!(r.run(0xffff, 1, false), (0, true, true));
        assert_eq!(r.run(0, 0, false), (0, false, true));
    }

    #[test]
    fn test_subtract() {
        let r = &mut rig();
        assert_eq!(r.run(5, 3, true), (2, true, false));
        assert_eq!(r.run(3, 3, true), (0, true, true));
        assert_eq!(r.run(3, 5, true), (0xfffe, false, false));
    }

    #[test]
    fn test_flags_hold_without_fi() {
        let r = &mut rig();
        r.run(0xffff, 1, false);
        let c = &mut r.c;
        r.a.set_to(c, 1u16);
        c.set_lever(r.clock, true);
        c.tick().unwrap();
        assert_eq!(c.read_probe("FLAGS").unwrap().value, 0b11);
        assert_eq!(c.read_probe("ALU.SUM").unwrap().value, 2);
    }

    #[proptest(cases = 64)]
    fn prop_matches_wrapping_arithmetic(a: u16, b: u16, subtract: bool) {
        let r = &mut rig();
        let expected = if subtract {
            let (v, borrow) = a.overflowing_sub(b);
            (v, !borrow, v == 0)
        } else {
            let (v, carry) = a.overflowing_add(b);
            (v, carry, v == 0)
        };
        prop_assert_eq!(r.run(a, b, subtract), expected);
    }
}
