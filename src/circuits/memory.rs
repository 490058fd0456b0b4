use super::latch;
use crate::chips::{mem32k, quad};
use crate::error::WiringError;
use crate::netlist::*;
use unwrap::unwrap;

/// Backplane lines the memory listens to.
#[derive(Debug, Clone, Copy)]
pub struct MemoryLines {
    /// Active low, loads the memory address register.
    pub nmi: NetIndex,
    /// Active low, drives the addressed word onto the data bus.
    pub nro: NetIndex,
    /// Writes the data bus to the addressed word.
    pub ri: NetIndex,
    pub clock: NetIndex,
}

/// The two 62256 holding the data memory, low bytes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memory {
    rams: [PartIndex; 2],
}

/// Wires the memory address register and the data memory.
///
/// * U1-U2: 74HC377 loading `data` into `mar` on the rising edge of `clock` while /MI is low.
/// * U3-U4: 62256 addressed by the low 15 bits of `mar`.
/// * U5: 74HC00 pulling /WE low while both RI and `clock` are high.
///
/// A write therefore lands when `clock` falls, with the address and data of the phase that just ended.
pub fn memory(
    g: &mut CircuitBuilder,
    data: &[NetIndex],
    mar: &[NetIndex],
    lines: MemoryLines,
) -> Result<Memory, WiringError> {
    let mut m = g.module("MEM");
    latch(&mut m, 1, data, mar, lines.clock, lines.nmi)?;

    let nwe = m.net("/WE")?;
    let nand = m.hc00("U5")?;
    m.connect(nand, quad::A[0], lines.ri)?;
    m.connect(nand, quad::B[0], lines.clock)?;
    m.connect(nand, quad::Y[0], nwe)?;
    m.tie(nand, &quad::A[1..], GND)?;
    m.tie(nand, &quad::B[1..], GND)?;

    let address = &mar[..mar.len().min(mem32k::A.len())];
    let mut rams = [PartIndex::new(0); 2];
    for (i, (ram, byte)) in rams.iter_mut().zip(data.chunks(8)).enumerate() {
        let u = m.sram62256(format!("U{}", i + 3))?;
        m.connect_word(u, &mem32k::A[..address.len()], address)?;
        m.tie(u, &mem32k::A[address.len()..], GND)?;
        m.connect_word(u, &mem32k::D[..byte.len()], byte)?;
        m.connect(u, mem32k::NCE, GND)?;
        m.connect(u, mem32k::NOE, lines.nro)?;
        m.connect(u, mem32k::NWE, nwe)?;
        *ram = u;
    }
    Ok(Memory { rams })
}

impl Memory {
    /// Returns the word stored at `address`.
    pub fn word(&self, c: &Circuit, address: usize) -> u16 {
        let read = |part: PartIndex| {
            let ram = unwrap!(c.chip(part).as_ram(), "Part {} is not a RAM", c.part_name(part));
            ram.read(address)
        };
        u16::from_le_bytes([read(self.rams[0]), read(self.rams[1])])
    }
}

#[cfg(test)]
mod tests {
    use super::super::{bus_driver, WordInput, WORD};
    use super::*;

    struct Rig {
        c: Circuit,
        memory: Memory,
        input: WordInput,
        ninput: LeverHandle,
        nmi: LeverHandle,
        nro: LeverHandle,
        ri: LeverHandle,
        clock: LeverHandle,
    }

    fn rig() -> Rig {
        let mut g = CircuitBuilder::new();
        let input = WordInput::new(&mut g, WORD, "INPUT").unwrap();
        let ninput = g.lever("/INPUT", false).unwrap();
        let data = g.bus("DATA", WORD).unwrap();
        let mar = g.bus("MAR", WORD).unwrap();
        let nmi = g.lever("/MI", true).unwrap();
        let nro = g.lever("/RO", true).unwrap();
        let ri = g.lever("RI", false).unwrap();
        let clock = g.lever("CLK", false).unwrap();
        let mut m = g.module("IN");
        bus_driver(&mut m, 1, &input.bits(), data.bits(), ninput.net()).unwrap();
        let lines = MemoryLines {
            nmi: nmi.net(),
            nro: nro.net(),
            ri: ri.net(),
            clock: clock.net(),
        };
        let memory = memory(&mut g, data.bits(), mar.bits(), lines).unwrap();
        let mut c = g.build().unwrap();
        c.reset_edge().unwrap();
        Rig {
            c,
            memory,
            input,
            ninput,
            nmi,
            nro,
            ri,
            clock,
        }
    }

    impl Rig {
        fn pulse(&mut self) {
            self.c.set_lever(self.clock, true);
            self.c.tick().unwrap();
            self.c.set_lever(self.clock, false);
            self.c.tick().unwrap();
        }

        fn select(&mut self, address: u16) {
            self.input.set_to(&mut self.c, address);
            self.c.set_lever(self.nmi, false);
            self.pulse();
            self.c.set_lever(self.nmi, true);
        }

        fn write(&mut self, address: u16, value: u16) {
            self.select(address);
            self.input.set_to(&mut self.c, value);
            self.c.set_lever(self.ri, true);
            self.pulse();
            self.c.set_lever(self.ri, false);
        }

        fn read(&mut self, address: u16) -> u16 {
            self.select(address);
            self.c.set_lever(self.ninput, true);
            self.c.set_lever(self.nro, false);
            self.c.tick().unwrap();
            let value = self.c.read_probe("DATA").unwrap().value as u16;
            self.c.set_lever(self.nro, true);
            self.c.set_lever(self.ninput, false);
            self.c.tick().unwrap();
            value
        }
    }

    #[test]
    fn test_write_then_read() {
        let r = &mut rig();
        r.write(0x10, 0xbeef);
        r.write(0x11, 0x1234);
        assert_eq!(r.c.read_probe("MAR").unwrap().value, 0x11);
        assert_eq!(r.memory.word(&r.c, 0x10), 0xbeef);
        assert_eq!(r.read(0x10), 0xbeef);
        assert_eq!(r.read(0x11), 0x1234);
        assert_eq!(r.read(0x12), 0);
        assert!(r.c.conflicts().is_empty());
    }

    #[test]
    fn test_write_needs_ri() {
        let r = &mut rig();
        r.select(3);
        r.input.set_to(&mut r.c, 0xffffu16);
        r.pulse();
        assert_eq!(r.memory.word(&r.c, 3), 0);
        let nwe = r.c.net_index("MEM./WE").unwrap();
        assert!(r.c.level(nwe).is_high());
    }

    #[test]
    fn test_reset_clears() {
        let r = &mut rig();
        r.write(7, 42);
        r.c.reset_edge().unwrap();
        assert_eq!(r.memory.word(&r.c, 7), 0);
        assert_eq!(r.c.read_probe("MAR").unwrap().value, 0);
    }
}
