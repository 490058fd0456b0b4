use crate::chips::{mem32k, MEM32K_SIZE};
use crate::error::{RomLoadError, WiringError};
use crate::netlist::*;
use unwrap::unwrap;

/// The two AT28C256 holding the program, low bytes in U1 and high bytes in U2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramRom {
    low: PartIndex,
    high: PartIndex,
}

/// Wires the program ROM, addressed by `address` and driving `data` while `nout` is low.
///
/// Address bits past the 15th are left unconnected.
pub fn program_rom(
    g: &mut CircuitBuilder,
    address: &[NetIndex],
    data: &[NetIndex],
    nout: NetIndex,
) -> Result<ProgramRom, WiringError> {
    let mut m = g.module("PROM");
    let address = &address[..address.len().min(mem32k::A.len())];
    let mut roms = Vec::with_capacity(2);
    for (i, byte) in data.chunks(8).take(2).enumerate() {
        let u = m.at28c256(format!("U{}", i + 1))?;
        m.connect_word(u, &mem32k::A[..address.len()], address)?;
        m.tie(u, &mem32k::A[address.len()..], GND)?;
        m.connect_word(u, &mem32k::D[..byte.len()], byte)?;
        m.connect(u, mem32k::NCE, GND)?;
        m.connect(u, mem32k::NOE, nout)?;
        m.connect(u, mem32k::NWE, VCC)?;
        roms.push(u);
    }
    Ok(ProgramRom {
        low: roms[0],
        high: roms[1],
    })
}

impl ProgramRom {
    /// Words the program ROM can hold.
    pub const CAPACITY: usize = MEM32K_SIZE;

    /// Replaces the program with `image`, a sequence of little endian words.
    ///
    /// Fails without touching the contents if the image has an odd length or more than [ProgramRom::CAPACITY] words.
    pub fn load(&self, c: &mut Circuit, image: &[u8]) -> Result<(), RomLoadError> {
        if image.len() % 2 != 0 {
            return Err(RomLoadError::Malformed(format!(
                "{} bytes is not a whole number of 16 bit words",
                image.len()
            )));
        }
        if image.len() / 2 > Self::CAPACITY {
            return Err(RomLoadError::TooLarge {
                len: image.len(),
                capacity: Self::CAPACITY * 2,
            });
        }
        let low: Vec<u8> = image.iter().step_by(2).copied().collect();
        let high: Vec<u8> = image.iter().skip(1).step_by(2).copied().collect();
        c.load_rom(self.low, &low)?;
        c.load_rom(self.high, &high)
    }

    /// Returns the word at `address`.
    pub fn word(&self, c: &Circuit, address: usize) -> u16 {
        let read = |part: PartIndex| {
            let rom = unwrap!(c.chip(part).as_rom(), "Part {} is not a ROM", c.part_name(part));
            rom.read(address)
        };
        u16::from_le_bytes([read(self.low), read(self.high)])
    }
}

#[cfg(test)]
mod tests {
    use super::super::{WordInput, WORD};
    use super::*;

    fn rig() -> (Circuit, ProgramRom, WordInput, LeverHandle) {
        let mut g = CircuitBuilder::new();
        let address = WordInput::new(&mut g, WORD, "PC").unwrap();
        let data = g.bus("DATA", WORD).unwrap();
        let nout = g.lever("/PO", false).unwrap();
        let rom = program_rom(&mut g, &address.bits(), data.bits(), nout.net()).unwrap();
        let mut c = g.build().unwrap();
        c.settle().unwrap();
        (c, rom, address, nout)
    }

    #[test]
    fn test_read() {
        let (mut c, rom, address, nout) = rig();
        rom.load(&mut c, &[0x34, 0x12, 0x78, 0x56]).unwrap();
        c.settle().unwrap();
        assert_eq!(c.read_probe("DATA").unwrap().value, 0x1234);

        address.set_to(&mut c, 1u16);
        c.settle().unwrap();
        assert_eq!(c.read_probe("DATA").unwrap().value, 0x5678);
        assert_eq!(rom.word(&c, 2), 0xffff);

        // Bit 15 of the address is not connected.
        address.set_to(&mut c, 0x8001u16);
        c.settle().unwrap();
        assert_eq!(c.read_probe("DATA").unwrap().value, 0x5678);

        c.set_lever(nout, true);
        c.settle().unwrap();
        assert_eq!(c.read_probe("DATA").unwrap().floating, 0xffff);
    }

    #[test]
    fn test_load_errors() {
        let (mut c, rom, _, _) = rig();
        rom.load(&mut c, &[1, 0]).unwrap();
        assert!(matches!(
            rom.load(&mut c, &[1, 2, 3]),
            Err(RomLoadError::Malformed(_))
        ));
        assert_eq!(
            rom.load(&mut c, &vec![0; MEM32K_SIZE * 2 + 2]),
            Err(RomLoadError::TooLarge {
                len: MEM32K_SIZE * 2 + 2,
                capacity: MEM32K_SIZE * 2
            })
        );
        assert_eq!(rom.word(&c, 0), 1);

        rom.load(&mut c, &vec![0xaa; MEM32K_SIZE * 2]).unwrap();
        assert_eq!(rom.word(&c, MEM32K_SIZE - 1), 0xaaaa);
    }
}
