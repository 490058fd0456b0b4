use super::{drive_word, read_word, Behavior, PinKind::*, PinSpec};
use crate::error::RomLoadError;
use crate::netlist::Drive;

/// Pin layout shared by the 32K×8 memories.
pub mod mem32k {
    pub const A: [usize; 15] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14];
    pub const D: [usize; 8] = [15, 16, 17, 18, 19, 20, 21, 22];
    /// Active low chip enable.
    pub const NCE: usize = 23;
    /// Active low output enable.
    pub const NOE: usize = 24;
    /// Active low write enable.
    pub const NWE: usize = 25;
}

/// Bytes of storage in a 32K×8 memory.
pub const MEM32K_SIZE: usize = 1 << 15;
/// Value of an EEPROM cell that was never programmed.
pub const ERASED: u8 = 0xff;

/// Builds the pin table of a 32K×8 memory.
macro_rules! mem32k_pins {
    ($data:expr, $we:expr) => {
        &[
            PinSpec::new("A0", Input),
            PinSpec::new("A1", Input),
            PinSpec::new("A2", Input),
            PinSpec::new("A3", Input),
            PinSpec::new("A4", Input),
            PinSpec::new("A5", Input),
            PinSpec::new("A6", Input),
            PinSpec::new("A7", Input),
            PinSpec::new("A8", Input),
            PinSpec::new("A9", Input),
            PinSpec::new("A10", Input),
            PinSpec::new("A11", Input),
            PinSpec::new("A12", Input),
            PinSpec::new("A13", Input),
            PinSpec::new("A14", Input),
            PinSpec::new("D0", $data),
            PinSpec::new("D1", $data),
            PinSpec::new("D2", $data),
            PinSpec::new("D3", $data),
            PinSpec::new("D4", $data),
            PinSpec::new("D5", $data),
            PinSpec::new("D6", $data),
            PinSpec::new("D7", $data),
            PinSpec::new("/CE", Input),
            PinSpec::new("/OE", Input),
            PinSpec::new("/WE", $we),
        ]
    };
}

fn read_cycle(levels: &[bool]) -> bool {
    !levels[mem32k::NCE] && !levels[mem32k::NOE] && levels[mem32k::NWE]
}

/// Model of the AT28C256 32K×8 EEPROM.
///
/// Only the read path is modeled, its contents come from [At28C256::load].
#[derive(Debug, Clone)]
pub struct At28C256 {
    storage: Vec<u8>,
}
impl Default for At28C256 {
    fn default() -> Self {
        At28C256 {
            storage: vec![ERASED; MEM32K_SIZE],
        }
    }
}
impl At28C256 {
    /// Replaces the whole contents with `image`, addresses past its end read [ERASED].
    ///
    /// Fails without touching the contents if the image doesn't fit.
    pub fn load(&mut self, image: &[u8]) -> Result<(), RomLoadError> {
        if image.len() > MEM32K_SIZE {
            return Err(RomLoadError::TooLarge {
                len: image.len(),
                capacity: MEM32K_SIZE,
            });
        }
        self.storage[..image.len()].copy_from_slice(image);
        for cell in &mut self.storage[image.len()..] {
            *cell = ERASED;
        }
        Ok(())
    }

    /// Returns the byte at `address`, ignoring address bits past the 15th.
    pub fn read(&self, address: usize) -> u8 {
        self.storage[address % MEM32K_SIZE]
    }
}
impl Behavior for At28C256 {
    const PART_NUMBER: &'static str = "AT28C256";
    const PINS: &'static [PinSpec] = mem32k_pins!(TriState, Input);

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let address = read_word(levels, &mem32k::A) as usize;
        drive_word(
            drives,
            &mem32k::D,
            self.read(address) as u64,
            read_cycle(levels),
        );
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        let programmed = self.storage.iter().filter(|cell| **cell != ERASED).count();
        vec![("programmed", programmed as u64)]
    }
}

/// Model of the 62256 32K×8 static RAM.
///
/// Writes happen on the rising edge of /WE with the address and data from before the edge.
/// Contents are lost on reset.
#[derive(Debug, Clone)]
pub struct Sram62256 {
    storage: Vec<u8>,
}
impl Default for Sram62256 {
    fn default() -> Self {
        Sram62256 {
            storage: vec![0; MEM32K_SIZE],
        }
    }
}
impl Sram62256 {
    pub fn read(&self, address: usize) -> u8 {
        self.storage[address % MEM32K_SIZE]
    }
}
impl Behavior for Sram62256 {
    const PART_NUMBER: &'static str = "62256";
    const PINS: &'static [PinSpec] = mem32k_pins!(SampledInOut, Clock);

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let address = read_word(levels, &mem32k::A) as usize;
        drive_word(
            drives,
            &mem32k::D,
            self.read(address) as u64,
            read_cycle(levels),
        );
    }

    fn clock_edge(&mut self, _clock: usize, levels: &[bool]) {
        if !levels[mem32k::NCE] {
            let address = read_word(levels, &mem32k::A) as usize;
            self.storage[address % MEM32K_SIZE] = read_word(levels, &mem32k::D) as u8;
        }
    }

    fn reset(&mut self) {
        for cell in &mut self.storage {
            *cell = 0;
        }
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        let used = self.storage.iter().filter(|cell| **cell != 0).count();
        vec![("nonzero", used as u64)]
    }
}
