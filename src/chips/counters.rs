use super::{drive_word, read_word, Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod hc163 {
    pub const CLK: usize = 0;
    /// Active low synchronous clear.
    pub const NCLR: usize = 1;
    /// Active low synchronous load.
    pub const NLD: usize = 2;
    pub const ENP: usize = 3;
    pub const ENT: usize = 4;
    pub const D: [usize; 4] = [5, 6, 7, 8];
    pub const Q: [usize; 4] = [9, 10, 11, 12];
    /// Ripple carry output, high when ENT is high and the count is 15.
    pub const RCO: usize = 13;
}

/// Model of the 74HC163, synchronous 4-bit binary counter.
///
/// On a rising clock edge, in order of priority: /CLR low clears, /LD low loads D,
/// ENP and ENT high count up.
#[derive(Debug, Clone, Default)]
pub struct Hc163 {
    q: u8,
}
impl Hc163 {
    pub fn value(&self) -> u8 {
        self.q
    }
}
impl Behavior for Hc163 {
    const PART_NUMBER: &'static str = "74HC163";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("CLK", Clock),
        PinSpec::new("/CLR", Sampled),
        PinSpec::new("/LD", Sampled),
        PinSpec::new("ENP", Sampled),
        PinSpec::new("ENT", Input),
        PinSpec::new("D0", Sampled),
        PinSpec::new("D1", Sampled),
        PinSpec::new("D2", Sampled),
        PinSpec::new("D3", Sampled),
        PinSpec::new("Q0", Output),
        PinSpec::new("Q1", Output),
        PinSpec::new("Q2", Output),
        PinSpec::new("Q3", Output),
        PinSpec::new("RCO", Output),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        drive_word(drives, &hc163::Q, self.q as u64, true);
        drives[hc163::RCO] = (levels[hc163::ENT] && self.q == 0xf).into();
    }

    fn clock_edge(&mut self, _clock: usize, levels: &[bool]) {
        self.q = if !levels[hc163::NCLR] {
            0
        } else if !levels[hc163::NLD] {
            read_word(levels, &hc163::D) as u8
        } else if levels[hc163::ENP] && levels[hc163::ENT] {
            (self.q + 1) & 0xf
        } else {
            self.q
        };
    }

    fn reset(&mut self) {
        self.q = 0;
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        vec![("Q", self.q as u64)]
    }
}
