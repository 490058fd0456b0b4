use super::{drive_word, read_word, Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod hc377 {
    pub const CLK: usize = 0;
    /// Active low enable.
    pub const NE: usize = 1;
    pub const D: [usize; 8] = [2, 3, 4, 5, 6, 7, 8, 9];
    pub const Q: [usize; 8] = [10, 11, 12, 13, 14, 15, 16, 17];
}

/// Model of the 74HC377, octal D flip-flop with clock enable.
///
/// On a rising clock edge with /E low, Q takes the value of D.
#[derive(Debug, Clone, Default)]
pub struct Hc377 {
    q: u8,
}
impl Hc377 {
    pub fn value(&self) -> u8 {
        self.q
    }
}
impl Behavior for Hc377 {
    const PART_NUMBER: &'static str = "74HC377";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("CLK", Clock),
        PinSpec::new("/E", Sampled),
        PinSpec::new("D0", Sampled),
        PinSpec::new("D1", Sampled),
        PinSpec::new("D2", Sampled),
        PinSpec::new("D3", Sampled),
        PinSpec::new("D4", Sampled),
        PinSpec::new("D5", Sampled),
        PinSpec::new("D6", Sampled),
        PinSpec::new("D7", Sampled),
        PinSpec::new("Q0", Output),
        PinSpec::new("Q1", Output),
        PinSpec::new("Q2", Output),
        PinSpec::new("Q3", Output),
        PinSpec::new("Q4", Output),
        PinSpec::new("Q5", Output),
        PinSpec::new("Q6", Output),
        PinSpec::new("Q7", Output),
    ];

    fn evaluate(&mut self, _levels: &[bool], drives: &mut [Drive]) {
        drive_word(drives, &hc377::Q, self.q as u64, true);
    }

    fn clock_edge(&mut self, _clock: usize, levels: &[bool]) {
        if !levels[hc377::NE] {
            self.q = read_word(levels, &hc377::D) as u8;
        }
    }

    fn reset(&mut self) {
        self.q = 0;
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        vec![("Q", self.q as u64)]
    }
}

pub mod hc74 {
    pub const D: [usize; 2] = [0, 6];
    pub const CLK: [usize; 2] = [1, 7];
    /// Active low asynchronous preset.
    pub const NPRE: [usize; 2] = [2, 8];
    /// Active low asynchronous clear.
    pub const NCLR: [usize; 2] = [3, 9];
    pub const Q: [usize; 2] = [4, 10];
    pub const NQ: [usize; 2] = [5, 11];
}

/// Model of the 74HC74, dual D flip-flop with asynchronous preset and clear.
#[derive(Debug, Clone, Default)]
pub struct Hc74 {
    q: [bool; 2],
}
impl Hc74 {
    pub fn q(&self, ff: usize) -> bool {
        self.q[ff]
    }
}
impl Behavior for Hc74 {
    const PART_NUMBER: &'static str = "74HC74";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("1D", Sampled),
        PinSpec::new("1CLK", Clock),
        PinSpec::new("/1PRE", Input),
        PinSpec::new("/1CLR", Input),
        PinSpec::new("1Q", Output),
        PinSpec::new("/1Q", Output),
        PinSpec::new("2D", Sampled),
        PinSpec::new("2CLK", Clock),
        PinSpec::new("/2PRE", Input),
        PinSpec::new("/2CLR", Input),
        PinSpec::new("2Q", Output),
        PinSpec::new("/2Q", Output),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        for ff in 0..2 {
            let preset = !levels[hc74::NPRE[ff]];
            let clear = !levels[hc74::NCLR[ff]];
            let (q, nq) = match (preset, clear) {
                // Both asserted drives both outputs high without touching the stored bit.
                (true, true) => (true, true),
                (true, false) => {
                    self.q[ff] = true;
                    (true, false)
                }
                (false, true) => {
                    self.q[ff] = false;
                    (false, true)
                }
                (false, false) => (self.q[ff], !self.q[ff]),
            };
            drives[hc74::Q[ff]] = q.into();
            drives[hc74::NQ[ff]] = nq.into();
        }
    }

    fn clock_edge(&mut self, clock: usize, levels: &[bool]) {
        for ff in 0..2 {
            if clock == hc74::CLK[ff] && levels[hc74::NPRE[ff]] && levels[hc74::NCLR[ff]] {
                self.q[ff] = levels[hc74::D[ff]];
            }
        }
    }

    fn reset(&mut self) {
        self.q = [false; 2];
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        vec![("1Q", self.q[0] as u64), ("2Q", self.q[1] as u64)]
    }
}
