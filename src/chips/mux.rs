use super::{Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod hc157 {
    /// Low selects A, high selects B.
    pub const S: usize = 0;
    /// Active low enable, outputs are forced low when disabled.
    pub const NE: usize = 1;
    pub const A: [usize; 4] = [2, 5, 8, 11];
    pub const B: [usize; 4] = [3, 6, 9, 12];
    pub const Y: [usize; 4] = [4, 7, 10, 13];
}

static HC157_INPUTS: [[usize; 4]; 4] = [
    [hc157::S, hc157::NE, hc157::A[0], hc157::B[0]],
    [hc157::S, hc157::NE, hc157::A[1], hc157::B[1]],
    [hc157::S, hc157::NE, hc157::A[2], hc157::B[2]],
    [hc157::S, hc157::NE, hc157::A[3], hc157::B[3]],
];

/// Model of the 74HC157, quad 2-input multiplexer.
#[derive(Debug, Clone, Default)]
pub struct Hc157;
impl Behavior for Hc157 {
    const PART_NUMBER: &'static str = "74HC157";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("S", Input),
        PinSpec::new("/E", Input),
        PinSpec::new("1A", Input),
        PinSpec::new("1B", Input),
        PinSpec::new("1Y", Output),
        PinSpec::new("2A", Input),
        PinSpec::new("2B", Input),
        PinSpec::new("2Y", Output),
        PinSpec::new("3A", Input),
        PinSpec::new("3B", Input),
        PinSpec::new("3Y", Output),
        PinSpec::new("4A", Input),
        PinSpec::new("4B", Input),
        PinSpec::new("4Y", Output),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let enabled = !levels[hc157::NE];
        let inputs = if levels[hc157::S] { &hc157::B } else { &hc157::A };
        for (input, output) in inputs.iter().zip(hc157::Y.iter()) {
            drives[*output] = (enabled && levels[*input]).into();
        }
    }

    fn depends_on(&self, output: usize) -> Option<&'static [usize]> {
        let channel = hc157::Y.iter().position(|y| *y == output)?;
        Some(HC157_INPUTS[channel].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::test_util::*;

    #[test]
    fn test_select() {
        let high = [hc157::A[0], hc157::B[1]];
        let drives = eval(&mut Hc157, &high);
        assert_eq!(driven_word(&drives, &hc157::Y), Some(0b0001));

        let drives = eval(&mut Hc157, &[high[0], high[1], hc157::S]);
        assert_eq!(driven_word(&drives, &hc157::Y), Some(0b0010));
    }

    #[test]
    fn test_channel_inputs() {
        let inputs = Hc157.depends_on(hc157::Y[3]).unwrap();
        assert_eq!(inputs, &[hc157::S, hc157::NE, hc157::A[3], hc157::B[3]]);
    }

    #[test]
    fn test_disabled() {
        let drives = eval(&mut Hc157, &[hc157::NE, hc157::A[0], hc157::A[3]]);
        assert_eq!(driven_word(&drives, &hc157::Y), Some(0));
    }
}
