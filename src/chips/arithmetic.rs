use super::{drive_word, read_word, Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod hc283 {
    pub const A: [usize; 4] = [0, 1, 2, 3];
    pub const B: [usize; 4] = [4, 5, 6, 7];
    pub const C0: usize = 8;
    pub const S: [usize; 4] = [9, 10, 11, 12];
    pub const C4: usize = 13;
}

/// Model of the 74HC283, 4-bit binary full adder with fast carry.
#[derive(Debug, Clone, Default)]
pub struct Hc283;
impl Behavior for Hc283 {
    const PART_NUMBER: &'static str = "74HC283";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("A1", Input),
        PinSpec::new("A2", Input),
        PinSpec::new("A3", Input),
        PinSpec::new("A4", Input),
        PinSpec::new("B1", Input),
        PinSpec::new("B2", Input),
        PinSpec::new("B3", Input),
        PinSpec::new("B4", Input),
        PinSpec::new("C0", Input),
        PinSpec::new("S1", Output),
        PinSpec::new("S2", Output),
        PinSpec::new("S3", Output),
        PinSpec::new("S4", Output),
        PinSpec::new("C4", Output),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let sum = read_word(levels, &hc283::A)
            + read_word(levels, &hc283::B)
            + levels[hc283::C0] as u64;
        drive_word(drives, &hc283::S, sum, true);
        drives[hc283::C4] = (sum > 0xf).into();
    }
}

pub mod hc688 {
    pub const P: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
    pub const Q: [usize; 8] = [8, 9, 10, 11, 12, 13, 14, 15];
    /// Active low enable.
    pub const NG: usize = 16;
    /// Active low, P equals Q.
    pub const NEQ: usize = 17;
}

/// Model of the 74HC688, 8-bit identity comparator.
///
/// /G chains comparators: the /EQ of one stage feeds /G of the next.
#[derive(Debug, Clone, Default)]
pub struct Hc688;
impl Behavior for Hc688 {
    const PART_NUMBER: &'static str = "74HC688";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("P0", Input),
        PinSpec::new("P1", Input),
        PinSpec::new("P2", Input),
        PinSpec::new("P3", Input),
        PinSpec::new("P4", Input),
        PinSpec::new("P5", Input),
        PinSpec::new("P6", Input),
        PinSpec::new("P7", Input),
        PinSpec::new("Q0", Input),
        PinSpec::new("Q1", Input),
        PinSpec::new("Q2", Input),
        PinSpec::new("Q3", Input),
        PinSpec::new("Q4", Input),
        PinSpec::new("Q5", Input),
        PinSpec::new("Q6", Input),
        PinSpec::new("Q7", Input),
        PinSpec::new("/G", Input),
        PinSpec::new("/EQ", Output),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let equal = read_word(levels, &hc688::P) == read_word(levels, &hc688::Q);
        let enabled = !levels[hc688::NG];
        drives[hc688::NEQ] = (!(enabled && equal)).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::test_util::*;

    fn add(a: u64, b: u64, carry: bool) -> (u64, bool) {
        let mut high = word_pins(&hc283::A, a);
        high.extend(word_pins(&hc283::B, b));
        if carry {
            high.push(hc283::C0);
        }
        let drives = eval(&mut Hc283, &high);
        (
            driven_word(&drives, &hc283::S).unwrap(),
            drives[hc283::C4] == Drive::High,
        )
    }

    #[test]
    fn test_adder() {
        assert_eq!(add(3, 4, false), (7, false));
        assert_eq!(add(15, 1, false), (0, true));
        assert_eq!(add(15, 15, true), (15, true));
        assert_eq!(add(0, 0, true), (1, false));
    }

    #[test]
    fn test_adder_exhaustive() {
        for a in 0..16 {
            for b in 0..16 {
                let (sum, carry) = add(a, b, false);
                assert_eq!(sum + ((carry as u64) << 4), a + b, "{} + {}", a, b);
            }
        }
    }

    #[test]
    fn test_comparator() {
        let mut high = word_pins(&hc688::P, 0x42);
        high.extend(word_pins(&hc688::Q, 0x42));
        let drives = eval(&mut Hc688, &high);
        assert_eq!(drives[hc688::NEQ], Drive::Low);

        high.push(hc688::NG);
        let drives = eval(&mut Hc688, &high);
        assert_eq!(drives[hc688::NEQ], Drive::High);

        let drives = eval(&mut Hc688, &word_pins(&hc688::P, 0x01));
        assert_eq!(drives[hc688::NEQ], Drive::High);
    }
}
