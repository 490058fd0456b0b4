use super::{drive_word, read_word, Behavior, PinKind, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod hc245 {
    /// High transmits from A to B, low from B to A.
    pub const DIR: usize = 0;
    /// Active low output enable.
    pub const NOE: usize = 1;
    pub const A: [usize; 8] = [2, 3, 4, 5, 6, 7, 8, 9];
    pub const B: [usize; 8] = [10, 11, 12, 13, 14, 15, 16, 17];
}

static HC245_TO_B: [[usize; 3]; 8] = [
    [hc245::DIR, hc245::NOE, hc245::A[0]],
    [hc245::DIR, hc245::NOE, hc245::A[1]],
    [hc245::DIR, hc245::NOE, hc245::A[2]],
    [hc245::DIR, hc245::NOE, hc245::A[3]],
    [hc245::DIR, hc245::NOE, hc245::A[4]],
    [hc245::DIR, hc245::NOE, hc245::A[5]],
    [hc245::DIR, hc245::NOE, hc245::A[6]],
    [hc245::DIR, hc245::NOE, hc245::A[7]],
];
static HC245_TO_A: [[usize; 3]; 8] = [
    [hc245::DIR, hc245::NOE, hc245::B[0]],
    [hc245::DIR, hc245::NOE, hc245::B[1]],
    [hc245::DIR, hc245::NOE, hc245::B[2]],
    [hc245::DIR, hc245::NOE, hc245::B[3]],
    [hc245::DIR, hc245::NOE, hc245::B[4]],
    [hc245::DIR, hc245::NOE, hc245::B[5]],
    [hc245::DIR, hc245::NOE, hc245::B[6]],
    [hc245::DIR, hc245::NOE, hc245::B[7]],
];

/// Model of the 74HC245, octal bus transceiver.
#[derive(Debug, Clone, Default)]
pub struct Hc245;
impl Behavior for Hc245 {
    const PART_NUMBER: &'static str = "74HC245";
    const PINS: &'static [PinSpec] = &[
        PinSpec::new("DIR", Input),
        PinSpec::new("/OE", Input),
        PinSpec::new("A0", InOut),
        PinSpec::new("A1", InOut),
        PinSpec::new("A2", InOut),
        PinSpec::new("A3", InOut),
        PinSpec::new("A4", InOut),
        PinSpec::new("A5", InOut),
        PinSpec::new("A6", InOut),
        PinSpec::new("A7", InOut),
        PinSpec::new("B0", InOut),
        PinSpec::new("B1", InOut),
        PinSpec::new("B2", InOut),
        PinSpec::new("B3", InOut),
        PinSpec::new("B4", InOut),
        PinSpec::new("B5", InOut),
        PinSpec::new("B6", InOut),
        PinSpec::new("B7", InOut),
    ];

    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
        let enabled = !levels[hc245::NOE];
        let a_to_b = levels[hc245::DIR];
        let (from, to) = if a_to_b {
            (&hc245::A, &hc245::B)
        } else {
            (&hc245::B, &hc245::A)
        };
        drive_word(drives, to, read_word(levels, from), enabled);
    }

    /// With DIR tied to a rail one side only listens and the other only talks.
    fn static_kind(&self, pin: usize, tied: &[Option<bool>]) -> PinKind {
        let kind = Self::PINS[pin].kind;
        if kind != InOut {
            return kind;
        }
        let is_a = hc245::A.contains(&pin);
        match tied[hc245::DIR] {
            Some(a_to_b) if a_to_b == is_a => Input,
            Some(_) => TriState,
            None => InOut,
        }
    }

    fn depends_on(&self, output: usize) -> Option<&'static [usize]> {
        if let Some(bit) = hc245::B.iter().position(|pin| *pin == output) {
            return Some(HC245_TO_B[bit].as_slice());
        }
        let bit = hc245::A.iter().position(|pin| *pin == output)?;
        Some(HC245_TO_A[bit].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::test_util::*;

    #[test]
    fn test_a_to_b() {
        let mut high = word_pins(&hc245::A, 0x3c);
        high.push(hc245::DIR);
        let drives = eval(&mut Hc245, &high);
        assert_eq!(driven_word(&drives, &hc245::B), Some(0x3c));
        assert!(hc245::A.iter().all(|pin| drives[*pin] == Drive::HighZ));
    }

    #[test]
    fn test_b_to_a() {
        let high = word_pins(&hc245::B, 0x81);
        let drives = eval(&mut Hc245, &high);
        assert_eq!(driven_word(&drives, &hc245::A), Some(0x81));
        assert!(hc245::B.iter().all(|pin| drives[*pin] == Drive::HighZ));
    }

    #[test]
    fn test_disabled() {
        let mut high = word_pins(&hc245::A, 0xff);
        high.extend_from_slice(&[hc245::DIR, hc245::NOE]);
        let drives = eval(&mut Hc245, &high);
        assert!(drives.iter().all(|drive| *drive == Drive::HighZ));
    }

    #[test]
    fn test_bit_inputs() {
        let to_b = Hc245.depends_on(hc245::B[5]).unwrap();
        assert_eq!(to_b, &[hc245::DIR, hc245::NOE, hc245::A[5]]);
        let to_a = Hc245.depends_on(hc245::A[0]).unwrap();
        assert_eq!(to_a, &[hc245::DIR, hc245::NOE, hc245::B[0]]);
        assert_eq!(Hc245.depends_on(hc245::DIR), None);
    }

    #[test]
    fn test_static_kind() {
        let mut tied = vec![None; Hc245::PINS.len()];
        assert_eq!(Hc245.static_kind(hc245::A[0], &tied), InOut);

        tied[hc245::DIR] = Some(true);
        assert_eq!(Hc245.static_kind(hc245::A[0], &tied), Input);
        assert_eq!(Hc245.static_kind(hc245::B[0], &tied), TriState);
        assert_eq!(Hc245.static_kind(hc245::NOE, &tied), Input);

        tied[hc245::DIR] = Some(false);
        assert_eq!(Hc245.static_kind(hc245::A[7], &tied), TriState);
        assert_eq!(Hc245.static_kind(hc245::B[7], &tied), Input);
    }
}
