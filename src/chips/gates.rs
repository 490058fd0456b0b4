use super::{Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateType {
    Not,
    And,
    Nand,
    Or,
    Xor,
}
use GateType::*;
impl GateType {
    #[inline(always)]
    pub fn accumulate(&self, acc: bool, b: bool) -> bool {
        match self {
            Or | Not => acc | b,
            And | Nand => acc & b,
            Xor => acc ^ b,
        }
    }
    #[inline(always)]
    pub fn init(&self) -> bool {
        match self {
            Or | Xor | Not => false,
            And | Nand => true,
        }
    }
    pub fn is_negated(&self) -> bool {
        matches!(self, Nand | Not)
    }
    /// Returns the output of a gate of this type with `inputs`.
    pub fn fold<I: IntoIterator<Item = bool>>(&self, inputs: I) -> bool {
        let out = inputs
            .into_iter()
            .fold(self.init(), |acc, b| self.accumulate(acc, b));
        out ^ self.is_negated()
    }
}

/// Pin layout of the quad 2-input gates: 1A 1B 1Y .. 4A 4B 4Y.
pub mod quad {
    pub const A: [usize; 4] = [0, 3, 6, 9];
    pub const B: [usize; 4] = [1, 4, 7, 10];
    pub const Y: [usize; 4] = [2, 5, 8, 11];
}
const QUAD_PINS: &[PinSpec] = &[
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

/// Pin layout of the hex inverter: 1A 1Y .. 6A 6Y.
pub mod hex {
    pub const A: [usize; 6] = [0, 2, 4, 6, 8, 10];
    pub const Y: [usize; 6] = [1, 3, 5, 7, 9, 11];
}
const HEX_PINS: &[PinSpec] = &[
    PinSpec::new("1A", Input),
    PinSpec::new("1Y", Output),
    PinSpec::new("2A", Input),
    PinSpec::new("2Y", Output),
    PinSpec::new("3A", Input),
    PinSpec::new("3Y", Output),
    PinSpec::new("4A", Input),
    PinSpec::new("4Y", Output),
    PinSpec::new("5A", Input),
    PinSpec::new("5Y", Output),
    PinSpec::new("6A", Input),
    PinSpec::new("6Y", Output),
];

static QUAD_INPUTS: [[usize; 2]; 4] = [
    [quad::A[0], quad::B[0]],
    [quad::A[1], quad::B[1]],
    [quad::A[2], quad::B[2]],
    [quad::A[3], quad::B[3]],
];
static HEX_INPUTS: [[usize; 1]; 6] = [
    [hex::A[0]],
    [hex::A[1]],
    [hex::A[2]],
    [hex::A[3]],
    [hex::A[4]],
    [hex::A[5]],
];

fn quad_depends_on(output: usize) -> Option<&'static [usize]> {
    let gate = quad::Y.iter().position(|y| *y == output)?;
    Some(QUAD_INPUTS[gate].as_slice())
}

fn hex_depends_on(output: usize) -> Option<&'static [usize]> {
    let gate = hex::Y.iter().position(|y| *y == output)?;
    Some(HEX_INPUTS[gate].as_slice())
}

fn evaluate_quad(ty: GateType, levels: &[bool], drives: &mut [Drive]) {
    for gate in 0..4 {
        let inputs = [levels[quad::A[gate]], levels[quad::B[gate]]];
        drives[quad::Y[gate]] = ty.fold(inputs).into();
    }
}

/// Creates a stateless gate package with its [Behavior].
macro_rules! gate_package {
    ($name:ident, $part:expr, $pins:expr, $deps:expr, $eval:expr) => {
        #[doc = concat!("Model of the ", $part, ".")]
        #[derive(Debug, Clone, Default)]
        pub struct $name;
        impl Behavior for $name {
            const PART_NUMBER: &'static str = $part;
            const PINS: &'static [PinSpec] = $pins;
            fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
                $eval(levels, drives)
            }
            fn depends_on(&self, output: usize) -> Option<&'static [usize]> {
                $deps(output)
            }
        }
    };
}

gate_package!(Hc00, "74HC00", QUAD_PINS, quad_depends_on, |l: &[bool], d: &mut [Drive]| {
    evaluate_quad(Nand, l, d)
});
gate_package!(Hc08, "74HC08", QUAD_PINS, quad_depends_on, |l: &[bool], d: &mut [Drive]| {
    evaluate_quad(And, l, d)
});
gate_package!(Hc32, "74HC32", QUAD_PINS, quad_depends_on, |l: &[bool], d: &mut [Drive]| {
    evaluate_quad(Or, l, d)
});
gate_package!(Hc86, "74HC86", QUAD_PINS, quad_depends_on, |l: &[bool], d: &mut [Drive]| {
    evaluate_quad(Xor, l, d)
});
gate_package!(Hc04, "74HC04", HEX_PINS, hex_depends_on, |l: &[bool], d: &mut [Drive]| {
    for gate in 0..6 {
        d[hex::Y[gate]] = Not.fold([l[hex::A[gate]]]).into();
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::test_util::*;

    fn truth_table<B: Behavior + Default>(expected: [bool; 4]) {
        let mut chip = B::default();
        for (i, out) in expected.iter().enumerate() {
            let mut high = Vec::new();
            if i & 1 != 0 {
                high.extend_from_slice(&quad::A);
            }
            if i & 2 != 0 {
                high.extend_from_slice(&quad::B);
            }
            let drives = eval(&mut chip, &high);
            for y in quad::Y.iter() {
                assert_eq!(drives[*y], Drive::from(*out), "{} input {:02b}", B::PART_NUMBER, i);
            }
        }
    }

    #[test]
    fn test_quad_gates() {
        truth_table::<Hc00>([true, true, true, false]);
        truth_table::<Hc08>([false, false, false, true]);
        truth_table::<Hc32>([false, true, true, true]);
        truth_table::<Hc86>([false, true, true, false]);
    }

    #[test]
    fn test_gates_are_independent() {
        let drives = eval(&mut Hc00, &[quad::A[2], quad::B[2]]);
        assert_eq!(drives[quad::Y[2]], Drive::Low);
        assert_eq!(drives[quad::Y[1]], Drive::High);
    }

    #[test]
    fn test_gate_inputs() {
        assert_eq!(Hc00.depends_on(quad::Y[2]), Some(&[quad::A[2], quad::B[2]][..]));
        assert_eq!(Hc86.depends_on(quad::Y[0]), Some(&[quad::A[0], quad::B[0]][..]));
        assert_eq!(Hc04.depends_on(hex::Y[4]), Some(&[hex::A[4]][..]));
    }

    #[test]
    fn test_inverter() {
        let drives = eval(&mut Hc04, &[hex::A[0], hex::A[5]]);
        assert_eq!(drives[hex::Y[0]], Drive::Low);
        assert_eq!(drives[hex::Y[5]], Drive::Low);
        for gate in 1..5 {
            assert_eq!(drives[hex::Y[gate]], Drive::High);
        }
        assert_eq!(drives[hex::A[0]], Drive::HighZ);
    }
}
