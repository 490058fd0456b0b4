//! Control lines and the contents of the control ROMs.
//!
//! Control ROM address layout:
//!
//! | STEP  | OPCODE | CF  | ZF  |
//! | 4 bits| 4 bits | 1bit| 1bit|
//! | b0-b3 | b4-b7  | b8  | b9  |
//!
//! Each address holds a 24 bit control word split across three ROMs, bits 0-7 in the first one.
use crate::isa::Opcode;
use smallvec::{smallvec, SmallVec};
use strum::IntoEnumIterator;
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};

/// Lines driven by the control ROMs, the discriminant is the bit in the control word.
#[allow(clippy::upper_case_acronyms)]
#[repr(u8)]
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, EnumIter, EnumCount, IntoStaticStr)]
pub enum ControlSignal {
    // Halt, inhibits the clock.
    HLT = 0,
    // Memory address register in.
    MI,
    // RAM in.
    RI,
    // RAM out.
    RO,
    // Instruction register operand out.
    IO,
    // Instruction register in.
    II,
    // Register A in.
    AI,
    // Register A out.
    AO,
    // ALU out.
    EO,
    // ALU subtracts.
    SU,
    // Register B in.
    BI,
    // Output register in.
    OI,
    // Program counter enable.
    CE,
    // Program counter load.
    J,
    // Flags in.
    FI,
    // Program ROM out.
    PO,
    // Step counter reset.
    SR,
}

/// Lines in a control word, including the spare ones.
pub const CONTROL_WIDTH: usize = 24;
pub const STEP_BITS: usize = 4;
/// Step counter modulus.
pub const MAX_STEPS: usize = 1 << STEP_BITS;
/// Addresses used in each control ROM.
pub const MICROCODE_LENGTH: usize = 1 << 10;

impl ControlSignal {
    pub fn mask(self) -> u32 {
        1 << self as u32
    }

    pub fn is_active_low(self) -> bool {
        use ControlSignal::*;
        !matches!(self, HLT | RI | SU | CE | FI)
    }

    /// Returns the name of the backplane net carrying the line, with a `/` prefix if active low.
    pub fn net_name(self) -> String {
        let name: &'static str = self.into();
        if self.is_active_low() {
            format!("/{}", name)
        } else {
            name.to_string()
        }
    }

    /// Returns the mask of every active low line.
    pub fn active_low_mask() -> u32 {
        ControlSignal::iter()
            .filter(|s| s.is_active_low())
            .fold(0, |mask, s| mask | s.mask())
    }
}

#[macro_export]
/// Returns the control word with every signal in the list asserted.
macro_rules! control_word {
    () => {
        0u32
    };
    ($signal:ident) => {
        $crate::microcode::ControlSignal::$signal.mask()
    };
    ($signal:ident, $($rest:ident),+) => {
        $crate::control_word!($signal) | $crate::control_word!($($rest),+)
    };
}

/// Returns the control ROM address of a micro step.
pub fn address(step: usize, opcode: u8, carry: bool, zero: bool) -> usize {
    (step & (MAX_STEPS - 1)) | ((opcode as usize & 0xf) << 4) | (carry as usize) << 8 | (zero as usize) << 9
}

type Steps = SmallVec<[u32; 4]>;

/// Returns the micro steps run after the fetch, unassigned opcodes behave like NOP.
fn instruction_steps(opcode: Option<Opcode>, carry: bool, zero: bool) -> Steps {
    use Opcode::*;
    let jump_if = |condition: bool| -> Steps {
        if condition {
            smallvec![control_word!(IO, J, SR)]
        } else {
            smallvec![control_word!(SR)]
        }
    };
    match opcode {
        None | Some(NOP) => smallvec![control_word!(SR)],
        Some(LDA) => smallvec![control_word!(IO, MI), control_word!(RO, AI, SR)],
        Some(ADD) => smallvec![
            control_word!(IO, MI),
            control_word!(RO, BI),
            control_word!(EO, AI, FI, SR)
        ],
        Some(SUB) => smallvec![
            control_word!(IO, MI),
            control_word!(RO, BI),
            control_word!(EO, AI, SU, FI, SR)
        ],
        Some(STA) => smallvec![control_word!(IO, MI), control_word!(AO, RI, SR)],
        Some(LDI) => smallvec![control_word!(IO, AI, SR)],
        Some(JMP) => jump_if(true),
        Some(JC) => jump_if(carry),
        Some(JZ) => jump_if(zero),
        Some(ADI) => smallvec![control_word!(IO, BI), control_word!(EO, AI, FI, SR)],
        Some(SBI) => smallvec![control_word!(IO, BI), control_word!(EO, AI, SU, FI, SR)],
        Some(OUT) => smallvec![control_word!(AO, OI, SR)],
        Some(HLT) => smallvec![control_word!(HLT)],
    }
}

/// Returns the control word of a micro step with every line active high.
///
/// Step 0 is always the fetch, steps past the end of an instruction reset the step counter.
pub fn micro_step(step: usize, opcode: u8, carry: bool, zero: bool) -> u32 {
    if step == 0 {
        return control_word!(PO, II, CE);
    }
    let opcode = Opcode::try_from(opcode).ok();
    instruction_steps(opcode, carry, zero)
        .get(step - 1)
        .copied()
        .unwrap_or(control_word!(SR))
}

/// Returns the logical control word of every control ROM address.
pub fn build_microcode() -> Vec<u32> {
    let mut out = vec![0; MICROCODE_LENGTH];
    for (address, word) in out.iter_mut().enumerate() {
        let step = address & (MAX_STEPS - 1);
        let opcode = ((address >> 4) & 0xf) as u8;
        let carry = address & (1 << 8) != 0;
        let zero = address & (1 << 9) != 0;
        *word = micro_step(step, opcode, carry, zero);
    }
    out
}

/// Returns the images of the three control ROMs, with active low lines inverted.
pub fn control_rom_images() -> [Vec<u8>; 3] {
    let invert = ControlSignal::active_low_mask();
    let words: Vec<u32> = build_microcode().iter().map(|word| word ^ invert).collect();
    let byte = |n: usize| words.iter().map(|word| (word >> (8 * n)) as u8).collect();
    [byte(0), byte(1), byte(2)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn test_control_word() {
        assert_eq!(control_word!(), 0);
        assert_eq!(control_word!(HLT), 1);
        assert_eq!(control_word!(MI, RI), 0b110);
        assert_eq!(control_word!(RI, MI), 0b110);
        assert_eq!(control_word!(SR), 1 << 16);
        assert!(ControlSignal::COUNT <= CONTROL_WIDTH);
    }

    #[test]
    fn test_net_names() {
        assert_eq!(ControlSignal::HLT.net_name(), "HLT");
        assert_eq!(ControlSignal::AO.net_name(), "/AO");
        assert_eq!(ControlSignal::SU.net_name(), "SU");
    }

    #[test]
    fn test_fetch() {
        for opcode in 0..16 {
            assert_eq!(micro_step(0, opcode, false, true), control_word!(PO, II, CE));
        }
    }

    #[test]
    fn test_conditional_jumps() {
        let jc = Opcode::JC as u8;
        let jz = Opcode::JZ as u8;
        assert_eq!(micro_step(1, jc, true, false), control_word!(IO, J, SR));
        assert_eq!(micro_step(1, jc, false, true), control_word!(SR));
        assert_eq!(micro_step(1, jz, false, true), control_word!(IO, J, SR));
        assert_eq!(micro_step(1, jz, true, false), control_word!(SR));
    }

    #[test]
    fn test_every_instruction_ends() {
        for opcode in 0..15 {
            let ends = (1..MAX_STEPS).any(|step| micro_step(step, opcode, false, false) & control_word!(SR) != 0);
            assert!(ends, "opcode {} never resets the step counter", opcode);
        }
        assert_eq!(micro_step(1, 12, false, false), control_word!(SR));
    }

    #[test]
    fn test_images() {
        let [low, mid, high] = control_rom_images();
        assert_eq!(low.len(), MICROCODE_LENGTH);
        // NOP step 1 asserts only SR.
        let a = address(1, 0, false, false);
        let idle = ControlSignal::active_low_mask() & !control_word!(SR);
        assert_eq!(low[a], idle as u8);
        assert_eq!(mid[a], (idle >> 8) as u8);
        assert_eq!(high[a], (idle >> 16) as u8);
        // Spare lines stay low.
        assert_eq!(high[a] & 0xfe, 0);
    }
}
