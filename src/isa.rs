//! Instruction encoding of the machine.
//!
//! | OPCODE  | OPERAND  |
//! | 4 bits  | 12 bits  |
//! | b15-b12 | b11-b0   |
use num_enum::TryFromPrimitive;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

pub const OPCODE_LENGTH: u8 = 4;
pub const OPERAND_LENGTH: u8 = 12;
pub const OPERAND_MASK: u16 = (1 << OPERAND_LENGTH) - 1;

#[allow(clippy::upper_case_acronyms)]
#[repr(u8)]
#[derive(
    Debug,
    Eq,
    PartialEq,
    Hash,
    Copy,
    Clone,
    EnumIter,
    EnumString,
    IntoStaticStr,
    TryFromPrimitive,
    Serialize,
)]
pub enum Opcode {
    // Does nothing.
    NOP = 0,
    // Loads register A from a memory address.
    LDA = 1,
    // Adds the value at a memory address to register A.
    ADD = 2,
    // Subtracts the value at a memory address from register A.
    SUB = 3,
    // Stores register A at a memory address.
    STA = 4,
    // Loads register A with the operand.
    LDI = 5,
    // Jumps to the operand.
    JMP = 6,
    // Jumps to the operand if the carry flag is set.
    JC = 7,
    // Jumps to the operand if the zero flag is set.
    JZ = 8,
    // Adds the operand to register A.
    ADI = 9,
    // Subtracts the operand from register A.
    SBI = 10,
    // Copies register A to the output register.
    OUT = 11,
    // Stops the clock until the machine is reset.
    HLT = 15,
}

impl Opcode {
    /// Returns the opcode encoded in the top bits of `word`, None for unassigned opcodes.
    pub fn decode(word: u16) -> Option<Opcode> {
        Opcode::try_from((word >> OPERAND_LENGTH) as u8).ok()
    }

    pub fn takes_operand(self) -> bool {
        !matches!(self, Opcode::NOP | Opcode::OUT | Opcode::HLT)
    }

    pub fn with_operand(self, operand: u16) -> Instruction {
        Instruction {
            opcode: self,
            operand: operand & OPERAND_MASK,
        }
    }

    pub fn with_0(self) -> Instruction {
        self.with_operand(0)
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    // Always fits in 12 bits.
    pub operand: u16,
}

impl Instruction {
    pub fn encode(self) -> u16 {
        (self.opcode as u16) << OPERAND_LENGTH | self.operand
    }

    /// Returns the instruction in `word`, None if its opcode is unassigned.
    pub fn decode(word: u16) -> Option<Instruction> {
        Opcode::decode(word).map(|opcode| opcode.with_operand(word))
    }
}

impl From<Instruction> for u16 {
    fn from(i: Instruction) -> Self {
        i.encode()
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.opcode.takes_operand() {
            write!(f, "{} {}", self.opcode, self.operand)
        } else {
            write!(f, "{}", self.opcode)
        }
    }
}

/// Returns the program ROM image of `program`, one little endian word per instruction.
///
/// # Example
/// ```
/// # use ttlsim::isa::{assemble, Opcode::*};
/// let image = assemble(&[LDI.with_operand(5), OUT.with_0(), HLT.with_0()]);
///
/// assert_eq!(image, vec![0x05, 0x50, 0x00, 0xb0, 0x00, 0xf0]);
/// ```
pub fn assemble(program: &[Instruction]) -> Vec<u8> {
    program
        .iter()
        .flat_map(|i| i.encode().to_le_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use Opcode::*;

    #[test]
    fn test_decode() {
        for opcode in Opcode::iter() {
            let i = opcode.with_operand(0xabc);
            assert_eq!(Instruction::decode(i.encode()), Some(i));
        }
        assert_eq!(Opcode::decode(0xc123), None);
        assert_eq!(Opcode::decode(0xffff), Some(HLT));
    }

    #[test]
    fn test_operand_truncated() {
        assert_eq!(LDI.with_operand(0xf123).encode(), 0x5123);
    }

    #[test]
    fn test_display() {
        assert_eq!(ADI.with_operand(1).to_string(), "ADI 1");
        assert_eq!(HLT.with_0().to_string(), "HLT");
        assert_eq!(Opcode::from_str("SBI"), Ok(SBI));
    }
}
