//! Builder functions for the modules of the machine.
//!
//! Every module adds its parts under its own name prefix, and only touches the backplane nets
//! it is handed.
mod alu;
mod clock;
mod control;
mod instruction_register;
mod memory;
mod program_counter;
mod program_rom;
mod register;
mod reset;
mod word_input;
pub use alu::*;
pub use clock::*;
pub use control::*;
pub use instruction_register::*;
pub use memory::*;
pub use program_counter::*;
pub use program_rom::*;
pub use register::*;
pub use reset::*;
pub use word_input::*;

/// Width of the data bus and of every register.
pub const WORD: usize = 16;
