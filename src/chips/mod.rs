//! Behavioral models of the integrated circuits the machine is built from.
//!
//! Every model implements [Behavior] and is wrapped in the [Chip] enum so the simulation
//! can store parts of different types side by side.
mod arithmetic;
mod counters;
mod flip_flops;
mod gates;
mod levers;
mod memory;
mod mux;
mod transceivers;

pub use arithmetic::*;
pub use counters::*;
pub use flip_flops::*;
pub use gates::*;
pub use levers::*;
pub use memory::*;
pub use mux::*;
pub use transceivers::*;

use crate::data_structures::{collect_word, BitIter};
use crate::netlist::Drive;

/// How a pin interacts with its net.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PinKind {
    /// Combinational input, a level change re-evaluates the part.
    Input,
    /// Only read when the part is clocked.
    Sampled,
    /// Rising edge trigger, also re-evaluates the part on any change.
    Clock,
    /// Push-pull output.
    Output,
    /// Output that can float.
    TriState,
    /// Combinational input and tri-state output on the same pin.
    InOut,
    /// Tri-state output whose input side is only read when the part is clocked.
    SampledInOut,
}
impl PinKind {
    /// Returns true if the pin can put a level on its net.
    pub fn drives(self) -> bool {
        matches!(
            self,
            PinKind::Output | PinKind::TriState | PinKind::InOut | PinKind::SampledInOut
        )
    }
    /// Returns true if a change on the net must re-evaluate the part.
    pub fn is_combinational(self) -> bool {
        matches!(self, PinKind::Input | PinKind::Clock | PinKind::InOut)
    }
    pub fn is_clock(self) -> bool {
        self == PinKind::Clock
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PinSpec {
    pub name: &'static str,
    pub kind: PinKind,
}
impl PinSpec {
    pub const fn new(name: &'static str, kind: PinKind) -> Self {
        PinSpec { name, kind }
    }
}

/// Contract shared by every part model.
///
/// `levels` always has one entry per pin in [Behavior::PINS] order. Unconnected pins read the floating level.
pub trait Behavior {
    /// Catalog name, e.g. "74HC377".
    const PART_NUMBER: &'static str;
    const PINS: &'static [PinSpec];

    /// Computes the drive of every output pin from the current pin levels and internal state.
    /// `drives` starts out as [Drive::HighZ] for every pin.
    fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]);

    /// Captures the next internal state after the net of `clock` rose.
    /// `levels` is the settled snapshot from before the edge.
    fn clock_edge(&mut self, _clock: usize, _levels: &[bool]) {}

    /// Puts the volatile state in its power-on value.
    fn reset(&mut self) {}

    /// Named internal values, used in state dumps.
    fn registers(&self) -> Vec<(&'static str, u64)> {
        Vec::new()
    }

    /// Returns the effective kind of `pin` given which pins are tied to a rail.
    ///
    /// `tied[pin]` is the level of the rail a pin is tied to, if any.
    fn static_kind(&self, pin: usize, _tied: &[Option<bool>]) -> PinKind {
        Self::PINS[pin].kind
    }

    /// Returns the input pins the level of `output` is computed from,
    /// `None` stands for every combinational input of the part.
    fn depends_on(&self, _output: usize) -> Option<&'static [usize]> {
        None
    }
}

/// Returns the word formed by the levels of `pins`, least significant first.
pub fn read_word(levels: &[bool], pins: &[usize]) -> u64 {
    collect_word(pins.iter().map(|pin| levels[*pin]))
}

/// Drives `value` onto `pins`, least significant first, or leaves them floating if `enable` is false.
pub fn drive_word(drives: &mut [Drive], pins: &[usize], value: u64, enable: bool) {
    for (pin, bit) in pins.iter().zip(BitIter::with_width(value, pins.len() as u8)) {
        drives[*pin] = Drive::enabled_if(enable, bit);
    }
}

/// Defines [Chip] as the sum of every part model and dispatches the [Behavior] methods to them.
macro_rules! chip_set {
    ($($chip:ident),+ $(,)?) => {
        /// Any modeled part.
        #[derive(Debug, Clone)]
        pub enum Chip {
            $($chip($chip)),+
        }

        $(
            impl From<$chip> for Chip {
                fn from(c: $chip) -> Self {
                    Chip::$chip(c)
                }
            }
        )+

        impl Chip {
            pub fn part_number(&self) -> &'static str {
                match self {
                    $(Chip::$chip(_) => $chip::PART_NUMBER),+
                }
            }
            pub fn pins(&self) -> &'static [PinSpec] {
                match self {
                    $(Chip::$chip(_) => $chip::PINS),+
                }
            }
            pub fn evaluate(&mut self, levels: &[bool], drives: &mut [Drive]) {
                match self {
                    $(Chip::$chip(c) => c.evaluate(levels, drives)),+
                }
            }
            pub fn clock_edge(&mut self, clock: usize, levels: &[bool]) {
                match self {
                    $(Chip::$chip(c) => c.clock_edge(clock, levels)),+
                }
            }
            pub fn reset(&mut self) {
                match self {
                    $(Chip::$chip(c) => c.reset()),+
                }
            }
            pub fn registers(&self) -> Vec<(&'static str, u64)> {
                match self {
                    $(Chip::$chip(c) => c.registers()),+
                }
            }
            pub fn static_kind(&self, pin: usize, tied: &[Option<bool>]) -> PinKind {
                match self {
                    $(Chip::$chip(c) => c.static_kind(pin, tied)),+
                }
            }
            pub fn depends_on(&self, output: usize) -> Option<&'static [usize]> {
                match self {
                    $(Chip::$chip(c) => c.depends_on(output)),+
                }
            }
        }
    };
}

chip_set!(
    Hc00, Hc04, Hc08, Hc32, Hc86, Hc74, Hc157, Hc163, Hc245, Hc283, Hc377, Hc688, At28C256,
    Sram62256, Lever,
);

impl Chip {
    /// Returns the index of the pin called `name`.
    pub fn pin_named(&self, name: &str) -> Option<usize> {
        self.pins().iter().position(|pin| pin.name == name)
    }

    pub fn as_lever(&self) -> Option<&Lever> {
        match self {
            Chip::Lever(lever) => Some(lever),
            _ => None,
        }
    }

    pub fn as_lever_mut(&mut self) -> Option<&mut Lever> {
        match self {
            Chip::Lever(lever) => Some(lever),
            _ => None,
        }
    }

    pub fn as_rom_mut(&mut self) -> Option<&mut At28C256> {
        match self {
            Chip::At28C256(rom) => Some(rom),
            _ => None,
        }
    }

    pub fn as_rom(&self) -> Option<&At28C256> {
        match self {
            Chip::At28C256(rom) => Some(rom),
            _ => None,
        }
    }

    pub fn as_ram(&self) -> Option<&Sram62256> {
        match self {
            Chip::Sram62256(ram) => Some(ram),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Evaluates `chip` with every pin low except the ones in `high`.
    pub fn eval<B: Behavior>(chip: &mut B, high: &[usize]) -> Vec<Drive> {
        let levels = levels::<B>(high);
        let mut drives = vec![Drive::HighZ; B::PINS.len()];
        chip.evaluate(&levels, &mut drives);
        drives
    }

    pub fn levels<B: Behavior>(high: &[usize]) -> Vec<bool> {
        let mut levels = vec![false; B::PINS.len()];
        for pin in high {
            levels[*pin] = true;
        }
        levels
    }

    /// Returns the pins in `pins` whose level in `word` is high.
    pub fn word_pins(pins: &[usize], word: u64) -> Vec<usize> {
        pins.iter()
            .zip(BitIter::with_width(word, pins.len() as u8))
            .filter(|(_, bit)| *bit)
            .map(|(pin, _)| *pin)
            .collect()
    }

    pub fn driven_word(drives: &[Drive], pins: &[usize]) -> Option<u64> {
        let bits: Option<Vec<bool>> = pins.iter().map(|pin| drives[*pin].level()).collect();
        bits.map(collect_word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_word() {
        let mut drives = vec![Drive::HighZ; 4];
        drive_word(&mut drives, &[3, 1], 0b01, true);
        assert_eq!(
            drives,
            vec![Drive::HighZ, Drive::Low, Drive::HighZ, Drive::High]
        );
        drive_word(&mut drives, &[3, 1], 0b11, false);
        assert_eq!(drives, vec![Drive::HighZ; 4]);
    }

    #[test]
    fn test_read_word() {
        assert_eq!(read_word(&[true, false, true, true], &[0, 1, 3]), 0b101);
    }

    #[test]
    fn test_pin_named() {
        let chip: Chip = Hc377::default().into();
        assert_eq!(chip.pin_named("CLK"), Some(hc377::CLK));
        assert_eq!(chip.pin_named("Q7"), Some(hc377::Q[7]));
        assert_eq!(chip.pin_named("nope"), None);
        assert_eq!(chip.part_number(), "74HC377");
    }

    #[test]
    fn test_pin_kinds() {
        assert!(PinKind::InOut.drives());
        assert!(PinKind::InOut.is_combinational());
        assert!(PinKind::SampledInOut.drives());
        assert!(!PinKind::SampledInOut.is_combinational());
        assert!(PinKind::Clock.is_combinational());
        assert!(!PinKind::Sampled.is_combinational());
    }
}
