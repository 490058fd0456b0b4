use super::{Behavior, PinKind::*, PinSpec};
use crate::netlist::Drive;

pub mod lever {
    pub const OUT: usize = 0;
}

/// Source driven from outside the circuit: a switch, a button or a clock phase.
///
/// Keeps its level across resets.
#[derive(Debug, Clone, Default)]
pub struct Lever {
    level: bool,
}
impl Lever {
    pub fn new(level: bool) -> Self {
        Lever { level }
    }
    pub fn level(&self) -> bool {
        self.level
    }
    /// Returns true if the level changed.
    pub fn set(&mut self, level: bool) -> bool {
        std::mem::replace(&mut self.level, level) != level
    }
}
impl Behavior for Lever {
    const PART_NUMBER: &'static str = "LEVER";
    const PINS: &'static [PinSpec] = &[PinSpec::new("OUT", Output)];

    fn evaluate(&mut self, _levels: &[bool], drives: &mut [Drive]) {
        drives[lever::OUT] = self.level.into();
    }

    fn registers(&self) -> Vec<(&'static str, u64)> {
        vec![("level", self.level as u64)]
    }
}
