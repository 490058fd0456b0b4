use crate::data_structures::BitIter;
use crate::error::WiringError;
use crate::netlist::*;

/// Group of levers driving a word, registered as a probe with the same name.
///
/// # Example
/// ```
/// # use ttlsim::netlist::CircuitBuilder;
/// # use ttlsim::circuits::WordInput;
/// let mut g = CircuitBuilder::new();
/// let input = WordInput::new(&mut g, 3, "input").unwrap();
///
/// let c = &mut g.build().unwrap();
/// c.settle().unwrap();
/// assert_eq!(input.probe().u8(c), 0);
///
/// input.set_to(c, 2u64);
/// c.settle().unwrap();
/// assert_eq!(input.probe().u8(c), 2);
///
/// input.set_bit(c, 0);
/// c.settle().unwrap();
/// assert_eq!(input.probe().u8(c), 3);
///
/// input.flip_bit(c, 1);
/// c.settle().unwrap();
/// assert_eq!(input.probe().u8(c), 1);
/// ```
#[derive(Debug, Clone)]
pub struct WordInput {
    levers: Vec<LeverHandle>,
    probe: ProbeHandle,
}

impl WordInput {
    /// Returns a new [WordInput] of width `width` with every lever low,
    /// lever n and its net are called `name[n]`.
    pub fn new<S: Into<String>>(
        g: &mut CircuitBuilder,
        width: usize,
        name: S,
    ) -> Result<Self, WiringError> {
        let name = name.into();
        let levers = (0..width)
            .map(|i| g.lever(format!("{}[{}]", name, i), false))
            .collect::<Result<Vec<_>, _>>()?;
        let nets: Vec<NetIndex> = levers.iter().map(|lever| lever.net()).collect();
        let probe = g.probe(name, &nets)?;
        Ok(Self { levers, probe })
    }

    /// Returns the nets driven by the levers, least significant first.
    pub fn bits(&self) -> Vec<NetIndex> {
        self.levers.iter().map(|lever| lever.net()).collect()
    }

    pub fn probe(&self) -> ProbeHandle {
        self.probe
    }

    pub fn len(&self) -> usize {
        self.levers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levers.is_empty()
    }

    /// Sets the lever at index `bit` to `value`.
    pub fn update_bit(&self, c: &mut Circuit, bit: usize, value: bool) -> Option<()> {
        let lever = self.levers.get(bit)?;
        c.set_lever(*lever, value);
        Some(())
    }

    pub fn set_bit(&self, c: &mut Circuit, bit: usize) -> Option<()> {
        self.update_bit(c, bit, true)
    }

    pub fn reset_bit(&self, c: &mut Circuit, bit: usize) -> Option<()> {
        self.update_bit(c, bit, false)
    }

    /// Flips the lever at index `bit`.
    pub fn flip_bit(&self, c: &mut Circuit, bit: usize) -> Option<()> {
        let lever = self.levers.get(bit)?;
        let level = c.chip(lever.part()).as_lever()?.level();
        c.set_lever(*lever, !level);
        Some(())
    }

    /// Sets the levers to the bits of `value`, bits past the width are ignored.
    pub fn set_to<T: Into<u64>>(&self, c: &mut Circuit, value: T) {
        let width = self.levers.len().min(64) as u8;
        for (lever, bit) in self.levers.iter().zip(BitIter::with_width(value, width)) {
            c.set_lever(*lever, bit);
        }
    }
}
