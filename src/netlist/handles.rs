use super::{Circuit, NetIndex, PartIndex, Signal};
use concat_idents::concat_idents;
use serde::Serialize;
use smallvec::SmallVec;

/// Inline capacity of bus vectors, the machine's widest bus has 16 bits.
pub(super) const BUS_TINYVEC_SIZE: usize = 16;

/// An ordered group of nets with a name, least significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    pub(super) name: String,
    pub(super) bits: SmallVec<[NetIndex; BUS_TINYVEC_SIZE]>,
}
impl Bus {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn bits(&self) -> &[NetIndex] {
        &self.bits
    }
    pub fn bit(&self, n: usize) -> NetIndex {
        self.bits[n]
    }
    pub fn width(&self) -> usize {
        self.bits.len()
    }
    /// Returns the nets in `range` of the bus.
    pub fn slice(&self, range: std::ops::Range<usize>) -> &[NetIndex] {
        &self.bits[range]
    }
}

/// Handle to a lever, the only kind of part whose level can be set from outside.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LeverHandle {
    pub(super) part: PartIndex,
    pub(super) net: NetIndex,
}
impl LeverHandle {
    /// Returns the net the lever drives.
    pub fn net(&self) -> NetIndex {
        self.net
    }
    pub fn part(&self) -> PartIndex {
        self.part
    }
}

/// Named group of nets registered for observation.
#[derive(Debug, Clone)]
pub struct Probe {
    pub(super) name: String,
    pub(super) bits: SmallVec<[NetIndex; BUS_TINYVEC_SIZE]>,
}

/// Value of a group of nets at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BusValue {
    pub value: u64,
    pub width: usize,
    /// Bit n is set if net n had no active driver.
    pub floating: u64,
}

macro_rules! probe_readers {
    ($ty:ident,$($rest:ident),*) => {
        probe_readers!($ty);
        probe_readers!($($rest),*);
    };
    ($ty:ident) => {
        /// Returns the probed value, truncated or zero extended to the type.
        pub fn $ty(self, c: &Circuit) -> $ty {
            c.probe_value(self).value as $ty
        }
        concat_idents!(print_t = print, _, $ty {
            pub fn print_t(self, c: &Circuit) {
                println!("{}: {}", c.probe_name(self), self.$ty(c));
            }
        });
    };
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProbeHandle(pub(super) usize);
impl ProbeHandle {
    probe_readers!(u8, u16, u32, u64);

    /// Returns the level of bit `n` of the probe.
    pub fn bx(self, c: &Circuit, n: usize) -> Signal {
        ((self.u64(c) >> n) & 1 == 1).into()
    }
    pub fn b0(self, c: &Circuit) -> Signal {
        self.bx(c, 0)
    }
}
