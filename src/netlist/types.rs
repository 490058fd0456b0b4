use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Resolved logic level of a net.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Signal {
    Low,
    High,
}
impl Signal {
    pub fn is_high(self) -> bool {
        self == Signal::High
    }
    pub fn is_low(self) -> bool {
        self == Signal::Low
    }
}
impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b {
            Signal::High
        } else {
            Signal::Low
        }
    }
}
impl From<Signal> for bool {
    fn from(s: Signal) -> Self {
        s.is_high()
    }
}
impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Low => "0",
            Signal::High => "1",
        })
    }
}

/// What an output pin asserts on its net.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum Drive {
    Low,
    High,
    #[default]
    HighZ,
}
impl Drive {
    /// Returns the level being driven, or None if the pin is in high impedance.
    pub fn level(self) -> Option<bool> {
        match self {
            Drive::Low => Some(false),
            Drive::High => Some(true),
            Drive::HighZ => None,
        }
    }
    /// Returns [Drive::High] or [Drive::Low] if `enable` and [Drive::HighZ] otherwise.
    pub fn enabled_if(enable: bool, level: bool) -> Self {
        if enable {
            level.into()
        } else {
            Drive::HighZ
        }
    }
}
impl From<bool> for Drive {
    fn from(b: bool) -> Self {
        if b {
            Drive::High
        } else {
            Drive::Low
        }
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct NetIndex {
    pub idx: usize,
}
impl Display for NetIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}
#[macro_export]
macro_rules! ni {
    ( $x:expr ) => {{
        $crate::netlist::NetIndex::new($x)
    }};
}
/// Ground rail, always low.
pub const GND: NetIndex = ni!(0);
/// Supply rail, always high.
pub const VCC: NetIndex = ni!(1);

impl NetIndex {
    pub const fn new(idx: usize) -> NetIndex {
        NetIndex { idx }
    }
    #[inline(always)]
    pub fn is_rail(&self) -> bool {
        *self == GND || *self == VCC
    }
    /// Returns the level of the rail, or None if the net is not a rail.
    pub fn rail_level(&self) -> Option<bool> {
        if *self == VCC {
            Some(true)
        } else if *self == GND {
            Some(false)
        } else {
            None
        }
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct PartIndex {
    pub idx: usize,
}
impl PartIndex {
    pub const fn new(idx: usize) -> PartIndex {
        PartIndex { idx }
    }
}
impl Display for PartIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}
