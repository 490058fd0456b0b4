use crate::netlist::Signal;
use auto_from::From;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Malformed static topology, detected while the circuit is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    UnknownPin { part: String, pin: String },
    PinAlreadyConnected { part: String, pin: String },
    /// An output pin was tied to GND or VCC.
    DrivesRail { part: String, pin: String },
    WidthMismatch {
        part: String,
        expected: usize,
        actual: usize,
    },
    DuplicateName(String),
    /// A cycle that does not cross a clocked boundary, listing the parts involved.
    CombinationalLoop(Vec<String>),
}

impl Display for WiringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WiringError::UnknownPin { part, pin } => write!(f, "{} has no pin named {}", part, pin),
            WiringError::PinAlreadyConnected { part, pin } => {
                write!(f, "pin {}.{} is already connected", part, pin)
            }
            WiringError::DrivesRail { part, pin } => {
                write!(f, "output {}.{} is tied to a power rail", part, pin)
            }
            WiringError::WidthMismatch {
                part,
                expected,
                actual,
            } => write!(
                f,
                "{} expects {} nets but {} were supplied",
                part, expected, actual
            ),
            WiringError::DuplicateName(name) => write!(f, "{} is defined twice", name),
            WiringError::CombinationalLoop(parts) => {
                write!(f, "combinational loop through {}", parts.join(", "))
            }
        }
    }
}

impl Error for WiringError {}

/// One pin actively driving a conflicting net.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConflictDriver {
    pub part: String,
    pub pin: &'static str,
    pub level: Signal,
}

/// Two or more drivers asserting different levels on the same net in a settled state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BusConflict {
    pub step: u64,
    pub net: String,
    pub drivers: Vec<ConflictDriver>,
    /// Level the net was resolved to by the configured fallback.
    pub resolved: Signal,
}

impl Display for BusConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: bus conflict on {} between ", self.step, self.net)?;
        for (i, driver) in self.drivers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}.{}={}", driver.part, driver.pin, driver.level)?;
        }
        write!(f, " (resolved {})", self.resolved)
    }
}

impl Error for BusConflict {}

/// Combinational settling did not reach a fixed point within the pass cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleDivergence {
    pub step: u64,
    pub passes: usize,
    /// Parts that were still scheduled when the cap was hit.
    pub unstable: Vec<String>,
}

impl Display for SettleDivergence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: circuit did not settle after {} passes, unstable parts: {}",
            self.step,
            self.passes,
            self.unstable.join(", ")
        )
    }
}

impl Error for SettleDivergence {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomLoadError {
    TooLarge { len: usize, capacity: usize },
    Malformed(String),
}

impl Display for RomLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RomLoadError::TooLarge { len, capacity } => write!(
                f,
                "image of {} bytes does not fit in {} bytes of ROM",
                len, capacity
            ),
            RomLoadError::Malformed(reason) => write!(f, "malformed ROM image: {}", reason),
        }
    }
}

impl Error for RomLoadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinAccessError {
    UnknownPart(String),
    UnknownPin { part: String, pin: String },
    UnknownBus(String),
    /// The part exists but its pins can't be driven from outside the simulation.
    NotAnInput(String),
}

impl Display for PinAccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PinAccessError::UnknownPart(part) => write!(f, "there is no part named {}", part),
            PinAccessError::UnknownPin { part, pin } => {
                write!(f, "{} has no pin named {}", part, pin)
            }
            PinAccessError::UnknownBus(bus) => write!(f, "there is no bus named {}", bus),
            PinAccessError::NotAnInput(part) => write!(f, "{} is not an external input", part),
        }
    }
}

impl Error for PinAccessError {}

/// Any error the simulation can return.
#[derive(From, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    Wiring(WiringError),
    BusConflict(BusConflict),
    SettleDivergence(SettleDivergence),
    RomLoad(RomLoadError),
    PinAccess(PinAccessError),
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Wiring(e) => write!(f, "wiring error: {}", e),
            SimError::BusConflict(e) => e.fmt(f),
            SimError::SettleDivergence(e) => e.fmt(f),
            SimError::RomLoad(e) => e.fmt(f),
            SimError::PinAccess(e) => e.fmt(f),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::Wiring(e) => Some(e),
            SimError::BusConflict(e) => Some(e),
            SimError::SettleDivergence(e) => Some(e),
            SimError::RomLoad(e) => Some(e),
            SimError::PinAccess(e) => Some(e),
        }
    }
}
