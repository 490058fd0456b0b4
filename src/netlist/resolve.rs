use super::Drive;
use crate::config::ConflictFallback;

/// Outcome of resolving the drivers of one net.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Resolution {
    pub level: bool,
    /// No driver was active, `level` is the floating level.
    pub floating: bool,
    /// Active drivers disagreed, `level` comes from the fallback.
    pub conflict: bool,
}

/// Resolves the level of a net from the drive of every pin attached to it.
///
/// # Example
/// ```
/// # use ttlsim::netlist::{resolve, Drive};
/// # use ttlsim::ConflictFallback;
/// let r = resolve([Drive::HighZ, Drive::Low], true, ConflictFallback::WiredOr);
/// assert_eq!((r.level, r.floating, r.conflict), (false, false, false));
///
/// let r = resolve([Drive::High, Drive::Low], true, ConflictFallback::WiredAnd);
/// assert_eq!((r.level, r.conflict), (false, true));
///
/// let r = resolve([Drive::HighZ], true, ConflictFallback::WiredAnd);
/// assert_eq!((r.level, r.floating), (true, true));
/// ```
pub fn resolve<I: IntoIterator<Item = Drive>>(
    drives: I,
    floating_level: bool,
    fallback: ConflictFallback,
) -> Resolution {
    let mut low = false;
    let mut high = false;
    for drive in drives {
        match drive {
            Drive::Low => low = true,
            Drive::High => high = true,
            Drive::HighZ => {}
        }
    }
    match (low, high) {
        (false, false) => Resolution {
            level: floating_level,
            floating: true,
            conflict: false,
        },
        (true, true) => Resolution {
            level: match fallback {
                ConflictFallback::WiredAnd => false,
                ConflictFallback::WiredOr => true,
                ConflictFallback::Undefined => floating_level,
            },
            floating: false,
            conflict: true,
        },
        (_, level) => Resolution {
            level,
            floating: false,
            conflict: false,
        },
    }
}
