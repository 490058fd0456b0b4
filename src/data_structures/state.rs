use super::{word_mask_64, BitIter};
use num_integer::div_ceil;
use unwrap::unwrap;

/// Bit-packed level of every net in a circuit.
///
/// Besides the level, [SignalState] keeps track of which nets changed level since the last call
/// to [SignalState::clear_changed], and which nets were left without a driver by the last resolve.
///
/// Bits are allocated in multiples of 64.
/// # Example
/// ```
/// # use ttlsim::data_structures::SignalState;
/// let mut s = SignalState::new(2);
///
/// assert_eq!(s.len(), 64);
///
/// assert_eq!(s.set(1, true), true);
/// assert_eq!(s.level(1), true);
/// assert_eq!(s.changed(1), true);
///
/// s.clear_changed();
/// assert_eq!(s.set(1, true), false);
/// assert_eq!(s.changed(1), false);
/// ```
///
/// # Panics
///
/// Panics if you try to read or write to an index >= [SignalState::len()]
///
/// ```should_panic
/// # use ttlsim::data_structures::SignalState;
/// let s = SignalState::new(2);
///
/// s.level(64);
/// ```
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct SignalState {
    levels: Vec<u64>,
    changed: Vec<u64>,
    floating: Vec<u64>,
}
impl SignalState {
    /// Returns a new [SignalState] with `n` bits, all low, unchanged and driven.
    pub fn new(n: usize) -> SignalState {
        let words = div_ceil(n, 64).max(1);
        SignalState {
            levels: vec![0; words],
            changed: vec![0; words],
            floating: vec![0; words],
        }
    }

    /// Returns true if the bit at `index` is 1 in vector `v`.
    #[inline(always)]
    fn get_bit_from_vec(v: &[u64], index: usize) -> bool {
        let (word_index, mask) = word_mask_64(index);
        let word = unwrap!(
            v.get(word_index),
            "Tried to access index out of bounds:{}, size:{}",
            index,
            v.len() * 64,
        );

        word & mask != 0
    }

    #[inline(always)]
    fn set_bit_in_vec(v: &mut [u64], index: usize, value: bool) {
        let (word_index, mask) = word_mask_64(index);
        let size = v.len() * 64;
        let word = unwrap!(
            v.get_mut(word_index),
            "Tried to access index out of bounds:{}, size:{}",
            index,
            size,
        );
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Returns the level of the net at `index`.
    pub fn level(&self, index: usize) -> bool {
        Self::get_bit_from_vec(&self.levels, index)
    }

    /// Returns true if the net at `index` changed level since the last [SignalState::clear_changed].
    pub fn changed(&self, index: usize) -> bool {
        Self::get_bit_from_vec(&self.changed, index)
    }

    /// Returns true if the net at `index` had no active driver when it was last resolved.
    pub fn floating(&self, index: usize) -> bool {
        Self::get_bit_from_vec(&self.floating, index)
    }

    /// Sets the level of the net at `index`.
    /// Returns true and marks the net as changed if the level is different from the previous one.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        if self.level(index) == value {
            return false;
        }
        Self::set_bit_in_vec(&mut self.levels, index, value);
        Self::set_bit_in_vec(&mut self.changed, index, true);
        true
    }

    /// Records whether the net at `index` is floating.
    pub fn set_floating(&mut self, index: usize, value: bool) {
        Self::set_bit_in_vec(&mut self.floating, index, value)
    }

    /// Resets the changed flag of every net.
    pub fn clear_changed(&mut self) {
        for changed in &mut self.changed {
            *changed = 0
        }
    }

    /// Returns the indices of every net that changed since the last [SignalState::clear_changed],
    /// in ascending order.
    pub fn iter_changed(&self) -> impl Iterator<Item = usize> + '_ {
        self.changed
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .flat_map(|(word_index, word)| {
                BitIter::new(*word)
                    .enumerate()
                    .filter(|(_, set)| *set)
                    .map(move |(bit, _)| word_index * 64 + bit)
            })
    }

    /// Returns the number of bits in the [SignalState].
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.levels.len() * 64
    }
}
