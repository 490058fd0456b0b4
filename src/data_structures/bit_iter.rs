/// Returns the index and mask necessary to access the bit at `index` in a ```&[u64]```.
///
/// # Example
///
/// ```
/// # use ttlsim::data_structures::word_mask_64;
/// let word_slice = [0u64, 1u64];
/// let bit_index = 64;
///
/// let (word_index, mask) = word_mask_64(bit_index);
/// let bit_set = (word_slice[word_index] & mask) != 0;
///
/// assert_eq!(bit_set, true);
/// ```
#[inline(always)]
pub fn word_mask_64(index: usize) -> (usize, u64) {
    let word = index / 64;
    let mask = 1 << (index % 64);
    (word, mask)
}

/// Iterates over the low `width` bits of a word, least significant bit first.
///
/// Used to spread bus values onto pins and to walk bit-packed state.
///
/// # Example
/// ```
/// # use ttlsim::data_structures::BitIter;
/// let mut bits = BitIter::new(0b101u8);
///
/// assert_eq!(bits.next(), Some(true));
/// assert_eq!(bits.next(), Some(false));
/// assert_eq!(bits.next(), Some(true));
/// assert_eq!(bits.len(), 5);
///
/// let word: Vec<bool> = BitIter::with_width(0xffu16, 4).collect();
/// assert_eq!(word, vec![true; 4]);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BitIter {
    item: u64,
    i: u8,
    width: u8,
}
impl BitIter {
    /// Returns a new [BitIter] over every bit of `item`.
    pub fn new<T: Into<u64>>(item: T) -> Self {
        let width = (std::mem::size_of::<T>() * 8) as u8;
        Self::with_width(item, width)
    }

    /// Returns a new [BitIter] over the low `width` bits of `item`.
    ///
    /// # Panics
    ///
    /// Will panic if `width` > 64.
    pub fn with_width<T: Into<u64>>(item: T, width: u8) -> Self {
        assert!(width <= 64, "Can't iterate over {} bits of a u64", width);
        Self {
            item: item.into(),
            i: 0,
            width,
        }
    }

    /// Returns true if none of the remaining bits are set.
    ///
    /// # Example
    /// ```
    /// # use ttlsim::data_structures::BitIter;
    /// assert_eq!(BitIter::new(0u64).is_zero(), true);
    /// assert_eq!(BitIter::with_width(0x100u16, 8).is_zero(), true);
    /// assert_eq!(BitIter::new(32u32).is_zero(), false);
    /// ```
    pub fn is_zero(&self) -> bool {
        self.clone().all(|bit| !bit)
    }
}

impl Iterator for BitIter {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        if self.i == self.width {
            return None;
        }

        let result = self.item & (1 << self.i) != 0;
        self.i += 1;

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.width - self.i) as usize;
        (left, Some(left))
    }
}
impl ExactSizeIterator for BitIter {}

/// Packs `bits` into a word, least significant bit first.
///
/// If there are more than 64 bits the excess is ignored.
pub fn collect_word<I: IntoIterator<Item = bool>>(bits: I) -> u64 {
    bits.into_iter()
        .take(64)
        .enumerate()
        .fold(0, |word, (i, bit)| if bit { word | (1 << i) } else { word })
}
