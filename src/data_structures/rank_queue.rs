use std::collections::BTreeSet;

/// Worklist made of a current pass and a next pass, each of them ordered by `(rank, item)`.
///
/// Items pushed with [RankQueue::push_after] go into the current pass if their rank is higher than the
/// rank being processed and into the next pass otherwise, so a queue fed in rank order visits every item
/// of an acyclic network exactly once per pass. Calling [RankQueue::swap] starts the next pass.
///
/// Items are deduplicated within a pass.
///
/// # Example
/// ```
/// # use ttlsim::data_structures::RankQueue;
/// let mut queue = RankQueue::new();
///
/// queue.push(2, 'b');
/// queue.push(1, 'a');
///
/// assert_eq!(queue.pop(), None);
///
/// queue.swap();
///
/// assert_eq!(queue.pop(), Some((1, 'a')));
/// queue.push_after(1, 3, 'c');
/// queue.push_after(1, 0, 'z');
/// assert_eq!(queue.pop(), Some((2, 'b')));
/// assert_eq!(queue.pop(), Some((3, 'c')));
/// assert_eq!(queue.pop(), None);
///
/// queue.swap();
/// assert_eq!(queue.pop(), Some((0, 'z')));
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RankQueue<T: Ord> {
    current: BTreeSet<(usize, T)>,
    next: BTreeSet<(usize, T)>,
}

impl<T: Ord> RankQueue<T> {
    /// Returns an empty [RankQueue].
    pub fn new() -> Self {
        Self {
            current: Default::default(),
            next: Default::default(),
        }
    }

    /// Pops the item with the lowest rank from the current pass.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<(usize, T)> {
        self.current.pop_first()
    }

    /// Pushes an item to the next pass.
    #[inline(always)]
    pub fn push(&mut self, rank: usize, item: T) {
        self.next.insert((rank, item));
    }

    /// Pushes an item that was scheduled while processing an item of rank `from`.
    #[inline(always)]
    pub fn push_after(&mut self, from: usize, rank: usize, item: T) {
        if rank > from {
            self.current.insert((rank, item));
        } else {
            self.next.insert((rank, item));
        }
    }

    /// Starts the next pass, after calling this method you can [pop](RankQueue::pop)
    /// items that you had previously [pushed](RankQueue::push).
    #[inline(always)]
    pub fn swap(&mut self) {
        debug_assert!(
            self.current.is_empty(),
            "Tried to swap passes while the current pass is not empty"
        );
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Removes every item from both passes.
    pub fn clear(&mut self) {
        self.current.clear();
        self.next.clear();
    }

    /// Returns an iterator over the items in both passes.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.current.iter().chain(self.next.iter()).map(|(_, item)| item)
    }

    /// Returns the sum of the items in the current and next passes.
    pub fn len(&self) -> usize {
        self.current.len() + self.next.len()
    }

    /// Returns true if both passes are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Ord> Default for RankQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order() {
        let mut q = RankQueue::new();
        for (rank, item) in [(5, 0u8), (1, 1), (3, 2), (1, 0)] {
            q.push(rank, item);
        }
        q.swap();

        let order: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(order, vec![(1, 0), (1, 1), (3, 2), (5, 0)]);
    }

    #[test]
    fn test_dedup() {
        let mut q = RankQueue::new();
        q.push(1, 1u8);
        q.push(1, 1);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_same_rank_goes_to_next_pass() {
        let mut q = RankQueue::new();
        q.push(4, 'a');
        q.swap();

        let (rank, _) = q.pop().unwrap();
        q.push_after(rank, 4, 'b');
        assert_eq!(q.pop(), None);
        assert!(!q.is_empty());

        q.swap();
        assert_eq!(q.pop(), Some((4, 'b')));
        assert!(q.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut q = RankQueue::new();
        q.push(0, 0u8);
        q.swap();
        q.push(0, 1);
        assert_eq!(q.iter().count(), 2);
        q.clear();
        assert!(q.is_empty());
    }
}
