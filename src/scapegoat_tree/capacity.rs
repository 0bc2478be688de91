use core::cmp::Ordering;

use super::ScapegoatTree;
use crate::BalanceFactor;
use crate::raw::RawScapegoatTree;

impl<T: Ord> ScapegoatTree<T> {
    /// Creates an empty tree ordered by [`Ord`] with room for at least `capacity` elements
    /// before its node storage reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree: ScapegoatTree<i32> = ScapegoatTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ScapegoatTree {
            raw: RawScapegoatTree::with_capacity(capacity),
            compare: <T as Ord>::cmp as fn(&T, &T) -> Ordering,
            balance: BalanceFactor::DEFAULT,
        }
    }
}

impl<T, C> ScapegoatTree<T, C> {
    /// Returns how many elements the tree can hold before its node storage reallocates.
    ///
    /// Slots freed by removals are reused, so this only grows.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::with_capacity(4);
    /// let capacity = tree.capacity();
    /// tree.extend([1, 2, 3, 4]);
    /// tree.remove(&2);
    /// tree.add(5);
    /// assert_eq!(tree.capacity(), capacity);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
