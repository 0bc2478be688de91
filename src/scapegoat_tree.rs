use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::BalanceFactor;
use crate::raw::{Direction, RawScapegoatTree};

mod capacity;
mod cursor;

pub use cursor::Cursor;

/// An ordered set stored in a scapegoat tree.
///
/// A scapegoat tree is a plain binary search tree: nodes hold no heights, colours or parent
/// links. Balance is restored lazily. When an insertion lands deeper than the [`BalanceFactor`]
/// allows, the lowest ancestor whose subtree is too deep for its size (the *scapegoat*) is
/// rebuilt into a perfectly balanced shape. When deletions shrink the tree far enough below its
/// historical maximum, the whole tree is rebuilt. Lookups are worst-case O(log n); insertions
/// and removals are amortized O(log n).
///
/// Ordering comes from a comparator fixed at construction. [`ScapegoatTree::new`] and friends
/// use [`Ord`]; [`ScapegoatTree::with_comparator`] accepts any `Fn(&T, &T) -> Ordering`. The
/// comparator must be a total order; anything else leaves the tree's contents unspecified (but
/// never causes undefined behavior).
///
/// Iterators returned by [`ScapegoatTree::iter`] and [`ScapegoatTree::into_iter`] produce their
/// items in order.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let mut books = ScapegoatTree::new();
///
/// books.add("A Dance With Dragons");
/// books.add("To Kill a Mockingbird");
/// books.add("The Odyssey");
/// books.add("The Great Gatsby");
///
/// if !books.contains(&"The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove(&"The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A tree with a custom order:
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let mut by_len = ScapegoatTree::with_comparator(0, |a: &&str, b: &&str| a.len().cmp(&b.len()));
/// assert!(by_len.add("pear"));
/// assert!(!by_len.add("kiwi")); // same length as "pear"
/// assert!(!by_len.replace("plum"));
/// assert_eq!(by_len.get(&"----"), Some(&"plum"));
/// ```
pub struct ScapegoatTree<T, C = fn(&T, &T) -> Ordering> {
    raw: RawScapegoatTree<T>,
    compare: C,
    balance: BalanceFactor,
}

/// An iterator over the elements of a `ScapegoatTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`ScapegoatTree`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let tree = ScapegoatTree::from([3, 1, 2]);
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: ScapegoatTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    front: Cursor<'a, T>,
    back: Cursor<'a, T>,
    remaining: usize,
}

/// An iterator over the elements of a `ScapegoatTree` that are not less than a given key.
///
/// This `struct` is created by the [`iter_from`] method on [`ScapegoatTree`].
/// See its documentation for more.
///
/// [`iter_from`]: ScapegoatTree::iter_from
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterFrom<'a, T: 'a> {
    cursor: Cursor<'a, T>,
}

/// An owning iterator over the elements of a `ScapegoatTree`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`ScapegoatTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let tree = ScapegoatTree::from([1, 2, 3]);
/// let mut iter = tree.into_iter();
/// assert_eq!(iter.next(), Some(1));
/// assert_eq!(iter.next_back(), Some(3));
/// assert_eq!(iter.next(), Some(2));
/// ```
///
/// [`into_iter`]: ScapegoatTree#method.into_iter
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T: Ord> ScapegoatTree<T> {
    /// Makes a new, empty tree ordered by [`Ord`] with [`BalanceFactor::DEFAULT`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree: ScapegoatTree<i32> = ScapegoatTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_balance(BalanceFactor::DEFAULT.get())
    }

    /// Makes a new, empty tree ordered by [`Ord`] with the balance factor `beta`.
    ///
    /// # Panics
    ///
    /// Panics if `beta > BalanceFactor::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let strict: ScapegoatTree<u64> = ScapegoatTree::with_balance(0);
    /// assert_eq!(strict.balance().get(), 0);
    /// ```
    #[must_use]
    pub fn with_balance(beta: u16) -> Self {
        ScapegoatTree::with_comparator(beta, <T as Ord>::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C> ScapegoatTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Makes a new, empty tree ordered by `compare`, with the balance factor `beta`.
    ///
    /// `compare` must implement a total order.
    ///
    /// # Panics
    ///
    /// Panics if `beta > BalanceFactor::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut descending = ScapegoatTree::with_comparator(500, |a: &i32, b: &i32| b.cmp(a));
    /// descending.extend([1, 3, 2]);
    /// assert_eq!(descending.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    #[must_use]
    pub fn with_comparator(beta: u16, compare: C) -> Self {
        Self {
            raw: RawScapegoatTree::new(),
            compare,
            balance: BalanceFactor::new(beta),
        }
    }

    /// Makes a tree holding `keys`, built directly into perfect balance.
    ///
    /// The keys are sorted and, where several compare equal, only the first is kept. This is
    /// O(n log n) and produces a shallower tree than adding the keys one at a time.
    ///
    /// # Panics
    ///
    /// Panics if `beta > BalanceFactor::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from_keys(0, i32::cmp, [5, 3, 5, 1, 4, 2]);
    /// assert_eq!(tree.len(), 5);
    /// assert_eq!(tree.height(), 2);
    /// ```
    pub fn from_keys<I>(beta: u16, compare: C, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let balance = BalanceFactor::new(beta);
        let mut keys: Vec<T> = keys.into_iter().collect();
        keys.sort_by(|a, b| compare(a, b));
        keys.dedup_by(|later, earlier| compare(&*later, &*earlier) == Ordering::Equal);
        Self {
            raw: RawScapegoatTree::from_sorted(keys),
            compare,
            balance,
        }
    }

    /// Adds `key` to the tree unless an equal element is already present.
    ///
    /// Returns whether the element was newly inserted. An existing equal element is left
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::new();
    /// assert_eq!(tree.add(2), true);
    /// assert_eq!(tree.add(2), false);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(log n).
    #[allow(clippy::should_implement_trait)]
    pub fn add(&mut self, key: T) -> bool {
        self.raw.insert(key, false, &self.compare, self.balance)
    }

    /// Adds `key` to the tree, overwriting an equal element if one is present.
    ///
    /// Returns whether the element was newly inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::with_comparator(500, |a: &(i32, &str), b: &(i32, &str)| a.0.cmp(&b.0));
    /// assert!(tree.replace((1, "one")));
    /// assert!(!tree.replace((1, "uno")));
    /// assert_eq!(tree.get(&(1, "")), Some(&(1, "uno")));
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(log n).
    pub fn replace(&mut self, key: T) -> bool {
        self.raw.insert(key, true, &self.compare, self.balance)
    }

    /// Removes the element equal to `key`. Returns whether such an element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::from([1, 2, 3]);
    /// assert!(tree.remove(&2));
    /// assert!(!tree.remove(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(log n).
    pub fn remove(&mut self, key: &T) -> bool {
        self.take(key).is_some()
    }

    /// Removes and returns the element equal to `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::from([1, 2, 3]);
    /// assert_eq!(tree.take(&2), Some(2));
    /// assert_eq!(tree.take(&2), None);
    /// ```
    pub fn take(&mut self, key: &T) -> Option<T> {
        self.raw.remove(key, &self.compare, self.balance)
    }

    /// Returns the stored element equal to `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([1, 2, 3]);
    /// assert_eq!(tree.get(&2), Some(&2));
    /// assert_eq!(tree.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// Worst-case O(log n).
    #[must_use]
    pub fn get(&self, key: &T) -> Option<&T> {
        self.raw.get(key, &self.compare)
    }

    /// Returns true if the tree holds an element equal to `key`.
    #[must_use]
    pub fn contains(&self, key: &T) -> bool {
        self.get(key).is_some()
    }

    /// Returns a cursor on the least element not less than `key`. The cursor is invalid if every
    /// element is less than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([2, 4, 6]);
    /// assert_eq!(tree.cursor(&3).key(), Some(&4));
    /// assert_eq!(tree.cursor(&4).key(), Some(&4));
    /// assert!(!tree.cursor(&7).is_valid());
    /// ```
    pub fn cursor(&self, key: &T) -> Cursor<'_, T> {
        Cursor::seek(self.raw.nodes(), self.raw.root(), key, &self.compare)
    }

    /// Visits, in ascending order, every element not less than `key`, until `f` returns
    /// `false`. Returns `true` if the walk finished.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree: ScapegoatTree<i32> = (0..10).collect();
    /// let mut tail = Vec::new();
    /// tree.inorder_after(&7, |key| {
    ///     tail.push(*key);
    ///     true
    /// });
    /// assert_eq!(tail, [7, 8, 9]);
    /// ```
    pub fn inorder_after<F>(&self, key: &T, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.raw.nodes().inorder_after(self.raw.root(), key, &self.compare, &mut f)
    }

    /// Gets an iterator over the elements not less than `key`, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([10, 20, 30, 40]);
    /// assert_eq!(tree.iter_from(&25).copied().collect::<Vec<_>>(), [30, 40]);
    /// ```
    pub fn iter_from(&self, key: &T) -> IterFrom<'_, T> {
        IterFrom { cursor: self.cursor(key) }
    }
}

impl<T, C> ScapegoatTree<T, C> {
    /// Returns the number of elements in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every element. The comparator and balance factor are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::from([1, 2]);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest element, or `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([3, 1, 2]);
    /// assert_eq!(tree.min(), Some(&1));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.raw.extreme(Direction::Left)
    }

    /// Returns the largest element, or `None` if the tree is empty.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.raw.extreme(Direction::Right)
    }

    /// Removes and returns the smallest element.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let mut tree = ScapegoatTree::from([3, 1, 2]);
    /// assert_eq!(tree.pop_min(), Some(1));
    /// assert_eq!(tree.pop_max(), Some(3));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn pop_min(&mut self) -> Option<T> {
        self.raw.pop_extreme(Direction::Left, self.balance)
    }

    /// Removes and returns the largest element.
    pub fn pop_max(&mut self) -> Option<T> {
        self.raw.pop_extreme(Direction::Right, self.balance)
    }

    /// Returns the number of edges on the longest root-to-leaf path (`0` when empty).
    ///
    /// This walks the whole tree and is meant for diagnostics.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the balance factor the tree was created with.
    #[must_use]
    pub const fn balance(&self) -> BalanceFactor {
        self.balance
    }

    /// Returns a cursor on the root element. The cursor is invalid if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([1, 2, 3]);
    /// assert_eq!(tree.root().key(), Some(&2));
    /// assert_eq!(tree.root().move_min().key(), Some(&1));
    /// ```
    pub fn root(&self) -> Cursor<'_, T> {
        Cursor::at_root(self.raw.nodes(), self.raw.root())
    }

    /// Visits every element in ascending order until `f` returns `false`. Returns `true` if the
    /// walk finished.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([4, 2, 8, 6]);
    /// let mut small = Vec::new();
    /// let finished = tree.inorder(|key| {
    ///     small.push(*key);
    ///     *key < 4
    /// });
    /// assert!(!finished);
    /// assert_eq!(small, [2, 4]);
    /// ```
    pub fn inorder<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.raw.nodes().inorder(self.raw.root(), &mut f)
    }

    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([3, 1, 2]);
    /// assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let mut front = self.root();
        front.move_min();
        let mut back = self.root();
        back.move_max();
        Iter {
            front,
            back,
            remaining: self.len(),
        }
    }
}

impl<T: Ord> Default for ScapegoatTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone> Clone for ScapegoatTree<T, C> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            compare: self.compare.clone(),
            balance: self.balance,
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for ScapegoatTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C, D> PartialEq<ScapegoatTree<T, D>> for ScapegoatTree<T, C> {
    fn eq(&self, other: &ScapegoatTree<T, D>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for ScapegoatTree<T, C> {}

impl<T: Ord> FromIterator<T> for ScapegoatTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ScapegoatTree::from_keys(BalanceFactor::DEFAULT.get(), <T as Ord>::cmp as fn(&T, &T) -> Ordering, iter)
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for ScapegoatTree<T> {
    /// Converts a `[T; N]` into a `ScapegoatTree<T>`.
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree1 = ScapegoatTree::from([1, 2, 3, 4]);
    /// let tree2: ScapegoatTree<_> = [1, 2, 3, 4].into();
    /// assert_eq!(tree1, tree2);
    /// ```
    fn from(keys: [T; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<T, C> Extend<T> for ScapegoatTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<'a, T: Copy + 'a, C> Extend<&'a T> for ScapegoatTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, C> IntoIterator for ScapegoatTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the elements in ascending order.
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T, C> IntoIterator for &'a ScapegoatTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.front.key()?;
        self.front.move_next();
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    fn min(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next()
    }

    fn max(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.back.key()?;
        self.back.move_prev();
        self.remaining -= 1;
        Some(key)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for IterFrom<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let key = self.cursor.key()?;
        self.cursor.move_next();
        Some(key)
    }
}

impl<T> FusedIterator for IterFrom<'_, T> {}

impl<T> Clone for IterFrom<'_, T> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}
