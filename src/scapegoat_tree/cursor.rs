use core::cmp::Ordering;
use core::fmt;

use crate::raw::{Arena, Direction, Handle, Node, Stack};

/// A movable position inside a [`ScapegoatTree`](crate::ScapegoatTree).
///
/// Nodes do not know their parents, so a cursor carries the whole root-to-node path and walks
/// back along it to find successors and predecessors. A cursor with an empty path is
/// *invalid*: it has moved past either end or below a leaf. Every move on an invalid cursor is
/// a no-op and [`key`](Cursor::key) returns `None`, so traversal loops only need to check
/// [`is_valid`](Cursor::is_valid).
///
/// The cursor borrows the tree, so the tree cannot change while a cursor is alive.
///
/// # Examples
///
/// ```
/// use scapegoat_tree::ScapegoatTree;
///
/// let tree = ScapegoatTree::from([3, 1, 4, 1, 5, 9, 2, 6]);
///
/// let mut cursor = tree.root();
/// cursor.move_min();
/// let mut keys = Vec::new();
/// while let Some(key) = cursor.key() {
///     keys.push(*key);
///     cursor.move_next();
/// }
/// assert_eq!(keys, [1, 2, 3, 4, 5, 6, 9]);
/// assert!(!cursor.is_valid());
/// ```
pub struct Cursor<'a, T> {
    nodes: &'a Arena<Node<T>>,
    path: Stack,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn at_root(nodes: &'a Arena<Node<T>>, root: Option<Handle>) -> Self {
        let mut path = Stack::new();
        path.extend(root);
        Self { nodes, path }
    }

    /// Positions a cursor on the least element `>= key`.
    pub(crate) fn seek<C>(nodes: &'a Arena<Node<T>>, root: Option<Handle>, key: &T, compare: &C) -> Self
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut path = nodes.seek(root, key, compare);
        // The answer is the deepest node on the search path that is not below `key`.
        let keep = path
            .iter()
            .rposition(|&handle| compare(key, nodes.get(handle).key()) != Ordering::Greater)
            .map_or(0, |index| index + 1);
        path.truncate(keep);
        Self { nodes, path }
    }

    /// Returns true if the cursor is positioned on an element.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.path.is_empty()
    }

    /// Returns the element under the cursor, or `None` if the cursor is invalid.
    #[must_use]
    pub fn key(&self) -> Option<&'a T> {
        let nodes = self.nodes;
        self.path.last().map(|&handle| nodes.get(handle).key())
    }

    /// Moves to the next larger element, or invalidates the cursor if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([10, 20, 30]);
    /// let mut cursor = tree.cursor(&15);
    /// assert_eq!(cursor.key(), Some(&20));
    /// assert_eq!(cursor.move_next().key(), Some(&30));
    /// assert_eq!(cursor.move_next().key(), None);
    /// ```
    pub fn move_next(&mut self) -> &mut Self {
        self.step(Direction::Right)
    }

    /// Moves to the next smaller element, or invalidates the cursor if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([10, 20, 30]);
    /// let mut cursor = tree.cursor(&15);
    /// assert_eq!(cursor.move_prev().key(), Some(&10));
    /// assert_eq!(cursor.move_prev().key(), None);
    /// ```
    pub fn move_prev(&mut self) -> &mut Self {
        self.step(Direction::Left)
    }

    /// Moves to the left child, or invalidates the cursor if there is none.
    pub fn move_left(&mut self) -> &mut Self {
        self.child(Direction::Left)
    }

    /// Moves to the right child, or invalidates the cursor if there is none.
    pub fn move_right(&mut self) -> &mut Self {
        self.child(Direction::Right)
    }

    /// Moves to the parent. Moving up from the root invalidates the cursor.
    pub fn move_up(&mut self) -> &mut Self {
        self.path.pop();
        self
    }

    /// Moves to the smallest element in the subtree under the cursor.
    pub fn move_min(&mut self) -> &mut Self {
        self.descend(Direction::Left)
    }

    /// Moves to the largest element in the subtree under the cursor.
    pub fn move_max(&mut self) -> &mut Self {
        self.descend(Direction::Right)
    }

    /// Visits the subtree under the cursor in ascending order until `f` returns `false`.
    ///
    /// Returns `true` if the walk finished. An invalid cursor visits nothing and returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scapegoat_tree::ScapegoatTree;
    ///
    /// let tree = ScapegoatTree::from([1, 2, 3, 4, 5, 6, 7]);
    /// let mut left = Vec::new();
    /// tree.root().move_left().inorder(|key| {
    ///     left.push(*key);
    ///     true
    /// });
    /// assert_eq!(left, [1, 2, 3]);
    /// ```
    pub fn inorder<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&'a T) -> bool,
    {
        let nodes = self.nodes;
        nodes.inorder(self.path.last().copied(), &mut f)
    }

    fn child(&mut self, direction: Direction) -> &mut Self {
        let Some(&current) = self.path.last() else {
            return self;
        };
        match self.nodes.get(current).child(direction) {
            Some(child) => self.path.push(child),
            None => self.path.clear(),
        }
        self
    }

    fn descend(&mut self, direction: Direction) -> &mut Self {
        let Some(&current) = self.path.last() else {
            return self;
        };
        let mut link = self.nodes.get(current).child(direction);
        while let Some(handle) = link {
            self.path.push(handle);
            link = self.nodes.get(handle).child(direction);
        }
        self
    }

    /// Moves to the in-order neighbour on the `direction` side.
    fn step(&mut self, direction: Direction) -> &mut Self {
        let Some(&current) = self.path.last() else {
            return self;
        };
        if let Some(child) = self.nodes.get(current).child(direction) {
            self.path.push(child);
            return self.descend(direction.reverse());
        }
        // Climb until we leave a subtree through the link opposite to `direction`.
        let mut child = current;
        self.path.pop();
        while let Some(&parent) = self.path.last() {
            if self.nodes.get(parent).child(direction.reverse()) == Some(child) {
                break;
            }
            child = parent;
            self.path.pop();
        }
        self
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            path: self.path.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("key", &self.key()).field("depth", &self.path.len()).finish()
    }
}
