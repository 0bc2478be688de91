use core::cmp::Ordering;

use alloc::vec::Vec;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Direction, Node};
use crate::BalanceFactor;

/// The scapegoat tree engine backing `ScapegoatTree`.
///
/// The comparator and balance factor are owned by the caller and passed into each mutating
/// call, so this type only knows about nodes and element counts.
#[derive(Clone)]
pub(crate) struct RawScapegoatTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of elements in the tree.
    len: usize,
    /// Largest `len` observed since the last whole-tree rebuild.
    max_len: usize,
}

/// Path element for tracking traversal during mutations.
#[derive(Clone, Copy)]
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// The link we descended through.
    direction: Direction,
}

/// Type alias for a path through the tree (stack of path elements).
type Path = SmallVec<[PathElement; 32]>;

/// Outcome of a descent looking for a key.
enum Search {
    /// The key is stored at this node; the path ends at its parent.
    Found(Handle),
    /// The key is absent; the path ends at the node whose link is empty.
    Vacant,
}

impl<T> RawScapegoatTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            max_len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            max_len: 0,
        }
    }

    /// Builds a perfectly balanced tree from keys that are already strictly ascending.
    pub(crate) fn from_sorted(keys: Vec<T>) -> Self {
        let len = keys.len();
        let mut nodes = Arena::with_capacity(len);
        let root = nodes.build_sorted(keys);
        tracing::trace!(len, "built tree from sorted keys");
        Self {
            nodes,
            root,
            len,
            max_len: len,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn nodes(&self) -> &Arena<Node<T>> {
        &self.nodes
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.max_len = 0;
    }

    pub(crate) fn height(&self) -> usize {
        self.nodes.subtree_height(self.root)
    }

    /// Returns the smallest (`Direction::Left`) or largest (`Direction::Right`) element.
    pub(crate) fn extreme(&self, direction: Direction) -> Option<&T> {
        let root = self.root?;
        Some(self.nodes.get(self.nodes.extreme(root, direction)).key())
    }

    /// Moves every element out in ascending order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<T> {
        let (mut link, _) = self.nodes.tree_to_vine(self.root);
        let mut keys = Vec::with_capacity(self.len);
        while let Some(handle) = link {
            let node = self.nodes.take(handle);
            link = node.right();
            keys.push(node.into_key());
        }
        self.clear();
        keys
    }

    fn set_link(&mut self, parent: Option<&PathElement>, link: Option<Handle>) {
        match parent {
            None => self.root = link,
            Some(parent) => self.nodes.get_mut(parent.node).set_child(parent.direction, link),
        }
    }

    fn search<C>(&self, key: &T, compare: &C, path: &mut Path) -> Search
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            let direction = match compare(key, node.key()) {
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
                Ordering::Equal => return Search::Found(current),
            };
            path.push(PathElement { node: current, direction });
            link = node.child(direction);
        }
        Search::Vacant
    }

    /// Returns the stored element equal to `key`.
    pub(crate) fn get<C>(&self, key: &T, compare: &C) -> Option<&T>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut link = self.root;
        while let Some(current) = link {
            let node = self.nodes.get(current);
            link = match compare(key, node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(node.key()),
            };
        }
        None
    }

    /// Inserts `key` if no equal element exists. With `replace`, an equal element is
    /// overwritten instead of kept.
    ///
    /// Returns true if a new node was created.
    pub(crate) fn insert<C>(&mut self, key: T, replace: bool, compare: &C, balance: BalanceFactor) -> bool
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut path = Path::new();
        if let Search::Found(existing) = self.search(&key, compare, &mut path) {
            // An equal key never adds depth, so balance is untouched.
            if replace {
                self.nodes.get_mut(existing).replace_key(key);
            }
            return false;
        }

        let leaf = self.nodes.alloc(Node::new(key));
        self.set_link(path.last(), Some(leaf));
        self.len += 1;
        self.max_len = self.max_len.max(self.len);

        // Only a leaf deeper than the whole tree's limit looks for a scapegoat. A locally deep
        // chain under a shallow root is left alone until it pushes past that limit.
        if path.len() > balance.depth_limit(self.len) {
            self.rebuild_scapegoat(&path, balance);
        }
        true
    }

    /// Walks back up from a freshly inserted leaf, growing the size of the subtree that
    /// contains it, and rebuilds the first ancestor that is too deep for its size.
    fn rebuild_scapegoat(&mut self, path: &Path, balance: BalanceFactor) {
        let mut size = 1;
        for index in (0..path.len()).rev() {
            let height = path.len() - index;
            let element = path[index];
            let node = self.nodes.get(element.node);
            let sibling = match element.direction {
                Direction::Left => node.right(),
                Direction::Right => node.left(),
            };
            size += self.nodes.subtree_len(sibling) + 1;

            if height > balance.depth_limit(size) {
                let rebuilt = self.nodes.rebuild(element.node, size);
                let parent = index.checked_sub(1).map(|parent| &path[parent]);
                self.set_link(parent, Some(rebuilt));
                tracing::debug!(depth = index, height, size, "rebuilt scapegoat subtree");
                return;
            }
        }
        // The root sees the whole tree at the full insertion depth, which the caller checked.
        unreachable!("`RawScapegoatTree::rebuild_scapegoat()` - no scapegoat on an overdeep path!");
    }

    /// Removes the element equal to `key` and returns it.
    pub(crate) fn remove<C>(&mut self, key: &T, compare: &C, balance: BalanceFactor) -> Option<T>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut path = Path::new();
        let Search::Found(target) = self.search(key, compare, &mut path) else {
            return None;
        };
        Some(self.remove_node(target, path.last().copied(), balance))
    }

    /// Removes the smallest (`Direction::Left`) or largest (`Direction::Right`) element.
    pub(crate) fn pop_extreme(&mut self, direction: Direction, balance: BalanceFactor) -> Option<T> {
        let mut parent = None;
        let mut current = self.root?;
        while let Some(child) = self.nodes.get(current).child(direction) {
            parent = Some(PathElement { node: current, direction });
            current = child;
        }
        Some(self.remove_node(current, parent, balance))
    }

    fn remove_node(&mut self, target: Handle, parent: Option<PathElement>, balance: BalanceFactor) -> T {
        let node = self.nodes.get(target);
        let removed = match (node.left(), node.right()) {
            (None, link) | (link, None) => {
                self.set_link(parent.as_ref(), link);
                self.nodes.take(target).into_key()
            }
            (Some(_), Some(right)) => {
                let successor = self.pop_min_right(target, right);
                self.nodes.get_mut(target).replace_key(successor)
            }
        };

        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);
        if balance.should_shrink(self.len, self.max_len) {
            tracing::debug!(len = self.len, max = self.max_len, "rebuilding whole tree after deletions");
            if let Some(root) = self.root {
                self.root = Some(self.nodes.rebuild(root, self.len));
            }
            self.max_len = self.len;
        }
        removed
    }

    /// Detaches the leftmost node of `right` (the right child of `target`) and returns its key.
    fn pop_min_right(&mut self, target: Handle, right: Handle) -> T {
        let mut parent = PathElement {
            node: target,
            direction: Direction::Right,
        };
        let mut current = right;
        while let Some(left) = self.nodes.get(current).left() {
            parent = PathElement {
                node: current,
                direction: Direction::Left,
            };
            current = left;
        }
        let orphan = self.nodes.get(current).right();
        self.set_link(Some(&parent), orphan);
        self.nodes.take(current).into_key()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;

    use super::*;
    use proptest::prelude::*;

    fn keys(tree: &RawScapegoatTree<u32>) -> Vec<u32> {
        let mut keys = Vec::new();
        tree.nodes().inorder(tree.root(), &mut |key: &u32| {
            keys.push(*key);
            true
        });
        keys
    }

    fn insert(tree: &mut RawScapegoatTree<u32>, key: u32, balance: BalanceFactor) -> bool {
        tree.insert(key, false, &u32::cmp, balance)
    }

    #[test]
    fn sequential_inserts_stay_shallow() {
        let balance = BalanceFactor::STRICT;
        let mut tree = RawScapegoatTree::new();
        for key in 0..1000 {
            assert!(insert(&mut tree, key, balance));
            assert!(tree.height() <= balance.depth_limit(tree.len()));
        }
        assert_eq!(keys(&tree), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let balance = BalanceFactor::DEFAULT;
        let mut tree = RawScapegoatTree::new();
        assert!(insert(&mut tree, 7, balance));
        assert!(!insert(&mut tree, 7, balance));
        assert!(!tree.insert(7, true, &u32::cmp, balance));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn unbounded_balance_rebuilds_only_after_deletions() {
        let balance = BalanceFactor::new(BalanceFactor::MAX);
        let mut tree = RawScapegoatTree::new();
        for key in 0..100 {
            insert(&mut tree, key, balance);
        }
        assert_eq!(tree.height(), 99);

        // Fifty removals keep exactly half, which is not yet below the threshold.
        for key in 0..50 {
            assert_eq!(tree.remove(&key, &u32::cmp, balance), Some(key));
        }
        assert_eq!(tree.height(), 49);
        assert_eq!(tree.max_len, 100);

        assert_eq!(tree.remove(&50, &u32::cmp, balance), Some(50));
        assert_eq!(tree.max_len, 49);
        assert_eq!(tree.height(), 5);

        for key in 51..60 {
            tree.remove(&key, &u32::cmp, balance);
        }
        assert_eq!(keys(&tree), (60..100).collect::<Vec<_>>());
        assert!(tree.height() <= 5);
    }

    #[test]
    fn strict_deletions_rebuild_whole_tree() {
        let balance = BalanceFactor::STRICT;
        let mut tree = RawScapegoatTree::new();
        for key in 0..5 {
            insert(&mut tree, key, balance);
        }
        assert_eq!(tree.max_len, 5);

        tree.remove(&0, &u32::cmp, balance);
        assert_eq!(tree.max_len, 5);
        tree.remove(&1, &u32::cmp, balance);
        assert_eq!(tree.max_len, 3);
        assert_eq!(keys(&tree), [2, 3, 4]);
        assert!(tree.height() <= balance.depth_limit(3));
    }

    #[test]
    fn remove_node_with_two_children() {
        let balance = BalanceFactor::DEFAULT;
        let mut tree = RawScapegoatTree::from_sorted((0..7).collect());
        // The root of a perfect seven-node tree holds the median.
        assert_eq!(tree.remove(&3, &u32::cmp, balance), Some(3));
        assert_eq!(*tree.nodes().get(tree.root().unwrap()).key(), 4);
        assert_eq!(keys(&tree), [0, 1, 2, 4, 5, 6]);
        assert_eq!(tree.remove(&3, &u32::cmp, balance), None);
    }

    #[test]
    fn shrinking_rebuilds_whole_tree() {
        let balance = BalanceFactor::STRICT;
        let mut tree = RawScapegoatTree::from_sorted((0..64).collect());
        for key in 0..48 {
            tree.remove(&key, &u32::cmp, balance);
            assert!(tree.height() <= balance.depth_limit(tree.len()) + 1);
        }
        assert_eq!(tree.len(), 16);
        assert!(tree.max_len < 64);
    }

    #[test]
    fn pop_extremes() {
        let balance = BalanceFactor::DEFAULT;
        let mut tree = RawScapegoatTree::from_sorted((0..10).collect());
        assert_eq!(tree.pop_extreme(Direction::Left, balance), Some(0));
        assert_eq!(tree.pop_extreme(Direction::Right, balance), Some(9));
        assert_eq!(tree.extreme(Direction::Left), Some(&1));
        assert_eq!(tree.extreme(Direction::Right), Some(&8));
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn drain_is_sorted_and_empties() {
        let balance = BalanceFactor::DEFAULT;
        let mut tree = RawScapegoatTree::new();
        for key in [5, 1, 4, 2, 3] {
            insert(&mut tree, key, balance);
        }
        assert_eq!(tree.drain_to_vec(), [1, 2, 3, 4, 5]);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    proptest! {
        #[test]
        fn matches_btreeset(
            beta in prop_oneof![Just(0u16), Just(250), Just(500), Just(750), Just(999), Just(1000)],
            operations in prop::collection::vec((any::<bool>(), 0u32..500), 0..600),
        ) {
            let balance = BalanceFactor::new(beta);
            let mut tree = RawScapegoatTree::new();
            let mut model = BTreeSet::new();
            for (is_insert, key) in operations {
                if is_insert {
                    prop_assert_eq!(insert(&mut tree, key, balance), model.insert(key));
                } else {
                    prop_assert_eq!(tree.remove(&key, &u32::cmp, balance), model.take(&key));
                }
                prop_assert_eq!(tree.len(), model.len());
                prop_assert!(tree.max_len >= tree.len());
                prop_assert!(tree.height() <= balance.depth_limit(tree.len()).saturating_add(1));
            }
            prop_assert_eq!(keys(&tree), model.into_iter().collect::<Vec<_>>());
        }
    }
}
