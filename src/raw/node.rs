use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;

/// A binary search tree vertex.
///
/// Children are owned through arena handles; nothing links back to the parent.
#[derive(Clone)]
pub(crate) struct Node<T> {
    key: T,
    left: Option<Handle>,
    right: Option<Handle>,
}

/// Which child link a descent followed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Direction {
    #[inline]
    pub(crate) const fn reverse(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Explicit stack used wherever a walk needs to remember its ancestry.
pub(crate) type Stack = SmallVec<[Handle; 32]>;

impl<T> Node<T> {
    pub(crate) const fn new(key: T) -> Self {
        Self {
            key,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &T {
        &self.key
    }

    /// Swaps in a new key, returning the old one.
    pub(crate) fn replace_key(&mut self, key: T) -> T {
        core::mem::replace(&mut self.key, key)
    }

    pub(crate) fn into_key(self) -> T {
        self.key
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, direction: Direction) -> Option<Handle> {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub(crate) fn set_left(&mut self, link: Option<Handle>) {
        self.left = link;
    }

    pub(crate) fn set_right(&mut self, link: Option<Handle>) {
        self.right = link;
    }

    pub(crate) fn set_child(&mut self, direction: Direction, link: Option<Handle>) {
        match direction {
            Direction::Left => self.left = link,
            Direction::Right => self.right = link,
        }
    }
}

impl<T> Arena<Node<T>> {
    /// Counts the nodes in the subtree at `root`.
    pub(crate) fn subtree_len(&self, root: Option<Handle>) -> usize {
        let mut stack = Stack::new();
        stack.extend(root);
        let mut len = 0;
        while let Some(handle) = stack.pop() {
            let node = self.get(handle);
            len += 1;
            stack.extend(node.left);
            stack.extend(node.right);
        }
        len
    }

    /// Returns the number of edges on the longest downward path from `root`, or `0` for an
    /// empty subtree.
    pub(crate) fn subtree_height(&self, root: Option<Handle>) -> usize {
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        stack.extend(root.map(|handle| (handle, 0)));
        let mut height = 0;
        while let Some((handle, depth)) = stack.pop() {
            let node = self.get(handle);
            height = height.max(depth);
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }
        height
    }

    /// Follows `direction` links from `root` as far as they go.
    pub(crate) fn extreme(&self, root: Handle, direction: Direction) -> Handle {
        let mut current = root;
        while let Some(child) = self.get(current).child(direction) {
            current = child;
        }
        current
    }

    /// Visits the subtree at `root` in ascending order until `f` returns `false`.
    ///
    /// Returns `true` if every node was visited.
    pub(crate) fn inorder<'a, F>(&'a self, root: Option<Handle>, f: &mut F) -> bool
    where
        F: FnMut(&'a T) -> bool,
    {
        let mut stack = Stack::new();
        let mut link = root;
        loop {
            while let Some(handle) = link {
                stack.push(handle);
                link = self.get(handle).left;
            }
            let Some(handle) = stack.pop() else {
                return true;
            };
            let node = self.get(handle);
            if !f(&node.key) {
                return false;
            }
            link = node.right;
        }
    }

    /// Visits every key `>= key` in the subtree at `root`, ascending, until `f` returns `false`.
    ///
    /// The descent path towards `key` is recorded first. Walking it back up, each node whose
    /// key is not less than `key` is visited together with its right subtree; nodes below the
    /// query are skipped, and so are their left subtrees.
    pub(crate) fn inorder_after<'a, C, F>(&'a self, root: Option<Handle>, key: &T, compare: &C, f: &mut F) -> bool
    where
        C: Fn(&T, &T) -> Ordering,
        F: FnMut(&'a T) -> bool,
    {
        let path = self.seek(root, key, compare);
        for &handle in path.iter().rev() {
            let node = self.get(handle);
            if compare(&node.key, key) == Ordering::Less {
                continue;
            }
            if !f(&node.key) || !self.inorder(node.right, f) {
                return false;
            }
        }
        true
    }

    /// Records the root-to-node path of a search for `key`, ending at the matching node or at
    /// the last node before a missing link.
    pub(crate) fn seek<C>(&self, root: Option<Handle>, key: &T, compare: &C) -> Stack
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut path = Stack::new();
        let mut link = root;
        while let Some(handle) = link {
            path.push(handle);
            let node = self.get(handle);
            link = match compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => break,
            };
        }
        path
    }

    /// Builds a perfectly balanced subtree over `keys`, which must already be strictly
    /// ascending. The median of every range becomes that range's root.
    pub(crate) fn build_sorted(&mut self, keys: alloc::vec::Vec<T>) -> Option<Handle> {
        let handles: alloc::vec::Vec<Handle> = keys.into_iter().map(|key| self.alloc(Node::new(key))).collect();
        self.link_sorted(&handles)
    }

    fn link_sorted(&mut self, handles: &[Handle]) -> Option<Handle> {
        if handles.is_empty() {
            return None;
        }
        let mid = handles.len() / 2;
        let left = self.link_sorted(&handles[..mid]);
        let right = self.link_sorted(&handles[mid + 1..]);
        let root = self.get_mut(handles[mid]);
        root.left = left;
        root.right = right;
        Some(handles[mid])
    }

    /// Rebuilds the `len`-node subtree at `root` into minimal height and returns its new root.
    ///
    /// Day–Stout–Warren: the subtree is flattened into a vine by right rotations and folded
    /// back by left rotations. Every node is reused; nothing is allocated.
    ///
    /// # Panics
    ///
    /// Panics if the subtree does not hold exactly `len` nodes.
    pub(crate) fn rebuild(&mut self, root: Handle, len: usize) -> Handle {
        let (vine, vine_len) = self.tree_to_vine(Some(root));
        assert_eq!(vine_len, len, "`Arena::rebuild()` - subtree size does not match the element count!");
        self.vine_to_tree(vine, len).expect("`Arena::rebuild()` - rebuilt an empty subtree!")
    }

    /// Sets the right link of `parent`, where `None` stands for the pseudo-root whose right
    /// link is `head`.
    fn link_right(&mut self, head: &mut Option<Handle>, parent: Option<Handle>, link: Option<Handle>) {
        match parent {
            None => *head = link,
            Some(parent) => self.get_mut(parent).right = link,
        }
    }

    fn right_of(&self, head: Option<Handle>, parent: Option<Handle>) -> Option<Handle> {
        match parent {
            None => head,
            Some(parent) => self.get(parent).right,
        }
    }

    /// Flattens the subtree at `root` into a right-linked chain in ascending order.
    ///
    /// Returns the chain's head and its length.
    pub(crate) fn tree_to_vine(&mut self, root: Option<Handle>) -> (Option<Handle>, usize) {
        let mut head = root;
        let mut tail: Option<Handle> = None;
        let mut rest = root;
        let mut len = 0;
        while let Some(current) = rest {
            match self.get(current).left {
                None => {
                    tail = Some(current);
                    rest = self.get(current).right;
                    len += 1;
                }
                Some(left) => {
                    // Rotate right at `current`.
                    let inner = self.get(left).right;
                    self.get_mut(current).left = inner;
                    self.get_mut(left).right = Some(current);
                    self.link_right(&mut head, tail, Some(left));
                    rest = Some(left);
                }
            }
        }
        tracing::trace!(count = len, "flattened subtree into vine");
        (head, len)
    }

    /// Folds a vine of `len` nodes into a complete tree whose bottom level fills from the left.
    pub(crate) fn vine_to_tree(&mut self, mut head: Option<Handle>, len: usize) -> Option<Handle> {
        if len == 0 {
            return head;
        }
        // Largest 2^k - 1 not above `len`.
        let mut full = (1usize << (len + 1).ilog2()) - 1;
        self.compress(&mut head, len - full);
        while full > 1 {
            full /= 2;
            self.compress(&mut head, full);
        }
        head
    }

    /// Left-rotates every other node along the right spine, `count` times.
    fn compress(&mut self, head: &mut Option<Handle>, count: usize) {
        let mut scanner: Option<Handle> = None;
        for _ in 0..count {
            let child = self.right_of(*head, scanner).expect("`Arena::compress()` - vine is too short!");
            let next = self.get(child).right.expect("`Arena::compress()` - vine is too short!");
            self.link_right(head, scanner, Some(next));
            let inner = self.get(next).left;
            self.get_mut(child).right = inner;
            self.get_mut(next).left = Some(child);
            scanner = Some(next);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use proptest::prelude::*;

    fn keys_inorder(arena: &Arena<Node<u32>>, root: Option<Handle>) -> Vec<u32> {
        let mut keys = Vec::new();
        arena.inorder(root, &mut |key: &u32| {
            keys.push(*key);
            true
        });
        keys
    }

    /// Builds a right-leaning chain 0 -> 1 -> ... -> len - 1, the worst case for a BST.
    fn degenerate(arena: &mut Arena<Node<u32>>, len: u32) -> Option<Handle> {
        let mut root = None;
        for key in (0..len).rev() {
            let handle = arena.alloc(Node::new(key));
            arena.get_mut(handle).set_right(root);
            root = Some(handle);
        }
        root
    }

    /// Asserts that every level but the last is full and the last fills from the left.
    fn assert_complete(arena: &Arena<Node<u32>>, root: Option<Handle>, len: usize) {
        let mut level: Vec<Option<Handle>> = alloc::vec![root];
        let mut seen = 0;
        while level.iter().any(Option::is_some) {
            let present = level.iter().take_while(|link| link.is_some()).count();
            assert!(level[present..].iter().all(Option::is_none), "gap inside a level");
            seen += present;
            if seen < len {
                assert_eq!(present, level.len(), "non-final level is not full");
            }
            level = level
                .iter()
                .flatten()
                .flat_map(|&handle| [arena.get(handle).left(), arena.get(handle).right()])
                .collect();
        }
        assert_eq!(seen, len);
    }

    #[test]
    fn vine_of_degenerate_chain() {
        let mut arena = Arena::new();
        let root = degenerate(&mut arena, 5);
        let (vine, len) = arena.tree_to_vine(root);
        assert_eq!(len, 5);
        assert_eq!(vine, root);
        assert_eq!(keys_inorder(&arena, vine), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn vine_from_left_chain() {
        let mut arena = Arena::new();
        let mut root = None;
        for key in 0..6 {
            let handle = arena.alloc(Node::new(key));
            arena.get_mut(handle).set_left(root);
            root = Some(handle);
        }
        let (vine, len) = arena.tree_to_vine(root);
        assert_eq!(len, 6);
        let mut link = vine;
        let mut keys = Vec::new();
        while let Some(handle) = link {
            assert_eq!(arena.get(handle).left(), None);
            keys.push(*arena.get(handle).key());
            link = arena.get(handle).right();
        }
        assert_eq!(keys, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn rebuild_small_shapes() {
        for len in 1..=16 {
            let mut arena = Arena::new();
            let root = degenerate(&mut arena, len).unwrap();
            let rebuilt = arena.rebuild(root, len as usize);
            assert_eq!(keys_inorder(&arena, Some(rebuilt)), (0..len).collect::<Vec<_>>());
            assert_eq!(arena.subtree_height(Some(rebuilt)), (len as usize).ilog2() as usize);
            assert_complete(&arena, Some(rebuilt), len as usize);
        }
    }

    #[test]
    fn rebuild_three_picks_median() {
        let mut arena = Arena::new();
        let root = degenerate(&mut arena, 3).unwrap();
        let rebuilt = arena.rebuild(root, 3);
        let node = arena.get(rebuilt);
        assert_eq!(*node.key(), 1);
        assert_eq!(node.left().map(|h| *arena.get(h).key()), Some(0));
        assert_eq!(node.right().map(|h| *arena.get(h).key()), Some(2));
    }

    #[test]
    #[should_panic(expected = "`Arena::rebuild()` - subtree size does not match the element count!")]
    fn rebuild_with_wrong_count() {
        let mut arena = Arena::new();
        let root = degenerate(&mut arena, 4).unwrap();
        let _ = arena.rebuild(root, 5);
    }

    #[test]
    fn build_sorted_is_balanced() {
        let mut arena = Arena::new();
        let root = arena.build_sorted((0..100).collect());
        assert_eq!(arena.subtree_len(root), 100);
        assert_eq!(arena.subtree_height(root), 6);
        assert_eq!(keys_inorder(&arena, root), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn inorder_stops_early() {
        let mut arena = Arena::new();
        let root = arena.build_sorted((0..10).collect());
        let mut seen = Vec::new();
        let completed = arena.inorder(root, &mut |key: &u32| {
            seen.push(*key);
            *key < 3
        });
        assert!(!completed);
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn extremes() {
        let mut arena = Arena::new();
        let root = arena.build_sorted((10..20).collect()).unwrap();
        assert_eq!(*arena.get(arena.extreme(root, Direction::Left)).key(), 10);
        assert_eq!(*arena.get(arena.extreme(root, Direction::Right)).key(), 19);
    }

    proptest! {
        #[test]
        fn rebuild_preserves_keys(keys in prop::collection::btree_set(any::<u32>(), 1..300)) {
            let mut arena = Arena::new();
            // Insert in sorted order to start from the degenerate shape.
            let mut root: Option<Handle> = None;
            let mut last: Option<Handle> = None;
            for &key in &keys {
                let handle = arena.alloc(Node::new(key));
                match last {
                    None => root = Some(handle),
                    Some(parent) => arena.get_mut(parent).set_right(Some(handle)),
                }
                last = Some(handle);
            }
            let rebuilt = arena.rebuild(root.unwrap(), keys.len());
            prop_assert_eq!(keys_inorder(&arena, Some(rebuilt)), keys.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(arena.subtree_height(Some(rebuilt)), keys.len().ilog2() as usize);
        }

        #[test]
        fn inorder_after_is_suffix(keys in prop::collection::btree_set(0u32..1000, 0..200), query in 0u32..1000) {
            let mut arena = Arena::new();
            let root = arena.build_sorted(keys.iter().copied().collect());
            let mut after = Vec::new();
            arena.inorder_after(root, &query, &u32::cmp, &mut |key: &u32| {
                after.push(*key);
                true
            });
            let expected: Vec<u32> = keys.range(query..).copied().collect();
            prop_assert_eq!(after, expected);
        }
    }
}
