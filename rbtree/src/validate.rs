use log::debug;

use crate::red_black_tree::{color_of, RawNode};
use crate::{Bounded, RedBlackTree};

/// First red-black property found broken by [`RedBlackTree::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Empty trees are reported as invalid.
    #[error("tree is empty")]
    Empty,
    #[error("root is not black")]
    RedRoot,
    #[error("keys are not in binary search tree order")]
    Unordered,
    #[error("red node has a red child")]
    ConsecutiveReds,
    #[error("black heights of sibling subtrees differ")]
    BlackHeightMismatch,
}

impl<K: Ord, V> RedBlackTree<K, V> {
    /// Returns `true` if the tree is a non-empty, valid red-black tree.
    ///
    /// This is a diagnostic, the tree never calls it on its own.
    pub fn is_valid(&self) -> bool
    where
        K: Bounded,
    {
        self.validate().is_ok()
    }

    /// Like [`is_valid`](Self::is_valid) but reports which property is broken.
    ///
    /// Keys must lie strictly between `K::min_bound()` and `K::max_bound()`.
    pub fn validate(&self) -> Result<(), Violation>
    where
        K: Bounded,
    {
        self.validate_within(&K::min_bound(), &K::max_bound())
    }

    /// Validates the tree with every key required to lie strictly inside
    /// `(min, max)`.
    pub fn validate_within(&self, min: &K, max: &K) -> Result<(), Violation> {
        let result = self.check(min, max);
        if let Err(violation) = result {
            debug!("invalid red-black tree with {} entries: {violation}", self.len);
        }
        result
    }

    fn check(&self, min: &K, max: &K) -> Result<(), Violation> {
        let root = self.root.ok_or(Violation::Empty)?;
        if color_of(Some(root)).is_red() {
            return Err(Violation::RedRoot);
        }
        unsafe {
            if !is_ordered(Some(root), min, max) {
                return Err(Violation::Unordered);
            }
            if has_consecutive_reds(Some(root)) {
                return Err(Violation::ConsecutiveReds);
            }
            black_height(Some(root)).ok_or(Violation::BlackHeightMismatch)?;
        }
        Ok(())
    }
}

unsafe fn is_ordered<K: Ord, V>(node: Option<RawNode<K, V>>, min: &K, max: &K) -> bool {
    let Some(node) = node else {
        return true;
    };
    let key = unsafe { node.key() };
    if key <= min || key >= max {
        return false;
    }
    unsafe { is_ordered(node.left(), min, key) && is_ordered(node.right(), key, max) }
}

unsafe fn has_consecutive_reds<K, V>(node: Option<RawNode<K, V>>) -> bool {
    let Some(node) = node else {
        return false;
    };
    unsafe {
        if node.color().is_red()
            && (color_of(node.left()).is_red() || color_of(node.right()).is_red())
        {
            return true;
        }
        has_consecutive_reds(node.left()) || has_consecutive_reds(node.right())
    }
}

/// Number of black nodes on every path from `node` down to an absent child,
/// `node` included, or `None` if two paths disagree.
unsafe fn black_height<K, V>(node: Option<RawNode<K, V>>) -> Option<usize> {
    let Some(node) = node else {
        return Some(0);
    };
    let (left, right) = unsafe { (black_height(node.left())?, black_height(node.right())?) };
    if left != right {
        return None;
    }
    Some(left + color_of(Some(node)).is_black() as usize)
}
