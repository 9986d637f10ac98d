use core::fmt;

use crate::red_black_tree::{color_of, Color, Node};
use crate::RedBlackTree;

pub(crate) fn init_logger() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}

/// Checks the red-black properties and parent links directly on the nodes,
/// without going through the public validator.
pub(crate) fn assert_red_blackness<K: fmt::Debug, V: fmt::Debug>(tree: &RedBlackTree<K, V>) {
    let Some(root) = tree.root else {
        assert_eq!(tree.len, 0, "empty tree must have len 0");
        return;
    };
    let root = unsafe { root.as_ref() };
    assert_eq!(root.color, Color::Black, "root must be black");
    assert!(root.parent.is_none(), "root must not have a parent");

    // returns the black height below `node`
    fn inner<K: fmt::Debug, V: fmt::Debug>(node: &Node<K, V>, count: &mut usize) -> usize {
        *count += 1;
        if node.color.is_red() {
            assert!(
                color_of(node.left).is_black(),
                "left child of red node must be black : {:#?}",
                node
            );
            assert!(
                color_of(node.right).is_black(),
                "right child of red node must be black : {:#?}",
                node
            );
        }

        for child in [node.left, node.right].into_iter().flatten() {
            let child = unsafe { child.as_ref() };
            assert!(
                child
                    .parent
                    .map(|p| std::ptr::eq(p.as_ptr(), node))
                    .unwrap_or(false),
                "child must point back to its parent : {:#?}",
                node
            );
        }

        let left = node
            .left
            .map(|l| inner(unsafe { l.as_ref() }, count) + color_of(node.left).is_black() as usize)
            .unwrap_or(1);
        let right = node
            .right
            .map(|r| inner(unsafe { r.as_ref() }, count) + color_of(node.right).is_black() as usize)
            .unwrap_or(1);
        assert_eq!(left, right, "black heights must match : {:#?}", node);

        left
    }

    let mut count = 0;
    inner(root, &mut count);
    assert_eq!(count, tree.len, "len must match the number of nodes");
}
