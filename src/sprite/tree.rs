use super::{Sprite, SpriteNode};
use std::slice;

/// Depth-first, left-to-right iterator over the leaves of a [`SpriteNode`].
///
/// Keeps an explicit stack of child iterators instead of recursing, so
/// nesting depth is bounded by memory and not by the call stack. Dropping a
/// tree is iterative too. `Clone`, `PartialEq` and `Debug` are derived and
/// still recurse.
///
/// ```text
/// [A, [B, [C, D]], E]
///  │   │   └─┬─┘   │
///  1   2    3 4    5   ──►  A B C D E
/// ```
pub struct Flatten<'a> {
    stack: Vec<slice::Iter<'a, SpriteNode>>,
}

impl<'a> Flatten<'a> {
    pub fn new(root: &'a SpriteNode) -> Self {
        Flatten {
            stack: vec![slice::from_ref(root).iter()],
        }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Sprite;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(SpriteNode::Leaf(sprite)) => return Some(sprite),
                Some(SpriteNode::Group(children)) => self.stack.push(children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn sprite(image_index: usize) -> SpriteNode {
        Sprite::new(image_index, Point::new(0.0, 0.0), 1.0).into()
    }

    fn order(node: &SpriteNode) -> Vec<usize> {
        node.iter().map(|s| s.image_index).collect()
    }

    #[test]
    fn flattens_in_draw_order() {
        // [A, [B, [C, D]], E]
        let tree = SpriteNode::Group(vec![
            sprite(0),
            SpriteNode::Group(vec![sprite(1), SpriteNode::Group(vec![sprite(2), sprite(3)])]),
            sprite(4),
        ]);
        assert_eq!(order(&tree), vec![0, 1, 2, 3, 4]);
        // same input, same order
        assert_eq!(order(&tree), order(&tree.clone()));
    }

    #[test]
    fn single_leaf_is_its_own_sequence() {
        assert_eq!(order(&sprite(7)), vec![7]);
    }

    #[test]
    fn empty_groups_yield_nothing() {
        assert!(order(&SpriteNode::default()).is_empty());
        let hollow = SpriteNode::Group(vec![
            SpriteNode::Group(vec![]),
            SpriteNode::Group(vec![SpriteNode::Group(vec![])]),
        ]);
        assert!(order(&hollow).is_empty());
    }

    #[test]
    fn handles_deep_nesting() {
        let mut node = sprite(9);
        for _ in 0..1_000 {
            node = SpriteNode::Group(vec![node]);
        }
        assert_eq!(order(&node), vec![9]);
    }

    #[test]
    fn flattens_and_drops_very_deep_trees() {
        let mut node = SpriteNode::Group(vec![sprite(1), sprite(2)]);
        for _ in 0..200_000 {
            node = SpriteNode::Group(vec![node, sprite(3)]);
        }
        assert_eq!(node.iter().count(), 200_002);
        assert_eq!(&order(&node)[..3], &[1, 2, 3]);
        drop(node);
    }

    #[test]
    fn replacing_a_deep_tree_drops_the_old_one() {
        let mut node = sprite(0);
        for _ in 0..200_000 {
            node = SpriteNode::Group(vec![node]);
        }
        node = sprite(5);
        assert_eq!(order(&node), vec![5]);
    }
}
