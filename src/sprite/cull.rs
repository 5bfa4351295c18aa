use super::Sprite;
use crate::geometry::Rect;

/// Does the sprite's axis aligned bounding square touch the viewport?
/// - rotation is ignored
/// - a sprite sharing only an edge with the viewport is kept
pub fn is_visible(sprite: &Sprite, viewport: &Rect) -> bool {
    let position = sprite.position;
    !(position.x + sprite.size < viewport.top_left.x
        || position.x > viewport.bottom_right.x
        || position.y + sprite.size < viewport.top_left.y
        || position.y > viewport.bottom_right.y)
}

/// Keep only the sprites that intersect `viewport`, preserving order.
pub fn visible<'a, I>(sprites: I, viewport: &'a Rect) -> impl Iterator<Item = &'a Sprite> + 'a
where
    I: IntoIterator<Item = &'a Sprite>,
    I::IntoIter: 'a,
{
    sprites
        .into_iter()
        .filter(move |sprite| is_visible(sprite, viewport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::sprite::SpriteNode;

    fn viewport() -> Rect {
        Rect::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
    }

    fn at(x: f64, y: f64, size: f64) -> Sprite {
        Sprite::new(0, Point::new(x, y), size)
    }

    #[test]
    fn sprite_inside_is_visible() {
        assert!(is_visible(&at(10.0, 10.0, 20.0), &viewport()));
        assert!(is_visible(&at(0.0, 0.0, 100.0), &viewport()));
    }

    #[test]
    fn sprite_outside_by_its_size_is_culled() {
        let size = 10.0;
        for &(x, y) in &[(-20.0, 50.0), (110.0, 50.0), (50.0, -20.0), (50.0, 110.0)] {
            assert!(!is_visible(&at(x, y, size), &viewport()), "({x}, {y})");
        }
    }

    #[test]
    fn edge_contact_is_visible() {
        assert!(is_visible(&at(-10.0, 50.0, 10.0), &viewport()));
        assert!(is_visible(&at(100.0, 50.0, 10.0), &viewport()));
        assert!(!is_visible(&at(100.001, 50.0, 10.0), &viewport()));
    }

    #[test]
    fn partial_overlap_is_visible() {
        assert!(is_visible(&at(-5.0, -5.0, 10.0), &viewport()));
        assert!(is_visible(&at(95.0, 95.0, 10.0), &viewport()));
    }

    #[test]
    fn rotation_does_not_change_culling() {
        let sprite = at(-14.0, 50.0, 10.0).with_rotation(45.0);
        assert!(!is_visible(&sprite, &viewport()));
    }

    #[test]
    fn visible_preserves_order() {
        let tree: SpriteNode = vec![
            Sprite { image_index: 0, ..at(10.0, 10.0, 5.0) },
            Sprite { image_index: 1, ..at(500.0, 10.0, 5.0) },
            Sprite { image_index: 2, ..at(90.0, 90.0, 5.0) },
        ]
        .into_iter()
        .collect();
        let viewport = viewport();
        let kept: Vec<usize> = visible(&tree, &viewport).map(|s| s.image_index).collect();
        assert_eq!(kept, vec![0, 2]);
    }
}
