// ┌──────────────────────────────────────────────────────────────────────┐
// │                        sprite/ module layout                         │
// ├──────────────┬───────────────────────────────────────────────────────┤
// │ mod.rs       │ Sprite + SpriteNode data, sheet sub-rect resolution   │
// │ tree.rs      │ depth-first flattening of nested SpriteNode groups    │
// │ cull.rs      │ viewport intersection test for bounding squares       │
// └──────────────┴───────────────────────────────────────────────────────┘
pub mod cull;
pub mod tree;

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

pub use self::tree::Flatten;

/// One drawable square in world space.
///
/// The `source_*` fields pick a tile out of a sprite sheet. When they are
/// absent the whole image is used, so plain images and sheet tiles go
/// through the same painter path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sprite {
    #[serde(alias = "imageIndex")]
    pub image_index: usize,
    /// top left of the bounding square
    pub position: Point,
    /// side length of the bounding square
    pub size: f64,
    /// degrees, carried but not applied by the painter
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, rename = "sx", alias = "sourceX", skip_serializing_if = "Option::is_none")]
    pub source_x: Option<u32>,
    #[serde(default, rename = "sy", alias = "sourceY", skip_serializing_if = "Option::is_none")]
    pub source_y: Option<u32>,
    #[serde(default, rename = "sWidth", alias = "sourceWidth", skip_serializing_if = "Option::is_none")]
    pub source_width: Option<u32>,
    #[serde(default, rename = "sHeight", alias = "sourceHeight", skip_serializing_if = "Option::is_none")]
    pub source_height: Option<u32>,
}

impl Sprite {
    pub fn new(image_index: usize, position: Point, size: f64) -> Self {
        Sprite {
            image_index,
            position,
            size,
            rotation: 0.0,
            source_x: None,
            source_y: None,
            source_width: None,
            source_height: None,
        }
    }

    /// Restrict the sprite to a tile of its image.
    pub fn with_source(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.source_x = Some(x);
        self.source_y = Some(y);
        self.source_width = Some(width);
        self.source_height = Some(height);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// World space bounding square `[position, position + size]`.
    /// - built from the raw corners, a negative size is not normalized
    pub fn bounds(&self) -> Rect {
        Rect {
            top_left: self.position,
            bottom_right: Point::new(self.position.x + self.size, self.position.y + self.size),
        }
    }

    /// Image space rect to sample from.
    /// - missing offsets are 0, missing (or zero) extents are the full image
    /// - applied the same way for every sprite
    pub fn source_rect(&self, image_width: f64, image_height: f64) -> Rect {
        let width = self
            .source_width
            .filter(|w| *w > 0)
            .map_or(image_width, f64::from);
        let height = self
            .source_height
            .filter(|h| *h > 0)
            .map_or(image_height, f64::from);
        Rect::from_xywh(
            self.source_x.map_or(0.0, f64::from),
            self.source_y.map_or(0.0, f64::from),
            width,
            height,
        )
    }
}

/// Nested sprite list.
/// - draw order is the depth-first, left-to-right walk
/// - groups are only an authoring convenience, no transform or z-index
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SpriteNode {
    Leaf(Sprite),
    Group(Vec<SpriteNode>),
}

// the derived drop recurses once per nesting level
impl Drop for SpriteNode {
    fn drop(&mut self) {
        let SpriteNode::Group(children) = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let SpriteNode::Group(children) = &mut node {
                pending.append(children);
            }
        }
    }
}

impl Default for SpriteNode {
    fn default() -> Self {
        SpriteNode::Group(Vec::new())
    }
}

impl SpriteNode {
    /// Lazily walk every leaf in draw order.
    pub fn iter(&self) -> Flatten<'_> {
        Flatten::new(self)
    }
}

impl<'a> IntoIterator for &'a SpriteNode {
    type Item = &'a Sprite;
    type IntoIter = Flatten<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Sprite> for SpriteNode {
    fn from(sprite: Sprite) -> Self {
        SpriteNode::Leaf(sprite)
    }
}

impl From<Vec<SpriteNode>> for SpriteNode {
    fn from(children: Vec<SpriteNode>) -> Self {
        SpriteNode::Group(children)
    }
}

impl FromIterator<Sprite> for SpriteNode {
    fn from_iter<T: IntoIterator<Item = Sprite>>(iter: T) -> Self {
        SpriteNode::Group(iter.into_iter().map(SpriteNode::Leaf).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn source_defaults_to_full_image() {
        let sprite = Sprite::new(0, Point::new(0.0, 0.0), 10.0);
        let source = sprite.source_rect(64.0, 32.0);
        assert_eq!(source, Rect::from_xywh(0.0, 0.0, 64.0, 32.0));
    }

    #[test]
    fn source_picks_sheet_tile() {
        let sprite = Sprite::new(0, Point::new(0.0, 0.0), 10.0).with_source(96, 33, 30, 30);
        let source = sprite.source_rect(320.0, 320.0);
        assert_abs_diff_eq!(source.x(), 96.0);
        assert_abs_diff_eq!(source.y(), 33.0);
        assert_abs_diff_eq!(source.width(), 30.0);
        assert_abs_diff_eq!(source.height(), 30.0);
    }

    #[test]
    fn zero_source_extent_falls_back_to_image() {
        let mut sprite = Sprite::new(0, Point::new(0.0, 0.0), 10.0).with_source(4, 4, 0, 8);
        let source = sprite.source_rect(16.0, 16.0);
        assert_abs_diff_eq!(source.width(), 16.0);
        assert_abs_diff_eq!(source.height(), 8.0);

        sprite.source_height = None;
        assert_abs_diff_eq!(sprite.source_rect(16.0, 16.0).height(), 16.0);
    }

    #[test]
    fn bounds_is_the_bounding_square() {
        let sprite = Sprite::new(0, Point::new(10.0, -5.0), 20.0).with_rotation(45.0);
        let bounds = sprite.bounds();
        assert_eq!(bounds.top_left, Point::new(10.0, -5.0));
        assert_eq!(bounds.bottom_right, Point::new(30.0, 15.0));
    }

    #[test]
    fn deserializes_js_sprite_shape() {
        let node: SpriteNode = serde_json::from_str(
            r#"[
                {"image_index": 0, "position": {"x": 100, "y": 200}, "size": 100,
                 "rotation": 0, "sx": 32, "sy": 1, "sWidth": 30, "sHeight": 30},
                [{"imageIndex": 1, "position": {"x": 0.5, "y": 0}, "size": 75}]
            ]"#,
        )
        .unwrap();

        let sprites: Vec<&Sprite> = node.iter().collect();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].source_x, Some(32));
        assert_eq!(sprites[0].source_height, Some(30));
        assert_eq!(sprites[1].image_index, 1);
        assert_eq!(sprites[1].source_width, None);
        assert_abs_diff_eq!(sprites[1].rotation, 0.0);
    }

    #[test]
    fn source_offsets_must_be_whole_pixels() {
        let fractional = r#"[{"imageIndex": 0, "position": {"x": 0, "y": 0}, "size": 1, "sx": 1.5}]"#;
        let negative = r#"[{"imageIndex": 0, "position": {"x": 0, "y": 0}, "size": 1, "sy": -1}]"#;
        assert!(serde_json::from_str::<SpriteNode>(fractional).is_err());
        assert!(serde_json::from_str::<SpriteNode>(negative).is_err());
    }

    #[test]
    fn rejects_entries_that_are_neither_sprite_nor_list() {
        assert!(serde_json::from_str::<SpriteNode>(r#"[{"image_index": 0}]"#).is_err());
        assert!(serde_json::from_str::<SpriteNode>(r#"[1, 2, 3]"#).is_err());
        assert!(serde_json::from_str::<SpriteNode>(r#""sprite""#).is_err());
    }
}
