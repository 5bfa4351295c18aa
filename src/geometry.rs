use serde::{Deserialize, Serialize};

// ==================== Points & Rects ====================

/// A point in either world space or surface space.
/// - which one is decided by the caller, the two are never mixed
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis aligned rectangle stored as two corners.
///
/// Invariant: `bottom_right.x >= top_left.x` and `bottom_right.y >= top_left.y`
/// whenever the rect is built through [`Rect::new`] or [`Rect::from_xywh`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Rect {
    /// Build a rect from any two opposite corners.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            top_left: Point::new(a.x.min(b.x), a.y.min(b.y)),
            bottom_right: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Point::new(x + width, y + height))
    }

    pub fn x(&self) -> f64 {
        self.top_left.x
    }

    pub fn y(&self) -> f64 {
        self.top_left.y
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    /// Separating axis test; rects that only touch along an edge intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.bottom_right.x < other.top_left.x
            || self.top_left.x > other.bottom_right.x
            || self.bottom_right.y < other.top_left.y
            || self.top_left.y > other.bottom_right.y)
    }

    /// True for zero, negative or NaN extents.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

// ==================== Surface ====================

/// Size of the drawing surface in device pixels.
/// - replaced as one value so a frame never sees a half updated pair
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// height / width, `None` for a zero width surface
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0).then(|| f64::from(self.height) / f64::from(self.width))
    }

    /// The whole surface as a surface-space rect.
    pub fn bounds(&self) -> Rect {
        Rect::from_xywh(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

// ==================== Transform ====================

/// World -> surface mapping for one frame.
///
/// ```text
/// ┌──────── world ────────┐           ┌──── surface ────┐
/// │ viewport.top_left ●   │  (p - tl) │ ● (0, 0)        │
/// │        ┌──────┐       │  ───────► │                 │
/// │        │  p   │       │    * k    │     p'          │
/// │        └──────┘       │           │                 │
/// └───────────────────────┘           └─────────────────┘
///  k = surface.width / viewport.width, same on both axes
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    origin: Point,
    scale: f64,
}

impl Transform {
    /// Returns `None` when the viewport or surface has no width, which would
    /// otherwise divide by zero.
    pub fn new(viewport: &Rect, surface: SurfaceSize) -> Option<Self> {
        let world_width = viewport.width();
        if surface.width == 0 || !(world_width > 0.0) {
            return None;
        }
        let scale = f64::from(surface.width) / world_width;
        scale.is_finite().then_some(Self {
            origin: viewport.top_left,
            scale,
        })
    }

    /// Surface units per world unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_surface(&self, world: Point) -> Point {
        Point {
            x: (world.x - self.origin.x) * self.scale,
            y: (world.y - self.origin.y) * self.scale,
        }
    }

    pub fn to_world(&self, surface: Point) -> Point {
        Point {
            x: surface.x / self.scale + self.origin.x,
            y: surface.y / self.scale + self.origin.y,
        }
    }

    pub fn length_to_surface(&self, length: f64) -> f64 {
        length * self.scale
    }

    pub fn length_to_world(&self, length: f64) -> f64 {
        length / self.scale
    }
}
