use crate::geometry::{Point, Rect, SurfaceSize};
use serde::{Deserialize, Serialize};

/// The world rectangle the caller wants to see.
///
/// | Variant    | Height comes from          | Shape on resize        |
/// |------------|----------------------------|------------------------|
/// | `Centered` | `width * surface aspect`   | follows the surface    |
/// | `Explicit` | the caller's rect          | caller keeps it square |
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Viewport {
    Centered { center: Point, width: f64 },
    Explicit(Rect),
}

impl Viewport {
    pub fn centered(center: Point, width: f64) -> Self {
        Viewport::Centered { center, width }
    }

    pub fn explicit(rect: Rect) -> Self {
        Viewport::Explicit(rect)
    }

    /// Normalize to the visible world rect for the current surface.
    /// - recomputed every frame, so a resize reshapes a `Centered` view
    /// - `None` on degenerate input, the frame is then skipped
    pub fn resolve(&self, surface: SurfaceSize) -> Option<Rect> {
        let rect = match *self {
            Viewport::Centered { center, width } => {
                let view_height = width * surface.aspect_ratio()?;
                let half = Point::new(width / 2.0, view_height / 2.0);
                Rect {
                    top_left: Point::new(center.x - half.x, center.y - half.y),
                    bottom_right: Point::new(center.x + half.x, center.y + half.y),
                }
            }
            Viewport::Explicit(rect) => rect,
        };
        (!rect.is_degenerate()).then_some(rect)
    }
}
