use crate::geometry::{Rect, SurfaceSize, Transform};

/// Surface-space strips covering every visible part of the world that lies
/// outside `map`.
///
/// ```text
///  viewport fully off the map     viewport overlapping the map edge
///  ┌──────────────┐               ┌──────────────┐
///  │██████████████│               │██████████████│ ◄─ top strip
///  │██████████████│               │███┌──────────│
///  │██████████████│               │███│   map    │
///  └──────────────┘               └───┴──────────┘
///   one full fill                  ▲ left strip
/// ```
///
/// Strips may overlap at the corners; they are filled with one solid color so
/// the overlap is harmless. Every strip is clamped to the surface.
pub fn mask_strips(map: &Rect, viewport: &Rect, transform: &Transform, surface: SurfaceSize) -> Vec<Rect> {
    let surface_width = f64::from(surface.width);
    let surface_height = f64::from(surface.height);

    if !viewport.intersects(map) {
        return vec![surface.bounds()];
    }

    let mut strips = Vec::with_capacity(4);

    // map starts below the top of the view
    if map.top_left.y > viewport.top_left.y {
        let height = transform.length_to_surface(map.top_left.y - viewport.top_left.y);
        strips.push(Rect::from_xywh(0.0, 0.0, surface_width, height.min(surface_height)));
    }

    // map ends above the bottom of the view
    if map.bottom_right.y < viewport.bottom_right.y {
        let top = transform.to_surface(map.bottom_right).y.clamp(0.0, surface_height);
        strips.push(Rect::from_xywh(0.0, top, surface_width, surface_height - top));
    }

    // map starts right of the left of the view
    if map.top_left.x > viewport.top_left.x {
        let width = transform.length_to_surface(map.top_left.x - viewport.top_left.x);
        strips.push(Rect::from_xywh(0.0, 0.0, width.min(surface_width), surface_height));
    }

    // map ends left of the right of the view
    if map.bottom_right.x < viewport.bottom_right.x {
        let left = transform.to_surface(map.bottom_right).x.clamp(0.0, surface_width);
        strips.push(Rect::from_xywh(left, 0.0, surface_width - left, surface_height));
    }

    strips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use approx::assert_abs_diff_eq;

    const SURFACE: SurfaceSize = SurfaceSize::new(100, 100);

    fn map() -> Rect {
        Rect::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
    }

    fn strips_for(viewport: Rect) -> Vec<Rect> {
        let transform = Transform::new(&viewport, SURFACE).unwrap();
        mask_strips(&map(), &viewport, &transform, SURFACE)
    }

    #[test]
    fn viewport_inside_map_masks_nothing() {
        assert!(strips_for(Rect::from_xywh(10.0, 10.0, 50.0, 50.0)).is_empty());
        assert!(strips_for(map()).is_empty());
    }

    #[test]
    fn viewport_off_map_masks_everything() {
        let strips = strips_for(Rect::from_xywh(200.0, 200.0, 50.0, 50.0));
        assert_eq!(strips, vec![SURFACE.bounds()]);
    }

    #[test]
    fn top_left_overhang_masks_top_and_left_strips() {
        let strips = strips_for(Rect::from_xywh(-50.0, -50.0, 100.0, 100.0));
        assert_eq!(
            strips,
            vec![
                Rect::from_xywh(0.0, 0.0, 100.0, 50.0),
                Rect::from_xywh(0.0, 0.0, 50.0, 100.0),
            ]
        );
    }

    #[test]
    fn bottom_right_overhang_masks_bottom_and_right_strips() {
        let strips = strips_for(Rect::from_xywh(75.0, 80.0, 100.0, 100.0));
        assert_eq!(strips.len(), 2);
        assert_abs_diff_eq!(strips[0].y(), 20.0);
        assert_abs_diff_eq!(strips[0].height(), 80.0);
        assert_abs_diff_eq!(strips[0].width(), 100.0);
        assert_abs_diff_eq!(strips[1].x(), 25.0);
        assert_abs_diff_eq!(strips[1].width(), 75.0);
        assert_abs_diff_eq!(strips[1].height(), 100.0);
    }

    #[test]
    fn zoomed_out_view_masks_all_four_edges() {
        // 400 world units onto 100 pixels, map sits in the middle quarter
        let strips = strips_for(Rect::from_xywh(-150.0, -150.0, 400.0, 400.0));
        assert_eq!(
            strips,
            vec![
                Rect::from_xywh(0.0, 0.0, 100.0, 37.5),
                Rect::from_xywh(0.0, 62.5, 100.0, 37.5),
                Rect::from_xywh(0.0, 0.0, 37.5, 100.0),
                Rect::from_xywh(62.5, 0.0, 37.5, 100.0),
            ]
        );
    }

    #[test]
    fn strip_extents_scale_with_zoom() {
        let viewport = Rect::from_xywh(-10.0, 20.0, 50.0, 50.0);
        let surface = SurfaceSize::new(200, 200);
        let transform = Transform::new(&viewport, surface).unwrap();
        let strips = mask_strips(&map(), &viewport, &transform, surface);
        assert_eq!(strips, vec![Rect::from_xywh(0.0, 0.0, 40.0, 200.0)]);
    }
}
