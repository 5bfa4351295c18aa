use crate::config::RenderConfig;
use crate::geometry::{Rect, SurfaceSize, Transform};
use crate::mask;
use crate::sprite::{cull, Sprite, SpriteNode};
use crate::viewport::Viewport;
use anyhow::Result;

// ==================== Traits ====================

/// A decoded image that a [`Surface`] can blit from.
pub trait ImageSource {
    /// natural width and height in image pixels
    fn dimensions(&self) -> (f64, f64);

    /// `false` while the image is still decoding; such sprites are skipped
    fn is_ready(&self) -> bool {
        true
    }
}

/// The drawing target. Implemented by the canvas [`crate::engine::Renderer`]
/// in the browser and by in-memory surfaces in tests.
pub trait Surface {
    type Image: ImageSource;

    fn size(&self) -> SurfaceSize;
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: &Rect, color: &str);
    fn stroke_rect(&mut self, rect: &Rect, line_width: f64, color: &str);
    fn draw_image(&mut self, image: &Self::Image, source: &Rect, destination: &Rect) -> Result<()>;
}

// ==================== Frame ====================

/// Everything the caller hands over for one frame. Nothing here is mutated.
pub struct FrameInput<'a, I> {
    /// addressed by `Sprite::image_index`, `None` = not loaded yet
    pub images: &'a [Option<I>],
    pub sprites: &'a SpriteNode,
    pub viewport: Viewport,
    pub map_bounds: Rect,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub masked_strips: usize,
    pub drawn: usize,
    pub culled: usize,
    pub unresolved: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptySurface,
    DegenerateViewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn(FrameStats),
    Skipped(SkipReason),
}

/// Draw one full frame.
///
/// ```text
/// clear ─► mask outside map ─► flatten ─► cull ─► paint ─► border
/// ```
///
/// Degenerate geometry skips the frame without touching the surface.
pub fn draw_frame<S: Surface>(
    surface: &mut S,
    input: &FrameInput<'_, S::Image>,
    config: &RenderConfig,
) -> FrameOutcome {
    let size = surface.size();
    if size.is_empty() {
        return FrameOutcome::Skipped(SkipReason::EmptySurface);
    }
    let Some((viewport, transform)) = input
        .viewport
        .resolve(size)
        .and_then(|viewport| Some((viewport, Transform::new(&viewport, size)?)))
    else {
        return FrameOutcome::Skipped(SkipReason::DegenerateViewport);
    };

    let mut stats = FrameStats::default();
    surface.clear();

    for strip in mask::mask_strips(&input.map_bounds, &viewport, &transform, size) {
        surface.fill_rect(&strip, &config.background);
        stats.masked_strips += 1;
    }

    let mut flattened = 0;
    let mut kept = 0;
    let sprites = input.sprites.iter().inspect(|_| flattened += 1);
    for sprite in cull::visible(sprites, &viewport) {
        kept += 1;
        let Some(image) = resolve_image(input.images, sprite.image_index) else {
            stats.unresolved += 1;
            continue;
        };
        match paint_sprite(surface, sprite, image, &transform, config.seam_padding) {
            Ok(()) => stats.drawn += 1,
            Err(err) => {
                log::warn!("Could not draw sprite (image {}) : {:#}", sprite.image_index, err);
                stats.failed += 1;
            }
        }
    }
    stats.culled = flattened - kept;

    if config.border_width > 0.0 {
        surface.stroke_rect(&size.bounds(), config.border_width, &config.border_color);
    }

    FrameOutcome::Drawn(stats)
}

/// Index lookup that never blocks: missing, empty or still-decoding slots
/// are all "not yet".
pub fn resolve_image<I: ImageSource>(images: &[Option<I>], index: usize) -> Option<&I> {
    images
        .get(index)
        .and_then(Option::as_ref)
        .filter(|image| image.is_ready())
}

/// Blit one sprite.
/// # Arguments
/// * `padding` - surface units added to the destination width and height so
///   neighbouring tiles overlap instead of leaving sub-pixel seams
pub fn paint_sprite<S: Surface>(
    surface: &mut S,
    sprite: &Sprite,
    image: &S::Image,
    transform: &Transform,
    padding: f64,
) -> Result<()> {
    let (image_width, image_height) = image.dimensions();
    let source = sprite.source_rect(image_width, image_height);
    let origin = transform.to_surface(sprite.position);
    let side = transform.length_to_surface(sprite.size) + padding;
    let destination = Rect::from_xywh(origin.x, origin.y, side, side);
    surface.draw_image(image, &source, &destination)
}
