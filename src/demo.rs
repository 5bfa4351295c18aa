use crate::config::RenderConfig;
use crate::engine::{self, Renderer, Scene, SceneLoader};
use crate::geometry::{Point, Rect};
use crate::render::{self, FrameInput, FrameOutcome};
use crate::sprite::{Sprite, SpriteNode};
use crate::viewport::Viewport;
use anyhow::Result;
use async_trait::async_trait;
use futures::join;
use log::warn;
use web_sys::HtmlImageElement;

/// TABLE
/// ┌──────────────────────── Tile Demo Overview ─────────────────────────┐
/// │                                                                     │
/// │   images[0] terrain sheet       images[1] character sheet           │
/// │   10 cols x 32px tiles          4 cols x 4 rows, 48px frames        │
/// │          │                               │                          │
/// │          ▼                               ▼                          │
/// │   Group(100 tiles) ───────┬────── Leaf(hero)   ◄─ replaced/update   │
/// │                           ▼                                         │
/// │                  Group([tiles, hero])  ──► draw_frame               │
/// │                                                                     │
/// │   camera: centered on hero, clamped to the map, 1100 units wide     │
/// └─────────────────────────────────────────────────────────────────────┘
#[derive(Debug, Default, Clone, Copy)]
pub struct TileDemo;

// ==================== Assets ====================
mod assets {
    pub const TERRAIN_PATH: &str = "terrain_tiles_v2.png";
    pub const CHARACTER_PATH: &str = "Character_007.png";

    pub const TERRAIN: usize = 0;
    pub const CHARACTER: usize = 1;
}

// ==================== World ====================
const MAP_BOUNDS: Rect = Rect {
    top_left: Point::new(0.0, 0.0),
    bottom_right: Point::new(1000.0, 1000.0),
};
const VIEW_WIDTH: f64 = 1100.0;
const TILE_SIZE: f64 = 100.0;

// terrain sheet: 10 tiles per row, 32px pitch, 30px art starting 1px down
const SHEET_COLUMNS: u32 = 10;
const SHEET_PITCH: u32 = 32;
const SHEET_TILE: u32 = 30;

// 55 = grass, 0..42 = lake edges and the path south
#[rustfmt::skip]
const TILE_MAP: [[u32; 10]; 10] = [
    [55, 55, 55, 55, 55, 55, 55, 55, 55, 55],
    [55, 55, 55, 55, 55, 55, 55, 55, 55, 55],
    [55, 55, 55, 55, 55, 55, 55, 55, 55, 55],
    [55, 55, 55,  0,  1,  1,  2, 55, 55, 55],
    [55, 55, 55, 10, 11, 11, 12, 55, 55, 55],
    [55, 55, 55, 10, 11, 11, 12, 55, 55, 55],
    [55, 55, 55, 20, 42, 40, 22, 55, 55, 55],
    [55, 55, 55, 55, 10, 12, 55, 55, 55, 55],
    [55, 55, 55, 55, 10, 12, 55, 55, 55, 55],
    [55, 55, 55, 55, 10, 12, 55, 55, 55, 55],
];

// ==================== Hero ====================
const HERO_SIZE: f64 = 75.0;
const HERO_SPEED: f64 = 2.0;
const HERO_FRAME: u32 = 48;
const HERO_FRAMES: u32 = 4;
const TICKS_PER_FRAME: u32 = 8;
const HERO_LAYER: usize = 1;

const PATROL: [Point; 4] = [
    Point::new(350.0, 350.0),
    Point::new(650.0, 350.0),
    Point::new(650.0, 650.0),
    Point::new(350.0, 650.0),
];

/// Sheet row for each walking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facing {
    Down,
    Left,
    Right,
    Up,
}

impl Facing {
    fn row(self) -> u32 {
        match self {
            Facing::Down => 0,
            Facing::Left => 1,
            Facing::Right => 2,
            Facing::Up => 3,
        }
    }

    fn toward(dx: f64, dy: f64) -> Self {
        if dx.abs() >= dy.abs() {
            if dx < 0.0 {
                Facing::Left
            } else {
                Facing::Right
            }
        } else if dy < 0.0 {
            Facing::Up
        } else {
            Facing::Down
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Hero {
    position: Point,
    facing: Facing,
    frame: u32,
    ticks: u32,
    waypoint: usize,
}

impl Hero {
    fn new() -> Self {
        Hero {
            position: PATROL[0],
            facing: Facing::Down,
            frame: 0,
            ticks: 0,
            waypoint: 1,
        }
    }

    /// walk toward the next waypoint, snapping onto it on arrival
    fn update(&mut self) {
        let target = PATROL[self.waypoint];
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let distance = dx.hypot(dy);

        if distance > 0.0 {
            self.facing = Facing::toward(dx, dy);
        }
        if distance <= HERO_SPEED {
            self.position = target;
            self.waypoint = (self.waypoint + 1) % PATROL.len();
        } else {
            self.position.x += HERO_SPEED * dx / distance;
            self.position.y += HERO_SPEED * dy / distance;
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % TICKS_PER_FRAME == 0 {
            self.frame = (self.frame + 1) % HERO_FRAMES;
        }
    }

    /// hero position is the center of its bounding square
    fn sprite(&self) -> Sprite {
        let half = HERO_SIZE / 2.0;
        Sprite::new(
            assets::CHARACTER,
            Point::new(self.position.x - half, self.position.y - half),
            HERO_SIZE,
        )
        .with_source(
            self.frame * HERO_FRAME,
            self.facing.row() * HERO_FRAME + 1,
            HERO_FRAME,
            HERO_FRAME,
        )
    }
}

// ==================== Scene ====================

/// The loaded demo. Sheets that failed to load stay as empty slots.
pub struct Walk {
    images: Vec<Option<HtmlImageElement>>,
    sprites: SpriteNode,
    hero: Hero,
}

impl Walk {
    fn new(images: Vec<Option<HtmlImageElement>>) -> Self {
        let hero = Hero::new();
        Walk {
            images,
            sprites: SpriteNode::Group(vec![tile_sprites(), hero.sprite().into()]),
            hero,
        }
    }
}

impl TileDemo {
    pub fn new() -> Self {
        TileDemo
    }

    /// A failed load leaves its slot empty; sprites using it are skipped.
    async fn load(path: &str) -> Option<HtmlImageElement> {
        engine::load_image(path)
            .await
            .map_err(|err| warn!("{:#}", err))
            .ok()
    }
}

#[async_trait(?Send)]
impl SceneLoader for TileDemo {
    async fn initialize(self) -> Result<Box<dyn Scene>> {
        // both sheets load in parallel
        let (terrain, character) =
            join!(Self::load(assets::TERRAIN_PATH), Self::load(assets::CHARACTER_PATH));
        let mut images = vec![None; 2];
        images[assets::TERRAIN] = terrain;
        images[assets::CHARACTER] = character;
        if images.iter().all(Option::is_none) {
            warn!("no demo sprite sheet loaded, drawing the mask only");
        }
        Ok(Box::new(Walk::new(images)))
    }
}

impl Scene for Walk {
    fn update(&mut self) {
        self.hero.update();
        if let SpriteNode::Group(layers) = &mut self.sprites {
            if let Some(slot) = layers.get_mut(HERO_LAYER) {
                *slot = self.hero.sprite().into();
            }
        }
    }

    fn draw(&self, renderer: &mut Renderer, config: &RenderConfig) -> FrameOutcome {
        let frame = FrameInput {
            images: &self.images,
            sprites: &self.sprites,
            viewport: Viewport::centered(camera_center(self.hero.position, &MAP_BOUNDS), VIEW_WIDTH),
            map_bounds: MAP_BOUNDS,
        };
        render::draw_frame(renderer, &frame, config)
    }
}

/// Source rect origin of a terrain tile.
fn tile_source(tile: u32) -> (u32, u32) {
    (
        (tile % SHEET_COLUMNS) * SHEET_PITCH,
        (tile / SHEET_COLUMNS) * SHEET_PITCH + 1,
    )
}

fn tile_sprites() -> SpriteNode {
    TILE_MAP
        .iter()
        .enumerate()
        .flat_map(|(row, tiles)| {
            tiles.iter().enumerate().map(move |(column, &tile)| {
                let (sx, sy) = tile_source(tile);
                Sprite::new(
                    assets::TERRAIN,
                    Point::new(column as f64 * TILE_SIZE, row as f64 * TILE_SIZE),
                    TILE_SIZE,
                )
                .with_source(sx, sy, SHEET_TILE, SHEET_TILE)
            })
        })
        .collect()
}

/// Follow `target`, but never center the camera outside the map.
fn camera_center(target: Point, map: &Rect) -> Point {
    Point::new(
        target.x.clamp(map.top_left.x, map.bottom_right.x),
        target.y.clamp(map.top_left.y, map.bottom_right.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn tile_sources_follow_the_sheet_grid() {
        assert_eq!(tile_source(0), (0, 1));
        assert_eq!(tile_source(12), (64, 33));
        assert_eq!(tile_source(55), (160, 161));
    }

    #[test]
    fn tiles_cover_the_map_row_by_row() {
        let tiles = tile_sprites();
        let sprites: Vec<&Sprite> = tiles.iter().collect();
        assert_eq!(sprites.len(), 100);

        let lake_corner = sprites[3 * 10 + 3];
        assert_eq!(lake_corner.position, Point::new(300.0, 300.0));
        assert_eq!(lake_corner.source_x, Some(0));
        assert_eq!(lake_corner.source_y, Some(1));
        assert_eq!(lake_corner.source_width, Some(30));

        let last = sprites[99];
        assert_eq!(last.bounds().bottom_right, MAP_BOUNDS.bottom_right);
    }

    #[test]
    fn hero_walks_the_patrol_loop() {
        let mut hero = Hero::new();
        hero.update();
        assert_eq!(hero.facing, Facing::Right);
        assert_abs_diff_eq!(hero.position.x, 352.0);
        assert_abs_diff_eq!(hero.position.y, 350.0);

        // 4 legs of 300 units at 2 units per update
        for _ in 1..600 {
            hero.update();
        }
        assert_eq!(hero.position, PATROL[0]);
        assert_eq!(hero.waypoint, 1);
        assert_eq!(hero.facing, Facing::Up);
    }

    #[test]
    fn hero_sprite_is_centered_and_animated() {
        let mut hero = Hero::new();
        for _ in 0..TICKS_PER_FRAME {
            hero.update();
        }
        let sprite = hero.sprite();
        assert_eq!(sprite.image_index, assets::CHARACTER);
        assert_abs_diff_eq!(sprite.position.x, hero.position.x - 37.5);
        assert_abs_diff_eq!(sprite.size, HERO_SIZE);
        // second frame, walking right
        assert_eq!(sprite.source_x, Some(48));
        assert_eq!(sprite.source_y, Some(97));
    }

    #[test]
    fn walk_update_moves_the_hero_layer() {
        let mut walk = Walk::new(vec![None, None]);
        walk.update();
        walk.update();

        let sprites: Vec<&Sprite> = walk.sprites.iter().collect();
        assert_eq!(sprites.len(), 101);
        let hero = sprites[100];
        assert_eq!(hero.image_index, assets::CHARACTER);
        assert_abs_diff_eq!(hero.position.x, 354.0 - HERO_SIZE / 2.0);
        assert_abs_diff_eq!(hero.position.y, 350.0 - HERO_SIZE / 2.0);
    }

    #[test]
    fn camera_stays_on_the_map() {
        assert_eq!(camera_center(Point::new(1200.0, -5.0), &MAP_BOUNDS), Point::new(1000.0, 0.0));
        assert_eq!(camera_center(Point::new(420.0, 80.0), &MAP_BOUNDS), Point::new(420.0, 80.0));
    }
}
