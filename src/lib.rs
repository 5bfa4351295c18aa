// ==================== Imports ====================
use wasm_bindgen::prelude::*;

// ┌────────────────────────────────────────────────────────────────────┐
// │                          Frame pipeline                            │
// ├──────────────┬─────────────────────────────────────────────────────┤
// │ scheduler.rs │ refresh loop state machine + debounced resize       │
// │ viewport.rs  │ center/width or explicit rect -> visible world rect │
// │ geometry.rs  │ Point, Rect, SurfaceSize, world -> surface Transform│
// │ sprite/      │ nested sprite tree, flattening, culling             │
// │ mask.rs      │ background strips outside the map bounds            │
// │ render.rs    │ Surface trait, draw_frame, sprite painter           │
// ├──────────────┼─────────────────────────────────────────────────────┤
// │ browser.rs   │ web-sys wrappers                                    │
// │ engine.rs    │ Scene trait, GameLoop, canvas Renderer              │
// │ view.rs      │ GameView / GameHandle exported to JavaScript        │
// │ demo.rs      │ tile-map scene with a patrolling character          │
// └──────────────┴─────────────────────────────────────────────────────┘
pub mod browser;
pub mod config;
pub mod demo;
pub mod engine;
pub mod geometry;
pub mod mask;
pub mod render;
pub mod scheduler;
pub mod sprite;
pub mod view;
pub mod viewport;

pub use config::RenderConfig;
pub use view::{GameHandle, GameView};

use engine::{GameLoop, SurfaceTarget};

// ==================== Main Functions ====================
/// Main entry for the WebAssembly module
/// - better panic messages
/// - `log` output to the browser console
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // a second call keeps the logger that is already installed
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        log::warn!("console logger not replaced : {}", err);
    }
    Ok(())
}

/// Load the demo sprite sheets and start drawing them into `canvas_id`,
/// sized to follow `container_id`.
#[wasm_bindgen]
pub async fn run_demo(canvas_id: String, container_id: String) -> Result<GameHandle, JsValue> {
    let target = SurfaceTarget::from_ids(&canvas_id, &container_id).map_err(view::to_js)?;
    let handle = GameLoop::start(demo::TileDemo::new(), target, RenderConfig::default())
        .await
        .map_err(view::to_js)?;
    Ok(GameHandle::new(handle))
}
