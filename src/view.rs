use crate::config::RenderConfig;
use crate::engine::{GameLoop, GameLoopHandle, Renderer, Scene, SurfaceTarget};
use crate::geometry::{Point, Rect};
use crate::render::{self, FrameInput, FrameOutcome};
use crate::sprite::SpriteNode;
use crate::viewport::Viewport;
use anyhow::anyhow;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

pub(crate) fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

/// Per-frame inputs, rewritten by JavaScript between frames.
struct ViewInputs {
    images: Vec<Option<HtmlImageElement>>,
    sprites: SpriteNode,
    viewport: Viewport,
    map_bounds: Rect,
}

/// Scene that simply draws whatever the host last handed over.
struct ViewScene {
    inputs: Rc<RefCell<ViewInputs>>,
}

impl Scene for ViewScene {
    // camera and sprites are moved by the host
    fn update(&mut self) {}

    fn draw(&self, renderer: &mut Renderer, config: &RenderConfig) -> FrameOutcome {
        let inputs = self.inputs.borrow();
        let frame = FrameInput {
            images: &inputs.images,
            sprites: &inputs.sprites,
            viewport: inputs.viewport,
            map_bounds: inputs.map_bounds,
        };
        render::draw_frame(renderer, &frame, config)
    }
}

/// JavaScript handle on one canvas view.
///
/// ```js
/// const view = new GameView("canvas", "container", 0, 0, 1000, 1000);
/// view.setImages([terrain, character]);
/// view.setSprites([mapTiles, charTiles]);
/// view.setViewCenter(500, 500, 1100);
/// view.start();
/// // on unmount
/// view.stop();
/// ```
#[wasm_bindgen]
pub struct GameView {
    canvas_id: String,
    container_id: String,
    config: RenderConfig,
    inputs: Rc<RefCell<ViewInputs>>,
    handle: Option<GameLoopHandle>,
}

#[wasm_bindgen]
impl GameView {
    /// The view starts centered on the map, showing its full width.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        container_id: &str,
        map_left: f64,
        map_top: f64,
        map_right: f64,
        map_bottom: f64,
        config: JsValue,
    ) -> Result<GameView, JsValue> {
        let config = RenderConfig::from_js(config).map_err(to_js)?;
        let map_bounds = Rect::new(Point::new(map_left, map_top), Point::new(map_right, map_bottom));
        let center = Point::new(
            (map_bounds.top_left.x + map_bounds.bottom_right.x) / 2.0,
            (map_bounds.top_left.y + map_bounds.bottom_right.y) / 2.0,
        );
        Ok(GameView {
            canvas_id: canvas_id.to_string(),
            container_id: container_id.to_string(),
            config,
            inputs: Rc::new(RefCell::new(ViewInputs {
                images: Vec::new(),
                sprites: SpriteNode::default(),
                viewport: Viewport::centered(center, map_bounds.width()),
                map_bounds,
            })),
            handle: None,
        })
    }

    /// Anything that is not an `HTMLImageElement` (e.g. `undefined` while a
    /// load is in flight) becomes an unresolved slot.
    #[wasm_bindgen(js_name = setImages)]
    pub fn set_images(&mut self, images: Box<[JsValue]>) {
        self.inputs.borrow_mut().images = images
            .into_vec()
            .into_iter()
            .map(|value| value.dyn_into::<HtmlImageElement>().ok())
            .collect();
    }

    /// Arrays nest arbitrarily; every other entry must be a sprite object.
    /// A malformed tree is rejected and the previous one is kept.
    ///
    /// `imageIndex`, `sx`, `sy`, `sWidth` and `sHeight` are whole image
    /// pixels: a fractional or negative value anywhere rejects the whole
    /// tree, so round sheet offsets before handing them over.
    #[wasm_bindgen(js_name = setSprites)]
    pub fn set_sprites(&mut self, sprites: JsValue) -> Result<(), JsValue> {
        let sprites: SpriteNode = serde_wasm_bindgen::from_value(sprites)
            .map_err(|err| to_js(anyhow!("Invalid sprite list : {}", err)))?;
        self.inputs.borrow_mut().sprites = sprites;
        Ok(())
    }

    #[wasm_bindgen(js_name = setViewCenter)]
    pub fn set_view_center(&mut self, x: f64, y: f64, width: f64) {
        self.inputs.borrow_mut().viewport = Viewport::centered(Point::new(x, y), width);
    }

    #[wasm_bindgen(js_name = setViewRect)]
    pub fn set_view_rect(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.inputs.borrow_mut().viewport =
            Viewport::explicit(Rect::new(Point::new(left, top), Point::new(right, bottom)));
    }

    #[wasm_bindgen(js_name = setMapBounds)]
    pub fn set_map_bounds(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.inputs.borrow_mut().map_bounds = Rect::new(Point::new(left, top), Point::new(right, bottom));
    }

    /// Begin drawing. A second call while running is a no-op; a loop that
    /// halted on its own is torn down and replaced.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.is_running() {
            return Ok(());
        }
        self.stop();
        let target = SurfaceTarget::from_ids(&self.canvas_id, &self.container_id).map_err(to_js)?;
        let scene = Box::new(ViewScene {
            inputs: Rc::clone(&self.inputs),
        });
        self.handle = Some(GameLoop::run(scene, target, self.config.clone()).map_err(to_js)?);
        Ok(())
    }

    /// Cancel the pending frame and resize timer. Safe to call when stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(GameLoopHandle::is_running)
    }
}

// `view.free()` on the JS side lands here
impl Drop for GameView {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returned to JavaScript by `run_demo`.
#[wasm_bindgen]
pub struct GameHandle {
    inner: Option<GameLoopHandle>,
}

impl GameHandle {
    pub fn new(handle: GameLoopHandle) -> Self {
        GameHandle {
            inner: Some(handle),
        }
    }
}

#[wasm_bindgen]
impl GameHandle {
    pub fn stop(&mut self) {
        if let Some(handle) = self.inner.take() {
            handle.stop();
        }
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
