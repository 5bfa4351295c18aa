use crate::browser::{self, LoopClosure, ResizeClosure, TimerClosure};
use crate::config::RenderConfig;
use crate::geometry::{Rect, SurfaceSize};
use crate::render::{FrameOutcome, ImageSource, Surface};
use crate::scheduler::{FrameId, FrameScheduler, Host, SchedulerState, TimerId};
use anyhow::{anyhow, Context, Error, Result};
// web assembly is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use log::{debug, error, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement, ResizeObserver};

/// Anything the loop can drive.
///
/// | Step         | When                                  |
/// |--------------|---------------------------------------|
/// | `update`     | fixed 60Hz steps, caught up per frame |
/// | `draw`       | once per display refresh              |
pub trait Scene {
    fn update(&mut self);
    fn draw(&self, renderer: &mut Renderer, config: &RenderConfig) -> FrameOutcome;
}

/// Builds a [`Scene`] once its assets are in, before the first frame.
#[async_trait(?Send)]
pub trait SceneLoader {
    async fn initialize(self) -> Result<Box<dyn Scene>>;
}

// length of an update step in milliseconds
const FRAME_SIZE: f64 = 1.0 / 60.0 * 1000.0;
// a backgrounded tab stops refreshing, don't replay minutes of updates
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Turns refresh timestamps into a number of fixed update steps.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_frame: f64,
    accumulated_delta: f64,
}

impl FrameClock {
    pub fn new(now: f64) -> Self {
        FrameClock {
            last_frame: now,
            accumulated_delta: 0.0,
        }
    }

    /// How many updates to run for a frame stamped `now`.
    pub fn advance(&mut self, now: f64) -> u32 {
        self.accumulated_delta += (now - self.last_frame).max(0.0);
        self.last_frame = now;

        let mut steps = 0;
        while self.accumulated_delta > FRAME_SIZE {
            self.accumulated_delta -= FRAME_SIZE;
            steps += 1;
            if steps == MAX_STEPS_PER_FRAME {
                self.accumulated_delta = 0.0;
                break;
            }
        }
        steps
    }
}

// ==================== Host ====================

type SharedLoopClosure = Rc<RefCell<Option<LoopClosure>>>;
type SharedTimerClosure = Rc<RefCell<Option<TimerClosure>>>;

/// `requestAnimationFrame` + `setTimeout` behind the scheduler's [`Host`].
/// The closures are filled in once the loop state exists and emptied on stop.
pub struct BrowserHost {
    frame_closure: SharedLoopClosure,
    timer_closure: SharedTimerClosure,
}

impl Host for BrowserHost {
    fn request_frame(&mut self) -> Result<FrameId> {
        let closure = self.frame_closure.borrow();
        browser::request_animation_frame(
            closure
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: frame callback is None"))?,
        )
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        if let Err(err) = browser::cancel_animation_frame(frame) {
            warn!("{:#}", err);
        }
    }

    fn set_timer(&mut self, delay_ms: u32) -> Result<TimerId> {
        let closure = self.timer_closure.borrow();
        browser::set_timeout(
            closure
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: resize callback is None"))?,
            delay_ms,
        )
    }

    fn clear_timer(&mut self, timer: TimerId) {
        if let Err(err) = browser::clear_timeout(timer) {
            warn!("{:#}", err);
        }
    }
}

// ==================== Game Loop ====================

/// The canvas and the layout box whose size it tracks.
pub struct SurfaceTarget {
    pub canvas: HtmlCanvasElement,
    pub container: HtmlElement,
}

impl SurfaceTarget {
    pub fn from_ids(canvas_id: &str, container_id: &str) -> Result<Self> {
        Ok(SurfaceTarget {
            canvas: browser::canvas(canvas_id)?,
            container: browser::element(container_id)?,
        })
    }

    fn measure(container: &HtmlElement) -> SurfaceSize {
        SurfaceSize::new(
            u32::try_from(container.offset_width()).unwrap_or(0),
            u32::try_from(container.offset_height()).unwrap_or(0),
        )
    }
}

struct LoopState {
    scene: Box<dyn Scene>,
    scheduler: FrameScheduler<BrowserHost>,
    renderer: Renderer,
    config: RenderConfig,
    clock: FrameClock,
}

impl LoopState {
    fn frame(&mut self, timestamp: f64) -> Result<bool> {
        let LoopState { scene, scheduler, renderer, config, clock } = self;
        scheduler.tick(|_surface| {
            for _ in 0..clock.advance(timestamp) {
                scene.update();
            }
            if let FrameOutcome::Skipped(reason) = scene.draw(renderer, config) {
                trace!("frame skipped : {:?}", reason);
            }
        })
    }

    fn apply_pending_resize(&mut self) {
        if let Some(size) = self.scheduler.on_debounce_elapsed() {
            self.renderer.resize(size);
        }
    }
}

type SharedLoop = Rc<RefCell<LoopState>>;

pub struct GameLoop;

impl GameLoop {
    /// Load a scene through `loader` and start drawing it.
    pub async fn start(
        loader: impl SceneLoader,
        target: SurfaceTarget,
        config: RenderConfig,
    ) -> Result<GameLoopHandle> {
        let scene = loader.initialize().await?;
        Self::run(scene, target, config)
    }

    /// Start drawing an already initialized scene.
    ///
    /// ```text
    /// requestAnimationFrame ──► frame closure ──► scheduler.tick ──► scene.draw
    /// ResizeObserver ─────────► resize closure ─► scheduler.notify_resize
    /// setTimeout ─────────────► timer closure ──► scheduler.on_debounce_elapsed
    ///                                              └─► canvas.width/height
    /// ```
    pub fn run(scene: Box<dyn Scene>, target: SurfaceTarget, config: RenderConfig) -> Result<GameLoopHandle> {
        let renderer = Renderer::new(target.canvas)?;
        let frame_closure: SharedLoopClosure = Rc::new(RefCell::new(None));
        let timer_closure: SharedTimerClosure = Rc::new(RefCell::new(None));
        let host = BrowserHost {
            frame_closure: Rc::clone(&frame_closure),
            timer_closure: Rc::clone(&timer_closure),
        };
        let scheduler = FrameScheduler::new(host, renderer.size(), config.resize_debounce_ms);
        let state: SharedLoop = Rc::new(RefCell::new(LoopState {
            scene,
            scheduler,
            renderer,
            config,
            clock: FrameClock::new(browser::now()?),
        }));

        let frame_state = Rc::clone(&state);
        *frame_closure.borrow_mut() = Some(browser::create_raf_closure(move |timestamp: f64| {
            if let Err(err) = frame_state.borrow_mut().frame(timestamp) {
                error!("GameLoop halted : {:#}", err);
            }
        }));

        let timer_state = Rc::clone(&state);
        *timer_closure.borrow_mut() = Some(browser::create_timer_closure(move || {
            timer_state.borrow_mut().apply_pending_resize();
        }));

        let resize_state = Rc::clone(&state);
        let container = target.container.clone();
        let on_resize = browser::create_resize_closure(move |_entries: JsValue| {
            let size = SurfaceTarget::measure(&container);
            if let Err(err) = resize_state.borrow_mut().scheduler.notify_resize(size) {
                warn!("Could not schedule resize to {:?} : {:#}", size, err);
            }
        });
        let observer = browser::observe_resize(&target.container, &on_resize)?;

        {
            let mut state = state.borrow_mut();
            state
                .scheduler
                .notify_resize(SurfaceTarget::measure(&target.container))?;
            state.scheduler.start()?;
        }

        Ok(GameLoopHandle {
            state,
            frame_closure,
            timer_closure,
            observer,
            _on_resize: on_resize,
        })
    }
}

/// Keeps a running loop alive. Call [`GameLoopHandle::stop`] once when the
/// view goes away; dropping the handle without it leaves the loop running.
pub struct GameLoopHandle {
    state: SharedLoop,
    frame_closure: SharedLoopClosure,
    timer_closure: SharedTimerClosure,
    observer: ResizeObserver,
    _on_resize: ResizeClosure,
}

impl GameLoopHandle {
    pub fn stop(self) {
        self.observer.disconnect();
        self.state.borrow_mut().scheduler.stop();
        // the closures own the loop state, releasing them breaks the Rc cycle
        self.frame_closure.borrow_mut().take();
        self.timer_closure.borrow_mut().take();
    }

    /// `false` once stopped, including when the loop halted by itself
    /// because the browser refused the next frame.
    pub fn is_running(&self) -> bool {
        self.state.borrow().scheduler.state() == SchedulerState::Running
    }
}

// ==================== Renderer ====================

pub struct Renderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = browser::context(&canvas)?;
        Ok(Renderer { canvas, context })
    }

    /// Reallocates the canvas backing store, so only call it on real changes.
    pub fn resize(&self, size: SurfaceSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
        debug!("canvas resized to {}x{}", size.width, size.height);
    }
}

impl Surface for Renderer {
    type Image = HtmlImageElement;

    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let size = self.size();
        self.context
            .clear_rect(0.0, 0.0, size.width.into(), size.height.into());
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    fn stroke_rect(&mut self, rect: &Rect, line_width: f64, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.set_line_width(line_width);
        self.context
            .stroke_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    fn draw_image(&mut self, image: &HtmlImageElement, source: &Rect, destination: &Rect) -> Result<()> {
        self.context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                source.x(),
                source.y(),
                source.width(),
                source.height(),
                destination.x(),
                destination.y(),
                destination.width(),
                destination.height(),
            )
            .map_err(|err| anyhow!("drawImage failed : {:#?}", err))
    }
}

impl ImageSource for HtmlImageElement {
    fn dimensions(&self) -> (f64, f64) {
        (self.natural_width().into(), self.natural_height().into())
    }

    fn is_ready(&self) -> bool {
        self.complete() && self.natural_width() > 0
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = Rc::clone(&success_tx);

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error loading image : {:#?}", err)));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until the image loads or errors
    success_callback.forget();
    error_callback.forget();

    // Result<Result<(), Error>, Canceled>
    rx.await
        .context("image load callback dropped")?
        .with_context(|| format!("Failed to load image from : {}", source))?;

    Ok(image)
}
