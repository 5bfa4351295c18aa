use anyhow::{anyhow, Result};
use wasm_bindgen::closure::{Closure, WasmClosureFnOnce};
use wasm_bindgen::{JsCast, JsValue};

#[rustfmt::skip]
use web_sys::{
    CanvasRenderingContext2d,
    Document,
    HtmlCanvasElement,
    HtmlElement,
    HtmlImageElement,
    ResizeObserver,
    Window,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CONTEXT_2D: &str = "2d";
}

// ==================== Closure types ====================
// requestAnimationFrame hands the callback a DOMHighResTimeStamp
pub type LoopClosure = Closure<dyn FnMut(f64)>;
pub type TimerClosure = Closure<dyn FnMut()>;
// ResizeObserver passes (entries, observer), we only need the notification
pub type ResizeClosure = Closure<dyn FnMut(JsValue)>;

// ==================== DOM lookups ====================
pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn element(id: &str) -> Result<HtmlElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))?
        .dyn_into::<HtmlElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlElement", element))
}

pub fn canvas(id: &str) -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{}'", id))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error -> anyhow
        // - None -> anyhow
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn create_html_image_element() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

// ==================== Callbacks ====================
pub fn closure_once<F, A, R>(f: F) -> Closure<F::FnMut>
where
    F: 'static + WasmClosureFnOnce<A, R>,
{
    Closure::once(f)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    Closure::wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

pub fn create_timer_closure(f: impl FnMut() + 'static) -> TimerClosure {
    Closure::wrap(Box::new(f) as Box<dyn FnMut()>)
}

pub fn create_resize_closure(f: impl FnMut(JsValue) + 'static) -> ResizeClosure {
    Closure::wrap(Box::new(f) as Box<dyn FnMut(JsValue)>)
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

pub fn cancel_animation_frame(handle: i32) -> Result<()> {
    window()?
        .cancel_animation_frame(handle)
        .map_err(|err| anyhow!("Cannot cancel animation frame {} : {:#?}", handle, err))
}

pub fn set_timeout(callback: &TimerClosure, delay_ms: u32) -> Result<i32> {
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            i32::try_from(delay_ms).unwrap_or(i32::MAX),
        )
        .map_err(|err| anyhow!("Cannot set timeout : {:#?}", err))
}

pub fn clear_timeout(handle: i32) -> Result<()> {
    window()?.clear_timeout_with_handle(handle);
    Ok(())
}

/// Start observing `target`; the observer lives as long as the returned value
/// and must be `disconnect()`ed on teardown.
pub fn observe_resize(target: &HtmlElement, callback: &ResizeClosure) -> Result<ResizeObserver> {
    let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot create ResizeObserver : {:#?}", err))?;
    observer.observe(target);
    Ok(observer)
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}
