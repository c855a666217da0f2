/// clockview web - WASM front end rendering the clock with WebGL2
///
/// The page provides a `#bg` canvas and the five control inputs with their
/// `...Value` displays; `new ClockViewer()` wires them up once the DOM is ready.
use std::cell::RefCell;
use std::rc::Rc;

use clockview_core::ViewerConfig;
use wasm_bindgen::prelude::*;

pub mod app;
pub mod dom;
pub mod gl;
pub mod shaders;

use app::WebApp;
use dom::PageElements;

/// Asset location relative to the page origin
pub const DEFAULT_ASSET_URL: &str = "/resources/clock.glb";

#[wasm_bindgen]
pub struct ClockViewer {
    app: Rc<RefCell<WebApp>>,
}

#[wasm_bindgen]
impl ClockViewer {
    /// Look up the page elements and start rendering
    #[wasm_bindgen(constructor)]
    pub fn new(asset_url: Option<String>) -> Result<ClockViewer, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let elements = PageElements::lookup(&document)?;

        let config = ViewerConfig {
            asset: asset_url.unwrap_or_else(|| DEFAULT_ASSET_URL.to_string()),
            ..ViewerConfig::default()
        };

        let app = app::setup(elements, config)?;
        Ok(ClockViewer { app })
    }

    /// Whether the clock asset has arrived
    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.app.borrow().viewer.is_loaded()
    }

    /// Animation frames run so far
    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.app.borrow().viewer.frame() as f64
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("clockview web loaded");
    Ok(())
}
