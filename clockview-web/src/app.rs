//! Browser application: event wiring, animation loop and asset fetch.

use std::cell::RefCell;
use std::rc::Rc;

use clockview_core::asset::load_clock;
use clockview_core::{AssetError, ViewerConfig, ViewerState};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, Response, WheelEvent, Window};

use crate::dom::{ControlBinding, PageElements};
use crate::gl::GlRenderer;

pub struct WebApp {
    pub viewer: ViewerState,
    renderer: GlRenderer,
    canvas: HtmlCanvasElement,
    /// Last pointer position while the primary button is held
    drag: Option<(i32, i32)>,
}

impl WebApp {
    /// One animation frame
    fn frame(&mut self) {
        self.viewer.tick();
        if let Err(err) = self.renderer.render(&self.viewer) {
            log::error!("render failed: {err:?}");
        }
    }

    /// Match the canvas and camera to the window size
    fn fit_to_window(&mut self, window: &Window) {
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let ratio = window.device_pixel_ratio();

        let (pixel_width, pixel_height) = ((width * ratio) as u32, (height * ratio) as u32);
        self.canvas.set_width(pixel_width);
        self.canvas.set_height(pixel_height);
        self.renderer.resize(pixel_width, pixel_height);
        self.viewer.resize(width as u32, height as u32);
    }
}

/// Wire the viewer to the page and start the animation loop.
///
/// The returned handle shares state with the registered callbacks, which
/// stay alive for the lifetime of the page.
pub fn setup(elements: PageElements, config: ViewerConfig) -> Result<Rc<RefCell<WebApp>>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let PageElements { canvas, controls } = elements;

    let renderer = GlRenderer::new(&canvas)?;
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    let app = Rc::new(RefCell::new(WebApp {
        viewer: ViewerState::new(&config, width, height),
        renderer,
        canvas: canvas.clone(),
        drag: None,
    }));
    app.borrow_mut().fit_to_window(&window);

    for binding in controls {
        bind_control(&app, binding)?;
    }
    bind_resize(&app, &window)?;
    bind_orbit(&app, &canvas, &window)?;
    start_animation(&app)?;
    spawn_load(&app, config.asset);

    Ok(app)
}

/// The input element is the source of truth: its current value is applied
/// now and again on every change
fn bind_control(app: &Rc<RefCell<WebApp>>, binding: ControlBinding) -> Result<(), JsValue> {
    let ControlBinding {
        control,
        input,
        display,
    } = binding;

    let apply = {
        let app = app.clone();
        let input = input.clone();
        move || {
            let shown = app.borrow_mut().viewer.apply_input(control, &input.value());
            if let Ok(text) = shown {
                display.set_text_content(Some(&text));
            }
        }
    };
    apply();

    let on_input = Closure::<dyn FnMut(Event)>::new(move |_event: Event| apply());
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();
    Ok(())
}

fn bind_resize(app: &Rc<RefCell<WebApp>>, window: &Window) -> Result<(), JsValue> {
    let app = app.clone();
    let target = window.clone();
    let on_resize = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        app.borrow_mut().fit_to_window(&target);
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();
    Ok(())
}

fn bind_orbit(app: &Rc<RefCell<WebApp>>, canvas: &HtmlCanvasElement, window: &Window) -> Result<(), JsValue> {
    let on_down = {
        let app = app.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            if event.button() == 0 {
                app.borrow_mut().drag = Some((event.client_x(), event.client_y()));
            }
        })
    };
    canvas.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
    on_down.forget();

    let on_move = {
        let app = app.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let app = &mut *app.borrow_mut();
            let Some((last_x, last_y)) = app.drag else {
                return;
            };
            let (x, y) = (event.client_x(), event.client_y());
            let height = app.canvas.client_height().max(1) as u32;
            app.viewer
                .orbit
                .drag((x - last_x) as f32, (y - last_y) as f32, height);
            app.drag = Some((x, y));
        })
    };
    window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    let on_up = {
        let app = app.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            app.borrow_mut().drag = None;
        })
    };
    window.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
    on_up.forget();

    let on_wheel = {
        let app = app.clone();
        Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
            event.prevent_default();
            if event.delta_y() == 0.0 {
                return;
            }
            // Scrolling up moves closer
            let steps = -event.delta_y().signum() as f32;
            app.borrow_mut().viewer.orbit.zoom(steps);
        })
    };
    canvas.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;
    on_wheel.forget();

    Ok(())
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Run `WebApp::frame` once per display refresh
fn start_animation(app: &Rc<RefCell<WebApp>>) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();
    let app = app.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        app.borrow_mut().frame();
        if let Some(cb) = next.borrow().as_ref() {
            if let Err(err) = request_animation_frame(cb) {
                log::error!("animation loop stopped: {err:?}");
            }
        }
    }));

    // The `Ref` must drop before `callback` does
    let started = match callback.borrow().as_ref() {
        Some(cb) => request_animation_frame(cb).map(|_| ()),
        None => Ok(()),
    };
    started
}

/// Fetch and decode the asset in the background; frames keep running and
/// skip the clock until it arrives
fn spawn_load(app: &Rc<RefCell<WebApp>>, url: String) {
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        log::info!("fetching clock asset from {url}");
        let result = match fetch_bytes(&url).await {
            Ok(bytes) => load_clock(&bytes),
            Err(err) => Err(err),
        };
        app.borrow_mut().viewer.finish_load(result);
    });
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    let window = web_sys::window().ok_or_else(|| AssetError::Unavailable("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .and_then(|value| value.dyn_into::<Response>())
        .map_err(js_error)?;

    if !response.ok() {
        return Err(AssetError::Unavailable(format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn js_error(value: JsValue) -> AssetError {
    AssetError::Unavailable(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
