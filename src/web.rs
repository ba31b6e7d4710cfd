//! Browser host
//!
//! Wires a `DropEngine` to a `<canvas>`: sizes it from its parent element,
//! drives it from `requestAnimationFrame`, forwards pointer hover, and reports
//! every landing to a JS callback as `(bucketIndex, offsetX)`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent};

use crate::config::EngineConfig;
use crate::engine::{DropEngine, dispatch_landings};
use crate::error::EngineError;
use crate::renderer::{Canvas, GpuCanvas, GpuPresenter, WebCanvas};
use crate::sim::Landing;

fn js_error(e: EngineError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // Already initialised when a second board is created
    let _ = console_log::init_with_level(log::Level::Info);
}

fn parse_config(config_json: Option<String>) -> Result<EngineConfig, JsValue> {
    match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(js_error),
        None => Ok(EngineConfig::default()),
    }
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(canvas_id))
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| {
            js_error(EngineError::MissingSurface(format!(
                "no canvas with id '{canvas_id}'"
            )))
        })
}

/// Container size: the parent element's client box, else the canvas itself
fn container_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    match canvas.parent_element() {
        Some(parent) => (
            parent.client_width().max(0) as u32,
            parent.client_height().max(0) as u32,
        ),
        None => (canvas.width(), canvas.height()),
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct Host {
    engine: RefCell<DropEngine<Box<dyn Canvas>>>,
    element: HtmlCanvasElement,
    on_land: js_sys::Function,
    last_time: Cell<Option<f64>>,
    frame_id: Cell<Option<i32>>,
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<Listener>>,
}

impl Host {
    fn new(
        element: HtmlCanvasElement,
        canvas: Box<dyn Canvas>,
        config: EngineConfig,
        on_land: js_sys::Function,
    ) -> Result<Rc<Self>, JsValue> {
        let engine = DropEngine::new(canvas, config).map_err(js_error)?;
        let host = Rc::new(Self {
            engine: RefCell::new(engine),
            element,
            on_land,
            last_time: Cell::new(None),
            frame_id: Cell::new(None),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        host.sync_element_size();
        host.install_listeners()?;
        host.install_frame_loop();
        host.request_frame();
        Ok(host)
    }

    /// Keep the element's backing size in step with the engine's canvas
    fn sync_element_size(&self) {
        let (w, h) = self.engine.borrow().canvas().size();
        if self.element.width() != w {
            self.element.set_width(w);
        }
        if self.element.height() != h {
            self.element.set_height(h);
        }
    }

    fn listen(
        &self,
        target: EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener {
            target,
            kind,
            closure,
        });
        Ok(())
    }

    fn install_listeners(self: &Rc<Self>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let weak = Rc::downgrade(self);
        self.listen(window.into(), "resize", move |_event| {
            if let Some(host) = weak.upgrade() {
                let (w, h) = container_size(&host.element);
                host.engine.borrow_mut().resize(w, h);
            }
        })?;

        let weak = Rc::downgrade(self);
        self.listen(self.element.clone().into(), "mousemove", move |event| {
            let (Some(host), Some(mouse)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>())
            else {
                return;
            };
            let rect = host.element.get_bounding_client_rect();
            let x = mouse.client_x() as f64 - rect.left();
            let y = mouse.client_y() as f64 - rect.top();
            host.engine.borrow_mut().pointer_move(x, y);
        })?;

        let weak = Rc::downgrade(self);
        self.listen(self.element.clone().into(), "mouseleave", move |_event| {
            if let Some(host) = weak.upgrade() {
                host.engine.borrow_mut().pointer_leave();
            }
        })?;

        Ok(())
    }

    fn install_frame_loop(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if let Some(host) = weak.upgrade() {
                host.on_frame(time);
            }
        });
        *self.frame.borrow_mut() = Some(closure);
    }

    fn request_frame(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(closure) = self.frame.borrow().as_ref() {
            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(id) => self.frame_id.set(Some(id)),
                Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
            }
        }
    }

    fn on_frame(&self, time: f64) {
        self.frame_id.set(None);

        // Calculate delta time (milliseconds to seconds)
        let dt = match self.last_time.replace(Some(time)) {
            Some(last) => ((time - last) / 1000.0).min(0.25),
            None => 0.0,
        };

        // Release the engine before calling out, so callbacks may start or stop drops
        let result = self.engine.borrow_mut().tick(dt);
        match result {
            Ok(landings) => {
                self.sync_element_size();
                dispatch_landings(
                    landings,
                    || self.engine.borrow().is_running(),
                    |landing| self.notify(landing),
                );
            }
            Err(e) => log::error!("Frame failed: {}", e),
        }

        if self.engine.borrow().is_running() {
            self.request_frame();
        }
    }

    fn notify(&self, landing: Landing) {
        let bucket = JsValue::from(landing.bucket as u32);
        let offset = JsValue::from_f64(landing.offset);
        if let Err(e) = self.on_land.call2(&JsValue::NULL, &bucket, &offset) {
            log::warn!("Landing callback threw: {:?}", e);
        }
    }

    fn stop(&self) {
        self.engine.borrow_mut().stop();

        if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
            if let Err(e) = window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }

        for listener in self.listeners.borrow_mut().drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.kind,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("Could not remove '{}' listener: {:?}", listener.kind, e);
            }
        }
    }
}

/// A plinko board bound to a page canvas
#[wasm_bindgen]
pub struct PlinkoBoard {
    host: Rc<Host>,
}

#[wasm_bindgen]
impl PlinkoBoard {
    /// Attach to `<canvas id=canvas_id>` using its 2D context
    ///
    /// `config_json` is an optional partial `EngineConfig`; `on_land` is called
    /// as `on_land(bucketIndex, offsetX)` for every completed drop.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        config_json: Option<String>,
        on_land: js_sys::Function,
    ) -> Result<PlinkoBoard, JsValue> {
        init_logging();
        let config = parse_config(config_json)?;
        let element = find_canvas(canvas_id)?;

        let (w, h) = container_size(&element);
        element.set_width(w);
        element.set_height(h);

        let canvas = WebCanvas::new(element.clone()).map_err(js_error)?;
        let host = Host::new(element, Box::new(canvas), config, on_land)?;
        log::info!("Plinko board attached to '{}' (2d)", canvas_id);
        Ok(PlinkoBoard { host })
    }

    /// Attach to `<canvas id=canvas_id>` rendering through WebGPU
    ///
    /// Text (multiplier labels, tooltips) is not drawn by this backend.
    pub async fn webgpu(
        canvas_id: String,
        config_json: Option<String>,
        on_land: js_sys::Function,
    ) -> Result<PlinkoBoard, JsValue> {
        init_logging();
        let config = parse_config(config_json)?;
        let element = find_canvas(&canvas_id)?;

        let (w, h) = container_size(&element);
        element.set_width(w);
        element.set_height(h);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(element.clone()))
            .map_err(|e| js_error(EngineError::MissingSurface(e.to_string())))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_error(EngineError::MissingSurface(e.to_string())))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let presenter = GpuPresenter::new(surface, &adapter, w, h)
            .await
            .map_err(js_error)?;
        let host = Host::new(element, Box::new(GpuCanvas::new(presenter)), config, on_land)?;
        log::info!("Plinko board attached to '{}' (webgpu)", canvas_id);
        Ok(PlinkoBoard { host })
    }

    /// Drop a token; `offset` is the fixed-point start x (board centre if omitted)
    pub fn start(&self, offset: Option<f64>) -> Result<u32, JsValue> {
        self.host.engine.borrow_mut().start(offset).map_err(js_error)
    }

    /// Stop the animation loop and detach every listener
    pub fn stop(&self) {
        self.host.stop();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.host.engine.borrow().is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.host.engine.borrow().scale()
    }

    #[wasm_bindgen(getter, js_name = hoveredBucket)]
    pub fn hovered_bucket(&self) -> Option<u32> {
        self.host.engine.borrow().hovered().map(|i| i as u32)
    }

    #[wasm_bindgen(getter, js_name = liveTokens)]
    pub fn live_tokens(&self) -> u32 {
        self.host.engine.borrow().tokens().len() as u32
    }
}

impl Drop for PlinkoBoard {
    fn drop(&mut self) {
        self.host.stop();
    }
}
