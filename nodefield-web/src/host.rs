//! Browser host
//!
//! Window listeners feed the engine's event inbox, `requestAnimationFrame`
//! drives the frame loop and the canvas is sized to the window viewport.

use nodefield::{EventKind, EventSender, FieldEvent, Host, HostError, Pointer, SurfaceSize};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas2d::WebCanvas;

/// An attached window listener
pub struct WebListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Host backed by the page window and one canvas element
pub struct WebHost {
    window: Option<Window>,
    canvas: Option<HtmlCanvasElement>,
    /// Invoked by `requestAnimationFrame`; installed after the engine exists
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
}

impl WebHost {
    pub fn new(canvas: Option<HtmlCanvasElement>) -> Self {
        Self {
            window: web_sys::window(),
            canvas,
            frame_callback: None,
        }
    }

    pub fn set_frame_callback(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.frame_callback = Some(callback);
    }

    fn window(&self) -> Result<&Window, HostError> {
        self.window.as_ref().ok_or_else(|| HostError::new("no window"))
    }
}

/// DOM event name for an engine event kind
pub(crate) fn event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Resize => "resize",
        EventKind::PointerMove => "mousemove",
    }
}

fn viewport(window: &Window) -> SurfaceSize {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    SurfaceSize::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

fn resize_canvas(canvas: &HtmlCanvasElement, size: SurfaceSize) {
    canvas.set_width(size.width as u32);
    canvas.set_height(size.height as u32);
}

fn js_error(context: &str, err: JsValue) -> HostError {
    HostError::new(format!("{context}: {err:?}"))
}

impl Host for WebHost {
    type Context = WebCanvas;
    type FrameHandle = i32;
    type Listener = WebListener;

    fn acquire_context(&mut self) -> Option<WebCanvas> {
        let ctx = self
            .canvas
            .as_ref()?
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(WebCanvas::new(ctx))
    }

    fn fit_surface(&mut self) -> SurfaceSize {
        let size = self.window.as_ref().map(viewport).unwrap_or_default();
        if let Some(canvas) = &self.canvas {
            resize_canvas(canvas, size);
        }
        size
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn subscribe(&mut self, kind: EventKind, sender: EventSender) -> Result<WebListener, HostError> {
        let window = self.window()?.clone();

        let callback = match kind {
            EventKind::Resize => {
                let window = window.clone();
                let canvas = self.canvas.clone();
                Closure::wrap(Box::new(move |_event: Event| {
                    let size = viewport(&window);
                    if let Some(canvas) = &canvas {
                        resize_canvas(canvas, size);
                    }
                    sender.send(FieldEvent::Resize(size));
                }) as Box<dyn FnMut(Event)>)
            }
            EventKind::PointerMove => Closure::wrap(Box::new(move |event: Event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let pointer = Pointer::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                    sender.send(FieldEvent::PointerMove(pointer));
                }
            }) as Box<dyn FnMut(Event)>),
        };

        let event = event_name(kind);
        let target: EventTarget = window.into();
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener failed", e))?;
        tracing::debug!(event, "listener attached");

        Ok(WebListener {
            target,
            event,
            callback,
        })
    }

    fn unsubscribe(&mut self, listener: WebListener) {
        if let Err(e) = listener
            .target
            .remove_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref())
        {
            tracing::warn!(event = listener.event, error = ?e, "removeEventListener failed");
        }
    }

    fn request_frame(&mut self) -> Result<i32, HostError> {
        let window = self.window()?;
        let callback = self
            .frame_callback
            .as_ref()
            .ok_or_else(|| HostError::new("no frame callback installed"))?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| js_error("requestAnimationFrame failed", e))
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Some(window) = &self.window {
            if let Err(e) = window.cancel_animation_frame(handle) {
                tracing::warn!(handle, error = ?e, "cancelAnimationFrame failed");
            }
        }
    }
}
