//! Browser bindings for the nodefield particle animation
//!
//! ```js
//! import init, { NodeField } from "./nodefield_web.js";
//! await init();
//! const field = NodeField.mount(document.getElementById("bg"), null);
//! // ...
//! field.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use nodefield::{Engine, FieldConfig, Host};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub mod canvas2d;
pub mod host;

use host::WebHost;

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Map a `Math.random()` sample in `[0, 1)` onto a 53-bit seed
pub(crate) fn seed_from_unit(sample: f64) -> u64 {
    (sample.clamp(0.0, 1.0) * (1u64 << 53) as f64) as u64
}

/// Stop the engine unless it is mid-frame; reports whether it stopped
pub(crate) fn stop_field<H: Host>(engine: &RefCell<Engine<H>>) -> bool {
    match engine.try_borrow_mut() {
        Ok(mut engine) => {
            engine.stop();
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "unmount skipped, engine busy");
            false
        }
    }
}

/// A particle field mounted on a canvas
///
/// Dropping the handle (`free()` from JavaScript) stops the field.
#[wasm_bindgen]
pub struct NodeField {
    engine: Rc<RefCell<Engine<WebHost>>>,
}

#[wasm_bindgen]
impl NodeField {
    /// Start the field on `canvas`
    ///
    /// `config_json` overrides the default look and must be valid. A
    /// missing canvas or 2d context is not an error: the returned handle
    /// simply never draws.
    pub fn mount(
        canvas: Option<HtmlCanvasElement>,
        config_json: Option<String>,
    ) -> Result<NodeField, JsValue> {
        let config = match config_json {
            Some(json) => {
                FieldConfig::from_json_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => FieldConfig::default(),
        };

        let seed = seed_from_unit(js_sys::Math::random());
        let engine = Rc::new(RefCell::new(Engine::new(WebHost::new(canvas), config, seed)));

        let weak = Rc::downgrade(&engine);
        let on_frame = Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Some(engine) = weak.upgrade() {
                if let Ok(mut engine) = engine.try_borrow_mut() {
                    engine.frame();
                }
            }
        }) as Box<dyn FnMut(f64)>);

        {
            let mut engine = engine.borrow_mut();
            engine.host_mut().set_frame_callback(on_frame);
            engine.mount();
        }

        Ok(NodeField { engine })
    }

    /// Stop drawing and detach from the window; safe to call repeatedly
    pub fn unmount(&self) {
        stop_field(&self.engine);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine
            .try_borrow()
            .map(|engine| engine.is_running())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nodefield::{EventKind, EventSender, HostError, Phase, RecordingCanvas, SurfaceSize};

    /// Host that always has a canvas and never fails
    struct StubHost;

    impl Host for StubHost {
        type Context = RecordingCanvas;
        type FrameHandle = u32;
        type Listener = EventKind;

        fn acquire_context(&mut self) -> Option<RecordingCanvas> {
            Some(RecordingCanvas::new())
        }

        fn fit_surface(&mut self) -> SurfaceSize {
            SurfaceSize::new(100.0, 100.0)
        }

        fn now_ms(&self) -> f64 {
            0.0
        }

        fn subscribe(&mut self, kind: EventKind, _sender: EventSender) -> Result<EventKind, HostError> {
            Ok(kind)
        }

        fn unsubscribe(&mut self, _listener: EventKind) {}

        fn request_frame(&mut self) -> Result<u32, HostError> {
            Ok(1)
        }

        fn cancel_frame(&mut self, _handle: u32) {}
    }

    #[test]
    fn stop_waits_for_a_busy_engine() {
        let engine = RefCell::new(Engine::new(StubHost, FieldConfig::default(), 3));
        engine.borrow_mut().mount();

        {
            let _busy = engine.borrow();
            assert!(!stop_field(&engine));
        }
        assert_eq!(engine.borrow().phase(), Phase::Running);

        assert!(stop_field(&engine));
        assert_eq!(engine.borrow().phase(), Phase::Stopped);
        assert!(stop_field(&engine));
    }

    #[test]
    fn seed_covers_unit_range() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert_eq!(seed_from_unit(0.5), 1u64 << 52);
        assert!(seed_from_unit(0.999_999) < 1u64 << 53);
    }
}
