//! Browser plumbing: layout queries, event listeners and the
//! requestAnimationFrame loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use scrollfield_core::scroll::{AnchorRect, LayoutSource};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

pub fn viewport_size(window: &Window) -> (f32, f32) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width as f32, height as f32)
}

pub fn scroll_y(window: &Window) -> f32 {
    window.scroll_y().unwrap_or(0.0) as f32
}

/// Layout snapshot of the live document.
///
/// Anchor tops are converted from viewport to document coordinates using
/// the scroll offset at the time of the snapshot.
pub struct DomLayout {
    document: Document,
    scroll_y: f32,
    viewport_height: f32,
}

impl DomLayout {
    pub fn capture(window: &Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        Ok(Self {
            document,
            scroll_y: scroll_y(window),
            viewport_height: viewport_size(window).1,
        })
    }
}

impl LayoutSource for DomLayout {
    fn anchor_rect(&self, anchor: &str) -> Option<AnchorRect> {
        let element = self.document.get_element_by_id(anchor)?;
        let rect = element.get_bounding_client_rect();
        Some(AnchorRect {
            top: rect.top() as f32 + self.scroll_y,
            height: rect.height() as f32,
        })
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Event listeners that are removed together.
#[derive(Default)]
pub struct Listeners {
    attached: Vec<Listener>,
}

impl Listeners {
    pub fn listen<F>(&mut self, target: &EventTarget, event: &'static str, handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.attached.push(Listener {
            target: target.clone(),
            event,
            closure,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn remove_all(&mut self) {
        for listener in self.attached.drain(..) {
            if let Err(err) = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref())
            {
                warn!("failed to remove '{}' listener: {:?}", listener.event, err);
            }
        }
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        self.remove_all();
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Self-rescheduling requestAnimationFrame loop.
///
/// The callback returns `false` to stop. The closure keeps a handle to its
/// own slot so it can reschedule itself; `stop` breaks that cycle.
#[derive(Default)]
pub struct AnimationLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start<F>(&mut self, mut step: F) -> Result<(), JsValue>
    where
        F: FnMut(f64) -> bool + 'static,
    {
        self.stop();

        let slot = Rc::clone(&self.callback);
        let handle = Rc::clone(&self.handle);
        *self.callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            handle.set(None);
            if !step(now) {
                return;
            }
            let Ok(window) = window() else {
                return;
            };
            if let Some(callback) = slot.borrow().as_ref() {
                match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(id) => handle.set(Some(id)),
                    Err(err) => warn!("requestAnimationFrame failed: {:?}", err),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let id = match self.callback.borrow().as_ref() {
            Some(callback) => window()?.request_animation_frame(callback.as_ref().unchecked_ref())?,
            None => return Ok(()),
        };
        self.handle.set(Some(id));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.get().is_some()
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Ok(window) = window() {
                if let Err(err) = window.cancel_animation_frame(id) {
                    warn!("cancelAnimationFrame failed: {:?}", err);
                }
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
