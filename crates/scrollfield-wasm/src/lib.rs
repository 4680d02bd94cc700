use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{Vec2, Vec3};
use log::{info, Level, LevelFilter, Log, Metadata, Record};
use scrollfield_core::{GpuInstance, Scene, SceneConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MouseEvent;

mod dom;
mod globe;

pub use globe::GlobeView;

use dom::{AnimationLoop, DomLayout, Listeners};

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route crate logging to the console. Safe to call more than once.
#[wasm_bindgen]
pub fn init_logging(verbose: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });
    }
}

fn variant_config(variant: &str) -> Result<SceneConfig, JsValue> {
    match variant {
        "pipeline" | "" => Ok(SceneConfig::default()),
        "matrix" => Ok(SceneConfig::matrix()),
        other => Err(JsValue::from_str(&format!("unknown field variant '{other}'"))),
    }
}

/// Maps normalized device coordinates to the world-space z=0 plane.
#[derive(Clone, Copy, Debug, PartialEq)]
enum ViewExtent {
    /// Perspective camera on the z axis looking at the origin.
    Camera { fov_y_deg: f32, distance: f32 },
    /// Half width and height supplied by the host.
    Fixed(Vec2),
}

impl Default for ViewExtent {
    /// The host renderer's camera: 45° vertical field of view at z=40.
    fn default() -> Self {
        ViewExtent::Camera {
            fov_y_deg: 45.0,
            distance: 40.0,
        }
    }
}

impl ViewExtent {
    /// Half the visible world width and height at z=0.
    fn half_extent(&self, aspect: f32) -> Vec2 {
        match *self {
            ViewExtent::Camera {
                fov_y_deg,
                distance,
            } => {
                let half_height = distance * (fov_y_deg.to_radians() * 0.5).tan();
                let aspect = if aspect.is_finite() && aspect > 0.0 {
                    aspect
                } else {
                    1.0
                };
                Vec2::new(half_height * aspect, half_height)
            }
            ViewExtent::Fixed(half) => half,
        }
    }

    fn unproject(&self, ndc: Vec2, aspect: f32, offset_x: f32) -> Vec3 {
        let half = self.half_extent(aspect);
        Vec3::new(ndc.x * half.x - offset_x, ndc.y * half.y, 0.0)
    }
}

fn viewport_aspect() -> f32 {
    dom::window().map_or(1.0, |window| {
        let (width, height) = dom::viewport_size(&window);
        if height > 0.0 {
            width / height
        } else {
            1.0
        }
    })
}

/// Scroll-driven particle background bound to the page.
#[wasm_bindgen]
pub struct ScrollField {
    scene: Rc<RefCell<Scene>>,
    view: Rc<Cell<ViewExtent>>,
    listeners: Listeners,
    animation: AnimationLoop,
}

#[wasm_bindgen]
impl ScrollField {
    /// `variant` is `"pipeline"` or `"matrix"`. A zero `particle_count`
    /// keeps the variant's default.
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str, particle_count: usize) -> Result<ScrollField, JsValue> {
        let mut config = variant_config(variant)?;
        if particle_count > 0 {
            config.field.particle_count = particle_count;
        }
        let scene = Scene::create(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        info!(
            "ScrollField created: {} particles ({})",
            scene.field().particle_count(),
            variant
        );

        Ok(ScrollField {
            scene: Rc::new(RefCell::new(scene)),
            view: Rc::new(Cell::new(ViewExtent::default())),
            listeners: Listeners::default(),
            animation: AnimationLoop::default(),
        })
    }

    /// Attach scroll, resize and pointer listeners and start the frame loop.
    #[wasm_bindgen]
    pub fn start(&mut self) -> Result<(), JsValue> {
        let window = dom::window()?;
        self.listeners.remove_all();
        self.refresh()?;

        {
            let scene = Rc::clone(&self.scene);
            let win = window.clone();
            self.listeners.listen(&window, "scroll", move |_| {
                let scroll_y = dom::scroll_y(&win);
                let mut scene = scene.borrow_mut();
                match DomLayout::capture(&win) {
                    Ok(layout) => scene.on_scroll_with(scroll_y, &layout),
                    Err(_) => scene.on_scroll(scroll_y),
                }
            })?;
        }
        // Fonts and images shift anchors after the first measurement.
        for event in ["resize", "load"] {
            let scene = Rc::clone(&self.scene);
            let win = window.clone();
            self.listeners.listen(&window, event, move |_| {
                if let Ok(layout) = DomLayout::capture(&win) {
                    let mut scene = scene.borrow_mut();
                    scene.refresh(&layout);
                    scene.on_scroll(dom::scroll_y(&win));
                }
            })?;
        }
        {
            let scene = Rc::clone(&self.scene);
            let view = Rc::clone(&self.view);
            let win = window.clone();
            self.listeners.listen(&window, "mousemove", move |event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (width, height) = dom::viewport_size(&win);
                if width <= 0.0 || height <= 0.0 {
                    return;
                }
                let ndc = Vec2::new(
                    mouse.client_x() as f32 / width * 2.0 - 1.0,
                    -(mouse.client_y() as f32 / height) * 2.0 + 1.0,
                );
                let mut scene = scene.borrow_mut();
                let world = view
                    .get()
                    .unproject(ndc, width / height, scene.group_offset_x());
                scene.pointer_move(world);
            })?;
        }
        if let Some(document) = window.document() {
            let scene = Rc::clone(&self.scene);
            self.listeners.listen(&document, "mouseleave", move |_| {
                scene.borrow_mut().pointer_leave();
            })?;
        }
        {
            let scene = Rc::clone(&self.scene);
            self.listeners.listen(&window, "click", move |_| {
                scene.borrow_mut().click();
            })?;
        }

        let scene = Rc::clone(&self.scene);
        self.animation.start(move |now| {
            let mut scene = scene.borrow_mut();
            if scene.tracker().deferred_count() > 0 {
                if let Ok(layout) = DomLayout::capture(&window) {
                    scene.retry_deferred(&layout);
                }
            }
            scene.frame(now).is_some()
        })
    }

    /// Re-measure anchors, e.g. after fonts or images change the layout.
    #[wasm_bindgen]
    pub fn refresh(&mut self) -> Result<(), JsValue> {
        let window = dom::window()?;
        let layout = DomLayout::capture(&window)?;
        let mut scene = self.scene.borrow_mut();
        scene.refresh(&layout);
        scene.on_scroll(dom::scroll_y(&window));
        Ok(())
    }

    /// Feed a scroll offset directly, for hosts with their own scroller.
    #[wasm_bindgen]
    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scene.borrow_mut().on_scroll(scroll_y);
    }

    /// Visible world extent at z=0, overriding the camera-derived one.
    #[wasm_bindgen]
    pub fn set_view_extent(&mut self, half_width: f32, half_height: f32) {
        if half_width > 0.0 && half_height > 0.0 && half_width.is_finite() && half_height.is_finite() {
            self.view
                .set(ViewExtent::Fixed(Vec2::new(half_width, half_height)));
        }
    }

    /// Derive the pointer extent from a perspective camera on the z axis.
    /// The width follows the viewport aspect ratio.
    #[wasm_bindgen]
    pub fn set_camera(&mut self, fov_y_deg: f32, distance: f32) {
        if fov_y_deg > 0.0 && fov_y_deg < 180.0 && distance > 0.0 && distance.is_finite() {
            self.view.set(ViewExtent::Camera {
                fov_y_deg,
                distance,
            });
        }
    }

    /// Pointer in normalized device coordinates.
    #[wasm_bindgen]
    pub fn set_pointer(&mut self, ndc_x: f32, ndc_y: f32) {
        let mut scene = self.scene.borrow_mut();
        let world = self.view.get().unproject(
            Vec2::new(ndc_x, ndc_y),
            viewport_aspect(),
            scene.group_offset_x(),
        );
        scene.pointer_move(world);
    }

    #[wasm_bindgen]
    pub fn pointer_leave(&mut self) {
        self.scene.borrow_mut().pointer_leave();
    }

    #[wasm_bindgen]
    pub fn click(&mut self) {
        self.scene.borrow_mut().click();
    }

    #[wasm_bindgen]
    pub fn set_interaction(&mut self, enabled: bool) {
        self.scene.borrow_mut().set_interaction_enabled(enabled);
    }

    /// Run one frame manually. Returns false once destroyed.
    #[wasm_bindgen]
    pub fn frame(&mut self, now_ms: f64) -> bool {
        self.scene.borrow_mut().frame(now_ms).is_some()
    }

    #[wasm_bindgen]
    pub fn group_offset_x(&self) -> f32 {
        self.scene.borrow().group_offset_x()
    }

    #[wasm_bindgen]
    pub fn displayed_phase(&self) -> f32 {
        self.scene.borrow().field().interpolator().displayed_phase()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.scene.borrow().field().particle_count()
    }

    #[wasm_bindgen]
    pub fn get_instance_buffer_ptr(&self) -> *const f32 {
        self.scene.borrow().field().instances().as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_instance_buffer_byte_length(&self) -> usize {
        self.scene.borrow().field().instances().len() * std::mem::size_of::<GpuInstance>()
    }

    #[wasm_bindgen]
    pub fn is_destroyed(&self) -> bool {
        self.scene.borrow().is_destroyed()
    }

    /// Stop the loop, detach listeners and release scroll bindings.
    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        self.animation.stop();
        self.listeners.remove_all();
        self.scene.borrow_mut().destroy();
    }
}

impl Drop for ScrollField {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extent_matches_camera() {
        let half = ViewExtent::default().half_extent(16.0 / 9.0);
        assert!((half.y - 16.568).abs() < 0.01, "half height {}", half.y);
        assert!((half.x - half.y * 16.0 / 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_unproject_corners_and_offset() {
        let view = ViewExtent::default();
        let top_right = view.unproject(Vec2::ONE, 2.0, 0.0);
        assert!((top_right.y - 16.568).abs() < 0.01);
        assert!((top_right.x - 2.0 * top_right.y).abs() < 1e-3);

        let center = view.unproject(Vec2::ZERO, 2.0, 14.0);
        assert_eq!(center, Vec3::new(-14.0, 0.0, 0.0));
    }

    #[test]
    fn test_fixed_extent_ignores_aspect() {
        let view = ViewExtent::Fixed(Vec2::new(30.0, 10.0));
        assert_eq!(view.half_extent(0.5), Vec2::new(30.0, 10.0));
        assert_eq!(view.unproject(Vec2::new(-1.0, 1.0), 3.0, 0.0), Vec3::new(-30.0, 10.0, 0.0));
    }

    #[test]
    fn test_bad_aspect_falls_back_to_square() {
        let half = ViewExtent::default().half_extent(f32::NAN);
        assert_eq!(half.x, half.y);
    }
}
