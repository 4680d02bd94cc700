use glam::{Vec2, Vec3};
use log::{info, warn};
use scrollfield_core::frame::FrameClock;
use scrollfield_core::globe::{parse_land_points, BlockTransform, Globe};
use scrollfield_core::transient::{ResourceId, ResourceSink, TransientResource};
use scrollfield_core::TransientConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Forwards transient resources to JS callbacks.
///
/// `create(id, kind, data)` receives `"line"` with flattened points followed
/// by `[r, g, b, opacity]`, or `"packet"` with `[radius, r, g, b]`.
/// `move(id, x, y, z)` and `release(id)` follow.
struct JsSink {
    create: js_sys::Function,
    moved: js_sys::Function,
    release: js_sys::Function,
}

impl JsSink {
    fn report(result: Result<JsValue, JsValue>, what: &str) {
        if let Err(err) = result {
            warn!("globe {what} callback threw: {:?}", err);
        }
    }
}

impl ResourceSink for JsSink {
    fn create(&mut self, id: ResourceId, resource: &TransientResource) {
        let (kind, data) = match resource {
            TransientResource::Line {
                points,
                color,
                opacity,
            } => {
                let mut data: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
                data.extend_from_slice(&[color.x, color.y, color.z, *opacity]);
                ("line", data)
            }
            TransientResource::Packet { radius, color } => {
                ("packet", vec![*radius, color.x, color.y, color.z])
            }
        };
        let data = js_sys::Float32Array::from(data.as_slice());
        Self::report(
            self.create.call3(
                &JsValue::NULL,
                &JsValue::from_f64(id.0 as f64),
                &JsValue::from_str(kind),
                &data,
            ),
            "create",
        );
    }

    fn move_packet(&mut self, id: ResourceId, position: Vec3) {
        let args = js_sys::Array::of4(
            &JsValue::from_f64(id.0 as f64),
            &JsValue::from_f64(position.x as f64),
            &JsValue::from_f64(position.y as f64),
            &JsValue::from_f64(position.z as f64),
        );
        Self::report(self.moved.apply(&JsValue::NULL, &args), "move");
    }

    fn release(&mut self, id: ResourceId) {
        Self::report(
            self.release.call1(&JsValue::NULL, &JsValue::from_f64(id.0 as f64)),
            "release",
        );
    }
}

/// Read an image's pixels through an offscreen 2D canvas.
fn read_pixels(image: &HtmlImageElement) -> Result<(Vec<u8>, usize, usize), JsValue> {
    let width = image.natural_width();
    let height = image.natural_height();
    let document = crate::dom::window()?
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;
    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
    let pixels = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
    Ok((pixels.data().0, width as usize, height as usize))
}

type LoadCallback = Closure<dyn FnMut()>;

/// Landmass globe with flow arcs, driven by the host's frame loop.
#[wasm_bindgen]
pub struct GlobeView {
    globe: Globe,
    sink: JsSink,
    clock: FrameClock,
    mouse: Vec2,
    image: Option<HtmlImageElement>,
    loaders: Vec<LoadCallback>,
    torn_down: bool,
}

#[wasm_bindgen]
impl GlobeView {
    /// `max_flows` caps concurrent arcs; zero keeps the default of 15.
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_create: js_sys::Function,
        on_move: js_sys::Function,
        on_release: js_sys::Function,
        seed: u32,
        max_flows: usize,
    ) -> Result<GlobeView, JsValue> {
        let mut config = TransientConfig::default();
        if max_flows > 0 {
            config.max_active = max_flows;
        }
        let globe =
            Globe::new(config, seed as u64).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(GlobeView {
            globe,
            sink: JsSink {
                create: on_create,
                moved: on_move,
                release: on_release,
            },
            clock: FrameClock::default(),
            mouse: Vec2::ZERO,
            image: None,
            loaders: Vec::new(),
            torn_down: false,
        })
    }

    /// Start loading the land mask. Dark pixels are land.
    #[wasm_bindgen]
    pub fn load_land_texture(&mut self, url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        image.set_cross_origin(Some("anonymous"));
        let slot = self.globe.land_slot();

        let onload = {
            let slot = slot.clone();
            let image = image.clone();
            Closure::wrap(Box::new(move || match read_pixels(&image) {
                Ok((rgba, width, height)) => {
                    let points = parse_land_points(&rgba, width, height);
                    info!("land mask {}x{}: {} points", width, height, points.len());
                    slot.publish(points);
                }
                Err(err) => slot.fail(&format!("{:?}", err)),
            }) as Box<dyn FnMut()>)
        };
        let onerror = {
            let url = url.to_string();
            Closure::wrap(Box::new(move || slot.fail(&url)) as Box<dyn FnMut()>)
        };

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(url);

        self.loaders = vec![onload, onerror];
        self.image = Some(image);
        Ok(())
    }

    /// Publish land points computed elsewhere, skipping the texture.
    #[wasm_bindgen]
    pub fn set_land_pixels(&mut self, rgba: &[u8], width: usize, height: usize) {
        self.globe
            .land_slot()
            .publish(parse_land_points(rgba, width, height));
    }

    /// Pointer in normalized device coordinates.
    #[wasm_bindgen]
    pub fn set_mouse(&mut self, ndc_x: f32, ndc_y: f32) {
        self.mouse = Vec2::new(ndc_x, ndc_y);
    }

    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) {
        if self.torn_down {
            return;
        }
        let time = self.clock.advance(now_ms);
        self.globe
            .tick(time.elapsed, time.delta, self.mouse, &mut self.sink);
    }

    #[wasm_bindgen]
    pub fn is_land_ready(&self) -> bool {
        self.globe.blocks().is_some()
    }

    #[wasm_bindgen]
    pub fn block_count(&self) -> usize {
        self.globe.blocks().map_or(0, |b| b.len())
    }

    #[wasm_bindgen]
    pub fn get_block_buffer_ptr(&self) -> *const f32 {
        self.globe
            .blocks()
            .map_or(std::ptr::null(), |b| b.transforms().as_ptr() as *const f32)
    }

    #[wasm_bindgen]
    pub fn get_block_buffer_byte_length(&self) -> usize {
        self.block_count() * std::mem::size_of::<BlockTransform>()
    }

    #[wasm_bindgen]
    pub fn max_flows(&self) -> usize {
        self.globe.flows().config().max_active
    }

    #[wasm_bindgen]
    pub fn active_flows(&self) -> usize {
        self.globe.flows().active_count()
    }

    #[wasm_bindgen]
    pub fn rotation_x(&self) -> f32 {
        self.globe.rig().rotation.x
    }

    #[wasm_bindgen]
    pub fn rotation_y(&self) -> f32 {
        self.globe.rig().rotation.y
    }

    /// Release every live arc and stop reacting to the image loader.
    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(image) = self.image.take() {
            image.set_onload(None);
            image.set_onerror(None);
        }
        self.loaders.clear();
        self.globe.teardown(&mut self.sink);
        self.torn_down = true;
    }
}

impl Drop for GlobeView {
    fn drop(&mut self) {
        self.destroy();
    }
}
