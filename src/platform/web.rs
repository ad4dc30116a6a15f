//! Browser bindings: 2D canvas surface and DOM media elements

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, HtmlVideoElement, ImageData};

use super::{AssetManifest, MediaKind, backing_size};
use crate::Viewport;
use crate::error::RenderError;
use crate::renderer::{AssetCatalog, Layer, MediaSource, PlaybackResult, Quad, Rgba, Surface};
use crate::scenery::Raster;

/// Uploaded rasters kept before the upload cache is flushed
const MAX_UPLOADS: usize = 16;

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
const HAVE_CURRENT_DATA: u16 = 2;

fn js_err(context: &str, err: JsValue) -> RenderError {
    RenderError::Backend(format!("{}: {:?}", context, err))
}

enum Element {
    Image(HtmlImageElement),
    Video(HtmlVideoElement),
}

/// Image or video element behind an asset key
pub struct WebMedia {
    key: String,
    element: Element,
    /// Set when a play() promise was rejected; reported by the next request
    rejection: Rc<RefCell<Option<PlaybackResult>>>,
}

impl WebMedia {
    pub fn image(key: &str, element: HtmlImageElement) -> Self {
        Self {
            key: key.to_string(),
            element: Element::Image(element),
            rejection: Rc::new(RefCell::new(None)),
        }
    }

    pub fn video(key: &str, element: HtmlVideoElement) -> Self {
        Self {
            key: key.to_string(),
            element: Element::Video(element),
            rejection: Rc::new(RefCell::new(None)),
        }
    }

    fn watch_play(&self, promise: js_sys::Promise) {
        let rejection = Rc::clone(&self.rejection);
        let key = self.key.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                let name = js_sys::Reflect::get(&err, &JsValue::from_str("name"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default();
                let result = if name == "NotAllowedError" {
                    PlaybackResult::DeferredPendingGesture
                } else {
                    PlaybackResult::Failed(name)
                };
                log::debug!("play() for '{}' rejected: {:?}", key, result);
                *rejection.borrow_mut() = Some(result);
            }
        });
    }
}

impl MediaSource for WebMedia {
    fn key(&self) -> &str {
        &self.key
    }

    fn natural_size(&self) -> Option<Vec2> {
        let (w, h) = match &self.element {
            Element::Image(img) => (img.natural_width(), img.natural_height()),
            Element::Video(video) => (video.video_width(), video.video_height()),
        };
        (w > 0 && h > 0).then(|| Vec2::new(w as f32, h as f32))
    }

    fn is_decoded(&self) -> bool {
        match &self.element {
            Element::Image(img) => img.complete(),
            Element::Video(video) => video.ready_state() >= HAVE_CURRENT_DATA,
        }
    }

    fn is_video(&self) -> bool {
        matches!(self.element, Element::Video(_))
    }

    fn is_playing(&self) -> bool {
        match &self.element {
            Element::Image(_) => false,
            Element::Video(video) => !video.paused() && !video.ended(),
        }
    }

    /// The outcome of play() is only known asynchronously, so a rejection
    /// from the previous attempt is what this call reports.
    fn request_play(&self) -> PlaybackResult {
        let Element::Video(video) = &self.element else {
            return PlaybackResult::Played;
        };
        let previous = self.rejection.borrow_mut().take();
        match video.play() {
            Ok(promise) => {
                self.watch_play(promise);
                previous.unwrap_or(PlaybackResult::Played)
            }
            Err(err) => PlaybackResult::Failed(format!("{:?}", err)),
        }
    }
}

fn create_video(document: &Document, url: &str) -> Result<HtmlVideoElement, JsValue> {
    let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
    video.set_muted(true);
    video.set_loop(true);
    video.set_preload("auto");
    video.set_attribute("playsinline", "")?;
    video.set_src(url);
    Ok(video)
}

/// Load every manifest entry into a catalog
///
/// Image decode failures are logged and the handle kept; the readiness gate
/// turns it into a placeholder. Returns `None` when `cancelled` was set while
/// loading, so a torn-down page never commits results.
pub async fn preload(manifest: &AssetManifest, cancelled: Rc<Cell<bool>>) -> Option<AssetCatalog<WebMedia>> {
    let document = web_sys::window()?.document()?;
    let mut catalog = AssetCatalog::new();

    for (key, url, kind) in manifest.iter() {
        match kind {
            MediaKind::Image => {
                let Ok(img) = HtmlImageElement::new() else {
                    log::warn!("Could not create image element for '{}'", key);
                    continue;
                };
                img.set_src(url);
                if let Err(err) = JsFuture::from(img.decode()).await {
                    log::warn!("Image '{}' failed to decode: {:?}", key, err);
                }
                catalog.insert(WebMedia::image(key, img));
            }
            MediaKind::Video => match create_video(&document, url) {
                Ok(video) => catalog.insert(WebMedia::video(key, video)),
                Err(err) => log::warn!("Video '{}' could not be created: {:?}", key, err),
            },
        }
        if cancelled.get() {
            break;
        }
    }

    if cancelled.get() {
        log::info!("Preload cancelled; discarding {} assets", catalog.len());
        return None;
    }
    log::info!("Preloaded {} of {} assets", catalog.len(), manifest.len());
    Some(catalog)
}

/// [`Surface`] over a `CanvasRenderingContext2d`
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    document: Document,
    /// Raster id to uploaded offscreen canvas
    uploads: HashMap<u64, HtmlCanvasElement>,
    layer: Option<Layer>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::Backend("no document".into()))?;
        let ctx = context_2d(&canvas)?;
        Ok(Self {
            canvas,
            ctx,
            document,
            uploads: HashMap::new(),
            layer: None,
        })
    }

    /// Current layer, for diagnostics
    pub fn layer(&self) -> Option<Layer> {
        self.layer
    }

    /// Match the backing store to the viewport and clear it
    pub fn begin_frame(&mut self, view: &Viewport) -> Result<(), RenderError> {
        let (w, h) = backing_size(view);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            log::debug!("Canvas backing store resized to {}x{}", w, h);
        }
        let ratio = w as f64 / view.width.max(1.0) as f64;
        self.ctx
            .set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
            .map_err(|e| js_err("set_transform", e))?;
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(0.0, 0.0, view.width as f64, view.height as f64);
        self.layer = None;
        Ok(())
    }

    fn upload(&mut self, raster: &Raster) -> Result<HtmlCanvasElement, RenderError> {
        if let Some(canvas) = self.uploads.get(&raster.id()) {
            return Ok(canvas.clone());
        }
        if self.uploads.len() >= MAX_UPLOADS {
            self.uploads.clear();
        }
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .and_then(|el| el.dyn_into().map_err(JsValue::from))
            .map_err(|e| js_err("create canvas", e))?;
        canvas.set_width(raster.width());
        canvas.set_height(raster.height());
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(raster.as_bytes()), raster.width(), raster.height())
            .map_err(|e| js_err("ImageData", e))?;
        context_2d(&canvas)?
            .put_image_data(&data, 0.0, 0.0)
            .map_err(|e| js_err("put_image_data", e))?;
        self.uploads.insert(raster.id(), canvas.clone());
        Ok(canvas)
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
    canvas
        .get_context("2d")
        .map_err(|e| js_err("get_context", e))?
        .ok_or(RenderError::ContextLost)?
        .dyn_into()
        .map_err(|_| RenderError::Backend("2d context has unexpected type".into()))
}

impl Surface for CanvasSurface {
    type Media = WebMedia;

    fn begin_layer(&mut self, layer: Layer) {
        self.layer = Some(layer);
    }

    fn fill_quad(&mut self, quad: &Quad, color: Rgba) -> Result<(), RenderError> {
        self.ctx.set_fill_style_str(&color.to_css());
        if quad.rotation == 0.0 {
            let tl = quad.top_left();
            self.ctx.fill_rect(tl.x as f64, tl.y as f64, quad.size.x as f64, quad.size.y as f64);
            return Ok(());
        }
        self.ctx.save();
        let result = self
            .ctx
            .translate(quad.center.x as f64, quad.center.y as f64)
            .and_then(|_| self.ctx.rotate(quad.rotation as f64));
        if result.is_ok() {
            let (w, h) = (quad.size.x as f64, quad.size.y as f64);
            self.ctx.fill_rect(-w / 2.0, -h / 2.0, w, h);
        }
        self.ctx.restore();
        result.map_err(|e| js_err("fill_quad", e))
    }

    fn fill_vertical_gradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        top: Rgba,
        bottom: Rgba,
    ) -> Result<(), RenderError> {
        let gradient = self
            .ctx
            .create_linear_gradient(0.0, y as f64, 0.0, (y + h) as f64);
        gradient
            .add_color_stop(0.0, &top.to_css())
            .and_then(|_| gradient.add_color_stop(1.0, &bottom.to_css()))
            .map_err(|e| js_err("gradient", e))?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
        Ok(())
    }

    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba) -> Result<(), RenderError> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx
            .ellipse(center.x as f64, center.y as f64, rx.max(0.0) as f64, ry.max(0.0) as f64, 0.0, 0.0, TAU)
            .map_err(|e| js_err("ellipse", e))?;
        self.ctx.fill();
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) -> Result<(), RenderError> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.stroke();
        Ok(())
    }

    fn draw_raster(&mut self, raster: &Raster, x: f32, y: f32) -> Result<(), RenderError> {
        let canvas = self.upload(raster)?;
        self.ctx
            .draw_image_with_html_canvas_element(&canvas, x as f64, y as f64)
            .map_err(|e| js_err("draw raster", e))
    }

    fn draw_media(&mut self, media: &WebMedia, quad: &Quad, alpha: f32) -> Result<(), RenderError> {
        let tl = quad.top_left();
        let (x, y, w, h) = (tl.x as f64, tl.y as f64, quad.size.x as f64, quad.size.y as f64);
        self.ctx.save();
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
        let result = match &media.element {
            Element::Image(img) => self.ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h),
            Element::Video(video) => self.ctx.draw_image_with_html_video_element_and_dw_and_dh(video, x, y, w, h),
        };
        self.ctx.restore();
        result.map_err(|_| RenderError::UnsupportedMedia { key: media.key.clone() })
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) -> Result<(), RenderError> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{}px sans-serif", size.round()));
        self.ctx
            .fill_text(text, x as f64, y as f64)
            .map_err(|e| js_err("fill_text", e))
    }
}
