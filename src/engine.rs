use crate::browser;
use anyhow::{anyhow, Error, Result};
// wasm is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use futures::future::join_all;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we control the closure creation and specify the expected type
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

// ==================== Game trait ====================
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `clock_tick` : seconds since the previous tick
    fn update(&mut self, clock_tick: f32);
    fn draw(&mut self, renderer: &Renderer, clock_tick: f32);
}

/// Largest tick handed to the game, in seconds
/// - a backgrounded tab can report seconds between frames, which would
///   tunnel everything through the floor
pub const DEFAULT_MAX_STEP: f32 = 0.05;

pub struct GameLoop {
    last_frame: f64,
    max_step: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static, max_step: f32) -> Result<()> {
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            max_step,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            let clock_tick = game_loop.tick(perf);
            game.update(clock_tick);
            game.draw(&renderer, clock_tick);
            if let Some(callback) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(callback) {
                    log::error!("GameLoop stopped : {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    /// Seconds since the last frame, capped at `max_step`
    /// - a negative or NaN cap stops time instead of panicking
    fn tick(&mut self, perf: f64) -> f32 {
        let wall_delta = ((perf - self.last_frame) / 1000.0) as f32;
        self.last_frame = perf;
        wall_delta.max(0.0).min(self.max_step.max(0.0))
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Axis aligned box, origin top left, y grows downward
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Point, size: Size) -> Self {
        Rect::new(position.x, position.y, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// AABB overlap, touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

// ==================== Images ====================
/// Cheap, cloneable reference to a preloaded image
/// - `path` is the cache key used by the renderer to find the pixels
/// - width/height are the natural size of the whole image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    path: Rc<str>,
    pub width: f32,
    pub height: f32,
}

impl ImageHandle {
    pub fn new(path: &str, width: f32, height: f32) -> Self {
        ImageHandle {
            path: Rc::from(path),
            width,
            height,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Lookup of preloaded images by path
pub trait AssetSource {
    fn get_asset(&self, path: &str) -> Result<ImageHandle>;
}

/// Blit primitive : copy `frame` out of `image` into `destination`
pub trait Blit {
    fn draw_image(&self, image: &ImageHandle, frame: &Rect, destination: &Rect);
}

/// Image cache filled before any entity is built
#[derive(Default)]
pub struct AssetManager {
    queue: Vec<String>,
    cache: HashMap<String, HtmlImageElement>,
    error_count: usize,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_download(&mut self, path: &str) {
        self.queue.push(path.to_string());
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Loads every queued image concurrently
    /// - failed loads are logged and counted, lookups of them fail later
    pub async fn download_all(&mut self) {
        let queue = std::mem::take(&mut self.queue);
        let results = join_all(queue.iter().map(|path| load_image(path))).await;
        for (path, result) in queue.into_iter().zip(results) {
            match result {
                Ok(image) => {
                    self.cache.insert(path, image);
                }
                Err(err) => {
                    log::error!("Failed to load image {} : {:#}", path, err);
                    self.error_count += 1;
                }
            }
        }
        log::info!(
            "Assets loaded : {} ok, {} failed",
            self.success_count(),
            self.error_count
        );
    }

    pub fn success_count(&self) -> usize {
        self.cache.len()
    }

    #[cfg(test)]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn image(&self, path: &str) -> Option<&HtmlImageElement> {
        self.cache.get(path)
    }
}

impl AssetSource for AssetManager {
    fn get_asset(&self, path: &str) -> Result<ImageHandle> {
        self.cache
            .get(path)
            .map(|image| {
                ImageHandle::new(
                    path,
                    image.natural_width() as f32,
                    image.natural_height() as f32,
                )
            })
            .ok_or_else(|| anyhow!("Asset not loaded : {}", path))
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
    }

    pub fn draw_image(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x.into(),
                frame.y.into(),
                frame.width.into(),
                frame.height.into(),
                destination.x.into(),
                destination.y.into(),
                destination.width.into(),
                destination.height.into(),
            )
        {
            log::error!("drawImage failed : {:#?}", err);
        }
    }
}

/// Renderer bound to an asset cache, so entities can blit by handle
pub struct Canvas<'a> {
    renderer: &'a Renderer,
    assets: &'a AssetManager,
}

impl<'a> Canvas<'a> {
    pub fn new(renderer: &'a Renderer, assets: &'a AssetManager) -> Self {
        Canvas { renderer, assets }
    }

    pub fn clear(&self, rect: &Rect) {
        self.renderer.clear(rect);
    }
}

impl Blit for Canvas<'_> {
    fn draw_image(&self, image: &ImageHandle, frame: &Rect, destination: &Rect) {
        match self.assets.image(image.path()) {
            Some(element) => self.renderer.draw_image(element, frame, destination),
            None => log::warn!("Skipping draw of unknown image {}", image.path()),
        }
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::create_html_image_element()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields channel result : Result<(), Error>
    // - second ? yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod web_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn missing_image_is_counted_not_cached() {
        let mut assets = AssetManager::new();
        assets.queue_download("img/does-not-exist.png");
        assert_eq!(assets.queued(), 1);

        assets.download_all().await;

        assert_eq!(assets.queued(), 0);
        assert_eq!(assets.error_count(), 1);
        assert_eq!(assets.success_count(), 0);
        assert!(assets.get_asset("img/does-not-exist.png").is_err());
    }

    #[wasm_bindgen_test]
    fn console_logger_installs_once() {
        let _ = console_log::init_with_level(log::Level::Debug);
        assert!(console_log::init_with_level(log::Level::Debug).is_err());
        log::info!("console logger ready");
    }

    #[wasm_bindgen_test]
    fn performance_clock_moves_forward() {
        let first = browser::now().expect("now");
        let second = browser::now().expect("now");
        assert!(second >= first);
    }
}
