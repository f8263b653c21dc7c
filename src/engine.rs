use crate::browser;
use crate::config::GameConfig;
use crate::game::{Frame, Scene};
use anyhow::{anyhow, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use futures::channel::mpsc::UnboundedReceiver;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - because we control the closure creation and specify the expected type,
    // in principle this should be generally safe (unsafe) code
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

pub mod assets;
pub mod input;

use self::input::{InputEvent, InputState};

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

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            position: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }
}

// ==================== Drawing surface ====================
/// Anything we can slice frames out of. Only the pixel extent matters to the
/// animation math, the pixels themselves stay with the renderer.
pub trait SheetImage {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
}

impl SheetImage for HtmlImageElement {
    fn width(&self) -> f32 {
        HtmlImageElement::width(self) as f32
    }

    fn height(&self) -> f32 {
        HtmlImageElement::height(self) as f32
    }
}

/// The 2D drawing surface entities paint onto
/// - `Image` is whatever handle the surface can blit from
/// - save()/restore() bracket transform + style state
pub trait Renderer {
    type Image: SheetImage + 'static;

    fn clear(&mut self, rect: &Rect);
    fn draw_image(&mut self, image: &Self::Image, frame: &Rect, destination: &Rect);
    fn stroke_rect(&mut self, rect: &Rect, color: &str);
    fn save(&mut self);
    fn restore(&mut self);
}

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        CanvasRenderer { context }
    }
}

impl Renderer for CanvasRenderer {
    type Image = HtmlImageElement;

    fn clear(&mut self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    fn draw_image(&mut self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        // a broken image should cost us one sprite, not the whole frame loop
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x().into(),
                frame.y().into(),
                frame.width().into(),
                frame.height().into(),
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            )
        {
            log::error!("Could not draw {} : {:#?}", image.src(), err);
        }
    }

    fn stroke_rect(&mut self, rect: &Rect, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.stroke_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }
}

// ==================== Timing ====================
/// Turns wall-clock timestamps (milliseconds) into simulation deltas
/// (seconds), capped at `max_step` so a backgrounded tab doesn't make the
/// world jump when it wakes up.
#[derive(Debug, Clone)]
pub struct Clock {
    sim_time: f64,
    max_step: f64,
    last_wall: f64,
}

impl Clock {
    pub const MAX_STEP: f64 = 0.1;

    /// The baseline is the construction time, so the first tick measures
    /// from here rather than from epoch zero.
    pub fn new(now: f64) -> Self {
        Clock {
            sim_time: 0.0,
            max_step: Self::MAX_STEP,
            last_wall: now,
        }
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step.max(0.0);
        self
    }

    pub fn tick(&mut self, now: f64) -> f64 {
        let wall_delta = (now - self.last_wall) / 1000.0;
        self.last_wall = now;

        // max() before min() so NaN and clock rewinds collapse to 0
        let delta = wall_delta.max(0.0).min(self.max_step);
        self.sim_time += delta;
        delta
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }
}

// ==================== Game loop ====================
pub struct GameLoop<R: Renderer> {
    clock: Clock,
    scene: Scene<R>,
    surface: Size,
    input: InputState,
    events: UnboundedReceiver<InputEvent>,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl<R: Renderer> GameLoop<R> {
    pub fn new(
        scene: Scene<R>,
        surface: Size,
        events: UnboundedReceiver<InputEvent>,
        clock: Clock,
    ) -> Self {
        GameLoop {
            clock,
            scene,
            surface,
            input: InputState::default(),
            events,
        }
    }

    /// One full frame: tick, update, sweep, draw, then forget one-shot input.
    pub fn frame(&mut self, now: f64, renderer: &mut R) {
        input::process_input(&mut self.input, &mut self.events);

        let frame = Frame {
            tick: self.clock.tick(now),
            input: &self.input,
            surface: self.surface,
        };
        self.scene.update(&frame);
        self.scene.sweep();
        self.scene.draw(renderer, &frame);

        self.input.end_frame();
    }

    pub fn scene(&self) -> &Scene<R> {
        &self.scene
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl GameLoop<CanvasRenderer> {
    /// Binds to the canvas: records its pixel size, wires the DOM input
    /// listeners and starts the clock.
    pub fn initialize(
        canvas: &HtmlCanvasElement,
        scene: Scene<CanvasRenderer>,
        config: &GameConfig,
    ) -> Result<(Self, CanvasRenderer)> {
        let renderer = CanvasRenderer::new(browser::context(canvas)?);
        let surface = Size {
            width: canvas.width() as f32,
            height: canvas.height() as f32,
        };
        let events = input::prepare_input(canvas)?;
        let clock = Clock::new(browser::now()?).with_max_step(config.max_step);
        log::info!("game initialized ({}x{})", surface.width, surface.height);

        Ok((GameLoop::new(scene, surface, events, clock), renderer))
    }

    /// Runs forever on requestAnimationFrame, or on a `fallback_fps` timer
    /// when the browser won't give us one.
    pub fn start(mut self, mut renderer: CanvasRenderer, fallback_fps: u32) -> Result<()> {
        let fallback_ms = (1000 / fallback_fps.max(1)) as i32;
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |_perf: f64| {
            // the timer fallback calls us without a timestamp, so always ask
            match browser::now() {
                Ok(now) => self.frame(now, &mut renderer),
                Err(err) => log::error!("GameLoop: no timestamp this frame : {:#}", err),
            }
            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::schedule_frame(next, fallback_ms) {
                    log::error!("GameLoop: could not schedule next frame : {:#}", err);
                }
            }
        }));

        log::info!("starting game");
        browser::schedule_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
            fallback_ms,
        )?;

        Ok(())
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let path = source.to_string();
    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!("Error loading image {} : {:#?}", path, err)));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - double unwrap because Result<Result<(), Error>, oneshot::Canceled>
    // - first unwrap yields channel result : Result<(), Error>
    // - second unwrap yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}

#[cfg(test)]
pub mod testing {
    use super::{Rect, Renderer, SheetImage};

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FakeSheet {
        pub width: f32,
        pub height: f32,
    }

    impl SheetImage for FakeSheet {
        fn width(&self) -> f32 {
            self.width
        }

        fn height(&self) -> f32 {
            self.height
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Clear(Rect),
        DrawImage { frame: Rect, destination: Rect },
        StrokeRect(Rect, String),
        Save,
        Restore,
    }

    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub calls: Vec<Call>,
    }

    impl RecordingRenderer {
        pub fn draws(&self) -> Vec<(Rect, Rect)> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::DrawImage { frame, destination } => Some((*frame, *destination)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Renderer for RecordingRenderer {
        type Image = FakeSheet;

        fn clear(&mut self, rect: &Rect) {
            self.calls.push(Call::Clear(*rect));
        }

        fn draw_image(&mut self, _image: &FakeSheet, frame: &Rect, destination: &Rect) {
            self.calls.push(Call::DrawImage {
                frame: *frame,
                destination: *destination,
            });
        }

        fn stroke_rect(&mut self, rect: &Rect, color: &str) {
            self.calls.push(Call::StrokeRect(*rect, color.to_string()));
        }

        fn save(&mut self) {
            self.calls.push(Call::Save);
        }

        fn restore(&mut self) {
            self.calls.push(Call::Restore);
        }
    }
}
