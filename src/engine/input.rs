//! Keyboard and pointer input.
//!
//! DOM listeners never touch game state directly. They push [`InputEvent`]s
//! down a channel, and the game loop drains that channel into an
//! [`InputState`] once at the top of every frame. Entities only ever see the
//! resulting `&InputState`.
use crate::browser;
use crate::engine::Point;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

/// Pointer positions left of this many pixels are reported in grid cells.
const GRID_LIMIT: f32 = 1024.0;
const CELL_SIZE: f32 = 32.0;

pub const ARROW_RIGHT: &str = "ArrowRight";
pub const ARROW_LEFT: &str = "ArrowLeft";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    Click(Point),
    PointerMove(Point),
    Wheel(f64),
}

/// Which way the held key is pushing the player
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Steer {
    Right,
    Left,
    /// some non-arrow key is held
    Other,
    /// nothing is held
    Neither,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    key: Option<String>,
    click: Option<Point>,
    pointer: Option<Point>,
    wheel: Option<f64>,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.key = Some(code),
            // any key-up releases, matching a single "current key" slot
            InputEvent::KeyUp(_) => self.key = None,
            InputEvent::Click(point) => self.click = Some(point),
            InputEvent::PointerMove(point) => self.pointer = Some(point),
            InputEvent::Wheel(delta_y) => self.wheel = Some(delta_y),
        }
    }

    /// Forget the one-shot signals. The held key and pointer persist.
    pub fn end_frame(&mut self) {
        self.click = None;
        self.wheel = None;
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.key() == Some(code)
    }

    pub fn click(&self) -> Option<Point> {
        self.click
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn wheel(&self) -> Option<f64> {
        self.wheel
    }

    pub fn steer(&self) -> Steer {
        match self.key() {
            Some(ARROW_RIGHT) => Steer::Right,
            Some(ARROW_LEFT) => Steer::Left,
            Some(_) => Steer::Other,
            None => Steer::Neither,
        }
    }
}

/// Drain everything the listeners queued since the last frame.
pub fn process_input(state: &mut InputState, receiver: &mut UnboundedReceiver<InputEvent>) {
    // Err means empty, or every sender is gone
    while let Ok(event) = receiver.try_recv() {
        state.apply(event);
    }
}

/// Canvas-relative pixels to 32px grid cells, left of the 1024px mark.
pub fn to_cell(x: f32, y: f32) -> Point {
    if x < GRID_LIMIT {
        Point {
            x: (x / CELL_SIZE).floor(),
            y: (y / CELL_SIZE).floor(),
        }
    } else {
        Point { x, y }
    }
}

fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Point {
    let bounds = canvas.get_bounding_client_rect();
    to_cell(
        (event.client_x() as f64 - bounds.left()) as f32,
        (event.client_y() as f64 - bounds.top()) as f32,
    )
}

fn send(sender: &UnboundedSender<InputEvent>, event: InputEvent) {
    if let Err(err) = sender.unbounded_send(event) {
        log::warn!("input event dropped : {}", err);
    }
}

fn listen<T>(canvas: &HtmlCanvasElement, kind: &str, closure: Closure<T>) -> Result<()>
where
    T: ?Sized + WasmClosure,
{
    canvas
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for '{}' : {:#?}", kind, err))?;
    // listeners live as long as the page
    closure.forget();
    Ok(())
}

/// Wire the canvas listeners and hand back the receiving end.
pub fn prepare_input(canvas: &HtmlCanvasElement) -> Result<UnboundedReceiver<InputEvent>> {
    log::info!("Starting input");
    let (sender, receiver) = unbounded();

    // keyboard events only reach a canvas that can take focus
    canvas
        .set_attribute("tabindex", "0")
        .map_err(|err| anyhow!("Could not make canvas focusable : {:#?}", err))?;

    let tx = sender.clone();
    let on_key_down = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        event.prevent_default();
        send(&tx, InputEvent::KeyDown(event.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);
    listen(canvas, "keydown", on_key_down)?;

    let tx = sender.clone();
    let on_key_up = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        event.prevent_default();
        send(&tx, InputEvent::KeyUp(event.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);
    listen(canvas, "keyup", on_key_up)?;

    let tx = sender.clone();
    let target = canvas.clone();
    let on_click = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        send(&tx, InputEvent::Click(canvas_point(&target, &event)));
    }) as Box<dyn FnMut(MouseEvent)>);
    listen(canvas, "click", on_click)?;

    let tx = sender.clone();
    let target = canvas.clone();
    let on_move = browser::closure_wrap(Box::new(move |event: MouseEvent| {
        send(&tx, InputEvent::PointerMove(canvas_point(&target, &event)));
    }) as Box<dyn FnMut(MouseEvent)>);
    listen(canvas, "mousemove", on_move)?;

    let on_wheel = browser::closure_wrap(Box::new(move |event: WheelEvent| {
        send(&sender, InputEvent::Wheel(event.delta_y()));
    }) as Box<dyn FnMut(WheelEvent)>);
    listen(canvas, "wheel", on_wheel)?;

    log::info!("Input started");
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_after(events: Vec<InputEvent>) -> InputState {
        let mut state = InputState::default();
        for event in events {
            state.apply(event);
        }
        state
    }

    #[test]
    fn default_state_has_no_signals() {
        let state = InputState::default();
        assert_eq!(state.key(), None);
        assert_eq!(state.click(), None);
        assert_eq!(state.pointer(), None);
        assert_eq!(state.wheel(), None);
        assert_eq!(state.steer(), Steer::Neither);
    }

    #[test]
    fn arrows_steer() {
        let right = state_after(vec![InputEvent::KeyDown(ARROW_RIGHT.to_string())]);
        assert_eq!(right.steer(), Steer::Right);
        let left = state_after(vec![InputEvent::KeyDown(ARROW_LEFT.to_string())]);
        assert_eq!(left.steer(), Steer::Left);
        let other = state_after(vec![InputEvent::KeyDown("Space".to_string())]);
        assert_eq!(other.steer(), Steer::Other);
    }

    #[test]
    fn latest_key_down_wins_and_any_key_up_releases() {
        let state = state_after(vec![
            InputEvent::KeyDown(ARROW_RIGHT.to_string()),
            InputEvent::KeyDown(ARROW_LEFT.to_string()),
        ]);
        assert!(state.is_pressed(ARROW_LEFT));
        assert!(!state.is_pressed(ARROW_RIGHT));

        let released = state_after(vec![
            InputEvent::KeyDown(ARROW_LEFT.to_string()),
            InputEvent::KeyUp("Space".to_string()),
        ]);
        assert_eq!(released.key(), None);
    }

    #[test]
    fn end_frame_clears_only_one_shots() {
        let mut state = state_after(vec![
            InputEvent::KeyDown(ARROW_RIGHT.to_string()),
            InputEvent::Click(Point { x: 1.0, y: 2.0 }),
            InputEvent::PointerMove(Point { x: 3.0, y: 4.0 }),
            InputEvent::Wheel(53.0),
        ]);
        assert_eq!(state.click(), Some(Point { x: 1.0, y: 2.0 }));
        assert_eq!(state.wheel(), Some(53.0));

        state.end_frame();
        assert_eq!(state.click(), None);
        assert_eq!(state.wheel(), None);
        assert_eq!(state.pointer(), Some(Point { x: 3.0, y: 4.0 }));
        assert!(state.is_pressed(ARROW_RIGHT));
    }

    #[test]
    fn process_input_drains_queued_events() {
        let (tx, mut rx) = unbounded();
        tx.unbounded_send(InputEvent::KeyDown(ARROW_LEFT.to_string()))
            .unwrap();
        tx.unbounded_send(InputEvent::PointerMove(Point { x: 9.0, y: 9.0 }))
            .unwrap();

        let mut state = InputState::default();
        process_input(&mut state, &mut rx);
        assert_eq!(state.steer(), Steer::Left);
        assert_eq!(state.pointer(), Some(Point { x: 9.0, y: 9.0 }));

        // nothing new queued, nothing changes
        process_input(&mut state, &mut rx);
        assert_eq!(state.steer(), Steer::Left);
    }

    #[test]
    fn pointer_snaps_to_cells_left_of_the_limit() {
        assert_eq!(to_cell(65.0, 31.9), Point { x: 2.0, y: 0.0 });
        assert_eq!(to_cell(1023.0, 64.0), Point { x: 31.0, y: 2.0 });
        assert_eq!(to_cell(1030.0, 64.0), Point { x: 1030.0, y: 64.0 });
    }
}
