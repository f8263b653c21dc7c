use crate::engine::input::Steer;
use crate::engine::{Point, Rect, Renderer, SheetImage, Size};
use crate::game::{Entity, Frame};
use crate::sprite::animation::{Animation, Strip};
use crate::sprite::locomotion::{
    Facing, Gait, Idle, IsStopping, IsWalking, PlayerContext, PlayerState, Running, Walking,
};
use std::rc::Rc;

pub const SHEET_PATH: &str = "images/smb3_mario_sheet.png";

const FRAME: Size = Size {
    width: 40.0,
    height: 40.0,
};
const SCALE: f32 = 1.5;

const WALK_LEFT: Strip = Strip {
    start: Point { x: 120.0, y: 80.0 },
    frame_size: FRAME,
    frame_duration: 0.22,
    frames: 2,
    looping: false,
    reverse: true,
};
const WALK_RIGHT: Strip = Strip {
    start: Point { x: 200.0, y: 80.0 },
    frame_size: FRAME,
    frame_duration: 0.22,
    frames: 2,
    looping: false,
    reverse: false,
};
const RUN_LEFT: Strip = Strip {
    start: Point { x: 120.0, y: 160.0 },
    frame_size: FRAME,
    frame_duration: 0.15,
    frames: 2,
    looping: false,
    reverse: true,
};
const RUN_RIGHT: Strip = Strip {
    start: Point { x: 200.0, y: 160.0 },
    frame_size: FRAME,
    frame_duration: 0.15,
    frames: 2,
    looping: false,
    reverse: false,
};

// standing still is a single crop, not a strip
const STAND_RIGHT: Point = Point { x: 200.0, y: 80.0 };
const STAND_LEFT: Point = Point { x: 160.0, y: 80.0 };

const HITBOX_OFFSET: Point = Point { x: 23.0, y: 13.0 };
const HITBOX_SIZE: Size = Size {
    width: 22.0,
    height: 25.0,
};
const HITBOX_COLOR: &str = "red";

/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State  →  Event         →  To State               │
/// ├─────────────────────────────────────────────────────────┤
/// │  Idle        →  Move          →  Walking                │
/// │  Walking     →  Move          →  Walking / Running (>5) │
/// │  Running     →  Move          →  Running                │
/// │  -------        ------                                  │
/// │  Walking     →  Release       →  Idle (cycle finished)  │
/// │  Running     →  Release       →  Idle (cycle finished)  │
/// │  -------        ------                                  │
/// │  Any         →  Other         →  Idle (cycle finished)  │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Move(Facing),
    /// no key held
    Release,
    /// a key is held, just not an arrow
    Other,
}

impl From<Steer> for Event {
    fn from(steer: Steer) -> Self {
        match steer {
            Steer::Right => Event::Move(Facing::Right),
            Steer::Left => Event::Move(Facing::Left),
            Steer::Other => Event::Other,
            Steer::Neither => Event::Release,
        }
    }
}

/// What the player is doing, without the typestate attached
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stance {
    Idle,
    Walking,
    Running,
}

#[derive(Debug, Copy, Clone)]
enum PlayerStateMachine {
    Idle(PlayerState<Idle>),
    Walking(PlayerState<Walking>),
    Running(PlayerState<Running>),
}

impl From<PlayerState<Idle>> for PlayerStateMachine {
    fn from(state: PlayerState<Idle>) -> Self {
        PlayerStateMachine::Idle(state)
    }
}

impl From<PlayerState<Walking>> for PlayerStateMachine {
    fn from(state: PlayerState<Walking>) -> Self {
        PlayerStateMachine::Walking(state)
    }
}

impl From<PlayerState<Running>> for PlayerStateMachine {
    fn from(state: PlayerState<Running>) -> Self {
        PlayerStateMachine::Running(state)
    }
}

impl From<IsWalking> for PlayerStateMachine {
    fn from(is_walking: IsWalking) -> Self {
        match is_walking {
            IsWalking::InProgress(walking_state) => walking_state.into(),
            IsWalking::Promoted(running_state) => running_state.into(),
        }
    }
}

impl<S> From<IsStopping<S>> for PlayerStateMachine
where
    PlayerState<S>: Into<PlayerStateMachine>,
{
    fn from(is_stopping: IsStopping<S>) -> Self {
        match is_stopping {
            IsStopping::Done(idle_state) => idle_state.into(),
            IsStopping::InProgress(state) => state.into(),
        }
    }
}

impl PlayerStateMachine {
    // consumes the old state so it can't be reused after the transition
    fn transition(self, event: Event, gait: &mut impl Gait) -> Self {
        use PlayerStateMachine::*;
        match (self, event) {
            (Idle(state), Event::Move(facing)) => state.walk(facing, gait).into(),
            (Walking(state), Event::Move(facing)) => state.stride(facing, gait).into(),
            (Running(state), Event::Move(facing)) => state.stride(facing, gait).into(),
            (Walking(state), Event::Release) => state.coast(gait).into(),
            (Running(state), Event::Release) => state.coast(gait).into(),
            (Idle(_), Event::Release) => self,
            (Idle(state), Event::Other) => state.settle(gait).into(),
            (Walking(state), Event::Other) => state.settle(gait).into(),
            (Running(state), Event::Other) => state.settle(gait).into(),
        }
    }

    fn context(&self) -> &PlayerContext {
        use PlayerStateMachine::*;
        match self {
            Idle(state) => state.context(),
            Walking(state) => state.context(),
            Running(state) => state.context(),
        }
    }

    fn stance(&self) -> Stance {
        match self {
            PlayerStateMachine::Idle(_) => Stance::Idle,
            PlayerStateMachine::Walking(_) => Stance::Walking,
            PlayerStateMachine::Running(_) => Stance::Running,
        }
    }
}

/// The four movement strips, all cut from the same sheet
struct Strides<I> {
    walk_left: Animation<I>,
    walk_right: Animation<I>,
    run_left: Animation<I>,
    run_right: Animation<I>,
}

impl<I: SheetImage> Strides<I> {
    fn new(sheet: &Rc<I>) -> Self {
        Strides {
            walk_left: Animation::new(sheet.clone(), WALK_LEFT),
            walk_right: Animation::new(sheet.clone(), WALK_RIGHT),
            run_left: Animation::new(sheet.clone(), RUN_LEFT),
            run_right: Animation::new(sheet.clone(), RUN_RIGHT),
        }
    }

    fn walk(&self, facing: Facing) -> &Animation<I> {
        match facing {
            Facing::Left => &self.walk_left,
            Facing::Right => &self.walk_right,
        }
    }

    fn walk_mut(&mut self, facing: Facing) -> &mut Animation<I> {
        match facing {
            Facing::Left => &mut self.walk_left,
            Facing::Right => &mut self.walk_right,
        }
    }

    fn run(&self, facing: Facing) -> &Animation<I> {
        match facing {
            Facing::Left => &self.run_left,
            Facing::Right => &self.run_right,
        }
    }

    fn run_mut(&mut self, facing: Facing) -> &mut Animation<I> {
        match facing {
            Facing::Left => &mut self.run_left,
            Facing::Right => &mut self.run_right,
        }
    }
}

impl<I: SheetImage> Gait for Strides<I> {
    fn walk_done(&self, facing: Facing) -> bool {
        self.walk(facing).is_done()
    }

    fn run_done(&self, facing: Facing) -> bool {
        self.run(facing).is_done()
    }

    fn restart_walk(&mut self, facing: Facing) {
        self.walk_mut(facing).reset();
    }

    fn restart_run(&mut self, facing: Facing) {
        self.run_mut(facing).reset();
    }
}

/// Player
/// - update() -> reads the held arrow key, drives the state machine
/// - draw()   -> hitbox, then the active strip (or the standing crop)
pub struct Player<I> {
    state: PlayerStateMachine,
    strides: Strides<I>,
    sheet: Rc<I>,
    outlines: bool,
}

impl<I: SheetImage> Player<I> {
    pub fn new(sheet: Rc<I>, position: Point) -> Self {
        Player {
            state: PlayerState::new(position).into(),
            strides: Strides::new(&sheet),
            sheet,
            outlines: true,
        }
    }

    pub fn with_outlines(mut self, outlines: bool) -> Self {
        self.outlines = outlines;
        self
    }

    pub fn handle(&mut self, event: Event) {
        self.state = self.state.transition(event, &mut self.strides);
    }

    pub fn stance(&self) -> Stance {
        self.state.stance()
    }

    pub fn facing(&self) -> Facing {
        self.state.context().facing
    }

    pub fn steps(&self) -> u8 {
        self.state.context().steps
    }

    pub fn position(&self) -> Point {
        self.state.context().position
    }

    fn stand_frame(&self) -> Rect {
        let origin = match self.facing() {
            Facing::Right => STAND_RIGHT,
            Facing::Left => STAND_LEFT,
        };
        Rect::new(origin, FRAME)
    }
}

impl<R: Renderer> Entity<R> for Player<R::Image> {
    fn update(&mut self, frame: &Frame) {
        self.handle(frame.input.steer().into());
    }

    fn draw(&mut self, renderer: &mut R, frame: &Frame) {
        let position = self.position();
        let facing = self.facing();

        if self.outlines {
            let hitbox = Rect::new(
                Point {
                    x: position.x + HITBOX_OFFSET.x,
                    y: position.y + HITBOX_OFFSET.y,
                },
                HITBOX_SIZE,
            );
            renderer.save();
            renderer.stroke_rect(&hitbox, HITBOX_COLOR);
            renderer.restore();
        }

        match self.state.stance() {
            Stance::Running => {
                self.strides
                    .run_mut(facing)
                    .draw_frame(frame.tick, renderer, position, SCALE)
            }
            Stance::Walking => {
                self.strides
                    .walk_mut(facing)
                    .draw_frame(frame.tick, renderer, position, SCALE)
            }
            Stance::Idle => {
                let destination = Rect::new(
                    position,
                    Size {
                        width: FRAME.width * SCALE,
                        height: FRAME.height * SCALE,
                    },
                );
                renderer.draw_image(&self.sheet, &self.stand_frame(), &destination);
            }
        }
    }

    fn position(&self) -> Point {
        Player::position(self)
    }
}
