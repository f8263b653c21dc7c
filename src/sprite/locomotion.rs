//! Per-state locomotion rules for the player. As with any typestate, a
//! transition is only reachable through the methods on the state it leaves
//! from:
//! - PUBLIC  : PlayerState and PlayerContext
//! - PRIVATE : how the context gets rewritten
//!
//! None of this owns an animation. Whether a walk or run cycle has finished
//! is asked of a [`Gait`], which the player backs with its real strips.
use crate::engine::Point;

// movement is per update, not per second
const WALK_STEP: f32 = 1.0;
const RUN_STEP: f32 = 2.5;
// the extra push when a cycle finishes after the key is released
const WALK_COAST: f32 = 2.5;
const RUN_COAST: f32 = 5.0;
// completed walk cycles before breaking into a run
const STEPS_BEFORE_RUN: u8 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// The walk and run cycles, one pair per facing.
pub trait Gait {
    fn walk_done(&self, facing: Facing) -> bool;
    fn run_done(&self, facing: Facing) -> bool;
    fn restart_walk(&mut self, facing: Facing);
    fn restart_run(&mut self, facing: Facing);
}

#[derive(Debug, Copy, Clone)]
pub struct Idle;

#[derive(Debug, Copy, Clone)]
pub struct Walking;

#[derive(Debug, Copy, Clone)]
pub struct Running;

pub enum IsWalking {
    InProgress(PlayerState<Walking>),
    Promoted(PlayerState<Running>),
}

pub enum IsStopping<S> {
    Done(PlayerState<Idle>),
    InProgress(PlayerState<S>),
}

/// Which kinds of cycle [`PlayerContext::settle`] found finished.
#[derive(Debug, Default, Copy, Clone)]
struct Finished {
    walk: bool,
    run: bool,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlayerContext {
    pub position: Point,
    pub facing: Facing,
    /// walk cycles completed since the last stop or turn
    pub steps: u8,
}

#[derive(Debug, Copy, Clone)]
pub struct PlayerState<S> {
    context: PlayerContext,
    _state: S,
}

impl<S> PlayerState<S> {
    pub fn context(&self) -> &PlayerContext {
        &self.context
    }

    fn stop(self, coast: f32) -> PlayerState<Idle> {
        PlayerState {
            context: self.context.reset_steps().shift(coast),
            _state: Idle,
        }
    }
}

impl PlayerState<Idle> {
    pub fn new(position: Point) -> Self {
        PlayerState {
            context: PlayerContext {
                position,
                facing: Facing::Right,
                steps: 0,
            },
            _state: Idle,
        }
    }

    /// A non-arrow key is held. Nothing steers, but a cycle left finished in
    /// either direction still lands its last step.
    pub fn settle(self, gait: &mut impl Gait) -> Self {
        let (context, _) = self.context.settle(gait);
        PlayerState {
            context,
            _state: Idle,
        }
    }

    /// Starting off doesn't move us yet, the first step lands next update.
    pub fn walk(self, facing: Facing, gait: &mut impl Gait) -> PlayerState<Walking> {
        PlayerState {
            context: self.context.turn(facing, gait),
            _state: Walking,
        }
    }
}

impl PlayerState<Walking> {
    pub fn stride(self, facing: Facing, gait: &mut impl Gait) -> IsWalking {
        let mut context = self.context.turn(facing, gait);
        if gait.walk_done(facing) {
            gait.restart_walk(facing);
            context.steps = context.steps.saturating_add(1);
        }
        let context = context.shift(WALK_STEP);

        if context.steps > STEPS_BEFORE_RUN {
            gait.restart_run(facing);
            IsWalking::Promoted(PlayerState {
                context,
                _state: Running,
            })
        } else {
            IsWalking::InProgress(PlayerState {
                context,
                _state: Walking,
            })
        }
    }

    /// Key released: keep going until the current walk cycle is over.
    pub fn coast(self, gait: &mut impl Gait) -> IsStopping<Walking> {
        let facing = self.context.facing;
        if gait.walk_done(facing) {
            gait.restart_walk(facing);
            IsStopping::Done(self.stop(WALK_COAST))
        } else {
            IsStopping::InProgress(self)
        }
    }

    /// Any finished walk cycle ends the walk.
    pub fn settle(self, gait: &mut impl Gait) -> IsStopping<Walking> {
        let (context, finished) = self.context.settle(gait);
        if finished.walk {
            IsStopping::Done(PlayerState {
                context,
                _state: Idle,
            })
        } else {
            IsStopping::InProgress(PlayerState {
                context,
                _state: Walking,
            })
        }
    }
}

impl PlayerState<Running> {
    pub fn stride(self, facing: Facing, gait: &mut impl Gait) -> Self {
        let context = self.context.turn(facing, gait);
        if gait.run_done(facing) {
            gait.restart_run(facing);
        }
        PlayerState {
            context: context.shift(RUN_STEP),
            _state: Running,
        }
    }

    pub fn coast(self, gait: &mut impl Gait) -> IsStopping<Running> {
        let facing = self.context.facing;
        if gait.run_done(facing) {
            gait.restart_run(facing);
            IsStopping::Done(self.stop(RUN_COAST))
        } else {
            IsStopping::InProgress(self)
        }
    }

    /// Any finished run cycle ends the run.
    pub fn settle(self, gait: &mut impl Gait) -> IsStopping<Running> {
        let (context, finished) = self.context.settle(gait);
        if finished.run {
            IsStopping::Done(PlayerState {
                context,
                _state: Idle,
            })
        } else {
            IsStopping::InProgress(PlayerState {
                context,
                _state: Running,
            })
        }
    }
}

impl PlayerContext {
    /// Turning around restarts the new direction's cycles and the step count.
    fn turn(mut self, facing: Facing, gait: &mut impl Gait) -> Self {
        if self.facing != facing {
            gait.restart_walk(facing);
            gait.restart_run(facing);
            self.steps = 0;
            self.facing = facing;
        }
        self
    }

    fn shift(self, distance: f32) -> Self {
        let facing = self.facing;
        self.nudge(facing, distance)
    }

    fn nudge(mut self, toward: Facing, distance: f32) -> Self {
        self.position.x += distance * toward.sign();
        self
    }

    /// Restart every finished cycle in both directions, each one moving us a
    /// normal step the way it was played. Steps always go back to 0.
    fn settle(mut self, gait: &mut impl Gait) -> (Self, Finished) {
        let mut finished = Finished::default();
        for facing in [Facing::Right, Facing::Left] {
            if gait.walk_done(facing) {
                gait.restart_walk(facing);
                self = self.nudge(facing, WALK_STEP);
                finished.walk = true;
            }
            if gait.run_done(facing) {
                gait.restart_run(facing);
                self = self.nudge(facing, RUN_STEP);
                finished.run = true;
            }
        }
        (self.reset_steps(), finished)
    }

    fn reset_steps(mut self) -> Self {
        self.steps = 0;
        self
    }
}
