// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure                                 │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Code Directory    │          What lives there                            │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ src/              │ Project Root                                         │
// │ ├── lib.rs        │ wasm entry point                                     │
// │ ├── game.rs       │ Entity, Scene, world setup                           │
// │ ├── engine.rs     │ Clock, Renderer, GameLoop (+ assets/, input/)        │
// │ └── sprite/       │ Everything drawn off a sprite sheet                  │
// │     ├── animation │ Strip timing and frame lookup                        │
// │     ├── locomotion│ Idle/Walking/Running typestate                       │
// │     ├── player    │ Mario: key handling, strips, hitbox                  │
// │     └── props     │ Enemy, QuestionBox, Board                            │
// └───────────────────┴──────────────────────────────────────────────────────┘
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Who owns the clock                                  │
// ├────────────────┬─────────────────────────────────────────────────────────┤
// │ animation.rs   │ elapsed time per strip, advanced by draw_frame          │
// │ locomotion.rs  │ none, asks a Gait whether a cycle is done               │
// │ player.rs      │ the four strips, lent to locomotion as the Gait         │
// └────────────────┴─────────────────────────────────────────────────────────┘
pub mod animation;
pub mod locomotion;
pub mod player;
pub mod props;
