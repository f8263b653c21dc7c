use crate::browser;
use crate::config::GameConfig;
use crate::engine::assets::{AssetStore, HtmlImageLoader};
use crate::engine::input::InputState;
use crate::engine::{GameLoop, Point, Rect, Renderer, Size};
use crate::sprite::player::{self, Player};
use crate::sprite::props::{self, Board, Enemy, QuestionBox};
use anyhow::{Context, Result};

/// TABLE
/// ┌───────────────────────── Frame Overview ────────────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │  update  │  sprite/*   │    │
/// │    │  GameLoop   ├─────────►│    Scene    ├─────────►│  Entity     │    │
/// │    │  frame()    │          │             │   draw   │  impls      │    │
/// │    └──────┬──────┘          └─────────────┘          └─────────────┘    │
/// │           │                                                             │
/// │     ┌─────┴──────┐                                                      │
/// │     │ InputState │  drained from the DOM listeners at frame start,      │
/// │     │ Clock      │  one-shots cleared at frame end                      │
/// │     └────────────┘                                                      │
/// │                                                                         │
/// ├──────────────────────── Call Sequence ──────────────────────────────────┤
/// │  1. Clock.tick()        -> clamped delta                                │
/// │  2. Scene::update()     -> every entity not marked for removal          │
/// │  3. Scene::sweep()      -> drop everything marked for removal           │
/// │  4. Scene::draw()       -> clear, then each entity in save/restore      │
/// │  5. InputState          -> forget click + wheel                         │
/// └─────────────────────────────────────────────────────────────────────────┘
pub struct Frame<'a> {
    /// clamped simulation seconds since the last frame
    pub tick: f64,
    pub input: &'a InputState,
    pub surface: Size,
}

/// Anything the scene updates and draws once per frame. Both steps default
/// to doing nothing.
pub trait Entity<R: Renderer> {
    fn update(&mut self, _frame: &Frame) {}

    fn draw(&mut self, _renderer: &mut R, _frame: &Frame) {}

    fn position(&self) -> Point;

    /// Set to have the scene drop this entity at the end of the update pass.
    fn removed(&self) -> bool {
        false
    }
}

pub struct Scene<R: Renderer> {
    entities: Vec<Box<dyn Entity<R>>>,
}

impl<R: Renderer> Default for Scene<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Renderer> Scene<R> {
    pub fn new() -> Self {
        Scene {
            entities: Vec::new(),
        }
    }

    /// Later entities draw on top of earlier ones.
    pub fn add_entity(&mut self, entity: Box<dyn Entity<R>>) {
        log::debug!("added entity #{}", self.entities.len());
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &dyn Entity<R>> {
        self.entities.iter().map(|entity| entity.as_ref())
    }

    pub fn update(&mut self, frame: &Frame) {
        for entity in self.entities.iter_mut() {
            if !entity.removed() {
                entity.update(frame);
            }
        }
    }

    pub fn sweep(&mut self) {
        let before = self.entities.len();
        self.entities.retain(|entity| !entity.removed());
        if self.entities.len() != before {
            log::debug!("removed {} entities", before - self.entities.len());
        }
    }

    pub fn draw(&mut self, renderer: &mut R, frame: &Frame) {
        renderer.clear(&Rect::new(Point::default(), frame.surface));
        for entity in self.entities.iter_mut() {
            if entity.removed() {
                continue;
            }
            renderer.save();
            entity.draw(renderer, frame);
            renderer.restore();
        }
    }
}

// ==================== World setup ====================
pub const ASSET_PATHS: [&str; 3] = [
    props::QUESTION_BOX_SHEET_PATH,
    player::SHEET_PATH,
    props::ENEMY_SHEET_PATH,
];

const PLAYER_START: Point = Point { x: 0.0, y: 400.0 };
const ENEMY_START: Point = Point { x: 100.0, y: 40.0 };
const QUESTION_BOX_AT: Point = Point { x: 0.0, y: 100.0 };

pub fn queue_assets<I>(assets: &mut AssetStore<I>) {
    for path in ASSET_PATHS {
        assets.queue(path);
    }
}

/// Board first, then player, enemy and question box on top.
pub fn populate<R: Renderer>(
    scene: &mut Scene<R>,
    assets: &AssetStore<R::Image>,
    config: &GameConfig,
) -> Result<()> {
    let mario = Player::new(assets.get(player::SHEET_PATH)?, PLAYER_START)
        .with_outlines(config.outlines);
    let enemy = Enemy::new(assets.get(props::ENEMY_SHEET_PATH)?, ENEMY_START);
    let question_box = QuestionBox::new(
        assets.get(props::QUESTION_BOX_SHEET_PATH)?,
        QUESTION_BOX_AT,
    );

    scene.add_entity(Box::new(Board));
    scene.add_entity(Box::new(mario));
    scene.add_entity(Box::new(enemy));
    scene.add_entity(Box::new(question_box));
    Ok(())
}

/// Config, then every image, then the canvas, then the loop. The loop is
/// never started on a half-loaded asset set.
pub async fn launch() -> Result<()> {
    let config = GameConfig::load().await;

    let mut assets = AssetStore::new();
    queue_assets(&mut assets);
    assets.load_all(&HtmlImageLoader).await;

    let canvas = browser::canvas(&config.canvas_id)
        .with_context(|| format!("Failed to find canvas '{}'", config.canvas_id))?;
    let mut scene = Scene::new();
    populate(&mut scene, &assets, &config).context("Failed to build the scene")?;

    let (game_loop, renderer) = GameLoop::initialize(&canvas, scene, &config)?;
    game_loop.start(renderer, config.fallback_fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::ImageLoader;
    use crate::engine::testing::{Call, FakeSheet, RecordingRenderer};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use futures::executor::block_on;

    struct SheetLoader {
        broken: Option<&'static str>,
    }

    #[async_trait(?Send)]
    impl ImageLoader for SheetLoader {
        type Image = FakeSheet;

        async fn load(&self, path: &str) -> Result<FakeSheet> {
            if self.broken == Some(path) {
                return Err(anyhow!("404"));
            }
            Ok(FakeSheet {
                width: 400.0,
                height: 240.0,
            })
        }
    }

    fn loaded(broken: Option<&'static str>) -> AssetStore<FakeSheet> {
        let mut assets = AssetStore::new();
        queue_assets(&mut assets);
        block_on(assets.load_all(&SheetLoader { broken }));
        assets
    }

    #[test]
    fn world_holds_board_player_enemy_and_box_in_order() {
        let mut scene = Scene::<RecordingRenderer>::new();
        populate(&mut scene, &loaded(None), &GameConfig::default()).unwrap();

        let positions: Vec<Point> = scene.entities().map(|entity| entity.position()).collect();
        assert_eq!(
            positions,
            vec![Point::default(), PLAYER_START, ENEMY_START, QUESTION_BOX_AT]
        );
    }

    #[test]
    fn missing_sheet_fails_setup() {
        let mut scene = Scene::<RecordingRenderer>::new();
        let assets = loaded(Some(props::ENEMY_SHEET_PATH));
        assert!(assets.is_done());

        let err = populate(&mut scene, &assets, &GameConfig::default()).unwrap_err();
        assert!(err.to_string().contains(props::ENEMY_SHEET_PATH), "{}", err);
    }

    struct Marked;

    impl Entity<RecordingRenderer> for Marked {
        fn update(&mut self, _frame: &Frame) {
            panic!("marked entities are not updated");
        }

        fn draw(&mut self, _renderer: &mut RecordingRenderer, _frame: &Frame) {
            panic!("marked entities are not drawn");
        }

        fn position(&self) -> Point {
            Point::default()
        }

        fn removed(&self) -> bool {
            true
        }
    }

    #[test]
    fn marked_entities_are_skipped_and_swept() {
        let input = InputState::default();
        let frame = Frame {
            tick: 0.016,
            input: &input,
            surface: Size {
                width: 10.0,
                height: 10.0,
            },
        };
        let mut scene = Scene::<RecordingRenderer>::new();
        scene.add_entity(Box::new(Board));
        scene.add_entity(Box::new(Marked));
        let mut renderer = RecordingRenderer::default();

        scene.update(&frame);
        scene.draw(&mut renderer, &frame);
        assert_eq!(renderer.calls.len(), 3);

        scene.sweep();
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn draw_clears_the_whole_surface_first() {
        let input = InputState::default();
        let frame = Frame {
            tick: 0.0,
            input: &input,
            surface: Size {
                width: 640.0,
                height: 480.0,
            },
        };
        let mut scene = Scene::<RecordingRenderer>::new();
        let mut renderer = RecordingRenderer::default();
        scene.draw(&mut renderer, &frame);
        assert_eq!(
            renderer.calls,
            vec![Call::Clear(Rect::from_xywh(0.0, 0.0, 640.0, 480.0))]
        );
        assert!(scene.is_empty());
    }
}
