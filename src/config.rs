//! Startup settings.
//!
//! Read once from `game.json` next to the page. The file is optional and
//! any field it leaves out keeps its default:
//!
//! ```json
//! { "canvas_id": "gameWorld", "max_step": 0.1, "fallback_fps": 60, "outlines": true }
//! ```
use crate::browser;
use crate::engine::Clock;
use serde::Deserialize;

const DEFAULT_CANVAS_ID: &str = "gameWorld";
const DEFAULT_FALLBACK_FPS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Element id of the canvas we draw on.
    pub canvas_id: String,
    /// Longest simulation step a single frame may take, in seconds.
    pub max_step: f64,
    /// Timer rate used only when requestAnimationFrame is unavailable.
    pub fallback_fps: u32,
    /// Draw debug hitboxes.
    pub outlines: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            max_step: Clock::MAX_STEP,
            fallback_fps: DEFAULT_FALLBACK_FPS,
            outlines: true,
        }
    }
}

impl GameConfig {
    pub const PATH: &'static str = "game.json";

    /// Never fails, a missing or broken file means defaults.
    pub async fn load() -> Self {
        match browser::fetch_json::<GameConfig>(Self::PATH).await {
            Ok(config) => {
                log::info!("loaded {} : {:?}", Self::PATH, config);
                config
            }
            Err(err) => {
                log::warn!("using default config, {} unavailable : {:#}", Self::PATH, err);
                GameConfig::default()
            }
        }
    }
}
