// ==================== Imports ====================
use wasm_bindgen::prelude::*;

pub mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod sprite;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - sets up panic messages and the console logger
/// - loads config and every sprite sheet
/// - starts the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = game::launch().await {
            log::error!("Could not start game : {:#}", err);
        }
    });

    Ok(())
}
