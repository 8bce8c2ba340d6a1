// ==================== Imports ====================
use engine::GameLoop;
use game::PortalPeople;
use wasm_bindgen::prelude::*;

mod browser;
mod config;
mod engine;
mod entity;
mod game;
mod level;
mod sprite;
#[cfg(test)]
mod testutils;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook and console logger
/// - reads config.json (defaults when missing)
/// - loads every image, builds the level, starts the loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        let config = config::load().await;
        let max_step = config.max_step();
        if let Err(err) = GameLoop::start(PortalPeople::new(config), max_step).await {
            log::error!("Could not start the game : {:#}", err);
        }
    });

    Ok(())
}
