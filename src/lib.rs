//! Greeting card core crate.
//!
//! A flip-open birthday card for the browser: clicking (or Enter / Space) toggles the
//! card with a short synthesized tone, the celebrate button throws a confetti
//! burst, and hovering the card leaves a trail of fading sparkles.
//!
//! The effect timing lives in [`effects`] and is generic over the host traits in
//! [`scene`]; [`dom`] binds them to the page and `sim` (feature `sim`) runs them
//! headless.

use wasm_bindgen::prelude::*;

mod app;
pub mod config;
pub mod dom;
pub mod effects;
pub mod error;
mod logging;
pub mod scene;
#[cfg(feature = "sim")]
pub mod sim;

pub use config::CardConfig;
pub use error::CardError;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Wire up the card found on the page using the stock settings.
#[wasm_bindgen]
pub fn start_card() -> Result<(), JsValue> {
    app::start(CardConfig::default())?;
    Ok(())
}

/// Like [`start_card`], with settings taken from a (possibly partial) JSON document.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_card_with_config(json: &str) -> Result<(), JsValue> {
    let config = CardConfig::from_json(json)?;
    if let Some(level) = config.log_level() {
        logging::init(level);
    }
    app::start(config)?;
    Ok(())
}

/// Remove the card's listeners and stop hover sparkles, so `start_card` can run
/// again. Returns whether a card was running.
#[wasm_bindgen]
pub fn stop_card() -> bool {
    app::stop()
}
