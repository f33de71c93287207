//! `tracing` setup for the browser console.
//!
//! The console layer is installed once from the wasm start hook behind a reloadable
//! level filter, so a config loaded later can still change verbosity.

use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, reload};
use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};

static LEVEL: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Install the console subscriber at `level`. Later calls only adjust the level.
pub fn init(level: Level) {
    if LEVEL.get().is_some() {
        set_level(level);
        return;
    }
    let (filter, handle) = reload::Layer::new(LevelFilter::from_level(level));
    let subscriber = Registry::default()
        .with(filter)
        .with(WASMLayer::new(WASMLayerConfigBuilder::new().build()));
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        let _ = LEVEL.set(handle);
    }
}

pub fn set_level(level: Level) {
    if let Some(handle) = LEVEL.get() {
        if let Err(err) = handle.modify(|f| *f = LevelFilter::from_level(level)) {
            tracing::warn!("log level not changed: {err}");
        }
    }
}
