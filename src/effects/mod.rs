//! Effect engine: confetti bursts, hover particles, flip tones and the card toggle.
//!
//! Everything here is generic over the host traits in [`crate::scene`], so the same
//! scheduling code drives the browser and the headless simulator.

pub mod celebration;
pub mod confetti;
pub mod hover;
pub mod tone;
pub mod toggle;

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::CardConfig;
use crate::scene::{Stage, Timers};

pub use confetti::{ConfettiPiece, Shape};
pub use hover::{Emission, HoverEmitter, HoverParticle};
pub use toggle::{CardController, ToggleState};
pub use tone::Tone;

pub type SharedRng = Rc<RefCell<SmallRng>>;

/// Schedules the transient visual effects onto a [`Stage`] using a host's [`Timers`].
///
/// Cheap to clone: clones share the stage, timers, RNG and config.
#[derive(Clone)]
pub struct EffectEngine<S, T> {
    stage: S,
    timers: T,
    rng: SharedRng,
    config: Rc<CardConfig>,
}

impl<S, T> EffectEngine<S, T>
where
    S: Stage + Clone + 'static,
    S::Node: 'static,
    T: Timers + Clone + 'static,
{
    pub fn new(stage: S, timers: T, rng: SmallRng, config: Rc<CardConfig>) -> Self {
        Self {
            stage,
            timers,
            rng: Rc::new(RefCell::new(rng)),
            config,
        }
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Leave a freshly attached node on stage for `lifetime_ms`, then detach it.
    fn show_for(&self, node: Option<S::Node>, lifetime_ms: u32) {
        let Some(node) = node else {
            return;
        };
        let stage = self.stage.clone();
        self.timers
            .after(lifetime_ms, Box::new(move || stage.detach(&node)));
    }
}

/// Seed a fast non-crypto RNG from the platform entropy source.
///
/// Falls back to the performance clock when entropy is unavailable; the effects
/// are decorative so weak seeding is acceptable.
pub fn seeded_rng() -> SmallRng {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => SmallRng::seed_from_u64(u64::from_le_bytes(buf)),
        Err(err) => {
            tracing::debug!("entropy unavailable ({err}), seeding from clock");
            let now = web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0);
            SmallRng::seed_from_u64(now.to_bits())
        }
    }
}
