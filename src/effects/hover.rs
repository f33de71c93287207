//! Hover sparkles: while the pointer is over the card a particle pops up every
//! `interval_ms` at a random spot and fades out, removed `lifetime_ms` later.

use rand::Rng;

use crate::config::HoverConfig;
use crate::scene::{Stage, Timers};

use super::EffectEngine;

/// Name of the keyframes animation the particle element runs.
pub const FADE_ANIMATION: &str = "particleFade";

/// Stylesheet defining [`FADE_ANIMATION`]; injected once at startup.
pub const FADE_KEYFRAMES: &str = "
    @keyframes particleFade {
        0% { opacity: 0.6; transform: scale(1); }
        100% { opacity: 0; transform: scale(2); }
    }
";

#[derive(Clone, Debug, PartialEq)]
pub struct HoverParticle {
    pub left_pct: f64,
    pub top_pct: f64,
}

impl HoverParticle {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            left_pct: rng.random::<f64>() * 100.0,
            top_pct: rng.random::<f64>() * 100.0,
        }
    }

    pub fn style(&self, cfg: &HoverConfig) -> Vec<(&'static str, String)> {
        let size = format!("{}px", cfg.size_px);
        vec![
            ("position", "absolute".into()),
            ("width", size.clone()),
            ("height", size),
            ("background", cfg.color.clone()),
            ("border-radius", "50%".into()),
            ("pointer-events", "none".into()),
            ("left", format!("{}%", self.left_pct)),
            ("top", format!("{}%", self.top_pct)),
            ("opacity", cfg.opacity.to_string()),
            (
                "animation",
                format!(
                    "{FADE_ANIMATION} {}s ease-out forwards",
                    f64::from(cfg.lifetime_ms) / 1000.0
                ),
            ),
        ]
    }
}

/// A running emission loop. The loop lives exactly as long as this handle: hand it
/// to [`EffectEngine::stop_emitting`] or drop it.
#[must_use = "dropping an emission stops it immediately"]
pub struct Emission<H>(H);

impl<S, T> EffectEngine<S, T>
where
    S: Stage + Clone + 'static,
    S::Node: 'static,
    T: Timers + Clone + 'static,
{
    /// Spawn a single particle now and schedule its removal.
    pub fn spawn_particle(&self) {
        let particle = HoverParticle::random(&mut *self.rng.borrow_mut());
        let node = self.stage.attach_particle(&particle);
        self.show_for(node, self.config.hover.lifetime_ms);
    }

    pub fn start_emitting(&self) -> Emission<T::Interval> {
        let engine = self.clone();
        let handle = self.timers.every(
            self.config.hover.interval_ms,
            Box::new(move || engine.spawn_particle()),
        );
        Emission(handle)
    }

    /// Stop creating particles. Particles already shown still expire on their own.
    pub fn stop_emitting(&self, emission: Emission<T::Interval>) {
        self.timers.cancel(emission.0);
    }
}

/// Owns the emission loop for one hover target, so there is never more than one.
pub struct HoverEmitter<S, T: Timers> {
    engine: EffectEngine<S, T>,
    active: Option<Emission<T::Interval>>,
}

impl<S, T> HoverEmitter<S, T>
where
    S: Stage + Clone + 'static,
    S::Node: 'static,
    T: Timers + Clone + 'static,
{
    pub fn new(engine: EffectEngine<S, T>) -> Self {
        Self {
            engine,
            active: None,
        }
    }

    /// Pointer entered: (re)start the loop, replacing any loop still running.
    pub fn enter(&mut self) {
        if let Some(prev) = self.active.take() {
            self.engine.stop_emitting(prev);
        }
        self.active = Some(self.engine.start_emitting());
    }

    /// Pointer left.
    pub fn leave(&mut self) {
        if let Some(emission) = self.active.take() {
            self.engine.stop_emitting(emission);
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn particle_positions_stay_inside_target() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let p = HoverParticle::random(&mut rng);
            assert!((0.0..100.0).contains(&p.left_pct));
            assert!((0.0..100.0).contains(&p.top_pct));
        }
    }

    #[test]
    fn particle_style_matches_config() {
        let cfg = HoverConfig::default();
        let p = HoverParticle {
            left_pct: 50.0,
            top_pct: 25.0,
        };
        let style = p.style(&cfg);
        assert!(style.contains(&("width", "4px".to_string())));
        assert!(style.contains(&("top", "25%".to_string())));
        assert!(style.contains(&("opacity", "0.6".to_string())));
        assert!(style.contains(&("animation", "particleFade 1s ease-out forwards".to_string())));
    }
}
