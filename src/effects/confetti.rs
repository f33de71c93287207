//! Confetti bursts.
//!
//! A burst is planned up front (all random draws happen in [`plan_burst`]) and then
//! handed to the host timers: piece `i` appears at `i * stride_ms` and is removed
//! `lifetime_ms` after it appeared, whether or not its fall animation finished.

use rand::Rng;

use crate::config::ConfettiConfig;
use crate::scene::{Stage, Timers};

use super::EffectEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Circle, Shape::Square, Shape::Triangle];
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiPiece {
    pub index: u32,
    /// Horizontal position inside the confetti layer, in percent.
    pub left_pct: f64,
    pub color: String,
    pub shape: Shape,
    /// CSS `animation-delay`, seconds.
    pub delay_s: f64,
    /// CSS `animation-duration`, seconds.
    pub duration_s: f64,
    /// Offset from the start of the burst at which the piece is created.
    pub spawn_at_ms: u32,
}

impl ConfettiPiece {
    pub const CLASS: &'static str = "confetti";

    pub fn random<R: Rng + ?Sized>(rng: &mut R, index: u32, cfg: &ConfettiConfig) -> Self {
        let color = if cfg.palette.is_empty() {
            String::from("#ffffff")
        } else {
            cfg.palette[rng.random_range(0..cfg.palette.len())].clone()
        };
        let shape = Shape::ALL[rng.random_range(0..Shape::ALL.len())];
        let span = cfg.max_duration_s - cfg.min_duration_s;
        Self {
            index,
            left_pct: rng.random::<f64>() * 100.0,
            color,
            shape,
            delay_s: rng.random::<f64>() * cfg.max_delay_s,
            duration_s: cfg.min_duration_s + rng.random::<f64>() * span,
            spawn_at_ms: index.saturating_mul(cfg.stride_ms),
        }
    }

    /// Inline style declarations for the piece's element.
    pub fn style(&self) -> Vec<(&'static str, String)> {
        let mut decls = vec![
            ("left", format!("{}%", self.left_pct)),
            ("animation-delay", format!("{}s", self.delay_s)),
            ("animation-duration", format!("{}s", self.duration_s)),
        ];
        match self.shape {
            Shape::Circle => {
                decls.push(("background", self.color.clone()));
                decls.push(("border-radius", "50%".into()));
            }
            Shape::Square => decls.push(("background", self.color.clone())),
            // Zero-size box whose bottom border draws the triangle.
            Shape::Triangle => {
                decls.push(("width", "0".into()));
                decls.push(("height", "0".into()));
                decls.push(("border-left", "5px solid transparent".into()));
                decls.push(("border-right", "5px solid transparent".into()));
                decls.push(("border-bottom", format!("10px solid {}", self.color)));
                decls.push(("background", "transparent".into()));
            }
        }
        decls
    }
}

/// Draw every piece of one burst, ordered by index (and therefore spawn time).
pub fn plan_burst<R: Rng + ?Sized>(rng: &mut R, cfg: &ConfettiConfig) -> Vec<ConfettiPiece> {
    (0..cfg.count)
        .map(|i| ConfettiPiece::random(rng, i, cfg))
        .collect()
}

impl<S, T> EffectEngine<S, T>
where
    S: Stage + Clone + 'static,
    S::Node: 'static,
    T: Timers + Clone + 'static,
{
    /// Fire one confetti burst. Not cancellable; overlapping bursts simply add up.
    pub fn burst(&self) {
        let pieces = plan_burst(&mut *self.rng.borrow_mut(), &self.config.confetti);
        tracing::debug!(pieces = pieces.len(), "confetti burst");
        let lifetime = self.config.confetti.lifetime_ms;
        for piece in pieces {
            let engine = self.clone();
            self.timers.after(
                piece.spawn_at_ms,
                Box::new(move || {
                    let node = engine.stage.attach_confetti(&piece);
                    engine.show_for(node, lifetime);
                }),
            );
        }
    }
}
