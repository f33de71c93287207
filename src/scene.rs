//! Host capabilities the effects are written against.
//!
//! The browser implementations live in [`crate::dom`]; [`crate::sim`] provides a
//! virtual-clock host for headless playback.

use crate::effects::confetti::ConfettiPiece;
use crate::effects::hover::HoverParticle;
use crate::effects::tone::Tone;

/// Deferred callbacks on the host event loop.
pub trait Timers {
    /// Handle of a repeating callback; hand it back to [`Timers::cancel`].
    type Interval;

    /// Run `task` once, `delay_ms` from now.
    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>);

    /// Run `task` every `period_ms`, first firing one period from now.
    fn every(&self, period_ms: u32, task: Box<dyn FnMut()>) -> Self::Interval;

    fn cancel(&self, handle: Self::Interval);
}

/// Scene graph the card is drawn into.
pub trait Stage {
    /// A live element that can later be detached.
    type Node;

    /// Append a confetti piece to the confetti layer. `None` if the host refused it.
    fn attach_confetti(&self, piece: &ConfettiPiece) -> Option<Self::Node>;

    /// Append a hover particle on top of the card. `None` if the host refused it.
    fn attach_particle(&self, particle: &HoverParticle) -> Option<Self::Node>;

    fn detach(&self, node: &Self::Node);

    /// Apply or clear the open/flipped visual class on the card.
    fn set_flipped(&self, flipped: bool);
}

/// Audio output.
pub trait Synth {
    /// Play `tone` as an independent voice. Must not fail loudly; a host without
    /// audio simply stays silent.
    fn play(&self, tone: &Tone);
}
