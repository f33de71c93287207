//! The open/closed state of the card.

use crate::config::ToneConfig;
use crate::scene::{Stage, Synth};

use super::Tone;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Closed,
    Opened,
}

impl ToggleState {
    pub fn flipped(self) -> Self {
        match self {
            ToggleState::Closed => ToggleState::Opened,
            ToggleState::Opened => ToggleState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == ToggleState::Opened
    }
}

/// Keys that activate the card while it has focus.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Sole owner and mutator of the card's [`ToggleState`].
pub struct CardController<S, A> {
    state: ToggleState,
    stage: S,
    synth: A,
    tones: ToneConfig,
}

impl<S: Stage, A: Synth> CardController<S, A> {
    pub fn new(stage: S, synth: A, tones: ToneConfig) -> Self {
        Self {
            state: ToggleState::Closed,
            stage,
            synth,
            tones,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Flip the card, update its class and play the tone of the new state.
    pub fn activate(&mut self) -> ToggleState {
        self.state = self.state.flipped();
        self.stage.set_flipped(self.state.is_open());
        self.synth.play(&Tone::for_state(self.state, &self.tones));
        tracing::debug!(state = ?self.state, "card toggled");
        self.state
    }

    /// Activate only if the card is still closed; returns whether it flipped.
    pub fn open(&mut self) -> bool {
        if self.state.is_open() {
            return false;
        }
        self.activate();
        true
    }
}
