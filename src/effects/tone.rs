//! Flip tones: a short blip whose pitch tells open from closed.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::config::ToneConfig;

use super::ToggleState;

/// Oscillator shape of a flip tone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(rename_all = "lowercase"))]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f64,
    pub waveform: Waveform,
    pub start_gain: f64,
    /// Gain the exponential decay reaches at `duration_s`.
    pub floor_gain: f64,
    pub duration_s: f64,
}

impl Tone {
    /// The tone announcing that the card just moved into `state`.
    pub fn for_state(state: ToggleState, cfg: &ToneConfig) -> Self {
        let frequency_hz = match state {
            ToggleState::Opened => cfg.opened_hz,
            ToggleState::Closed => cfg.closed_hz,
        };
        Self {
            frequency_hz,
            waveform: cfg.waveform,
            start_gain: cfg.start_gain,
            floor_gain: cfg.floor_gain,
            duration_s: cfg.duration_s,
        }
    }

    /// Envelope value `t` seconds after the start; zero once the voice stopped.
    pub fn gain_at(&self, t: f64) -> f64 {
        if t < 0.0 || t >= self.duration_s {
            return 0.0;
        }
        self.start_gain * (self.floor_gain / self.start_gain).powf(t / self.duration_s)
    }
}
