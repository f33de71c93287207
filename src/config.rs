//! Card configuration.
//!
//! Every section has a `Default` reproducing the stock birthday card, so a JSON
//! document only needs to mention the values it changes.

use crate::effects::tone::Waveform;
use crate::error::{CardError, Result};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// DOM ids of the elements the card is wired to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ElementIds {
    pub card: String,
    pub celebrate: String,
    pub confetti_container: String,
    pub age: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            card: "cardWrapper".into(),
            celebrate: "celebrateBtn".into(),
            confetti_container: "confettiContainer".into(),
            age: "ageNumber".into(),
        }
    }
}

/// Upper bound on pieces per burst; every piece is a DOM node and a pending timer.
pub const MAX_CONFETTI: u32 = 1000;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ConfettiConfig {
    /// Pieces per burst.
    pub count: u32,
    /// Gap between consecutive piece creations.
    pub stride_ms: u32,
    /// Wall-clock time a piece stays in the DOM, independent of its animation.
    pub lifetime_ms: u32,
    pub palette: Vec<String>,
    /// Animation delay is drawn from `[0, max_delay_s)`.
    pub max_delay_s: f64,
    pub min_duration_s: f64,
    pub max_duration_s: f64,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 50,
            stride_ms: 30,
            lifetime_ms: 3000,
            palette: ["#ffd700", "#ff6b9d", "#667eea", "#f5576c", "#764ba2", "#ffd89b"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_delay_s: 0.5,
            min_duration_s: 2.0,
            max_duration_s: 4.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct HoverConfig {
    pub interval_ms: u32,
    pub lifetime_ms: u32,
    pub size_px: u32,
    pub color: String,
    /// Starting opacity, within `0.0..=1.0`.
    pub opacity: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            lifetime_ms: 1000,
            size_px: 4,
            color: "#ffffff".into(),
            opacity: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ToneConfig {
    pub opened_hz: f64,
    pub closed_hz: f64,
    /// Oscillator shape: `sine`, `square`, `sawtooth` or `triangle`.
    pub waveform: Waveform,
    pub start_gain: f64,
    /// Exponential ramps cannot reach zero; this is where the decay ends.
    pub floor_gain: f64,
    pub duration_s: f64,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            opened_hz: 600.0,
            closed_hz: 400.0,
            waveform: Waveform::Sine,
            start_gain: 0.3,
            floor_gain: 0.01,
            duration_s: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct CardConfig {
    pub elements: ElementIds,
    /// Class applied to the card while it is open.
    pub flipped_class: String,
    pub confetti: ConfettiConfig,
    pub hover: HoverConfig,
    pub tone: ToneConfig,
    /// Open the card on its own after this delay, unless the visitor already did.
    pub auto_flip_after_ms: Option<u32>,
    /// Replace the age shown on the card with a random one at startup.
    pub randomize_age: bool,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            flipped_class: "flipped".into(),
            confetti: ConfettiConfig::default(),
            hover: HoverConfig::default(),
            tone: ToneConfig::default(),
            auto_flip_after_ms: None,
            randomize_age: false,
            log_level: "info".into(),
        }
    }
}

impl CardConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: CardConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.confetti;
        if c.count > MAX_CONFETTI {
            return Err(invalid(&format!("confetti.count must be at most {MAX_CONFETTI}")));
        }
        if c.palette.is_empty() {
            return Err(invalid("confetti.palette must not be empty"));
        }
        if c.lifetime_ms == 0 {
            return Err(invalid("confetti.lifetime_ms must be positive"));
        }
        if c.max_delay_s < 0.0 {
            return Err(invalid("confetti.max_delay_s must not be negative"));
        }
        if !(c.min_duration_s >= 0.0 && c.min_duration_s <= c.max_duration_s) {
            return Err(invalid("confetti duration range is inverted"));
        }
        let h = &self.hover;
        if h.interval_ms == 0 {
            return Err(invalid("hover.interval_ms must be positive"));
        }
        if h.lifetime_ms == 0 {
            return Err(invalid("hover.lifetime_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&h.opacity) {
            return Err(invalid("hover.opacity must be within 0..=1"));
        }
        let t = &self.tone;
        if t.floor_gain <= 0.0 || t.start_gain <= 0.0 {
            return Err(invalid("tone gains must be positive"));
        }
        if t.duration_s <= 0.0 {
            return Err(invalid("tone.duration_s must be positive"));
        }
        if self.log_level().is_none() {
            return Err(invalid(&format!("unknown log_level '{}'", self.log_level)));
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<tracing::Level> {
        self.log_level.parse().ok()
    }
}

fn invalid(msg: &str) -> CardError {
    CardError::InvalidConfig(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = CardConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.confetti.count, 50);
        assert_eq!(cfg.confetti.palette.len(), 6);
        assert_eq!(cfg.log_level(), Some(tracing::Level::INFO));
    }

    #[test]
    fn empty_palette_rejected() {
        let mut cfg = CardConfig::default();
        cfg.confetti.palette.clear();
        assert!(matches!(cfg.validate(), Err(CardError::InvalidConfig(_))));
    }

    #[test]
    fn zero_hover_interval_rejected() {
        let mut cfg = CardConfig::default();
        cfg.hover.interval_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_duration_range_rejected() {
        let mut cfg = CardConfig::default();
        cfg.confetti.min_duration_s = 5.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_floor_gain_rejected() {
        let mut cfg = CardConfig::default();
        cfg.tone.floor_gain = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_burst_rejected() {
        let mut cfg = CardConfig::default();
        cfg.confetti.count = MAX_CONFETTI;
        assert!(cfg.validate().is_ok());
        cfg.confetti.count = MAX_CONFETTI + 1;
        assert!(matches!(cfg.validate(), Err(CardError::InvalidConfig(_))));
    }

    #[test]
    fn opacity_outside_unit_range_rejected() {
        let mut cfg = CardConfig::default();
        for ok in [0.0, 1.0] {
            cfg.hover.opacity = ok;
            assert!(cfg.validate().is_ok());
        }
        for bad in [-3.0, 1.5, f64::NAN] {
            cfg.hover.opacity = bad;
            assert!(cfg.validate().is_err(), "opacity {bad} accepted");
        }
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn out_of_range_json_rejected() {
        let huge = r#"{ "confetti": { "count": 4294967295 } }"#;
        assert!(matches!(CardConfig::from_json(huge), Err(CardError::InvalidConfig(_))));
        let dark = r#"{ "hover": { "opacity": -3.0 } }"#;
        assert!(matches!(CardConfig::from_json(dark), Err(CardError::InvalidConfig(_))));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn waveform_is_read_from_json() {
        let cfg = CardConfig::from_json(r#"{ "tone": { "waveform": "triangle" } }"#).unwrap();
        assert_eq!(cfg.tone.waveform, Waveform::Triangle);
        assert_eq!(cfg.tone.opened_hz, 600.0);
        assert_eq!(CardConfig::default().tone.waveform, Waveform::Sine);
        assert!(matches!(
            CardConfig::from_json(r#"{ "tone": { "waveform": "noise" } }"#),
            Err(CardError::Config(_))
        ));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CardConfig::from_json(
            r#"{ "confetti": { "count": 10 }, "auto_flip_after_ms": 2000, "log_level": "debug" }"#,
        )
        .unwrap();
        assert_eq!(cfg.confetti.count, 10);
        assert_eq!(cfg.confetti.stride_ms, 30);
        assert_eq!(cfg.auto_flip_after_ms, Some(2000));
        assert_eq!(cfg.hover, HoverConfig::default());
        assert_eq!(cfg.log_level(), Some(tracing::Level::DEBUG));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_errors_are_reported() {
        assert!(matches!(CardConfig::from_json("{"), Err(CardError::Config(_))));
        assert!(matches!(
            CardConfig::from_json(r#"{ "log_level": "loud" }"#),
            Err(CardError::InvalidConfig(_))
        ));
    }
}
