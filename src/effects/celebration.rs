//! Celebrate-button feedback: a quick press-in of the button and a wobble of the
//! age number.

use std::f64::consts::PI;
use std::ops::Range;

use rand::Rng;

/// Scale the button shrinks to when pressed.
pub const PRESS_SCALE: f64 = 0.95;
/// How long the button stays pressed in before springing back.
pub const PRESS_RELEASE_MS: u32 = 200;
/// Length of the age-number wobble.
pub const PULSE_DURATION_MS: f64 = 1000.0;
/// Ages drawn when the card randomizes the displayed age.
pub const AGE_RANGE: Range<u32> = 18..68;

/// Scale of the age number at `progress` (0..1) through the wobble.
pub fn pulse_scale(progress: f64) -> f64 {
    if !(0.0..1.0).contains(&progress) {
        return 1.0;
    }
    1.0 + (progress * PI * 4.0).sin() * 0.2
}

pub fn scale_transform(scale: f64) -> String {
    format!("scale({scale})")
}

pub fn random_age<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(AGE_RANGE)
}
