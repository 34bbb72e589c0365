//! Playback speed and pitch

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils::error::{check_argument, Result};

const FIELD_SPEED: u32 = 0;
const FIELD_PITCH: u32 = 1;

/// Parameters that apply to playback, including speed setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParameters {
    speed: f32,
    pitch: f32,
    scaled_us_per_ms: i64,
}

impl PlaybackParameters {
    /// Normal speed and pitch.
    pub const DEFAULT: PlaybackParameters = PlaybackParameters {
        speed: 1.0,
        pitch: 1.0,
        scaled_us_per_ms: 1000,
    };

    /// Creates new parameters; both factors must be greater than zero.
    pub fn new(speed: f32, pitch: f32) -> Result<Self> {
        check_argument(speed > 0.0, || format!("speed must be positive, was {}", speed))?;
        check_argument(pitch > 0.0, || format!("pitch must be positive, was {}", pitch))?;
        Ok(Self {
            speed,
            pitch,
            scaled_us_per_ms: (speed * 1000.0).round() as i64,
        })
    }

    /// Creates parameters with the given speed and normal pitch.
    pub fn with_speed_only(speed: f32) -> Result<Self> {
        Self::new(speed, 1.0)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Returns the media time in microseconds that will elapse in
    /// `time_ms` milliseconds of wallclock time.
    pub fn media_time_us_for_playout_time_ms(&self, time_ms: i64) -> i64 {
        time_ms * self.scaled_us_per_ms
    }

    /// Returns a copy with the given speed, keeping the pitch.
    pub fn with_speed(&self, speed: f32) -> Result<Self> {
        Self::new(speed, self.pitch)
    }
}

impl Default for PlaybackParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Bundleable for PlaybackParameters {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_SPEED), self.speed);
        bundle.put(field_key(FIELD_PITCH), self.pitch);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let speed = bundle.get_or(&field_key(FIELD_SPEED), 1.0_f32)?;
        let pitch = bundle.get_or(&field_key(FIELD_PITCH), 1.0_f32)?;
        Self::new(speed, pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(PlaybackParameters::new(0.0, 1.0).is_err());
        assert!(PlaybackParameters::new(1.0, -1.0).is_err());
        assert!(PlaybackParameters::new(0.5, 2.0).is_ok());
    }

    #[test]
    fn test_media_time_scaling() {
        let params = PlaybackParameters::with_speed_only(1.5).unwrap();
        assert_eq!(params.media_time_us_for_playout_time_ms(10), 15_000);
        assert_eq!(PlaybackParameters::DEFAULT.media_time_us_for_playout_time_ms(7), 7_000);
    }

    #[test]
    fn test_with_speed_keeps_pitch() {
        let params = PlaybackParameters::new(1.0, 1.2).unwrap().with_speed(2.0).unwrap();
        assert_eq!(params.speed(), 2.0);
        assert_eq!(params.pitch(), 1.2);
    }

    #[test]
    fn test_bundle_defaults() {
        let params = PlaybackParameters::from_bundle(&Bundle::new()).unwrap();
        assert_eq!(params, PlaybackParameters::DEFAULT);
    }
}
