//! Information about the playback device

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils::error::{check_argument, MediaError, Result};

const FIELD_PLAYBACK_TYPE: u32 = 0;
const FIELD_MIN_VOLUME: u32 = 1;
const FIELD_MAX_VOLUME: u32 = 2;
const FIELD_ROUTING_CONTROLLER_ID: u32 = 3;

/// Where playback happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackType {
    /// Playback happens on the local device.
    Local,
    /// Playback happens outside of the device (e.g. a cast device).
    Remote,
}

impl PlaybackType {
    fn code(self) -> i64 {
        match self {
            PlaybackType::Local => 0,
            PlaybackType::Remote => 1,
        }
    }

    fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(PlaybackType::Local),
            1 => Ok(PlaybackType::Remote),
            other => Err(MediaError::bundle(format!("unknown playback type {}", other))),
        }
    }
}

/// Information about the playback device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub playback_type: PlaybackType,
    pub min_volume: i32,
    pub max_volume: i32,
    /// Routing controller id of a remote device, if any.
    pub routing_controller_id: Option<String>,
}

impl DeviceInfo {
    /// Local playback with no volume range.
    pub const UNKNOWN: DeviceInfo = DeviceInfo {
        playback_type: PlaybackType::Local,
        min_volume: 0,
        max_volume: 0,
        routing_controller_id: None,
    };

    pub fn builder(playback_type: PlaybackType) -> DeviceInfoBuilder {
        DeviceInfoBuilder {
            playback_type,
            min_volume: 0,
            max_volume: 0,
            routing_controller_id: None,
        }
    }

    pub fn build_upon(&self) -> DeviceInfoBuilder {
        DeviceInfoBuilder {
            playback_type: self.playback_type,
            min_volume: self.min_volume,
            max_volume: self.max_volume,
            routing_controller_id: self.routing_controller_id.clone(),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Builder for [`DeviceInfo`].
#[derive(Debug, Clone)]
pub struct DeviceInfoBuilder {
    playback_type: PlaybackType,
    min_volume: i32,
    max_volume: i32,
    routing_controller_id: Option<String>,
}

impl DeviceInfoBuilder {
    pub fn min_volume(mut self, min_volume: i32) -> Self {
        self.min_volume = min_volume;
        self
    }

    pub fn max_volume(mut self, max_volume: i32) -> Self {
        self.max_volume = max_volume;
        self
    }

    /// Only remote devices carry a routing controller id.
    pub fn routing_controller_id(mut self, id: Option<String>) -> Self {
        self.routing_controller_id = id;
        self
    }

    pub fn build(self) -> Result<DeviceInfo> {
        check_argument(self.min_volume <= self.max_volume, || {
            format!("min_volume {} exceeds max_volume {}", self.min_volume, self.max_volume)
        })?;
        check_argument(
            self.playback_type != PlaybackType::Local || self.routing_controller_id.is_none(),
            || "local devices cannot have a routing controller id".to_string(),
        )?;
        Ok(DeviceInfo {
            playback_type: self.playback_type,
            min_volume: self.min_volume,
            max_volume: self.max_volume,
            routing_controller_id: self.routing_controller_id,
        })
    }
}

impl Bundleable for DeviceInfo {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if self.playback_type != PlaybackType::Local {
            bundle.put(field_key(FIELD_PLAYBACK_TYPE), self.playback_type.code());
        }
        if self.min_volume != 0 {
            bundle.put(field_key(FIELD_MIN_VOLUME), self.min_volume);
        }
        if self.max_volume != 0 {
            bundle.put(field_key(FIELD_MAX_VOLUME), self.max_volume);
        }
        bundle.put_opt(field_key(FIELD_ROUTING_CONTROLLER_ID), self.routing_controller_id.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let playback_type = PlaybackType::from_code(bundle.get_or(&field_key(FIELD_PLAYBACK_TYPE), 0_i64)?)?;
        DeviceInfo::builder(playback_type)
            .min_volume(bundle.get_or(&field_key(FIELD_MIN_VOLUME), 0)?)
            .max_volume(bundle.get_or(&field_key(FIELD_MAX_VOLUME), 0)?)
            .routing_controller_id(bundle.get(&field_key(FIELD_ROUTING_CONTROLLER_ID))?)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_validation() {
        assert!(DeviceInfo::builder(PlaybackType::Local).min_volume(5).max_volume(1).build().is_err());
        assert!(DeviceInfo::builder(PlaybackType::Local)
            .routing_controller_id(Some("route".to_string()))
            .build()
            .is_err());

        let remote = DeviceInfo::builder(PlaybackType::Remote)
            .max_volume(15)
            .routing_controller_id(Some("route".to_string()))
            .build()
            .unwrap();
        assert_eq!(remote.max_volume, 15);
    }

    #[test]
    fn test_unknown_serializes_empty() {
        assert!(DeviceInfo::UNKNOWN.to_bundle().is_empty());
        assert_eq!(DeviceInfo::from_bundle(&Bundle::new()).unwrap(), DeviceInfo::UNKNOWN);
    }

    #[test]
    fn test_remote_device_bundle() {
        let info = DeviceInfo::builder(PlaybackType::Remote)
            .min_volume(1)
            .max_volume(10)
            .routing_controller_id(Some("cast-1".to_string()))
            .build()
            .unwrap();
        assert_eq!(DeviceInfo::from_bundle(&info.to_bundle()).unwrap(), info);
    }
}
