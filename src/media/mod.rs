//! Media value types for ccplayer-common
//!
//! Everything here is an immutable value: media items and their nested
//! configuration, descriptive metadata, formats and track groups, playback
//! parameters, ratings and device information. All of them implement
//! [`Bundleable`](crate::bundle::Bundleable).

pub mod device_info;
pub mod format;
pub mod item_config;
pub mod media_item;
pub mod media_metadata;
pub mod mime_types;
pub mod playback_parameters;
pub mod rating;
pub mod tracks;

pub use device_info::{DeviceInfo, DeviceInfoBuilder, PlaybackType};
pub use format::{Format, FormatBuilder};
pub use item_config::{
    AdsConfiguration, ClippingConfiguration, DrmConfiguration, DrmConfigurationBuilder, LiveConfiguration,
    LocalConfiguration, RequestMetadata, SubtitleConfiguration,
};
pub use media_item::{MediaItem, MediaItemBuilder};
pub use media_metadata::{MediaMetadata, MediaMetadataBuilder, MediaType};
pub use playback_parameters::PlaybackParameters;
pub use rating::{HeartRating, PercentageRating, Rating, StarRating, ThumbRating};
pub use tracks::{TrackGroup, Tracks, TracksGroup};
