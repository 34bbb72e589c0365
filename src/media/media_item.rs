//! Media item: one piece of playable content in a playlist

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::media::item_config::{
    AdsConfiguration, ClippingConfiguration, DrmConfiguration, LiveConfiguration, LocalConfiguration,
    RequestMetadata, SubtitleConfiguration,
};
use crate::media::media_metadata::MediaMetadata;
use crate::utils::error::{check_argument, Result};

/// Media id used when none is set.
pub const DEFAULT_MEDIA_ID: &str = "";

const FIELD_MEDIA_ID: u32 = 0;
const FIELD_LIVE_CONFIGURATION: u32 = 1;
const FIELD_MEDIA_METADATA: u32 = 2;
const FIELD_CLIPPING_CONFIGURATION: u32 = 3;
const FIELD_REQUEST_METADATA: u32 = 4;
const FIELD_LOCAL_CONFIGURATION: u32 = 5;

/// A piece of content that can be added to a playlist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaItem {
    pub media_id: String,
    /// Absent for items that only describe content to be resolved elsewhere.
    pub local_configuration: Option<LocalConfiguration>,
    pub live_configuration: LiveConfiguration,
    pub clipping_configuration: ClippingConfiguration,
    pub media_metadata: MediaMetadata,
    pub request_metadata: RequestMetadata,
}

impl MediaItem {
    /// An item with no configuration at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates an item that plays `uri` with default settings.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        MediaItem {
            local_configuration: Some(LocalConfiguration {
                uri,
                mime_type: None,
                drm_configuration: None,
                ads_configuration: None,
                custom_cache_key: None,
                subtitle_configurations: Vec::new(),
                image_duration_ms: None,
            }),
            ..Self::default()
        }
    }

    pub fn builder() -> MediaItemBuilder {
        MediaItemBuilder::default()
    }

    /// Returns a builder initialised with this item's values.
    pub fn build_upon(&self) -> MediaItemBuilder {
        let local = self.local_configuration.as_ref();
        MediaItemBuilder {
            media_id: Some(self.media_id.clone()),
            uri: local.map(|local| local.uri.clone()),
            mime_type: local.and_then(|local| local.mime_type.clone()),
            drm: local
                .and_then(|local| local.drm_configuration.as_ref())
                .map(DrmSettings::from_configuration)
                .unwrap_or_default(),
            ads_configuration: local.and_then(|local| local.ads_configuration.clone()),
            custom_cache_key: local.and_then(|local| local.custom_cache_key.clone()),
            subtitle_configurations: local
                .map(|local| local.subtitle_configurations.clone())
                .unwrap_or_default(),
            image_duration_ms: local.and_then(|local| local.image_duration_ms),
            live_configuration: self.live_configuration,
            clipping_configuration: self.clipping_configuration,
            media_metadata: self.media_metadata.clone(),
            request_metadata: self.request_metadata.clone(),
        }
    }

    /// The uri to play, if the item has a local configuration.
    pub fn uri(&self) -> Option<&str> {
        self.local_configuration.as_ref().map(|local| local.uri.as_str())
    }

    /// Whether the item carries live settings.
    pub fn is_live(&self) -> bool {
        !self.live_configuration.is_unset()
    }
}

#[derive(Debug, Clone, Default)]
struct DrmSettings {
    scheme: Option<Uuid>,
    license_uri: Option<String>,
    license_request_headers: BTreeMap<String, String>,
    multi_session: bool,
    play_clear_content_without_key: bool,
    force_default_license_uri: bool,
    force_sessions_for_audio_and_video_tracks: bool,
    key_set_id: Option<Vec<u8>>,
}

impl DrmSettings {
    fn from_configuration(drm: &DrmConfiguration) -> Self {
        Self {
            scheme: Some(drm.scheme),
            license_uri: drm.license_uri.clone(),
            license_request_headers: drm.license_request_headers.clone(),
            multi_session: drm.multi_session,
            play_clear_content_without_key: drm.play_clear_content_without_key,
            force_default_license_uri: drm.force_default_license_uri,
            force_sessions_for_audio_and_video_tracks: !drm.forced_session_track_types.is_empty(),
            key_set_id: drm.key_set_id.clone(),
        }
    }

    fn build(&self) -> Result<Option<DrmConfiguration>> {
        let Some(scheme) = self.scheme else {
            return Ok(None);
        };
        let mut builder = DrmConfiguration::builder(scheme)
            .license_request_headers(self.license_request_headers.clone())
            .multi_session(self.multi_session)
            .play_clear_content_without_key(self.play_clear_content_without_key)
            .force_default_license_uri(self.force_default_license_uri)
            .force_sessions_for_audio_and_video_tracks(self.force_sessions_for_audio_and_video_tracks)
            .key_set_id(self.key_set_id.clone());
        if let Some(uri) = &self.license_uri {
            builder = builder.license_uri(uri.clone());
        }
        builder.build().map(Some)
    }
}

/// Builder for [`MediaItem`].
///
/// Setting a uri creates a [`LocalConfiguration`]; the other local settings
/// (mime type, DRM, ads, subtitles, cache key) are dropped without one.
#[derive(Debug, Clone, Default)]
pub struct MediaItemBuilder {
    media_id: Option<String>,
    uri: Option<String>,
    mime_type: Option<String>,
    drm: DrmSettings,
    ads_configuration: Option<AdsConfiguration>,
    custom_cache_key: Option<String>,
    subtitle_configurations: Vec<SubtitleConfiguration>,
    image_duration_ms: Option<i64>,
    live_configuration: LiveConfiguration,
    clipping_configuration: ClippingConfiguration,
    media_metadata: MediaMetadata,
    request_metadata: RequestMetadata,
}

impl MediaItemBuilder {
    pub fn media_id(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the MIME type, used as a hint for the container format.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn drm_uuid(mut self, scheme: Uuid) -> Self {
        self.drm.scheme = Some(scheme);
        self
    }

    pub fn drm_license_uri(mut self, uri: impl Into<String>) -> Self {
        self.drm.license_uri = Some(uri.into());
        self
    }

    pub fn drm_license_request_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.drm.license_request_headers = headers;
        self
    }

    pub fn drm_multi_session(mut self, multi_session: bool) -> Self {
        self.drm.multi_session = multi_session;
        self
    }

    pub fn drm_play_clear_content_without_key(mut self, play: bool) -> Self {
        self.drm.play_clear_content_without_key = play;
        self
    }

    pub fn drm_force_default_license_uri(mut self, force: bool) -> Self {
        self.drm.force_default_license_uri = force;
        self
    }

    pub fn drm_session_for_clear_types(mut self, force: bool) -> Self {
        self.drm.force_sessions_for_audio_and_video_tracks = force;
        self
    }

    pub fn drm_key_set_id(mut self, key_set_id: Option<Vec<u8>>) -> Self {
        self.drm.key_set_id = key_set_id;
        self
    }

    /// Replaces all DRM settings with `drm`, or clears them.
    pub fn drm_configuration(mut self, drm: Option<&DrmConfiguration>) -> Self {
        self.drm = drm.map(DrmSettings::from_configuration).unwrap_or_default();
        self
    }

    pub fn ads_configuration(mut self, ads: Option<AdsConfiguration>) -> Self {
        self.ads_configuration = ads;
        self
    }

    pub fn custom_cache_key(mut self, key: impl Into<String>) -> Self {
        self.custom_cache_key = Some(key.into());
        self
    }

    pub fn subtitle_configurations(mut self, subtitles: Vec<SubtitleConfiguration>) -> Self {
        self.subtitle_configurations = subtitles;
        self
    }

    pub fn image_duration_ms(mut self, duration_ms: i64) -> Self {
        self.image_duration_ms = Some(duration_ms);
        self
    }

    pub fn clipping_configuration(mut self, clipping: ClippingConfiguration) -> Self {
        self.clipping_configuration = clipping;
        self
    }

    pub fn clip_start_position_ms(mut self, start_ms: i64) -> Self {
        self.clipping_configuration.start_position_ms = start_ms;
        self
    }

    /// `None` clips at the end of the source.
    pub fn clip_end_position_ms(mut self, end_ms: Option<i64>) -> Self {
        self.clipping_configuration.end_position_ms = end_ms;
        self
    }

    pub fn live_configuration(mut self, live: LiveConfiguration) -> Self {
        self.live_configuration = live;
        self
    }

    pub fn live_target_offset_ms(mut self, offset_ms: i64) -> Self {
        self.live_configuration.target_offset_ms = Some(offset_ms);
        self
    }

    pub fn media_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.media_metadata = metadata;
        self
    }

    pub fn request_metadata(mut self, metadata: RequestMetadata) -> Self {
        self.request_metadata = metadata;
        self
    }

    /// Builds the item.
    ///
    /// # Returns
    /// An error if a DRM license uri is set without a DRM scheme, if DRM
    /// settings are inconsistent, or if the clipping range is invalid.
    pub fn build(self) -> Result<MediaItem> {
        check_argument(self.drm.license_uri.is_none() || self.drm.scheme.is_some(), || {
            "a DRM license uri requires a DRM scheme".to_string()
        })?;
        self.clipping_configuration.validate()?;

        let local_configuration = match self.uri {
            Some(uri) => Some(LocalConfiguration {
                uri,
                mime_type: self.mime_type,
                drm_configuration: self.drm.build()?,
                ads_configuration: self.ads_configuration,
                custom_cache_key: self.custom_cache_key,
                subtitle_configurations: self.subtitle_configurations,
                image_duration_ms: self.image_duration_ms,
            }),
            None => None,
        };

        Ok(MediaItem {
            media_id: self.media_id.unwrap_or_else(|| DEFAULT_MEDIA_ID.to_string()),
            local_configuration,
            live_configuration: self.live_configuration,
            clipping_configuration: self.clipping_configuration,
            media_metadata: self.media_metadata,
            request_metadata: self.request_metadata,
        })
    }
}

impl Bundleable for MediaItem {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if self.media_id != DEFAULT_MEDIA_ID {
            bundle.put(field_key(FIELD_MEDIA_ID), self.media_id.clone());
        }
        if !self.live_configuration.is_unset() {
            bundle.put_bundleable(field_key(FIELD_LIVE_CONFIGURATION), &self.live_configuration);
        }
        if !self.media_metadata.is_empty() {
            bundle.put_bundleable(field_key(FIELD_MEDIA_METADATA), &self.media_metadata);
        }
        if self.clipping_configuration != ClippingConfiguration::UNSET {
            bundle.put_bundleable(field_key(FIELD_CLIPPING_CONFIGURATION), &self.clipping_configuration);
        }
        if self.request_metadata != RequestMetadata::EMPTY {
            bundle.put_bundleable(field_key(FIELD_REQUEST_METADATA), &self.request_metadata);
        }
        if let Some(local) = &self.local_configuration {
            bundle.put_bundleable(field_key(FIELD_LOCAL_CONFIGURATION), local);
        }
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(MediaItem {
            media_id: bundle.get_or(&field_key(FIELD_MEDIA_ID), DEFAULT_MEDIA_ID.to_string())?,
            local_configuration: bundle.get_bundleable(&field_key(FIELD_LOCAL_CONFIGURATION))?,
            live_configuration: bundle
                .get_bundleable(&field_key(FIELD_LIVE_CONFIGURATION))?
                .unwrap_or_default(),
            clipping_configuration: bundle
                .get_bundleable(&field_key(FIELD_CLIPPING_CONFIGURATION))?
                .unwrap_or_default(),
            media_metadata: bundle
                .get_bundleable(&field_key(FIELD_MEDIA_METADATA))?
                .unwrap_or_default(),
            request_metadata: bundle
                .get_bundleable(&field_key(FIELD_REQUEST_METADATA))?
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::item_config::WIDEVINE_UUID;

    #[test]
    fn test_from_uri() {
        let item = MediaItem::from_uri("https://host/video.mp4");
        assert_eq!(item.uri(), Some("https://host/video.mp4"));
        assert_eq!(item.media_id, DEFAULT_MEDIA_ID);
        assert!(!item.is_live());
    }

    #[test]
    fn test_no_local_configuration_without_uri() {
        let item = MediaItem::builder()
            .media_id("id")
            .mime_type("video/mp4")
            .custom_cache_key("key")
            .build()
            .unwrap();
        assert!(item.local_configuration.is_none());
    }

    #[test]
    fn test_license_uri_requires_scheme() {
        let result = MediaItem::builder()
            .uri("https://host/video.mpd")
            .drm_license_uri("https://license")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_clip_start_rejected() {
        assert!(MediaItem::builder().clip_start_position_ms(-1).build().is_err());
        assert!(MediaItem::builder().clip_end_position_ms(None).build().is_ok());
    }

    #[test]
    fn test_build_upon_round_trips() {
        let item = MediaItem::builder()
            .media_id("clip")
            .uri("https://host/video.mpd")
            .mime_type("application/dash+xml")
            .drm_uuid(WIDEVINE_UUID)
            .drm_license_uri("https://license")
            .drm_session_for_clear_types(true)
            .ads_configuration(Some(AdsConfiguration::new("https://ads/vast.xml")))
            .subtitle_configurations(vec![SubtitleConfiguration::new("https://host/en.vtt")])
            .clip_start_position_ms(1_000)
            .clip_end_position_ms(Some(9_000))
            .live_target_offset_ms(3_000)
            .build()
            .unwrap();

        assert_eq!(item.build_upon().build().unwrap(), item);
        assert!(item.is_live());
    }

    #[test]
    fn test_bundle_round_trip_and_empty() {
        assert!(MediaItem::empty().to_bundle().is_empty());

        let item = MediaItem::builder()
            .media_id("song")
            .uri("file:///music/song.flac")
            .request_metadata(RequestMetadata {
                media_uri: Some("content://song".to_string()),
                search_query: None,
            })
            .build()
            .unwrap();
        assert_eq!(MediaItem::from_bundle(&item.to_bundle()).unwrap(), item);
    }
}
