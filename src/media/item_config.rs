//! Configuration values nested inside a [`MediaItem`](crate::media::MediaItem)
//!
//! Each value is immutable once built. The `MediaItem` builder is the usual
//! way to create them; the standalone builders here exist for callers that
//! assemble configurations piecemeal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::constants::TrackType;
use crate::utils::error::{check_argument, IntoMediaError, Result};

/// Widevine DRM scheme.
pub const WIDEVINE_UUID: Uuid = Uuid::from_u128(0xedef8ba9_79d6_4ace_a3c8_27dcd51d21ed);
/// PlayReady DRM scheme.
pub const PLAYREADY_UUID: Uuid = Uuid::from_u128(0x9a04f079_9840_4286_ab92_e65be0885f95);
/// ClearKey DRM scheme.
pub const CLEARKEY_UUID: Uuid = Uuid::from_u128(0xe2719d58_a985_b3c9_781a_b030af78d30e);
/// Common PSSH box scheme, matching any DRM.
pub const COMMON_PSSH_UUID: Uuid = Uuid::from_u128(0x1077efec_c0b2_4d02_ace3_3c1e52e2fb4b);

/// DRM settings of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrmConfiguration {
    pub scheme: Uuid,
    pub license_uri: Option<String>,
    pub license_request_headers: BTreeMap<String, String>,
    pub multi_session: bool,
    pub play_clear_content_without_key: bool,
    pub force_default_license_uri: bool,
    pub forced_session_track_types: Vec<TrackType>,
    pub key_set_id: Option<Vec<u8>>,
}

impl DrmConfiguration {
    pub fn builder(scheme: Uuid) -> DrmConfigurationBuilder {
        DrmConfigurationBuilder::new(scheme)
    }

    pub fn build_upon(&self) -> DrmConfigurationBuilder {
        DrmConfigurationBuilder {
            configuration: self.clone(),
        }
    }
}

/// Builder for [`DrmConfiguration`].
#[derive(Debug, Clone)]
pub struct DrmConfigurationBuilder {
    configuration: DrmConfiguration,
}

impl DrmConfigurationBuilder {
    pub fn new(scheme: Uuid) -> Self {
        Self {
            configuration: DrmConfiguration {
                scheme,
                license_uri: None,
                license_request_headers: BTreeMap::new(),
                multi_session: false,
                play_clear_content_without_key: false,
                force_default_license_uri: false,
                forced_session_track_types: Vec::new(),
                key_set_id: None,
            },
        }
    }

    pub fn license_uri(mut self, uri: impl Into<String>) -> Self {
        self.configuration.license_uri = Some(uri.into());
        self
    }

    pub fn license_request_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.configuration.license_request_headers = headers;
        self
    }

    pub fn multi_session(mut self, multi_session: bool) -> Self {
        self.configuration.multi_session = multi_session;
        self
    }

    pub fn play_clear_content_without_key(mut self, play: bool) -> Self {
        self.configuration.play_clear_content_without_key = play;
        self
    }

    pub fn force_default_license_uri(mut self, force: bool) -> Self {
        self.configuration.force_default_license_uri = force;
        self
    }

    /// Forces sessions for clear video and audio tracks.
    pub fn force_sessions_for_audio_and_video_tracks(mut self, force: bool) -> Self {
        self.configuration.forced_session_track_types = if force {
            vec![TrackType::Video, TrackType::Audio]
        } else {
            Vec::new()
        };
        self
    }

    pub fn forced_session_track_types(mut self, track_types: Vec<TrackType>) -> Self {
        self.configuration.forced_session_track_types = track_types;
        self
    }

    pub fn key_set_id(mut self, key_set_id: Option<Vec<u8>>) -> Self {
        self.configuration.key_set_id = key_set_id;
        self
    }

    /// Forcing the default license uri requires a license uri.
    pub fn build(self) -> Result<DrmConfiguration> {
        check_argument(
            !self.configuration.force_default_license_uri || self.configuration.license_uri.is_some(),
            || "force_default_license_uri requires a license uri".to_string(),
        )?;
        Ok(self.configuration)
    }
}

const FIELD_DRM_SCHEME: u32 = 0;
const FIELD_DRM_LICENSE_URI: u32 = 1;
const FIELD_DRM_LICENSE_REQUEST_HEADERS: u32 = 2;
const FIELD_DRM_MULTI_SESSION: u32 = 3;
const FIELD_DRM_PLAY_CLEAR_CONTENT_WITHOUT_KEY: u32 = 4;
const FIELD_DRM_FORCE_DEFAULT_LICENSE_URI: u32 = 5;
const FIELD_DRM_FORCED_SESSION_TRACK_TYPES: u32 = 6;
const FIELD_DRM_KEY_SET_ID: u32 = 7;

impl Bundleable for DrmConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_DRM_SCHEME), self.scheme.to_string());
        bundle.put_opt(field_key(FIELD_DRM_LICENSE_URI), self.license_uri.clone());
        if !self.license_request_headers.is_empty() {
            let mut headers = Bundle::new();
            for (name, value) in &self.license_request_headers {
                headers.put(name.clone(), value.clone());
            }
            bundle.put(field_key(FIELD_DRM_LICENSE_REQUEST_HEADERS), headers);
        }
        if self.multi_session {
            bundle.put(field_key(FIELD_DRM_MULTI_SESSION), true);
        }
        if self.play_clear_content_without_key {
            bundle.put(field_key(FIELD_DRM_PLAY_CLEAR_CONTENT_WITHOUT_KEY), true);
        }
        if self.force_default_license_uri {
            bundle.put(field_key(FIELD_DRM_FORCE_DEFAULT_LICENSE_URI), true);
        }
        if !self.forced_session_track_types.is_empty() {
            bundle.put(
                field_key(FIELD_DRM_FORCED_SESSION_TRACK_TYPES),
                self.forced_session_track_types
                    .iter()
                    .map(|track_type| track_type.code())
                    .collect::<Vec<_>>(),
            );
        }
        bundle.put_opt(field_key(FIELD_DRM_KEY_SET_ID), self.key_set_id.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let scheme: String = bundle.require(&field_key(FIELD_DRM_SCHEME))?;
        let scheme = Uuid::parse_str(&scheme).bundle_err("invalid DRM scheme")?;
        let mut license_request_headers = BTreeMap::new();
        if let Some(headers) = bundle.get::<Bundle>(&field_key(FIELD_DRM_LICENSE_REQUEST_HEADERS))? {
            for name in headers.keys() {
                license_request_headers.insert(name.to_string(), headers.require::<String>(name)?);
            }
        }
        let forced_session_track_types = bundle
            .get::<Vec<i64>>(&field_key(FIELD_DRM_FORCED_SESSION_TRACK_TYPES))?
            .unwrap_or_default()
            .into_iter()
            .map(TrackType::from_code)
            .collect();
        Ok(DrmConfiguration {
            scheme,
            license_uri: bundle.get(&field_key(FIELD_DRM_LICENSE_URI))?,
            license_request_headers,
            multi_session: bundle.get_or(&field_key(FIELD_DRM_MULTI_SESSION), false)?,
            play_clear_content_without_key: bundle
                .get_or(&field_key(FIELD_DRM_PLAY_CLEAR_CONTENT_WITHOUT_KEY), false)?,
            force_default_license_uri: bundle.get_or(&field_key(FIELD_DRM_FORCE_DEFAULT_LICENSE_URI), false)?,
            forced_session_track_types,
            key_set_id: bundle.get(&field_key(FIELD_DRM_KEY_SET_ID))?,
        })
    }
}

/// Client-side ad insertion settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdsConfiguration {
    pub ad_tag_uri: String,
}

impl AdsConfiguration {
    pub fn new(ad_tag_uri: impl Into<String>) -> Self {
        Self {
            ad_tag_uri: ad_tag_uri.into(),
        }
    }
}

const FIELD_AD_TAG_URI: u32 = 0;

impl Bundleable for AdsConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_AD_TAG_URI), self.ad_tag_uri.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(AdsConfiguration::new(bundle.require::<String>(&field_key(FIELD_AD_TAG_URI))?))
    }
}

/// A side-loaded subtitle track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubtitleConfiguration {
    pub uri: String,
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub selection_flags: u32,
    pub role_flags: u32,
    pub label: Option<String>,
    pub id: Option<String>,
}

impl SubtitleConfiguration {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
            language: None,
            selection_flags: 0,
            role_flags: 0,
            label: None,
            id: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_selection_flags(mut self, flags: u32) -> Self {
        self.selection_flags = flags;
        self
    }

    pub fn with_role_flags(mut self, flags: u32) -> Self {
        self.role_flags = flags;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

const FIELD_SUBTITLE_URI: u32 = 0;
const FIELD_SUBTITLE_MIME_TYPE: u32 = 1;
const FIELD_SUBTITLE_LANGUAGE: u32 = 2;
const FIELD_SUBTITLE_SELECTION_FLAGS: u32 = 3;
const FIELD_SUBTITLE_ROLE_FLAGS: u32 = 4;
const FIELD_SUBTITLE_LABEL: u32 = 5;
const FIELD_SUBTITLE_ID: u32 = 6;

impl Bundleable for SubtitleConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_SUBTITLE_URI), self.uri.clone());
        bundle.put_opt(field_key(FIELD_SUBTITLE_MIME_TYPE), self.mime_type.clone());
        bundle.put_opt(field_key(FIELD_SUBTITLE_LANGUAGE), self.language.clone());
        if self.selection_flags != 0 {
            bundle.put(field_key(FIELD_SUBTITLE_SELECTION_FLAGS), self.selection_flags);
        }
        if self.role_flags != 0 {
            bundle.put(field_key(FIELD_SUBTITLE_ROLE_FLAGS), self.role_flags);
        }
        bundle.put_opt(field_key(FIELD_SUBTITLE_LABEL), self.label.clone());
        bundle.put_opt(field_key(FIELD_SUBTITLE_ID), self.id.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(SubtitleConfiguration {
            uri: bundle.require(&field_key(FIELD_SUBTITLE_URI))?,
            mime_type: bundle.get(&field_key(FIELD_SUBTITLE_MIME_TYPE))?,
            language: bundle.get(&field_key(FIELD_SUBTITLE_LANGUAGE))?,
            selection_flags: bundle.get_or(&field_key(FIELD_SUBTITLE_SELECTION_FLAGS), 0)?,
            role_flags: bundle.get_or(&field_key(FIELD_SUBTITLE_ROLE_FLAGS), 0)?,
            label: bundle.get(&field_key(FIELD_SUBTITLE_LABEL))?,
            id: bundle.get(&field_key(FIELD_SUBTITLE_ID))?,
        })
    }
}

/// Everything needed to load an item locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConfiguration {
    pub uri: String,
    pub mime_type: Option<String>,
    pub drm_configuration: Option<DrmConfiguration>,
    pub ads_configuration: Option<AdsConfiguration>,
    pub custom_cache_key: Option<String>,
    pub subtitle_configurations: Vec<SubtitleConfiguration>,
    /// Display duration of a still image, if the item is one.
    pub image_duration_ms: Option<i64>,
}

const FIELD_LOCAL_URI: u32 = 0;
const FIELD_LOCAL_MIME_TYPE: u32 = 1;
const FIELD_LOCAL_DRM_CONFIGURATION: u32 = 2;
const FIELD_LOCAL_ADS_CONFIGURATION: u32 = 3;
const FIELD_LOCAL_CUSTOM_CACHE_KEY: u32 = 5;
const FIELD_LOCAL_SUBTITLE_CONFIGURATION: u32 = 6;
const FIELD_LOCAL_IMAGE_DURATION_MS: u32 = 7;

impl Bundleable for LocalConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_LOCAL_URI), self.uri.clone());
        bundle.put_opt(field_key(FIELD_LOCAL_MIME_TYPE), self.mime_type.clone());
        if let Some(drm) = &self.drm_configuration {
            bundle.put_bundleable(field_key(FIELD_LOCAL_DRM_CONFIGURATION), drm);
        }
        if let Some(ads) = &self.ads_configuration {
            bundle.put_bundleable(field_key(FIELD_LOCAL_ADS_CONFIGURATION), ads);
        }
        bundle.put_opt(field_key(FIELD_LOCAL_CUSTOM_CACHE_KEY), self.custom_cache_key.clone());
        if !self.subtitle_configurations.is_empty() {
            bundle.put_bundleable_list(
                field_key(FIELD_LOCAL_SUBTITLE_CONFIGURATION),
                &self.subtitle_configurations,
            );
        }
        bundle.put_opt(field_key(FIELD_LOCAL_IMAGE_DURATION_MS), self.image_duration_ms);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(LocalConfiguration {
            uri: bundle.require(&field_key(FIELD_LOCAL_URI))?,
            mime_type: bundle.get(&field_key(FIELD_LOCAL_MIME_TYPE))?,
            drm_configuration: bundle.get_bundleable(&field_key(FIELD_LOCAL_DRM_CONFIGURATION))?,
            ads_configuration: bundle.get_bundleable(&field_key(FIELD_LOCAL_ADS_CONFIGURATION))?,
            custom_cache_key: bundle.get(&field_key(FIELD_LOCAL_CUSTOM_CACHE_KEY))?,
            subtitle_configurations: bundle
                .get_bundleable_list(&field_key(FIELD_LOCAL_SUBTITLE_CONFIGURATION))?,
            image_duration_ms: bundle.get(&field_key(FIELD_LOCAL_IMAGE_DURATION_MS))?,
        })
    }
}

/// Clipping applied to an item. `end_position_ms` of `None` means the end of
/// the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ClippingConfiguration {
    pub start_position_ms: i64,
    pub end_position_ms: Option<i64>,
    pub relative_to_live_window: bool,
    pub relative_to_default_position: bool,
    pub starts_at_key_frame: bool,
}

impl ClippingConfiguration {
    /// No clipping.
    pub const UNSET: ClippingConfiguration = ClippingConfiguration {
        start_position_ms: 0,
        end_position_ms: None,
        relative_to_live_window: false,
        relative_to_default_position: false,
        starts_at_key_frame: false,
    };

    pub fn start_position_us(&self) -> i64 {
        self.start_position_ms.saturating_mul(1000)
    }

    pub fn end_position_us(&self) -> Option<i64> {
        self.end_position_ms.map(|ms| ms.saturating_mul(1000))
    }

    /// Rejects negative start or end positions.
    pub fn validate(&self) -> Result<()> {
        check_argument(self.start_position_ms >= 0, || {
            format!("clipping start {} must not be negative", self.start_position_ms)
        })?;
        if let Some(end) = self.end_position_ms {
            check_argument(end >= 0, || format!("clipping end {} must not be negative", end))?;
        }
        Ok(())
    }
}

const FIELD_CLIPPING_START_MS: u32 = 0;
const FIELD_CLIPPING_END_MS: u32 = 1;
const FIELD_CLIPPING_RELATIVE_TO_LIVE_WINDOW: u32 = 2;
const FIELD_CLIPPING_RELATIVE_TO_DEFAULT_POSITION: u32 = 3;
const FIELD_CLIPPING_STARTS_AT_KEY_FRAME: u32 = 4;

impl Bundleable for ClippingConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if self.start_position_ms != 0 {
            bundle.put(field_key(FIELD_CLIPPING_START_MS), self.start_position_ms);
        }
        bundle.put_opt(field_key(FIELD_CLIPPING_END_MS), self.end_position_ms);
        if self.relative_to_live_window {
            bundle.put(field_key(FIELD_CLIPPING_RELATIVE_TO_LIVE_WINDOW), true);
        }
        if self.relative_to_default_position {
            bundle.put(field_key(FIELD_CLIPPING_RELATIVE_TO_DEFAULT_POSITION), true);
        }
        if self.starts_at_key_frame {
            bundle.put(field_key(FIELD_CLIPPING_STARTS_AT_KEY_FRAME), true);
        }
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let clipping = ClippingConfiguration {
            start_position_ms: bundle.get_or(&field_key(FIELD_CLIPPING_START_MS), 0)?,
            end_position_ms: bundle.get(&field_key(FIELD_CLIPPING_END_MS))?,
            relative_to_live_window: bundle.get_or(&field_key(FIELD_CLIPPING_RELATIVE_TO_LIVE_WINDOW), false)?,
            relative_to_default_position: bundle
                .get_or(&field_key(FIELD_CLIPPING_RELATIVE_TO_DEFAULT_POSITION), false)?,
            starts_at_key_frame: bundle.get_or(&field_key(FIELD_CLIPPING_STARTS_AT_KEY_FRAME), false)?,
        };
        clipping.validate()?;
        Ok(clipping)
    }
}

/// Live playback targets. Unset values let the player pick its defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveConfiguration {
    pub target_offset_ms: Option<i64>,
    pub min_offset_ms: Option<i64>,
    pub max_offset_ms: Option<i64>,
    pub min_playback_speed: Option<f32>,
    pub max_playback_speed: Option<f32>,
}

impl LiveConfiguration {
    pub const UNSET: LiveConfiguration = LiveConfiguration {
        target_offset_ms: None,
        min_offset_ms: None,
        max_offset_ms: None,
        min_playback_speed: None,
        max_playback_speed: None,
    };

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }
}

const FIELD_LIVE_TARGET_OFFSET_MS: u32 = 0;
const FIELD_LIVE_MIN_OFFSET_MS: u32 = 1;
const FIELD_LIVE_MAX_OFFSET_MS: u32 = 2;
const FIELD_LIVE_MIN_PLAYBACK_SPEED: u32 = 3;
const FIELD_LIVE_MAX_PLAYBACK_SPEED: u32 = 4;

impl Bundleable for LiveConfiguration {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_opt(field_key(FIELD_LIVE_TARGET_OFFSET_MS), self.target_offset_ms);
        bundle.put_opt(field_key(FIELD_LIVE_MIN_OFFSET_MS), self.min_offset_ms);
        bundle.put_opt(field_key(FIELD_LIVE_MAX_OFFSET_MS), self.max_offset_ms);
        bundle.put_opt(field_key(FIELD_LIVE_MIN_PLAYBACK_SPEED), self.min_playback_speed);
        bundle.put_opt(field_key(FIELD_LIVE_MAX_PLAYBACK_SPEED), self.max_playback_speed);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(LiveConfiguration {
            target_offset_ms: bundle.get(&field_key(FIELD_LIVE_TARGET_OFFSET_MS))?,
            min_offset_ms: bundle.get(&field_key(FIELD_LIVE_MIN_OFFSET_MS))?,
            max_offset_ms: bundle.get(&field_key(FIELD_LIVE_MAX_OFFSET_MS))?,
            min_playback_speed: bundle.get(&field_key(FIELD_LIVE_MIN_PLAYBACK_SPEED))?,
            max_playback_speed: bundle.get(&field_key(FIELD_LIVE_MAX_PLAYBACK_SPEED))?,
        })
    }
}

/// Metadata used when requesting the item from a remote source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub media_uri: Option<String>,
    pub search_query: Option<String>,
}

impl RequestMetadata {
    pub const EMPTY: RequestMetadata = RequestMetadata {
        media_uri: None,
        search_query: None,
    };
}

const FIELD_REQUEST_MEDIA_URI: u32 = 0;
const FIELD_REQUEST_SEARCH_QUERY: u32 = 1;

impl Bundleable for RequestMetadata {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_opt(field_key(FIELD_REQUEST_MEDIA_URI), self.media_uri.clone());
        bundle.put_opt(field_key(FIELD_REQUEST_SEARCH_QUERY), self.search_query.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(RequestMetadata {
            media_uri: bundle.get(&field_key(FIELD_REQUEST_MEDIA_URI))?,
            search_query: bundle.get(&field_key(FIELD_REQUEST_SEARCH_QUERY))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::MediaError;

    #[test]
    fn test_drm_builder_rules() {
        assert!(DrmConfiguration::builder(WIDEVINE_UUID)
            .force_default_license_uri(true)
            .build()
            .is_err());

        let drm = DrmConfiguration::builder(WIDEVINE_UUID)
            .license_uri("https://license.example")
            .force_sessions_for_audio_and_video_tracks(true)
            .build()
            .unwrap();
        assert_eq!(drm.forced_session_track_types, vec![TrackType::Video, TrackType::Audio]);
    }

    #[test]
    fn test_drm_bundle() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc".to_string());
        let drm = DrmConfiguration::builder(CLEARKEY_UUID)
            .license_uri("https://license.example")
            .license_request_headers(headers)
            .multi_session(true)
            .key_set_id(Some(vec![1, 2, 3]))
            .build()
            .unwrap();
        assert_eq!(DrmConfiguration::from_bundle(&drm.to_bundle()).unwrap(), drm);
    }

    #[test]
    fn test_invalid_drm_scheme() {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_DRM_SCHEME), "not-a-uuid");
        assert!(matches!(DrmConfiguration::from_bundle(&bundle), Err(MediaError::Bundle(_))));
    }

    #[test]
    fn test_clipping_validation() {
        let mut clipping = ClippingConfiguration::UNSET;
        assert!(clipping.validate().is_ok());
        clipping.end_position_ms = Some(-5);
        assert!(clipping.validate().is_err());
        clipping.end_position_ms = Some(5_000);
        clipping.start_position_ms = 1_000;
        assert_eq!(clipping.start_position_us(), 1_000_000);
        assert_eq!(clipping.end_position_us(), Some(5_000_000));
        assert!(ClippingConfiguration::UNSET.to_bundle().is_empty());
    }

    #[test]
    fn test_subtitle_bundle() {
        let subtitle = SubtitleConfiguration::new("https://host/subs.vtt")
            .with_mime_type("text/vtt")
            .with_language("en")
            .with_selection_flags(1);
        assert_eq!(SubtitleConfiguration::from_bundle(&subtitle.to_bundle()).unwrap(), subtitle);
    }
}
