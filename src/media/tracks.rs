//! Track groups and the tracks currently available to a player
//!
//! A [`TrackGroup`] holds formats that carry the same content (e.g. the
//! bitrate ladder of one video rendition). [`Tracks`] wraps the groups exposed
//! by the player together with their support and selection state.

use log::error;
use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::constants::{FormatSupport, TrackType, ROLE_FLAG_TRICK_PLAY};
use crate::media::format::Format;
use crate::media::mime_types;
use crate::utils::error::{check_argument, MediaError, Result};

const FIELD_GROUP_FORMATS: u32 = 0;
const FIELD_GROUP_ID: u32 = 1;

const FIELD_TRACK_GROUP: u32 = 0;
const FIELD_TRACK_SUPPORT: u32 = 1;
const FIELD_TRACK_SELECTED: u32 = 3;
const FIELD_ADAPTIVE_SUPPORTED: u32 = 4;

const FIELD_TRACK_GROUPS: u32 = 0;

/// A group of formats that all carry the same content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackGroup {
    id: String,
    track_type: TrackType,
    formats: Vec<Format>,
}

impl TrackGroup {
    /// Creates a group; it must contain at least one format.
    ///
    /// The track type comes from the first format's sample MIME type, falling
    /// back to its container MIME type. Inconsistent languages or role flags
    /// are logged, not rejected.
    pub fn new(id: impl Into<String>, formats: Vec<Format>) -> Result<Self> {
        check_argument(!formats.is_empty(), || "track group must contain a format".to_string())?;
        let mut track_type = mime_types::track_type(formats[0].sample_mime_type.as_deref());
        if track_type == TrackType::Unknown {
            track_type = mime_types::track_type(formats[0].container_mime_type.as_deref());
        }
        let group = Self {
            id: id.into(),
            track_type,
            formats,
        };
        group.verify_correctness();
        Ok(group)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Panics if `index` is out of range.
    pub fn format(&self, index: usize) -> &Format {
        &self.formats[index]
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Index of `format` in the group, if it is present.
    pub fn index_of(&self, format: &Format) -> Option<usize> {
        self.formats.iter().position(|candidate| candidate == format)
    }

    /// Returns a copy with a different id.
    pub fn copy_with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            track_type: self.track_type,
            formats: self.formats.clone(),
        }
    }

    fn verify_correctness(&self) {
        let language = normalize_language(self.formats[0].language.as_deref());
        let role_flags = self.formats[0].role_flags | ROLE_FLAG_TRICK_PLAY;
        for (index, format) in self.formats.iter().enumerate().skip(1) {
            if normalize_language(format.language.as_deref()) != language {
                log_inconsistent("languages", &language, &normalize_language(format.language.as_deref()), index);
                return;
            }
            if role_flags != (format.role_flags | ROLE_FLAG_TRICK_PLAY) {
                log_inconsistent(
                    "role flags",
                    &format!("{:#x}", self.formats[0].role_flags),
                    &format!("{:#x}", format.role_flags),
                    index,
                );
                return;
            }
        }
    }
}

fn normalize_language(language: Option<&str>) -> String {
    match language {
        None | Some("und") => String::new(),
        Some(language) => language.to_string(),
    }
}

fn log_inconsistent(what: &str, first: &str, other: &str, index: usize) {
    error!(
        "Different {} combined in one TrackGroup: '{}' (track 0) and '{}' (track {})",
        what, first, other, index
    );
}

impl Bundleable for TrackGroup {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_bundleable_list(field_key(FIELD_GROUP_FORMATS), &self.formats);
        bundle.put(field_key(FIELD_GROUP_ID), self.id.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let formats = bundle.get_bundleable_list(&field_key(FIELD_GROUP_FORMATS))?;
        let id = bundle.get_or(&field_key(FIELD_GROUP_ID), String::new())?;
        TrackGroup::new(id, formats)
    }
}

/// One track group as exposed by the player, with per-track state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracksGroup {
    media_track_group: TrackGroup,
    adaptive_supported: bool,
    track_support: Vec<FormatSupport>,
    track_selected: Vec<bool>,
}

impl TracksGroup {
    /// `track_support` and `track_selected` must have one entry per format.
    /// Adaptation is only meaningful for groups with more than one track.
    pub fn new(
        media_track_group: TrackGroup,
        adaptive_supported: bool,
        track_support: Vec<FormatSupport>,
        track_selected: Vec<bool>,
    ) -> Result<Self> {
        let length = media_track_group.len();
        check_argument(track_support.len() == length && track_selected.len() == length, || {
            format!(
                "expected {} support and selection entries, got {} and {}",
                length,
                track_support.len(),
                track_selected.len()
            )
        })?;
        Ok(Self {
            adaptive_supported: length > 1 && adaptive_supported,
            media_track_group,
            track_support,
            track_selected,
        })
    }

    pub fn len(&self) -> usize {
        self.media_track_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media_track_group.is_empty()
    }

    pub fn media_track_group(&self) -> &TrackGroup {
        &self.media_track_group
    }

    pub fn track_format(&self, track_index: usize) -> &Format {
        self.media_track_group.format(track_index)
    }

    pub fn track_support(&self, track_index: usize) -> FormatSupport {
        self.track_support[track_index]
    }

    /// Whether the track is supported, optionally tolerating tracks that
    /// exceed the device capabilities.
    pub fn is_track_supported(&self, track_index: usize, allow_exceeds_capabilities: bool) -> bool {
        let support = self.track_support[track_index];
        support == FormatSupport::Handled
            || (allow_exceeds_capabilities && support == FormatSupport::ExceedsCapabilities)
    }

    pub fn is_supported(&self, allow_exceeds_capabilities: bool) -> bool {
        (0..self.len()).any(|index| self.is_track_supported(index, allow_exceeds_capabilities))
    }

    pub fn is_track_selected(&self, track_index: usize) -> bool {
        self.track_selected[track_index]
    }

    pub fn is_selected(&self) -> bool {
        self.track_selected.iter().any(|selected| *selected)
    }

    pub fn is_adaptive_supported(&self) -> bool {
        self.adaptive_supported
    }

    pub fn track_type(&self) -> TrackType {
        self.media_track_group.track_type()
    }
}

impl Bundleable for TracksGroup {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_bundleable(field_key(FIELD_TRACK_GROUP), &self.media_track_group);
        bundle.put(
            field_key(FIELD_TRACK_SUPPORT),
            self.track_support.iter().map(|support| support.code()).collect::<Vec<_>>(),
        );
        bundle.put(field_key(FIELD_TRACK_SELECTED), self.track_selected.clone());
        bundle.put(field_key(FIELD_ADAPTIVE_SUPPORTED), self.adaptive_supported);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let group: TrackGroup = bundle
            .get_bundleable(&field_key(FIELD_TRACK_GROUP))?
            .ok_or_else(|| MediaError::MissingField(field_key(FIELD_TRACK_GROUP)))?;
        let length = group.len();
        let track_support = bundle
            .get::<Vec<i64>>(&field_key(FIELD_TRACK_SUPPORT))?
            .map(|codes| codes.into_iter().map(FormatSupport::from_code).collect())
            .unwrap_or_else(|| vec![FormatSupport::UnsupportedType; length]);
        let track_selected = bundle
            .get::<Vec<bool>>(&field_key(FIELD_TRACK_SELECTED))?
            .unwrap_or_else(|| vec![false; length]);
        let adaptive_supported = bundle.get_or(&field_key(FIELD_ADAPTIVE_SUPPORTED), false)?;
        TracksGroup::new(group, adaptive_supported, track_support, track_selected)
    }
}

/// The tracks the player currently exposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tracks {
    groups: Vec<TracksGroup>,
}

impl Tracks {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(groups: Vec<TracksGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[TracksGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains_type(&self, track_type: TrackType) -> bool {
        self.groups.iter().any(|group| group.track_type() == track_type)
    }

    /// Whether at least one track of `track_type` is supported.
    pub fn is_type_supported(&self, track_type: TrackType, allow_exceeds_capabilities: bool) -> bool {
        self.groups
            .iter()
            .any(|group| group.track_type() == track_type && group.is_supported(allow_exceeds_capabilities))
    }

    pub fn is_type_selected(&self, track_type: TrackType) -> bool {
        self.groups
            .iter()
            .any(|group| group.track_type() == track_type && group.is_selected())
    }

    /// Whether `format` is the format of a selected track.
    pub fn is_format_selected(&self, format: &Format) -> bool {
        self.groups.iter().any(|group| {
            (0..group.len()).any(|index| group.is_track_selected(index) && group.track_format(index) == format)
        })
    }
}

impl Bundleable for Tracks {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_bundleable_list(field_key(FIELD_TRACK_GROUPS), &self.groups);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(Tracks::new(bundle.get_bundleable_list(&field_key(FIELD_TRACK_GROUPS))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(id: &str, language: &str) -> Format {
        Format::builder()
            .id(id)
            .sample_mime_type(mime_types::AUDIO_AAC)
            .language(language)
            .build()
    }

    #[test]
    fn test_group_requires_format() {
        assert!(TrackGroup::new("g", Vec::new()).is_err());
    }

    #[test]
    fn test_group_type_inference() {
        let group = TrackGroup::new("a", vec![audio("a1", "en")]).unwrap();
        assert_eq!(group.track_type(), TrackType::Audio);

        let container_only = Format::builder().container_mime_type(mime_types::VIDEO_MP4).build();
        let group = TrackGroup::new("v", vec![container_only]).unwrap();
        assert_eq!(group.track_type(), TrackType::Video);
    }

    #[test]
    fn test_index_of() {
        let first = audio("a1", "en");
        let second = audio("a2", "en");
        let group = TrackGroup::new("a", vec![first.clone(), second.clone()]).unwrap();
        assert_eq!(group.index_of(&second), Some(1));
        assert_eq!(group.index_of(&audio("missing", "en")), None);
    }

    #[test]
    fn test_tracks_group_validation() {
        let group = TrackGroup::new("a", vec![audio("a1", "en")]).unwrap();
        assert!(TracksGroup::new(group.clone(), true, vec![], vec![false]).is_err());

        let tracks_group =
            TracksGroup::new(group, true, vec![FormatSupport::Handled], vec![true]).unwrap();
        assert!(!tracks_group.is_adaptive_supported());
        assert!(tracks_group.is_selected());
    }

    #[test]
    fn test_tracks_queries() {
        let group = TrackGroup::new("a", vec![audio("a1", "en"), audio("a2", "en")]).unwrap();
        let tracks_group = TracksGroup::new(
            group,
            true,
            vec![FormatSupport::ExceedsCapabilities, FormatSupport::UnsupportedDrm],
            vec![false, true],
        )
        .unwrap();
        let tracks = Tracks::new(vec![tracks_group]);

        assert!(tracks.contains_type(TrackType::Audio));
        assert!(!tracks.contains_type(TrackType::Video));
        assert!(!tracks.is_type_supported(TrackType::Audio, false));
        assert!(tracks.is_type_supported(TrackType::Audio, true));
        assert!(tracks.is_type_selected(TrackType::Audio));
        assert!(tracks.is_format_selected(&audio("a2", "en")));
        assert!(!tracks.is_format_selected(&audio("a1", "en")));
    }

    #[test]
    fn test_tracks_bundle() {
        let group = TrackGroup::new("a", vec![audio("a1", "en")]).unwrap();
        let tracks = Tracks::new(vec![
            TracksGroup::new(group, false, vec![FormatSupport::Handled], vec![true]).unwrap(),
        ]);
        assert_eq!(Tracks::from_bundle(&tracks.to_bundle()).unwrap(), tracks);
        assert_eq!(Tracks::from_bundle(&Bundle::new()).unwrap(), Tracks::empty());
    }
}
