//! Constants shared across the media model
//!
//! Unknown times and indices are modelled with `Option` throughout the crate;
//! the only in-band marker left is [`TIME_END_OF_SOURCE`], used for postroll
//! ad groups whose position is "the end of the content".

use serde::{Deserialize, Serialize};

/// Marks an ad group positioned at the end of the content.
pub const TIME_END_OF_SOURCE: i64 = i64::MIN;

/// Sentinel written into serialized int fields for an absent index.
pub(crate) const INDEX_UNSET: i64 = -1;

/// Selection flag: the track should be selected by default.
pub const SELECTION_FLAG_DEFAULT: u32 = 1;
/// Selection flag: the track should be forced on.
pub const SELECTION_FLAG_FORCED: u32 = 1 << 1;
/// Selection flag: the track was auto-selected.
pub const SELECTION_FLAG_AUTOSELECT: u32 = 1 << 2;

/// Role flag: main content.
pub const ROLE_FLAG_MAIN: u32 = 1;
/// Role flag: alternate content.
pub const ROLE_FLAG_ALTERNATE: u32 = 1 << 1;
/// Role flag: supplementary content.
pub const ROLE_FLAG_SUPPLEMENTARY: u32 = 1 << 2;
/// Role flag: commentary.
pub const ROLE_FLAG_COMMENTARY: u32 = 1 << 3;
/// Role flag: dub.
pub const ROLE_FLAG_DUB: u32 = 1 << 4;
/// Role flag: emergency alert.
pub const ROLE_FLAG_EMERGENCY: u32 = 1 << 5;
/// Role flag: caption track.
pub const ROLE_FLAG_CAPTION: u32 = 1 << 6;
/// Role flag: subtitle track.
pub const ROLE_FLAG_SUBTITLE: u32 = 1 << 7;
/// Role flag: sign language.
pub const ROLE_FLAG_SIGN: u32 = 1 << 8;
/// Role flag: audio description.
pub const ROLE_FLAG_DESCRIBES_VIDEO: u32 = 1 << 9;
/// Role flag: text description of music and sound.
pub const ROLE_FLAG_DESCRIBES_MUSIC_AND_SOUND: u32 = 1 << 10;
/// Role flag: trick play.
pub const ROLE_FLAG_TRICK_PLAY: u32 = 1 << 14;

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackType {
    None,
    Unknown,
    Default,
    Audio,
    Video,
    Text,
    Image,
    Metadata,
    CameraMotion,
}

impl TrackType {
    /// Stable integer used in serialized form.
    pub fn code(self) -> i64 {
        match self {
            TrackType::None => -2,
            TrackType::Unknown => -1,
            TrackType::Default => 0,
            TrackType::Audio => 1,
            TrackType::Video => 2,
            TrackType::Text => 3,
            TrackType::Image => 4,
            TrackType::Metadata => 5,
            TrackType::CameraMotion => 6,
        }
    }

    /// Inverse of [`TrackType::code`]; unrecognised codes map to `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            -2 => TrackType::None,
            0 => TrackType::Default,
            1 => TrackType::Audio,
            2 => TrackType::Video,
            3 => TrackType::Text,
            4 => TrackType::Image,
            5 => TrackType::Metadata,
            6 => TrackType::CameraMotion,
            _ => TrackType::Unknown,
        }
    }
}

/// How well a renderer supports a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormatSupport {
    UnsupportedType,
    UnsupportedSubtype,
    UnsupportedDrm,
    ExceedsCapabilities,
    Handled,
}

impl FormatSupport {
    pub fn code(self) -> i64 {
        match self {
            FormatSupport::UnsupportedType => 0,
            FormatSupport::UnsupportedSubtype => 1,
            FormatSupport::UnsupportedDrm => 2,
            FormatSupport::ExceedsCapabilities => 3,
            FormatSupport::Handled => 4,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            4 => FormatSupport::Handled,
            3 => FormatSupport::ExceedsCapabilities,
            2 => FormatSupport::UnsupportedDrm,
            1 => FormatSupport::UnsupportedSubtype,
            _ => FormatSupport::UnsupportedType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_type_codes() {
        for track_type in [
            TrackType::None,
            TrackType::Unknown,
            TrackType::Default,
            TrackType::Audio,
            TrackType::Video,
            TrackType::Text,
            TrackType::Image,
            TrackType::Metadata,
            TrackType::CameraMotion,
        ] {
            assert_eq!(TrackType::from_code(track_type.code()), track_type);
        }
        assert_eq!(TrackType::from_code(99), TrackType::Unknown);
    }

    #[test]
    fn test_format_support_ordering() {
        assert!(FormatSupport::Handled > FormatSupport::ExceedsCapabilities);
        assert_eq!(FormatSupport::from_code(17), FormatSupport::UnsupportedType);
    }
}
