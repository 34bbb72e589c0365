//! MIME type constants and classification helpers

use crate::constants::TrackType;

pub const BASE_TYPE_VIDEO: &str = "video";
pub const BASE_TYPE_AUDIO: &str = "audio";
pub const BASE_TYPE_TEXT: &str = "text";
pub const BASE_TYPE_IMAGE: &str = "image";
pub const BASE_TYPE_APPLICATION: &str = "application";

pub const VIDEO_MP4: &str = "video/mp4";
pub const VIDEO_WEBM: &str = "video/webm";
pub const VIDEO_H264: &str = "video/avc";
pub const VIDEO_H265: &str = "video/hevc";
pub const VIDEO_VP9: &str = "video/x-vnd.on2.vp9";
pub const VIDEO_AV1: &str = "video/av01";

pub const AUDIO_MP4: &str = "audio/mp4";
pub const AUDIO_AAC: &str = "audio/mp4a-latm";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const AUDIO_OPUS: &str = "audio/opus";
pub const AUDIO_FLAC: &str = "audio/flac";
pub const AUDIO_RAW: &str = "audio/raw";

pub const TEXT_VTT: &str = "text/vtt";
pub const TEXT_SSA: &str = "text/x-ssa";
pub const APPLICATION_SUBRIP: &str = "application/x-subrip";
pub const APPLICATION_TTML: &str = "application/ttml+xml";
pub const APPLICATION_CEA608: &str = "application/cea-608";
pub const APPLICATION_CEA708: &str = "application/cea-708";
pub const APPLICATION_MEDIA3_CUES: &str = "application/x-media3-cues";

pub const APPLICATION_ID3: &str = "application/id3";
pub const APPLICATION_EMSG: &str = "application/x-emsg";
pub const APPLICATION_CAMERA_MOTION: &str = "application/x-camera-motion";

pub const APPLICATION_M3U8: &str = "application/x-mpegURL";
pub const APPLICATION_MPD: &str = "application/dash+xml";
pub const APPLICATION_SS: &str = "application/vnd.ms-sstr+xml";

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";

/// Returns the top-level type of `mime_type` (the part before `/`).
pub fn top_level_type(mime_type: &str) -> Option<&str> {
    let (top, _) = mime_type.split_once('/')?;
    Some(top)
}

pub fn is_audio(mime_type: Option<&str>) -> bool {
    mime_type.and_then(top_level_type) == Some(BASE_TYPE_AUDIO)
}

pub fn is_video(mime_type: Option<&str>) -> bool {
    mime_type.and_then(top_level_type) == Some(BASE_TYPE_VIDEO)
}

pub fn is_image(mime_type: Option<&str>) -> bool {
    mime_type.and_then(top_level_type) == Some(BASE_TYPE_IMAGE)
}

/// Whether the type carries text tracks, including text-like application types.
pub fn is_text(mime_type: Option<&str>) -> bool {
    match mime_type {
        None => false,
        Some(mime) => {
            top_level_type(mime) == Some(BASE_TYPE_TEXT)
                || [
                    APPLICATION_SUBRIP,
                    APPLICATION_TTML,
                    APPLICATION_CEA608,
                    APPLICATION_CEA708,
                    APPLICATION_MEDIA3_CUES,
                ]
                .contains(&mime)
        }
    }
}

/// Maps a sample MIME type to the kind of track it belongs to.
pub fn track_type(mime_type: Option<&str>) -> TrackType {
    let Some(mime) = mime_type.filter(|mime| !mime.is_empty()) else {
        return TrackType::Unknown;
    };
    if is_audio(Some(mime)) {
        TrackType::Audio
    } else if is_video(Some(mime)) {
        TrackType::Video
    } else if is_text(Some(mime)) {
        TrackType::Text
    } else if is_image(Some(mime)) {
        TrackType::Image
    } else if mime == APPLICATION_ID3 || mime == APPLICATION_EMSG {
        TrackType::Metadata
    } else if mime == APPLICATION_CAMERA_MOTION {
        TrackType::CameraMotion
    } else {
        TrackType::Unknown
    }
}

/// Guesses the adaptive container type of a URI from its extension.
pub fn infer_manifest_type(uri: &str) -> Option<&'static str> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri).to_ascii_lowercase();
    if path.ends_with(".m3u8") {
        Some(APPLICATION_M3U8)
    } else if path.ends_with(".mpd") {
        Some(APPLICATION_MPD)
    } else if path.ends_with(".ism") || path.ends_with(".isml") || path.ends_with("/manifest") {
        Some(APPLICATION_SS)
    } else {
        None
    }
}
