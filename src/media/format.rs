//! Media format description
//!
//! A [`Format`] describes one track variant: its container and sample MIME
//! types, bitrates, and the video or audio specific properties that apply.
//! Unknown values are `None`.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils::error::Result;

const FIELD_ID: u32 = 0;
const FIELD_LABEL: u32 = 1;
const FIELD_LANGUAGE: u32 = 2;
const FIELD_SELECTION_FLAGS: u32 = 3;
const FIELD_ROLE_FLAGS: u32 = 4;
const FIELD_AVERAGE_BITRATE: u32 = 5;
const FIELD_PEAK_BITRATE: u32 = 6;
const FIELD_CODECS: u32 = 7;
const FIELD_CONTAINER_MIME_TYPE: u32 = 9;
const FIELD_SAMPLE_MIME_TYPE: u32 = 10;
const FIELD_MAX_INPUT_SIZE: u32 = 11;
const FIELD_INITIALIZATION_DATA: u32 = 12;
const FIELD_SUBSAMPLE_OFFSET_US: u32 = 14;
const FIELD_WIDTH: u32 = 15;
const FIELD_HEIGHT: u32 = 16;
const FIELD_FRAME_RATE: u32 = 17;
const FIELD_ROTATION_DEGREES: u32 = 18;
const FIELD_PIXEL_WIDTH_HEIGHT_RATIO: u32 = 19;
const FIELD_CHANNEL_COUNT: u32 = 23;
const FIELD_SAMPLE_RATE: u32 = 24;
const FIELD_ENCODER_DELAY: u32 = 26;
const FIELD_ENCODER_PADDING: u32 = 27;
const FIELD_ACCESSIBILITY_CHANNEL: u32 = 28;

/// Offset meaning "no subsample offset"; relative timestamps are used as-is.
pub const OFFSET_SAMPLE_RELATIVE: i64 = i64::MAX;

/// Description of a media track variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub id: Option<String>,
    pub label: Option<String>,
    pub language: Option<String>,
    pub selection_flags: u32,
    pub role_flags: u32,
    pub average_bitrate: Option<u32>,
    pub peak_bitrate: Option<u32>,
    pub codecs: Option<String>,
    pub container_mime_type: Option<String>,
    pub sample_mime_type: Option<String>,
    pub max_input_size: Option<u32>,
    pub initialization_data: Vec<Vec<u8>>,
    pub subsample_offset_us: i64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f32>,
    pub rotation_degrees: u32,
    pub pixel_width_height_ratio: f32,
    pub channel_count: Option<u32>,
    pub sample_rate: Option<u32>,
    pub encoder_delay: u32,
    pub encoder_padding: u32,
    pub accessibility_channel: Option<u32>,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            id: None,
            label: None,
            language: None,
            selection_flags: 0,
            role_flags: 0,
            average_bitrate: None,
            peak_bitrate: None,
            codecs: None,
            container_mime_type: None,
            sample_mime_type: None,
            max_input_size: None,
            initialization_data: Vec::new(),
            subsample_offset_us: OFFSET_SAMPLE_RELATIVE,
            width: None,
            height: None,
            frame_rate: None,
            rotation_degrees: 0,
            pixel_width_height_ratio: 1.0,
            channel_count: None,
            sample_rate: None,
            encoder_delay: 0,
            encoder_padding: 0,
            accessibility_channel: None,
        }
    }
}

impl Format {
    pub fn builder() -> FormatBuilder {
        FormatBuilder::default()
    }

    pub fn build_upon(&self) -> FormatBuilder {
        FormatBuilder { format: self.clone() }
    }

    /// The peak bitrate if known, else the average bitrate.
    pub fn bitrate(&self) -> Option<u32> {
        self.peak_bitrate.or(self.average_bitrate)
    }

    /// Width times height, if both are known.
    pub fn pixel_count(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(u64::from(width) * u64::from(height)),
            _ => None,
        }
    }

    /// Whether the two formats share initialization data byte for byte.
    pub fn initialization_data_equals(&self, other: &Format) -> bool {
        self.initialization_data == other.initialization_data
    }

    /// A compact one-line description for logs.
    pub fn to_log_string(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "id={}", self.id.as_deref().unwrap_or("null"));
        if let Some(mime) = &self.sample_mime_type {
            let _ = write!(out, ", mimeType={}", mime);
        }
        if let Some(bitrate) = self.bitrate() {
            let _ = write!(out, ", bitrate={}", bitrate);
        }
        if let Some(codecs) = &self.codecs {
            let _ = write!(out, ", codecs={}", codecs);
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            let _ = write!(out, ", res={}x{}", width, height);
        }
        if let Some(frame_rate) = self.frame_rate {
            let _ = write!(out, ", fps={}", frame_rate);
        }
        if let Some(channels) = self.channel_count {
            let _ = write!(out, ", channels={}", channels);
        }
        if let Some(sample_rate) = self.sample_rate {
            let _ = write!(out, ", sample_rate={}", sample_rate);
        }
        if let Some(language) = &self.language {
            let _ = write!(out, ", language={}", language);
        }
        if let Some(label) = &self.label {
            let _ = write!(out, ", label={}", label);
        }
        out
    }
}

/// Builder for [`Format`].
#[derive(Debug, Clone, Default)]
pub struct FormatBuilder {
    format: Format,
}

impl FormatBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.format.id = Some(id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.format.label = Some(label.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.format.language = Some(language.into());
        self
    }

    pub fn selection_flags(mut self, flags: u32) -> Self {
        self.format.selection_flags = flags;
        self
    }

    pub fn role_flags(mut self, flags: u32) -> Self {
        self.format.role_flags = flags;
        self
    }

    pub fn average_bitrate(mut self, bitrate: u32) -> Self {
        self.format.average_bitrate = Some(bitrate);
        self
    }

    pub fn peak_bitrate(mut self, bitrate: u32) -> Self {
        self.format.peak_bitrate = Some(bitrate);
        self
    }

    pub fn codecs(mut self, codecs: impl Into<String>) -> Self {
        self.format.codecs = Some(codecs.into());
        self
    }

    pub fn container_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.format.container_mime_type = Some(mime_type.into());
        self
    }

    pub fn sample_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.format.sample_mime_type = Some(mime_type.into());
        self
    }

    pub fn max_input_size(mut self, size: u32) -> Self {
        self.format.max_input_size = Some(size);
        self
    }

    pub fn initialization_data(mut self, data: Vec<Vec<u8>>) -> Self {
        self.format.initialization_data = data;
        self
    }

    pub fn subsample_offset_us(mut self, offset_us: i64) -> Self {
        self.format.subsample_offset_us = offset_us;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.format.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.format.height = Some(height);
        self
    }

    pub fn frame_rate(mut self, frame_rate: f32) -> Self {
        self.format.frame_rate = Some(frame_rate);
        self
    }

    pub fn rotation_degrees(mut self, degrees: u32) -> Self {
        self.format.rotation_degrees = degrees;
        self
    }

    pub fn pixel_width_height_ratio(mut self, ratio: f32) -> Self {
        self.format.pixel_width_height_ratio = ratio;
        self
    }

    pub fn channel_count(mut self, channels: u32) -> Self {
        self.format.channel_count = Some(channels);
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.format.sample_rate = Some(sample_rate);
        self
    }

    pub fn encoder_delay(mut self, frames: u32) -> Self {
        self.format.encoder_delay = frames;
        self
    }

    pub fn encoder_padding(mut self, frames: u32) -> Self {
        self.format.encoder_padding = frames;
        self
    }

    pub fn accessibility_channel(mut self, channel: u32) -> Self {
        self.format.accessibility_channel = Some(channel);
        self
    }

    pub fn build(self) -> Format {
        self.format
    }
}

fn initialization_data_key(index: usize) -> String {
    format!("{}_{}", field_key(FIELD_INITIALIZATION_DATA), field_key(index as u32))
}

impl Bundleable for Format {
    fn to_bundle(&self) -> Bundle {
        let defaults = Format::default();
        let mut bundle = Bundle::new();
        bundle.put_opt(field_key(FIELD_ID), self.id.clone());
        bundle.put_opt(field_key(FIELD_LABEL), self.label.clone());
        bundle.put_opt(field_key(FIELD_LANGUAGE), self.language.clone());
        bundle.put(field_key(FIELD_SELECTION_FLAGS), self.selection_flags);
        bundle.put(field_key(FIELD_ROLE_FLAGS), self.role_flags);
        bundle.put_opt(field_key(FIELD_AVERAGE_BITRATE), self.average_bitrate);
        bundle.put_opt(field_key(FIELD_PEAK_BITRATE), self.peak_bitrate);
        bundle.put_opt(field_key(FIELD_CODECS), self.codecs.clone());
        bundle.put_opt(field_key(FIELD_CONTAINER_MIME_TYPE), self.container_mime_type.clone());
        bundle.put_opt(field_key(FIELD_SAMPLE_MIME_TYPE), self.sample_mime_type.clone());
        bundle.put_opt(field_key(FIELD_MAX_INPUT_SIZE), self.max_input_size);
        for (index, data) in self.initialization_data.iter().enumerate() {
            bundle.put(initialization_data_key(index), data.clone());
        }
        if self.subsample_offset_us != defaults.subsample_offset_us {
            bundle.put(field_key(FIELD_SUBSAMPLE_OFFSET_US), self.subsample_offset_us);
        }
        bundle.put_opt(field_key(FIELD_WIDTH), self.width);
        bundle.put_opt(field_key(FIELD_HEIGHT), self.height);
        bundle.put_opt(field_key(FIELD_FRAME_RATE), self.frame_rate);
        bundle.put(field_key(FIELD_ROTATION_DEGREES), self.rotation_degrees);
        bundle.put(field_key(FIELD_PIXEL_WIDTH_HEIGHT_RATIO), self.pixel_width_height_ratio);
        bundle.put_opt(field_key(FIELD_CHANNEL_COUNT), self.channel_count);
        bundle.put_opt(field_key(FIELD_SAMPLE_RATE), self.sample_rate);
        bundle.put(field_key(FIELD_ENCODER_DELAY), self.encoder_delay);
        bundle.put(field_key(FIELD_ENCODER_PADDING), self.encoder_padding);
        bundle.put_opt(field_key(FIELD_ACCESSIBILITY_CHANNEL), self.accessibility_channel);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let defaults = Format::default();
        let mut initialization_data = Vec::new();
        while let Some(data) = bundle.get::<Vec<u8>>(&initialization_data_key(initialization_data.len()))? {
            initialization_data.push(data);
        }
        Ok(Format {
            id: bundle.get(&field_key(FIELD_ID))?,
            label: bundle.get(&field_key(FIELD_LABEL))?,
            language: bundle.get(&field_key(FIELD_LANGUAGE))?,
            selection_flags: bundle.get_or(&field_key(FIELD_SELECTION_FLAGS), 0)?,
            role_flags: bundle.get_or(&field_key(FIELD_ROLE_FLAGS), 0)?,
            average_bitrate: bundle.get(&field_key(FIELD_AVERAGE_BITRATE))?,
            peak_bitrate: bundle.get(&field_key(FIELD_PEAK_BITRATE))?,
            codecs: bundle.get(&field_key(FIELD_CODECS))?,
            container_mime_type: bundle.get(&field_key(FIELD_CONTAINER_MIME_TYPE))?,
            sample_mime_type: bundle.get(&field_key(FIELD_SAMPLE_MIME_TYPE))?,
            max_input_size: bundle.get(&field_key(FIELD_MAX_INPUT_SIZE))?,
            initialization_data,
            subsample_offset_us: bundle.get_or(&field_key(FIELD_SUBSAMPLE_OFFSET_US), defaults.subsample_offset_us)?,
            width: bundle.get(&field_key(FIELD_WIDTH))?,
            height: bundle.get(&field_key(FIELD_HEIGHT))?,
            frame_rate: bundle.get(&field_key(FIELD_FRAME_RATE))?,
            rotation_degrees: bundle.get_or(&field_key(FIELD_ROTATION_DEGREES), 0)?,
            pixel_width_height_ratio: bundle.get_or(&field_key(FIELD_PIXEL_WIDTH_HEIGHT_RATIO), 1.0)?,
            channel_count: bundle.get(&field_key(FIELD_CHANNEL_COUNT))?,
            sample_rate: bundle.get(&field_key(FIELD_SAMPLE_RATE))?,
            encoder_delay: bundle.get_or(&field_key(FIELD_ENCODER_DELAY), 0)?,
            encoder_padding: bundle.get_or(&field_key(FIELD_ENCODER_PADDING), 0)?,
            accessibility_channel: bundle.get(&field_key(FIELD_ACCESSIBILITY_CHANNEL))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mime_types;

    #[test]
    fn test_bitrate_prefers_peak() {
        let format = Format::builder().average_bitrate(128_000).build();
        assert_eq!(format.bitrate(), Some(128_000));

        let format = format.build_upon().peak_bitrate(256_000).build();
        assert_eq!(format.bitrate(), Some(256_000));
    }

    #[test]
    fn test_log_string() {
        let format = Format::builder()
            .id("video-1")
            .sample_mime_type(mime_types::VIDEO_H264)
            .width(1920)
            .height(1080)
            .peak_bitrate(4_000_000)
            .build();
        assert_eq!(
            format.to_log_string(),
            "id=video-1, mimeType=video/avc, bitrate=4000000, res=1920x1080"
        );
    }

    #[test]
    fn test_bundle_keeps_initialization_data_order() {
        let format = Format::builder()
            .sample_mime_type(mime_types::AUDIO_AAC)
            .initialization_data(vec![vec![1, 2, 3], vec![4]])
            .channel_count(2)
            .sample_rate(48_000)
            .build();
        let restored = Format::from_bundle(&format.to_bundle()).unwrap();
        assert_eq!(restored, format);
        assert!(restored.initialization_data_equals(&format));
    }

    #[test]
    fn test_empty_bundle_is_default() {
        assert_eq!(Format::from_bundle(&Bundle::new()).unwrap(), Format::default());
    }
}
