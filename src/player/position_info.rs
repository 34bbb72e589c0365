//! Snapshot of a playback position, used by discontinuity callbacks

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::media::MediaItem;
use crate::timeline::Uid;
use crate::utils::error::Result;

/// Where playback was (or is) within a timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionInfo {
    /// Uid of the window; not serialized.
    pub window_uid: Option<Uid>,
    pub media_item_index: usize,
    pub media_item: Option<MediaItem>,
    /// Uid of the period; not serialized.
    pub period_uid: Option<Uid>,
    pub period_index: usize,
    /// Position in the media item, or in the ad while an ad plays.
    pub position_ms: i64,
    /// Content position; equals `position_ms` unless an ad plays.
    pub content_position_ms: i64,
    pub ad_group_index: Option<usize>,
    pub ad_index_in_ad_group: Option<usize>,
}

impl PositionInfo {
    pub fn is_playing_ad(&self) -> bool {
        self.ad_group_index.is_some()
    }

    /// Compares the fields that survive a bundle round trip.
    pub fn equals_for_bundling(&self, other: &PositionInfo) -> bool {
        self.media_item_index == other.media_item_index
            && self.period_index == other.period_index
            && self.position_ms == other.position_ms
            && self.content_position_ms == other.content_position_ms
            && self.ad_group_index == other.ad_group_index
            && self.ad_index_in_ad_group == other.ad_index_in_ad_group
            && self.media_item == other.media_item
    }
}

const FIELD_MEDIA_ITEM_INDEX: u32 = 0;
const FIELD_MEDIA_ITEM: u32 = 1;
const FIELD_PERIOD_INDEX: u32 = 2;
const FIELD_POSITION_MS: u32 = 3;
const FIELD_CONTENT_POSITION_MS: u32 = 4;
const FIELD_AD_GROUP_INDEX: u32 = 5;
const FIELD_AD_INDEX_IN_AD_GROUP: u32 = 6;

impl Bundleable for PositionInfo {
    /// Zero and absent values are omitted.
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if self.media_item_index != 0 {
            bundle.put(field_key(FIELD_MEDIA_ITEM_INDEX), self.media_item_index as i64);
        }
        if let Some(media_item) = &self.media_item {
            bundle.put_bundleable(field_key(FIELD_MEDIA_ITEM), media_item);
        }
        if self.period_index != 0 {
            bundle.put(field_key(FIELD_PERIOD_INDEX), self.period_index as i64);
        }
        if self.position_ms != 0 {
            bundle.put(field_key(FIELD_POSITION_MS), self.position_ms);
        }
        if self.content_position_ms != 0 {
            bundle.put(field_key(FIELD_CONTENT_POSITION_MS), self.content_position_ms);
        }
        bundle.put_opt(field_key(FIELD_AD_GROUP_INDEX), self.ad_group_index.map(|i| i as i64));
        bundle.put_opt(
            field_key(FIELD_AD_INDEX_IN_AD_GROUP),
            self.ad_index_in_ad_group.map(|i| i as i64),
        );
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(Self {
            window_uid: None,
            media_item_index: bundle.get_or::<usize>(&field_key(FIELD_MEDIA_ITEM_INDEX), 0)?,
            media_item: bundle.get_bundleable(&field_key(FIELD_MEDIA_ITEM))?,
            period_uid: None,
            period_index: bundle.get_or::<usize>(&field_key(FIELD_PERIOD_INDEX), 0)?,
            position_ms: bundle.get_or::<i64>(&field_key(FIELD_POSITION_MS), 0)?,
            content_position_ms: bundle.get_or::<i64>(&field_key(FIELD_CONTENT_POSITION_MS), 0)?,
            ad_group_index: bundle.get::<usize>(&field_key(FIELD_AD_GROUP_INDEX))?,
            ad_index_in_ad_group: bundle.get::<usize>(&field_key(FIELD_AD_INDEX_IN_AD_GROUP))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_drops_uids() {
        let info = PositionInfo {
            window_uid: Some(Uid::Int(3)),
            media_item_index: 2,
            media_item: Some(MediaItem::from_uri("https://example.com/a.mp4")),
            period_uid: Some(Uid::Int(3)),
            period_index: 2,
            position_ms: 1500,
            content_position_ms: 9000,
            ad_group_index: Some(0),
            ad_index_in_ad_group: Some(1),
        };
        let restored = PositionInfo::from_bundle(&info.to_bundle()).unwrap();
        assert!(restored.equals_for_bundling(&info));
        assert_ne!(restored, info);
        assert_eq!(restored.window_uid, None);
        assert!(restored.is_playing_ad());
    }

    #[test]
    fn test_default_bundle_is_empty() {
        assert!(PositionInfo::default().to_bundle().is_empty());
    }
}
