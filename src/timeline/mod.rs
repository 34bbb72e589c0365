//! Timeline model for ccplayer-common
//!
//! A [`Timeline`] is an immutable snapshot of the structure of the media the
//! player knows about. It consists of [`Window`]s, one per playlist entry,
//! each covering a contiguous range of [`Period`]s. Periods are laid out in
//! one flat sequence ordered by window.
//!
//! Implementations supply the positional accessors; navigation under repeat
//! and shuffle modes, position mapping and serialization are provided on top
//! of them.

pub mod ad_playback_state;
pub mod shuffle_order;
pub mod single_period;
pub mod static_timeline;

pub use ad_playback_state::{AdGroup, AdPlaybackState, AdState};
pub use shuffle_order::ShuffleOrder;
pub use single_period::SinglePeriodTimeline;
pub use static_timeline::StaticTimeline;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::bundle::{field_key, Bundle, BundleValue, Bundleable};
use crate::media::{LiveConfiguration, MediaItem};
use crate::player::RepeatMode;
use crate::utils;
use crate::utils::error::{MediaError, Result};

/// Identifier of a window or period, unique within a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Uid {
    Int(i64),
    Str(String),
}

impl Default for Uid {
    fn default() -> Self {
        Uid::Int(0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uid::Int(value) => write!(f, "{}", value),
            Uid::Str(value) => f.write_str(value),
        }
    }
}

impl From<Uid> for BundleValue {
    fn from(uid: Uid) -> Self {
        match uid {
            Uid::Int(value) => BundleValue::Int(value),
            Uid::Str(value) => BundleValue::String(value),
        }
    }
}

impl Uid {
    fn from_bundle_value(value: Option<&BundleValue>) -> Result<Option<Uid>> {
        match value {
            None => Ok(None),
            Some(BundleValue::Int(value)) => Ok(Some(Uid::Int(*value))),
            Some(BundleValue::String(value)) => Ok(Some(Uid::Str(value.clone()))),
            Some(other) => Err(MediaError::bundle(format!("invalid uid {:?}", other))),
        }
    }
}

/// One playlist entry within a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub uid: Uid,
    pub media_item: MediaItem,
    /// Start of the presentation in wall-clock time, for live streams.
    pub presentation_start_time_ms: Option<i64>,
    /// Wall-clock time of the window's start, for live streams.
    pub window_start_time_ms: Option<i64>,
    /// Unix time minus [`utils::elapsed_realtime_ms`] (the system-wide boot
    /// clock) when the window was created, if known.
    pub elapsed_realtime_epoch_offset_ms: Option<i64>,
    pub is_seekable: bool,
    /// Whether the window may change, e.g. a live stream's moving window.
    pub is_dynamic: bool,
    pub live_configuration: Option<LiveConfiguration>,
    pub is_placeholder: bool,
    pub default_position_us: Option<i64>,
    pub duration_us: Option<i64>,
    pub first_period_index: usize,
    pub last_period_index: usize,
    pub position_in_first_period_us: i64,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            uid: Uid::default(),
            media_item: MediaItem::empty(),
            presentation_start_time_ms: None,
            window_start_time_ms: None,
            elapsed_realtime_epoch_offset_ms: None,
            is_seekable: false,
            is_dynamic: false,
            live_configuration: None,
            is_placeholder: false,
            default_position_us: Some(0),
            duration_us: None,
            first_period_index: 0,
            last_period_index: 0,
            position_in_first_period_us: 0,
        }
    }
}

impl Window {
    pub fn is_live(&self) -> bool {
        self.live_configuration.is_some()
    }

    pub fn default_position_ms(&self) -> Option<i64> {
        utils::us_to_ms(self.default_position_us)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        utils::us_to_ms(self.duration_us)
    }

    pub fn position_in_first_period_ms(&self) -> i64 {
        self.position_in_first_period_us / 1000
    }

    pub fn period_count(&self) -> usize {
        self.last_period_index - self.first_period_index + 1
    }

    /// Current wall-clock time, corrected by the epoch offset when known.
    pub fn current_unix_time_ms(&self) -> i64 {
        utils::now_unix_time_ms(self.elapsed_realtime_epoch_offset_ms)
    }
}

const FIELD_WINDOW_UID: u32 = 0;
const FIELD_WINDOW_MEDIA_ITEM: u32 = 1;
const FIELD_WINDOW_PRESENTATION_START_TIME_MS: u32 = 2;
const FIELD_WINDOW_START_TIME_MS: u32 = 3;
const FIELD_WINDOW_ELAPSED_REALTIME_EPOCH_OFFSET_MS: u32 = 4;
const FIELD_WINDOW_IS_SEEKABLE: u32 = 5;
const FIELD_WINDOW_IS_DYNAMIC: u32 = 6;
const FIELD_WINDOW_LIVE_CONFIGURATION: u32 = 7;
const FIELD_WINDOW_IS_PLACEHOLDER: u32 = 8;
const FIELD_WINDOW_DEFAULT_POSITION_US: u32 = 9;
const FIELD_WINDOW_DURATION_US: u32 = 10;
const FIELD_WINDOW_FIRST_PERIOD_INDEX: u32 = 11;
const FIELD_WINDOW_LAST_PERIOD_INDEX: u32 = 12;
const FIELD_WINDOW_POSITION_IN_FIRST_PERIOD_US: u32 = 13;

impl Bundleable for Window {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_WINDOW_UID), self.uid.clone());
        if self.media_item != MediaItem::empty() {
            bundle.put_bundleable(field_key(FIELD_WINDOW_MEDIA_ITEM), &self.media_item);
        }
        bundle.put_opt(field_key(FIELD_WINDOW_PRESENTATION_START_TIME_MS), self.presentation_start_time_ms);
        bundle.put_opt(field_key(FIELD_WINDOW_START_TIME_MS), self.window_start_time_ms);
        bundle.put_opt(
            field_key(FIELD_WINDOW_ELAPSED_REALTIME_EPOCH_OFFSET_MS),
            self.elapsed_realtime_epoch_offset_ms,
        );
        if self.is_seekable {
            bundle.put(field_key(FIELD_WINDOW_IS_SEEKABLE), true);
        }
        if self.is_dynamic {
            bundle.put(field_key(FIELD_WINDOW_IS_DYNAMIC), true);
        }
        if let Some(live) = &self.live_configuration {
            bundle.put_bundleable(field_key(FIELD_WINDOW_LIVE_CONFIGURATION), live);
        }
        if self.is_placeholder {
            bundle.put(field_key(FIELD_WINDOW_IS_PLACEHOLDER), true);
        }
        bundle.put_opt(field_key(FIELD_WINDOW_DEFAULT_POSITION_US), self.default_position_us);
        bundle.put_opt(field_key(FIELD_WINDOW_DURATION_US), self.duration_us);
        if self.first_period_index != 0 {
            bundle.put(field_key(FIELD_WINDOW_FIRST_PERIOD_INDEX), self.first_period_index);
        }
        if self.last_period_index != 0 {
            bundle.put(field_key(FIELD_WINDOW_LAST_PERIOD_INDEX), self.last_period_index);
        }
        if self.position_in_first_period_us != 0 {
            bundle.put(field_key(FIELD_WINDOW_POSITION_IN_FIRST_PERIOD_US), self.position_in_first_period_us);
        }
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(Window {
            uid: Uid::from_bundle_value(bundle.get_raw(&field_key(FIELD_WINDOW_UID)))?.unwrap_or_default(),
            media_item: bundle
                .get_bundleable(&field_key(FIELD_WINDOW_MEDIA_ITEM))?
                .unwrap_or_default(),
            presentation_start_time_ms: bundle.get(&field_key(FIELD_WINDOW_PRESENTATION_START_TIME_MS))?,
            window_start_time_ms: bundle.get(&field_key(FIELD_WINDOW_START_TIME_MS))?,
            elapsed_realtime_epoch_offset_ms: bundle.get(&field_key(FIELD_WINDOW_ELAPSED_REALTIME_EPOCH_OFFSET_MS))?,
            is_seekable: bundle.get_or(&field_key(FIELD_WINDOW_IS_SEEKABLE), false)?,
            is_dynamic: bundle.get_or(&field_key(FIELD_WINDOW_IS_DYNAMIC), false)?,
            live_configuration: bundle.get_bundleable(&field_key(FIELD_WINDOW_LIVE_CONFIGURATION))?,
            is_placeholder: bundle.get_or(&field_key(FIELD_WINDOW_IS_PLACEHOLDER), false)?,
            default_position_us: bundle.get(&field_key(FIELD_WINDOW_DEFAULT_POSITION_US))?,
            duration_us: bundle.get(&field_key(FIELD_WINDOW_DURATION_US))?,
            first_period_index: bundle.get_or(&field_key(FIELD_WINDOW_FIRST_PERIOD_INDEX), 0)?,
            last_period_index: bundle.get_or(&field_key(FIELD_WINDOW_LAST_PERIOD_INDEX), 0)?,
            position_in_first_period_us: bundle.get_or(&field_key(FIELD_WINDOW_POSITION_IN_FIRST_PERIOD_US), 0)?,
        })
    }
}

/// A logical media segment, e.g. the content between two ad breaks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Period {
    /// Set only when the period was requested with ids.
    pub id: Option<String>,
    /// Set only when the period was requested with ids.
    pub uid: Option<Uid>,
    pub window_index: usize,
    pub duration_us: Option<i64>,
    /// Start of the period relative to its window; negative if the period
    /// starts before the window.
    pub position_in_window_us: i64,
    pub is_placeholder: bool,
    pub ad_playback_state: AdPlaybackState,
}

impl Period {
    pub fn duration_ms(&self) -> Option<i64> {
        utils::us_to_ms(self.duration_us)
    }

    pub fn position_in_window_ms(&self) -> i64 {
        self.position_in_window_us / 1000
    }

    pub fn ad_group_count(&self) -> usize {
        self.ad_playback_state.ad_group_count()
    }

    pub fn removed_ad_group_count(&self) -> usize {
        self.ad_playback_state.removed_ad_group_count()
    }

    pub fn ad_group_time_us(&self, ad_group_index: usize) -> i64 {
        self.ad_playback_state.ad_group(ad_group_index).time_us
    }

    pub fn first_ad_index_to_play(&self, ad_group_index: usize) -> usize {
        self.ad_playback_state.ad_group(ad_group_index).first_ad_index_to_play()
    }

    pub fn next_ad_index_to_play(&self, ad_group_index: usize, last_played_ad_index: usize) -> usize {
        self.ad_playback_state
            .ad_group(ad_group_index)
            .next_ad_index_to_play(Some(last_played_ad_index))
    }

    pub fn has_played_ad_group(&self, ad_group_index: usize) -> bool {
        !self.ad_playback_state.ad_group(ad_group_index).has_unplayed_ads()
    }

    pub fn ad_group_index_for_position_us(&self, position_us: i64) -> Option<usize> {
        self.ad_playback_state
            .ad_group_index_for_position_us(position_us, self.duration_us)
    }

    pub fn ad_group_index_after_position_us(&self, position_us: i64) -> Option<usize> {
        self.ad_playback_state
            .ad_group_index_after_position_us(position_us, self.duration_us)
    }

    pub fn ad_count_in_ad_group(&self, ad_group_index: usize) -> Option<usize> {
        self.ad_playback_state.ad_group(ad_group_index).count
    }

    pub fn ad_duration_us(&self, ad_group_index: usize, ad_index: usize) -> Option<i64> {
        self.ad_playback_state
            .ad_group(ad_group_index)
            .durations_us
            .get(ad_index)
            .copied()
            .flatten()
    }

    pub fn ad_resume_position_us(&self) -> i64 {
        self.ad_playback_state.ad_resume_position_us
    }

    pub fn content_resume_offset_us(&self, ad_group_index: usize) -> i64 {
        self.ad_playback_state.ad_group(ad_group_index).content_resume_offset_us
    }

    pub fn is_server_side_inserted_ad_group(&self, ad_group_index: usize) -> bool {
        self.ad_playback_state.ad_group(ad_group_index).is_server_side_inserted
    }
}

const FIELD_PERIOD_WINDOW_INDEX: u32 = 0;
const FIELD_PERIOD_DURATION_US: u32 = 1;
const FIELD_PERIOD_POSITION_IN_WINDOW_US: u32 = 2;
const FIELD_PERIOD_IS_PLACEHOLDER: u32 = 3;
const FIELD_PERIOD_AD_PLAYBACK_STATE: u32 = 4;
const FIELD_PERIOD_ID: u32 = 5;
const FIELD_PERIOD_UID: u32 = 6;

impl Bundleable for Period {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if self.window_index != 0 {
            bundle.put(field_key(FIELD_PERIOD_WINDOW_INDEX), self.window_index);
        }
        bundle.put_opt(field_key(FIELD_PERIOD_DURATION_US), self.duration_us);
        if self.position_in_window_us != 0 {
            bundle.put(field_key(FIELD_PERIOD_POSITION_IN_WINDOW_US), self.position_in_window_us);
        }
        if self.is_placeholder {
            bundle.put(field_key(FIELD_PERIOD_IS_PLACEHOLDER), true);
        }
        if self.ad_playback_state != AdPlaybackState::none() {
            bundle.put_bundleable(field_key(FIELD_PERIOD_AD_PLAYBACK_STATE), &self.ad_playback_state);
        }
        bundle.put_opt(field_key(FIELD_PERIOD_ID), self.id.clone());
        bundle.put_opt(field_key(FIELD_PERIOD_UID), self.uid.clone());
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(Period {
            id: bundle.get(&field_key(FIELD_PERIOD_ID))?,
            uid: Uid::from_bundle_value(bundle.get_raw(&field_key(FIELD_PERIOD_UID)))?,
            window_index: bundle.get_or(&field_key(FIELD_PERIOD_WINDOW_INDEX), 0)?,
            duration_us: bundle.get(&field_key(FIELD_PERIOD_DURATION_US))?,
            position_in_window_us: bundle.get_or(&field_key(FIELD_PERIOD_POSITION_IN_WINDOW_US), 0)?,
            is_placeholder: bundle.get_or(&field_key(FIELD_PERIOD_IS_PLACEHOLDER), false)?,
            ad_playback_state: bundle
                .get_bundleable(&field_key(FIELD_PERIOD_AD_PLAYBACK_STATE))?
                .unwrap_or_default(),
        })
    }
}

const FIELD_TIMELINE_WINDOWS: u32 = 0;
const FIELD_TIMELINE_PERIODS: u32 = 1;
const FIELD_TIMELINE_SHUFFLED_WINDOW_INDICES: u32 = 2;

/// An immutable view of windows and periods.
///
/// Positional accessors panic on out-of-range indices. Navigation returns
/// `None` when there is no neighbour in the requested direction.
pub trait Timeline: Send + Sync + fmt::Debug {
    fn window_count(&self) -> usize;

    /// Returns window `window_index`.
    ///
    /// # Arguments
    /// * `default_position_projection_us` - how far ahead to project the
    ///   default position of a dynamic window
    fn window(&self, window_index: usize, default_position_projection_us: i64) -> Window;

    fn period_count(&self) -> usize;

    /// Returns period `period_index`; `id` and `uid` are only filled in
    /// when `set_ids` is true.
    fn period(&self, period_index: usize, set_ids: bool) -> Period;

    fn index_of_period(&self, uid: &Uid) -> Option<usize>;

    fn uid_of_period(&self, period_index: usize) -> Uid;

    /// Shuffled playback order, for timelines that have one.
    fn shuffle_order(&self) -> Option<&ShuffleOrder> {
        None
    }

    fn is_empty(&self) -> bool {
        self.window_count() == 0
    }

    fn first_window_index(&self, shuffle_mode_enabled: bool) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.shuffle_order().filter(|_| shuffle_mode_enabled) {
            Some(order) => order.first_index(),
            None => Some(0),
        }
    }

    fn last_window_index(&self, shuffle_mode_enabled: bool) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.shuffle_order().filter(|_| shuffle_mode_enabled) {
            Some(order) => order.last_index(),
            None => Some(self.window_count() - 1),
        }
    }

    /// Index of the window played after `window_index`.
    fn next_window_index(&self, window_index: usize, repeat_mode: RepeatMode, shuffle_mode_enabled: bool) -> Option<usize> {
        match repeat_mode {
            RepeatMode::One => Some(window_index),
            RepeatMode::Off | RepeatMode::All => {
                if Some(window_index) == self.last_window_index(shuffle_mode_enabled) {
                    return match repeat_mode {
                        RepeatMode::All => self.first_window_index(shuffle_mode_enabled),
                        _ => None,
                    };
                }
                match self.shuffle_order().filter(|_| shuffle_mode_enabled) {
                    Some(order) => order.next_index(window_index),
                    None => Some(window_index + 1),
                }
            }
        }
    }

    /// Index of the window played before `window_index`.
    fn previous_window_index(
        &self,
        window_index: usize,
        repeat_mode: RepeatMode,
        shuffle_mode_enabled: bool,
    ) -> Option<usize> {
        match repeat_mode {
            RepeatMode::One => Some(window_index),
            RepeatMode::Off | RepeatMode::All => {
                if Some(window_index) == self.first_window_index(shuffle_mode_enabled) {
                    return match repeat_mode {
                        RepeatMode::All => self.last_window_index(shuffle_mode_enabled),
                        _ => None,
                    };
                }
                match self.shuffle_order().filter(|_| shuffle_mode_enabled) {
                    Some(order) => order.previous_index(window_index),
                    None => Some(window_index - 1),
                }
            }
        }
    }

    /// Index of the period played after `period_index`, crossing into the
    /// next window when the period is the last of its window.
    fn next_period_index(&self, period_index: usize, repeat_mode: RepeatMode, shuffle_mode_enabled: bool) -> Option<usize> {
        let window_index = self.period(period_index, false).window_index;
        if self.window(window_index, 0).last_period_index == period_index {
            let next_window_index = self.next_window_index(window_index, repeat_mode, shuffle_mode_enabled)?;
            Some(self.window(next_window_index, 0).first_period_index)
        } else {
            Some(period_index + 1)
        }
    }

    fn is_last_period(&self, period_index: usize, repeat_mode: RepeatMode, shuffle_mode_enabled: bool) -> bool {
        self.next_period_index(period_index, repeat_mode, shuffle_mode_enabled).is_none()
    }

    /// Maps a position in a window to the period containing it and the
    /// position within that period.
    ///
    /// A `window_position_us` of `None` uses the window's default position,
    /// projected by `default_position_projection_us`. Positions past the last
    /// period or before the first are clamped into the period found.
    ///
    /// # Returns
    /// The period uid and period position, or `None` if the default position
    /// is unknown.
    fn period_position_us(
        &self,
        window_index: usize,
        window_position_us: Option<i64>,
        default_position_projection_us: i64,
    ) -> Option<(Uid, i64)> {
        let window = self.window(window_index, default_position_projection_us);
        let window_position_us = match window_position_us {
            Some(position) => position,
            None => window.default_position_us?,
        };
        let mut period_index = window.first_period_index;
        let mut period = self.period(period_index, false);
        while period_index < window.last_period_index
            && period.position_in_window_us != window_position_us
            && self.period(period_index + 1, false).position_in_window_us <= window_position_us
        {
            period_index += 1;
            period = self.period(period_index, false);
        }
        let mut period_position_us = window_position_us - period.position_in_window_us;
        if let Some(duration_us) = period.duration_us {
            period_position_us = period_position_us.min(duration_us - 1);
        }
        period_position_us = period_position_us.max(0);
        Some((self.uid_of_period(period_index), period_position_us))
    }

    /// Looks up a period by uid, with ids filled in.
    fn period_by_uid(&self, uid: &Uid) -> Option<Period> {
        self.index_of_period(uid).map(|index| self.period(index, true))
    }

    /// Serializes windows, periods and the shuffled window order.
    fn to_bundle(&self) -> Bundle {
        let windows: Vec<Bundle> = (0..self.window_count())
            .map(|index| self.window(index, 0).to_bundle())
            .collect();
        let periods: Vec<Bundle> = (0..self.period_count())
            .map(|index| self.period(index, true).to_bundle())
            .collect();
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_TIMELINE_WINDOWS), windows);
        bundle.put(field_key(FIELD_TIMELINE_PERIODS), periods);
        bundle.put(
            field_key(FIELD_TIMELINE_SHUFFLED_WINDOW_INDICES),
            playback_order(self, true)
                .into_iter()
                .map(|index| index as i64)
                .collect::<Vec<_>>(),
        );
        bundle
    }
}

/// Window indices in playback order, walking with repeat mode off.
pub fn playback_order<T: Timeline + ?Sized>(timeline: &T, shuffle_mode_enabled: bool) -> Vec<usize> {
    let mut order = Vec::with_capacity(timeline.window_count());
    let mut next = timeline.first_window_index(shuffle_mode_enabled);
    while let Some(index) = next {
        order.push(index);
        next = timeline.next_window_index(index, RepeatMode::Off, shuffle_mode_enabled);
    }
    order
}

impl<'a> PartialEq for dyn Timeline + 'a {
    /// Structural equality over windows, periods (with ids) and the shuffled
    /// playback order.
    fn eq(&self, other: &Self) -> bool {
        if self.window_count() != other.window_count() || self.period_count() != other.period_count() {
            return false;
        }
        let windows_equal =
            (0..self.window_count()).all(|index| self.window(index, 0) == other.window(index, 0));
        let periods_equal =
            (0..self.period_count()).all(|index| self.period(index, true) == other.period(index, true));
        windows_equal && periods_equal && playback_order(self, true) == playback_order(other, true)
    }
}

static EMPTY: Lazy<Arc<dyn Timeline>> = Lazy::new(|| Arc::new(StaticTimeline::empty()));

/// The shared timeline without windows or periods.
pub fn empty() -> Arc<dyn Timeline> {
    Arc::clone(&EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_bundle_values() {
        let value: BundleValue = Uid::Str("a".to_string()).into();
        assert_eq!(Uid::from_bundle_value(Some(&value)).unwrap(), Some(Uid::Str("a".to_string())));
        assert!(Uid::from_bundle_value(Some(&BundleValue::Bool(true))).is_err());
        assert_eq!(Uid::from_bundle_value(None).unwrap(), None);
    }

    #[test]
    fn test_window_accessors() {
        let window = Window {
            duration_us: Some(10_500_000),
            default_position_us: Some(2_000_999),
            first_period_index: 2,
            last_period_index: 4,
            position_in_first_period_us: 1_500,
            ..Window::default()
        };
        assert_eq!(window.duration_ms(), Some(10_500));
        assert_eq!(window.default_position_ms(), Some(2_000));
        assert_eq!(window.position_in_first_period_ms(), 1);
        assert_eq!(window.period_count(), 3);
        assert!(!window.is_live());
    }

    #[test]
    fn test_window_bundle() {
        let window = Window {
            uid: Uid::Str("item-1".to_string()),
            media_item: MediaItem::from_uri("https://host/live.m3u8"),
            is_dynamic: true,
            live_configuration: Some(LiveConfiguration::UNSET),
            duration_us: None,
            window_start_time_ms: Some(1_700_000_000_000),
            last_period_index: 3,
            ..Window::default()
        };
        assert_eq!(Window::from_bundle(&window.to_bundle()).unwrap(), window);
    }

    #[test]
    fn test_period_ad_queries() {
        let period = Period {
            duration_us: Some(10_000_000),
            ad_playback_state: AdPlaybackState::new(None, &[2_000_000])
                .with_ad_count(0, 1)
                .unwrap()
                .with_ad_durations_us(vec![vec![Some(500_000)]])
                .unwrap(),
            ..Period::default()
        };
        assert_eq!(period.ad_group_count(), 1);
        assert_eq!(period.ad_group_index_after_position_us(0), Some(0));
        assert_eq!(period.ad_group_index_for_position_us(3_000_000), Some(0));
        assert_eq!(period.ad_duration_us(0, 0), Some(500_000));
        assert_eq!(period.ad_duration_us(0, 1), None);
        assert!(!period.has_played_ad_group(0));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = empty();
        assert!(timeline.is_empty());
        assert_eq!(timeline.first_window_index(false), None);
        assert_eq!(timeline.last_window_index(true), None);
        assert!(playback_order(timeline.as_ref(), false).is_empty());
    }
}
