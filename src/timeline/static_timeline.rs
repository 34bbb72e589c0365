//! Timeline backed by explicit window and period lists

use log::debug;
use std::collections::HashMap;

use super::{Period, ShuffleOrder, Timeline, Uid, Window};
use crate::bundle::{field_key, Bundle, Bundleable};
use crate::media::MediaItem;
use crate::utils::error::{check_argument, MediaError, Result};

/// A timeline holding its windows and periods in memory.
///
/// This is the form any timeline takes after deserialization, and the form
/// playlist-based players build from their media items.
#[derive(Debug, Clone)]
pub struct StaticTimeline {
    windows: Vec<Window>,
    periods: Vec<Period>,
    shuffle_order: ShuffleOrder,
    period_index_by_uid: HashMap<Uid, usize>,
}

impl StaticTimeline {
    pub fn empty() -> Self {
        Self {
            windows: Vec::new(),
            periods: Vec::new(),
            shuffle_order: ShuffleOrder::unshuffled(0),
            period_index_by_uid: HashMap::new(),
        }
    }

    /// Creates a timeline, checking the window/period layout.
    ///
    /// Every period needs a uid, unique within the timeline. Window period
    /// ranges must partition the period list in window order, and each
    /// period's `window_index` must name the window covering it.
    pub fn new(windows: Vec<Window>, periods: Vec<Period>, shuffle_order: ShuffleOrder) -> Result<Self> {
        check_argument(shuffle_order.len() == windows.len(), || {
            format!(
                "shuffle order covers {} windows, timeline has {}",
                shuffle_order.len(),
                windows.len()
            )
        })?;
        let mut expected_first = 0;
        for (window_index, window) in windows.iter().enumerate() {
            check_argument(
                window.first_period_index == expected_first && window.last_period_index >= window.first_period_index,
                || {
                    format!(
                        "window {} covers periods {}..={}, expected to start at {}",
                        window_index, window.first_period_index, window.last_period_index, expected_first
                    )
                },
            )?;
            check_argument(window.last_period_index < periods.len(), || {
                format!("window {} references missing period {}", window_index, window.last_period_index)
            })?;
            let mut previous_position = i64::MIN;
            for period in &periods[window.first_period_index..=window.last_period_index] {
                check_argument(period.window_index == window_index, || {
                    format!("period claims window {}, lies in {}", period.window_index, window_index)
                })?;
                check_argument(period.position_in_window_us >= previous_position, || {
                    format!("periods of window {} are not ordered by position", window_index)
                })?;
                previous_position = period.position_in_window_us;
            }
            expected_first = window.last_period_index + 1;
        }
        check_argument(expected_first == periods.len(), || {
            format!("{} periods are not covered by any window", periods.len() - expected_first)
        })?;

        let mut period_index_by_uid = HashMap::with_capacity(periods.len());
        for (index, period) in periods.iter().enumerate() {
            let uid = period
                .uid
                .clone()
                .ok_or_else(|| MediaError::invalid_argument(format!("period {} has no uid", index)))?;
            check_argument(period_index_by_uid.insert(uid.clone(), index).is_none(), || {
                format!("duplicate period uid {}", uid)
            })?;
        }

        debug!(
            "Created timeline with {} windows and {} periods",
            windows.len(),
            periods.len()
        );
        Ok(Self {
            windows,
            periods,
            shuffle_order,
            period_index_by_uid,
        })
    }

    /// Creates a timeline with one single-period window per media item.
    ///
    /// Window and period uids come from `items`; durations are read from
    /// each item's metadata, and items with live settings become dynamic
    /// live windows.
    pub fn from_media_items(items: &[(Uid, MediaItem)], shuffle_order: ShuffleOrder) -> Result<Self> {
        let mut windows = Vec::with_capacity(items.len());
        let mut periods = Vec::with_capacity(items.len());
        for (index, (uid, media_item)) in items.iter().enumerate() {
            let duration_us = media_item
                .media_metadata
                .duration_ms
                .map(|duration_ms| duration_ms.saturating_mul(1000));
            let is_live = media_item.is_live();
            windows.push(Window {
                uid: uid.clone(),
                media_item: media_item.clone(),
                is_seekable: !is_live || duration_us.is_some(),
                is_dynamic: is_live,
                live_configuration: is_live.then_some(media_item.live_configuration),
                default_position_us: Some(media_item.clipping_configuration.start_position_us()),
                duration_us,
                first_period_index: index,
                last_period_index: index,
                ..Window::default()
            });
            periods.push(Period {
                id: Some(media_item.media_id.clone()),
                uid: Some(uid.clone()),
                window_index: index,
                duration_us,
                ..Period::default()
            });
        }
        Self::new(windows, periods, shuffle_order)
    }

    /// Rebuilds a timeline written by [`Timeline::to_bundle`].
    ///
    /// Periods without a serialized uid get their index as uid.
    pub fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let windows: Vec<Window> = bundle.get_bundleable_list(&field_key(super::FIELD_TIMELINE_WINDOWS))?;
        let mut periods: Vec<Period> = bundle.get_bundleable_list(&field_key(super::FIELD_TIMELINE_PERIODS))?;
        for (index, period) in periods.iter_mut().enumerate() {
            if period.uid.is_none() {
                period.uid = Some(Uid::Int(index as i64));
            }
        }
        let shuffle_order = match bundle.get::<Vec<i64>>(&field_key(super::FIELD_TIMELINE_SHUFFLED_WINDOW_INDICES))? {
            Some(indices) => {
                let indices = indices
                    .into_iter()
                    .map(|index| {
                        usize::try_from(index)
                            .map_err(|_| MediaError::bundle(format!("invalid window index {}", index)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                ShuffleOrder::from_indices(indices, 0)?
            }
            None => ShuffleOrder::unshuffled(windows.len()),
        };
        Self::new(windows, periods, shuffle_order)
    }

    /// Returns a copy using `shuffle_order`, which must cover every window.
    pub fn with_shuffle_order(&self, shuffle_order: ShuffleOrder) -> Result<Self> {
        Self::new(self.windows.clone(), self.periods.clone(), shuffle_order)
    }
}

impl Timeline for StaticTimeline {
    fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn window(&self, window_index: usize, _default_position_projection_us: i64) -> Window {
        self.windows[window_index].clone()
    }

    fn period_count(&self) -> usize {
        self.periods.len()
    }

    fn period(&self, period_index: usize, set_ids: bool) -> Period {
        let mut period = self.periods[period_index].clone();
        if !set_ids {
            period.id = None;
            period.uid = None;
        }
        period
    }

    fn index_of_period(&self, uid: &Uid) -> Option<usize> {
        self.period_index_by_uid.get(uid).copied()
    }

    fn uid_of_period(&self, period_index: usize) -> Uid {
        self.periods[period_index].uid.clone().unwrap_or_default()
    }

    fn shuffle_order(&self) -> Option<&ShuffleOrder> {
        Some(&self.shuffle_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::RepeatMode;
    use crate::timeline::playback_order;

    fn window(first: usize, last: usize, duration_us: i64) -> Window {
        Window {
            uid: Uid::Int(first as i64),
            duration_us: Some(duration_us),
            is_seekable: true,
            first_period_index: first,
            last_period_index: last,
            ..Window::default()
        }
    }

    fn period(uid: i64, window_index: usize, position_in_window_us: i64, duration_us: i64) -> Period {
        Period {
            uid: Some(Uid::Int(uid)),
            window_index,
            position_in_window_us,
            duration_us: Some(duration_us),
            ..Period::default()
        }
    }

    /// Window 0 has three periods of 2s, 3s and 5s; window 1 has one of 5s.
    fn multi_period_timeline() -> StaticTimeline {
        StaticTimeline::new(
            vec![window(0, 2, 10_000_000), window(3, 3, 5_000_000)],
            vec![
                period(10, 0, 0, 2_000_000),
                period(11, 0, 2_000_000, 3_000_000),
                period(12, 0, 5_000_000, 5_000_000),
                period(20, 1, 0, 5_000_000),
            ],
            ShuffleOrder::unshuffled(2),
        )
        .unwrap()
    }

    #[test]
    fn test_layout_validation() {
        let gap = StaticTimeline::new(
            vec![window(0, 0, 1), window(2, 2, 1)],
            vec![period(0, 0, 0, 1), period(1, 0, 0, 1), period(2, 1, 0, 1)],
            ShuffleOrder::unshuffled(2),
        );
        assert!(gap.is_err());

        let wrong_window = StaticTimeline::new(
            vec![window(0, 0, 1)],
            vec![period(0, 1, 0, 1)],
            ShuffleOrder::unshuffled(1),
        );
        assert!(wrong_window.is_err());

        let duplicate_uid = StaticTimeline::new(
            vec![window(0, 1, 1)],
            vec![period(0, 0, 0, 1), period(0, 0, 1, 1)],
            ShuffleOrder::unshuffled(1),
        );
        assert!(duplicate_uid.is_err());
    }

    #[test]
    fn test_period_position_mapping() {
        let timeline = multi_period_timeline();
        assert_eq!(timeline.period_position_us(0, Some(0), 0), Some((Uid::Int(10), 0)));
        assert_eq!(timeline.period_position_us(0, Some(2_500_000), 0), Some((Uid::Int(11), 500_000)));
        assert_eq!(timeline.period_position_us(0, Some(5_000_000), 0), Some((Uid::Int(12), 0)));
        // Past the window end, clamped to the last microsecond of the last period.
        assert_eq!(timeline.period_position_us(0, Some(20_000_000), 0), Some((Uid::Int(12), 4_999_999)));
        assert_eq!(timeline.period_position_us(0, Some(-1), 0), Some((Uid::Int(10), 0)));
        // Default position of window 1.
        assert_eq!(timeline.period_position_us(1, None, 0), Some((Uid::Int(20), 0)));
    }

    #[test]
    fn test_next_period_crosses_windows() {
        let timeline = multi_period_timeline();
        assert_eq!(timeline.next_period_index(0, RepeatMode::Off, false), Some(1));
        assert_eq!(timeline.next_period_index(2, RepeatMode::Off, false), Some(3));
        assert_eq!(timeline.next_period_index(3, RepeatMode::Off, false), None);
        assert!(timeline.is_last_period(3, RepeatMode::Off, false));
        assert_eq!(timeline.next_period_index(3, RepeatMode::All, false), Some(0));
        assert_eq!(timeline.next_period_index(2, RepeatMode::One, false), Some(0));
    }

    #[test]
    fn test_period_ids_only_when_requested() {
        let timeline = multi_period_timeline();
        assert_eq!(timeline.period(1, false).uid, None);
        assert_eq!(timeline.period(1, true).uid, Some(Uid::Int(11)));
        assert_eq!(timeline.index_of_period(&Uid::Int(20)), Some(3));
        assert_eq!(timeline.period_by_uid(&Uid::Int(12)).map(|p| p.position_in_window_us), Some(5_000_000));
        assert_eq!(timeline.index_of_period(&Uid::Int(99)), None);
    }

    #[test]
    fn test_shuffled_navigation() {
        let items: Vec<(Uid, MediaItem)> = (0..3).map(|i| (Uid::Int(i), MediaItem::empty())).collect();
        let timeline =
            StaticTimeline::from_media_items(&items, ShuffleOrder::from_indices(vec![1, 2, 0], 0).unwrap()).unwrap();
        assert_eq!(playback_order(&timeline, true), vec![1, 2, 0]);
        assert_eq!(playback_order(&timeline, false), vec![0, 1, 2]);
        assert_eq!(timeline.next_window_index(0, RepeatMode::All, true), Some(1));
        assert_eq!(timeline.previous_window_index(1, RepeatMode::All, true), Some(0));
        assert_eq!(timeline.previous_window_index(1, RepeatMode::Off, true), None);
    }

    #[test]
    fn test_bundle_round_trip() {
        let timeline = multi_period_timeline()
            .with_shuffle_order(ShuffleOrder::from_indices(vec![1, 0], 0).unwrap())
            .unwrap();
        let restored = StaticTimeline::from_bundle(&timeline.to_bundle()).unwrap();
        let original: &dyn Timeline = &timeline;
        let restored: &dyn Timeline = &restored;
        assert!(original == restored);

        let unshuffled: &dyn Timeline = &multi_period_timeline();
        assert!(original != unshuffled);
    }
}
