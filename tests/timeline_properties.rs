//! Property tests for timeline structure and navigation

use proptest::prelude::*;

use ccplayer_common::player::RepeatMode;
use ccplayer_common::timeline::{self, Period, ShuffleOrder, StaticTimeline, Timeline, Uid, Window};

/// Builds a timeline with one window per entry of `layout`, each covering
/// the given number of periods of `period_duration_us`.
fn build_timeline(layout: &[usize], period_duration_us: i64, seed: u64) -> StaticTimeline {
    let mut windows = Vec::with_capacity(layout.len());
    let mut periods = Vec::new();
    for (window_index, period_count) in layout.iter().enumerate() {
        let first_period_index = periods.len();
        for offset in 0..*period_count {
            periods.push(Period {
                uid: Some(Uid::Int(periods.len() as i64)),
                window_index,
                duration_us: Some(period_duration_us),
                position_in_window_us: offset as i64 * period_duration_us,
                ..Period::default()
            });
        }
        windows.push(Window {
            uid: Uid::Int(window_index as i64),
            is_seekable: true,
            duration_us: Some(*period_count as i64 * period_duration_us),
            first_period_index,
            last_period_index: periods.len() - 1,
            ..Window::default()
        });
    }
    match StaticTimeline::new(windows, periods, ShuffleOrder::new(layout.len(), seed)) {
        Ok(timeline) => timeline,
        Err(e) => panic!("invalid layout {:?}: {}", layout, e),
    }
}

fn layout_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..4, 1..12)
}

fn repeat_mode_strategy() -> impl Strategy<Value = RepeatMode> {
    prop_oneof![Just(RepeatMode::Off), Just(RepeatMode::One), Just(RepeatMode::All)]
}

proptest! {
    #[test]
    fn test_windows_partition_periods(layout in layout_strategy(), seed in any::<u64>()) {
        let timeline = build_timeline(&layout, 1_000_000, seed);
        let mut expected_first = 0;
        for index in 0..timeline.window_count() {
            let window = timeline.window(index, 0);
            prop_assert!(window.first_period_index <= window.last_period_index);
            prop_assert_eq!(window.first_period_index, expected_first);
            expected_first = window.last_period_index + 1;
        }
        prop_assert_eq!(expected_first, timeline.period_count());
    }

    #[test]
    fn test_next_of_previous_is_identity(layout in layout_strategy()) {
        let timeline = build_timeline(&layout, 1_000_000, 0);
        for index in 1..timeline.window_count() {
            let previous = timeline.previous_window_index(index, RepeatMode::Off, false);
            prop_assert_eq!(previous, Some(index - 1));
            let next = previous.and_then(|previous| timeline.next_window_index(previous, RepeatMode::Off, false));
            prop_assert_eq!(next, Some(index));
        }
    }

    #[test]
    fn test_repeat_one_stays_on_window(layout in layout_strategy(), seed in any::<u64>(), shuffle in any::<bool>()) {
        let timeline = build_timeline(&layout, 1_000_000, seed);
        for index in 0..timeline.window_count() {
            prop_assert_eq!(timeline.next_window_index(index, RepeatMode::One, shuffle), Some(index));
            prop_assert_eq!(timeline.previous_window_index(index, RepeatMode::One, shuffle), Some(index));
        }
    }

    #[test]
    fn test_repeat_all_wraps_to_first(layout in layout_strategy(), seed in any::<u64>(), shuffle in any::<bool>()) {
        let timeline = build_timeline(&layout, 1_000_000, seed);
        let first = timeline.first_window_index(shuffle);
        let last = timeline.last_window_index(shuffle);
        prop_assert!(first.is_some() && last.is_some());
        if let (Some(first), Some(last)) = (first, last) {
            prop_assert_eq!(timeline.next_window_index(last, RepeatMode::All, shuffle), Some(first));
            prop_assert_eq!(timeline.previous_window_index(first, RepeatMode::All, shuffle), Some(last));
            prop_assert_eq!(timeline.next_window_index(last, RepeatMode::Off, shuffle), None);
        }
    }

    #[test]
    fn test_playback_order_is_permutation(layout in layout_strategy(), seed in any::<u64>(), shuffle in any::<bool>()) {
        let timeline = build_timeline(&layout, 1_000_000, seed);
        let mut order = timeline::playback_order(&timeline, shuffle);
        order.sort_unstable();
        prop_assert_eq!(order, (0..layout.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_period_position_is_clamped(
        layout in layout_strategy(),
        duration_us in 1i64..10_000_000,
        position_us in -20_000_000i64..60_000_000,
        repeat_mode in repeat_mode_strategy(),
    ) {
        let timeline = build_timeline(&layout, duration_us, 0);
        for window_index in 0..timeline.window_count() {
            let result = timeline.period_position_us(window_index, Some(position_us), 0);
            prop_assert!(result.is_some());
            if let Some((uid, period_position_us)) = result {
                prop_assert!(period_position_us >= 0);
                prop_assert!(period_position_us <= duration_us - 1);
                let period = timeline.period_by_uid(&uid);
                prop_assert!(period.map_or(false, |period| period.window_index == window_index));
            }
        }
        // Navigation does not depend on period layout
        let count = timeline.window_count();
        prop_assert_eq!(
            timeline.next_window_index(count - 1, repeat_mode, false),
            match repeat_mode {
                RepeatMode::Off => None,
                RepeatMode::One => Some(count - 1),
                RepeatMode::All => Some(0),
            }
        );
    }
}

#[test]
fn test_unknown_default_position_gives_none() {
    let timeline = StaticTimeline::new(
        vec![Window {
            uid: Uid::Int(0),
            default_position_us: None,
            ..Window::default()
        }],
        vec![Period {
            uid: Some(Uid::Int(0)),
            ..Period::default()
        }],
        ShuffleOrder::unshuffled(1),
    )
    .expect("valid timeline");

    assert_eq!(timeline.period_position_us(0, None, 0), None);
    assert_eq!(timeline.period_position_us(0, Some(500), 0), Some((Uid::Int(0), 500)));
}
