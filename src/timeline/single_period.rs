//! Timeline with one window covering one period

use super::{Period, Timeline, Uid, Window};
use crate::media::{LiveConfiguration, MediaItem};

/// Uid of the only period of a [`SinglePeriodTimeline`].
pub const PERIOD_UID: &str = "single-period";
/// Uid of the only window of a [`SinglePeriodTimeline`].
pub const WINDOW_UID: &str = "single-window";

/// A timeline with exactly one window and one period.
///
/// The window may start part way into the period. For dynamic windows the
/// default position can be projected forward; a projection that moves it past
/// the end of the window, or one applied to a window of unknown duration,
/// makes the default position unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePeriodTimeline {
    presentation_start_time_ms: Option<i64>,
    window_start_time_ms: Option<i64>,
    elapsed_realtime_epoch_offset_ms: Option<i64>,
    period_duration_us: Option<i64>,
    window_duration_us: Option<i64>,
    window_position_in_period_us: i64,
    window_default_start_position_us: Option<i64>,
    is_seekable: bool,
    is_dynamic: bool,
    suppress_position_projection: bool,
    media_item: MediaItem,
    live_configuration: Option<LiveConfiguration>,
}

impl SinglePeriodTimeline {
    /// Creates a timeline whose window spans the whole period.
    ///
    /// Live items (with live settings) get a live window.
    pub fn new(duration_us: Option<i64>, is_seekable: bool, is_dynamic: bool, media_item: MediaItem) -> Self {
        let live_configuration = media_item.is_live().then_some(media_item.live_configuration);
        Self {
            presentation_start_time_ms: None,
            window_start_time_ms: None,
            elapsed_realtime_epoch_offset_ms: None,
            period_duration_us: duration_us,
            window_duration_us: duration_us,
            window_position_in_period_us: 0,
            window_default_start_position_us: Some(0),
            is_seekable,
            is_dynamic,
            suppress_position_projection: false,
            media_item,
            live_configuration,
        }
    }

    /// Places a window of `window_duration_us` at `window_position_in_period_us`
    /// within the period, with the given default start position.
    pub fn with_window(
        mut self,
        window_duration_us: Option<i64>,
        window_position_in_period_us: i64,
        window_default_start_position_us: Option<i64>,
    ) -> Self {
        self.window_duration_us = window_duration_us;
        self.window_position_in_period_us = window_position_in_period_us;
        self.window_default_start_position_us = window_default_start_position_us;
        self
    }

    /// Sets the wall-clock anchors of a live stream.
    pub fn with_wall_clock(
        mut self,
        presentation_start_time_ms: Option<i64>,
        window_start_time_ms: Option<i64>,
        elapsed_realtime_epoch_offset_ms: Option<i64>,
    ) -> Self {
        self.presentation_start_time_ms = presentation_start_time_ms;
        self.window_start_time_ms = window_start_time_ms;
        self.elapsed_realtime_epoch_offset_ms = elapsed_realtime_epoch_offset_ms;
        self
    }

    pub fn with_live_configuration(mut self, live_configuration: Option<LiveConfiguration>) -> Self {
        self.live_configuration = live_configuration;
        self
    }

    /// Keeps the default position fixed whatever projection is requested.
    pub fn with_suppressed_position_projection(mut self) -> Self {
        self.suppress_position_projection = true;
        self
    }

    fn period_uid() -> Uid {
        Uid::Str(PERIOD_UID.to_string())
    }
}

impl Timeline for SinglePeriodTimeline {
    fn window_count(&self) -> usize {
        1
    }

    fn window(&self, window_index: usize, default_position_projection_us: i64) -> Window {
        assert_eq!(window_index, 0, "window index {} out of range", window_index);
        let mut default_position_us = self.window_default_start_position_us;
        if self.is_dynamic && !self.suppress_position_projection && default_position_projection_us != 0 {
            default_position_us = match (self.window_duration_us, default_position_us) {
                (Some(duration_us), Some(position_us)) => {
                    Some(position_us + default_position_projection_us).filter(|projected| *projected <= duration_us)
                }
                _ => None,
            };
        }
        Window {
            uid: Uid::Str(WINDOW_UID.to_string()),
            media_item: self.media_item.clone(),
            presentation_start_time_ms: self.presentation_start_time_ms,
            window_start_time_ms: self.window_start_time_ms,
            elapsed_realtime_epoch_offset_ms: self.elapsed_realtime_epoch_offset_ms,
            is_seekable: self.is_seekable,
            is_dynamic: self.is_dynamic,
            live_configuration: self.live_configuration,
            is_placeholder: false,
            default_position_us,
            duration_us: self.window_duration_us,
            first_period_index: 0,
            last_period_index: 0,
            position_in_first_period_us: self.window_position_in_period_us,
        }
    }

    fn period_count(&self) -> usize {
        1
    }

    fn period(&self, period_index: usize, set_ids: bool) -> Period {
        assert_eq!(period_index, 0, "period index {} out of range", period_index);
        Period {
            id: None,
            uid: set_ids.then(Self::period_uid),
            window_index: 0,
            duration_us: self.period_duration_us,
            position_in_window_us: -self.window_position_in_period_us,
            ..Period::default()
        }
    }

    fn index_of_period(&self, uid: &Uid) -> Option<usize> {
        (*uid == Self::period_uid()).then_some(0)
    }

    fn uid_of_period(&self, period_index: usize) -> Uid {
        assert_eq!(period_index, 0, "period index {} out of range", period_index);
        Self::period_uid()
    }
}
