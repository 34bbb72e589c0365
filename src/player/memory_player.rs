//! In-memory player
//!
//! [`MemoryPlayer`] keeps a playlist, a timeline built from it and the
//! playback state without rendering anything. Media is "loaded" instantly and
//! time only moves when [`MemoryPlayer::advance`] is called, which makes it
//! suitable for driving navigation logic in tools and tests.
//!
//! Every mutation takes a snapshot of the observable state before and after
//! the change, queues one listener callback per field that differs, and
//! flushes after the state lock is released.

use log::{debug, error, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use super::{
    base_player, Command, Commands, DiscontinuityReason, Event, Listener, ListenerSet,
    MediaItemTransitionReason, PlayWhenReadyChangeReason, PlaybackException, PlaybackState,
    PlaybackSuppressionReason, Player, PositionInfo, RepeatMode, TimelineChangeReason,
};
use crate::media::{DeviceInfo, MediaItem, MediaMetadata, PlaybackParameters, PlaybackType, Tracks};
use crate::timeline::{self, ShuffleOrder, StaticTimeline, Timeline, Uid, Window};
use crate::utils::PlayerConfig;

/// Commands that do not depend on the playback position or playlist.
const PERMANENT_COMMANDS: &[Command] = &[
    Command::PlayPause,
    Command::Prepare,
    Command::Stop,
    Command::SetSpeedAndPitch,
    Command::SetShuffleMode,
    Command::SetRepeatMode,
    Command::GetCurrentMediaItem,
    Command::GetTimeline,
    Command::GetMetadata,
    Command::SetPlaylistMetadata,
    Command::SetMediaItem,
    Command::ChangeMediaItems,
    Command::GetTracks,
    Command::GetVolume,
    Command::SetVolume,
    Command::GetDeviceVolume,
    Command::SetDeviceVolume,
    Command::AdjustDeviceVolume,
    Command::Release,
];

const DEFAULT_DEVICE_INFO: DeviceInfo = DeviceInfo {
    playback_type: PlaybackType::Local,
    min_volume: 0,
    max_volume: 100,
    routing_controller_id: None,
};

struct PlayerState {
    items: Vec<(Uid, MediaItem)>,
    next_uid: i64,
    shuffle_order: ShuffleOrder,
    timeline: Arc<dyn Timeline>,
    current_index: usize,
    position_ms: i64,
    buffered_position_ms: i64,
    playback_state: PlaybackState,
    play_when_ready: bool,
    suppression_reason: PlaybackSuppressionReason,
    repeat_mode: RepeatMode,
    shuffle_mode_enabled: bool,
    is_loading: bool,
    playback_parameters: PlaybackParameters,
    playlist_metadata: MediaMetadata,
    player_error: Option<PlaybackException>,
    tracks: Tracks,
    volume: f32,
    device_info: DeviceInfo,
    device_volume: i32,
    device_muted: bool,
    seek_back_increment_ms: i64,
    seek_forward_increment_ms: i64,
    max_seek_to_previous_position_ms: i64,
    available_commands: Commands,
    /// Ad group and ad index while an ad plays.
    playing_ad: Option<(usize, usize)>,
    released: bool,
}

/// Where playback starts in a new playlist.
enum Start {
    /// The default position of the first item in playback order.
    Default,
    /// The current index and position, if still valid.
    Keep,
    At(usize, Option<i64>),
}

/// What a mutation wants reported beyond the plain field differences.
#[derive(Default)]
struct Notes {
    transition_reason: Option<MediaItemTransitionReason>,
    /// Report a transition even if the current item did not change.
    force_transition: bool,
    discontinuity: Option<(PositionInfo, DiscontinuityReason)>,
    play_when_ready_reason: Option<PlayWhenReadyChangeReason>,
}

/// The observable state compared before and after a mutation.
struct Snapshot {
    timeline: Arc<dyn Timeline>,
    current_uid: Option<Uid>,
    current_item: Option<MediaItem>,
    media_metadata: MediaMetadata,
    playlist_metadata: MediaMetadata,
    tracks: Tracks,
    is_loading: bool,
    playback_state: PlaybackState,
    play_when_ready: bool,
    suppression_reason: PlaybackSuppressionReason,
    is_playing: bool,
    repeat_mode: RepeatMode,
    shuffle_mode_enabled: bool,
    player_error: Option<PlaybackException>,
    playback_parameters: PlaybackParameters,
    volume: f32,
    device_info: DeviceInfo,
    device_volume: i32,
    device_muted: bool,
}

impl PlayerState {
    fn new(config: &PlayerConfig, shuffle_seed: u64) -> Self {
        Self {
            items: Vec::new(),
            next_uid: 0,
            shuffle_order: ShuffleOrder::new(0, shuffle_seed),
            timeline: timeline::empty(),
            current_index: 0,
            position_ms: 0,
            buffered_position_ms: 0,
            playback_state: PlaybackState::Idle,
            play_when_ready: false,
            suppression_reason: PlaybackSuppressionReason::None,
            repeat_mode: RepeatMode::Off,
            shuffle_mode_enabled: false,
            is_loading: false,
            playback_parameters: PlaybackParameters::DEFAULT,
            playlist_metadata: MediaMetadata::empty(),
            player_error: None,
            tracks: Tracks::empty(),
            volume: 1.0,
            device_info: DEFAULT_DEVICE_INFO,
            device_volume: DEFAULT_DEVICE_INFO.max_volume,
            device_muted: false,
            seek_back_increment_ms: config.seek_back_increment_ms,
            seek_forward_increment_ms: config.seek_forward_increment_ms,
            max_seek_to_previous_position_ms: config.max_seek_to_previous_position_ms,
            available_commands: Commands::EMPTY,
            playing_ad: None,
            released: false,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            timeline: self.timeline.clone(),
            current_uid: self.items.get(self.current_index).map(|(uid, _)| uid.clone()),
            current_item: self.current_item().cloned(),
            media_metadata: self.media_metadata(),
            playlist_metadata: self.playlist_metadata.clone(),
            tracks: self.tracks.clone(),
            is_loading: self.is_loading,
            playback_state: self.playback_state,
            play_when_ready: self.play_when_ready,
            suppression_reason: self.suppression_reason,
            is_playing: self.is_playing(),
            repeat_mode: self.repeat_mode,
            shuffle_mode_enabled: self.shuffle_mode_enabled,
            player_error: self.player_error.clone(),
            playback_parameters: self.playback_parameters,
            volume: self.volume,
            device_info: self.device_info.clone(),
            device_volume: self.device_volume,
            device_muted: self.device_muted,
        }
    }

    fn is_playing(&self) -> bool {
        self.playback_state == PlaybackState::Ready
            && self.play_when_ready
            && self.suppression_reason == PlaybackSuppressionReason::None
    }

    fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.current_index).map(|(_, item)| item)
    }

    fn media_metadata(&self) -> MediaMetadata {
        self.current_item()
            .map(|item| item.media_metadata.clone())
            .unwrap_or_default()
    }

    fn window(&self) -> Option<Window> {
        (self.current_index < self.timeline.window_count()).then(|| self.timeline.window(self.current_index, 0))
    }

    fn duration_ms(&self) -> Option<i64> {
        self.window().and_then(|window| window.duration_ms())
    }

    fn default_position_ms(&self, index: usize) -> i64 {
        if index >= self.timeline.window_count() {
            return 0;
        }
        self.timeline.window(index, 0).default_position_ms().unwrap_or(0)
    }

    fn clamp_position(&self, position_ms: i64) -> i64 {
        match self.duration_ms() {
            Some(duration_ms) => position_ms.min(duration_ms).max(0),
            None => position_ms.max(0),
        }
    }

    fn position_info(&self) -> PositionInfo {
        let window = self.window();
        let period_index = window.as_ref().map_or(0, |window| window.first_period_index);
        PositionInfo {
            window_uid: window.as_ref().map(|window| window.uid.clone()),
            media_item_index: self.current_index,
            media_item: window.map(|window| window.media_item),
            period_uid: (period_index < self.timeline.period_count())
                .then(|| self.timeline.uid_of_period(period_index)),
            period_index,
            position_ms: self.position_ms,
            content_position_ms: self.position_ms,
            ad_group_index: self.playing_ad.map(|(ad_group_index, _)| ad_group_index),
            ad_index_in_ad_group: self.playing_ad.map(|(_, ad_index)| ad_index),
        }
    }

    fn next_uid(&mut self) -> Uid {
        let uid = Uid::Int(self.next_uid);
        self.next_uid += 1;
        uid
    }

    fn rebuild_timeline(&mut self) {
        self.timeline = match StaticTimeline::from_media_items(&self.items, self.shuffle_order.clone()) {
            Ok(timeline) => Arc::new(timeline),
            Err(e) => {
                error!("Failed to build timeline for {} items: {}", self.items.len(), e);
                timeline::empty()
            }
        };
    }

    /// Moves to the default position of `index` and syncs the buffer.
    fn reset_position(&mut self, index: usize) {
        self.current_index = index;
        self.playing_ad = None;
        self.position_ms = self.default_position_ms(index);
        self.buffered_position_ms = self.position_ms;
    }

    fn set_playlist(&mut self, media_items: Vec<MediaItem>, start: Start) {
        let items: Vec<(Uid, MediaItem)> = media_items.into_iter().map(|item| (self.next_uid(), item)).collect();
        self.shuffle_order = self.shuffle_order.clone_and_clear().clone_and_insert(0, items.len());
        self.items = items;
        self.rebuild_timeline();
        match start {
            Start::Default => {
                let first = self.timeline.first_window_index(self.shuffle_mode_enabled).unwrap_or(0);
                self.reset_position(first);
            }
            Start::At(index, position_ms) => {
                self.reset_position(index);
                if let Some(position_ms) = position_ms {
                    self.position_ms = self.clamp_position(position_ms);
                    self.buffered_position_ms = self.position_ms;
                }
            }
            Start::Keep if self.current_index >= self.items.len() => self.reset_position(0),
            Start::Keep => self.position_ms = self.clamp_position(self.position_ms),
        }
        self.settle_playback_state();
    }

    fn insert_items(&mut self, index: usize, media_items: Vec<MediaItem>) {
        let was_empty = self.items.is_empty();
        let index = index.min(self.items.len());
        let count = media_items.len();
        let new_items: Vec<(Uid, MediaItem)> = media_items.into_iter().map(|item| (self.next_uid(), item)).collect();
        self.items.splice(index..index, new_items);
        self.shuffle_order = self.shuffle_order.clone_and_insert(index, count);
        if !was_empty && self.current_index >= index {
            self.current_index += count;
        }
        self.rebuild_timeline();
        if was_empty {
            self.reset_position(0);
            self.settle_playback_state();
        }
    }

    /// Removes `from..to` and returns whether the current item was removed.
    fn remove_items(&mut self, from: usize, to: usize) -> bool {
        let count = to - from;
        let current_removed = (from..to).contains(&self.current_index);
        self.items.drain(from..to);
        self.shuffle_order = self.shuffle_order.clone_and_remove(from, to);
        self.rebuild_timeline();
        if self.current_index >= to {
            self.current_index -= count;
        } else if current_removed {
            if self.items.is_empty() {
                self.reset_position(0);
            } else if from < self.items.len() {
                self.reset_position(from);
            } else if self.repeat_mode == RepeatMode::All {
                let first = self.timeline.first_window_index(self.shuffle_mode_enabled).unwrap_or(0);
                self.reset_position(first);
            } else {
                self.current_index = self.items.len() - 1;
                self.position_ms = self.duration_ms().unwrap_or(0);
                self.buffered_position_ms = self.position_ms;
                if self.playback_state != PlaybackState::Idle {
                    self.playback_state = PlaybackState::Ended;
                }
            }
        }
        self.settle_playback_state();
        current_removed
    }

    /// An empty playlist ends a prepared player; a non-empty one is ready
    /// unless playback already ended at the last item.
    fn settle_playback_state(&mut self) {
        if self.playback_state == PlaybackState::Idle {
            return;
        }
        if self.items.is_empty() {
            self.playback_state = PlaybackState::Ended;
        } else if self.playback_state == PlaybackState::Ended && self.position_ms < self.duration_ms().unwrap_or(i64::MAX) {
            self.playback_state = PlaybackState::Ready;
        }
    }
}

/// A [`Player`] that keeps all state in memory.
pub struct MemoryPlayer {
    state: Mutex<PlayerState>,
    listeners: ListenerSet,
    permanent_commands: Commands,
}

impl MemoryPlayer {
    /// Creates a player with default settings.
    pub fn new() -> Self {
        Self::with_config(&PlayerConfig::default())
    }

    /// Creates a player using the seek settings from `config`.
    pub fn with_config(config: &PlayerConfig) -> Self {
        let player = Self {
            state: Mutex::new(PlayerState::new(config, 0)),
            listeners: ListenerSet::new(),
            permanent_commands: Commands::new(PERMANENT_COMMANDS),
        };
        let commands = base_player::available_commands(&player, &player.permanent_commands);
        player.state.lock().available_commands = commands;
        player
    }

    /// Uses `seed` for the random shuffle order.
    pub fn with_shuffle_seed(self, seed: u64) -> Self {
        self.state.lock().shuffle_order = ShuffleOrder::new(0, seed);
        self
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Moves time forward by `elapsed_ms` of wall-clock time while playing.
    ///
    /// Reaching the end of an item continues with the next one according to
    /// the repeat and shuffle modes, or ends playback.
    pub fn advance(&self, elapsed_ms: i64) {
        self.update(|state, notes| {
            if !state.is_playing() || elapsed_ms <= 0 {
                return;
            }
            let media_elapsed_ms = (elapsed_ms as f64 * f64::from(state.playback_parameters.speed())) as i64;
            let position_ms = state.position_ms.saturating_add(media_elapsed_ms);
            let Some(duration_ms) = state.duration_ms().filter(|duration_ms| position_ms >= *duration_ms) else {
                state.position_ms = position_ms;
                state.buffered_position_ms = state.buffered_position_ms.max(position_ms);
                return;
            };
            let overflow_ms = position_ms - duration_ms;
            let next_index = match state.repeat_mode {
                RepeatMode::One => Some(state.current_index),
                mode => state
                    .timeline
                    .next_window_index(state.current_index, mode, state.shuffle_mode_enabled),
            };
            match next_index {
                Some(next_index) => {
                    notes.discontinuity = Some((state.position_info(), DiscontinuityReason::AutoTransition));
                    notes.transition_reason = Some(if next_index == state.current_index {
                        MediaItemTransitionReason::Repeat
                    } else {
                        MediaItemTransitionReason::Auto
                    });
                    notes.force_transition = true;
                    state.reset_position(next_index);
                    state.position_ms = state.clamp_position(state.position_ms + overflow_ms);
                    state.buffered_position_ms = state.position_ms;
                }
                None => {
                    state.position_ms = duration_ms;
                    state.buffered_position_ms = duration_ms;
                    state.playback_state = PlaybackState::Ended;
                }
            }
        });
    }

    pub fn set_buffered_position(&self, buffered_position_ms: i64) {
        self.update(|state, _| state.buffered_position_ms = buffered_position_ms.max(state.position_ms));
    }

    /// Reports a playback failure; the player becomes idle.
    pub fn set_player_error(&self, error: PlaybackException) {
        warn!("Playback failed: {}", error);
        self.update(|state, _| {
            state.player_error = Some(error);
            state.playback_state = PlaybackState::Idle;
            state.is_loading = false;
        });
    }

    pub fn set_playback_suppression_reason(&self, reason: PlaybackSuppressionReason) {
        self.update(|state, _| state.suppression_reason = reason);
    }

    pub fn set_tracks(&self, tracks: Tracks) {
        self.update(|state, _| state.tracks = tracks);
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.update(|state, _| state.is_loading = is_loading);
    }

    /// Marks ad `ad_index` of ad group `ad_group_index` as playing, or goes
    /// back to content with `None`. Any seek ends the ad.
    pub fn set_playing_ad(&self, ad: Option<(usize, usize)>) {
        self.update(|state, _| {
            if ad.is_some() && state.items.is_empty() {
                warn!("Ignoring ad playback without media items");
                return;
            }
            state.playing_ad = ad;
        });
    }

    pub fn set_device_info(&self, device_info: DeviceInfo) {
        self.update(|state, _| {
            state.device_volume = state.device_volume.clamp(device_info.min_volume, device_info.max_volume.max(device_info.min_volume));
            state.device_info = device_info;
        });
    }

    fn read<T>(&self, f: impl FnOnce(&PlayerState) -> T) -> T {
        f(&self.state.lock())
    }

    /// Applies `mutate` to the state and informs listeners about the result.
    fn update(&self, mutate: impl FnOnce(&mut PlayerState, &mut Notes)) {
        {
            let mut state = self.state.lock();
            if state.released {
                warn!("Ignoring call on a released player");
                return;
            }
            let before = state.snapshot();
            let mut notes = Notes::default();
            mutate(&mut state, &mut notes);
            let after = state.snapshot();
            let new_position = state.position_info();
            self.queue_changes(&before, &after, notes, new_position);
        }
        self.update_available_commands();
        self.listeners.flush_events(self);
    }

    fn update_available_commands(&self) {
        let commands = base_player::available_commands(self, &self.permanent_commands);
        let mut state = self.state.lock();
        if state.released || state.available_commands == commands {
            return;
        }
        state.available_commands = commands;
        self.listeners
            .queue_event(Event::AvailableCommandsChanged, move |l| l.on_available_commands_changed(&commands));
    }

    fn queue_changes(&self, before: &Snapshot, after: &Snapshot, notes: Notes, new_position: PositionInfo) {
        let listeners = &self.listeners;
        if !Arc::ptr_eq(&before.timeline, &after.timeline) {
            let timeline = after.timeline.clone();
            listeners.queue_event(Event::TimelineChanged, move |l| {
                l.on_timeline_changed(&timeline, TimelineChangeReason::PlaylistChanged)
            });
        }
        if let Some((old_position, reason)) = notes.discontinuity {
            listeners.queue_event(Event::PositionDiscontinuity, move |l| {
                l.on_position_discontinuity(&old_position, &new_position, reason)
            });
        }
        if notes.force_transition || before.current_uid != after.current_uid {
            let media_item = after.current_item.clone();
            let reason = notes
                .transition_reason
                .unwrap_or(MediaItemTransitionReason::PlaylistChanged);
            listeners.queue_event(Event::MediaItemTransition, move |l| {
                l.on_media_item_transition(media_item.as_ref(), reason)
            });
        }
        if before.player_error != after.player_error {
            let error = after.player_error.clone();
            listeners.queue_event(Event::PlayerError, move |l| {
                l.on_player_error_changed(error.as_ref());
                if let Some(error) = &error {
                    l.on_player_error(error);
                }
            });
        }
        if before.tracks != after.tracks {
            let tracks = after.tracks.clone();
            listeners.queue_event(Event::TracksChanged, move |l| l.on_tracks_changed(&tracks));
        }
        if before.media_metadata != after.media_metadata {
            let metadata = after.media_metadata.clone();
            listeners.queue_event(Event::MediaMetadataChanged, move |l| l.on_media_metadata_changed(&metadata));
        }
        if before.playlist_metadata != after.playlist_metadata {
            let metadata = after.playlist_metadata.clone();
            listeners.queue_event(Event::PlaylistMetadataChanged, move |l| {
                l.on_playlist_metadata_changed(&metadata)
            });
        }
        if before.is_loading != after.is_loading {
            let is_loading = after.is_loading;
            listeners.queue_event(Event::IsLoadingChanged, move |l| l.on_is_loading_changed(is_loading));
        }
        if before.playback_state != after.playback_state {
            let playback_state = after.playback_state;
            listeners.queue_event(Event::PlaybackStateChanged, move |l| {
                l.on_playback_state_changed(playback_state)
            });
        }
        if before.play_when_ready != after.play_when_ready {
            let play_when_ready = after.play_when_ready;
            let reason = notes
                .play_when_ready_reason
                .unwrap_or(PlayWhenReadyChangeReason::UserRequest);
            listeners.queue_event(Event::PlayWhenReadyChanged, move |l| {
                l.on_play_when_ready_changed(play_when_ready, reason)
            });
        }
        if before.suppression_reason != after.suppression_reason {
            let reason = after.suppression_reason;
            listeners.queue_event(Event::PlaybackSuppressionReasonChanged, move |l| {
                l.on_playback_suppression_reason_changed(reason)
            });
        }
        if before.is_playing != after.is_playing {
            let is_playing = after.is_playing;
            listeners.queue_event(Event::IsPlayingChanged, move |l| l.on_is_playing_changed(is_playing));
        }
        if before.playback_parameters != after.playback_parameters {
            let parameters = after.playback_parameters;
            listeners.queue_event(Event::PlaybackParametersChanged, move |l| {
                l.on_playback_parameters_changed(&parameters)
            });
        }
        if before.repeat_mode != after.repeat_mode {
            let repeat_mode = after.repeat_mode;
            listeners.queue_event(Event::RepeatModeChanged, move |l| l.on_repeat_mode_changed(repeat_mode));
        }
        if before.shuffle_mode_enabled != after.shuffle_mode_enabled {
            let enabled = after.shuffle_mode_enabled;
            listeners.queue_event(Event::ShuffleModeEnabledChanged, move |l| {
                l.on_shuffle_mode_enabled_changed(enabled)
            });
        }
        if before.volume != after.volume {
            let volume = after.volume;
            listeners.queue_event(Event::VolumeChanged, move |l| l.on_volume_changed(volume));
        }
        if before.device_info != after.device_info {
            let device_info = after.device_info.clone();
            listeners.queue_event(Event::DeviceInfoChanged, move |l| l.on_device_info_changed(&device_info));
        }
        if before.device_volume != after.device_volume || before.device_muted != after.device_muted {
            let (volume, muted) = (after.device_volume, after.device_muted);
            listeners.queue_event(Event::DeviceVolumeChanged, move |l| l.on_device_volume_changed(volume, muted));
        }
    }
}

impl Default for MemoryPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for MemoryPlayer {
    fn add_listener(&self, listener: Arc<dyn Listener>) {
        self.listeners.add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn Listener>) {
        self.listeners.remove(listener.as_ref());
    }

    fn available_commands(&self) -> Commands {
        self.read(|state| state.available_commands)
    }

    fn prepare(&self) {
        self.update(|state, _| {
            if state.playback_state != PlaybackState::Idle {
                return;
            }
            state.player_error = None;
            state.playback_state = if state.items.is_empty() {
                PlaybackState::Ended
            } else {
                PlaybackState::Ready
            };
            debug!("Prepared {} media items", state.items.len());
        });
    }

    fn stop(&self) {
        self.update(|state, _| {
            state.playback_state = PlaybackState::Idle;
            state.player_error = None;
            state.is_loading = false;
            state.buffered_position_ms = state.position_ms;
        });
    }

    fn release(&self) {
        {
            let mut state = self.state.lock();
            if state.released {
                return;
            }
            state.released = true;
            state.playback_state = PlaybackState::Idle;
            state.is_loading = false;
        }
        self.listeners.release();
        debug!("Player released");
    }

    fn playback_state(&self) -> PlaybackState {
        self.read(|state| state.playback_state)
    }

    fn playback_suppression_reason(&self) -> PlaybackSuppressionReason {
        self.read(|state| state.suppression_reason)
    }

    fn player_error(&self) -> Option<PlaybackException> {
        self.read(|state| state.player_error.clone())
    }

    fn set_play_when_ready(&self, play_when_ready: bool) {
        self.update(|state, notes| {
            state.play_when_ready = play_when_ready;
            notes.play_when_ready_reason = Some(PlayWhenReadyChangeReason::UserRequest);
        });
    }

    fn play_when_ready(&self) -> bool {
        self.read(|state| state.play_when_ready)
    }

    fn is_loading(&self) -> bool {
        self.read(|state| state.is_loading)
    }

    fn set_repeat_mode(&self, repeat_mode: RepeatMode) {
        self.update(|state, _| state.repeat_mode = repeat_mode);
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.read(|state| state.repeat_mode)
    }

    fn set_shuffle_mode_enabled(&self, shuffle_mode_enabled: bool) {
        self.update(|state, _| state.shuffle_mode_enabled = shuffle_mode_enabled);
    }

    fn shuffle_mode_enabled(&self) -> bool {
        self.read(|state| state.shuffle_mode_enabled)
    }

    fn seek_to(
        &self,
        media_item_index: usize,
        position_ms: Option<i64>,
        command: Command,
        is_repeating_current_item: bool,
    ) {
        self.update(|state, notes| {
            if !state.items.is_empty() && media_item_index >= state.items.len() {
                warn!(
                    "Ignoring {:?} to item {} of {}",
                    command,
                    media_item_index,
                    state.items.len()
                );
                return;
            }
            notes.discontinuity = Some((state.position_info(), DiscontinuityReason::Seek));
            if is_repeating_current_item {
                notes.force_transition = true;
                notes.transition_reason = Some(MediaItemTransitionReason::Repeat);
            } else if media_item_index != state.current_index {
                notes.transition_reason = Some(MediaItemTransitionReason::Seek);
            }
            state.reset_position(media_item_index);
            if let Some(position_ms) = position_ms {
                state.position_ms = state.clamp_position(position_ms);
                state.buffered_position_ms = state.position_ms;
            }
            if state.playback_state == PlaybackState::Ended && !state.items.is_empty() {
                state.playback_state = PlaybackState::Ready;
            }
            debug!(
                "{:?}: item {} at {} ms",
                command, state.current_index, state.position_ms
            );
        });
    }

    fn seek_back_increment(&self) -> i64 {
        self.read(|state| state.seek_back_increment_ms)
    }

    fn seek_forward_increment(&self) -> i64 {
        self.read(|state| state.seek_forward_increment_ms)
    }

    fn max_seek_to_previous_position(&self) -> i64 {
        self.read(|state| state.max_seek_to_previous_position_ms)
    }

    fn set_playback_parameters(&self, playback_parameters: PlaybackParameters) {
        self.update(|state, _| state.playback_parameters = playback_parameters);
    }

    fn playback_parameters(&self) -> PlaybackParameters {
        self.read(|state| state.playback_parameters)
    }

    fn set_media_items(&self, media_items: Vec<MediaItem>, reset_position: bool) {
        self.update(|state, _| {
            debug!("Setting {} media items", media_items.len());
            let start = if reset_position { Start::Default } else { Start::Keep };
            state.set_playlist(media_items, start);
        });
    }

    fn set_media_items_with_start(
        &self,
        media_items: Vec<MediaItem>,
        start_index: usize,
        start_position_ms: Option<i64>,
    ) {
        self.update(|state, _| {
            if !media_items.is_empty() && start_index >= media_items.len() {
                warn!(
                    "Ignoring playlist of {} items starting at {}",
                    media_items.len(),
                    start_index
                );
                return;
            }
            state.set_playlist(media_items, Start::At(start_index, start_position_ms));
        });
    }

    fn add_media_items_at(&self, index: usize, media_items: Vec<MediaItem>) {
        if media_items.is_empty() {
            return;
        }
        self.update(|state, _| state.insert_items(index, media_items));
    }

    fn move_media_items(&self, from: usize, to: usize, new_index: usize) {
        self.update(|state, _| {
            let to = to.min(state.items.len());
            if from >= to {
                return;
            }
            let count = to - from;
            let new_index = new_index.min(state.items.len() - count);
            if new_index == from {
                return;
            }
            let current_uid = state.items.get(state.current_index).map(|(uid, _)| uid.clone());
            let moved: Vec<(Uid, MediaItem)> = state.items.drain(from..to).collect();
            state.items.splice(new_index..new_index, moved);
            state.shuffle_order = state.shuffle_order.clone_and_remove(from, to).clone_and_insert(new_index, count);
            if let Some(current_uid) = current_uid {
                if let Some(index) = state.items.iter().position(|(uid, _)| *uid == current_uid) {
                    state.current_index = index;
                }
            }
            state.rebuild_timeline();
        });
    }

    fn replace_media_items(&self, from: usize, to: usize, media_items: Vec<MediaItem>) {
        self.update(|state, notes| {
            let to = to.min(state.items.len());
            if from > to {
                return;
            }
            let old_position = state.position_info();
            state.insert_items(to, media_items);
            if from < to && state.remove_items(from, to) {
                notes.discontinuity = Some((old_position, DiscontinuityReason::Remove));
            }
        });
    }

    fn remove_media_items(&self, from: usize, to: usize) {
        self.update(|state, notes| {
            let to = to.min(state.items.len());
            if from >= to {
                return;
            }
            let old_position = state.position_info();
            debug!("Removing media items {}..{}", from, to);
            if state.remove_items(from, to) {
                notes.discontinuity = Some((old_position, DiscontinuityReason::Remove));
            }
        });
    }

    fn media_metadata(&self) -> MediaMetadata {
        self.read(|state| state.media_metadata())
    }

    fn playlist_metadata(&self) -> MediaMetadata {
        self.read(|state| state.playlist_metadata.clone())
    }

    fn set_playlist_metadata(&self, playlist_metadata: MediaMetadata) {
        self.update(|state, _| state.playlist_metadata = playlist_metadata);
    }

    fn current_timeline(&self) -> Arc<dyn Timeline> {
        self.read(|state| state.timeline.clone())
    }

    fn current_tracks(&self) -> Tracks {
        self.read(|state| state.tracks.clone())
    }

    fn current_period_index(&self) -> usize {
        self.read(|state| state.window().map_or(0, |window| window.first_period_index))
    }

    fn current_media_item_index(&self) -> usize {
        self.read(|state| state.current_index)
    }

    fn duration(&self) -> Option<i64> {
        self.read(|state| state.duration_ms())
    }

    fn current_position(&self) -> i64 {
        self.read(|state| state.position_ms)
    }

    fn buffered_position(&self) -> i64 {
        self.read(|state| state.buffered_position_ms)
    }

    fn total_buffered_duration(&self) -> i64 {
        self.read(|state| (state.buffered_position_ms - state.position_ms).max(0))
    }

    fn is_playing_ad(&self) -> bool {
        self.read(|state| state.playing_ad.is_some())
    }

    fn current_ad_group_index(&self) -> Option<usize> {
        self.read(|state| state.playing_ad.map(|(ad_group_index, _)| ad_group_index))
    }

    fn current_ad_index_in_ad_group(&self) -> Option<usize> {
        self.read(|state| state.playing_ad.map(|(_, ad_index)| ad_index))
    }

    fn content_position(&self) -> i64 {
        self.current_position()
    }

    fn content_buffered_position(&self) -> i64 {
        self.buffered_position()
    }

    fn volume(&self) -> f32 {
        self.read(|state| state.volume)
    }

    fn set_volume(&self, volume: f32) {
        self.update(|state, _| state.volume = volume.clamp(0.0, 1.0));
    }

    fn device_info(&self) -> DeviceInfo {
        self.read(|state| state.device_info.clone())
    }

    fn device_volume(&self) -> i32 {
        self.read(|state| state.device_volume)
    }

    fn is_device_muted(&self) -> bool {
        self.read(|state| state.device_muted)
    }

    fn set_device_volume(&self, volume: i32) {
        self.update(|state, _| {
            let (min, max) = (state.device_info.min_volume, state.device_info.max_volume);
            state.device_volume = volume.clamp(min, max.max(min));
        });
    }

    fn increase_device_volume(&self) {
        self.update(|state, _| {
            if state.device_volume < state.device_info.max_volume {
                state.device_volume += 1;
            }
        });
    }

    fn decrease_device_volume(&self) {
        self.update(|state, _| {
            if state.device_volume > state.device_info.min_volume {
                state.device_volume -= 1;
            }
        });
    }

    fn set_device_muted(&self, muted: bool) {
        self.update(|state, _| state.device_muted = muted);
    }
}
