//! Player interface for ccplayer-common
//!
//! [`Player`] is the surface every concrete player exposes. Implementations
//! supply the primitive operations; the convenience operations (navigation,
//! relative seeks, single-item playlist edits, derived state) are provided
//! methods backed by the functions in [`base_player`], so every player
//! behaves the same way unless it deliberately overrides one.

pub mod base_player;
pub mod commands;
pub mod exception;
pub mod forwarding;
pub mod listener;
pub mod memory_player;
pub mod position_info;

pub use commands::{Command, Commands, CommandsBuilder, Event, Events, FlagSet};
pub use exception::{ErrorCode, PlaybackException, RemoteCause, CUSTOM_ERROR_CODE_BASE};
pub use forwarding::ForwardingPlayer;
pub use listener::{Listener, ListenerKey, ListenerSet};
pub use memory_player::MemoryPlayer;
pub use position_info::PositionInfo;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::media::{DeviceInfo, MediaItem, MediaMetadata, PlaybackParameters, Tracks};
use crate::timeline::Timeline;
use crate::utils::error::Result;

/// How playback continues at the end of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop after the last item in playback order.
    #[default]
    Off,
    /// Repeat the current item.
    One,
    /// Wrap from the last item back to the first.
    All,
}

impl RepeatMode {
    pub fn code(self) -> i32 {
        match self {
            RepeatMode::Off => 0,
            RepeatMode::One => 1,
            RepeatMode::All => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RepeatMode::Off),
            1 => Some(RepeatMode::One),
            2 => Some(RepeatMode::All),
            _ => None,
        }
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not prepared, or stopped, or failed
    #[default]
    Idle,

    /// Cannot play from the current position yet
    Buffering,

    /// Can play immediately from the current position
    Ready,

    /// Finished playing the playlist
    Ended,
}

impl PlaybackState {
    pub fn code(self) -> i32 {
        match self {
            PlaybackState::Idle => 1,
            PlaybackState::Buffering => 2,
            PlaybackState::Ready => 3,
            PlaybackState::Ended => 4,
        }
    }
}

/// Why playback is held back although it was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackSuppressionReason {
    #[default]
    None,
    TransientAudioFocusLoss,
    UnsuitableAudioOutput,
}

/// Why `play_when_ready` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayWhenReadyChangeReason {
    UserRequest,
    AudioFocusLoss,
    AudioBecomingNoisy,
    Remote,
    EndOfMediaItem,
    SuppressedTooLong,
}

/// Why the position jumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscontinuityReason {
    /// Automatic transition to the next item or period
    AutoTransition,
    Seek,
    /// The player adjusted a requested seek position
    SeekAdjustment,
    Skip,
    /// The current item was removed from the playlist
    Remove,
    Internal,
    SilenceSkip,
}

/// Why playback moved to a different media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaItemTransitionReason {
    /// The current item started again
    Repeat,
    /// Playback continued into the next item
    Auto,
    Seek,
    /// The playlist changed
    PlaylistChanged,
}

/// Why the timeline changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineChangeReason {
    PlaylistChanged,
    SourceUpdate,
}

/// A media player
///
/// All methods take `&self`; implementations keep their state behind
/// interior mutability and must not hold locks while notifying listeners.
/// Times are in milliseconds; `None` means unknown.
pub trait Player: Send + Sync {
    /// Registers a listener. Adding the same listener twice has no effect.
    ///
    /// # Arguments
    ///
    /// * `listener` - Receives every event batch until removed
    fn add_listener(&self, listener: Arc<dyn Listener>);

    /// Unregisters a listener, matched by [`Listener::key`].
    fn remove_listener(&self, listener: &Arc<dyn Listener>);

    /// Commands the player accepts in its current state.
    ///
    /// # Returns
    ///
    /// The permanent commands plus those the current playlist and
    /// position allow. Changes are reported through
    /// [`Listener::on_available_commands_changed`].
    fn available_commands(&self) -> Commands;

    /// Leaves [`PlaybackState::Idle`] and starts loading the playlist.
    ///
    /// Clears any player error. An empty playlist ends right away; calls
    /// outside the idle state are ignored.
    fn prepare(&self);

    /// Stops playback and returns to [`PlaybackState::Idle`].
    ///
    /// The playlist and position are kept so [`Player::prepare`] can resume.
    fn stop(&self);

    /// Releases the player; it accepts no further calls afterwards.
    fn release(&self);

    fn playback_state(&self) -> PlaybackState;

    /// Why playback is suppressed while `play_when_ready` is set.
    fn playback_suppression_reason(&self) -> PlaybackSuppressionReason;

    /// The error that moved the player to [`PlaybackState::Idle`], if any.
    fn player_error(&self) -> Option<PlaybackException>;

    /// Sets whether playback proceeds once the player is ready
    ///
    /// # Arguments
    ///
    /// * `play_when_ready` - `true` to play, `false` to pause
    fn set_play_when_ready(&self, play_when_ready: bool);

    fn play_when_ready(&self) -> bool;

    /// Whether media is being loaded for the buffer.
    fn is_loading(&self) -> bool;

    /// Sets how playback continues at the end of an item or playlist.
    fn set_repeat_mode(&self, repeat_mode: RepeatMode);

    fn repeat_mode(&self) -> RepeatMode;

    /// Enables or disables playback in shuffle order
    ///
    /// # Arguments
    ///
    /// * `shuffle_mode_enabled` - Whether navigation follows the shuffle
    ///   order instead of playlist order
    fn set_shuffle_mode_enabled(&self, shuffle_mode_enabled: bool);

    fn shuffle_mode_enabled(&self) -> bool;

    /// Seeks to a position in a media item
    ///
    /// # Arguments
    ///
    /// * `media_item_index` - Index of the target item
    /// * `position_ms` - Position in the item, or `None` for its default position
    /// * `command` - The command that triggered the seek
    /// * `is_repeating_current_item` - Whether the seek restarts the current item
    fn seek_to(
        &self,
        media_item_index: usize,
        position_ms: Option<i64>,
        command: Command,
        is_repeating_current_item: bool,
    );

    /// Step used by [`Player::seek_back`].
    fn seek_back_increment(&self) -> i64;

    /// Step used by [`Player::seek_forward`].
    fn seek_forward_increment(&self) -> i64;

    /// Position up to which [`Player::seek_to_previous`] moves to the
    /// previous item rather than restarting the current one.
    fn max_seek_to_previous_position(&self) -> i64;

    /// Sets the playback speed and pitch.
    fn set_playback_parameters(&self, playback_parameters: PlaybackParameters);

    fn playback_parameters(&self) -> PlaybackParameters;

    /// Replaces the playlist.
    ///
    /// With `reset_position` playback starts at the default position of the
    /// first item; otherwise the current index and position are kept.
    fn set_media_items(&self, media_items: Vec<MediaItem>, reset_position: bool);

    /// Replaces the playlist and starts at `start_index`
    ///
    /// # Arguments
    ///
    /// * `media_items` - The new playlist
    /// * `start_index` - Index to start playback at
    /// * `start_position_ms` - Position in that item, or `None` for its
    ///   default position
    fn set_media_items_with_start(
        &self,
        media_items: Vec<MediaItem>,
        start_index: usize,
        start_position_ms: Option<i64>,
    );

    /// Inserts items at `index`; indices past the end append.
    fn add_media_items_at(&self, index: usize, media_items: Vec<MediaItem>);

    /// Moves a range of items
    ///
    /// # Arguments
    ///
    /// * `from` - Index of the first item to move
    /// * `to` - End of the range, exclusive; clamped to the playlist length
    /// * `new_index` - Index the first moved item lands at, clamped so the
    ///   range stays inside the playlist
    fn move_media_items(&self, from: usize, to: usize, new_index: usize);

    /// Replaces the items in `from..to` with `media_items`.
    fn replace_media_items(&self, from: usize, to: usize, media_items: Vec<MediaItem>);

    /// Removes the items in `from..to`; `to` is clamped to the playlist length.
    fn remove_media_items(&self, from: usize, to: usize);

    /// Metadata of the current item merged with track metadata.
    fn media_metadata(&self) -> MediaMetadata;

    /// Metadata describing the playlist as a whole.
    fn playlist_metadata(&self) -> MediaMetadata;

    fn set_playlist_metadata(&self, playlist_metadata: MediaMetadata);

    /// The timeline built from the current playlist
    ///
    /// # Returns
    ///
    /// A shared snapshot; later playlist changes produce a new timeline
    /// rather than mutating this one.
    fn current_timeline(&self) -> Arc<dyn Timeline>;

    /// Tracks of the current item.
    fn current_tracks(&self) -> Tracks;

    /// Index of the playing period in [`Player::current_timeline`].
    fn current_period_index(&self) -> usize;

    /// Index of the playing item, or where playback would start in an
    /// empty timeline.
    fn current_media_item_index(&self) -> usize;

    /// Duration of the current item, or of the current ad while one plays.
    fn duration(&self) -> Option<i64>;

    /// Playback position in the current item, or in the ad while one plays.
    fn current_position(&self) -> i64;

    /// Position up to which the current item is buffered.
    fn buffered_position(&self) -> i64;

    /// Buffered media ahead of the current position.
    fn total_buffered_duration(&self) -> i64;

    /// Whether an ad is playing instead of content.
    ///
    /// Seeks that move between items are ignored while an ad plays.
    fn is_playing_ad(&self) -> bool;

    /// Ad group of the playing ad, `None` during content.
    fn current_ad_group_index(&self) -> Option<usize>;

    /// Index of the playing ad within its group, `None` during content.
    fn current_ad_index_in_ad_group(&self) -> Option<usize>;

    /// Content position; equals [`Player::current_position`] unless an ad plays.
    fn content_position(&self) -> i64;

    fn content_buffered_position(&self) -> i64;

    /// Player volume in `0.0..=1.0`.
    fn volume(&self) -> f32;

    /// Sets the player volume; values outside `0.0..=1.0` are clamped.
    fn set_volume(&self, volume: f32);

    /// The playback device and its volume range.
    fn device_info(&self) -> DeviceInfo;

    /// Device volume between the [`DeviceInfo`] minimum and maximum.
    fn device_volume(&self) -> i32;

    fn is_device_muted(&self) -> bool;

    /// Sets the device volume
    ///
    /// # Arguments
    ///
    /// * `volume` - New volume, clamped to the range of [`Player::device_info`]
    fn set_device_volume(&self, volume: i32);

    /// Raises the device volume by one step, up to the device maximum.
    fn increase_device_volume(&self);

    /// Lowers the device volume by one step, down to the device minimum.
    fn decrease_device_volume(&self);

    fn set_device_muted(&self, muted: bool);

    // Derived operations.

    fn is_command_available(&self, command: Command) -> bool {
        self.available_commands().contains(command)
    }

    fn play(&self) {
        self.set_play_when_ready(true);
    }

    fn pause(&self) {
        self.set_play_when_ready(false);
    }

    /// Whether the position is advancing.
    fn is_playing(&self) -> bool {
        base_player::is_playing(self)
    }

    fn set_media_item(&self, media_item: MediaItem) {
        self.set_media_items(vec![media_item], true);
    }

    fn set_media_item_with_reset(&self, media_item: MediaItem, reset_position: bool) {
        self.set_media_items(vec![media_item], reset_position);
    }

    fn set_media_item_at_position(&self, media_item: MediaItem, start_position_ms: i64) {
        self.set_media_items_with_start(vec![media_item], 0, Some(start_position_ms));
    }

    fn add_media_item(&self, media_item: MediaItem) {
        self.add_media_items_at(usize::MAX, vec![media_item]);
    }

    fn add_media_item_at(&self, index: usize, media_item: MediaItem) {
        self.add_media_items_at(index, vec![media_item]);
    }

    fn add_media_items(&self, media_items: Vec<MediaItem>) {
        self.add_media_items_at(usize::MAX, media_items);
    }

    fn move_media_item(&self, current_index: usize, new_index: usize) {
        if current_index != new_index {
            self.move_media_items(current_index, current_index + 1, new_index);
        }
    }

    fn replace_media_item(&self, index: usize, media_item: MediaItem) {
        self.replace_media_items(index, index + 1, vec![media_item]);
    }

    fn remove_media_item(&self, index: usize) {
        self.remove_media_items(index, index + 1);
    }

    fn clear_media_items(&self) {
        self.remove_media_items(0, usize::MAX);
    }

    fn seek_to_default_position(&self) {
        self.seek_to(self.current_media_item_index(), None, Command::SeekToDefaultPosition, false);
    }

    fn seek_to_default_position_at(&self, media_item_index: usize) {
        self.seek_to(media_item_index, None, Command::SeekToMediaItem, false);
    }

    fn seek_to_position(&self, position_ms: i64) {
        self.seek_to(
            self.current_media_item_index(),
            Some(position_ms),
            Command::SeekInCurrentMediaItem,
            false,
        );
    }

    fn seek_to_item(&self, media_item_index: usize, position_ms: i64) {
        self.seek_to(media_item_index, Some(position_ms), Command::SeekToMediaItem, false);
    }

    fn seek_back(&self) {
        base_player::seek_to_offset(self, -self.seek_back_increment(), Command::SeekBack);
    }

    fn seek_forward(&self) {
        base_player::seek_to_offset(self, self.seek_forward_increment(), Command::SeekForward);
    }

    fn has_previous_media_item(&self) -> bool {
        self.previous_media_item_index().is_some()
    }

    fn seek_to_previous_media_item(&self) {
        base_player::seek_to_previous_media_item(self, Command::SeekToPreviousMediaItem);
    }

    /// Moves to the previous item, or restarts the current one.
    fn seek_to_previous(&self) {
        base_player::seek_to_previous(self);
    }

    fn has_next_media_item(&self) -> bool {
        self.next_media_item_index().is_some()
    }

    fn seek_to_next_media_item(&self) {
        base_player::seek_to_next_media_item(self, Command::SeekToNextMediaItem);
    }

    /// Moves to the next item, or to the live edge of a live item.
    fn seek_to_next(&self) {
        base_player::seek_to_next(self);
    }

    /// Seeks to the default position of the current item, flagged as a repeat.
    fn repeat_current_media_item(&self, command: Command) {
        self.seek_to(self.current_media_item_index(), None, command, true);
    }

    fn set_playback_speed(&self, speed: f32) -> Result<()> {
        let playback_parameters = self.playback_parameters().with_speed(speed)?;
        self.set_playback_parameters(playback_parameters);
        Ok(())
    }

    fn next_media_item_index(&self) -> Option<usize> {
        base_player::next_media_item_index(self)
    }

    fn previous_media_item_index(&self) -> Option<usize> {
        base_player::previous_media_item_index(self)
    }

    fn current_media_item(&self) -> Option<MediaItem> {
        base_player::current_window(self).map(|window| window.media_item)
    }

    fn media_item_count(&self) -> usize {
        self.current_timeline().window_count()
    }

    /// The item at `index`. Panics if out of range.
    fn media_item_at(&self, index: usize) -> MediaItem {
        self.current_timeline().window(index, 0).media_item
    }

    fn is_current_media_item_dynamic(&self) -> bool {
        base_player::current_window(self).map_or(false, |window| window.is_dynamic)
    }

    fn is_current_media_item_live(&self) -> bool {
        base_player::current_window(self).map_or(false, |window| window.is_live())
    }

    fn is_current_media_item_seekable(&self) -> bool {
        base_player::current_window(self).map_or(false, |window| window.is_seekable)
    }

    /// Distance of the playback position behind the live edge.
    fn current_live_offset(&self) -> Option<i64> {
        base_player::current_live_offset(self)
    }

    /// Duration of the current content item, ignoring ads.
    fn content_duration(&self) -> Option<i64> {
        base_player::current_window(self).and_then(|window| window.duration_ms())
    }

    /// Buffered position as a percentage of the duration.
    fn buffered_percentage(&self) -> u8 {
        base_player::buffered_percentage(Some(self.buffered_position()), self.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_mode_codes() {
        for mode in [RepeatMode::Off, RepeatMode::One, RepeatMode::All] {
            assert_eq!(RepeatMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(RepeatMode::from_code(3), None);
        assert_eq!(RepeatMode::default(), RepeatMode::Off);
    }

    #[test]
    fn test_playback_state_codes() {
        assert_eq!(PlaybackState::Idle.code(), 1);
        assert_eq!(PlaybackState::Ended.code(), 4);
    }

    #[test]
    fn test_repeat_mode_serde() {
        assert_eq!(serde_json::to_string(&RepeatMode::All).unwrap(), "\"all\"");
        let mode: RepeatMode = serde_json::from_str("\"one\"").unwrap();
        assert_eq!(mode, RepeatMode::One);
    }
}
