//! A player that forwards every call to another player
//!
//! Wrap a player in [`ForwardingPlayer`] and override individual methods to
//! change its behaviour; everything not overridden goes straight through,
//! including the derived operations, so customisations of the wrapped
//! player stay in effect. Listeners registered here see the forwarding
//! player, not the wrapped one, as the source of their events.

use std::sync::{Arc, Weak};

use super::{
    Command, Commands, DiscontinuityReason, Events, Listener, ListenerKey, MediaItemTransitionReason,
    PlayWhenReadyChangeReason, PlaybackException, PlaybackState, PlaybackSuppressionReason, Player,
    PositionInfo, RepeatMode, TimelineChangeReason,
};
use crate::media::{DeviceInfo, MediaItem, MediaMetadata, PlaybackParameters, Tracks};
use crate::timeline::Timeline;
use crate::utils::error::Result;

/// Forwards all [`Player`] calls to a wrapped player.
pub struct ForwardingPlayer {
    player: Arc<dyn Player>,
    this: Weak<ForwardingPlayer>,
}

impl ForwardingPlayer {
    pub fn new(player: Arc<dyn Player>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            player,
            this: this.clone(),
        })
    }

    pub fn wrapped_player(&self) -> &Arc<dyn Player> {
        &self.player
    }

    fn wrap(&self, listener: &Arc<dyn Listener>) -> Arc<dyn Listener> {
        Arc::new(ForwardingListener {
            forwarding_player: self.this.clone(),
            forwarding_player_id: self as *const ForwardingPlayer as usize,
            listener: listener.clone(),
        })
    }
}

impl Player for ForwardingPlayer {
    fn add_listener(&self, listener: Arc<dyn Listener>) {
        self.player.add_listener(self.wrap(&listener));
    }

    fn remove_listener(&self, listener: &Arc<dyn Listener>) {
        self.player.remove_listener(&self.wrap(listener));
    }

    fn available_commands(&self) -> Commands {
        self.player.available_commands()
    }

    fn prepare(&self) {
        self.player.prepare()
    }

    fn stop(&self) {
        self.player.stop()
    }

    fn release(&self) {
        self.player.release()
    }

    fn playback_state(&self) -> PlaybackState {
        self.player.playback_state()
    }

    fn playback_suppression_reason(&self) -> PlaybackSuppressionReason {
        self.player.playback_suppression_reason()
    }

    fn player_error(&self) -> Option<PlaybackException> {
        self.player.player_error()
    }

    fn set_play_when_ready(&self, play_when_ready: bool) {
        self.player.set_play_when_ready(play_when_ready)
    }

    fn play_when_ready(&self) -> bool {
        self.player.play_when_ready()
    }

    fn is_loading(&self) -> bool {
        self.player.is_loading()
    }

    fn set_repeat_mode(&self, repeat_mode: RepeatMode) {
        self.player.set_repeat_mode(repeat_mode)
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.player.repeat_mode()
    }

    fn set_shuffle_mode_enabled(&self, shuffle_mode_enabled: bool) {
        self.player.set_shuffle_mode_enabled(shuffle_mode_enabled)
    }

    fn shuffle_mode_enabled(&self) -> bool {
        self.player.shuffle_mode_enabled()
    }

    fn seek_to(
        &self,
        media_item_index: usize,
        position_ms: Option<i64>,
        command: Command,
        is_repeating_current_item: bool,
    ) {
        self.player
            .seek_to(media_item_index, position_ms, command, is_repeating_current_item)
    }

    fn seek_back_increment(&self) -> i64 {
        self.player.seek_back_increment()
    }

    fn seek_forward_increment(&self) -> i64 {
        self.player.seek_forward_increment()
    }

    fn max_seek_to_previous_position(&self) -> i64 {
        self.player.max_seek_to_previous_position()
    }

    fn set_playback_parameters(&self, playback_parameters: PlaybackParameters) {
        self.player.set_playback_parameters(playback_parameters)
    }

    fn playback_parameters(&self) -> PlaybackParameters {
        self.player.playback_parameters()
    }

    fn set_media_items(&self, media_items: Vec<MediaItem>, reset_position: bool) {
        self.player.set_media_items(media_items, reset_position)
    }

    fn set_media_items_with_start(
        &self,
        media_items: Vec<MediaItem>,
        start_index: usize,
        start_position_ms: Option<i64>,
    ) {
        self.player
            .set_media_items_with_start(media_items, start_index, start_position_ms)
    }

    fn add_media_items_at(&self, index: usize, media_items: Vec<MediaItem>) {
        self.player.add_media_items_at(index, media_items)
    }

    fn move_media_items(&self, from: usize, to: usize, new_index: usize) {
        self.player.move_media_items(from, to, new_index)
    }

    fn replace_media_items(&self, from: usize, to: usize, media_items: Vec<MediaItem>) {
        self.player.replace_media_items(from, to, media_items)
    }

    fn remove_media_items(&self, from: usize, to: usize) {
        self.player.remove_media_items(from, to)
    }

    fn media_metadata(&self) -> MediaMetadata {
        self.player.media_metadata()
    }

    fn playlist_metadata(&self) -> MediaMetadata {
        self.player.playlist_metadata()
    }

    fn set_playlist_metadata(&self, playlist_metadata: MediaMetadata) {
        self.player.set_playlist_metadata(playlist_metadata)
    }

    fn current_timeline(&self) -> Arc<dyn Timeline> {
        self.player.current_timeline()
    }

    fn current_tracks(&self) -> Tracks {
        self.player.current_tracks()
    }

    fn current_period_index(&self) -> usize {
        self.player.current_period_index()
    }

    fn current_media_item_index(&self) -> usize {
        self.player.current_media_item_index()
    }

    fn duration(&self) -> Option<i64> {
        self.player.duration()
    }

    fn current_position(&self) -> i64 {
        self.player.current_position()
    }

    fn buffered_position(&self) -> i64 {
        self.player.buffered_position()
    }

    fn total_buffered_duration(&self) -> i64 {
        self.player.total_buffered_duration()
    }

    fn is_playing_ad(&self) -> bool {
        self.player.is_playing_ad()
    }

    fn current_ad_group_index(&self) -> Option<usize> {
        self.player.current_ad_group_index()
    }

    fn current_ad_index_in_ad_group(&self) -> Option<usize> {
        self.player.current_ad_index_in_ad_group()
    }

    fn content_position(&self) -> i64 {
        self.player.content_position()
    }

    fn content_buffered_position(&self) -> i64 {
        self.player.content_buffered_position()
    }

    fn volume(&self) -> f32 {
        self.player.volume()
    }

    fn set_volume(&self, volume: f32) {
        self.player.set_volume(volume)
    }

    fn device_info(&self) -> DeviceInfo {
        self.player.device_info()
    }

    fn device_volume(&self) -> i32 {
        self.player.device_volume()
    }

    fn is_device_muted(&self) -> bool {
        self.player.is_device_muted()
    }

    fn set_device_volume(&self, volume: i32) {
        self.player.set_device_volume(volume)
    }

    fn increase_device_volume(&self) {
        self.player.increase_device_volume()
    }

    fn decrease_device_volume(&self) {
        self.player.decrease_device_volume()
    }

    fn set_device_muted(&self, muted: bool) {
        self.player.set_device_muted(muted)
    }

    fn is_command_available(&self, command: Command) -> bool {
        self.player.is_command_available(command)
    }

    fn play(&self) {
        self.player.play()
    }

    fn pause(&self) {
        self.player.pause()
    }

    fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    fn set_media_item(&self, media_item: MediaItem) {
        self.player.set_media_item(media_item)
    }

    fn set_media_item_with_reset(&self, media_item: MediaItem, reset_position: bool) {
        self.player.set_media_item_with_reset(media_item, reset_position)
    }

    fn set_media_item_at_position(&self, media_item: MediaItem, start_position_ms: i64) {
        self.player.set_media_item_at_position(media_item, start_position_ms)
    }

    fn add_media_item(&self, media_item: MediaItem) {
        self.player.add_media_item(media_item)
    }

    fn add_media_item_at(&self, index: usize, media_item: MediaItem) {
        self.player.add_media_item_at(index, media_item)
    }

    fn add_media_items(&self, media_items: Vec<MediaItem>) {
        self.player.add_media_items(media_items)
    }

    fn move_media_item(&self, current_index: usize, new_index: usize) {
        self.player.move_media_item(current_index, new_index)
    }

    fn replace_media_item(&self, index: usize, media_item: MediaItem) {
        self.player.replace_media_item(index, media_item)
    }

    fn remove_media_item(&self, index: usize) {
        self.player.remove_media_item(index)
    }

    fn clear_media_items(&self) {
        self.player.clear_media_items()
    }

    fn seek_to_default_position(&self) {
        self.player.seek_to_default_position()
    }

    fn seek_to_default_position_at(&self, media_item_index: usize) {
        self.player.seek_to_default_position_at(media_item_index)
    }

    fn seek_to_position(&self, position_ms: i64) {
        self.player.seek_to_position(position_ms)
    }

    fn seek_to_item(&self, media_item_index: usize, position_ms: i64) {
        self.player.seek_to_item(media_item_index, position_ms)
    }

    fn seek_back(&self) {
        self.player.seek_back()
    }

    fn seek_forward(&self) {
        self.player.seek_forward()
    }

    fn has_previous_media_item(&self) -> bool {
        self.player.has_previous_media_item()
    }

    fn seek_to_previous_media_item(&self) {
        self.player.seek_to_previous_media_item()
    }

    fn seek_to_previous(&self) {
        self.player.seek_to_previous()
    }

    fn has_next_media_item(&self) -> bool {
        self.player.has_next_media_item()
    }

    fn seek_to_next_media_item(&self) {
        self.player.seek_to_next_media_item()
    }

    fn seek_to_next(&self) {
        self.player.seek_to_next()
    }

    fn repeat_current_media_item(&self, command: Command) {
        self.player.repeat_current_media_item(command)
    }

    fn set_playback_speed(&self, speed: f32) -> Result<()> {
        self.player.set_playback_speed(speed)
    }

    fn next_media_item_index(&self) -> Option<usize> {
        self.player.next_media_item_index()
    }

    fn previous_media_item_index(&self) -> Option<usize> {
        self.player.previous_media_item_index()
    }

    fn current_media_item(&self) -> Option<MediaItem> {
        self.player.current_media_item()
    }

    fn media_item_count(&self) -> usize {
        self.player.media_item_count()
    }

    fn media_item_at(&self, index: usize) -> MediaItem {
        self.player.media_item_at(index)
    }

    fn is_current_media_item_dynamic(&self) -> bool {
        self.player.is_current_media_item_dynamic()
    }

    fn is_current_media_item_live(&self) -> bool {
        self.player.is_current_media_item_live()
    }

    fn is_current_media_item_seekable(&self) -> bool {
        self.player.is_current_media_item_seekable()
    }

    fn current_live_offset(&self) -> Option<i64> {
        self.player.current_live_offset()
    }

    fn content_duration(&self) -> Option<i64> {
        self.player.content_duration()
    }

    fn buffered_percentage(&self) -> u8 {
        self.player.buffered_percentage()
    }
}

/// Listener registered on the wrapped player on behalf of a listener of the
/// forwarding player.
struct ForwardingListener {
    forwarding_player: Weak<ForwardingPlayer>,
    forwarding_player_id: usize,
    listener: Arc<dyn Listener>,
}

impl Listener for ForwardingListener {
    fn key(&self) -> ListenerKey {
        ListenerKey::Forwarding {
            player: self.forwarding_player_id,
            listener: Box::new(self.listener.key()),
        }
    }

    fn on_events(&self, player: &dyn Player, events: &Events) {
        match self.forwarding_player.upgrade() {
            Some(forwarding_player) => self.listener.on_events(forwarding_player.as_ref(), events),
            None => self.listener.on_events(player, events),
        }
    }

    fn on_timeline_changed(&self, timeline: &Arc<dyn Timeline>, reason: TimelineChangeReason) {
        self.listener.on_timeline_changed(timeline, reason)
    }

    fn on_media_item_transition(&self, media_item: Option<&MediaItem>, reason: MediaItemTransitionReason) {
        self.listener.on_media_item_transition(media_item, reason)
    }

    fn on_tracks_changed(&self, tracks: &Tracks) {
        self.listener.on_tracks_changed(tracks)
    }

    fn on_media_metadata_changed(&self, media_metadata: &MediaMetadata) {
        self.listener.on_media_metadata_changed(media_metadata)
    }

    fn on_playlist_metadata_changed(&self, playlist_metadata: &MediaMetadata) {
        self.listener.on_playlist_metadata_changed(playlist_metadata)
    }

    fn on_is_loading_changed(&self, is_loading: bool) {
        self.listener.on_is_loading_changed(is_loading)
    }

    fn on_available_commands_changed(&self, available_commands: &Commands) {
        self.listener.on_available_commands_changed(available_commands)
    }

    fn on_playback_state_changed(&self, playback_state: PlaybackState) {
        self.listener.on_playback_state_changed(playback_state)
    }

    fn on_play_when_ready_changed(&self, play_when_ready: bool, reason: PlayWhenReadyChangeReason) {
        self.listener.on_play_when_ready_changed(play_when_ready, reason)
    }

    fn on_playback_suppression_reason_changed(&self, reason: PlaybackSuppressionReason) {
        self.listener.on_playback_suppression_reason_changed(reason)
    }

    fn on_is_playing_changed(&self, is_playing: bool) {
        self.listener.on_is_playing_changed(is_playing)
    }

    fn on_repeat_mode_changed(&self, repeat_mode: RepeatMode) {
        self.listener.on_repeat_mode_changed(repeat_mode)
    }

    fn on_shuffle_mode_enabled_changed(&self, shuffle_mode_enabled: bool) {
        self.listener.on_shuffle_mode_enabled_changed(shuffle_mode_enabled)
    }

    fn on_player_error(&self, error: &PlaybackException) {
        self.listener.on_player_error(error)
    }

    fn on_player_error_changed(&self, error: Option<&PlaybackException>) {
        self.listener.on_player_error_changed(error)
    }

    fn on_position_discontinuity(
        &self,
        old_position: &PositionInfo,
        new_position: &PositionInfo,
        reason: DiscontinuityReason,
    ) {
        self.listener.on_position_discontinuity(old_position, new_position, reason)
    }

    fn on_playback_parameters_changed(&self, playback_parameters: &PlaybackParameters) {
        self.listener.on_playback_parameters_changed(playback_parameters)
    }

    fn on_seek_back_increment_changed(&self, seek_back_increment_ms: i64) {
        self.listener.on_seek_back_increment_changed(seek_back_increment_ms)
    }

    fn on_seek_forward_increment_changed(&self, seek_forward_increment_ms: i64) {
        self.listener.on_seek_forward_increment_changed(seek_forward_increment_ms)
    }

    fn on_max_seek_to_previous_position_changed(&self, max_seek_to_previous_position_ms: i64) {
        self.listener
            .on_max_seek_to_previous_position_changed(max_seek_to_previous_position_ms)
    }

    fn on_volume_changed(&self, volume: f32) {
        self.listener.on_volume_changed(volume)
    }

    fn on_device_info_changed(&self, device_info: &DeviceInfo) {
        self.listener.on_device_info_changed(device_info)
    }

    fn on_device_volume_changed(&self, volume: i32, muted: bool) {
        self.listener.on_device_volume_changed(volume, muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MemoryPlayer;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct SourceRecorder {
        sources: Mutex<Vec<usize>>,
    }

    impl Listener for SourceRecorder {
        fn on_events(&self, player: &dyn Player, _events: &Events) {
            self.sources
                .lock()
                .push((player as *const dyn Player).cast::<()>() as usize);
        }
    }

    #[test]
    fn test_add_then_remove_leaves_no_listener() {
        let wrapped = Arc::new(MemoryPlayer::new());
        let forwarding = ForwardingPlayer::new(wrapped.clone());
        let listener: Arc<dyn Listener> = Arc::new(SourceRecorder::default());

        forwarding.add_listener(listener.clone());
        forwarding.add_listener(listener.clone());
        assert_eq!(wrapped.listener_count(), 1);

        forwarding.remove_listener(&listener);
        assert_eq!(wrapped.listener_count(), 0);
    }

    #[test]
    fn test_events_name_forwarding_player() {
        let wrapped = Arc::new(MemoryPlayer::new());
        let forwarding = ForwardingPlayer::new(wrapped.clone());
        let recorder = Arc::new(SourceRecorder::default());
        forwarding.add_listener(recorder.clone());

        forwarding.set_repeat_mode(RepeatMode::All);
        assert_eq!(wrapped.repeat_mode(), RepeatMode::All);
        let expected = Arc::as_ptr(&forwarding).cast::<()>() as usize;
        assert_eq!(*recorder.sources.lock(), vec![expected]);
    }

    #[test]
    fn test_same_listener_on_two_forwarders() {
        let wrapped = Arc::new(MemoryPlayer::new());
        let first = ForwardingPlayer::new(wrapped.clone());
        let second = ForwardingPlayer::new(wrapped.clone());
        let listener: Arc<dyn Listener> = Arc::new(SourceRecorder::default());

        first.add_listener(listener.clone());
        second.add_listener(listener.clone());
        assert_eq!(wrapped.listener_count(), 2);
        first.remove_listener(&listener);
        assert_eq!(wrapped.listener_count(), 1);
    }
}
