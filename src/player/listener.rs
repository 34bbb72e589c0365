//! Player event listeners
//!
//! A [`Listener`] receives one typed callback per changed state field and,
//! after each batch, a single [`Listener::on_events`] naming every field that
//! changed. [`ListenerSet`] does the queueing and batching for players.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{
    Commands, DiscontinuityReason, Event, Events, MediaItemTransitionReason, PlayWhenReadyChangeReason,
    PlaybackException, PlaybackState, PlaybackSuppressionReason, Player, PositionInfo, RepeatMode,
    TimelineChangeReason,
};
use crate::media::{DeviceInfo, MediaItem, MediaMetadata, PlaybackParameters, Tracks};
use crate::timeline::Timeline;

/// Identity of a registered listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerKey {
    /// A listener registered directly, keyed by its address.
    Direct(usize),
    /// A listener wrapped by a forwarding player.
    Forwarding { player: usize, listener: Box<ListenerKey> },
}

/// Receives player events. Every callback defaults to doing nothing.
pub trait Listener: Send + Sync {
    /// Identity used to deduplicate and remove registrations.
    fn key(&self) -> ListenerKey {
        ListenerKey::Direct((self as *const Self).cast::<()>() as usize)
    }

    /// Called once after the typed callbacks of a batch.
    fn on_events(&self, _player: &dyn Player, _events: &Events) {}

    fn on_timeline_changed(&self, _timeline: &Arc<dyn Timeline>, _reason: TimelineChangeReason) {}

    fn on_media_item_transition(&self, _media_item: Option<&MediaItem>, _reason: MediaItemTransitionReason) {}

    fn on_tracks_changed(&self, _tracks: &Tracks) {}

    fn on_media_metadata_changed(&self, _media_metadata: &MediaMetadata) {}

    fn on_playlist_metadata_changed(&self, _playlist_metadata: &MediaMetadata) {}

    fn on_is_loading_changed(&self, _is_loading: bool) {}

    fn on_available_commands_changed(&self, _available_commands: &Commands) {}

    fn on_playback_state_changed(&self, _playback_state: PlaybackState) {}

    fn on_play_when_ready_changed(&self, _play_when_ready: bool, _reason: PlayWhenReadyChangeReason) {}

    fn on_playback_suppression_reason_changed(&self, _reason: PlaybackSuppressionReason) {}

    fn on_is_playing_changed(&self, _is_playing: bool) {}

    fn on_repeat_mode_changed(&self, _repeat_mode: RepeatMode) {}

    fn on_shuffle_mode_enabled_changed(&self, _shuffle_mode_enabled: bool) {}

    /// A new error stopped playback.
    fn on_player_error(&self, _error: &PlaybackException) {}

    /// The error was set or cleared.
    fn on_player_error_changed(&self, _error: Option<&PlaybackException>) {}

    fn on_position_discontinuity(
        &self,
        _old_position: &PositionInfo,
        _new_position: &PositionInfo,
        _reason: DiscontinuityReason,
    ) {
    }

    fn on_playback_parameters_changed(&self, _playback_parameters: &PlaybackParameters) {}

    fn on_seek_back_increment_changed(&self, _seek_back_increment_ms: i64) {}

    fn on_seek_forward_increment_changed(&self, _seek_forward_increment_ms: i64) {}

    fn on_max_seek_to_previous_position_changed(&self, _max_seek_to_previous_position_ms: i64) {}

    fn on_volume_changed(&self, _volume: f32) {}

    fn on_device_info_changed(&self, _device_info: &DeviceInfo) {}

    fn on_device_volume_changed(&self, _volume: i32, _muted: bool) {}
}

type Callback = Box<dyn Fn(&dyn Listener) + Send>;

struct QueuedEvent {
    event: Event,
    callback: Callback,
}

/// Registered listeners plus the events queued for them.
///
/// Players queue one callback per changed field while they update their
/// state, then call [`ListenerSet::flush_events`] once no lock is held.
/// A flush runs every queued callback on every listener, in registration
/// order, and then calls `on_events` with the combined event set.
pub struct ListenerSet {
    listeners: Mutex<Vec<Arc<dyn Listener>>>,
    queue: Mutex<Vec<QueuedEvent>>,
    flushing: AtomicBool,
    released: AtomicBool,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            queue: Mutex::new(Vec::new()),
            flushing: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// Adds a listener unless one with the same key is registered.
    pub fn add(&self, listener: Arc<dyn Listener>) {
        if self.released.load(Ordering::Acquire) {
            return;
        }
        let key = listener.key();
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|existing| existing.key() == key) {
            listeners.push(listener);
        }
    }

    /// Removes every listener whose key matches `listener`'s.
    pub fn remove(&self, listener: &dyn Listener) {
        let key = listener.key();
        self.listeners.lock().retain(|existing| existing.key() != key);
    }

    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Queues `callback` to run on every listener at the next flush.
    pub fn queue_event(&self, event: Event, callback: impl Fn(&dyn Listener) + Send + 'static) {
        self.queue.lock().push(QueuedEvent {
            event,
            callback: Box::new(callback),
        });
    }

    /// Runs the queued callbacks, then `on_events`.
    ///
    /// A listener that triggers more events while being notified has them
    /// delivered in a further batch of the same flush. A call made while
    /// another flush is running returns at once; that flush picks up its
    /// events before finishing.
    pub fn flush_events(&self, player: &dyn Player) {
        loop {
            if self.flushing.swap(true, Ordering::AcqRel) {
                return;
            }
            {
                let _guard = FlushGuard(&self.flushing);
                self.deliver_queued(player);
            }
            // Events queued between the last drain and the flag reset
            if self.queue.lock().is_empty() {
                break;
            }
        }
    }

    fn deliver_queued(&self, player: &dyn Player) {
        loop {
            let batch = std::mem::take(&mut *self.queue.lock());
            if batch.is_empty() {
                break;
            }
            let listeners = self.listeners.lock().clone();
            let events = batch
                .iter()
                .fold(Events::default(), |events, queued| events.with(queued.event));
            for queued in &batch {
                for listener in &listeners {
                    (queued.callback)(listener.as_ref());
                }
            }
            for listener in &listeners {
                listener.on_events(player, &events);
            }
        }
    }

    /// Queues a single event and flushes immediately.
    pub fn send_event(&self, player: &dyn Player, event: Event, callback: impl Fn(&dyn Listener) + Send + 'static) {
        self.queue_event(event, callback);
        self.flush_events(player);
    }

    /// Drops all listeners and pending events; later additions are ignored.
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
        self.listeners.lock().clear();
        self.queue.lock().clear();
    }
}

/// Clears the flushing flag, also when a listener panics.
struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for ListenerSet {
    fn default() -> Self {
        Self::new()
    }
}
