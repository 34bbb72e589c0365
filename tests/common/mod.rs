//! Shared helpers for the integration tests
//!
//! Provides media item and playlist builders, a recording listener and a
//! temporary configuration fixture.

#![allow(dead_code)]

use anyhow::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use ccplayer_common::media::{MediaItem, MediaMetadata};
use ccplayer_common::player::{
    DiscontinuityReason, Events, Listener, MediaItemTransitionReason, MemoryPlayer, Player, PositionInfo,
};

/// A media item with a known duration.
pub fn media_item(id: &str, duration_ms: i64) -> Result<MediaItem> {
    Ok(MediaItem::builder()
        .media_id(id)
        .uri(format!("https://media.example/{}.mp4", id))
        .media_metadata(MediaMetadata::builder().title(id.to_string()).duration_ms(duration_ms).build())
        .build()?)
}

/// A live stream item without a known duration.
pub fn live_item(id: &str) -> Result<MediaItem> {
    Ok(MediaItem::builder()
        .media_id(id)
        .uri(format!("https://live.example/{}.m3u8", id))
        .live_target_offset_ms(5000)
        .build()?)
}

/// Items named `item-0`, `item-1`, ... with the given durations.
pub fn playlist(durations_ms: &[i64]) -> Result<Vec<MediaItem>> {
    durations_ms
        .iter()
        .enumerate()
        .map(|(index, duration_ms)| media_item(&format!("item-{}", index), *duration_ms))
        .collect()
}

/// A prepared player holding `durations_ms.len()` items.
pub fn prepared_player(durations_ms: &[i64]) -> Result<Arc<MemoryPlayer>> {
    let player = Arc::new(MemoryPlayer::new());
    player.set_media_items(playlist(durations_ms)?, true);
    player.prepare();
    Ok(player)
}

/// Listener recording transitions and discontinuities.
#[derive(Default)]
pub struct RecordingListener {
    pub transitions: Mutex<Vec<(Option<String>, MediaItemTransitionReason)>>,
    pub discontinuities: Mutex<Vec<(usize, usize, DiscontinuityReason)>>,
    pub event_batches: Mutex<Vec<Events>>,
}

impl Listener for RecordingListener {
    fn on_events(&self, _player: &dyn Player, events: &Events) {
        self.event_batches.lock().push(*events);
    }

    fn on_media_item_transition(&self, media_item: Option<&MediaItem>, reason: MediaItemTransitionReason) {
        self.transitions
            .lock()
            .push((media_item.map(|item| item.media_id.clone()), reason));
    }

    fn on_position_discontinuity(&self, old: &PositionInfo, new: &PositionInfo, reason: DiscontinuityReason) {
        self.discontinuities
            .lock()
            .push((old.media_item_index, new.media_item_index, reason));
    }
}

/// Temporary directory for configuration files
pub struct ConfigFixture {
    pub temp_dir: TempDir,
}

impl ConfigFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` to `name` inside the fixture directory.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
