//! Integration tests for bundle serialization
//!
//! Covers the versioned JSON envelope, timeline reconstruction from a
//! bundle, and chunked transfer of long bundle lists.

mod common;

use anyhow::Result;
use std::sync::Arc;

use ccplayer_common::bundle::list::{collect_chunks, decode_chunk, encode_chunk, BundleListSender, ChunkRecord};
use ccplayer_common::bundle::{Bundle, Bundleable, BUNDLE_FORMAT_VERSION};
use ccplayer_common::media::{MediaItem, PlaybackParameters};
use ccplayer_common::player::{
    Command, Commands, ErrorCode, MemoryPlayer, PlaybackException, Player, RemoteCause,
};
use ccplayer_common::timeline::{ShuffleOrder, StaticTimeline, Timeline, Uid, Window};
use ccplayer_common::utils;
use ccplayer_common::MediaError;
use common::{live_item, media_item, playlist};

#[test]
fn test_envelope_carries_version() -> Result<()> {
    let item = media_item("clip", 12_000)?;
    let json = item.to_bundle().to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["version"], serde_json::json!(BUNDLE_FORMAT_VERSION));
    assert!(value["fields"].is_object());

    let restored = MediaItem::from_bundle(&Bundle::from_json(&json)?)?;
    assert_eq!(restored, item);
    Ok(())
}

#[test]
fn test_unknown_version_is_rejected() -> Result<()> {
    let json = media_item("clip", 1000)?.to_bundle().to_json()?;
    let mut value: serde_json::Value = serde_json::from_str(&json)?;
    value["version"] = serde_json::json!(BUNDLE_FORMAT_VERSION + 1);

    let result = Bundle::from_json(&value.to_string());
    assert!(matches!(result, Err(MediaError::UnsupportedVersion { .. })));
    Ok(())
}

#[test]
fn test_timeline_round_trip() -> Result<()> {
    let items: Vec<(Uid, MediaItem)> = vec![
        (Uid::Int(7), media_item("a", 10_000)?),
        (Uid::Str("b".into()), media_item("b", 5_000)?),
        (Uid::Int(9), live_item("c")?),
    ];
    let timeline = StaticTimeline::from_media_items(&items, ShuffleOrder::new(3, 11))?;

    let json = timeline.to_bundle().to_json()?;
    let restored = StaticTimeline::from_bundle(&Bundle::from_json(&json)?)?;

    let original: &dyn Timeline = &timeline;
    let restored: &dyn Timeline = &restored;
    assert!(*original == *restored);
    assert!(restored.window(2, 0).is_live());
    assert_eq!(restored.window(1, 0).duration_ms(), Some(5_000));
    Ok(())
}

#[test]
fn test_player_timeline_round_trip() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items(playlist(&[1000, 2000, 3000])?, true);

    let timeline: Arc<dyn Timeline> = player.current_timeline();
    let restored = StaticTimeline::from_bundle(&timeline.to_bundle())?;
    let restored: &dyn Timeline = &restored;
    assert!(*timeline == *restored);
    Ok(())
}

#[test]
fn test_exception_round_trip_keeps_cause_message() -> Result<()> {
    let exception = PlaybackException::new(ErrorCode::IoNetworkConnectionFailed, Some("connect failed".into()))
        .with_cause(RemoteCause("connection reset".into()));

    let restored = PlaybackException::from_bundle(&Bundle::from_json(&exception.to_bundle().to_json()?)?)?;

    assert!(restored.error_info_equals(&exception));
    assert_eq!(restored.timestamp_ms, exception.timestamp_ms);
    assert_eq!(restored.error_code_name(), "ERROR_CODE_IO_NETWORK_CONNECTION_FAILED");
    Ok(())
}

#[test]
fn test_commands_and_parameters_round_trip() -> Result<()> {
    let commands = Commands::builder()
        .add(Command::PlayPause)
        .add(Command::SeekToNext)
        .add(Command::SetMediaItem)
        .build();
    assert_eq!(Commands::from_bundle(&commands.to_bundle())?, commands);

    let parameters = PlaybackParameters::new(1.5, 0.8)?;
    assert_eq!(PlaybackParameters::from_bundle(&parameters.to_bundle())?, parameters);
    Ok(())
}

#[test]
fn test_chunked_transfer_of_windows() -> Result<()> {
    let durations: Vec<i64> = (1..=200).map(|index| index * 1000).collect();
    let player = MemoryPlayer::new();
    player.set_media_items(playlist(&durations)?, true);
    let timeline = player.current_timeline();
    let windows: Vec<Bundle> = (0..timeline.window_count())
        .map(|index| timeline.window(index, 0).to_bundle())
        .collect();

    let sender = BundleListSender::with_max_chunk_bytes(windows.clone(), 2048);
    let mut requests = 0;
    let received = collect_chunks(|start| {
        requests += 1;
        let bytes = encode_chunk(&sender.chunk_from(start))?;
        decode_chunk(&bytes)
    })?;

    assert_eq!(received, windows);
    assert!(requests > 1);
    Ok(())
}

#[test]
fn test_chunk_without_progress_is_an_error() {
    let result = collect_chunks(|_| Ok(vec![ChunkRecord::Break]));
    assert!(result.is_err());
}

#[test]
fn test_window_clock_offset_survives_transfer() -> Result<()> {
    let window = Window {
        uid: Uid::Int(1),
        window_start_time_ms: Some(utils::now_unix_time_ms(None) - 30_000),
        elapsed_realtime_epoch_offset_ms: Some(utils::elapsed_realtime_epoch_offset_ms()),
        is_dynamic: true,
        ..Window::default()
    };
    let restored = Window::from_bundle(&Bundle::from_json(&window.to_bundle().to_json()?)?)?;

    let drift_ms = restored.current_unix_time_ms() - utils::now_unix_time_ms(None);
    assert!(drift_ms.abs() < 25, "drift {} ms", drift_ms);
    Ok(())
}
