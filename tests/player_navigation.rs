//! Integration tests for playlist navigation
//!
//! These tests drive a [`MemoryPlayer`] through the public `Player` API:
//! - Next/previous navigation under repeat and shuffle modes
//! - The seek-to-previous threshold
//! - Live stream handling
//! - Buffered percentage
//! - Listener registration through a forwarding player

mod common;

use anyhow::Result;
use std::sync::Arc;

use ccplayer_common::player::{
    DiscontinuityReason, ForwardingPlayer, Listener, MediaItemTransitionReason, MemoryPlayer, PlaybackState, Player,
    RepeatMode,
};
use ccplayer_common::timeline::{ShuffleOrder, StaticTimeline, Timeline, Uid};
use common::{live_item, media_item, playlist, prepared_player, RecordingListener};

#[test]
fn test_two_window_navigation() -> Result<()> {
    let items = vec![
        (Uid::Int(0), media_item("first", 10_000)?),
        (Uid::Int(1), media_item("second", 5_000)?),
    ];
    let timeline = StaticTimeline::from_media_items(&items, ShuffleOrder::unshuffled(2))?;

    assert_eq!(timeline.window(0, 0).duration_us, Some(10_000_000));
    assert_eq!(timeline.window(1, 0).duration_us, Some(5_000_000));
    assert_eq!(timeline.next_window_index(0, RepeatMode::Off, false), Some(1));
    assert_eq!(timeline.next_window_index(1, RepeatMode::Off, false), None);
    assert_eq!(timeline.next_window_index(1, RepeatMode::All, false), Some(0));
    assert_eq!(timeline.previous_window_index(0, RepeatMode::Off, false), None);
    assert_eq!(timeline.previous_window_index(0, RepeatMode::All, false), Some(1));

    Ok(())
}

#[test]
fn test_seek_to_previous_near_start_goes_to_previous_item() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items_with_start(playlist(&[10_000, 5_000])?, 1, Some(50));
    player.prepare();
    assert_eq!(player.max_seek_to_previous_position(), 3000);

    player.seek_to_previous();

    assert_eq!(player.current_media_item_index(), 0);
    assert_eq!(player.current_position(), 0);
    Ok(())
}

#[test]
fn test_seek_to_previous_past_threshold_restarts_item() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items_with_start(playlist(&[10_000, 5_000])?, 1, Some(5000));
    player.prepare();
    // The second item is 5 s long; stay just inside it
    player.seek_to_position(4500);

    player.seek_to_previous();

    assert_eq!(player.current_media_item_index(), 1);
    assert_eq!(player.current_position(), 0);
    Ok(())
}

#[test]
fn test_seek_to_previous_on_first_item_restarts_it() -> Result<()> {
    let player = prepared_player(&[10_000, 5_000])?;
    player.seek_to_position(1000);

    player.seek_to_previous();

    assert_eq!(player.current_media_item_index(), 0);
    assert_eq!(player.current_position(), 0);
    Ok(())
}

#[test]
fn test_seek_to_next_at_end_of_playlist_is_ignored() -> Result<()> {
    let player = prepared_player(&[10_000, 5_000])?;
    player.seek_to_next();
    assert_eq!(player.current_media_item_index(), 1);

    player.seek_to_position(2000);
    player.seek_to_next();

    assert_eq!(player.current_media_item_index(), 1);
    assert_eq!(player.current_position(), 2000);
    Ok(())
}

#[test]
fn test_seek_to_next_on_live_item_jumps_to_live_edge() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items(vec![live_item("live")?], true);
    player.prepare();
    player.play();
    player.advance(4000);
    assert!(player.is_current_media_item_live());
    assert!(player.is_current_media_item_dynamic());
    assert_eq!(player.current_position(), 4000);

    player.seek_to_next();

    assert_eq!(player.current_media_item_index(), 0);
    assert_eq!(player.current_position(), 0);
    Ok(())
}

#[test]
fn test_seek_to_previous_on_live_item_goes_to_previous_item() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items(vec![media_item("a", 10_000)?, live_item("live")?], true);
    player.prepare();
    player.seek_to_item(1, 0);
    player.play();
    player.advance(10_000);
    assert!(!player.is_current_media_item_seekable());
    assert_eq!(player.current_position(), 10_000);

    player.seek_to_previous();

    assert_eq!(player.current_media_item_index(), 0);
    assert_eq!(player.current_position(), 0);
    Ok(())
}

#[test]
fn test_seek_to_previous_on_lone_live_item_is_ignored() -> Result<()> {
    let player = MemoryPlayer::new();
    player.set_media_items(vec![live_item("live")?], true);
    player.prepare();
    player.play();
    player.advance(10_000);

    player.seek_to_previous();

    assert_eq!(player.current_media_item_index(), 0);
    assert_eq!(player.current_position(), 10_000);
    Ok(())
}

#[test]
fn test_navigation_is_ignored_while_ad_plays() -> Result<()> {
    let player = prepared_player(&[10_000, 10_000, 10_000])?;
    player.seek_to_item(1, 1000);
    player.set_playing_ad(Some((0, 0)));
    let listener = Arc::new(RecordingListener::default());
    player.add_listener(listener.clone());

    player.seek_to_next();
    assert_eq!(player.current_media_item_index(), 1);
    assert_eq!(player.current_position(), 1000);

    player.seek_to_previous();
    assert_eq!(player.current_media_item_index(), 1);
    assert_eq!(player.current_position(), 1000);
    assert!(listener.discontinuities.lock().is_empty());

    player.set_playing_ad(None);
    player.seek_to_next();
    assert_eq!(player.current_media_item_index(), 2);
    Ok(())
}

#[test]
fn test_repeat_one_navigates_like_repeat_off() -> Result<()> {
    let player = prepared_player(&[1000, 1000, 1000])?;
    player.set_repeat_mode(RepeatMode::One);

    assert_eq!(player.next_media_item_index(), Some(1));
    assert_eq!(player.previous_media_item_index(), None);

    player.seek_to_next_media_item();
    assert_eq!(player.current_media_item_index(), 1);
    Ok(())
}

#[test]
fn test_repeat_all_wraps_around() -> Result<()> {
    let player = prepared_player(&[1000, 1000, 1000])?;
    player.set_repeat_mode(RepeatMode::All);
    player.seek_to_default_position_at(2);

    assert!(player.has_next_media_item());
    player.seek_to_next_media_item();
    assert_eq!(player.current_media_item_index(), 0);

    player.seek_to_previous_media_item();
    assert_eq!(player.current_media_item_index(), 2);
    Ok(())
}

#[test]
fn test_shuffle_walk_visits_every_item_once() -> Result<()> {
    let player = MemoryPlayer::new().with_shuffle_seed(42);
    player.set_media_items(playlist(&[1000; 6])?, true);
    player.set_shuffle_mode_enabled(true);
    player.prepare();

    let timeline = player.current_timeline();
    let first = timeline.first_window_index(true).unwrap_or_default();
    player.seek_to_default_position_at(first);

    let mut visited = vec![player.current_media_item_index()];
    while player.has_next_media_item() {
        player.seek_to_next_media_item();
        visited.push(player.current_media_item_index());
    }
    assert_eq!(visited.len(), 6);
    let mut sorted = visited.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn test_playback_runs_through_playlist() -> Result<()> {
    let player = prepared_player(&[1000, 2000])?;
    let listener = Arc::new(RecordingListener::default());
    player.add_listener(listener.clone());

    player.play();
    player.advance(1500);
    assert_eq!(player.current_media_item_index(), 1);
    assert_eq!(player.current_position(), 500);

    player.advance(5000);
    assert_eq!(player.playback_state(), PlaybackState::Ended);
    assert!(!player.is_playing());

    let transitions = listener.transitions.lock().clone();
    assert_eq!(
        transitions,
        vec![(Some("item-1".to_string()), MediaItemTransitionReason::Auto)]
    );
    let discontinuities = listener.discontinuities.lock().clone();
    assert_eq!(discontinuities, vec![(0, 1, DiscontinuityReason::AutoTransition)]);
    Ok(())
}

#[test]
fn test_seek_reports_discontinuity_and_transition() -> Result<()> {
    let player = prepared_player(&[1000, 2000])?;
    let listener = Arc::new(RecordingListener::default());
    player.add_listener(listener.clone());

    player.seek_to_item(1, 700);

    assert_eq!(player.current_position(), 700);
    assert_eq!(
        listener.transitions.lock().clone(),
        vec![(Some("item-1".to_string()), MediaItemTransitionReason::Seek)]
    );
    assert_eq!(
        listener.discontinuities.lock().clone(),
        vec![(0, 1, DiscontinuityReason::Seek)]
    );
    Ok(())
}

#[test]
fn test_seek_back_and_forward_clamp() -> Result<()> {
    let player = prepared_player(&[20_000])?;
    player.seek_to_position(3000);

    player.seek_back();
    assert_eq!(player.current_position(), 0);

    player.seek_forward();
    assert_eq!(player.current_position(), 15_000);

    player.seek_forward();
    assert_eq!(player.current_position(), 20_000);
    Ok(())
}

#[test]
fn test_buffered_percentage() -> Result<()> {
    let player = prepared_player(&[10_000])?;
    assert_eq!(player.buffered_percentage(), 0);

    player.set_buffered_position(2500);
    assert_eq!(player.buffered_percentage(), 25);

    player.set_buffered_position(50_000);
    assert_eq!(player.buffered_percentage(), 100);

    let live = MemoryPlayer::new();
    live.set_media_items(vec![live_item("live")?], true);
    live.prepare();
    live.set_buffered_position(2500);
    assert_eq!(live.duration(), None);
    assert_eq!(live.buffered_percentage(), 0);
    Ok(())
}

#[test]
fn test_forwarding_player_listener_round_trip() -> Result<()> {
    let wrapped = Arc::new(MemoryPlayer::new());
    let forwarding = ForwardingPlayer::new(wrapped.clone());
    let listener: Arc<dyn Listener> = Arc::new(RecordingListener::default());

    forwarding.add_listener(listener.clone());
    assert_eq!(wrapped.listener_count(), 1);

    forwarding.remove_listener(&listener);
    assert_eq!(wrapped.listener_count(), 0);
    Ok(())
}

#[test]
fn test_forwarding_player_delegates_navigation() -> Result<()> {
    let wrapped = prepared_player(&[1000, 1000])?;
    let forwarding = ForwardingPlayer::new(wrapped.clone());

    forwarding.seek_to_next();

    assert_eq!(wrapped.current_media_item_index(), 1);
    assert_eq!(forwarding.current_media_item_index(), 1);
    assert!(!forwarding.has_next_media_item());
    Ok(())
}
