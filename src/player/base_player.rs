//! Derived player operations
//!
//! These functions are written purely in terms of the primitive [`Player`]
//! operations. The provided methods of [`Player`] call them, and overriding
//! implementations can reuse them.

use log::debug;

use super::{Command, Commands, PlaybackState, PlaybackSuppressionReason, Player, RepeatMode};
use crate::timeline::Window;

/// Repeat mode used to find neighbouring items: repeating one item still
/// lets the user skip to the next or previous one.
pub fn repeat_mode_for_navigation(repeat_mode: RepeatMode) -> RepeatMode {
    match repeat_mode {
        RepeatMode::One => RepeatMode::Off,
        mode => mode,
    }
}

pub fn is_playing<P: Player + ?Sized>(player: &P) -> bool {
    player.playback_state() == PlaybackState::Ready
        && player.play_when_ready()
        && player.playback_suppression_reason() == PlaybackSuppressionReason::None
}

/// Window of the current item, or `None` on an empty timeline.
pub fn current_window<P: Player + ?Sized>(player: &P) -> Option<Window> {
    let timeline = player.current_timeline();
    if timeline.is_empty() {
        return None;
    }
    Some(timeline.window(player.current_media_item_index(), 0))
}

pub fn next_media_item_index<P: Player + ?Sized>(player: &P) -> Option<usize> {
    let timeline = player.current_timeline();
    if timeline.is_empty() {
        return None;
    }
    timeline.next_window_index(
        player.current_media_item_index(),
        repeat_mode_for_navigation(player.repeat_mode()),
        player.shuffle_mode_enabled(),
    )
}

pub fn previous_media_item_index<P: Player + ?Sized>(player: &P) -> Option<usize> {
    let timeline = player.current_timeline();
    if timeline.is_empty() {
        return None;
    }
    timeline.previous_window_index(
        player.current_media_item_index(),
        repeat_mode_for_navigation(player.repeat_mode()),
        player.shuffle_mode_enabled(),
    )
}

fn ignore_seek(command: Command) {
    debug!("Ignoring {:?}: no valid target", command);
}

fn seek_to_current_item<P: Player + ?Sized>(player: &P, position_ms: i64, command: Command) {
    player.seek_to(player.current_media_item_index(), Some(position_ms), command, false);
}

/// Seeks by `offset_ms` within the current item, clamped to `[0, duration]`.
pub fn seek_to_offset<P: Player + ?Sized>(player: &P, offset_ms: i64, command: Command) {
    let mut position_ms = player.current_position().saturating_add(offset_ms);
    if let Some(duration_ms) = player.duration() {
        position_ms = position_ms.min(duration_ms);
    }
    seek_to_current_item(player, position_ms.max(0), command);
}

pub fn seek_to_previous_media_item<P: Player + ?Sized>(player: &P, command: Command) {
    let Some(previous_index) = previous_media_item_index(player) else {
        ignore_seek(command);
        return;
    };
    if previous_index == player.current_media_item_index() {
        player.repeat_current_media_item(command);
    } else {
        player.seek_to(previous_index, None, command, false);
    }
}

pub fn seek_to_next_media_item<P: Player + ?Sized>(player: &P, command: Command) {
    let Some(next_index) = next_media_item_index(player) else {
        ignore_seek(command);
        return;
    };
    if next_index == player.current_media_item_index() {
        player.repeat_current_media_item(command);
    } else {
        player.seek_to(next_index, None, command, false);
    }
}

/// Moves to the previous item when close to the start of the current one
/// (or when the current item is a live stream that cannot be seeked),
/// otherwise restarts the current item.
pub fn seek_to_previous<P: Player + ?Sized>(player: &P) {
    let command = Command::SeekToPrevious;
    if player.current_timeline().is_empty() || player.is_playing_ad() {
        ignore_seek(command);
        return;
    }
    let has_previous = player.has_previous_media_item();
    if player.is_current_media_item_live() && !player.is_current_media_item_seekable() {
        if has_previous {
            seek_to_previous_media_item(player, command);
        } else {
            ignore_seek(command);
        }
    } else if has_previous && player.current_position() <= player.max_seek_to_previous_position() {
        seek_to_previous_media_item(player, command);
    } else {
        seek_to_current_item(player, 0, command);
    }
}

/// Moves to the next item, or to the default position of a live item.
pub fn seek_to_next<P: Player + ?Sized>(player: &P) {
    let command = Command::SeekToNext;
    if player.current_timeline().is_empty() || player.is_playing_ad() {
        ignore_seek(command);
        return;
    }
    if player.has_next_media_item() {
        seek_to_next_media_item(player, command);
    } else if player.is_current_media_item_live() && player.is_current_media_item_dynamic() {
        player.seek_to(player.current_media_item_index(), None, command, false);
    } else {
        ignore_seek(command);
    }
}

/// Offset of the playback position behind the live edge, if the current
/// window knows its wall-clock start time.
pub fn current_live_offset<P: Player + ?Sized>(player: &P) -> Option<i64> {
    let window = current_window(player)?;
    let window_start_time_ms = window.window_start_time_ms?;
    Some(window.current_unix_time_ms() - window_start_time_ms - player.content_position())
}

/// Buffered position as a percentage of the duration.
///
/// Unknown values give 0, a zero duration gives 100.
pub fn buffered_percentage(buffered_position_ms: Option<i64>, duration_ms: Option<i64>) -> u8 {
    match (buffered_position_ms, duration_ms) {
        (Some(_), Some(0)) => 100,
        (Some(position_ms), Some(duration_ms)) => {
            (position_ms.saturating_mul(100) / duration_ms).clamp(0, 100) as u8
        }
        _ => 0,
    }
}

/// Commands available given the player's current state, on top of the
/// `permanent` commands that do not depend on it.
pub fn available_commands<P: Player + ?Sized>(player: &P, permanent: &Commands) -> Commands {
    let is_playing_ad = player.is_playing_ad();
    let is_seekable = player.is_current_media_item_seekable();
    let has_previous = player.has_previous_media_item();
    let has_next = player.has_next_media_item();
    let is_live = player.is_current_media_item_live();
    let is_dynamic = player.is_current_media_item_dynamic();
    let is_empty = player.current_timeline().is_empty();
    permanent
        .build_upon()
        .add_if(Command::SeekToDefaultPosition, !is_playing_ad)
        .add_if(Command::SeekInCurrentMediaItem, is_seekable && !is_playing_ad)
        .add_if(Command::SeekToPreviousMediaItem, has_previous && !is_playing_ad)
        .add_if(
            Command::SeekToPrevious,
            !is_empty && (has_previous || !is_live || is_seekable) && !is_playing_ad,
        )
        .add_if(Command::SeekToNextMediaItem, has_next && !is_playing_ad)
        .add_if(
            Command::SeekToNext,
            !is_empty && (has_next || (is_live && is_dynamic)) && !is_playing_ad,
        )
        .add_if(Command::SeekToMediaItem, !is_playing_ad)
        .add_if(Command::SeekBack, is_seekable && !is_playing_ad)
        .add_if(Command::SeekForward, is_seekable && !is_playing_ad)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_percentage_edges() {
        assert_eq!(buffered_percentage(None, Some(1000)), 0);
        assert_eq!(buffered_percentage(Some(500), None), 0);
        assert_eq!(buffered_percentage(Some(500), Some(0)), 100);
        assert_eq!(buffered_percentage(Some(250), Some(1000)), 25);
        assert_eq!(buffered_percentage(Some(5000), Some(1000)), 100);
        assert_eq!(buffered_percentage(Some(-10), Some(1000)), 0);
    }

    #[test]
    fn test_repeat_one_navigates_like_off() {
        assert_eq!(repeat_mode_for_navigation(RepeatMode::One), RepeatMode::Off);
        assert_eq!(repeat_mode_for_navigation(RepeatMode::All), RepeatMode::All);
    }
}
