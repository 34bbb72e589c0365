//! Utility module for ccplayer-common
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with a custom error type
//! - Configuration management
//! - Time unit conversion and formatting helpers

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, GeneralConfig, PlayerConfig, TransferConfig};
pub use error::{MediaError, Result};

use once_cell::sync::Lazy;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

static CLOCK_ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// Initialize the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Converts a time in microseconds to milliseconds, keeping unknown times unknown.
pub fn us_to_ms(time_us: Option<i64>) -> Option<i64> {
    time_us.map(|us| us / 1000)
}

/// Converts a time in milliseconds to microseconds, keeping unknown times unknown.
pub fn ms_to_us(time_ms: Option<i64>) -> Option<i64> {
    time_ms.map(|ms| ms.saturating_mul(1000))
}

/// Format a position in milliseconds for display
///
/// Unknown positions render as `--:--`; negative positions get a leading minus.
/// Formatted string is "HH:MM:SS" or "MM:SS" for durations under an hour.
pub fn format_position_ms(position_ms: Option<i64>) -> String {
    let Some(position_ms) = position_ms else {
        return "--:--".to_string();
    };

    let sign = if position_ms < 0 { "-" } else { "" };
    let total_secs = position_ms.unsigned_abs() / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    } else {
        format!("{}{:02}:{:02}", sign, minutes, seconds)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
const REALTIME_CLOCK: libc::clockid_t = libc::CLOCK_BOOTTIME;

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
const REALTIME_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

/// Milliseconds since boot on the system-wide monotonic clock.
///
/// Every process on the machine reads the same clock, so values (and epoch
/// offsets derived from them) can be exchanged between processes. On Linux
/// the clock keeps running during suspend. Platforms without such a clock
/// fall back to a clock that starts when this process first reads it.
pub fn elapsed_realtime_ms() -> i64 {
    system_clock_ms().unwrap_or_else(|| CLOCK_ORIGIN.elapsed().as_millis() as i64)
}

#[cfg(unix)]
fn system_clock_ms() -> Option<i64> {
    // SAFETY: an all-zero timespec is valid, and `now` is writable for the call.
    let mut now: libc::timespec = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::clock_gettime(REALTIME_CLOCK, &mut now) };
    if result != 0 {
        log::warn!("clock_gettime failed: {}", std::io::Error::last_os_error());
        return None;
    }
    Some(now.tv_sec as i64 * 1000 + now.tv_nsec as i64 / 1_000_000)
}

#[cfg(not(unix))]
fn system_clock_ms() -> Option<i64> {
    None
}

fn system_time_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Offset to add to [`elapsed_realtime_ms`] to get Unix time, as measured now.
pub fn elapsed_realtime_epoch_offset_ms() -> i64 {
    system_time_ms() - elapsed_realtime_ms()
}

/// Current Unix time in milliseconds.
///
/// With a known offset between [`elapsed_realtime_ms`] and the epoch, the
/// monotonic clock is used so the result cannot jump with wall-clock changes.
pub fn now_unix_time_ms(elapsed_realtime_epoch_offset_ms: Option<i64>) -> i64 {
    match elapsed_realtime_epoch_offset_ms {
        Some(offset_ms) => offset_ms + elapsed_realtime_ms(),
        None => system_time_ms(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_position() {
        assert_eq!(format_position_ms(Some(0)), "00:00");
        assert_eq!(format_position_ms(Some(59_999)), "00:59");
        assert_eq!(format_position_ms(Some(60_000)), "01:00");
        assert_eq!(format_position_ms(Some(3_600_000)), "01:00:00");
        assert_eq!(format_position_ms(Some(7_325_000)), "02:02:05");
        assert_eq!(format_position_ms(Some(-5_000)), "-00:05");
        assert_eq!(format_position_ms(None), "--:--");
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(us_to_ms(Some(10_000_000)), Some(10_000));
        assert_eq!(us_to_ms(None), None);
        assert_eq!(ms_to_us(Some(3)), Some(3_000));
        assert_eq!(ms_to_us(Some(i64::MAX)), Some(i64::MAX));
    }

    #[test]
    fn test_clock() {
        let first = elapsed_realtime_ms();
        assert!(elapsed_realtime_ms() >= first);
        assert!(now_unix_time_ms(Some(1_000)) >= 1_000);
        assert!(now_unix_time_ms(None) > 1_600_000_000_000);
    }

    #[test]
    fn test_offset_measured_elsewhere_gives_current_time() {
        // A producer measures its offset, then the window is read later
        let offset_ms = elapsed_realtime_epoch_offset_ms();
        std::thread::sleep(std::time::Duration::from_millis(50));
        let drift_ms = now_unix_time_ms(Some(offset_ms)) - now_unix_time_ms(None);
        assert!(drift_ms.abs() < 25, "drift {} ms", drift_ms);
    }

    #[cfg(unix)]
    #[test]
    fn test_realtime_clock_is_shared_across_processes() {
        // Another process reading the boot clock directly sees the same time
        let first_read_ms = elapsed_realtime_ms();
        let mut raw: libc::timespec = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::clock_gettime(REALTIME_CLOCK, &mut raw) }, 0);
        let raw_ms = raw.tv_sec as i64 * 1000 + raw.tv_nsec as i64 / 1_000_000;
        assert!((raw_ms - first_read_ms).abs() < 25);

        let foreign_offset_ms = now_unix_time_ms(None) - raw_ms;
        let drift_ms = now_unix_time_ms(Some(foreign_offset_ms)) - now_unix_time_ms(None);
        assert!(drift_ms.abs() < 25, "drift {} ms", drift_ms);
    }
}
