use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ccplayer_common::bundle::list::{collect_chunks, decode_chunk, encode_chunk, BundleListSender};
use ccplayer_common::bundle::{Bundle, Bundleable};
use ccplayer_common::media::{MediaItem, MediaMetadata};
use ccplayer_common::player::{
    DiscontinuityReason, Listener, MediaItemTransitionReason, MemoryPlayer, Player, PositionInfo, RepeatMode,
};
use ccplayer_common::timeline::{self, Timeline};
use ccplayer_common::utils::{self, Config};

/// ccplayer-inspect - Print the playback order and navigation of a playlist
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Playlist description (.toml or .json)
    #[arg(value_name = "PLAYLIST")]
    playlist: PathBuf,

    /// Repeat mode used for navigation
    #[arg(short, long, value_enum, default_value = "off")]
    repeat: RepeatArg,

    /// Enable shuffle mode
    #[arg(short, long)]
    shuffle: bool,

    /// Seed for the shuffle order
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Number of seek-to-next steps to walk (defaults to the item count)
    #[arg(long, value_name = "STEPS")]
    steps: Option<usize>,

    /// Print the serialized timeline as JSON
    #[arg(long)]
    json: bool,

    /// Show how the window list splits into transfer chunks
    #[arg(long)]
    chunks: bool,

    /// Configuration file (defaults to the layered system/user config)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RepeatArg {
    Off,
    One,
    All,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::One => RepeatMode::One,
            RepeatArg::All => RepeatMode::All,
        }
    }
}

/// On-disk playlist description
#[derive(Debug, Deserialize)]
struct PlaylistFile {
    #[serde(default)]
    items: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    uri: Option<String>,
    mime_type: Option<String>,
    title: Option<String>,
    duration_ms: Option<i64>,
    clip_start_ms: Option<i64>,
    clip_end_ms: Option<i64>,
    /// Target live offset; marks the item as a live stream
    live_offset_ms: Option<i64>,
}

impl PlaylistEntry {
    fn to_media_item(&self) -> Result<MediaItem> {
        let mut builder = MediaItem::builder().media_id(self.id.clone()).media_metadata(
            MediaMetadata::builder()
                .title(self.title.clone())
                .duration_ms(self.duration_ms)
                .build(),
        );
        if let Some(uri) = &self.uri {
            builder = builder.uri(uri.clone());
        }
        if let Some(mime_type) = &self.mime_type {
            builder = builder.mime_type(mime_type.clone());
        }
        if let Some(start_ms) = self.clip_start_ms {
            builder = builder.clip_start_position_ms(start_ms);
        }
        if self.clip_end_ms.is_some() {
            builder = builder.clip_end_position_ms(self.clip_end_ms);
        }
        if let Some(offset_ms) = self.live_offset_ms {
            builder = builder.live_target_offset_ms(offset_ms);
        }
        builder
            .build()
            .with_context(|| format!("Invalid playlist entry '{}'", self.id))
    }
}

fn load_playlist(path: &Path) -> Result<Vec<MediaItem>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let playlist: PlaylistFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text).context("Failed to parse JSON playlist")?,
        Some("toml") => toml::from_str(&text).context("Failed to parse TOML playlist")?,
        other => bail!("Unsupported playlist extension {:?}", other),
    };
    playlist.items.iter().map(PlaylistEntry::to_media_item).collect()
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => utils::load_config()?,
    };

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting ccplayer-inspect v{}", env!("CARGO_PKG_VERSION"));

    let media_items = load_playlist(&args.playlist)?;
    if media_items.is_empty() {
        bail!("Playlist {:?} has no items", args.playlist);
    }
    debug!("Loaded {} items from {:?}", media_items.len(), args.playlist);

    let player = MemoryPlayer::with_config(&config.player).with_shuffle_seed(args.seed);
    player.add_listener(Arc::new(LoggingListener));
    player.set_repeat_mode(args.repeat.into());
    player.set_shuffle_mode_enabled(args.shuffle);
    player.set_media_items(media_items, true);
    player.prepare();

    let timeline = player.current_timeline();
    print_summary(timeline.as_ref(), player.repeat_mode(), player.shuffle_mode_enabled());

    if args.json {
        println!("{}", timeline.to_bundle().to_json()?);
    }

    if args.chunks {
        print_chunks(timeline.as_ref(), config.transfer.max_chunk_bytes)?;
    }

    let steps = args.steps.unwrap_or(timeline.window_count());
    println!("\nWalk ({} steps):", steps);
    print_position(&player);
    for _ in 0..steps {
        if !player.has_next_media_item() && !player.is_current_media_item_dynamic() {
            println!("  (end of playlist)");
            break;
        }
        player.seek_to_next();
        print_position(&player);
    }

    player.release();
    Ok(())
}

fn print_summary(timeline: &dyn Timeline, repeat_mode: RepeatMode, shuffle: bool) {
    println!(
        "Playlist: {} items, repeat {:?}, shuffle {}",
        timeline.window_count(),
        repeat_mode,
        if shuffle { "on" } else { "off" }
    );
    println!("Playback order: {:?}", timeline::playback_order(timeline, shuffle));
    for index in 0..timeline.window_count() {
        let window = timeline.window(index, 0);
        println!(
            "  #{:<3} {:<20} {:>8}  live={:<5} next={:<8} previous={:<8}",
            index,
            window.media_item.media_id,
            utils::format_position_ms(window.duration_ms()),
            window.is_live(),
            format_index(timeline.next_window_index(index, repeat_mode, shuffle)),
            format_index(timeline.previous_window_index(index, repeat_mode, shuffle)),
        );
    }
}

fn print_chunks(timeline: &dyn Timeline, max_chunk_bytes: usize) -> Result<()> {
    let windows: Vec<Bundle> = (0..timeline.window_count())
        .map(|index| timeline.window(index, 0).to_bundle())
        .collect();
    let sender = BundleListSender::with_max_chunk_bytes(windows, max_chunk_bytes);
    println!("\nTransfer chunks (ceiling {} bytes):", max_chunk_bytes);
    let mut chunk_count = 0;
    let received = collect_chunks(|start| {
        let records = sender.chunk_from(start);
        let bytes = encode_chunk(&records)?;
        chunk_count += 1;
        println!("  chunk {:<3} from #{:<4} {} records, {} bytes", chunk_count, start, records.len(), bytes.len());
        decode_chunk(&bytes)
    })?;
    debug!("Reassembled {} window bundles", received.len());
    Ok(())
}

fn print_position(player: &dyn Player) {
    let title = player
        .current_media_item()
        .map(|item| item.media_id)
        .unwrap_or_default();
    println!(
        "  -> #{} {} at {} / {}",
        player.current_media_item_index(),
        title,
        utils::format_position_ms(Some(player.current_position())),
        utils::format_position_ms(player.duration()),
    );
}

fn format_index(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |index| index.to_string())
}

/// Listener that logs transitions
struct LoggingListener;

impl Listener for LoggingListener {
    fn on_media_item_transition(&self, media_item: Option<&MediaItem>, reason: MediaItemTransitionReason) {
        info!(
            "Media item transition to {:?} ({:?})",
            media_item.map(|item| item.media_id.as_str()),
            reason
        );
    }

    fn on_position_discontinuity(&self, old: &PositionInfo, new: &PositionInfo, reason: DiscontinuityReason) {
        // Position jumps are noisy; keep them at debug level
        debug!(
            "Discontinuity {:?}: #{}@{}ms -> #{}@{}ms",
            reason, old.media_item_index, old.position_ms, new.media_item_index, new.position_ms
        );
    }
}
