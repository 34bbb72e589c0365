//! ccplayer-common: media model and player API shared by CCPlayer components
//!
//! The crate holds the immutable value types describing media
//! ([`media::MediaItem`], [`media::Format`], [`media::Tracks`], ...), the
//! [`timeline::Timeline`] model of windows and periods, the [`player::Player`]
//! trait with its derived operations, and a versioned key/value
//! serialization ([`bundle::Bundle`]) implemented by every value type.

pub mod bundle;
pub mod constants;
pub mod media;
pub mod player;
pub mod timeline;
pub mod utils;

pub use bundle::{Bundle, Bundleable};
pub use media::{MediaItem, MediaMetadata, PlaybackParameters};
pub use player::{ForwardingPlayer, Listener, MemoryPlayer, Player, RepeatMode};
pub use timeline::{Period, Timeline, Window};
pub use utils::{Config, MediaError, Result};
