//! Command and event sets
//!
//! Both are small bitsets over enumerated constants: [`Commands`] reports
//! which operations a player currently accepts, [`Events`] which state
//! fields changed in one batch of listener callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils::error::Result;

/// A set of flags in `0..64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FlagSet {
    bits: u64,
}

impl FlagSet {
    pub const EMPTY: FlagSet = FlagSet { bits: 0 };

    /// Builds a set from `flags`; values of 64 or more are ignored.
    pub fn from_flags(flags: impl IntoIterator<Item = u32>) -> Self {
        flags.into_iter().fold(Self::EMPTY, |set, flag| set.with(flag))
    }

    pub fn with(self, flag: u32) -> Self {
        match 1_u64.checked_shl(flag) {
            Some(bit) => Self { bits: self.bits | bit },
            None => self,
        }
    }

    pub fn without(self, flag: u32) -> Self {
        match 1_u64.checked_shl(flag) {
            Some(bit) => Self { bits: self.bits & !bit },
            None => self,
        }
    }

    pub fn union(self, other: FlagSet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub fn contains(&self, flag: u32) -> bool {
        1_u64.checked_shl(flag).map_or(false, |bit| self.bits & bit != 0)
    }

    pub fn contains_any(&self, flags: &[u32]) -> bool {
        flags.iter().any(|flag| self.contains(*flag))
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Flags in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..64).filter(move |flag| self.contains(*flag))
    }

    /// The flag at `index` in ascending order. Panics if out of range.
    pub fn get(&self, index: usize) -> u32 {
        match self.iter().nth(index) {
            Some(flag) => flag,
            None => panic!("flag index {} out of range for {} flags", index, self.len()),
        }
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

macro_rules! flag_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $code:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn code(self) -> u32 {
                match self {
                    $($name::$variant => $code),*
                }
            }

            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

flag_enum! {
    /// An operation a player may accept.
    Command {
        PlayPause = 1,
        Prepare = 2,
        Stop = 3,
        SeekToDefaultPosition = 4,
        SeekInCurrentMediaItem = 5,
        SeekToPreviousMediaItem = 6,
        SeekToPrevious = 7,
        SeekToNextMediaItem = 8,
        SeekToNext = 9,
        SeekToMediaItem = 10,
        SeekBack = 11,
        SeekForward = 12,
        SetSpeedAndPitch = 13,
        SetShuffleMode = 14,
        SetRepeatMode = 15,
        GetCurrentMediaItem = 16,
        GetTimeline = 17,
        GetMetadata = 18,
        SetPlaylistMetadata = 19,
        ChangeMediaItems = 20,
        GetAudioAttributes = 21,
        GetVolume = 22,
        GetDeviceVolume = 23,
        SetVolume = 24,
        SetDeviceVolume = 25,
        AdjustDeviceVolume = 26,
        SetVideoSurface = 27,
        GetText = 28,
        SetTrackSelectionParameters = 29,
        GetTracks = 30,
        SetMediaItem = 31,
        Release = 32,
    }
}

flag_enum! {
    /// A state field that changed.
    Event {
        TimelineChanged = 0,
        MediaItemTransition = 1,
        TracksChanged = 2,
        IsLoadingChanged = 3,
        PlaybackStateChanged = 4,
        PlayWhenReadyChanged = 5,
        PlaybackSuppressionReasonChanged = 6,
        IsPlayingChanged = 7,
        RepeatModeChanged = 8,
        ShuffleModeEnabledChanged = 9,
        PlayerError = 10,
        PositionDiscontinuity = 11,
        PlaybackParametersChanged = 12,
        AvailableCommandsChanged = 13,
        MediaMetadataChanged = 14,
        PlaylistMetadataChanged = 15,
        SeekBackIncrementChanged = 16,
        SeekForwardIncrementChanged = 17,
        MaxSeekToPreviousPositionChanged = 18,
        TrackSelectionParametersChanged = 19,
        AudioAttributesChanged = 20,
        AudioSessionId = 21,
        VolumeChanged = 22,
        SkipSilenceEnabledChanged = 23,
        SurfaceSizeChanged = 24,
        VideoSizeChanged = 25,
        RenderedFirstFrame = 26,
        Cues = 27,
        Metadata = 28,
        DeviceInfoChanged = 29,
        DeviceVolumeChanged = 30,
    }
}

/// The set of commands a player currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Commands {
    flags: FlagSet,
}

impl Commands {
    pub const EMPTY: Commands = Commands { flags: FlagSet::EMPTY };

    pub fn new(commands: &[Command]) -> Self {
        Self::EMPTY.build_upon().add_all(commands).build()
    }

    /// Every defined command.
    pub fn all() -> Self {
        Self::new(Command::ALL)
    }

    pub fn builder() -> CommandsBuilder {
        CommandsBuilder { flags: FlagSet::EMPTY }
    }

    pub fn build_upon(&self) -> CommandsBuilder {
        CommandsBuilder { flags: self.flags }
    }

    pub fn contains(&self, command: Command) -> bool {
        self.flags.contains(command.code())
    }

    pub fn contains_any(&self, commands: &[Command]) -> bool {
        commands.iter().any(|command| self.contains(*command))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        self.flags.iter().filter_map(Command::from_code)
    }
}

/// Builder for [`Commands`].
#[derive(Debug, Clone, Copy)]
pub struct CommandsBuilder {
    flags: FlagSet,
}

impl CommandsBuilder {
    pub fn add(mut self, command: Command) -> Self {
        self.flags = self.flags.with(command.code());
        self
    }

    pub fn add_if(self, command: Command, condition: bool) -> Self {
        if condition {
            self.add(command)
        } else {
            self
        }
    }

    pub fn add_all(self, commands: &[Command]) -> Self {
        commands.iter().fold(self, |builder, command| builder.add(*command))
    }

    pub fn add_all_from(mut self, commands: &Commands) -> Self {
        self.flags = self.flags.union(commands.flags);
        self
    }

    pub fn remove(mut self, command: Command) -> Self {
        self.flags = self.flags.without(command.code());
        self
    }

    pub fn remove_if(self, command: Command, condition: bool) -> Self {
        if condition {
            self.remove(command)
        } else {
            self
        }
    }

    pub fn build(self) -> Commands {
        Commands { flags: self.flags }
    }
}

const FIELD_COMMANDS: u32 = 0;

impl Bundleable for Commands {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(
            field_key(FIELD_COMMANDS),
            self.flags.iter().map(i64::from).collect::<Vec<_>>(),
        );
        bundle
    }

    /// Unknown command codes are dropped.
    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let codes = bundle.get::<Vec<i64>>(&field_key(FIELD_COMMANDS))?.unwrap_or_default();
        let commands: Vec<Command> = codes
            .into_iter()
            .filter_map(|code| u32::try_from(code).ok().and_then(Command::from_code))
            .collect();
        Ok(Commands::new(&commands))
    }
}

/// The state fields that changed in one batch of listener callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Events {
    flags: FlagSet,
}

impl Events {
    pub fn new(events: &[Event]) -> Self {
        Self {
            flags: FlagSet::from_flags(events.iter().map(|event| event.code())),
        }
    }

    pub(crate) fn with(self, event: Event) -> Self {
        Self {
            flags: self.flags.with(event.code()),
        }
    }

    pub fn contains(&self, event: Event) -> bool {
        self.flags.contains(event.code())
    }

    pub fn contains_any(&self, events: &[Event]) -> bool {
        events.iter().any(|event| self.contains(*event))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.flags.iter().filter_map(Event::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_set_basics() {
        let set = FlagSet::from_flags([3, 1, 63, 64]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(1) && set.contains(63));
        assert!(!set.contains(64));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 63]);
        assert_eq!(set.get(1), 3);
        assert!(set.without(3).contains_any(&[2, 63]));
    }

    #[test]
    #[should_panic]
    fn test_flag_set_get_out_of_range() {
        FlagSet::EMPTY.get(0);
    }

    #[test]
    fn test_codes_match_enum() {
        for command in Command::ALL {
            assert_eq!(Command::from_code(command.code()), Some(*command));
        }
        assert_eq!(Command::SeekToNext.code(), 9);
        assert_eq!(Event::PositionDiscontinuity.code(), 11);
        assert_eq!(Command::from_code(0), None);
    }

    #[test]
    fn test_commands_builder() {
        let commands = Commands::builder()
            .add_all(&[Command::PlayPause, Command::SeekToNext, Command::SeekBack])
            .remove(Command::SeekBack)
            .add_if(Command::Stop, false)
            .build();
        assert!(commands.contains(Command::PlayPause));
        assert!(!commands.contains(Command::SeekBack));
        assert!(commands.contains_any(&[Command::Stop, Command::SeekToNext]));
        assert_eq!(commands.iter().collect::<Vec<_>>(), vec![Command::PlayPause, Command::SeekToNext]);
        assert_eq!(Commands::all().len(), Command::ALL.len());
    }

    #[test]
    fn test_commands_bundle() {
        let commands = Commands::new(&[Command::Prepare, Command::Release]);
        assert_eq!(Commands::from_bundle(&commands.to_bundle()).unwrap(), commands);
    }

    #[test]
    fn test_events() {
        let events = Events::new(&[Event::TimelineChanged]).with(Event::IsPlayingChanged);
        assert!(events.contains(Event::TimelineChanged));
        assert!(events.contains_any(&[Event::Cues, Event::IsPlayingChanged]));
        assert_eq!(events.len(), 2);
    }
}
