//! Descriptive metadata of a media item

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::media::rating::Rating;
use crate::utils::error::Result;

const FIELD_TITLE: u32 = 0;
const FIELD_ARTIST: u32 = 1;
const FIELD_ALBUM_TITLE: u32 = 2;
const FIELD_ALBUM_ARTIST: u32 = 3;
const FIELD_DISPLAY_TITLE: u32 = 4;
const FIELD_SUBTITLE: u32 = 5;
const FIELD_DESCRIPTION: u32 = 6;
const FIELD_USER_RATING: u32 = 8;
const FIELD_OVERALL_RATING: u32 = 9;
const FIELD_ARTWORK_DATA: u32 = 10;
const FIELD_ARTWORK_URI: u32 = 11;
const FIELD_TRACK_NUMBER: u32 = 12;
const FIELD_TOTAL_TRACK_COUNT: u32 = 13;
const FIELD_IS_PLAYABLE: u32 = 15;
const FIELD_RECORDING_YEAR: u32 = 16;
const FIELD_RECORDING_MONTH: u32 = 17;
const FIELD_RECORDING_DAY: u32 = 18;
const FIELD_RELEASE_YEAR: u32 = 19;
const FIELD_RELEASE_MONTH: u32 = 20;
const FIELD_RELEASE_DAY: u32 = 21;
const FIELD_WRITER: u32 = 22;
const FIELD_COMPOSER: u32 = 23;
const FIELD_CONDUCTOR: u32 = 24;
const FIELD_DISC_NUMBER: u32 = 25;
const FIELD_TOTAL_DISC_COUNT: u32 = 26;
const FIELD_GENRE: u32 = 27;
const FIELD_COMPILATION: u32 = 28;
const FIELD_STATION: u32 = 30;
const FIELD_MEDIA_TYPE: u32 = 31;
const FIELD_IS_BROWSABLE: u32 = 32;
const FIELD_DURATION_MS: u32 = 33;

/// Kind of content an item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Mixed,
    Music,
    AudioBookChapter,
    PodcastEpisode,
    RadioStation,
    News,
    Video,
    Trailer,
    Movie,
    TvShow,
    Album,
    Artist,
    Genre,
    Playlist,
    Podcast,
}

impl MediaType {
    const ALL: [MediaType; 15] = [
        MediaType::Mixed,
        MediaType::Music,
        MediaType::AudioBookChapter,
        MediaType::PodcastEpisode,
        MediaType::RadioStation,
        MediaType::News,
        MediaType::Video,
        MediaType::Trailer,
        MediaType::Movie,
        MediaType::TvShow,
        MediaType::Album,
        MediaType::Artist,
        MediaType::Genre,
        MediaType::Playlist,
        MediaType::Podcast,
    ];

    pub fn code(self) -> i64 {
        Self::ALL.iter().position(|candidate| *candidate == self).unwrap_or(0) as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code).ok().and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Metadata of a media item. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_title: Option<String>,
    pub album_artist: Option<String>,
    pub display_title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub user_rating: Option<Rating>,
    pub overall_rating: Option<Rating>,
    pub artwork_data: Option<Vec<u8>>,
    pub artwork_uri: Option<String>,
    pub track_number: Option<u32>,
    pub total_track_count: Option<u32>,
    pub is_browsable: Option<bool>,
    pub is_playable: Option<bool>,
    pub recording_year: Option<i32>,
    pub recording_month: Option<u32>,
    pub recording_day: Option<u32>,
    pub release_year: Option<i32>,
    pub release_month: Option<u32>,
    pub release_day: Option<u32>,
    pub writer: Option<String>,
    pub composer: Option<String>,
    pub conductor: Option<String>,
    pub disc_number: Option<u32>,
    pub total_disc_count: Option<u32>,
    pub genre: Option<String>,
    pub compilation: Option<String>,
    pub station: Option<String>,
    pub media_type: Option<MediaType>,
    pub duration_ms: Option<i64>,
}

impl MediaMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> MediaMetadataBuilder {
        MediaMetadataBuilder::default()
    }

    pub fn build_upon(&self) -> MediaMetadataBuilder {
        MediaMetadataBuilder { metadata: self.clone() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

macro_rules! setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<Option<$ty>>) -> Self {
                self.metadata.$field = value.into();
                self
            }
        )*
    };
}

/// Builder for [`MediaMetadata`].
#[derive(Debug, Clone, Default)]
pub struct MediaMetadataBuilder {
    metadata: MediaMetadata,
}

impl MediaMetadataBuilder {
    setters! {
        title: String,
        artist: String,
        album_title: String,
        album_artist: String,
        display_title: String,
        subtitle: String,
        description: String,
        user_rating: Rating,
        overall_rating: Rating,
        artwork_data: Vec<u8>,
        artwork_uri: String,
        track_number: u32,
        total_track_count: u32,
        is_browsable: bool,
        is_playable: bool,
        recording_year: i32,
        recording_month: u32,
        recording_day: u32,
        release_year: i32,
        release_month: u32,
        release_day: u32,
        writer: String,
        composer: String,
        conductor: String,
        disc_number: u32,
        total_disc_count: u32,
        genre: String,
        compilation: String,
        station: String,
        media_type: MediaType,
        duration_ms: i64,
    }

    /// Copies every field that is set in `other` over this builder's value.
    pub fn populate(mut self, other: &MediaMetadata) -> Self {
        macro_rules! take {
            ($target:ident, $source:ident; $($field:ident),*) => {
                $(
                    if $source.$field.is_some() {
                        $target.$field = $source.$field.clone();
                    }
                )*
            };
        }
        let target = &mut self.metadata;
        take!(
            target, other;
            title, artist, album_title, album_artist, display_title, subtitle, description,
            user_rating, overall_rating, artwork_data, artwork_uri, track_number,
            total_track_count, is_browsable, is_playable, recording_year, recording_month,
            recording_day, release_year, release_month, release_day, writer, composer,
            conductor, disc_number, total_disc_count, genre, compilation, station, media_type,
            duration_ms
        );
        self
    }

    pub fn build(self) -> MediaMetadata {
        self.metadata
    }
}

impl Bundleable for MediaMetadata {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put_opt(field_key(FIELD_TITLE), self.title.clone());
        bundle.put_opt(field_key(FIELD_ARTIST), self.artist.clone());
        bundle.put_opt(field_key(FIELD_ALBUM_TITLE), self.album_title.clone());
        bundle.put_opt(field_key(FIELD_ALBUM_ARTIST), self.album_artist.clone());
        bundle.put_opt(field_key(FIELD_DISPLAY_TITLE), self.display_title.clone());
        bundle.put_opt(field_key(FIELD_SUBTITLE), self.subtitle.clone());
        bundle.put_opt(field_key(FIELD_DESCRIPTION), self.description.clone());
        if let Some(rating) = &self.user_rating {
            bundle.put_bundleable(field_key(FIELD_USER_RATING), rating);
        }
        if let Some(rating) = &self.overall_rating {
            bundle.put_bundleable(field_key(FIELD_OVERALL_RATING), rating);
        }
        bundle.put_opt(field_key(FIELD_ARTWORK_DATA), self.artwork_data.clone());
        bundle.put_opt(field_key(FIELD_ARTWORK_URI), self.artwork_uri.clone());
        bundle.put_opt(field_key(FIELD_TRACK_NUMBER), self.track_number);
        bundle.put_opt(field_key(FIELD_TOTAL_TRACK_COUNT), self.total_track_count);
        bundle.put_opt(field_key(FIELD_IS_BROWSABLE), self.is_browsable);
        bundle.put_opt(field_key(FIELD_IS_PLAYABLE), self.is_playable);
        bundle.put_opt(field_key(FIELD_RECORDING_YEAR), self.recording_year);
        bundle.put_opt(field_key(FIELD_RECORDING_MONTH), self.recording_month);
        bundle.put_opt(field_key(FIELD_RECORDING_DAY), self.recording_day);
        bundle.put_opt(field_key(FIELD_RELEASE_YEAR), self.release_year);
        bundle.put_opt(field_key(FIELD_RELEASE_MONTH), self.release_month);
        bundle.put_opt(field_key(FIELD_RELEASE_DAY), self.release_day);
        bundle.put_opt(field_key(FIELD_WRITER), self.writer.clone());
        bundle.put_opt(field_key(FIELD_COMPOSER), self.composer.clone());
        bundle.put_opt(field_key(FIELD_CONDUCTOR), self.conductor.clone());
        bundle.put_opt(field_key(FIELD_DISC_NUMBER), self.disc_number);
        bundle.put_opt(field_key(FIELD_TOTAL_DISC_COUNT), self.total_disc_count);
        bundle.put_opt(field_key(FIELD_GENRE), self.genre.clone());
        bundle.put_opt(field_key(FIELD_COMPILATION), self.compilation.clone());
        bundle.put_opt(field_key(FIELD_STATION), self.station.clone());
        bundle.put_opt(field_key(FIELD_MEDIA_TYPE), self.media_type.map(MediaType::code));
        bundle.put_opt(field_key(FIELD_DURATION_MS), self.duration_ms);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        Ok(MediaMetadata {
            title: bundle.get(&field_key(FIELD_TITLE))?,
            artist: bundle.get(&field_key(FIELD_ARTIST))?,
            album_title: bundle.get(&field_key(FIELD_ALBUM_TITLE))?,
            album_artist: bundle.get(&field_key(FIELD_ALBUM_ARTIST))?,
            display_title: bundle.get(&field_key(FIELD_DISPLAY_TITLE))?,
            subtitle: bundle.get(&field_key(FIELD_SUBTITLE))?,
            description: bundle.get(&field_key(FIELD_DESCRIPTION))?,
            user_rating: bundle.get_bundleable(&field_key(FIELD_USER_RATING))?,
            overall_rating: bundle.get_bundleable(&field_key(FIELD_OVERALL_RATING))?,
            artwork_data: bundle.get(&field_key(FIELD_ARTWORK_DATA))?,
            artwork_uri: bundle.get(&field_key(FIELD_ARTWORK_URI))?,
            track_number: bundle.get(&field_key(FIELD_TRACK_NUMBER))?,
            total_track_count: bundle.get(&field_key(FIELD_TOTAL_TRACK_COUNT))?,
            is_browsable: bundle.get(&field_key(FIELD_IS_BROWSABLE))?,
            is_playable: bundle.get(&field_key(FIELD_IS_PLAYABLE))?,
            recording_year: bundle.get(&field_key(FIELD_RECORDING_YEAR))?,
            recording_month: bundle.get(&field_key(FIELD_RECORDING_MONTH))?,
            recording_day: bundle.get(&field_key(FIELD_RECORDING_DAY))?,
            release_year: bundle.get(&field_key(FIELD_RELEASE_YEAR))?,
            release_month: bundle.get(&field_key(FIELD_RELEASE_MONTH))?,
            release_day: bundle.get(&field_key(FIELD_RELEASE_DAY))?,
            writer: bundle.get(&field_key(FIELD_WRITER))?,
            composer: bundle.get(&field_key(FIELD_COMPOSER))?,
            conductor: bundle.get(&field_key(FIELD_CONDUCTOR))?,
            disc_number: bundle.get(&field_key(FIELD_DISC_NUMBER))?,
            total_disc_count: bundle.get(&field_key(FIELD_TOTAL_DISC_COUNT))?,
            genre: bundle.get(&field_key(FIELD_GENRE))?,
            compilation: bundle.get(&field_key(FIELD_COMPILATION))?,
            station: bundle.get(&field_key(FIELD_STATION))?,
            media_type: bundle
                .get::<i64>(&field_key(FIELD_MEDIA_TYPE))?
                .and_then(MediaType::from_code),
            duration_ms: bundle.get(&field_key(FIELD_DURATION_MS))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::rating::StarRating;

    #[test]
    fn test_empty_metadata() {
        assert!(MediaMetadata::empty().is_empty());
        assert!(MediaMetadata::empty().to_bundle().is_empty());
    }

    #[test]
    fn test_populate_overrides_set_fields_only() {
        let base = MediaMetadata::builder()
            .title("Original".to_string())
            .artist("Band".to_string())
            .build();
        let update = MediaMetadata::builder().title("Remaster".to_string()).build();

        let merged = base.build_upon().populate(&update).build();
        assert_eq!(merged.title.as_deref(), Some("Remaster"));
        assert_eq!(merged.artist.as_deref(), Some("Band"));
    }

    #[test]
    fn test_media_type_codes() {
        assert_eq!(MediaType::from_code(MediaType::Podcast.code()), Some(MediaType::Podcast));
        assert_eq!(MediaType::from_code(99), None);
    }

    #[test]
    fn test_bundle_keeps_ratings_and_artwork() {
        let metadata = MediaMetadata::builder()
            .title("Song".to_string())
            .user_rating(Rating::Star(StarRating::new(5, 4.0).unwrap()))
            .artwork_data(vec![0xff, 0xd8])
            .track_number(3)
            .media_type(MediaType::Music)
            .duration_ms(180_000)
            .build();
        assert_eq!(MediaMetadata::from_bundle(&metadata.to_bundle()).unwrap(), metadata);
    }
}
