//! User and overall ratings attached to media metadata
//!
//! Four styles exist: heart, thumbs, stars and percentage. Each may be unrated.

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::utils::error::{check_argument, MediaError, Result};

const FIELD_RATING_TYPE: u32 = 0;
const FIELD_RATED: u32 = 1;
const FIELD_VALUE: u32 = 2;
const FIELD_PERCENT: u32 = 1;
const FIELD_MAX_STARS: u32 = 1;
const FIELD_STAR_RATING: u32 = 2;

const RATING_TYPE_HEART: i64 = 0;
const RATING_TYPE_PERCENTAGE: i64 = 1;
const RATING_TYPE_STAR: i64 = 2;
const RATING_TYPE_THUMB: i64 = 3;

/// A rating for media content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rating {
    Heart(HeartRating),
    Thumb(ThumbRating),
    Star(StarRating),
    Percentage(PercentageRating),
}

impl Rating {
    pub fn is_rated(&self) -> bool {
        match self {
            Rating::Heart(rating) => rating.is_rated(),
            Rating::Thumb(rating) => rating.is_rated(),
            Rating::Star(rating) => rating.is_rated(),
            Rating::Percentage(rating) => rating.is_rated(),
        }
    }
}

/// A rating expressed as "heart" or "no heart".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HeartRating {
    is_heart: Option<bool>,
}

impl HeartRating {
    pub fn unrated() -> Self {
        Self { is_heart: None }
    }

    pub fn new(is_heart: bool) -> Self {
        Self { is_heart: Some(is_heart) }
    }

    pub fn is_rated(&self) -> bool {
        self.is_heart.is_some()
    }

    /// Whether the rating is "heart"; false when unrated.
    pub fn is_heart(&self) -> bool {
        self.is_heart.unwrap_or(false)
    }
}

/// A rating expressed as "thumbs up" or "thumbs down".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ThumbRating {
    is_thumbs_up: Option<bool>,
}

impl ThumbRating {
    pub fn unrated() -> Self {
        Self { is_thumbs_up: None }
    }

    pub fn new(is_thumbs_up: bool) -> Self {
        Self { is_thumbs_up: Some(is_thumbs_up) }
    }

    pub fn is_rated(&self) -> bool {
        self.is_thumbs_up.is_some()
    }

    pub fn is_thumbs_up(&self) -> bool {
        self.is_thumbs_up.unwrap_or(false)
    }
}

/// A rating expressed as a fractional number of stars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRating {
    max_stars: u32,
    star_rating: Option<f32>,
}

impl StarRating {
    /// Creates an unrated instance with the given maximum number of stars.
    pub fn unrated(max_stars: u32) -> Result<Self> {
        check_argument(max_stars > 0, || "max_stars must be a positive integer".to_string())?;
        Ok(Self { max_stars, star_rating: None })
    }

    /// Creates a rated instance; `star_rating` must lie in `0..=max_stars`.
    pub fn new(max_stars: u32, star_rating: f32) -> Result<Self> {
        check_argument(max_stars > 0, || "max_stars must be a positive integer".to_string())?;
        check_argument(star_rating >= 0.0 && star_rating <= max_stars as f32, || {
            format!("star_rating {} is out of range [0, {}]", star_rating, max_stars)
        })?;
        Ok(Self {
            max_stars,
            star_rating: Some(star_rating),
        })
    }

    pub fn is_rated(&self) -> bool {
        self.star_rating.is_some()
    }

    pub fn max_stars(&self) -> u32 {
        self.max_stars
    }

    pub fn star_rating(&self) -> Option<f32> {
        self.star_rating
    }
}

/// A rating expressed as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentageRating {
    percent: Option<f32>,
}

impl PercentageRating {
    pub fn unrated() -> Self {
        Self { percent: None }
    }

    /// Creates a rated instance; `percent` must lie in `0..=100`.
    pub fn new(percent: f32) -> Result<Self> {
        check_argument((0.0..=100.0).contains(&percent), || {
            format!("percent {} is out of range [0, 100]", percent)
        })?;
        Ok(Self { percent: Some(percent) })
    }

    pub fn is_rated(&self) -> bool {
        self.percent.is_some()
    }

    pub fn percent(&self) -> Option<f32> {
        self.percent
    }
}

impl Bundleable for Rating {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        match self {
            Rating::Heart(rating) => {
                bundle.put(field_key(FIELD_RATING_TYPE), RATING_TYPE_HEART);
                bundle.put(field_key(FIELD_RATED), rating.is_rated());
                bundle.put(field_key(FIELD_VALUE), rating.is_heart());
            }
            Rating::Thumb(rating) => {
                bundle.put(field_key(FIELD_RATING_TYPE), RATING_TYPE_THUMB);
                bundle.put(field_key(FIELD_RATED), rating.is_rated());
                bundle.put(field_key(FIELD_VALUE), rating.is_thumbs_up());
            }
            Rating::Star(rating) => {
                bundle.put(field_key(FIELD_RATING_TYPE), RATING_TYPE_STAR);
                bundle.put(field_key(FIELD_MAX_STARS), rating.max_stars);
                bundle.put(field_key(FIELD_STAR_RATING), rating.star_rating.unwrap_or(-1.0));
            }
            Rating::Percentage(rating) => {
                bundle.put(field_key(FIELD_RATING_TYPE), RATING_TYPE_PERCENTAGE);
                bundle.put(field_key(FIELD_PERCENT), rating.percent.unwrap_or(-1.0));
            }
        }
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let rating_type: i64 = bundle.require(&field_key(FIELD_RATING_TYPE))?;
        match rating_type {
            RATING_TYPE_HEART => {
                let rated = bundle.get_or(&field_key(FIELD_RATED), false)?;
                Ok(Rating::Heart(if rated {
                    HeartRating::new(bundle.get_or(&field_key(FIELD_VALUE), false)?)
                } else {
                    HeartRating::unrated()
                }))
            }
            RATING_TYPE_THUMB => {
                let rated = bundle.get_or(&field_key(FIELD_RATED), false)?;
                Ok(Rating::Thumb(if rated {
                    ThumbRating::new(bundle.get_or(&field_key(FIELD_VALUE), false)?)
                } else {
                    ThumbRating::unrated()
                }))
            }
            RATING_TYPE_STAR => {
                let max_stars = bundle.get_or(&field_key(FIELD_MAX_STARS), 5_u32)?;
                let star_rating = bundle.get_or(&field_key(FIELD_STAR_RATING), -1.0_f32)?;
                Ok(Rating::Star(if star_rating == -1.0 {
                    StarRating::unrated(max_stars)?
                } else {
                    StarRating::new(max_stars, star_rating)?
                }))
            }
            RATING_TYPE_PERCENTAGE => {
                let percent = bundle.get_or(&field_key(FIELD_PERCENT), -1.0_f32)?;
                Ok(Rating::Percentage(if percent == -1.0 {
                    PercentageRating::unrated()
                } else {
                    PercentageRating::new(percent)?
                }))
            }
            other => Err(MediaError::bundle(format!("unknown rating type {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_rating_bounds() {
        assert!(StarRating::unrated(0).is_err());
        assert!(StarRating::new(5, 5.5).is_err());
        assert!(StarRating::new(5, -0.5).is_err());
        let rating = StarRating::new(5, 3.5).unwrap();
        assert!(rating.is_rated());
        assert_eq!(rating.star_rating(), Some(3.5));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(PercentageRating::new(100.5).is_err());
        assert!(PercentageRating::new(0.0).unwrap().is_rated());
        assert!(!PercentageRating::unrated().is_rated());
    }

    #[test]
    fn test_unrated_heart_reports_false() {
        let rating = HeartRating::unrated();
        assert!(!rating.is_rated());
        assert!(!rating.is_heart());
    }

    #[test]
    fn test_bundle_preserves_unrated_state() {
        let ratings = [
            Rating::Heart(HeartRating::unrated()),
            Rating::Thumb(ThumbRating::new(false)),
            Rating::Star(StarRating::unrated(4).unwrap()),
            Rating::Percentage(PercentageRating::new(42.0).unwrap()),
        ];
        for rating in ratings {
            assert_eq!(Rating::from_bundle(&rating.to_bundle()).unwrap(), rating);
        }
    }

    #[test]
    fn test_unknown_rating_type() {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_RATING_TYPE), 9_i64);
        assert!(Rating::from_bundle(&bundle).is_err());
    }
}
