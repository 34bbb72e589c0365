//! Ad group layout of a period
//!
//! An [`AdPlaybackState`] lists the ad groups inserted into one period, the
//! state of every ad in them and where content resumes afterwards. It is a
//! value: every modifier returns an updated copy.

use serde::{Deserialize, Serialize};

use crate::bundle::{field_key, Bundle, Bundleable};
use crate::constants::TIME_END_OF_SOURCE;
use crate::utils::error::{check_argument, MediaError, Result};

/// State of one ad within an ad group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdState {
    /// The ad is not yet loaded.
    Unavailable,
    Available,
    Skipped,
    Played,
    Error,
}

impl AdState {
    fn code(self) -> i64 {
        match self {
            AdState::Unavailable => 0,
            AdState::Available => 1,
            AdState::Skipped => 2,
            AdState::Played => 3,
            AdState::Error => 4,
        }
    }

    fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(AdState::Unavailable),
            1 => Ok(AdState::Available),
            2 => Ok(AdState::Skipped),
            3 => Ok(AdState::Played),
            4 => Ok(AdState::Error),
            other => Err(MediaError::bundle(format!("unknown ad state {}", other))),
        }
    }

    fn is_playable(self) -> bool {
        matches!(self, AdState::Unavailable | AdState::Available)
    }
}

/// One group of ads played at the same content position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdGroup {
    /// Position in the period, or [`TIME_END_OF_SOURCE`] for a postroll.
    pub time_us: i64,
    /// Number of ads, if known.
    pub count: Option<usize>,
    pub original_count: Option<usize>,
    pub states: Vec<AdState>,
    pub durations_us: Vec<Option<i64>>,
    pub content_resume_offset_us: i64,
    pub is_server_side_inserted: bool,
}

impl AdGroup {
    pub fn new(time_us: i64) -> Self {
        Self {
            time_us,
            count: None,
            original_count: None,
            states: Vec::new(),
            durations_us: Vec::new(),
            content_resume_offset_us: 0,
            is_server_side_inserted: false,
        }
    }

    fn removed() -> Self {
        Self::new(0).with_ad_count(0)
    }

    /// Index of the first ad that should play.
    pub fn first_ad_index_to_play(&self) -> usize {
        self.next_ad_index_to_play(None)
    }

    /// Index of the ad to play after `last_played_ad_index`; equal to
    /// `states.len()` when no further ad should play.
    pub fn next_ad_index_to_play(&self, last_played_ad_index: Option<usize>) -> usize {
        let mut next = last_played_ad_index.map_or(0, |index| index + 1);
        while next < self.states.len() {
            if self.is_server_side_inserted || self.states[next].is_playable() {
                break;
            }
            next += 1;
        }
        next
    }

    /// Whether at least one ad should play, or the count is not known yet.
    pub fn should_play_ad_group(&self) -> bool {
        match self.count {
            None => true,
            Some(count) => self.first_ad_index_to_play() < count,
        }
    }

    /// Whether an ad is still to play, or the count is not known yet.
    ///
    /// Server-side inserted ads stay playable after being played.
    pub fn has_unplayed_ads(&self) -> bool {
        match self.count {
            None => true,
            Some(count) => self.first_ad_index_to_play() < count,
        }
    }

    /// Whether this is a live postroll placeholder with an unknown ad count.
    pub fn is_live_postroll_placeholder(&self) -> bool {
        self.is_server_side_inserted && self.time_us == TIME_END_OF_SOURCE && self.count.is_none()
    }

    pub fn with_time_us(mut self, time_us: i64) -> Self {
        self.time_us = time_us;
        self
    }

    /// Sets the ad count; existing states and durations are padded or kept.
    pub fn with_ad_count(mut self, count: usize) -> Self {
        if self.states.len() < count {
            self.states.resize(count, AdState::Unavailable);
        }
        if self.durations_us.len() < count {
            self.durations_us.resize(count, None);
        }
        self.count = Some(count);
        self.original_count = Some(count);
        self
    }

    pub fn with_ad_state(mut self, state: AdState, index: usize) -> Result<Self> {
        check_argument(self.count.map_or(true, |count| index < count), || {
            format!("ad index {} is out of range", index)
        })?;
        if self.states.len() <= index {
            self.states.resize(index + 1, AdState::Unavailable);
            self.durations_us.resize(index + 1, None);
        }
        check_argument(
            self.states[index] != AdState::Played || state == AdState::Played || state == AdState::Skipped,
            || format!("cannot move played ad {} to {:?}", index, state),
        )?;
        self.states[index] = state;
        Ok(self)
    }

    /// Marks every unavailable or available ad as skipped; ends the group.
    pub fn with_all_ads_skipped(mut self) -> Self {
        if self.count.is_none() {
            self.states.clear();
            self.durations_us.clear();
            self.count = Some(0);
            return self;
        }
        for state in &mut self.states {
            if state.is_playable() {
                *state = AdState::Skipped;
            }
        }
        self
    }

    /// Resets played, skipped and failed ads back to available.
    pub fn with_all_ads_reset(mut self) -> Self {
        for state in &mut self.states {
            if matches!(state, AdState::Played | AdState::Skipped | AdState::Error) {
                *state = AdState::Available;
            }
        }
        self
    }

    pub fn with_ad_durations_us(mut self, mut durations_us: Vec<Option<i64>>) -> Self {
        durations_us.resize(self.states.len(), None);
        self.durations_us = durations_us;
        self
    }

    pub fn with_content_resume_offset_us(mut self, offset_us: i64) -> Self {
        self.content_resume_offset_us = offset_us;
        self
    }

    pub fn with_is_server_side_inserted(mut self, server_side: bool) -> Self {
        self.is_server_side_inserted = server_side;
        self
    }
}

const FIELD_GROUP_TIME_US: u32 = 0;
const FIELD_GROUP_COUNT: u32 = 1;
const FIELD_GROUP_STATES: u32 = 3;
const FIELD_GROUP_DURATIONS_US: u32 = 4;
const FIELD_GROUP_CONTENT_RESUME_OFFSET_US: u32 = 5;
const FIELD_GROUP_IS_SERVER_SIDE_INSERTED: u32 = 6;
const FIELD_GROUP_ORIGINAL_COUNT: u32 = 7;

const UNKNOWN_DURATION: i64 = -1;

impl Bundleable for AdGroup {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        bundle.put(field_key(FIELD_GROUP_TIME_US), self.time_us);
        bundle.put_opt(field_key(FIELD_GROUP_COUNT), self.count);
        bundle.put_opt(field_key(FIELD_GROUP_ORIGINAL_COUNT), self.original_count);
        bundle.put(
            field_key(FIELD_GROUP_STATES),
            self.states.iter().map(|state| state.code()).collect::<Vec<_>>(),
        );
        bundle.put(
            field_key(FIELD_GROUP_DURATIONS_US),
            self.durations_us
                .iter()
                .map(|duration| duration.unwrap_or(UNKNOWN_DURATION))
                .collect::<Vec<_>>(),
        );
        bundle.put(field_key(FIELD_GROUP_CONTENT_RESUME_OFFSET_US), self.content_resume_offset_us);
        bundle.put(field_key(FIELD_GROUP_IS_SERVER_SIDE_INSERTED), self.is_server_side_inserted);
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let states = bundle
            .get::<Vec<i64>>(&field_key(FIELD_GROUP_STATES))?
            .unwrap_or_default()
            .into_iter()
            .map(AdState::from_code)
            .collect::<Result<Vec<_>>>()?;
        let durations_us = bundle
            .get::<Vec<i64>>(&field_key(FIELD_GROUP_DURATIONS_US))?
            .unwrap_or_default()
            .into_iter()
            .map(|duration| (duration != UNKNOWN_DURATION).then_some(duration))
            .collect();
        let count: Option<usize> = bundle.get(&field_key(FIELD_GROUP_COUNT))?;
        Ok(AdGroup {
            time_us: bundle.get_or(&field_key(FIELD_GROUP_TIME_US), 0)?,
            count,
            original_count: bundle.get::<usize>(&field_key(FIELD_GROUP_ORIGINAL_COUNT))?.or(count),
            states,
            durations_us,
            content_resume_offset_us: bundle.get_or(&field_key(FIELD_GROUP_CONTENT_RESUME_OFFSET_US), 0)?,
            is_server_side_inserted: bundle.get_or(&field_key(FIELD_GROUP_IS_SERVER_SIDE_INSERTED), false)?,
        })
    }
}

/// Ad groups of a period and the playback state of their ads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdPlaybackState {
    /// Opaque identifier of the ads source; not serialized.
    pub ads_id: Option<String>,
    ad_groups: Vec<AdGroup>,
    pub ad_resume_position_us: i64,
    pub content_duration_us: Option<i64>,
    removed_ad_group_count: usize,
}

impl AdPlaybackState {
    /// A state without ads.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a state with one ad group per entry of `ad_group_times_us`,
    /// which must be sorted with any postroll last.
    pub fn new(ads_id: Option<String>, ad_group_times_us: &[i64]) -> Self {
        Self {
            ads_id,
            ad_groups: ad_group_times_us.iter().map(|&time_us| AdGroup::new(time_us)).collect(),
            ad_resume_position_us: 0,
            content_duration_us: None,
            removed_ad_group_count: 0,
        }
    }

    pub fn ad_group_count(&self) -> usize {
        self.ad_groups.len()
    }

    /// Number of leading ad groups that were removed.
    pub fn removed_ad_group_count(&self) -> usize {
        self.removed_ad_group_count
    }

    /// Panics if `ad_group_index` is out of range.
    pub fn ad_group(&self, ad_group_index: usize) -> &AdGroup {
        &self.ad_groups[ad_group_index]
    }

    pub fn is_ad_in_error_state(&self, ad_group_index: usize, ad_index: usize) -> bool {
        self.ad_groups
            .get(ad_group_index)
            .and_then(|group| group.states.get(ad_index))
            .map_or(false, |state| *state == AdState::Error)
    }

    /// Index of the ad group at or before `position_us` that still has ads
    /// to play.
    ///
    /// # Arguments
    /// * `position_us` - position in the period, or [`TIME_END_OF_SOURCE`]
    /// * `period_duration_us` - duration of the period, if known
    pub fn ad_group_index_for_position_us(&self, position_us: i64, period_duration_us: Option<i64>) -> Option<usize> {
        let mut index = self.ad_groups.len();
        while index > 0 && self.is_position_before_ad_group(position_us, period_duration_us, index - 1) {
            index -= 1;
        }
        let index = index.checked_sub(1)?;
        self.ad_groups[index].has_unplayed_ads().then_some(index)
    }

    /// Index of the first ad group after `position_us` that should play.
    pub fn ad_group_index_after_position_us(
        &self,
        position_us: i64,
        period_duration_us: Option<i64>,
    ) -> Option<usize> {
        if position_us == TIME_END_OF_SOURCE || period_duration_us.map_or(false, |duration| position_us >= duration) {
            return None;
        }
        (self.removed_ad_group_count..self.ad_groups.len()).find(|&index| {
            let group = &self.ad_groups[index];
            (group.time_us == TIME_END_OF_SOURCE || group.time_us > position_us) && group.should_play_ad_group()
        })
    }

    fn is_position_before_ad_group(&self, position_us: i64, period_duration_us: Option<i64>, ad_group_index: usize) -> bool {
        if position_us == TIME_END_OF_SOURCE {
            return false;
        }
        let group = &self.ad_groups[ad_group_index];
        if group.time_us == TIME_END_OF_SOURCE {
            return match period_duration_us {
                None => true,
                Some(duration) => {
                    (group.is_server_side_inserted && group.count.is_none()) || position_us < duration
                }
            };
        }
        position_us < group.time_us
    }

    fn update_group(mut self, ad_group_index: usize, update: impl FnOnce(AdGroup) -> Result<AdGroup>) -> Result<Self> {
        check_argument(ad_group_index < self.ad_groups.len(), || {
            format!("ad group index {} is out of range", ad_group_index)
        })?;
        let group = std::mem::replace(&mut self.ad_groups[ad_group_index], AdGroup::new(0));
        self.ad_groups[ad_group_index] = update(group)?;
        Ok(self)
    }

    pub fn with_ad_group_time_us(self, ad_group_index: usize, time_us: i64) -> Result<Self> {
        self.update_group(ad_group_index, |group| Ok(group.with_time_us(time_us)))
    }

    /// Inserts an empty ad group at `ad_group_index`.
    pub fn with_new_ad_group(mut self, ad_group_index: usize, time_us: i64) -> Result<Self> {
        check_argument(
            ad_group_index >= self.removed_ad_group_count && ad_group_index <= self.ad_groups.len(),
            || format!("cannot insert ad group at {}", ad_group_index),
        )?;
        self.ad_groups.insert(ad_group_index, AdGroup::new(time_us));
        Ok(self)
    }

    pub fn with_ad_count(self, ad_group_index: usize, count: usize) -> Result<Self> {
        check_argument(count > 0, || "ad count must be positive".to_string())?;
        self.update_group(ad_group_index, |group| {
            check_argument(group.count.map_or(true, |current| current == count), || {
                format!("ad group {} already has a different count", ad_group_index)
            })?;
            Ok(group.with_ad_count(count))
        })
    }

    pub fn with_available_ad(self, ad_group_index: usize, ad_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| group.with_ad_state(AdState::Available, ad_index))
    }

    pub fn with_played_ad(self, ad_group_index: usize, ad_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| group.with_ad_state(AdState::Played, ad_index))
    }

    pub fn with_skipped_ad(self, ad_group_index: usize, ad_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| group.with_ad_state(AdState::Skipped, ad_index))
    }

    pub fn with_ad_load_error(self, ad_group_index: usize, ad_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| group.with_ad_state(AdState::Error, ad_index))
    }

    pub fn with_skipped_ad_group(self, ad_group_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| Ok(group.with_all_ads_skipped()))
    }

    pub fn with_reset_ad_group(self, ad_group_index: usize) -> Result<Self> {
        self.update_group(ad_group_index, |group| Ok(group.with_all_ads_reset()))
    }

    /// Sets ad durations per group; extra or missing groups are an error.
    pub fn with_ad_durations_us(mut self, durations_us: Vec<Vec<Option<i64>>>) -> Result<Self> {
        check_argument(durations_us.len() == self.ad_groups.len(), || {
            format!(
                "expected durations for {} ad groups, got {}",
                self.ad_groups.len(),
                durations_us.len()
            )
        })?;
        for (index, durations) in durations_us.into_iter().enumerate() {
            if index < self.removed_ad_group_count {
                continue;
            }
            let group = std::mem::replace(&mut self.ad_groups[index], AdGroup::new(0));
            self.ad_groups[index] = group.with_ad_durations_us(durations);
        }
        Ok(self)
    }

    pub fn with_ad_resume_position_us(mut self, position_us: i64) -> Self {
        self.ad_resume_position_us = position_us;
        self
    }

    pub fn with_content_duration_us(mut self, duration_us: Option<i64>) -> Self {
        self.content_duration_us = duration_us;
        self
    }

    pub fn with_content_resume_offset_us(self, ad_group_index: usize, offset_us: i64) -> Result<Self> {
        self.update_group(ad_group_index, |group| Ok(group.with_content_resume_offset_us(offset_us)))
    }

    pub fn with_is_server_side_inserted(self, ad_group_index: usize, server_side: bool) -> Result<Self> {
        self.update_group(ad_group_index, |group| Ok(group.with_is_server_side_inserted(server_side)))
    }

    /// Marks the first `count` ad groups as removed. The count can only grow.
    pub fn with_removed_ad_group_count(mut self, count: usize) -> Result<Self> {
        check_argument(
            count >= self.removed_ad_group_count && count <= self.ad_groups.len(),
            || format!("invalid removed ad group count {}", count),
        )?;
        for group in self.ad_groups.iter_mut().take(count).skip(self.removed_ad_group_count) {
            *group = AdGroup::removed();
        }
        self.removed_ad_group_count = count;
        Ok(self)
    }
}

const FIELD_AD_GROUPS: u32 = 1;
const FIELD_AD_RESUME_POSITION_US: u32 = 2;
const FIELD_CONTENT_DURATION_US: u32 = 3;
const FIELD_REMOVED_AD_GROUP_COUNT: u32 = 4;

impl Bundleable for AdPlaybackState {
    fn to_bundle(&self) -> Bundle {
        let mut bundle = Bundle::new();
        if !self.ad_groups.is_empty() {
            bundle.put_bundleable_list(field_key(FIELD_AD_GROUPS), &self.ad_groups);
        }
        if self.ad_resume_position_us != 0 {
            bundle.put(field_key(FIELD_AD_RESUME_POSITION_US), self.ad_resume_position_us);
        }
        bundle.put_opt(field_key(FIELD_CONTENT_DURATION_US), self.content_duration_us);
        if self.removed_ad_group_count != 0 {
            bundle.put(field_key(FIELD_REMOVED_AD_GROUP_COUNT), self.removed_ad_group_count);
        }
        bundle
    }

    fn from_bundle(bundle: &Bundle) -> Result<Self> {
        let state = AdPlaybackState {
            ads_id: None,
            ad_groups: bundle.get_bundleable_list(&field_key(FIELD_AD_GROUPS))?,
            ad_resume_position_us: bundle.get_or(&field_key(FIELD_AD_RESUME_POSITION_US), 0)?,
            content_duration_us: bundle.get(&field_key(FIELD_CONTENT_DURATION_US))?,
            removed_ad_group_count: bundle.get_or(&field_key(FIELD_REMOVED_AD_GROUP_COUNT), 0)?,
        };
        check_argument(state.removed_ad_group_count <= state.ad_groups.len(), || {
            "removed ad group count exceeds ad group count".to_string()
        })?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midroll_state() -> AdPlaybackState {
        AdPlaybackState::new(None, &[0, 5_000_000, TIME_END_OF_SOURCE])
            .with_ad_count(0, 1)
            .unwrap()
            .with_ad_count(1, 2)
            .unwrap()
            .with_ad_count(2, 1)
            .unwrap()
    }

    #[test]
    fn test_group_index_for_position() {
        let state = midroll_state();
        assert_eq!(state.ad_group_index_for_position_us(0, Some(10_000_000)), Some(0));
        assert_eq!(state.ad_group_index_for_position_us(6_000_000, Some(10_000_000)), Some(1));
        assert_eq!(state.ad_group_index_for_position_us(TIME_END_OF_SOURCE, Some(10_000_000)), Some(2));

        let state = state.with_played_ad(1, 0).unwrap().with_played_ad(1, 1).unwrap();
        assert_eq!(state.ad_group_index_for_position_us(6_000_000, Some(10_000_000)), None);
    }

    #[test]
    fn test_group_index_after_position() {
        let state = midroll_state();
        assert_eq!(state.ad_group_index_after_position_us(0, Some(10_000_000)), Some(1));
        assert_eq!(state.ad_group_index_after_position_us(5_000_000, Some(10_000_000)), Some(2));
        assert_eq!(state.ad_group_index_after_position_us(10_000_000, Some(10_000_000)), None);
        assert_eq!(state.ad_group_index_after_position_us(TIME_END_OF_SOURCE, None), None);
    }

    #[test]
    fn test_next_ad_index_skips_played() {
        let state = midroll_state().with_played_ad(1, 0).unwrap();
        let group = state.ad_group(1);
        assert_eq!(group.first_ad_index_to_play(), 1);
        assert_eq!(group.next_ad_index_to_play(Some(1)), 2);
        assert!(group.has_unplayed_ads());
        assert!(group.should_play_ad_group());
    }

    #[test]
    fn test_server_side_inserted_group_keeps_unplayed_ads() {
        let played = midroll_state()
            .with_played_ad(1, 0)
            .unwrap()
            .with_played_ad(1, 1)
            .unwrap();
        assert!(!played.ad_group(1).has_unplayed_ads());

        let server_side = played.with_is_server_side_inserted(1, true).unwrap();
        assert!(server_side.ad_group(1).has_unplayed_ads());
        assert_eq!(server_side.ad_group(1).first_ad_index_to_play(), 0);
        assert_eq!(server_side.ad_group_index_for_position_us(6_000_000, Some(10_000_000)), Some(1));
    }

    #[test]
    fn test_played_ad_cannot_become_available() {
        let state = midroll_state().with_played_ad(0, 0).unwrap();
        assert!(state.with_available_ad(0, 0).is_err());
    }

    #[test]
    fn test_skipped_group_with_unknown_count() {
        let state = AdPlaybackState::new(None, &[0]).with_skipped_ad_group(0).unwrap();
        assert_eq!(state.ad_group(0).count, Some(0));
        assert!(!state.ad_group(0).should_play_ad_group());
    }

    #[test]
    fn test_removed_groups_are_ignored() {
        let state = midroll_state().with_removed_ad_group_count(1).unwrap();
        assert_eq!(state.ad_group(0).count, Some(0));
        assert!(state.with_removed_ad_group_count(0).is_err());
    }

    #[test]
    fn test_bundle() {
        let state = midroll_state()
            .with_ad_durations_us(vec![vec![Some(1_000)], vec![Some(2_000), None], vec![None]])
            .unwrap()
            .with_ad_load_error(2, 0)
            .unwrap()
            .with_content_duration_us(Some(10_000_000));
        assert!(state.is_ad_in_error_state(2, 0));
        assert_eq!(AdPlaybackState::from_bundle(&state.to_bundle()).unwrap(), state);
        assert!(AdPlaybackState::none().to_bundle().is_empty());
    }
}
