//! Repeatable entry groups
//!
//! Each group owns a fixed set of pre-allocated entry slots (positions
//! `1..=slots`). Adding reveals a hidden slot, removing hides one again.
//! Position 1 is permanent. Groups never interact with each other.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use thiserror::Error;

use crate::form::{FormDefinition, parse_entry_field_name};
use crate::types::RepeatGroup;

/// Reasons an add/remove request is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepeaterError {
    /// The group already shows its maximum number of entries
    #[error("Maximum of {max} {} allowed", .group.plural())]
    LimitReached { group: RepeatGroup, max: u8 },

    /// The next entry has no template in the form definition
    #[error("No more {group} slots available")]
    SlotUnavailable { group: RepeatGroup, position: u8 },

    /// The first entry of every group cannot be removed
    #[error("The first {group} entry cannot be removed")]
    PermanentEntry { group: RepeatGroup },

    /// The entry is not currently shown
    #[error("{group} entry {position} is not shown")]
    EntryNotVisible { group: RepeatGroup, position: u8 },
}

/// A removal waiting for the user's confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemoval {
    pub group: RepeatGroup,
    pub position: u8,
}

impl PendingRemoval {
    /// Question put to the user before removing
    pub fn prompt(&self) -> String {
        format!("Remove this {} entry?", self.group)
    }
}

/// Visible entries of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeaterState {
    group: RepeatGroup,
    slots: u8,
    visible: BTreeSet<u8>,
}

impl RepeaterState {
    /// A group with `slots` templates, showing only the first entry
    pub fn new(group: RepeatGroup, slots: u8) -> Self {
        Self {
            group,
            slots,
            visible: BTreeSet::from([1]),
        }
    }

    pub fn group(&self) -> RepeatGroup {
        self.group
    }

    /// Number of entries shown
    pub fn count(&self) -> u8 {
        self.visible.len() as u8
    }

    pub fn max(&self) -> u8 {
        self.group.max_entries()
    }

    pub fn slots(&self) -> u8 {
        self.slots
    }

    pub fn is_visible(&self, position: u8) -> bool {
        self.visible.contains(&position)
    }

    pub fn visible_positions(&self) -> impl Iterator<Item = u8> + '_ {
        self.visible.iter().copied()
    }

    /// Whether another entry can be added right now
    pub fn can_add(&self) -> bool {
        self.count() < self.max()
    }

    /// Reveal the next hidden entry.
    ///
    /// Returns the new state and the revealed position.
    pub fn add_entry(&self) -> Result<(Self, u8), RepeaterError> {
        if !self.can_add() {
            return Err(RepeaterError::LimitReached {
                group: self.group,
                max: self.max(),
            });
        }

        // Lowest hidden position; `count < max` guarantees one exists below max + 1
        let position = (1..=self.max())
            .find(|p| !self.visible.contains(p))
            .unwrap_or(self.max());
        if position > self.slots {
            return Err(RepeaterError::SlotUnavailable {
                group: self.group,
                position,
            });
        }

        let mut next = self.clone();
        next.visible.insert(position);
        debug!("{} entry {} revealed ({} shown)", self.group, position, next.count());
        Ok((next, position))
    }

    /// Check that an entry may be removed and describe the pending removal
    pub fn request_removal(&self, position: u8) -> Result<PendingRemoval, RepeaterError> {
        if position <= 1 {
            return Err(RepeaterError::PermanentEntry { group: self.group });
        }
        if !self.visible.contains(&position) {
            return Err(RepeaterError::EntryNotVisible {
                group: self.group,
                position,
            });
        }
        Ok(PendingRemoval {
            group: self.group,
            position,
        })
    }

    /// Hide an entry. Clearing its values is the caller's job.
    pub fn remove_entry(&self, position: u8) -> Result<Self, RepeaterError> {
        self.request_removal(position)?;
        let mut next = self.clone();
        next.visible.remove(&position);
        debug!("{} entry {} hidden ({} shown)", self.group, position, next.count());
        Ok(next)
    }

    /// Ensure `position` is visible, revealing entries in order. Used when
    /// replaying saved responses.
    pub fn reveal_through(&self, position: u8) -> Result<Self, RepeaterError> {
        let mut state = self.clone();
        while !state.is_visible(position) {
            let (next, _) = state.add_entry()?;
            state = next;
        }
        Ok(state)
    }
}

/// All repeatable groups of a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repeaters {
    states: BTreeMap<RepeatGroup, RepeaterState>,
}

impl Repeaters {
    /// One state per repeater declared in the definition
    pub fn from_definition(definition: &FormDefinition) -> Self {
        let states = definition
            .repeaters
            .iter()
            .map(|r| (r.group, RepeaterState::new(r.group, r.slots)))
            .collect();
        Self { states }
    }

    pub fn get(&self, group: RepeatGroup) -> Option<&RepeaterState> {
        self.states.get(&group)
    }

    /// Copy with one group's state replaced
    pub fn with_state(&self, state: RepeaterState) -> Self {
        let mut next = self.clone();
        next.states.insert(state.group(), state);
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepeaterState> {
        self.states.values()
    }

    /// Whether a field name belongs to a hidden entry
    pub fn is_hidden_entry_field(&self, name: &str) -> bool {
        parse_entry_field_name(name).is_some_and(|(group, position, _)| {
            self.get(group).is_some_and(|s| !s.is_visible(position))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_shows_first_entry() {
        let state = RepeaterState::new(RepeatGroup::Education, 8);
        assert_eq!(state.count(), 1);
        assert!(state.is_visible(1));
        assert!(!state.is_visible(2));
    }

    #[test]
    fn test_add_reveals_next_position() {
        let state = RepeaterState::new(RepeatGroup::Training, 6);
        let (state, position) = state.add_entry().unwrap();
        assert_eq!(position, 2);
        assert_eq!(state.count(), 2);
    }

    #[test]
    fn test_add_at_max_is_refused() {
        let mut state = RepeaterState::new(RepeatGroup::Training, 6);
        for _ in 1..6 {
            state = state.add_entry().unwrap().0;
        }
        assert_eq!(state.count(), 6);
        let err = state.add_entry().unwrap_err();
        assert_eq!(
            err,
            RepeaterError::LimitReached {
                group: RepeatGroup::Training,
                max: 6
            }
        );
        assert_eq!(err.to_string(), "Maximum of 6 training entries allowed");
    }

    #[test]
    fn test_add_without_template_reports_missing_slot() {
        let state = RepeaterState::new(RepeatGroup::Experience, 2);
        let (state, _) = state.add_entry().unwrap();
        let err = state.add_entry().unwrap_err();
        assert_eq!(
            err,
            RepeaterError::SlotUnavailable {
                group: RepeatGroup::Experience,
                position: 3
            }
        );
        assert_eq!(state.count(), 2);
    }

    #[test]
    fn test_first_entry_is_permanent() {
        let state = RepeaterState::new(RepeatGroup::Education, 8);
        assert_eq!(
            state.request_removal(1),
            Err(RepeaterError::PermanentEntry {
                group: RepeatGroup::Education
            })
        );
        assert!(state.remove_entry(1).is_err());
    }

    #[test]
    fn test_remove_hidden_entry_is_refused() {
        let state = RepeaterState::new(RepeatGroup::Education, 8);
        assert!(matches!(
            state.request_removal(3),
            Err(RepeaterError::EntryNotVisible { position: 3, .. })
        ));
    }

    #[test]
    fn test_removed_gap_is_refilled_first() {
        let mut state = RepeaterState::new(RepeatGroup::Education, 8);
        state = state.add_entry().unwrap().0;
        state = state.add_entry().unwrap().0;
        state = state.remove_entry(2).unwrap();
        assert_eq!(state.count(), 2);

        let (state, position) = state.add_entry().unwrap();
        assert_eq!(position, 2);
        assert_eq!(state.visible_positions().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_prompt_names_group() {
        let pending = PendingRemoval {
            group: RepeatGroup::Experience,
            position: 2,
        };
        assert_eq!(pending.prompt(), "Remove this experience entry?");
    }

    #[test]
    fn test_hidden_entry_field_detection() {
        let repeaters = Repeaters::from_definition(&FormDefinition::builtin());
        assert!(!repeaters.is_hidden_entry_field("education.1.level"));
        assert!(repeaters.is_hidden_entry_field("education.2.level"));
        assert!(!repeaters.is_hidden_entry_field("entry.297979220"));
    }

    #[test]
    fn test_reveal_through() {
        let state = RepeaterState::new(RepeatGroup::Experience, 9);
        let state = state.reveal_through(4).unwrap();
        assert_eq!(state.count(), 4);
        assert!(state.reveal_through(10).is_err());
    }
}
