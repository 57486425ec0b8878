//! Active filter/sort state of a controller

use crate::controller::options::SortDirection;
use serde::Serialize;
use std::collections::HashMap;

/// Active filters, the recency stack of sorts, and direction overrides.
///
/// `active_sort_ids` is most-recently-activated first, never holds
/// duplicates, and is bounded by the controller's `max_sorts`. Direction
/// overrides only exist for sorts that are, or were until their removal,
/// active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    active_filter_ids: Vec<String>,
    active_sort_ids: Vec<String>,
    sort_directions: HashMap<String, SortDirection>,
    version: u64,
}

/// Outcome of selecting a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTransition {
    /// Inactive -> active at its default direction
    Activated,
    /// Active at default direction -> active flipped
    Flipped,
    /// Active flipped -> inactive
    Deactivated,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active filter ids in activation order
    pub fn active_filter_ids(&self) -> &[String] {
        &self.active_filter_ids
    }

    /// Active sort ids, most recently activated first
    pub fn active_sort_ids(&self) -> &[String] {
        &self.active_sort_ids
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_filter_active(&self, id: &str) -> bool {
        self.active_filter_ids.iter().any(|f| f == id)
    }

    pub fn is_sort_active(&self, id: &str) -> bool {
        self.active_sort_ids.iter().any(|s| s == id)
    }

    /// Explicit direction set for a sort, if it differs from its default
    pub fn direction_override(&self, id: &str) -> Option<SortDirection> {
        self.sort_directions.get(id).copied()
    }

    pub fn resolved_direction(&self, id: &str, default: SortDirection) -> SortDirection {
        self.direction_override(id).unwrap_or(default)
    }

    /// Toggle a filter; returns whether it is now active
    pub fn toggle_filter(&mut self, id: &str) -> bool {
        if self.deactivate_filter(id) {
            false
        } else {
            self.active_filter_ids.push(id.to_string());
            true
        }
    }

    /// Returns true if the filter was inactive
    pub fn activate_filter(&mut self, id: &str) -> bool {
        if self.is_filter_active(id) {
            return false;
        }
        self.active_filter_ids.push(id.to_string());
        true
    }

    /// Returns true if the filter was active
    pub fn deactivate_filter(&mut self, id: &str) -> bool {
        let before = self.active_filter_ids.len();
        self.active_filter_ids.retain(|f| f != id);
        before != self.active_filter_ids.len()
    }

    /// Put a sort at the front of the recency stack at its default
    /// direction, evicting the oldest entries beyond `max_sorts`.
    pub fn activate_sort(&mut self, id: &str, max_sorts: usize) {
        self.active_sort_ids.retain(|s| s != id);
        self.sort_directions.remove(id);
        self.active_sort_ids.insert(0, id.to_string());

        let max_sorts = max_sorts.max(1);
        if self.active_sort_ids.len() > max_sorts {
            for evicted in self.active_sort_ids.split_off(max_sorts) {
                self.sort_directions.remove(&evicted);
            }
        }
    }

    /// Returns true if the sort was active. Its direction override is forgotten.
    pub fn deactivate_sort(&mut self, id: &str) -> bool {
        let before = self.active_sort_ids.len();
        self.active_sort_ids.retain(|s| s != id);
        self.sort_directions.remove(id);
        before != self.active_sort_ids.len()
    }

    /// Set the direction of an active sort; only non-default directions are stored
    pub fn set_direction(&mut self, id: &str, direction: SortDirection, default: SortDirection) {
        if !self.is_sort_active(id) {
            return;
        }
        if direction == default {
            self.sort_directions.remove(id);
        } else {
            self.sort_directions.insert(id.to_string(), direction);
        }
    }

    /// inactive -> active(default) -> active(flipped) -> inactive
    pub fn cycle_sort(&mut self, id: &str, default: SortDirection, max_sorts: usize) -> SortTransition {
        if !self.is_sort_active(id) {
            self.activate_sort(id, max_sorts);
            SortTransition::Activated
        } else if self.resolved_direction(id, default) == default {
            self.sort_directions.insert(id.to_string(), default.flipped());
            SortTransition::Flipped
        } else {
            self.deactivate_sort(id);
            SortTransition::Deactivated
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}
