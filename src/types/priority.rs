// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room priority selection for thermostats with remote room sensors.

use std::fmt;

/// Which sensor(s) govern the thermostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PriorityType {
    /// Follow occupancy between rooms.
    FollowMe,
    /// Average all rooms.
    WholeHouse,
    /// Use an explicit set of rooms.
    PickARoom,
}

impl PriorityType {
    /// Returns the remote API string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FollowMe => "FollowMe",
            Self::WholeHouse => "WholeHouse",
            Self::PickARoom => "PickARoom",
        }
    }
}

impl fmt::Display for PriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priority type plus the rooms it applies to.
///
/// Rooms only matter for [`PriorityType::PickARoom`]; two selections of any
/// other type are equivalent regardless of their room lists. Room lists are
/// compared in order.
///
/// # Examples
///
/// ```
/// use thermsync::types::RoomSelection;
///
/// let a = RoomSelection::pick_a_room(vec![1, 2]);
/// assert!(a.is_equivalent(&RoomSelection::pick_a_room(vec![1, 2])));
/// assert!(!a.is_equivalent(&RoomSelection::pick_a_room(vec![2, 1])));
/// assert!(RoomSelection::whole_house().is_equivalent(&RoomSelection::whole_house()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RoomSelection {
    /// The priority type.
    pub priority_type: PriorityType,
    /// Selected room identifiers, in order.
    pub rooms: Vec<u32>,
}

impl RoomSelection {
    /// Creates a selection.
    #[must_use]
    pub fn new(priority_type: PriorityType, rooms: Vec<u32>) -> Self {
        Self {
            priority_type,
            rooms,
        }
    }

    /// Selects explicit rooms.
    #[must_use]
    pub fn pick_a_room(rooms: Vec<u32>) -> Self {
        Self::new(PriorityType::PickARoom, rooms)
    }

    /// Follows occupancy.
    #[must_use]
    pub fn follow_me() -> Self {
        Self::new(PriorityType::FollowMe, Vec::new())
    }

    /// Averages the whole house.
    #[must_use]
    pub fn whole_house() -> Self {
        Self::new(PriorityType::WholeHouse, Vec::new())
    }

    /// Returns `true` if writing `self` over `other` would change nothing.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        if self.priority_type != other.priority_type {
            return false;
        }
        self.priority_type != PriorityType::PickARoom || self.rooms == other.rooms
    }
}
