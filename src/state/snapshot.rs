// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known remote state.

use chrono::{DateTime, Utc};

use crate::protocol::{FanStatus, RoomPriorityStatus, ThermostatStatus};
use crate::types::{FanMode, RoomSelection, ThermostatMode};

/// Everything pulled from the remote API for one device in one refresh.
///
/// A snapshot is only ever built from a complete pull and replaces the
/// previous one wholesale; it is never patched field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSnapshot {
    thermostat: ThermostatStatus,
    fan: Option<FanStatus>,
    room_priority: Option<RoomPriorityStatus>,
    pulled_at: DateTime<Utc>,
}

impl RemoteSnapshot {
    /// Assembles a snapshot from the sub-resources of one pull.
    #[must_use]
    pub fn new(
        thermostat: ThermostatStatus,
        fan: Option<FanStatus>,
        room_priority: Option<RoomPriorityStatus>,
    ) -> Self {
        Self {
            thermostat,
            fan,
            room_priority,
            pulled_at: Utc::now(),
        }
    }

    /// Returns the thermostat status.
    #[must_use]
    pub fn thermostat(&self) -> &ThermostatStatus {
        &self.thermostat
    }

    /// Returns the fan status, if the device has a fan.
    #[must_use]
    pub fn fan(&self) -> Option<&FanStatus> {
        self.fan.as_ref()
    }

    /// Returns the room priority, if supported.
    #[must_use]
    pub fn room_priority(&self) -> Option<&RoomPriorityStatus> {
        self.room_priority.as_ref()
    }

    /// Returns when this snapshot was pulled.
    #[must_use]
    pub fn pulled_at(&self) -> DateTime<Utc> {
        self.pulled_at
    }

    /// Returns the remote system mode.
    #[must_use]
    pub fn mode(&self) -> ThermostatMode {
        self.thermostat.changeable_values.mode
    }

    /// Returns the heat setpoint in device units.
    #[must_use]
    pub fn heat_setpoint(&self) -> Option<f64> {
        self.thermostat.changeable_values.heat_setpoint
    }

    /// Returns the cool setpoint in device units.
    #[must_use]
    pub fn cool_setpoint(&self) -> Option<f64> {
        self.thermostat.changeable_values.cool_setpoint
    }

    /// Returns the auto-changeover flag.
    #[must_use]
    pub fn auto_changeover_active(&self) -> Option<bool> {
        self.thermostat.changeable_values.auto_changeover_active
    }

    /// Returns the fan mode.
    ///
    /// Prefers the dedicated fan resource and falls back to the fan settings
    /// embedded in the thermostat status.
    #[must_use]
    pub fn fan_mode(&self) -> Option<FanMode> {
        self.fan
            .as_ref()
            .or_else(|| self.thermostat.settings.as_ref()?.fan.as_ref())
            .map(|fan| fan.changeable_values.mode)
    }

    /// Returns the remote room selection.
    #[must_use]
    pub fn room_selection(&self) -> Option<RoomSelection> {
        self.room_priority.as_ref().map(|p| {
            RoomSelection::new(
                p.current_priority.priority_type,
                p.current_priority.selected_rooms.clone(),
            )
        })
    }
}
