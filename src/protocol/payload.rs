// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write payloads sent to the remote API.

use serde::{Deserialize, Serialize};

use crate::sync::MutationClass;
use crate::types::{FanMode, PriorityType, SetpointStatus, ThermostatMode};

/// Body of `POST /devices/thermostats/{id}`.
///
/// Setpoints are in device units. Optional fields are left out of the JSON
/// entirely when `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatWrite {
    /// Target system mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ThermostatMode>,
    /// Hold behaviour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermostat_setpoint_status: Option<SetpointStatus>,
    /// Heat setpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_setpoint: Option<f64>,
    /// Cool setpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cool_setpoint: Option<f64>,
    /// Automatic changeover flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_changeover_active: Option<bool>,
}

/// Body of `POST /devices/thermostats/{id}/fan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanWrite {
    /// Requested fan mode.
    pub mode: FanMode,
}

/// Body of `PUT /devices/thermostats/{id}/priority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPriorityWrite {
    /// Requested priority.
    pub current_priority: PrioritySelection,
}

/// Priority part of a [`RoomPriorityWrite`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySelection {
    /// Priority type.
    pub priority_type: PriorityType,
    /// Rooms, only populated for `PickARoom`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_rooms: Vec<u32>,
}

/// A write for one mutation class, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    /// Thermostat write.
    Thermostat(ThermostatWrite),
    /// Fan write.
    Fan(FanWrite),
    /// Room priority write.
    RoomPriority(RoomPriorityWrite),
}

impl WriteRequest {
    /// Returns the mutation class this write belongs to.
    #[must_use]
    pub fn class(&self) -> MutationClass {
        match self {
            Self::Thermostat(_) => MutationClass::Thermostat,
            Self::Fan(_) => MutationClass::Fan,
            Self::RoomPriority(_) => MutationClass::RoomPriority,
        }
    }
}
