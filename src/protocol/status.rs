// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status documents returned by the remote API.
//!
//! Field names follow the remote JSON (`camelCase`, `deviceID`). Everything
//! the engine can live without is optional so that partial documents from
//! older firmware still decode.

use serde::{Deserialize, Serialize};

use crate::types::{FanMode, PriorityType, SetpointStatus, TemperatureUnit, ThermostatMode};

/// Thermostat status as returned by `GET /devices/thermostats/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatStatus {
    /// Remote device identifier.
    #[serde(rename = "deviceID")]
    pub device_id: String,
    /// Device class (`"Thermostat"`).
    pub device_class: Option<String>,
    /// Device model (`"T9-T10"`, `"Round"`, ...).
    pub device_model: Option<String>,
    /// Unit used for readings and setpoints.
    pub units: Option<TemperatureUnit>,
    /// Indoor temperature in device units.
    pub indoor_temperature: Option<f64>,
    /// Indoor relative humidity in percent.
    pub indoor_humidity: Option<f64>,
    /// Modes the device accepts, in remote vocabulary.
    #[serde(default)]
    pub allowed_modes: Vec<String>,
    /// Lowest heat setpoint in device units.
    pub min_heat_setpoint: Option<f64>,
    /// Highest heat setpoint in device units.
    pub max_heat_setpoint: Option<f64>,
    /// Lowest cool setpoint in device units.
    pub min_cool_setpoint: Option<f64>,
    /// Highest cool setpoint in device units.
    pub max_cool_setpoint: Option<f64>,
    /// Values that can be written back.
    pub changeable_values: ChangeableValues,
    /// What the equipment is doing.
    pub operation_status: Option<OperationStatus>,
    /// Per-feature settings.
    pub settings: Option<DeviceSettings>,
    /// Whether the device is online.
    pub is_alive: Option<bool>,
}

/// Writable thermostat values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeableValues {
    /// Current system mode.
    pub mode: ThermostatMode,
    /// Heat setpoint in device units.
    pub heat_setpoint: Option<f64>,
    /// Cool setpoint in device units.
    pub cool_setpoint: Option<f64>,
    /// Automatic heat/cool changeover flag.
    pub auto_changeover_active: Option<bool>,
    /// Current hold behaviour.
    pub thermostat_setpoint_status: Option<SetpointStatus>,
}

/// Equipment operating status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    /// `"Heat"`, `"Cool"` or `"EquipmentOff"`.
    pub mode: String,
}

/// Per-feature settings embedded in the thermostat status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Fan settings, present on devices with a fan.
    pub fan: Option<FanStatus>,
}

/// Fan status as returned by `GET /devices/thermostats/{id}/fan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanStatus {
    /// Modes the fan accepts.
    #[serde(default)]
    pub allowed_modes: Vec<String>,
    /// Writable fan values.
    pub changeable_values: FanValues,
    /// Whether the fan is running right now.
    pub fan_running: Option<bool>,
}

/// Writable fan values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanValues {
    /// Current fan mode.
    pub mode: FanMode,
}

/// Room priority as returned by `GET /devices/thermostats/{id}/priority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPriorityStatus {
    /// Remote device identifier.
    pub device_id: Option<String>,
    /// The active priority.
    pub current_priority: CurrentPriority,
}

/// The active room priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPriority {
    /// Priority type.
    pub priority_type: PriorityType,
    /// Selected room identifiers.
    #[serde(default)]
    pub selected_rooms: Vec<u32>,
    /// Rooms known to the thermostat.
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// A room with one or more remote sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Room identifier.
    pub id: u32,
    /// Display name.
    #[serde(default)]
    pub room_name: String,
}
