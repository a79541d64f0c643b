// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat operating modes.
//!
//! The remote API and the local model use different vocabularies:
//!
//! - [`ThermostatMode`] is the remote system mode (`"Heat"`, `"Cool"`, ...)
//! - [`TargetHeatingCoolingState`] is the locally exposed target mode
//! - [`CurrentHeatingCoolingState`] is what the equipment is doing right now
//! - [`SetpointStatus`] is the hold behaviour sent with setpoint writes

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// System mode as understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThermostatMode {
    /// System off.
    Off,
    /// Heating.
    #[serde(alias = "EmergencyHeat")]
    Heat,
    /// Cooling.
    Cool,
    /// Automatic heat/cool changeover.
    Auto,
}

impl ThermostatMode {
    /// Returns the remote API string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Heat => "Heat",
            Self::Cool => "Cool",
            Self::Auto => "Auto",
        }
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThermostatMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Off" => Ok(Self::Off),
            "Heat" | "EmergencyHeat" => Ok(Self::Heat),
            "Cool" => Ok(Self::Cool),
            "Auto" => Ok(Self::Auto),
            _ => Err(ValueError::UnknownMode(s.to_string())),
        }
    }
}

/// Locally exposed target mode.
///
/// Numeric values follow the common home-automation characteristic encoding
/// (`OFF = 0`, `HEAT = 1`, `COOL = 2`, `AUTO = 3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TargetHeatingCoolingState {
    /// Off.
    Off,
    /// Heat.
    Heat,
    /// Cool.
    Cool,
    /// Auto.
    Auto,
}

impl TargetHeatingCoolingState {
    /// Returns the characteristic value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
            Self::Auto => 3,
        }
    }

    /// Maps the remote mode vocabulary to the local one.
    #[must_use]
    pub const fn from_remote(mode: ThermostatMode) -> Self {
        match mode {
            ThermostatMode::Off => Self::Off,
            ThermostatMode::Heat => Self::Heat,
            ThermostatMode::Cool => Self::Cool,
            ThermostatMode::Auto => Self::Auto,
        }
    }

    /// Maps the local mode to the remote vocabulary.
    #[must_use]
    pub const fn to_remote(self) -> ThermostatMode {
        match self {
            Self::Off => ThermostatMode::Off,
            Self::Heat => ThermostatMode::Heat,
            Self::Cool => ThermostatMode::Cool,
            Self::Auto => ThermostatMode::Auto,
        }
    }
}

/// What the HVAC equipment is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum CurrentHeatingCoolingState {
    /// Idle or off.
    #[default]
    Off,
    /// Heating.
    Heat,
    /// Cooling.
    Cool,
}

impl CurrentHeatingCoolingState {
    /// Returns the characteristic value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Cool => 2,
        }
    }

    /// Derives the current state from the remote operating status.
    ///
    /// Anything other than `"Heat"` or `"Cool"` (including `"EquipmentOff"`)
    /// reads as [`Off`](Self::Off).
    #[must_use]
    pub fn from_operation_mode(mode: &str) -> Self {
        match mode {
            "Heat" => Self::Heat,
            "Cool" => Self::Cool,
            _ => Self::Off,
        }
    }
}

/// Hold behaviour attached to a setpoint write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum SetpointStatus {
    /// Keep the setpoint until changed again.
    #[default]
    PermanentHold,
    /// Keep the setpoint until the next schedule period.
    TemporaryHold,
    /// Follow the schedule.
    NoHold,
}

impl SetpointStatus {
    /// Returns the remote API string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PermanentHold => "PermanentHold",
            Self::TemporaryHold => "TemporaryHold",
            Self::NoHold => "NoHold",
        }
    }
}

impl fmt::Display for SetpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
