// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fields exposed to the presentation layer.
//!
//! Every value the presentation layer can read or be pushed is named by an
//! [`ExposedField`]. Pushes carry a [`FieldUpdate`]: either a
//! [`FieldValue`] or the error marker used when the device could not be
//! reached.

use std::fmt;

use crate::Capabilities;
use crate::types::{
    CurrentHeatingCoolingState, FanActive, RoomSelection, TargetFanState,
    TargetHeatingCoolingState, TemperatureUnit,
};

/// A field exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExposedField {
    /// Indoor temperature (read-only).
    CurrentTemperature,
    /// What the equipment is doing (read-only).
    CurrentHeatingCoolingState,
    /// Target mode.
    TargetHeatingCoolingState,
    /// Target temperature.
    TargetTemperature,
    /// Heat setpoint used in Auto/Off.
    HeatingThresholdTemperature,
    /// Cool setpoint used in Auto/Off.
    CoolingThresholdTemperature,
    /// Display unit (read-only).
    TemperatureDisplayUnits,
    /// Indoor relative humidity (read-only).
    CurrentRelativeHumidity,
    /// Fan auto/manual.
    TargetFanState,
    /// Fan running.
    FanActive,
    /// Room priority selection.
    RoomPriority,
}

impl ExposedField {
    /// Fields every thermostat exposes.
    pub const THERMOSTAT: [Self; 7] = [
        Self::CurrentTemperature,
        Self::CurrentHeatingCoolingState,
        Self::TargetHeatingCoolingState,
        Self::TargetTemperature,
        Self::HeatingThresholdTemperature,
        Self::CoolingThresholdTemperature,
        Self::TemperatureDisplayUnits,
    ];

    /// Returns the fields exposed for a device with `capabilities`.
    #[must_use]
    pub fn for_capabilities(capabilities: Capabilities) -> Vec<Self> {
        let mut fields = Self::THERMOSTAT.to_vec();
        if capabilities.supports_humidity() {
            fields.push(Self::CurrentRelativeHumidity);
        }
        if capabilities.supports_fan() {
            fields.push(Self::TargetFanState);
            fields.push(Self::FanActive);
        }
        if capabilities.supports_room_priority() {
            fields.push(Self::RoomPriority);
        }
        fields
    }

    /// Returns `true` for fields the presentation layer cannot edit.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::CurrentTemperature
                | Self::CurrentHeatingCoolingState
                | Self::TemperatureDisplayUnits
                | Self::CurrentRelativeHumidity
        )
    }
}

impl fmt::Display for ExposedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A value of an exposed field.
///
/// Temperatures are in Celsius, humidity in percent.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A temperature in Celsius.
    Temperature(f64),
    /// Relative humidity in percent.
    Humidity(f64),
    /// Current equipment state.
    CurrentState(CurrentHeatingCoolingState),
    /// Target mode.
    TargetMode(TargetHeatingCoolingState),
    /// Display unit.
    DisplayUnits(TemperatureUnit),
    /// Fan target state.
    FanTarget(TargetFanState),
    /// Fan active flag.
    FanActive(FanActive),
    /// Room priority.
    RoomPriority(RoomSelection),
}

impl FieldValue {
    /// Returns the temperature, if this is one.
    #[must_use]
    pub fn as_temperature(&self) -> Option<f64> {
        match self {
            Self::Temperature(t) => Some(*t),
            _ => None,
        }
    }
}

/// What the presentation layer is told about a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// A fresh value.
    Value(FieldValue),
    /// The device could not be read; the value is unknown.
    Error,
}

impl FieldUpdate {
    /// Returns `true` for the error marker.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns the carried value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Error => None,
        }
    }
}
