// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local edits requested by the presentation layer.

use crate::device::Device;
use crate::error::{Error, ValueError};
use crate::sync::MutationClass;
use crate::types::{FanActive, RoomSelection, TargetFanState, TargetHeatingCoolingState};

/// A single field edit.
///
/// Temperatures are in Celsius.
///
/// # Examples
///
/// ```
/// use thermsync::state::Edit;
/// use thermsync::sync::MutationClass;
///
/// assert_eq!(Edit::TargetTemperature(21.5).class(), MutationClass::Thermostat);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Target mode.
    TargetMode(TargetHeatingCoolingState),
    /// Target temperature.
    TargetTemperature(f64),
    /// Heat setpoint used in Auto/Off.
    HeatingThreshold(f64),
    /// Cool setpoint used in Auto/Off.
    CoolingThreshold(f64),
    /// Fan auto/manual.
    TargetFanState(TargetFanState),
    /// Fan running.
    FanActive(FanActive),
    /// Room priority.
    RoomPriority(RoomSelection),
}

impl Edit {
    /// Returns the mutation class whose write carries this edit.
    #[must_use]
    pub fn class(&self) -> MutationClass {
        match self {
            Self::TargetMode(_)
            | Self::TargetTemperature(_)
            | Self::HeatingThreshold(_)
            | Self::CoolingThreshold(_) => MutationClass::Thermostat,
            Self::TargetFanState(_) | Self::FanActive(_) => MutationClass::Fan,
            Self::RoomPriority(_) => MutationClass::RoomPriority,
        }
    }

    /// Checks the edit against what the device accepts.
    ///
    /// # Errors
    ///
    /// - `CapabilityNotSupported` for fan or room-priority edits on devices
    ///   without those features
    /// - `ValueError::ModeNotAllowed` for a mode outside the allowed set
    /// - `ValueError::TemperatureOutOfRange` for non-finite temperatures or
    ///   temperatures outside the device's setpoint limits
    pub fn validate(&self, device: &Device) -> Result<(), Error> {
        match self {
            Self::TargetMode(mode) => {
                if !device.allows_mode(*mode) {
                    return Err(ValueError::ModeNotAllowed(mode.to_remote().to_string()).into());
                }
            }
            Self::TargetTemperature(t) | Self::HeatingThreshold(t) | Self::CoolingThreshold(t) => {
                validate_temperature(device, *t)?;
            }
            Self::TargetFanState(_) | Self::FanActive(_) => {
                if !device.capabilities().supports_fan() {
                    return Err(Error::CapabilityNotSupported("fan control"));
                }
            }
            Self::RoomPriority(_) => {
                if !device.capabilities().supports_room_priority() {
                    return Err(Error::CapabilityNotSupported("room priority"));
                }
            }
        }
        Ok(())
    }
}

fn validate_temperature(device: &Device, celsius: f64) -> Result<(), ValueError> {
    let (min, max) = device
        .setpoint_limits()
        .map_or((f64::MIN, f64::MAX), |l| (l.min, l.max));

    if celsius.is_finite() && (min..=max).contains(&celsius) {
        Ok(())
    } else {
        Err(ValueError::TemperatureOutOfRange {
            min,
            max,
            actual: celsius,
        })
    }
}
