// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for thermostat state.
//!
//! # Types
//!
//! - [`TemperatureUnit`] - Device unit plus Celsius conversions
//! - [`ThermostatMode`] - Remote system mode
//! - [`TargetHeatingCoolingState`] / [`CurrentHeatingCoolingState`] - Local modes
//! - [`SetpointStatus`] - Hold behaviour for setpoint writes
//! - [`FanMode`], [`TargetFanState`], [`FanActive`] - Fan representations
//! - [`PriorityType`], [`RoomSelection`] - Room priority

mod fan;
mod mode;
mod priority;
mod temperature;

pub use fan::{FanActive, FanMode, TargetFanState};
pub use mode::{CurrentHeatingCoolingState, SetpointStatus, TargetHeatingCoolingState, ThermostatMode};
pub use priority::{PriorityType, RoomSelection};
pub use temperature::{TemperatureUnit, celsius_to_fahrenheit, fahrenheit_to_celsius};
