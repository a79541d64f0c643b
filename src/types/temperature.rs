// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature units and conversions.
//!
//! The local model always works in Celsius. Remote devices report and accept
//! setpoints in their own unit, so values are converted at the boundary with
//! [`TemperatureUnit::to_device`] and [`TemperatureUnit::to_celsius`].

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Unit a device uses for readings and setpoints.
///
/// # Examples
///
/// ```
/// use thermsync::types::TemperatureUnit;
///
/// assert_eq!(TemperatureUnit::Fahrenheit.to_device(21.5), 71.0);
/// assert_eq!(TemperatureUnit::Fahrenheit.to_celsius(70.0), 21.1);
/// assert_eq!(TemperatureUnit::Celsius.to_device(21.3), 21.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius.
    Celsius,
    /// Degrees Fahrenheit.
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Returns the remote API string for this unit.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "Celsius",
            Self::Fahrenheit => "Fahrenheit",
        }
    }

    /// Converts a Celsius value into a setpoint in this unit.
    ///
    /// Fahrenheit setpoints are whole degrees, Celsius setpoints use
    /// half-degree steps.
    #[must_use]
    pub fn to_device(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => round_to_step(celsius, 0.5),
            Self::Fahrenheit => celsius_to_fahrenheit(celsius).round(),
        }
    }

    /// Converts a reading in this unit to Celsius, at one-decimal precision.
    #[must_use]
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => round_to_step(fahrenheit_to_celsius(value), 0.1),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(Self::Celsius),
            "fahrenheit" | "f" => Ok(Self::Fahrenheit),
            _ => Err(ValueError::UnknownUnit(s.to_string())),
        }
    }
}

/// Converts degrees Celsius to degrees Fahrenheit.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Converts degrees Fahrenheit to degrees Celsius.
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

fn round_to_step(value: f64, step: f64) -> f64 {
    let steps = (value / step).round();
    // Re-derive through the reciprocal so 0.1 steps do not leave 21.100000000000001
    steps / (1.0 / step).round()
}
