// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device descriptors.
//!
//! A [`Device`] is the identity and static description of a thermostat:
//! where it lives, what model it is, what it supports and which unit it
//! speaks. Descriptors are produced by discovery (outside this crate) and
//! handed to the [`SyncManager`](crate::manager::SyncManager).
//!
//! # Examples
//!
//! ```
//! use thermsync::device::{Device, DeviceModel, LocationId};
//! use thermsync::types::TemperatureUnit;
//! use thermsync::Capabilities;
//!
//! let device = Device::new("LCC-00D02DB89E33", LocationId::new(1234), DeviceModel::T9)
//!     .with_units(TemperatureUnit::Celsius)
//!     .with_capabilities(Capabilities::builder().fan().humidity().room_priority().build());
//!
//! assert!(device.capabilities().supports_fan());
//! assert!(device.policy().supports_room_priority);
//! ```

mod id;
mod model;

pub use id::{DeviceId, LocationId};
pub use model::{DeviceModel, ModelPolicy};

use std::fmt;

use crate::Capabilities;
use crate::protocol::ThermostatStatus;
use crate::types::{TargetHeatingCoolingState, TemperatureUnit, ThermostatMode};

/// Broad kind of device as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeviceClass {
    /// A thermostat.
    #[default]
    Thermostat,
    /// Anything else, kept verbatim.
    Other(String),
}

impl DeviceClass {
    /// Parses the remote `deviceClass` string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("thermostat") {
            Self::Thermostat
        } else {
            Self::Other(raw.to_string())
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thermostat => f.write_str("Thermostat"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Accepted setpoint range, in Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointLimits {
    /// Lowest accepted setpoint.
    pub min: f64,
    /// Highest accepted setpoint.
    pub max: f64,
}

impl SetpointLimits {
    /// Returns `true` if `celsius` lies within the limits.
    #[must_use]
    pub fn contains(&self, celsius: f64) -> bool {
        (self.min..=self.max).contains(&celsius)
    }
}

/// Static description of a thermostat.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: DeviceId,
    location: LocationId,
    class: DeviceClass,
    model: DeviceModel,
    capabilities: Capabilities,
    units: TemperatureUnit,
    allowed_modes: Vec<TargetHeatingCoolingState>,
    setpoint_limits: Option<SetpointLimits>,
}

impl Device {
    /// All four target modes.
    const ALL_MODES: [TargetHeatingCoolingState; 4] = [
        TargetHeatingCoolingState::Off,
        TargetHeatingCoolingState::Heat,
        TargetHeatingCoolingState::Cool,
        TargetHeatingCoolingState::Auto,
    ];

    /// Creates a descriptor with default settings.
    ///
    /// Defaults: thermostat class, Fahrenheit, all four modes allowed, no
    /// setpoint limits, and room priority only when the model supports it.
    #[must_use]
    pub fn new(id: impl Into<DeviceId>, location: LocationId, model: DeviceModel) -> Self {
        let capabilities = Capabilities {
            room_priority: model.policy().supports_room_priority,
            ..Capabilities::basic()
        };

        Self {
            id: id.into(),
            location,
            class: DeviceClass::Thermostat,
            model,
            capabilities,
            units: TemperatureUnit::default(),
            allowed_modes: Self::ALL_MODES.to_vec(),
            setpoint_limits: None,
        }
    }

    /// Builds a descriptor from a first status pull.
    #[must_use]
    pub fn from_status(location: LocationId, status: &ThermostatStatus) -> Self {
        let model = status
            .device_model
            .as_deref()
            .map_or(DeviceModel::Unknown, DeviceModel::parse);
        let units = status.units.unwrap_or_default();

        let mut allowed_modes: Vec<TargetHeatingCoolingState> = status
            .allowed_modes
            .iter()
            .filter_map(|m| m.parse::<ThermostatMode>().ok())
            .map(TargetHeatingCoolingState::from_remote)
            .collect();
        allowed_modes.dedup();
        if allowed_modes.is_empty() {
            allowed_modes = Self::ALL_MODES.to_vec();
        }

        let low = min_option(status.min_heat_setpoint, status.min_cool_setpoint);
        let high = max_option(status.max_heat_setpoint, status.max_cool_setpoint);
        let setpoint_limits = low.zip(high).map(|(min, max)| SetpointLimits {
            min: units.to_celsius(min),
            max: units.to_celsius(max),
        });

        Self {
            id: DeviceId::new(status.device_id.clone()),
            location,
            class: status
                .device_class
                .as_deref()
                .map_or(DeviceClass::Thermostat, DeviceClass::parse),
            model,
            capabilities: Capabilities::from_status(status),
            units,
            allowed_modes,
            setpoint_limits,
        }
    }

    /// Sets the capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the device unit.
    #[must_use]
    pub fn with_units(mut self, units: TemperatureUnit) -> Self {
        self.units = units;
        self
    }

    /// Restricts the allowed target modes.
    #[must_use]
    pub fn with_allowed_modes(mut self, modes: impl IntoIterator<Item = TargetHeatingCoolingState>) -> Self {
        self.allowed_modes = modes.into_iter().collect();
        self
    }

    /// Sets the accepted setpoint range in Celsius.
    #[must_use]
    pub fn with_setpoint_limits(mut self, min: f64, max: f64) -> Self {
        self.setpoint_limits = Some(SetpointLimits { min, max });
        self
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the location identifier.
    #[must_use]
    pub fn location(&self) -> LocationId {
        self.location
    }

    /// Returns the device class.
    #[must_use]
    pub fn class(&self) -> &DeviceClass {
        &self.class
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Returns the model's write policy.
    #[must_use]
    pub fn policy(&self) -> ModelPolicy {
        self.model.policy()
    }

    /// Returns the capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Returns the device unit.
    #[must_use]
    pub fn units(&self) -> TemperatureUnit {
        self.units
    }

    /// Returns the allowed target modes.
    #[must_use]
    pub fn allowed_modes(&self) -> &[TargetHeatingCoolingState] {
        &self.allowed_modes
    }

    /// Returns `true` if `mode` may be requested.
    #[must_use]
    pub fn allows_mode(&self, mode: TargetHeatingCoolingState) -> bool {
        self.allowed_modes.contains(&mode)
    }

    /// Returns the setpoint range, if known.
    #[must_use]
    pub fn setpoint_limits(&self) -> Option<SetpointLimits> {
        self.setpoint_limits
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
