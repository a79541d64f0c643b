// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat sub-feature detection and configuration.
//!
//! Capabilities decide which sub-resources are pulled on refresh, which
//! fields are exposed, and which edits are accepted. They can be detected
//! from a first status pull or configured by hand.

use crate::device::DeviceModel;
use crate::protocol::ThermostatStatus;

/// Sub-features a thermostat supports.
///
/// # Examples
///
/// ```
/// use thermsync::Capabilities;
///
/// let basic = Capabilities::default();
/// assert!(!basic.fan);
///
/// let t9 = Capabilities::builder().fan().humidity().room_priority().build();
/// assert!(t9.room_priority);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
// Each flag is an independent sub-feature of the thermostat.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Has a controllable fan.
    pub fan: bool,

    /// Reports indoor relative humidity.
    pub humidity: bool,

    /// Supports room priority (remote room sensors).
    pub room_priority: bool,
}

impl Capabilities {
    /// A thermostat with no sub-features.
    #[must_use]
    pub const fn basic() -> Self {
        Self {
            fan: false,
            humidity: false,
            room_priority: false,
        }
    }

    /// Returns a builder for manual configuration.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::default()
    }

    /// Detects capabilities from a status pull.
    ///
    /// - fan: the status carries fan settings
    /// - humidity: the status carries an indoor humidity reading
    /// - room priority: the model belongs to the T9 family
    #[must_use]
    pub fn from_status(status: &ThermostatStatus) -> Self {
        let model = status
            .device_model
            .as_deref()
            .map_or(DeviceModel::Unknown, DeviceModel::parse);

        Self {
            fan: status.settings.as_ref().is_some_and(|s| s.fan.is_some()),
            humidity: status.indoor_humidity.is_some(),
            room_priority: model.policy().supports_room_priority,
        }
    }

    /// Returns `true` if fan edits are accepted.
    #[must_use]
    pub fn supports_fan(&self) -> bool {
        self.fan
    }

    /// Returns `true` if a humidity field is exposed.
    #[must_use]
    pub fn supports_humidity(&self) -> bool {
        self.humidity
    }

    /// Returns `true` if room-priority edits are accepted.
    #[must_use]
    pub fn supports_room_priority(&self) -> bool {
        self.room_priority
    }
}

/// Builder for [`Capabilities`].
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    caps: Capabilities,
}

impl CapabilitiesBuilder {
    /// Enables the fan.
    #[must_use]
    pub fn fan(mut self) -> Self {
        self.caps.fan = true;
        self
    }

    /// Enables the humidity sensor.
    #[must_use]
    pub fn humidity(mut self) -> Self {
        self.caps.humidity = true;
        self
    }

    /// Enables room priority.
    #[must_use]
    pub fn room_priority(mut self) -> Self {
        self.caps.room_priority = true;
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: serde_json::Value) -> ThermostatStatus {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn detects_t9_features() {
        let caps = Capabilities::from_status(&status(serde_json::json!({
            "deviceID": "LCC-00D02DB89E33",
            "deviceModel": "T9-T10",
            "indoorHumidity": 41,
            "changeableValues": { "mode": "Heat" },
            "settings": { "fan": { "changeableValues": { "mode": "Auto" } } }
        })));

        assert_eq!(
            caps,
            Capabilities {
                fan: true,
                humidity: true,
                room_priority: true,
            }
        );
    }

    #[test]
    fn detects_round_without_extras() {
        let caps = Capabilities::from_status(&status(serde_json::json!({
            "deviceID": "TCC-1234",
            "deviceModel": "Round",
            "changeableValues": { "mode": "Cool" }
        })));

        assert_eq!(caps, Capabilities::basic());
    }

    #[test]
    fn builder_sets_flags() {
        let caps = Capabilities::builder().fan().build();
        assert!(caps.supports_fan());
        assert!(!caps.supports_humidity());
        assert!(!caps.supports_room_priority());
    }
}
