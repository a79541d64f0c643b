// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device models and the per-model write policy.

use std::fmt;

/// Thermostat hardware model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceModel {
    /// The legacy Round thermostat.
    Round,
    /// The legacy D6 thermostat.
    D6,
    /// T5/T6 family.
    T5,
    /// T9/T10 family (remote room sensors).
    T9,
    /// The remote reported `"Unknown"` or no model at all.
    Unknown,
    /// Any other reported model, kept verbatim.
    Other(String),
}

impl DeviceModel {
    /// Parses the remote `deviceModel` string.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermsync::device::DeviceModel;
    ///
    /// assert_eq!(DeviceModel::parse("T9-T10"), DeviceModel::T9);
    /// assert_eq!(DeviceModel::parse("Round"), DeviceModel::Round);
    /// assert_eq!(DeviceModel::parse("Lyric"), DeviceModel::Other("Lyric".into()));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Round" => Self::Round,
            "D6" => Self::D6,
            "Unknown" | "" => Self::Unknown,
            s if s.starts_with("T9") || s.starts_with("T10") => Self::T9,
            s if s.starts_with("T5") || s.starts_with("T6") => Self::T5,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the write policy for this model.
    #[must_use]
    pub fn policy(&self) -> ModelPolicy {
        match self {
            Self::Round => ModelPolicy::ROUND,
            Self::D6 => ModelPolicy::D6,
            Self::T9 => ModelPolicy::T9,
            Self::Unknown => ModelPolicy::UNKNOWN,
            Self::T5 | Self::Other(_) => ModelPolicy::STANDARD,
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round => f.write_str("Round"),
            Self::D6 => f.write_str("D6"),
            Self::T5 => f.write_str("T5"),
            Self::T9 => f.write_str("T9"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// How thermostat writes are shaped for a given model.
///
/// Model-specific payload rules live in this table instead of being
/// scattered through the payload builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ModelPolicy {
    /// Include the target `mode` field.
    pub sends_mode: bool,
    /// Include the `thermostatSetpointStatus` hold field.
    pub sends_setpoint_status: bool,
    /// Force `autoChangeoverActive = true` when the target mode is Auto.
    pub forces_auto_changeover: bool,
    /// Room priority is available.
    pub supports_room_priority: bool,
}

impl ModelPolicy {
    /// Recognised models without special cases.
    pub const STANDARD: Self = Self {
        sends_mode: true,
        sends_setpoint_status: true,
        forces_auto_changeover: false,
        supports_room_priority: false,
    };

    /// Round: no hold field, auto-changeover forced in Auto.
    pub const ROUND: Self = Self {
        sends_setpoint_status: false,
        forces_auto_changeover: true,
        ..Self::STANDARD
    };

    /// D6: auto-changeover forced in Auto.
    pub const D6: Self = Self {
        forces_auto_changeover: true,
        ..Self::STANDARD
    };

    /// T9: room priority.
    pub const T9: Self = Self {
        supports_room_priority: true,
        ..Self::STANDARD
    };

    /// Unrecognised model: mode is left out.
    pub const UNKNOWN: Self = Self {
        sends_mode: false,
        ..Self::STANDARD
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_models() {
        assert_eq!(DeviceModel::parse("D6"), DeviceModel::D6);
        assert_eq!(DeviceModel::parse("T5-T6"), DeviceModel::T5);
        assert_eq!(DeviceModel::parse("T9"), DeviceModel::T9);
        assert_eq!(DeviceModel::parse("Unknown"), DeviceModel::Unknown);
        assert_eq!(DeviceModel::parse(""), DeviceModel::Unknown);
    }

    #[test]
    fn policy_table() {
        assert!(!DeviceModel::Unknown.policy().sends_mode);
        assert!(DeviceModel::Other("Lyric".into()).policy().sends_mode);

        assert!(!DeviceModel::Round.policy().sends_setpoint_status);
        assert!(DeviceModel::D6.policy().sends_setpoint_status);

        assert!(DeviceModel::Round.policy().forces_auto_changeover);
        assert!(DeviceModel::D6.policy().forces_auto_changeover);
        assert!(!DeviceModel::T9.policy().forces_auto_changeover);

        assert!(DeviceModel::T9.policy().supports_room_priority);
        assert!(!DeviceModel::T5.policy().supports_room_priority);
    }

    #[test]
    fn display_keeps_other_names() {
        assert_eq!(DeviceModel::Other("Lyric".into()).to_string(), "Lyric");
    }
}
