// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan modes.
//!
//! The remote API knows three fan modes. Locally a fan is exposed as a
//! target state (auto/manual) plus an active flag; the two representations
//! map onto each other through [`FanMode::from_local`] and
//! [`FanMode::to_local`].

use std::fmt;

/// Fan mode as understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FanMode {
    /// Fan runs only when the equipment calls for it.
    Auto,
    /// Fan runs continuously.
    On,
    /// Fan runs periodically to circulate air.
    Circulate,
}

impl FanMode {
    /// Returns the remote API string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::On => "On",
            Self::Circulate => "Circulate",
        }
    }

    /// Derives the remote mode from the local fan fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use thermsync::types::{FanActive, FanMode, TargetFanState};
    ///
    /// assert_eq!(FanMode::from_local(TargetFanState::Auto, FanActive::Active), FanMode::Auto);
    /// assert_eq!(FanMode::from_local(TargetFanState::Manual, FanActive::Active), FanMode::On);
    /// assert_eq!(FanMode::from_local(TargetFanState::Manual, FanActive::Inactive), FanMode::Circulate);
    /// ```
    #[must_use]
    pub const fn from_local(target: TargetFanState, active: FanActive) -> Self {
        match (target, active) {
            (TargetFanState::Auto, _) => Self::Auto,
            (TargetFanState::Manual, FanActive::Active) => Self::On,
            (TargetFanState::Manual, FanActive::Inactive) => Self::Circulate,
        }
    }

    /// Splits the remote mode into the local fan fields.
    #[must_use]
    pub const fn to_local(self) -> (TargetFanState, FanActive) {
        match self {
            Self::Auto => (TargetFanState::Auto, FanActive::Inactive),
            Self::On => (TargetFanState::Manual, FanActive::Active),
            Self::Circulate => (TargetFanState::Manual, FanActive::Inactive),
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local fan target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TargetFanState {
    /// Manual control.
    Manual,
    /// Automatic control.
    Auto,
}

/// Local fan active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FanActive {
    /// Not running.
    Inactive,
    /// Running.
    Active,
}
