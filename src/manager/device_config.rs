// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device synchronization settings.

use std::time::Duration;

use crate::types::SetpointStatus;

/// Shortest accepted refresh interval.
pub const MIN_REFRESH_RATE: Duration = Duration::from_secs(30);

const DEFAULT_PUSH_RATE: Duration = Duration::from_secs(1);
const DEFAULT_REFRESH_RATE: Duration = Duration::from_secs(120);

/// Synchronization settings of a managed device.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use thermsync::manager::{DeviceConfig, RetryPolicy};
/// use thermsync::types::SetpointStatus;
///
/// let config = DeviceConfig::new()
///     .with_push_rate(Duration::from_millis(500))
///     .with_refresh_rate(Duration::from_secs(60))
///     .with_retry(RetryPolicy::enabled())
///     .with_setpoint_status(SetpointStatus::NoHold);
///
/// assert_eq!(config.refresh_rate(), Duration::from_secs(60));
/// assert!(config.retry().enabled);
///
/// // Refresh rates below the minimum are raised to it
/// let config = DeviceConfig::new().with_refresh_rate(Duration::from_secs(5));
/// assert_eq!(config.refresh_rate(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    push_rate: Duration,
    refresh_rate: Duration,
    retry: RetryPolicy,
    setpoint_status: SetpointStatus,
}

impl DeviceConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the debounce window applied to local edits.
    #[must_use]
    pub fn with_push_rate(mut self, push_rate: Duration) -> Self {
        self.push_rate = push_rate;
        self
    }

    /// Sets the interval of the refresh loop.
    ///
    /// Values below [`MIN_REFRESH_RATE`] are raised to it.
    #[must_use]
    pub fn with_refresh_rate(mut self, refresh_rate: Duration) -> Self {
        if refresh_rate < MIN_REFRESH_RATE {
            tracing::warn!(
                requested = ?refresh_rate,
                minimum = ?MIN_REFRESH_RATE,
                "Refresh rate below minimum, using minimum"
            );
            self.refresh_rate = MIN_REFRESH_RATE;
        } else {
            self.refresh_rate = refresh_rate;
        }
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the hold sent with thermostat writes.
    #[must_use]
    pub fn with_setpoint_status(mut self, status: SetpointStatus) -> Self {
        self.setpoint_status = status;
        self
    }

    /// Returns the debounce window.
    #[must_use]
    pub fn push_rate(&self) -> Duration {
        self.push_rate
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn refresh_rate(&self) -> Duration {
        self.refresh_rate
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the setpoint hold.
    #[must_use]
    pub fn setpoint_status(&self) -> SetpointStatus {
        self.setpoint_status
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            push_rate: DEFAULT_PUSH_RATE,
            refresh_rate: DEFAULT_REFRESH_RATE,
            retry: RetryPolicy::default(),
            setpoint_status: SetpointStatus::PermanentHold,
        }
    }
}

/// Retry behavior after a failed write or pull.
///
/// When enabled, exactly one retry of the same operation runs after a
/// fixed delay. Disabled by default.
///
/// # Examples
///
/// ```
/// use thermsync::manager::RetryPolicy;
///
/// assert!(!RetryPolicy::default().enabled);
/// assert!(RetryPolicy::enabled().enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Whether a failed operation is retried once.
    pub enabled: bool,
}

impl RetryPolicy {
    /// Creates an enabled policy.
    #[must_use]
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Creates a disabled policy.
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}
