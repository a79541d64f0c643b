// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronization event types.

use crate::device::DeviceId;
use crate::error::ApiErrorKind;
use crate::sync::MutationClass;

/// Events emitted by the synchronization engine.
///
/// Every event names the device it concerns. Write events also carry the
/// [`MutationClass`] of the write.
///
/// # Examples
///
/// ```
/// use thermsync::device::DeviceId;
/// use thermsync::event::SyncEvent;
/// use thermsync::sync::MutationClass;
///
/// let event = SyncEvent::WriteSucceeded {
///     device_id: DeviceId::new("LCC-1"),
///     class: MutationClass::Fan,
/// };
///
/// assert!(event.is_write());
/// assert_eq!(event.device_id().as_str(), "LCC-1");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A device was registered.
    DeviceAdded {
        /// The device.
        device_id: DeviceId,
    },

    /// A device was removed and its timers cancelled.
    DeviceRemoved {
        /// The device.
        device_id: DeviceId,
    },

    /// A write was sent.
    WriteStarted {
        /// The device.
        device_id: DeviceId,
        /// Class of the write.
        class: MutationClass,
        /// Whether this is the automatic retry of a failed write.
        retry: bool,
    },

    /// A write was accepted by the remote.
    WriteSucceeded {
        /// The device.
        device_id: DeviceId,
        /// Class of the write.
        class: MutationClass,
    },

    /// A write failed.
    WriteFailed {
        /// The device.
        device_id: DeviceId,
        /// Class of the write.
        class: MutationClass,
        /// Failure category.
        kind: ApiErrorKind,
        /// Whether a retry was scheduled.
        retry_scheduled: bool,
    },

    /// A push was not started because a write of the same class was in
    /// flight. The class stays dirty.
    WriteRejected {
        /// The device.
        device_id: DeviceId,
        /// Class of the write.
        class: MutationClass,
    },

    /// A push produced no payload and nothing was sent.
    WriteSkipped {
        /// The device.
        device_id: DeviceId,
        /// Class of the write.
        class: MutationClass,
    },

    /// A single retry of a failed write or pull was scheduled.
    RetryScheduled {
        /// The device.
        device_id: DeviceId,
        /// Class of the retried write, or `None` for a pull.
        class: Option<MutationClass>,
    },

    /// A pull completed and was reconciled.
    RefreshApplied {
        /// The device.
        device_id: DeviceId,
    },

    /// A pull was skipped because a thermostat write was in flight.
    RefreshSkipped {
        /// The device.
        device_id: DeviceId,
    },

    /// A pull failed and every exposed field was marked as errored.
    RefreshFailed {
        /// The device.
        device_id: DeviceId,
        /// Failure category.
        kind: ApiErrorKind,
    },
}

impl SyncEvent {
    /// Returns the device this event concerns.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::WriteStarted { device_id, .. }
            | Self::WriteSucceeded { device_id, .. }
            | Self::WriteFailed { device_id, .. }
            | Self::WriteRejected { device_id, .. }
            | Self::WriteSkipped { device_id, .. }
            | Self::RetryScheduled { device_id, .. }
            | Self::RefreshApplied { device_id }
            | Self::RefreshSkipped { device_id }
            | Self::RefreshFailed { device_id, .. } => device_id,
        }
    }

    /// Returns the mutation class, for write events.
    #[must_use]
    pub fn class(&self) -> Option<MutationClass> {
        match self {
            Self::WriteStarted { class, .. }
            | Self::WriteSucceeded { class, .. }
            | Self::WriteFailed { class, .. }
            | Self::WriteRejected { class, .. }
            | Self::WriteSkipped { class, .. } => Some(*class),
            Self::RetryScheduled { class, .. } => *class,
            _ => None,
        }
    }

    /// Returns `true` for device lifecycle events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` for write events.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::WriteStarted { .. }
                | Self::WriteSucceeded { .. }
                | Self::WriteFailed { .. }
                | Self::WriteRejected { .. }
                | Self::WriteSkipped { .. }
        )
    }

    /// Returns `true` for refresh events.
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        matches!(
            self,
            Self::RefreshApplied { .. } | Self::RefreshSkipped { .. } | Self::RefreshFailed { .. }
        )
    }
}
