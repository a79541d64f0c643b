// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device wrapper for the sync manager.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::device::{Device, DeviceId};
use crate::state::{DesiredState, RemoteSnapshot};
use crate::sync::{PendingWrite, PerClass, TimerSlot, UpdateGuards};

use super::device_config::DeviceConfig;

/// A device registered with the manager.
///
/// The descriptor and settings are immutable; everything the engine
/// mutates lives in [`DeviceShared`] behind one lock.
pub(crate) struct ManagedDevice {
    device: Device,
    config: DeviceConfig,
    guards: Arc<UpdateGuards>,
    shared: Mutex<DeviceShared>,
}

/// Mutable per-device engine state.
///
/// The lock must never be held across an `.await`.
#[derive(Debug, Default)]
pub(crate) struct DeviceShared {
    /// Last successful pull, replaced wholesale.
    pub snapshot: Option<RemoteSnapshot>,
    /// Locally-optimistic state.
    pub desired: DesiredState,
    /// Coalescing state per class.
    pub pending: PerClass<PendingWrite>,
    /// Writes sent per class; a pull that spans a change is stale for that
    /// class.
    pub write_epochs: PerClass<u64>,
    /// Post-write refresh per class.
    pub targeted_refresh: PerClass<TimerSlot>,
    /// Retry of a failed pull.
    pub pull_retry: TimerSlot,
    /// The periodic refresh task.
    pub refresh_loop: TimerSlot,
    /// Set once the device left the manager; no new task is scheduled.
    pub removed: bool,
}

impl ManagedDevice {
    pub(crate) fn new(device: Device, config: DeviceConfig) -> Self {
        Self {
            device,
            config,
            guards: Arc::new(UpdateGuards::default()),
            shared: Mutex::new(DeviceShared::default()),
        }
    }

    pub(crate) fn id(&self) -> &DeviceId {
        self.device.id()
    }

    pub(crate) fn device(&self) -> &Device {
        &self.device
    }

    pub(crate) fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub(crate) fn guards(&self) -> &Arc<UpdateGuards> {
        &self.guards
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, DeviceShared> {
        self.shared.lock()
    }

    /// Marks the device removed and aborts every scheduled task.
    ///
    /// A remote call already in flight runs to completion; its follow-ups
    /// are dropped.
    pub(crate) fn shutdown(&self) {
        let mut shared = self.shared.lock();
        shared.removed = true;
        shared.refresh_loop.cancel();
        shared.pull_retry.cancel();
        for pending in shared.pending.iter_mut() {
            pending.cancel();
        }
        for slot in shared.targeted_refresh.iter_mut() {
            slot.cancel();
        }
    }
}

impl std::fmt::Debug for ManagedDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedDevice")
            .field("device", &self.device)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceModel, LocationId};
    use crate::sync::MutationClass;

    fn managed() -> ManagedDevice {
        ManagedDevice::new(
            Device::new("LCC-1", LocationId::new(1), DeviceModel::T5),
            DeviceConfig::default(),
        )
    }

    #[test]
    fn starts_empty() {
        let managed = managed();
        let shared = managed.lock();

        assert!(shared.snapshot.is_none());
        assert_eq!(shared.write_epochs[MutationClass::Thermostat], 0);
        assert!(!shared.removed);
        assert!(!shared.pending[MutationClass::Thermostat].has_pending());
        assert!(!shared.refresh_loop.is_scheduled());
    }

    #[tokio::test]
    async fn shutdown_cancels_timers() {
        let managed = managed();
        {
            let mut shared = managed.lock();
            shared
                .refresh_loop
                .arm(|_| tokio::spawn(std::future::pending()));
            shared.targeted_refresh[MutationClass::Fan]
                .arm(|_| tokio::spawn(std::future::pending()));
        }

        managed.shutdown();

        let shared = managed.lock();
        assert!(shared.removed);
        assert!(!shared.refresh_loop.is_scheduled());
        assert!(!shared.targeted_refresh[MutationClass::Fan].is_scheduled());
    }
}
