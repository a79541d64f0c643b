// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sync manager coordinating every registered thermostat.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::device::{Device, DeviceId};
use crate::error::{Error, Result};
use crate::event::{DeviceEvents, EventBus, SyncEvent};
use crate::protocol::{RemoteApi, StaticToken, TokenProvider};
use crate::state::{DesiredState, Edit, ExposedField, FieldValue, RemoteSnapshot};
use crate::subscription::Presenter;
use crate::sync::{self, Attempt, MutationClass, SyncContext};

use super::device_config::DeviceConfig;
use super::managed_device::ManagedDevice;

/// Keeps a set of remote thermostats and their local model in sync.
///
/// Each registered device gets its own refresh loop, debounce timers,
/// in-flight guards and retries. Devices are independent: one device's
/// failures never delay another's.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use thermsync::device::{Device, DeviceModel, LocationId};
/// use thermsync::manager::{DeviceConfig, RetryPolicy, SyncManager};
/// use thermsync::protocol::{HttpConfig, StaticToken};
/// use thermsync::state::Edit;
/// use thermsync::subscription::CallbackRegistry;
///
/// #[tokio::main]
/// async fn main() -> thermsync::Result<()> {
///     let tokens = Arc::new(StaticToken::new("access-token"));
///     let api = HttpConfig::new()
///         .with_api_key("consumer-key")
///         .into_api(tokens.clone())?;
///
///     let callbacks = Arc::new(CallbackRegistry::new());
///     callbacks.on_field_updated(|device_id, field, update| {
///         println!("{device_id} {field:?} -> {update:?}");
///     });
///
///     let manager = SyncManager::new(Arc::new(api), callbacks).with_token_provider(tokens);
///
///     let device = Device::new("LCC-00D02DB89E33", LocationId::new(123_456), DeviceModel::T9);
///     let config = DeviceConfig::new().with_retry(RetryPolicy::enabled());
///     let id = manager.add_device(device, config).await?;
///
///     manager.edit(&id, Edit::TargetTemperature(21.5)).await?;
///     Ok(())
/// }
/// ```
pub struct SyncManager<A: RemoteApi> {
    ctx: Arc<SyncContext<A>>,
    devices: Arc<RwLock<HashMap<DeviceId, Arc<ManagedDevice>>>>,
}

impl<A: RemoteApi> SyncManager<A> {
    /// Creates a manager without credentials.
    ///
    /// Use [`with_token_provider`](Self::with_token_provider) when the
    /// remote API needs a bearer token.
    #[must_use]
    pub fn new(api: Arc<A>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            ctx: Arc::new(SyncContext {
                api,
                presenter,
                tokens: Arc::new(StaticToken::anonymous()),
                events: EventBus::new(),
            }),
            devices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Sets the provider asked to refresh credentials on authorization
    /// failures.
    #[must_use]
    pub fn with_token_provider(self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.with_context(|ctx| ctx.tokens = tokens)
    }

    /// Sets the capacity of the event channel.
    #[must_use]
    pub fn with_event_capacity(self, capacity: usize) -> Self {
        self.with_context(|ctx| ctx.events = EventBus::with_capacity(capacity))
    }

    fn with_context(mut self, update: impl FnOnce(&mut SyncContext<A>)) -> Self {
        let mut ctx = (*self.ctx).clone();
        update(&mut ctx);
        self.ctx = Arc::new(ctx);
        self
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.ctx.events.subscribe()
    }

    /// Subscribes to the engine events of one device.
    #[must_use]
    pub fn subscribe_device(&self, device_id: &DeviceId) -> DeviceEvents {
        self.ctx.events.subscribe_device(device_id.clone())
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.ctx.events.subscriber_count()
    }

    // =========================================================================
    // Device Management
    // =========================================================================

    /// Registers a device and starts its refresh loop.
    ///
    /// The first pull runs right away and seeds the desired state.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceAlreadyRegistered` if a device with the same
    /// identifier is already managed.
    pub async fn add_device(&self, device: Device, config: DeviceConfig) -> Result<DeviceId> {
        let device_id = device.id().clone();
        let managed = Arc::new(ManagedDevice::new(device, config));

        {
            let mut devices = self.devices.write().await;
            if devices.contains_key(&device_id) {
                return Err(Error::DeviceAlreadyRegistered(device_id.to_string()));
            }
            devices.insert(device_id.clone(), Arc::clone(&managed));
        }

        tracing::info!(
            %device_id,
            model = %managed.device().model(),
            refresh_rate = ?managed.config().refresh_rate(),
            "Device added"
        );
        self.ctx.events.publish(SyncEvent::DeviceAdded {
            device_id: device_id.clone(),
        });

        sync::start_refresh_loop(&self.ctx, &managed);

        Ok(device_id)
    }

    /// Removes a device and cancels its timers and refresh loop.
    ///
    /// A remote call already in flight is not interrupted.
    ///
    /// # Returns
    ///
    /// Returns `true` if the device was found and removed, `false` otherwise.
    pub async fn remove_device(&self, device_id: &DeviceId) -> bool {
        let Some(managed) = self.devices.write().await.remove(device_id) else {
            return false;
        };

        managed.shutdown();

        tracing::info!(%device_id, "Device removed");
        self.ctx.events.publish(SyncEvent::DeviceRemoved {
            device_id: device_id.clone(),
        });

        true
    }

    /// Returns a list of all device IDs.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().cloned().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns the descriptor of a device.
    pub async fn device(&self, device_id: &DeviceId) -> Option<Device> {
        self.get(device_id).await.map(|d| d.device().clone())
    }

    /// Removes every device.
    pub async fn shutdown(&self) {
        let devices: Vec<_> = self.devices.write().await.drain().collect();
        for (device_id, managed) in devices {
            managed.shutdown();
            self.ctx
                .events
                .publish(SyncEvent::DeviceRemoved { device_id });
        }
    }

    // =========================================================================
    // Presentation Surface
    // =========================================================================

    /// Applies a local edit.
    ///
    /// The desired state changes immediately and the write of the edit's
    /// class is (re)scheduled after the device's push rate.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device is not managed, or an
    /// error if the edit is invalid for the device.
    pub async fn edit(&self, device_id: &DeviceId, edit: Edit) -> Result<()> {
        let managed = self.require(device_id).await?;
        sync::on_edit(&self.ctx, &managed, &edit)
    }

    /// Returns the current value of an exposed field.
    ///
    /// Returns `None` for unknown devices and for fields not known yet.
    pub async fn current_value(
        &self,
        device_id: &DeviceId,
        field: ExposedField,
    ) -> Option<FieldValue> {
        self.get(device_id).await?.lock().desired.get(field)
    }

    /// Returns a copy of the desired state of a device.
    pub async fn desired_state(&self, device_id: &DeviceId) -> Option<DesiredState> {
        Some(self.get(device_id).await?.lock().desired.clone())
    }

    /// Returns the last successful pull of a device.
    pub async fn remote_snapshot(&self, device_id: &DeviceId) -> Option<RemoteSnapshot> {
        self.get(device_id).await?.lock().snapshot.clone()
    }

    // =========================================================================
    // Engine Control
    // =========================================================================

    /// Writes the desired state of `class` now, without waiting for the
    /// debounce window.
    ///
    /// # Errors
    ///
    /// - `Error::DeviceNotFound` if the device is not managed
    /// - `Error::WriteInFlight` if a write of the same class is running
    /// - `Error::Api` if the remote call failed
    pub async fn push(&self, device_id: &DeviceId, class: MutationClass) -> Result<()> {
        let managed = self.require(device_id).await?;
        sync::push(&self.ctx, &managed, class, Attempt::Direct).await
    }

    /// Pulls and reconciles a device now.
    ///
    /// Returns `Ok(false)` if the pull was skipped because a thermostat
    /// write is in flight.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device is not managed, or
    /// `Error::Api` if the pull failed.
    pub async fn refresh(&self, device_id: &DeviceId) -> Result<bool> {
        let managed = self.require(device_id).await?;
        sync::refresh_if_idle(&self.ctx, &managed, false).await
    }

    /// Returns `true` while a write of `class` is running for the device.
    pub async fn is_write_in_flight(&self, device_id: &DeviceId, class: MutationClass) -> bool {
        self.get(device_id)
            .await
            .is_some_and(|d| d.guards().is_in_flight(class))
    }

    async fn get(&self, device_id: &DeviceId) -> Option<Arc<ManagedDevice>> {
        self.devices.read().await.get(device_id).cloned()
    }

    async fn require(&self, device_id: &DeviceId) -> Result<Arc<ManagedDevice>> {
        self.get(device_id).await.ok_or(Error::DeviceNotFound)
    }
}

impl<A: RemoteApi> Drop for SyncManager<A> {
    fn drop(&mut self) {
        if let Ok(devices) = self.devices.try_read() {
            for managed in devices.values() {
                managed.shutdown();
            }
        }
    }
}

impl<A: RemoteApi> std::fmt::Debug for SyncManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncManager")
            .field("events", &self.ctx.events)
            .finish_non_exhaustive()
    }
}
