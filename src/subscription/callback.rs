// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closure-based [`Presenter`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::device::DeviceId;
use crate::state::{ExposedField, FieldUpdate};

use super::Presenter;

/// Handle returned by every registration, used to unsubscribe.
///
/// Ids grow monotonically, so they also give the order in which callbacks
/// are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

type UpdateCallback = Arc<dyn Fn(&DeviceId, ExposedField, &FieldUpdate) + Send + Sync>;

/// One registration: an optional device and field filter plus the closure.
struct Subscription {
    device: Option<DeviceId>,
    field: Option<ExposedField>,
    callback: UpdateCallback,
}

impl Subscription {
    fn matches(&self, device_id: &DeviceId, field: ExposedField) -> bool {
        self.device.as_ref().is_none_or(|d| d == device_id)
            && self.field.is_none_or(|f| f == field)
    }
}

/// Registry of closures notified of field updates.
///
/// Implements [`Presenter`], so it can be handed directly to the
/// [`SyncManager`](crate::manager::SyncManager). Callbacks run
/// synchronously on the engine task that produced the update, in
/// registration order, and must not block.
///
/// # Examples
///
/// ```
/// use thermsync::device::DeviceId;
/// use thermsync::state::{ExposedField, FieldUpdate, FieldValue};
/// use thermsync::subscription::{CallbackRegistry, Presenter};
///
/// let registry = CallbackRegistry::new();
/// let id = registry.on_field(ExposedField::CurrentTemperature, |device, update| {
///     println!("{device}: {update:?}");
/// });
///
/// registry.update(
///     &DeviceId::new("LCC-1"),
///     ExposedField::CurrentTemperature,
///     FieldUpdate::Value(FieldValue::Temperature(21.0)),
/// );
///
/// assert!(registry.unsubscribe(id));
/// ```
pub struct CallbackRegistry {
    next_id: AtomicU64,
    subscriptions: RwLock<BTreeMap<SubscriptionId, Subscription>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscriptions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a callback for every update of every device.
    pub fn on_field_updated<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceId, ExposedField, &FieldUpdate) + Send + Sync + 'static,
    {
        self.register(None, None, Arc::new(callback))
    }

    /// Registers a callback for one field, on every device.
    pub fn on_field<F>(&self, field: ExposedField, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceId, &FieldUpdate) + Send + Sync + 'static,
    {
        self.register(
            None,
            Some(field),
            Arc::new(move |device_id, _, update| callback(device_id, update)),
        )
    }

    /// Registers a callback for every field of one device.
    ///
    /// This is the natural binding for a host that exposes each thermostat
    /// as its own accessory.
    pub fn on_device<F>(&self, device_id: DeviceId, callback: F) -> SubscriptionId
    where
        F: Fn(ExposedField, &FieldUpdate) + Send + Sync + 'static,
    {
        self.register(
            Some(device_id),
            None,
            Arc::new(move |_, field, update| callback(field, update)),
        )
    }

    fn register(
        &self,
        device: Option<DeviceId>,
        field: Option<ExposedField>,
        callback: UpdateCallback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().insert(
            id,
            Subscription {
                device,
                field,
                callback,
            },
        );
        id
    }

    /// Removes a callback.
    ///
    /// Returns `true` if a callback was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.write().remove(&id).is_some()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.subscriptions.write().clear();
    }

    /// Invokes every callback whose filter matches.
    ///
    /// The matching callbacks are collected before any of them runs, so a
    /// callback may register or unsubscribe without deadlocking.
    pub fn dispatch(&self, device_id: &DeviceId, field: ExposedField, update: &FieldUpdate) {
        let matching: Vec<UpdateCallback> = self
            .subscriptions
            .read()
            .values()
            .filter(|sub| sub.matches(device_id, field))
            .map(|sub| Arc::clone(&sub.callback))
            .collect();

        for callback in matching {
            callback(device_id, field, update);
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }
}

impl Presenter for CallbackRegistry {
    fn update(&self, device_id: &DeviceId, field: ExposedField, update: FieldUpdate) {
        self.dispatch(device_id, field, &update);
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.callback_count())
            .finish_non_exhaustive()
    }
}
