// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for engine events.

use tokio::sync::broadcast::{self, error::RecvError};

use crate::device::DeviceId;

use super::SyncEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`SyncEvent`]s to any number of receivers.
///
/// Publishing never blocks the engine. A receiver that falls more than
/// the bus capacity behind loses the oldest events and sees
/// [`RecvError::Lagged`].
///
/// # Examples
///
/// ```
/// use thermsync::device::DeviceId;
/// use thermsync::event::{EventBus, SyncEvent};
///
/// let bus = EventBus::new();
/// let mut all = bus.subscribe();
/// let mut kitchen = bus.subscribe_device(DeviceId::new("LCC-kitchen"));
///
/// bus.publish(SyncEvent::DeviceAdded {
///     device_id: DeviceId::new("LCC-kitchen"),
/// });
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to 256 events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per receiver.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receives every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Receives the events of one device published from now on.
    #[must_use]
    pub fn subscribe_device(&self, device_id: DeviceId) -> DeviceEvents {
        DeviceEvents {
            device_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes `event`.
    ///
    /// Returns the number of receivers it reached; zero when nobody
    /// listens.
    pub fn publish(&self, event: SyncEvent) -> usize {
        tracing::trace!(device_id = %event.device_id(), ?event, "Publishing event");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver of the events of a single device.
#[derive(Debug)]
pub struct DeviceEvents {
    device_id: DeviceId,
    receiver: broadcast::Receiver<SyncEvent>,
}

impl DeviceEvents {
    /// Returns the device this receiver follows.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Waits for the next event of the device.
    ///
    /// Events of other devices are skipped.
    ///
    /// # Errors
    ///
    /// - `RecvError::Lagged` if events were dropped because this receiver
    ///   fell behind; receiving can continue afterwards
    /// - `RecvError::Closed` once the bus is gone
    pub async fn recv(&mut self) -> Result<SyncEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if event.device_id() == &self.device_id {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MutationClass;

    fn added(id: &str) -> SyncEvent {
        SyncEvent::DeviceAdded {
            device_id: DeviceId::new(id),
        }
    }

    #[tokio::test]
    async fn every_receiver_gets_a_copy() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        assert_eq!(bus.publish(added("a")), 2);

        assert_eq!(first.recv().await.unwrap(), added("a"));
        assert_eq!(second.recv().await.unwrap(), added("a"));
    }

    #[test]
    fn publishing_to_nobody_reaches_zero() {
        let bus = EventBus::with_capacity(4);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(added("a")), 0);
    }

    #[tokio::test]
    async fn device_receiver_skips_other_devices() {
        let bus = EventBus::new();
        let mut events = bus.subscribe_device(DeviceId::new("b"));

        bus.publish(added("a"));
        bus.publish(SyncEvent::WriteSucceeded {
            device_id: DeviceId::new("b"),
            class: MutationClass::Fan,
        });

        assert_eq!(events.device_id().as_str(), "b");
        assert_eq!(
            events.recv().await.unwrap(),
            SyncEvent::WriteSucceeded {
                device_id: DeviceId::new("b"),
                class: MutationClass::Fan,
            }
        );
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = EventBus::with_capacity(2);
        let mut events = bus.subscribe_device(DeviceId::new("a"));
        for _ in 0..3 {
            bus.publish(added("a"));
        }

        assert_eq!(events.recv().await, Err(RecvError::Lagged(1)));
        assert_eq!(events.recv().await.unwrap(), added("a"));
        drop(events);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
