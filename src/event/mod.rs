// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine events.
//!
//! The [`SyncManager`](crate::manager::SyncManager) reports what it does
//! (writes started, failed, retried, refreshes applied or skipped) on an
//! [`EventBus`] backed by tokio's broadcast channel. Events are diagnostic;
//! field values reach the presentation layer through the
//! [`Presenter`](crate::subscription::Presenter).
//!
//! # Examples
//!
//! ```
//! use thermsync::device::DeviceId;
//! use thermsync::event::{EventBus, SyncEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(SyncEvent::RefreshApplied {
//!     device_id: DeviceId::new("LCC-1"),
//! });
//! ```

mod event_bus;
mod sync_event;

pub use event_bus::{DeviceEvents, EventBus};
pub use sync_event::SyncEvent;
