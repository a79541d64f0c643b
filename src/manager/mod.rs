// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sync manager for coordinating multiple thermostats.
//!
//! # Overview
//!
//! The [`SyncManager`] is the entry point for hosts. It provides:
//!
//! - **Device management**: add and remove devices, each with its own
//!   [`DeviceConfig`]
//! - **Presentation surface**: [`edit`](SyncManager::edit) feeds local
//!   edits in, [`current_value`](SyncManager::current_value) reads exposed
//!   values, and the [`Presenter`](crate::subscription::Presenter) receives
//!   every reconciled value or error marker
//! - **Event system**: subscribe to engine activity via a broadcast channel
//!
//! # Examples
//!
//! ## Event Subscription
//!
//! ```no_run
//! use std::sync::Arc;
//! use thermsync::event::SyncEvent;
//! use thermsync::manager::SyncManager;
//! use thermsync::protocol::{HttpConfig, StaticToken};
//! use thermsync::subscription::CallbackRegistry;
//!
//! # fn example() -> thermsync::Result<()> {
//! let api = HttpConfig::new().into_api(Arc::new(StaticToken::anonymous()))?;
//! let manager = SyncManager::new(Arc::new(api), Arc::new(CallbackRegistry::new()));
//! let mut events = manager.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             SyncEvent::WriteFailed { device_id, class, kind, .. } => {
//!                 println!("{device_id}: {class} write failed ({kind})");
//!             }
//!             SyncEvent::RefreshSkipped { device_id } => {
//!                 println!("{device_id}: refresh skipped, write in flight");
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod device_config;
mod managed_device;
mod sync_manager;

pub use device_config::{DeviceConfig, MIN_REFRESH_RATE, RetryPolicy};
pub use sync_manager::SyncManager;

pub(crate) use managed_device::{DeviceShared, ManagedDevice};
