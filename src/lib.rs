// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `thermsync` - keeps cloud-controlled thermostats and a local model in sync.
//!
//! This library mirrors the state of remote thermostats (with their fan,
//! humidity sensor and room-priority sub-features) into a local model that
//! a presentation layer reads and edits, and pushes local edits back to the
//! remote API.
//!
//! # Supported Features
//!
//! - **Coalescing**: bursts of edits collapse into one write per device and
//!   mutation class after a debounce window
//! - **In-flight guards**: at most one write per device and class at a time
//! - **Refresh loop**: periodic pulls, skipped while a thermostat write is in
//!   flight, plus a targeted refresh shortly after every write
//! - **Retries**: one bounded retry of a failed write or pull, when enabled
//! - **Model policy**: per-model payload rules (Round, D6, T5, T9, unknown)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use thermsync::device::{Device, DeviceModel, LocationId};
//! use thermsync::manager::{DeviceConfig, SyncManager};
//! use thermsync::protocol::{HttpConfig, StaticToken};
//! use thermsync::state::{Edit, ExposedField};
//! use thermsync::subscription::CallbackRegistry;
//! use thermsync::types::TargetHeatingCoolingState;
//!
//! #[tokio::main]
//! async fn main() -> thermsync::Result<()> {
//!     let tokens = Arc::new(StaticToken::new("access-token"));
//!     let api = HttpConfig::new()
//!         .with_api_key("consumer-key")
//!         .into_api(tokens.clone())?;
//!
//!     let callbacks = Arc::new(CallbackRegistry::new());
//!     callbacks.on_field(ExposedField::TargetTemperature, |device_id, update| {
//!         println!("{device_id}: target temperature {update:?}");
//!     });
//!
//!     let manager = SyncManager::new(Arc::new(api), callbacks).with_token_provider(tokens);
//!
//!     let device = Device::new("LCC-00D02DB89E33", LocationId::new(123_456), DeviceModel::T5);
//!     let id = manager.add_device(device, DeviceConfig::new()).await?;
//!
//!     // Both edits end up in a single write
//!     manager.edit(&id, Edit::TargetMode(TargetHeatingCoolingState::Heat)).await?;
//!     manager.edit(&id, Edit::TargetTemperature(21.5)).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `http` (default): the [`HttpApi`](protocol::HttpApi) remote API client

mod capabilities;
pub mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod sync;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
pub use device::{Device, DeviceId, DeviceModel, LocationId};
pub use error::{ApiError, ApiErrorKind, Error, Result, ValueError};
pub use manager::{DeviceConfig, RetryPolicy, SyncManager};
pub use protocol::{RemoteApi, StaticToken, TokenProvider};
pub use state::{DesiredState, Edit, ExposedField, FieldUpdate, FieldValue, RemoteSnapshot};
pub use subscription::{CallbackRegistry, Presenter, SubscriptionId};
pub use sync::MutationClass;
pub use types::{
    CurrentHeatingCoolingState, FanActive, PriorityType, RoomSelection, SetpointStatus,
    TargetFanState, TargetHeatingCoolingState, TemperatureUnit,
};
