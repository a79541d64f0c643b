// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presentation-layer notifications.
//!
//! The engine pushes every exposed field change through a [`Presenter`].
//! Hosts either implement the trait themselves or use the bundled
//! [`CallbackRegistry`], which dispatches to registered closures.
//!
//! # Usage
//!
//! ```
//! use thermsync::state::ExposedField;
//! use thermsync::subscription::CallbackRegistry;
//!
//! let registry = CallbackRegistry::new();
//!
//! let sub_id = registry.on_field(ExposedField::CurrentTemperature, |device, update| {
//!     println!("{device}: {update:?}");
//! });
//!
//! registry.unsubscribe(sub_id);
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};

use crate::device::DeviceId;
use crate::state::{ExposedField, FieldUpdate};

/// Receiver of exposed field updates.
///
/// Called from engine tasks; implementations must be cheap and must not
/// block.
pub trait Presenter: Send + Sync {
    /// Pushes the new value (or the error marker) of one field.
    fn update(&self, device_id: &DeviceId, field: ExposedField, update: FieldUpdate);
}
