// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! Two views of a device are kept side by side:
//!
//! - [`RemoteSnapshot`]: the last complete pull from the remote API, in
//!   device units.
//! - [`DesiredState`]: what the presentation layer sees, in Celsius. Local
//!   [`Edit`]s land here first and are later pushed to the remote.
//!
//! # Examples
//!
//! ```
//! use thermsync::state::{DesiredState, Edit};
//! use thermsync::types::TargetHeatingCoolingState;
//!
//! let mut state = DesiredState::new();
//! state.apply(&Edit::TargetMode(TargetHeatingCoolingState::Cool));
//!
//! assert_eq!(state.target_mode(), Some(TargetHeatingCoolingState::Cool));
//! ```

mod desired;
mod edit;
mod exposed;
mod snapshot;

pub use desired::DesiredState;
pub use edit::Edit;
pub use exposed::{ExposedField, FieldUpdate, FieldValue};
pub use snapshot::RemoteSnapshot;
