// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote API collaborator.
//!
//! The synchronization engine talks to the remote authority only through
//! the [`RemoteApi`] trait. [`HttpApi`] is the bundled implementation for
//! the cloud REST API; tests and hosts can plug in their own.
//!
//! Credentials come from a [`TokenProvider`]. The engine never manages the
//! credential lifecycle itself: on an authorization failure it calls
//! [`TokenProvider::request_refresh`] and lets the next scheduled retry or
//! refresh pick up the new token.

#[cfg(feature = "http")]
mod http;
mod payload;
mod status;

#[cfg(feature = "http")]
pub use http::{HttpApi, HttpConfig};
pub use payload::{FanWrite, PrioritySelection, RoomPriorityWrite, ThermostatWrite, WriteRequest};
pub use status::{
    ChangeableValues, CurrentPriority, DeviceSettings, FanStatus, FanValues, OperationStatus,
    Room, RoomPriorityStatus, ThermostatStatus,
};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::device::Device;
use crate::error::ApiError;

/// Operations the engine needs from the remote authority.
///
/// All futures must be `Send` because calls run on spawned tasks.
pub trait RemoteApi: Send + Sync + 'static {
    /// Pulls the thermostat status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn thermostat_status(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<ThermostatStatus, ApiError>> + Send;

    /// Pulls the fan status, or `None` if the device has no fan.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn fan_status(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Option<FanStatus>, ApiError>> + Send;

    /// Pulls the room priority, or `None` if unsupported.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn room_priority(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Option<RoomPriorityStatus>, ApiError>> + Send;

    /// Writes thermostat mode and setpoints.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn write_thermostat(
        &self,
        device: &Device,
        payload: &ThermostatWrite,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Writes the fan mode.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn write_fan(
        &self,
        device: &Device,
        payload: &FanWrite,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Writes the room priority.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    fn write_room_priority(
        &self,
        device: &Device,
        payload: &RoomPriorityWrite,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Source of the bearer credential.
pub trait TokenProvider: Send + Sync {
    /// Returns the current access token, if any.
    fn access_token(&self) -> Option<String>;

    /// Asks the owner of the credential to refresh it.
    ///
    /// Must not block; the new token is picked up by later calls.
    fn request_refresh(&self);
}

/// A fixed token, replaceable from outside.
///
/// Counts refresh requests so hosts can react to them (and tests can
/// observe them).
///
/// # Examples
///
/// ```
/// use thermsync::protocol::{StaticToken, TokenProvider};
///
/// let tokens = StaticToken::new("abc");
/// assert_eq!(tokens.access_token().as_deref(), Some("abc"));
///
/// tokens.request_refresh();
/// tokens.set_token("def");
/// assert_eq!(tokens.refresh_requests(), 1);
/// ```
#[derive(Debug, Default)]
pub struct StaticToken {
    token: RwLock<Option<String>>,
    refresh_requests: AtomicU64,
}

impl StaticToken {
    /// Creates a provider holding `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            refresh_requests: AtomicU64::new(0),
        }
    }

    /// Creates a provider without a token.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replaces the token.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Returns how many refreshes have been requested.
    #[must_use]
    pub fn refresh_requests(&self) -> u64 {
        self.refresh_requests.load(Ordering::Relaxed)
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn request_refresh(&self) {
        self.refresh_requests.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Access token refresh requested");
    }
}
