// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ThermSync` library.
//!
//! This module provides the error hierarchy used across the library: value
//! validation for local edits, remote API failures (including undecodable
//! responses), and engine-level rejections such as a write already being in flight.

use std::fmt;

use thiserror::Error;

use crate::sync::MutationClass;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A local edit carried an invalid value.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The remote API call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Device was not found in the manager.
    #[error("device not found")]
    DeviceNotFound,

    /// A device with the same identifier is already registered.
    #[error("device {0} is already registered")]
    DeviceAlreadyRegistered(String),

    /// Device does not support the requested capability.
    #[error("device does not support {0}")]
    CapabilityNotSupported(&'static str),

    /// A write for the same device and mutation class is already running.
    #[error("a {class} write is already in flight")]
    WriteInFlight {
        /// The guarded mutation class.
        class: MutationClass,
    },
}

/// Errors related to validating locally edited values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A temperature is outside the device's accepted range.
    #[error("temperature {actual} is out of range [{min}, {max}]")]
    TemperatureOutOfRange {
        /// Lowest accepted value in Celsius.
        min: f64,
        /// Highest accepted value in Celsius.
        max: f64,
        /// The rejected value.
        actual: f64,
    },

    /// The requested mode is not in the device's allowed modes.
    #[error("mode {0} is not allowed on this device")]
    ModeNotAllowed(String),

    /// A mode string could not be recognised.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// A temperature unit string could not be recognised.
    #[error("unknown temperature unit: {0}")]
    UnknownUnit(String),
}

/// Errors returned by the remote API collaborator.
///
/// The variants follow how failures are handled: authorization failures
/// trigger a credential refresh, client-request failures point at a payload
/// or addressing defect, and everything else is treated as transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, reset).
    #[error("network failure: {0}")]
    Network(String),

    /// The credential was rejected (401/403).
    #[error("authorization failed with HTTP {status}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The request itself was rejected (400/404/406/415/422).
    #[error("request rejected with HTTP {status}")]
    ClientRequest {
        /// HTTP status code.
        status: u16,
    },

    /// Too many requests (429).
    #[error("rate limited by remote API")]
    RateLimited,

    /// The remote API failed internally (500).
    #[error("remote API server error")]
    Server,

    /// Any status code outside the known taxonomy.
    #[error("unexpected HTTP status {0}")]
    UnknownStatus(u16),

    /// The response body could not be decoded.
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies a non-success HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            400 | 404 | 406 | 415 | 422 => Self::ClientRequest { status },
            429 => Self::RateLimited,
            500 => Self::Server,
            other => Self::UnknownStatus(other),
        }
    }

    /// Returns the coarse category of this error.
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Network(_) => ApiErrorKind::Network,
            Self::Unauthorized { .. } => ApiErrorKind::Authorization,
            Self::ClientRequest { .. } => ApiErrorKind::ClientRequest,
            Self::RateLimited => ApiErrorKind::RateLimited,
            Self::Server => ApiErrorKind::Server,
            Self::UnknownStatus(_) => ApiErrorKind::UnknownStatus,
            Self::Decode(_) => ApiErrorKind::Decode,
        }
    }

    /// Returns `true` if the credential should be refreshed.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Copyable category of an [`ApiError`], used in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Transport failure.
    Network,
    /// 401/403.
    Authorization,
    /// 400/404/406/415/422.
    ClientRequest,
    /// 429.
    RateLimited,
    /// 500.
    Server,
    /// Other status codes.
    UnknownStatus,
    /// Body could not be decoded.
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Authorization => "authorization",
            Self::ClientRequest => "client-request",
            Self::RateLimited => "rate-limited",
            Self::Server => "server",
            Self::UnknownStatus => "unknown-status",
            Self::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_authorization_statuses() {
        assert_eq!(
            ApiError::from_status(401),
            ApiError::Unauthorized { status: 401 }
        );
        assert_eq!(
            ApiError::from_status(403),
            ApiError::Unauthorized { status: 403 }
        );
        assert!(ApiError::from_status(403).is_authorization());
    }

    #[test]
    fn classifies_client_request_statuses() {
        for status in [400, 404, 406, 415, 422] {
            assert_eq!(
                ApiError::from_status(status).kind(),
                ApiErrorKind::ClientRequest,
                "status {status}"
            );
        }
    }

    #[test]
    fn classifies_remaining_statuses() {
        assert_eq!(ApiError::from_status(429), ApiError::RateLimited);
        assert_eq!(ApiError::from_status(500), ApiError::Server);
        assert_eq!(ApiError::from_status(503), ApiError::UnknownStatus(503));
        assert_eq!(ApiError::from_status(418).kind(), ApiErrorKind::UnknownStatus);
    }

    #[test]
    fn value_error_display() {
        let err = ValueError::TemperatureOutOfRange {
            min: 10.0,
            max: 32.0,
            actual: 40.0,
        };
        assert_eq!(err.to_string(), "temperature 40 is out of range [10, 32]");
    }

    #[test]
    fn error_from_api_error() {
        let err: Error = ApiError::RateLimited.into();
        assert!(matches!(err, Error::Api(ApiError::RateLimited)));
    }

    #[test]
    fn write_in_flight_display() {
        let err = Error::WriteInFlight {
            class: MutationClass::Fan,
        };
        assert_eq!(err.to_string(), "a fan write is already in flight");
    }
}
