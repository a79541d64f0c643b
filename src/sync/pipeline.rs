// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write pipeline.

use std::sync::Arc;

use crate::device::Device;
use crate::error::{ApiError, Error, Result};
use crate::event::SyncEvent;
use crate::manager::{DeviceShared, ManagedDevice};
use crate::protocol::{RemoteApi, WriteRequest};

use super::coalescer::arm;
use super::payload::build_write;
use super::reconciler::publish_error;
use super::refresh::schedule_targeted_refresh;
use super::{MutationClass, RETRY_DELAY, SyncContext};

/// How a push was triggered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Attempt {
    /// The debounce window closed.
    Coalesced,
    /// The host asked for an immediate write.
    Direct,
    /// Second and last try of a failed write, with its original payload.
    Retry(WriteRequest),
}

impl Attempt {
    fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }
}

/// Writes the desired state of `class` to the remote.
///
/// At most one push per (device, class) runs at a time. On completion,
/// successful or not, a targeted refresh is scheduled. On failure every
/// exposed field is marked as errored and, with retries enabled, one retry
/// of the same payload is scheduled unless newer edits are already waiting
/// to be written.
///
/// # Errors
///
/// - `Error::WriteInFlight` if a write of the same class is running; the
///   class stays dirty and is re-armed when that write completes
/// - `Error::Api` if the remote call failed
pub(crate) async fn push<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    class: MutationClass,
    attempt: Attempt,
) -> Result<()> {
    let device = managed.device();

    let Some(in_flight) = managed.guards().try_acquire(class) else {
        tracing::debug!(
            device_id = %device.id(),
            %class,
            "Write already in flight, deferring"
        );
        ctx.events.publish(SyncEvent::WriteRejected {
            device_id: device.id().clone(),
            class,
        });
        return Err(Error::WriteInFlight { class });
    };

    let is_retry = attempt.is_retry();
    let request = {
        let mut shared = managed.lock();
        let request = match attempt {
            Attempt::Retry(request) => Some(request),
            Attempt::Coalesced | Attempt::Direct => {
                shared.pending[class].take();
                build_write(
                    class,
                    device,
                    managed.config(),
                    &shared.desired,
                    shared.snapshot.as_ref(),
                )
            }
        };
        if request.is_some() {
            shared.write_epochs[class] += 1;
        }
        request
    };

    let Some(request) = request else {
        drop(in_flight);
        tracing::debug!(device_id = %device.id(), %class, "Nothing to write");
        ctx.events.publish(SyncEvent::WriteSkipped {
            device_id: device.id().clone(),
            class,
        });
        return Ok(());
    };

    tracing::debug!(
        device_id = %device.id(),
        %class,
        retry = is_retry,
        payload = ?request,
        "Sending write"
    );
    ctx.events.publish(SyncEvent::WriteStarted {
        device_id: device.id().clone(),
        class,
        retry: is_retry,
    });

    let result = send(ctx.api.as_ref(), device, &request).await;
    drop(in_flight);

    let retry_scheduled = {
        let mut shared = managed.lock();
        if shared.removed {
            false
        } else if shared.pending[class].is_dirty() {
            // Edits arrived while the write was in flight
            arm(ctx, managed, &mut shared, class);
            false
        } else if result.is_err() && !is_retry && managed.config().retry().enabled {
            schedule_retry(ctx, managed, &mut shared, class, request);
            true
        } else {
            false
        }
    };

    match &result {
        Ok(()) => {
            tracing::info!(device_id = %device.id(), %class, "Write succeeded");
            ctx.events.publish(SyncEvent::WriteSucceeded {
                device_id: device.id().clone(),
                class,
            });
        }
        Err(e) => {
            log_failure(device, class, e, retry_scheduled);
            if e.is_authorization() {
                ctx.tokens.request_refresh();
            }
            publish_error(ctx.presenter.as_ref(), device);
            ctx.events.publish(SyncEvent::WriteFailed {
                device_id: device.id().clone(),
                class,
                kind: e.kind(),
                retry_scheduled,
            });
            if retry_scheduled {
                ctx.events.publish(SyncEvent::RetryScheduled {
                    device_id: device.id().clone(),
                    class: Some(class),
                });
            }
        }
    }

    schedule_targeted_refresh(ctx, managed, class);

    result.map_err(Error::from)
}

async fn send<A: RemoteApi>(
    api: &A,
    device: &Device,
    request: &WriteRequest,
) -> std::result::Result<(), ApiError> {
    match request {
        WriteRequest::Thermostat(payload) => api.write_thermostat(device, payload).await,
        WriteRequest::Fan(payload) => api.write_fan(device, payload).await,
        WriteRequest::RoomPriority(payload) => api.write_room_priority(device, payload).await,
    }
}

fn log_failure(device: &Device, class: MutationClass, error: &ApiError, retry_scheduled: bool) {
    match error {
        ApiError::ClientRequest { status } => tracing::warn!(
            device_id = %device.id(),
            %class,
            status,
            retry_scheduled,
            "Write rejected by remote API, payload or addressing defect"
        ),
        ApiError::Unauthorized { status } => tracing::warn!(
            device_id = %device.id(),
            %class,
            status,
            retry_scheduled,
            "Write not authorized, requesting token refresh"
        ),
        _ => tracing::warn!(
            device_id = %device.id(),
            %class,
            error = %error,
            retry_scheduled,
            "Write failed"
        ),
    }
}

fn schedule_retry<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    shared: &mut DeviceShared,
    class: MutationClass,
    request: WriteRequest,
) {
    shared.pending[class].retry.arm(|generation| {
        tokio::spawn(retry(
            Arc::clone(ctx),
            Arc::clone(managed),
            class,
            generation,
            request,
        ))
    });
}

async fn retry<A: RemoteApi>(
    ctx: Arc<SyncContext<A>>,
    managed: Arc<ManagedDevice>,
    class: MutationClass,
    generation: u64,
    request: WriteRequest,
) {
    tokio::time::sleep(RETRY_DELAY).await;

    if !managed.lock().pending[class].retry.fire(generation) {
        return;
    }

    tracing::info!(device_id = %managed.id(), %class, "Retrying failed write");
    if let Err(e) = push(&ctx, &managed, class, Attempt::Retry(request)).await {
        tracing::debug!(
            device_id = %managed.id(),
            %class,
            error = %e,
            "Retry did not complete"
        );
    }
}
