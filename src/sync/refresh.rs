// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh loop and targeted refreshes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::device::Device;
use crate::error::{ApiError, Result};
use crate::event::SyncEvent;
use crate::manager::ManagedDevice;
use crate::protocol::RemoteApi;
use crate::state::RemoteSnapshot;

use super::reconciler::{publish_error, publish_values, reconcile};
use super::{MutationClass, RETRY_DELAY, SyncContext};

/// Starts the periodic refresh of a device.
///
/// The first tick fires immediately and seeds the desired state.
pub(crate) fn start_refresh_loop<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
) {
    let rate = managed.config().refresh_rate();
    let mut shared = managed.lock();
    if shared.removed {
        return;
    }
    shared.refresh_loop.arm(|_| {
        tokio::spawn(refresh_loop(Arc::clone(ctx), Arc::clone(managed), rate))
    });
}

async fn refresh_loop<A: RemoteApi>(
    ctx: Arc<SyncContext<A>>,
    managed: Arc<ManagedDevice>,
    rate: Duration,
) {
    tracing::debug!(device_id = %managed.id(), ?rate, "Starting refresh loop");

    let mut interval = tokio::time::interval(rate);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        // Failures are reported to the presenter and the event bus
        let _ = refresh_if_idle(&ctx, &managed, false).await;
    }
}

/// Schedules the refresh that follows a write of `class`.
///
/// Replaces any refresh already scheduled for that class.
pub(crate) fn schedule_targeted_refresh<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    class: MutationClass,
) {
    let delay = class.refresh_delay();
    let mut shared = managed.lock();
    if shared.removed {
        return;
    }
    shared.targeted_refresh[class].arm(|generation| {
        tokio::spawn(targeted_refresh(
            Arc::clone(ctx),
            Arc::clone(managed),
            class,
            generation,
            delay,
        ))
    });
    tracing::debug!(device_id = %managed.id(), %class, ?delay, "Targeted refresh scheduled");
}

async fn targeted_refresh<A: RemoteApi>(
    ctx: Arc<SyncContext<A>>,
    managed: Arc<ManagedDevice>,
    class: MutationClass,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    if !managed.lock().targeted_refresh[class].fire(generation) {
        return;
    }

    // Failures are reported to the presenter and the event bus
    let _ = refresh_if_idle(&ctx, &managed, false).await;
}

/// Pulls and reconciles the device unless a thermostat write is in flight.
///
/// A write sent while the pull is outstanding makes the pulled values of
/// its class stale; those are not adopted. Returns `Ok(false)` when the
/// pull was skipped.
///
/// # Errors
///
/// Returns `Error::Api` if the pull failed. Every exposed field has been
/// marked as errored by then.
pub(crate) async fn refresh_if_idle<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    is_retry: bool,
) -> Result<bool> {
    if managed.guards().is_in_flight(MutationClass::Thermostat) {
        tracing::debug!(device_id = %managed.id(), "Write in flight, skipping refresh");
        ctx.events.publish(SyncEvent::RefreshSkipped {
            device_id: managed.id().clone(),
        });
        return Ok(false);
    }

    let epochs = managed.lock().write_epochs;

    match pull(ctx.api.as_ref(), managed.device()).await {
        Ok(snapshot) => {
            let values = {
                let mut shared = managed.lock();
                if shared.removed {
                    return Ok(false);
                }
                shared.pull_retry.cancel();
                reconcile(managed, &mut shared, snapshot, &epochs)
            };
            publish_values(ctx.presenter.as_ref(), managed.device(), values);

            tracing::debug!(device_id = %managed.id(), "Refresh applied");
            ctx.events.publish(SyncEvent::RefreshApplied {
                device_id: managed.id().clone(),
            });
            Ok(true)
        }
        Err(e) => {
            let retry_scheduled = !is_retry
                && managed.config().retry().enabled
                && schedule_pull_retry(ctx, managed);

            tracing::warn!(
                device_id = %managed.id(),
                error = %e,
                retry_scheduled,
                "Refresh failed"
            );
            if e.is_authorization() {
                ctx.tokens.request_refresh();
            }
            publish_error(ctx.presenter.as_ref(), managed.device());

            ctx.events.publish(SyncEvent::RefreshFailed {
                device_id: managed.id().clone(),
                kind: e.kind(),
            });
            if retry_scheduled {
                ctx.events.publish(SyncEvent::RetryScheduled {
                    device_id: managed.id().clone(),
                    class: None,
                });
            }
            Err(e.into())
        }
    }
}

/// Pulls the thermostat and the sub-resources the device supports.
async fn pull<A: RemoteApi>(
    api: &A,
    device: &Device,
) -> std::result::Result<RemoteSnapshot, ApiError> {
    let thermostat = api.thermostat_status(device).await?;

    let fan = if device.capabilities().supports_fan() {
        api.fan_status(device).await?
    } else {
        None
    };

    let room_priority = if device.capabilities().supports_room_priority() {
        api.room_priority(device).await?
    } else {
        None
    };

    Ok(RemoteSnapshot::new(thermostat, fan, room_priority))
}

fn schedule_pull_retry<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
) -> bool {
    let mut shared = managed.lock();
    if shared.removed {
        return false;
    }
    shared.pull_retry.arm(|generation| {
        tokio::spawn(retry_pull(Arc::clone(ctx), Arc::clone(managed), generation))
    });
    true
}

async fn retry_pull<A: RemoteApi>(
    ctx: Arc<SyncContext<A>>,
    managed: Arc<ManagedDevice>,
    generation: u64,
) {
    tokio::time::sleep(RETRY_DELAY).await;

    if !managed.lock().pull_retry.fire(generation) {
        return;
    }

    tracing::info!(device_id = %managed.id(), "Retrying failed refresh");
    // Failures are reported to the presenter and the event bus
    let _ = refresh_if_idle(&ctx, &managed, true).await;
}
