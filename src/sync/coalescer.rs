// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutation coalescing.
//!
//! An edit lands in the desired state immediately and (re)arms the debounce
//! timer of its class. When the timer fires, one write carrying the latest
//! values of every field of that class is pushed, however many edits
//! arrived during the window.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::manager::{DeviceShared, ManagedDevice};
use crate::protocol::RemoteApi;
use crate::state::Edit;

use super::pipeline::{Attempt, push};
use super::{MutationClass, SyncContext, TimerSlot};

/// Coalescing state of one (device, class).
#[derive(Debug, Default)]
pub(crate) struct PendingWrite {
    dirty: bool,
    pub(crate) debounce: TimerSlot,
    pub(crate) retry: TimerSlot,
}

impl PendingWrite {
    /// Returns `true` if local edits have not been written yet.
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns `true` if anything is waiting to be written: unwritten
    /// edits or a scheduled retry.
    pub(crate) fn has_pending(&self) -> bool {
        self.dirty || self.debounce.is_scheduled() || self.retry.is_scheduled()
    }

    /// Marks the latest edits as taken by a write about to be built.
    pub(crate) fn take(&mut self) {
        self.dirty = false;
        self.debounce.cancel();
    }

    /// Cancels every timer.
    pub(crate) fn cancel(&mut self) {
        self.debounce.cancel();
        self.retry.cancel();
    }
}

/// Applies a local edit and arms the debounce of its class.
///
/// # Errors
///
/// Returns an error if the edit is not valid for the device; the desired
/// state is left untouched in that case.
pub(crate) fn on_edit<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    edit: &Edit,
) -> Result<()> {
    edit.validate(managed.device())?;
    let class = edit.class();

    let mut shared = managed.lock();
    if shared.removed {
        return Err(Error::DeviceNotFound);
    }
    shared.desired.apply(edit);
    arm(ctx, managed, &mut shared, class);

    tracing::debug!(device_id = %managed.id(), %class, ?edit, "Local edit applied");
    Ok(())
}

/// Marks `class` dirty and restarts its debounce window.
///
/// A newer edit supersedes any scheduled retry of the previous write.
pub(crate) fn arm<A: RemoteApi>(
    ctx: &Arc<SyncContext<A>>,
    managed: &Arc<ManagedDevice>,
    shared: &mut DeviceShared,
    class: MutationClass,
) {
    let delay = managed.config().push_rate();
    let pending = &mut shared.pending[class];
    pending.dirty = true;
    pending.retry.cancel();
    pending.debounce.arm(|generation| {
        tokio::spawn(debounce(
            Arc::clone(ctx),
            Arc::clone(managed),
            class,
            generation,
            delay,
        ))
    });
}

async fn debounce<A: RemoteApi>(
    ctx: Arc<SyncContext<A>>,
    managed: Arc<ManagedDevice>,
    class: MutationClass,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    if !managed.lock().pending[class].debounce.fire(generation) {
        return;
    }

    if let Err(e) = push(&ctx, &managed, class, Attempt::Coalesced).await {
        tracing::debug!(
            device_id = %managed.id(),
            %class,
            error = %e,
            "Coalesced write did not complete"
        );
    }
}
