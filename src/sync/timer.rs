// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancel-and-reschedule timer slots.

use tokio::task::{AbortHandle, JoinHandle};

/// Owner of at most one scheduled timer task.
///
/// Arming aborts the previous task and bumps the generation. A task that
/// already woke up confirms it still owns the slot with [`fire`](Self::fire)
/// before doing any work; from then on it is detached from the slot and
/// later re-arms no longer abort it, so remote calls are never cancelled
/// mid-flight.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    generation: u64,
    handle: Option<AbortHandle>,
}

impl TimerSlot {
    /// Replaces the scheduled task with the one returned by `spawn`.
    ///
    /// `spawn` receives the generation the new task must present to
    /// [`fire`](Self::fire).
    pub(crate) fn arm(&mut self, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.cancel();
        self.handle = Some(spawn(self.generation).abort_handle());
    }

    /// Aborts the scheduled task, if any, and invalidates its generation.
    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Claims the slot for a task that woke up.
    ///
    /// Returns `false` if the task was superseded.
    pub(crate) fn fire(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.handle.is_none() {
            return false;
        }
        self.handle = None;
        true
    }

    /// Returns `true` while a task is waiting in this slot.
    pub(crate) fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }
}
