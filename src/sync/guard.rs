// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-flight guards.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::MutationClass;

/// Per-class "write in flight" flags of one device.
#[derive(Debug, Default)]
pub(crate) struct UpdateGuards {
    in_flight: [AtomicBool; 3],
}

impl UpdateGuards {
    /// Marks `class` as in flight.
    ///
    /// Returns `None` if a write of that class is already running. The flag
    /// is cleared when the returned guard is dropped.
    pub(crate) fn try_acquire(self: &Arc<Self>, class: MutationClass) -> Option<InFlight> {
        self.flag(class)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                guards: Arc::clone(self),
                class,
            })
    }

    /// Returns `true` while a write of `class` is running.
    pub(crate) fn is_in_flight(&self, class: MutationClass) -> bool {
        self.flag(class).load(Ordering::Acquire)
    }

    fn flag(&self, class: MutationClass) -> &AtomicBool {
        &self.in_flight[class.index()]
    }
}

/// Proof that a write of one class holds the guard.
#[derive(Debug)]
pub(crate) struct InFlight {
    guards: Arc<UpdateGuards>,
    class: MutationClass,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.guards.flag(self.class).store(false, Ordering::Release);
    }
}
