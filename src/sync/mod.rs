// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The reconciliation engine.
//!
//! Local edits and remote state meet here:
//!
//! - the coalescer collapses bursts of edits into one pending write per
//!   device and [`MutationClass`], deferred by the push-rate debounce;
//! - the write pipeline sends that write behind an in-flight guard,
//!   classifies failures, schedules at most one retry and always schedules
//!   a targeted refresh afterwards;
//! - the refresh loop pulls remote state on a fixed interval, skipping
//!   ticks while a thermostat write is in flight;
//! - the reconciler turns each pull into exposed field values.
//!
//! Every timer is a spawned tokio task owned by a slot that aborts it when
//! superseded. Per-device state sits behind one mutex that is never held
//! across an `.await`.

mod coalescer;
mod guard;
mod payload;
mod pipeline;
mod reconciler;
mod refresh;
mod timer;

pub use payload::build_write;
pub use reconciler::exposed_view;

pub(crate) use coalescer::{PendingWrite, on_edit};
pub(crate) use guard::UpdateGuards;
pub(crate) use pipeline::{Attempt, push};
pub(crate) use refresh::{refresh_if_idle, start_refresh_loop};
pub(crate) use timer::TimerSlot;

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;
use std::time::Duration;

use crate::event::EventBus;
use crate::protocol::TokenProvider;
use crate::subscription::Presenter;

/// Delay before the single retry of a failed write or pull.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Delay before the targeted refresh that follows a thermostat write.
pub const THERMOSTAT_REFRESH_DELAY: Duration = Duration::from_secs(15);

/// Delay before the targeted refresh that follows a fan or room-priority
/// write.
pub const SUB_REFRESH_DELAY: Duration = Duration::from_secs(5);

/// Independent groups of writable fields.
///
/// Each class maps to one remote write endpoint and has its own debounce
/// timer, in-flight guard and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MutationClass {
    /// Mode and setpoints.
    Thermostat,
    /// Fan mode.
    Fan,
    /// Room priority.
    RoomPriority,
}

impl MutationClass {
    /// Every class.
    pub const ALL: [Self; 3] = [Self::Thermostat, Self::Fan, Self::RoomPriority];

    /// Returns the delay of the targeted refresh that follows a write.
    #[must_use]
    pub const fn refresh_delay(self) -> Duration {
        match self {
            Self::Thermostat => THERMOSTAT_REFRESH_DELAY,
            Self::Fan | Self::RoomPriority => SUB_REFRESH_DELAY,
        }
    }

    /// Returns a short lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Thermostat => "thermostat",
            Self::Fan => "fan",
            Self::RoomPriority => "room-priority",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Thermostat => 0,
            Self::Fan => 1,
            Self::RoomPriority => 2,
        }
    }
}

impl fmt::Display for MutationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per [`MutationClass`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PerClass<T>([T; 3]);

impl<T> PerClass<T> {
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T> Index<MutationClass> for PerClass<T> {
    type Output = T;

    fn index(&self, class: MutationClass) -> &T {
        &self.0[class.index()]
    }
}

impl<T> IndexMut<MutationClass> for PerClass<T> {
    fn index_mut(&mut self, class: MutationClass) -> &mut T {
        &mut self.0[class.index()]
    }
}

/// Collaborators shared by every engine task.
pub(crate) struct SyncContext<A> {
    pub(crate) api: Arc<A>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) tokens: Arc<dyn TokenProvider>,
    pub(crate) events: EventBus,
}

impl<A> Clone for SyncContext<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            presenter: Arc::clone(&self.presenter),
            tokens: Arc::clone(&self.tokens),
            events: self.events.clone(),
        }
    }
}
