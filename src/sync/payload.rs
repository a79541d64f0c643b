// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write payload construction.

use crate::device::Device;
use crate::manager::DeviceConfig;
use crate::protocol::{FanWrite, PrioritySelection, RoomPriorityWrite, ThermostatWrite, WriteRequest};
use crate::state::{DesiredState, RemoteSnapshot};
use crate::types::{FanActive, FanMode, PriorityType, TargetHeatingCoolingState};

use super::MutationClass;

/// Builds the write for `class` from the desired state.
///
/// Values missing from `desired` fall back to the last snapshot. Returns
/// `None` when there is nothing to send: the class has no known target
/// yet, or (room priority only) the desired selection already matches the
/// remote one.
///
/// Setpoints are written in the snapshot's unit, or the device's when no
/// snapshot says.
///
/// # Examples
///
/// ```
/// use thermsync::device::{Device, DeviceModel, LocationId};
/// use thermsync::manager::DeviceConfig;
/// use thermsync::protocol::WriteRequest;
/// use thermsync::state::{DesiredState, Edit};
/// use thermsync::sync::{MutationClass, build_write};
/// use thermsync::types::{TargetHeatingCoolingState, ThermostatMode};
///
/// let device = Device::new("LCC-1", LocationId::new(1), DeviceModel::T5);
/// let mut desired = DesiredState::new();
/// desired.apply(&Edit::TargetMode(TargetHeatingCoolingState::Heat));
/// desired.apply(&Edit::TargetTemperature(22.0));
/// desired.apply(&Edit::CoolingThreshold(25.0));
///
/// let Some(WriteRequest::Thermostat(write)) =
///     build_write(MutationClass::Thermostat, &device, &DeviceConfig::new(), &desired, None)
/// else {
///     panic!("expected a thermostat write");
/// };
///
/// assert_eq!(write.mode, Some(ThermostatMode::Heat));
/// assert_eq!(write.heat_setpoint, Some(72.0));
/// assert_eq!(write.cool_setpoint, Some(77.0));
/// ```
#[must_use]
pub fn build_write(
    class: MutationClass,
    device: &Device,
    config: &DeviceConfig,
    desired: &DesiredState,
    snapshot: Option<&RemoteSnapshot>,
) -> Option<WriteRequest> {
    match class {
        MutationClass::Thermostat => {
            thermostat(device, config, desired, snapshot).map(WriteRequest::Thermostat)
        }
        MutationClass::Fan => fan(desired, snapshot).map(WriteRequest::Fan),
        MutationClass::RoomPriority => {
            room_priority(desired, snapshot).map(WriteRequest::RoomPriority)
        }
    }
}

fn thermostat(
    device: &Device,
    config: &DeviceConfig,
    desired: &DesiredState,
    snapshot: Option<&RemoteSnapshot>,
) -> Option<ThermostatWrite> {
    let policy = device.policy();
    let units = snapshot
        .and_then(|s| s.thermostat().units)
        .unwrap_or(device.units());

    let target = desired
        .target_mode()
        .or_else(|| snapshot.map(|s| TargetHeatingCoolingState::from_remote(s.mode())))?;

    let heating = desired
        .heating_threshold()
        .or_else(|| snapshot?.heat_setpoint().map(|v| units.to_celsius(v)));
    let cooling = desired
        .cooling_threshold()
        .or_else(|| snapshot?.cool_setpoint().map(|v| units.to_celsius(v)));
    let requested = desired.target_temperature();

    let (heat, cool) = match target {
        TargetHeatingCoolingState::Heat => (requested.or(heating), cooling),
        TargetHeatingCoolingState::Cool => (heating, requested.or(cooling)),
        TargetHeatingCoolingState::Auto | TargetHeatingCoolingState::Off => (heating, cooling),
    };

    let auto_changeover_active =
        if policy.forces_auto_changeover && target == TargetHeatingCoolingState::Auto {
            Some(true)
        } else {
            snapshot.and_then(RemoteSnapshot::auto_changeover_active)
        };

    Some(ThermostatWrite {
        mode: policy.sends_mode.then_some(target.to_remote()),
        thermostat_setpoint_status: policy
            .sends_setpoint_status
            .then_some(config.setpoint_status()),
        heat_setpoint: heat.map(|c| units.to_device(c)),
        cool_setpoint: cool.map(|c| units.to_device(c)),
        auto_changeover_active,
    })
}

fn fan(desired: &DesiredState, snapshot: Option<&RemoteSnapshot>) -> Option<FanWrite> {
    let remote = snapshot.and_then(RemoteSnapshot::fan_mode).map(FanMode::to_local);

    let target = desired.fan_target().or(remote.map(|(target, _)| target))?;
    let active = desired
        .fan_active()
        .or(remote.map(|(_, active)| active))
        .unwrap_or(FanActive::Inactive);

    Some(FanWrite {
        mode: FanMode::from_local(target, active),
    })
}

fn room_priority(
    desired: &DesiredState,
    snapshot: Option<&RemoteSnapshot>,
) -> Option<RoomPriorityWrite> {
    let selection = desired.room_selection()?;

    let remote = snapshot.and_then(RemoteSnapshot::room_selection);
    if remote.is_some_and(|remote| selection.is_equivalent(&remote)) {
        return None;
    }

    let selected_rooms = if selection.priority_type == PriorityType::PickARoom {
        selection.rooms.clone()
    } else {
        Vec::new()
    };

    Some(RoomPriorityWrite {
        current_priority: PrioritySelection {
            priority_type: selection.priority_type,
            selected_rooms,
        },
    })
}
