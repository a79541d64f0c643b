// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot to exposed-state reconciliation.

use crate::device::Device;
use crate::manager::{DeviceShared, ManagedDevice};
use crate::state::{DesiredState, Edit, ExposedField, FieldUpdate, FieldValue, RemoteSnapshot};
use crate::subscription::Presenter;
use crate::types::{CurrentHeatingCoolingState, TargetHeatingCoolingState};

use super::{MutationClass, PerClass};

/// Computes the exposed view of a remote snapshot.
///
/// Temperatures are converted from the snapshot's unit (or the device's
/// when the snapshot does not say) to Celsius. The target temperature is
/// the heat setpoint in Heat mode and the cool setpoint in every other
/// mode. Fields the snapshot does not carry stay undefined.
///
/// # Examples
///
/// ```
/// use thermsync::device::{Device, DeviceModel, LocationId};
/// use thermsync::protocol::ThermostatStatus;
/// use thermsync::state::RemoteSnapshot;
/// use thermsync::sync::exposed_view;
///
/// let status: ThermostatStatus = serde_json::from_value(serde_json::json!({
///     "deviceID": "LCC-1",
///     "units": "Celsius",
///     "changeableValues": { "mode": "Heat", "heatSetpoint": 21.0, "coolSetpoint": 25.0 }
/// }))
/// .unwrap();
///
/// let device = Device::new("LCC-1", LocationId::new(1), DeviceModel::T5);
/// let view = exposed_view(&device, &RemoteSnapshot::new(status, None, None));
///
/// assert_eq!(view.target_temperature(), Some(21.0));
/// ```
#[must_use]
pub fn exposed_view(device: &Device, snapshot: &RemoteSnapshot) -> DesiredState {
    let status = snapshot.thermostat();
    let units = status.units.unwrap_or(device.units());
    let mut view = DesiredState::new();

    view.set_display_units(units);
    if let Some(indoor) = status.indoor_temperature {
        view.set_current_temperature(units.to_celsius(indoor));
    }
    view.set_current_state(
        status
            .operation_status
            .as_ref()
            .map_or(CurrentHeatingCoolingState::Off, |op| {
                CurrentHeatingCoolingState::from_operation_mode(&op.mode)
            }),
    );
    if device.capabilities().supports_humidity()
        && let Some(humidity) = status.indoor_humidity
    {
        view.set_humidity(humidity);
    }

    let target = TargetHeatingCoolingState::from_remote(snapshot.mode());
    view.apply(&Edit::TargetMode(target));

    let heat = snapshot.heat_setpoint().map(|v| units.to_celsius(v));
    let cool = snapshot.cool_setpoint().map(|v| units.to_celsius(v));
    if let Some(heat) = heat {
        view.apply(&Edit::HeatingThreshold(heat));
    }
    if let Some(cool) = cool {
        view.apply(&Edit::CoolingThreshold(cool));
    }
    let selected = if target == TargetHeatingCoolingState::Heat {
        heat
    } else {
        cool
    };
    if let Some(selected) = selected {
        view.apply(&Edit::TargetTemperature(selected));
    }

    if device.capabilities().supports_fan()
        && let Some(mode) = snapshot.fan_mode()
    {
        let (target, active) = mode.to_local();
        view.apply(&Edit::TargetFanState(target));
        view.apply(&Edit::FanActive(active));
    }

    if device.capabilities().supports_room_priority()
        && let Some(selection) = snapshot.room_selection()
    {
        view.apply(&Edit::RoomPriority(selection));
    }

    view
}

/// Stores `snapshot` and merges it into the desired state.
///
/// Readings are always adopted. A writable class is adopted only when it
/// has no write in flight, nothing pending, and no write sent since
/// `epochs` was taken before the pull, so a refresh never stomps an
/// unconfirmed edit. Returns every defined exposed field.
pub(crate) fn reconcile(
    managed: &ManagedDevice,
    shared: &mut DeviceShared,
    snapshot: RemoteSnapshot,
    epochs: &PerClass<u64>,
) -> Vec<(ExposedField, FieldValue)> {
    let device = managed.device();
    let view = exposed_view(device, &snapshot);

    shared.desired.adopt_readings(&view);
    for class in MutationClass::ALL {
        if managed.guards().is_in_flight(class)
            || shared.pending[class].has_pending()
            || shared.write_epochs[class] != epochs[class]
        {
            tracing::debug!(
                device_id = %device.id(),
                %class,
                "Keeping local values over refreshed state"
            );
            continue;
        }
        shared.desired.adopt_class(class, &view);
    }
    shared.snapshot = Some(snapshot);

    shared
        .desired
        .defined_fields(&ExposedField::for_capabilities(device.capabilities()))
}

/// Pushes reconciled values to the presentation layer.
pub(crate) fn publish_values(
    presenter: &dyn Presenter,
    device: &Device,
    values: Vec<(ExposedField, FieldValue)>,
) {
    for (field, value) in values {
        presenter.update(device.id(), field, FieldUpdate::Value(value));
    }
}

/// Marks every exposed field of `device` as errored.
pub(crate) fn publish_error(presenter: &dyn Presenter, device: &Device) {
    for field in ExposedField::for_capabilities(device.capabilities()) {
        presenter.update(device.id(), field, FieldUpdate::Error);
    }
}
