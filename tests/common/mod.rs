// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory remote API and presenter shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thermsync::device::{DeviceId, LocationId};
use thermsync::error::ApiError;
use thermsync::protocol::{
    ChangeableValues, CurrentPriority, FanStatus, FanValues, FanWrite, OperationStatus, RemoteApi,
    RoomPriorityStatus, RoomPriorityWrite, ThermostatStatus, ThermostatWrite,
};
use thermsync::subscription::CallbackRegistry;
use thermsync::types::{FanMode, PriorityType, TemperatureUnit, ThermostatMode};
use thermsync::{Device, ExposedField, FieldUpdate};

pub const LOCATION: LocationId = LocationId::new(1234);

/// A remote call seen by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ThermostatStatus,
    FanStatus,
    RoomPriority,
    WriteThermostat(ThermostatWrite),
    WriteFan(FanWrite),
    WriteRoomPriority(RoomPriorityWrite),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::WriteThermostat(_) | Self::WriteFan(_) | Self::WriteRoomPriority(_)
        )
    }
}

struct Remote {
    status: ThermostatStatus,
    fan: Option<FanStatus>,
    priority: Option<RoomPriorityStatus>,
    calls: Vec<Call>,
    write_failures: VecDeque<ApiError>,
    pull_failures: VecDeque<ApiError>,
}

/// Remote authority that applies writes to its own state.
pub struct FakeApi {
    remote: Mutex<Remote>,
    write_latency: Duration,
    pull_latency: Duration,
    writes_in_flight: AtomicUsize,
    max_writes_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new(units: TemperatureUnit, mode: ThermostatMode, heat: f64, cool: f64) -> Self {
        let status = ThermostatStatus {
            device_id: "LCC-1".to_string(),
            device_class: Some("Thermostat".to_string()),
            device_model: Some("T5-T6".to_string()),
            units: Some(units),
            indoor_temperature: Some(heat),
            indoor_humidity: Some(45.0),
            allowed_modes: vec![
                "Heat".to_string(),
                "Cool".to_string(),
                "Off".to_string(),
                "Auto".to_string(),
            ],
            min_heat_setpoint: None,
            max_heat_setpoint: None,
            min_cool_setpoint: None,
            max_cool_setpoint: None,
            changeable_values: ChangeableValues {
                mode,
                heat_setpoint: Some(heat),
                cool_setpoint: Some(cool),
                auto_changeover_active: Some(false),
                thermostat_setpoint_status: None,
            },
            operation_status: Some(OperationStatus {
                mode: "EquipmentOff".to_string(),
            }),
            settings: None,
            is_alive: Some(true),
        };

        Self {
            remote: Mutex::new(Remote {
                status,
                fan: None,
                priority: None,
                calls: Vec::new(),
                write_failures: VecDeque::new(),
                pull_failures: VecDeque::new(),
            }),
            write_latency: Duration::ZERO,
            pull_latency: Duration::ZERO,
            writes_in_flight: AtomicUsize::new(0),
            max_writes_in_flight: AtomicUsize::new(0),
        }
    }

    /// A Fahrenheit thermostat heating to 68°F, cooling at 76°F.
    pub fn fahrenheit() -> Self {
        Self::new(TemperatureUnit::Fahrenheit, ThermostatMode::Heat, 68.0, 76.0)
    }

    pub fn with_fan(self, mode: FanMode) -> Self {
        self.remote.lock().fan = Some(FanStatus {
            allowed_modes: vec!["Auto".to_string(), "On".to_string(), "Circulate".to_string()],
            changeable_values: FanValues { mode },
            fan_running: Some(mode == FanMode::On),
        });
        self
    }

    pub fn with_room_priority(self, priority_type: PriorityType, rooms: Vec<u32>) -> Self {
        self.remote.lock().priority = Some(RoomPriorityStatus {
            device_id: Some("LCC-1".to_string()),
            current_priority: CurrentPriority {
                priority_type,
                selected_rooms: rooms,
                rooms: Vec::new(),
            },
        });
        self
    }

    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    /// Delays status responses; the status is read when the call starts.
    pub fn with_pull_latency(mut self, latency: Duration) -> Self {
        self.pull_latency = latency;
        self
    }

    pub fn set_mode(&self, mode: ThermostatMode) {
        self.remote.lock().status.changeable_values.mode = mode;
    }

    pub fn fail_writes(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.remote.lock().write_failures.extend(errors);
    }

    pub fn fail_pulls(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.remote.lock().pull_failures.extend(errors);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.remote.lock().calls.clone()
    }

    pub fn thermostat_writes(&self) -> Vec<ThermostatWrite> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::WriteThermostat(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn fan_writes(&self) -> Vec<FanWrite> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::WriteFan(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn room_priority_writes(&self) -> Vec<RoomPriorityWrite> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::WriteRoomPriority(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Number of thermostat status pulls.
    pub fn pulls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::ThermostatStatus)
            .count()
    }

    pub fn max_writes_in_flight(&self) -> usize {
        self.max_writes_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.remote.lock().calls.push(call);
    }

    async fn write(&self, call: Call) -> Result<(), ApiError> {
        let now = self.writes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_writes_in_flight.fetch_max(now, Ordering::SeqCst);
        self.record(call.clone());

        tokio::time::sleep(self.write_latency).await;

        let result = {
            let mut remote = self.remote.lock();
            match remote.write_failures.pop_front() {
                Some(e) => Err(e),
                None => {
                    remote.apply(&call);
                    Ok(())
                }
            }
        };
        self.writes_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn pull_failure(&self) -> Option<ApiError> {
        self.remote.lock().pull_failures.pop_front()
    }
}

impl Remote {
    fn apply(&mut self, call: &Call) {
        match call {
            Call::WriteThermostat(write) => {
                let values = &mut self.status.changeable_values;
                if let Some(mode) = write.mode {
                    values.mode = mode;
                }
                if write.heat_setpoint.is_some() {
                    values.heat_setpoint = write.heat_setpoint;
                }
                if write.cool_setpoint.is_some() {
                    values.cool_setpoint = write.cool_setpoint;
                }
                if write.auto_changeover_active.is_some() {
                    values.auto_changeover_active = write.auto_changeover_active;
                }
            }
            Call::WriteFan(write) => {
                if let Some(fan) = &mut self.fan {
                    fan.changeable_values.mode = write.mode;
                }
            }
            Call::WriteRoomPriority(write) => {
                if let Some(priority) = &mut self.priority {
                    priority.current_priority.priority_type =
                        write.current_priority.priority_type;
                    priority
                        .current_priority
                        .selected_rooms
                        .clone_from(&write.current_priority.selected_rooms);
                }
            }
            Call::ThermostatStatus | Call::FanStatus | Call::RoomPriority => {}
        }
    }
}

impl RemoteApi for FakeApi {
    async fn thermostat_status(&self, _device: &Device) -> Result<ThermostatStatus, ApiError> {
        self.record(Call::ThermostatStatus);
        if let Some(e) = self.pull_failure() {
            return Err(e);
        }
        let status = self.remote.lock().status.clone();
        tokio::time::sleep(self.pull_latency).await;
        Ok(status)
    }

    async fn fan_status(&self, _device: &Device) -> Result<Option<FanStatus>, ApiError> {
        self.record(Call::FanStatus);
        Ok(self.remote.lock().fan.clone())
    }

    async fn room_priority(
        &self,
        _device: &Device,
    ) -> Result<Option<RoomPriorityStatus>, ApiError> {
        self.record(Call::RoomPriority);
        Ok(self.remote.lock().priority.clone())
    }

    async fn write_thermostat(
        &self,
        _device: &Device,
        payload: &ThermostatWrite,
    ) -> Result<(), ApiError> {
        self.write(Call::WriteThermostat(payload.clone())).await
    }

    async fn write_fan(&self, _device: &Device, payload: &FanWrite) -> Result<(), ApiError> {
        self.write(Call::WriteFan(*payload)).await
    }

    async fn write_room_priority(
        &self,
        _device: &Device,
        payload: &RoomPriorityWrite,
    ) -> Result<(), ApiError> {
        self.write(Call::WriteRoomPriority(payload.clone())).await
    }
}

/// Every update pushed to the presentation layer, in order.
#[derive(Clone, Default)]
pub struct Updates(Arc<Mutex<Vec<(DeviceId, ExposedField, FieldUpdate)>>>);

impl Updates {
    /// Returns a registry that records into `self`.
    pub fn registry(&self) -> Arc<CallbackRegistry> {
        let registry = Arc::new(CallbackRegistry::new());
        let log = Arc::clone(&self.0);
        registry.on_field_updated(move |device_id, field, update| {
            log.lock().push((device_id.clone(), field, update.clone()));
        });
        registry
    }

    pub fn all(&self) -> Vec<(DeviceId, ExposedField, FieldUpdate)> {
        self.0.lock().clone()
    }

    /// Returns the latest update of `field`.
    pub fn last(&self, field: ExposedField) -> Option<FieldUpdate> {
        self.0
            .lock()
            .iter()
            .rev()
            .find(|(_, f, _)| *f == field)
            .map(|(_, _, update)| update.clone())
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}
