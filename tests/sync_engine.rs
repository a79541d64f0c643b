// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests of the sync engine against an in-memory remote.
//!
//! Every test runs on a paused clock: sleeping advances virtual time and
//! fires debounce, retry and refresh timers deterministically.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeApi, LOCATION, Updates};
use thermsync::error::{ApiError, ApiErrorKind};
use thermsync::event::SyncEvent;
use thermsync::manager::{DeviceConfig, RetryPolicy, SyncManager};
use thermsync::protocol::{FanWrite, StaticToken};
use thermsync::types::{
    FanActive, FanMode, PriorityType, RoomSelection, TargetFanState, TargetHeatingCoolingState,
    TemperatureUnit, ThermostatMode,
};
use thermsync::{
    Capabilities, Device, DeviceId, DeviceModel, Edit, Error, ExposedField, FieldUpdate,
    FieldValue, MutationClass,
};
use tokio::sync::broadcast;
use tokio::time::sleep;

fn device() -> Device {
    Device::new("LCC-1", LOCATION, DeviceModel::T5)
}

fn manager(api: &Arc<FakeApi>, updates: &Updates) -> SyncManager<FakeApi> {
    SyncManager::new(Arc::clone(api), updates.registry())
}

/// Lets the refresh loop run its immediate first pull.
async fn settle() {
    sleep(Duration::from_millis(100)).await;
}

fn drain(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Mutation Coalescing
// ============================================================================

mod coalescing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn edits_within_window_produce_one_write() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(21.5)).await.unwrap();
        sleep(Duration::from_millis(500)).await;
        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(2)).await;

        let writes = api.thermostat_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].mode, Some(ThermostatMode::Heat));
        assert_eq!(writes[0].heat_setpoint, Some(72.0));
        assert_eq!(writes[0].cool_setpoint, Some(76.0));
    }

    #[tokio::test(start_paused = true)]
    async fn edits_of_several_fields_share_one_write() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager
            .edit(&id, Edit::TargetMode(TargetHeatingCoolingState::Cool))
            .await
            .unwrap();
        manager.edit(&id, Edit::TargetTemperature(23.0)).await.unwrap();
        sleep(Duration::from_secs(2)).await;

        let writes = api.thermostat_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].mode, Some(ThermostatMode::Cool));
        assert_eq!(writes[0].heat_setpoint, Some(68.0));
        assert_eq!(writes[0].cool_setpoint, Some(73.0));
    }

    #[tokio::test(start_paused = true)]
    async fn edit_is_visible_before_the_write() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(23.0)).await.unwrap();

        assert_eq!(
            manager.current_value(&id, ExposedField::TargetTemperature).await,
            Some(FieldValue::Temperature(23.0))
        );
        assert!(api.thermostat_writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_edit_leaves_state_untouched() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        let result = manager
            .edit(&id, Edit::TargetFanState(TargetFanState::Auto))
            .await;

        assert!(matches!(result, Err(Error::CapabilityNotSupported(_))));
        let desired = manager.desired_state(&id).await.unwrap();
        assert_eq!(desired.fan_target(), None);
    }
}

// ============================================================================
// Write Pipeline
// ============================================================================

mod write_pipeline {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn at_most_one_write_in_flight_and_late_edits_are_kept() {
        let api = Arc::new(FakeApi::fahrenheit().with_write_latency(Duration::from_secs(3)));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;
        let mut events = manager.subscribe();

        manager.edit(&id, Edit::TargetTemperature(21.0)).await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert!(manager.is_write_in_flight(&id, MutationClass::Thermostat).await);

        // Debounce of this edit closes while the first write is still running
        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(9)).await;

        assert_eq!(api.max_writes_in_flight(), 1);
        let writes = api.thermostat_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].heat_setpoint, Some(70.0));
        assert_eq!(writes[1].heat_setpoint, Some(72.0));

        let events = drain(&mut events);
        assert!(events.contains(&SyncEvent::WriteRejected {
            device_id: id.clone(),
            class: MutationClass::Thermostat,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn direct_push_is_rejected_while_guarded() {
        let api = Arc::new(FakeApi::fahrenheit().with_write_latency(Duration::from_secs(3)));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(21.0)).await.unwrap();
        sleep(Duration::from_millis(1500)).await;

        let result = manager.push(&id, MutationClass::Thermostat).await;
        assert!(matches!(
            result,
            Err(Error::WriteInFlight {
                class: MutationClass::Thermostat
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_retried_once_then_refreshed() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_writes([
            ApiError::Network("timed out".to_string()),
            ApiError::Network("timed out".to_string()),
        ]);
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let config = DeviceConfig::new().with_retry(RetryPolicy::enabled());
        let id = manager.add_device(device(), config).await.unwrap();
        settle().await;
        let mut events = manager.subscribe();

        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(30)).await;

        let writes = api.thermostat_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
        assert_eq!(api.pulls(), 2);

        let id = DeviceId::new("LCC-1");
        let events: Vec<_> = drain(&mut events)
            .into_iter()
            .filter(|e| e.is_write() || e.is_refresh() || matches!(e, SyncEvent::RetryScheduled { .. }))
            .collect();
        assert_eq!(
            events,
            vec![
                SyncEvent::WriteStarted {
                    device_id: id.clone(),
                    class: MutationClass::Thermostat,
                    retry: false,
                },
                SyncEvent::WriteFailed {
                    device_id: id.clone(),
                    class: MutationClass::Thermostat,
                    kind: ApiErrorKind::Network,
                    retry_scheduled: true,
                },
                SyncEvent::RetryScheduled {
                    device_id: id.clone(),
                    class: Some(MutationClass::Thermostat),
                },
                SyncEvent::WriteStarted {
                    device_id: id.clone(),
                    class: MutationClass::Thermostat,
                    retry: true,
                },
                SyncEvent::WriteFailed {
                    device_id: id.clone(),
                    class: MutationClass::Thermostat,
                    kind: ApiErrorKind::Network,
                    retry_scheduled: false,
                },
                SyncEvent::RefreshApplied {
                    device_id: id.clone(),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_without_retry_still_refreshes() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_writes([ApiError::Server]);
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(20)).await;

        assert_eq!(api.thermostat_writes().len(), 1);
        assert_eq!(api.pulls(), 2);
        // The refresh restored the remote value over the failed edit
        assert_eq!(
            manager.current_value(&id, ExposedField::TargetTemperature).await,
            Some(FieldValue::Temperature(20.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_marks_every_field_errored() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_writes([ApiError::Server]);
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;
        updates.clear();

        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(api.thermostat_writes().len(), 1);
        for field in ExposedField::for_capabilities(device().capabilities()) {
            assert_eq!(updates.last(field), Some(FieldUpdate::Error), "{field:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_write_requests_token_refresh() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_writes([ApiError::Unauthorized { status: 401 }]);
        let tokens = Arc::new(StaticToken::new("expired"));
        let updates = Updates::default();
        let manager = manager(&api, &updates).with_token_provider(tokens.clone());
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(tokens.refresh_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn equal_room_selection_is_not_written() {
        let api = Arc::new(
            FakeApi::fahrenheit().with_room_priority(PriorityType::PickARoom, vec![1, 2]),
        );
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let t9 = Device::new("LCC-1", LOCATION, DeviceModel::T9);
        let id = manager.add_device(t9, DeviceConfig::new()).await.unwrap();
        settle().await;
        let mut events = manager.subscribe();

        manager
            .edit(&id, Edit::RoomPriority(RoomSelection::pick_a_room(vec![1, 2])))
            .await
            .unwrap();
        sleep(Duration::from_secs(2)).await;

        assert!(api.room_priority_writes().is_empty());
        assert!(drain(&mut events).contains(&SyncEvent::WriteSkipped {
            device_id: id.clone(),
            class: MutationClass::RoomPriority,
        }));

        // Room order matters
        manager
            .edit(&id, Edit::RoomPriority(RoomSelection::pick_a_room(vec![2, 1])))
            .await
            .unwrap();
        sleep(Duration::from_secs(2)).await;

        let writes = api.room_priority_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].current_priority.priority_type, PriorityType::PickARoom);
        assert_eq!(writes[0].current_priority.selected_rooms, vec![2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn thermostat_modes_round_trip() {
        let api = Arc::new(FakeApi::new(
            TemperatureUnit::Celsius,
            ThermostatMode::Heat,
            20.0,
            24.0,
        ));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        for mode in [
            ThermostatMode::Heat,
            ThermostatMode::Cool,
            ThermostatMode::Auto,
            ThermostatMode::Off,
        ] {
            api.set_mode(mode);
            assert!(manager.refresh(&id).await.unwrap());
            assert_eq!(
                manager
                    .current_value(&id, ExposedField::TargetHeatingCoolingState)
                    .await,
                Some(FieldValue::TargetMode(TargetHeatingCoolingState::from_remote(mode)))
            );

            manager.push(&id, MutationClass::Thermostat).await.unwrap();

            let written = api.thermostat_writes().pop().unwrap();
            assert_eq!(written.mode, Some(mode), "mode {mode}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fan_auto_round_trips_to_auto_inactive() {
        let api = Arc::new(FakeApi::fahrenheit().with_fan(FanMode::On));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let with_fan = device().with_capabilities(Capabilities::builder().fan().build());
        let id = manager.add_device(with_fan, DeviceConfig::new()).await.unwrap();
        settle().await;
        assert_eq!(
            manager.current_value(&id, ExposedField::FanActive).await,
            Some(FieldValue::FanActive(FanActive::Active))
        );

        manager
            .edit(&id, Edit::TargetFanState(TargetFanState::Auto))
            .await
            .unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(api.fan_writes(), vec![FanWrite { mode: FanMode::Auto }]);

        // Targeted refresh after the fan write
        sleep(Duration::from_secs(6)).await;

        assert_eq!(
            manager.current_value(&id, ExposedField::TargetFanState).await,
            Some(FieldValue::FanTarget(TargetFanState::Auto))
        );
        assert_eq!(
            updates.last(ExposedField::FanActive),
            Some(FieldUpdate::Value(FieldValue::FanActive(FanActive::Inactive)))
        );
    }
}

// ============================================================================
// Refresh Loop and Reconciliation
// ============================================================================

mod refresh {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_pull_seeds_exposed_values() {
        let api = Arc::new(FakeApi::new(
            TemperatureUnit::Celsius,
            ThermostatMode::Heat,
            21.0,
            25.0,
        ));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager
            .add_device(device().with_units(TemperatureUnit::Celsius), DeviceConfig::new())
            .await
            .unwrap();
        settle().await;

        assert_eq!(api.pulls(), 1);
        assert_eq!(
            manager.current_value(&id, ExposedField::TargetTemperature).await,
            Some(FieldValue::Temperature(21.0))
        );
        assert_eq!(
            updates.last(ExposedField::TargetTemperature),
            Some(FieldUpdate::Value(FieldValue::Temperature(21.0)))
        );
        assert_eq!(
            updates.last(ExposedField::CurrentHeatingCoolingState),
            Some(FieldUpdate::Value(FieldValue::CurrentState(
                thermsync::CurrentHeatingCoolingState::Off
            )))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pull_overlapping_a_write_keeps_the_written_value() {
        let api = Arc::new(
            FakeApi::new(TemperatureUnit::Celsius, ThermostatMode::Heat, 20.0, 25.0)
                .with_pull_latency(Duration::from_secs(3)),
        );
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager
            .add_device(
                device().with_units(TemperatureUnit::Celsius),
                DeviceConfig::new().with_refresh_rate(Duration::from_secs(30)),
            )
            .await
            .unwrap();
        sleep(Duration::from_millis(29_500)).await;

        // The tick at 30s reads 20.0 and answers at 33s; the write lands at 30.5s
        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_secs(4)).await;

        assert_eq!(api.pulls(), 2);
        let writes = api.thermostat_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].heat_setpoint, Some(22.0));
        assert_eq!(
            manager.current_value(&id, ExposedField::TargetTemperature).await,
            Some(FieldValue::Temperature(22.0))
        );
        assert_eq!(
            updates.last(ExposedField::TargetTemperature),
            Some(FieldUpdate::Value(FieldValue::Temperature(22.0)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_is_skipped_while_write_in_flight() {
        let api = Arc::new(FakeApi::fahrenheit().with_write_latency(Duration::from_secs(5)));
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;
        let mut events = manager.subscribe();

        manager.edit(&id, Edit::TargetTemperature(22.0)).await.unwrap();
        sleep(Duration::from_millis(1500)).await;

        assert!(!manager.refresh(&id).await.unwrap());
        assert_eq!(api.pulls(), 1);
        assert!(drain(&mut events).contains(&SyncEvent::RefreshSkipped {
            device_id: id.clone()
        }));

        // The targeted refresh catches up after the write
        sleep(Duration::from_secs(20)).await;
        assert_eq!(api.pulls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_keeps_unwritten_edits() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let config = DeviceConfig::new().with_push_rate(Duration::from_secs(10));
        let id = manager.add_device(device(), config).await.unwrap();
        settle().await;

        manager.edit(&id, Edit::TargetTemperature(23.0)).await.unwrap();
        assert!(manager.refresh(&id).await.unwrap());

        let desired = manager.desired_state(&id).await.unwrap();
        assert_eq!(desired.target_temperature(), Some(23.0));
        assert_eq!(desired.current_temperature(), Some(20.0));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_loop_runs_on_interval() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let config = DeviceConfig::new().with_refresh_rate(Duration::from_secs(60));
        manager.add_device(device(), config).await.unwrap();
        settle().await;
        assert_eq!(api.pulls(), 1);

        sleep(Duration::from_secs(125)).await;

        assert_eq!(api.pulls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn pull_failure_marks_every_field_errored() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_pulls([ApiError::Server]);
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let mut events = manager.subscribe();
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        for field in ExposedField::for_capabilities(device().capabilities()) {
            assert_eq!(updates.last(field), Some(FieldUpdate::Error), "{field:?}");
        }
        assert!(drain(&mut events).contains(&SyncEvent::RefreshFailed {
            device_id: id,
            kind: ApiErrorKind::Server,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_pull_is_retried_once() {
        let api = Arc::new(FakeApi::fahrenheit());
        api.fail_pulls([ApiError::RateLimited]);
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let config = DeviceConfig::new().with_retry(RetryPolicy::enabled());
        let id = manager.add_device(device(), config).await.unwrap();
        settle().await;
        assert_eq!(updates.last(ExposedField::TargetTemperature), Some(FieldUpdate::Error));

        sleep(Duration::from_secs(6)).await;

        assert_eq!(api.pulls(), 2);
        assert_eq!(
            manager.current_value(&id, ExposedField::TargetTemperature).await,
            Some(FieldValue::Temperature(20.0))
        );
        assert!(
            updates
                .last(ExposedField::TargetTemperature)
                .is_some_and(|u| !u.is_error())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn removed_device_stops_refreshing() {
        let api = Arc::new(FakeApi::fahrenheit());
        let updates = Updates::default();
        let manager = manager(&api, &updates);
        let id = manager.add_device(device(), DeviceConfig::new()).await.unwrap();
        settle().await;

        assert!(manager.remove_device(&id).await);
        sleep(Duration::from_secs(300)).await;

        assert_eq!(api.pulls(), 1);
    }
}
