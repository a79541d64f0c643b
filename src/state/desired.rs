// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The locally exposed, optimistic device state.

use crate::sync::MutationClass;
use crate::types::{
    CurrentHeatingCoolingState, FanActive, RoomSelection, TargetFanState,
    TargetHeatingCoolingState, TemperatureUnit,
};

use super::{Edit, ExposedField, FieldValue};

/// Locally exposed state of a device.
///
/// Writable fields are grouped by [`MutationClass`]. Local edits change them
/// immediately; refreshes overwrite a class only when no write for that
/// class is pending or in flight. Read-only readings always follow the last
/// remote snapshot. All fields are optional because nothing is known until
/// the first pull.
///
/// # Examples
///
/// ```
/// use thermsync::state::{DesiredState, Edit, ExposedField, FieldValue};
///
/// let mut state = DesiredState::new();
/// state.apply(&Edit::TargetTemperature(21.5));
///
/// assert_eq!(state.target_temperature(), Some(21.5));
/// assert_eq!(
///     state.get(ExposedField::TargetTemperature),
///     Some(FieldValue::Temperature(21.5))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    current_temperature: Option<f64>,
    current_state: Option<CurrentHeatingCoolingState>,
    humidity: Option<f64>,
    display_units: Option<TemperatureUnit>,

    target_mode: Option<TargetHeatingCoolingState>,
    target_temperature: Option<f64>,
    heating_threshold: Option<f64>,
    cooling_threshold: Option<f64>,

    fan_target: Option<TargetFanState>,
    fan_active: Option<FanActive>,

    room_selection: Option<RoomSelection>,
}

impl DesiredState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Edits ==========

    /// Applies a local edit.
    pub fn apply(&mut self, edit: &Edit) {
        match edit {
            Edit::TargetMode(mode) => self.target_mode = Some(*mode),
            Edit::TargetTemperature(t) => self.target_temperature = Some(*t),
            Edit::HeatingThreshold(t) => self.heating_threshold = Some(*t),
            Edit::CoolingThreshold(t) => self.cooling_threshold = Some(*t),
            Edit::TargetFanState(target) => self.fan_target = Some(*target),
            Edit::FanActive(active) => self.fan_active = Some(*active),
            Edit::RoomPriority(selection) => self.room_selection = Some(selection.clone()),
        }
    }

    // ========== Merging ==========

    /// Copies the read-only readings from `view`.
    ///
    /// Readings missing from `view` are kept rather than cleared.
    pub fn adopt_readings(&mut self, view: &Self) {
        keep_defined(&mut self.current_temperature, view.current_temperature);
        keep_defined(&mut self.current_state, view.current_state);
        keep_defined(&mut self.humidity, view.humidity);
        keep_defined(&mut self.display_units, view.display_units);
    }

    /// Copies the writable fields of `class` from `view`.
    ///
    /// Fields missing from `view` are kept rather than cleared.
    pub fn adopt_class(&mut self, class: MutationClass, view: &Self) {
        match class {
            MutationClass::Thermostat => {
                keep_defined(&mut self.target_mode, view.target_mode);
                keep_defined(&mut self.target_temperature, view.target_temperature);
                keep_defined(&mut self.heating_threshold, view.heating_threshold);
                keep_defined(&mut self.cooling_threshold, view.cooling_threshold);
            }
            MutationClass::Fan => {
                keep_defined(&mut self.fan_target, view.fan_target);
                keep_defined(&mut self.fan_active, view.fan_active);
            }
            MutationClass::RoomPriority => {
                if view.room_selection.is_some() {
                    self.room_selection.clone_from(&view.room_selection);
                }
            }
        }
    }

    // ========== Readings ==========

    /// Indoor temperature in Celsius.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.current_temperature
    }

    /// Sets the indoor temperature.
    pub fn set_current_temperature(&mut self, celsius: f64) {
        self.current_temperature = Some(celsius);
    }

    /// Current equipment state.
    #[must_use]
    pub fn current_state(&self) -> Option<CurrentHeatingCoolingState> {
        self.current_state
    }

    /// Sets the current equipment state.
    pub fn set_current_state(&mut self, state: CurrentHeatingCoolingState) {
        self.current_state = Some(state);
    }

    /// Indoor relative humidity.
    #[must_use]
    pub fn humidity(&self) -> Option<f64> {
        self.humidity
    }

    /// Sets the indoor humidity.
    pub fn set_humidity(&mut self, percent: f64) {
        self.humidity = Some(percent);
    }

    /// Display unit.
    #[must_use]
    pub fn display_units(&self) -> Option<TemperatureUnit> {
        self.display_units
    }

    /// Sets the display unit.
    pub fn set_display_units(&mut self, units: TemperatureUnit) {
        self.display_units = Some(units);
    }

    // ========== Thermostat ==========

    /// Target mode.
    #[must_use]
    pub fn target_mode(&self) -> Option<TargetHeatingCoolingState> {
        self.target_mode
    }

    /// Target temperature in Celsius.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.target_temperature
    }

    /// Heat setpoint in Celsius.
    #[must_use]
    pub fn heating_threshold(&self) -> Option<f64> {
        self.heating_threshold
    }

    /// Cool setpoint in Celsius.
    #[must_use]
    pub fn cooling_threshold(&self) -> Option<f64> {
        self.cooling_threshold
    }

    // ========== Fan ==========

    /// Fan target state.
    #[must_use]
    pub fn fan_target(&self) -> Option<TargetFanState> {
        self.fan_target
    }

    /// Fan active flag.
    #[must_use]
    pub fn fan_active(&self) -> Option<FanActive> {
        self.fan_active
    }

    // ========== Room priority ==========

    /// Room selection.
    #[must_use]
    pub fn room_selection(&self) -> Option<&RoomSelection> {
        self.room_selection.as_ref()
    }

    // ========== Presentation ==========

    /// Returns the value of one exposed field.
    #[must_use]
    pub fn get(&self, field: ExposedField) -> Option<FieldValue> {
        match field {
            ExposedField::CurrentTemperature => {
                self.current_temperature.map(FieldValue::Temperature)
            }
            ExposedField::CurrentHeatingCoolingState => {
                self.current_state.map(FieldValue::CurrentState)
            }
            ExposedField::TargetHeatingCoolingState => self.target_mode.map(FieldValue::TargetMode),
            ExposedField::TargetTemperature => self.target_temperature.map(FieldValue::Temperature),
            ExposedField::HeatingThresholdTemperature => {
                self.heating_threshold.map(FieldValue::Temperature)
            }
            ExposedField::CoolingThresholdTemperature => {
                self.cooling_threshold.map(FieldValue::Temperature)
            }
            ExposedField::TemperatureDisplayUnits => self.display_units.map(FieldValue::DisplayUnits),
            ExposedField::CurrentRelativeHumidity => self.humidity.map(FieldValue::Humidity),
            ExposedField::TargetFanState => self.fan_target.map(FieldValue::FanTarget),
            ExposedField::FanActive => self.fan_active.map(FieldValue::FanActive),
            ExposedField::RoomPriority => self.room_selection.clone().map(FieldValue::RoomPriority),
        }
    }

    /// Returns every defined field among `fields`.
    #[must_use]
    pub fn defined_fields(&self, fields: &[ExposedField]) -> Vec<(ExposedField, FieldValue)> {
        fields
            .iter()
            .filter_map(|field| self.get(*field).map(|value| (*field, value)))
            .collect()
    }
}

fn keep_defined<T: Copy>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}
