/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of speedy.
 *
 * speedy is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * speedy is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with speedy. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::interpolate::linear_interpolation;
use crate::parameters::{DrivetrainLayout, VehicleParameters};

/// Converts engine rpm x tyre diameter (in) / overall ratio into mph
const RPM_TO_MPH_DIVISOR: f64 = 336.0;
const KM_PER_MILE: f64 = 1.609;
/// Empirical Nm x rpm to horsepower factor
const HORSEPOWER_DIVISOR: f64 = 7127.0;
/// Widest idle to redline span accepted, one step per rpm
pub const MAX_RPM_STEPS: u32 = 50_000;

/// Engine torque resampled onto one entry per integer rpm, after drivetrain losses.
/// Shared by every [GearProfile] built from the same parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCurve {
    rpm: Vec<u32>,
    torque: Vec<f64>
}

impl EngineCurve {
    pub fn from_parameters(params: &VehicleParameters) -> Result<EngineCurve> {
        let drivetrain = &params.drivetrain;
        let (idle_rpm, max_rpm) = match (drivetrain.idle_rpm(), drivetrain.max_rpm()) {
            (Some(idle), Some(max)) if max > idle => (idle, max),
            _ => {
                return Err(CoreError::InvalidArgument(
                    "torque curve must span an increasing rpm range".to_string()
                ));
            }
        };
        if max_rpm - idle_rpm > MAX_RPM_STEPS {
            return Err(CoreError::InvalidArgument(format!(
                "torque curve spans {} to {} rpm, more than {} rpm is not supported",
                idle_rpm, max_rpm, MAX_RPM_STEPS
            )));
        }
        let rpm: Vec<u32> = (idle_rpm..=max_rpm).collect();
        let reduced_torque: Vec<f64> = drivetrain.torque_curve.iter()
            .map(|sample| sample.torque * (1.0 - drivetrain.loss))
            .collect();
        let torque = linear_interpolation(&reduced_torque, rpm.len())?;
        Ok(EngineCurve { rpm, torque })
    }

    pub fn idle_rpm(&self) -> u32 {
        self.rpm[0]
    }

    pub fn max_rpm(&self) -> u32 {
        self.rpm[self.rpm.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.rpm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rpm.is_empty()
    }

    pub fn rpm_curve(&self) -> &[u32] {
        &self.rpm
    }

    pub fn torque_curve(&self) -> &[f64] {
        &self.torque
    }

    pub fn horsepower_at(&self, idx: usize) -> f64 {
        self.torque[idx] * self.rpm[idx] as f64 / HORSEPOWER_DIVISOR
    }
}

/// Where to leave a gear and where the next gear picks up
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShiftPoint {
    /// rpm step index in the current gear at which to change up
    pub upshift_index: usize,
    /// rpm step index in the next gear after the change, if the next gear covers it
    pub dropdown_index: Option<usize>
}

/// The per rpm step behaviour of the car in a single gear.
///
/// Every curve is indexed by the same rpm step index into the shared [EngineCurve]
/// and ends at the last step that still produces positive acceleration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearProfile {
    gear_ratio: f64,
    engine: Arc<EngineCurve>,
    speed: Vec<f64>,
    air_resistance: Vec<f64>,
    downforce: Vec<f64>,
    wheel_force: Vec<f64>,
    wheel_torque: Vec<f64>,
    horsepower: Vec<f64>,
    acceleration: Vec<f64>,
    top_speed: Option<f64>,
    shift: Option<ShiftPoint>
}

impl GearProfile {
    fn new(gear_ratio: f64, engine: Arc<EngineCurve>) -> GearProfile {
        GearProfile {
            gear_ratio,
            engine,
            speed: Vec::new(),
            air_resistance: Vec::new(),
            downforce: Vec::new(),
            wheel_force: Vec::new(),
            wheel_torque: Vec::new(),
            horsepower: Vec::new(),
            acceleration: Vec::new(),
            top_speed: None,
            shift: None
        }
    }

    fn push_step(&mut self, step: &GearStep, horsepower: f64) {
        self.speed.push(step.speed);
        self.air_resistance.push(step.air_resistance);
        self.downforce.push(step.downforce);
        self.wheel_force.push(step.wheel_force);
        self.wheel_torque.push(step.wheel_torque);
        self.horsepower.push(horsepower);
        self.acceleration.push(step.acceleration);
    }

    pub(crate) fn with_shift(mut self, shift: Option<ShiftPoint>) -> GearProfile {
        self.shift = shift;
        self
    }

    pub fn gear_ratio(&self) -> f64 {
        self.gear_ratio
    }

    pub fn engine(&self) -> &EngineCurve {
        &self.engine
    }

    pub fn idle_rpm(&self) -> u32 {
        self.engine.idle_rpm()
    }

    /// Number of recorded rpm steps
    pub fn len(&self) -> usize {
        self.speed.len()
    }

    /// A gear with no recorded steps can't accelerate the car at any rpm
    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    pub fn rpm_at(&self, idx: usize) -> Option<u32> {
        self.engine.rpm_curve().get(idx).copied()
    }

    pub fn speed_curve(&self) -> &[f64] {
        &self.speed
    }

    pub fn air_resistance_curve(&self) -> &[f64] {
        &self.air_resistance
    }

    pub fn downforce_curve(&self) -> &[f64] {
        &self.downforce
    }

    pub fn wheel_force_curve(&self) -> &[f64] {
        &self.wheel_force
    }

    pub fn wheel_torque_curve(&self) -> &[f64] {
        &self.wheel_torque
    }

    pub fn horsepower_curve(&self) -> &[f64] {
        &self.horsepower
    }

    pub fn acceleration_curve(&self) -> &[f64] {
        &self.acceleration
    }

    /// m/s, `None` for an unreachable gear
    pub fn top_speed(&self) -> Option<f64> {
        self.top_speed
    }

    pub fn shift(&self) -> Option<ShiftPoint> {
        self.shift
    }

    pub fn upshift_index(&self) -> Option<usize> {
        self.shift.map(|s| s.upshift_index)
    }

    pub fn dropdown_index(&self) -> Option<usize> {
        self.shift.and_then(|s| s.dropdown_index)
    }

    pub fn upshift_rpm(&self) -> Option<u32> {
        self.upshift_index().and_then(|idx| self.rpm_at(idx))
    }
}

/// Everything computed for one rpm step of one gear
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GearStep {
    pub speed: f64,
    pub air_resistance: f64,
    pub downforce: f64,
    pub max_tractive_force: f64,
    pub wheel_force: f64,
    pub wheel_torque: f64,
    pub acceleration: f64
}

pub struct GearProfileBuilder<'a> {
    params: &'a VehicleParameters,
    tyre_diameter: f64,
    tyre_radius: f64,
    rolling_resistance: f64
}

impl<'a> GearProfileBuilder<'a> {
    pub fn new(params: &'a VehicleParameters) -> GearProfileBuilder<'a> {
        GearProfileBuilder {
            params,
            tyre_diameter: params.tyres.diameter_inches(),
            tyre_radius: params.tyres.rolling_radius(),
            rolling_resistance: params.rolling_resistance_force()
        }
    }

    /// Build one profile per gear ratio, first gear first
    pub fn build(&self) -> Result<Vec<GearProfile>> {
        self.params.validate_vehicle()?;
        let engine = Arc::new(EngineCurve::from_parameters(self.params)?);
        let mut profiles = Vec::with_capacity(self.params.drivetrain.gear_count());
        for (gear_idx, ratio) in self.params.drivetrain.gear_ratios.iter().enumerate() {
            let profile = self.build_gear(&engine, *ratio)?;
            match profile.top_speed {
                Some(top_speed) => {
                    debug!("Gear {} ({}) has {} steps up to {:.2} m/s",
                           gear_idx + 1, ratio, profile.len(), top_speed);
                }
                None => {
                    debug!("Gear {} ({}) can't accelerate the car at any rpm", gear_idx + 1, ratio);
                }
            }
            profiles.push(profile);
        }
        Ok(profiles)
    }

    pub fn build_gear(&self, engine: &Arc<EngineCurve>, gear_ratio: f64) -> Result<GearProfile> {
        if !gear_ratio.is_finite() || gear_ratio <= 0.0 {
            return Err(CoreError::InvalidArgument(format!("gear ratio must be positive, got {}", gear_ratio)));
        }
        let mut profile = GearProfile::new(gear_ratio, Arc::clone(engine));
        let mut previous_acceleration = 0.0;
        for idx in 0..engine.len() {
            let step = self.step(engine, gear_ratio, idx, previous_acceleration);
            if step.acceleration <= 0.0 {
                break;
            }
            profile.push_step(&step, engine.horsepower_at(idx));
            previous_acceleration = step.acceleration;
        }
        profile.top_speed = profile.speed.last().copied();
        Ok(profile)
    }

    pub fn road_speed(&self, rpm: f64, gear_ratio: f64) -> f64 {
        let final_drive = self.params.drivetrain.final_drive;
        let speed_mph = rpm * self.tyre_diameter / (gear_ratio * final_drive * RPM_TO_MPH_DIVISOR);
        speed_mph * KM_PER_MILE / 3.6
    }

    pub(crate) fn step(&self,
                       engine: &EngineCurve,
                       gear_ratio: f64,
                       idx: usize,
                       previous_acceleration: f64) -> GearStep
    {
        let params = self.params;
        let chassis = &params.chassis;
        let engine_torque = engine.torque_curve()[idx];
        let rpm = engine.rpm_curve()[idx] as f64;

        let torque_at_wheels = engine_torque * params.drivetrain.final_drive * gear_ratio;
        let speed = self.road_speed(rpm, gear_ratio);
        let air_resistance = params.aero.drag_force_at(speed);
        let downforce = params.aero.downforce_at(speed);
        let (front_downforce, rear_downforce) = params.aero.downforce.split(downforce);
        let weight_transfer = chassis.weight_transfer.load_transfer(previous_acceleration, chassis.mass);

        let driven_axle_load = match params.drivetrain.layout {
            DrivetrainLayout::RWD => chassis.rear_static_load() + rear_downforce + weight_transfer,
            DrivetrainLayout::FWD => chassis.front_static_load() + front_downforce - weight_transfer,
            DrivetrainLayout::AWD => chassis.weight() + downforce
        };
        let max_tractive_force = driven_axle_load * params.tyres.friction_coefficient;

        let wheel_force = (torque_at_wheels / self.tyre_radius - air_resistance - self.rolling_resistance)
            .min(max_tractive_force);
        GearStep {
            speed,
            air_resistance,
            downforce,
            max_tractive_force,
            wheel_force,
            wheel_torque: wheel_force * self.tyre_radius,
            acceleration: wheel_force / chassis.mass
        }
    }
}
