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

use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::gear_profile::{GearProfile, ShiftPoint};
use crate::interpolate::search_sorted;
use crate::parameters::VehicleParameters;

/// Where the simulated car is during a run
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunState {
    gear: usize,
    step: usize,
    speed: f64,
    elapsed: f64
}

/// Steps the car from the initial to the final speed through the supplied gears.
///
/// The profiles must have their shift points attached (see [crate::UpshiftPlan::apply]).
pub struct AccelerationSimulator<'a> {
    params: &'a VehicleParameters,
    profiles: &'a [GearProfile],
    rolling_resistance: f64
}

impl<'a> AccelerationSimulator<'a> {
    pub fn new(params: &'a VehicleParameters, profiles: &'a [GearProfile]) -> AccelerationSimulator<'a> {
        AccelerationSimulator {
            params,
            profiles,
            rolling_resistance: params.rolling_resistance_force()
        }
    }

    /// Elapsed time in seconds to get from the initial to the final speed
    pub fn run(&self) -> Result<f64> {
        let initial_speed = self.params.initial_speed;
        let final_speed = self.params.final_speed;
        if !(final_speed > initial_speed) {
            return Err(CoreError::InvalidArgument(
                format!("final speed {} m/s must be greater than initial speed {} m/s", final_speed, initial_speed)
            ));
        }

        let mut state = self.starting_point(initial_speed)?;
        let top_speed = self.profiles.last().and_then(|p| p.top_speed());
        match top_speed {
            Some(top) if top >= final_speed => {}
            _ => {
                let err = CoreError::UnreachableSpeed(format!(
                    "final speed {:.2} m/s is higher than the top speed {}",
                    final_speed,
                    top_speed.map_or("of an unreachable top gear".to_string(), |s| format!("{:.2} m/s", s))
                ));
                warn!("{}", err);
                return Err(err);
            }
        }
        debug!("Starting in gear {} at step {} ({:.2} m/s)", state.gear + 1, state.step, state.speed);

        let off_clutch_step = self.off_clutch_step();
        while state.speed < final_speed {
            let gear = &self.profiles[state.gear];
            if let Some(shift) = gear.shift() {
                if state.step >= shift.upshift_index {
                    self.change_up(&mut state, shift)?;
                    continue;
                }
            }
            if off_clutch_step.map_or(false, |off_clutch| state.step <= off_clutch) {
                self.pull_away(&mut state)?;
                continue;
            }
            self.accelerate(&mut state)?;
        }
        info!("{:.2} -> {:.2} m/s in {:.3}s", initial_speed, final_speed, state.elapsed);
        Ok(state.elapsed)
    }

    /// Lowest gear that covers `initial_speed` without already being past its change up point
    fn starting_point(&self, initial_speed: f64) -> Result<RunState> {
        for (gear_idx, profile) in self.profiles.iter().enumerate() {
            let step = search_sorted(profile.speed_curve(), initial_speed);
            if step >= profile.len() {
                continue;
            }
            if profile.upshift_index().map_or(true, |upshift| step <= upshift) {
                return Ok(RunState { gear: gear_idx, step, speed: initial_speed, elapsed: 0.0 });
            }
        }
        let err = CoreError::UnreachableSpeed(format!(
            "initial speed {:.2} m/s is higher than the top speed of every gear", initial_speed
        ));
        warn!("{}", err);
        Err(err)
    }

    /// Step index at which the clutch is fully engaged, `None` if that is below idle
    fn off_clutch_step(&self) -> Option<usize> {
        let idle = self.profiles.first()?.idle_rpm();
        self.params.drivetrain.off_clutch_rpm.checked_sub(idle).map(|s| s as usize)
    }

    /// Spend the shift time changing up, coasting on drag and rolling resistance alone
    fn change_up(&self, state: &mut RunState, shift: ShiftPoint) -> Result<()> {
        let next_gear = state.gear + 1;
        let (next, dropdown) = match (self.profiles.get(next_gear), shift.dropdown_index) {
            (Some(next), Some(dropdown)) if dropdown < next.len() => (next, dropdown),
            _ => {
                let err = CoreError::UnreachableSpeed(format!(
                    "gear {} can't carry on from the top of gear {} at {:.2} m/s",
                    next_gear + 1, state.gear + 1, state.speed
                ));
                warn!("{}", err);
                return Err(err);
            }
        };

        let shift_time = self.params.drivetrain.shift_time;
        let mass = self.params.chassis.mass;
        let shift_speed = state.speed;
        state.elapsed += shift_time;
        state.gear = next_gear;
        state.step = dropdown;

        let speeds = next.speed_curve();
        let mut coast_time = 0.0;
        while coast_time < shift_time && state.step > 0 {
            let deceleration = (next.air_resistance_curve()[state.step] + self.rolling_resistance) / mass;
            if deceleration <= 0.0 {
                break;
            }
            coast_time += (speeds[state.step] - speeds[state.step - 1]) / deceleration;
            state.step -= 1;
        }
        // never faster than when the clutch went down, any gap is made up under power
        state.speed = speeds[state.step].min(shift_speed);
        debug!("Changed up into gear {} at step {} ({:.2} m/s)", state.gear + 1, state.step, state.speed);
        Ok(())
    }

    /// Slip the clutch while feeding in throttle until the off clutch rpm is reached
    fn pull_away(&self, state: &mut RunState) -> Result<()> {
        let gear = &self.profiles[state.gear];
        let speeds = gear.speed_curve();
        let accelerations = gear.acceleration_curve();
        let gas_start = self.params.drivetrain.gas_starting_level;
        let pushing_force = gear.wheel_force_curve()[state.step];

        let mut slip = self.rolling_resistance / (pushing_force * gas_start);
        if !(slip < 1.0) {
            let err = CoreError::InsufficientTorque(format!(
                "rolling resistance of {:.1}N needs more than the {:.1}N available at {:.0}% throttle",
                self.rolling_resistance, pushing_force * gas_start, gas_start * 100.0
            ));
            warn!("{}", err);
            return Err(err);
        }
        let mut gas = gas_start;

        let off_clutch_step = self.off_clutch_step().unwrap_or(0);
        let step_count = off_clutch_step.saturating_sub(state.step).max(1) as f64;
        let gas_step = (1.0 - gas_start) / step_count;
        let slip_step = slip / step_count;

        if state.speed < speeds[state.step] {
            state.elapsed += (speeds[state.step] - state.speed) / (accelerations[state.step] * gas * (1.0 - slip));
            state.speed = speeds[state.step];
        }
        while state.step <= off_clutch_step
            && state.step + 1 < gear.len()
            && state.speed < self.params.final_speed
        {
            let delta = speeds[state.step + 1] - speeds[state.step];
            state.elapsed += delta / (accelerations[state.step] * gas * (1.0 - slip));
            state.step += 1;
            state.speed = speeds[state.step];
            gas = (gas + gas_step).min(1.0);
            slip = (slip - slip_step).max(0.0);
        }
        if state.speed < self.params.final_speed && state.step + 1 >= gear.len() && gear.shift().is_none() {
            // gear ran out with the clutch still slipping and nowhere to change up to
            return self.accelerate(state);
        }
        Ok(())
    }

    /// Advance one rpm step at full throttle
    fn accelerate(&self, state: &mut RunState) -> Result<()> {
        let gear = &self.profiles[state.gear];
        let speeds = gear.speed_curve();
        let accelerations = gear.acceleration_curve();
        if state.speed < speeds[state.step] {
            state.elapsed += (speeds[state.step] - state.speed) / accelerations[state.step];
            state.speed = speeds[state.step];
            return Ok(());
        }
        if state.step + 1 >= gear.len() {
            let err = CoreError::UnreachableSpeed(format!(
                "gear {} runs out at {:.2} m/s before reaching {:.2} m/s and can't change up",
                state.gear + 1, state.speed, self.params.final_speed
            ));
            warn!("{}", err);
            return Err(err);
        }
        state.elapsed += (speeds[state.step + 1] - speeds[state.step]) / accelerations[state.step];
        state.step += 1;
        state.speed = speeds[state.step];
        Ok(())
    }
}
