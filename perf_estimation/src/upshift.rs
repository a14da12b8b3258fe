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

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utils::numeric::approx_ge;

use crate::error::{CoreError, Result};
use crate::gear_profile::{GearProfile, ShiftPoint};
use crate::interpolate::{search_sorted, value_at_key};

/// The shift point chosen for every gear but the last.
///
/// `None` marks a gear pair where one of the two gears can't accelerate the car,
/// the car can't change up out of that gear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpshiftPlan {
    shifts: Vec<Option<ShiftPoint>>
}

impl UpshiftPlan {
    pub fn shifts(&self) -> &[Option<ShiftPoint>] {
        &self.shifts
    }

    pub fn shift_for_gear(&self, gear_idx: usize) -> Option<ShiftPoint> {
        self.shifts.get(gear_idx).copied().flatten()
    }

    /// Attach the plan to the profiles it was created from
    pub fn apply(&self, profiles: Vec<GearProfile>) -> Vec<GearProfile> {
        profiles.into_iter()
            .enumerate()
            .map(|(idx, profile)| profile.with_shift(self.shift_for_gear(idx)))
            .collect()
    }
}

pub struct UpshiftPlanner;

impl UpshiftPlanner {
    pub fn plan(profiles: &[GearProfile]) -> Result<UpshiftPlan> {
        if profiles.len() < 2 {
            return Err(CoreError::InvalidArgument(
                format!("upshift planning needs at least 2 gears, got {}", profiles.len())
            ));
        }
        let shifts = profiles.windows(2).enumerate().map(|(idx, pair)| {
            let (current, next) = (&pair[0], &pair[1]);
            if current.is_empty() || next.is_empty() {
                warn!("No upshift from gear {} to {}. One of the gears can't accelerate the car",
                      idx + 1, idx + 2);
                return None;
            }
            let upshift_index = find_upshift_index(current, next);
            let dropdown_index = find_dropdown_index(current, next, upshift_index);
            info!("Gear {} -> {}: upshift at {:?} rpm, drops to {:?} rpm",
                  idx + 1, idx + 2,
                  current.rpm_at(upshift_index),
                  dropdown_index.and_then(|i| next.rpm_at(i)));
            Some(ShiftPoint { upshift_index, dropdown_index })
        }).collect();
        Ok(UpshiftPlan { shifts })
    }
}

/// Tractive force `profile` produces at `speed`, zero if it doesn't reach that speed
pub fn force_at_speed(profile: &GearProfile, speed: f64) -> f64 {
    value_at_key(speed, profile.speed_curve(), profile.wheel_force_curve())
}

/// Latest rpm step of `current` that still pulls at least as hard as `next` would at the
/// same road speed. Ties stay in the lower gear.
///
/// If `next` is better at every step of `current` the change is made straight away.
pub fn find_upshift_index(current: &GearProfile, next: &GearProfile) -> usize {
    let current_force = current.wheel_force_curve();
    let current_speed = current.speed_curve();
    let max_size = current.len().max(next.len());
    for j in (0..max_size).rev() {
        if j >= next.len() {
            return j;
        }
        if j < current.len() && approx_ge(current_force[j], force_at_speed(next, current_speed[j])) {
            return j;
        }
    }
    0
}

/// Step of `next` that the car resumes at when changing up from `upshift_index` of `current`.
/// This is the first step of `next` at or above the speed carried over from the shift.
/// Step indices start at the idle rpm so this is also the rpm above idle.
pub fn find_dropdown_index(current: &GearProfile, next: &GearProfile, upshift_index: usize) -> Option<usize> {
    let shift_speed = current.speed_curve().get(upshift_index).copied().or(current.top_speed())?;
    let idx = search_sorted(next.speed_curve(), shift_speed);
    if idx < next.len() {
        Some(idx)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use utils::numeric::{approx_eq, approx_ge};
    use crate::{CoreError, GearProfileBuilder, VehicleParameters};
    use crate::parameters::tests::{front_heavy_aero, peaky_awd, roadster};
    use crate::upshift::{force_at_speed, UpshiftPlanner};

    fn assert_latest_valid_shift(params: &VehicleParameters) {
        let profiles = GearProfileBuilder::new(params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        assert_eq!(plan.shifts().len(), profiles.len() - 1);
        for (idx, pair) in profiles.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let shift = plan.shift_for_gear(idx).unwrap();
            let j = shift.upshift_index;
            assert!(j < current.len());
            if j < next.len() {
                let here = force_at_speed(next, current.speed_curve()[j]);
                assert!(approx_ge(current.wheel_force_curve()[j], here));
            }
            if j + 1 < current.len() && j + 1 < next.len() {
                let after = force_at_speed(next, current.speed_curve()[j + 1]);
                assert!(!approx_ge(current.wheel_force_curve()[j + 1], after));
            }
        }
    }

    /// The next gear picks up at the first step at or above the speed the shift was made at
    fn assert_dropdown_follows_shift_speed(params: &VehicleParameters) {
        let profiles = GearProfileBuilder::new(params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        for (idx, pair) in profiles.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let shift = plan.shift_for_gear(idx).unwrap();
            let shift_speed = current.speed_curve()[shift.upshift_index];
            let dropdown = match shift.dropdown_index {
                Some(dropdown) => dropdown,
                None => continue
            };
            assert!(next.speed_curve()[dropdown] >= shift_speed);
            if dropdown > 0 {
                assert!(next.speed_curve()[dropdown - 1] < shift_speed,
                        "gear {} re-enters above the shift speed {}", idx + 2, shift_speed);
            }
        }
    }

    #[test]
    fn traction_limited_gears_shift_at_the_limiter() {
        let params = roadster();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        for idx in 0..3 {
            let shift = plan.shift_for_gear(idx).unwrap();
            assert_eq!(shift.upshift_index, profiles[idx].len() - 1);
            let dropdown = shift.dropdown_index.unwrap();
            let next_speed = profiles[idx + 1].speed_curve()[dropdown];
            assert!(next_speed >= profiles[idx].top_speed().unwrap());
            assert!(profiles[idx + 1].speed_curve()[dropdown - 1] < profiles[idx].top_speed().unwrap());
        }
        // first and second gear both sit on the traction limit at the change
        for idx in 0..2 {
            let j = plan.shift_for_gear(idx).unwrap().upshift_index;
            let next_force = force_at_speed(&profiles[idx + 1], profiles[idx].speed_curve()[j]);
            assert!(approx_eq(profiles[idx].wheel_force_curve()[j], next_force));
        }
        assert_latest_valid_shift(&params);
    }

    #[test]
    fn peaky_engine_shifts_before_the_limiter() {
        let params = peaky_awd();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        let first = plan.shift_for_gear(0).unwrap();
        assert!(first.upshift_index < profiles[0].len() - 1);
        assert_latest_valid_shift(&params);
        assert_dropdown_follows_shift_speed(&params);
    }

    #[test]
    fn early_shift_re_enters_at_the_shift_speed() {
        let params = front_heavy_aero();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        let first = plan.shift_for_gear(0).unwrap();
        assert!(first.upshift_index < profiles[0].len() - 1);
        let dropdown = first.dropdown_index.unwrap();
        assert!(profiles[1].speed_curve()[dropdown] < profiles[0].top_speed().unwrap());
        assert_dropdown_follows_shift_speed(&params);
        assert_dropdown_follows_shift_speed(&roadster());
    }

    #[test]
    fn dropdown_rpm_is_relative_to_idle() {
        let params = roadster();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        let dropdown = plan.shift_for_gear(0).unwrap().dropdown_index.unwrap();
        // 6000rpm in a 3.7 first lands at about 6000 * 2.2 / 3.7 rpm in second
        let expected = (6000.0 * 2.2 / 3.7) as usize - 1000;
        assert!((dropdown as i64 - expected as i64).abs() <= 1, "{} vs {}", dropdown, expected);
    }

    #[test]
    fn applied_plan_is_visible_on_profiles() {
        let params = roadster();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        let profiles = plan.apply(profiles);
        assert_eq!(profiles[0].upshift_index(), Some(5000));
        assert_eq!(profiles[0].upshift_rpm(), Some(6000));
        assert!(profiles[0].dropdown_index().is_some());
        assert_eq!(profiles[4].shift(), None);
    }

    #[test]
    fn unreachable_gear_has_no_shift() {
        let mut params = roadster();
        params.drivetrain.gear_ratios = vec![3.7, 2.2, 0.05, 0.04];
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        let plan = UpshiftPlanner::plan(&profiles).unwrap();
        assert!(plan.shift_for_gear(0).is_some());
        assert_eq!(plan.shift_for_gear(1), None);
        assert_eq!(plan.shift_for_gear(2), None);
    }

    #[test]
    fn single_gear_rejected() {
        let params = roadster();
        let profiles = GearProfileBuilder::new(&params).build().unwrap();
        assert!(matches!(UpshiftPlanner::plan(&profiles[..1]), Err(CoreError::InvalidArgument(_))));
    }
}
