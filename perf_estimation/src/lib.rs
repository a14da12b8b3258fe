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

mod error;
mod parameters;
mod interpolate;
mod gear_profile;
mod upshift;
mod simulator;
mod summary;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{CoreError, Result};
pub use parameters::{Aero, Chassis, Downforce, Drivetrain, DrivetrainLayout, TorqueSample, Tyres,
                     VehicleParameters, WeightTransfer, GRAVITY};
pub use interpolate::{linear_interpolation, search_sorted};
pub use gear_profile::{EngineCurve, GearProfile, GearProfileBuilder, ShiftPoint};
pub use upshift::{UpshiftPlan, UpshiftPlanner};
pub use simulator::AccelerationSimulator;
pub use summary::{summarize, GearSummary, PerformanceSummary};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    /// seconds from the initial to the final speed
    pub elapsed_time: f64,
    pub profiles: Vec<GearProfile>,
    pub plan: UpshiftPlan,
    pub summary: PerformanceSummary
}

/// Build every gear profile and attach the upshift plan to them
pub fn build_gear_profiles(parameters: &VehicleParameters) -> Result<(Vec<GearProfile>, UpshiftPlan)> {
    let profiles = GearProfileBuilder::new(parameters).build()?;
    let plan = UpshiftPlanner::plan(&profiles)?;
    let profiles = plan.apply(profiles);
    Ok((profiles, plan))
}

/// Estimate how long the described car takes to get from its initial to its final speed
pub fn compute_performance(parameters: &VehicleParameters) -> Result<PerformanceResult> {
    parameters.validate()?;
    let (profiles, plan) = build_gear_profiles(parameters)?;
    let summary = summarize(&profiles)?;
    let elapsed_time = AccelerationSimulator::new(parameters, &profiles).run()?;
    info!("Computed {:.3}s for {:.2} -> {:.2} m/s",
          elapsed_time, parameters.initial_speed, parameters.final_speed);
    Ok(PerformanceResult { elapsed_time, profiles, plan, summary })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use crate::{compute_performance, CoreError, PerformanceResult};
    use crate::parameters::tests::roadster;

    #[test]
    fn compute_zero_to_hundred() {
        let result = compute_performance(&roadster()).unwrap();
        assert!(result.elapsed_time.is_finite() && result.elapsed_time > 0.0);
        assert_eq!(result.profiles.len(), 5);
        assert_eq!(result.plan.shifts().len(), 4);
        assert_eq!(result.summary.gears.len(), 5);
        assert_eq!(result.profiles[0].upshift_index(), result.plan.shift_for_gear(0).map(|s| s.upshift_index));
    }

    #[test]
    fn compute_is_repeatable() {
        let params = roadster();
        let a = compute_performance(&params).unwrap();
        let b = compute_performance(&params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn compute_surfaces_each_error_kind() {
        let mut too_fast = roadster();
        too_fast.final_speed = 300.0 / 3.6;
        assert!(matches!(compute_performance(&too_fast), Err(CoreError::UnreachableSpeed(_))));

        let mut stalls = roadster();
        stalls.drivetrain.gas_starting_level = 0.01;
        assert!(matches!(compute_performance(&stalls), Err(CoreError::InsufficientTorque(_))));

        let mut invalid = roadster();
        invalid.drivetrain.torque_curve.clear();
        assert!(matches!(compute_performance(&invalid), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn result_serializes() {
        let result = compute_performance(&roadster()).unwrap();
        let encoded = serde_json::to_string(&result).unwrap();
        let decoded: PerformanceResult = serde_json::from_str(&encoded).unwrap();
        assert_abs_diff_eq!(decoded.elapsed_time, result.elapsed_time, epsilon = 1e-9);
        assert_eq!(decoded.profiles.len(), result.profiles.len());
        assert_eq!(decoded.profiles[1].len(), result.profiles[1].len());
        assert_eq!(decoded.summary.peak_torque_rpm, result.summary.peak_torque_rpm);
        assert_eq!(decoded.plan.shifts(), result.plan.shifts());
    }
}
