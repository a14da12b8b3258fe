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

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::gear_profile::GearProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearSummary {
    /// 1 based gear number
    pub gear: usize,
    pub ratio: f64,
    /// m/s
    pub top_speed: Option<f64>,
    pub upshift_rpm: Option<u32>,
    pub dropdown_rpm: Option<u32>
}

/// Headline figures for a set of gear profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub peak_horsepower: f64,
    pub peak_horsepower_rpm: u32,
    /// Nm, after drivetrain losses
    pub peak_torque: f64,
    pub peak_torque_rpm: u32,
    /// m/s, the fastest any gear gets. `None` if no gear can move the car
    pub top_speed: Option<f64>,
    pub gears: Vec<GearSummary>
}

pub fn summarize(profiles: &[GearProfile]) -> Result<PerformanceSummary> {
    let first = profiles.first().ok_or_else(|| {
        CoreError::InvalidArgument("can't summarise an empty set of gears".to_string())
    })?;
    let engine = first.engine();

    let (peak_hp_idx, peak_horsepower) = (0..engine.len())
        .map(|idx| engine.horsepower_at(idx))
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .ok_or_else(|| CoreError::InvalidArgument("engine curve is empty".to_string()))?;
    let peak_torque_idx = engine.torque_curve().iter()
        .position_max_by(|a, b| a.total_cmp(b))
        .ok_or_else(|| CoreError::InvalidArgument("engine curve is empty".to_string()))?;

    let top_speed = profiles.iter()
        .filter_map(|p| p.top_speed())
        .max_by(|a, b| a.total_cmp(b));

    let gears = profiles.iter().enumerate().map(|(idx, profile)| {
        let next = profiles.get(idx + 1);
        GearSummary {
            gear: idx + 1,
            ratio: profile.gear_ratio(),
            top_speed: profile.top_speed(),
            upshift_rpm: profile.upshift_rpm(),
            dropdown_rpm: profile.dropdown_index().zip(next).and_then(|(i, n)| n.rpm_at(i))
        }
    }).collect();

    Ok(PerformanceSummary {
        peak_horsepower,
        peak_horsepower_rpm: engine.rpm_curve()[peak_hp_idx],
        peak_torque: engine.torque_curve()[peak_torque_idx],
        peak_torque_rpm: engine.rpm_curve()[peak_torque_idx],
        top_speed,
        gears
    })
}
