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


use std::fmt::{Display, Formatter};
use itertools::Itertools;
use serde::Serialize;
use perf_estimation::{PerformanceResult, PerformanceSummary};
use crate::data::UnitSystem;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GearReport {
    pub gear: usize,
    pub ratio: f64,
    pub top_speed: Option<f64>,
    pub upshift_rpm: Option<u32>,
    pub dropdown_rpm: Option<u32>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timing {
    pub initial_speed: f64,
    pub final_speed: f64,
    /// seconds
    pub elapsed_time: f64
}

/// What gets printed for a dataset. Speeds are in the unit system the report was built with,
/// `--units` or the configured one, not necessarily the dataset's own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub car_name: String,
    pub speed_unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    pub peak_horsepower: f64,
    pub peak_horsepower_rpm: u32,
    pub peak_torque: f64,
    pub peak_torque_rpm: u32,
    pub top_speed: Option<f64>,
    pub gears: Vec<GearReport>
}

impl Report {
    pub fn from_summary(car_name: &str, summary: &PerformanceSummary, units: UnitSystem) -> Report {
        let convert = |speed: Option<f64>| speed.map(|s| units.speed_from_si(s));
        Report {
            car_name: car_name.to_string(),
            speed_unit: units.speed_unit(),
            timing: None,
            peak_horsepower: summary.peak_horsepower,
            peak_horsepower_rpm: summary.peak_horsepower_rpm,
            peak_torque: summary.peak_torque,
            peak_torque_rpm: summary.peak_torque_rpm,
            top_speed: convert(summary.top_speed),
            gears: summary.gears.iter().map(|gear| GearReport {
                gear: gear.gear,
                ratio: gear.ratio,
                top_speed: convert(gear.top_speed),
                upshift_rpm: gear.upshift_rpm,
                dropdown_rpm: gear.dropdown_rpm
            }).collect()
        }
    }

    pub fn from_result(car_name: &str,
                       result: &PerformanceResult,
                       initial_speed: f64,
                       final_speed: f64,
                       units: UnitSystem) -> Report {
        let mut report = Report::from_summary(car_name, &result.summary, units);
        report.timing = Some(Timing { initial_speed, final_speed, elapsed_time: result.elapsed_time });
        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn optional<T: Display>(val: &Option<T>) -> String {
    match val {
        Some(v) => v.to_string(),
        None => "-".to_string()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.car_name)?;
        if let Some(timing) = &self.timing {
            writeln!(f, "  {} -> {} {}: {:.2}s",
                     timing.initial_speed, timing.final_speed, self.speed_unit, timing.elapsed_time)?;
        }
        writeln!(f, "  Peak power:  {:.1} hp @ {} rpm", self.peak_horsepower, self.peak_horsepower_rpm)?;
        writeln!(f, "  Peak torque: {:.1} Nm @ {} rpm", self.peak_torque, self.peak_torque_rpm)?;
        writeln!(f, "  Top speed:   {} {}", optional(&self.top_speed.map(|s| format!("{:.1}", s))), self.speed_unit)?;
        writeln!(f, "  {:>4} {:>6} {:>10} {:>8} {:>9}", "Gear", "Ratio", "Top speed", "Upshift", "Dropdown")?;
        let rows = self.gears.iter().map(|gear| {
            format!("  {:>4} {:>6.2} {:>10} {:>8} {:>9}",
                    gear.gear,
                    gear.ratio,
                    optional(&gear.top_speed.map(|s| format!("{:.1}", s))),
                    optional(&gear.upshift_rpm),
                    optional(&gear.dropdown_rpm))
        }).join("\n");
        write!(f, "{}", rows)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use perf_estimation::compute_performance;
    use crate::data::{DataSet, UnitSystem};
    use crate::report::Report;

    #[test]
    fn miata_report() {
        let data = DataSet::miata();
        let params = data.to_vehicle_parameters(true).unwrap();
        let result = compute_performance(&params).unwrap();
        let report = Report::from_result(&data.car_name, &result, 0.0, 100.0, UnitSystem::Metric);

        assert_eq!(report.gears.len(), 5);
        assert_eq!(report.speed_unit, "km/h");
        assert_eq!(report.peak_torque_rpm, 4000);
        assert!(report.gears.last().unwrap().upshift_rpm.is_none());
        let first_gear_top = result.profiles[0].top_speed().unwrap() * 3.6;
        assert_abs_diff_eq!(report.gears[0].top_speed.unwrap(), first_gear_top, epsilon = 1e-9);

        let text = report.to_string();
        assert!(text.starts_with("Miata\n"));
        assert!(text.contains("0 -> 100 km/h"));
        assert_eq!(text.lines().count(), 1 + 1 + 3 + 1 + 5);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"elapsed_time\""));
    }

    #[test]
    fn summary_only_report_has_no_timing() {
        let data = DataSet::miata();
        let params = data.to_vehicle_parameters(false).unwrap();
        let (profiles, _) = perf_estimation::build_gear_profiles(&params).unwrap();
        let summary = perf_estimation::summarize(&profiles).unwrap();
        let report = Report::from_summary(&data.car_name, &summary, UnitSystem::Imperial);
        assert_eq!(report.speed_unit, "mph");
        assert!(report.timing.is_none());
        assert!(!report.to_json().unwrap().contains("timing"));
    }
}
