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

mod validation;
mod store;

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use perf_estimation::{Aero, Chassis, Downforce, Drivetrain, DrivetrainLayout, TorqueSample, Tyres,
                      VehicleParameters, WeightTransfer};
use utils::numeric::percentage_to_fraction;
use utils::units;

pub use validation::{FormSection, ValidationError};
pub use store::{DataSetError, DataSetStore};


#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial
}

impl UnitSystem {
    pub const METRIC_VALUE: &'static str = "metric";
    pub const IMPERIAL_VALUE: &'static str = "imperial";

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => UnitSystem::METRIC_VALUE,
            UnitSystem::Imperial => UnitSystem::IMPERIAL_VALUE
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "km/h",
            UnitSystem::Imperial => "mph"
        }
    }

    /// Convert a speed in this system's unit to m/s
    pub fn speed_to_si(&self, speed: f64) -> f64 {
        match self {
            UnitSystem::Metric => units::kmh_to_ms(speed),
            UnitSystem::Imperial => units::mph_to_ms(speed)
        }
    }

    /// Convert a speed in m/s into this system's unit
    pub fn speed_from_si(&self, speed: f64) -> f64 {
        match self {
            UnitSystem::Metric => units::ms_to_kmh(speed),
            UnitSystem::Imperial => units::ms_to_mph(speed)
        }
    }

    fn mass_to_si(&self, mass: f64) -> f64 {
        match self {
            UnitSystem::Metric => mass,
            UnitSystem::Imperial => units::lbs_to_kg(mass)
        }
    }

    fn length_to_si(&self, length: f64) -> f64 {
        match self {
            UnitSystem::Metric => length,
            UnitSystem::Imperial => units::feet_to_meters(length)
        }
    }

    fn torque_to_si(&self, torque: f64) -> f64 {
        match self {
            UnitSystem::Metric => torque,
            UnitSystem::Imperial => units::foot_pounds_to_nm(torque)
        }
    }

    fn area_to_si(&self, area: f64) -> f64 {
        match self {
            UnitSystem::Metric => area,
            UnitSystem::Imperial => units::sq_feet_to_sq_meters(area)
        }
    }

    fn density_to_si(&self, density: f64) -> f64 {
        match self {
            UnitSystem::Metric => density,
            UnitSystem::Imperial => units::slug_per_cubic_foot_to_kg_per_cubic_meter(density)
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            UnitSystem::METRIC_VALUE => Ok(UnitSystem::Metric),
            UnitSystem::IMPERIAL_VALUE => Ok(UnitSystem::Imperial),
            _ => Err(format!("Unknown unit system '{}'", s))
        }
    }
}

impl Display for UnitSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpmTorqueEntry {
    pub rpm: Option<u32>,
    pub torque: Option<f64>
}

impl RpmTorqueEntry {
    pub fn new(rpm: u32, torque: f64) -> RpmTorqueEntry {
        RpmTorqueEntry { rpm: Some(rpm), torque: Some(torque) }
    }
}

/// Everything a user enters about a car, in the units they entered it in.
///
/// Fractions are held as percentages. Fields are optional so that a half filled
/// in dataset can still be saved, [DataSet::validate] reports what's missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub car_name: String,
    pub unit_system: UnitSystem,

    pub mass: Option<f64>,
    pub center_mass_distribution: Option<f64>,
    pub weight_transfer: bool,
    pub center_of_mass_height: Option<f64>,
    pub wheelbase: Option<f64>,

    pub rpm_torque: Vec<RpmTorqueEntry>,
    pub off_clutch_rpm: Option<u32>,
    pub gas_starting_level: Option<f64>,
    pub shift_time: Option<f64>,
    pub drivetrain_layout: Option<String>,
    pub drivetrain_loss: Option<f64>,
    pub final_drive: Option<f64>,
    pub gear_ratios: Vec<Option<f64>>,

    pub tire_width: Option<f64>,
    pub tire_aspect_ratio: Option<f64>,
    pub wheel_diameter: Option<f64>,
    pub tire_friction_coeff: Option<f64>,
    pub tire_rolling_coeff: Option<f64>,

    pub drag_coeff: Option<f64>,
    pub frontal_area: Option<f64>,
    pub air_density: Option<f64>,
    pub downforce: bool,
    pub negative_lift_coeff: Option<f64>,
    pub downforce_total_area: Option<f64>,
    pub downforce_distribution: Option<f64>,

    pub initial_speed: Option<f64>,
    pub final_speed: Option<f64>
}

impl DataSet {
    /// A 1050kg roadster with everything filled in, timed from 0 to 100 km/h
    pub fn miata() -> DataSet {
        DataSet {
            car_name: "Miata".to_string(),
            unit_system: UnitSystem::Metric,
            mass: Some(1050.0),
            center_mass_distribution: Some(50.0),
            weight_transfer: false,
            center_of_mass_height: None,
            wheelbase: None,
            rpm_torque: vec![
                RpmTorqueEntry::new(1000, 250.0),
                RpmTorqueEntry::new(2000, 255.0),
                RpmTorqueEntry::new(3000, 280.0),
                RpmTorqueEntry::new(4000, 310.0),
                RpmTorqueEntry::new(5000, 300.0),
                RpmTorqueEntry::new(6000, 270.0),
            ],
            off_clutch_rpm: Some(1400),
            gas_starting_level: Some(70.0),
            shift_time: Some(0.5),
            drivetrain_layout: Some(DrivetrainLayout::RWD.description().to_string()),
            drivetrain_loss: Some(10.0),
            final_drive: Some(4.3),
            gear_ratios: vec![Some(3.7), Some(2.2), Some(1.7), Some(1.0), Some(0.96)],
            tire_width: Some(195.0),
            tire_aspect_ratio: Some(45.0),
            wheel_diameter: Some(16.0),
            tire_friction_coeff: Some(1.2),
            tire_rolling_coeff: Some(0.01),
            drag_coeff: Some(0.33),
            frontal_area: Some(2.5),
            air_density: Some(1.225),
            downforce: false,
            negative_lift_coeff: None,
            downforce_total_area: None,
            downforce_distribution: None,
            initial_speed: Some(0.0),
            final_speed: Some(100.0)
        }
    }

    /// Validate the form and convert it into SI [VehicleParameters].
    ///
    /// With `check_speed` unset the speed range isn't required, both speeds come out as 0
    /// unless they were filled in. That's enough to build gear profiles.
    pub fn to_vehicle_parameters(&self, check_speed: bool) -> Result<VehicleParameters, ValidationError> {
        self.validate(check_speed)?;
        let units = self.unit_system;
        let required = |val: Option<f64>, section: FormSection, name: &str| {
            val.ok_or_else(|| ValidationError::missing(section, name))
        };

        let mass = units.mass_to_si(required(self.mass, FormSection::Car, "Car Mass")?);
        let weight_transfer = match self.weight_transfer {
            false => WeightTransfer::Disabled,
            true => WeightTransfer::Enabled {
                center_of_mass_height: units.length_to_si(
                    required(self.center_of_mass_height, FormSection::Car, "Center of Mass Height")?
                ),
                wheelbase: units.length_to_si(required(self.wheelbase, FormSection::Car, "Wheel Base")?)
            }
        };
        let chassis = Chassis {
            mass,
            front_mass_distribution: percentage_to_fraction(
                required(self.center_mass_distribution, FormSection::Car, "Center Mass Distribution")?
            ),
            weight_transfer
        };

        let layout_str = self.drivetrain_layout.as_deref()
            .ok_or_else(|| ValidationError::missing(FormSection::Drivetrain, "Drivetrain Layout"))?;
        let layout = DrivetrainLayout::from_str(layout_str).map_err(|e| {
            ValidationError::new(FormSection::Drivetrain, e.details().to_string())
        })?;
        let torque_curve = self.rpm_torque.iter().map(|entry| {
            match (entry.rpm, entry.torque) {
                (Some(rpm), Some(torque)) => Ok(TorqueSample::new(rpm, units.torque_to_si(torque))),
                _ => Err(ValidationError::missing(FormSection::Drivetrain, "RPM-Torque entry"))
            }
        }).collect::<Result<Vec<_>, _>>()?;
        let gear_ratios = self.gear_ratios.iter().map(|ratio| {
            ratio.ok_or_else(|| ValidationError::missing(FormSection::Drivetrain, "Gear Ratio"))
        }).collect::<Result<Vec<_>, _>>()?;
        let drivetrain = Drivetrain {
            layout,
            final_drive: required(self.final_drive, FormSection::Drivetrain, "Final Drive")?,
            loss: percentage_to_fraction(required(self.drivetrain_loss, FormSection::Drivetrain, "Drivetrain Loss")?),
            shift_time: required(self.shift_time, FormSection::Drivetrain, "Shift Time")?,
            off_clutch_rpm: self.off_clutch_rpm
                .ok_or_else(|| ValidationError::missing(FormSection::Drivetrain, "Off Clutch RPM"))?,
            gas_starting_level: percentage_to_fraction(
                required(self.gas_starting_level, FormSection::Drivetrain, "Gas Starting Level")?
            ),
            gear_ratios,
            torque_curve
        };

        let tyres = Tyres {
            width_mm: required(self.tire_width, FormSection::Tires, "Tire Width")?,
            aspect_ratio: percentage_to_fraction(required(self.tire_aspect_ratio, FormSection::Tires, "Tire Aspect Ratio")?),
            wheel_diameter_in: required(self.wheel_diameter, FormSection::Tires, "Tire Wheel Diameter")?,
            friction_coefficient: required(self.tire_friction_coeff, FormSection::Tires, "Tire Friction Coefficient")?,
            rolling_coefficient: required(self.tire_rolling_coeff, FormSection::Tires, "Tire Rolling Coefficient")?
        };

        let downforce = match self.downforce {
            false => Downforce::Disabled,
            true => Downforce::Enabled {
                negative_lift_coefficient: required(self.negative_lift_coeff, FormSection::Aerodynamics, "Negative Lift Coefficient")?,
                area: units.area_to_si(required(self.downforce_total_area, FormSection::Aerodynamics, "Downforce Total Area")?),
                front_distribution: percentage_to_fraction(
                    required(self.downforce_distribution, FormSection::Aerodynamics, "Downforce Distribution")?
                )
            }
        };
        let aero = Aero {
            drag_coefficient: required(self.drag_coeff, FormSection::Aerodynamics, "Aero Drag Coefficient")?,
            frontal_area: units.area_to_si(required(self.frontal_area, FormSection::Aerodynamics, "Aero Frontal Area")?),
            air_density: units.density_to_si(required(self.air_density, FormSection::Aerodynamics, "Aero Air Density")?),
            downforce
        };

        let params = VehicleParameters {
            chassis,
            drivetrain,
            tyres,
            aero,
            initial_speed: units.speed_to_si(self.initial_speed.unwrap_or(0.0)),
            final_speed: units.speed_to_si(self.final_speed.unwrap_or(0.0))
        };
        debug!("Converted {} dataset '{}' into {:?}", units, self.car_name, params);
        Ok(params)
    }
}
