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
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use itertools::Itertools;
use utils::numeric::{is_valid_fraction, round_float_to};
use utils::units::{INCHES_PER_METER, MM_PER_INCH};

use crate::error::{CoreError, Result};

pub const GRAVITY: f64 = 9.81; // m/s^2

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DrivetrainLayout {
    RWD,
    FWD,
    AWD
}

impl DrivetrainLayout {
    pub const RWD_VALUE: &'static str = "RWD";
    pub const FWD_VALUE: &'static str = "FWD";
    pub const AWD_VALUE: &'static str = "AWD";

    pub fn as_str(&self) -> &'static str {
        match self {
            DrivetrainLayout::RWD => { DrivetrainLayout::RWD_VALUE }
            DrivetrainLayout::FWD => { DrivetrainLayout::FWD_VALUE }
            DrivetrainLayout::AWD => { DrivetrainLayout::AWD_VALUE }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DrivetrainLayout::RWD => { "Rear Wheel Drive" }
            DrivetrainLayout::FWD => { "Front Wheel Drive" }
            DrivetrainLayout::AWD => { "All Wheel Drive" }
        }
    }
}

impl FromStr for DrivetrainLayout {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rwd" | "rear wheel drive" => Ok(DrivetrainLayout::RWD),
            "fwd" | "front wheel drive" => Ok(DrivetrainLayout::FWD),
            "awd" | "all wheel drive" | "4wd" => Ok(DrivetrainLayout::AWD),
            _ => Err(CoreError::InvalidArgument(format!("unknown drivetrain layout '{}'", s)))
        }
    }
}

impl TryFrom<String> for DrivetrainLayout {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        DrivetrainLayout::from_str(&value)
    }
}

impl From<DrivetrainLayout> for String {
    fn from(value: DrivetrainLayout) -> Self {
        value.as_str().to_string()
    }
}

impl Display for DrivetrainLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WeightTransfer {
    Disabled,
    Enabled {
        /// metres
        center_of_mass_height: f64,
        /// metres
        wheelbase: f64
    }
}

impl WeightTransfer {
    /// Load moved between the axles (N) when accelerating at `acceleration` m/s^2
    pub fn load_transfer(&self, acceleration: f64, mass: f64) -> f64 {
        match self {
            WeightTransfer::Disabled => 0.0,
            WeightTransfer::Enabled { center_of_mass_height, wheelbase } => {
                acceleration * (center_of_mass_height / wheelbase) * mass
            }
        }
    }
}

impl Default for WeightTransfer {
    fn default() -> Self {
        WeightTransfer::Disabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Downforce {
    Disabled,
    Enabled {
        negative_lift_coefficient: f64,
        /// m^2
        area: f64,
        /// fraction of the downforce acting on the front axle
        front_distribution: f64
    }
}

impl Downforce {
    /// Total downforce (N) at `speed` m/s
    pub fn total_at(&self, speed: f64, air_density: f64) -> f64 {
        match self {
            Downforce::Disabled => 0.0,
            Downforce::Enabled { negative_lift_coefficient, area, .. } => {
                0.5 * air_density * negative_lift_coefficient * area * speed.powi(2)
            }
        }
    }

    /// Splits a total downforce value into (front, rear)
    pub fn split(&self, total: f64) -> (f64, f64) {
        match self {
            Downforce::Disabled => (0.0, 0.0),
            Downforce::Enabled { front_distribution, .. } => {
                (total * front_distribution, total * (1.0 - front_distribution))
            }
        }
    }
}

impl Default for Downforce {
    fn default() -> Self {
        Downforce::Disabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorqueSample {
    pub rpm: u32,
    /// Nm
    pub torque: f64
}

impl TorqueSample {
    pub fn new(rpm: u32, torque: f64) -> TorqueSample {
        TorqueSample { rpm, torque }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chassis {
    /// kg
    pub mass: f64,
    /// fraction of the static load carried by the front axle
    pub front_mass_distribution: f64,
    #[serde(default)]
    pub weight_transfer: WeightTransfer
}

impl Chassis {
    pub fn weight(&self) -> f64 {
        self.mass * GRAVITY
    }

    pub fn front_static_load(&self) -> f64 {
        self.weight() * self.front_mass_distribution
    }

    pub fn rear_static_load(&self) -> f64 {
        self.weight() * (1.0 - self.front_mass_distribution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drivetrain {
    pub layout: DrivetrainLayout,
    pub final_drive: f64,
    /// fraction of engine torque lost before reaching the wheels
    pub loss: f64,
    /// seconds
    pub shift_time: f64,
    pub off_clutch_rpm: u32,
    /// fraction of full throttle applied when pulling away
    pub gas_starting_level: f64,
    pub gear_ratios: Vec<f64>,
    pub torque_curve: Vec<TorqueSample>
}

impl Drivetrain {
    pub fn idle_rpm(&self) -> Option<u32> {
        self.torque_curve.first().map(|s| s.rpm)
    }

    pub fn max_rpm(&self) -> Option<u32> {
        self.torque_curve.last().map(|s| s.rpm)
    }

    pub fn gear_count(&self) -> usize {
        self.gear_ratios.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tyres {
    pub width_mm: f64,
    /// sidewall height as a fraction of the width
    pub aspect_ratio: f64,
    pub wheel_diameter_in: f64,
    pub friction_coefficient: f64,
    pub rolling_coefficient: f64
}

impl Tyres {
    /// Overall tyre diameter in inches
    pub fn diameter_inches(&self) -> f64 {
        ((self.width_mm * self.aspect_ratio * 2.0) / MM_PER_INCH) + self.wheel_diameter_in
    }

    /// Rolling radius in metres, rounded to the millimetre
    pub fn rolling_radius(&self) -> f64 {
        round_float_to(self.diameter_inches() / INCHES_PER_METER / 2.0, 3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aero {
    pub drag_coefficient: f64,
    /// m^2
    pub frontal_area: f64,
    /// kg/m^3
    pub air_density: f64,
    #[serde(default)]
    pub downforce: Downforce
}

impl Aero {
    pub fn drag_force_at(&self, speed: f64) -> f64 {
        0.5 * self.drag_coefficient * self.frontal_area * self.air_density * speed.powi(2)
    }

    pub fn downforce_at(&self, speed: f64) -> f64 {
        self.downforce.total_at(speed, self.air_density)
    }
}

/// Snapshot of everything needed to estimate acceleration performance. All
/// values are SI; unit conversion happens before one of these is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    pub chassis: Chassis,
    pub drivetrain: Drivetrain,
    pub tyres: Tyres,
    pub aero: Aero,
    /// m/s
    pub initial_speed: f64,
    /// m/s
    pub final_speed: f64
}

impl VehicleParameters {
    pub fn rolling_resistance_force(&self) -> f64 {
        self.tyres.rolling_coefficient * GRAVITY * self.chassis.mass
    }

    /// Checks everything the gear profile builder relies upon
    pub fn validate_vehicle(&self) -> Result<()> {
        let chassis = &self.chassis;
        check_positive("mass", chassis.mass)?;
        check_fraction("front mass distribution", chassis.front_mass_distribution)?;
        if let WeightTransfer::Enabled { center_of_mass_height, wheelbase } = chassis.weight_transfer {
            check_non_negative("center of mass height", center_of_mass_height)?;
            check_positive("wheelbase", wheelbase)?;
        }

        let drivetrain = &self.drivetrain;
        check_positive("final drive", drivetrain.final_drive)?;
        check_fraction("drivetrain loss", drivetrain.loss)?;
        if drivetrain.loss >= 1.0 {
            return Err(invalid(format!("drivetrain loss must be below 1, got {}", drivetrain.loss)));
        }
        check_non_negative("shift time", drivetrain.shift_time)?;
        check_positive("gas starting level", drivetrain.gas_starting_level)?;
        check_fraction("gas starting level", drivetrain.gas_starting_level)?;
        if drivetrain.gear_ratios.len() < 2 {
            return Err(invalid(format!("at least 2 gear ratios are required, got {}",
                                       drivetrain.gear_ratios.len())));
        }
        for (idx, ratio) in drivetrain.gear_ratios.iter().enumerate() {
            check_positive(&format!("gear {} ratio", idx + 1), *ratio)?;
        }
        if drivetrain.torque_curve.len() < 2 {
            return Err(invalid(format!("at least 2 torque samples are required, got {}",
                                       drivetrain.torque_curve.len())));
        }
        for sample in &drivetrain.torque_curve {
            check_finite(&format!("torque at {} rpm", sample.rpm), sample.torque)?;
        }
        if let Some((idx, _)) = drivetrain.torque_curve.iter()
            .tuple_windows()
            .find_position(|(a, b)| b.rpm <= a.rpm)
        {
            return Err(invalid(format!("torque sample rpm values must be increasing. Error at sample {}",
                                       idx + 2)));
        }

        let tyres = &self.tyres;
        check_positive("tyre width", tyres.width_mm)?;
        check_non_negative("tyre aspect ratio", tyres.aspect_ratio)?;
        check_positive("wheel diameter", tyres.wheel_diameter_in)?;
        check_positive("tyre friction coefficient", tyres.friction_coefficient)?;
        check_non_negative("tyre rolling coefficient", tyres.rolling_coefficient)?;
        if tyres.rolling_radius() <= 0.0 {
            return Err(invalid("tyre rolling radius rounds to zero".to_string()));
        }

        let aero = &self.aero;
        check_non_negative("drag coefficient", aero.drag_coefficient)?;
        check_non_negative("frontal area", aero.frontal_area)?;
        check_non_negative("air density", aero.air_density)?;
        if let Downforce::Enabled { negative_lift_coefficient, area, front_distribution } = aero.downforce {
            check_finite("negative lift coefficient", negative_lift_coefficient)?;
            check_non_negative("downforce area", area)?;
            check_fraction("downforce distribution", front_distribution)?;
        }
        Ok(())
    }

    /// Checks the requested speed range on top of [VehicleParameters::validate_vehicle]
    pub fn validate(&self) -> Result<()> {
        self.validate_vehicle()?;
        check_non_negative("initial speed", self.initial_speed)?;
        check_finite("final speed", self.final_speed)?;
        if self.final_speed <= self.initial_speed {
            return Err(invalid(format!("final speed {} m/s must be greater than initial speed {} m/s",
                                       self.final_speed, self.initial_speed)));
        }
        Ok(())
    }
}

fn invalid(details: String) -> CoreError {
    CoreError::InvalidArgument(details)
}

fn check_finite(name: &str, val: f64) -> Result<()> {
    if !val.is_finite() {
        return Err(invalid(format!("{} must be a finite number, got {}", name, val)));
    }
    Ok(())
}

fn check_positive(name: &str, val: f64) -> Result<()> {
    check_finite(name, val)?;
    if val <= 0.0 {
        return Err(invalid(format!("{} must be positive, got {}", name, val)));
    }
    Ok(())
}

fn check_non_negative(name: &str, val: f64) -> Result<()> {
    check_finite(name, val)?;
    if val < 0.0 {
        return Err(invalid(format!("{} must not be negative, got {}", name, val)));
    }
    Ok(())
}

fn check_fraction(name: &str, val: f64) -> Result<()> {
    if !is_valid_fraction(val) {
        return Err(invalid(format!("{} must be between 0 and 1, got {}", name, val)));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;
    use approx::assert_abs_diff_eq;
    use crate::{CoreError, DrivetrainLayout, Downforce, TorqueSample, VehicleParameters, WeightTransfer};
    use crate::parameters::{Aero, Chassis, Drivetrain, Tyres};

    /// 1050kg roadster used throughout the tests. Pulls from 0 to 100 km/h.
    pub(crate) fn roadster() -> VehicleParameters {
        VehicleParameters {
            chassis: Chassis {
                mass: 1050.0,
                front_mass_distribution: 0.5,
                weight_transfer: WeightTransfer::Disabled
            },
            drivetrain: Drivetrain {
                layout: DrivetrainLayout::RWD,
                final_drive: 4.3,
                loss: 0.1,
                shift_time: 0.5,
                off_clutch_rpm: 1400,
                gas_starting_level: 0.7,
                gear_ratios: vec![3.7, 2.2, 1.7, 1.0, 0.96],
                torque_curve: vec![
                    TorqueSample::new(1000, 250.0),
                    TorqueSample::new(2000, 255.0),
                    TorqueSample::new(3000, 280.0),
                    TorqueSample::new(4000, 310.0),
                    TorqueSample::new(5000, 300.0),
                    TorqueSample::new(6000, 270.0),
                ]
            },
            tyres: Tyres {
                width_mm: 195.0,
                aspect_ratio: 0.45,
                wheel_diameter_in: 16.0,
                friction_coefficient: 1.2,
                rolling_coefficient: 0.01
            },
            aero: Aero {
                drag_coefficient: 0.33,
                frontal_area: 2.5,
                air_density: 1.225,
                downforce: Downforce::Disabled
            },
            initial_speed: 0.0,
            final_speed: 100.0 / 3.6
        }
    }

    /// All wheel drive on sticky tyres with an engine that falls away at the top,
    /// so every change up happens before the limiter
    pub(crate) fn peaky_awd() -> VehicleParameters {
        let mut params = roadster();
        params.drivetrain.layout = DrivetrainLayout::AWD;
        params.tyres.friction_coefficient = 3.0;
        params.drivetrain.gear_ratios = vec![3.0, 2.0, 1.4];
        params.drivetrain.torque_curve = vec![
            TorqueSample::new(1000, 250.0),
            TorqueSample::new(2000, 300.0),
            TorqueSample::new(3000, 320.0),
            TorqueSample::new(4000, 300.0),
            TorqueSample::new(5000, 150.0),
            TorqueSample::new(6000, 50.0),
        ];
        params
    }

    /// The roadster as front wheel drive with weight transfer and downforce. Squat unloads the
    /// front tyres in first, so the change into second comes early.
    pub(crate) fn front_heavy_aero() -> VehicleParameters {
        let mut params = roadster();
        params.drivetrain.layout = DrivetrainLayout::FWD;
        params.chassis.weight_transfer = WeightTransfer::Enabled { center_of_mass_height: 0.5, wheelbase: 2.3 };
        params.aero.downforce = Downforce::Enabled {
            negative_lift_coefficient: 1.5, area: 2.0, front_distribution: 0.4
        };
        params
    }

    #[test]
    fn tyre_geometry() {
        let params = roadster();
        assert_abs_diff_eq!(params.tyres.diameter_inches(), 22.9094, epsilon = 1e-4);
        assert_eq!(params.tyres.rolling_radius(), 0.291);
    }

    #[test]
    fn layout_parsing() {
        assert_eq!(DrivetrainLayout::from_str("Rear Wheel Drive").unwrap(), DrivetrainLayout::RWD);
        assert_eq!(DrivetrainLayout::from_str("fwd").unwrap(), DrivetrainLayout::FWD);
        assert_eq!(DrivetrainLayout::from_str("All Wheel Drive").unwrap(), DrivetrainLayout::AWD);
        assert!(matches!(DrivetrainLayout::from_str("Sideways Drive"), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn layout_serde() {
        let encoded = serde_json::to_string(&DrivetrainLayout::AWD).unwrap();
        assert_eq!(encoded, "\"AWD\"");
        let decoded: DrivetrainLayout = serde_json::from_str("\"Front Wheel Drive\"").unwrap();
        assert_eq!(decoded, DrivetrainLayout::FWD);
        assert!(serde_json::from_str::<DrivetrainLayout>("\"hover\"").is_err());
    }

    #[test]
    fn sub_models() {
        let wt = WeightTransfer::Enabled { center_of_mass_height: 0.5, wheelbase: 2.5 };
        assert_abs_diff_eq!(wt.load_transfer(2.0, 1000.0), 400.0, epsilon = 1e-9);
        assert_eq!(WeightTransfer::Disabled.load_transfer(2.0, 1000.0), 0.0);

        let df = Downforce::Enabled { negative_lift_coefficient: 1.0, area: 2.0, front_distribution: 0.4 };
        let total = df.total_at(10.0, 1.225);
        assert_abs_diff_eq!(total, 122.5, epsilon = 1e-9);
        let (front, rear) = df.split(total);
        assert_abs_diff_eq!(front, 49.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rear, 73.5, epsilon = 1e-9);
    }

    #[test]
    fn valid_parameters_pass() {
        assert_eq!(roadster().validate(), Ok(()));
    }

    #[test]
    fn invalid_parameters_rejected() {
        let mut p = roadster();
        p.drivetrain.gear_ratios = vec![3.7];
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));

        let mut p = roadster();
        p.drivetrain.gear_ratios[2] = 0.0;
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));

        let mut p = roadster();
        p.drivetrain.torque_curve[3].rpm = 2500;
        let err = p.validate().unwrap_err();
        assert!(err.details().contains("sample 4"), "{}", err);

        let mut p = roadster();
        p.drivetrain.torque_curve.truncate(1);
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));

        let mut p = roadster();
        p.chassis.mass = f64::NAN;
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));

        let mut p = roadster();
        p.final_speed = p.initial_speed;
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));

        let mut p = roadster();
        p.chassis.weight_transfer = WeightTransfer::Enabled { center_of_mass_height: 0.5, wheelbase: 0.0 };
        assert!(matches!(p.validate(), Err(CoreError::InvalidArgument(_))));
    }
}
