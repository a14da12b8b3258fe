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
use serde::{Deserialize, Serialize};
use utils::numeric::is_valid_percentage;
use crate::data::DataSet;

/// The part of a dataset a validation failure belongs to
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FormSection {
    Car,
    Drivetrain,
    Tires,
    Aerodynamics,
    Results
}

impl FormSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormSection::Car => "Car Details",
            FormSection::Drivetrain => "Drivetrain Details",
            FormSection::Tires => "Tires",
            FormSection::Aerodynamics => "Aerodynamics",
            FormSection::Results => "Results"
        }
    }
}

impl Display for FormSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message} ({section} section)")]
pub struct ValidationError {
    section: FormSection,
    message: String
}

impl ValidationError {
    pub fn new(section: FormSection, message: String) -> ValidationError {
        ValidationError { section, message }
    }

    pub fn missing(section: FormSection, field: &str) -> ValidationError {
        ValidationError::new(section, format!("{} is required.", field))
    }

    pub fn section(&self) -> FormSection {
        self.section
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type ValidationResult = Result<(), ValidationError>;

fn require<T>(val: &Option<T>, section: FormSection, field: &str) -> ValidationResult {
    match val {
        Some(_) => Ok(()),
        None => Err(ValidationError::missing(section, field))
    }
}

fn require_when_enabled<T>(val: &Option<T>, section: FormSection, field: &str, switch: &str) -> ValidationResult {
    match val {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(section, format!("{} is required when {} is enabled.", field, switch)))
    }
}

fn require_percentage(val: Option<f64>, section: FormSection, field: &str) -> ValidationResult {
    match val {
        None => Err(ValidationError::missing(section, field)),
        Some(v) if !is_valid_percentage(v) => {
            Err(ValidationError::new(section, format!("{} must be between 0 and 100. Got {}", field, v)))
        }
        Some(_) => Ok(())
    }
}

impl DataSet {
    /// Check the form has everything needed for a computation. The first problem
    /// found is returned, in the order the sections are filled in.
    pub fn validate(&self, check_speed: bool) -> ValidationResult {
        self.validate_car()?;
        self.validate_drivetrain()?;
        self.validate_tires()?;
        self.validate_aero()?;
        if check_speed {
            self.validate_speeds()?;
        }
        Ok(())
    }

    fn validate_car(&self) -> ValidationResult {
        let section = FormSection::Car;
        if self.car_name.trim().is_empty() {
            return Err(ValidationError::missing(section, "Car Name"));
        }
        require(&self.mass, section, "Car Mass")?;
        require_percentage(self.center_mass_distribution, section, "Center Mass Distribution")?;
        if self.weight_transfer {
            require_when_enabled(&self.center_of_mass_height, section, "Center of Mass Height", "Weight Transfer")?;
            require_when_enabled(&self.wheelbase, section, "Wheel Base", "Weight Transfer")?;
        }
        Ok(())
    }

    fn validate_drivetrain(&self) -> ValidationResult {
        let section = FormSection::Drivetrain;
        if self.rpm_torque.is_empty() {
            return Err(ValidationError::missing(section, "RPM-Torque List"));
        }
        let mut last_rpm = None;
        for (idx, entry) in self.rpm_torque.iter().enumerate() {
            let in_order = match (entry.rpm, last_rpm) {
                (Some(rpm), Some(last)) => rpm > last,
                (Some(_), None) => true,
                (None, _) => false
            };
            if !in_order {
                return Err(ValidationError::new(section, format!(
                    "RPM values must be incremental. Example: RPM1: 2000, RPM2: 2500. Error at index {}.", idx + 1
                )));
            }
            if entry.torque.is_none() {
                return Err(ValidationError::new(section, format!("Torque is required. Error at index {}.", idx + 1)));
            }
            last_rpm = entry.rpm;
        }
        require(&self.off_clutch_rpm, section, "Off Clutch RPM")?;
        require_percentage(self.gas_starting_level, section, "Gas Starting Level")?;
        require(&self.shift_time, section, "Shift Time")?;
        require(&self.drivetrain_layout, section, "Drivetrain Layout")?;
        require_percentage(self.drivetrain_loss, section, "Drivetrain Loss")?;
        require(&self.final_drive, section, "Final Drive")?;
        if self.gear_ratios.is_empty() || self.gear_ratios.iter().any(Option::is_none) {
            return Err(ValidationError::new(section, "All Gear Ratios must have a value.".to_string()));
        }
        Ok(())
    }

    fn validate_tires(&self) -> ValidationResult {
        let section = FormSection::Tires;
        require(&self.tire_width, section, "Tire Width")?;
        require(&self.tire_aspect_ratio, section, "Tire Aspect Ratio")?;
        require(&self.wheel_diameter, section, "Tire Wheel Diameter")?;
        require(&self.tire_friction_coeff, section, "Tire Friction Coefficient")?;
        require(&self.tire_rolling_coeff, section, "Tire Rolling Coefficient")
    }

    fn validate_aero(&self) -> ValidationResult {
        let section = FormSection::Aerodynamics;
        require(&self.drag_coeff, section, "Aero Drag Coefficient")?;
        require(&self.frontal_area, section, "Aero Frontal Area")?;
        require(&self.air_density, section, "Aero Air Density")?;
        if self.downforce {
            require_when_enabled(&self.negative_lift_coeff, section, "Negative Lift Coefficient", "Downforce")?;
            require_when_enabled(&self.downforce_total_area, section, "Downforce Total Area", "Downforce")?;
            match self.downforce_distribution {
                None => require_when_enabled(&self.downforce_distribution, section, "Downforce Distribution", "Downforce")?,
                d => require_percentage(d, section, "Downforce Distribution")?
            }
        }
        Ok(())
    }

    fn validate_speeds(&self) -> ValidationResult {
        match (self.initial_speed, self.final_speed) {
            (Some(initial), Some(fin)) if fin > initial && initial >= 0.0 => Ok(()),
            _ => Err(ValidationError::new(FormSection::Results,
                                          "Final Speed must be greater than Initial Speed.".to_string()))
        }
    }
}
