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

pub const LBS_TO_KG: f64 = 0.453592;
pub const FEET_TO_METERS: f64 = 0.3048;
pub const FOOT_POUNDS_TO_NM: f64 = 1.35582;
pub const SQ_FEET_TO_SQ_METERS: f64 = 0.092903;
pub const SLUG_PER_CUBIC_FOOT_TO_KG_PER_CUBIC_METER: f64 = 515.378818;
pub const MPH_TO_MS: f64 = 0.44704;
pub const MM_PER_INCH: f64 = 25.4;
pub const INCHES_PER_METER: f64 = 39.37;

pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * 3.6
}

pub fn mph_to_ms(speed_mph: f64) -> f64 {
    speed_mph * MPH_TO_MS
}

pub fn ms_to_mph(speed_ms: f64) -> f64 {
    speed_ms / MPH_TO_MS
}

pub fn lbs_to_kg(mass_lbs: f64) -> f64 {
    mass_lbs * LBS_TO_KG
}

pub fn feet_to_meters(length_ft: f64) -> f64 {
    length_ft * FEET_TO_METERS
}

pub fn foot_pounds_to_nm(torque_lbft: f64) -> f64 {
    torque_lbft * FOOT_POUNDS_TO_NM
}

pub fn sq_feet_to_sq_meters(area_sqft: f64) -> f64 {
    area_sqft * SQ_FEET_TO_SQ_METERS
}

pub fn slug_per_cubic_foot_to_kg_per_cubic_meter(density: f64) -> f64 {
    density * SLUG_PER_CUBIC_FOOT_TO_KG_PER_CUBIC_METER
}

#[cfg(test)]
mod tests {
    use crate::units::*;

    #[test]
    fn speed_conversions() {
        assert!((kmh_to_ms(100.0) - 27.7778).abs() < 1e-4);
        assert!((ms_to_kmh(kmh_to_ms(42.0)) - 42.0).abs() < 1e-9);
        assert!((mph_to_ms(60.0) - 26.8224).abs() < 1e-4);
    }

    #[test]
    fn imperial_conversions() {
        assert!((lbs_to_kg(2314.85) - 1050.0).abs() < 0.01);
        assert!((feet_to_meters(1.0) - 0.3048).abs() < 1e-9);
        assert!((foot_pounds_to_nm(100.0) - 135.582).abs() < 1e-9);
        assert!((sq_feet_to_sq_meters(10.0) - 0.92903).abs() < 1e-9);
        assert!((slug_per_cubic_foot_to_kg_per_cubic_meter(0.002377) - 1.2250).abs() < 1e-3);
    }
}
