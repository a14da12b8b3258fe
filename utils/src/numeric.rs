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

/// Tolerance used when comparing interpolated forces and speeds. Values closer
/// than this are treated as equal.
pub const FLOAT_EPSILON: f64 = 1e-6;

pub fn round_float_to(float: f64, decimal_places: u32) -> f64 {
    let precision_base: u64 = 10;
    let precision_factor = precision_base.pow(decimal_places) as f64;
    (float * precision_factor).round() / precision_factor
}

/// `true` if `a` is greater than `b` or within [FLOAT_EPSILON] of it
pub fn approx_ge(a: f64, b: f64) -> bool {
    a >= b - FLOAT_EPSILON
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_EPSILON
}

pub fn is_valid_fraction(val: f64) -> bool {
    val.is_finite() && (0.0..=1.0).contains(&val)
}

pub fn is_valid_percentage(val: f64) -> bool {
    val.is_finite() && val >= 0.0 && val <= 100.0
}

pub fn percentage_to_fraction(val: f64) -> f64 {
    val / 100.0
}

#[cfg(test)]
mod tests {
    use crate::numeric::{approx_eq, approx_ge, is_valid_fraction, is_valid_percentage, round_float_to};

    #[test]
    fn round_float_tests()  {
        assert_eq!(round_float_to(0.29094, 3), 0.291);
        assert_eq!(round_float_to(0.2905, 2), 0.29);
        assert_eq!(round_float_to(-1.23456, 1), -1.2);
        assert_eq!(round_float_to(7.0, 0), 7.0);
    }

    #[test]
    fn approx_comparison_tests()  {
        assert!(approx_ge(1.0, 1.0));
        assert!(approx_ge(1.0, 1.0 + 1e-9));
        assert!(!approx_ge(1.0, 1.001));
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert!(!approx_eq(0.3, 0.31));
    }

    #[test]
    fn valid_percentage_tests()  {
        assert_eq!(is_valid_percentage(-1.0), false);
        assert_eq!(is_valid_percentage(0.0), true);
        assert_eq!(is_valid_percentage(50.5), true);
        assert_eq!(is_valid_percentage(100.0), true);
        assert_eq!(is_valid_percentage(100.1), false);
        assert_eq!(is_valid_percentage(f64::NAN), false);
        assert_eq!(is_valid_fraction(0.5), true);
        assert_eq!(is_valid_fraction(1.5), false);
        assert_eq!(is_valid_fraction(f64::INFINITY), false);
    }
}
