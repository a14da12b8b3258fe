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

use crate::error::{CoreError, Result};

/// Resample `input` onto `total_points` evenly spaced positions.
///
/// Output index `i` maps onto the fractional input position `i * (n-1)/(m-1)` and
/// its value is linearly interpolated between the neighbouring input samples. The
/// first and last outputs always equal the first and last inputs.
pub fn linear_interpolation(input: &[f64], total_points: usize) -> Result<Vec<f64>> {
    if input.len() < 2 || total_points < 2 {
        return Err(CoreError::InvalidArgument(
            format!("interpolation needs at least 2 input points and 2 output points, got {} and {}",
                    input.len(), total_points)
        ));
    }

    let last_idx = input.len() - 1;
    let step = last_idx as f64 / (total_points - 1) as f64;
    let mut interpolated = Vec::with_capacity(total_points);
    for i in 0..total_points {
        let position = i as f64 * step;
        let lower_idx = (position.floor() as usize).min(last_idx);
        let upper_idx = (lower_idx + 1).min(last_idx);
        let t = position - lower_idx as f64;
        let value = if upper_idx == lower_idx {
            input[lower_idx]
        } else {
            input[lower_idx] + t * (input[upper_idx] - input[lower_idx])
        };
        interpolated.push(value);
    }
    // pin the final sample so accumulated step error can't move the endpoint
    interpolated[total_points - 1] = input[last_idx];
    Ok(interpolated)
}

/// Index at which `value` would be inserted into the ascending `sorted` slice to keep it
/// ordered. Returns the leftmost such index, `sorted.len()` if every element is smaller.
pub fn search_sorted(sorted: &[f64], value: f64) -> usize {
    sorted.partition_point(|v| *v < value)
}

/// Look up the entry of `values` paired with the first `keys` element that is not below `key`.
/// Out of range lookups yield zero.
pub fn value_at_key(key: f64, keys: &[f64], values: &[f64]) -> f64 {
    let idx = search_sorted(keys, key);
    values.get(idx).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;
    use crate::CoreError;
    use crate::interpolate::{linear_interpolation, search_sorted, value_at_key};

    #[test]
    fn rejects_short_inputs() {
        assert!(matches!(linear_interpolation(&[1.0], 10), Err(CoreError::InvalidArgument(_))));
        assert!(matches!(linear_interpolation(&[1.0, 2.0], 1), Err(CoreError::InvalidArgument(_))));
        assert!(matches!(linear_interpolation(&[], 0), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn endpoints_preserved() {
        let inputs = vec![
            vec![250.0, 255.0, 280.0, 310.0, 300.0, 270.0],
            vec![0.1, -4.0],
            vec![3.0, 3.0, 3.0],
        ];
        for input in inputs {
            for total in [2, 3, 7, 1001, 5001] {
                let out = linear_interpolation(&input, total).unwrap();
                assert_eq!(out.len(), total);
                assert_eq!(out[0], input[0]);
                assert_eq!(out[total - 1], *input.last().unwrap());
            }
        }
    }

    #[test]
    fn evenly_spaced_values() {
        let out = linear_interpolation(&[0.0, 10.0, 30.0], 5).unwrap();
        let expected = [0.0, 5.0, 10.0, 20.0, 30.0];
        for (a, b) in out.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }

        let torque = linear_interpolation(&[250.0, 255.0], 1001).unwrap();
        assert_abs_diff_eq!(torque[500], 252.5, epsilon = 1e-9);
    }

    #[test]
    fn monotonic_input_gives_monotonic_output() {
        let input = [1.0, 1.0, 2.5, 7.0, 7.0, 11.0];
        let out = linear_interpolation(&input, 997).unwrap();
        assert!(out.iter().tuple_windows().all(|(a, b)| b >= a));
    }

    #[test]
    fn search_sorted_insertion_points() {
        let sorted = [1.0, 2.0, 2.0, 4.0];
        assert_eq!(search_sorted(&sorted, 0.5), 0);
        assert_eq!(search_sorted(&sorted, 1.0), 0);
        assert_eq!(search_sorted(&sorted, 2.0), 1);
        assert_eq!(search_sorted(&sorted, 3.0), 3);
        assert_eq!(search_sorted(&sorted, 4.0), 3);
        assert_eq!(search_sorted(&sorted, 9.0), 4);
        assert_eq!(search_sorted(&[], 9.0), 0);
    }

    #[test]
    fn value_lookup_out_of_range_is_zero() {
        let speeds = [1.0, 2.0, 3.0];
        let forces = [30.0, 20.0, 10.0];
        assert_eq!(value_at_key(1.5, &speeds, &forces), 20.0);
        assert_eq!(value_at_key(0.0, &speeds, &forces), 30.0);
        assert_eq!(value_at_key(3.5, &speeds, &forces), 0.0);
    }
}
