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

use std::result;

pub type Result<T> = result::Result<T, CoreError>;

/// Failures surfaced by [crate::compute_performance]. None of these are retried,
/// the detail string names the check that failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid argument. `{0}`")]
    InvalidArgument(String),
    #[error("unreachable speed. `{0}`")]
    UnreachableSpeed(String),
    #[error("insufficient torque. `{0}`")]
    InsufficientTorque(String)
}

impl CoreError {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument(_) => "invalid argument",
            CoreError::UnreachableSpeed(_) => "unreachable speed",
            CoreError::InsufficientTorque(_) => "insufficient torque"
        }
    }

    pub fn details(&self) -> &str {
        match self {
            CoreError::InvalidArgument(d) |
            CoreError::UnreachableSpeed(d) |
            CoreError::InsufficientTorque(d) => d.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::CoreError;

    #[test]
    fn error_display() {
        let e = CoreError::UnreachableSpeed("final speed 90 m/s exceeds top speed 44 m/s".to_string());
        assert_eq!(e.to_string(), "unreachable speed. `final speed 90 m/s exceeds top speed 44 m/s`");
        assert_eq!(e.as_str(), "unreachable speed");
        assert_eq!(e.details(), "final speed 90 m/s exceeds top speed 44 m/s");
    }
}
