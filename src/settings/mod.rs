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


use std::fs;
use std::path::PathBuf;
use config::{Config, ConfigError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use crate::data::UnitSystem;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlobalSettings {
    dataset_path: String,
    unit_system: UnitSystem
}

impl GlobalSettings {
    const DATASET_PATH: &'static str = "dataset_path";
    const UNIT_SYSTEM: &'static str = "unit_system";
    const CONFIG_FILENAME: &'static str = "speedy-conf";
    const ENV_PREFIX: &'static str = "SPEEDY";

    pub fn default() -> Self {
        GlobalSettings {
            dataset_path: get_default_dataset_path().to_string_lossy().into_owned(),
            unit_system: UnitSystem::default()
        }
    }

    /// Layer the config file and `SPEEDY_` environment variables over the defaults.
    /// If that fails the defaults are used and written back out.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_builder()?
            .add_source(config::File::with_name(GlobalSettings::CONFIG_FILENAME))
            .add_source(config::Environment::with_prefix(GlobalSettings::ENV_PREFIX))
            .build()
            .and_then(|settings| settings.try_deserialize::<GlobalSettings>()) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Failed to load settings. {}", e.to_string());
                let ret = GlobalSettings::default();
                ret.write().unwrap_or_else(|e| { error!("Failed to write settings. {}", e.to_string()) });
                Ok(ret)
            }
        }
    }

    fn default_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default(GlobalSettings::DATASET_PATH, get_default_dataset_path().to_string_lossy().into_owned())?
            .set_default(GlobalSettings::UNIT_SYSTEM, UnitSystem::default().as_str())
    }

    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.dataset_path)
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn write(&self) -> std::io::Result<()> {
        fs::write(format!("{}.toml", GlobalSettings::CONFIG_FILENAME), toml::to_string(&self).map_err(|_e| {
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}

pub fn get_local_app_data_path() -> PathBuf {
    match ProjectDirs::from("com", "zephyrj", "speedy") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("speedy-data")
    }
}

pub fn get_default_dataset_path() -> PathBuf {
    get_local_app_data_path().join("datasets")
}
