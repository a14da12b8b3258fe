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
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use utils::filesystem::{get_filetypes_in_path, safe_filename_in_path};
use crate::data::DataSet;

const DATASET_EXTENSION: &str = "json";

#[derive(thiserror::Error, Debug)]
pub enum DataSetError {
    #[error("io error on {path}. {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("couldn't parse dataset {path}. {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("no dataset named '{0}'")]
    NotFound(String),
    #[error("a dataset named '{0}' already exists")]
    AlreadyExists(String)
}

impl DataSetError {
    fn io(path: &Path, source: io::Error) -> DataSetError {
        DataSetError::Io { path: path.to_path_buf(), source }
    }
}

/// Saved datasets, one json file per car named after the car
#[derive(Debug, Clone)]
pub struct DataSetStore {
    root: PathBuf
}

impl DataSetStore {
    pub fn new(root: PathBuf) -> DataSetStore {
        DataSetStore { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        safe_filename_in_path(&self.root, name, DATASET_EXTENSION)
    }

    /// Names of the saved datasets, sorted by filename. A missing store directory is empty.
    pub fn list(&self) -> Result<Vec<String>, DataSetError> {
        if !self.root.is_dir() {
            debug!("Dataset dir {} doesn't exist", self.root.display());
            return Ok(Vec::new());
        }
        let files = get_filetypes_in_path(&self.root, DATASET_EXTENSION)
            .map_err(|e| DataSetError::io(&self.root, e))?;
        let mut names = Vec::with_capacity(files.len());
        for file in files {
            match self.read_file(&file) {
                Ok(data) => names.push(data.car_name),
                Err(e) => warn!("Skipping {}. {}", file.display(), e)
            }
        }
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    pub fn load(&self, name: &str) -> Result<DataSet, DataSetError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(DataSetError::NotFound(name.to_string()));
        }
        self.read_file(&path)
    }

    /// Read a dataset from any json file, not just one in the store
    pub fn read_file(&self, path: &Path) -> Result<DataSet, DataSetError> {
        let contents = fs::read_to_string(path).map_err(|e| DataSetError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| DataSetError::Json { path: path.to_path_buf(), source: e })
    }

    /// Write the dataset under its car name, replacing any previous save of the same name
    pub fn save(&self, data: &DataSet) -> Result<PathBuf, DataSetError> {
        fs::create_dir_all(&self.root).map_err(|e| DataSetError::io(&self.root, e))?;
        let path = self.path_for(&data.car_name);
        let encoded = serde_json::to_string_pretty(data)
            .map_err(|e| DataSetError::Json { path: path.clone(), source: e })?;
        fs::write(&path, encoded).map_err(|e| DataSetError::io(&path, e))?;
        info!("Saved dataset '{}' to {}", data.car_name, path.display());
        Ok(path)
    }

    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<PathBuf, DataSetError> {
        let mut data = self.load(old_name)?;
        let old_path = self.path_for(old_name);
        let new_path = self.path_for(new_name);
        if new_path != old_path && self.exists(new_name) {
            return Err(DataSetError::AlreadyExists(new_name.to_string()));
        }
        data.car_name = new_name.to_string();
        let saved = self.save(&data)?;
        if saved != old_path {
            fs::remove_file(&old_path).map_err(|e| DataSetError::io(&old_path, e))?;
        }
        info!("Renamed dataset '{}' to '{}'", old_name, new_name);
        Ok(saved)
    }

    pub fn delete(&self, name: &str) -> Result<(), DataSetError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(DataSetError::NotFound(name.to_string()));
        }
        fs::remove_file(&path).map_err(|e| DataSetError::io(&path, e))?;
        info!("Deleted dataset '{}'", name);
        Ok(())
    }
}
